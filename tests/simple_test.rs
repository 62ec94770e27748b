//! Simple test to verify compilation and basic functionality

use chrono::Utc;
use tally::{
    config::Config,
    tally::ElectionService,
    types::{Candidate, Position, PositionKind, VoterScope},
    Result,
};
use uuid::Uuid;

#[tokio::test]
async fn test_basic_compilation() -> Result<()> {
    println!("🔧 Testing basic compilation and functionality...");

    // Test configuration
    let config = Config::for_testing();
    assert!(config.admission.recompute_on_cast);
    println!("✅ Configuration works");

    // Test service wiring
    let service = ElectionService::for_testing();

    let president = Position {
        id: Uuid::new_v4(),
        title: "President".to_string(),
        kind: PositionKind::National,
        created_at: Utc::now(),
    };
    service.roster().register_position(president.clone())?;
    service.roster().register_candidate(Candidate {
        id: "alice".to_string(),
        position_id: president.id,
        name: "Alice Smith".to_string(),
        party: "Unity Party".to_string(),
        scope: None,
    })?;
    println!("✅ Roster registration works");

    let voter_id = Uuid::new_v4();
    service.roster().register_voter(
        voter_id,
        VoterScope {
            station_id: Uuid::new_v4(),
            ward_id: Uuid::new_v4(),
            constituency_id: Uuid::new_v4(),
            district_id: Uuid::new_v4(),
        },
    )?;

    let ballot = service.cast_vote(voter_id, president.id, "alice")?;
    assert_eq!(ballot.candidate_id, "alice");
    println!("✅ Vote admission works");

    let tallies = service.live_tally(president.id)?;
    assert_eq!(tallies.len(), 1);
    assert_eq!(tallies[0].count, 1);
    println!("✅ Live tally works");

    let winners = service.winners(None)?;
    assert_eq!(winners.len(), 1);
    assert!(!winners[0].is_tie());
    println!("✅ Winner resolution works");

    let stats = service.reconcile_all()?;
    assert_eq!(stats.positions, 1);
    println!("✅ Reconciliation works");

    println!("🎉 All basic functionality verified!");
    Ok(())
}
