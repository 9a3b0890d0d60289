use ratesync::{Phase, PhaseEvent, SyncError};

fn merged() -> Phase {
    Phase::Fetched
        .on(PhaseEvent::Partitioned)
        .and_then(|p| p.on(PhaseEvent::Merged))
        .unwrap()
}

#[test]
fn updates_then_inserts_reach_done() {
    let writing = merged().on(PhaseEvent::UpdatesApplied).unwrap();
    assert_eq!(
        writing,
        Phase::Writing {
            updated: true,
            inserted: false
        }
    );
    assert!(!writing.is_done());
    assert!(writing.on(PhaseEvent::InsertsApplied).unwrap().is_done());
}

#[test]
fn inserts_then_updates_reach_done() {
    let done = merged()
        .on(PhaseEvent::InsertsApplied)
        .and_then(|p| p.on(PhaseEvent::UpdatesApplied))
        .unwrap();
    assert_eq!(done, Phase::Done);
}

#[test]
fn out_of_order_events_are_rejected() {
    assert!(matches!(
        Phase::Fetched.on(PhaseEvent::Merged),
        Err(SyncError::Data(_))
    ));
    assert!(Phase::Fetched.on(PhaseEvent::UpdatesApplied).is_err());
    let writing = merged().on(PhaseEvent::UpdatesApplied).unwrap();
    assert!(writing.on(PhaseEvent::UpdatesApplied).is_err());
    assert!(Phase::Done.on(PhaseEvent::InsertsApplied).is_err());
}
