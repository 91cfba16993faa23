//! Optimistic persistence specs

use crate::prelude::*;
use mb_core::AssignmentPhase;

#[tokio::test]
async fn accepted_drops_land_in_the_store() {
    let mut fx = Fixture::new();
    let id = fx.assign("r-op", "j-day", RowKind::Crew);

    fx.board.sync(&fx.store).await.unwrap();

    let key = RecordKey::Assignment(id.clone());
    let Some(Record::Assignment(stored)) = fx.store.record(&key) else {
        panic!("assignment missing from store");
    };
    assert_eq!(stored.id, id);
    let local = fx.board.snapshot().assignment(&id).unwrap();
    assert_eq!(local.phase, AssignmentPhase::Persisted);
    assert_eq!(local.version.map(mb_store::Version), fx.store.version_of(&key));
}

#[tokio::test]
async fn rejected_drops_never_touch_the_store() {
    let mut fx = Fixture::new();
    fx.board
        .assign(
            &"r-truck".into(),
            &"j-day".into(),
            RowKind::Crew,
            AssignOptions::default(),
        )
        .unwrap_err();

    fx.board.sync(&fx.store).await.unwrap();
    assert!(fx.store.calls().is_empty());
}

#[tokio::test]
async fn a_failed_write_rolls_back_and_frees_the_magnet() {
    let mut fx = Fixture::new();
    let id = fx.assign("r-op", "j-day", RowKind::Crew);
    assert_eq!(fx.status("r-op"), MagnetStatus::Assigned);

    fx.store.fail_next("constraint violation");
    let err = fx.board.sync(&fx.store).await.unwrap_err();

    let BoardError::Persistence { failures } = err else {
        panic!("expected persistence failure, got {err:?}");
    };
    assert_eq!(failures[0].key, RecordKey::Assignment(id.clone()));
    assert!(fx.board.snapshot().assignment(&id).is_none());
    assert_eq!(fx.status("r-op"), MagnetStatus::Available);
    assert!(fx.store.record(&RecordKey::Assignment(id)).is_none());
}

#[tokio::test]
async fn finalization_is_written_through() {
    let mut fx = Fixture::new();
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op", "j-day", RowKind::Equipment);
    fx.board.attach(&operator, &excavator).unwrap();
    fx.board.finalize_job(&"j-day".into()).unwrap();

    fx.board.sync(&fx.store).await.unwrap();

    let Some(Record::Job(stored)) = fx.store.record(&RecordKey::Job("j-day".into())) else {
        panic!("job missing from store");
    };
    assert!(stored.finalized);
}

#[tokio::test]
async fn writes_drain_in_mutation_order() {
    let mut fx = Fixture::new();
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op", "j-day", RowKind::Equipment);
    fx.board.attach(&operator, &excavator).unwrap();

    fx.board.sync(&fx.store).await.unwrap();

    use mb_store::StoreCall;
    assert_eq!(
        fx.store.calls(),
        vec![
            StoreCall::CreateAssignment {
                id: excavator.clone()
            },
            StoreCall::CreateAssignment {
                id: operator.clone()
            },
            StoreCall::UpdateAssignment { id: operator },
        ]
    );
}
