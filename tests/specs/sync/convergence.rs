//! Cross-session convergence specs
//!
//! Two boards share one store; each drains the change feed the other's
//! writes produce and both must end at the same state.

use crate::prelude::*;
use mb_board::Board;
use mb_core::SequentialIdGen;
use mb_store::Store;

fn drain(board: &mut Board<SequentialIdGen>, feed: &mut mb_store::ChangeReceiver) {
    while let Ok(event) = feed.try_recv() {
        board.apply_remote(event);
    }
}

#[tokio::test]
async fn a_write_on_one_board_appears_on_the_other() {
    let mut a = Fixture::new();
    let mut b = Fixture::on_store(a.store.clone(), "b");
    let mut feed_b = b.store.subscribe();

    let id = a.assign("r-op", "j-day", RowKind::Crew);
    a.board.sync(&a.store).await.unwrap();
    drain(&mut b.board, &mut feed_b);

    let mirrored = b.board.snapshot().assignment(&id).unwrap();
    assert_eq!(mirrored.resource_id, ResourceId::from("r-op"));
    assert_eq!(b.status("r-op"), MagnetStatus::Assigned);
}

#[tokio::test]
async fn both_boards_converge_after_concurrent_writes() {
    let mut a = Fixture::new();
    let mut b = Fixture::on_store(a.store.clone(), "b");
    let mut feed_a = a.store.subscribe();
    let mut feed_b = b.store.subscribe();

    // Each board mutates a different record before either syncs
    let from_a = a.assign("r-op", "j-day", RowKind::Crew);
    let from_b = b.assign("r-exc", "j-day", RowKind::Equipment);
    a.board.sync(&a.store).await.unwrap();
    b.board.sync(&b.store).await.unwrap();
    drain(&mut a.board, &mut feed_a);
    drain(&mut b.board, &mut feed_b);

    for board in [&a.board, &b.board] {
        assert!(board.snapshot().assignment(&from_a).is_some());
        assert!(board.snapshot().assignment(&from_b).is_some());
    }
    assert_eq!(a.status("r-op"), MagnetStatus::Assigned);
    assert_eq!(b.status("r-op"), MagnetStatus::Assigned);
}

#[tokio::test]
async fn the_newer_store_version_wins_a_same_record_race() {
    let mut a = Fixture::new();
    let mut b = Fixture::on_store(a.store.clone(), "b");
    let mut feed_a = a.store.subscribe();
    let mut feed_b = b.store.subscribe();

    let id = a.assign("r-op", "j-day", RowKind::Crew);
    a.board.sync(&a.store).await.unwrap();
    drain(&mut a.board, &mut feed_a);
    drain(&mut b.board, &mut feed_b);

    // Both boards now hold the record; each updates it, a first, b second
    a.board
        .move_assignment(&id, &"j-day".into(), RowKind::Crew)
        .unwrap();
    a.board.sync(&a.store).await.unwrap();
    b.board
        .move_assignment(&id, &"j-night".into(), RowKind::Equipment)
        .unwrap();
    b.board.sync(&b.store).await.unwrap();

    drain(&mut a.board, &mut feed_a);
    drain(&mut b.board, &mut feed_b);

    for board in [&a.board, &b.board] {
        let settled = board.snapshot().assignment(&id).unwrap();
        assert_eq!(settled.job_id, JobId::from("j-night"));
        assert_eq!(settled.row, RowKind::Equipment);
    }
}

#[tokio::test]
async fn a_remote_delete_clears_the_local_mirror() {
    let mut a = Fixture::new();
    let mut b = Fixture::on_store(a.store.clone(), "b");
    let mut feed_b = b.store.subscribe();

    let id = a.assign("r-op", "j-day", RowKind::Crew);
    a.board.sync(&a.store).await.unwrap();
    drain(&mut b.board, &mut feed_b);
    assert!(b.board.snapshot().assignment(&id).is_some());

    a.board.unassign(&id).unwrap();
    a.board.sync(&a.store).await.unwrap();
    drain(&mut b.board, &mut feed_b);

    assert!(b.board.snapshot().assignment(&id).is_none());
    assert_eq!(b.status("r-op"), MagnetStatus::Available);
}

#[tokio::test]
async fn stale_events_do_not_clobber_a_newer_local_ack() {
    let mut a = Fixture::new();
    let mut feed_a = a.store.subscribe();

    let id = a.assign("r-op", "j-day", RowKind::Crew);
    a.board.sync(&a.store).await.unwrap();
    a.board
        .move_assignment(&id, &"j-day".into(), RowKind::Crew)
        .unwrap();
    a.board.sync(&a.store).await.unwrap();

    // Feed delivery lags: the create echo arrives after the update ack
    drain(&mut a.board, &mut feed_a);

    let settled = a.board.snapshot().assignment(&id).unwrap();
    assert_eq!(settled.row, RowKind::Crew);
    assert!(settled.version.is_some());
}
