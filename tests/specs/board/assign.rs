//! Drop validation and magnet status specs

use crate::prelude::*;

#[test]
fn allowed_drop_lands_and_lights_the_magnet() {
    let mut fx = Fixture::new();
    assert_eq!(fx.status("r-exc"), MagnetStatus::Available);

    let id = fx.assign("r-exc", "j-day", RowKind::Equipment);

    let assignment = fx.board.snapshot().assignment(&id).unwrap();
    assert_eq!(assignment.resource_id, ResourceId::from("r-exc"));
    assert_eq!(assignment.row, RowKind::Equipment);
    assert_eq!(fx.status("r-exc"), MagnetStatus::Assigned);
}

#[test]
fn wrong_row_drop_is_rejected_and_leaves_no_trace() {
    let mut fx = Fixture::new();

    let err = fx
        .board
        .assign(
            &"r-truck".into(),
            &"j-day".into(),
            RowKind::Crew,
            AssignOptions::default(),
        )
        .unwrap_err();

    assert!(matches!(
        err.reject_reason(),
        Some(RejectReason::RowTypeMismatch { .. })
    ));
    assert_eq!(fx.board.snapshot().assignments().count(), 0);
    assert_eq!(fx.status("r-truck"), MagnetStatus::Available);
    assert_eq!(fx.board.pending_writes(), 0);
}

#[test]
fn a_full_row_rejects_the_next_drop() {
    let mut fx = Fixture::new();
    fx.board.upsert_resource(mb_core::Resource::new(
        "r-lab2",
        "Kit",
        mb_core::ResourceType::Laborer,
    ));
    for resource in ["r-op", "r-op2", "r-lab", "r-lab2"] {
        fx.assign(resource, "j-day", RowKind::Crew);
    }

    fx.board.upsert_resource(mb_core::Resource::new(
        "r-lab3",
        "Max",
        mb_core::ResourceType::Laborer,
    ));
    let err = fx
        .board
        .assign(
            &"r-lab3".into(),
            &"j-day".into(),
            RowKind::Crew,
            AssignOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err.reject_reason(),
        Some(RejectReason::RowFull { max: 4, .. })
    ));
}

#[test]
fn same_day_second_booking_needs_the_multi_shift_flag() {
    let mut fx = Fixture::new();
    let first = fx.assign("r-op", "j-day", RowKind::Crew);

    let err = fx
        .board
        .assign(
            &"r-op".into(),
            &"j-night".into(),
            RowKind::Equipment,
            AssignOptions::default(),
        )
        .unwrap_err();
    assert_eq!(
        err.reject_reason(),
        Some(&RejectReason::DoubleShiftConflict {
            conflicting_assignment: first,
        })
    );
    assert_eq!(fx.status("r-op"), MagnetStatus::Assigned);

    fx.board
        .assign(
            &"r-op".into(),
            &"j-night".into(),
            RowKind::Equipment,
            AssignOptions {
                multi_shift: true,
                position: None,
            },
        )
        .unwrap();
    assert_eq!(fx.status("r-op"), MagnetStatus::MultiAssigned);
}

#[test]
fn unassign_frees_the_magnet() {
    let mut fx = Fixture::new();
    let id = fx.assign("r-op", "j-day", RowKind::Crew);
    assert_eq!(fx.status("r-op"), MagnetStatus::Assigned);

    fx.board.unassign(&id).unwrap();
    assert_eq!(fx.status("r-op"), MagnetStatus::Available);
    assert!(fx.board.snapshot().assignment(&id).is_none());
}

#[test]
fn positions_follow_drop_order_within_a_row() {
    let mut fx = Fixture::new();
    let a = fx.assign("r-op", "j-day", RowKind::Crew);
    let b = fx.assign("r-lab", "j-day", RowKind::Crew);

    let listed = fx.board.assignments_for_job(&"j-day".into());
    let crew: Vec<_> = listed.iter().filter(|x| x.row == RowKind::Crew).collect();
    assert_eq!(crew[0].id, a);
    assert_eq!(crew[0].position, 0);
    assert_eq!(crew[1].id, b);
    assert_eq!(crew[1].position, 1);
}
