//! Group move specs

use crate::prelude::*;

#[test]
fn moving_equipment_carries_attached_employees() {
    let mut fx = Fixture::new();
    fx.board.upsert_job(mb_core::Job::new(
        "j-day-2",
        "Shoulder rebuild",
        mb_core::JobType::Paving,
        mb_core::Shift::Day,
        crate::prelude::date(),
    ));
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op", "j-day", RowKind::Equipment);
    fx.board.attach(&operator, &excavator).unwrap();

    fx.board
        .move_assignment(&excavator, &"j-day-2".into(), RowKind::Equipment)
        .unwrap();

    for id in [&excavator, &operator] {
        let moved = fx.board.snapshot().assignment(id).unwrap();
        assert_eq!(moved.job_id, JobId::from("j-day-2"));
    }
    let op = fx.board.snapshot().assignment(&operator).unwrap();
    assert_eq!(op.attached_to.as_ref(), Some(&excavator));
}

#[test]
fn the_whole_group_must_fit_the_target_row() {
    let mut fx = Fixture::new();
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op", "j-day", RowKind::Equipment);
    fx.board.attach(&operator, &excavator).unwrap();

    // Crew takes operators but not excavators; no member may move
    let err = fx
        .board
        .move_assignment(&excavator, &"j-day".into(), RowKind::Crew)
        .unwrap_err();
    assert!(matches!(
        err.reject_reason(),
        Some(RejectReason::RowTypeMismatch { .. })
    ));

    let root = fx.board.snapshot().assignment(&excavator).unwrap();
    assert_eq!(root.row, RowKind::Equipment);
    let child = fx.board.snapshot().assignment(&operator).unwrap();
    assert_eq!(child.attached_to.as_ref(), Some(&excavator));
}

#[test]
fn moving_a_child_detaches_it_from_the_parent_left_behind() {
    let mut fx = Fixture::new();
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op", "j-day", RowKind::Equipment);
    fx.board.attach(&operator, &excavator).unwrap();

    fx.board
        .move_assignment(&operator, &"j-day".into(), RowKind::Crew)
        .unwrap();

    let op = fx.board.snapshot().assignment(&operator).unwrap();
    assert!(op.attached_to.is_none());
    assert_eq!(op.row, RowKind::Crew);
    let exc = fx.board.snapshot().assignment(&excavator).unwrap();
    assert_eq!(exc.row, RowKind::Equipment);
}

#[test]
fn a_move_within_the_row_does_not_collide_with_itself() {
    let mut fx = Fixture::new();
    fx.board.upsert_resource(mb_core::Resource::new(
        "r-lab2",
        "Kit",
        mb_core::ResourceType::Laborer,
    ));
    // Fill crew to its max of four
    for resource in ["r-op", "r-op2", "r-lab", "r-lab2"] {
        fx.assign(resource, "j-day", RowKind::Crew);
    }
    let first = fx.board.assignments_for_job(&"j-day".into())[0].id.clone();

    // Relocating a member inside the full row is not an overflow
    fx.board
        .move_assignment(&first, &"j-day".into(), RowKind::Crew)
        .unwrap();
}
