//! Attachment rule specs

use crate::prelude::*;

#[test]
fn operator_attaches_to_excavator() {
    let mut fx = Fixture::new();
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op", "j-day", RowKind::Equipment);

    fx.board.attach(&operator, &excavator).unwrap();

    let op = fx.board.snapshot().assignment(&operator).unwrap();
    assert_eq!(op.attached_to.as_ref(), Some(&excavator));
}

#[test]
fn a_second_operator_exceeds_the_max_count() {
    let mut fx = Fixture::new();
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let first = fx.assign("r-op", "j-day", RowKind::Equipment);
    let second = fx.assign("r-op2", "j-day", RowKind::Equipment);
    fx.board.attach(&first, &excavator).unwrap();

    let err = fx.board.attach(&second, &excavator).unwrap_err();
    assert!(matches!(
        err.reject_reason(),
        Some(RejectReason::MaxAttachmentExceeded { max: 1, .. })
    ));
    let kept = fx.board.snapshot().assignment(&second).unwrap();
    assert!(kept.attached_to.is_none());
}

#[test]
fn pairs_without_a_rule_never_attach() {
    let mut fx = Fixture::new();
    let truck = fx.assign("r-truck", "j-day", RowKind::Trucks);
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);

    // No excavator-on-truck rule exists, so the max is zero
    let err = fx.board.attach(&excavator, &truck).unwrap_err();
    assert!(matches!(
        err.reject_reason(),
        Some(RejectReason::MaxAttachmentExceeded { max: 0, .. })
    ));
}

#[test]
fn whitelisted_operator_is_refused_off_list_equipment() {
    let mut fx = Fixture::new();
    fx.board.upsert_resource(
        mb_core::Resource::new("r-op3", "Rio", mb_core::ResourceType::Operator)
            .with_allowed_equipment(vec![mb_core::ResourceType::Paver]),
    );
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op3", "j-day", RowKind::Equipment);

    let err = fx.board.attach(&operator, &excavator).unwrap_err();
    assert!(matches!(
        err.reject_reason(),
        Some(RejectReason::NotAuthorizedEquipment { .. })
    ));

    // The same operator is fine on listed equipment
    let paver = fx.assign("r-paver", "j-day", RowKind::Equipment);
    fx.board.attach(&operator, &paver).unwrap();
}

#[test]
fn attachments_never_cross_jobs() {
    let mut fx = Fixture::new();
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op", "j-night", RowKind::Equipment);

    let err = fx.board.attach(&operator, &excavator).unwrap_err();
    assert_eq!(
        err.reject_reason(),
        Some(&RejectReason::CrossJobAttachment)
    );
}

#[test]
fn attaching_an_ancestor_to_its_descendant_is_a_cycle() {
    let mut fx = Fixture::new();
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op", "j-day", RowKind::Equipment);
    fx.board.attach(&operator, &excavator).unwrap();

    let err = fx.board.attach(&excavator, &operator).unwrap_err();
    assert_eq!(err.reject_reason(), Some(&RejectReason::CycleDetected));
}

#[test]
fn truck_reassignment_brings_its_driver_back() {
    let mut fx = Fixture::new();
    let truck = fx.assign("r-truck", "j-day", RowKind::Trucks);
    let driver = fx.assign("r-driver", "j-day", RowKind::Trucks);
    fx.board.attach(&driver, &truck).unwrap();
    fx.board.unassign(&driver).unwrap();
    fx.board.unassign(&truck).unwrap();

    let outcome = fx
        .board
        .assign(
            &"r-truck".into(),
            &"j-day".into(),
            RowKind::Trucks,
            AssignOptions::default(),
        )
        .unwrap();

    let SecondaryOutcome::AutoAttached { driver, .. } = outcome.secondary else {
        panic!("expected auto-attach, got {:?}", outcome.secondary);
    };
    assert_eq!(driver, ResourceId::from("r-driver"));
    assert_eq!(fx.status("r-driver"), MagnetStatus::Assigned);
}
