//! Finalization specs

use crate::prelude::*;

#[test]
fn finalize_reports_every_missing_attachment_at_once() {
    let mut fx = Fixture::new();
    fx.board.upsert_resource(mb_core::Resource::new(
        "r-exc2",
        "EX-19",
        mb_core::ResourceType::Excavator,
    ));
    let first = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let second = fx.assign("r-exc2", "j-day", RowKind::Equipment);

    let err = fx.board.finalize_job(&"j-day".into()).unwrap_err();
    let Some(RejectReason::MissingRequiredAttachment(violations)) = err.reject_reason() else {
        panic!("expected finalization violations, got {err:?}");
    };
    let mut flagged: Vec<_> = violations.iter().map(|v| v.assignment_id.clone()).collect();
    flagged.sort();
    let mut expected = vec![first.clone(), second.clone()];
    expected.sort();
    assert_eq!(flagged, expected);
    assert!(!fx.board.snapshot().job(&"j-day".into()).unwrap().finalized);
}

#[test]
fn finalize_succeeds_once_requirements_are_met() {
    let mut fx = Fixture::new();
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op", "j-day", RowKind::Equipment);
    fx.board.attach(&operator, &excavator).unwrap();

    fx.board.finalize_job(&"j-day".into()).unwrap();
    assert!(fx.board.snapshot().job(&"j-day".into()).unwrap().finalized);
}

#[test]
fn unfinalize_reopens_without_preconditions() {
    let mut fx = Fixture::new();
    let excavator = fx.assign("r-exc", "j-day", RowKind::Equipment);
    let operator = fx.assign("r-op", "j-day", RowKind::Equipment);
    fx.board.attach(&operator, &excavator).unwrap();
    fx.board.finalize_job(&"j-day".into()).unwrap();

    fx.board.unfinalize_job(&"j-day".into()).unwrap();
    assert!(!fx.board.snapshot().job(&"j-day".into()).unwrap().finalized);
}

#[test]
fn a_job_with_no_required_pairs_finalizes_trivially() {
    let mut fx = Fixture::new();
    fx.assign("r-lab", "j-day", RowKind::Crew);

    fx.board.finalize_job(&"j-day".into()).unwrap();
    assert!(fx.board.snapshot().job(&"j-day".into()).unwrap().finalized);
}

#[test]
fn violation_preview_does_not_mutate() {
    let mut fx = Fixture::new();
    fx.assign("r-exc", "j-day", RowKind::Equipment);

    let violations = fx.board.finalize_violations(&"j-day".into()).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].missing_type,
        mb_core::ResourceType::Operator
    );
    assert!(!fx.board.snapshot().job(&"j-day".into()).unwrap().finalized);
}
