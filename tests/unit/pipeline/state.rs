use super::*;
use crate::foundation::error::ServiceKind;

#[test]
fn happy_path_transitions_are_legal() {
    let path = [
        PipelineState::Idle,
        PipelineState::ValidatingInput,
        PipelineState::RenderingTitle,
        PipelineState::RenderingSlides { index: 1 },
        PipelineState::RenderingSlides { index: 3 },
        PipelineState::Sequencing,
        PipelineState::Translating,
        PipelineState::Publishing,
        PipelineState::Done,
    ];
    for pair in path.windows(2) {
        assert!(pair[0].can_advance_to(&pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
    }
}

#[test]
fn skipping_and_going_back_are_illegal() {
    assert!(!PipelineState::Idle.can_advance_to(&PipelineState::RenderingTitle));
    assert!(
        !PipelineState::RenderingSlides { index: 2 }
            .can_advance_to(&PipelineState::RenderingSlides { index: 1 })
    );
    assert!(!PipelineState::Sequencing.can_advance_to(&PipelineState::RenderingTitle));
}

#[test]
fn failed_is_reachable_from_every_non_terminal_state() {
    let failed = PipelineState::Failed {
        stage: Stage::Sequencing,
        reason: "x".into(),
    };
    assert!(PipelineState::Idle.can_advance_to(&failed));
    assert!(PipelineState::Publishing.can_advance_to(&failed));
    assert!(!PipelineState::Done.can_advance_to(&failed));
    assert!(!failed.can_advance_to(&PipelineState::Idle));
}

#[test]
fn kinds_follow_the_error_taxonomy() {
    let svc = PipelineError::new(
        Stage::RenderingSlides,
        Some(SegmentRef::Slide(2)),
        SlidecastError::service(ServiceKind::Speech, "HTTP 500"),
    );
    assert_eq!(svc.kind(), ErrorKind::ExternalService);
    assert!(svc.to_string().contains("at slide 2"), "{svc}");

    let enc = PipelineError::new(Stage::Sequencing, None, SlidecastError::encoding("boom"));
    assert_eq!(enc.kind(), ErrorKind::Encoding);

    let val = PipelineError::new(Stage::Validating, None, SlidecastError::validation("no"));
    assert_eq!(val.kind(), ErrorKind::Validation);

    let publish = PipelineError::new(
        Stage::Publishing,
        None,
        SlidecastError::service(ServiceKind::Store, "down"),
    );
    assert_eq!(publish.kind(), ErrorKind::Persistence);
}

#[test]
fn state_serializes_with_tag() {
    let v = serde_json::to_value(PipelineState::RenderingSlides { index: 2 }).unwrap();
    assert_eq!(v["state"], "rendering_slides");
    assert_eq!(v["index"], 2);
}
