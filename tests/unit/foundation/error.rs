use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SlidecastError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SlidecastError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(
        SlidecastError::persistence("x")
            .to_string()
            .contains("persistence error:")
    );
    assert!(
        SlidecastError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn service_errors_name_the_collaborator() {
    let err = SlidecastError::service(ServiceKind::Translation, "HTTP 503");
    assert!(err.is_service());
    assert_eq!(err.to_string(), "translation service error: HTTP 503");
    assert!(!SlidecastError::encoding("x").is_service());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SlidecastError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
