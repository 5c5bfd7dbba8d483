use super::*;

fn slide(content: &str, desc: &str) -> Slide {
    Slide {
        content: content.to_string(),
        image_description: desc.to_string(),
    }
}

#[test]
fn missing_description_names_the_slide() {
    let slides = vec![
        slide("Photosynthesis converts light into energy", "a green leaf diagram"),
        slide("Chlorophyll absorbs red and blue light", ""),
    ];
    let err = validate_slides(&slides, 480).unwrap_err();
    assert_eq!(err.number, Some(2));
    assert!(matches!(err.error, SlidecastError::Validation(_)));
    assert!(err.to_string().contains("slide 2"), "{err}");
}

#[test]
fn blank_slides_are_skipped_but_keep_numbering() {
    let slides = vec![
        slide("   ", ""),
        slide("Light reactions happen in the thylakoid", "thylakoid stack"),
    ];
    let ok = validate_slides(&slides, 480).unwrap();
    assert_eq!(ok.len(), 1);
    assert_eq!(ok[0].number, 2);
}

#[test]
fn all_blank_is_rejected() {
    let slides = vec![slide("", "x"), slide(" ", "")];
    assert_eq!(validate_slides(&slides, 480).unwrap_err().number, None);
    assert_eq!(validate_slides(&[], 480).unwrap_err().number, None);
}

#[test]
fn overlong_content_is_rejected() {
    let long = "a".repeat(481);
    assert!(Slide::new(long.clone(), "desc", 480).is_err());
    let err = validate_slides(&[slide(&long, "desc")], 480).unwrap_err();
    assert_eq!(err.number, Some(1));
    assert!(err.to_string().contains("slide 1"));
    assert!(Slide::new("a".repeat(480), "desc", 480).is_ok());
}

#[test]
fn deserializes_without_description() {
    let s: Slide = serde_json::from_str(r#"{ "content": "hello" }"#).unwrap();
    assert_eq!(s.image_description, "");
}
