use super::*;
use proptest::prelude::*;

fn fixed() -> FixedAdvance {
    FixedAdvance { advance: 10.0 }
}

#[test]
fn empty_input_is_one_empty_line() {
    let lines = wrap_text("", 100.0, &mut fixed());
    assert_eq!(lines, vec![TextLine::default()]);
    let lines = wrap_text("   ", 100.0, &mut fixed());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].is_empty());
}

#[test]
fn greedy_fill_breaks_on_overflow() {
    // "aaa bbb" is 70px, "aaa bbb ccc" is 110px.
    let lines = wrap_text("aaa bbb ccc dd", 100.0, &mut fixed());
    let texts: Vec<String> = lines.iter().map(TextLine::text).collect();
    assert_eq!(texts, vec!["aaa bbb", "ccc dd"]);
}

#[test]
fn oversized_word_sits_alone() {
    let lines = wrap_text("a abcdefghijklmnop b", 50.0, &mut fixed());
    let texts: Vec<String> = lines.iter().map(TextLine::text).collect();
    assert_eq!(texts, vec!["a", "abcdefghijklmnop", "b"]);
}

#[test]
fn oversized_first_word_does_not_emit_empty_line() {
    let lines = wrap_text("abcdefghij xy", 50.0, &mut fixed());
    assert!(lines.iter().all(|l| !l.is_empty()));
    assert_eq!(lines[0].text(), "abcdefghij");
}

#[test]
fn short_title_is_single_line() {
    assert_eq!(split_title("Photosynthesis", 25), vec!["Photosynthesis"]);
    assert_eq!(
        split_title("exactly twenty-five chars", 25),
        vec!["exactly twenty-five chars"]
    );
}

#[test]
fn long_title_splits_at_last_space_before_threshold() {
    let lines = split_title("The Calvin Cycle and Light Reactions", 25);
    assert_eq!(lines, vec!["The Calvin Cycle and", "Light Reactions"]);
}

#[test]
fn long_title_without_space_cuts_at_threshold() {
    let lines = split_title("abcdefghijklmnopqrstuvwxyz0123", 25);
    assert_eq!(lines, vec!["abcdefghijklmnopqrstuvwxy", "z0123"]);
}

#[test]
fn split_counts_characters_not_bytes() {
    let title = "प्रकाश संश्लेषण की प्रक्रिया और ऊर्जा";
    let lines = split_title(title, 25);
    assert_eq!(lines.len(), 2);
    assert_eq!(format!("{} {}", lines[0], lines[1]), title);
}

proptest! {
    #[test]
    fn wrapped_lines_fit_unless_single_word(
        words in proptest::collection::vec("[a-z]{1,14}", 0..40),
        max_width in 20.0f32..400.0,
    ) {
        let text = words.join(" ");
        let mut m = fixed();
        let lines = wrap_text(&text, max_width, &mut m);
        prop_assert!(!lines.is_empty());
        for line in &lines {
            let w = m.measure(&line.text());
            prop_assert!(w <= max_width || line.words.len() == 1);
        }
        let rejoined: Vec<String> = lines.iter().flat_map(|l| l.words.clone()).collect();
        prop_assert_eq!(rejoined, words);
    }

    #[test]
    fn split_title_preserves_words(title in "[a-z]{1,10}( [a-z]{1,10}){0,6}") {
        let lines = split_title(&title, 25);
        prop_assert!(lines.len() == 1 || lines.len() == 2);
        prop_assert_eq!(lines.join(" "), title);
    }
}
