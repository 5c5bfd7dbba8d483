/// Measures the rendered width of a run of text.
///
/// Implementations must be monotone in practice: appending a word never makes a line narrower.
pub trait FontMetrics {
    /// Width in pixels of `text` rendered on one line.
    fn measure(&mut self, text: &str) -> f32;
}

/// Fixed per-character advance. Deterministic stand-in for a real font.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvance {
    /// Advance of every character, including spaces.
    pub advance: f32,
}

impl FontMetrics for FixedAdvance {
    fn measure(&mut self, text: &str) -> f32 {
        self.advance * text.chars().count() as f32
    }
}

/// One wrapped line: the words it holds, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextLine {
    /// Words on this line.
    pub words: Vec<String>,
}

impl TextLine {
    /// Words joined by single spaces.
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    /// Return `true` for the empty line produced by empty input.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Greedy line fill by measured width.
///
/// Words are accumulated while the tentative line measures at most `max_width`. A word that
/// overflows closes the current line and starts the next one. Words are never split, so a word
/// wider than `max_width` sits alone on its own line. Empty input yields one empty line.
pub fn wrap_text(text: &str, max_width: f32, metrics: &mut dyn FontMetrics) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut current = TextLine::default();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.words.push(word.to_string());
            continue;
        }

        let candidate = format!("{} {word}", current.text());
        if metrics.measure(&candidate) <= max_width {
            current.words.push(word.to_string());
        } else {
            lines.push(std::mem::take(&mut current));
            current.words.push(word.to_string());
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Two-line title splitter.
///
/// Text of at most `max_chars` characters stays on one line. Longer text is split once, at the
/// last space inside the first `max_chars` characters; the second line is the trimmed
/// remainder. Without such a space the cut falls at `max_chars`.
pub fn split_title(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let prefix = &text[..cut];
    let first = match prefix.rsplit_once(' ') {
        Some((head, _)) if !head.trim().is_empty() => head.trim_end(),
        _ => prefix,
    };
    let second = text[first.len()..].trim();
    vec![first.to_string(), second.to_string()]
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
