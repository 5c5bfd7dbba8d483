use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// One slide of a lecture: narration text plus a description of its illustration.
///
/// A slide whose `content` is blank is kept in the list but skipped by the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Narration text, drawn on the slide and spoken over it.
    pub content: String,
    /// Prompt for the illustration.
    #[serde(default)]
    pub image_description: String,
}

impl Slide {
    /// Build a slide, rejecting narration longer than `max_chars` characters.
    pub fn new(
        content: impl Into<String>,
        image_description: impl Into<String>,
        max_chars: usize,
    ) -> SlidecastResult<Self> {
        let slide = Self {
            content: content.into(),
            image_description: image_description.into(),
        };
        slide.check_length(max_chars)?;
        Ok(slide)
    }

    /// Whether the pipeline renders this slide.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    fn check_length(&self, max_chars: usize) -> SlidecastResult<()> {
        let n = self.content.chars().count();
        if n > max_chars {
            return Err(SlidecastError::validation(format!(
                "slide content has {n} characters, limit is {max_chars}"
            )));
        }
        Ok(())
    }
}

/// A slide that passed validation, with its 1-based position in the caller's list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberedSlide<'a> {
    /// 1-based position in the submitted slide list.
    pub number: usize,
    /// The slide itself.
    pub slide: &'a Slide,
}

/// A slide list that failed [`validate_slides`].
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct InvalidSlides {
    /// 1-based position of the offending slide, `None` when the list as a whole is unusable.
    pub number: Option<usize>,
    /// What was wrong.
    pub error: SlidecastError,
}

impl InvalidSlides {
    fn at(number: usize, msg: impl std::fmt::Display) -> Self {
        Self {
            number: Some(number),
            error: SlidecastError::validation(format!("slide {number}: {msg}")),
        }
    }
}

/// Check a slide list before any work is done and return the slides to render.
///
/// Requires at least one slide with content. Every slide with content needs an image
/// description and must fit in `max_chars`. Blank slides are dropped from the result; numbering
/// in the result and in errors refers to positions in `slides`.
pub fn validate_slides(
    slides: &[Slide],
    max_chars: usize,
) -> Result<Vec<NumberedSlide<'_>>, InvalidSlides> {
    let mut out = Vec::new();
    for (i, slide) in slides.iter().enumerate() {
        let number = i + 1;
        if !slide.has_content() {
            continue;
        }
        if slide.image_description.trim().is_empty() {
            return Err(InvalidSlides::at(number, "has content but no image description"));
        }
        slide
            .check_length(max_chars)
            .map_err(|e| InvalidSlides::at(number, e))?;
        out.push(NumberedSlide { number, slide });
    }

    if out.is_empty() {
        return Err(InvalidSlides {
            number: None,
            error: SlidecastError::validation("at least one slide must have content"),
        });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/slide/model.rs"]
mod tests;
