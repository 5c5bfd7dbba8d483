use std::borrow::Cow;
use std::path::Path;

use crate::foundation::core::Rgb8;
use crate::text::layout::FontMetrics;

/// Family used when no font file is configured or it cannot be loaded.
pub const FALLBACK_FAMILY: &str = "sans-serif";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrush {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgb8> for TextBrush {
    fn from(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }
}

/// Size, spacing and color of a run of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size_px: f32,
    /// Extra advance between letters.
    pub letter_spacing: f32,
    /// Fill color.
    pub brush: TextBrush,
}

/// Stateful helper for building Parley text layouts.
///
/// Holds one resolved font family: the family registered from a font file, or
/// [`FALLBACK_FAMILY`] from the system collection.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family: String,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TextEngine {
    /// Construct an engine, registering `font_path` when it is given and readable.
    ///
    /// A missing or unparsable font falls back to the system `sans-serif` family.
    pub fn new(font_path: Option<&Path>) -> Self {
        let mut font_ctx = parley::FontContext::default();
        let family = match font_path {
            None => FALLBACK_FAMILY.to_string(),
            Some(path) => match register_font_file(&mut font_ctx, path) {
                Ok(name) => name,
                Err(reason) => {
                    tracing::warn!(
                        font = %path.display(),
                        %reason,
                        "font unavailable, falling back to {FALLBACK_FAMILY}"
                    );
                    FALLBACK_FAMILY.to_string()
                }
            },
        };

        Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
        }
    }

    /// Name of the family every layout uses.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Shape and lay out `text` on a single unbounded line.
    pub fn layout_line(&mut self, text: &str, style: TextStyle) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(
            style.letter_spacing,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(style.brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Borrow the engine as [`FontMetrics`] for one style.
    pub fn metrics(&mut self, style: TextStyle) -> EngineMetrics<'_> {
        EngineMetrics {
            engine: self,
            style,
        }
    }
}

/// [`FontMetrics`] backed by real shaping.
pub struct EngineMetrics<'a> {
    engine: &'a mut TextEngine,
    style: TextStyle,
}

impl FontMetrics for EngineMetrics<'_> {
    fn measure(&mut self, text: &str) -> f32 {
        self.engine.layout_line(text, self.style).width()
    }
}

fn register_font_file(font_ctx: &mut parley::FontContext, path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| "no font families registered from font bytes".to_string())?;
    font_ctx
        .collection
        .family_name(family_id)
        .map(str::to_string)
        .ok_or_else(|| "registered font family has no name".to_string())
}
