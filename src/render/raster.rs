use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::math::{premul_over_px, premultiply_rgba8_in_place};
use crate::render::frame::FrameRGBA;
use crate::text::engine::TextBrush;

/// CPU raster target for one image, drawn with `vello_cpu`.
///
/// Draw calls are recorded in order and resolved by [`Raster::finish`].
pub struct Raster {
    ctx: vello_cpu::RenderContext,
    canvas: Canvas,
    size: (u16, u16),
    fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl Raster {
    /// New transparent raster of `canvas` size.
    pub fn new(canvas: Canvas) -> SlidecastResult<Self> {
        let (w, h) = canvas.as_u16()?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            canvas,
            size: (w, h),
            fonts: HashMap::new(),
        })
    }

    /// Raster size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Fill the whole raster with an opaque color.
    pub fn fill_background(&mut self, rgb: Rgb8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(rgb.r, rgb.g, rgb.b, 255));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.canvas.width),
            f64::from(self.canvas.height),
        ));
    }

    /// Draw every glyph run of `layout` with its top-left corner at `(x, y)`.
    pub fn draw_layout(&mut self, layout: &parley::Layout<TextBrush>, x: f64, y: f64) {
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let font = {
                    let src = run.run().font();
                    let key = (src.data.id(), src.index);
                    self.fonts
                        .entry(key)
                        .or_insert_with(|| {
                            vello_cpu::peniko::FontData::new(
                                vello_cpu::peniko::Blob::from(src.data.data().to_vec()),
                                src.index,
                            )
                        })
                        .clone()
                };
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    /// Draw a straight-alpha RGBA8 image with its top-left corner at `(x, y)`.
    pub fn draw_image(
        &mut self,
        rgba_straight: &[u8],
        width: u32,
        height: u32,
        x: f64,
        y: f64,
    ) -> SlidecastResult<()> {
        let mut premul = rgba_straight.to_vec();
        premultiply_rgba8_in_place(&mut premul);
        let pixmap = pixmap_from_premul_bytes(&premul, width, height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));
        Ok(())
    }

    /// Resolve all draw calls into a premultiplied frame.
    pub fn finish(mut self) -> FrameRGBA {
        let (w, h) = self.size;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> SlidecastResult<vello_cpu::Pixmap> {
    let (w, h) = Canvas { width, height }.as_u16()?;
    if bytes.len() != (Canvas { width, height }).rgba_len() {
        return Err(SlidecastError::encoding("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Premultiplied sprite placed by integer offset.
#[derive(Clone, Debug)]
pub struct Sprite {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major.
    pub rgba8_premul: Vec<u8>,
}

/// Composite `sprite` over `dst` with its top-left at `(x, y)`, clipped to the frame.
pub fn blit_over(dst: &mut FrameRGBA, sprite: &Sprite, x: i64, y: i64) {
    let dw = i64::from(dst.width);
    let dh = i64::from(dst.height);
    let sw = i64::from(sprite.width);
    let sh = i64::from(sprite.height);

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + sw).min(dw);
    let y1 = (y + sh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for dy in y0..y1 {
        let sy = dy - y;
        for dx in x0..x1 {
            let sx = dx - x;
            let si = ((sy * sw + sx) * 4) as usize;
            let src = [
                sprite.rgba8_premul[si],
                sprite.rgba8_premul[si + 1],
                sprite.rgba8_premul[si + 2],
                sprite.rgba8_premul[si + 3],
            ];
            if src[3] == 0 {
                continue;
            }
            let di = ((dy * dw + dx) * 4) as usize;
            let cur = [
                dst.data[di],
                dst.data[di + 1],
                dst.data[di + 2],
                dst.data[di + 3],
            ];
            dst.data[di..di + 4].copy_from_slice(&premul_over_px(cur, src));
        }
    }
}
