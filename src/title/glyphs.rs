use crate::foundation::core::Point;
use crate::render::frame::FrameRGBA;
use crate::render::raster::Sprite;

/// One letter-shaped element cut out of a rendered title.
#[derive(Clone, Debug)]
pub struct Glyph {
    /// Resting top-left position on the title canvas.
    pub origin: Point,
    /// Isolated pixels of this glyph only.
    pub sprite: Sprite,
}

#[derive(Clone, Copy, Debug)]
struct Bounds {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Bounds {
    fn area(&self) -> u64 {
        u64::from(self.x1 - self.x0 + 1) * u64::from(self.y1 - self.y0 + 1)
    }
}

/// Split a premultiplied frame into its visible connected components.
///
/// Pixels with non-zero alpha are grouped by 4-connectivity. Components whose bounding box
/// covers at most `min_area` pixels are dropped. The rest are ordered left to right by the
/// start of their bounding box and cut out with one pixel of transparent padding; each cut
/// keeps only the pixels of its own component.
pub fn find_glyphs(frame: &FrameRGBA, min_area: u64) -> Vec<Glyph> {
    let (w, h) = (frame.width as usize, frame.height as usize);
    let mut labels = vec![0u32; w * h];
    let mut bounds = Vec::<Bounds>::new();
    let mut stack = Vec::new();

    for start in 0..w * h {
        if labels[start] != 0 || frame.data[start * 4 + 3] == 0 {
            continue;
        }
        let label = bounds.len() as u32 + 1;
        let (sx, sy) = ((start % w) as u32, (start / w) as u32);
        let mut b = Bounds {
            x0: sx,
            y0: sy,
            x1: sx,
            y1: sy,
        };
        labels[start] = label;
        stack.push(start);

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            b.x0 = b.x0.min(x as u32);
            b.x1 = b.x1.max(x as u32);
            b.y0 = b.y0.min(y as u32);
            b.y1 = b.y1.max(y as u32);

            let mut visit = |n: usize| {
                if labels[n] == 0 && frame.data[n * 4 + 3] != 0 {
                    labels[n] = label;
                    stack.push(n);
                }
            };
            if x > 0 {
                visit(idx - 1);
            }
            if x + 1 < w {
                visit(idx + 1);
            }
            if y > 0 {
                visit(idx - w);
            }
            if y + 1 < h {
                visit(idx + w);
            }
        }
        bounds.push(b);
    }

    let mut kept: Vec<(u32, Bounds)> = bounds
        .into_iter()
        .enumerate()
        .filter(|(_, b)| b.area() > min_area)
        .map(|(i, b)| (i as u32 + 1, b))
        .collect();
    kept.sort_by_key(|(_, b)| b.x0);

    kept.into_iter()
        .map(|(label, b)| cut_component(frame, &labels, label, b))
        .collect()
}

fn cut_component(frame: &FrameRGBA, labels: &[u32], label: u32, b: Bounds) -> Glyph {
    let fw = frame.width as usize;
    let left = i64::from(b.x0) - 1;
    let top = i64::from(b.y0) - 1;
    let width = b.x1 - b.x0 + 3;
    let height = b.y1 - b.y0 + 3;

    let mut rgba8_premul = vec![0u8; width as usize * height as usize * 4];
    for y in b.y0..=b.y1 {
        for x in b.x0..=b.x1 {
            let src = y as usize * fw + x as usize;
            if labels[src] != label {
                continue;
            }
            let dx = (i64::from(x) - left) as usize;
            let dy = (i64::from(y) - top) as usize;
            let dst = (dy * width as usize + dx) * 4;
            rgba8_premul[dst..dst + 4].copy_from_slice(&frame.data[src * 4..src * 4 + 4]);
        }
    }

    Glyph {
        origin: Point::new(left as f64, top as f64),
        sprite: Sprite {
            width,
            height,
            rgba8_premul,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/title/glyphs.rs"]
mod tests;
