//! Texture compositor for solved assignments.
//!
//! Paints each cell's detailed grid into the cell's UV quad of an RGBA
//! texture. Texels are mapped bilinearly from the unit square onto the quad
//! corners and splatted with enough sub-samples to leave no holes. UV `v`
//! runs up while image rows run down, so rows are flipped.

use crate::cells::CellGraph;
use crate::rules::RuleCatalog;
use crate::wfc::Assignment;
use bevy_math::Vec2;
use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::Path;

/// Texture background where no cell paints (dark gray).
pub const BACKGROUND: [u8; 4] = [34, 34, 34, 255];

/// Point of the quad `corners` (BL, BR, TR, TL) at local coordinates `(u, v)`.
#[inline]
fn bilinear(corners: &[Vec2; 4], u: f32, v: f32) -> Vec2 {
    corners[0] * ((1.0 - u) * (1.0 - v))
        + corners[1] * (u * (1.0 - v))
        + corners[2] * (u * v)
        + corners[3] * ((1.0 - u) * v)
}

/// Paint `assignment` into a `width x height` texture.
pub fn paint_assignment(
    graph: &CellGraph,
    catalog: &RuleCatalog,
    assignment: &Assignment,
    width: u32,
    height: u32,
) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba(BACKGROUND));
    let size = Vec2::new(width as f32, height as f32);

    for (cell_id, rule_id) in assignment.iter() {
        let Some(rule) = catalog.get(rule_id) else {
            continue;
        };
        let cell = graph.cell(cell_id);
        let grid = rule.detailed();
        let n = grid.size();
        if n == 0 {
            continue;
        }

        // Longest quad edge in pixels decides how finely each texel is sampled
        let extent = (0..4)
            .map(|i| ((cell.corners[(i + 1) % 4] - cell.corners[i]) * size).length())
            .fold(0.0f32, f32::max);
        let sub = ((2.0 * extent / n as f32).ceil() as usize).max(1);
        let step = 1.0 / (n * sub) as f32;

        for y in 0..n {
            for x in 0..n {
                let color = grid.get(x, y);
                if color[3] == 0 {
                    continue;
                }
                for sy in 0..sub {
                    for sx in 0..sub {
                        let u = ((x * sub + sx) as f32 + 0.5) * step;
                        let v = ((y * sub + sy) as f32 + 0.5) * step;
                        let uv = bilinear(&cell.corners, u, v);
                        let px = (uv.x * size.x).floor();
                        let py = ((1.0 - uv.y) * size.y).floor();
                        if px >= 0.0 && py >= 0.0 && px < size.x && py < size.y {
                            img.put_pixel(px as u32, py as u32, Rgba(color));
                        }
                    }
                }
            }
        }
    }

    img
}

/// Save an RGBA image to a PNG file.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<(), image::ImageError> {
    img.save(path)
}
