//! Confusion matrix heatmap rendered to PNG
//!
//! Rows are true labels, columns are predicted labels. Each cell is shaded on
//! a white-to-blue scale by its count and annotated with the count; row and
//! column headers show the class index into `ConfusionMatrix::labels`. A `P`
//! caption marks the predicted axis along the top and an `A` caption marks the
//! actual axis along the left.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::artifacts::ensure_parent_dir;
use crate::error::Result;
use crate::report::ConfusionMatrix;

const CELL: u32 = 80;
const AXIS: u32 = 30;
const MARGIN: u32 = 40;
/// Offset of the first cell from the top and left edges
const ORIGIN: u32 = AXIS + MARGIN;
const PADDING: u32 = 10;
const GLYPH_SCALE: u32 = 3;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([200, 200, 200]);
const DARK_TEXT: Rgb<u8> = Rgb([20, 20, 20]);
const LIGHT_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const LOW: [f64; 3] = [247.0, 251.0, 255.0];
const HIGH: [f64; 3] = [8.0, 48.0, 107.0];

// 3x5 bitmap digits, one row per entry, high bit on the left
const GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

const GLYPH_P: [u8; 5] = [0b111, 0b101, 0b111, 0b100, 0b100];
const GLYPH_A: [u8; 5] = [0b010, 0b101, 0b111, 0b101, 0b101];

/// Blend between the low and high colors, `t` in [0, 1]
fn shade(t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = (LOW[i] + (HIGH[i] - LOW[i]) * t).round() as u8;
    }
    Rgb(rgb)
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

/// Draw a row of glyphs centered on `(cx, cy)`
fn draw_glyphs(img: &mut RgbImage, glyphs: &[[u8; 5]], cx: u32, cy: u32, color: Rgb<u8>) {
    let advance = 4 * GLYPH_SCALE;
    let width = glyphs.len() as u32 * advance - GLYPH_SCALE;
    let left = cx.saturating_sub(width / 2);
    let top = cy.saturating_sub(5 * GLYPH_SCALE / 2);

    for (i, glyph) in glyphs.iter().enumerate() {
        let x0 = left + i as u32 * advance;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..3u32 {
                if bits & (0b100 >> col) != 0 {
                    fill_rect(
                        img,
                        x0 + col * GLYPH_SCALE,
                        top + row as u32 * GLYPH_SCALE,
                        GLYPH_SCALE,
                        GLYPH_SCALE,
                        color,
                    );
                }
            }
        }
    }
}

/// Draw a non-negative integer centered on `(cx, cy)`
fn draw_number(img: &mut RgbImage, value: usize, cx: u32, cy: u32, color: Rgb<u8>) {
    let glyphs: Vec<[u8; 5]> = value
        .to_string()
        .bytes()
        .map(|b| GLYPHS[(b - b'0') as usize])
        .collect();
    draw_glyphs(img, &glyphs, cx, cy, color);
}

/// Render the heatmap into an in-memory image
pub fn render_confusion_matrix(cm: &ConfusionMatrix) -> RgbImage {
    let k = cm.labels.len() as u32;
    let side = ORIGIN + k * CELL + PADDING;
    let mut img = RgbImage::from_pixel(side, side, BACKGROUND);
    let max = cm.max_count().max(1) as f64;

    for (i, row) in cm.counts.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            let x = ORIGIN + j as u32 * CELL;
            let y = ORIGIN + i as u32 * CELL;
            let t = count as f64 / max;
            fill_rect(&mut img, x, y, CELL, CELL, shade(t));
            let text = if t > 0.5 { LIGHT_TEXT } else { DARK_TEXT };
            draw_number(&mut img, count, x + CELL / 2, y + CELL / 2, text);
        }
    }

    // Grid lines
    for line in 0..=k {
        let offset = ORIGIN + line * CELL;
        fill_rect(&mut img, offset.min(side - 1), ORIGIN, 1, k * CELL, GRID);
        fill_rect(&mut img, ORIGIN, offset.min(side - 1), k * CELL, 1, GRID);
    }

    // Axis captions centered on the grid
    let grid_center = ORIGIN + k * CELL / 2;
    draw_glyphs(&mut img, &[GLYPH_P], grid_center, AXIS / 2, DARK_TEXT);
    draw_glyphs(&mut img, &[GLYPH_A], AXIS / 2, grid_center, DARK_TEXT);

    // Class index headers: predicted along the top, true along the left
    for idx in 0..k {
        let center = ORIGIN + idx * CELL + CELL / 2;
        draw_number(&mut img, idx as usize, center, AXIS + MARGIN / 2, DARK_TEXT);
        draw_number(&mut img, idx as usize, AXIS + MARGIN / 2, center, DARK_TEXT);
    }

    img
}

/// Render the heatmap and save it as PNG at `path`
pub fn save_confusion_matrix(cm: &ConfusionMatrix, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    render_confusion_matrix(cm).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_follows_class_count() {
        let cm = ConfusionMatrix {
            labels: vec!["0".into(), "1".into(), "2".into()],
            counts: vec![vec![10, 0, 0], vec![0, 9, 1], vec![0, 0, 10]],
        };
        let img = render_confusion_matrix(&cm);
        assert_eq!(img.width(), ORIGIN + 3 * CELL + PADDING);
        assert_eq!(img.height(), img.width());
    }

    #[test]
    fn test_highest_count_cell_is_darkest() {
        let cm = ConfusionMatrix {
            labels: vec!["a".into(), "b".into()],
            counts: vec![vec![5, 0], vec![0, 0]],
        };
        let img = render_confusion_matrix(&cm);
        // Top-left corner of each cell avoids the digit glyphs
        let full = img.get_pixel(ORIGIN + 2, ORIGIN + 2);
        let empty = img.get_pixel(ORIGIN + CELL + 2, ORIGIN + CELL + 2);
        assert_eq!(*full, shade(1.0));
        assert_eq!(*empty, shade(0.0));
    }

    #[test]
    fn test_axis_captions_are_drawn() {
        let cm = ConfusionMatrix {
            labels: vec!["setosa".into(), "virginica".into()],
            counts: vec![vec![3, 1], vec![0, 4]],
        };
        let img = render_confusion_matrix(&cm);
        let grid_center = ORIGIN + CELL;

        // Top-left stroke of "P" above the grid, left stroke of "A" beside it
        let p_left = grid_center - (3 * GLYPH_SCALE) / 2;
        let p_top = AXIS / 2 - (5 * GLYPH_SCALE) / 2;
        assert_eq!(*img.get_pixel(p_left, p_top), DARK_TEXT);

        let a_left = AXIS / 2 - (3 * GLYPH_SCALE) / 2;
        let a_bottom = grid_center - (5 * GLYPH_SCALE) / 2 + 4 * GLYPH_SCALE;
        assert_eq!(*img.get_pixel(a_left, a_bottom), DARK_TEXT);

        // Caption bands stay clear of cell shading
        assert_eq!(*img.get_pixel(1, 1), BACKGROUND);
    }
}
