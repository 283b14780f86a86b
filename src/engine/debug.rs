// Debug visualization for sprite sheets
//
// Draws every frame rectangle of a sheet with its 1-based index so an
// operator can pick frame ranges by eye. None of this is used at runtime.

use super::assets::{FrameRect, FrameTable, SpriteSheet};
use image::{Rgba, RgbaImage};
use std::fmt::Write;

/// 3x5 glyphs for the digits 0-9, one row per byte (low 3 bits used)
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;

/// Renders frame outlines and index labels on top of a sheet
#[derive(Debug, Clone)]
pub struct FrameGridOverlay {
    /// Outline color
    pub line_color: Rgba<u8>,
    /// Label color
    pub label_color: Rgba<u8>,
    /// Background behind labels, for legibility on busy frames
    pub label_background: Rgba<u8>,
    /// Pixel size of one glyph cell
    pub label_scale: u32,
}

impl Default for FrameGridOverlay {
    fn default() -> Self {
        Self {
            line_color: Rgba([255, 0, 255, 255]),
            label_color: Rgba([255, 255, 255, 255]),
            label_background: Rgba([0, 0, 0, 200]),
            label_scale: 1,
        }
    }
}

impl FrameGridOverlay {
    /// Pick a label size that suits the sheet's frame size
    pub fn for_sheet(sheet: &SpriteSheet) -> Self {
        let frame_height = sheet.frames().frame_height();
        Self {
            label_scale: (frame_height / 24).max(1),
            ..Self::default()
        }
    }

    /// Render the overlay onto a copy of the sheet
    pub fn render(&self, sheet: &SpriteSheet) -> RgbaImage {
        let mut canvas = sheet.image().clone();
        for frame in sheet.frames().frames() {
            self.draw_outline(&mut canvas, frame);
            self.draw_label(&mut canvas, frame);
        }
        canvas
    }

    fn draw_outline(&self, canvas: &mut RgbaImage, frame: &FrameRect) {
        let right = frame.x + frame.width - 1;
        let bottom = frame.y + frame.height - 1;

        for x in frame.x..=right {
            canvas.put_pixel(x, frame.y, self.line_color);
            canvas.put_pixel(x, bottom, self.line_color);
        }
        for y in frame.y..=bottom {
            canvas.put_pixel(frame.x, y, self.line_color);
            canvas.put_pixel(right, y, self.line_color);
        }
    }

    fn draw_label(&self, canvas: &mut RgbaImage, frame: &FrameRect) {
        let text = frame.index.to_string();
        let scale = self.label_scale;
        let advance = (GLYPH_WIDTH + 1) * scale;
        let label_width = advance * text.len() as u32 + scale;
        let label_height = (GLYPH_HEIGHT + 2) * scale;

        // Labels that don't fit inside the outline are skipped
        if label_width + 2 > frame.width || label_height + 2 > frame.height {
            return;
        }

        let origin_x = frame.x + 1;
        let origin_y = frame.y + 1;
        fill(canvas, origin_x, origin_y, label_width, label_height, self.label_background);

        for (i, digit) in text.bytes().enumerate() {
            let glyph = &DIGITS[(digit - b'0') as usize];
            let glyph_x = origin_x + scale + i as u32 * advance;
            let glyph_y = origin_y + scale;

            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (0b100 >> col) != 0 {
                        fill(
                            canvas,
                            glyph_x + col * scale,
                            glyph_y + row as u32 * scale,
                            scale,
                            scale,
                            self.label_color,
                        );
                    }
                }
            }
        }
    }
}

fn fill(canvas: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    for py in y..y + height {
        for px in x..x + width {
            canvas.put_pixel(px, py, color);
        }
    }
}

/// Text listing of the frame grid, one line per row
pub fn describe_grid(table: &FrameTable) -> String {
    let columns = table.columns();
    let rows = table.rows();
    let width = table.len().to_string().len().max(2);
    let rule = "=".repeat(columns as usize * (width + 2));

    let mut out = String::new();
    let _ = writeln!(out, "Frame grid ({} columns x {} rows):", columns, rows);
    let _ = writeln!(out, "{}", rule);

    for row in 0..rows {
        let _ = write!(out, "Row {}: ", row + 1);
        for column in 0..columns {
            if let Some(index) = table.index_at(column, row) {
                let _ = write!(out, "[{:>width$}]", index, width = width);
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Total frames: {} (numbering starts at 1)", table.len());
    out
}
