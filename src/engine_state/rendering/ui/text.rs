//! Fixed-width bitmap text layout.
//!
//! Glyphs are 5 by 8 cells in the font atlas and are scaled so that a cell is `font_size`
//! pixels tall. Only ASCII is drawn; everything else shows up as `?`.

use super::primitives::{UiQuad, NO_GLYPH};

/// Glyph cell width relative to its height in the font atlas.
const GLYPH_ASPECT: (u32, u32) = (5, 8);

/// Cells a tab advances.
pub const TAB_WIDTH: i16 = 4;

/// Glyph drawn for characters outside the atlas.
const REPLACEMENT_GLYPH: u8 = b'?';

/// Pixel size of one glyph cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphCell {
    pub width: i16,
    pub height: i16,
}

impl GlyphCell {
    /// Cell size for a font size in pixels.
    pub fn for_font_size(font_size: u8) -> Self {
        let font_size = font_size as u32;
        Self {
            width: (font_size * GLYPH_ASPECT.0 / GLYPH_ASPECT.1) as i16,
            height: font_size as i16,
        }
    }
}

/// Atlas index for a character.
fn glyph_for(character: char) -> u8 {
    match character {
        '\0' => REPLACEMENT_GLYPH,
        c if c.is_ascii() => c as u8,
        _ => REPLACEMENT_GLYPH,
    }
}

/// Lays `text` out as one quad per visible glyph.
///
/// `\n` starts a new line at the original x; a `\r` is dropped, so `\r\n` is a single
/// break. `\t` advances [`TAB_WIDTH`] cells without drawing.
///
/// # Arguments
/// * `origin` - Top-left pixel of the first glyph
/// * `font_size` - Cell height in pixels
/// * `color` - RGBA bytes of every glyph
/// * `scissor` - Clip rect copied into every glyph
/// * `draw_order` - Order slot shared by all glyphs of the string
pub fn layout_text(
    text: &str,
    origin: (i16, i16),
    font_size: u8,
    color: [u8; 4],
    scissor: [i16; 4],
    draw_order: u16,
) -> Vec<UiQuad> {
    let cell = GlyphCell::for_font_size(font_size);
    let (mut x, mut y) = origin;
    let mut quads = Vec::with_capacity(text.len());

    for character in text.chars() {
        match character {
            '\r' => {}
            '\n' => {
                x = origin.0;
                y = y.saturating_add(cell.height);
            }
            '\t' => x = x.saturating_add(cell.width.saturating_mul(TAB_WIDTH)),
            _ => {
                quads.push(UiQuad {
                    rect: [x, y, cell.width, cell.height],
                    color,
                    glyph: glyph_for(character),
                    draw_order,
                    scissor,
                    ..Default::default()
                });
                x = x.saturating_add(cell.width);
            }
        }
    }

    debug_assert!(quads.iter().all(|quad| quad.glyph != NO_GLYPH));
    quads
}

/// Size in pixels `text` occupies when laid out with [`layout_text`].
///
/// # Returns
/// The widest line's width and the height of all lines
pub fn measure_text(text: &str, font_size: u8) -> (f32, f32) {
    let cell = GlyphCell::for_font_size(font_size);

    let (widest, lines) = text
        .split('\n')
        .map(|line| {
            line.chars()
                .map(|character| match character {
                    '\r' => 0,
                    '\t' => TAB_WIDTH as u32,
                    _ => 1,
                })
                .sum::<u32>()
        })
        .fold((0u32, 0u32), |(widest, lines), cells| {
            (widest.max(cells), lines + 1)
        });

    (
        (widest * cell.width as u32) as f32,
        (lines * cell.height as u32) as f32,
    )
}
