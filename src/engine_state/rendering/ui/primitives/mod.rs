//! UI primitive layouts shared between the CPU batcher and the UI shaders.
//!
//! Every quad the UI draws (filled rectangles, borders and text glyphs) is one
//! [`UiQuad`] instance expanded to a triangle strip in the vertex shader. Images are drawn
//! one at a time with their own [`UiImageUniforms`].

use crate::core::PoolId;

/// Value of [`UiQuad::glyph`] for quads that are not text.
pub const NO_GLYPH: u8 = 0;

/// One instanced UI quad, 48 bytes.
///
/// The `glyph`, padding and `draw_order` fields form a single little-endian `u32` the
/// shader unpacks: the glyph is the low byte, the draw order the high half.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UiQuad {
    /// x, y, width, height in pixels
    pub rect: [i16; 4],
    /// RGBA bytes
    pub color: [u8; 4],
    /// Top-left, top-right, bottom-left, bottom-right radius in pixels
    pub border_radius: [f32; 4],
    /// Left, right, top, bottom border in pixels; all zero draws a filled quad
    pub border_thickness: [u16; 4],
    /// ASCII code sampled from the font atlas, [`NO_GLYPH`] for plain quads
    pub glyph: u8,
    pub _pad: u8,
    /// Compositing order within the frame, later draws on top
    pub draw_order: u16,
    /// Clip rect as x, y, width, height; all zero disables clipping
    pub scissor: [i16; 4],
}

impl UiQuad {
    const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        0 => Sint16x4,
        1 => Unorm8x4,
        2 => Float32x4,
        3 => Uint16x4,
        4 => Uint32,
        5 => Sint16x4,
    ];

    /// Instance buffer layout matching `ui.wgsl`.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<UiQuad>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-image uniforms, 80 bytes, bound with a dynamic offset.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UiImageUniforms {
    pub rect: [f32; 4],
    /// Tint multiplied with the texture, channels in `0.0..=1.0`
    pub color: [f32; 4],
    pub border_radius: [f32; 4],
    pub scissor: [f32; 4],
    pub draw_order: u32,
    pub _pad: [u32; 3],
}

/// An image queued for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiImageDraw {
    pub uniforms: UiImageUniforms,
    pub texture: PoolId,
}

/// Values shared by every UI draw in a frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UiGlobals {
    /// Viewport width and height in pixels
    pub viewport: [f32; 2],
    pub _pad: [f32; 2],
}

impl UiGlobals {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: [width as f32, height as f32],
            _pad: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use super::*;

    #[test]
    fn layouts_match_the_shaders() {
        assert_eq!(size_of::<UiQuad>(), 48);
        assert_eq!(offset_of!(UiQuad, color), 8);
        assert_eq!(offset_of!(UiQuad, border_radius), 12);
        assert_eq!(offset_of!(UiQuad, border_thickness), 28);
        assert_eq!(offset_of!(UiQuad, glyph), 36);
        assert_eq!(offset_of!(UiQuad, draw_order), 38);
        assert_eq!(offset_of!(UiQuad, scissor), 40);

        assert_eq!(size_of::<UiImageUniforms>(), 80);
        assert_eq!(size_of::<UiGlobals>(), 16);
    }

    #[test]
    fn glyph_and_order_pack_into_one_word() {
        let quad = UiQuad {
            glyph: b'A',
            draw_order: 0x0102,
            ..Default::default()
        };
        let bytes = bytemuck::bytes_of(&quad);
        let word = u32::from_le_bytes([bytes[36], bytes[37], bytes[38], bytes[39]]);

        assert_eq!(word & 0xff, b'A' as u32);
        assert_eq!(word >> 16, 0x0102);
    }
}
