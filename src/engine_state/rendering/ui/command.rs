//! Declarative UI draw commands.
//!
//! A layout engine produces one ordered list of [`RenderCommand`]s per frame. Each command
//! carries the screen-space box it occupies and a payload describing what to draw there.

use crate::core::PoolId;

/// Screen-space box in pixels, origin at the top-left of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box rounded into the signed 16-bit pixel grid the GPU instances use.
    ///
    /// Values outside the `i16` range saturate.
    pub fn to_pixel_rect(&self) -> [i16; 4] {
        [
            saturate_i16(self.x),
            saturate_i16(self.y),
            saturate_i16(self.width),
            saturate_i16(self.height),
        ]
    }
}

/// `as` casts from float saturate and map NaN to zero.
pub(crate) fn saturate_i16(value: f32) -> i16 {
    value as i16
}

/// An RGBA colour with channels on the `0..=255` scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255.0, 255.0, 255.0, 255.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels packed into bytes, saturating out-of-range values.
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.r as u8, self.g as u8, self.b as u8, self.a as u8]
    }

    /// Channels normalised to `0.0..=1.0`.
    pub fn to_normalized(&self) -> [f32; 4] {
        self.to_bytes().map(|channel| channel as f32 / 255.0)
    }
}

/// Per-corner rounding radius in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

impl CornerRadius {
    pub const fn all(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_left: radius,
            bottom_right: radius,
        }
    }

    /// Radii limited to half the smaller side of a `width` by `height` box.
    pub fn clamped(&self, width: i16, height: i16) -> [f32; 4] {
        let max_radius = width.min(height) as f32 * 0.5;
        [
            self.top_left.min(max_radius),
            self.top_right.min(max_radius),
            self.bottom_left.min(max_radius),
            self.bottom_right.min(max_radius),
        ]
    }
}

/// Border thickness in pixels for each edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderWidth {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
}

impl BorderWidth {
    pub const fn all(width: u16) -> Self {
        Self {
            left: width,
            right: width,
            top: width,
            bottom: width,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0 && self.right == 0 && self.top == 0 && self.bottom == 0
    }

    pub fn to_array(&self) -> [u16; 4] {
        [self.left, self.right, self.top, self.bottom]
    }
}

/// What a command draws.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderData {
    /// Occupies layout space without drawing.
    None,
    Rectangle {
        background_color: Color,
        corner_radius: CornerRadius,
    },
    Border {
        color: Color,
        corner_radius: CornerRadius,
        width: BorderWidth,
    },
    /// Bitmap text drawn from the top-left of the bounding box.
    Text {
        text: String,
        font_size: u16,
        text_color: Color,
    },
    /// A registered texture stretched over the bounding box.
    Image {
        texture: PoolId,
        background_color: Color,
        corner_radius: CornerRadius,
    },
    /// Clips following commands to the bounding box.
    ScissorStart,
    /// Ends the innermost clip.
    ScissorEnd,
    /// Application-defined drawing.
    Custom,
}

/// One entry of a frame's UI command list.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    pub bounding_box: BoundingBox,
    pub data: RenderData,
}

impl RenderCommand {
    pub fn new(bounding_box: BoundingBox, data: RenderData) -> Self {
        Self { bounding_box, data }
    }

    pub fn rectangle(bounding_box: BoundingBox, background_color: Color) -> Self {
        Self::new(
            bounding_box,
            RenderData::Rectangle {
                background_color,
                corner_radius: CornerRadius::default(),
            },
        )
    }

    pub fn text(position: (f32, f32), text: impl Into<String>, font_size: u16, color: Color) -> Self {
        Self::new(
            BoundingBox::new(position.0, position.1, 0.0, 0.0),
            RenderData::Text {
                text: text.into(),
                font_size,
                text_color: color,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_rect_saturates() {
        let bounding_box = BoundingBox::new(40_000.0, -40_000.0, 12.7, f32::NAN);
        assert_eq!(bounding_box.to_pixel_rect(), [i16::MAX, i16::MIN, 12, 0]);
    }

    #[test]
    fn radii_clamp_to_half_the_short_side() {
        let radius = CornerRadius {
            top_left: 2.0,
            top_right: 50.0,
            bottom_left: 0.0,
            bottom_right: 9.0,
        };
        assert_eq!(radius.clamped(40, 16), [2.0, 8.0, 0.0, 8.0]);
    }

    #[test]
    fn colors_normalise_from_byte_scale() {
        let color = Color::rgba(255.0, 0.0, 51.0, 300.0);
        assert_eq!(color.to_bytes(), [255, 0, 51, 255]);
        assert_eq!(color.to_normalized(), [1.0, 0.0, 0.2, 1.0]);
    }
}
