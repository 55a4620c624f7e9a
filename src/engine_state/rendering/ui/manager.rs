//! UI batch manager.
//!
//! Walks a frame's command list in order and fills the quad batch and the image list the
//! UI renderer draws. Every drawn primitive gets a draw-order slot; the renderer turns the
//! slot into depth so later primitives land on top of earlier ones.
//!
//! Clipping is a small state machine: `ScissorStart` sets the clip rect copied into the
//! following primitives and `ScissorEnd` clears it. A zero-area `ScissorStart` is a request
//! to clip everything, so every command up to the next `ScissorEnd` is skipped outright.

use log::trace;

use crate::{
    core::PoolId,
    engine_state::buffer_state::{BufferError, BufferState},
};

use super::{
    command::{BorderWidth, BoundingBox, Color, CornerRadius, RenderCommand, RenderData},
    primitives::{UiImageDraw, UiImageUniforms, UiQuad, NO_GLYPH},
    quad_batch::QuadBatch,
    text, UiError,
};

/// Builds the per-frame UI batches from draw commands.
#[derive(Debug, Default)]
pub struct UiBatchManager {
    quads: QuadBatch,
    images: Vec<UiImageDraw>,
    draw_order: u16,
    viewport: (u32, u32),
}

/// Clip and enable state while walking one command list.
#[derive(Debug, Clone, Copy)]
struct ScissorState {
    rect: [i16; 4],
    rendering_enabled: bool,
}

impl Default for ScissorState {
    fn default() -> Self {
        Self {
            rect: [0; 4],
            rendering_enabled: true,
        }
    }
}

fn has_area(rect: [i16; 4]) -> bool {
    rect[2] != 0 && rect[3] != 0
}

/// Font size as a glyph cell size, `1..=255`.
fn cell_font_size(font_size: u16) -> Result<u8, UiError> {
    u8::try_from(font_size)
        .ok()
        .filter(|size| *size != 0)
        .ok_or(UiError::FontSizeOutOfRange(font_size))
}

impl UiBatchManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the frame's batches with the primitives described by `commands`.
    ///
    /// The quad batch, image list and draw-order counter are reset first, so each call
    /// describes a complete frame.
    ///
    /// # Arguments
    /// * `delta_time` - Seconds since the previous frame
    /// * `viewport_size` - Width and height of the render target in pixels
    /// * `commands` - Commands in painter's order
    ///
    /// # Errors
    /// [`UiError::UnsupportedCommand`] for `Custom` commands,
    /// [`UiError::FontSizeOutOfRange`] for text of size 0 or 256 pixels and more, and
    /// [`UiError::DrawOrderExhausted`] once a frame holds more than `u16::MAX` primitives
    pub fn render_command_array(
        &mut self,
        delta_time: f32,
        viewport_size: (u32, u32),
        commands: &[RenderCommand],
    ) -> Result<(), UiError> {
        self.quads.reset();
        self.images.clear();
        self.draw_order = 0;
        self.viewport = viewport_size;

        let mut scissor = ScissorState::default();

        for command in commands {
            if !scissor.rendering_enabled && command.data != RenderData::ScissorEnd {
                continue;
            }

            let rect = command.bounding_box.to_pixel_rect();

            match &command.data {
                RenderData::None => {}
                RenderData::Rectangle {
                    background_color,
                    corner_radius,
                } => self.draw_rectangle(rect, background_color, corner_radius, None, scissor.rect)?,
                RenderData::Border {
                    color,
                    corner_radius,
                    width,
                } => {
                    if !width.is_zero() {
                        self.draw_rectangle(rect, color, corner_radius, Some(width), scissor.rect)?;
                    }
                }
                RenderData::Text {
                    text,
                    font_size,
                    text_color,
                } => self.draw_text(&command.bounding_box, text, *font_size, text_color, scissor.rect)?,
                RenderData::Image {
                    texture,
                    background_color,
                    corner_radius,
                } => self.draw_image(*texture, rect, background_color, corner_radius, scissor.rect)?,
                RenderData::ScissorStart => {
                    if has_area(rect) {
                        scissor.rect = rect;
                    } else {
                        scissor.rendering_enabled = false;
                    }
                }
                RenderData::ScissorEnd => scissor = ScissorState::default(),
                RenderData::Custom => return Err(UiError::UnsupportedCommand),
            }
        }

        trace!(
            "UI frame ({:.4}s): {} quads, {} images, {} draw slots",
            delta_time,
            self.quads.len(),
            self.images.len(),
            self.draw_order
        );
        Ok(())
    }

    /// Takes the next draw-order slot.
    fn next_draw_order(&mut self) -> Result<u16, UiError> {
        let order = self.draw_order;
        self.draw_order = order.checked_add(1).ok_or(UiError::DrawOrderExhausted)?;
        Ok(order)
    }

    fn draw_rectangle(
        &mut self,
        rect: [i16; 4],
        color: &Color,
        corner_radius: &CornerRadius,
        border: Option<&BorderWidth>,
        scissor: [i16; 4],
    ) -> Result<(), UiError> {
        if !has_area(rect) {
            return Ok(());
        }

        let quad = UiQuad {
            rect,
            color: color.to_bytes(),
            border_radius: corner_radius.clamped(rect[2], rect[3]),
            border_thickness: border.map(BorderWidth::to_array).unwrap_or_default(),
            glyph: NO_GLYPH,
            draw_order: self.next_draw_order()?,
            scissor,
            ..Default::default()
        };
        self.quads.append(&[quad]);
        Ok(())
    }

    fn draw_text(
        &mut self,
        bounding_box: &BoundingBox,
        text: &str,
        font_size: u16,
        color: &Color,
        scissor: [i16; 4],
    ) -> Result<(), UiError> {
        let font_size = cell_font_size(font_size)?;
        let [x, y, _, _] = bounding_box.to_pixel_rect();

        let order = self.next_draw_order()?;
        let glyphs = text::layout_text(text, (x, y), font_size, color.to_bytes(), scissor, order);
        self.quads.append(&glyphs);
        Ok(())
    }

    fn draw_image(
        &mut self,
        texture: PoolId,
        rect: [i16; 4],
        color: &Color,
        corner_radius: &CornerRadius,
        scissor: [i16; 4],
    ) -> Result<(), UiError> {
        if !has_area(rect) {
            return Ok(());
        }

        let uniforms = UiImageUniforms {
            rect: rect.map(f32::from),
            color: color.to_normalized(),
            border_radius: corner_radius.clamped(rect[2], rect[3]),
            scissor: scissor.map(f32::from),
            draw_order: u32::from(self.next_draw_order()?),
            _pad: [0; 3],
        };
        self.images.push(UiImageDraw { uniforms, texture });
        Ok(())
    }

    /// Size text would occupy, for layout.
    pub fn measure_text(text: &str, font_size: u16) -> Result<(f32, f32), UiError> {
        let font_size = cell_font_size(font_size)?;
        Ok(text::measure_text(text, font_size))
    }

    pub fn quads(&self) -> &QuadBatch {
        &self.quads
    }

    pub fn images(&self) -> &[UiImageDraw] {
        &self.images
    }

    /// Number of draw-order slots handed out this frame.
    #[cfg(test)]
    pub fn draw_order_count(&self) -> u16 {
        self.draw_order
    }

    /// Viewport of the last command list.
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Mirrors the quad batch to the GPU.
    pub fn upload(&self, buffer_state: &mut BufferState) -> Result<(), BufferError> {
        self.quads.upload(buffer_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::ui::texture_registry::TextureRegistry;

    const VIEWPORT: (u32, u32) = (640, 480);

    fn rect(x: f32, y: f32, w: f32, h: f32) -> RenderCommand {
        RenderCommand::rectangle(BoundingBox::new(x, y, w, h), Color::WHITE)
    }

    fn scissor_start(x: f32, y: f32, w: f32, h: f32) -> RenderCommand {
        RenderCommand::new(BoundingBox::new(x, y, w, h), RenderData::ScissorStart)
    }

    fn scissor_end() -> RenderCommand {
        RenderCommand::new(BoundingBox::default(), RenderData::ScissorEnd)
    }

    fn image_id() -> PoolId {
        let mut registry = TextureRegistry::<()>::new();
        registry.register_pixels("img", 1, 1, &[0; 4]).unwrap()
    }

    fn image(texture: PoolId, w: f32, h: f32) -> RenderCommand {
        RenderCommand::new(
            BoundingBox::new(1.0, 2.0, w, h),
            RenderData::Image {
                texture,
                background_color: Color::rgba(255.0, 0.0, 0.0, 255.0),
                corner_radius: CornerRadius::all(100.0),
            },
        )
    }

    #[test]
    fn primitives_take_increasing_draw_order() {
        let mut ui = UiBatchManager::new();
        let commands = [
            rect(0.0, 0.0, 10.0, 10.0),
            image(image_id(), 4.0, 8.0),
            rect(5.0, 5.0, 10.0, 10.0),
            RenderCommand::new(
                BoundingBox::new(0.0, 0.0, 20.0, 20.0),
                RenderData::Border {
                    color: Color::WHITE,
                    corner_radius: CornerRadius::default(),
                    width: BorderWidth::all(2),
                },
            ),
        ];

        ui.render_command_array(0.016, VIEWPORT, &commands).unwrap();

        let orders: Vec<u16> = ui.quads().as_slice().iter().map(|q| q.draw_order).collect();
        assert_eq!(orders, vec![0, 2, 3]);
        assert_eq!(ui.images()[0].uniforms.draw_order, 1);
        assert_eq!(ui.quads().as_slice()[2].border_thickness, [2; 4]);
        assert_eq!(ui.draw_order_count(), 4);
    }

    #[test]
    fn glyphs_of_one_text_share_a_slot() {
        let mut ui = UiBatchManager::new();
        let commands = [
            rect(0.0, 0.0, 10.0, 10.0),
            RenderCommand::text((0.0, 0.0), "hey", 16, Color::WHITE),
            RenderCommand::text((0.0, 20.0), "", 16, Color::WHITE),
            rect(0.0, 0.0, 10.0, 10.0),
        ];

        ui.render_command_array(0.016, VIEWPORT, &commands).unwrap();

        let orders: Vec<u16> = ui.quads().as_slice().iter().map(|q| q.draw_order).collect();
        assert_eq!(orders, vec![0, 1, 1, 1, 3]);
    }

    #[test]
    fn empty_clip_skips_until_scissor_end() {
        let mut ui = UiBatchManager::new();
        let commands = [
            scissor_start(10.0, 10.0, 0.0, 50.0),
            rect(0.0, 0.0, 10.0, 10.0),
            RenderCommand::text((0.0, 0.0), "hidden", 16, Color::WHITE),
            image(image_id(), 4.0, 4.0),
            RenderCommand::new(BoundingBox::default(), RenderData::Custom),
            scissor_end(),
            rect(0.0, 0.0, 10.0, 10.0),
        ];

        ui.render_command_array(0.016, VIEWPORT, &commands).unwrap();

        assert_eq!(ui.quads().len(), 1);
        assert!(ui.images().is_empty());
        assert_eq!(ui.quads().as_slice()[0].draw_order, 0);
    }

    #[test]
    fn scissor_rect_is_copied_until_cleared() {
        let mut ui = UiBatchManager::new();
        let commands = [
            scissor_start(10.0, 20.0, 30.0, 40.0),
            rect(0.0, 0.0, 10.0, 10.0),
            image(image_id(), 4.0, 4.0),
            scissor_end(),
            rect(0.0, 0.0, 10.0, 10.0),
        ];

        ui.render_command_array(0.016, VIEWPORT, &commands).unwrap();

        assert_eq!(ui.quads().as_slice()[0].scissor, [10, 20, 30, 40]);
        assert_eq!(ui.images()[0].uniforms.scissor, [10.0, 20.0, 30.0, 40.0]);
        assert_eq!(ui.quads().as_slice()[1].scissor, [0; 4]);
    }

    #[test]
    fn degenerate_primitives_are_dropped() {
        let mut ui = UiBatchManager::new();
        let commands = [
            rect(0.0, 0.0, 0.0, 10.0),
            image(image_id(), 5.0, 0.0),
            RenderCommand::new(
                BoundingBox::new(0.0, 0.0, 20.0, 20.0),
                RenderData::Border {
                    color: Color::WHITE,
                    corner_radius: CornerRadius::default(),
                    width: BorderWidth::default(),
                },
            ),
            RenderCommand::new(BoundingBox::new(0.0, 0.0, 5.0, 5.0), RenderData::None),
        ];

        ui.render_command_array(0.016, VIEWPORT, &commands).unwrap();

        assert!(ui.quads().is_empty());
        assert!(ui.images().is_empty());
        assert_eq!(ui.draw_order_count(), 0);
    }

    #[test]
    fn image_uniforms_are_normalised_and_clamped() {
        let mut ui = UiBatchManager::new();
        let texture = image_id();
        ui.render_command_array(0.016, VIEWPORT, &[image(texture, 20.0, 8.0)])
            .unwrap();

        let draw = ui.images()[0];
        assert_eq!(draw.texture, texture);
        assert_eq!(draw.uniforms.rect, [1.0, 2.0, 20.0, 8.0]);
        assert_eq!(draw.uniforms.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(draw.uniforms.border_radius, [4.0; 4]);
    }

    #[test]
    fn each_call_starts_a_fresh_frame() {
        let mut ui = UiBatchManager::new();
        let commands = [rect(0.0, 0.0, 10.0, 10.0), rect(0.0, 0.0, 10.0, 10.0)];

        ui.render_command_array(0.016, VIEWPORT, &commands).unwrap();
        ui.render_command_array(0.016, (800, 600), &commands).unwrap();

        assert_eq!(ui.quads().len(), 2);
        assert_eq!(ui.quads().as_slice()[1].draw_order, 1);
        assert_eq!(ui.viewport(), (800, 600));
    }

    #[test]
    fn unsupported_input_is_an_error() {
        let mut ui = UiBatchManager::new();

        let custom = [RenderCommand::new(BoundingBox::default(), RenderData::Custom)];
        assert_eq!(
            ui.render_command_array(0.016, VIEWPORT, &custom),
            Err(UiError::UnsupportedCommand)
        );

        let huge_text = [RenderCommand::text((0.0, 0.0), "x", 256, Color::WHITE)];
        assert_eq!(
            ui.render_command_array(0.016, VIEWPORT, &huge_text),
            Err(UiError::FontSizeOutOfRange(256))
        );
        assert_eq!(
            UiBatchManager::measure_text("x", 300),
            Err(UiError::FontSizeOutOfRange(300))
        );
    }

    #[test]
    fn zero_font_size_is_rejected() {
        let mut ui = UiBatchManager::new();

        let empty_cells = [RenderCommand::text((0.0, 0.0), "ab", 0, Color::WHITE)];
        assert_eq!(
            ui.render_command_array(0.016, VIEWPORT, &empty_cells),
            Err(UiError::FontSizeOutOfRange(0))
        );
        assert!(ui.quads().is_empty());
        assert_eq!(
            UiBatchManager::measure_text("ab", 0),
            Err(UiError::FontSizeOutOfRange(0))
        );
        assert_eq!(UiBatchManager::measure_text("ab", 255), Ok((318.0, 255.0)));
    }

    #[test]
    fn running_out_of_draw_order_is_an_error() {
        let mut ui = UiBatchManager::new();
        let mut commands = vec![rect(0.0, 0.0, 1.0, 1.0); usize::from(u16::MAX)];

        ui.render_command_array(0.016, VIEWPORT, &commands).unwrap();
        let last = ui.quads().as_slice().last().map(|q| q.draw_order);
        assert_eq!(last, Some(u16::MAX - 1));

        commands.push(rect(0.0, 0.0, 1.0, 1.0));
        assert_eq!(
            ui.render_command_array(0.016, VIEWPORT, &commands),
            Err(UiError::DrawOrderExhausted)
        );
    }
}
