//! Heads-up display.
//!
//! Lays out the crosshair, the frame statistics and the hotbar panel as a UI command list
//! each frame.

use web_time::Duration;

use crate::{core::PoolId, engine_state::voxels::block::block_type::BlockType};

use super::{
    command::{BorderWidth, BoundingBox, Color, CornerRadius, RenderCommand, RenderData},
    manager::UiBatchManager,
    UiError,
};

const CROSSHAIR_LENGTH: f32 = 16.0;
const CROSSHAIR_THICKNESS: f32 = 2.0;
const TEXT_SIZE: u16 = 16;
const MARGIN: f32 = 8.0;
const PANEL_PADDING: f32 = 6.0;
const ICON_SIZE: f32 = 32.0;

const CROSSHAIR_COLOR: Color = Color::rgba(255.0, 255.0, 255.0, 200.0);
const PANEL_COLOR: Color = Color::rgba(20.0, 20.0, 28.0, 170.0);
const PANEL_BORDER_COLOR: Color = Color::rgba(230.0, 230.0, 230.0, 220.0);
const TEXT_COLOR: Color = Color::WHITE;

/// Averages frame times over one-second windows.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    elapsed: Duration,
    frames: u32,
    frames_per_second: f32,
}

impl FrameStats {
    /// Records one frame.
    pub fn tick(&mut self, dt: Duration) {
        self.elapsed += dt;
        self.frames += 1;

        if self.elapsed >= Duration::from_secs(1) {
            self.frames_per_second = self.frames as f32 / self.elapsed.as_secs_f32();
            self.elapsed = Duration::ZERO;
            self.frames = 0;
        }
    }

    /// Frame rate over the last completed window, zero before the first one.
    pub fn frames_per_second(&self) -> f32 {
        self.frames_per_second
    }
}

/// What the HUD shows this frame.
#[derive(Debug, Clone, Copy)]
pub struct HudState {
    /// Surface size in physical pixels
    pub viewport: (u32, u32),
    /// Type the next place action puts down
    pub selected_block: BlockType,
    /// UI texture showing the selected block, if one was loaded
    pub selected_texture: Option<PoolId>,
    /// Rolling frame rate from [`FrameStats`]
    pub frames_per_second: f32,
    /// Number of placed blocks
    pub block_count: usize,
}

/// Builds the HUD command list in painter's order.
pub fn build_hud(state: &HudState) -> Result<Vec<RenderCommand>, UiError> {
    let (width, height) = (state.viewport.0 as f32, state.viewport.1 as f32);
    let mut commands = Vec::with_capacity(11);

    // Root element spanning the viewport; lays out only
    commands.push(RenderCommand::new(
        BoundingBox::new(0.0, 0.0, width, height),
        RenderData::None,
    ));

    // Crosshair
    let (center_x, center_y) = (width * 0.5, height * 0.5);
    commands.push(RenderCommand::rectangle(
        BoundingBox::new(
            center_x - CROSSHAIR_LENGTH * 0.5,
            center_y - CROSSHAIR_THICKNESS * 0.5,
            CROSSHAIR_LENGTH,
            CROSSHAIR_THICKNESS,
        ),
        CROSSHAIR_COLOR,
    ));
    commands.push(RenderCommand::rectangle(
        BoundingBox::new(
            center_x - CROSSHAIR_THICKNESS * 0.5,
            center_y - CROSSHAIR_LENGTH * 0.5,
            CROSSHAIR_THICKNESS,
            CROSSHAIR_LENGTH,
        ),
        CROSSHAIR_COLOR,
    ));

    commands.push(RenderCommand::text(
        (MARGIN, MARGIN),
        format!(
            "{:.0} fps\n{} blocks",
            state.frames_per_second, state.block_count
        ),
        TEXT_SIZE,
        TEXT_COLOR,
    ));

    // Hotbar panel in the bottom-left corner
    let label = format!("{}\t[1-0]", state.selected_block);
    let (label_width, label_height) = UiBatchManager::measure_text(&label, TEXT_SIZE)?;
    let panel = BoundingBox::new(
        MARGIN,
        height - MARGIN - ICON_SIZE - PANEL_PADDING * 2.0,
        ICON_SIZE + label_width + PANEL_PADDING * 3.0,
        ICON_SIZE + PANEL_PADDING * 2.0,
    );

    commands.push(RenderCommand::new(panel, RenderData::ScissorStart));
    commands.push(RenderCommand::new(
        panel,
        RenderData::Rectangle {
            background_color: PANEL_COLOR,
            corner_radius: CornerRadius::all(6.0),
        },
    ));
    if let Some(texture) = state.selected_texture {
        commands.push(RenderCommand::new(
            BoundingBox::new(
                panel.x + PANEL_PADDING,
                panel.y + PANEL_PADDING,
                ICON_SIZE,
                ICON_SIZE,
            ),
            RenderData::Image {
                texture,
                background_color: Color::WHITE,
                corner_radius: CornerRadius::all(4.0),
            },
        ));
    }
    commands.push(RenderCommand::text(
        (
            panel.x + ICON_SIZE + PANEL_PADDING * 2.0,
            panel.y + (panel.height - label_height) * 0.5,
        ),
        label,
        TEXT_SIZE,
        TEXT_COLOR,
    ));
    commands.push(RenderCommand::new(
        panel,
        RenderData::Border {
            color: PANEL_BORDER_COLOR,
            corner_radius: CornerRadius::all(6.0),
            width: BorderWidth::all(2),
        },
    ));
    commands.push(RenderCommand::new(panel, RenderData::ScissorEnd));

    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(selected_texture: Option<PoolId>) -> HudState {
        HudState {
            viewport: (640, 480),
            selected_block: BlockType::Dirt,
            selected_texture,
            frames_per_second: 59.7,
            block_count: 27,
        }
    }

    #[test]
    fn hud_commands_batch_cleanly() {
        let commands = build_hud(&state(None)).unwrap();

        let mut ui = UiBatchManager::new();
        ui.render_command_array(0.016, (640, 480), &commands).unwrap();

        assert!(ui.images().is_empty());
        // 2 crosshair bars, panel and border
        let plain = ui.quads().as_slice().iter().filter(|q| q.glyph == 0).count();
        assert_eq!(plain, 4);
        assert!(ui.quads().len() > plain);
    }

    #[test]
    fn crosshair_is_centred() {
        let commands = build_hud(&state(None)).unwrap();
        assert_eq!(commands[0].data, RenderData::None);
        assert_eq!(commands[1].bounding_box, BoundingBox::new(312.0, 239.0, 16.0, 2.0));
        assert_eq!(commands[2].bounding_box, BoundingBox::new(319.0, 232.0, 2.0, 16.0));
    }

    #[test]
    fn frame_stats_average_over_a_second() {
        let mut stats = FrameStats::default();
        for _ in 0..49 {
            stats.tick(Duration::from_millis(20));
        }
        assert_eq!(stats.frames_per_second(), 0.0);

        stats.tick(Duration::from_millis(20));
        assert!((stats.frames_per_second() - 50.0).abs() < 1e-3);
    }
}
