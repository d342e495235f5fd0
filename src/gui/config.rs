use eframe::egui::Color32;
use std::time::Duration;

pub struct Config;

impl Config {
    /// Side of the rendered top-left region, in cells.
    pub const VIEW_CELLS: usize = 50;
    pub const CELL_SIZE: f32 = 16.;
    pub const ALIVE_COLOR: Color32 = Color32::from_rgb(0, 0, 255);
    pub const DEAD_COLOR: Color32 = Color32::from_rgb(255, 0, 255);

    /// Minimum time a drawn generation stays on screen.
    pub const FRAME_DELAY: Duration = Duration::from_millis(500);
    /// How long the final report stays visible before the window closes.
    pub const CLOSE_DELAY: Duration = Duration::from_millis(1500);
    pub const REPAINT_INTERVAL: Duration = Duration::from_millis(30);

    pub const FRAME_MARGIN: f32 = 20.;
    pub const CONTROL_PANEL_WIDTH: f32 = 260.;
    pub const TEXT_SIZE: f32 = 16.;
    pub const TEXT_COLOR: Color32 = Color32::BLACK;
}
