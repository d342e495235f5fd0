use super::{Config, ViewerEvent, WindowObserver};
use crate::Cell;
use crossbeam::channel::{unbounded, Receiver};
use eframe::egui::{
    load::SizedTexture, CentralPanel, Color32, ColorImage, Context, Frame, Image, Margin,
    RichText, TextureHandle, TextureOptions, Ui, ViewportCommand,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct App {
    pub(super) events: Receiver<ViewerEvent>,
    pub(super) closed: Arc<AtomicBool>, // Set once the user closes the window.
    pub(super) title: String,           // Backend and field description.
    pub(super) generation: Option<u64>, // Generation currently displayed.
    pub(super) side: usize,             // Side of the displayed region in cells.
    pub(super) texture: TextureHandle,  // Texture of the displayed region.
    pub(super) report: Option<String>,  // Final report, once the run is over.
    pub(super) finished_at: Option<Instant>,
    pub(super) close_delay: Duration,
}

impl App {
    /// Creates the viewer and the observer feeding it.
    ///
    /// `closed` is shared with the caller so that it can also tell the
    /// simulation to stop after the event loop has exited.
    pub fn new(
        ctx: &Context,
        title: String,
        closed: Arc<AtomicBool>,
        frame_delay: Duration,
    ) -> (Self, WindowObserver) {
        let (tx, rx) = unbounded();
        let observer = WindowObserver::new(tx, Arc::clone(&closed), ctx.clone(), frame_delay);
        let app = Self {
            events: rx,
            closed,
            title,
            generation: None,
            side: 0,
            texture: ctx.load_texture(
                "Game of Life field",
                ColorImage::default(),
                TextureOptions::NEAREST,
            ),
            report: None,
            finished_at: None,
            close_delay: Config::CLOSE_DELAY,
        };
        (app, observer)
    }

    fn receive_events(&mut self) {
        for event in self.events.try_iter() {
            match event {
                ViewerEvent::Frame {
                    generation,
                    cells,
                    side,
                } => {
                    self.texture.set(field_image(&cells, side), TextureOptions::NEAREST);
                    self.generation = Some(generation);
                    self.side = side;
                }
                ViewerEvent::Finished(report) => {
                    self.report = Some(report);
                    self.finished_at = Some(Instant::now());
                }
            }
        }
    }
}

fn field_image(cells: &[Cell], side: usize) -> ColorImage {
    let mut image = ColorImage::new([side, side], Config::DEAD_COLOR);
    for (pixel, cell) in image.pixels.iter_mut().zip(cells) {
        if cell.is_alive() {
            *pixel = Config::ALIVE_COLOR;
        }
    }
    image
}

impl App {
    fn new_text(text: &str) -> RichText {
        RichText::new(text)
            .color(Config::TEXT_COLOR)
            .size(Config::TEXT_SIZE)
    }

    fn draw_status(&mut self, ui: &mut Ui) {
        ui.vertical(|ui| {
            ui.set_width(Config::CONTROL_PANEL_WIDTH);
            ui.label(Self::new_text(&self.title));
            let generation = match self.generation {
                Some(g) => format!("Generation: {g}"),
                None => "Waiting for the first generation".to_string(),
            };
            ui.label(Self::new_text(&generation));
            if let Some(report) = &self.report {
                ui.add_space(Config::FRAME_MARGIN);
                ui.label(Self::new_text(report));
            }
        });
    }

    fn draw_field(&mut self, ui: &mut Ui) {
        if self.side == 0 {
            return;
        }
        let area = ui.available_size();
        let size_px = area
            .y
            .min(area.x)
            .min(Config::CELL_SIZE * Config::VIEW_CELLS as f32);
        let source = SizedTexture::new(self.texture.id(), [size_px; 2]);
        ui.add(Image::from_texture(source));
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if ctx.input(|input| input.viewport().close_requested()) {
            self.closed.store(true, Ordering::Relaxed);
        }
        self.receive_events();

        // full-window panel
        CentralPanel::default()
            .frame(
                Frame::default()
                    .inner_margin(Margin::same(Config::FRAME_MARGIN))
                    .fill(Color32::WHITE),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    self.draw_status(ui);
                    self.draw_field(ui);
                });
            });

        if let Some(finished_at) = self.finished_at {
            if finished_at.elapsed() >= self.close_delay {
                ctx.send_viewport_cmd(ViewportCommand::Close);
            }
        }
        ctx.request_repaint_after(Config::REPAINT_INTERVAL);
    }
}
