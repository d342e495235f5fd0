use super::{Config, FpsLimiter};
use crate::{run, BackendKind, Cell, Control, Grid, Observer, Report, SimConfig, SimError};
use crossbeam::channel::Sender;
use eframe::egui::Context;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Messages from the simulation thread to the viewer.
#[derive(Clone, Debug)]
pub enum ViewerEvent {
    Frame {
        generation: u64,
        /// Row-major `side x side` top-left region of the field.
        cells: Vec<Cell>,
        side: usize,
    },
    Finished(String),
}

/// Render collaborator backed by the eframe window. The window may be
/// closed at any time; afterwards every call reports [`Control::Stop`].
pub struct WindowObserver {
    events: Sender<ViewerEvent>,
    closed: Arc<AtomicBool>,
    ctx: Context,
    limiter: FpsLimiter,
}

impl WindowObserver {
    pub fn new(
        events: Sender<ViewerEvent>,
        closed: Arc<AtomicBool>,
        ctx: Context,
        frame_delay: Duration,
    ) -> Self {
        Self {
            events,
            closed,
            ctx,
            limiter: FpsLimiter::new(frame_delay),
        }
    }

    fn control(&self) -> Control {
        if self.closed.load(Ordering::Relaxed) {
            Control::Stop
        } else {
            Control::Continue
        }
    }

    fn send(&self, event: ViewerEvent) {
        if self.events.send(event).is_err() {
            debug!("viewer is gone, dropping event");
            return;
        }
        self.ctx.request_repaint();
    }
}

/// Runs a whole simulation feeding `observer`. A failed run still ends the
/// viewer with a final message, so the window closes on its own.
pub fn run_observed(
    kind: BackendKind,
    config: SimConfig,
    seed: Grid,
    observer: &mut WindowObserver,
) -> Result<(Report, Grid), SimError> {
    let result = run(kind, config, seed, Some(&mut *observer));
    if let Err(err) = &result {
        error!(%err, "simulation failed");
        observer.send(ViewerEvent::Finished(format!("Simulation failed: {err}")));
    }
    result
}

/// Copies the top-left `Config::VIEW_CELLS` square (clipped to the grid).
pub(super) fn viewport(grid: &Grid) -> (Vec<Cell>, usize) {
    let side = Config::VIEW_CELLS.min(grid.rows()).min(grid.cols());
    let cells = (0..side)
        .flat_map(|row| grid.row(row)[..side].iter().copied())
        .collect();
    (cells, side)
}

impl Observer for WindowObserver {
    fn poll(&mut self) -> Control {
        self.control()
    }

    fn draw(&mut self, grid: &Grid, generation: u64) -> Control {
        if self.control() == Control::Stop {
            return Control::Stop;
        }
        self.limiter.delay();
        let (cells, side) = viewport(grid);
        self.send(ViewerEvent::Frame {
            generation,
            cells,
            side,
        });
        self.control()
    }

    fn finish(&mut self, report: &Report) {
        self.send(ViewerEvent::Finished(report.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::unbounded;

    fn observer() -> (WindowObserver, crossbeam::channel::Receiver<ViewerEvent>) {
        let (tx, rx) = unbounded();
        let closed = Arc::new(AtomicBool::new(false));
        let observer = WindowObserver::new(tx, closed, Context::default(), Duration::ZERO);
        (observer, rx)
    }

    #[test]
    fn failed_run_finishes_the_viewer() {
        let (mut observer, rx) = observer();
        let seed = Grid::blank(8, 8).unwrap();
        let config = SimConfig::square(16, 4, 2);
        let result = run_observed(BackendKind::WorkerPool, config, seed, &mut observer);
        assert!(result.is_err());
        let events: Vec<_> = rx.try_iter().collect();
        match events.as_slice() {
            [ViewerEvent::Finished(message)] => assert!(message.starts_with("Simulation failed")),
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn finished_run_sends_frames_then_report() {
        let (mut observer, rx) = observer();
        let seed = crate::classic_seed(60, 60).unwrap();
        let config = SimConfig::square(60, 3, 2);
        run_observed(BackendKind::SharedMemory, config, seed, &mut observer).unwrap();
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 4);
        match &events[0] {
            ViewerEvent::Frame { generation, side, cells } => {
                assert_eq!((*generation, *side), (0, Config::VIEW_CELLS));
                assert_eq!(cells.len(), side * side);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(
            &events[3],
            ViewerEvent::Finished(report) if report.contains("Alive cells")
        ));
    }
}
