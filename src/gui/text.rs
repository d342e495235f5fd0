use super::observer::viewport;
use crate::{Control, Grid, Observer, Report};
use std::io::Write;
use tracing::warn;

/// Headless render collaborator printing the top-left region as text.
pub struct TextObserver<W: Write> {
    out: W,
}

impl<W: Write> TextObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, grid: &Grid, generation: u64) -> std::io::Result<()> {
        let (cells, side) = viewport(grid);
        writeln!(self.out, "generation {generation}")?;
        for row in cells.chunks_exact(side) {
            let line: String = row
                .iter()
                .map(|c| if c.is_alive() { '#' } else { '.' })
                .collect();
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Observer for TextObserver<W> {
    fn draw(&mut self, grid: &Grid, generation: u64) -> Control {
        if let Err(err) = self.write_frame(grid, generation) {
            warn!(%err, generation, "failed to render frame");
        }
        Control::Continue
    }

    fn finish(&mut self, _report: &Report) {
        let _ = self.out.flush();
    }
}
