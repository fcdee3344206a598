// SPDX-License-Identifier: MIT
//
// Differential renderer — emit only what changed.
//
// Instead of redrawing the entire screen every frame, we compare the
// current Grid against the previous one and emit ANSI escape sequences
// only for cells that actually changed. In a typical editing session a
// keystroke touches one or two rows out of 24+ visible ones; differential
// rendering turns a full-screen repaint into a surgical update.
//
// The pipeline per frame:
//
//   1. The editor paints into a Grid (the "current" frame).
//   2. DiffRenderer::render() compares current against the stored previous
//      frame, accumulating ANSI bytes — zero writes to the terminal.
//   3. DiffRenderer::flush() issues a single write() syscall.
//
// Optimizations:
//
//   - Row-level skip: entire unchanged rows are detected with a single
//     slice comparison and skipped without iterating individual cells.
//   - Runs of changed cells on one row need one cursor move: the writer
//     tracks where the terminal cursor landed after the last cell.
//   - Synchronized output (DEC 2026) wraps the frame to prevent flicker.
//   - Zero allocation in steady state: the previous-frame grid is reused
//     via copy_from() — only the first render or a resize allocates.

use std::io::{self, Write};

use crate::ansi;
use crate::grid::Grid;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass, for profiling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame and were rendered.
    pub cells_rendered: usize,
    /// Cells that matched the previous frame and were skipped.
    pub cells_skipped: usize,
    /// Total bytes of ANSI output generated.
    pub bytes_written: usize,
}

impl RenderStats {
    /// Total cells processed (rendered + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Differential renderer that emits ANSI only for changed cells.
///
/// Maintains the previous frame for comparison. All output is buffered
/// for a single `write()` syscall per frame.
///
/// # Usage
///
/// ```no_run
/// use ked_term::diff::DiffRenderer;
/// use ked_term::grid::Grid;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = Grid::new(80, 24);
///
/// // Paint into `frame`...
///
/// let stats = renderer.render(&frame);
/// renderer.flush().unwrap();
/// // stats.cells_rendered tells you how much work was done.
/// ```
pub struct DiffRenderer {
    /// Accumulated ANSI output for the current frame.
    output: Vec<u8>,
    /// The frame as the terminal currently shows it.
    previous: Option<Grid>,
}

impl DiffRenderer {
    /// Create a renderer with no previous frame (first render draws everything).
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: Vec::with_capacity(4096),
            previous: None,
        }
    }

    /// Diff the current frame against the previous and generate ANSI output.
    ///
    /// After calling this, use [`flush`](Self::flush) or
    /// [`flush_to`](Self::flush_to) to write the output to the terminal,
    /// or [`output_bytes`](Self::output_bytes) to inspect it (for tests).
    pub fn render(&mut self, current: &Grid) -> RenderStats {
        self.output.clear();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        // Nothing to render for zero-size grids.
        if width == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        // Synchronized output: terminal buffers until end_sync.
        ansi::begin_sync(&mut self.output).ok();

        // Full redraw on first render or size change.
        let size_matches = self
            .previous
            .as_ref()
            .is_some_and(|prev| prev.width() == width && prev.height() == height);
        let full_redraw = !size_matches;

        if full_redraw {
            ansi::clear_screen(&mut self.output).ok();
            ansi::cursor_to(&mut self.output, 0, 0).ok();
        }

        // Where the terminal cursor sits after the last emitted cell;
        // a cell that continues the run needs no cursor move.
        let mut pen: Option<(u16, u16)> = if full_redraw { Some((0, 0)) } else { None };

        // ── Diff loop ──
        let mut utf8 = [0u8; 4];
        for y in 0..height {
            // Row-skip: if the entire row is unchanged, one slice compare.
            if !full_redraw {
                if let Some(prev) = &self.previous {
                    if current.row(y) == prev.row(y) {
                        stats.cells_skipped += usize::from(width);
                        continue;
                    }
                }
            }

            for x in 0..width {
                // In bounds by construction of the loops.
                let ch = current.get(x, y).unwrap_or(Grid::BLANK);

                let changed = full_redraw
                    || self.previous.as_ref().and_then(|p| p.get(x, y)) != Some(ch);

                if !changed {
                    stats.cells_skipped += 1;
                    continue;
                }

                if pen != Some((x, y)) {
                    ansi::cursor_to(&mut self.output, x, y).ok();
                }
                self.output.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());

                // The terminal advances one column per (single-width) char;
                // past the last column the next cell re-positions anyway.
                pen = if x + 1 < width { Some((x + 1, y)) } else { None };
                stats.cells_rendered += 1;
            }
        }

        // Reset terminal state at frame end so nothing leaks into the
        // shell on exit.
        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();

        stats.bytes_written = self.output.len();

        // Store current frame for the next diff.
        self.store_frame(current);

        stats
    }

    /// The raw ANSI bytes from the last render (for testing and debugging).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(&self.output)?;
        lock.flush()?;
        self.output.clear();
        Ok(())
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.output)?;
        w.flush()?;
        self.output.clear();
        Ok(())
    }

    /// Discard the previous frame so the next render draws everything.
    ///
    /// Used after a resize or when the user requests a manual refresh.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    /// Store the current frame for next render's comparison.
    ///
    /// Reuses the existing allocation when dimensions match (zero alloc
    /// in steady state). Only allocates on first render or resize.
    fn store_frame(&mut self, current: &Grid) {
        match &mut self.previous {
            Some(prev)
                if prev.width() == current.width() && prev.height() == current.height() =>
            {
                prev.copy_from(current);
            }
            _ => {
                self.previous = Some(current.clone());
            }
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
