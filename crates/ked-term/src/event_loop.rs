// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — one keystroke at a time.
//
// The editor is deliberately single-threaded and synchronous: the loop
// renders a frame, blocks on a stdin read, applies whatever keys arrived,
// and loops. There are no background threads, no timers, and no points
// where state is shared — the terminal's own VMIN=1 blocking read is the
// scheduler.
//
// # Resize handling
//
// Terminal resize is detected via a SIGWINCH handler that sets an
// `AtomicBool`. The handler is installed *without* `SA_RESTART`, so the
// blocking stdin read returns `EINTR` when the signal lands; the loop
// checks the flag, resizes the frame, and repaints immediately instead of
// waiting for the next keypress.
//
// # Escape Sequence Timeout
//
// A lone ESC byte is ambiguous: it could be the Escape key or the start
// of a CSI sequence cut in half by the read. When the parser reports
// pending bytes, the loop polls stdin for a few milliseconds; if nothing
// more arrives, the pending bytes are flushed as literal key events.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ansi;
use crate::diff::DiffRenderer;
use crate::grid::Grid;
use crate::input::{KeyEvent, Parser};
use crate::terminal::{Size, Terminal};

/// How long to wait for the rest of an escape sequence (milliseconds).
const ESC_TIMEOUT_MS: i32 = 10;

/// Read buffer size. A keypress is 1–6 bytes; a paste can be kilobytes.
const READ_BUF_SIZE: usize = 4096;

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler. Checked each loop iteration.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler simply sets the [`SIGWINCH_RECEIVED`] flag — writing to an
/// atomic is one of the few operations permitted inside signal handlers.
/// `sa_flags` deliberately omits `SA_RESTART` so the blocking stdin read
/// is interrupted and the loop notices the resize right away.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {
    // No-op on non-unix platforms.
}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Implement this trait to create a terminal application. Each iteration
/// the loop calls:
///
/// 1. [`paint`](App::paint) — when the frame is dirty and needs redrawing
/// 2. [`cursor`](App::cursor) — after paint, to position the hardware cursor
/// 3. [`on_key`](App::on_key) — for each parsed key event
/// 4. [`on_resize`](App::on_resize) — when the terminal size changed
pub trait App {
    /// Handle a parsed key event.
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_key(&mut self, key: KeyEvent) -> Action;

    /// Handle terminal resize.
    ///
    /// Called with the new terminal dimensions. The frame grid has
    /// already been resized before this is called.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the current application state into the frame grid.
    ///
    /// The grid has been cleared before this call — paint everything
    /// you want visible. Takes `&mut self` so the application can update
    /// render state (e.g., store the computed cursor screen position
    /// for [`cursor`](App::cursor)).
    fn paint(&mut self, grid: &mut Grid);

    /// The terminal cursor position after painting.
    ///
    /// Return `Some((x, y))` to show the hardware cursor at the given
    /// screen position, or `None` to keep it hidden. Called after every
    /// [`paint`](App::paint).
    fn cursor(&self) -> Option<(u16, u16)> {
        None
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The blocking terminal event loop.
///
/// Owns the terminal, parser, and renderer. Call [`run`](Self::run) to
/// enter the loop — it returns when the application signals
/// [`Action::Quit`] or stdin reaches EOF.
///
/// # Example
///
/// ```no_run
/// use ked_term::event_loop::{Action, App, EventLoop};
/// use ked_term::grid::Grid;
/// use ked_term::input::{KeyCode, KeyEvent};
///
/// struct MyApp;
///
/// impl App for MyApp {
///     fn on_key(&mut self, key: KeyEvent) -> Action {
///         if key.code == KeyCode::Char('q') {
///             return Action::Quit;
///         }
///         Action::Continue
///     }
///
///     fn paint(&mut self, grid: &mut Grid) {
///         // Paint your UI here...
///     }
/// }
///
/// let mut event_loop = EventLoop::new()?;
/// event_loop.run(&mut MyApp)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: DiffRenderer,
}

impl EventLoop {
    /// Create a new event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::new(),
            renderer: DiffRenderer::new(),
        })
    }

    /// The current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run the event loop until the application returns [`Action::Quit`].
    ///
    /// This method:
    /// 1. Enters raw mode and the alternate screen
    /// 2. Installs the SIGWINCH handler
    /// 3. Runs the render → block-on-read → apply loop
    /// 4. Restores the terminal on exit (even on error)
    ///
    /// # Errors
    ///
    /// Returns an error if terminal enter/leave or rendering fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let result = self.run_inner(app);

        // Always clean up, even if the loop errored.
        self.terminal.leave()?;

        result
    }

    /// The inner loop, separated so cleanup runs regardless of outcome.
    fn run_inner(&mut self, app: &mut impl App) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = Grid::new(size.cols, size.rows);
        let mut dirty = true; // First frame always renders.
        let mut stdin = io::stdin();
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            // ── Check for terminal resize ────────────────────────
            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let new_size = self.terminal.refresh_size();
                frame.resize(new_size.cols, new_size.rows);
                self.renderer.force_redraw();
                app.on_resize(new_size);
                dirty = true;
            }

            // ── Render if dirty ──────────────────────────────────
            if dirty {
                frame.clear();
                app.paint(&mut frame);
                self.renderer.render(&frame);
                self.renderer.flush()?;

                // Position the hardware cursor after frame output.
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                if let Some((x, y)) = app.cursor() {
                    ansi::cursor_to(&mut lock, x, y)?;
                    ansi::cursor_show(&mut lock)?;
                } else {
                    ansi::cursor_hide(&mut lock)?;
                }
                lock.flush()?;

                dirty = false;
            }

            // ── Block until input (or a signal) arrives ──────────
            let n = match stdin.read(&mut buf) {
                Ok(0) => return Ok(()), // EOF — stdin closed.
                Ok(n) => n,
                // EINTR: a signal (SIGWINCH) interrupted the read.
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            let mut events = self.parser.advance(&buf[..n]);

            // Lone ESC (or a split sequence): give the terminal a few
            // milliseconds to deliver the rest, then take it literally.
            if self.parser.has_pending() && !poll_stdin(ESC_TIMEOUT_MS) {
                events.extend(self.parser.flush());
            }

            for event in events {
                dirty = true;
                if app.on_key(event) == Action::Quit {
                    return Ok(());
                }
            }
        }
    }
}

/// Wait up to `timeout_ms` for stdin to become readable.
#[cfg(unix)]
fn poll_stdin(timeout_ms: i32) -> bool {
    let ready = unsafe {
        let mut pfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        libc::poll(&raw mut pfd, 1, timeout_ms)
    };
    ready > 0
}

#[cfg(not(unix))]
fn poll_stdin(_timeout_ms: i32) -> bool {
    // Without poll, keep pending bytes until the next read delivers more.
    true
}

// ─── Tests ───────────────────────────────────────────────────────────────────
