// SPDX-License-Identifier: MIT
//
// ked-term demo — a live key viewer that proves the modules work together.
//
// This wires the complete pipeline: Terminal → blocking read → Parser →
// KeyEvents → Grid → DiffRenderer → single write(). Run it, press keys,
// resize the terminal. Ctrl-Q to quit.
//
// Usage:
//   cargo run -p ked-term --example demo

use std::collections::VecDeque;

use ked_term::event_loop::{Action, App, EventLoop};
use ked_term::grid::Grid;
use ked_term::input::{KeyCode, KeyEvent, Modifiers};
use ked_term::terminal::Size;

/// Maximum number of keys to display in the scrolling log.
const MAX_LOG_ENTRIES: usize = 100;

/// The demo application state.
struct Demo {
    /// Terminal size (updated on resize).
    size: Size,
    /// Rolling log of key descriptions.
    log: VecDeque<String>,
    /// Total keys received.
    key_count: u64,
}

impl Demo {
    fn new(size: Size) -> Self {
        Self {
            size,
            log: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            key_count: 0,
        }
    }

    /// Push a key description to the log.
    fn push_log(&mut self, msg: String) {
        if self.log.len() >= MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
        self.log.push_back(msg);
    }
}

/// Format a key event as a readable string.
fn format_key(key: KeyEvent) -> String {
    let mut parts = Vec::new();
    if key.modifiers.contains(Modifiers::CTRL) {
        parts.push("Ctrl".into());
    }
    if key.modifiers.contains(Modifiers::ALT) {
        parts.push("Alt".into());
    }
    if key.modifiers.contains(Modifiers::SHIFT) {
        parts.push("Shift".into());
    }
    parts.push(match key.code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => format!("'{c}'"),
        code => format!("{code:?}"),
    });
    parts.join("+")
}

/// Write a string onto a grid row, clipped at the right edge.
fn put_text(grid: &mut Grid, x: u16, y: u16, text: &str) {
    for (i, ch) in text.chars().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let i = i as u16;
        if !grid.set(x + i, y, ch) {
            break;
        }
    }
}

impl App for Demo {
    fn on_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(Modifiers::CTRL) && key.code == KeyCode::Char('q') {
            return Action::Quit;
        }
        self.key_count += 1;
        let n = self.key_count;
        self.push_log(format!("{n:>4}  {}", format_key(key)));
        Action::Continue
    }

    fn on_resize(&mut self, size: Size) {
        self.size = size;
    }

    fn paint(&mut self, grid: &mut Grid) {
        put_text(
            grid,
            0,
            0,
            &format!(
                "ked-term demo — {}x{} — {} keys — Ctrl-Q quits",
                self.size.cols, self.size.rows, self.key_count
            ),
        );

        // Most recent keys, newest at the top.
        let rows_available = usize::from(grid.height()).saturating_sub(2);
        for (i, entry) in self.log.iter().rev().take(rows_available).enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            put_text(grid, 0, 2 + i as u16, entry);
        }
    }
}

fn main() -> std::io::Result<()> {
    let mut event_loop = EventLoop::new()?;
    let mut demo = Demo::new(event_loop.size());
    event_loop.run(&mut demo)
}
