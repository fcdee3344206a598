// SPDX-License-Identifier: MIT
//
// ked-term — Terminal engine for ked.
//
// Direct terminal control for a small text editor: raw-mode termios,
// hand-rolled ANSI output, a byte-level input parser, and a character
// grid with a differential renderer that only touches changed cells.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct control via ANSI escape sequences and
// raw termios. The editor is single-threaded and blocks on stdin; the
// event loop here is built around that model — no background readers,
// no timers, one keystroke at a time.

pub mod ansi;
pub mod diff;
pub mod event_loop;
pub mod grid;
pub mod input;
pub mod terminal;
