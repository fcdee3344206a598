// SPDX-License-Identifier: MIT
//
// ked — a small terminal text editor.
//
// This is the binary that wires the crates together:
//
//   ked-term   → terminal control, input parsing, grid, event loop
//   ked-editor → rows, buffer, cursor, soft-wrap view
//   ked-syntax → highlight hook selection from the file name
//
// The Editor struct implements ked-term's App trait, connecting the
// blocking event loop to the editor's state. Each keypress flows through:
//
//   stdin → parser → on_key → buffer/cursor mutation (hook re-runs)
//   paint → view.render → grid → diff renderer → terminal

use std::env;
use std::path::PathBuf;
use std::process;

use ked_editor::{Buffer, Cursor, Position, View};
use ked_syntax::{Highlight, Language, highlighter_for};
use ked_term::event_loop::{Action, App, EventLoop};
use ked_term::grid::Grid;
use ked_term::input::{KeyCode, KeyEvent, Modifiers};

// ─── Editor ─────────────────────────────────────────────────────────────────

/// The editor application state.
///
/// Holds everything needed to edit one file: the text buffer, the cursor,
/// the scrolling view, the highlight hook chosen at load time, a status
/// message for the bottom line, and the screen position of the cursor
/// computed during the last paint.
struct Editor {
    buffer: Buffer,
    cursor: Cursor,
    view: View,
    highlight: Box<dyn Highlight>,

    /// A message to display on the bottom line. Cleared on the next keypress.
    message: Option<String>,

    /// Screen position of the cursor from the last paint, used by the
    /// event loop to position the hardware terminal cursor.
    cursor_screen: Option<(u16, u16)>,
}

impl Editor {
    /// Create an editor with an empty buffer and no highlighting.
    fn new() -> Self {
        Self {
            buffer: Buffer::new(),
            cursor: Cursor::new(),
            view: View::new(),
            highlight: highlighter_for(Language::Plain),
            message: None,
            cursor_screen: None,
        }
    }

    /// Create an editor with a file loaded from disk.
    ///
    /// The highlight hook is selected from the file's extension before
    /// loading, so rows classify as they are created. A file that cannot
    /// be read leaves an empty buffer (with the path set, so saving
    /// creates the file) and a status message — the editor stays live.
    fn from_file(path: &str) -> Self {
        let path_buf = PathBuf::from(path);
        let highlight = highlighter_for(Language::from_path(&path_buf));

        let (buffer, message) = match Buffer::from_file(&path_buf, &*highlight) {
            Ok(buffer) => (buffer, None),
            Err(e) => {
                let mut buffer = Buffer::new();
                buffer.set_path(path_buf);
                (buffer, Some(format!("{path}: {e}")))
            }
        };

        Self {
            buffer,
            cursor: Cursor::new(),
            view: View::new(),
            highlight,
            message,
            cursor_screen: None,
        }
    }

    /// Set the status message on the bottom line.
    fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    // ── Edit operations ─────────────────────────────────────────────

    /// Insert a printable character at the cursor and advance.
    ///
    /// Past the last row, an empty trailing row is created first.
    fn insert_char(&mut self, ch: char) {
        let line = self.cursor.line();
        if line == self.buffer.row_count() {
            self.buffer.insert_row(line, "", &*self.highlight);
        }
        self.buffer
            .insert_char(line, self.cursor.col(), ch, &*self.highlight);
        self.cursor.move_right(&self.buffer);
    }

    /// Split the current row at the cursor.
    ///
    /// - At the end of a row: a new empty row opens below and the cursor
    ///   moves onto it.
    /// - At column 0: a new empty row pushes the current row down and the
    ///   cursor stays on the empty row.
    /// - Otherwise: the text from the cursor onward moves to a new row
    ///   below, and the cursor lands at its start.
    fn insert_newline(&mut self) {
        let line = self.cursor.line();
        let col = self.cursor.col();

        // Past the last row: open a fresh row and stay below it.
        if line == self.buffer.row_count() {
            self.buffer.insert_row(line, "", &*self.highlight);
            self.cursor
                .set_position(Position::new(line + 1, 0), &self.buffer);
            return;
        }

        if col == self.buffer.line_len(line) {
            self.buffer.insert_row(line + 1, "", &*self.highlight);
            self.cursor
                .set_position(Position::new(line + 1, 0), &self.buffer);
        } else if col == 0 {
            self.buffer.insert_row(line, "", &*self.highlight);
            // The original content moved down; the cursor keeps sitting on
            // the new empty row at the same index.
            self.cursor
                .set_position(Position::new(line, 0), &self.buffer);
        } else {
            self.buffer.split_row(line, col, &*self.highlight);
            self.cursor
                .set_position(Position::new(line + 1, 0), &self.buffer);
        }
    }

    /// Delete the character before the cursor.
    ///
    /// At `(0, 0)` this is a no-op. At column 0 of any other row, the row
    /// merges into the previous one and the cursor lands on the junction.
    fn delete_char(&mut self) {
        let line = self.cursor.line();
        let col = self.cursor.col();

        if line == 0 && col == 0 {
            return;
        }

        // Past the last row there is nothing to delete; just step back
        // onto real content.
        if line == self.buffer.row_count() {
            self.cursor.move_left(&self.buffer);
            return;
        }

        if col > 0 {
            self.buffer.delete_char(line, col - 1, &*self.highlight);
            self.cursor
                .set_position(Position::new(line, col - 1), &self.buffer);
        } else if let Some(junction) = self.buffer.merge_into_previous(line, &*self.highlight) {
            self.cursor
                .set_position(Position::new(line - 1, junction), &self.buffer);
        }
    }

    /// Save the buffer to its file, reporting the outcome on the
    /// message line. Never aborts the editing loop.
    fn save(&mut self) {
        match self.buffer.save() {
            Ok(bytes) => {
                let name = self
                    .buffer
                    .path()
                    .map_or_else(String::new, |p| p.display().to_string());
                self.set_message(format!("\"{name}\" {bytes} bytes written"));
            }
            Err(e) => self.set_message(format!("save failed: {e}")),
        }
    }

    /// Apply one key event. Split from `App::on_key` so tests can drive
    /// the editor without a terminal.
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        // Any keypress clears the previous status message.
        self.message = None;

        if key.modifiers.contains(Modifiers::CTRL) {
            match key.code {
                KeyCode::Char('q') => return Action::Quit,
                KeyCode::Char('s') => self.save(),
                _ => {}
            }
            return Action::Continue;
        }

        match key.code {
            KeyCode::Enter => self.insert_newline(),
            KeyCode::Tab => self.insert_char('\t'),
            KeyCode::Backspace | KeyCode::Delete => self.delete_char(),
            KeyCode::Up => self.cursor.move_up(&self.buffer),
            KeyCode::Down => self.cursor.move_down(&self.buffer),
            KeyCode::Left => self.cursor.move_left(&self.buffer),
            KeyCode::Right => self.cursor.move_right(&self.buffer),
            KeyCode::Home => self.cursor.move_to_line_start(),
            KeyCode::End => self.cursor.move_to_line_end(&self.buffer),
            KeyCode::Char(ch) if !key.modifiers.contains(Modifiers::ALT) => {
                self.insert_char(ch);
            }
            _ => {}
        }

        Action::Continue
    }
}

impl App for Editor {
    fn on_key(&mut self, key: KeyEvent) -> Action {
        self.handle_key(key)
    }

    fn paint(&mut self, grid: &mut Grid) {
        self.cursor_screen =
            self.view
                .render(&self.buffer, &self.cursor, self.message.as_deref(), grid);
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor_screen
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut editor = if args.len() > 1 {
        Editor::from_file(&args[1])
    } else {
        Editor::new()
    };

    let mut event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("ked: failed to initialize terminal: {e}");
        process::exit(1);
    });

    if let Err(e) = event_loop.run(&mut editor) {
        eprintln!("ked: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
