//! Text buffer — the ordered sequence of rows making up the document.
//!
//! The `Buffer` exclusively owns its [`Row`] storage. Every structural
//! operation (insert, delete, merge, split) renumbers the affected rows so
//! that `rows[i].index == i` holds at all times, and every content edit
//! flows through a buffer method so the modified flag stays honest.
//!
//! # Design choices
//!
//! - **Plain `Vec<Row>`, no separate count.** The row count is
//!   `rows.len()`; there is no shadow counter to keep in lock-step.
//!
//! - **Stable indices, no retained references.** Callers address rows by
//!   index and re-fetch after any structural change. No live reference
//!   into the vector survives an insert or delete.
//!
//! - **Out-of-range structural ops are silent no-ops.** The editing loop
//!   must stay live; a bad position degrades to "nothing happened", never
//!   an error or a panic.
//!
//! - **Round-trip-correct serialization.** Loading preserves blank lines
//!   and saving joins rows with `\n` plus a trailing newline, so
//!   load → save reproduces the file. (A file without a final newline
//!   gains one, like most editors.)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ked_syntax::Highlight;

use crate::row::Row;

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// The document: an ordered sequence of rows plus file metadata.
pub struct Buffer {
    rows: Vec<Row>,
    path: Option<PathBuf>,
    modified: bool,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// Create an empty buffer with no rows and no file path.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            path: None,
            modified: false,
        }
    }

    /// Create a buffer from text, splitting into rows at `\n`.
    ///
    /// Blank lines become empty rows; a trailing newline does not produce
    /// a trailing empty row.
    #[must_use]
    pub fn from_text(text: &str, hl: &dyn Highlight) -> Self {
        let mut buffer = Self::new();
        buffer.rows = split_rows(text, hl);
        buffer
    }

    /// Load a buffer from a file.
    ///
    /// The buffer starts unmodified with its path set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid UTF-8.
    pub fn from_file(path: &Path, hl: &dyn Highlight) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut buffer = Self::from_text(&text, hl);
        buffer.path = Some(path.to_path_buf());
        Ok(buffer)
    }

    // -- Row access ---------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the buffer holds no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`, or `None` out of range.
    #[inline]
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// All rows in index order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Char length of the row at `line`, or 0 past the last row.
    ///
    /// "Past the last row" is a legal cursor state (the editor lazily
    /// creates a trailing row on first insertion), so this never errors.
    #[inline]
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        self.rows.get(line).map_or(0, Row::char_len)
    }

    // -- Structural operations ----------------------------------------------

    /// Insert a new row holding `content` at `pos`, shifting later rows down.
    ///
    /// Silent no-op when `pos > row_count()`. Afterwards the row count has
    /// grown by exactly one and `rows[i].index == i` holds.
    pub fn insert_row(&mut self, pos: usize, content: impl Into<String>, hl: &dyn Highlight) {
        if pos > self.rows.len() {
            return;
        }
        self.rows.insert(pos, Row::new(pos, content, hl));
        self.renumber_from(pos + 1);
        self.modified = true;
    }

    /// Remove the row at `pos`, shifting later rows up.
    ///
    /// Silent no-op when `pos` is out of range. Afterwards the row count
    /// has shrunk by exactly one and `rows[i].index == i` holds.
    pub fn delete_row(&mut self, pos: usize) {
        if pos >= self.rows.len() {
            return;
        }
        self.rows.remove(pos);
        self.renumber_from(pos);
        self.modified = true;
    }

    /// Append row `pos`'s raw content onto row `pos - 1`, then delete row
    /// `pos`. Used by backspace at column zero.
    ///
    /// Returns the previous row's pre-merge char length — the junction
    /// column where the cursor belongs. Silent no-op (returning `None`)
    /// when `pos` is zero or out of range.
    pub fn merge_into_previous(&mut self, pos: usize, hl: &dyn Highlight) -> Option<usize> {
        if pos == 0 || pos >= self.rows.len() {
            return None;
        }

        let junction = self.rows[pos - 1].char_len();
        let merged_raw = self.rows[pos].raw().to_owned();
        self.rows[pos - 1].append(&merged_raw, hl);
        self.delete_row(pos);
        Some(junction)
    }

    /// Split the row at `line` at char offset `col`: the suffix moves to a
    /// new row inserted at `line + 1`.
    ///
    /// Silent no-op when `line` is out of range; `col` clamps to the row
    /// length (an end-of-row split yields an empty new row).
    pub fn split_row(&mut self, line: usize, col: usize, hl: &dyn Highlight) {
        if line >= self.rows.len() {
            return;
        }
        let suffix = self.rows[line].split_off(col, hl);
        self.insert_row(line + 1, suffix, hl);
        self.modified = true;
    }

    /// Re-point row indices starting at `from` so the index invariant holds.
    fn renumber_from(&mut self, from: usize) {
        for i in from.min(self.rows.len())..self.rows.len() {
            self.rows[i].set_index(i);
        }
    }

    // -- Content edits ------------------------------------------------------

    /// Insert a character into the row at `line`, char offset `col`.
    ///
    /// `col` clamps to the row end; an out-of-range `line` is a silent
    /// no-op (the engine appends the lazy trailing row before calling).
    pub fn insert_char(&mut self, line: usize, col: usize, ch: char, hl: &dyn Highlight) {
        if let Some(row) = self.rows.get_mut(line) {
            row.insert_char(col, ch, hl);
            self.modified = true;
        }
    }

    /// Delete the character in the row at `line`, char offset `col`.
    ///
    /// Out-of-range `line` or `col` is a silent no-op.
    pub fn delete_char(&mut self, line: usize, col: usize, hl: &dyn Highlight) {
        if let Some(row) = self.rows.get_mut(line) {
            if col < row.char_len() {
                row.delete_char(col, hl);
                self.modified = true;
            }
        }
    }

    // -- Serialization ------------------------------------------------------

    /// The whole document as text: rows joined with `\n` plus a trailing
    /// newline. An empty buffer serializes to the empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        let mut text = String::new();
        for row in &self.rows {
            text.push_str(row.raw());
            text.push('\n');
        }
        text
    }

    // -- Metadata -----------------------------------------------------------

    /// The file path this buffer is associated with, if any.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Set the file path for this buffer.
    #[inline]
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// True if the buffer has been modified since the last save (or load).
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    // -- File I/O -----------------------------------------------------------

    /// Save the buffer to its associated file path, overwriting.
    ///
    /// Returns the number of bytes written and marks the buffer
    /// unmodified on success.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is set or the write fails.
    pub fn save(&mut self) -> io::Result<usize> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "buffer has no file path"))?
            .clone();
        self.save_as(&path)
    }

    /// Save the buffer to a specific path, updating the stored path.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_as(&mut self, path: &Path) -> io::Result<usize> {
        let content = self.to_text();
        fs::write(path, &content)?;
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(content.len())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("rows", &self.row_count())
            .field("modified", &self.modified)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split text into rows at `\n`, preserving blank lines.
///
/// A trailing newline terminates the last row rather than opening an
/// empty one, so `"abc\n"` is one row and `"abc\n\n"` is two.
fn split_rows(text: &str, hl: &dyn Highlight) -> Vec<Row> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<&str> = text.split('\n').collect();
    if text.ends_with('\n') {
        lines.pop();
    }

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| Row::new(i, line, hl))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use ked_syntax::classify::PlainText;

    fn buf(text: &str) -> Buffer {
        Buffer::from_text(text, &PlainText)
    }

    fn raws(buffer: &Buffer) -> Vec<&str> {
        buffer.rows().iter().map(Row::raw).collect()
    }

    fn assert_indices_consistent(buffer: &Buffer) {
        for (i, row) in buffer.rows().iter().enumerate() {
            assert_eq!(row.index(), i, "row {i} has stale index {}", row.index());
        }
    }

    // -- Construction and loading -------------------------------------------

    #[test]
    fn new_buffer_is_empty() {
        let buffer = Buffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.row_count(), 0);
        assert!(!buffer.is_modified());
        assert!(buffer.path().is_none());
    }

    #[test]
    fn from_text_basic() {
        let buffer = buf("hello\nworld\n");
        assert_eq!(raws(&buffer), vec!["hello", "world"]);
        assert!(!buffer.is_modified());
        assert_indices_consistent(&buffer);
    }

    #[test]
    fn from_text_preserves_blank_lines() {
        let buffer = buf("abc\n\ndef\n");
        assert_eq!(raws(&buffer), vec!["abc", "", "def"]);
    }

    #[test]
    fn from_text_no_trailing_newline() {
        let buffer = buf("abc\ndef");
        assert_eq!(raws(&buffer), vec!["abc", "def"]);
    }

    #[test]
    fn from_text_empty_is_no_rows() {
        assert_eq!(buf("").row_count(), 0);
    }

    #[test]
    fn from_text_single_newline_is_one_empty_row() {
        assert_eq!(raws(&buf("\n")), vec![""]);
    }

    #[test]
    fn from_text_only_blank_lines() {
        assert_eq!(raws(&buf("\n\n\n")), vec!["", "", ""]);
    }

    // -- insert_row ---------------------------------------------------------

    #[test]
    fn insert_row_at_start() {
        let mut buffer = buf("b\nc\n");
        buffer.insert_row(0, "a", &PlainText);
        assert_eq!(raws(&buffer), vec!["a", "b", "c"]);
        assert_indices_consistent(&buffer);
        assert!(buffer.is_modified());
    }

    #[test]
    fn insert_row_in_middle() {
        let mut buffer = buf("a\nc\n");
        buffer.insert_row(1, "b", &PlainText);
        assert_eq!(raws(&buffer), vec!["a", "b", "c"]);
        assert_indices_consistent(&buffer);
    }

    #[test]
    fn insert_row_at_end() {
        let mut buffer = buf("a\n");
        buffer.insert_row(1, "b", &PlainText);
        assert_eq!(raws(&buffer), vec!["a", "b"]);
        assert_indices_consistent(&buffer);
    }

    #[test]
    fn insert_row_past_end_is_noop() {
        let mut buffer = buf("a\n");
        buffer.insert_row(5, "x", &PlainText);
        assert_eq!(raws(&buffer), vec!["a"]);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn insert_row_into_empty_buffer() {
        let mut buffer = Buffer::new();
        buffer.insert_row(0, "first", &PlainText);
        assert_eq!(raws(&buffer), vec!["first"]);
        assert_indices_consistent(&buffer);
    }

    // -- delete_row ---------------------------------------------------------

    #[test]
    fn delete_row_from_middle() {
        let mut buffer = buf("a\nb\nc\n");
        buffer.delete_row(1);
        assert_eq!(raws(&buffer), vec!["a", "c"]);
        assert_indices_consistent(&buffer);
        assert!(buffer.is_modified());
    }

    #[test]
    fn delete_first_and_last_row() {
        let mut buffer = buf("a\nb\nc\n");
        buffer.delete_row(0);
        assert_eq!(raws(&buffer), vec!["b", "c"]);
        buffer.delete_row(1);
        assert_eq!(raws(&buffer), vec!["b"]);
        assert_indices_consistent(&buffer);
    }

    #[test]
    fn delete_row_out_of_range_is_noop() {
        let mut buffer = buf("a\n");
        buffer.delete_row(1);
        buffer.delete_row(99);
        assert_eq!(raws(&buffer), vec!["a"]);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn index_invariant_across_mixed_sequence() {
        let mut buffer = Buffer::new();
        buffer.insert_row(0, "a", &PlainText);
        assert_indices_consistent(&buffer);
        buffer.insert_row(0, "b", &PlainText);
        assert_indices_consistent(&buffer);
        buffer.insert_row(1, "c", &PlainText);
        assert_indices_consistent(&buffer);
        buffer.delete_row(0);
        assert_indices_consistent(&buffer);
        buffer.insert_row(2, "d", &PlainText);
        assert_indices_consistent(&buffer);
        buffer.delete_row(1);
        assert_indices_consistent(&buffer);
        buffer.delete_row(0);
        assert_indices_consistent(&buffer);
        assert_eq!(raws(&buffer), vec!["d"]);
    }

    // -- merge_into_previous ------------------------------------------------

    #[test]
    fn merge_appends_and_deletes() {
        let mut buffer = buf("hello\nworld\n");
        let junction = buffer.merge_into_previous(1, &PlainText);
        assert_eq!(junction, Some(5));
        assert_eq!(raws(&buffer), vec!["helloworld"]);
        assert_indices_consistent(&buffer);
    }

    #[test]
    fn merge_with_empty_previous() {
        let mut buffer = buf("\nabc\n");
        let junction = buffer.merge_into_previous(1, &PlainText);
        assert_eq!(junction, Some(0));
        assert_eq!(raws(&buffer), vec!["abc"]);
    }

    #[test]
    fn merge_row_zero_is_noop() {
        let mut buffer = buf("a\nb\n");
        assert_eq!(buffer.merge_into_previous(0, &PlainText), None);
        assert_eq!(raws(&buffer), vec!["a", "b"]);
    }

    #[test]
    fn merge_out_of_range_is_noop() {
        let mut buffer = buf("a\nb\n");
        assert_eq!(buffer.merge_into_previous(2, &PlainText), None);
        assert_eq!(raws(&buffer), vec!["a", "b"]);
    }

    // -- split_row ----------------------------------------------------------

    #[test]
    fn split_row_in_middle() {
        let mut buffer = buf("hello world\n");
        buffer.split_row(0, 5, &PlainText);
        assert_eq!(raws(&buffer), vec!["hello", " world"]);
        assert_indices_consistent(&buffer);
    }

    #[test]
    fn split_row_at_start() {
        let mut buffer = buf("abc\n");
        buffer.split_row(0, 0, &PlainText);
        assert_eq!(raws(&buffer), vec!["", "abc"]);
    }

    #[test]
    fn split_row_at_end_creates_empty_row() {
        let mut buffer = buf("abc\n");
        buffer.split_row(0, 3, &PlainText);
        assert_eq!(raws(&buffer), vec!["abc", ""]);
    }

    #[test]
    fn split_row_out_of_range_is_noop() {
        let mut buffer = buf("abc\n");
        buffer.split_row(5, 0, &PlainText);
        assert_eq!(raws(&buffer), vec!["abc"]);
    }

    #[test]
    fn split_then_merge_restores_row() {
        let original = "some text\twith tabs";
        let char_len = original.chars().count();
        for k in 0..=char_len {
            let mut buffer = Buffer::from_text(&format!("{original}\n"), &PlainText);
            buffer.split_row(0, k, &PlainText);
            assert_eq!(buffer.row_count(), 2, "split at {k}");
            buffer.merge_into_previous(1, &PlainText);
            assert_eq!(raws(&buffer), vec![original], "split/merge at {k}");
            assert_indices_consistent(&buffer);
        }
    }

    // -- Content edits ------------------------------------------------------

    #[test]
    fn insert_char_through_buffer() {
        let mut buffer = buf("hllo\n");
        buffer.insert_char(0, 1, 'e', &PlainText);
        assert_eq!(raws(&buffer), vec!["hello"]);
        assert!(buffer.is_modified());
    }

    #[test]
    fn insert_char_past_last_row_is_noop() {
        let mut buffer = buf("a\n");
        buffer.insert_char(1, 0, 'x', &PlainText);
        assert_eq!(raws(&buffer), vec!["a"]);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn delete_char_through_buffer() {
        let mut buffer = buf("heello\n");
        buffer.delete_char(0, 1, &PlainText);
        assert_eq!(raws(&buffer), vec!["hello"]);
        assert!(buffer.is_modified());
    }

    #[test]
    fn delete_char_out_of_range_is_noop() {
        let mut buffer = buf("ab\n");
        buffer.delete_char(0, 2, &PlainText);
        buffer.delete_char(5, 0, &PlainText);
        assert_eq!(raws(&buffer), vec!["ab"]);
        assert!(!buffer.is_modified());
    }

    // -- Serialization ------------------------------------------------------

    #[test]
    fn to_text_joins_with_newlines() {
        let buffer = buf("a\nb\nc\n");
        assert_eq!(buffer.to_text(), "a\nb\nc\n");
    }

    #[test]
    fn to_text_round_trips_blank_lines() {
        let text = "abc\n\ndef\n";
        assert_eq!(buf(text).to_text(), text);
    }

    #[test]
    fn to_text_adds_missing_final_newline() {
        assert_eq!(buf("abc").to_text(), "abc\n");
    }

    #[test]
    fn to_text_empty_buffer_is_empty() {
        assert_eq!(Buffer::new().to_text(), "");
    }

    // -- line_len -----------------------------------------------------------

    #[test]
    fn line_len_counts_chars() {
        let buffer = buf("hello\ncafé\n");
        assert_eq!(buffer.line_len(0), 5);
        assert_eq!(buffer.line_len(1), 4);
    }

    #[test]
    fn line_len_past_last_row_is_zero() {
        let buffer = buf("hello\n");
        assert_eq!(buffer.line_len(1), 0);
        assert_eq!(buffer.line_len(99), 0);
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("ked_buffer_test");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("roundtrip.txt");

        let mut buffer = buf("hello\n\nworld\n");
        let written = buffer.save_as(&path).unwrap();
        assert_eq!(written, "hello\n\nworld\n".len());
        assert!(!buffer.is_modified());
        assert_eq!(buffer.path(), Some(path.as_path()));

        let loaded = Buffer::from_file(&path, &PlainText).unwrap();
        assert_eq!(loaded.to_text(), "hello\n\nworld\n");
        assert_eq!(raws(&loaded), vec!["hello", "", "world"]);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = std::env::temp_dir().join("ked_buffer_test_overwrite");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("overwrite.txt");

        fs::write(&path, "something much longer than the buffer\n").unwrap();
        let mut buffer = buf("short\n");
        buffer.save_as(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short\n");

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn save_no_path_errors() {
        let mut buffer = buf("hello\n");
        assert!(buffer.save().is_err());
    }

    #[test]
    fn from_file_nonexistent() {
        let result = Buffer::from_file(Path::new("/nonexistent/path/file.txt"), &PlainText);
        assert!(result.is_err());
    }

    #[test]
    fn modified_tracking_across_save() {
        let dir = std::env::temp_dir().join("ked_buffer_test_modified");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("modified.txt");

        let mut buffer = buf("hello\n");
        buffer.insert_char(0, 5, '!', &PlainText);
        assert!(buffer.is_modified());

        buffer.save_as(&path).unwrap();
        assert!(!buffer.is_modified());

        buffer.delete_char(0, 5, &PlainText);
        assert!(buffer.is_modified());

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir(&dir);
    }
}
