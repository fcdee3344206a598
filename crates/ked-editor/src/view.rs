//! View — the bridge from buffer to the terminal grid.
//!
//! The view lays the buffer's rendered rows onto the grid with **soft
//! wrapping**: a logical row whose display form is wider than the grid
//! continues on the next physical row, without any buffer-level break.
//! After each logical row the layout advances to a fresh physical row no
//! matter how much width remains.
//!
//! The same wrap arithmetic places the hardware cursor. The cursor's raw
//! char column converts to a display column (tabs expanded), and the
//! display column converts to a physical `(row, col)` exactly the way the
//! text did — cursor and text can never disagree about where a character
//! sits.
//!
//! The view holds one piece of state: the first visible physical row.
//! Each render adjusts it so the cursor's physical row is on screen, which
//! is how overflow past the grid height turns into scrolling.
//!
//! When the grid is at least two rows tall, the bottom row is reserved
//! for the status/message line.

use ked_term::grid::Grid;

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::row::TAB_STOP;

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Convert a raw char column to a display column.
///
/// Walks the raw text, expanding tabs to the next tab stop, stopping at
/// `col` or when the characters run out. This is the one mapping between
/// the buffer's raw-char coordinates and the display columns the terminal
/// shows; tabs are the only reason they differ.
#[must_use]
pub fn raw_col_to_display_col(raw: &str, col: usize) -> usize {
    let mut display_col = 0;

    for (i, ch) in raw.chars().enumerate() {
        if i >= col {
            break;
        }
        if ch == '\t' {
            display_col = (display_col / TAB_STOP + 1) * TAB_STOP;
        } else {
            display_col += 1;
        }
    }

    display_col
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// A scrolling, soft-wrapping view of a buffer onto a grid.
///
/// Holds only the scroll offset; buffer and cursor are passed to
/// [`render`](Self::render) as parameters.
#[derive(Debug, Clone, Default)]
pub struct View {
    /// First visible physical (wrapped) row.
    top: usize,
}

impl View {
    /// Create a view scrolled to the top.
    #[must_use]
    pub const fn new() -> Self {
        Self { top: 0 }
    }

    /// The first visible physical row (for tests and the status line).
    #[inline]
    #[must_use]
    pub const fn top(&self) -> usize {
        self.top
    }

    /// Lay the buffer out on the grid and place the cursor.
    ///
    /// Paints the visible slice of the wrapped rows, the message line (when
    /// `message` is set and the grid is tall enough), and returns the
    /// cursor's screen position — `None` when the grid has no room.
    pub fn render(
        &mut self,
        buf: &Buffer,
        cursor: &Cursor,
        message: Option<&str>,
        grid: &mut Grid,
    ) -> Option<(u16, u16)> {
        let width = usize::from(grid.width());
        let height = usize::from(grid.height());
        if width == 0 || height == 0 {
            return None;
        }

        // Bottom row is the message line when there's room for one.
        let text_height = if height >= 2 { height - 1 } else { height };

        // ── Cursor → physical position ───────────────────────────
        let cursor_phys = self.cursor_physical(buf, cursor, width);

        // ── Scroll so the cursor's physical row is visible ───────
        if cursor_phys.0 < self.top {
            self.top = cursor_phys.0;
        } else if cursor_phys.0 >= self.top + text_height {
            self.top = cursor_phys.0 + 1 - text_height;
        }

        // ── Paint the visible slice of wrapped rows ──────────────
        let bottom = self.top + text_height;
        let mut phys = 0usize;
        for row in buf.rows() {
            let row_phys = physical_rows(row.display_len(), width);
            // Skip rows entirely above or below the viewport.
            if phys + row_phys > self.top && phys < bottom {
                for (i, ch) in row.rendered().chars().enumerate() {
                    let line = phys + i / width;
                    if line < self.top || line >= bottom {
                        continue;
                    }
                    #[allow(clippy::cast_possible_truncation)]
                    grid.set((i % width) as u16, (line - self.top) as u16, ch);
                }
            }
            phys += row_phys;
            if phys >= bottom {
                break;
            }
        }

        // ── Message line ─────────────────────────────────────────
        if height >= 2 {
            if let Some(msg) = message {
                #[allow(clippy::cast_possible_truncation)]
                let y = (height - 1) as u16;
                for (i, ch) in msg.chars().take(width).enumerate() {
                    #[allow(clippy::cast_possible_truncation)]
                    grid.set(i as u16, y, ch);
                }
            }
        }

        // ── Cursor screen position ───────────────────────────────
        let (cy, cx) = cursor_phys;
        if cy >= self.top && cy < bottom {
            #[allow(clippy::cast_possible_truncation)]
            let pos = (cx as u16, (cy - self.top) as u16);
            Some(pos)
        } else {
            None
        }
    }

    /// The cursor's physical `(row, col)` in wrapped coordinates,
    /// before scrolling.
    fn cursor_physical(&self, buf: &Buffer, cursor: &Cursor, width: usize) -> (usize, usize) {
        let mut phys = 0usize;
        for row in buf.rows().iter().take(cursor.line()) {
            phys += physical_rows(row.display_len(), width);
        }

        // Past the last row: the first physical row after all content.
        let Some(row) = buf.row(cursor.line()) else {
            return (phys, 0);
        };

        let display_col = raw_col_to_display_col(row.raw(), cursor.col());
        (phys + display_col / width, display_col % width)
    }
}

/// Number of physical rows a display form of `len` chars occupies when
/// wrapped at `width`. An empty row still occupies one.
const fn physical_rows(len: usize, width: usize) -> usize {
    if len == 0 { 1 } else { len.div_ceil(width) }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::position::Position;
    use ked_syntax::classify::PlainText;

    fn buf(text: &str) -> Buffer {
        Buffer::from_text(text, &PlainText)
    }

    fn cursor_at(line: usize, col: usize) -> Cursor {
        Cursor::at(Position::new(line, col))
    }

    fn grid_line(grid: &Grid, y: u16) -> String {
        grid.row(y).unwrap().iter().collect::<String>()
    }

    // -- Column mapping -----------------------------------------------------

    #[test]
    fn display_col_without_tabs_is_identity() {
        assert_eq!(raw_col_to_display_col("hello", 0), 0);
        assert_eq!(raw_col_to_display_col("hello", 3), 3);
        assert_eq!(raw_col_to_display_col("hello", 5), 5);
    }

    #[test]
    fn display_col_expands_tabs() {
        // raw "a\tb" displays as "a   b".
        assert_eq!(raw_col_to_display_col("a\tb", 1), 1); // on the tab
        assert_eq!(raw_col_to_display_col("a\tb", 2), 4); // on 'b'
        assert_eq!(raw_col_to_display_col("a\tb", 3), 5); // past 'b'
    }

    #[test]
    fn display_col_leading_tabs() {
        assert_eq!(raw_col_to_display_col("\t\tx", 2), 8);
    }

    #[test]
    fn display_col_clamps_to_text_end() {
        assert_eq!(raw_col_to_display_col("ab", 99), 2);
    }

    // -- Basic layout -------------------------------------------------------

    #[test]
    fn short_rows_render_one_per_line() {
        let b = buf("hello\nworld\n");
        let mut grid = Grid::new(10, 5);
        let mut view = View::new();
        let pos = view.render(&b, &cursor_at(0, 0), None, &mut grid);

        assert_eq!(grid_line(&grid, 0), "hello     ");
        assert_eq!(grid_line(&grid, 1), "world     ");
        assert_eq!(pos, Some((0, 0)));
    }

    #[test]
    fn blank_rows_occupy_a_physical_row() {
        let b = buf("a\n\nb\n");
        let mut grid = Grid::new(10, 5);
        let mut view = View::new();
        view.render(&b, &cursor_at(0, 0), None, &mut grid);

        assert_eq!(grid_line(&grid, 0), "a         ");
        assert_eq!(grid_line(&grid, 1), "          ");
        assert_eq!(grid_line(&grid, 2), "b         ");
    }

    #[test]
    fn tabs_render_expanded() {
        let b = buf("a\tb\n");
        let mut grid = Grid::new(10, 3);
        let mut view = View::new();
        view.render(&b, &cursor_at(0, 0), None, &mut grid);

        assert_eq!(grid_line(&grid, 0), "a   b     ");
    }

    // -- Soft wrap ----------------------------------------------------------

    #[test]
    fn long_row_wraps_at_grid_width() {
        let b = buf("abcdefghij\n");
        let mut grid = Grid::new(4, 5);
        let mut view = View::new();
        view.render(&b, &cursor_at(0, 0), None, &mut grid);

        assert_eq!(grid_line(&grid, 0), "abcd");
        assert_eq!(grid_line(&grid, 1), "efgh");
        assert_eq!(grid_line(&grid, 2), "ij  ");
    }

    #[test]
    fn next_row_starts_on_fresh_physical_row() {
        let b = buf("abcde\nxy\n");
        let mut grid = Grid::new(4, 5);
        let mut view = View::new();
        view.render(&b, &cursor_at(0, 0), None, &mut grid);

        assert_eq!(grid_line(&grid, 0), "abcd");
        assert_eq!(grid_line(&grid, 1), "e   ");
        assert_eq!(grid_line(&grid, 2), "xy  ");
    }

    // -- Cursor placement ---------------------------------------------------

    #[test]
    fn cursor_on_wrapped_segment() {
        let b = buf("abcdefghij\n");
        let mut grid = Grid::new(4, 5);
        let mut view = View::new();
        // Raw col 6 = 'g', display col 6 → physical row 1, col 2.
        let pos = view.render(&b, &cursor_at(0, 6), None, &mut grid);
        assert_eq!(pos, Some((2, 1)));
    }

    #[test]
    fn cursor_after_tab_uses_display_columns() {
        let b = buf("a\tb\n");
        let mut grid = Grid::new(10, 3);
        let mut view = View::new();
        // Cursor on 'b' (raw col 2) → display col 4.
        let pos = view.render(&b, &cursor_at(0, 2), None, &mut grid);
        assert_eq!(pos, Some((4, 0)));
    }

    #[test]
    fn cursor_on_later_logical_row_counts_wraps_above() {
        let b = buf("abcdefghij\nxy\n");
        let mut grid = Grid::new(4, 6);
        let mut view = View::new();
        // Row 0 wraps to 3 physical rows; 'y' sits on physical row 3.
        let pos = view.render(&b, &cursor_at(1, 1), None, &mut grid);
        assert_eq!(pos, Some((1, 3)));
    }

    #[test]
    fn cursor_past_last_row_sits_below_content() {
        let b = buf("ab\n");
        let mut grid = Grid::new(10, 4);
        let mut view = View::new();
        let pos = view.render(&b, &cursor_at(1, 0), None, &mut grid);
        assert_eq!(pos, Some((0, 1)));
    }

    #[test]
    fn cursor_in_empty_buffer_is_origin() {
        let b = Buffer::new();
        let mut grid = Grid::new(10, 4);
        let mut view = View::new();
        let pos = view.render(&b, &Cursor::new(), None, &mut grid);
        assert_eq!(pos, Some((0, 0)));
    }

    // -- Scrolling ----------------------------------------------------------

    #[test]
    fn scrolls_down_to_keep_cursor_visible() {
        let b = buf("a\nb\nc\nd\ne\nf\n");
        // 3 grid rows, 2 for text (message line reserved).
        let mut grid = Grid::new(10, 3);
        let mut view = View::new();

        let pos = view.render(&b, &cursor_at(3, 0), None, &mut grid);
        // Cursor on physical row 3; viewport shows rows 2..4.
        assert_eq!(view.top(), 2);
        assert_eq!(pos, Some((0, 1)));
        assert_eq!(grid_line(&grid, 0), "c         ");
        assert_eq!(grid_line(&grid, 1), "d         ");
    }

    #[test]
    fn scrolls_back_up() {
        let b = buf("a\nb\nc\nd\ne\nf\n");
        let mut grid = Grid::new(10, 3);
        let mut view = View::new();

        view.render(&b, &cursor_at(5, 0), None, &mut grid);
        assert_eq!(view.top(), 4);

        grid.clear();
        let pos = view.render(&b, &cursor_at(0, 0), None, &mut grid);
        assert_eq!(view.top(), 0);
        assert_eq!(pos, Some((0, 0)));
        assert_eq!(grid_line(&grid, 0), "a         ");
    }

    #[test]
    fn scroll_counts_wrapped_rows() {
        // One logical row that wraps to 4 physical rows.
        let b = buf("abcdefghijklmnop\n");
        let mut grid = Grid::new(4, 3); // 2 text rows
        let mut view = View::new();

        // Cursor at the end: display col 16 → physical row 4, col 0.
        let pos = view.render(&b, &cursor_at(0, 16), None, &mut grid);
        assert_eq!(view.top(), 3);
        assert_eq!(pos, Some((0, 1)));
        // Visible: physical rows 3 and 4 — the tail of the wrap.
        assert_eq!(grid_line(&grid, 0), "mnop");
    }

    #[test]
    fn stable_viewport_when_cursor_visible() {
        let b = buf("a\nb\nc\nd\n");
        let mut grid = Grid::new(10, 5);
        let mut view = View::new();

        view.render(&b, &cursor_at(2, 0), None, &mut grid);
        let top = view.top();
        grid.clear();
        view.render(&b, &cursor_at(1, 0), None, &mut grid);
        assert_eq!(view.top(), top, "no scroll while cursor stays visible");
    }

    // -- Message line -------------------------------------------------------

    #[test]
    fn message_renders_on_bottom_row() {
        let b = buf("text\n");
        let mut grid = Grid::new(10, 3);
        let mut view = View::new();
        view.render(&b, &cursor_at(0, 0), Some("saved"), &mut grid);

        assert_eq!(grid_line(&grid, 2), "saved     ");
    }

    #[test]
    fn message_truncates_to_grid_width() {
        let b = buf("text\n");
        let mut grid = Grid::new(5, 3);
        let mut view = View::new();
        view.render(&b, &cursor_at(0, 0), Some("a very long message"), &mut grid);

        assert_eq!(grid_line(&grid, 2), "a ver");
    }

    #[test]
    fn text_never_paints_into_message_row() {
        let b = buf("a\nb\nc\nd\ne\n");
        let mut grid = Grid::new(10, 3);
        let mut view = View::new();
        view.render(&b, &cursor_at(0, 0), None, &mut grid);

        // Two text rows painted; the reserved bottom row stays blank.
        assert_eq!(grid_line(&grid, 2), "          ");
    }

    // -- Degenerate grids ---------------------------------------------------

    #[test]
    fn zero_size_grid_renders_nothing() {
        let b = buf("text\n");
        let mut grid = Grid::new(0, 0);
        let mut view = View::new();
        assert_eq!(view.render(&b, &cursor_at(0, 0), None, &mut grid), None);
    }

    #[test]
    fn single_row_grid_has_no_message_line() {
        let b = buf("text\n");
        let mut grid = Grid::new(10, 1);
        let mut view = View::new();
        let pos = view.render(&b, &cursor_at(0, 1), Some("ignored"), &mut grid);

        assert_eq!(grid_line(&grid, 0), "text      ");
        assert_eq!(pos, Some((1, 0)));
    }
}
