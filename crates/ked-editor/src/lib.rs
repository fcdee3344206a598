//! # ked-editor — Editor core for ked
//!
//! This crate contains the fundamental building blocks of the editor:
//!
//! - **[`position`]** — the `Position` (line, col) value type, 0-indexed
//! - **[`row`]** — one logical line: raw text, tab-expanded display form,
//!   and the highlight hook's rendered form, kept consistent on every edit
//! - **[`buffer`]** — the ordered row sequence with structural operations
//!   (insert, delete, merge, split) and file I/O
//! - **[`cursor`]** — the logical edit position and its movement rules
//! - **[`view`]** — soft-wrap layout onto the terminal grid and the
//!   wrapped cursor placement
//!
//! Columns throughout this crate are **raw char offsets** into a row's
//! text — the space edits happen in. The view converts to display columns
//! (tabs expanded) at the render seam; nothing else ever does.

pub mod buffer;
pub mod cursor;
pub mod position;
pub mod row;
pub mod view;

pub use buffer::Buffer;
pub use cursor::Cursor;
pub use position::Position;
pub use row::{Row, TAB_STOP};
pub use view::View;
