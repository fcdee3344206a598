//! # ked-syntax — Syntax classification hook for ked
//!
//! The editor core treats syntax highlighting as a pluggable, pure
//! transformation: a row's display text goes in, a rendered form comes
//! out. This crate owns that seam:
//!
//! - **[`language`]** — the closed set of recognized languages and the
//!   filename-extension detection that picks one at load time
//! - **[`classify`]** — the [`Highlight`](classify::Highlight) trait and
//!   its shipped implementations
//!
//! The shipped classifiers are identity functions: the hook's contract is
//! fully specified and exercised, but no real classification happens yet.
//! A future highlighter only has to implement one method.

pub mod classify;
pub mod language;

pub use classify::{Highlight, highlighter_for};
pub use language::Language;
