//! Language detection from file names.
//!
//! The language is a pure function of the file name: the extension is
//! compared case-insensitively against a small closed set, and anything
//! unrecognized (or a missing extension) falls back to plain text. The
//! selection happens exactly once, when a file is loaded.

use std::fmt;
use std::path::Path;

/// A recognized language mode.
///
/// `Plain` means "no highlighting" and is the default for unknown or
/// missing extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// No highlighting.
    #[default]
    Plain,
    /// C source files (`.c`, `.h`).
    C,
}

impl Language {
    /// Detect the language from a file path's extension, case-insensitively.
    ///
    /// ```
    /// use std::path::Path;
    /// use ked_syntax::Language;
    ///
    /// assert_eq!(Language::from_path(Path::new("main.c")), Language::C);
    /// assert_eq!(Language::from_path(Path::new("notes.txt")), Language::Plain);
    /// assert_eq!(Language::from_path(Path::new("README")), Language::Plain);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Plain;
        };

        if ext.eq_ignore_ascii_case("c") || ext.eq_ignore_ascii_case("h") {
            Self::C
        } else {
            Self::Plain
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::C => f.write_str("c"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
