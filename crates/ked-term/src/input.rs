// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into logical key events. Handles the protocols a
// plain editing session produces:
//
// - Control characters (Ctrl+letter, Tab, Enter, Backspace)
// - Legacy CSI sequences (arrows, Home/End, Delete)
// - SS3 sequences (arrow/Home/End alternate encoding from some terminals)
// - Alt+key (ESC followed by a printable character)
// - UTF-8 multi-byte characters
//
// # Design
//
// The parser maintains a small internal byte buffer because escape
// sequences can span multiple `read()` calls. Feed bytes with
// [`Parser::advance`], retrieve events from the returned `Vec`.
// After a timeout with no new bytes, call [`Parser::flush`] to
// emit any pending lone ESC as a real Escape keypress.
//
// Number parsing is done directly on `&[u8]` — no intermediate
// `String` allocation for CSI parameter decoding.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A keyboard event with key identity and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys (Shift, Alt, Ctrl).
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A plain keypress with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A Ctrl+key press.
    #[inline]
    #[must_use]
    pub const fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::CTRL,
        }
    }
}

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters use
/// [`Char`](KeyCode::Char).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode character (printable).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Matches the xterm CSI modifier encoding (`param = 1 + bitmask`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// Feed raw bytes via [`advance`](Parser::advance) and collect
/// [`KeyEvent`]s. The parser buffers incomplete sequences internally and
/// resumes parsing when more bytes arrive.
///
/// # Escape vs escape-sequence ambiguity
///
/// A bare `ESC` byte (0x1B) could be either a standalone Escape keypress
/// or the start of a multi-byte escape sequence. The parser keeps a lone
/// ESC pending. The caller should wait a short timeout (~10ms) and then
/// call [`flush`](Parser::flush) to emit the pending ESC as a real Escape
/// key event.
pub struct Parser {
    /// Accumulated raw bytes waiting to be parsed.
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes from stdin and return all events that can be parsed.
    ///
    /// Bytes that form an incomplete sequence are kept in the internal
    /// buffer and will be combined with future `advance` calls. Call
    /// [`flush`](Parser::flush) after a timeout to emit any pending
    /// lone ESC.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf, pos) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        // Compact: remove consumed bytes, keep unconsumed remainder.
        if pos > 0 {
            self.buf.drain(..pos);
        }

        events
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush pending bytes as literal key events.
    ///
    /// Called after a timeout (typically ~10ms) to resolve the ESC
    /// ambiguity: a lone ESC byte becomes an Escape key event, and
    /// any other leftover bytes become `Char` events.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        for &byte in &self.buf {
            let code = match byte {
                0x1B => KeyCode::Escape,
                b @ 0x01..=0x1A => KeyCode::Char((b + b'a' - 1) as char),
                0x7F => KeyCode::Backspace,
                b @ 0x20..=0x7E => KeyCode::Char(b as char),
                _ => continue,
            };
            let modifiers = match byte {
                0x01..=0x1A => Modifiers::CTRL,
                _ => Modifiers::empty(),
            };
            events.push(KeyEvent { code, modifiers });
        }
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────
//
// All parse functions are pure — they read from `buf[pos..]` and return
// what they found plus how many bytes to consume. No mutable state.

/// Result of trying to parse one event from the buffer.
enum Parsed {
    /// Successfully parsed an event, consuming `usize` bytes.
    Event(KeyEvent, usize),
    /// Sequence is incomplete — need more bytes.
    Incomplete,
    /// Unrecognized byte(s), skip `usize` bytes.
    Skip(usize),
}

/// Try to parse a single event starting at `buf[pos]`.
fn try_parse(buf: &[u8], pos: usize) -> Parsed {
    let remaining = &buf[pos..];
    if remaining.is_empty() {
        return Parsed::Skip(0);
    }

    match remaining[0] {
        // ESC — could be escape sequence or standalone Escape key.
        0x1B => parse_escape(remaining),
        // Control characters. Tab (0x09), Enter (0x0A/0x0D), and
        // Backspace (0x08/0x7F) get their own keys; the rest decode
        // as Ctrl+letter.
        b @ (0x01..=0x07 | 0x0B..=0x0C | 0x0E..=0x1A) => Parsed::Event(
            KeyEvent::ctrl(KeyCode::Char((b + b'a' - 1) as char)),
            1,
        ),
        0x08 | 0x7F => Parsed::Event(KeyEvent::plain(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(KeyEvent::plain(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(KeyEvent::plain(KeyCode::Enter), 1),
        // ASCII printable.
        b @ 0x20..=0x7E => Parsed::Event(KeyEvent::plain(KeyCode::Char(b as char)), 1),
        // UTF-8 multi-byte.
        0xC0..=0xFF => parse_utf8(remaining),
        // NUL and bare continuation bytes (0x80..=0xBF) — skip.
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        // CSI: ESC [
        b'[' => parse_csi(buf),
        // SS3: ESC O
        b'O' => parse_ss3(buf),
        // Alt+ESC.
        0x1B => Parsed::Event(
            KeyEvent {
                code: KeyCode::Escape,
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        // Alt+printable character.
        b @ 0x20..=0x7E => Parsed::Event(
            KeyEvent {
                code: KeyCode::Char(b as char),
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        // Alt+control character (e.g., ESC Ctrl+A).
        b @ 0x01..=0x1A => Parsed::Event(
            KeyEvent {
                code: KeyCode::Char((b + b'a' - 1) as char),
                modifiers: Modifiers::ALT | Modifiers::CTRL,
            },
            2,
        ),
        // Unknown byte after ESC — emit standalone Escape.
        _ => Parsed::Event(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    // Scan for the final byte (0x40..=0x7E).
    // CSI parameter bytes are in 0x30..=0x3F, intermediate in 0x20..=0x2F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            // Invalid byte in CSI sequence — abort.
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    // ── Tilde-terminated sequences (editing keys) ────────────────────
    if final_byte == b'~' {
        let first = params.first().copied().unwrap_or(0);

        return match first {
            1 | 7 => Parsed::Event(KeyEvent { code: KeyCode::Home, modifiers }, consumed),
            3 => Parsed::Event(KeyEvent { code: KeyCode::Delete, modifiers }, consumed),
            4 | 8 => Parsed::Event(KeyEvent { code: KeyCode::End, modifiers }, consumed),
            _ => Parsed::Skip(consumed),
        };
    }

    // ── Standard CSI sequences with letter final bytes ──────────────
    let code = match final_byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'Z' => {
            // Shift+Tab reports as CSI Z.
            return Parsed::Event(
                KeyEvent {
                    code: KeyCode::Tab,
                    modifiers: Modifiers::SHIFT,
                },
                consumed,
            );
        }
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Event(KeyEvent { code, modifiers }, consumed)
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let code = match buf[2] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Parsed::Skip(3),
    };

    Parsed::Event(KeyEvent::plain(code), 3)
}

// ── UTF-8 ──────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);

    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    // Validate continuation bytes (must start with 0b10xxxxxx).
    for &b in &buf[1..expected] {
        if b & 0xC0 != 0x80 {
            return Parsed::Skip(1);
        }
    }

    std::str::from_utf8(&buf[..expected]).map_or(Parsed::Skip(1), |s| {
        s.chars().next().map_or(Parsed::Skip(expected), |ch| {
            Parsed::Event(KeyEvent::plain(KeyCode::Char(ch)), expected)
        })
    })
}

/// Expected byte length of a UTF-8 sequence from its lead byte.
/// Returns 0 for invalid lead bytes.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Parse semicolon-separated numeric CSI parameters.
///
/// Examples:
/// - `1;2` → `[1, 2]`
/// - (empty) → `[]`
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut params = Vec::with_capacity(4);
    let mut pos = 0;

    while pos <= raw.len() {
        let (val, next) = parse_u16_at(raw, pos);
        pos = next;
        params.push(val);

        // Skip semicolon separator.
        if pos < raw.len() && raw[pos] == b';' {
            pos += 1;
        } else {
            break;
        }
    }

    params
}

/// Parse a u16 from bytes starting at `start`, stopping at non-digit.
/// Returns `(value, next_position)`.
fn parse_u16_at(buf: &[u8], start: usize) -> (u16, usize) {
    let mut val: u16 = 0;
    let mut pos = start;
    while pos < buf.len() && buf[pos].is_ascii_digit() {
        val = val
            .saturating_mul(10)
            .saturating_add(u16::from(buf[pos] - b'0'));
        pos += 1;
    }
    (val, pos)
}

/// Decode CSI modifier parameter into `Modifiers` bitflags.
///
/// The xterm encoding is `1 + bitmask`. A parameter of 0 or 1 means no
/// modifiers. The truncation to u8 is intentional: only the low bits
/// carry the flags we track.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
