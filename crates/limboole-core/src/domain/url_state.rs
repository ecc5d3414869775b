//! URL-fragment persistence of the last run.
//!
//! After every run the selected mode and the input text are echoed into the
//! location fragment so the page can be bookmarked or shared.  Opening such
//! a link restores the input and mode and runs the solver again.
//!
//! # Wire format
//!
//! ```text
//! #<escaped payload>
//!
//! payload = <mode digit> <input text>
//! ```
//!
//! The payload is escaped byte-wise over its UTF-8 encoding: the unreserved
//! ASCII characters `A-Z a-z 0-9 @ * _ + - . /` pass through unchanged and
//! every other byte becomes `%XX` (upper-case hex).  `#`, `%` and newlines in
//! the input are therefore always escaped.
//!
//! Decoding accepts upper- and lower-case hex, treats a malformed `%` escape
//! as a literal `%`, and clamps the mode digit into the valid range.

use thiserror::Error;

/// Errors produced while decoding a URL fragment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlStateError {
    /// The fragment carried no payload at all.
    #[error("URL fragment is empty")]
    Empty,

    /// The first payload character was not a decimal digit.
    #[error("URL fragment does not start with a mode digit (found {0:?})")]
    InvalidModeIndex(char),

    /// The unescaped bytes were not valid UTF-8.
    #[error("URL fragment is not valid UTF-8 after unescaping")]
    InvalidUtf8,
}

/// The part of the page state that survives in the URL fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlState {
    pub mode_index: usize,
    pub input_text: String,
}

impl UrlState {
    pub fn new(mode_index: usize, input_text: impl Into<String>) -> Self {
        Self {
            mode_index,
            input_text: input_text.into(),
        }
    }

    /// Encodes the state as a fragment, including the leading `#`.
    ///
    /// Only single-digit mode indices are representable; larger values are
    /// clamped to `9`.
    pub fn encode(&self) -> String {
        let digit = char::from_digit(self.mode_index.min(9) as u32, 10).unwrap_or('0');
        let mut payload = String::with_capacity(self.input_text.len() + 1);
        payload.push(digit);
        payload.push_str(&self.input_text);
        format!("#{}", escape(&payload))
    }

    /// Decodes a fragment produced by [`UrlState::encode`].
    ///
    /// The leading `#` is optional.  The mode digit is clamped to
    /// `0..mode_count`.
    ///
    /// # Errors
    ///
    /// See [`UrlStateError`].
    pub fn decode(fragment: &str, mode_count: usize) -> Result<Self, UrlStateError> {
        let raw = fragment.strip_prefix('#').unwrap_or(fragment);
        if raw.is_empty() {
            return Err(UrlStateError::Empty);
        }

        let payload = unescape(raw)?;
        let mut chars = payload.chars();
        let first = chars.next().ok_or(UrlStateError::Empty)?;
        let digit = first
            .to_digit(10)
            .ok_or(UrlStateError::InvalidModeIndex(first))? as usize;

        Ok(Self {
            mode_index: digit.min(mode_count.saturating_sub(1)),
            input_text: chars.as_str().to_string(),
        })
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'@' | b'*' | b'_' | b'+' | b'-' | b'.' | b'/')
}

/// Percent-escapes every byte outside the unreserved set.
pub fn escape(text: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(text.len());
    for &b in text.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

/// Reverses [`escape`].  Malformed `%` sequences are kept literally.
///
/// # Errors
///
/// Returns [`UrlStateError::InvalidUtf8`] if the unescaped bytes are not
/// valid UTF-8.
pub fn unescape(raw: &str) -> Result<String, UrlStateError> {
    fn hex_value(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = raw.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).map_err(|_| UrlStateError::InvalidUtf8)
}
