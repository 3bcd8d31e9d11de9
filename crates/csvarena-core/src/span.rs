use std::borrow::Cow;
use std::fmt;
use std::str::Utf8Error;

/// A non-owning view into the input buffer.
///
/// A slice is already a (pointer, length) pair, so a span costs two words and
/// never copies. Spans are never NUL-terminated; equality compares bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextSpan<'a> {
    bytes: &'a [u8],
}

/// ASCII space class: space, `\t`, `\n`, `\v`, `\f` and `\r`.
#[inline]
pub fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

impl<'a> TextSpan<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub const fn empty() -> Self {
        Self { bytes: &[] }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// An empty span is how a missing cell is represented.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Shrink both ends past ASCII whitespace without copying
    pub fn trim(self) -> Self {
        let mut bytes = self.bytes;
        while let [first, rest @ ..] = bytes {
            if !is_space(*first) {
                break;
            }
            bytes = rest;
        }
        while let [rest @ .., last] = bytes {
            if !is_space(*last) {
                break;
            }
            bytes = rest;
        }
        Self { bytes }
    }

    pub fn as_str(&self) -> Result<&'a str, Utf8Error> {
        std::str::from_utf8(self.bytes)
    }

    pub fn to_str_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }
}

impl<'a> From<&'a str> for TextSpan<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for TextSpan<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl PartialEq<str> for TextSpan<'_> {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for TextSpan<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl fmt::Display for TextSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() keeps width/alignment flags working for table printing
        f.pad(&self.to_str_lossy())
    }
}

impl fmt::Debug for TextSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str_lossy())
    }
}
