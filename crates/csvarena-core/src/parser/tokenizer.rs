//! Byte-level scanning: the sizing pass and field slicing.
//!
//! Records end at `\n`. Fields are separated by `,` or `;`, and both may appear
//! in the same file. There is no quoting. A NUL byte ends the input.

use crate::span::{is_space, TextSpan};

pub const DELIMITERS: [u8; 2] = [b',', b';'];
pub const NEWLINE: u8 = b'\n';
pub const SENTINEL: u8 = 0;

#[inline]
pub fn is_delimiter(byte: u8) -> bool {
    byte == DELIMITERS[0] || byte == DELIMITERS[1]
}

/// The part of `input` before the end-of-input sentinel
pub fn content(input: &[u8]) -> &[u8] {
    match input.iter().position(|&b| b == SENTINEL) {
        Some(end) => &input[..end],
        None => input,
    }
}

/// Result of the sizing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Data rows after the header
    pub rows: usize,
    /// Fields on the header line
    pub columns: usize,
    header_end: usize,
    body_start: usize,
}

impl Dimensions {
    pub fn header<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[..self.header_end]
    }

    pub fn body<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.body_start..]
    }
}

/// 1-based line number of data row `row`
pub fn row_line(row: usize) -> usize {
    row + 2
}

/// Count rows and columns.
///
/// The header is always the first line. Returns `None` when that line is
/// missing or holds only whitespace.
pub fn measure(input: &[u8]) -> Option<Dimensions> {
    let header_end = input
        .iter()
        .position(|&b| b == NEWLINE)
        .unwrap_or(input.len());
    let header = &input[..header_end];
    if header.iter().all(|&b| is_space(b)) {
        return None;
    }
    let columns = header.iter().filter(|&&b| is_delimiter(b)).count() + 1;

    let body_start = (header_end + 1).min(input.len());
    let body = &input[body_start..];
    let newlines = body.iter().filter(|&&b| b == NEWLINE).count();
    let unterminated = !body.is_empty() && body.last() != Some(&NEWLINE);

    Some(Dimensions {
        rows: newlines + usize::from(unterminated),
        columns,
        header_end,
        body_start,
    })
}

/// Every line of the body, without its terminating newline
pub fn lines(body: &[u8], rows: usize) -> impl Iterator<Item = &[u8]> {
    body.split(|&b| b == NEWLINE).take(rows)
}

/// Trimmed fields of one line, never reading past it
pub fn fields(line: &[u8]) -> impl Iterator<Item = TextSpan<'_>> {
    line.split(|&b| is_delimiter(b))
        .map(|field| TextSpan::new(field).trim())
}
