//! Segmentation of free-form text into plain runs and delimited math runs.
//!
//! Four delimiter styles are recognised:
//!
//! | Opening | Closing | Mode   |
//! |---------|---------|--------|
//! | `$$`    | `$$`    | block  |
//! | `$`     | `$`     | inline |
//! | `\[`    | `\]`    | block  |
//! | `\(`    | `\)`    | inline |
//!
//! At every position `$$` is tried before `$`, and each opener closes at the
//! nearest matching closer. An opener without a closer is left in the
//! surrounding plain text.

use std::fmt;

/// Whether a formula renders as its own block or inline with text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DisplayMode {
    Inline,
    Block,
}

impl DisplayMode {
    pub fn is_block(self) -> bool {
        self == DisplayMode::Block
    }
}

impl From<bool> for DisplayMode {
    fn from(block: bool) -> Self {
        if block {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        }
    }
}

/// A math delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Delimiter {
    /// `$$ ... $$`
    DoubleDollar,
    /// `$ ... $`
    Dollar,
    /// `\[ ... \]`
    Bracket,
    /// `\( ... \)`
    Paren,
}

impl Delimiter {
    pub const ALL: [Delimiter; 4] = [
        Delimiter::DoubleDollar,
        Delimiter::Dollar,
        Delimiter::Bracket,
        Delimiter::Paren,
    ];

    pub fn open(self) -> &'static str {
        match self {
            Delimiter::DoubleDollar => "$$",
            Delimiter::Dollar => "$",
            Delimiter::Bracket => "\\[",
            Delimiter::Paren => "\\(",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            Delimiter::DoubleDollar => "$$",
            Delimiter::Dollar => "$",
            Delimiter::Bracket => "\\]",
            Delimiter::Paren => "\\)",
        }
    }

    pub fn display_mode(self) -> DisplayMode {
        match self {
            Delimiter::DoubleDollar | Delimiter::Bracket => DisplayMode::Block,
            Delimiter::Dollar | Delimiter::Paren => DisplayMode::Inline,
        }
    }

    /// Wrap `formula` in this delimiter pair.
    pub fn wrap(self, formula: &str) -> String {
        let mut out = String::with_capacity(formula.len() + 4);
        out.push_str(self.open());
        out.push_str(formula);
        out.push_str(self.close());
        out
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}...{}", self.open(), self.close())
    }
}

/// Byte range into the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PlainSegment<'a> {
    pub content: &'a str,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MathSegment<'a> {
    /// Inner text with delimiters removed and surrounding whitespace trimmed.
    pub formula: &'a str,
    /// Source text including delimiters.
    pub raw: &'a str,
    pub delimiter: Delimiter,
    pub display_mode: DisplayMode,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Segment<'a> {
    Plain(PlainSegment<'a>),
    Math(MathSegment<'a>),
}

impl<'a> Segment<'a> {
    pub fn span(&self) -> Span {
        match self {
            Segment::Plain(p) => p.span,
            Segment::Math(m) => m.span,
        }
    }

    /// The exact source text this segment was cut from.
    pub fn source(&self) -> &'a str {
        match self {
            Segment::Plain(p) => p.content,
            Segment::Math(m) => m.raw,
        }
    }

    pub fn is_math(&self) -> bool {
        matches!(self, Segment::Math(_))
    }

    pub fn as_math(&self) -> Option<&MathSegment<'a>> {
        match self {
            Segment::Math(m) => Some(m),
            Segment::Plain(_) => None,
        }
    }

    pub fn as_plain(&self) -> Option<&PlainSegment<'a>> {
        match self {
            Segment::Plain(p) => Some(p),
            Segment::Math(_) => None,
        }
    }
}

/// Lazy left-to-right segmenter.
///
/// Yields segments whose spans tile the input exactly.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    pending: Option<MathSegment<'a>>,
    // Once a closer is missing from some offset it is missing from every later
    // offset too, so each delimiter needs at most one failed search.
    exhausted: [bool; 4],
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            pending: None,
            exhausted: [false; 4],
        }
    }

    fn plain(&self, start: usize, end: usize) -> Segment<'a> {
        let span = Span::new(start, end);
        Segment::Plain(PlainSegment {
            content: span.slice(self.input),
            span,
        })
    }

    fn find_math(&mut self, from: usize) -> Option<MathSegment<'a>> {
        let bytes = self.input.as_bytes();
        let mut i = from;
        while i < bytes.len() {
            let offset = bytes[i..].iter().position(|&b| b == b'$' || b == b'\\')?;
            i += offset;
            if let Some(found) = self.match_at(i) {
                return Some(found);
            }
            i += 1;
        }
        None
    }

    fn match_at(&mut self, at: usize) -> Option<MathSegment<'a>> {
        let rest = &self.input[at..];
        if rest.starts_with("$$") {
            if let Some(found) = self.enclose(at, Delimiter::DoubleDollar) {
                return Some(found);
            }
        }
        if rest.starts_with('$') {
            return self.enclose(at, Delimiter::Dollar);
        }
        if rest.starts_with("\\[") {
            return self.enclose(at, Delimiter::Bracket);
        }
        if rest.starts_with("\\(") {
            return self.enclose(at, Delimiter::Paren);
        }
        None
    }

    fn enclose(&mut self, at: usize, delimiter: Delimiter) -> Option<MathSegment<'a>> {
        if self.exhausted[delimiter.index()] {
            return None;
        }
        let body_start = at + delimiter.open().len();
        let Some(offset) = self.input[body_start..].find(delimiter.close()) else {
            self.exhausted[delimiter.index()] = true;
            return None;
        };
        let body_end = body_start + offset;
        let span = Span::new(at, body_end + delimiter.close().len());

        // `$$` that did not close as a block still closes as an empty `$...$`;
        // its shape is still a block delimiter.
        let delimiter = if delimiter == Delimiter::Dollar && offset == 0 {
            Delimiter::DoubleDollar
        } else {
            delimiter
        };

        Some(MathSegment {
            formula: self.input[body_start..body_end].trim(),
            raw: span.slice(self.input),
            delimiter,
            display_mode: delimiter.display_mode(),
            span,
        })
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(math) = self.pending.take() {
            return Some(Segment::Math(math));
        }
        if self.pos >= self.input.len() {
            return None;
        }

        let start = self.pos;
        match self.find_math(start) {
            Some(math) => {
                self.pos = math.span.end;
                if math.span.start > start {
                    let plain = self.plain(start, math.span.start);
                    self.pending = Some(math);
                    Some(plain)
                } else {
                    Some(Segment::Math(math))
                }
            }
            None => {
                self.pos = self.input.len();
                Some(self.plain(start, self.input.len()))
            }
        }
    }
}

impl std::iter::FusedIterator for Scanner<'_> {}

/// Split `input` into plain and math segments.
pub fn scan(input: &str) -> Vec<Segment<'_>> {
    Scanner::new(input).collect()
}

/// Whether `input` contains at least one complete math span.
pub fn has_math(input: &str) -> bool {
    Scanner::new(input).any(|s| s.is_math())
}

/// A delimiter token left behind in plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StrayDelimiter {
    pub offset: usize,
    pub token: &'static str,
}

/// Delimiter tokens that did not take part in any math span.
///
/// These are unmatched openers and orphan closers, reported by byte offset.
pub fn stray_delimiters(input: &str) -> Vec<StrayDelimiter> {
    const TOKENS: [&str; 5] = ["$", "\\[", "\\(", "\\]", "\\)"];

    let mut strays = Vec::new();
    for segment in Scanner::new(input) {
        let Segment::Plain(plain) = segment else {
            continue;
        };
        let bytes = plain.content.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' || bytes[i] == b'\\' {
                let rest = &plain.content[i..];
                if let Some(&token) = TOKENS.iter().find(|t| rest.starts_with(**t)) {
                    strays.push(StrayDelimiter {
                        offset: plain.span.start + i,
                        token,
                    });
                    i += token.len();
                    continue;
                }
            }
            i += 1;
        }
    }
    strays
}
