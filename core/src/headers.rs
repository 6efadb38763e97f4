//! Parsed response headers.
//!
//! # Design
//! A raw header section may hold several blocks (interim `1xx` responses or
//! redirect hops, each ending in a blank line). Every block becomes a
//! `HeaderList`: the status line plus an ordered list of fields, parsed once
//! when the response is built. Lines without a colon are skipped with a
//! warning; continuation lines are folded into the previous value.

use tracing::warn;

/// Pseudo header name under which the status line is exposed.
pub const STATUS_LINE_KEY: &str = "http_code";

/// One header block: status line plus fields in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    status_line: String,
    fields: Vec<(String, String)>,
}

impl HeaderList {
    pub fn new(status_line: impl Into<String>) -> Self {
        Self {
            status_line: status_line.into(),
            fields: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// Status code from the status line, if it has one.
    pub fn status_code(&self) -> Option<u16> {
        self.status_line.split_whitespace().nth(1)?.parse().ok()
    }

    /// First value for `name`, compared case-insensitively. `http_code`
    /// returns the status line.
    pub fn get(&self, name: &str) -> Option<&str> {
        if name == STATUS_LINE_KEY {
            return Some(&self.status_line);
        }
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in wire order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All entries, starting with the `http_code` pseudo header.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((STATUS_LINE_KEY, self.status_line.as_str()))
            .chain(self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Header fields only, without the status line.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Number of header fields, not counting the status line.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn parse_block(lines: &[&str]) -> Option<Self> {
        let (status_line, rest) = lines.split_first()?;
        let mut list = HeaderList::new(status_line.trim());

        for line in rest {
            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = list.fields.last_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                    continue;
                }
            }
            match line.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    list.push(name.trim(), value.trim());
                }
                _ => warn!(line = %line, "skipping malformed header line"),
            }
        }
        Some(list)
    }
}

/// Result of looking up one header by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLookup<'a> {
    /// The header is present.
    Found(&'a str),
    /// Headers were received but this one is not among them.
    Missing,
    /// No header block exists at all.
    NoHeaders,
}

impl<'a> HeaderLookup<'a> {
    pub fn value(self) -> Option<&'a str> {
        match self {
            HeaderLookup::Found(v) => Some(v),
            HeaderLookup::Missing | HeaderLookup::NoHeaders => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, HeaderLookup::Found(_))
    }
}

/// Split a raw header section into blocks separated by blank lines.
///
/// Lines end in CRLF; a bare LF is accepted too. Empty blocks are ignored.
pub fn parse_header_blocks(raw: &str) -> Vec<HeaderList> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in raw.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            if let Some(block) = HeaderList::parse_block(&current) {
                blocks.push(block);
            }
            current.clear();
        } else {
            current.push(line);
        }
    }
    if let Some(block) = HeaderList::parse_block(&current) {
        blocks.push(block);
    }
    blocks
}
