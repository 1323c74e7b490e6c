//! Header-only streaming PGN reader.
//!
//! The extraction stage only needs a game's header tags; movetext is consumed
//! and discarded. The reader is tolerant by design: unparseable tag lines are
//! ignored with a debug log, `%`-prefixed escape lines are skipped, and only
//! I/O errors abort the stream.

use std::{collections::HashMap, io, io::BufRead};

use tracing::debug;

/// Failure to read from the underlying PGN stream.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("failed to read from the PGN stream: {_0}")]
pub struct PgnReadError(pub io::Error);

/// A single game's header tags.
///
/// Duplicate tags keep last-wins semantics, matching how lenient PGN parsers
/// treat repeated headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGame {
    tags: HashMap<String, String>,
}

impl RawGame {
    /// Looks up a header tag by exact name.
    #[must_use]
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Number of distinct header tags.
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    fn insert(&mut self, key: String, value: String) {
        self.tags.insert(key, value);
    }
}

/// Streaming iterator over the games of a PGN corpus.
///
/// Yields one [`RawGame`] per game, in corpus order. The sequence is finite
/// and non-restartable; EOF flushes the in-progress game.
#[derive(Debug)]
pub struct PgnReader<R> {
    reader: R,
    current: Option<RawGame>,
    in_movetext: bool,
    line: String,
}

impl<R> PgnReader<R>
where
    R: BufRead,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            current: None,
            in_movetext: false,
            line: String::new(),
        }
    }
}

impl<R> Iterator for PgnReader<R>
where
    R: BufRead,
{
    type Item = Result<RawGame, PgnReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return self.current.take().map(Ok),
                Ok(_) => {}
                Err(err) => return Some(Err(PgnReadError(err))),
            }

            let line = self.line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }

            if line.starts_with('[') {
                let Some((key, value)) = parse_tag_line(line) else {
                    debug!(line, "ignoring unparseable tag line");
                    continue;
                };
                // A tag after movetext opens the next game.
                if self.in_movetext {
                    self.in_movetext = false;
                    let finished = self.current.take();
                    let mut next = RawGame::default();
                    next.insert(key, value);
                    self.current = Some(next);
                    if let Some(game) = finished {
                        return Some(Ok(game));
                    }
                } else {
                    self.current.get_or_insert_default().insert(key, value);
                }
            } else if self.current.is_some() {
                self.in_movetext = true;
            }
        }
    }
}

/// Parses a `[Key "Value"]` tag line, unescaping `\"` and `\\` in the value.
fn parse_tag_line(line: &str) -> Option<(String, String)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let (key, rest) = inner.split_once(char::is_whitespace)?;
    let body = rest.trim().strip_prefix('"')?.strip_suffix('"')?;

    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                value.push(escaped);
            }
        } else {
            value.push(c);
        }
    }
    Some((key.to_owned(), value))
}
