//! Line classifier.
//!
//! Walks each line character by character and keeps track of whether the
//! cursor sits in code, a string literal, a block comment, or an inline
//! comment carried over from the previous line by a continuation marker.
//! Only that state is tracked; nothing about the code itself is parsed.

use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use crate::language::LanguageSpec;

/// Per-file line counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub total_lines: u64,
    pub inline_comments: u64,
    pub block_comments: u64,
}

impl FileStats {
    pub fn add(&mut self, other: &FileStats) {
        self.total_lines += other.total_lines;
        self.inline_comments += other.inline_comments;
        self.block_comments += other.block_comments;
    }
}

/// Construct left open at the end of the previous line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Code,
    /// Inside a string opened by the given delimiter.
    String(&'static str),
    BlockComment,
    /// Only reachable when an inline comment ended with a line continuation.
    InlineComment,
}

/// Incremental scanner over the lines of a single file.
pub struct Scanner {
    spec: &'static LanguageSpec,
    state: ScanState,
    stats: FileStats,
}

impl Scanner {
    pub fn new(spec: &'static LanguageSpec) -> Self {
        Scanner {
            spec,
            state: ScanState::Code,
            stats: FileStats::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ScanState {
        self.state
    }

    #[cfg(test)]
    pub fn stats(&self) -> FileStats {
        self.stats
    }

    /// Classify one physical line, without its line terminator.
    pub fn feed_line(&mut self, line: &str) {
        self.stats.total_lines += 1;

        if line.is_empty() {
            match self.state {
                ScanState::InlineComment => {
                    self.stats.inline_comments += 1;
                    self.state = ScanState::Code;
                }
                ScanState::BlockComment => self.stats.block_comments += 1,
                ScanState::Code | ScanState::String(_) => {}
            }
            return;
        }

        let spec = self.spec;
        let continued = line.ends_with(spec.line_continuation);
        let mut counted_block = false;
        let mut i = 0;

        while i < line.len() {
            let rest = &line[i..];
            match self.state {
                ScanState::String(delimiter) => {
                    if rest.starts_with(delimiter) {
                        self.state = ScanState::Code;
                        i += delimiter.len();
                    } else if rest.starts_with(spec.escape) {
                        let escape_len = spec.escape.len_utf8();
                        i += escape_len + char_len(&rest[escape_len..]);
                    } else {
                        i += char_len(rest);
                    }
                }
                ScanState::BlockComment => {
                    if !counted_block {
                        self.stats.block_comments += 1;
                        counted_block = true;
                    }
                    if rest.starts_with(spec.block_comment_end) {
                        self.state = ScanState::Code;
                        i += spec.block_comment_end.len();
                    } else {
                        i += char_len(rest);
                    }
                }
                ScanState::InlineComment => {
                    self.stats.inline_comments += 1;
                    if !continued {
                        self.state = ScanState::Code;
                    }
                    break;
                }
                ScanState::Code => {
                    if let Some(delimiter) = spec
                        .string_delimiters
                        .iter()
                        .copied()
                        .find(|d| rest.starts_with(*d))
                    {
                        self.state = ScanState::String(delimiter);
                        i += delimiter.len();
                    } else if rest.starts_with(spec.block_comment_start) {
                        if !counted_block {
                            self.stats.block_comments += 1;
                            counted_block = true;
                        }
                        self.state = ScanState::BlockComment;
                        i += spec.block_comment_start.len();
                    } else if rest.starts_with(spec.inline_comment) {
                        self.stats.inline_comments += 1;
                        if continued {
                            self.state = ScanState::InlineComment;
                        }
                        break;
                    } else {
                        i += char_len(rest);
                    }
                }
            }
        }
    }

    /// Consume the scanner. Constructs still open are accepted as they are.
    pub fn finish(self) -> FileStats {
        self.stats
    }
}

/// Byte width of the first character of `s`, or 0 at the end of the line.
fn char_len(s: &str) -> usize {
    s.chars().next().map_or(0, char::len_utf8)
}

/// Scan a sequence of lines as produced by a line reader.
pub fn scan_lines<I>(lines: I, spec: &'static LanguageSpec) -> io::Result<FileStats>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut scanner = Scanner::new(spec);
    for line in lines {
        scanner.feed_line(&line?);
    }
    Ok(scanner.finish())
}

/// Scan in-memory text with the same line splitting as [`scan_file`].
#[cfg(test)]
pub fn scan_str(text: &str, spec: &'static LanguageSpec) -> FileStats {
    let mut scanner = Scanner::new(spec);
    for line in text.lines() {
        scanner.feed_line(line);
    }
    scanner.finish()
}

/// Open and scan one file. The handle is dropped before returning, on error too.
pub fn scan_file(path: &Path, spec: &'static LanguageSpec) -> io::Result<FileStats> {
    scan_lines(read_file_lines_lossy(path)?, spec)
}

/// Reads lines, converting invalid UTF‑8 sequences using replacement characters.
pub struct LossyLineReader {
    reader: BufReader<Box<dyn Read + Send>>,
    buffer: Vec<u8>,
}

impl LossyLineReader {
    fn new(file: fs::File) -> Self {
        Self::from_reader(Box::new(file))
    }

    fn from_reader(reader: Box<dyn Read + Send>) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: Vec::with_capacity(8 * 1024),
        }
    }
}

impl Iterator for LossyLineReader {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                if self.buffer.last() == Some(&b'\n') {
                    self.buffer.pop();
                    if self.buffer.last() == Some(&b'\r') {
                        self.buffer.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buffer).into_owned()))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Returns an iterator over the lines of a file.
pub fn read_file_lines_lossy(file_path: &Path) -> io::Result<LossyLineReader> {
    let file = fs::File::open(file_path)?;
    Ok(LossyLineReader::new(file))
}
