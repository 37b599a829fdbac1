//! Built-in lexical conventions for the languages cmtcount understands.

use std::path::Path;

use crate::error::CmtError;

/// Key used when neither `--lang` nor `CMTCOUNT_LANG` is given.
pub const DEFAULT_LANGUAGE: &str = "c";

/// Lexical conventions of one source language.
///
/// Only the markers the scanner needs are described here; anything else about
/// the language (keywords, preprocessor, nesting rules) is ignored.
#[derive(Debug, PartialEq, Eq)]
pub struct LanguageSpec {
    /// Registry key, always lowercase.
    pub key: &'static str,
    /// Human readable name used in reports and messages.
    pub name: &'static str,
    /// Marker that starts a comment running to the end of the line.
    pub inline_comment: &'static str,
    pub block_comment_start: &'static str,
    pub block_comment_end: &'static str,
    /// Inside a string, this character and the one after it are skipped.
    pub escape: char,
    /// A line whose last character is this carries an open inline comment
    /// onto the next line.
    pub line_continuation: char,
    /// Tried in order; the first one that matches opens the string.
    pub string_delimiters: &'static [&'static str],
    /// Lowercase, without the leading dot.
    pub extensions: &'static [&'static str],
}

static C: LanguageSpec = LanguageSpec {
    key: "c",
    name: "C/C++",
    inline_comment: "//",
    block_comment_start: "/*",
    block_comment_end: "*/",
    escape: '\\',
    line_continuation: '\\',
    string_delimiters: &["\"", "'"],
    extensions: &["c", "cpp", "h", "hpp"],
};

static CSHARP: LanguageSpec = LanguageSpec {
    key: "csharp",
    name: "C#",
    inline_comment: "//",
    block_comment_start: "/*",
    block_comment_end: "*/",
    escape: '\\',
    line_continuation: '\\',
    string_delimiters: &["\"", "'"],
    extensions: &["cs"],
};

static GO: LanguageSpec = LanguageSpec {
    key: "go",
    name: "Go",
    inline_comment: "//",
    block_comment_start: "/*",
    block_comment_end: "*/",
    escape: '\\',
    line_continuation: '\\',
    string_delimiters: &["\"", "'", "`"],
    extensions: &["go"],
};

static JAVA: LanguageSpec = LanguageSpec {
    key: "java",
    name: "Java",
    inline_comment: "//",
    block_comment_start: "/*",
    block_comment_end: "*/",
    escape: '\\',
    line_continuation: '\\',
    string_delimiters: &["\"", "'"],
    extensions: &["java"],
};

static JAVASCRIPT: LanguageSpec = LanguageSpec {
    key: "javascript",
    name: "JavaScript",
    inline_comment: "//",
    block_comment_start: "/*",
    block_comment_end: "*/",
    escape: '\\',
    line_continuation: '\\',
    string_delimiters: &["\"", "'", "`"],
    extensions: &["js", "jsx", "mjs", "cjs"],
};

// Lifetimes make `'` useless as a delimiter here.
static RUST: LanguageSpec = LanguageSpec {
    key: "rust",
    name: "Rust",
    inline_comment: "//",
    block_comment_start: "/*",
    block_comment_end: "*/",
    escape: '\\',
    line_continuation: '\\',
    string_delimiters: &["\""],
    extensions: &["rs"],
};

/// Every language known to the registry, sorted by key.
pub static BUILTIN_LANGUAGES: &[&LanguageSpec] = &[&C, &CSHARP, &GO, &JAVA, &JAVASCRIPT, &RUST];

/// Resolve a registry key (case-insensitive) to its spec.
pub fn lookup(key: &str) -> Result<&'static LanguageSpec, CmtError> {
    let wanted = key.trim().to_lowercase();
    BUILTIN_LANGUAGES
        .iter()
        .copied()
        .find(|spec| spec.key == wanted)
        .ok_or_else(|| CmtError::UnknownLanguage {
            key: key.to_string(),
            available: available_keys(),
        })
}

/// Comma separated list of registry keys, for messages.
pub fn available_keys() -> String {
    BUILTIN_LANGUAGES
        .iter()
        .map(|spec| spec.key)
        .collect::<Vec<_>>()
        .join(", ")
}

impl LanguageSpec {
    /// True if the file's extension (case-insensitive) belongs to this language.
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let lower = ext.to_lowercase();
                self.extensions.iter().any(|known| *known == lower)
            })
            .unwrap_or(false)
    }

    /// Extensions rendered as `.c, .cpp, ...`.
    pub fn extension_list(&self) -> String {
        self.extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
