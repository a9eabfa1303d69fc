//! Per-file code metrics.
//!
//! Comment stripping and import detection are regex heuristics, not a lexer:
//! comment markers inside string literals are stripped, and import-like text
//! inside strings or comments is counted. The patterns follow ECMAScript
//! regex semantics: `.` never crosses `\n`, `\r`, U+2028 or U+2029, and
//! whitespace includes the Unicode space separators.

use crate::pkg::FileRecord;
use regex_lite::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Any character except an ECMAScript line terminator.
const NOT_LINE_TERMINATOR: &str = "[^\n\r\u{2028}\u{2029}]";

/// ECMAScript whitespace and line terminators.
const WHITESPACE: &str = "[\t\n\u{0B}\u{0C}\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}]";

fn block_comment_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").ok()).as_ref()
}

fn line_comment_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("//{NOT_LINE_TERMINATOR}*")).ok())
        .as_ref()
}

fn import_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        let any = NOT_LINE_TERMINATOR;
        let ws = WHITESPACE;
        let pattern = format!(
            r#"import{ws}+{any}+{ws}+from{ws}+['"]{any}*['"];?|require\(['"]{any}*['"]\)"#
        );
        Regex::new(&pattern).ok()
    })
    .as_ref()
}

/// Size and import density of one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetric {
    pub path: String,
    /// Bytes of comment-stripped content.
    pub size: u64,
    pub imports: u64,
    /// `imports / size`; NaN or infinite when `size` is 0.
    pub imports_to_size_ratio: f64,
}

/// Remove block comments, then line comments.
///
/// Block comments are removed until none is left, so a removal that splices
/// a new `/* ... */` together is removed as well.
#[must_use]
pub fn strip_comments(content: &str) -> String {
    let mut text = content.to_string();
    if let Some(re) = block_comment_re() {
        loop {
            let next = match re.replace_all(&text, "") {
                Cow::Owned(next) => next,
                Cow::Borrowed(_) => break,
            };
            text = next;
        }
    }
    match line_comment_re() {
        Some(re) => re.replace_all(&text, "").into_owned(),
        None => text,
    }
}

/// UTF-8 byte length of `content` with comments removed.
#[must_use]
pub fn non_comment_size(content: &str) -> u64 {
    strip_comments(content).len() as u64
}

/// Number of `import ... from '...'` and `require('...')` occurrences.
#[must_use]
pub fn count_imports(content: &str) -> u64 {
    import_re().map_or(0, |re| re.find_iter(content).count() as u64)
}

/// Unguarded ratio: 0/0 is NaN, n/0 is infinity.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(imports: u64, size: u64) -> f64 {
    imports as f64 / size as f64
}

/// Measure one file. Invalid UTF-8 is replaced before measuring.
#[must_use]
pub fn analyze_file(file: &FileRecord) -> FileMetric {
    let text = String::from_utf8_lossy(&file.content);
    let size = non_comment_size(&text);
    let imports = count_imports(&text);

    FileMetric {
        path: file.path.clone(),
        size,
        imports,
        imports_to_size_ratio: ratio(imports, size),
    }
}
