//! Size and import measurements for extracted package files.

pub mod classify;
pub mod filter;
pub mod metrics;

pub use classify::{classify, is_micropackage, AnalysisReport};
pub use filter::{filter_files, is_relevant};
pub use metrics::{analyze_file, count_imports, non_comment_size, strip_comments, FileMetric};
