#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Heuristic detection of npm micropackages.
//!
//! Downloads a package's latest tarball, strips comments from every file
//! that counts towards code size, and classifies the package against size
//! and file-count thresholds.

pub mod analysis;
pub mod analyze;
pub mod config;
pub mod error;
pub mod pkg;
pub mod version;

pub use analysis::{AnalysisReport, FileMetric};
pub use analyze::{analyze_package, Analyzer};
pub use config::AnalyzeOptions;
pub use error::Error;
pub use pkg::{AnalyzeError, FailureKind, PackageIdentifier, RegistryClient};
pub use version::VERSION;
