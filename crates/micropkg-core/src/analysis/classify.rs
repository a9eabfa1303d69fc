//! Aggregation of file metrics into a package verdict.

use super::metrics::{ratio, FileMetric};
use crate::config::AnalyzeOptions;
use serde::Serialize;

/// Result of analyzing one package.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub is_micropackage: bool,
    pub file_count: u64,
    pub total_size: u64,
    pub total_imports: u64,
    /// `total_imports / total_size`; NaN or infinite when `total_size` is 0.
    pub overall_imports_to_size_ratio: f64,
    /// One entry per measured file, in archive order.
    pub file_analysis: Vec<FileMetric>,
}

/// Whether `file_count` files totalling `total_size` bytes fit the thresholds.
#[must_use]
pub fn is_micropackage(file_count: u64, total_size: u64, options: &AnalyzeOptions) -> bool {
    file_count <= options.max_files
        && total_size <= options.max_file_size.saturating_mul(options.max_files)
}

/// Sum the per-file metrics and classify the package.
#[must_use]
pub fn classify(file_analysis: Vec<FileMetric>, options: &AnalyzeOptions) -> AnalysisReport {
    let file_count = file_analysis.len() as u64;
    let total_size: u64 = file_analysis.iter().map(|m| m.size).sum();
    let total_imports: u64 = file_analysis.iter().map(|m| m.imports).sum();

    AnalysisReport {
        is_micropackage: is_micropackage(file_count, total_size, options),
        file_count,
        total_size,
        total_imports,
        overall_imports_to_size_ratio: ratio(total_imports, total_size),
        file_analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(path: &str, size: u64, imports: u64) -> FileMetric {
        FileMetric {
            path: path.to_string(),
            size,
            imports,
            imports_to_size_ratio: ratio(imports, size),
        }
    }

    #[test]
    fn test_single_small_file_is_micro() {
        let report = classify(vec![metric("package/index.js", 80, 0)], &AnalyzeOptions::default());
        assert!(report.is_micropackage);
        assert_eq!(report.file_count, 1);
        assert_eq!(report.total_size, 80);
    }

    #[test]
    fn test_size_threshold_is_inclusive() {
        let opts = AnalyzeOptions::default();
        assert!(classify(vec![metric("a.js", 100, 0)], &opts).is_micropackage);
        assert!(!classify(vec![metric("a.js", 101, 0)], &opts).is_micropackage);
    }

    #[test]
    fn test_two_files_exceed_default_count() {
        let opts = AnalyzeOptions::default();
        let report = classify(vec![metric("a.js", 1, 0), metric("b.js", 1, 0)], &opts);
        assert!(!report.is_micropackage);
        assert_eq!(report.file_count, 2);
    }

    #[test]
    fn test_size_budget_scales_with_file_count() {
        let opts = AnalyzeOptions::default()
            .with_max_files(3)
            .with_max_file_size(100);
        // One file may use the whole 300 byte budget.
        assert!(is_micropackage(1, 300, &opts));
        assert!(!is_micropackage(1, 301, &opts));
        assert!(!is_micropackage(4, 10, &opts));
    }

    #[test]
    fn test_empty_package() {
        let report = classify(Vec::new(), &AnalyzeOptions::default());
        assert!(report.is_micropackage);
        assert_eq!(report.file_count, 0);
        assert_eq!(report.total_size, 0);
        assert!(report.overall_imports_to_size_ratio.is_nan());
    }

    #[test]
    fn test_totals_and_order() {
        let report = classify(
            vec![metric("z.js", 40, 2), metric("a.js", 10, 1), metric("m.js", 25, 0)],
            &AnalyzeOptions::default().with_max_files(5),
        );
        assert_eq!(report.total_size, 75);
        assert_eq!(report.total_imports, 3);
        assert!((report.overall_imports_to_size_ratio - 3.0 / 75.0).abs() < f64::EPSILON);

        let paths: Vec<_> = report.file_analysis.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["z.js", "a.js", "m.js"]);
    }

    #[test]
    fn test_huge_thresholds_do_not_overflow() {
        let opts = AnalyzeOptions::default()
            .with_max_files(u64::MAX)
            .with_max_file_size(u64::MAX);
        assert!(is_micropackage(10, u64::MAX, &opts));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = classify(vec![metric("a.js", 0, 0)], &AnalyzeOptions::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["isMicropackage"], serde_json::json!(true));
        assert_eq!(json["fileCount"], serde_json::json!(1));
        // serde_json writes non-finite floats as null
        assert!(json["overallImportsToSizeRatio"].is_null());
        assert!(json["fileAnalysis"][0]["importsToSizeRatio"].is_null());
    }
}
