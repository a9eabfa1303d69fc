//! `micropkg analyze` command implementation.

use futures::future::join_all;
use micropkg_core::analysis::AnalysisReport;
use micropkg_core::{AnalyzeError, AnalyzeOptions, Analyzer, RegistryClient};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info_span, Instrument};

/// Error code for an analysis cut short by `--timeout`.
pub const ANALYZE_TIMED_OUT: &str = "ANALYZE_TIMED_OUT";

/// Error code for invalid options or configuration.
pub const ANALYZE_ARGS_INVALID: &str = "ANALYZE_ARGS_INVALID";

/// Analyze command action.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeAction {
    pub packages: Vec<String>,
    pub config: Option<PathBuf>,
    pub max_file_size: Option<u64>,
    pub max_files: Option<u64>,
    pub exclude_files: Vec<String>,
    pub exclude_extensions: Vec<String>,
    pub registry: Option<String>,
    pub timeout: Option<Duration>,
}

impl AnalyzeAction {
    /// Options from the config file (or defaults) with flag overrides applied.
    pub fn options(&self) -> Result<AnalyzeOptions, micropkg_core::Error> {
        let mut options = match &self.config {
            Some(path) => AnalyzeOptions::from_file(path)?,
            None => AnalyzeOptions::default(),
        };

        if let Some(max_file_size) = self.max_file_size {
            options = options.with_max_file_size(max_file_size);
        }
        if let Some(max_files) = self.max_files {
            options = options.with_max_files(max_files);
        }
        if !self.exclude_files.is_empty() {
            options = options.with_exclude_files(self.exclude_files.clone());
        }
        if !self.exclude_extensions.is_empty() {
            options = options.with_exclude_extensions(self.exclude_extensions.clone());
        }

        Ok(options)
    }
}

/// Error info for JSON output.
#[derive(Debug, Serialize)]
struct ErrorInfo {
    code: String,
    message: String,
}

impl From<&AnalyzeError> for ErrorInfo {
    fn from(e: &AnalyzeError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.message().to_string(),
        }
    }
}

/// Outcome for one package.
#[derive(Debug, Serialize)]
struct PackageResult {
    package: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
}

/// Analyze result for JSON output.
#[derive(Debug, Serialize)]
struct AnalyzeResult {
    ok: bool,
    results: Vec<PackageResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
}

/// Run the analyze command.
///
/// Exits with code 1 if any package failed, 2 if the options are invalid.
pub fn run(action: AnalyzeAction, json: bool) -> Result<()> {
    let options = match action.options() {
        Ok(options) => options,
        Err(e) => exit_invalid(&e.to_string(), json),
    };

    let client = match &action.registry {
        Some(url) => RegistryClient::new(url),
        None => RegistryClient::from_env(),
    };
    let analyzer = match client {
        Ok(client) => Analyzer::new(client),
        Err(e) => exit_invalid(e.message(), json),
    };

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let results = runtime.block_on(analyze_all(
        &analyzer,
        &action.packages,
        &options,
        action.timeout,
    ));

    let ok = results.iter().all(|r| r.ok);

    if json {
        let result = AnalyzeResult {
            ok,
            results,
            error: None,
        };
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
    } else {
        print_human(&results, &options);
    }

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn exit_invalid(message: &str, json: bool) -> ! {
    if json {
        let result = AnalyzeResult {
            ok: false,
            results: Vec::new(),
            error: Some(ErrorInfo {
                code: ANALYZE_ARGS_INVALID.to_string(),
                message: message.to_string(),
            }),
        };
        if let Ok(out) = serde_json::to_string_pretty(&result) {
            println!("{out}");
        }
    } else {
        eprintln!("error: {message}");
    }
    std::process::exit(2);
}

/// Analyze every package concurrently, keeping the argument order.
async fn analyze_all(
    analyzer: &Analyzer,
    packages: &[String],
    options: &AnalyzeOptions,
    timeout: Option<Duration>,
) -> Vec<PackageResult> {
    join_all(packages.iter().map(|name| {
        analyze_one(analyzer, name, options, timeout)
            .instrument(info_span!("package", name = %name))
    }))
    .await
}

async fn analyze_one(
    analyzer: &Analyzer,
    name: &str,
    options: &AnalyzeOptions,
    timeout: Option<Duration>,
) -> PackageResult {
    let analysis = analyzer.analyze(name, options);
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, analysis).await {
            Ok(outcome) => outcome.map_err(|e| ErrorInfo::from(&e)),
            Err(_) => Err(ErrorInfo {
                code: ANALYZE_TIMED_OUT.to_string(),
                message: format!("Analysis of '{name}' timed out after {limit:?}"),
            }),
        },
        None => analysis.await.map_err(|e| ErrorInfo::from(&e)),
    };

    match outcome {
        Ok(report) => PackageResult {
            package: name.to_string(),
            ok: true,
            report: Some(report),
            error: None,
        },
        Err(info) => {
            error!(code = %info.code, "Error: {}", info.message);
            PackageResult {
                package: name.to_string(),
                ok: false,
                report: None,
                error: Some(info),
            }
        }
    }
}

fn verdict(report: &AnalysisReport) -> &'static str {
    if report.is_micropackage {
        "\x1b[33mmicropackage\x1b[0m"
    } else {
        "\x1b[32mnot a micropackage\x1b[0m"
    }
}

fn print_human(results: &[PackageResult], options: &AnalyzeOptions) {
    for result in results {
        match (&result.report, &result.error) {
            (Some(report), _) => {
                println!(
                    "\x1b[1m{}\x1b[0m: {} ({} file(s), {} bytes, {} import(s))",
                    result.package,
                    verdict(report),
                    report.file_count,
                    report.total_size,
                    report.total_imports
                );
                println!(
                    "  Limits:  {} file(s), {} bytes per file",
                    options.max_files, options.max_file_size
                );
                println!(
                    "  Density: {:.4} imports/byte",
                    report.overall_imports_to_size_ratio
                );
                for file in &report.file_analysis {
                    println!(
                        "    {:<40} {:>8} B {:>4} import(s)  {:.4}",
                        file.path, file.size, file.imports, file.imports_to_size_ratio
                    );
                }
            }
            (None, Some(info)) => {
                eprintln!("error: {}: {}: {}", result.package, info.code, info.message);
            }
            (None, None) => {}
        }
    }
}
