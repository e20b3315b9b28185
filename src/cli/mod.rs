//! Command-line interface for mida-setup.
//!
//! The installer is a single command; every flag tunes one run:
//!
//! ```bash
//! # Install or update the mida binary
//! sudo mida-setup
//!
//! # Also install the instrumented browser build named "chromium"
//! sudo mida-setup -i chromium
//!
//! # Install xvfb and a stock Chromium first, with debug logging
//! sudo mida-setup --install-deps --verbose
//! ```
//!
//! # Exit status
//!
//! A run that completes exits with 0, even when the binary or archive step
//! reported a failure in the summary. A run that aborts (missing privilege,
//! unsupported OS, unreachable manifest, invalid configuration) prints the
//! error with a suggestion and exits with 1.

use crate::config::SetupConfig;
use crate::constants::NO_PROGRESS_ENV;
use crate::core::InstallReport;
use crate::host::SystemHost;
use crate::packages::{Apt, PackageStatus};
use crate::setup::{Setup, SetupOptions, SetupSummary};
use crate::source::HttpSource;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default log filter; `RUST_LOG` takes precedence when set.
    pub log_level: String,

    /// Whether spinners are suppressed for this process.
    pub no_progress: bool,

    /// Explicit configuration file, if any.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Export the settings that are read through the environment.
    pub fn apply_to_env(&self) {
        if self.no_progress {
            // SAFETY: called once from the main thread before any other thread exists.
            unsafe {
                std::env::set_var(NO_PROGRESS_ENV, "1");
            }
        }
    }

    /// Install the global tracing subscriber.
    ///
    /// Safe to call more than once; later calls are ignored.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(&self.log_level)
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Install or update the MIDA crawler binary and its instrumented browser.
#[derive(Parser, Debug)]
#[command(
    name = "mida-setup",
    about = "Install or update MIDA and its instrumented browser",
    version,
    long_about = "Downloads the mida binary for this platform when it is missing or outdated, \
                  and optionally installs an instrumented browser build into the invoking \
                  user's home directory. Must be run as root."
)]
pub struct Cli {
    /// Instrumented browser build to install (empty to skip)
    ///
    /// The build is downloaded from the archive URL template with the
    /// selector substituted, and installed under
    /// `~/.mida/browsers/<SELECTOR>` of the user who invoked sudo.
    #[arg(short = 'i', long = "instrumented-browser", value_name = "SELECTOR", default_value = "")]
    instrumented_browser: String,

    /// Install xvfb and a stock Chromium through apt-get (Linux only)
    #[arg(long)]
    install_deps: bool,

    /// Configuration file to use instead of the default locations
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors and print nothing but failures
    #[arg(short, long)]
    quiet: bool,

    /// Disable spinners
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    /// Build a [`CliConfig`] from the parsed flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress || self.quiet,
            config_path: self.config.clone(),
        }
    }

    #[must_use]
    pub fn options(&self) -> SetupOptions {
        SetupOptions {
            selector: self.instrumented_browser.trim().to_string(),
            install_deps: self.install_deps,
        }
    }

    /// Run the installer against the real host.
    ///
    /// # Errors
    ///
    /// Returns an error when the run aborts; see the module docs.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.apply_to_env();
        config.init_logging();

        let setup_config = SetupConfig::load(config.config_path.as_deref())?;
        let host = SystemHost;
        let source = HttpSource::new()?;
        let packages = Apt;

        let summary = Setup::new(&host, &source, &packages, &setup_config).run(&self.options())?;

        let lines = render_summary(&summary, self.quiet);
        for line in &lines {
            println!("{line}");
        }
        if !self.quiet {
            println!("{}", "Setup Complete.".green().bold());
            println!("Type \"mida help\" to get started.");
        }
        Ok(())
    }
}

/// Human-readable lines describing a completed run.
///
/// With `failures_only`, only failed operations and packages are listed.
#[must_use]
pub fn render_summary(summary: &SetupSummary, failures_only: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if !failures_only {
        lines.push(format!("Platform: {}", summary.platform));
        lines.push(format!("Binary: {}", summary.verdict));
    }

    if let Some(report) = &summary.binary {
        render_report(&mut lines, "Binary install", report, failures_only);
    }

    for outcome in &summary.packages {
        let failed = matches!(outcome.status, PackageStatus::Failed(_));
        if failed {
            lines.push(format!("  {} {}", "✗".red(), outcome));
        } else if !failures_only {
            lines.push(format!("  {} {}", "✓".green(), outcome));
        }
    }

    if let Some(report) = &summary.archive {
        render_report(&mut lines, "Instrumented browser", report, failures_only);
    }

    if !failures_only {
        lines.extend(summary.notes.iter().map(|note| format!("Note: {note}")));
    }
    lines
}

fn render_report(lines: &mut Vec<String>, label: &str, report: &InstallReport, failures_only: bool) {
    if report.is_success() {
        if failures_only {
            return;
        }
        lines.push(format!("{} {label}: {}", "✓".green(), report.result));
    } else {
        lines.push(format!("{} {label}: {}", "✗".red(), report.result));
    }
    for warning in &report.warnings {
        lines.push(format!("    {} {warning}", "warning:".yellow()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::PackageOutcome;
    use crate::upgrade::InstallVerdict;
    use crate::utils::platform::Platform;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_flags() {
        let cli = Cli::try_parse_from(["mida-setup"]).unwrap();
        let config = cli.build_config();

        assert_eq!(config.log_level, "info");
        assert!(!config.no_progress);
        assert_eq!(config.config_path, None);
        assert_eq!(cli.options(), SetupOptions::default());
    }

    #[test]
    fn test_selector_and_deps() {
        let cli =
            Cli::try_parse_from(["mida-setup", "-i", "chromium", "--install-deps"]).unwrap();
        let options = cli.options();

        assert_eq!(options.selector, "chromium");
        assert!(options.install_deps);
    }

    #[test]
    fn test_long_selector_flag() {
        let cli = Cli::try_parse_from(["mida-setup", "--instrumented-browser", " chromium "]).unwrap();
        assert_eq!(cli.options().selector, "chromium");
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["mida-setup", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_quiet_disables_progress() {
        let cli = Cli::try_parse_from(["mida-setup", "--quiet", "-c", "/tmp/setup.toml"]).unwrap();
        let config = cli.build_config();

        assert_eq!(config.log_level, "error");
        assert!(config.no_progress);
        assert_eq!(config.config_path, Some(PathBuf::from("/tmp/setup.toml")));
    }

    #[test]
    fn test_verbose_level() {
        let cli = Cli::try_parse_from(["mida-setup", "--verbose"]).unwrap();
        assert_eq!(cli.build_config().log_level, "debug");
    }

    fn summary() -> SetupSummary {
        let mut archive = InstallReport::failure("archive download failed");
        archive.record("cleanup", "gone");
        SetupSummary {
            platform: Platform::Linux,
            verdict: InstallVerdict::Outdated,
            binary: Some(InstallReport::success()),
            packages: vec![PackageOutcome {
                package: "xvfb".to_string(),
                status: PackageStatus::Installed,
            }],
            archive: Some(archive),
            notes: vec!["something skipped".to_string()],
        }
    }

    #[test]
    fn test_render_summary() {
        let lines = render_summary(&summary(), false);

        assert_eq!(lines[0], "Platform: linux");
        assert!(lines.iter().any(|l| l.contains("Binary install: success")));
        assert!(lines.iter().any(|l| l.contains("xvfb: installed")));
        assert!(lines.iter().any(|l| l.contains("Instrumented browser: failure: archive download failed")));
        assert!(lines.iter().any(|l| l.contains("cleanup: gone")));
        assert_eq!(lines.last().unwrap(), "Note: something skipped");
    }

    #[test]
    fn test_render_failures_only() {
        let lines = render_summary(&summary(), true);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Instrumented browser"));
        assert!(lines[1].contains("cleanup: gone"));
    }
}
