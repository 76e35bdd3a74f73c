use crate::config::GuardConfig;
use crate::formatter::write_lines;
use crate::notifier::{DesktopNotifier, Notifier, notify_or_warn};
use crate::phantomjs::DriverScript;
use crate::report::{ConsoleLine, Report, ReportOptions, ReportStatus};
use crate::result::JasmineParser;
use crate::server::check_runner_available;
use crate::suite::suite_url;
use anyhow::{Context, Result};
use reqwest::Url;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Outcome of running a batch of spec files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub passed: bool,
    pub suites_run: usize,
    pub failed_paths: Vec<PathBuf>,
    pub errored_paths: Vec<PathBuf>,
}

impl RunSummary {
    /// Nothing to run counts as a pass.
    pub fn skipped() -> Self {
        Self {
            passed: true,
            ..Self::default()
        }
    }

    fn record(&mut self, path: &Path, status: ReportStatus) {
        self.suites_run += 1;
        match status {
            ReportStatus::Passed => {}
            ReportStatus::Failed => self.failed_paths.push(path.to_path_buf()),
            ReportStatus::Errored => self.errored_paths.push(path.to_path_buf()),
        }
        self.passed = self.failed_paths.is_empty() && self.errored_paths.is_empty();
    }
}

/// Runs Jasmine suites through PhantomJS and reports the results.
pub struct JasmineRunner {
    config: GuardConfig,
    notifier: Box<dyn Notifier>,
}

impl JasmineRunner {
    pub fn new(config: GuardConfig) -> Self {
        Self::with_notifier(config, Box::new(DesktopNotifier))
    }

    pub fn with_notifier(config: GuardConfig, notifier: Box<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Runs the suites for `paths` with PhantomJS, printing to stdout.
    pub fn run(&self, paths: &[PathBuf]) -> Result<RunSummary> {
        if paths.is_empty() {
            debug!("No spec paths given, nothing to run");
            return Ok(RunSummary::skipped());
        }

        let script = DriverScript::write()?;
        let stdout = io::stdout();
        let mut out = stdout.lock();

        self.run_with(paths, &mut out, |url| {
            execute_phantomjs(
                &self.config.phantomjs_bin,
                script.path(),
                url,
                self.config.page_timeout,
            )
        })
    }

    /// Runs the suites for `paths`, using `execute` to obtain the raw
    /// runner output for each suite URL.
    pub fn run_with<W, F>(&self, paths: &[PathBuf], out: &mut W, mut execute: F) -> Result<RunSummary>
    where
        W: Write,
        F: FnMut(&Url) -> Result<String>,
    {
        let mut summary = RunSummary::skipped();
        if paths.is_empty() {
            return Ok(summary);
        }

        let options = ReportOptions::from(&self.config);
        let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        write_lines(out, &[ConsoleLine::Info(format!("Run {}", names.join(" ")))])?;

        if self.config.server_check {
            if let Err(e) =
                check_runner_available(&self.config.jasmine_url, self.config.server_timeout)
            {
                error!("❌ {:#}", e);
                let report = Report::runtime_error(&format!("{:#}", e), &options);
                self.deliver(out, &report)?;
                summary.passed = false;
                summary.errored_paths.extend(paths.iter().cloned());
                return Ok(summary);
            }
        }

        for path in paths {
            let status = self.run_suite(path, out, &options, &mut execute)?;
            summary.record(path, status);
        }

        info!(
            "✅ Ran {} suite(s): {} failed, {} errored",
            summary.suites_run,
            summary.failed_paths.len(),
            summary.errored_paths.len()
        );

        Ok(summary)
    }

    fn run_suite<W, F>(
        &self,
        path: &Path,
        out: &mut W,
        options: &ReportOptions,
        execute: &mut F,
    ) -> Result<ReportStatus>
    where
        W: Write,
        F: FnMut(&Url) -> Result<String>,
    {
        let url = suite_url(&self.config.jasmine_url, path, &self.config.spec_dir)?;
        write_lines(out, &[ConsoleLine::Info(format!("Run Jasmine suite at {}", url))])?;

        let output = execute(&url).with_context(|| format!("Failed to run suite {}", url))?;
        let result = JasmineParser::parse_json(&output)
            .with_context(|| format!("Invalid runner output for {}", path.display()))?;

        let report = Report::from_result(&result, options);
        self.deliver(out, &report)?;

        Ok(report.status)
    }

    fn deliver<W: Write>(&self, out: &mut W, report: &Report) -> Result<()> {
        write_lines(out, &report.lines)?;
        if let Some(notification) = &report.notification {
            notify_or_warn(self.notifier.as_ref(), notification);
        }
        Ok(())
    }
}

/// Spawns `phantomjs <script> <url> <timeout-ms>` and collects its stdout.
///
/// Blocks until the child closes stdout and exits.
pub fn execute_phantomjs(
    phantomjs_bin: &str,
    script: &Path,
    url: &Url,
    page_timeout: Duration,
) -> Result<String> {
    let start_time = Instant::now();
    debug!(
        "🚀 Executing: {} {} {}",
        phantomjs_bin,
        script.display(),
        url
    );

    let mut child = Command::new(phantomjs_bin)
        .arg(script)
        .arg(url.as_str())
        .arg(page_timeout.as_millis().to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("Failed to execute PhantomJS binary {}", phantomjs_bin))?;

    let stdout = child
        .stdout
        .take()
        .context("PhantomJS stdout was not captured")?;

    let mut output = String::new();
    for line in BufReader::new(stdout).lines() {
        let line = line.context("Failed to read PhantomJS output")?;
        trace!("phantomjs: {}", line);
        output.push_str(&line);
        output.push('\n');
    }

    let status = child.wait().context("Failed to wait for PhantomJS")?;
    if !status.success() {
        warn!(
            "⚠️  PhantomJS exited with code {}",
            status.code().unwrap_or(-1)
        );
    }

    debug!(
        "📄 PhantomJS output ({} bytes) in {:.2}s",
        output.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(output)
}
