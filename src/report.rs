use crate::config::{GuardConfig, SpecdocMode};
use crate::result::{JasmineResult, Outcome, Suite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Failed,
}

/// A desktop notification, decoupled from how it gets delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub priority: i8,
}

/// One line of console output; `depth` is the suite nesting level.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleLine {
    Info(String),
    Success(String),
    Error(String),
    Suite {
        depth: usize,
        description: String,
    },
    SpecPassed {
        depth: usize,
        description: String,
    },
    SpecFailed {
        depth: usize,
        description: String,
        message: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Passed,
    Failed,
    Errored,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub notification: bool,
    pub hide_success: bool,
    pub specdoc: SpecdocMode,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from(&GuardConfig::default())
    }
}

impl From<&GuardConfig> for ReportOptions {
    fn from(cfg: &GuardConfig) -> Self {
        Self {
            notification: cfg.notification,
            hide_success: cfg.hide_success,
            specdoc: cfg.specdoc,
        }
    }
}

/// What to print and what to notify for one suite run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub status: ReportStatus,
    pub lines: Vec<ConsoleLine>,
    pub notification: Option<Notification>,
}

impl Report {
    pub fn from_result(result: &JasmineResult, options: &ReportOptions) -> Self {
        match result.outcome() {
            Outcome::RuntimeError(error) => {
                Self::runtime_error(&format!("An error occurred: {}", error), options)
            }
            Outcome::Passed => Self::passed(result, options),
            Outcome::Failed => Self::failed(result, options),
        }
    }

    /// Error raised before any spec ran.
    pub fn runtime_error(message: &str, options: &ReportOptions) -> Self {
        Self {
            status: ReportStatus::Errored,
            lines: vec![ConsoleLine::Error(message.to_string())],
            notification: options.notification.then(|| Notification {
                title: "Jasmine error".to_string(),
                message: message.to_string(),
                severity: Severity::Failed,
                priority: 2,
            }),
        }
    }

    fn passed(result: &JasmineResult, options: &ReportOptions) -> Self {
        let message = result.stats.to_string();

        let mut lines = Vec::new();
        if options.specdoc == SpecdocMode::Always {
            specdoc(&result.suites, 0, &mut lines);
        }
        lines.push(ConsoleLine::Success(message.clone()));

        Self {
            status: ReportStatus::Passed,
            lines,
            notification: (options.notification && !options.hide_success).then(|| Notification {
                title: "Jasmine suite passed".to_string(),
                message,
                severity: Severity::Success,
                priority: 0,
            }),
        }
    }

    fn failed(result: &JasmineResult, options: &ReportOptions) -> Self {
        let stats = result.stats.to_string();

        let mut lines = Vec::new();
        if options.specdoc != SpecdocMode::Never {
            specdoc(&result.suites, 0, &mut lines);
        }
        lines.push(ConsoleLine::Error(stats.clone()));

        let mut message = stats;
        for failed in result.failed_specs() {
            message.push('\n');
            message.push_str(&failed.spec.description);
            if let Some(error) = &failed.spec.error_message {
                message.push_str(": ");
                message.push_str(error);
            }
        }

        Self {
            status: ReportStatus::Failed,
            lines,
            notification: options.notification.then(|| Notification {
                title: "Jasmine suite failed".to_string(),
                message,
                severity: Severity::Failed,
                priority: 2,
            }),
        }
    }
}

fn specdoc(suites: &[Suite], depth: usize, lines: &mut Vec<ConsoleLine>) {
    for suite in suites {
        lines.push(ConsoleLine::Suite {
            depth,
            description: suite.description.clone(),
        });

        for spec in &suite.specs {
            if spec.passed {
                lines.push(ConsoleLine::SpecPassed {
                    depth: depth + 1,
                    description: spec.description.clone(),
                });
            } else {
                lines.push(ConsoleLine::SpecFailed {
                    depth: depth + 1,
                    description: spec.description.clone(),
                    message: spec.error_message.clone(),
                });
            }
        }

        specdoc(&suite.suites, depth + 1, lines);
    }
}
