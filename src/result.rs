use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Aggregate counters reported by the runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Number of specs executed
    pub specs: u32,
    /// Number of failed specs
    pub failures: u32,
    /// Elapsed time in seconds
    pub time: f64,
}

impl Stats {
    pub fn passes(&self) -> u32 {
        self.specs.saturating_sub(self.failures)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spec {
    pub description: String,
    pub passed: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Suite {
    pub description: String,
    pub specs: Vec<Spec>,
    pub suites: Vec<Suite>,
}

/// JSON document printed by the PhantomJS driver script.
///
/// When `error` is set the page never ran any specs, so `stats` and
/// `suites` are usually absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JasmineResult {
    pub passed: bool,
    pub stats: Stats,
    pub error: Option<String>,
    pub suites: Vec<Suite>,
}

/// A failing spec together with the descriptions of its enclosing suites.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedSpec<'a> {
    pub suite_path: Vec<&'a str>,
    pub spec: &'a Spec,
}

impl FailedSpec<'_> {
    /// `Suite Nested spec description`, the way Jasmine prints full names.
    pub fn full_description(&self) -> String {
        let mut parts = self.suite_path.clone();
        parts.push(self.spec.description.as_str());
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<'a> {
    RuntimeError(&'a str),
    Passed,
    Failed,
}

impl JasmineResult {
    pub fn outcome(&self) -> Outcome<'_> {
        match &self.error {
            Some(error) => Outcome::RuntimeError(error.as_str()),
            None if self.stats.failures == 0 => Outcome::Passed,
            None => Outcome::Failed,
        }
    }

    /// Every failing spec, depth first in document order.
    pub fn failed_specs(&self) -> Vec<FailedSpec<'_>> {
        let mut failed = Vec::new();
        let mut path = Vec::new();
        for suite in &self.suites {
            collect_failures(suite, &mut path, &mut failed);
        }
        failed
    }
}

fn collect_failures<'a>(suite: &'a Suite, path: &mut Vec<&'a str>, out: &mut Vec<FailedSpec<'a>>) {
    path.push(&suite.description);

    for spec in suite.specs.iter().filter(|s| !s.passed) {
        out.push(FailedSpec {
            suite_path: path.clone(),
            spec,
        });
    }
    for child in &suite.suites {
        collect_failures(child, path, out);
    }

    path.pop();
}

/// Parser for the driver script output
pub struct JasmineParser;

impl JasmineParser {
    pub fn parse_json(json_data: &str) -> Result<JasmineResult> {
        serde_json::from_str(json_data).with_context(|| {
            format!(
                "Failed to parse Jasmine JSON. First 200 chars: {}",
                &json_data.chars().take(200).collect::<String>()
            )
        })
    }
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} spec{}, {} failure{}\nin {} seconds",
            self.specs,
            if self.specs == 1 { "" } else { "s" },
            self.failures,
            if self.failures == 1 { "" } else { "s" },
            self.time
        )
    }
}
