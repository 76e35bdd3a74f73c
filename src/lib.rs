pub mod config;
pub mod formatter;
pub mod log;
pub mod notifier;
pub mod phantomjs;
pub mod report;
pub mod result;
pub mod runner;
pub mod server;
pub mod suite;

pub use config::{GuardConfig, SpecdocMode};
pub use report::{Notification, Report, ReportOptions, Severity};
pub use result::{JasmineParser, JasmineResult};
pub use runner::{JasmineRunner, RunSummary};
