use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Driver that loads the runner page, waits for Jasmine and prints the
/// result record as JSON.
pub const RUN_JASMINE_JS: &str = include_str!("phantomjs/run-jasmine.js");

/// The driver script materialised on disk. Removed on drop.
pub struct DriverScript {
    file: NamedTempFile,
}

impl DriverScript {
    pub fn write() -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("jasmine-guard-")
            .suffix(".js")
            .tempfile()
            .context("Failed to create PhantomJS driver script")?;

        file.write_all(RUN_JASMINE_JS.as_bytes())
            .context("Failed to write PhantomJS driver script")?;
        file.flush()?;

        debug!("📄 PhantomJS driver script at {}", file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
