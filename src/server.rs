use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Checks that the Jasmine runner answers at `url` before PhantomJS is
/// pointed at it.
pub fn check_runner_available(url: &str, timeout: Duration) -> Result<()> {
    info!("🔍 Checking Jasmine runner at {}", url);

    let client = Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Jasmine test runner not available at {}", url))?;

    let status = response.status();
    debug!("📋 Jasmine runner responded with {}", status);

    if !status.is_success() {
        bail!(
            "Jasmine test runner not available at {} (HTTP {})",
            url,
            status.as_u16()
        );
    }

    Ok(())
}
