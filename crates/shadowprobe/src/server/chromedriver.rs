// Copyright 2024 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// chromedriver process management
//
// Launches chromedriver on an ephemeral port, waits for its /status
// endpoint to report ready, and owns the child process until shutdown.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tokio::process::{Child, Command};
use url::Url;

use crate::error::{Error, Result};
use crate::server::driver::find_chromedriver;

/// How long the driver gets to report ready after spawning.
const READY_TIMEOUT: Duration = Duration::from_secs(10);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Manages the chromedriver process lifecycle.
///
/// The child is spawned with `kill_on_drop`, so a dropped `ChromeDriver`
/// (a panicking test, an early return) still reaps the process; the normal
/// path is an explicit [`ChromeDriver::shutdown`].
#[derive(Debug)]
pub struct ChromeDriver {
    process: Child,
    base: Url,
}

impl ChromeDriver {
    /// Launch chromedriver from the discovered binary.
    ///
    /// # Errors
    ///
    /// Returns `Error::DriverNotFound` if no binary is discoverable and
    /// `Error::LaunchFailed` if the process dies early or never reports
    /// ready.
    pub async fn launch() -> Result<Self> {
        Self::launch_binary(find_chromedriver()?).await
    }

    /// Launch a specific chromedriver binary.
    pub async fn launch_binary(binary: PathBuf) -> Result<Self> {
        let port = ephemeral_port().await?;

        tracing::info!(binary = %binary.display(), port, "launching chromedriver");

        let mut child = Command::new(&binary)
            .arg(format!("--port={port}"))
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::LaunchFailed(format!("failed to spawn {}: {e}", binary.display()))
            })?;

        // Give it a moment to potentially fail
        tokio::time::sleep(Duration::from_millis(100)).await;

        match child.try_wait() {
            Ok(Some(status)) => {
                return Err(Error::LaunchFailed(format!(
                    "chromedriver exited immediately with status: {status}"
                )));
            }
            Ok(None) => {}
            Err(e) => {
                return Err(Error::LaunchFailed(format!(
                    "failed to check chromedriver status: {e}"
                )));
            }
        }

        let base = Url::parse(&format!("http://127.0.0.1:{port}/"))
            .map_err(|e| Error::LaunchFailed(format!("bad driver url: {e}")))?;

        if let Err(e) = wait_until_ready(&base).await {
            let _ = child.kill().await;
            return Err(e);
        }

        tracing::info!(%base, "chromedriver ready");

        Ok(Self {
            process: child,
            base,
        })
    }

    /// Base URL of the driver's HTTP endpoint.
    pub fn url(&self) -> &Url {
        &self.base
    }

    /// Terminate the driver process and wait for it to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        tracing::debug!(base = %self.base, "stopping chromedriver");

        self.process
            .kill()
            .await
            .map_err(|e| Error::SessionTeardown(format!("failed to kill chromedriver: {e}")))?;

        Ok(())
    }
}

/// Bind port 0 to get an unused port, then release it for the driver.
async fn ephemeral_port() -> Result<u16> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .map_err(|e| Error::LaunchFailed(format!("no ephemeral port available: {e}")))?;

    let port = listener
        .local_addr()
        .map_err(|e| Error::LaunchFailed(format!("no local address: {e}")))?
        .port();

    Ok(port)
}

/// Poll /status until the driver reports ready.
async fn wait_until_ready(base: &Url) -> Result<()> {
    let client = reqwest::Client::new();
    let status_url = base
        .join("status")
        .map_err(|e| Error::LaunchFailed(format!("bad status url: {e}")))?;

    let deadline = tokio::time::Instant::now() + READY_TIMEOUT;

    loop {
        if reports_ready(&client, &status_url).await {
            return Ok(());
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(Error::LaunchFailed(format!(
                "chromedriver did not report ready within {}ms",
                READY_TIMEOUT.as_millis()
            )));
        }

        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

async fn reports_ready(client: &reqwest::Client, status_url: &Url) -> bool {
    let Ok(response) = client.get(status_url.clone()).send().await else {
        return false;
    };

    if !response.status().is_success() {
        return false;
    }

    match response.json::<Value>().await {
        Ok(envelope) => envelope["value"]["ready"].as_bool().unwrap_or(false),
        Err(_) => false,
    }
}
