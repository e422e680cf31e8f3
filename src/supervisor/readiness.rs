//! Readiness probing for external engine processes.

use crate::error::{DolmetError, Result};
use std::time::{Duration, Instant};

/// A poll-until-ready check for an external engine.
///
/// Injectable so tests can supply a double instead of a real subprocess or
/// network call.
pub trait ReadinessProbe: Send {
    /// One probe attempt. Cheap enough to run every poll interval.
    fn is_ready(&self) -> bool;

    /// Engine name for timeout errors and logs.
    fn engine(&self) -> &str;
}

/// Probe that considers an HTTP server ready once it answers at all.
///
/// Any HTTP response counts — a model server that is up but still returns
/// errors for real requests has at least finished binding its port, which is
/// what the original curl-based wait checked.
pub struct HttpProbe {
    client: reqwest::blocking::Client,
    url: String,
    engine: String,
}

impl HttpProbe {
    pub fn new(url: &str, engine: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| DolmetError::Other(format!("Failed to build probe client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
            engine: engine.to_string(),
        })
    }
}

impl ReadinessProbe for HttpProbe {
    fn is_ready(&self) -> bool {
        self.client.get(&self.url).send().is_ok()
    }

    fn engine(&self) -> &str {
        &self.engine
    }
}

/// Poll `probe` every `interval` until it reports ready.
///
/// With `timeout: None` this waits forever (first-run model downloads can be
/// slow); otherwise it fails with `StartupTimeout` once the deadline passes.
pub fn wait_until_ready(
    probe: &dyn ReadinessProbe,
    interval: Duration,
    timeout: Option<Duration>,
) -> Result<()> {
    let started = Instant::now();

    loop {
        if probe.is_ready() {
            return Ok(());
        }

        if let Some(timeout) = timeout
            && started.elapsed() >= timeout
        {
            return Err(DolmetError::StartupTimeout {
                engine: probe.engine().to_string(),
                waited: started.elapsed(),
            });
        }

        std::thread::sleep(interval);
    }
}

/// Test probe that becomes ready after a fixed number of polls.
pub struct MockProbe {
    ready_after: std::sync::atomic::AtomicU32,
    engine: String,
}

impl MockProbe {
    /// Ready once `is_ready` has been called `ready_after` times.
    pub fn ready_after(polls: u32) -> Self {
        Self {
            ready_after: std::sync::atomic::AtomicU32::new(polls),
            engine: "mock-engine".to_string(),
        }
    }

    /// Never ready.
    pub fn never() -> Self {
        Self {
            ready_after: std::sync::atomic::AtomicU32::new(u32::MAX),
            engine: "mock-engine".to_string(),
        }
    }
}

impl ReadinessProbe for MockProbe {
    fn is_ready(&self) -> bool {
        let remaining = self.ready_after.load(std::sync::atomic::Ordering::SeqCst);
        if remaining == 0 {
            return true;
        }
        if remaining != u32::MAX {
            self.ready_after
                .store(remaining - 1, std::sync::atomic::Ordering::SeqCst);
        }
        false
    }

    fn engine(&self) -> &str {
        &self.engine
    }
}
