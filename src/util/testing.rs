//! Test support: logging setup and in-memory collaborators.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::traits::{GraphRenderer, LineLog};

static TEST_SETUP: Once = Once::new();

/// Install a stderr subscriber once per test binary. `RUST_LOG` picks the
/// level, `debug` otherwise.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_test_writer()
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter),
        );

        if tracing::dispatcher::has_been_set() {
            debug!("Tracing subscriber already set");
        } else if let Err(e) = subscriber.try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
        info!(rust_log = ?env::var("RUST_LOG").ok(), "Test setup complete");
    });
}

/// Renderer double that records every call instead of spawning a process.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<(String, PathBuf)>>,
    fail: bool,
}

impl RecordingRenderer {
    /// A renderer whose every call fails after being recorded.
    pub fn failing() -> Self {
        Self {
            calls: Mutex::default(),
            fail: true,
        }
    }

    /// Description text and target image of each call, oldest first.
    pub fn rendered(&self) -> Vec<(String, PathBuf)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl GraphRenderer for RecordingRenderer {
    fn render(&self, description: &str, image: &Path) -> io::Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((description.to_string(), image.to_path_buf()));
        }
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "dot: not found"));
        }
        Ok(())
    }
}

/// In-memory line log.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl LineLog for RecordingLog {
    fn append_line(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .map_err(|_| io::Error::other("log poisoned"))?
            .push(line.to_string());
        Ok(())
    }
}
