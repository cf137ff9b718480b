//! I/O boundary traits for testability
//!
//! These traits abstract the external collaborators of the graph dump: the
//! process runner, the image renderer, and the line log.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;

use tracing::{debug, instrument};

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command, feed `stdin` to it, and capture its output.
    fn run_with_stdin(&self, cmd: &str, args: &[&str], stdin: &str) -> io::Result<Output>;
}

/// Renders a graph description into an image file.
pub trait GraphRenderer: Send + Sync {
    /// Write the image for `description` to `image`.
    fn render(&self, description: &str, image: &Path) -> io::Result<()>;
}

/// Append-only log receiving one line per dump.
pub trait LineLog: Send + Sync {
    fn append_line(&self, line: &str) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run_with_stdin(&self, cmd: &str, args: &[&str], stdin: &str) -> io::Result<Output> {
        use std::process::Stdio;

        let mut child = std::process::Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut child_stdin) = child.stdin.take() {
            child_stdin.write_all(stdin.as_bytes())?;
        }

        child.wait_with_output()
    }
}

/// Graphviz renderer: pipes the description into `dot -T<format> -o <image>`.
pub struct DotRenderer {
    cmd: Arc<dyn CommandRunner>,
    program: String,
    format: String,
}

impl DotRenderer {
    pub fn new(
        cmd: Arc<dyn CommandRunner>,
        program: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            cmd,
            program: program.into(),
            format: format.into(),
        }
    }
}

impl GraphRenderer for DotRenderer {
    #[instrument(level = "debug", skip(self, description))]
    fn render(&self, description: &str, image: &Path) -> io::Result<()> {
        if let Some(parent) = image.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let format_arg = format!("-T{}", self.format);
        let image_arg = image.to_string_lossy();
        let output = self.cmd.run_with_stdin(
            &self.program,
            &[&format_arg, "-o", &image_arg],
            description,
        )?;
        debug!(status = %output.status, "renderer finished");

        if output.status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ))
        }
    }
}

/// Dump log kept as an HTML file that image lines are appended to.
#[derive(Debug, Clone)]
pub struct HtmlLogFile {
    path: PathBuf,
}

impl HtmlLogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineLog for HtmlLogFile {
    fn append_line(&self, line: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}
