//! Node.js subprocess that executes generated Playwright scripts

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::script::RESULT_MARKER;
use crate::error::{MeterError, MeterResult};

/// Error text Node prints when the playwright package cannot be resolved
const MISSING_PLAYWRIGHT: &str = "Cannot find module 'playwright'";

/// Wall-clock limit for one script when none is configured
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(180);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs scripts with a Node.js executable
#[derive(Debug, Clone)]
pub struct PlaywrightRunner {
    node: String,
    node_path: Option<PathBuf>,
    deadline: Duration,
}

impl PlaywrightRunner {
    /// Create a runner
    ///
    /// Without an explicit `NODE_PATH`, `./node_modules` is used when present
    /// so a local `npm install playwright` is picked up.
    pub fn new(node: impl Into<String>, node_path: Option<&str>) -> Self {
        let node_path = node_path.map(PathBuf::from).or_else(local_node_modules);
        Self {
            node: node.into(),
            node_path,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Kill scripts that run longer than `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// `NODE_PATH` passed to the script, if any
    pub fn node_path(&self) -> Option<&Path> {
        self.node_path.as_deref()
    }

    /// Check that Node.js runs and return its version
    pub fn check_node(&self) -> MeterResult<String> {
        let output = Command::new(&self.node)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MeterError::RuntimeMissing(format!("{}: {}", self.node, e)))?;

        if !output.status.success() {
            return Err(MeterError::RuntimeMissing(format!(
                "{} --version exited with {}",
                self.node, output.status
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(node = %self.node, %version, "node runtime found");
        Ok(version)
    }

    /// Execute a script and parse the JSON printed after the result marker
    pub fn run<T: DeserializeOwned>(&self, script: &str) -> MeterResult<T> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("belssb-meter.js");
        std::fs::write(&script_path, script)?;

        debug!(script = %script_path.display(), "running playwright script");

        let mut command = Command::new(&self.node);
        command
            .arg(&script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(node_path) = self.node_path() {
            debug!(node_path = %node_path.display(), "using NODE_PATH");
            command.env("NODE_PATH", node_path);
        }

        let mut child = command
            .spawn()
            .map_err(|e| MeterError::RuntimeMissing(format!("{}: {}", self.node, e)))?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child)?;
        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "belssb_meter::browser::script", "{}", line);
        }

        parse_output(&stdout, &stderr, status.success())
    }

    /// Wait for the script to exit, killing it once the deadline passes
    fn wait(&self, child: &mut Child) -> MeterResult<ExitStatus> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if started.elapsed() >= self.deadline {
                warn!(deadline = ?self.deadline, "playwright script overran its deadline, killing it");
                if let Err(e) = child.kill() {
                    debug!(error = %e, "failed to kill playwright script");
                }
                child.wait()?;
                return Err(MeterError::Timeout(format!(
                    "script did not finish within {}s",
                    self.deadline.as_secs()
                )));
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        }
    }
}

/// Read a child pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                debug!(error = %e, "failed to read script output");
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(reader: JoinHandle<String>) -> MeterResult<String> {
    reader
        .join()
        .map_err(|_| MeterError::Browser("script output reader panicked".to_string()))
}

fn local_node_modules() -> Option<PathBuf> {
    let dir = std::env::current_dir().ok()?.join("node_modules");
    dir.is_dir().then_some(dir)
}

/// Extract the result JSON from a script's output
pub fn parse_output<T: DeserializeOwned>(
    stdout: &str,
    stderr: &str,
    exited_ok: bool,
) -> MeterResult<T> {
    match stdout.split_once(RESULT_MARKER) {
        Some((_, json)) => {
            if !exited_ok {
                warn!("playwright script exited with an error after reporting a result");
            }
            serde_json::from_str(json.trim())
                .map_err(|e| MeterError::Browser(format!("Failed to parse script result: {}", e)))
        }
        None if stderr.contains(MISSING_PLAYWRIGHT) => Err(MeterError::RuntimeMissing(
            "the playwright package is not installed".to_string(),
        )),
        None => {
            let detail = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            Err(MeterError::Browser(format!(
                "Script produced no result: {}",
                if detail.is_empty() { "no output" } else { detail }
            )))
        }
    }
}
