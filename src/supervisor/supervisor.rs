//! Lifecycle supervision for external engine processes.
//!
//! The supervisor owns every subprocess and IPC artifact of a run: it spawns
//! them, verifies they came up, and tears everything down in reverse order of
//! creation on any exit path — normal completion, fatal error, or Ctrl+C.

use crate::error::{DolmetError, Result};
use crate::sys;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Handle to one supervised process.
///
/// The child itself stays registered with the supervisor; the handle lets
/// callers take its stdout or check liveness without owning teardown.
#[derive(Clone, Debug)]
pub struct ProcessHandle {
    name: String,
    child: Arc<Mutex<Child>>,
}

impl ProcessHandle {
    /// Name the process was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take the child's piped stdout, once.
    pub fn take_stdout(&self) -> Option<ChildStdout> {
        self.child
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .stdout
            .take()
    }

    /// True when the process has not exited yet.
    pub fn is_alive(&self) -> bool {
        matches!(
            self.child
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .try_wait(),
            Ok(None)
        )
    }
}

/// Owns the lifecycle of all spawned engine processes and named pipes.
pub struct ProcessSupervisor {
    processes: Vec<ProcessHandle>,
    fifos: Vec<PathBuf>,
    shut_down: bool,
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            fifos: Vec::new(),
            shut_down: false,
        }
    }

    /// Spawn `command` and register it for teardown.
    pub fn spawn(&mut self, name: &str, command: &mut Command) -> Result<ProcessHandle> {
        let child = command.spawn().map_err(|e| DolmetError::SourceStartup {
            message: format!("Failed to spawn {name}: {e}"),
        })?;

        let handle = ProcessHandle {
            name: name.to_string(),
            child: Arc::new(Mutex::new(child)),
        };
        self.processes.push(handle.clone());
        Ok(handle)
    }

    /// Spawn with stdout piped (for processes whose output feeds the pipeline).
    pub fn spawn_piped(&mut self, name: &str, command: &mut Command) -> Result<ProcessHandle> {
        self.spawn(name, command.stdout(Stdio::piped()))
    }

    /// Spawn with all output discarded (noisy model servers).
    pub fn spawn_quiet(&mut self, name: &str, command: &mut Command) -> Result<ProcessHandle> {
        self.spawn(
            name,
            command.stdout(Stdio::null()).stderr(Stdio::null()),
        )
    }

    /// Verify a spawned process survived its startup grace period.
    ///
    /// A source process that dies immediately (bad device, unreadable file)
    /// would otherwise only surface as a silent end-of-stream.
    pub fn verify_running(&self, handle: &ProcessHandle, grace: Duration) -> Result<()> {
        std::thread::sleep(grace);
        if !handle.is_alive() {
            return Err(DolmetError::SourceStartup {
                message: format!("{} exited during startup", handle.name()),
            });
        }
        Ok(())
    }

    /// Create a named pipe and register it for removal on shutdown.
    ///
    /// A stale pipe from an aborted earlier run is replaced.
    pub fn create_fifo(&mut self, path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        sys::make_fifo(path)?;
        self.fifos.push(path.to_path_buf());
        Ok(())
    }

    /// Tear down everything in reverse order of creation.
    ///
    /// Idempotent: the second and later calls do nothing, so the error path
    /// and the normal exit path can both call it. Errors from already-exited
    /// processes and already-removed pipes are ignored.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        for handle in self.processes.iter().rev() {
            let mut child = handle.child.lock().unwrap_or_else(|e| e.into_inner());
            match child.try_wait() {
                Ok(Some(_)) => {} // already exited
                _ => {
                    if child.kill().is_ok() {
                        // Reap so no zombie outlives the run
                        let _status = child.wait();
                    }
                }
            }
        }

        for fifo in self.fifos.iter().rev() {
            if let Err(e) = std::fs::remove_file(fifo)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                eprintln!("dolmet: failed to remove {}: {e}", fifo.display());
            }
        }
    }

    /// True once shutdown has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
