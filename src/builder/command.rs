//! Process-backed builder
//!
//! Runs `<program> build -o <out> <args...> <entry>` as a child process,
//! captures its output and polls it until exit, timeout or cancellation.
//! `cancel()` only raises a flag; the compile loop notices it and
//! terminates the child (SIGTERM, grace period, then kill).

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{BuildError, Builder};

/// Poll interval while waiting on the compiler
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Module file extension
const EXTENSION: &str = ".wasm";

/// Configuration for a [`CommandBuilder`]
#[derive(Debug, Clone)]
pub struct CommandBuilderConfig {
    /// Compiler program, e.g. "go" or "tinygo"
    pub program: String,
    /// Arguments placed between `-o <out>` and the entry path
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// Absolute path of the entry source file
    pub entry_path: PathBuf,
    /// Directory the module is written to
    pub output_dir: PathBuf,
    /// Module name without extension
    pub output_name: String,
    /// Watcher-relative paths of generated files
    pub unobserved: Vec<String>,
    /// Wall-clock limit per compile
    pub timeout: Duration,
    /// Time between SIGTERM and kill
    pub termination_grace: Duration,
}

/// Builder that shells out to a compiler
pub struct CommandBuilder {
    config: CommandBuilderConfig,
    cancelled: Arc<AtomicBool>,
    /// Held for the duration of a compile
    in_flight: Mutex<()>,
}

impl CommandBuilder {
    pub fn new(config: CommandBuilderConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
            in_flight: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &CommandBuilderConfig {
        &self.config
    }

    /// Full output path of the module
    pub fn output_path(&self) -> PathBuf {
        self.config.output_dir.join(self.output_file_name())
    }

    /// Complete argv after the program name
    pub fn command_args(&self) -> Vec<String> {
        let mut argv = vec![
            "build".to_string(),
            "-o".to_string(),
            self.output_path().to_string_lossy().to_string(),
        ];
        argv.extend(self.config.args.iter().cloned());
        argv.push(self.config.entry_path.to_string_lossy().to_string());
        argv
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Drain a pipe on a background thread
    fn collect<R: Read + Send + 'static>(
        pipe: Option<R>,
        sink: Arc<Mutex<String>>,
    ) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            if let Some(mut pipe) = pipe {
                let mut buf = Vec::new();
                if let Err(e) = pipe.read_to_end(&mut buf) {
                    debug!(error = %e, "compiler output truncated");
                }
                if let Ok(mut out) = sink.lock() {
                    out.push_str(&String::from_utf8_lossy(&buf));
                }
            }
        })
    }

    /// Terminate a child process gracefully then forcefully.
    fn terminate_child(&self, child: &mut Child) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(child.id() as i32);
            let _ = signal::kill(pid, Signal::SIGTERM);
        }
        #[cfg(not(unix))]
        {
            let _ = child.kill();
        }

        let start = Instant::now();
        while start.elapsed() < self.config.termination_grace {
            match child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(_) => break,
            }
        }

        let _ = child.kill();
        let _ = child.wait();
    }
}

impl Builder for CommandBuilder {
    fn compile(&self) -> Result<PathBuf, BuildError> {
        // One compile at a time per builder
        let _guard = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        self.cancelled.store(false, Ordering::SeqCst);

        fs::create_dir_all(&self.config.output_dir)?;
        let output_path = self.output_path();

        let mut command = Command::new(&self.config.program);
        command
            .args(self.command_args())
            .envs(self.config.env.iter().map(|(k, v)| (k, v)))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = self.config.entry_path.parent() {
            command.current_dir(dir);
        }

        debug!(program = %self.config.program, args = ?self.command_args(), "starting compile");
        let mut child = command.spawn().map_err(|source| BuildError::SpawnFailed {
            program: self.config.program.clone(),
            source,
        })?;

        let captured = Arc::new(Mutex::new(String::new()));
        let stdout_handle = Self::collect(child.stdout.take(), Arc::clone(&captured));
        let stderr_handle = Self::collect(child.stderr.take(), Arc::clone(&captured));

        let start = Instant::now();
        let status = loop {
            if self.is_cancelled() {
                self.terminate_child(&mut child);
                let _ = stdout_handle.join();
                let _ = stderr_handle.join();
                return Err(BuildError::Cancelled);
            }

            if start.elapsed() > self.config.timeout {
                warn!(program = %self.config.program, "compile timed out, terminating");
                self.terminate_child(&mut child);
                let _ = stdout_handle.join();
                let _ = stderr_handle.join();
                return Err(BuildError::TimedOut {
                    seconds: self.config.timeout.as_secs(),
                    output: captured.lock().map(|o| o.clone()).unwrap_or_default(),
                });
            }

            match child.try_wait()? {
                Some(status) => break status,
                None => std::thread::sleep(POLL_INTERVAL),
            }
        };

        let _ = stdout_handle.join();
        let _ = stderr_handle.join();
        let output = captured.lock().map(|o| o.trim().to_string()).unwrap_or_default();

        if !status.success() {
            return Err(BuildError::Failed {
                program: self.config.program.clone(),
                code: status.code(),
                output,
            });
        }

        if !output_path.is_file() {
            return Err(BuildError::OutputMissing(output_path));
        }

        debug!(path = %output_path.display(), elapsed_ms = start.elapsed().as_millis() as u64, "compile finished");
        Ok(output_path)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn output_file_name(&self) -> String {
        format!("{}{}", self.config.output_name, EXTENSION)
    }

    fn unobserved_files(&self) -> Vec<String> {
        self.config.unobserved.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(program: &str, args: &[&str], dir: &std::path::Path) -> CommandBuilderConfig {
        CommandBuilderConfig {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            env: Vec::new(),
            entry_path: dir.join("main.go"),
            output_dir: dir.join("public"),
            output_name: "main".to_string(),
            unobserved: vec!["public/main.wasm".to_string()],
            timeout: Duration::from_secs(5),
            termination_grace: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_command_args_layout() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CommandBuilder::new(test_config("tinygo", &["-target", "wasm"], dir.path()));
        let argv = builder.command_args();
        assert_eq!(argv[0], "build");
        assert_eq!(argv[1], "-o");
        assert!(argv[2].ends_with("main.wasm"));
        assert_eq!(&argv[3..5], &["-target".to_string(), "wasm".to_string()]);
        assert!(argv[5].ends_with("main.go"));
    }

    #[test]
    fn test_output_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CommandBuilder::new(test_config("go", &[], dir.path()));
        assert_eq!(builder.output_file_name(), "main.wasm");
        assert_eq!(builder.unobserved_files(), vec!["public/main.wasm".to_string()]);
    }

    #[test]
    fn test_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CommandBuilder::new(test_config("wasmlane-no-such-compiler", &[], dir.path()));
        let err = builder.compile().unwrap_err();
        assert!(matches!(err, BuildError::SpawnFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_compile_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        // `sh build -o ...` fails: "build" is not a script file
        let builder = CommandBuilder::new(test_config("sh", &[], dir.path()));
        let err = builder.compile().unwrap_err();
        match err {
            BuildError::Failed { program, output, .. } => {
                assert_eq!(program, "sh");
                assert!(!output.is_empty());
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_output_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("build"),
            "printf 'main.go:3: undefined: caf\\351\\n' >&2\nexit 1\n",
        )
        .unwrap();
        let builder = CommandBuilder::new(test_config("sh", &[], dir.path()));
        let err = builder.compile().unwrap_err();
        match err {
            BuildError::Failed { output, .. } => {
                assert!(output.starts_with("main.go:3: undefined: caf"), "{output}");
                assert!(output.contains('\u{fffd}'));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_cancel_sets_flag() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CommandBuilder::new(test_config("go", &[], dir.path()));
        assert!(!builder.is_cancelled());
        builder.cancel();
        assert!(builder.is_cancelled());
    }
}
