//! Engine process management

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::handle::{dispatch_event, EngineCallbacks, EngineHandle};
use super::protocol::{encode_key_event, encode_mouse_event, parse_engine_line};
use playhost_core::prelude::*;
use playhost_core::{EngineEvent, KeyCode, MouseEvent};

/// Exit code reported when the real status could not be determined
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// How long to wait for buffered output after the engine exits
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// How to launch an engine process
#[derive(Debug, Clone)]
pub struct EngineLaunchConfig {
    /// Executable name (looked up on `PATH`) or path
    pub program: String,

    /// Arguments passed to the engine
    pub args: Vec<String>,

    /// Working directory for the engine (inherits ours when `None`)
    pub working_dir: Option<PathBuf>,

    /// Where the engine's log output is captured
    pub log_path: PathBuf,
}

/// Manages an engine child process.
///
/// Construction resolves the executable; [`ProcessEngine::start`] spawns it.
/// The split lets the session attach the handle before the first callback
/// can arrive.
///
/// Once started, the `Child` is owned by a dedicated wait task. The wait task
/// joins the stdout/stderr readers before reporting the exit, so every line
/// the engine printed is delivered before `on_exit`.
pub struct ProcessEngine {
    /// Resolved executable
    program: PathBuf,
    /// Launch settings
    config: EngineLaunchConfig,
    /// Sender for stdin lines, present while the process is running
    stdin_tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
    /// One-shot sender that tells the wait task to force-kill the process
    kill_tx: Mutex<Option<oneshot::Sender<()>>>,
    /// Process ID for logging
    pid: Mutex<Option<u32>>,
    /// Set once `start` has run
    started: AtomicBool,
    /// Set by the wait task once the child has exited
    exited: Arc<AtomicBool>,
}

impl std::fmt::Debug for ProcessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessEngine")
            .field("program", &self.program)
            .field("pid", &self.pid())
            .field("started", &self.started.load(Ordering::Acquire))
            .field("exited", &self.has_exited())
            .finish()
    }
}

impl ProcessEngine {
    /// Resolve the engine executable without starting it
    pub fn new(config: EngineLaunchConfig) -> Result<Self> {
        let program = which::which(&config.program).map_err(|_| Error::EngineNotFound {
            program: config.program.clone(),
        })?;
        debug!("Resolved engine executable: {}", program.display());

        Ok(Self {
            program,
            config,
            stdin_tx: Mutex::new(None),
            kill_tx: Mutex::new(None),
            pid: Mutex::new(None),
            started: AtomicBool::new(false),
            exited: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Spawn the engine and start delivering its events to `callbacks`.
    ///
    /// Must be called from within a tokio runtime. Starting twice is an error.
    pub fn start(&self, callbacks: Arc<dyn EngineCallbacks>) -> Result<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(Error::engine("engine already started"));
        }

        info!(
            "Spawning engine: {} {}",
            self.program.display(),
            self.config.args.join(" ")
        );

        let mut command = Command::new(&self.program);
        command
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| Error::EngineSpawn {
            reason: e.to_string(),
        })?;

        let pid = child.id();
        info!("Engine process started with PID: {:?}", pid);
        if let Ok(mut slot) = self.pid.lock() {
            *slot = pid;
        }

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::engine("engine stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::engine("engine stdout unavailable"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::engine("engine stderr unavailable"))?;

        let (stdin_tx, stdin_rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(Self::stdin_writer(stdin, stdin_rx));

        let stdout_task = tokio::spawn(Self::stdout_reader(stdout, Arc::clone(&callbacks)));
        let stderr_task = tokio::spawn(Self::stderr_reader(stderr, Arc::clone(&callbacks)));

        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        if let Ok(mut slot) = self.stdin_tx.lock() {
            *slot = Some(stdin_tx);
        }
        if let Ok(mut slot) = self.kill_tx.lock() {
            *slot = Some(kill_tx);
        }

        tokio::spawn(Self::wait_for_exit(
            child,
            kill_rx,
            [stdout_task, stderr_task],
            callbacks,
            Arc::clone(&self.exited),
        ));

        Ok(())
    }

    /// Background task: owns `child`, waits for it to exit, reports the code.
    async fn wait_for_exit(
        mut child: Child,
        kill_rx: oneshot::Receiver<()>,
        readers: [JoinHandle<()>; 2],
        callbacks: Arc<dyn EngineCallbacks>,
        exited: Arc<AtomicBool>,
    ) {
        let status = tokio::select! {
            result = child.wait() => result,
            _ = kill_rx => {
                info!("Kill requested, force-killing engine process");
                if let Err(e) = child.kill().await {
                    error!("Failed to kill engine process: {}", e);
                }
                child.wait().await
            }
        };

        let code = match status {
            Ok(status) => {
                info!("Engine process exited with status: {:?}", status);
                exit_code(status)
            }
            Err(e) => {
                error!("Error waiting for engine process: {}", e);
                UNKNOWN_EXIT_CODE
            }
        };

        // Drain remaining output before reporting the exit. A grandchild can
        // keep the pipes open after the engine dies, so the drain is bounded.
        for mut reader in readers {
            match tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, &mut reader).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Engine output reader ended abnormally: {}", e),
                Err(_) => {
                    warn!("Engine output still open after exit, abandoning reader");
                    reader.abort();
                }
            }
        }

        exited.store(true, Ordering::Release);
        dispatch_event(callbacks.as_ref(), EngineEvent::Exited { code });
    }

    /// Read stdout lines: control events are dispatched, the rest is log output.
    async fn stdout_reader(
        stdout: tokio::process::ChildStdout,
        callbacks: Arc<dyn EngineCallbacks>,
    ) {
        let result = read_lines(BufReader::new(stdout), |line| {
            trace!("stdout: {}", line);
            dispatch_event(callbacks.as_ref(), parse_engine_line(&line));
        })
        .await;

        match result {
            Ok(()) => debug!("stdout reader finished, engine likely exiting"),
            Err(e) => warn!("Failed to read engine stdout: {}", e),
        }
    }

    /// Read stderr lines as log output
    async fn stderr_reader(
        stderr: tokio::process::ChildStderr,
        callbacks: Arc<dyn EngineCallbacks>,
    ) {
        let result = read_lines(BufReader::new(stderr), |line| {
            trace!("stderr: {}", line);
            callbacks.on_log(&line);
        })
        .await;

        match result {
            Ok(()) => debug!("stderr reader finished"),
            Err(e) => warn!("Failed to read engine stderr: {}", e),
        }
    }

    /// Write input lines to stdin
    async fn stdin_writer(
        mut stdin: tokio::process::ChildStdin,
        mut rx: mpsc::UnboundedReceiver<String>,
    ) {
        while let Some(line) = rx.recv().await {
            trace!("Sending to engine: {}", line);

            if let Err(e) = stdin.write_all(line.as_bytes()).await {
                error!("Failed to write to engine stdin: {}", e);
                break;
            }
            if let Err(e) = stdin.write_all(b"\n").await {
                error!("Failed to write newline: {}", e);
                break;
            }
            if let Err(e) = stdin.flush().await {
                error!("Failed to flush engine stdin: {}", e);
                break;
            }
        }

        debug!("stdin writer finished");
    }

    fn send_line(&self, line: String) -> Result<()> {
        let guard = self
            .stdin_tx
            .lock()
            .map_err(|_| Error::engine("stdin sender lock poisoned"))?;
        let tx = guard.as_ref().ok_or(Error::EngineDetached)?;
        tx.send(line).map_err(|_| Error::EngineDetached)
    }

    /// Process ID, once started
    pub fn pid(&self) -> Option<u32> {
        self.pid.lock().ok().and_then(|pid| *pid)
    }

    /// Whether the engine process has exited
    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    /// Force-kill the engine. The exit is still reported through `on_exit`.
    pub fn kill(&self) {
        let kill_tx = self.kill_tx.lock().ok().and_then(|mut slot| slot.take());
        match kill_tx {
            Some(tx) => {
                let _ = tx.send(());
            }
            None => debug!("Engine not running, nothing to kill"),
        }
    }
}

impl EngineHandle for ProcessEngine {
    fn send_key_event(&self, code: KeyCode, is_down: bool) -> Result<()> {
        self.send_line(encode_key_event(code, is_down))
    }

    fn send_mouse_event(&self, event: MouseEvent) -> Result<()> {
        self.send_line(encode_mouse_event(event))
    }

    fn log_path(&self) -> PathBuf {
        self.config.log_path.clone()
    }
}

/// Feed every line of `reader` to `on_line` until EOF.
///
/// Lines are decoded lossily. Invalid UTF-8 must not end the stream: a
/// reader that stops early loses later output and leaves the engine to die
/// on a closed pipe.
async fn read_lines<R>(mut reader: R, mut on_line: impl FnMut(String)) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        on_line(String::from_utf8_lossy(&buf).into_owned());
    }
}

/// Map an exit status to a single code, using the shell's `128 + signal`
/// convention for signal deaths.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNKNOWN_EXIT_CODE
}
