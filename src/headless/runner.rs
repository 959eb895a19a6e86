//! Headless mode runner - session event loop without a UI
//!
//! Owns the UI context: applies queued UI commands as events and feeds
//! operator commands from stdin into the session. The process ends when
//! the session's exit path terminates it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use playhost_app::{
    ui_channel, HostUi, ProcessTerminator, Session, SessionDeps, SettingsStore, Terminator,
    UiQueue,
};
use playhost_core::{InteractionMode, Result, ResultExt};
use playhost_engine::{
    ClassifierPolicy, DeviceClassifier, DeviceSource, EngineHandle, EngineLaunchConfig,
    ProcessEngine,
};

use super::commands::OperatorCommand;
use super::{HeadlessEvent, HeadlessHost, HeadlessTerminator, LogTailCrashReporter};

/// Everything a headless run needs
pub struct HeadlessOptions {
    /// Engine to launch; `None` runs a simulated session
    pub engine: Option<EngineLaunchConfig>,
    pub settings: SettingsStore,
    pub devices: Arc<dyn DeviceSource>,
    pub policy: ClassifierPolicy,
}

/// Run a session in headless mode
pub async fn run_headless(options: HeadlessOptions) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("playhost starting in HEADLESS mode");
    info!("Settings: {}", options.settings.path().display());
    info!("═══════════════════════════════════════════════════════");

    let (ui, mut queue) = ui_channel();
    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
    let session = Session::new(SessionDeps {
        ui,
        classifier: DeviceClassifier::new(options.devices, options.policy),
        settings_store: options.settings,
        crash_reporter: Arc::new(LogTailCrashReporter::default()),
        terminator: Arc::new(HeadlessTerminator::new(exit_tx)),
    });

    let engine = match options.engine {
        Some(config) => Some(Arc::new(
            ProcessEngine::new(config).context("Failed to prepare engine")?,
        )),
        None => None,
    };
    session.setup(engine.clone().map(|e| e as Arc<dyn EngineHandle>))?;

    if let Some(engine) = &engine {
        if let Err(e) = engine.start(session.callbacks()) {
            HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
            return Err(e);
        }
    }

    HeadlessEvent::session_started(
        session.is_simulated(),
        session.log_capture().target().as_deref(),
    )
    .emit();

    let (cmd_tx, mut cmd_rx) = mpsc::channel(32);
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(cmd_tx);
    });

    let host = HeadlessHost;
    let mut stdin_open = true;
    loop {
        tokio::select! {
            Some(code) = exit_rx.recv() => {
                finish_exit(&mut queue, &host, code, &ProcessTerminator);
                break;
            }
            applied = queue.apply_next(&host) => {
                if !applied {
                    info!("UI queue closed");
                    break;
                }
            }
            command = cmd_rx.recv(), if stdin_open => match command {
                Some(command) => handle_command(&session, engine.as_deref(), command),
                None => {
                    stdin_open = false;
                    if session.is_simulated() {
                        // No engine will ever exit on its own
                        handle_command(&session, None, OperatorCommand::Quit);
                    }
                }
            }
        }
    }

    info!("playhost headless mode exiting");
    Ok(())
}

/// Enumerate devices once and report them with their classification
pub fn report_devices(
    source: &dyn DeviceSource,
    policy: &ClassifierPolicy,
) -> Result<InteractionMode> {
    let devices = source.snapshot()?;
    for device in &devices {
        HeadlessEvent::device_detected(device).emit();
    }

    let mode = policy.classify(&devices, source.platform_level(), false);
    HeadlessEvent::interaction_mode(mode).emit();
    Ok(mode)
}

/// Flush queued UI events, announce the exit, then end the process
pub(crate) fn finish_exit(
    queue: &mut UiQueue,
    host: &dyn HostUi,
    code: i32,
    terminator: &dyn Terminator,
) {
    let flushed = queue.drain(host);
    debug!("Flushed {} UI command(s) before exit", flushed);
    HeadlessEvent::exiting(code).emit();
    terminator.terminate(code);
}

/// Apply one operator command to the session
pub(crate) fn handle_command(
    session: &Session,
    engine: Option<&ProcessEngine>,
    command: OperatorCommand,
) {
    debug!("Operator command: {:?}", command);
    match command {
        OperatorCommand::Back => session.on_back_pressed(),
        OperatorCommand::Pause => session.on_pause(),
        OperatorCommand::Resume => session.on_resume(),
        OperatorCommand::Pointer { x, y } => session.move_pointer(x, y),
        OperatorCommand::Button { button, down } => session.press_pointer_button(button, down),
        OperatorCommand::Scroll { dx, dy } => session.scroll_pointer(dx, dy),
        OperatorCommand::Quit => match engine {
            // The exit is reported back through the session
            Some(engine) => engine.kill(),
            None => session.on_exit(0),
        },
    }
}

/// Read operator commands from stdin (blocking version)
fn spawn_stdin_reader_blocking(cmd_tx: mpsc::Sender<OperatorCommand>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match trimmed.parse::<OperatorCommand>() {
                    Ok(command) => {
                        if cmd_tx.blocking_send(command).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Ignoring stdin command: {}", e);
                        HeadlessEvent::error(e, false).emit();
                    }
                }
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    info!("Stdin reader exiting");
}
