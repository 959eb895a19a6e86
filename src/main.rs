//! playhost - Session controller for an embedded game engine
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};

use playhost::{report_devices, run_headless, HeadlessOptions};
use playhost_app::SettingsStore;
use playhost_core::logging;
use playhost_engine::{ClassifierPolicy, EngineLaunchConfig, ProcInputDevices};

/// playhost - Run a game engine session with host input handling
#[derive(Parser, Debug)]
#[command(name = "playhost")]
#[command(about = "Run a game engine session with host input handling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a session, emitting NDJSON events and reading commands from stdin
    Run(RunArgs),

    /// List input devices and how they would be classified
    Devices(DeviceArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Run without an engine
    #[arg(long, conflicts_with = "engine")]
    simulated: bool,

    /// Where engine log output is captured
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Menu settings file (defaults to the playhost home directory)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Engine working directory
    #[arg(long, value_name = "DIR")]
    working_dir: Option<PathBuf>,

    #[command(flatten)]
    devices: DeviceArgs,

    /// Engine executable followed by its arguments
    #[arg(
        value_name = "ENGINE",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required_unless_present = "simulated"
    )]
    engine: Vec<String>,
}

#[derive(Args, Debug)]
struct DeviceArgs {
    /// Device listing to read instead of the kernel's
    #[arg(long, value_name = "PATH")]
    devices_file: Option<PathBuf>,

    /// Name fragment marking a device as a pointer (repeatable)
    #[arg(long = "pointer-token", value_name = "TOKEN")]
    pointer_tokens: Vec<String>,
}

impl DeviceArgs {
    fn source(&self) -> ProcInputDevices {
        self.devices_file
            .clone()
            .map(ProcInputDevices::new)
            .unwrap_or_default()
    }

    fn policy(&self) -> ClassifierPolicy {
        let mut policy = ClassifierPolicy::default();
        if !self.pointer_tokens.is_empty() {
            policy.pointer_tokens = self.pointer_tokens.clone();
        }
        policy
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Warning: logging disabled: {}", e);
    }

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Devices(args) => {
            report_devices(&args.source(), &args.policy())?;
            Ok(())
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let settings = match args.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::default_location()?,
    };

    let engine = if args.simulated {
        None
    } else {
        let (program, engine_args) = args
            .engine
            .split_first()
            .ok_or_else(|| eyre!("no engine executable given"))?;
        let log_path = match args.log_file {
            Some(path) => path,
            None => default_engine_log(&settings),
        };
        Some(EngineLaunchConfig {
            program: program.clone(),
            args: engine_args.to_vec(),
            working_dir: args.working_dir,
            log_path,
        })
    };

    let result = run_headless(HeadlessOptions {
        engine,
        settings,
        devices: Arc::new(args.devices.source()),
        policy: args.devices.policy(),
    })
    .await;

    if result.is_err() {
        if let Ok(log_file) = logging::get_current_log_file() {
            eprintln!("See {} for details", log_file.display());
        }
    }
    Ok(result?)
}

/// `latest.log` next to the settings file
fn default_engine_log(settings: &SettingsStore) -> PathBuf {
    settings
        .path()
        .parent()
        .map(|dir| dir.join("latest.log"))
        .unwrap_or_else(|| PathBuf::from("latest.log"))
}
