mod sim;
mod script;
#[cfg(feature = "gamepad")]
mod gamepad;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use serde::{Deserialize, Serialize};
use tlb_core::utils::Robot;
use tlb_core::utils::controllers::{Leg, MotorController, i2c::DriveBoard};
use tlb_core::utils::input::{
    DriverStation,
    bindings::ButtonMap,
    teleop::{DriveCommand, DriveConfig},
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::script::{Script, ScriptedStation};
use crate::sim::{SimI2c, SimPin};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// JSON file with `drive` and `buttons` tuning
    #[clap(long)]
    config: Option<PathBuf>,
    /// JSON driver station script; the built-in demo runs when omitted
    #[clap(long)]
    script: Option<PathBuf>,
    /// pace ticks at the configured period instead of running flat out
    #[clap(long)]
    realtime: bool,
    /// read real gamepads instead of a script
    #[cfg(feature = "gamepad")]
    #[clap(long)]
    gamepad: bool,
    /// robot mode reported while reading gamepads
    #[cfg(feature = "gamepad")]
    #[clap(long, default_value = "teleop")]
    mode: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RioConfig {
    drive: DriveConfig,
    buttons: ButtonMap,
}

fn load_config(path: Option<&Path>) -> Result<RioConfig> {
    let Some(path) = path else {
        return Ok(RioConfig::default());
    };
    let config = parse_config(&std::fs::read_to_string(path)?)?;
    info!(?path, "Loaded config");
    Ok(config)
}

fn parse_config(text: &str) -> Result<RioConfig> {
    let config: RioConfig = serde_json::from_str(text)?;
    config
        .drive
        .validate()
        .map_err(|e| eyre!("Invalid drive config: {}", e))?;
    Ok(config)
}

fn load_script(path: Option<&Path>) -> Result<Script> {
    match path {
        Some(path) => Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?),
        None => Ok(Script::demo()),
    }
}

/// Sleeps out the remainder of each tick period when running in real time.
struct Pacer {
    period: Option<Duration>,
    next: Instant,
}

impl Pacer {
    fn new(
        realtime: bool,
        period: f32,
    ) -> Result<Self> {
        let period = if realtime {
            Some(Duration::try_from_secs_f32(period).map_err(|e| eyre!("Bad tick period {}: {}", period, e))?)
        } else {
            None
        };
        Ok(Self {
            period,
            next: Instant::now(),
        })
    }

    fn wait(&mut self) {
        if let Some(period) = self.period {
            self.next += period;
            let now = Instant::now();
            if self.next > now {
                thread::sleep(self.next - now);
            } else {
                self.next = now;
            }
        }
    }
}

fn tick<M, D>(
    robot: &mut Robot<M, SimPin>,
    ds: &D,
) -> DriveCommand
where
    M: MotorController,
    D: DriverStation,
{
    let command = robot.tick(ds);
    debug!(left = command.left, right = command.right, "drive");
    command
}

fn run_script<M: MotorController>(
    robot: &mut Robot<M, SimPin>,
    script: &Script,
    pacer: &mut Pacer,
) {
    info!(steps = script.steps.len(), ticks = script.total_ticks(), "Running script");
    let mut ds = ScriptedStation::default();
    for (i, step) in script.steps.iter().enumerate() {
        ds.load(step);
        info!(step = i, mode = ?step.mode, ticks = step.ticks, "Script step");
        let mut last = DriveCommand::default();
        for _ in 0..step.ticks {
            last = tick(robot, &ds);
            pacer.wait();
        }
        info!(left = last.left, right = last.right, "Step finished");
    }
}

#[cfg(feature = "gamepad")]
fn run_gamepad<M: MotorController>(
    robot: &mut Robot<M, SimPin>,
    mode: &str,
    pacer: &mut Pacer,
) -> Result<()> {
    let mode: tlb_core::utils::RobotMode = serde_json::from_value(serde_json::Value::String(mode.to_owned()))
        .map_err(|e| eyre!("Unknown robot mode {:?}: {}", mode, e))?;
    let mut ds = gamepad::GamepadStation::new(mode)?;
    info!(?mode, "Reading gamepads; Ctrl-C to stop");
    loop {
        ds.refresh();
        tick(robot, &ds);
        pacer.wait();
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let opts: Opts = Opts::parse();
    let config = load_config(opts.config.as_deref())?;

    let i2c_bus = RefCell::new(SimI2c::default());
    let mut board = DriveBoard::new(&i2c_bus);
    if let Err(e) = board.init_devices() {
        error!("I2C init failed, scanning instead: {:?}", e);
        let found = board.scan_bus();
        return Err(eyre!("drive board unavailable ({} devices on the bus)", found));
    }
    board
        .configure_pwm()
        .map_err(|e| eyre!("PWM configuration failed: {:?}", e))?;
    board.log_gyro_startup();

    let drive = board
        .tank_drive()
        .map_err(|e| eyre!("Drivetrain unavailable: {:?}", e))?;
    let leg = Leg::new(SimPin::new("leg forward"), SimPin::new("leg reverse"));

    let mut robot = Robot::new(drive, leg, config.drive, config.buttons);
    robot.init();

    let mut pacer = Pacer::new(opts.realtime, config.drive.period)?;

    #[cfg(feature = "gamepad")]
    if opts.gamepad {
        return run_gamepad(&mut robot, &opts.mode, &mut pacer);
    }

    let script = load_script(opts.script.as_deref())?;
    run_script(&mut robot, &script, &mut pacer);

    let modes = robot.modes();
    let (drive, leg) = robot.into_parts();
    let (forward, reverse) = leg.release();
    info!(
        limiter = modes.limiter_enabled,
        coast = modes.coast_enabled,
        idle = ?drive.idle_modes()[0],
        leg_extended = forward.is_high() && !reverse.is_high(),
        "Script complete"
    );
    drop(drive);
    drop(board);
    info!(writes = i2c_bus.borrow().writes, "I2C traffic");
    Ok(())
}
