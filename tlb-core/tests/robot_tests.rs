use std::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use tlb_core::utils::controllers::{IdleMode, LegPosition, MotorController, Robot, TankDrive};
use tlb_core::utils::controllers::Leg;
use tlb_core::utils::input::bindings::ButtonMap;
use tlb_core::utils::input::teleop::{DriveCommand, DriveConfig, ModeFlags};
use tlb_core::utils::input::{DriverStation, RobotMode, ALT_PORT, LEFT_PORT, RIGHT_PORT, Y_AXIS};

/// Motor that records its last setpoint and configuration.
#[derive(Debug, Default)]
struct FakeMotor {
    speed: f32,
    idle: IdleMode,
    resets: u32,
    fail_idle: bool,
}

impl FakeMotor {
    fn failing() -> Self {
        Self {
            fail_idle: true,
            ..Default::default()
        }
    }
}

impl MotorController for FakeMotor {
    type Error = &'static str;

    fn set(
        &mut self,
        speed: f32,
    ) -> Result<(), Self::Error> {
        self.speed = speed;
        Ok(())
    }

    fn set_idle_mode(
        &mut self,
        mode: IdleMode,
    ) -> Result<(), Self::Error> {
        if self.fail_idle {
            return Err("idle mode rejected");
        }
        self.idle = mode;
        Ok(())
    }

    fn restore_factory_defaults(&mut self) -> Result<(), Self::Error> {
        self.idle = IdleMode::Coast;
        self.resets += 1;
        Ok(())
    }

    fn idle_mode(&self) -> IdleMode {
        self.idle
    }
}

#[derive(Debug, Default)]
struct FakePin {
    high: bool,
}

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

/// Driver station with settable sticks and buttons.
#[derive(Debug, Default)]
struct FakeStation {
    mode: RobotMode,
    y: [f32; 2],
    aux_y: f32,
    held: Vec<(u8, u8)>,
}

impl FakeStation {
    fn teleop() -> Self {
        Self {
            mode: RobotMode::Teleop,
            ..Default::default()
        }
    }

    fn press(
        &mut self,
        button: u8,
    ) {
        self.held.push((RIGHT_PORT, button));
    }

    fn release_all(&mut self) {
        self.held.clear();
    }
}

impl DriverStation for FakeStation {
    fn axis(
        &self,
        port: u8,
        axis: u8,
    ) -> f32 {
        match (port, axis) {
            (LEFT_PORT, Y_AXIS) => self.y[0],
            (RIGHT_PORT, Y_AXIS) => self.y[1],
            (ALT_PORT, Y_AXIS) => self.aux_y,
            _ => 0.0,
        }
    }

    fn button(
        &self,
        port: u8,
        button: u8,
    ) -> bool {
        self.held.contains(&(port, button))
    }

    fn mode(&self) -> RobotMode {
        self.mode
    }
}

fn robot_with(drive: TankDrive<FakeMotor>) -> Robot<FakeMotor, FakePin> {
    let mut robot = Robot::new(
        drive,
        Leg::new(FakePin::default(), FakePin::default()),
        DriveConfig::default(),
        ButtonMap::default(),
    );
    robot.init();
    robot
}

fn robot() -> Robot<FakeMotor, FakePin> {
    robot_with(TankDrive::new(
        FakeMotor::default(),
        FakeMotor::default(),
        FakeMotor::default(),
        FakeMotor::default(),
    ))
}

fn run(
    robot: &mut Robot<FakeMotor, FakePin>,
    ds: &FakeStation,
    ticks: usize,
) -> DriveCommand {
    let mut last = DriveCommand::default();
    for _ in 0..ticks {
        last = robot.tick(ds);
    }
    last
}

fn close(
    a: f32,
    b: f32,
) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn init_resets_and_brakes() {
    let robot = robot();
    assert_eq!(robot.modes(), ModeFlags::default());
    assert_eq!(robot.drive().idle_modes(), [IdleMode::Brake; 4]);
    assert!(robot.drive().motors().iter().all(|m| m.resets == 1));
    assert_eq!(robot.leg().position(), LegPosition::Retracted);

    let (_, leg) = robot.into_parts();
    let (forward, reverse) = leg.release();
    assert!(!forward.high);
    assert!(reverse.high);
}

#[test]
fn small_stick_input_is_ignored() {
    let mut robot = robot();
    let mut ds = FakeStation::teleop();
    ds.y = [0.05, -0.05];
    let cmd = robot.tick(&ds);
    assert_eq!(cmd, DriveCommand { left: 0.0, right: 0.0 });
    assert!(robot.drive().motors().iter().all(|m| m.speed == 0.0));
}

#[test]
fn precision_mode_caps_at_point_three() {
    let mut robot = robot();
    let mut ds = FakeStation::teleop();
    ds.y = [1.0, -1.0];
    let cmd = run(&mut robot, &ds, 50);
    assert!(close(cmd.left, 0.3));
    // Right stick is inverted
    assert!(close(cmd.right, 0.3));
}

#[test]
fn full_power_after_limiter_toggle() {
    let mut robot = robot();
    let mut ds = FakeStation::teleop();
    ds.press(5);
    ds.press(6);
    robot.tick(&ds);
    assert!(!robot.modes().limiter_enabled);

    ds.y = [1.0, 1.0];
    let cmd = run(&mut robot, &ds, 50);
    assert!(close(cmd.left, 0.8));
    assert!(close(cmd.right, -0.8));

    let [fl, fr, bl, br] = robot.drive().motors();
    assert_eq!(fl.speed, bl.speed);
    assert_eq!(fr.speed, br.speed);
    assert!(close(fl.speed, 0.8));
}

#[test]
fn limiter_combo_needs_both_buttons() {
    let mut robot = robot();
    let mut ds = FakeStation::teleop();
    ds.press(5);
    run(&mut robot, &ds, 3);
    assert!(robot.modes().limiter_enabled);

    ds.press(6);
    run(&mut robot, &ds, 10);
    assert!(!robot.modes().limiter_enabled);

    ds.release_all();
    robot.tick(&ds);
    ds.press(6);
    ds.press(5);
    robot.tick(&ds);
    assert!(robot.modes().limiter_enabled);
}

#[test]
fn output_steps_are_rate_limited() {
    let mut robot = robot();
    let mut ds = FakeStation::teleop();
    ds.press(5);
    ds.press(6);
    robot.tick(&ds);
    ds.release_all();

    let max_step = 6.0 * 0.02;
    let inputs = [1.0, -1.0, 0.5, 0.0, 0.95, -0.3, 1.0, 0.05, -1.0, -1.0];
    let mut prev = robot.tick(&ds);
    for &y in inputs.iter() {
        ds.y = [y, -y];
        for _ in 0..3 {
            let cmd = robot.tick(&ds);
            assert!((cmd.left - prev.left).abs() <= max_step + 1e-6);
            assert!((cmd.right - prev.right).abs() <= max_step + 1e-6);
            prev = cmd;
        }
    }
}

#[test]
fn scale_is_one_of_two_caps() {
    let mut robot = robot();
    let mut ds = FakeStation::teleop();
    ds.y = [1.0, 0.0];
    for _ in 0..4 {
        let cmd = run(&mut robot, &ds, 30);
        assert!(close(cmd.left, 0.3) || close(cmd.left, 0.8));
        ds.press(5);
        ds.press(6);
        robot.tick(&ds);
        ds.release_all();
        robot.tick(&ds);
    }
}

#[test]
fn disabled_forces_zero() {
    let mut robot = robot();
    let mut ds = FakeStation::teleop();
    ds.y = [1.0, -1.0];
    run(&mut robot, &ds, 10);

    for mode in [RobotMode::Disabled, RobotMode::Autonomous, RobotMode::Test] {
        ds.mode = mode;
        let cmd = robot.tick(&ds);
        assert_eq!(cmd, DriveCommand::default());
        assert!(robot.drive().motors().iter().all(|m| m.speed == 0.0));
    }

    // Re-enabling ramps from rest
    ds.mode = RobotMode::Teleop;
    let cmd = robot.tick(&ds);
    assert!(close(cmd.left, 0.12));
}

#[test]
fn kick_toggles_once_per_press() {
    let mut robot = robot();
    let mut ds = FakeStation::teleop();
    ds.press(1);
    run(&mut robot, &ds, 10);
    assert_eq!(robot.leg().position(), LegPosition::Extended);

    ds.release_all();
    run(&mut robot, &ds, 2);
    ds.press(1);
    robot.tick(&ds);
    assert_eq!(robot.leg().position(), LegPosition::Retracted);
}

#[test]
fn aux_stick_is_not_bound() {
    let mut robot = robot();
    let mut ds = FakeStation::teleop();
    ds.aux_y = 1.0;
    for button in [1, 5, 6, 11] {
        ds.held.push((ALT_PORT, button));
    }
    let cmd = run(&mut robot, &ds, 5);
    assert_eq!(cmd, DriveCommand::default());
    assert_eq!(robot.modes(), ModeFlags::default());
    assert_eq!(robot.leg().position(), LegPosition::Retracted);
    assert_eq!(robot.drive().idle_modes(), [IdleMode::Brake; 4]);
}

#[test]
fn bindings_ignored_while_disabled() {
    let mut robot = robot();
    let mut ds = FakeStation::default();
    ds.press(1);
    ds.press(11);
    run(&mut robot, &ds, 3);
    assert_eq!(robot.leg().position(), LegPosition::Retracted);
    assert!(!robot.modes().coast_enabled);

    // Still held when enabled: no new edge
    ds.mode = RobotMode::Teleop;
    run(&mut robot, &ds, 3);
    assert_eq!(robot.leg().position(), LegPosition::Retracted);

    // Autonomous counts as enabled for bindings
    ds.release_all();
    ds.mode = RobotMode::Autonomous;
    robot.tick(&ds);
    ds.press(1);
    robot.tick(&ds);
    assert_eq!(robot.leg().position(), LegPosition::Extended);
}

#[test]
fn coast_toggle_reconfigures_all_motors() {
    let mut robot = robot();
    let mut ds = FakeStation::teleop();
    ds.press(11);
    robot.tick(&ds);
    assert!(robot.modes().coast_enabled);
    assert_eq!(robot.drive().idle_modes(), [IdleMode::Coast; 4]);
    assert!(robot.drive().motors().iter().all(|m| m.resets == 2));

    ds.release_all();
    robot.tick(&ds);
    ds.press(11);
    robot.tick(&ds);
    assert!(!robot.modes().coast_enabled);
    assert_eq!(robot.drive().idle_modes(), [IdleMode::Brake; 4]);
    assert!(robot.drive().motors().iter().all(|m| m.resets == 3));
}

#[test]
fn idle_mode_failure_stops_sequence() {
    // back left rejects idle mode changes; back right is never reached
    let robot = robot_with(TankDrive::new(
        FakeMotor::default(),
        FakeMotor::default(),
        FakeMotor::failing(),
        FakeMotor::default(),
    ));
    assert_eq!(
        robot.drive().idle_modes(),
        [IdleMode::Brake, IdleMode::Brake, IdleMode::Coast, IdleMode::Coast]
    );
}
