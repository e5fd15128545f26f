//! Mock devices for host testing
//!
//! Sensor mocks keep their state in `Cell`s and implement their trait for
//! both `MockX` and `&MockX`, so a test can hand a reference to a task and
//! keep scripting readings while the task holds it. Every mock can be told
//! to fail with a given [`DeviceError`] until cleared.

use core::cell::Cell;

use super::traits::{
    check_effort, BumpSwitch, CalibrationStatus, Encoder, HeadingSensor, LineArray, MotorDriver,
};
use crate::core::error::DeviceError;
use crate::core::traits::time::{Micros, Millis};

fn check(fault: &Cell<Option<DeviceError>>) -> Result<(), DeviceError> {
    match fault.get() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// =============================================================================
// Motor
// =============================================================================

/// Motor recording the last command
#[derive(Debug, Default)]
pub struct MockMotor {
    enabled: bool,
    effort: f32,
    commands: u32,
    fault: Option<DeviceError>,
}

impl MockMotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last effort applied
    pub fn effort(&self) -> f32 {
        self.effort
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of accepted `set_effort` calls
    pub fn commands(&self) -> u32 {
        self.commands
    }

    /// Fail every call with `fault` (None clears)
    pub fn fail_with(&mut self, fault: Option<DeviceError>) {
        self.fault = fault;
    }

    fn check(&self) -> Result<(), DeviceError> {
        match self.fault {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl MotorDriver for MockMotor {
    fn enable(&mut self) -> Result<(), DeviceError> {
        self.check()?;
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), DeviceError> {
        self.check()?;
        self.enabled = false;
        self.effort = 0.0;
        Ok(())
    }

    fn set_effort(&mut self, effort: f32) -> Result<(), DeviceError> {
        self.check()?;
        self.effort = check_effort(effort)?;
        self.commands += 1;
        Ok(())
    }
}

// =============================================================================
// Encoder
// =============================================================================

/// Encoder whose position the test moves by hand
#[derive(Debug, Default)]
pub struct MockEncoder {
    position: Cell<i32>,
    velocity: Cell<f32>,
    updates: Cell<u32>,
    zeros: Cell<u32>,
    fault: Cell<Option<DeviceError>>,
}

impl MockEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&self, counts: i32) {
        self.position.set(counts);
    }

    /// Move the wheel by `counts`
    pub fn advance(&self, counts: i32) {
        self.position.set(self.position.get().wrapping_add(counts));
    }

    pub fn set_velocity(&self, counts_per_s: f32) {
        self.velocity.set(counts_per_s);
    }

    /// Number of `update` calls
    pub fn updates(&self) -> u32 {
        self.updates.get()
    }

    /// Number of `zero` calls
    pub fn zeros(&self) -> u32 {
        self.zeros.get()
    }

    pub fn fail_with(&self, fault: Option<DeviceError>) {
        self.fault.set(fault);
    }
}

impl Encoder for &MockEncoder {
    fn update(&mut self, _now_us: Micros) -> Result<(), DeviceError> {
        check(&self.fault)?;
        self.updates.set(self.updates.get() + 1);
        Ok(())
    }

    fn position(&self) -> i32 {
        self.position.get()
    }

    fn velocity(&self) -> f32 {
        self.velocity.get()
    }

    fn zero(&mut self) -> Result<(), DeviceError> {
        check(&self.fault)?;
        self.position.set(0);
        self.zeros.set(self.zeros.get() + 1);
        Ok(())
    }
}

impl Encoder for MockEncoder {
    fn update(&mut self, now_us: Micros) -> Result<(), DeviceError> {
        (&*self).update(now_us)
    }

    fn position(&self) -> i32 {
        self.position.get()
    }

    fn velocity(&self) -> f32 {
        self.velocity.get()
    }

    fn zero(&mut self) -> Result<(), DeviceError> {
        (&*self).zero()
    }
}

// =============================================================================
// Line sensor array
// =============================================================================

/// Line array returning a scripted centroid
#[derive(Debug, Default)]
pub struct MockLineArray {
    centroid: Cell<Option<f32>>,
    white_captures: Cell<u32>,
    black_captures: Cell<u32>,
    fault: Cell<Option<DeviceError>>,
}

impl MockLineArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line position to report; `None` = line lost
    pub fn set_centroid(&self, centroid: Option<f32>) {
        self.centroid.set(centroid);
    }

    pub fn white_captures(&self) -> u32 {
        self.white_captures.get()
    }

    pub fn black_captures(&self) -> u32 {
        self.black_captures.get()
    }

    pub fn fail_with(&self, fault: Option<DeviceError>) {
        self.fault.set(fault);
    }
}

impl LineArray for &MockLineArray {
    fn capture_white(&mut self) -> Result<(), DeviceError> {
        check(&self.fault)?;
        self.white_captures.set(self.white_captures.get() + 1);
        Ok(())
    }

    fn capture_black(&mut self) -> Result<(), DeviceError> {
        check(&self.fault)?;
        self.black_captures.set(self.black_captures.get() + 1);
        Ok(())
    }

    fn centroid(&mut self) -> Result<Option<f32>, DeviceError> {
        check(&self.fault)?;
        Ok(self.centroid.get())
    }
}

impl LineArray for MockLineArray {
    fn capture_white(&mut self) -> Result<(), DeviceError> {
        (&*self).capture_white()
    }

    fn capture_black(&mut self) -> Result<(), DeviceError> {
        (&*self).capture_black()
    }

    fn centroid(&mut self) -> Result<Option<f32>, DeviceError> {
        (&*self).centroid()
    }
}

// =============================================================================
// Bump switch
// =============================================================================

/// Bump switch pressed and released by the test
#[derive(Debug, Default)]
pub struct MockBump {
    pressed: Cell<bool>,
    fault: Cell<Option<DeviceError>>,
}

impl MockBump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pressed(&self, pressed: bool) {
        self.pressed.set(pressed);
    }

    pub fn fail_with(&self, fault: Option<DeviceError>) {
        self.fault.set(fault);
    }
}

impl BumpSwitch for &MockBump {
    fn pressed(&mut self, _now: Millis) -> Result<bool, DeviceError> {
        check(&self.fault)?;
        Ok(self.pressed.get())
    }
}

impl BumpSwitch for MockBump {
    fn pressed(&mut self, now: Millis) -> Result<bool, DeviceError> {
        (&*self).pressed(now)
    }
}

// =============================================================================
// Heading sensor
// =============================================================================

/// Heading sensor with scripted heading and calibration
#[derive(Debug, Default)]
pub struct MockHeading {
    heading: Cell<f32>,
    calibration: Cell<CalibrationStatus>,
    fault: Cell<Option<DeviceError>>,
}

impl MockHeading {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_heading(&self, deg: f32) {
        self.heading.set(deg);
    }

    pub fn set_calibration(&self, status: CalibrationStatus) {
        self.calibration.set(status);
    }

    /// Report every subsystem fully calibrated
    pub fn calibrate_fully(&self) {
        self.calibration.set(CalibrationStatus::from_register(0xFF));
    }

    pub fn fail_with(&self, fault: Option<DeviceError>) {
        self.fault.set(fault);
    }
}

impl HeadingSensor for &MockHeading {
    fn heading_deg(&mut self) -> Result<f32, DeviceError> {
        check(&self.fault)?;
        Ok(self.heading.get())
    }

    fn calibration(&mut self) -> Result<CalibrationStatus, DeviceError> {
        check(&self.fault)?;
        Ok(self.calibration.get())
    }
}

impl HeadingSensor for MockHeading {
    fn heading_deg(&mut self) -> Result<f32, DeviceError> {
        (&*self).heading_deg()
    }

    fn calibration(&mut self) -> Result<CalibrationStatus, DeviceError> {
        (&*self).calibration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    #[test]
    fn motor_records_commands() {
        let mut motor = MockMotor::new();
        motor.enable().unwrap();
        motor.set_effort(-45.0).unwrap();
        assert!(motor.is_enabled());
        assert_eq!(motor.effort(), -45.0);
        assert_eq!(motor.commands(), 1);
        assert_eq!(motor.set_effort(101.0), Err(DeviceError::InvalidReading));
        assert_eq!(motor.commands(), 1);
    }

    #[test]
    fn shared_motor_through_refcell() {
        let motor = RefCell::new(MockMotor::new());
        let mut handle = &motor;
        handle.set_effort(20.0).unwrap();
        assert_eq!(motor.borrow().effort(), 20.0);

        let guard = motor.borrow();
        let mut handle = &motor;
        assert_eq!(handle.disable(), Err(DeviceError::Bus));
        drop(guard);
    }

    #[test]
    fn encoder_scripted_through_reference() {
        let enc = MockEncoder::new();
        let mut held = &enc;
        enc.advance(120);
        held.update(0).unwrap();
        assert_eq!(held.position(), 120);
        held.zero().unwrap();
        assert_eq!(enc.position.get(), 0);
        assert_eq!(enc.zeros(), 1);
        assert_eq!(enc.updates(), 1);
    }

    #[test]
    fn scripted_fault_until_cleared() {
        let line = MockLineArray::new();
        let mut held = &line;
        line.fail_with(Some(DeviceError::Timeout));
        assert_eq!(held.centroid(), Err(DeviceError::Timeout));
        line.fail_with(None);
        line.set_centroid(Some(3.0));
        assert_eq!(held.centroid(), Ok(Some(3.0)));
    }

    #[test]
    fn heading_full_calibration() {
        let imu = MockHeading::new();
        let mut held = &imu;
        assert!(!held.calibration().unwrap().sensors_at_least(1));
        imu.calibrate_fully();
        assert!(held.calibration().unwrap().sensors_at_least(3));
    }
}
