//! PID controllers
//!
//! Discrete PID in per-invocation units: the integral is the plain sum of
//! errors and the derivative is the difference to the previous error. The
//! gains therefore absorb the task period, which is fixed per task.
//!
//! ## Example
//!
//! ```
//! use romi_tasks::libraries::pid::PidController;
//!
//! let mut pid = PidController::new(2.0, 0.0, 0.0);
//! assert_eq!(pid.compute(1.5), 3.0);
//! ```

use libm::fabsf;

/// Discrete PID controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidController {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
    integral: f32,
    prev_error: f32,
}

impl PidController {
    /// Create a controller with zeroed history
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    /// Build from a `(kp, ki, kd)` tuple
    pub const fn from_gains(gains: (f32, f32, f32)) -> Self {
        Self::new(gains.0, gains.1, gains.2)
    }

    /// Feed one error sample and return the correction
    pub fn compute(&mut self, error: f32) -> f32 {
        self.integral += error;
        let derivative = error - self.prev_error;
        self.prev_error = error;
        self.kp * error + self.ki * self.integral + self.kd * derivative
    }

    /// Forget the integral and the previous error
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    /// Accumulated error
    pub fn integral(&self) -> f32 {
        self.integral
    }
}

/// PID that recomputes only every `update_interval` invocations.
///
/// Between recomputations the last correction is held. An interval of 1
/// recomputes on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottledPid {
    pid: PidController,
    update_interval: u32,
    counter: u32,
    correction: f32,
}

impl ThrottledPid {
    /// Wrap `pid`; an interval of 0 is treated as 1
    pub fn new(pid: PidController, update_interval: u32) -> Self {
        Self {
            pid,
            update_interval: update_interval.max(1),
            counter: 0,
            correction: 0.0,
        }
    }

    /// Return the correction, recomputing it on the first call of every
    /// interval
    pub fn update(&mut self, error: f32) -> f32 {
        if self.counter % self.update_interval == 0 {
            self.correction = self.pid.compute(error);
        }
        self.counter = self.counter.wrapping_add(1);
        self.correction
    }

    /// Forget history and restart the interval
    pub fn reset(&mut self) {
        self.pid.reset();
        self.counter = 0;
        self.correction = 0.0;
    }

    /// Interval between recomputations
    pub fn update_interval(&self) -> u32 {
        self.update_interval
    }

    /// Correction currently held
    pub fn correction(&self) -> f32 {
        self.correction
    }
}

/// Wrap an angle difference into (-180, 180] degrees
pub fn wrap_180(deg: f32) -> f32 {
    let mut d = libm::fmodf(deg, 360.0);
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

/// Clamp `value` to `[-limit, limit]`
pub fn clamp_abs(value: f32, limit: f32) -> f32 {
    let limit = fabsf(limit);
    value.clamp(-limit, limit)
}
