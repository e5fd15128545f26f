//! Quadrature wheel encoder over a wrapping hardware counter
//!
//! The timer counts up or down in `0..=auto_reload` and wraps at either
//! end. Between two updates the wheel turns far less than half a counter
//! revolution, so a raw difference larger than half the range means the
//! counter wrapped and is corrected by one full range (`auto_reload + 1`).

use super::traits::{Counter, Encoder};
use crate::core::error::DeviceError;
use crate::core::traits::time::{ticks_diff, Micros};

/// Encoder built on a [`Counter`]
pub struct QuadratureEncoder<C: Counter> {
    counter: C,
    position: i32,
    last_count: u32,
    last_update_us: Option<Micros>,
    delta: i32,
    velocity: f32,
}

impl<C: Counter> QuadratureEncoder<C> {
    /// Take the counter and use its current value as the zero point
    pub fn new(mut counter: C) -> Result<Self, DeviceError> {
        let last_count = counter.count()?;
        Ok(Self {
            counter,
            position: 0,
            last_count,
            last_update_us: None,
            delta: 0,
            velocity: 0.0,
        })
    }

    /// Counts moved during the last update
    pub fn delta(&self) -> i32 {
        self.delta
    }

    fn wrapped_delta(&self, count: u32) -> i32 {
        let range = self.counter.auto_reload() as i64 + 1;
        let mut delta = count as i64 - self.last_count as i64;
        if delta > range / 2 {
            delta -= range;
        } else if delta < -range / 2 {
            delta += range;
        }
        delta as i32
    }
}

impl<C: Counter> Encoder for QuadratureEncoder<C> {
    fn update(&mut self, now_us: Micros) -> Result<(), DeviceError> {
        let count = self.counter.count()?;
        self.delta = self.wrapped_delta(count);
        self.last_count = count;
        self.position = self.position.wrapping_add(self.delta);

        self.velocity = match self.last_update_us {
            Some(prev) => {
                let dt_us = ticks_diff(now_us, prev);
                if dt_us == 0 {
                    self.velocity
                } else {
                    self.delta as f32 * 1_000_000.0 / dt_us as f32
                }
            }
            None => 0.0,
        };
        self.last_update_us = Some(now_us);
        Ok(())
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn velocity(&self) -> f32 {
        self.velocity
    }

    fn zero(&mut self) -> Result<(), DeviceError> {
        self.last_count = self.counter.count()?;
        self.position = 0;
        self.delta = 0;
        self.velocity = 0.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCounter {
        value: u32,
        reload: u32,
    }

    impl Counter for TestCounter {
        fn count(&mut self) -> Result<u32, DeviceError> {
            Ok(self.value)
        }

        fn auto_reload(&self) -> u32 {
            self.reload
        }
    }

    fn encoder(start: u32) -> QuadratureEncoder<TestCounter> {
        QuadratureEncoder::new(TestCounter {
            value: start,
            reload: 0xFFFF,
        })
        .unwrap()
    }

    #[test]
    fn accumulates_forward_motion() {
        let mut enc = encoder(100);
        enc.counter.value = 250;
        enc.update(0).unwrap();
        enc.counter.value = 400;
        enc.update(10_000).unwrap();
        assert_eq!(enc.position(), 300);
        assert_eq!(enc.delta(), 150);
        // 150 counts in 10 ms
        assert!((enc.velocity() - 15_000.0).abs() < 0.5);
    }

    #[test]
    fn corrects_overflow() {
        let mut enc = encoder(65_530);
        enc.counter.value = 10;
        enc.update(0).unwrap();
        assert_eq!(enc.delta(), 16);
        assert_eq!(enc.position(), 16);
    }

    #[test]
    fn corrects_underflow() {
        let mut enc = encoder(5);
        enc.counter.value = 65_525;
        enc.update(0).unwrap();
        assert_eq!(enc.delta(), -16);
        assert_eq!(enc.position(), -16);
    }

    #[test]
    fn zero_restarts_position() {
        let mut enc = encoder(0);
        enc.counter.value = 500;
        enc.update(0).unwrap();
        enc.zero().unwrap();
        assert_eq!(enc.position(), 0);
        enc.counter.value = 520;
        enc.update(1_000).unwrap();
        assert_eq!(enc.position(), 20);
    }
}
