//! BNO055 absolute orientation sensor (I2C)
//!
//! The BNO055 runs its own sensor fusion. In NDOF mode it reports an
//! absolute Euler heading once the magnetometer is calibrated; the
//! calibration byte tells how far each subsystem has got (0-3).
//!
//! Platform-agnostic: works with any blocking `embedded_hal::i2c::I2c`.

use embedded_hal::i2c::I2c;

use super::traits::{CalibrationStatus, HeadingSensor};
use crate::core::error::DeviceError;

/// Register map (page 0)
pub mod registers {
    /// Default 7-bit address (COM3 low)
    pub const ADDRESS: u8 = 0x28;
    pub const CHIP_ID: u8 = 0x00;
    pub const GYRO_X_LSB: u8 = 0x14;
    pub const EULER_H_LSB: u8 = 0x1A;
    pub const CALIB_STAT: u8 = 0x35;
    pub const OPR_MODE: u8 = 0x3D;

    pub const EXPECTED_CHIP_ID: u8 = 0xA0;

    pub const MODE_CONFIG: u8 = 0x00;
    /// Nine degrees of freedom fusion
    pub const MODE_NDOF: u8 = 0x0C;

    /// LSB per degree for Euler angles and angular rate
    pub const DEG_LSB: f32 = 16.0;
}

/// Euler angles in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerAngles {
    pub heading: f32,
    pub roll: f32,
    pub pitch: f32,
}

/// BNO055 driver
pub struct Bno055<I: I2c> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Bno055<I> {
    /// Driver at the default address; call [`init`](Self::init) before use
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, registers::ADDRESS)
    }

    /// Driver at a custom address
    pub fn with_address(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Verify the chip ID and switch to NDOF fusion.
    ///
    /// # Errors
    ///
    /// `DeviceError::InvalidReading` if another device answers at the
    /// address, `DeviceError::Bus` on transfer failure.
    pub fn init(&mut self) -> Result<(), DeviceError> {
        let id = self.read_register(registers::CHIP_ID)?;
        if id != registers::EXPECTED_CHIP_ID {
            return Err(DeviceError::InvalidReading);
        }
        self.set_mode(registers::MODE_NDOF)?;
        crate::log_info!("BNO055 detected, NDOF mode");
        Ok(())
    }

    /// Write the operating mode register
    pub fn set_mode(&mut self, mode: u8) -> Result<(), DeviceError> {
        self.write_register(registers::OPR_MODE, mode)
    }

    /// Heading, roll and pitch
    pub fn read_euler(&mut self) -> Result<EulerAngles, DeviceError> {
        let v = self.read_vector(registers::EULER_H_LSB)?;
        Ok(EulerAngles {
            heading: v[0],
            roll: v[1],
            pitch: v[2],
        })
    }

    /// Angular rate in degrees per second (x, y, z)
    pub fn read_gyro(&mut self) -> Result<[f32; 3], DeviceError> {
        self.read_vector(registers::GYRO_X_LSB)
    }

    /// Release the bus
    pub fn release(self) -> I {
        self.i2c
    }

    fn read_vector(&mut self, reg: u8) -> Result<[f32; 3], DeviceError> {
        let mut buf = [0u8; 6];
        self.read_bytes(reg, &mut buf)?;
        let mut out = [0.0f32; 3];
        for (value, raw) in out.iter_mut().zip(buf.chunks_exact(2)) {
            *value = i16::from_le_bytes([raw[0], raw[1]]) as f32 / registers::DEG_LSB;
        }
        Ok(out)
    }

    fn read_register(&mut self, reg: u8) -> Result<u8, DeviceError> {
        let mut buf = [0u8; 1];
        self.read_bytes(reg, &mut buf)?;
        Ok(buf[0])
    }

    fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), DeviceError> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(|_| DeviceError::Bus)
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), DeviceError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| DeviceError::Bus)
    }
}

impl<I: I2c> HeadingSensor for Bno055<I> {
    fn heading_deg(&mut self) -> Result<f32, DeviceError> {
        Ok(self.read_euler()?.heading)
    }

    fn calibration(&mut self) -> Result<CalibrationStatus, DeviceError> {
        let status = self.read_register(registers::CALIB_STAT)?;
        Ok(CalibrationStatus::from_register(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::i2c::{ErrorType, Operation};

    /// Register file answering on one address
    struct TestBus {
        regs: [u8; 0x80],
        pointer: usize,
    }

    impl TestBus {
        fn new() -> Self {
            let mut regs = [0u8; 0x80];
            regs[registers::CHIP_ID as usize] = registers::EXPECTED_CHIP_ID;
            Self { regs, pointer: 0 }
        }
    }

    impl ErrorType for TestBus {
        type Error = Infallible;
    }

    impl I2c for TestBus {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        if let Some((reg, data)) = bytes.split_first() {
                            self.pointer = *reg as usize;
                            for (i, b) in data.iter().enumerate() {
                                self.regs[self.pointer + i] = *b;
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = self.regs[self.pointer + i];
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn init_sets_ndof_mode() {
        let mut imu = Bno055::new(TestBus::new());
        imu.init().unwrap();
        let bus = imu.release();
        assert_eq!(bus.regs[registers::OPR_MODE as usize], registers::MODE_NDOF);
    }

    #[test]
    fn init_rejects_wrong_chip() {
        let mut bus = TestBus::new();
        bus.regs[registers::CHIP_ID as usize] = 0x42;
        let mut imu = Bno055::new(bus);
        assert_eq!(imu.init(), Err(DeviceError::InvalidReading));
    }

    #[test]
    fn heading_is_scaled() {
        let mut bus = TestBus::new();
        // 90.5 deg = 1448 LSB
        let raw = 1448i16.to_le_bytes();
        bus.regs[registers::EULER_H_LSB as usize] = raw[0];
        bus.regs[registers::EULER_H_LSB as usize + 1] = raw[1];
        let roll = (-160i16).to_le_bytes();
        bus.regs[registers::EULER_H_LSB as usize + 2] = roll[0];
        bus.regs[registers::EULER_H_LSB as usize + 3] = roll[1];

        let mut imu = Bno055::new(bus);
        assert_eq!(imu.heading_deg().unwrap(), 90.5);
        assert_eq!(imu.read_euler().unwrap().roll, -10.0);
    }

    #[test]
    fn calibration_byte_decoded() {
        let mut bus = TestBus::new();
        bus.regs[registers::CALIB_STAT as usize] = 0b00_11_01_10;
        let mut imu = Bno055::new(bus);
        let cal = imu.calibration().unwrap();
        assert_eq!(cal.gyro, 3);
        assert_eq!(cal.accel, 1);
        assert_eq!(cal.mag, 2);
        assert!(cal.sensors_at_least(1));
    }
}
