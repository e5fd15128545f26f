//! Device drivers
//!
//! Hardware-independent drivers for the Romi's sensors and actuators,
//! written against embedded-hal 1.0 traits and the small raw-hardware
//! traits in [`traits`].
//!
//! ## Modules
//!
//! - `traits`: device trait definitions (MotorDriver, Encoder, LineArray, ...)
//! - `motor`: phase/enable H-bridge motor
//! - `encoder`: quadrature encoder over a wrapping counter
//! - `line_sensor`: reflectance array with white/black calibration
//! - `bump`: debounced bumper switch
//! - `heading`: BNO055 fusion IMU
//! - `mock`: host mocks for every device trait

pub mod bump;
pub mod encoder;
pub mod heading;
pub mod line_sensor;
pub mod mock;
pub mod motor;
pub mod traits;

pub use bump::DebouncedBump;
pub use encoder::QuadratureEncoder;
pub use heading::Bno055;
pub use line_sensor::AdcLineArray;
pub use motor::PhaseEnableMotor;
