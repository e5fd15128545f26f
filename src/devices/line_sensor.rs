//! Reflectance line sensor array
//!
//! Each channel is normalised against two references captured during
//! calibration: white (bare floor, low reflectance reading) and black (the
//! line). A normalised value of 0.0 is floor, 1.0 is line. The line
//! position is the weighted centroid of the normalised values, as a
//! fractional channel index (0.0 = first channel).

use heapless::Vec;

use super::traits::{AdcChannel, LineArray};
use crate::core::error::DeviceError;

/// Full scale of a 12-bit ADC
pub const ADC_FULL_SCALE: u16 = 4095;

/// Line sensor array over `N` ADC channels
pub struct AdcLineArray<A: AdcChannel, const N: usize> {
    channels: [A; N],
    white: [u16; N],
    black: [u16; N],
}

impl<A: AdcChannel, const N: usize> AdcLineArray<A, N> {
    /// Uncalibrated array (white = full scale, black = 0)
    pub fn new(channels: [A; N]) -> Self {
        Self {
            channels,
            white: [ADC_FULL_SCALE; N],
            black: [0; N],
        }
    }

    /// Per-channel white references
    pub fn white(&self) -> &[u16; N] {
        &self.white
    }

    /// Per-channel black references
    pub fn black(&self) -> &[u16; N] {
        &self.black
    }

    /// Raw readings of every channel
    pub fn read_raw(&mut self) -> Result<[u16; N], DeviceError> {
        let mut raw = [0u16; N];
        for (slot, channel) in raw.iter_mut().zip(self.channels.iter_mut()) {
            *slot = channel.read_raw()?;
        }
        Ok(raw)
    }

    /// Normalised readings in [0, 1]
    pub fn read_normalized(&mut self) -> Result<Vec<f32, N>, DeviceError> {
        let raw = self.read_raw()?;
        let mut out = Vec::new();
        for i in 0..N {
            // capacity is N, cannot overflow
            let _ = out.push(normalize(raw[i], self.white[i], self.black[i]));
        }
        Ok(out)
    }
}

/// Normalise one reading; a channel whose references coincide reads 0
fn normalize(raw: u16, white: u16, black: u16) -> f32 {
    let span = black as f32 - white as f32;
    if span == 0.0 {
        return 0.0;
    }
    ((raw as f32 - white as f32) / span).clamp(0.0, 1.0)
}

/// Weighted centroid of `values`, `None` if they sum to zero
pub fn centroid(values: &[f32]) -> Option<f32> {
    let (weighted, total) = values
        .iter()
        .enumerate()
        .fold((0.0f32, 0.0f32), |(w, t), (i, v)| (w + i as f32 * v, t + v));
    if total > 0.0 {
        Some(weighted / total)
    } else {
        None
    }
}

impl<A: AdcChannel, const N: usize> LineArray for AdcLineArray<A, N> {
    fn capture_white(&mut self) -> Result<(), DeviceError> {
        self.white = self.read_raw()?;
        Ok(())
    }

    fn capture_black(&mut self) -> Result<(), DeviceError> {
        self.black = self.read_raw()?;
        Ok(())
    }

    fn centroid(&mut self) -> Result<Option<f32>, DeviceError> {
        let values = self.read_normalized()?;
        Ok(centroid(&values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    struct FixedAdc(u16);

    impl AdcChannel for FixedAdc {
        fn read_raw(&mut self) -> Result<u16, DeviceError> {
            Ok(self.0)
        }
    }

    #[test]
    fn normalize_clamps() {
        assert_eq!(normalize(200, 200, 3000), 0.0);
        assert_eq!(normalize(3000, 200, 3000), 1.0);
        assert_eq!(normalize(100, 200, 3000), 0.0);
        assert_eq!(normalize(4000, 200, 3000), 1.0);
        assert_eq!(normalize(1600, 200, 3000), 0.5);
        assert_eq!(normalize(500, 500, 500), 0.0);
    }

    #[test]
    fn centroid_of_values() {
        assert_eq!(centroid(&[0.0, 0.0, 1.0, 0.0]), Some(2.0));
        assert_eq!(centroid(&[0.0, 1.0, 1.0, 0.0]), Some(1.5));
        assert_eq!(centroid(&[0.0; 8]), None);
    }

    #[test]
    fn calibrated_array_finds_line() {
        let mut array = AdcLineArray::new([FixedAdc(200); 4]);
        array.capture_white().unwrap();
        for ch in array.channels.iter_mut() {
            ch.0 = 3000;
        }
        array.capture_black().unwrap();
        assert_eq!(array.white(), &[200; 4]);
        assert_eq!(array.black(), &[3000; 4]);

        array.channels[0].0 = 200;
        array.channels[1].0 = 200;
        array.channels[2].0 = 3000;
        array.channels[3].0 = 3000;
        assert_eq!(array.centroid().unwrap(), Some(2.5));

        for ch in array.channels.iter_mut() {
            ch.0 = 150;
        }
        assert_eq!(array.centroid().unwrap(), None);
    }
}
