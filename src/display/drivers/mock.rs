/*
 *  display/drivers/mock.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display driver for testing without hardware
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::pixelcolor::BinaryColor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

/// Mock display driver for testing
///
/// Records every operation and keeps the last flushed frame unpacked so
/// tests can look at individual pixels.
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Shared state for testing
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of times flush() was called
    pub flush_count: usize,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Whether the driver is initialized
    pub is_initialized: bool,

    /// Total bytes written via write_buffer
    pub bytes_written: usize,

    /// Last frame written, not yet flushed
    pub pending: Vec<u8>,

    /// Last frame made visible by flush(), one entry per pixel
    pub visible: Vec<BinaryColor>,

    /// Simulate failures (for error testing)
    pub simulate_flush_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    /// Create a mock driver with specific dimensions
    pub fn new_with_size(width: u32, height: u32) -> Self {
        let capabilities = DisplayCapabilities {
            width,
            height,
        };
        let state = MockDriverState {
            visible: vec![BinaryColor::Off; (width * height) as usize],
            ..Default::default()
        };
        Self {
            capabilities,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> MutexGuard<'_, MockDriverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pixel of the visible frame
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        if x >= self.capabilities.width || y >= self.capabilities.height {
            return None;
        }
        let idx = (y * self.capabilities.width + x) as usize;
        self.lock().visible.get(idx).copied()
    }

    /// Count number of visible pixels set to On
    pub fn count_on_pixels(&self) -> usize {
        self.lock().visible.iter().filter(|&&p| p == BinaryColor::On).count()
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();

        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
        }

        state.init_count += 1;
        state.is_initialized = true;
        Ok(())
    }

    fn write_buffer(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        let expected = self.capabilities.frame_bytes();
        if buffer.len() != expected {
            return Err(DisplayError::BufferSizeMismatch {
                expected,
                actual: buffer.len(),
            });
        }

        let mut state = self.lock();
        if !state.is_initialized {
            return Err(DisplayError::NotInitialized);
        }
        state.bytes_written += buffer.len();
        state.pending = buffer.to_vec();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();

        if state.simulate_flush_failure {
            return Err(DisplayError::Other("Simulated flush failure".to_string()));
        }

        // unpack the pending frame into the visible one
        let pending = std::mem::take(&mut state.pending);
        for (byte_idx, &byte) in pending.iter().enumerate() {
            for bit in 0..8 {
                let pixel_idx = byte_idx * 8 + bit;
                if let Some(pixel) = state.visible.get_mut(pixel_idx) {
                    *pixel = if (byte & (1 << bit)) != 0 {
                        BinaryColor::On
                    } else {
                        BinaryColor::Off
                    };
                }
            }
        }

        state.flush_count += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.clear_count += 1;
        state.pending.clear();
        state.visible.fill(BinaryColor::Off);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::new_with_size(144, 168);
        assert_eq!(driver.dimensions(), (144, 168));
        assert_eq!(driver.count_on_pixels(), 0);
    }

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::new_with_size(144, 168);

        let state = driver.state();
        assert_eq!(state.lock().unwrap().init_count, 0);
        assert!(!state.lock().unwrap().is_initialized);

        driver.init().unwrap();

        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(state.lock().unwrap().is_initialized);
    }

    #[test]
    fn test_write_requires_init() {
        let mut driver = MockDriver::new_with_size(8, 8);
        assert!(matches!(driver.write_buffer(&[0; 8]), Err(DisplayError::NotInitialized)));
    }

    #[test]
    fn test_frame_visible_only_after_flush() {
        let mut driver = MockDriver::new_with_size(8, 2);
        driver.init().unwrap();

        driver.write_buffer(&[0xFF, 0x01]).unwrap();
        assert_eq!(driver.count_on_pixels(), 0);

        driver.flush().unwrap();
        assert_eq!(driver.count_on_pixels(), 9);
        assert_eq!(driver.get_pixel(0, 1), Some(BinaryColor::On));
        assert_eq!(driver.get_pixel(1, 1), Some(BinaryColor::Off));
        assert_eq!(driver.state().lock().unwrap().bytes_written, 2);
    }

    #[test]
    fn test_mock_driver_clear() {
        let mut driver = MockDriver::new_with_size(8, 1);
        driver.init().unwrap();
        driver.write_buffer(&[0xFF]).unwrap();
        driver.flush().unwrap();

        driver.clear().unwrap();

        assert_eq!(driver.count_on_pixels(), 0);
        assert_eq!(driver.state().lock().unwrap().clear_count, 1);
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::new_with_size(8, 8);

        driver.state().lock().unwrap().simulate_flush_failure = true;
        assert!(driver.flush().is_err());

        driver.state().lock().unwrap().simulate_flush_failure = false;
        assert!(driver.flush().is_ok());

        driver.state().lock().unwrap().simulate_init_failure = true;
        assert!(driver.init().is_err());
    }

    #[test]
    fn test_mock_driver_buffer_size_mismatch() {
        let mut driver = MockDriver::new_with_size(144, 168);
        driver.init().unwrap();

        // Should be 3024
        let buffer = vec![0xFF; 512];
        assert!(matches!(
            driver.write_buffer(&buffer),
            Err(DisplayError::BufferSizeMismatch { expected: 3024, actual: 512 })
        ));
    }
}
