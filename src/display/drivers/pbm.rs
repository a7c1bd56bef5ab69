/*
 *  display/drivers/pbm.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Desktop display driver, optionally snapshots each frame to a PBM file
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

use log::{debug, info};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

/// Headless panel. Holds the last frame and, when given a path, rewrites
/// it as a plain PBM image on every flush.
#[derive(Debug)]
pub struct PbmDriver {
    capabilities: DisplayCapabilities,
    snapshot: Option<PathBuf>,
    frame: Vec<u8>,
    initialized: bool,
    frames_written: u64,
}

impl PbmDriver {
    pub fn new(width: u32, height: u32, snapshot: Option<PathBuf>) -> Self {
        let capabilities = DisplayCapabilities {
            width,
            height,
        };
        let frame = vec![0; capabilities.frame_bytes()];
        Self {
            capabilities,
            snapshot,
            frame,
            initialized: false,
            frames_written: 0,
        }
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Current frame as P1 text, one raster row per line
    pub fn to_pbm(&self) -> String {
        let (width, height) = (self.capabilities.width as usize, self.capabilities.height as usize);
        let mut out = String::with_capacity(width * height * 2 + 16);
        let _ = writeln!(out, "P1\n{} {}", width, height);
        for y in 0..height {
            let row: Vec<&str> = (0..width)
                .map(|x| {
                    let i = y * width + x;
                    if self.frame[i / 8] & (1 << (i % 8)) != 0 { "1" } else { "0" }
                })
                .collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
        out
    }

    fn write_snapshot(&self, path: &Path) -> Result<(), DisplayError> {
        let tmp = path.with_extension("pbm.tmp");
        fs::write(&tmp, self.to_pbm())?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl DisplayDriver for PbmDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        if let Some(path) = self.snapshot.as_ref() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).map_err(|e| {
                    DisplayError::InitializationFailed(format!("{}: {}", dir.display(), e))
                })?;
            }
            info!("Display snapshots go to {}", path.display());
        } else {
            info!("Display running headless, no snapshots");
        }
        self.initialized = true;
        Ok(())
    }

    fn write_buffer(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        if buffer.len() != self.frame.len() {
            return Err(DisplayError::BufferSizeMismatch {
                expected: self.frame.len(),
                actual: buffer.len(),
            });
        }
        self.frame.copy_from_slice(buffer);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        if let Some(path) = self.snapshot.as_deref() {
            self.write_snapshot(path)?;
            debug!("frame {} written to {}", self.frames_written + 1, path.display());
        }
        self.frames_written += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.frame.fill(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::resources::parse_pbm;
    use embedded_graphics::pixelcolor::BinaryColor;

    #[test]
    fn test_requires_init() {
        let mut driver = PbmDriver::new(8, 1, None);
        assert!(matches!(driver.write_buffer(&[0]), Err(DisplayError::NotInitialized)));
        assert!(matches!(driver.flush(), Err(DisplayError::NotInitialized)));
    }

    #[test]
    fn test_headless_flush_counts_frames() {
        let mut driver = PbmDriver::new(8, 1, None);
        driver.init().unwrap();
        driver.write_buffer(&[0b0000_0101]).unwrap();
        driver.flush().unwrap();
        assert_eq!(driver.frames_written(), 1);
        assert_eq!(driver.to_pbm(), "P1\n8 1\n1 0 1 0 0 0 0 0\n");
    }

    #[test]
    fn test_snapshot_round_trips_through_parser() {
        let path = std::env::temp_dir().join(format!("sparkface-snap-{}.pbm", std::process::id()));
        let mut driver = PbmDriver::new(4, 2, Some(path.clone()));
        driver.init().unwrap();
        driver.write_buffer(&[0b1000_0001]).unwrap();
        driver.flush().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let (w, h, pixels) = parse_pbm(&text).unwrap();
        assert_eq!((w, h), (4, 2));
        assert_eq!(pixels[0], BinaryColor::On);
        assert_eq!(pixels[7], BinaryColor::On);
        assert_eq!(pixels.iter().filter(|p| p.is_on()).count(), 2);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_clear_blanks_frame() {
        let mut driver = PbmDriver::new(8, 1, None);
        driver.init().unwrap();
        driver.write_buffer(&[0xFF]).unwrap();
        driver.clear().unwrap();
        assert_eq!(driver.to_pbm(), "P1\n8 1\n0 0 0 0 0 0 0 0\n");
    }
}
