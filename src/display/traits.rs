/*
 *  display/traits.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for display driver abstraction
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

use crate::display::error::DisplayError;

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,
}

impl DisplayCapabilities {
    /// Bytes in one packed monochrome frame
    pub fn frame_bytes(&self) -> usize {
        (self.width as usize * self.height as usize).div_ceil(8)
    }
}

/// The panel the watch screen is pushed to.
///
/// Frames arrive already composed and packed (8 pixels per byte, LSB
/// first); the driver only moves them to the hardware or wherever it
/// stands in for it.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Prepare the display for rendering
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Replace the pending frame
    fn write_buffer(&mut self, buffer: &[u8]) -> Result<(), DisplayError>;

    /// Make the pending frame visible
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Blank the display
    fn clear(&mut self) -> Result<(), DisplayError>;
}
