/*
 *  display/color.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layer colors, including the transparent "clear"
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

/// Color of a layer's text or fill.
///
/// The watch panel is monochrome, so opaque colors map straight onto
/// `BinaryColor`; `Clear` leaves whatever is underneath untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Black/Off
    Black,

    /// White/On
    White,

    /// Transparent, draws nothing
    Clear,
}

impl Color {
    /// Convert to BinaryColor, `None` for transparent
    pub fn to_binary(&self) -> Option<BinaryColor> {
        match self {
            Color::Black => Some(BinaryColor::Off),
            Color::White => Some(BinaryColor::On),
            Color::Clear => None,
        }
    }
}
