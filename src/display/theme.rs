/*
 *  display/theme.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Light and dark palettes
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

use super::color::Color;

/// Color theme, persisted as a single flag (true = light)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn from_flag(light: bool) -> Self {
        if light { Theme::Light } else { Theme::Dark }
    }

    pub fn as_flag(self) -> bool {
        self == Theme::Light
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                window_background: Color::White,
                time_text: Color::Black,
                time_background: Color::Clear,
                weather_text: Color::White,
                weather_background: Color::Black,
            },
            Theme::Dark => Palette {
                window_background: Color::Black,
                time_text: Color::White,
                time_background: Color::Clear,
                weather_text: Color::Black,
                weather_background: Color::White,
            },
        }
    }
}

/// Every color the surface needs for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub window_background: Color,
    pub time_text: Color,
    pub time_background: Color,
    pub weather_text: Color,
    pub weather_background: Color,
}
