/*
 *  constants.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen geometry, layer frames and buffer capacities
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

/// The width of the watch screen in pixels.
pub const DISPLAY_WIDTH: u32 = 144;
/// The height of the watch screen in pixels.
pub const DISPLAY_HEIGHT: u32 = 168;

// Layer frames as (x, y, width, height)
/// Background bitmap, taller than the screen and clipped at the bottom.
pub const BACKGROUND_FRAME: (i32, i32, u32, u32) = (0, 0, 144, 180);
/// Weather strip across the top.
pub const WEATHER_FRAME: (i32, i32, u32, u32) = (0, 0, 144, 16);
/// Time, near the bottom edge.
pub const TIME_FRAME: (i32, i32, u32, u32) = (0, 136, 144, 40);

/// "HH:MM"
pub const TIME_TEXT_CAPACITY: usize = 5;
/// Temperature such as "-40F" or "104F"
pub const TEMPERATURE_TEXT_CAPACITY: usize = 7;
pub const CONDITIONS_TEXT_CAPACITY: usize = 31;
/// Assembled "<condition> <temperature>" line
pub const WEATHER_TEXT_CAPACITY: usize = 31;

pub const TIME_PLACEHOLDER: &str = "00:00";
pub const WEATHER_PLACEHOLDER: &str = "Loading...";

/// Persist key for the theme flag (same tag the companion uses for color)
pub const THEME_PERSIST_KEY: u32 = 2;

// Host message buffer maxima, in bytes
pub const APP_MESSAGE_INBOX_SIZE_MAXIMUM: usize = 8200;
pub const APP_MESSAGE_OUTBOX_SIZE_MAXIMUM: usize = 8200;

/// Default weather refresh cadence: every minute tick.
pub const DEFAULT_WEATHER_INTERVAL_MINS: u32 = 1;
