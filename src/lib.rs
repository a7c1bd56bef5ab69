/*
 *  lib.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Library root, shared by the binary and the integration tests
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

pub mod app;
pub mod clock;
pub mod config;
pub mod constants;
pub mod display;
pub mod fixed_text;
pub mod host;
pub mod message;
pub mod preferences;
pub mod runtime;
pub mod vframebuf;
pub mod weather;

pub use app::{Lifecycle, Watchface, WatchfaceError, WatchfaceSettings};
pub use message::{Dictionary, Tuple, TupleValue};
