/*
 *  host/clock.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Wall clock sources
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

use chrono::{Local, NaiveDateTime};
use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::ClockStyle;
use crate::host::traits::ClockSource;

/// Local time from the OS
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    style: ClockStyle,
}

impl SystemClock {
    pub fn new(style: ClockStyle) -> Self {
        Self { style }
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn style(&self) -> ClockStyle {
        self.style
    }
}

/// Clock frozen at a settable instant
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
    style: ClockStyle,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime, style: ClockStyle) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
            style,
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl ClockSource for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn style(&self) -> ClockStyle {
        self.style
    }
}
