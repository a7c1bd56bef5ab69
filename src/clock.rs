/*
 *  clock.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Clock updater - HH:MM in the host's 12/24 hour style
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

use chrono::Timelike;
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::TIME_TEXT_CAPACITY;
use crate::display::surface::WatchSurface;
use crate::fixed_text::FixedText;

pub type TimeText = FixedText<TIME_TEXT_CAPACITY>;

/// Host clock-format setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ClockStyle {
    #[serde(rename = "12h")]
    #[value(name = "12h")]
    TwelveHour,
    #[default]
    #[serde(rename = "24h")]
    #[value(name = "24h")]
    TwentyFourHour,
}

impl ClockStyle {
    pub fn is_24h(self) -> bool {
        self == ClockStyle::TwentyFourHour
    }
}

/// Format `time` as "HH:MM".
///
/// 24 hour style gives 00..23, 12 hour style gives 01..12; both zero padded.
pub fn format_time<T: Timelike>(time: &T, style: ClockStyle) -> TimeText {
    let hour = match style {
        ClockStyle::TwentyFourHour => time.hour(),
        ClockStyle::TwelveHour => time.hour12().1,
    };
    let mut text = TimeText::new();
    text.set_fmt(format_args!("{:02}:{:02}", hour, time.minute()));
    text
}

/// Format the current time and push it to the time region
pub fn update_time<T: Timelike>(surface: &mut WatchSurface, now: &T, style: ClockStyle) -> TimeText {
    let text = format_time(now, style);
    debug!("time -> {}", text);
    surface.set_time_text(text.as_str());
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_24h_is_zero_padded() {
        assert_eq!(format_time(&at(0, 0), ClockStyle::TwentyFourHour).as_str(), "00:00");
        assert_eq!(format_time(&at(7, 5), ClockStyle::TwentyFourHour).as_str(), "07:05");
        assert_eq!(format_time(&at(23, 59), ClockStyle::TwentyFourHour).as_str(), "23:59");
    }

    #[test]
    fn test_12h_hours_in_range() {
        assert_eq!(format_time(&at(0, 15), ClockStyle::TwelveHour).as_str(), "12:15");
        assert_eq!(format_time(&at(9, 30), ClockStyle::TwelveHour).as_str(), "09:30");
        assert_eq!(format_time(&at(12, 0), ClockStyle::TwelveHour).as_str(), "12:00");
        assert_eq!(format_time(&at(13, 1), ClockStyle::TwelveHour).as_str(), "01:01");
    }

    #[test]
    fn test_every_minute_fits() {
        for h in 0..24 {
            for m in 0..60 {
                for style in [ClockStyle::TwelveHour, ClockStyle::TwentyFourHour] {
                    let text = format_time(&at(h, m), style);
                    assert_eq!(text.len(), 5);
                    assert!(!text.was_truncated());

                    let hour: u32 = text.as_str()[..2].parse().unwrap();
                    if style.is_24h() {
                        assert_eq!(hour, h);
                    } else {
                        assert!((1..=12).contains(&hour));
                    }
                }
            }
        }
    }
}
