/*
 *  weather.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather channel - refresh trigger out, key/value decode in
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

use log::{debug, info, warn};

use crate::constants::{
    CONDITIONS_TEXT_CAPACITY, DEFAULT_WEATHER_INTERVAL_MINS, TEMPERATURE_TEXT_CAPACITY,
    WEATHER_PLACEHOLDER, WEATHER_TEXT_CAPACITY,
};
use crate::display::theme::Theme;
use crate::fixed_text::FixedText;
use crate::host::{ChannelError, MessageChannel};
use crate::message::{Dictionary, MessageKey, REFRESH_REQUEST_KEY, Tuple, TupleValue};

pub type TemperatureText = FixedText<TEMPERATURE_TEXT_CAPACITY>;
pub type ConditionsText = FixedText<CONDITIONS_TEXT_CAPACITY>;
pub type WeatherText = FixedText<WEATHER_TEXT_CAPACITY>;

/// Latest weather fields; each one is replaced independently as it arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherReading {
    pub temperature: TemperatureText,
    pub conditions: ConditionsText,
}

impl WeatherReading {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty() && self.conditions.is_empty()
    }
}

/// What a decoded batch asks the rest of the app to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Theme requested by a color tuple (last one wins)
    pub theme: Option<Theme>,
    /// A temperature or condition field changed
    pub weather_updated: bool,
    /// Keys that were not recognized, in delivery order
    pub ignored: Vec<u32>,
}

/// Companion weather exchange
#[derive(Debug, Clone)]
pub struct WeatherChannel {
    reading: WeatherReading,
    interval_mins: u32,
    requests_sent: u64,
}

impl Default for WeatherChannel {
    fn default() -> Self {
        Self::new(DEFAULT_WEATHER_INTERVAL_MINS)
    }
}

impl WeatherChannel {
    pub fn new(interval_mins: u32) -> Self {
        Self {
            reading: WeatherReading::default(),
            interval_mins: interval_mins.max(1),
            requests_sent: 0,
        }
    }

    pub fn reading(&self) -> &WeatherReading {
        &self.reading
    }

    pub fn interval_mins(&self) -> u32 {
        self.interval_mins
    }

    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }

    /// Whether the tick at `minute` should ask the companion for fresh weather
    pub fn refresh_due(&self, minute: u32) -> bool {
        minute % self.interval_mins == 0
    }

    /// The single-field trigger message
    pub fn request_message() -> Dictionary {
        Dictionary::new().with_int(REFRESH_REQUEST_KEY, 0)
    }

    /// Send the refresh trigger. Not retried; the caller only logs a failure.
    pub fn request_refresh(&mut self, channel: &mut dyn MessageChannel) -> Result<(), ChannelError> {
        channel.send(&Self::request_message())?;
        self.requests_sent += 1;
        debug!("weather refresh requested ({} so far)", self.requests_sent);
        Ok(())
    }

    /// Process one inbound batch, tuple by tuple in delivery order
    pub fn decode(&mut self, dict: &Dictionary) -> DecodeOutcome {
        let mut outcome = DecodeOutcome::default();

        for tuple in dict {
            match MessageKey::from_key(tuple.key) {
                Some(MessageKey::Temperature) => {
                    if self.apply_temperature(&tuple.value) {
                        outcome.weather_updated = true;
                    }
                }
                Some(MessageKey::Conditions) => {
                    self.apply_conditions(&tuple.value);
                    outcome.weather_updated = true;
                }
                Some(MessageKey::Color) => {
                    let theme = theme_from_switch(tuple);
                    info!("Got key_color with value {} -> {:?}", tuple.value, theme);
                    outcome.theme = Some(theme);
                }
                None => {
                    warn!("Key {} not recognized!", tuple.key);
                    outcome.ignored.push(tuple.key);
                }
            }
        }

        outcome
    }

    /// Weather line for the display: "<condition> <temperature>", or the
    /// placeholder while nothing has been received.
    pub fn render(&self) -> WeatherText {
        let mut text = WeatherText::new();
        let reading = &self.reading;

        let truncated = match (reading.conditions.is_empty(), reading.temperature.is_empty()) {
            (true, true) => text.set(WEATHER_PLACEHOLDER),
            (false, true) => text.set(reading.conditions.as_str()),
            (true, false) => text.set(reading.temperature.as_str()),
            (false, false) => text.set_fmt(format_args!(
                "{} {}",
                reading.conditions, reading.temperature
            )),
        };
        if truncated {
            debug!("weather line truncated to {:?}", text.as_str());
        }
        text
    }

    fn apply_temperature(&mut self, value: &TupleValue) -> bool {
        let degrees = match value {
            TupleValue::Int(v) => *v,
            TupleValue::Text(s) => match s.trim().parse::<i32>() {
                Ok(v) => v,
                Err(_) => {
                    warn!("temperature {:?} is not a number, ignored", s);
                    return false;
                }
            },
        };

        let mut formatted = TemperatureText::new();
        if formatted.set_fmt(format_args!("{}F", degrees)) {
            warn!("temperature {} does not fit the display, ignored", degrees);
            return false;
        }
        self.reading.temperature = formatted;
        true
    }

    fn apply_conditions(&mut self, value: &TupleValue) {
        let truncated = match value {
            TupleValue::Text(s) => self.reading.conditions.set(s),
            TupleValue::Int(v) => self.reading.conditions.set_fmt(format_args!("{}", v)),
        };
        if truncated {
            debug!("conditions truncated to {:?}", self.reading.conditions.as_str());
        }
    }
}

/// Map a color tuple to a theme: "on" is light, "off" or anything else dark.
fn theme_from_switch(tuple: &Tuple) -> Theme {
    match &tuple.value {
        TupleValue::Text(s) if s == "on" => Theme::Light,
        TupleValue::Text(s) if s == "off" => Theme::Dark,
        TupleValue::Text(s) => {
            warn!("unexpected color value {:?}, using dark", s);
            Theme::Dark
        }
        TupleValue::Int(v) => Theme::from_flag(*v != 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::RecordingChannel;

    #[test]
    fn test_empty_batch_renders_placeholder() {
        let mut weather = WeatherChannel::default();
        let outcome = weather.decode(&Dictionary::new());
        assert_eq!(outcome, DecodeOutcome::default());
        assert_eq!(weather.render().as_str(), "Loading...");
    }

    #[test]
    fn test_temperature_only() {
        let mut weather = WeatherChannel::default();
        let outcome = weather.decode(&Dictionary::new().with_int(0, 72));
        assert!(outcome.weather_updated);
        assert!(weather.reading().conditions.is_empty());
        assert_eq!(weather.render().as_str(), "72F");
    }

    #[test]
    fn test_fields_across_batches() {
        let mut weather = WeatherChannel::default();
        weather.decode(&Dictionary::new().with_int(0, 72));
        weather.decode(&Dictionary::new().with_text(1, "Cloudy"));
        assert_eq!(weather.render().as_str(), "Cloudy 72F");

        // partial reply keeps the stale temperature
        weather.decode(&Dictionary::new().with_text(1, "Rain"));
        assert_eq!(weather.render().as_str(), "Rain 72F");
    }

    #[test]
    fn test_negative_and_text_temperature() {
        let mut weather = WeatherChannel::default();
        weather.decode(&Dictionary::new().with_int(0, -40));
        assert_eq!(weather.reading().temperature.as_str(), "-40F");

        weather.decode(&Dictionary::new().with_text(0, " 65 "));
        assert_eq!(weather.reading().temperature.as_str(), "65F");

        let outcome = weather.decode(&Dictionary::new().with_text(0, "warm"));
        assert!(!outcome.weather_updated);
        assert_eq!(weather.reading().temperature.as_str(), "65F");
    }

    #[test]
    fn test_oversized_temperature_rejected() {
        let mut weather = WeatherChannel::default();
        weather.decode(&Dictionary::new().with_int(0, 70));

        // "999999F" fits exactly, one more digit does not
        weather.decode(&Dictionary::new().with_int(0, 999_999));
        assert_eq!(weather.reading().temperature.as_str(), "999999F");

        let outcome = weather.decode(&Dictionary::new().with_int(0, i32::MIN));
        assert!(!outcome.weather_updated);
        assert_eq!(weather.reading().temperature.as_str(), "999999F");
    }

    #[test]
    fn test_long_conditions_truncated() {
        let mut weather = WeatherChannel::default();
        let long = "Scattered thunderstorms with hail and strong gusts";
        weather.decode(&Dictionary::new().with_text(1, long));

        let conditions = &weather.reading().conditions;
        assert_eq!(conditions.len(), 31);
        assert!(conditions.was_truncated());
        assert!(long.starts_with(conditions.as_str()));

        weather.decode(&Dictionary::new().with_int(0, 55));
        let line = weather.render();
        assert!(line.len() <= 31);
        assert!(line.as_str().starts_with("Scattered"));
    }

    #[test]
    fn test_color_switch() {
        let mut weather = WeatherChannel::default();
        assert_eq!(weather.decode(&Dictionary::new().with_text(2, "on")).theme, Some(Theme::Light));
        assert_eq!(weather.decode(&Dictionary::new().with_text(2, "off")).theme, Some(Theme::Dark));
        assert_eq!(weather.decode(&Dictionary::new().with_text(2, "purple")).theme, Some(Theme::Dark));
        assert_eq!(weather.decode(&Dictionary::new().with_int(2, 1)).theme, Some(Theme::Light));

        // last color tuple in a batch wins
        let dict = Dictionary::new().with_text(2, "on").with_text(2, "off");
        assert_eq!(weather.decode(&dict).theme, Some(Theme::Dark));

        // color alone leaves the weather untouched
        assert!(weather.reading().is_empty());
        assert_eq!(weather.render().as_str(), "Loading...");
    }

    #[test]
    fn test_unknown_key_ignored() {
        let mut weather = WeatherChannel::default();
        weather.decode(&Dictionary::new().with_int(0, 72).with_text(1, "Sunny"));
        let before = weather.reading().clone();

        let outcome = weather.decode(&Dictionary::new().with_int(99, 5));
        assert_eq!(outcome.ignored, vec![99]);
        assert_eq!(outcome.theme, None);
        assert!(!outcome.weather_updated);
        assert_eq!(weather.reading(), &before);
    }

    #[test]
    fn test_refresh_due() {
        let every_minute = WeatherChannel::new(1);
        assert!((0..60).all(|m| every_minute.refresh_due(m)));

        let half_hourly = WeatherChannel::new(30);
        assert!(half_hourly.refresh_due(0));
        assert!(half_hourly.refresh_due(30));
        assert!(!half_hourly.refresh_due(15));

        // zero is clamped rather than dividing by zero
        assert_eq!(WeatherChannel::new(0).interval_mins(), 1);
    }

    #[test]
    fn test_request_refresh_sends_trigger() {
        let mut channel = RecordingChannel::new();
        channel.open(8200, 8200);
        let state = channel.state();
        let mut weather = WeatherChannel::default();

        weather.request_refresh(&mut channel).unwrap();
        assert_eq!(weather.requests_sent(), 1);

        let state = state.lock().unwrap();
        assert_eq!(state.sent, vec![Dictionary::new().with_int(0, 0)]);
    }

    #[test]
    fn test_request_refresh_failure_not_counted() {
        let mut channel = RecordingChannel::new();
        channel.open(8200, 8200);
        channel.state().lock().unwrap().simulate_send_failure = true;
        let mut weather = WeatherChannel::default();

        assert!(weather.request_refresh(&mut channel).is_err());
        assert_eq!(weather.requests_sent(), 0);
    }
}
