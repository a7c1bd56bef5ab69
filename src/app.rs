/*
 *  app.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Watchface lifecycle: start, tick, inbox, stop
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

use chrono::{NaiveDateTime, Timelike};
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::clock::update_time;
use crate::constants::DEFAULT_WEATHER_INTERVAL_MINS;
use crate::display::{BoxedDriver, DisplayError, WatchSurface};
use crate::host::{
    ChannelError, ClockSource, Host, MessageChannel, ResourceError, ResourceLoader, StorageError,
};
use crate::message::Dictionary;
use crate::preferences::PreferenceStore;
use crate::weather::WeatherChannel;

#[derive(Debug, Error)]
pub enum WatchfaceError {
    #[error("display error: {0}")]
    Display(#[from] DisplayError),
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Knobs the watchface takes from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchfaceSettings {
    /// Ask for weather on ticks where `minute % interval == 0`
    pub weather_interval_mins: u32,
}

impl Default for WatchfaceSettings {
    fn default() -> Self {
        Self {
            weather_interval_mins: DEFAULT_WEATHER_INTERVAL_MINS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    Stopped,
}

/// The watch app. Owns the surface, the weather state and every host
/// service; events are fed to it one at a time.
pub struct Watchface {
    surface: WatchSurface,
    weather: WeatherChannel,
    preferences: PreferenceStore,
    channel: Box<dyn MessageChannel>,
    resources: Box<dyn ResourceLoader>,
    clock: Box<dyn ClockSource>,
    display: BoxedDriver,
    lifecycle: Lifecycle,
    frames_presented: u64,
}

impl Watchface {
    pub fn new(settings: WatchfaceSettings, host: Host) -> Self {
        let Host { channel, storage, resources, clock, display } = host;
        Self {
            surface: WatchSurface::new(),
            weather: WeatherChannel::new(settings.weather_interval_mins),
            preferences: PreferenceStore::new(storage),
            channel,
            resources,
            clock,
            display,
            lifecycle: Lifecycle::Created,
            frames_presented: 0,
        }
    }

    /// Bring the face up: panel, companion channel, layers, first frame
    pub fn start(&mut self) -> Result<(), WatchfaceError> {
        if self.lifecycle != Lifecycle::Created {
            warn!("Watchface start ignored, already {:?}", self.lifecycle);
            return Ok(());
        }

        self.display.init()?;

        let (inbox, outbox) = (self.channel.inbox_size_maximum(), self.channel.outbox_size_maximum());
        self.channel.open(inbox, outbox);

        let theme = self.preferences.theme();
        self.surface.show(self.resources.as_mut(), theme)?;

        update_time(&mut self.surface, &self.clock.now(), self.clock.style());

        self.lifecycle = Lifecycle::Running;
        info!("Watchface started");
        self.redraw();
        Ok(())
    }

    /// Minute tick using the host clock
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.on_tick(now);
    }

    pub fn on_tick(&mut self, now: NaiveDateTime) {
        if self.lifecycle != Lifecycle::Running {
            debug!("tick ignored while {:?}", self.lifecycle);
            return;
        }

        update_time(&mut self.surface, &now, self.clock.style());

        if self.weather.refresh_due(now.minute()) {
            if let Err(e) = self.weather.request_refresh(self.channel.as_mut()) {
                warn!("Weather refresh request failed: {}", e);
            }
        }

        self.redraw();
    }

    pub fn on_inbox(&mut self, message: &Dictionary) {
        if self.lifecycle != Lifecycle::Running {
            debug!("inbox ignored while {:?}", self.lifecycle);
            return;
        }

        let outcome = self.weather.decode(message);
        if !outcome.ignored.is_empty() {
            debug!("ignored keys {:?}", outcome.ignored);
        }

        if let Some(theme) = outcome.theme {
            self.surface.apply_theme(theme);
            if let Err(e) = self.preferences.set_theme(theme) {
                error!("Failed to persist theme: {}", e);
            }
        }

        let text = self.weather.render();
        self.surface.set_weather_text(text.as_str());

        self.redraw();
    }

    /// Tear down in reverse: layers and their resources, then the panel
    pub fn stop(&mut self) {
        match self.lifecycle {
            Lifecycle::Stopped => {
                debug!("Watchface already stopped");
                return;
            }
            Lifecycle::Created => {}
            Lifecycle::Running => {
                self.surface.hide(self.resources.as_mut());
                if let Err(e) = self.display.clear().and_then(|_| self.display.flush()) {
                    warn!("Failed to blank display: {}", e);
                }
            }
        }
        self.lifecycle = Lifecycle::Stopped;
        info!("Watchface stopped after {} frames", self.frames_presented);
    }

    /// Compose the surface and push it to the panel; failures are logged
    pub fn redraw(&mut self) {
        if !self.surface.is_loaded() {
            return;
        }
        if let Err(e) = self.present() {
            error!("Display update failed: {}", e);
        }
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        let frame = self.surface.frame();
        self.display.write_buffer(&frame.to_packed_bytes())?;
        self.display.flush()?;
        self.frames_presented += 1;
        Ok(())
    }

    pub fn surface(&self) -> &WatchSurface {
        &self.surface
    }

    pub fn weather(&self) -> &WeatherChannel {
        &self.weather
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}
