/*
 *  display/surface.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  The watch screen: background, weather strip and time
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
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_text::alignment::HorizontalAlignment;
use log::{debug, info, warn};

use super::layer::{BitmapLayer, LayerId, TextLayer, Window};
use super::theme::Theme;
use crate::constants::{
    BACKGROUND_FRAME, DISPLAY_HEIGHT, DISPLAY_WIDTH, TIME_FRAME, TIME_PLACEHOLDER, WEATHER_FRAME,
    WEATHER_PLACEHOLDER,
};
use crate::host::error::ResourceError;
use crate::host::resources::{FontResource, ImageResource};
use crate::host::traits::ResourceLoader;
use crate::vframebuf::VarFrameBuf;

fn rect((x, y, width, height): (i32, i32, u32, u32)) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(width, height))
}

/// Layers that only exist between show() and hide()
#[derive(Debug)]
struct SurfaceLayers {
    background: BitmapLayer,
    weather: TextLayer,
    time: TextLayer,
}

/// Owns the window and everything drawn on it
#[derive(Debug)]
pub struct WatchSurface {
    window: Window,
    theme: Theme,
    layers: Option<SurfaceLayers>,
}

impl Default for WatchSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchSurface {
    pub fn new() -> Self {
        let theme = Theme::default();
        Self {
            window: Window::new(theme.palette().window_background),
            theme,
            layers: None,
        }
    }

    /// Acquire resources and build the layer stack.
    ///
    /// On failure anything already acquired is handed back and the surface
    /// stays hidden.
    pub fn show(&mut self, resources: &mut dyn ResourceLoader, theme: Theme) -> Result<(), ResourceError> {
        if self.layers.is_some() {
            warn!("Watch surface already shown");
            return Ok(());
        }

        let bitmap = resources.load_bitmap(ImageResource::SparkIconDark)?;
        let time_font = match resources.load_font(FontResource::Sync24) {
            Ok(font) => font,
            Err(e) => {
                resources.release_bitmap(bitmap);
                return Err(e);
            }
        };
        let weather_font = match resources.load_font(FontResource::Ubuntu12) {
            Ok(font) => font,
            Err(e) => {
                resources.unload_font(time_font);
                resources.release_bitmap(bitmap);
                return Err(e);
            }
        };

        let background = BitmapLayer::new(rect(BACKGROUND_FRAME), bitmap);

        let mut weather = TextLayer::new(rect(WEATHER_FRAME), weather_font)
            .with_alignment(HorizontalAlignment::Center);
        weather.set_text(WEATHER_PLACEHOLDER);

        let mut time = TextLayer::new(rect(TIME_FRAME), time_font)
            .with_alignment(HorizontalAlignment::Center);
        time.set_text(TIME_PLACEHOLDER);

        self.layers = Some(SurfaceLayers { background, weather, time });
        self.apply_theme(theme);

        self.window.add_child(LayerId::Background);
        self.window.add_child(LayerId::Weather);
        self.window.add_child(LayerId::Time);

        info!("Watch surface shown ({:?} theme)", theme);
        Ok(())
    }

    /// Detach and drop every layer, returning fonts and bitmap to the loader
    pub fn hide(&mut self, resources: &mut dyn ResourceLoader) {
        let Some(layers) = self.layers.take() else {
            debug!("Watch surface not shown, nothing to hide");
            return;
        };
        self.window.remove_all_children();

        resources.unload_font(layers.time.font());
        resources.unload_font(layers.weather.font());
        resources.release_bitmap(layers.background.into_bitmap());
        info!("Watch surface hidden");
    }

    pub fn is_loaded(&self) -> bool {
        self.layers.is_some()
    }

    pub fn set_time_text(&mut self, text: &str) {
        match self.layers.as_mut() {
            Some(layers) => layers.time.set_text(text),
            None => debug!("time '{}' dropped, surface hidden", text),
        }
    }

    pub fn set_weather_text(&mut self, text: &str) {
        match self.layers.as_mut() {
            Some(layers) => layers.weather.set_text(text),
            None => debug!("weather '{}' dropped, surface hidden", text),
        }
    }

    pub fn time_text(&self) -> Option<&str> {
        self.layers.as_ref().map(|layers| layers.time.text())
    }

    pub fn weather_text(&self) -> Option<&str> {
        self.layers.as_ref().map(|layers| layers.weather.text())
    }

    pub fn time_layer(&self) -> Option<&TextLayer> {
        self.layers.as_ref().map(|layers| &layers.time)
    }

    pub fn weather_layer(&self) -> Option<&TextLayer> {
        self.layers.as_ref().map(|layers| &layers.weather)
    }

    /// Restyle the window and every layer for `theme`
    pub fn apply_theme(&mut self, theme: Theme) {
        let palette = theme.palette();
        self.theme = theme;
        self.window.set_background(palette.window_background);

        if let Some(layers) = self.layers.as_mut() {
            layers.time.set_text_color(palette.time_text);
            layers.time.set_background(palette.time_background);
            layers.weather.set_text_color(palette.weather_text);
            layers.weather.set_background(palette.weather_background);
        }
        debug!("theme {:?} applied", theme);
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Compose the window and its attached layers, bottom first
    pub fn render<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.window.draw(target)?;

        let Some(layers) = self.layers.as_ref() else {
            return Ok(());
        };
        for id in self.window.children() {
            match id {
                LayerId::Background => layers.background.draw(target)?,
                LayerId::Weather => layers.weather.draw(target)?,
                LayerId::Time => layers.time.draw(target)?,
            }
        }
        Ok(())
    }

    /// Render into a fresh screen-sized framebuffer
    pub fn frame(&self) -> VarFrameBuf<BinaryColor> {
        let mut fb = VarFrameBuf::new(DISPLAY_WIDTH, DISPLAY_HEIGHT, BinaryColor::Off);
        if let Err(never) = self.render(&mut fb) {
            match never {}
        }
        fb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::color::Color;
    use crate::host::resources::BundledResources;

    #[test]
    fn test_show_builds_layer_stack() {
        let mut resources = BundledResources::default();
        let mut surface = WatchSurface::new();
        surface.show(&mut resources, Theme::Dark).unwrap();

        assert!(surface.is_loaded());
        assert_eq!(
            surface.window().children(),
            &[LayerId::Background, LayerId::Weather, LayerId::Time]
        );
        assert_eq!(surface.time_text(), Some("00:00"));
        assert_eq!(surface.weather_text(), Some("Loading..."));

        let time = surface.time_layer().unwrap();
        assert_eq!(time.frame(), Rectangle::new(Point::new(0, 136), Size::new(144, 40)));
        assert_eq!(time.alignment(), HorizontalAlignment::Center);
        assert_eq!(time.font().resource(), FontResource::Sync24);
        assert_eq!(surface.weather_layer().unwrap().font().resource(), FontResource::Ubuntu12);

        surface.hide(&mut resources);
    }

    #[test]
    fn test_show_then_hide_releases_everything() {
        let mut resources = BundledResources::default();
        let ledger = resources.ledger();
        let mut surface = WatchSurface::new();

        surface.show(&mut resources, Theme::Light).unwrap();
        assert_eq!(ledger.lock().unwrap().outstanding(), 3);

        surface.hide(&mut resources);
        let ledger = ledger.lock().unwrap();
        assert_eq!(ledger.outstanding(), 0);
        assert_eq!(ledger.fonts_unloaded, 2);
        assert_eq!(ledger.bitmaps_released, 1);
        assert_eq!(ledger.double_releases, 0);
        assert!(surface.window().children().is_empty());
        assert!(!surface.is_loaded());
    }

    #[test]
    fn test_show_twice_and_hide_twice_are_noops() {
        let mut resources = BundledResources::default();
        let ledger = resources.ledger();
        let mut surface = WatchSurface::new();

        surface.show(&mut resources, Theme::Dark).unwrap();
        surface.show(&mut resources, Theme::Light).unwrap();
        assert_eq!(ledger.lock().unwrap().outstanding(), 3);
        assert_eq!(surface.theme(), Theme::Dark);

        surface.hide(&mut resources);
        surface.hide(&mut resources);
        assert_eq!(ledger.lock().unwrap().double_releases, 0);
    }

    #[test]
    fn test_failed_show_releases_partial_load() {
        let mut resources = BundledResources::new(Some("/nonexistent/bg.pbm".into()));
        let ledger = resources.ledger();
        let mut surface = WatchSurface::new();

        assert!(surface.show(&mut resources, Theme::Dark).is_err());
        assert!(!surface.is_loaded());
        assert_eq!(ledger.lock().unwrap().outstanding(), 0);
    }

    #[test]
    fn test_text_while_hidden_is_dropped() {
        let mut surface = WatchSurface::new();
        surface.set_time_text("12:34");
        surface.set_weather_text("Sunny 80F");
        assert_eq!(surface.time_text(), None);
        assert_eq!(surface.weather_text(), None);
    }

    #[test]
    fn test_apply_theme_restyles_all_layers() {
        let mut resources = BundledResources::default();
        let mut surface = WatchSurface::new();
        surface.show(&mut resources, Theme::Dark).unwrap();

        surface.apply_theme(Theme::Light);
        assert_eq!(surface.window().background(), Color::White);
        let time = surface.time_layer().unwrap();
        assert_eq!(time.text_color(), Color::Black);
        assert_eq!(time.background(), Color::Clear);
        let weather = surface.weather_layer().unwrap();
        assert_eq!(weather.text_color(), Color::White);
        assert_eq!(weather.background(), Color::Black);

        surface.apply_theme(Theme::Dark);
        assert_eq!(surface.window().background(), Color::Black);
        assert_eq!(surface.time_layer().unwrap().text_color(), Color::White);
        assert_eq!(surface.weather_layer().unwrap().background(), Color::White);

        surface.hide(&mut resources);
    }

    #[test]
    fn test_render_weather_strip_follows_theme() {
        let mut resources = BundledResources::default();
        let mut surface = WatchSurface::new();
        surface.show(&mut resources, Theme::Dark).unwrap();
        surface.set_weather_text("");

        // dark theme: white strip across the top, black window below the spark
        let fb = surface.frame();
        assert_eq!(fb.pixel(0, 0), Some(BinaryColor::On));
        assert_eq!(fb.pixel(143, 15), Some(BinaryColor::On));

        surface.apply_theme(Theme::Light);
        let fb = surface.frame();
        assert_eq!(fb.pixel(0, 0), Some(BinaryColor::Off));

        surface.hide(&mut resources);
    }

    #[test]
    fn test_render_hidden_is_window_only() {
        let mut surface = WatchSurface::new();
        surface.apply_theme(Theme::Light);
        assert_eq!(surface.frame().count_on(), (DISPLAY_WIDTH * DISPLAY_HEIGHT) as usize);
    }
}
