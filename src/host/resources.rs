/*
 *  host/resources.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bundled fonts and the spark background image
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

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{FONT_6X12, FONT_10X20};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle};
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::constants::{BACKGROUND_FRAME, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::host::error::ResourceError;
use crate::host::traits::ResourceLoader;
use crate::vframebuf::VarFrameBuf;

/// Fonts shipped with the watchface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontResource {
    /// Large time digits
    Sync24,
    /// Small weather line
    Ubuntu12,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageResource {
    SparkIconDark,
}

/// A loaded font. Copyable so layers can share it, but only the surface
/// that loaded it hands it back.
#[derive(Clone, Copy)]
pub struct FontHandle {
    resource: FontResource,
    font: &'static MonoFont<'static>,
    serial: u64,
}

impl FontHandle {
    pub fn new(resource: FontResource, font: &'static MonoFont<'static>, serial: u64) -> Self {
        Self { resource, font, serial }
    }

    pub fn resource(&self) -> FontResource {
        self.resource
    }

    pub fn font(&self) -> &'static MonoFont<'static> {
        self.font
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("resource", &self.resource)
            .field("serial", &self.serial)
            .finish()
    }
}

/// Decoded monochrome image. Deliberately not `Clone`: it is released by value.
pub struct Bitmap {
    resource: ImageResource,
    serial: u64,
    size: Size,
    pixels: Vec<BinaryColor>,
}

impl Bitmap {
    pub fn from_pixels(
        resource: ImageResource,
        serial: u64,
        width: u32,
        height: u32,
        pixels: Vec<BinaryColor>,
    ) -> Result<Self, ResourceError> {
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(ResourceError::InvalidBitmap(format!(
                "{}x{} needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            resource,
            serial,
            size: Size::new(width, height),
            pixels,
        })
    }

    pub fn resource(&self) -> ImageResource {
        self.resource
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixels.get((y * self.size.width + x) as usize).copied()
    }

    /// Pixels positioned with the bitmap's top-left at `origin`
    pub fn pixels_at(&self, origin: Point) -> impl Iterator<Item = Pixel<BinaryColor>> + '_ {
        let width = self.size.width as usize;
        self.pixels.iter().enumerate().map(move |(i, &c)| {
            let p = Point::new((i % width) as i32, (i / width) as i32);
            Pixel(origin + p, c)
        })
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("resource", &self.resource)
            .field("serial", &self.serial)
            .field("size", &self.size)
            .finish()
    }
}

/// Acquire/release bookkeeping, shared so tests can inspect it after the
/// loader has been boxed into a host
#[derive(Debug, Default)]
pub struct ResourceLedger {
    pub fonts_loaded: usize,
    pub fonts_unloaded: usize,
    pub bitmaps_loaded: usize,
    pub bitmaps_released: usize,
    /// Releases of handles that were not outstanding
    pub double_releases: usize,
    outstanding_fonts: Vec<u64>,
    outstanding_bitmaps: Vec<u64>,
}

impl ResourceLedger {
    /// Handles acquired and not yet released
    pub fn outstanding(&self) -> usize {
        self.outstanding_fonts.len() + self.outstanding_bitmaps.len()
    }

    fn release(list: &mut Vec<u64>, serial: u64) -> bool {
        match list.iter().position(|&s| s == serial) {
            Some(i) => {
                list.swap_remove(i);
                true
            }
            None => false,
        }
    }
}

/// Resource loader backed by the built-in mono fonts and a drawn spark
/// icon, or a PBM image when one is configured.
#[derive(Debug)]
pub struct BundledResources {
    background: Option<PathBuf>,
    next_serial: u64,
    ledger: Arc<Mutex<ResourceLedger>>,
}

impl Default for BundledResources {
    fn default() -> Self {
        Self::new(None)
    }
}

impl BundledResources {
    /// `background` replaces the drawn spark icon with a PBM (P1) file
    pub fn new(background: Option<PathBuf>) -> Self {
        Self {
            background,
            next_serial: 1,
            ledger: Arc::new(Mutex::new(ResourceLedger::default())),
        }
    }

    pub fn ledger(&self) -> Arc<Mutex<ResourceLedger>> {
        Arc::clone(&self.ledger)
    }

    fn serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    fn decode_background(&self, resource: ImageResource, serial: u64) -> Result<Bitmap, ResourceError> {
        match self.background.as_ref() {
            Some(path) => {
                info!("Loading background from {}", path.display());
                let text = fs::read_to_string(path)?;
                let (width, height, pixels) = parse_pbm(&text)?;
                Bitmap::from_pixels(resource, serial, width, height, pixels)
            }
            None => {
                let canvas = draw_spark(DISPLAY_WIDTH, DISPLAY_HEIGHT);
                Bitmap::from_pixels(
                    resource,
                    serial,
                    DISPLAY_WIDTH,
                    DISPLAY_HEIGHT,
                    canvas.as_slice().to_vec(),
                )
            }
        }
    }
}

impl ResourceLoader for BundledResources {
    fn load_font(&mut self, resource: FontResource) -> Result<FontHandle, ResourceError> {
        let font: &'static MonoFont<'static> = match resource {
            FontResource::Sync24 => &FONT_10X20,
            FontResource::Ubuntu12 => &FONT_6X12,
        };
        let serial = self.serial();
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.fonts_loaded += 1;
        ledger.outstanding_fonts.push(serial);
        debug!("font {:?} loaded (#{})", resource, serial);
        Ok(FontHandle::new(resource, font, serial))
    }

    fn unload_font(&mut self, font: FontHandle) {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        if ResourceLedger::release(&mut ledger.outstanding_fonts, font.serial()) {
            ledger.fonts_unloaded += 1;
            debug!("font {:?} unloaded (#{})", font.resource(), font.serial());
        } else {
            ledger.double_releases += 1;
            warn!("font #{} was not loaded", font.serial());
        }
    }

    fn load_bitmap(&mut self, resource: ImageResource) -> Result<Bitmap, ResourceError> {
        let serial = self.serial();
        let bitmap = self.decode_background(resource, serial)?;
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.bitmaps_loaded += 1;
        ledger.outstanding_bitmaps.push(serial);
        debug!("bitmap {:?} {:?} loaded (#{})", resource, bitmap.size(), serial);
        Ok(bitmap)
    }

    fn release_bitmap(&mut self, bitmap: Bitmap) {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        if ResourceLedger::release(&mut ledger.outstanding_bitmaps, bitmap.serial()) {
            ledger.bitmaps_released += 1;
            debug!("bitmap {:?} released (#{})", bitmap.resource(), bitmap.serial());
        } else {
            ledger.double_releases += 1;
            warn!("bitmap #{} was not loaded", bitmap.serial());
        }
    }
}

/// Dark background with a white spark burst just above the middle
fn draw_spark(width: u32, height: u32) -> VarFrameBuf<BinaryColor> {
    let mut canvas = VarFrameBuf::new(width, height, BinaryColor::Off);
    let center = Point::new(width as i32 / 2, height as i32 / 2 - 8);
    let ray = PrimitiveStyle::with_stroke(BinaryColor::On, 3);

    // long rays on the axes, short ones on the diagonals
    let tips = [
        (0, -44), (0, 44), (-44, 0), (44, 0),
        (-24, -24), (24, -24), (-24, 24), (24, 24),
    ];
    for (dx, dy) in tips {
        Line::new(center, center + Point::new(dx, dy))
            .into_styled(ray)
            .draw(&mut canvas)
            .ok();
    }
    Circle::with_center(center, 18)
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(&mut canvas)
        .ok();
    Circle::with_center(center, 8)
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
        .draw(&mut canvas)
        .ok();

    canvas
}

/// Parse a plain (P1) PBM image. `1` is a set (white) pixel, matching
/// what the snapshot driver writes.
pub fn parse_pbm(text: &str) -> Result<(u32, u32, Vec<BinaryColor>), ResourceError> {
    let body: String = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");

    let mut tokens = body.split_whitespace();
    if tokens.next() != Some("P1") {
        return Err(ResourceError::InvalidBitmap("not a plain PBM (P1) file".into()));
    }
    let mut dimension = |name: &str| -> Result<u32, ResourceError> {
        tokens
            .next()
            .and_then(|t| t.parse::<u32>().ok())
            .filter(|&v| v > 0)
            .ok_or_else(|| ResourceError::InvalidBitmap(format!("bad {}", name)))
    };
    let width = dimension("width")?;
    let height = dimension("height")?;

    // nothing larger than the background frame is ever drawn
    let (_, _, max_width, max_height) = BACKGROUND_FRAME;
    if width > max_width || height > max_height {
        return Err(ResourceError::InvalidBitmap(format!(
            "{}x{} exceeds {}x{}",
            width, height, max_width, max_height
        )));
    }
    let count = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| ResourceError::InvalidBitmap("dimensions overflow".into()))?;

    // raster digits may or may not be separated by whitespace
    let pixels: Vec<BinaryColor> = tokens
        .flat_map(|t| t.chars())
        .filter_map(|c| match c {
            '1' => Some(BinaryColor::On),
            '0' => Some(BinaryColor::Off),
            _ => None,
        })
        .take(count)
        .collect();

    if pixels.len() != count {
        return Err(ResourceError::InvalidBitmap(format!(
            "expected {} pixels, found {}",
            count,
            pixels.len()
        )));
    }
    Ok((width, height, pixels))
}
