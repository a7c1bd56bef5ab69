/*
 *  host/traits.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Services the watchface borrows from its host platform
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

use chrono::NaiveDateTime;

use crate::clock::ClockStyle;
use crate::host::error::{ChannelError, ResourceError, StorageError};
use crate::host::resources::{Bitmap, FontHandle, FontResource, ImageResource};
use crate::message::Dictionary;

/// Bidirectional key/value channel to the companion app.
///
/// Only the outbound half lives here; inbound batches are delivered to the
/// watchface as events by whoever drives it.
pub trait MessageChannel: Send {
    /// Open the channel with the given inbox/outbox buffer sizes in bytes
    fn open(&mut self, inbox_size: usize, outbox_size: usize);

    /// Largest inbox the host can provide
    fn inbox_size_maximum(&self) -> usize;

    /// Largest outbox the host can provide
    fn outbox_size_maximum(&self) -> usize;

    /// Send one batch. No acknowledgement is expected.
    fn send(&mut self, message: &Dictionary) -> Result<(), ChannelError>;
}

/// Named boolean persistence that survives restarts
pub trait PersistentStorage: Send {
    /// `None` if the key was never written
    fn read_bool(&self, key: u32) -> Option<bool>;

    /// Persist immediately
    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), StorageError>;
}

/// Font and image resolution.
///
/// Every handle handed out must be given back exactly once.
pub trait ResourceLoader: Send {
    fn load_font(&mut self, resource: FontResource) -> Result<FontHandle, ResourceError>;

    fn unload_font(&mut self, font: FontHandle);

    fn load_bitmap(&mut self, resource: ImageResource) -> Result<Bitmap, ResourceError>;

    fn release_bitmap(&mut self, bitmap: Bitmap);
}

/// Local wall clock plus the user's 12/24 hour preference
pub trait ClockSource: Send {
    fn now(&self) -> NaiveDateTime;

    fn style(&self) -> ClockStyle;
}
