/*
 *  host/mod.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host platform services and their desktop implementations
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

pub mod traits;
pub mod error;
pub mod channel;
pub mod clock;
pub mod resources;
pub mod storage;
pub mod mock;

pub use traits::{MessageChannel, PersistentStorage, ResourceLoader, ClockSource};
pub use error::{ChannelError, StorageError, ResourceError};
pub use channel::{StdioChannel, parse_inbox_line};
pub use clock::{SystemClock, FixedClock};
pub use resources::{BundledResources, Bitmap, FontHandle, FontResource, ImageResource};
pub use storage::{FileStorage, MemoryStorage, default_storage_path};

use crate::display::BoxedDriver;

/// Everything the watchface needs from the platform it runs on
pub struct Host {
    pub channel: Box<dyn MessageChannel>,
    pub storage: Box<dyn PersistentStorage>,
    pub resources: Box<dyn ResourceLoader>,
    pub clock: Box<dyn ClockSource>,
    pub display: BoxedDriver,
}
