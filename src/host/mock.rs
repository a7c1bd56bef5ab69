/*
 *  host/mock.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Recording message channel for tests and headless runs
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

use std::sync::{Arc, Mutex, PoisonError};

use crate::constants::{APP_MESSAGE_INBOX_SIZE_MAXIMUM, APP_MESSAGE_OUTBOX_SIZE_MAXIMUM};
use crate::host::error::ChannelError;
use crate::host::traits::MessageChannel;
use crate::message::Dictionary;

/// Message channel that keeps every sent batch.
///
/// The state is shared so it can be inspected after the channel has been
/// boxed into a host.
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    state: Arc<Mutex<RecordingChannelState>>,
}

#[derive(Debug, Default)]
pub struct RecordingChannelState {
    /// Sizes passed to the last open()
    pub opened: Option<(usize, usize)>,

    /// Every batch sent, oldest first
    pub sent: Vec<Dictionary>,

    /// Make send() fail (for error testing)
    pub simulate_send_failure: bool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<Mutex<RecordingChannelState>> {
        Arc::clone(&self.state)
    }
}

impl MessageChannel for RecordingChannel {
    fn open(&mut self, inbox_size: usize, outbox_size: usize) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.opened = Some((inbox_size, outbox_size));
    }

    fn inbox_size_maximum(&self) -> usize {
        APP_MESSAGE_INBOX_SIZE_MAXIMUM
    }

    fn outbox_size_maximum(&self) -> usize {
        APP_MESSAGE_OUTBOX_SIZE_MAXIMUM
    }

    fn send(&mut self, message: &Dictionary) -> Result<(), ChannelError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.opened.is_none() {
            return Err(ChannelError::NotOpen);
        }
        if state.simulate_send_failure {
            return Err(ChannelError::Other("Simulated send failure".to_string()));
        }
        state.sent.push(message.clone());
        Ok(())
    }
}
