/*
 *  host/channel.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Companion channel over JSON lines (stdout out, stdin in)
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

use log::{debug, info};
use std::io::Write;

use crate::host::error::ChannelError;
use crate::host::traits::MessageChannel;
use crate::message::Dictionary;

/// Outbound half of the desktop companion link: one JSON array per line.
///
/// The inbound half is `runtime::spawn_companion_reader`, which feeds
/// lines through [`parse_inbox_line`].
pub struct StdioChannel {
    out: Box<dyn Write + Send>,
    inbox_maximum: usize,
    outbox_maximum: usize,
    opened: Option<(usize, usize)>,
}

impl StdioChannel {
    pub fn stdout(inbox_maximum: usize, outbox_maximum: usize) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), inbox_maximum, outbox_maximum)
    }

    pub fn with_writer(out: Box<dyn Write + Send>, inbox_maximum: usize, outbox_maximum: usize) -> Self {
        Self {
            out,
            inbox_maximum,
            outbox_maximum,
            opened: None,
        }
    }

    /// Inbox size chosen at open, if open
    pub fn inbox_size(&self) -> Option<usize> {
        self.opened.map(|(inbox, _)| inbox)
    }
}

impl MessageChannel for StdioChannel {
    fn open(&mut self, inbox_size: usize, outbox_size: usize) {
        let sizes = (inbox_size.min(self.inbox_maximum), outbox_size.min(self.outbox_maximum));
        info!("Companion channel open: inbox {} bytes, outbox {} bytes", sizes.0, sizes.1);
        self.opened = Some(sizes);
    }

    fn inbox_size_maximum(&self) -> usize {
        self.inbox_maximum
    }

    fn outbox_size_maximum(&self) -> usize {
        self.outbox_maximum
    }

    fn send(&mut self, message: &Dictionary) -> Result<(), ChannelError> {
        let (_, outbox) = self.opened.ok_or(ChannelError::NotOpen)?;
        let line = message.to_json()?;
        if line.len() > outbox {
            return Err(ChannelError::MessageTooLarge { size: line.len(), limit: outbox });
        }
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        debug!("sent {}", line);
        Ok(())
    }
}

/// Decode one inbound line, refusing anything larger than the inbox
pub fn parse_inbox_line(line: &str, inbox_size: usize) -> Result<Dictionary, ChannelError> {
    if line.len() > inbox_size {
        return Err(ChannelError::MessageTooLarge { size: line.len(), limit: inbox_size });
    }
    Ok(Dictionary::from_json(line.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Writer that keeps everything in a shared buffer
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_send_requires_open() {
        let mut channel = StdioChannel::with_writer(Box::new(SharedBuf::default()), 64, 64);
        let result = channel.send(&Dictionary::new().with_int(0, 0));
        assert!(matches!(result, Err(ChannelError::NotOpen)));
    }

    #[test]
    fn test_send_writes_json_line() {
        let buf = SharedBuf::default();
        let mut channel = StdioChannel::with_writer(Box::new(buf.clone()), 64, 64);
        channel.open(channel.inbox_size_maximum(), channel.outbox_size_maximum());
        assert_eq!(channel.inbox_size(), Some(64));

        channel.send(&Dictionary::new().with_int(0, 0)).unwrap();
        let written = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "[{\"key\":0,\"value\":0}]\n");
    }

    #[test]
    fn test_open_clamps_to_maximum() {
        let mut channel = StdioChannel::with_writer(Box::new(SharedBuf::default()), 64, 16);
        channel.open(1000, 1000);
        assert_eq!(channel.inbox_size(), Some(64));

        // 21 bytes of JSON do not fit a 16 byte outbox
        let result = channel.send(&Dictionary::new().with_int(0, 0));
        assert!(matches!(result, Err(ChannelError::MessageTooLarge { size: 21, limit: 16 })));
    }

    #[test]
    fn test_parse_inbox_line() {
        let dict = parse_inbox_line("[{\"key\":0,\"value\":72}]\n", 64).unwrap();
        assert_eq!(dict, Dictionary::new().with_int(0, 72));

        assert!(matches!(
            parse_inbox_line("[{\"key\":1,\"value\":\"Cloudy\"}]", 8),
            Err(ChannelError::MessageTooLarge { .. })
        ));
        assert!(matches!(parse_inbox_line("garbage", 64), Err(ChannelError::Encode(_))));
    }
}
