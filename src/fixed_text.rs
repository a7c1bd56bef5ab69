/*
 *  fixed_text.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bounded, stack-allocated text buffers for display fields
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

use arrayvec::ArrayString;
use std::fmt;

/// Text buffer holding at most `N` bytes of UTF-8.
///
/// Writes that do not fit are cut at the last whole character and the
/// buffer remembers that it was truncated. A fresh buffer is always the
/// empty string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixedText<const N: usize> {
    buf: ArrayString<N>,
    truncated: bool,
}

impl<const N: usize> FixedText<N> {
    pub const fn new() -> Self {
        Self {
            buf: ArrayString::new_const(),
            truncated: false,
        }
    }

    /// Build from `s`, truncating if needed.
    pub fn from_str_truncated(s: &str) -> Self {
        let mut text = Self::new();
        text.set(s);
        text
    }

    /// Replace the contents with `s`. Returns true if `s` had to be cut.
    pub fn set(&mut self, s: &str) -> bool {
        self.buf.clear();
        self.truncated = push_truncated(&mut self.buf, s);
        self.truncated
    }

    /// Replace the contents with formatted output. Returns true if cut.
    pub fn set_fmt(&mut self, args: fmt::Arguments<'_>) -> bool {
        self.buf.clear();
        let mut writer = Truncating {
            buf: &mut self.buf,
            truncated: false,
        };
        // Truncating never reports an error, it records the overflow instead
        let _ = fmt::Write::write_fmt(&mut writer, args);
        self.truncated = writer.truncated;
        self.truncated
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.truncated = false;
    }

    pub fn as_str(&self) -> &str {
        self.buf.as_str()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Whether the last write was cut short
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

impl<const N: usize> fmt::Debug for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.buf.as_str())?;
        if self.truncated {
            write!(f, " (truncated)")?;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.buf.as_str())
    }
}

impl<const N: usize> AsRef<str> for FixedText<N> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Push as many whole characters of `s` as fit. Returns true if any were dropped.
fn push_truncated<const N: usize>(buf: &mut ArrayString<N>, s: &str) -> bool {
    if buf.try_push_str(s).is_ok() {
        return false;
    }
    for c in s.chars() {
        if buf.try_push(c).is_err() {
            return true;
        }
    }
    false
}

struct Truncating<'a, const N: usize> {
    buf: &'a mut ArrayString<N>,
    truncated: bool,
}

impl<const N: usize> fmt::Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if !self.truncated && push_truncated(self.buf, s) {
            self.truncated = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let text: FixedText<8> = FixedText::new();
        assert!(text.is_empty());
        assert_eq!(text.as_str(), "");
        assert!(!text.was_truncated());
    }

    #[test]
    fn test_set_fits() {
        let mut text: FixedText<8> = FixedText::new();
        assert!(!text.set("72F"));
        assert_eq!(text.as_str(), "72F");
    }

    #[test]
    fn test_set_truncates_and_flags() {
        let mut text: FixedText<5> = FixedText::new();
        assert!(text.set("Thunderstorms"));
        assert_eq!(text.as_str(), "Thund");
        assert!(text.was_truncated());

        // a later write that fits clears the flag
        assert!(!text.set("Rain"));
        assert!(!text.was_truncated());
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let mut text: FixedText<4> = FixedText::new();
        // 'é' is two bytes, only one fits after "abc"
        assert!(text.set("abcé"));
        assert_eq!(text.as_str(), "abc");
    }

    #[test]
    fn test_set_fmt() {
        let mut text: FixedText<7> = FixedText::new();
        assert!(!text.set_fmt(format_args!("{}F", -40)));
        assert_eq!(text.as_str(), "-40F");

        assert!(text.set_fmt(format_args!("{}F", 123456789)));
        assert_eq!(text.as_str(), "1234567");
    }

    #[test]
    fn test_display_and_debug() {
        let text: FixedText<3> = FixedText::from_str_truncated("abcd");
        assert_eq!(text.to_string(), "abc");
        assert_eq!(format!("{:?}", text), "\"abc\" (truncated)");
    }
}
