/*
 *  message.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Key/value batches exchanged with the companion app
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

use serde::{Deserialize, Serialize};
use std::fmt;

/// Keys understood by the watchface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Temperature = 0,
    Conditions = 1,
    Color = 2,
}

impl MessageKey {
    pub fn from_key(key: u32) -> Option<Self> {
        match key {
            0 => Some(MessageKey::Temperature),
            1 => Some(MessageKey::Conditions),
            2 => Some(MessageKey::Color),
            _ => None,
        }
    }

    pub fn key(self) -> u32 {
        self as u32
    }
}

/// Tag of the outbound refresh trigger, the companion treats any message
/// carrying it as "send me the weather"
pub const REFRESH_REQUEST_KEY: u32 = 0;

/// A single value; the companion sends numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TupleValue {
    Int(i32),
    Text(String),
}

impl fmt::Display for TupleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleValue::Int(v) => write!(f, "{}", v),
            TupleValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuple {
    pub key: u32,
    pub value: TupleValue,
}

impl Tuple {
    pub fn int(key: u32, value: i32) -> Self {
        Self { key, value: TupleValue::Int(value) }
    }

    pub fn text(key: u32, value: impl Into<String>) -> Self {
        Self { key, value: TupleValue::Text(value.into()) }
    }
}

/// Ordered batch of tuples delivered (or sent) as one channel event.
///
/// Order is preserved exactly as received; keys may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    tuples: Vec<Tuple>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_int(mut self, key: u32, value: i32) -> Self {
        self.tuples.push(Tuple::int(key, value));
        self
    }

    pub fn with_text(mut self, key: u32, value: impl Into<String>) -> Self {
        self.tuples.push(Tuple::text(key, value));
        self
    }

    pub fn push(&mut self, tuple: Tuple) {
        self.tuples.push(tuple);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tuple> {
        self.tuples.iter()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// First tuple carrying `key`
    pub fn find(&self, key: u32) -> Option<&Tuple> {
        self.tuples.iter().find(|t| t.key == key)
    }

    /// Encode as a single JSON line (the desktop channel wire form)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

impl From<Vec<Tuple>> for Dictionary {
    fn from(tuples: Vec<Tuple>) -> Self {
        Self { tuples }
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = &'a Tuple;
    type IntoIter = std::slice::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}
