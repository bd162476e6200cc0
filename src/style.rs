//! Style maps and best-match resolution.
//!
//! A [`StyleMap`] associates category paths (outermost to innermost, possibly
//! partial) with a style value. Lookup for a category tuple goes:
//!
//! 1. a key equal to the whole tuple,
//! 2. a key equal to the leaf category alone,
//! 3. the longest key equal to a contiguous run of the tuple,
//!    ties going to the key inserted first.
//!
//! Insertion order is therefore part of the contract. Maps deserialized from
//! JSON keep document order.

use std::fmt;
use std::marker::PhantomData;

use plotters::style::RGBColor;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::error::{BarplotError, BarplotResult};
use crate::parser::parse_style_key;

/// Insertion-ordered mapping from category path to style value
#[derive(Debug, Clone, PartialEq)]
pub struct StyleMap<V> {
    entries: Vec<(Vec<String>, V)>,
}

impl<V> Default for StyleMap<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V> StyleMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `path`. Replacing keeps the original slot.
    pub fn insert<I, S>(&mut self, path: I, value: V)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path: Vec<String> = path.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(k, _)| *k == path) {
            Some((_, v)) => *v = value,
            None => self.entries.push((path, value)),
        }
    }

    /// Builder-style insert
    pub fn with<I, S>(mut self, path: I, value: V) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(path, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[String], &V)> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v))
    }

    fn get_exact(&self, path: &[String]) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_slice() == path)
            .map(|(_, v)| v)
    }
}

/// Resolve the style value for a category tuple.
///
/// `category` usually starts with the top-level index name followed by the
/// row's index values.
pub fn resolve<'a, V>(map: &'a StyleMap<V>, category: &[String]) -> BarplotResult<&'a V> {
    if let Some(v) = map.get_exact(category) {
        return Ok(v);
    }
    if let Some(leaf) = category.last() {
        if let Some(v) = map.get_exact(std::slice::from_ref(leaf)) {
            return Ok(v);
        }
    }

    let mut best: Option<(usize, &V)> = None;
    for (key, value) in &map.entries {
        if key.is_empty() || key.len() > category.len() {
            continue;
        }
        let matches = category.windows(key.len()).any(|w| w == key.as_slice());
        // strict comparison keeps the first inserted key on ties
        if matches && best.map_or(true, |(len, _)| key.len() > len) {
            best = Some((key.len(), value));
        }
    }

    best.map(|(_, v)| v).ok_or_else(|| BarplotError::NoStyleMatch {
        path: category.to_vec(),
    })
}

/// Like [`resolve`], but an empty map yields `fallback` instead of an error
pub fn resolve_or<V: Clone>(map: &StyleMap<V>, category: &[String], fallback: V) -> BarplotResult<V> {
    if map.is_empty() {
        return Ok(fallback);
    }
    resolve(map, category).cloned()
}

struct StyleMapVisitor<V> {
    marker: PhantomData<V>,
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for StyleMapVisitor<V> {
    type Value = StyleMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map from category paths to style values")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut map = StyleMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            let path = parse_style_key(&key).map_err(serde::de::Error::custom)?;
            map.insert(path, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for StyleMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StyleMapVisitor {
            marker: PhantomData,
        })
    }
}

// === Color Parsing ===

/// Parse a color string into RGBColor, supporting hex (#RRGGBB, #RGB) and named colors
pub fn parse_color(color_str: &str) -> BarplotResult<RGBColor> {
    let trimmed = color_str.trim();

    let parsed = if trimmed.starts_with('#') {
        parse_hex_color(trimmed)
    } else {
        named_color(&trimmed.to_lowercase())
    };
    parsed.ok_or_else(|| BarplotError::UnknownColor(color_str.to_string()))
}

fn named_color(name: &str) -> Option<RGBColor> {
    match name {
        "white" => Some(RGBColor(255, 255, 255)),
        "black" => Some(RGBColor(0, 0, 0)),
        "red" => Some(RGBColor(255, 0, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "yellow" => Some(RGBColor(255, 255, 0)),
        "cyan" => Some(RGBColor(0, 255, 255)),
        "magenta" => Some(RGBColor(255, 0, 255)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "purple" => Some(RGBColor(128, 0, 128)),
        "pink" => Some(RGBColor(255, 192, 203)),
        "brown" => Some(RGBColor(139, 69, 19)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        "darkgray" | "darkgrey" => Some(RGBColor(64, 64, 64)),
        "lightgray" | "lightgrey" => Some(RGBColor(192, 192, 192)),
        // matplotlib tableau names
        "tab:blue" => Some(RGBColor(31, 119, 180)),
        "tab:orange" => Some(RGBColor(255, 127, 14)),
        "tab:green" => Some(RGBColor(44, 160, 44)),
        "tab:red" => Some(RGBColor(214, 39, 40)),
        "tab:purple" => Some(RGBColor(148, 103, 189)),
        "tab:brown" => Some(RGBColor(140, 86, 75)),
        "tab:pink" => Some(RGBColor(227, 119, 194)),
        "tab:gray" | "tab:grey" => Some(RGBColor(127, 127, 127)),
        "tab:olive" => Some(RGBColor(188, 189, 34)),
        "tab:cyan" => Some(RGBColor(23, 190, 207)),
        _ => None,
    }
}

/// Parse hex color (#RRGGBB or #RGB)
fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}

/// Default bar colors, cycled by leaf category
pub const PALETTE: [&str; 10] = [
    "tab:blue",
    "tab:orange",
    "tab:green",
    "tab:red",
    "tab:purple",
    "tab:brown",
    "tab:pink",
    "tab:gray",
    "tab:olive",
    "tab:cyan",
];
