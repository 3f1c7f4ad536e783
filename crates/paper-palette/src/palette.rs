//! Paper palette: named RGB colors ordered by brightness.
//!
//! The JSON format is an object mapping color name to `[r, g, b]`. Object
//! order is kept as written, then the palette is stably sorted by luma so
//! every downstream stage sees papers from darkest to lightest.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use tracing::{debug, warn};

use crate::{PaletteError, Result};

/// Unweighted mean of the three channels, used as the brightness proxy.
pub fn luma(rgb: [u8; 3]) -> f64 {
    (f64::from(rgb[0]) + f64::from(rgb[1]) + f64::from(rgb[2])) / 3.0
}

/// A single paper stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperColor {
    pub name: String,
    pub rgb: [u8; 3],
}

impl PaperColor {
    pub fn new(name: impl Into<String>, rgb: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            rgb,
        }
    }

    pub fn luma(&self) -> f64 {
        luma(self.rgb)
    }
}

/// Ordered, non-empty set of uniquely named paper colors, darkest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<PaperColor>,
}

impl Palette {
    /// Build a palette, rejecting empty or ambiguous input.
    ///
    /// Colors that are not already in ascending luma order are re-sorted
    /// (stable, so equal-luma papers keep their relative order).
    pub fn new(colors: Vec<PaperColor>) -> Result<Self> {
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }

        {
            let mut seen = HashSet::with_capacity(colors.len());
            for color in &colors {
                if !seen.insert(color.name.as_str()) {
                    return Err(PaletteError::DuplicateName(color.name.clone()));
                }
            }
        }

        let mut colors = colors;
        let sorted = colors.windows(2).all(|w| w[0].luma() <= w[1].luma());
        if !sorted {
            warn!(
                given = ?colors.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                "Palette is not ordered by brightness, sorting by luma"
            );
            colors.sort_by(|a, b| a.luma().total_cmp(&b.luma()));
        }

        debug!(count = colors.len(), "Palette ready");
        Ok(Self { colors })
    }

    /// Parse a palette from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawPalette = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Parse a palette from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RawPalette = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    /// Load a palette JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PaletteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_raw(raw: RawPalette) -> Result<Self> {
        let colors = raw
            .0
            .into_iter()
            .map(|(name, channels)| {
                if channels.len() != 3 {
                    return Err(PaletteError::ChannelCount {
                        name,
                        count: channels.len(),
                    });
                }
                let mut rgb = [0u8; 3];
                for (slot, &value) in rgb.iter_mut().zip(&channels) {
                    *slot = u8::try_from(value).map_err(|_| PaletteError::ChannelOutOfRange {
                        name: name.clone(),
                        value,
                    })?;
                }
                Ok(PaperColor { name, rgb })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(colors)
    }

    /// Colors in canonical (ascending luma) order.
    pub fn colors(&self) -> &[PaperColor] {
        &self.colors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaperColor> {
        self.colors.iter()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Look up a color by name.
    pub fn get(&self, name: &str) -> Option<&PaperColor> {
        self.colors.iter().find(|c| c.name == name)
    }

    /// Index of a color in canonical order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.colors.iter().position(|c| c.name == name)
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaperColor;
    type IntoIter = std::slice::Iter<'a, PaperColor>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}

/// Palette entries exactly as written, duplicates and all.
struct RawPalette(Vec<(String, Vec<i64>)>);

impl<'de> Deserialize<'de> for RawPalette {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawPaletteVisitor;

        impl<'de> Visitor<'de> for RawPaletteVisitor {
            type Value = RawPalette;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping color names to [r, g, b] arrays")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, channels)) = map.next_entry::<String, Vec<i64>>()? {
                    entries.push((name, channels));
                }
                Ok(RawPalette(entries))
            }
        }

        deserializer.deserialize_map(RawPaletteVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(palette: &Palette) -> Vec<&str> {
        palette.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_luma_is_unweighted_mean() {
        assert_eq!(luma([0, 0, 0]), 0.0);
        assert_eq!(luma([255, 255, 255]), 255.0);
        assert!((luma([10, 20, 31]) - 61.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_json_keeps_sorted_order() {
        let palette =
            Palette::from_json_str(r#"{"black":[0,0,0],"gray":[128,128,128],"white":[250,250,250]}"#)
                .unwrap();
        assert_eq!(names(&palette), ["black", "gray", "white"]);
        assert_eq!(palette.get("gray").unwrap().rgb, [128, 128, 128]);
    }

    #[test]
    fn test_unsorted_palette_is_sorted_by_luma() {
        let palette =
            Palette::from_json_str(r#"{"A":[250,250,250],"B":[128,128,128],"C":[0,0,0]}"#).unwrap();
        assert_eq!(names(&palette), ["C", "B", "A"]);
        assert_eq!(palette.position("A"), Some(2));
    }

    #[test]
    fn test_equal_luma_keeps_input_order() {
        let palette = Palette::new(vec![
            PaperColor::new("light", [200, 200, 200]),
            PaperColor::new("red", [90, 0, 0]),
            PaperColor::new("blue", [0, 0, 90]),
        ])
        .unwrap();
        assert_eq!(names(&palette), ["red", "blue", "light"]);
    }

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(Palette::from_json_str("{}"), Err(PaletteError::Empty)));
        assert!(matches!(Palette::new(Vec::new()), Err(PaletteError::Empty)));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = Palette::from_json_str(r#"{"a":[0,0,0],"b":[9,9,9],"a":[5,5,5]}"#).unwrap_err();
        assert!(matches!(err, PaletteError::DuplicateName(ref n) if n == "a"));
    }

    #[test]
    fn test_out_of_range_channel_rejected() {
        let err = Palette::from_json_str(r#"{"a":[0,256,0]}"#).unwrap_err();
        assert!(matches!(err, PaletteError::ChannelOutOfRange { value: 256, .. }));

        let err = Palette::from_json_str(r#"{"a":[-1,0,0]}"#).unwrap_err();
        assert!(matches!(err, PaletteError::ChannelOutOfRange { value: -1, .. }));
    }

    #[test]
    fn test_wrong_channel_count_rejected() {
        let err = Palette::from_json_str(r#"{"a":[0,0]}"#).unwrap_err();
        assert!(matches!(err, PaletteError::ChannelCount { count: 2, .. }));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        assert!(matches!(
            Palette::from_json_str(r#"["not", "an", "object"]"#),
            Err(PaletteError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Palette::load(Path::new("/nonexistent/paper-colors.json")).unwrap_err();
        assert!(matches!(err, PaletteError::Io { .. }));
    }
}
