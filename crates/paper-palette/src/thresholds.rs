//! Grayscale decision intervals derived from a palette.
//!
//! Each paper owns the half-open interval `[lo, hi)` of gray values closest
//! to its luma. Bounds between neighbours sit at the midpoint of their lumas,
//! the outer bounds are `0` and the maximum gray value, and the last interval
//! is closed so the maximum itself is mapped.

use tracing::debug;

use crate::{MAX_GRAY, Palette, PaletteError, Result};

/// A contiguous range of gray values assigned to one paper color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayInterval {
    pub lo: f64,
    pub hi: f64,
    /// Whether `hi` itself belongs to the interval (last entry only).
    pub closed: bool,
}

impl GrayInterval {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && (value < self.hi || (self.closed && value == self.hi))
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

/// Per-color gray intervals, in canonical palette order.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    names: Vec<String>,
    intervals: Vec<GrayInterval>,
    max_gray: f64,
}

impl ThresholdTable {
    /// Thresholds over the full 8-bit gray range.
    pub fn from_palette(palette: &Palette) -> Self {
        Self::build(palette, MAX_GRAY)
    }

    /// Thresholds over `[0, max_gray]`.
    ///
    /// `max_gray` must be finite and at least the luma of the lightest paper.
    pub fn with_max_gray(palette: &Palette, max_gray: f64) -> Result<Self> {
        let lightest = palette.colors().last().map_or(0.0, |c| c.luma());
        if !max_gray.is_finite() || max_gray <= 0.0 || max_gray < lightest {
            return Err(PaletteError::InvalidMaxGray(max_gray));
        }
        Ok(Self::build(palette, max_gray))
    }

    fn build(palette: &Palette, max_gray: f64) -> Self {
        let lumas: Vec<f64> = palette.iter().map(|c| c.luma()).collect();

        let mut bounds = Vec::with_capacity(lumas.len() + 1);
        bounds.push(0.0);
        bounds.extend(lumas.windows(2).map(|w| (w[0] + w[1]) / 2.0));
        bounds.push(max_gray);

        let last = lumas.len() - 1;
        let intervals: Vec<GrayInterval> = bounds
            .windows(2)
            .enumerate()
            .map(|(i, w)| GrayInterval {
                lo: w[0],
                hi: w[1],
                closed: i == last,
            })
            .collect();

        let names: Vec<String> = palette.iter().map(|c| c.name.clone()).collect();
        for (name, iv) in names.iter().zip(&intervals) {
            debug!(color = %name, lo = iv.lo, hi = iv.hi, width = iv.width(), "Gray interval");
        }

        Self {
            names,
            intervals,
            max_gray,
        }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn max_gray(&self) -> f64 {
        self.max_gray
    }

    pub fn intervals(&self) -> &[GrayInterval] {
        &self.intervals
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Interval of the named color.
    pub fn get(&self, name: &str) -> Option<GrayInterval> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.intervals[i])
    }

    /// `(name, interval)` pairs in palette order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, GrayInterval)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.intervals.iter().copied())
    }

    /// Index of the color whose interval contains `gray`.
    pub fn lookup(&self, gray: f64) -> Option<usize> {
        self.intervals.iter().position(|iv| iv.contains(gray))
    }

    /// Palette index for every 8-bit gray value.
    ///
    /// Fails if any value in `0..=255` is left unmapped, which can only happen
    /// when the table is not contiguous.
    pub fn index_lut(&self) -> Result<[usize; 256]> {
        let mut lut = [0usize; 256];
        for (gray, slot) in lut.iter_mut().enumerate() {
            let value = (gray as f64).min(self.max_gray);
            *slot = self.lookup(value).ok_or_else(|| {
                PaletteError::ThresholdInvariant(format!("gray value {gray} is not covered"))
            })?;
        }
        Ok(lut)
    }

    /// Check that the intervals are ordered, contiguous and cover
    /// `[0, max_gray]` exactly once.
    pub fn verify(&self) -> Result<()> {
        let (Some(first), Some(last)) = (self.intervals.first(), self.intervals.last()) else {
            return Err(PaletteError::ThresholdInvariant("table is empty".into()));
        };
        if first.lo != 0.0 {
            return Err(PaletteError::ThresholdInvariant(format!(
                "first interval starts at {} instead of 0",
                first.lo
            )));
        }
        if last.hi != self.max_gray || !last.closed {
            return Err(PaletteError::ThresholdInvariant(format!(
                "last interval must be closed at {}",
                self.max_gray
            )));
        }
        for (i, iv) in self.intervals.iter().enumerate() {
            if iv.lo > iv.hi {
                return Err(PaletteError::ThresholdInvariant(format!(
                    "interval {i} is inverted: [{}, {})",
                    iv.lo, iv.hi
                )));
            }
        }
        for (i, pair) in self.intervals.windows(2).enumerate() {
            if pair[0].hi != pair[1].lo {
                return Err(PaletteError::ThresholdInvariant(format!(
                    "gap or overlap between intervals {i} and {}",
                    i + 1
                )));
            }
            if pair[0].closed {
                return Err(PaletteError::ThresholdInvariant(format!(
                    "interval {i} is closed but not last"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaperColor;

    fn gray_palette(levels: &[u8]) -> Palette {
        Palette::new(
            levels
                .iter()
                .enumerate()
                .map(|(i, &v)| PaperColor::new(format!("p{i}"), [v, v, v]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_three_color_scenario() {
        let palette =
            Palette::from_json_str(r#"{"A":[250,250,250],"B":[128,128,128],"C":[0,0,0]}"#).unwrap();
        let table = ThresholdTable::from_palette(&palette);

        assert_eq!(table.names(), ["C", "B", "A"]);
        let c = table.get("C").unwrap();
        let b = table.get("B").unwrap();
        let a = table.get("A").unwrap();
        assert_eq!((c.lo, c.hi, c.closed), (0.0, 64.0, false));
        assert_eq!((b.lo, b.hi, b.closed), (64.0, 189.0, false));
        assert_eq!((a.lo, a.hi, a.closed), (189.0, 255.0, true));
    }

    #[test]
    fn test_intervals_contiguous_and_covering() {
        for levels in [&[0u8][..], &[30, 90], &[0, 1, 2, 3], &[12, 80, 81, 200, 255]] {
            let table = ThresholdTable::from_palette(&gray_palette(levels));
            assert_eq!(table.len(), levels.len());
            assert_eq!(table.intervals()[0].lo, 0.0);
            assert_eq!(table.intervals().last().unwrap().hi, 255.0);
            for pair in table.intervals().windows(2) {
                assert_eq!(pair[0].hi, pair[1].lo);
            }
            table.verify().unwrap();
        }
    }

    #[test]
    fn test_every_gray_value_maps_to_exactly_one_color() {
        let table = ThresholdTable::from_palette(&gray_palette(&[10, 70, 71, 190]));
        for gray in 0..=255u32 {
            let hits = table
                .intervals()
                .iter()
                .filter(|iv| iv.contains(f64::from(gray)))
                .count();
            assert_eq!(hits, 1, "gray {gray} matched {hits} intervals");
        }
    }

    #[test]
    fn test_lookup_boundaries() {
        let table = ThresholdTable::from_palette(&gray_palette(&[0, 128, 250]));
        assert_eq!(table.lookup(0.0), Some(0));
        assert_eq!(table.lookup(63.9), Some(0));
        assert_eq!(table.lookup(64.0), Some(1));
        assert_eq!(table.lookup(188.0), Some(1));
        assert_eq!(table.lookup(189.0), Some(2));
        assert_eq!(table.lookup(255.0), Some(2));
        assert_eq!(table.lookup(255.5), None);
    }

    #[test]
    fn test_index_lut_matches_lookup() {
        let table = ThresholdTable::from_palette(&gray_palette(&[20, 100, 101, 240]));
        let lut = table.index_lut().unwrap();
        for gray in 0..=255usize {
            assert_eq!(Some(lut[gray]), table.lookup(gray as f64));
        }
        assert_eq!(lut[255], 3);
    }

    #[test]
    fn test_single_color_covers_everything() {
        let table = ThresholdTable::from_palette(&gray_palette(&[77]));
        let iv = table.intervals()[0];
        assert_eq!((iv.lo, iv.hi, iv.closed), (0.0, 255.0, true));
        assert!(table.index_lut().unwrap().iter().all(|&i| i == 0));
    }

    #[test]
    fn test_custom_max_gray() {
        let palette = gray_palette(&[0, 100]);
        let table = ThresholdTable::with_max_gray(&palette, 200.0).unwrap();
        assert_eq!(table.intervals()[1].hi, 200.0);
        table.verify().unwrap();

        assert!(matches!(
            ThresholdTable::with_max_gray(&palette, 50.0),
            Err(PaletteError::InvalidMaxGray(_))
        ));
        assert!(ThresholdTable::with_max_gray(&palette, f64::NAN).is_err());
    }

    #[test]
    fn test_verify_detects_gap() {
        let mut table = ThresholdTable::from_palette(&gray_palette(&[0, 128, 250]));
        table.intervals[1].hi = 150.0;
        let err = table.verify().unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_verify_detects_open_last_interval() {
        let mut table = ThresholdTable::from_palette(&gray_palette(&[0, 250]));
        table.intervals[1].closed = false;
        assert!(table.verify().is_err());
        assert!(table.index_lut().is_err());
    }
}
