//! Runtime configuration loaded from defaults + environment overrides.

use std::path::PathBuf;

use cutline_engine::{BoundaryOptions, MaskRule, PreprocessOptions, PrintSettings, SheetMode};

use super::defaults::get_default;
use super::validation::{parse_mask_rule, parse_sheet_mode, validate_setting};
use crate::error::PipelineError;

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub palette_path: PathBuf,
    pub out_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub dpi: u32,
    pub canvas_height_in: f64,
    pub canvas_width_in: f64,
    pub target_length_in: f64,
    pub blur_sigma: f32,
    pub work_size: u32,
    pub frame_px: u32,
    pub tile_border_px: u32,
    pub calibration_border_px: u32,
    pub debug_output: bool,
    pub mask_rule: MaskRule,
    pub sheet_mode: SheetMode,
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub palette_path: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub pages_dir: Option<PathBuf>,
    pub dpi: Option<u32>,
    pub target_length_in: Option<f64>,
    pub blur_sigma: Option<f32>,
    pub debug_output: Option<bool>,
    pub mask_rule: Option<MaskRule>,
    pub sheet_mode: Option<SheetMode>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, PipelineError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration, reading each key through `lookup` and falling
    /// back to the defaults table.
    pub fn load_from<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> Result<String, PipelineError> {
            let value = match lookup(key) {
                Some(v) => v.trim().to_string(),
                None => get_default(key)
                    .ok_or_else(|| PipelineError::Configuration(format!("no default for {key}")))?
                    .to_string(),
            };
            validate_setting(key, &value)
                .map_err(|reason| PipelineError::Configuration(format!("{key}: {reason}")))?;
            Ok(value)
        };

        Ok(Self {
            palette_path: PathBuf::from(g("PAPERCUT_PALETTE")?),
            out_dir: PathBuf::from(g("PAPERCUT_OUT_DIR")?),
            pages_dir: PathBuf::from(g("PAPERCUT_PAGES_DIR")?),
            dpi: parse(&g("PAPERCUT_DPI")?, "PAPERCUT_DPI")?,
            canvas_height_in: parse(&g("PAPERCUT_CANVAS_HEIGHT_IN")?, "PAPERCUT_CANVAS_HEIGHT_IN")?,
            canvas_width_in: parse(&g("PAPERCUT_CANVAS_WIDTH_IN")?, "PAPERCUT_CANVAS_WIDTH_IN")?,
            target_length_in: parse(&g("PAPERCUT_TARGET_LENGTH_IN")?, "PAPERCUT_TARGET_LENGTH_IN")?,
            blur_sigma: parse(&g("PAPERCUT_BLUR_SIGMA")?, "PAPERCUT_BLUR_SIGMA")?,
            work_size: parse(&g("PAPERCUT_WORK_SIZE")?, "PAPERCUT_WORK_SIZE")?,
            frame_px: parse(&g("PAPERCUT_FRAME_PX")?, "PAPERCUT_FRAME_PX")?,
            tile_border_px: parse(&g("PAPERCUT_TILE_BORDER_PX")?, "PAPERCUT_TILE_BORDER_PX")?,
            calibration_border_px: parse(
                &g("PAPERCUT_CALIBRATION_BORDER_PX")?,
                "PAPERCUT_CALIBRATION_BORDER_PX",
            )?,
            debug_output: g("PAPERCUT_DEBUG")? == "true",
            mask_rule: parse_mask_rule(&g("PAPERCUT_MASK_RULE")?)
                .map_err(PipelineError::Configuration)?,
            sheet_mode: parse_sheet_mode(&g("PAPERCUT_SHEET_MODE")?)
                .map_err(PipelineError::Configuration)?,
        })
    }

    /// Apply command-line overrides.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(v) = overrides.palette_path {
            self.palette_path = v;
        }
        if let Some(v) = overrides.out_dir {
            self.out_dir = v;
        }
        if let Some(v) = overrides.pages_dir {
            self.pages_dir = v;
        }
        if let Some(v) = overrides.dpi {
            self.dpi = v;
        }
        if let Some(v) = overrides.target_length_in {
            self.target_length_in = v;
        }
        if let Some(v) = overrides.blur_sigma {
            self.blur_sigma = v;
        }
        if let Some(v) = overrides.debug_output {
            self.debug_output = v;
        }
        if let Some(v) = overrides.mask_rule {
            self.mask_rule = v;
        }
        if let Some(v) = overrides.sheet_mode {
            self.sheet_mode = v;
        }
    }

    /// Check the combined settings before any work starts.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let to_config = |e: cutline_engine::EngineError| PipelineError::Configuration(e.to_string());
        self.print_settings().validate().map_err(to_config)?;
        self.preprocess_options().validate().map_err(to_config)?;
        Ok(())
    }

    pub fn print_settings(&self) -> PrintSettings {
        PrintSettings::new()
            .with_dpi(self.dpi)
            .with_canvas(self.canvas_height_in, self.canvas_width_in)
            .with_target_length(self.target_length_in)
            .with_frame_thickness(self.frame_px)
            .with_tile_border(self.tile_border_px)
    }

    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions::new()
            .with_long_edge(self.work_size)
            .with_sigma(self.blur_sigma)
    }

    pub fn boundary_options(&self) -> BoundaryOptions {
        BoundaryOptions::new().with_frame_thickness(self.frame_px)
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, PipelineError> {
    value
        .parse()
        .map_err(|_| PipelineError::Configuration(format!("{key}: cannot parse '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Result<AppConfig, PipelineError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::load_from(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(
            config.palette_path,
            PathBuf::from("color-calibration/paper-colors.json")
        );
        assert_eq!(config.pages_dir, PathBuf::from("output-ims/print-pages"));
        assert_eq!(config.dpi, 100);
        assert_eq!(config.target_length_in, 12.0);
        assert_eq!(config.blur_sigma, 2.0);
        assert_eq!(config.work_size, 800);
        assert!(!config.debug_output);
        assert_eq!(config.mask_rule, MaskRule::Exact);
        assert_eq!(config.sheet_mode, SheetMode::CutLines);
        assert_eq!(config.print_settings(), PrintSettings::default());
        assert_eq!(config.preprocess_options(), PreprocessOptions::default());
    }

    #[test]
    fn test_environment_values_are_used() {
        let config = from_map(&[
            ("PAPERCUT_DPI", "300"),
            ("PAPERCUT_BLUR_SIGMA", " 3.5 "),
            ("PAPERCUT_MASK_RULE", "layered"),
            ("PAPERCUT_DEBUG", "true"),
        ])
        .unwrap();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.blur_sigma, 3.5);
        assert_eq!(config.mask_rule, MaskRule::Layered);
        assert!(config.debug_output);
    }

    #[test]
    fn test_invalid_value_is_configuration_error() {
        let err = from_map(&[("PAPERCUT_DPI", "zero")]).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(ref m) if m.contains("PAPERCUT_DPI")));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = from_map(&[("PAPERCUT_DPI", "300")]).unwrap();
        config.apply(ConfigOverrides {
            dpi: Some(150),
            sheet_mode: Some(SheetMode::Foreground),
            ..Default::default()
        });
        assert_eq!(config.dpi, 150);
        assert_eq!(config.sheet_mode, SheetMode::Foreground);
        assert_eq!(config.print_settings().dpi, 150);
    }

    #[test]
    fn test_validate_rejects_overridden_nonsense() {
        let mut config = from_map(&[]).unwrap();
        config.apply(ConfigOverrides {
            target_length_in: Some(-1.0),
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(PipelineError::Configuration(_))));
    }
}
