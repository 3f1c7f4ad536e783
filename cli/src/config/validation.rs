//! Setting value validation.

use cutline_engine::{MaskRule, SheetMode};

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "PAPERCUT_PALETTE" | "PAPERCUT_OUT_DIR" | "PAPERCUT_PAGES_DIR" => {
            if value.trim().is_empty() {
                return Err("path must not be empty".into());
            }
        }
        "PAPERCUT_DPI" | "PAPERCUT_WORK_SIZE" => validate_positive_int(value)?,
        "PAPERCUT_CANVAS_HEIGHT_IN"
        | "PAPERCUT_CANVAS_WIDTH_IN"
        | "PAPERCUT_TARGET_LENGTH_IN"
        | "PAPERCUT_BLUR_SIGMA" => validate_positive_float(value)?,
        "PAPERCUT_FRAME_PX" | "PAPERCUT_TILE_BORDER_PX" | "PAPERCUT_CALIBRATION_BORDER_PX" => {
            validate_int_range(value, 0, 100)?
        }
        "PAPERCUT_DEBUG" => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        "PAPERCUT_MASK_RULE" => {
            parse_mask_rule(value)?;
        }
        "PAPERCUT_SHEET_MODE" => {
            parse_sheet_mode(value)?;
        }
        _ => return Err(format!("unknown setting key: {key}")),
    }
    Ok(())
}

/// Parse a mask rule name.
pub fn parse_mask_rule(value: &str) -> Result<MaskRule, String> {
    match value {
        "exact" => Ok(MaskRule::Exact),
        "layered" => Ok(MaskRule::Layered),
        _ => Err("must be 'exact' or 'layered'".into()),
    }
}

/// Parse a sheet mode name.
pub fn parse_sheet_mode(value: &str) -> Result<SheetMode, String> {
    match value {
        "cut-lines" => Ok(SheetMode::CutLines),
        "foreground" => Ok(SheetMode::Foreground),
        _ => Err("must be 'cut-lines' or 'foreground'".into()),
    }
}

fn validate_positive_int(value: &str) -> Result<(), String> {
    let v: u32 = value.parse().map_err(|_| "must be a positive integer")?;
    if v == 0 {
        return Err("must be greater than 0".into());
    }
    Ok(())
}

fn validate_positive_float(value: &str) -> Result<(), String> {
    let v: f64 = value.parse().map_err(|_| "must be a number")?;
    if !v.is_finite() || v <= 0.0 {
        return Err("must be greater than 0".into());
    }
    Ok(())
}

fn validate_int_range(value: &str, min: u32, max: u32) -> Result<(), String> {
    let v: u32 = value.parse().map_err(|_| "must be an integer")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_numbers() {
        assert!(validate_setting("PAPERCUT_DPI", "300").is_ok());
        assert!(validate_setting("PAPERCUT_DPI", "0").is_err());
        assert!(validate_setting("PAPERCUT_DPI", "-5").is_err());
        assert!(validate_setting("PAPERCUT_BLUR_SIGMA", "0.5").is_ok());
        assert!(validate_setting("PAPERCUT_BLUR_SIGMA", "0").is_err());
        assert!(validate_setting("PAPERCUT_TARGET_LENGTH_IN", "-12").is_err());
        assert!(validate_setting("PAPERCUT_CANVAS_WIDTH_IN", "inf").is_err());
    }

    #[test]
    fn test_thickness_range() {
        assert!(validate_setting("PAPERCUT_FRAME_PX", "0").is_ok());
        assert!(validate_setting("PAPERCUT_FRAME_PX", "101").is_err());
        assert!(validate_setting("PAPERCUT_TILE_BORDER_PX", "two").is_err());
    }

    #[test]
    fn test_modes() {
        assert_eq!(parse_mask_rule("layered"), Ok(MaskRule::Layered));
        assert!(parse_mask_rule("fuzzy").is_err());
        assert_eq!(parse_sheet_mode("foreground"), Ok(SheetMode::Foreground));
        assert!(validate_setting("PAPERCUT_SHEET_MODE", "outline").is_err());
    }

    #[test]
    fn test_unknown_key() {
        assert!(validate_setting("PAPERCUT_COLOR", "red").is_err());
    }
}
