//! All setting definitions with their default values.

/// A single setting definition.
#[derive(Debug, Clone, Copy)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

const fn def(key: &'static str, default: &'static str, description: &'static str) -> SettingDef {
    SettingDef {
        key,
        default,
        description,
    }
}

/// Every recognised setting, in display order.
pub const SETTINGS: &[SettingDef] = &[
    def(
        "PAPERCUT_PALETTE",
        "color-calibration/paper-colors.json",
        "JSON file with the paper color values",
    ),
    def("PAPERCUT_OUT_DIR", "output-ims", "Directory for segmentation images"),
    def(
        "PAPERCUT_PAGES_DIR",
        "output-ims/print-pages",
        "Directory for printable cut sheets",
    ),
    def("PAPERCUT_DPI", "100", "Printer resolution in dots per inch"),
    def("PAPERCUT_CANVAS_HEIGHT_IN", "7.75", "Printable page height in inches"),
    def("PAPERCUT_CANVAS_WIDTH_IN", "10.125", "Printable page width in inches"),
    def(
        "PAPERCUT_TARGET_LENGTH_IN",
        "12",
        "Long edge of the finished piece in inches",
    ),
    def("PAPERCUT_BLUR_SIGMA", "2", "Blur radius; higher means simpler shapes"),
    def("PAPERCUT_WORK_SIZE", "800", "Long edge of the working image in pixels"),
    def("PAPERCUT_FRAME_PX", "2", "Frame fiducial thickness on cut sheets"),
    def("PAPERCUT_TILE_BORDER_PX", "2", "Registration border thickness on pages"),
    def(
        "PAPERCUT_CALIBRATION_BORDER_PX",
        "4",
        "Border thickness of the calibration rectangle",
    ),
    def("PAPERCUT_DEBUG", "false", "Save intermediate images"),
    def("PAPERCUT_MASK_RULE", "exact", "Per-color mask rule: exact or layered"),
    def(
        "PAPERCUT_SHEET_MODE",
        "cut-lines",
        "Sheet content: cut-lines or foreground",
    ),
];

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    SETTINGS.iter().find(|d| d.key == key).map(|d| d.default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_setting;

    #[test]
    fn test_defaults_are_valid() {
        for d in SETTINGS {
            validate_setting(d.key, d.default)
                .unwrap_or_else(|e| panic!("default for {} invalid: {e}", d.key));
        }
    }

    #[test]
    fn test_keys_are_unique() {
        for (i, a) in SETTINGS.iter().enumerate() {
            assert!(SETTINGS[i + 1..].iter().all(|b| b.key != a.key), "{}", a.key);
        }
    }

    #[test]
    fn test_get_default() {
        assert_eq!(get_default("PAPERCUT_DPI"), Some("100"));
        assert_eq!(get_default("NOPE"), None);
    }
}
