//! Photo to segmentation image, one photo or a fail-soft batch.

use std::path::{Path, PathBuf};

use cutline_engine::{EngineError, ensure_dir, load_rgb, preprocess, save_image, segment};
use tracing::{info, warn};

use super::{PaletteSetup, file_stem};
use crate::config::AppConfig;
use crate::error::PipelineError;

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Segmentation images written, in input order.
    pub written: Vec<PathBuf>,
    /// Inputs that were skipped and why.
    pub failed: Vec<(PathBuf, PipelineError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Segment one photo and write `<stem>.png` into the output directory.
pub fn segment_photo(
    input: &Path,
    setup: &PaletteSetup,
    config: &AppConfig,
) -> Result<PathBuf, PipelineError> {
    let engine_err = |e: EngineError| PipelineError::from_engine(e, input);
    let stem = file_stem(input)?;

    let photo = load_rgb(input).map_err(engine_err)?;
    let pre = preprocess(&photo, &config.preprocess_options()).map_err(engine_err)?;

    if config.debug_output {
        save_image(&pre.rescaled, &config.out_dir.join(format!("{stem}_rescaled.jpg")))
            .map_err(engine_err)?;
        save_image(&pre.gray, &config.out_dir.join(format!("{stem}_gray.jpg")))
            .map_err(engine_err)?;
        save_image(&pre.blurred, &config.out_dir.join(format!("{stem}_blurred.jpg")))
            .map_err(engine_err)?;
    }

    let seg = segment(&pre.blurred, &setup.table, &setup.palette).map_err(engine_err)?;

    // PNG keeps the palette colors exact; JPEG would not
    let dest = config.out_dir.join(format!("{stem}.png"));
    save_image(&seg.image, &dest).map_err(engine_err)?;
    info!(input = %input.display(), output = %dest.display(), "Segmentation written");
    Ok(dest)
}

/// Segment every input, continuing past per-photo failures.
///
/// Returns `Err` only when nothing can run (bad palette or output
/// directory) or when an invariant violation makes further work pointless.
pub fn run_segment_batch(
    inputs: &[PathBuf],
    config: &AppConfig,
) -> Result<BatchReport, PipelineError> {
    config.validate()?;
    let setup = PaletteSetup::load(&config.palette_path)?;
    ensure_dir(&config.out_dir).map_err(|e| PipelineError::from_engine(e, &config.out_dir))?;

    let mut report = BatchReport::default();
    for (i, input) in inputs.iter().enumerate() {
        info!(index = i + 1, total = inputs.len(), input = %input.display(), "Processing photo");
        match segment_photo(input, &setup, config) {
            Ok(dest) => report.written.push(dest),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(input = %input.display(), error = %e, "Skipping photo");
                report.failed.push((input.clone(), e));
            }
        }
    }

    info!(
        written = report.written.len(),
        failed = report.failed.len(),
        "Batch complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{config, photo};
    use std::collections::HashSet;

    #[test]
    fn test_segment_photo_writes_palette_png() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let input = dir.path().join("cat.png");
        photo(120, 80).save(&input).unwrap();

        let report = run_segment_batch(std::slice::from_ref(&input), &config).unwrap();
        assert!(report.is_success());
        assert_eq!(report.written, vec![config.out_dir.join("cat.png")]);

        let seg = image::open(&report.written[0]).unwrap().to_rgb8();
        assert_eq!(seg.dimensions(), (60, 40));
        let allowed: HashSet<[u8; 3]> = [[0, 0, 0], [128, 128, 128], [250, 250, 250]].into();
        assert!(seg.pixels().all(|p| allowed.contains(&p.0)));
        assert_eq!(seg.get_pixel(0, 0).0, [250, 250, 250]);
        assert_eq!(seg.get_pixel(22, 20).0, [0, 0, 0]);
        assert_eq!(seg.get_pixel(55, 20).0, [128, 128, 128]);
    }

    #[test]
    fn test_batch_continues_past_undecodable_photo() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        let first = dir.path().join("first.png");
        let broken = dir.path().join("broken.jpg");
        let third = dir.path().join("third.png");
        photo(40, 40).save(&first).unwrap();
        std::fs::write(&broken, b"not an image at all").unwrap();
        photo(50, 30).save(&third).unwrap();

        let inputs = vec![first, broken.clone(), third];
        let report = run_segment_batch(&inputs, &config).unwrap();

        assert!(!report.is_success());
        assert_eq!(
            report.written,
            vec![config.out_dir.join("first.png"), config.out_dir.join("third.png")]
        );
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, broken);
        assert!(matches!(report.failed[0].1, PipelineError::Input { .. }));
        assert!(config.out_dir.join("third.png").exists());
    }

    #[test]
    fn test_grayscale_photo_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let input = dir.path().join("gray.png");
        image::GrayImage::new(10, 10).save(&input).unwrap();

        let report = run_segment_batch(std::slice::from_ref(&input), &config).unwrap();
        assert!(report.written.is_empty());
        assert!(matches!(report.failed[0].1, PipelineError::Input { .. }));
    }

    #[test]
    fn test_debug_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.debug_output = true;
        let input = dir.path().join("dog.png");
        photo(30, 60).save(&input).unwrap();

        run_segment_batch(std::slice::from_ref(&input), &config).unwrap();
        for name in ["dog_rescaled.jpg", "dog_gray.jpg", "dog_blurred.jpg", "dog.png"] {
            assert!(config.out_dir.join(name).exists(), "{name} missing");
        }
    }

    #[test]
    fn test_bad_palette_aborts_before_any_photo() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        std::fs::write(&config.palette_path, "{}").unwrap();

        let err = run_segment_batch(&[dir.path().join("x.png")], &config).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(!config.out_dir.exists());
    }
}
