use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use cutline_engine::{MaskRule, SheetMode};

use papercut_lib::config::validation::{parse_mask_rule, parse_sheet_mode};
use papercut_lib::config::{AppConfig, ConfigOverrides};
use papercut_lib::pipeline::{self, calibrate::DEFAULT_CALIBRATION_PATH};

#[derive(Parser)]
#[command(name = "papercut")]
#[command(about = "Turn photos into layered paper-cut templates")]
struct Cli {
    /// JSON file with the paper color values
    #[arg(long, global = true)]
    palette: Option<PathBuf>,

    /// Printer resolution in dots per inch
    #[arg(long, global = true)]
    dpi: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment photos into palette colors
    Segment {
        /// Input photos
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for segmentation images
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Blur radius; higher means simpler shapes
        #[arg(long)]
        sigma: Option<f32>,

        /// Save intermediate images for debugging
        #[arg(long)]
        debug: bool,
    },
    /// Turn a segmentation image into printable cut sheets
    Pages {
        /// Segmentation image (may be hand-edited)
        input: PathBuf,

        #[command(flatten)]
        print: PrintArgs,
    },
    /// Write a full-page rectangle for checking printer dpi and margins
    Calibrate {
        /// Destination image
        #[arg(default_value = DEFAULT_CALIBRATION_PATH)]
        dest: PathBuf,
    },
}

#[derive(Args)]
struct PrintArgs {
    /// Output directory for page tiles
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Long edge of the finished piece in inches
    #[arg(long)]
    target_length: Option<f64>,

    /// Per-color mask: exact or layered
    #[arg(long, value_parser = parse_mask_rule)]
    mask_rule: Option<MaskRule>,

    /// Sheet content: cut-lines or foreground
    #[arg(long, value_parser = parse_sheet_mode)]
    sheet_mode: Option<SheetMode>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    papercut_lib::init_tracing();
    papercut_lib::load_dotenv();

    let mut config = AppConfig::load().context("Invalid configuration")?;
    let mut overrides = ConfigOverrides {
        palette_path: cli.palette,
        dpi: cli.dpi,
        ..Default::default()
    };

    match cli.command {
        Commands::Segment {
            inputs,
            out_dir,
            sigma,
            debug,
        } => {
            overrides.out_dir = out_dir;
            overrides.blur_sigma = sigma;
            overrides.debug_output = debug.then_some(true);
            config.apply(overrides);

            let report = pipeline::run_segment_batch(&inputs, &config)?;
            for path in &report.written {
                println!("{}", path.display());
            }
            if !report.is_success() {
                for (input, err) in &report.failed {
                    eprintln!("failed: {}: {err}", input.display());
                }
                bail!("{} of {} photos failed", report.failed.len(), inputs.len());
            }
        }
        Commands::Pages { input, print } => {
            overrides.pages_dir = print.out_dir;
            overrides.target_length_in = print.target_length;
            overrides.mask_rule = print.mask_rule;
            overrides.sheet_mode = print.sheet_mode;
            config.apply(overrides);

            let report = pipeline::write_print_pages(&input, &config)
                .with_context(|| format!("Failed to make pages from {}", input.display()))?;
            println!(
                "{} pages ({} x {} per color) in {}",
                report.pages.len(),
                report.rows,
                report.cols,
                config.pages_dir.display()
            );
        }
        Commands::Calibrate { dest } => {
            config.apply(overrides);
            let path = pipeline::write_calibration_page(&dest, &config)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
