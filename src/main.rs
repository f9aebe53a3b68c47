use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use split_crop::imaging::RustBackend;
use split_crop::{
    CommitOutcome, CropRegion, ExportConfig, Session, SourceImage, config, delivery, output,
    presets,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "split-crop")]
#[command(about = "Crop an image region and export it with its right-hand neighbour")]
#[command(long_about = "\
Crop an image region and export it with its right-hand neighbour

The crop rectangle is exported twice: once as selected (left) and once
shifted right by its own width (right). Both come out as JPEG files of
identical size that line up side by side.

  ┌────────┬────────┬──────┐
  │  left  │ right  │      │   x, y, width, height are given in the
  │        │        │      │   coordinates of the image as displayed
  └────────┴────────┴──────┘   (see --display-width/--display-height)

Run 'split-crop gen-config' to print a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory the two images are written to
    #[arg(long, default_value = ".", global = true)]
    out_dir: PathBuf,

    /// Device pixel ratio (overrides the config file)
    #[arg(long, global = true)]
    pixel_ratio: Option<f64>,

    /// Width the image is displayed at (crop coordinates refer to it)
    #[arg(long, global = true, requires = "display_height")]
    display_width: Option<f64>,

    /// Height the image is displayed at
    #[arg(long, global = true, requires = "display_width")]
    display_height: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ImageArgs {
    /// Source image
    image: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Split the image down the middle at full height
    Halve(ImageArgs),
    /// Export a square of half the image width and the square next to it
    Square(ImageArgs),
    /// Export an explicit crop rectangle and its right-hand neighbour
    Crop {
        /// Source image
        image: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        #[arg(long, default_value_t = 0.0)]
        y: f64,
        /// Crop width (default: 1080 square, fitted to the image)
        #[arg(long, requires = "height")]
        width: Option<f64>,
        #[arg(long, requires = "width")]
        height: Option<f64>,
        /// Interpret x, y, width and height as percent of the displayed size
        #[arg(long, requires = "width")]
        percent: bool,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

enum CropChoice {
    Halve,
    Square,
    Region(Option<CropRegion>),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let mut export_config = config::load_config_or_default(cli.config.as_deref())?;
    if let Some(ratio) = cli.pixel_ratio {
        export_config.pixel_ratio = ratio;
        export_config.validate()?;
    }
    let display = cli.display_width.zip(cli.display_height);

    let (image, choice) = match cli.command {
        Command::Halve(args) => (args.image, CropChoice::Halve),
        Command::Square(args) => (args.image, CropChoice::Square),
        Command::Crop {
            image,
            x,
            y,
            width,
            height,
            percent,
        } => {
            let region = width.zip(height).map(|(w, h)| {
                if percent {
                    CropRegion::percent(x, y, w, h)
                } else {
                    CropRegion::px(x, y, w, h)
                }
            });
            (image, CropChoice::Region(region))
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
    };

    run(&image, display, choice, export_config, &cli.out_dir).await
}

/// Load the image, commit the chosen crop and write both halves.
async fn run(
    path: &Path,
    display: Option<(f64, f64)>,
    choice: CropChoice,
    export_config: ExportConfig,
    out_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut image = SourceImage::open(path)?;
    if let Some((width, height)) = display {
        image = image.with_displayed_size(width, height)?;
    }
    output::print_lines(&output::format_source(path, image.dims()));

    let dims = *image.dims();
    let crop = match choice {
        CropChoice::Halve => presets::halve(&dims),
        CropChoice::Square => presets::square(&dims),
        CropChoice::Region(Some(region)) => region,
        CropChoice::Region(None) => presets::initial(&dims),
    };
    println!("{}", output::format_crop(&crop));

    let session = Session::new(RustBackend::new(), export_config);
    session.load_image(image)?;

    match session.commit(&crop).await {
        Ok(CommitOutcome::Committed(pair)) => {
            let saved = delivery::save_pair(out_dir, &pair)?;
            output::print_lines(&output::format_saved_pair(&pair, &saved));
            Ok(())
        }
        Ok(CommitOutcome::Skipped) => {
            output::print_lines(&output::format_skipped());
            Ok(())
        }
        Err(e) => {
            eprintln!("Export failed. Try again with a different image or crop.");
            Err(e.into())
        }
    }
}
