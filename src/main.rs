use clap::{Parser, Subcommand};
use pic_processor::batch::{self, ItemReport};
use pic_processor::config::{self, Settings};
use pic_processor::imaging::{OutputFormat, RustBackend};
use pic_processor::{output, package, scan};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pic-processor")]
#[command(about = "Resize and re-encode images locally")]
#[command(long_about = "\
Resize and re-encode images locally

Inputs can be files or directories. Directories are searched recursively for
.jpg, .jpeg, .png and .webp files; files given directly are always used.

Each image is decoded, resized, and encoded in the chosen format. A failing
image is reported and skipped; the rest of the batch still runs.

Resizing:
  neither --width nor --height   keep the source size
  only one of them               the other follows the aspect ratio
  both                           width wins; --stretch uses both exactly

One processed image is saved directly into --output. Several are bundled
into processed-images.zip inside it. Existing files are never replaced: a
taken name gets a -2, -3, ... suffix.

Settings are read from pic-processor.toml in the working directory when
present. Run 'pic-processor gen-config' to generate a documented one.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ProcessArgs {
    /// Image files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output format: jpeg, png or webp
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Encoder quality, 0.0 to 1.0 (ignored for png)
    #[arg(long)]
    quality: Option<f32>,

    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Stretch to exactly --width x --height instead of keeping the aspect ratio
    #[arg(long)]
    stretch: bool,

    /// Directory to save results into
    #[arg(long, short, default_value = ".")]
    output: PathBuf,

    /// Config file (defaults to ./pic-processor.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON report of every item to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

impl ProcessArgs {
    /// Command-line flags win over config values.
    fn apply(&self, settings: &mut Settings) {
        if let Some(format) = self.format {
            settings.format = format;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if self.width.is_some() {
            settings.width = self.width;
        }
        if self.height.is_some() {
            settings.height = self.height;
        }
        if self.stretch {
            settings.maintain_aspect_ratio = false;
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Resize and re-encode images
    Process(ProcessArgs),
    /// Print a stock pic-processor.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Process(args) => process(&args)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn process(args: &ProcessArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let mut settings = config::load_config(args.config.as_deref(), &cwd)?;
    args.apply(&mut settings);
    let options = settings.to_options()?;
    if args.quality.is_some() && !options.format.honors_quality() {
        log::warn!("--quality has no effect on {} output", options.format);
    }

    let backend = RustBackend::new();
    let mut batch = scan::load_batch(&args.inputs)?;
    batch.probe_dimensions(&backend);
    output::print_batch_listing(&batch);
    println!();

    let format = options.format;
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_batch_event(&event, format) {
                println!("{}", line);
            }
        }
    });
    let summary = batch::run_batch(&backend, &mut batch, &options, Some(tx), None);
    printer.join().map_err(|_| "progress printer panicked")?;

    let saved = match package::plan_download(&batch) {
        Some(plan) => Some(package::save(&plan, &args.output)?),
        None => None,
    };
    output::print_save_output(saved.as_ref());

    if let Some(path) = &args.report {
        let items: Vec<ItemReport> = batch.iter().map(|item| item.report()).collect();
        let report = serde_json::json!({
            "summary": summary,
            "items": items,
        });
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        log::info!("report written to {}", path.display());
    }

    Ok(())
}
