use clap::{Parser, Subcommand};
use contact_sheet::config::{self, SheetConfig};
use contact_sheet::ingest;
use contact_sheet::sheet::ContactSheet;
use contact_sheet::{export, imaging, mime, naming, output, scan};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "contact-sheet")]
#[command(about = "Turn a pile of photos into a square-cropped contact sheet")]
#[command(long_about = "\
Turn a pile of photos into a square-cropped contact sheet

Every input is cut to a centered square thumbnail and placed on a grid in
the order given. Directories contribute their files sorted by name.

Accepted types: JPEG, PNG, WebP, HEIC (and HEIF unless disabled).
HEIC/HEIF is converted to JPEG first and shown under a .jpg name. That
conversion needs libheif: build with '--features heic'. Without it HEIC
files are reported and skipped, and 'check' flags them.

Photos are turned upright from their EXIF orientation before cropping, and
each file name is drawn above its cell (export.labels).

Files that cannot be read or decoded are reported and skipped; the rest
still make the sheet.

Run 'contact-sheet gen-config' to generate a documented contact-sheet.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./contact-sheet.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log pipeline diagnostics to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Overrides shared by commands that crop thumbnails.
#[derive(clap::Args, Clone)]
struct ThumbArgs {
    /// Photos or directories of photos
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Edge length of each cropped thumbnail in pixels
    #[arg(long)]
    target_size: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Crop every input and export the contact sheet PNG
    Build {
        #[command(flatten)]
        thumbs: ThumbArgs,

        /// Output PNG (defaults to export.filename)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export scale factor
        #[arg(long)]
        scale: Option<u32>,

        /// Maximum number of columns
        #[arg(long)]
        columns: Option<u32>,

        /// Also write the sheet layout as JSON
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Leave file names off the sheet
        #[arg(long)]
        no_labels: bool,
    },
    /// Write each cropped thumbnail as its own PNG
    Thumbs {
        #[command(flatten)]
        thumbs: ThumbArgs,

        /// Directory for the thumbnail files
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Run the type gate over the inputs without decoding anything
    Check {
        /// Photos or directories of photos
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print a stock contact-sheet.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build {
            thumbs,
            output: out_path,
            scale,
            columns,
            manifest,
            no_labels,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(size) = thumbs.target_size {
                config.thumbnails.target_size = size;
            }
            if let Some(scale) = scale {
                config.export.scale = scale;
            }
            if let Some(columns) = columns {
                config.export.columns = columns;
            }
            if no_labels {
                config.export.labels = false;
            }
            config.validate()?;

            let paths = scan::collect_inputs(&thumbs.inputs)?;
            let sheet = run_ingest(&paths, &config);

            let path = out_path.unwrap_or_else(|| PathBuf::from(&config.export.filename));
            let layout = export::export(&sheet, &config, &path)?;
            output::print_export_output(&layout, &path);

            if let Some(manifest_path) = manifest {
                export::write_manifest(&layout, &manifest_path)?;
                println!("Layout: {}", manifest_path.display());
            }
        }
        Command::Thumbs { thumbs, out_dir } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(size) = thumbs.target_size {
                config.thumbnails.target_size = size;
            }
            config.validate()?;

            let paths = scan::collect_inputs(&thumbs.inputs)?;
            let sheet = run_ingest(&paths, &config);

            let written = write_thumbnails(&sheet, &out_dir)?;
            output::print_thumbs_output(&written);
        }
        Command::Check { inputs } => {
            let config = load_config(cli.config.as_deref())?;
            let results: Vec<_> = scan::collect_inputs(&inputs)?
                .iter()
                .map(|path| {
                    let name = scan::display_name(path);
                    let check =
                        mime::check_type(&name, scan::declared_mime(path), &config.conversion);
                    (name, check)
                })
                .collect();
            output::print_check_output(&results, imaging::HEIC_SUPPORTED);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so stdout stays the command's own output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "contact_sheet=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Load the explicit config file, or `contact-sheet.toml` when present.
fn load_config(path: Option<&Path>) -> Result<SheetConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) if !path.exists() => {
            Err(format!("Config file not found: {}", path.display()).into())
        }
        Some(path) => Ok(config::load_config(path)?),
        None => Ok(config::load_config(Path::new(config::CONFIG_FILENAME))?),
    }
}

/// Ingest on this thread while a printer thread reports progress.
fn run_ingest(paths: &[PathBuf], config: &SheetConfig) -> ContactSheet {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_ingest_event(&event) {
                println!("{}", line);
            }
        }
    });

    let mut sheet = ContactSheet::new();
    let report = ingest::ingest_paths(paths, config, &mut sheet, Some(tx));
    // The sender was moved into `ingest` and is gone, so the printer drains and exits.
    if printer.join().is_err() {
        tracing::warn!("progress printer panicked");
    }
    output::print_ingest_summary(&report);
    sheet
}

/// Write every thumbnail as `<display stem>.png`, suffixing repeated stems.
fn write_thumbnails(
    sheet: &ContactSheet,
    out_dir: &Path,
) -> Result<Vec<(String, PathBuf)>, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(out_dir)?;
    let mut used = HashSet::new();
    let mut written = Vec::new();
    for thumb in sheet.thumbnails() {
        let stem = naming::file_stem(&thumb.display_name);
        let mut file_name = format!("{stem}.png");
        let mut n = 2;
        while !used.insert(file_name.clone()) {
            file_name = format!("{stem}-{n}.png");
            n += 1;
        }

        let path = out_dir.join(&file_name);
        std::fs::write(&path, thumb.encode_png()?)?;
        written.push((thumb.display_name.clone(), path));
    }
    Ok(written)
}
