use clap::{Parser, Subcommand};
use image_variants::forms::{self, Submission};
use image_variants::imaging::RustBackend;
use image_variants::lifecycle::{FieldFile, FormOutcome, SaveReport, VariantField};
use image_variants::{config, output};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "image-variants")]
#[command(about = "Generate and manage resized variants of stored images")]
#[command(long_about = "\
Generate and manage resized variants of stored images

Every stored image gets one variant per configured size, written next to it:

  media/
  └── images/
      ├── dawn.jpg                 # Source (uploaded)
      ├── dawn_default.jpg         # [\"default\", 800, 600]  crop to 800x600
      ├── dawn_thumbnail.jpg       # [\"thumbnail\", 150, 150]
      └── dawn_1200.jpg            # [1200, 0]  1200px wide, height follows

Sources already smaller than a size are copied unchanged; images are never
enlarged. Variants keep the source's format.

Run 'image-variants gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Override the configured media root (relative to --config)
    #[arg(long, global = true)]
    media_root: Option<PathBuf>,

    /// Log per-variant work to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the configured sizes
    Sizes {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store an image file and generate its variants
    Upload {
        /// Image file to upload
        file: PathBuf,
    },
    /// Regenerate every variant of a stored image
    Regenerate {
        /// Storage key of the source image, e.g. images/dawn.jpg
        key: String,
    },
    /// Show variant URLs, paths and sizes for a stored image
    Show { key: String },
    /// Delete a stored image and all of its variants
    Delete { key: String },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "image_variants=debug".to_string()
        } else {
            "image_variants=warn".to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut settings = config::load_config(&cli.config)?;
    if let Some(root) = &cli.media_root {
        settings.media_root = root.clone();
    }
    let field = VariantField::new(
        settings.field.clone(),
        settings.directives()?,
        Arc::new(settings.storage(&cli.config)),
        RustBackend::new(),
    )
    .with_upload_to(settings.upload_to.clone())
    .with_quality(settings.quality());

    match cli.command {
        Command::Sizes { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&field.directives())?);
            } else {
                output::print_directives(field.directives());
            }
        }
        Command::Upload { file } => {
            let submission = Submission::Upload {
                filename: upload_name(&file),
                bytes: std::fs::read(&file)?,
            };
            let cleaned = forms::clean(field.backend(), submission)?;
            let mut value = FieldFile::empty();
            if let FormOutcome::Stored(key) = field.save_form_data(&mut value, cleaned)? {
                println!("Stored {}", key);
            }
            let report = field.on_save(&value)?;
            output::print_save_report(&report);
            ensure_complete(&report)?;
        }
        Command::Regenerate { key } => {
            let report = field.on_save(&FieldFile::new(key))?;
            output::print_save_report(&report);
            ensure_complete(&report)?;
        }
        Command::Show { key } => {
            let mut value = FieldFile::new(key);
            field.on_load(&mut value);
            output::print_handles(&value);
        }
        Command::Delete { key } => {
            let report = field.on_delete(&mut FieldFile::new(key))?;
            output::print_delete_report(&report);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// File name the upload is stored under, as a browser would submit it.
fn upload_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn ensure_complete(report: &SaveReport) -> Result<(), Box<dyn std::error::Error>> {
    if report.is_complete() {
        Ok(())
    } else {
        Err(format!("{} variant(s) failed", report.failures.len()).into())
    }
}
