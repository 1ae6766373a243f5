use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use photoanon::geotag::{GeotagInfo, Method};
use photoanon::tags::TagSets;
use photoanon::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "photoanon",
    version,
    about = "Anonymize photos by scrubbing or randomizing privacy-revealing EXIF metadata"
)]
struct Cli {
    /// Image files or directories to anonymize
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Keep original images; the anonymized copy gets a prefix
    #[arg(short, long)]
    preserve: bool,

    /// Add noise to images to combat lens fingerprinting (not implemented)
    #[arg(short, long)]
    noise: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show the unsafe EXIF data of each image and exit
    #[arg(short, long)]
    info: bool,

    /// How to anonymize: `randomize` writes decoy location and time, `remove`
    /// deletes the unsafe tags outright
    #[arg(short, long, value_enum)]
    method: Option<Method>,

    /// Path to config file (default: photoanon.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config file and exit
    #[arg(long)]
    init: bool,

    /// Directory with safe_tags.txt and unsafe_tags.txt (default: built-in lists)
    #[arg(long, value_name = "DIR")]
    tags_dir: Option<PathBuf>,

    /// Preview changes without writing to files
    #[arg(long)]
    dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let mut config = config::Config::load(cli.config.as_deref())?;
    if let Some(method) = cli.method {
        config.method = method;
    }
    if cli.tags_dir.is_some() {
        config.tags_dir = cli.tags_dir.clone();
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    if cli.noise {
        log::warn!("--noise is not implemented; images are left untouched");
    }

    let tags = match &config.tags_dir {
        Some(dir) => TagSets::load(dir)?,
        None => TagSets::builtin()?,
    };

    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    let total = images.len();
    let mut results = Vec::with_capacity(total);

    if cli.info {
        for image_path in &images {
            let result = pipeline::inspect_image(image_path, &tags);
            if !cli.json && result.error.is_none() {
                print_info(&result);
            }
            results.push(result);
        }
    } else {
        log::info!("Found {total} image(s) to anonymize (method: {})", config.method);
        if config.dry_run {
            log::info!("DRY RUN: no files will be modified");
        }

        for (i, image_path) in images.iter().enumerate() {
            log::info!("[{}/{}] Processing: {}", i + 1, total, image_path.display());
            let result = pipeline::process_image(image_path, &tags, &config, cli.preserve);
            if result.error.is_none() && result.target != result.path && !config.dry_run {
                log::info!("  Anonymized copy: {}", result.target.display());
            }
            if config.dry_run && !cli.json {
                print_dry_run(&result);
            }
            results.push(result);
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    let success = results.iter().filter(|r| r.error.is_none()).count();
    let failed = total - success;
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");

    Ok(())
}

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print the geotag data and unsafe tags found in an image.
fn print_info(result: &pipeline::ProcessResult) {
    println!();
    println!("{BOLD}File:{RESET} {}", result.path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    let info = result.geotag.unwrap_or_default();
    if !info.is_empty() {
        println!("  {BOLD}Geotag{RESET}");
        println!("  {DIM}{}{RESET}", "─".repeat(70));
        print_geotag(&info, "");
        println!();
    }

    if result.unsafe_tags.is_empty() {
        println!("  {DIM}(no unsafe EXIF metadata found){RESET}");
    } else {
        println!("  {BOLD}Unsafe tags{RESET}");
        println!("  {DIM}{}{RESET}", "─".repeat(70));
        for tag in &result.unsafe_tags {
            println!("  {RED}{tag}{RESET}");
        }
    }
    println!();
}

/// Print what a dry run would have changed.
fn print_dry_run(result: &pipeline::ProcessResult) {
    let Some(report) = &result.report else {
        return;
    };

    println!();
    println!("  {BOLD}Would change:{RESET} {}", result.target.display());
    println!("  {DIM}{}{RESET}", "─".repeat(72));
    for tag in &report.removed {
        println!("  {RED}- {tag}{RESET}");
    }
    if let Some(decoy) = &report.decoy {
        print_geotag(decoy, GREEN);
    }
    if report.removed.is_empty() && report.decoy.is_none() {
        println!("  {DIM}(nothing to change){RESET}");
    }
    println!();
}

fn print_geotag(info: &GeotagInfo, color: &str) {
    if let Some(lat) = info.latitude {
        print_row("Latitude", &format!("{lat:.6}"), color);
    }
    if let Some(lon) = info.longitude {
        print_row("Longitude", &format!("{lon:.6}"), color);
    }
    if let Some(alt) = info.altitude {
        print_row("Altitude", &format!("{alt:.1} m"), color);
    }
    if let Some(time) = info.time {
        let stamp = chrono::DateTime::from_timestamp(time, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| time.to_string());
        print_row("Captured", &stamp, color);
    }
}

/// Print a single row in the info table.
fn print_row(tag: &str, val: &str, color: &str) {
    let tag_col = format!("{:<22}", tag);
    if color.is_empty() {
        println!("  {tag_col} : {val}");
    } else {
        println!("  {color}{tag_col} : {val}{RESET}");
    }
}
