use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::exif::ExifFile;
use crate::geotag::{self, AnonymizeReport, GeotagInfo};
use crate::store::MetadataStore;
use crate::tags::TagSets;

/// Supported file name suffixes. Matching is case-sensitive.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".gif", ".tif", ".png"];

/// The container format of an image, determined by its file name suffix.
///
/// ```rust
/// use photoanon::pipeline::ImageKind;
/// use std::path::Path;
///
/// assert_eq!(ImageKind::from_path(Path::new("photo.jpg")), Some(ImageKind::Jpeg));
/// assert_eq!(ImageKind::from_path(Path::new("PHOTO.JPG")), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// EXIF in an APP1 segment
    Jpeg,
    /// EXIF in an eXIf chunk
    Png,
    /// The file is the EXIF block
    Tiff,
    /// Accepted on the command line but has no EXIF container
    Gif,
}

impl ImageKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let suffix = IMAGE_EXTENSIONS.iter().find(|ext| name.ends_with(*ext))?;
        match *suffix {
            ".jpg" | ".jpeg" => Some(Self::Jpeg),
            ".png" => Some(Self::Png),
            ".tif" => Some(Self::Tiff),
            ".gif" => Some(Self::Gif),
            _ => None,
        }
    }
}

/// Outcome of processing one image.
#[derive(Debug, Serialize)]
pub struct ProcessResult {
    /// The path given on the command line (or found in a directory).
    pub path: PathBuf,
    /// The file actually inspected or modified. Differs from `path` when
    /// the original is preserved.
    pub target: PathBuf,
    pub image_kind: Option<ImageKind>,
    /// Geotag data found before anonymization.
    pub geotag: Option<GeotagInfo>,
    /// Unsafe tags present before anonymization.
    pub unsafe_tags: Vec<String>,
    pub report: Option<AnonymizeReport>,
    /// Whether changes were flushed to disk.
    pub written: bool,
    pub error: Option<String>,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            target: path.to_path_buf(),
            image_kind: ImageKind::from_path(path),
            geotag: None,
            unsafe_tags: Vec::new(),
            report: None,
            written: false,
            error: None,
        }
    }

    fn fail(mut self, error: anyhow::Error) -> Self {
        log::error!("  {}: {error:#}", self.path.display());
        self.error = Some(format!("{error:#}"));
        self
    }
}

/// Collect supported image files from the given paths.
///
/// Files named explicitly are kept if their suffix is supported and skipped
/// with a warning otherwise. Directories are walked recursively and only
/// supported files are taken.
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();
    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }
    images
}

fn is_supported_image(path: &Path) -> bool {
    ImageKind::from_path(path).is_some()
}

/// Where the anonymized copy of `path` goes: `<prefix><file name>` in the
/// same directory.
pub fn preserved_path(path: &Path, prefix: &str) -> PathBuf {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!("{prefix}{name}"))
}

/// Report an image's geotag data and unsafe tags without modifying it.
pub fn inspect_image(path: &Path, tags: &TagSets) -> ProcessResult {
    let mut result = ProcessResult::new(path);

    let file = match ExifFile::open(path) {
        Ok(file) => file,
        Err(e) => return result.fail(e),
    };

    result.unsafe_tags = tags.unsafe_tags_present(&file);
    match geotag::read_geotag_info(&file) {
        Ok(info) => result.geotag = Some(info),
        Err(e) => return result.fail(e.into()),
    }
    result
}

/// Anonymize one image according to `config`.
///
/// With `preserve` the original is only read; the anonymized result goes to
/// its preserved name, and only once anonymization has succeeded. Under
/// `dry_run` nothing is written; the report shows what would have changed.
pub fn process_image(path: &Path, tags: &TagSets, config: &Config, preserve: bool) -> ProcessResult {
    let mut result = ProcessResult::new(path);
    if preserve {
        result.target = preserved_path(path, &config.preserve_prefix);
    }

    let mut file = match ExifFile::open(path) {
        Ok(file) => file,
        Err(e) => return result.fail(e),
    };

    result.unsafe_tags = tags.unsafe_tags_present(&file);
    match geotag::read_geotag_info(&file) {
        Ok(info) => result.geotag = Some(info),
        // Malformed geotags are scrubbed like any others.
        Err(e) => log::warn!("  Unreadable geotag in {}: {e}", path.display()),
    }

    let now = chrono::Utc::now().timestamp();
    let report = match geotag::anonymize(&mut file, tags, config.method, &mut rand::rng(), now) {
        Ok(report) => report,
        Err(e) => return result.fail(e),
    };
    log::info!(
        "  {} unsafe tag(s) removed, {} rewritten",
        report.removed.len(),
        report.written.len()
    );
    result.report = Some(report);

    if config.dry_run {
        return result;
    }

    let flushed = if result.target == result.path {
        file.flush()
    } else {
        let existed = result.target.exists();
        let flushed = file.flush_to(&result.target);
        if flushed.is_err() && !existed {
            discard(&result.target);
        }
        flushed
    };
    if let Err(e) = flushed {
        return result.fail(e);
    }
    result.written = true;
    result
}

/// Remove a copy that could not be finished. It may still hold the original
/// metadata.
fn discard(copy: &Path) {
    if !copy.exists() {
        return;
    }
    match std::fs::remove_file(copy) {
        Ok(()) => log::debug!("Removed unfinished copy {}", copy.display()),
        Err(e) => log::warn!("Could not remove unfinished copy {}: {e}", copy.display()),
    }
}
