//! # photoanon
//!
//! Anonymize photos by scrubbing privacy-revealing EXIF metadata: GPS
//! position, capture time, serial numbers, owner names and the like.
//!
//! Two methods are available. `remove` deletes every tag on the unsafe list.
//! `randomize` first writes decoy coordinates, altitude and capture time, then
//! deletes the remaining unsafe tags.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use photoanon::config::Config;
//! use photoanon::pipeline::{collect_images, process_image};
//! use photoanon::tags::TagSets;
//! use std::path::PathBuf;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let tags = TagSets::builtin()?;
//!
//!     for path in collect_images(&[PathBuf::from("./photos")]) {
//!         let result = process_image(&path, &tags, &config, false);
//!         if let Some(ref err) = result.error {
//!             eprintln!("Error processing {}: {err}", path.display());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! Everything above the file layer works on a [`store::MetadataStore`], so
//! the same calls run against an [`exif::ExifFile`] or an in-memory
//! [`store::MemoryStore`]:
//!
//! ```rust
//! use photoanon::geotag::read_geotag_info;
//! use photoanon::store::MemoryStore;
//!
//! let store: MemoryStore = [
//!     ("Exif.GPSInfo.GPSLatitude", "84/1 23/1 17/1"),
//!     ("Exif.GPSInfo.GPSLatitudeRef", "N"),
//!     ("Exif.GPSInfo.GPSLongitude", "12/1 0/1 0/1"),
//!     ("Exif.GPSInfo.GPSLongitudeRef", "W"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let info = read_geotag_info(&store).unwrap();
//! assert_eq!(info.longitude, Some(-12.0));
//! ```
//!
//! ## Modules
//!
//! - [`geo`]: coordinate and altitude conversion between decimal and EXIF forms
//! - [`rational`]: exact fractions used by the converters
//! - [`tags`]: safe/unsafe tag lists
//! - [`geotag`]: reading, writing and anonymizing geotags through a store
//! - [`exif`]: file-backed store for JPEG, PNG and TIFF
//! - [`pipeline`]: image collection and per-file processing
//! - [`config`]: configuration loading and saving

pub mod config;
pub mod error;
pub mod exif;
pub mod fake;
pub mod geo;
pub mod geotag;
pub mod pipeline;
pub mod rational;
pub mod store;
pub mod tags;
