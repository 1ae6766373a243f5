//! EXIF access for image files.
//!
//! [`ExifFile`] opens a JPEG, PNG or TIFF file and exposes the IFD0, Exif, GPS
//! and interoperability fields of its primary image as a
//! [`MetadataStore`](crate::store::MetadataStore) keyed by Exiv2-style names
//! such as `Exif.GPSInfo.GPSLatitude`. Decoding and encoding go through
//! `kamadak-exif`; `img-parts` moves the block in and out of the container.
//!
//! | Container | EXIF location |
//! |-----------|---------------|
//! | JPEG (`.jpg`, `.jpeg`) | APP1 `Exif\0\0` segment |
//! | PNG (`.png`) | `eXIf` chunk |
//! | TIFF (`.tif`) | the file itself |
//! | GIF (`.gif`) | none; opening fails |

mod file;
#[cfg(test)]
pub(crate) mod fixtures;
mod names;
mod value;

pub use file::ExifFile;
pub use names::{Group, ResolvedTag, resolve, tag_name};
pub use value::Format;
