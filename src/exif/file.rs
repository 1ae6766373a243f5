use anyhow::{Context, Result, anyhow, bail};
use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};
use img_parts::jpeg::{Jpeg, JpegSegment, markers};
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::names::{Group, is_managed, resolve, tag_name};
use super::value::{Format, format_value, parse_value};
use crate::pipeline::ImageKind;
use crate::store::{MetadataStore, Removal};

const EXIF_PREFIX: &[u8] = b"Exif\0\0";

// An APP1 segment holds at most 65533 content bytes, 6 of which are "Exif\0\0".
const MAX_JPEG_EXIF: usize = 65533 - EXIF_PREFIX.len();

/// EXIF metadata of one image file, exposed as a [`MetadataStore`].
///
/// Fields are decoded with `kamadak-exif` and re-encoded with its writer, so
/// a rewritten block holds only the fields still present. Strips, tiles and
/// thumbnails are carried over from the block that was read.
///
/// Edits stay in memory until [`flush`](MetadataStore::flush), which rewrites
/// the file only when something changed.
#[derive(Debug)]
pub struct ExifFile {
    path: PathBuf,
    kind: ImageKind,
    /// The TIFF block the fields came from.
    raw: Vec<u8>,
    little_endian: bool,
    fields: Vec<Field>,
    dirty: bool,
}

/// Image payload of one IFD, sliced out of the block that was read.
enum ImageData<'a> {
    Strips(Vec<&'a [u8]>),
    Tiles(Vec<&'a [u8]>),
    Jpeg(&'a [u8]),
}

impl ExifFile {
    pub fn open(path: &Path) -> Result<Self> {
        let kind = ImageKind::from_path(path)
            .with_context(|| format!("Unsupported file type: {}", path.display()))?;
        let bytes = std::fs::read(path).context("Failed to read image file")?;
        let raw = match kind {
            ImageKind::Jpeg => {
                let jpeg = Jpeg::from_bytes(Bytes::from(bytes))
                    .map_err(|e| anyhow!("Failed to parse JPEG: {e}"))?;
                jpeg.exif().map(|b| b.to_vec()).unwrap_or_default()
            }
            ImageKind::Png => {
                let png = Png::from_bytes(Bytes::from(bytes))
                    .map_err(|e| anyhow!("Failed to parse PNG: {e}"))?;
                png.exif().map(|b| b.to_vec()).unwrap_or_default()
            }
            ImageKind::Tiff => bytes,
            ImageKind::Gif => bail!("GIF files carry no EXIF block"),
        };

        let (fields, little_endian) = read_fields(&raw)?;
        log::debug!("Opened {} ({kind:?}, {} fields)", path.display(), fields.len());
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            raw,
            little_endian,
            fields,
            dirty: false,
        })
    }

    /// Whether there are edits not yet flushed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the image, with pending edits, to `dest` and keep working on
    /// that file. The source file is left untouched.
    pub fn flush_to(&mut self, dest: &Path) -> Result<()> {
        if self.dirty {
            self.write_to(dest)
                .with_context(|| format!("Failed to write {}", dest.display()))?;
        } else {
            std::fs::copy(&self.path, dest)
                .with_context(|| format!("Failed to copy to {}", dest.display()))?;
        }
        log::debug!("Wrote {} from {}", dest.display(), self.path.display());
        self.path = dest.to_path_buf();
        self.dirty = false;
        Ok(())
    }

    fn field(&self, tag: &str) -> Option<&Field> {
        let resolved = resolve(tag)?;
        if is_managed(resolved.tag) {
            return None;
        }
        self.fields
            .iter()
            .find(|f| f.ifd_num == In::PRIMARY && f.tag == resolved.tag)
    }

    /// Resolve `tag` and parse `text` into the value `set` would store.
    fn encode(&self, tag: &str, text: &str) -> Result<(Tag, Value)> {
        let resolved = resolve(tag).with_context(|| format!("Unknown tag {tag}"))?;
        if is_managed(resolved.tag) {
            bail!("{tag} is managed internally");
        }

        let format = self
            .field(tag)
            .and_then(|existing| Format::of(&existing.value))
            .or(resolved.format)
            .with_context(|| format!("No known format for new tag {tag}"))?;
        let value = parse_value(format, text)
            .with_context(|| format!("Invalid value {text:?} for {tag}"))?;
        Ok((resolved.tag, value))
    }

    /// Offsets and lengths of image data in `ifd`, as slices of the raw block.
    fn chunks(&self, ifd: In, offsets: Tag, lengths: Tag) -> Result<Option<Vec<&[u8]>>> {
        let find = |tag: Tag| self.fields.iter().find(|f| f.ifd_num == ifd && f.tag == tag);
        let (Some(offset_field), Some(length_field)) = (find(offsets), find(lengths)) else {
            return Ok(None);
        };

        let starts = uints(&offset_field.value);
        let sizes = uints(&length_field.value);
        if starts.len() != sizes.len() {
            bail!("{offsets} and {lengths} disagree in count");
        }
        starts
            .iter()
            .zip(&sizes)
            .map(|(&start, &size)| {
                let start = start as usize;
                let end = start
                    .checked_add(size as usize)
                    .with_context(|| format!("{offsets} overflows"))?;
                self.raw
                    .get(start..end)
                    .with_context(|| format!("{offsets} points outside the EXIF block"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn image_data(&self) -> Result<Vec<(In, ImageData<'_>)>> {
        let mut ifds: Vec<In> = self.fields.iter().map(|f| f.ifd_num).collect();
        ifds.sort_by_key(|ifd| ifd.index());
        ifds.dedup();

        let mut images = Vec::new();
        for ifd in ifds {
            if let Some(strips) = self.chunks(ifd, Tag::StripOffsets, Tag::StripByteCounts)? {
                images.push((ifd, ImageData::Strips(strips)));
            } else if let Some(tiles) = self.chunks(ifd, Tag::TileOffsets, Tag::TileByteCounts)? {
                images.push((ifd, ImageData::Tiles(tiles)));
            } else if let Some(thumbnail) = self.chunks(
                ifd,
                Tag::JPEGInterchangeFormat,
                Tag::JPEGInterchangeFormatLength,
            )? {
                if let [jpeg] = thumbnail.as_slice() {
                    images.push((ifd, ImageData::Jpeg(*jpeg)));
                }
            }
        }
        Ok(images)
    }

    /// Encode the current fields as a TIFF block. `None` when nothing is left.
    fn encode_block(&self) -> Result<Option<Vec<u8>>> {
        let mut fields: Vec<&Field> = self
            .fields
            .iter()
            .filter(|f| !is_managed(f.tag))
            .filter(|f| {
                let known = Format::of(&f.value).is_some();
                if !known {
                    log::debug!("Dropping {} with an unreadable type", f.tag);
                }
                known
            })
            .collect();
        fields.sort_by_key(|f| (f.ifd_num.index(), Group::of(f.tag.context()), f.tag.number()));

        let images = self.image_data()?;
        if fields.is_empty() && images.is_empty() {
            return Ok(None);
        }

        let mut writer = Writer::new();
        for field in fields {
            writer.push_field(field);
        }
        for (ifd, data) in &images {
            match data {
                ImageData::Strips(strips) => writer.set_strips(strips, *ifd),
                ImageData::Tiles(tiles) => writer.set_tiles(tiles, *ifd),
                ImageData::Jpeg(jpeg) => writer.set_jpeg(*jpeg, *ifd),
            }
        }

        let mut out = Cursor::new(Vec::new());
        writer
            .write(&mut out, self.little_endian)
            .map_err(|e| anyhow!("Failed to encode EXIF block: {e}"))?;
        Ok(Some(out.into_inner()))
    }

    fn write_to(&mut self, dest: &Path) -> Result<()> {
        let block = self.encode_block()?;
        match self.kind {
            ImageKind::Jpeg => {
                let bytes = std::fs::read(&self.path).context("Failed to read image file")?;
                let mut jpeg = Jpeg::from_bytes(Bytes::from(bytes))
                    .map_err(|e| anyhow!("Failed to parse JPEG: {e}"))?;

                let orig_exif_pos = find_exif_segment_pos(&jpeg);
                jpeg.set_exif(None);
                if let Some(data) = &block {
                    if data.len() > MAX_JPEG_EXIF {
                        bail!("EXIF block of {} bytes does not fit in a JPEG APP1 segment", data.len());
                    }
                    let segments = jpeg.segments_mut();
                    // Back where it was, or right after any JFIF headers.
                    let pos = orig_exif_pos
                        .unwrap_or_else(|| {
                            segments
                                .iter()
                                .take_while(|s| s.marker() == markers::APP0)
                                .count()
                        })
                        .min(segments.len());
                    let contents = [EXIF_PREFIX, data.as_slice()].concat();
                    segments.insert(pos, JpegSegment::new_with_contents(markers::APP1, Bytes::from(contents)));
                }

                let output = jpeg.encoder().bytes();
                std::fs::write(dest, &output).context("Failed to write JPEG file")?;
            }
            ImageKind::Png => {
                let bytes = std::fs::read(&self.path).context("Failed to read image file")?;
                let mut png = Png::from_bytes(Bytes::from(bytes))
                    .map_err(|e| anyhow!("Failed to parse PNG: {e}"))?;
                png.set_exif(block.clone().map(Bytes::from));

                let output = png.encoder().bytes();
                std::fs::write(dest, &output).context("Failed to write PNG file")?;
            }
            ImageKind::Tiff => {
                let Some(data) = &block else {
                    bail!("A TIFF file cannot be left without any directory");
                };
                std::fs::write(dest, data).context("Failed to write TIFF file")?;
            }
            ImageKind::Gif => bail!("GIF files carry no EXIF block"),
        }

        // Offsets moved; read back what was written.
        self.raw = block.unwrap_or_default();
        (self.fields, self.little_endian) = read_fields(&self.raw)?;
        Ok(())
    }
}

impl MetadataStore for ExifFile {
    fn contains(&self, tag: &str) -> bool {
        self.field(tag).is_some()
    }

    fn get(&self, tag: &str) -> Option<String> {
        self.field(tag).map(|f| format_value(&f.value))
    }

    fn set(&mut self, tag: &str, value: &str) -> Result<()> {
        let (tag, value) = self.encode(tag, value)?;
        match self
            .fields
            .iter_mut()
            .find(|f| f.ifd_num == In::PRIMARY && f.tag == tag)
        {
            Some(field) => field.value = value,
            None => self.fields.push(Field {
                tag,
                ifd_num: In::PRIMARY,
                value,
            }),
        }
        self.dirty = true;
        Ok(())
    }

    fn check(&self, tag: &str, value: &str) -> Result<()> {
        self.encode(tag, value).map(|_| ())
    }

    fn delete(&mut self, tag: &str) -> Removal {
        let Some(resolved) = resolve(tag) else {
            return Removal::NotPresent;
        };
        if is_managed(resolved.tag) {
            return Removal::NotPresent;
        }
        match self
            .fields
            .iter()
            .position(|f| f.ifd_num == In::PRIMARY && f.tag == resolved.tag)
        {
            Some(i) => {
                self.fields.remove(i);
                self.dirty = true;
                Removal::Removed
            }
            None => Removal::NotPresent,
        }
    }

    fn keys(&self) -> Vec<String> {
        let mut visible: Vec<Tag> = self
            .fields
            .iter()
            .filter(|f| f.ifd_num == In::PRIMARY && !is_managed(f.tag))
            .map(|f| f.tag)
            .collect();
        visible.sort_by_key(|tag| (Group::of(tag.context()), tag.number()));
        visible.into_iter().map(tag_name).collect()
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            log::debug!("No changes to write for {}", self.path.display());
            return Ok(());
        }
        let path = self.path.clone();
        self.write_to(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.dirty = false;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Decode a TIFF block. An empty block has no fields.
fn read_fields(raw: &[u8]) -> Result<(Vec<Field>, bool)> {
    if raw.is_empty() {
        return Ok((Vec::new(), true));
    }
    let exif = Reader::new()
        .read_raw(raw.to_vec())
        .map_err(|e| anyhow!("Failed to parse EXIF block: {e}"))?;
    Ok((exif.fields().cloned().collect(), exif.little_endian()))
}

fn uints(value: &Value) -> Vec<u32> {
    match value {
        Value::Byte(v) => v.iter().map(|&n| u32::from(n)).collect(),
        Value::Short(v) => v.iter().map(|&n| u32::from(n)).collect(),
        Value::Long(v) => v.clone(),
        _ => Vec::new(),
    }
}

/// Find the position of the EXIF APP1 segment in a JPEG.
fn find_exif_segment_pos(jpeg: &Jpeg) -> Option<usize> {
    jpeg.segments()
        .iter()
        .position(|s| s.marker() == markers::APP1 && s.contents().starts_with(EXIF_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::fixtures::{ascii, bare_jpeg, rationals, scan_only_jpeg, tiff};
    use crate::geotag::{self, GeotagInfo, LATITUDE_TAG, LONGITUDE_TAG};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::fs;
    use tempfile::TempDir;

    fn sample_fields() -> Vec<Field> {
        vec![
            ascii(Tag::Make, "Canon"),
            ascii(Tag::DateTimeOriginal, "2015:06:01 12:00:00"),
            ascii(Tag::GPSLatitudeRef, "N"),
            rationals(Tag::GPSLatitude, &[(84, 1), (23, 1), (17, 1)]),
        ]
    }

    fn tiff_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("photo.tif");
        fs::write(&path, tiff(&sample_fields())).unwrap();
        path
    }

    // ── open ────────────────────────────────────────────────────────

    #[test]
    fn open_reads_all_groups() {
        let dir = TempDir::new().unwrap();
        let file = ExifFile::open(&tiff_file(&dir)).unwrap();

        assert_eq!(
            file.keys(),
            vec![
                "Exif.Image.Make",
                "Exif.Photo.DateTimeOriginal",
                "Exif.GPSInfo.GPSLatitudeRef",
                "Exif.GPSInfo.GPSLatitude",
            ]
        );
        assert_eq!(file.get("Exif.Image.Make").as_deref(), Some("Canon"));
        assert_eq!(file.get("Exif.GPSInfo.GPSLatitude").as_deref(), Some("84/1 23/1 17/1"));
        assert!(!file.contains("Exif.Image.0x8769"));
    }

    #[test]
    fn open_rejects_gif() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("anim.gif");
        fs::write(&path, b"GIF89a").unwrap();
        let err = ExifFile::open(&path).unwrap_err();
        assert!(err.to_string().contains("GIF"));
    }

    #[test]
    fn open_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"hello").unwrap();
        assert!(ExifFile::open(&path).is_err());
    }

    #[test]
    fn open_rejects_garbage_tiff() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.tif");
        fs::write(&path, b"II*\0garbage").unwrap();
        assert!(ExifFile::open(&path).is_err());
    }

    #[test]
    fn open_jpeg_without_exif_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        fs::write(&path, bare_jpeg()).unwrap();

        let file = ExifFile::open(&path).unwrap();
        assert!(file.keys().is_empty());
    }

    // ── edits ───────────────────────────────────────────────────────

    #[test]
    fn set_unknown_tag_fails() {
        let dir = TempDir::new().unwrap();
        let mut file = ExifFile::open(&tiff_file(&dir)).unwrap();
        assert!(file.set("Exif.Image.Bogus", "x").is_err());
        assert!(file.set("Exif.Image.0xabcd", "x").is_err());
        assert!(file.set("Exif.Image.StripOffsets", "8").is_err());
        assert!(!file.is_dirty());
    }

    #[test]
    fn check_matches_set() {
        let dir = TempDir::new().unwrap();
        let mut file = ExifFile::open(&tiff_file(&dir)).unwrap();

        assert!(file.check("Exif.Image.Model", "EOS 5D").is_ok());
        assert!(file.check(LATITUDE_TAG, "N").is_err());
        assert!(file.set(LATITUDE_TAG, "N").is_err());
        assert!(!file.is_dirty());
    }

    #[test]
    fn delete_reports_absence() {
        let dir = TempDir::new().unwrap();
        let mut file = ExifFile::open(&tiff_file(&dir)).unwrap();
        assert_eq!(file.delete("Exif.Image.Artist"), Removal::NotPresent);
        assert_eq!(file.delete("Exif.Image.Make"), Removal::Removed);
        assert_eq!(file.delete("Exif.Image.Make"), Removal::NotPresent);
        assert!(file.is_dirty());
    }

    #[test]
    fn clean_flush_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = tiff_file(&dir);
        let before = fs::read(&path).unwrap();

        let mut file = ExifFile::open(&path).unwrap();
        file.flush().unwrap();
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn tiff_edits_persist_after_reopen() {
        let dir = TempDir::new().unwrap();
        let path = tiff_file(&dir);

        let mut file = ExifFile::open(&path).unwrap();
        file.set("Exif.Image.Model", "EOS 5D").unwrap();
        file.delete("Exif.GPSInfo.GPSLatitude");
        file.delete("Exif.GPSInfo.GPSLatitudeRef");
        file.flush().unwrap();
        assert!(!file.is_dirty());

        let reopened = ExifFile::open(&path).unwrap();
        assert_eq!(reopened.get("Exif.Image.Model").as_deref(), Some("EOS 5D"));
        assert_eq!(reopened.get("Exif.Image.Make").as_deref(), Some("Canon"));
        assert!(!reopened.keys().iter().any(|k| k.starts_with("Exif.GPSInfo")));
    }

    #[test]
    fn deleted_values_leave_no_bytes_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("owner.tif");
        fs::write(&path, tiff(&[ascii(Tag::Make, "Canon"), ascii(Tag::Artist, "Jane Q. Public")])).unwrap();

        let mut file = ExifFile::open(&path).unwrap();
        file.delete("Exif.Image.Artist");
        file.flush().unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(!bytes.windows(4).any(|w| w == b"Jane"));
        assert_eq!(ExifFile::open(&path).unwrap().keys(), vec!["Exif.Image.Make"]);
    }

    #[test]
    fn strips_survive_a_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pixels.tif");
        let pixels: &[u8] = &[0xDE, 0xAD, 0xBE, 0xEF];
        let make = ascii(Tag::Make, "Canon");
        let artist = ascii(Tag::Artist, "Jane");
        let strips = [pixels];
        let mut writer = Writer::new();
        writer.push_field(&make);
        writer.push_field(&artist);
        writer.set_strips(&strips, In::PRIMARY);
        let mut out = Cursor::new(Vec::new());
        writer.write(&mut out, false).unwrap();
        fs::write(&path, out.into_inner()).unwrap();

        let mut file = ExifFile::open(&path).unwrap();
        assert!(!file.little_endian);
        file.delete("Exif.Image.Artist");
        file.flush().unwrap();

        let reopened = ExifFile::open(&path).unwrap();
        assert!(!reopened.little_endian);
        let images = reopened.image_data().unwrap();
        assert!(matches!(images.as_slice(), [(ifd, ImageData::Strips(s))] if *ifd == In::PRIMARY && s == &[pixels]));
    }

    #[test]
    fn geotags_written_through_file_read_back() {
        let dir = TempDir::new().unwrap();
        let path = tiff_file(&dir);
        let info = GeotagInfo {
            latitude: Some(-33.8568),
            longitude: Some(151.2153),
            altitude: Some(-12.5),
            time: None,
        };

        let mut file = ExifFile::open(&path).unwrap();
        geotag::write_geotag_info(&mut file, &info).unwrap();
        file.flush().unwrap();

        let reopened = ExifFile::open(&path).unwrap();
        let read = geotag::read_geotag_info(&reopened).unwrap();
        assert!((read.latitude.unwrap() + 33.8568).abs() < 1e-6);
        assert!((read.longitude.unwrap() - 151.2153).abs() < 1e-6);
        assert!((read.altitude.unwrap() + 12.5).abs() < 1e-6);
        assert_eq!(reopened.get("Exif.GPSInfo.GPSAltitudeRef").as_deref(), Some("0"));
    }

    #[test]
    fn random_coordinates_all_fit() {
        let dir = TempDir::new().unwrap();
        let path = tiff_file(&dir);
        let mut file = ExifFile::open(&path).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let info = GeotagInfo {
                latitude: Some(rng.random_range(-180.0..180.0)),
                longitude: Some(rng.random_range(-180.0..180.0)),
                altitude: Some(rng.random_range(-200.0..3200.0)),
                time: None,
            };
            geotag::write_geotag_info(&mut file, &info)
                .unwrap_or_else(|e| panic!("{info:?}: {e:#}"));
            let read = geotag::read_geotag_info(&file).unwrap();
            assert!((read.latitude.unwrap() - info.latitude.unwrap()).abs() < 1e-6);
            assert!((read.longitude.unwrap() - info.longitude.unwrap()).abs() < 1e-6);
        }

        file.flush().unwrap();
        assert!(geotag::read_geotag_info(&ExifFile::open(&path).unwrap()).is_ok());
    }

    #[test]
    fn rejected_gps_value_leaves_group_intact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("odd.tif");
        // Longitude stored as SHORT cannot take a rational DMS triple.
        let mut fields = sample_fields();
        fields.push(ascii(Tag::GPSLongitudeRef, "E"));
        fields.push(Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![13, 24, 36]),
        });
        fs::write(&path, tiff(&fields)).unwrap();

        let mut file = ExifFile::open(&path).unwrap();
        let info = GeotagInfo {
            latitude: Some(1.0),
            longitude: Some(151.2153),
            altitude: Some(5.0),
            time: None,
        };
        assert!(geotag::write_geotag_info(&mut file, &info).is_err());
        assert_eq!(file.get(LATITUDE_TAG).as_deref(), Some("84/1 23/1 17/1"));
        assert_eq!(file.get(LONGITUDE_TAG).as_deref(), Some("13 24 36"));
        assert!(!file.contains("Exif.GPSInfo.GPSAltitude"));
        assert!(!file.is_dirty());
    }

    // ── containers ──────────────────────────────────────────────────

    #[test]
    fn jpeg_gains_and_loses_exif() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        fs::write(&path, bare_jpeg()).unwrap();

        let mut file = ExifFile::open(&path).unwrap();
        file.set("Exif.Image.Make", "Canon").unwrap();
        file.set("Exif.GPSInfo.GPSLatitudeRef", "S").unwrap();
        file.flush().unwrap();

        let bytes = fs::read(&path).unwrap();
        let jpeg = Jpeg::from_bytes(Bytes::from(bytes)).unwrap();
        // After APP0, ahead of the comments.
        assert_eq!(find_exif_segment_pos(&jpeg), Some(1));

        let mut reopened = ExifFile::open(&path).unwrap();
        assert_eq!(reopened.get("Exif.Image.Make").as_deref(), Some("Canon"));
        assert_eq!(reopened.get("Exif.GPSInfo.GPSLatitudeRef").as_deref(), Some("S"));

        reopened.delete("Exif.Image.Make");
        reopened.delete("Exif.GPSInfo.GPSLatitudeRef");
        reopened.flush().unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(!bytes.windows(6).any(|w| w == EXIF_PREFIX));
        assert!(ExifFile::open(&path).unwrap().keys().is_empty());
    }

    #[test]
    fn jpeg_with_a_single_segment_gains_exif() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.jpg");
        fs::write(&path, scan_only_jpeg()).unwrap();

        let mut file = ExifFile::open(&path).unwrap();
        file.set("Exif.Image.Make", "Canon").unwrap();
        file.flush().unwrap();

        let bytes = fs::read(&path).unwrap();
        let jpeg = Jpeg::from_bytes(Bytes::from(bytes)).unwrap();
        assert_eq!(find_exif_segment_pos(&jpeg), Some(0));
        assert_eq!(
            ExifFile::open(&path).unwrap().get("Exif.Image.Make").as_deref(),
            Some("Canon")
        );
    }

    #[test]
    fn flush_to_leaves_source_alone() {
        let dir = TempDir::new().unwrap();
        let path = tiff_file(&dir);
        let before = fs::read(&path).unwrap();
        let copy = dir.path().join("copy.tif");

        let mut file = ExifFile::open(&path).unwrap();
        file.delete(LATITUDE_TAG);
        file.flush_to(&copy).unwrap();

        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(!ExifFile::open(&copy).unwrap().contains(LATITUDE_TAG));
        assert!(ExifFile::open(&path).unwrap().contains(LATITUDE_TAG));
    }

    #[test]
    fn flush_to_copies_when_clean() {
        let dir = TempDir::new().unwrap();
        let path = tiff_file(&dir);
        let copy = dir.path().join("copy.tif");

        let mut file = ExifFile::open(&path).unwrap();
        file.flush_to(&copy).unwrap();
        assert_eq!(fs::read(&copy).unwrap(), fs::read(&path).unwrap());
    }
}
