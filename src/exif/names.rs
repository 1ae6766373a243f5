//! Exiv2-style tag names (`Exif.Image.Make`, `Exif.GPSInfo.GPSLatitude`, ...).
//!
//! Keys map onto `kamadak-exif` [`Tag`]s: the group picks the [`Context`] and
//! the short name picks the tag number.

use exif::{Context, Tag};

use super::value::Format;

/// The IFD a tag lives in, named by its key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    /// IFD0
    Image,
    /// Exif sub-IFD
    Photo,
    /// GPS sub-IFD
    GpsInfo,
    /// Interoperability sub-IFD
    Iop,
}

impl Group {
    pub const ALL: [Group; 4] = [Group::Image, Group::Photo, Group::GpsInfo, Group::Iop];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Image => "Exif.Image",
            Self::Photo => "Exif.Photo",
            Self::GpsInfo => "Exif.GPSInfo",
            Self::Iop => "Exif.Iop",
        }
    }

    pub fn context(self) -> Context {
        match self {
            Self::Image => Context::Tiff,
            Self::Photo => Context::Exif,
            Self::GpsInfo => Context::Gps,
            Self::Iop => Context::Interop,
        }
    }

    pub fn of(context: Context) -> Self {
        match context {
            Context::Tiff => Self::Image,
            Context::Exif => Self::Photo,
            Context::Gps => Self::GpsInfo,
            Context::Interop => Self::Iop,
            other => unreachable!("unsupported EXIF context {other:?}"),
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.prefix() == prefix)
    }
}

/// Tags the writer lays out itself: sub-IFD pointers and the offsets of image
/// data and thumbnails. They never show up as keys.
const MANAGED: [Tag; 9] = [
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
    Tag::StripOffsets,
    Tag::StripByteCounts,
    Tag::TileOffsets,
    Tag::TileByteCounts,
    Tag::JPEGInterchangeFormat,
    Tag::JPEGInterchangeFormatLength,
];

struct TagDef {
    group: Group,
    id: u16,
    name: &'static str,
    format: Format,
}

const fn def(group: Group, id: u16, name: &'static str, format: Format) -> TagDef {
    TagDef { group, id, name, format }
}

use Format::{Ascii, Byte, Long, Rational, SRational, Short, Undefined};
use Group::{GpsInfo, Image, Iop, Photo};

#[rustfmt::skip]
const TAGS: &[TagDef] = &[
    def(Image, 0x0100, "ImageWidth", Long),
    def(Image, 0x0101, "ImageLength", Long),
    def(Image, 0x0102, "BitsPerSample", Short),
    def(Image, 0x0103, "Compression", Short),
    def(Image, 0x0106, "PhotometricInterpretation", Short),
    def(Image, 0x010E, "ImageDescription", Ascii),
    def(Image, 0x010F, "Make", Ascii),
    def(Image, 0x0110, "Model", Ascii),
    def(Image, 0x0111, "StripOffsets", Long),
    def(Image, 0x0112, "Orientation", Short),
    def(Image, 0x0115, "SamplesPerPixel", Short),
    def(Image, 0x0116, "RowsPerStrip", Long),
    def(Image, 0x0117, "StripByteCounts", Long),
    def(Image, 0x011A, "XResolution", Rational),
    def(Image, 0x011B, "YResolution", Rational),
    def(Image, 0x011C, "PlanarConfiguration", Short),
    def(Image, 0x0128, "ResolutionUnit", Short),
    def(Image, 0x0131, "Software", Ascii),
    def(Image, 0x0132, "DateTime", Ascii),
    def(Image, 0x013B, "Artist", Ascii),
    def(Image, 0x013C, "HostComputer", Ascii),
    def(Image, 0x0213, "YCbCrPositioning", Short),
    def(Image, 0x8298, "Copyright", Ascii),
    def(Image, 0xC62F, "CameraSerialNumber", Ascii),

    def(Photo, 0x829A, "ExposureTime", Rational),
    def(Photo, 0x829D, "FNumber", Rational),
    def(Photo, 0x8822, "ExposureProgram", Short),
    def(Photo, 0x8827, "ISOSpeedRatings", Short),
    def(Photo, 0x9000, "ExifVersion", Undefined),
    def(Photo, 0x9003, "DateTimeOriginal", Ascii),
    def(Photo, 0x9004, "DateTimeDigitized", Ascii),
    def(Photo, 0x9010, "OffsetTime", Ascii),
    def(Photo, 0x9011, "OffsetTimeOriginal", Ascii),
    def(Photo, 0x9012, "OffsetTimeDigitized", Ascii),
    def(Photo, 0x9101, "ComponentsConfiguration", Undefined),
    def(Photo, 0x9201, "ShutterSpeedValue", SRational),
    def(Photo, 0x9202, "ApertureValue", Rational),
    def(Photo, 0x9203, "BrightnessValue", SRational),
    def(Photo, 0x9204, "ExposureBiasValue", SRational),
    def(Photo, 0x9205, "MaxApertureValue", Rational),
    def(Photo, 0x9207, "MeteringMode", Short),
    def(Photo, 0x9208, "LightSource", Short),
    def(Photo, 0x9209, "Flash", Short),
    def(Photo, 0x920A, "FocalLength", Rational),
    def(Photo, 0x927C, "MakerNote", Undefined),
    def(Photo, 0x9286, "UserComment", Undefined),
    def(Photo, 0x9290, "SubSecTime", Ascii),
    def(Photo, 0x9291, "SubSecTimeOriginal", Ascii),
    def(Photo, 0x9292, "SubSecTimeDigitized", Ascii),
    def(Photo, 0xA000, "FlashpixVersion", Undefined),
    def(Photo, 0xA001, "ColorSpace", Short),
    def(Photo, 0xA002, "PixelXDimension", Long),
    def(Photo, 0xA003, "PixelYDimension", Long),
    def(Photo, 0xA217, "SensingMethod", Short),
    def(Photo, 0xA301, "SceneType", Undefined),
    def(Photo, 0xA401, "CustomRendered", Short),
    def(Photo, 0xA402, "ExposureMode", Short),
    def(Photo, 0xA403, "WhiteBalance", Short),
    def(Photo, 0xA404, "DigitalZoomRatio", Rational),
    def(Photo, 0xA405, "FocalLengthIn35mmFilm", Short),
    def(Photo, 0xA406, "SceneCaptureType", Short),
    def(Photo, 0xA408, "Contrast", Short),
    def(Photo, 0xA409, "Saturation", Short),
    def(Photo, 0xA40A, "Sharpness", Short),
    def(Photo, 0xA40C, "SubjectDistanceRange", Short),
    def(Photo, 0xA420, "ImageUniqueID", Ascii),
    def(Photo, 0xA430, "CameraOwnerName", Ascii),
    def(Photo, 0xA431, "BodySerialNumber", Ascii),
    def(Photo, 0xA432, "LensSpecification", Rational),
    def(Photo, 0xA433, "LensMake", Ascii),
    def(Photo, 0xA434, "LensModel", Ascii),
    def(Photo, 0xA435, "LensSerialNumber", Ascii),

    def(GpsInfo, 0x0000, "GPSVersionID", Byte),
    def(GpsInfo, 0x0001, "GPSLatitudeRef", Ascii),
    def(GpsInfo, 0x0002, "GPSLatitude", Rational),
    def(GpsInfo, 0x0003, "GPSLongitudeRef", Ascii),
    def(GpsInfo, 0x0004, "GPSLongitude", Rational),
    def(GpsInfo, 0x0005, "GPSAltitudeRef", Byte),
    def(GpsInfo, 0x0006, "GPSAltitude", Rational),
    def(GpsInfo, 0x0007, "GPSTimeStamp", Rational),
    def(GpsInfo, 0x0008, "GPSSatellites", Ascii),
    def(GpsInfo, 0x0009, "GPSStatus", Ascii),
    def(GpsInfo, 0x000A, "GPSMeasureMode", Ascii),
    def(GpsInfo, 0x000B, "GPSDOP", Rational),
    def(GpsInfo, 0x000C, "GPSSpeedRef", Ascii),
    def(GpsInfo, 0x000D, "GPSSpeed", Rational),
    def(GpsInfo, 0x000E, "GPSTrackRef", Ascii),
    def(GpsInfo, 0x000F, "GPSTrack", Rational),
    def(GpsInfo, 0x0010, "GPSImgDirectionRef", Ascii),
    def(GpsInfo, 0x0011, "GPSImgDirection", Rational),
    def(GpsInfo, 0x0012, "GPSMapDatum", Ascii),
    def(GpsInfo, 0x0013, "GPSDestLatitudeRef", Ascii),
    def(GpsInfo, 0x0014, "GPSDestLatitude", Rational),
    def(GpsInfo, 0x0015, "GPSDestLongitudeRef", Ascii),
    def(GpsInfo, 0x0016, "GPSDestLongitude", Rational),
    def(GpsInfo, 0x0017, "GPSDestBearingRef", Ascii),
    def(GpsInfo, 0x0018, "GPSDestBearing", Rational),
    def(GpsInfo, 0x0019, "GPSDestDistanceRef", Ascii),
    def(GpsInfo, 0x001A, "GPSDestDistance", Rational),
    def(GpsInfo, 0x001B, "GPSProcessingMethod", Undefined),
    def(GpsInfo, 0x001C, "GPSAreaInformation", Undefined),
    def(GpsInfo, 0x001D, "GPSDateStamp", Ascii),
    def(GpsInfo, 0x001E, "GPSDifferential", Short),
    def(GpsInfo, 0x001F, "GPSHPositioningError", Rational),

    def(Iop, 0x0001, "InteroperabilityIndex", Ascii),
    def(Iop, 0x0002, "InteroperabilityVersion", Undefined),
];

/// A tag name resolved to its `kamadak-exif` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTag {
    pub tag: Tag,
    /// Format used when the tag has to be created. `None` for tags only known by id.
    pub format: Option<Format>,
}

/// Resolve `Exif.<Group>.<Name>` or `Exif.<Group>.0xNNNN`.
pub fn resolve(name: &str) -> Option<ResolvedTag> {
    let (prefix, short) = name.rsplit_once('.')?;
    let group = Group::from_prefix(prefix)?;

    if let Some(def) = TAGS.iter().find(|d| d.group == group && d.name == short) {
        return Some(ResolvedTag {
            tag: Tag(group.context(), def.id),
            format: Some(def.format),
        });
    }

    let hex = short.strip_prefix("0x")?;
    let id = u16::from_str_radix(hex, 16).ok()?;
    Some(ResolvedTag {
        tag: Tag(group.context(), id),
        format: known(group, id).map(|d| d.format),
    })
}

/// Key for a tag. Tags missing from the table take the crate's own name when
/// it has one, and render as `Exif.<Group>.0xNNNN` otherwise.
pub fn tag_name(tag: Tag) -> String {
    let group = Group::of(tag.context());
    match known(group, tag.number()) {
        Some(def) => format!("{}.{}", group.prefix(), def.name),
        None if tag.description().is_some() => format!("{}.{tag}", group.prefix()),
        None => format!("{}.0x{:04x}", group.prefix(), tag.number()),
    }
}

/// Whether `tag` is laid out by the writer rather than stored as a value.
pub fn is_managed(tag: Tag) -> bool {
    MANAGED.contains(&tag)
}

fn known(group: Group, id: u16) -> Option<&'static TagDef> {
    TAGS.iter().find(|d| d.group == group && d.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_names() {
        let lat = resolve("Exif.GPSInfo.GPSLatitude").unwrap();
        assert_eq!(lat.tag, Tag::GPSLatitude);
        assert_eq!(lat.format, Some(Format::Rational));

        let dt = resolve("Exif.Photo.DateTimeOriginal").unwrap();
        assert_eq!(dt.tag, Tag::DateTimeOriginal);
        assert_eq!(resolve("Exif.Image.Make").unwrap().tag, Tag::Make);
    }

    #[test]
    fn resolve_hex_names() {
        let tag = resolve("Exif.Image.0xabcd").unwrap();
        assert_eq!((tag.tag, tag.format), (Tag(Context::Tiff, 0xABCD), None));
        assert_eq!(resolve("Exif.Image.0x010f").unwrap().format, Some(Format::Ascii));
    }

    #[test]
    fn resolve_rejects_unknown() {
        assert!(resolve("Exif.Image.NoSuchTag").is_none());
        assert!(resolve("Xmp.dc.title").is_none());
        assert!(resolve("GPSLatitude").is_none());
    }

    #[test]
    fn names_round_trip() {
        for def in TAGS {
            let name = tag_name(Tag(def.group.context(), def.id));
            let back = resolve(&name).unwrap();
            assert_eq!(back.tag, Tag(def.group.context(), def.id), "{name}");
        }
        assert_eq!(tag_name(Tag(Context::Exif, 0x1234)), "Exif.Photo.0x1234");
    }

    #[test]
    fn groups_follow_contexts() {
        for group in Group::ALL {
            assert_eq!(Group::of(group.context()), group);
        }
        assert_eq!(tag_name(Tag::GPSLatitudeRef), "Exif.GPSInfo.GPSLatitudeRef");
    }

    #[test]
    fn layout_tags_are_managed() {
        assert!(is_managed(Tag::GPSInfoIFDPointer));
        assert!(is_managed(Tag::StripOffsets));
        assert!(!is_managed(Tag::GPSLatitude));
    }
}
