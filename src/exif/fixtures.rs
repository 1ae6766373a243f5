//! Hand-made images for tests.

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use std::io::Cursor;

pub fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

pub fn rationals(tag: Tag, parts: &[(u32, u32)]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(parts.iter().map(|&r| r.into()).collect()),
    }
}

/// Little-endian TIFF holding `fields` and no image data.
pub fn tiff(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut out = Cursor::new(Vec::new());
    writer.write(&mut out, true).unwrap();
    out.into_inner()
}

/// SOI, APP0 (JFIF), two comments, a one-component scan and EOI. No EXIF.
pub fn bare_jpeg() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    bytes.extend_from_slice(b"JFIF\0");
    bytes.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);
    for _ in 0..2 {
        bytes.extend_from_slice(&[0xFF, 0xFE, 0x00, 0x07]);
        bytes.extend_from_slice(b"hello");
    }
    bytes.extend_from_slice(&scan());
    bytes
}

/// SOI followed directly by the scan: a single segment.
pub fn scan_only_jpeg() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    bytes.extend_from_slice(&scan());
    bytes
}

/// SOS header, two bytes of entropy-coded data and EOI.
fn scan() -> Vec<u8> {
    vec![
        0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, 0x12, 0x34, 0xFF, 0xD9,
    ]
}
