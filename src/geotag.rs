//! Reading, writing and scrubbing geotag information through a [`MetadataStore`].

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConvertError;
use crate::fake::generate_fake_geodata_with;
use crate::geo::{
    Direction, altitude_to_exif, decimal_to_dms, dms_to_decimal, parse_altitude, parse_reference,
};
use crate::store::MetadataStore;
use crate::tags::TagSets;

pub const LATITUDE_TAG: &str = "Exif.GPSInfo.GPSLatitude";
pub const LATITUDE_REF_TAG: &str = "Exif.GPSInfo.GPSLatitudeRef";
pub const LONGITUDE_TAG: &str = "Exif.GPSInfo.GPSLongitude";
pub const LONGITUDE_REF_TAG: &str = "Exif.GPSInfo.GPSLongitudeRef";
pub const ALTITUDE_TAG: &str = "Exif.GPSInfo.GPSAltitude";
pub const ALTITUDE_REF_TAG: &str = "Exif.GPSInfo.GPSAltitudeRef";
pub const GPS_DATE_TAG: &str = "Exif.GPSInfo.GPSDateStamp";

/// Capture-time tags rewritten when a time is supplied.
pub const CAPTURE_TIME_TAGS: [&str; 3] = [
    "Exif.Image.DateTime",
    "Exif.Photo.DateTimeDigitized",
    "Exif.Photo.DateTimeOriginal",
];

/// Lookup order when reading a capture time back.
const CAPTURE_TIME_PRIORITY: [&str; 3] = [
    "Exif.Photo.DateTimeOriginal",
    "Exif.Photo.DateTimeDigitized",
    "Exif.Image.DateTime",
];

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d";

/// Geotag fields of one image. Absent fields are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeotagInfo {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    /// Capture time as UNIX seconds (UTC).
    pub time: Option<i64>,
}

impl GeotagInfo {
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none()
            && self.longitude.is_none()
            && self.altitude.is_none()
            && self.time.is_none()
    }
}

/// How unsafe metadata is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Delete unsafe tags outright.
    Remove,
    /// Replace location and time with decoys, delete the remaining unsafe tags.
    #[default]
    Randomize,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remove => f.write_str("remove"),
            Self::Randomize => f.write_str("randomize"),
        }
    }
}

/// What [`anonymize`] did to a store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnonymizeReport {
    pub removed: Vec<String>,
    pub written: Vec<String>,
    pub decoy: Option<GeotagInfo>,
}

/// Extract latitude, longitude, altitude and capture time from `store`.
///
/// Missing tags leave the corresponding field empty. Malformed coordinate or
/// altitude values are errors.
pub fn read_geotag_info(store: &dyn MetadataStore) -> Result<GeotagInfo, ConvertError> {
    let mut info = GeotagInfo::default();

    if store.contains(LATITUDE_TAG) && store.contains(LONGITUDE_TAG) {
        info.latitude = Some(read_coordinate(store, LATITUDE_TAG, LATITUDE_REF_TAG)?);
        info.longitude = Some(read_coordinate(store, LONGITUDE_TAG, LONGITUDE_REF_TAG)?);
    }

    if let Some(altitude) = store.get(ALTITUDE_TAG) {
        // No reference tag reads as "above".
        let reference = store
            .get(ALTITUDE_REF_TAG)
            .map(|r| parse_reference(&r))
            .transpose()?
            .unwrap_or(1);
        info.altitude = Some(parse_altitude(&altitude, reference)?);
    }

    info.time = CAPTURE_TIME_PRIORITY.iter().find_map(|tag| {
        let value = store.get(tag)?;
        match NaiveDateTime::parse_from_str(value.trim(), EXIF_DATETIME_FORMAT) {
            Ok(dt) => Some(dt.and_utc().timestamp()),
            Err(_) => {
                log::debug!("Ignoring unparsable {tag}: {value:?}");
                None
            }
        }
    });

    Ok(info)
}

fn read_coordinate(
    store: &dyn MetadataStore,
    tag: &str,
    ref_tag: &str,
) -> Result<f64, ConvertError> {
    let value = store.get(tag).unwrap_or_default();
    let reference = store.get(ref_tag).unwrap_or_default();
    dms_to_decimal(&format!("{value} {reference}"))
}

/// Write `info` into `store`. Returns the tags that were set.
///
/// Capture-time tags are only rewritten where they already exist. The six GPS
/// position tags are written together, and only when latitude, longitude and
/// altitude are all present. The write is all or nothing: every value is
/// checked first, and if the store still refuses one, the tags already set
/// get their previous values back. The store is not flushed.
pub fn write_geotag_info(store: &mut dyn MetadataStore, info: &GeotagInfo) -> Result<Vec<String>> {
    let mut plan: Vec<(&str, String)> = Vec::new();

    if let Some(time) = info.time {
        let dt = DateTime::from_timestamp(time, 0)
            .with_context(|| format!("Timestamp {time} is out of range"))?;
        let stamp = dt.format(EXIF_DATETIME_FORMAT).to_string();

        for tag in CAPTURE_TIME_TAGS {
            if store.contains(tag) {
                plan.push((tag, stamp.clone()));
            }
        }
        if store.contains(GPS_DATE_TAG) {
            plan.push((GPS_DATE_TAG, dt.format(EXIF_DATE_FORMAT).to_string()));
        }
    }

    if let (Some(lat), Some(lon), Some(alt)) = (info.latitude, info.longitude, info.altitude) {
        let (alt_magnitude, alt_ref) = altitude_to_exif(alt)?;
        plan.extend([
            (LATITUDE_TAG, decimal_to_dms(lat)?.to_string()),
            (LATITUDE_REF_TAG, Direction::for_latitude(lat).to_string()),
            (LONGITUDE_TAG, decimal_to_dms(lon)?.to_string()),
            (LONGITUDE_REF_TAG, Direction::for_longitude(lon).to_string()),
            (ALTITUDE_TAG, alt_magnitude.to_string()),
            (ALTITUDE_REF_TAG, alt_ref.to_string()),
        ]);
    }

    for (tag, value) in &plan {
        store
            .check(tag, value)
            .with_context(|| format!("Cannot write {value:?} to {tag}"))?;
    }

    let prior: Vec<Option<String>> = plan.iter().map(|(tag, _)| store.get(tag)).collect();
    for (i, (tag, value)) in plan.iter().enumerate() {
        if let Err(err) = store.set(tag, value) {
            restore(store, &plan[..i], &prior[..i]);
            return Err(err.context(format!("Failed to write {tag}")));
        }
    }

    if let (Some(lat), Some(lon), Some(alt)) = (info.latitude, info.longitude, info.altitude) {
        log::debug!("  GPS set to {lat:.6}, {lon:.6} at {alt:.1} m");
    }
    Ok(plan.into_iter().map(|(tag, _)| tag.to_string()).collect())
}

/// Put back the values `tags` had before a failed write.
fn restore(store: &mut dyn MetadataStore, tags: &[(&str, String)], prior: &[Option<String>]) {
    for ((tag, _), old) in tags.iter().zip(prior) {
        match old {
            Some(value) => {
                if let Err(err) = store.set(tag, value) {
                    log::warn!("Could not restore {tag}: {err:#}");
                }
            }
            None => {
                store.delete(tag);
            }
        }
    }
}

/// Scrub `store` according to `method`. The store is not flushed.
///
/// `Randomize` writes decoy geodata first and then removes every other unsafe
/// tag, so the decoys survive even though their tags are classified unsafe.
pub fn anonymize<R: Rng + ?Sized>(
    store: &mut dyn MetadataStore,
    tags: &TagSets,
    method: Method,
    rng: &mut R,
    now: i64,
) -> Result<AnonymizeReport> {
    let mut report = AnonymizeReport::default();

    match method {
        Method::Remove => {
            report.removed = tags.remove_unsafe_tags(store);
        }
        Method::Randomize => {
            let decoy = generate_fake_geodata_with(rng, now);
            report.written = write_geotag_info(store, &decoy)?;
            report.removed = tags.remove_unsafe_tags_retaining(store, &report.written);
            report.decoy = Some(decoy);
        }
    }

    Ok(report)
}
