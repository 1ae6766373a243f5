//! Decoy geodata used by the `randomize` method.
//!
//! Values only need to look plausible; the thread RNG is not meant to make
//! them unguessable.

use rand::Rng;

use crate::geotag::GeotagInfo;

/// Range for decoy latitude and longitude, in decimal degrees.
pub const COORDINATE_RANGE: (f64, f64) = (-180.0, 180.0);
/// Range for decoy altitude, in metres. Covers below-sea-level basins to high terrain.
pub const ALTITUDE_RANGE: (f64, f64) = (-200.0, 3200.0);

/// Random coordinates, altitude and a capture time before now.
pub fn generate_fake_geodata() -> GeotagInfo {
    let now = chrono::Utc::now().timestamp();
    generate_fake_geodata_with(&mut rand::rng(), now)
}

/// Same as [`generate_fake_geodata`] with an explicit RNG and clock.
///
/// `time` is drawn from `[0, now)`; it is left unset if `now` is not positive.
pub fn generate_fake_geodata_with<R: Rng + ?Sized>(rng: &mut R, now: i64) -> GeotagInfo {
    let (coord_lo, coord_hi) = COORDINATE_RANGE;
    let (alt_lo, alt_hi) = ALTITUDE_RANGE;

    GeotagInfo {
        latitude: Some(rng.random_range(coord_lo..=coord_hi)),
        longitude: Some(rng.random_range(coord_lo..=coord_hi)),
        altitude: Some(rng.random_range(alt_lo..=alt_hi)),
        time: (now > 0).then(|| rng.random_range(0..now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = 1_700_000_000;

        for _ in 0..1000 {
            let fake = generate_fake_geodata_with(&mut rng, now);
            let lat = fake.latitude.unwrap();
            let lon = fake.longitude.unwrap();
            let alt = fake.altitude.unwrap();
            let time = fake.time.unwrap();

            assert!((-180.0..=180.0).contains(&lat));
            assert!((-180.0..=180.0).contains(&lon));
            assert!((-200.0..=3200.0).contains(&alt));
            assert!((0..now).contains(&time));
        }
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let a = generate_fake_geodata_with(&mut StdRng::seed_from_u64(42), 1_000_000);
        let b = generate_fake_geodata_with(&mut StdRng::seed_from_u64(42), 1_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn time_before_wall_clock() {
        let fake = generate_fake_geodata();
        let after = chrono::Utc::now().timestamp();
        let time = fake.time.unwrap();
        assert!(time >= 0 && time < after);
    }

    #[test]
    fn no_time_without_a_past() {
        let fake = generate_fake_geodata_with(&mut StdRng::seed_from_u64(1), 0);
        assert!(fake.time.is_none());
        assert!(fake.latitude.is_some());
    }
}
