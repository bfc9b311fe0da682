//! Geographic helpers shared by requesters and tasks.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`, following
//! `geo`'s convention. Serialised payloads spell them out as
//! `{ "latitude": .., "longitude": .. }`.

use geo::{Coord, Distance, Haversine, Point};

const METRES_PER_KILOMETRE: f64 = 1_000.0;

/// Build a coordinate from latitude and longitude in degrees.
///
/// # Examples
/// ```
/// use helpmatch_core::lat_lon;
///
/// let coord = lat_lon(51.5, -0.1);
/// assert_eq!(coord.x, -0.1);
/// assert_eq!(coord.y, 51.5);
/// ```
#[must_use]
pub const fn lat_lon(latitude: f64, longitude: f64) -> Coord<f64> {
    Coord {
        x: longitude,
        y: latitude,
    }
}

/// Great-circle distance between two coordinates, in kilometres.
///
/// # Examples
/// ```
/// use helpmatch_core::{distance_km, lat_lon};
///
/// let here = lat_lon(51.5, -0.1);
/// assert_eq!(distance_km(here, here), 0.0);
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "haversine distances are reported in metres and scaled to kilometres"
)]
#[must_use]
pub fn distance_km(from: Coord<f64>, to: Coord<f64>) -> f64 {
    Haversine.distance(Point::from(from), Point::from(to)) / METRES_PER_KILOMETRE
}

#[cfg(feature = "serde")]
pub(crate) mod lat_lon_serde {
    //! `serde(with)` adapter writing optional coordinates as latitude/longitude
    //! objects.

    use geo::Coord;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct LatLon {
        latitude: f64,
        longitude: f64,
    }

    pub(crate) fn serialize<S>(value: &Option<Coord<f64>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value
            .map(|coord| LatLon {
                latitude: coord.y,
                longitude: coord.x,
            })
            .serialize(serializer)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Coord<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<LatLon>::deserialize(deserializer)?;
        Ok(raw.map(|point| super::lat_lon(point.latitude, point.longitude)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[expect(
        clippy::float_arithmetic,
        reason = "tests compare floating point distances"
    )]
    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        let delta = (actual - expected).abs();
        assert!(
            delta <= tolerance,
            "expected {expected} km, got {actual} km (|Δ| = {delta})"
        );
    }

    #[rstest]
    fn lat_lon_maps_axes() {
        let coord = lat_lon(10.0, 20.0);
        assert_eq!(coord, Coord { x: 20.0, y: 10.0 });
    }

    #[rstest]
    fn one_degree_of_latitude_is_about_111_km() {
        let distance = distance_km(lat_lon(0.0, 0.0), lat_lon(1.0, 0.0));
        assert_close(distance, 111.2, 0.5);
    }

    #[rstest]
    fn london_to_paris_is_about_344_km() {
        let london = lat_lon(51.5074, -0.1278);
        let paris = lat_lon(48.8566, 2.3522);
        assert_close(distance_km(london, paris), 343.5, 2.0);
    }
}
