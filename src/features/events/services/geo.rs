//! Great-circle helpers for nearby-event discovery.

use crate::shared::constants::EARTH_RADIUS_KM;

/// Padding added to bounding boxes so float rounding never excludes a
/// point that sits exactly on the radius
const BOX_PADDING_DEG: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine distance between two points in kilometres
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    // Rounding can push `a` past 1 for near-antipodal points
    let a = ((delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance from the requester to an event, if both sides have coordinates
pub fn distance_between(origin: Option<GeoPoint>, target: Option<GeoPoint>) -> Option<f64> {
    match (origin, target) {
        (Some(from), Some(to)) => Some(haversine_km(from, to)),
        _ => None,
    }
}

/// Lat/lng rectangle that fully contains a search circle.
///
/// Used as a store-side pre-filter only; the haversine check stays
/// authoritative. `lng` is `None` when the circle covers a pole or wraps
/// the antimeridian, in which case longitude is left unconstrained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub lng: Option<(f64, f64)>,
}

impl BoundingBox {
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let angular = radius_km / EARTH_RADIUS_KM;
        let lat_delta = angular.to_degrees() + BOX_PADDING_DEG;

        let min_lat = center.lat - lat_delta;
        let max_lat = center.lat + lat_delta;

        if min_lat <= -90.0 || max_lat >= 90.0 {
            return Self {
                min_lat: min_lat.max(-90.0),
                max_lat: max_lat.min(90.0),
                lng: None,
            };
        }

        let ratio = angular.sin() / center.lat.to_radians().cos();
        let lng = if ratio >= 1.0 {
            None
        } else {
            let lng_delta = ratio.asin().to_degrees() + BOX_PADDING_DEG;
            let (min_lng, max_lng) = (center.lng - lng_delta, center.lng + lng_delta);
            (min_lng >= -180.0 && max_lng <= 180.0).then_some((min_lng, max_lng))
        };

        Self {
            min_lat,
            max_lat,
            lng,
        }
    }

    /// Mirrors the store-side `BETWEEN` predicate
    #[cfg(test)]
    pub fn contains(&self, point: GeoPoint) -> bool {
        let lat_ok = point.lat >= self.min_lat && point.lat <= self.max_lat;
        let lng_ok = self
            .lng
            .is_none_or(|(min, max)| point.lng >= min && point.lng <= max);
        lat_ok && lng_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONAS: GeoPoint = GeoPoint {
        lat: -6.1754,
        lng: 106.8272,
    };

    #[test]
    fn test_haversine_jakarta_to_bandung() {
        let jakarta = GeoPoint::new(-6.2088, 106.8456);
        let bandung = GeoPoint::new(-6.9175, 107.6191);

        let distance = haversine_km(jakarta, bandung);

        assert!(distance > 110.0 && distance < 125.0, "got {distance}");
    }

    #[test]
    fn test_haversine_same_point() {
        assert!(haversine_km(MONAS, MONAS) < 1e-9);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = GeoPoint::new(-6.2, 106.816);
        let b = GeoPoint::new(-6.3, 106.9);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        // 2 * pi * 6371 / 360
        assert!((d - 111.194_926_6).abs() < 1e-3, "got {d}");
    }

    #[test]
    fn test_antipodal_points_have_finite_distance() {
        // Half the circumference: pi * 6371
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;

        let mut lat = -40.0;
        while lat <= 42.0 {
            for k in 0..200 {
                let to = GeoPoint::new(-lat, 180.0 - k as f64 * 1e-9);
                let d = haversine_km(GeoPoint::new(lat, 0.0), to);
                assert!(d.is_finite(), "non-finite distance for lat {lat}, k {k}");
                assert!((d - half_circumference).abs() < 0.01, "got {d} for lat {lat}");
            }
            lat += 0.0537;
        }
    }

    #[test]
    fn test_distance_requires_both_points() {
        assert_eq!(distance_between(None, Some(MONAS)), None);
        assert_eq!(distance_between(Some(MONAS), None), None);
        assert_eq!(distance_between(Some(MONAS), Some(MONAS)), Some(0.0));
    }

    #[test]
    fn test_bounding_box_contains_points_on_the_circle() {
        let radius = 5.0;
        let bbox = BoundingBox::around(MONAS, radius);
        assert!(bbox.lng.is_some());

        for bearing_deg in (0..360).step_by(15) {
            let point = destination(MONAS, f64::from(bearing_deg), radius * 0.999_999);
            assert!(
                bbox.contains(point),
                "bearing {bearing_deg} point {point:?} outside {bbox:?}"
            );
        }
    }

    #[test]
    fn test_bounding_box_excludes_far_points() {
        let bbox = BoundingBox::around(MONAS, 5.0);
        let bandung = GeoPoint::new(-6.9175, 107.6191);
        assert!(!bbox.contains(bandung));
    }

    #[test]
    fn test_bounding_box_near_pole_drops_longitude() {
        let bbox = BoundingBox::around(GeoPoint::new(89.99, 10.0), 50.0);
        assert_eq!(bbox.lng, None);
        assert_eq!(bbox.max_lat, 90.0);
    }

    #[test]
    fn test_bounding_box_across_antimeridian_drops_longitude() {
        let bbox = BoundingBox::around(GeoPoint::new(-17.7, 179.99), 20.0);
        assert_eq!(bbox.lng, None);
        assert!(bbox.contains(GeoPoint::new(-17.7, -179.99)));
    }

    /// Point reached by travelling `distance_km` from `start` on `bearing_deg`
    fn destination(start: GeoPoint, bearing_deg: f64, distance_km: f64) -> GeoPoint {
        let angular = distance_km / EARTH_RADIUS_KM;
        let bearing = bearing_deg.to_radians();
        let lat1 = start.lat.to_radians();
        let lng1 = start.lng.to_radians();

        let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lng2 = lng1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(lat2.to_degrees(), lng2.to_degrees())
    }
}
