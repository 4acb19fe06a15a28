//! Great-circle distance

use shared::models::GeoPoint;

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(69.2401, 41.2995);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // Tashkent → Samarkand ≈ 266 km
        let tashkent = GeoPoint::new(69.2401, 41.2995);
        let samarkand = GeoPoint::new(66.9597, 39.6542);
        let d = haversine_km(tashkent, samarkand);
        assert!((d - 266.0).abs() < 5.0, "got {d}");
        assert!((haversine_km(samarkand, tashkent) - d).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_longitude_on_equator() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }
}
