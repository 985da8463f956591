use crate::prelude::LatLng;

/// Mean Earth radius used by every spherical formula here.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Folds any angle in degrees into [0, 360).
pub fn normalize_bearing(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Folds a longitude into [-180, 180).
pub fn normalize_longitude(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0);
    if wrapped >= 360.0 {
        -180.0
    } else {
        wrapped - 180.0
    }
}

/// Great-circle distance in kilometres (haversine).
pub fn haversine_km(from: LatLng, to: LatLng) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Initial bearing from `from` towards `to`, degrees clockwise from true north.
///
/// Coincident points give `atan2(0, 0) == 0`, so the result is 0 rather than NaN.
pub fn bearing_deg(from: LatLng, to: LatLng) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();
    normalize_bearing(y.atan2(x).to_degrees())
}

/// Point reached after travelling `distance_km` along `bearing` from `origin`.
pub fn destination(origin: LatLng, distance_km: f64, bearing: f64) -> LatLng {
    let lat = origin.lat.to_radians();
    let lng = origin.lng.to_radians();
    let theta = bearing.to_radians();
    let delta = distance_km / EARTH_RADIUS_KM;

    let new_lat = (lat.sin() * delta.cos() + lat.cos() * delta.sin() * theta.cos()).asin();
    let new_lng = lng
        + (theta.sin() * delta.sin() * lat.cos()).atan2(delta.cos() - lat.sin() * new_lat.sin());

    LatLng::new(
        new_lat.to_degrees(),
        normalize_longitude(new_lng.to_degrees()),
    )
}

/// Point at `fraction` of the way along the great circle from `from` to `to`.
pub fn intermediate_point(from: LatLng, to: LatLng, fraction: f64) -> LatLng {
    let delta = haversine_km(from, to) / EARTH_RADIUS_KM;
    let sin_delta = delta.sin();
    if sin_delta.abs() < 1e-12 {
        // coincident or antipodal: no unique great circle
        return LatLng::new(
            from.lat + (to.lat - from.lat) * fraction,
            from.lng + (to.lng - from.lng) * fraction,
        );
    }

    let (lat1, lng1) = (from.lat.to_radians(), from.lng.to_radians());
    let (lat2, lng2) = (to.lat.to_radians(), to.lng.to_radians());
    let a = ((1.0 - fraction) * delta).sin() / sin_delta;
    let b = (fraction * delta).sin() / sin_delta;

    let x = a * lat1.cos() * lng1.cos() + b * lat2.cos() * lng2.cos();
    let y = a * lat1.cos() * lng1.sin() + b * lat2.cos() * lng2.sin();
    let z = a * lat1.sin() + b * lat2.sin();

    LatLng::new(
        z.atan2((x * x + y * y).sqrt()).to_degrees(),
        normalize_longitude(y.atan2(x).to_degrees()),
    )
}
