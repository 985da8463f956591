use std::f64::consts::PI;

/// Sine altitude profile: `base + amplitude·sin`, `cycles` full periods over `length` samples.
pub fn altitude_wave(length: usize, base: f64, amplitude: f64, cycles: f64) -> Vec<f64> {
    (0..length)
        .map(|i| base + amplitude * ((i as f64 * cycles) / length as f64 * 2.0 * PI).sin())
        .collect()
}

/// Linear battery discharge from `full` to `empty` volts.
pub fn battery_drain(length: usize, full: f64, empty: f64) -> Vec<f64> {
    match length {
        0 => Vec::new(),
        1 => vec![full],
        _ => (0..length)
            .map(|i| full + (empty - full) * i as f64 / (length - 1) as f64)
            .collect(),
    }
}
