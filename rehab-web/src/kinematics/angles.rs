//! Vertex angle calculation using dot product
//!
//! The single numerical primitive behind every joint angle: the angle at
//! vertex `b` between vectors b→a and b→c.

/// Vectors shorter than this are treated as coincident points
const MIN_MAGNITUDE: f32 = 1e-6;

/// Calculate the angle at `b` in degrees (0-180)
///
/// Uses dot product formula: cos(θ) = (v1 · v2) / (|v1| × |v2|)
///
/// Returns 0 when either vector is degenerate, never NaN.
pub fn angle_at(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    let v1 = (a.0 - b.0, a.1 - b.1);
    let v2 = (c.0 - b.0, c.1 - b.1);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;

    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if !(mag1 >= MIN_MAGNITUDE && mag2 >= MIN_MAGNITUDE) {
        return 0.0;
    }

    // Clamp: rounding can push |cos| just past 1
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);

    let degrees = cos_angle.acos().to_degrees();
    if degrees.is_finite() {
        degrees.clamp(0.0, 180.0)
    } else {
        0.0
    }
}

pub fn midpoint(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

/// Population standard deviation; 0 for an empty slice
pub fn standard_deviation(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    variance.sqrt()
}
