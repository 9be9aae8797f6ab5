/// Scale `v` to unit L2 norm in place and return the original norm.
///
/// A zero (or non-finite) vector has no direction and is left untouched.
pub fn l2_normalize(v: &mut [f32]) -> f32 {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        for x in v.iter_mut() { *x /= norm; }
    }
    norm
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
