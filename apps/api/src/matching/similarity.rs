use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    #[error("cannot compare a zero-magnitude vector")]
    DivisionByZero,

    #[error("embedding dimension mismatch ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },
}

/// Cosine similarity `(a·b) / (‖a‖‖b‖)` in `[-1, 1]`, accumulated in f64.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimilarityError::DivisionByZero);
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}
