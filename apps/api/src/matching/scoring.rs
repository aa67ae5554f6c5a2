/// Converts a raw cosine similarity into the displayed match percentage.
///
/// `adjusted = min(max(raw, 0) × boost, 1) × 100`, rounded to two decimals
/// half away from zero. Negative similarity counts as no match, which keeps the
/// result inside `[0, 100]`.
pub fn adjusted_score(raw: f64, boost_factor: f64) -> f64 {
    let boosted = (raw.max(0.0) * boost_factor).min(1.0);
    round_to_hundredths(boosted * 100.0)
}

/// Rounds half away from zero (`f64::round` semantics) to two decimal places.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
