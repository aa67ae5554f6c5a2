// CV ↔ job matching: embed, cosine similarity, boost, rank.
// The only component with real internal logic; everything around it is a provider call.

pub mod matcher;
pub mod scoring;
pub mod similarity;

pub use matcher::{MatchError, MatchResult, Matcher};
