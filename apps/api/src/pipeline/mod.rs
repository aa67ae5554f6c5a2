// CV pipeline: LLM advice, the end-to-end analysis flow, and the HTTP handlers for both.

pub mod advice;
pub mod analyze;
pub mod handlers;
