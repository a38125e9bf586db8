// Candidate responses: one row per call attempt.

pub mod handlers;
pub mod service;
pub mod transcript;
