// Exam-style proctoring. An external detector posts per-frame object and face landmark
// results; the rules here turn them into warnings kept per call in Redis.

pub mod board;
pub mod detection;
pub mod handlers;
