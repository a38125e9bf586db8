// Interview templates: CRUD, AI question generation and context-document intake.

pub mod documents;
pub mod handlers;
pub mod prompts;
pub mod questions;
pub mod service;
