pub mod handlers;
pub mod service;
