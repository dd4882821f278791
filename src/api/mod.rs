//! API module - HTTP routes, handlers, and models

pub mod handlers;
pub mod media_handlers;
pub mod models;
pub mod routes;
pub mod tts_handlers;
