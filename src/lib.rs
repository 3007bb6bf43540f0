//! Image analysis assistant
//!
//! Takes an uploaded image and a question, forwards both to a hosted
//! multimodal model (Google Gemini), and renders the returned text through an
//! interchangeable front-end (terminal, markdown, JSON or a small web page).

pub mod ai;
pub mod app;
pub mod config;
pub mod error;
pub mod frontend;
pub mod image;
pub mod models;
pub mod prompts;
pub mod server;

pub use error::{Error, Result};
