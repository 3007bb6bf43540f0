pub mod analysis;
pub mod client;
pub mod types;

pub use analysis::GeminiAnalysisClient;
pub use client::GeminiHttpClient;
