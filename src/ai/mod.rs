pub mod client;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod schema;
pub mod types;

pub use client::{GenerationService, OpenAiGenerator, UnconfiguredGenerator};
pub use pipeline::AnalysisPipeline;
pub use types::{Activity, AnalysisRequest};
