//! External model gateway -- wraps a generative model behind three
//! operations: news generation, price generation and crop photo analysis.
//!
//! The gateway builds prompts, extracts the model's text, and parses it
//! strictly into domain records. Any failure (no credential, network,
//! timeout, unparseable or ill-shaped output) comes back as a
//! [`GatewayError`] after being logged; nothing panics past this boundary.

pub mod client;
pub mod error;
pub mod gateway;
pub mod gemini;
pub mod image;
pub mod parse;
pub mod prompt;

pub use client::{GenerationRequest, InlineImage, LlmClient};
pub use error::GatewayError;
pub use gateway::ModelGateway;
pub use gemini::{GeminiClient, ModelConfig};
pub use image::ImagePayload;
