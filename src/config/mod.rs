//! Configuration module for FlightLens.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{PromptKind, Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, PathSettings, PromptSettings,
    RagSettings, Settings, VectorStoreSettings, WeatherSettings,
};
