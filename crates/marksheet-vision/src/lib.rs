//! marksheet-vision - Vision model providers for marksheet.
//!
//! This crate provides multimodal model implementations behind the
//! [`VisionModel`] trait, used by the extraction pipeline's AI mode.
//!
//! # Supported Providers
//!
//! - **Gemini** - Google Generative Language API (`generateContent`)
//!
//! # Example
//!
//! ```ignore
//! use marksheet_vision::VisionFactory;
//!
//! // Create a Gemini provider with the default model
//! let model = VisionFactory::gemini()?;
//!
//! // Or with a specific model
//! let model = VisionFactory::gemini_with_model("gemini-1.5-pro")?;
//! ```

mod factory;
mod gemini;

pub use factory::VisionFactory;
pub use gemini::GeminiVision;

// Re-export core types for convenience
pub use marksheet_core::traits::{VisionConfig, VisionModel};
pub use marksheet_core::types::InlineImage;
