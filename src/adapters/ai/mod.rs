//! AI adapter module. Implements ModelPort for the generative API.
//!
//! Provides a Gemini REST adapter and a mock adapter for testing and
//! key-less runs.

pub mod gemini_adapter;
pub mod mock_adapter;

pub use gemini_adapter::GeminiAdapter;
pub use mock_adapter::MockModelAdapter;
