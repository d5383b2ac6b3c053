//! Language model assistant for ad-hoc questions about the data.

pub mod chat;

pub use chat::DataAssistant;
