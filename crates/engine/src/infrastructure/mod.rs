//! Infrastructure adapters: the LLM port and its concrete clients.

pub mod ollama;
pub mod ports;
