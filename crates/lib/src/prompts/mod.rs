//! # Prompt Templates and Assembly
//!
//! `core` holds the generation templates; `builder` fills them from retrieved schema.

pub mod builder;
pub mod core;

pub use builder::PromptBuilder;
