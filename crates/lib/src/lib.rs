//! # Schema-Aware Text-to-SQL
//!
//! This crate translates natural-language questions into SQL against a known schema.
//!
//! It has two cooperating halves:
//!
//! - The **schema indexer** ([`indexer::SchemaIndexer`]) reads the database catalog,
//!   renders each table as a one-line description, embeds it and stores one record
//!   per table in the `table_embeddings` table.
//! - The **query translator** ([`translator::QueryTranslator`]) embeds a question,
//!   retrieves the most similar tables, builds a bounded prompt, calls the generation
//!   provider and parses its `{sql, explanation}` answer.
//!
//! External capabilities (generation, embeddings, secrets, storage) sit behind
//! traits in [`providers`] so they can be swapped or faked in tests.

pub mod constants;
pub mod description;
pub mod errors;
pub mod indexer;
pub mod parser;
pub mod prompts;
pub mod providers;
pub mod retrieval;
pub mod translator;
pub mod types;

pub use errors::{ErrorKind, PromptError};
pub use indexer::SchemaIndexer;
pub use parser::{ParsedResponse, ResponseParser};
pub use prompts::PromptBuilder;
pub use retrieval::RetrievalPlanner;
pub use translator::QueryTranslator;
pub use types::{IndexReport, TranslationRequest, TranslationResult};
