use super::core::{
    NO_TABLES_NOTE, RELATIONSHIPS_HEADING, SQL_SYSTEM_PROMPT, SQL_USER_PROMPT,
};
use crate::{constants::DEFAULT_SQL_DIALECT, types::{Prompt, SchemaEmbeddingRecord}};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(dialect|tables|relationships|question)\}").expect("placeholder pattern is valid")
});

/// Fills every placeholder in one pass, so inserted text is never rescanned.
fn fill(template: &str, value_for: impl Fn(&str) -> String) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| value_for(&caps[1]))
        .into_owned()
}

/// Assembles the generation prompt from retrieved schema records.
///
/// Only the retrieved tables are listed, which bounds the prompt by `top_k` rather
/// than by the size of the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    dialect: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SQL_DIALECT)
    }
}

impl PromptBuilder {
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
        }
    }

    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    pub fn build(
        &self,
        question: &str,
        relevant_schema: &[SchemaEmbeddingRecord],
        relationship_notes: &str,
    ) -> Prompt {
        let tables = if relevant_schema.is_empty() {
            NO_TABLES_NOTE.to_string()
        } else {
            relevant_schema
                .iter()
                .map(|r| format!("- {}: {}", r.table_name, r.description))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let relationships = if relationship_notes.trim().is_empty() {
            String::new()
        } else {
            format!("\n{RELATIONSHIPS_HEADING}\n{relationship_notes}\n")
        };

        let question = question.trim();
        let value_for = |name: &str| match name {
            "dialect" => self.dialect.clone(),
            "tables" => tables.clone(),
            "relationships" => relationships.clone(),
            _ => question.to_string(),
        };
        let system = fill(SQL_SYSTEM_PROMPT, value_for);
        let user = fill(SQL_USER_PROMPT, value_for);

        Prompt { system, user }
    }
}
