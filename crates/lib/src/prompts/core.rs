//! # Default Prompt Templates
//!
//! The templates used by the `PromptBuilder` for SQL generation.

/// The system prompt: persona plus the output-format contract.
///
/// The response parser depends on the single-JSON-object instruction; loosening it
/// requires matching changes in `parser`.
///
/// Placeholders: `{dialect}`
pub const SQL_SYSTEM_PROMPT: &str = r#"You are an expert SQL developer who writes {dialect} queries.
Use only the tables and columns listed in the schema context. Do not invent tables or columns.

Respond with exactly one JSON object and nothing else, in this format:
{"sql": "<the {dialect} query>", "explanation": "<a short explanation of what the query does>"}
Do not wrap the JSON in markdown. Do not add any text before or after it."#;

/// The user prompt: retrieved schema context, relationship notes and the question.
///
/// Placeholders: `{dialect}`, `{tables}`, `{relationships}`, `{question}`
pub const SQL_USER_PROMPT: &str = r#"# Relevant tables
{tables}
{relationships}
# Question
{question}

Write the query using {dialect} syntax."#;

/// Shown in place of the table list when retrieval found nothing.
pub const NO_TABLES_NOTE: &str =
    "No relevant tables were found in the schema index. Say so in the explanation if the question cannot be answered.";

/// Heading for the relationship notes section.
pub const RELATIONSHIPS_HEADING: &str = "# Relationships";
