//! # Query Translation Service
//!
//! The per-request pipeline: retrieve → build prompt → generate → parse.
//!
//! A translator holds no mutable state, so one instance can serve concurrent
//! requests. Upstream and storage failures propagate as a single error; parsing
//! irregularities are absorbed by the parser's fallback.

use crate::{
    constants::DEFAULT_TOP_K,
    errors::PromptError,
    parser::ResponseParser,
    prompts::PromptBuilder,
    providers::ai::AiProvider,
    retrieval::RetrievalPlanner,
    types::{SchemaEmbeddingRecord, TranslationRequest, TranslationResult},
};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct QueryTranslator {
    planner: RetrievalPlanner,
    builder: PromptBuilder,
    ai_provider: Box<dyn AiProvider>,
    relationship_notes: String,
    top_k: usize,
}

impl QueryTranslator {
    pub fn new(
        planner: RetrievalPlanner,
        builder: PromptBuilder,
        ai_provider: Box<dyn AiProvider>,
    ) -> Self {
        Self {
            planner,
            builder,
            ai_provider,
            relationship_notes: String::new(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Sets the relationship notes embedded in every prompt.
    pub fn with_relationship_notes(mut self, notes: impl Into<String>) -> Self {
        self.relationship_notes = notes.into();
        self
    }

    /// Sets how many tables are retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, PromptError> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(PromptError::InvalidRequest(
                "question must not be empty".to_string(),
            ));
        }
        info!("Translating question into {} SQL.", self.builder.dialect());

        let matches = self.planner.retrieve(question, self.top_k).await?;
        let relevant_schema: Vec<SchemaEmbeddingRecord> =
            matches.into_iter().map(|m| m.record).collect();

        let prompt = self
            .builder
            .build(question, &relevant_schema, &self.relationship_notes);
        debug!(system_prompt = %prompt.system, user_prompt = %prompt.user, "Assembled prompt.");

        let raw = self
            .ai_provider
            .generate(&prompt.system, &prompt.user)
            .await?;
        debug!(raw_response = %raw, "Received model response.");

        let result = ResponseParser::parse(&raw);
        info!("Generated SQL: {}", result.sql);
        Ok(result)
    }
}
