//! RAG response generation.

use super::context::{format_context_for_display, format_context_for_prompt};
use super::{AnswerProducer, ContextBuilder, ContextChunk};
use crate::config::{PromptKind, Prompts, RagSettings};
use crate::embedding::Embedder;
use crate::error::{FlightLensError, Result};
use crate::openai::create_client;
use crate::vector_store::VectorStore;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Answer given when retrieval finds nothing relevant.
pub const NO_CONTEXT_ANSWER: &str =
    "I cannot confirm this from the official documentation. No relevant section was found in the indexed manuals.";

const EMERGENCY_KEYWORDS: &[&str] = &[
    "emergency",
    "fire",
    "failure",
    "smoke",
    "depressurization",
    "mayday",
    "ditching",
    "forced landing",
];

/// Live situational context to include with a question.
#[derive(Debug, Clone, Default)]
pub struct FlightContext {
    /// Raw or decoded METAR.
    pub metar: Option<String>,
    /// Aircraft state summary.
    pub telemetry: Option<String>,
}

impl FlightContext {
    pub fn is_empty(&self) -> bool {
        self.metar.is_none() && self.telemetry.is_none()
    }
}

/// Pick the prompt for a question.
///
/// Emergencies win over everything else. Otherwise a METAR alone selects the
/// weather prompt, any telemetry selects the decision prompt, and a bare
/// question uses the plain documentation prompt.
pub fn select_prompt(question: &str, context: &FlightContext) -> PromptKind {
    let lowered = question.to_lowercase();
    if EMERGENCY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return PromptKind::Emergency;
    }

    match (&context.metar, &context.telemetry) {
        (_, Some(_)) => PromptKind::Decision,
        (Some(_), None) => PromptKind::Weather,
        (None, None) => PromptKind::Rag,
    }
}

/// RAG engine for question answering.
pub struct RagEngine {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    context_builder: ContextBuilder,
    prompts: Prompts,
}

impl RagEngine {
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        settings: &RagSettings,
    ) -> Result<Self> {
        let context_builder = ContextBuilder::new(vector_store, embedder)
            .with_max_chunks(settings.top_k)
            .with_min_score(settings.min_score);

        Ok(Self {
            client: create_client()?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            context_builder,
            prompts: Prompts::default(),
        })
    }

    /// Use custom prompt templates and variables.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Answer from the manuals alone.
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        self.ask_with_context(question, &FlightContext::default()).await
    }

    /// Answer with optional weather and aircraft state folded into the prompt.
    #[instrument(skip(self, context), fields(question = %question))]
    pub async fn ask_with_context(
        &self,
        question: &str,
        context: &FlightContext,
    ) -> Result<RagResponse> {
        let kind = select_prompt(question, context);
        info!("Answering with {:?} prompt", kind);

        let sources = self.context_builder.build(question).await?;

        if sources.is_empty() && kind == PromptKind::Rag {
            return Ok(RagResponse {
                answer: NO_CONTEXT_ANSWER.to_string(),
                sources,
                prompt: kind,
            });
        }

        let user_prompt = self.render_prompt(kind, question, &sources, context);
        let answer = self.complete(user_prompt).await?;

        debug!("Generated response with {} sources", sources.len());
        Ok(RagResponse {
            answer,
            sources,
            prompt: kind,
        })
    }

    /// Fill the template for `kind`.
    pub fn render_prompt(
        &self,
        kind: PromptKind,
        question: &str,
        sources: &[ContextChunk],
        context: &FlightContext,
    ) -> String {
        let context_text = if sources.is_empty() {
            "No relevant documentation found.".to_string()
        } else {
            format_context_for_prompt(sources)
        };

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context_text);
        vars.insert(
            "metar".to_string(),
            context.metar.clone().unwrap_or_else(|| "Not available".to_string()),
        );
        vars.insert(
            "telemetry".to_string(),
            context.telemetry.clone().unwrap_or_else(|| "Not available".to_string()),
        );

        self.prompts.render_with_custom(self.prompts.rag.template(kind), &vars)
    }

    async fn complete(&self, user_prompt: String) -> Result<String> {
        let system = self
            .prompts
            .render_with_custom(&self.prompts.rag.system, &HashMap::new());

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| FlightLensError::Rag(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| FlightLensError::Rag(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| FlightLensError::Rag(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            FlightLensError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| FlightLensError::Rag("Empty response from LLM".to_string()))
    }
}

#[async_trait]
impl AnswerProducer for RagEngine {
    fn name(&self) -> &str {
        "rag"
    }

    async fn answer(&self, question: &str) -> Result<String> {
        Ok(self.ask(question).await?.answer)
    }
}

/// A RAG answer with the chunks it was grounded on.
#[derive(Debug, Clone)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<ContextChunk>,
    /// Template used to produce the answer.
    pub prompt: PromptKind,
}

impl RagResponse {
    /// Answer followed by a sources section, when there are sources.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n\n");
            output.push_str(&format_context_for_display(&self.sources));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::MemoryVectorStore;

    struct ConstantEmbedder;

    #[async_trait]
    impl Embedder for ConstantEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn engine() -> RagEngine {
        RagEngine::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(ConstantEmbedder),
            &RagSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_select_prompt() {
        let none = FlightContext::default();
        let metar = FlightContext {
            metar: Some("METAR KDFW 091856Z 18010KT".to_string()),
            telemetry: None,
        };
        let both = FlightContext {
            metar: metar.metar.clone(),
            telemetry: Some("Altitude: 5000 ft".to_string()),
        };

        assert_eq!(select_prompt("What is Vx?", &none), PromptKind::Rag);
        assert_eq!(select_prompt("Can I depart?", &metar), PromptKind::Weather);
        assert_eq!(select_prompt("Should I divert?", &both), PromptKind::Decision);
        assert_eq!(select_prompt("Engine FIRE during climb", &none), PromptKind::Emergency);
        assert_eq!(select_prompt("Smoke in the cabin", &both), PromptKind::Emergency);
    }

    #[test]
    fn test_render_prompt_fills_placeholders() {
        let engine = engine();
        let sources = vec![ContextChunk {
            source: "poh.txt".to_string(),
            page: Some(7),
            content: "Best glide 68 KIAS".to_string(),
            score: 0.9,
        }];
        let context = FlightContext {
            metar: Some("METAR KDFW 091856Z 18010KT 10SM FEW050 25/18 A3012".to_string()),
            telemetry: None,
        };

        let prompt = engine.render_prompt(PromptKind::Weather, "Winds OK?", &sources, &context);
        assert!(prompt.contains("METAR KDFW"));
        assert!(prompt.contains("[1] poh.txt p.7"));
        assert!(prompt.contains("Winds OK?"));
        assert!(prompt.contains("Not available"));
        assert!(!prompt.contains("{{"));
    }

    #[tokio::test]
    async fn test_no_context_answer_skips_model() {
        let response = engine().ask("What is the best glide speed?").await.unwrap();
        assert_eq!(response.answer, NO_CONTEXT_ANSWER);
        assert!(response.sources.is_empty());
        assert_eq!(response.prompt, PromptKind::Rag);
        assert_eq!(response.format_for_display(), NO_CONTEXT_ANSWER);
    }
}
