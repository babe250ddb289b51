//! Prompt rendering and answer generation.
//!
//! Builds the prompt by:
//! 1. Joining retrieved chunk texts with a delimiter
//! 2. Substituting `{question}` and `{context}` into the template
//! 3. Sending it to the language model in deterministic mode

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::errors::{RagError, Result};
use crate::llm::provider::LanguageModel;
use crate::llm::types::GenerateRequest;
use crate::rag::types::{Answer, RetrievalResult};

pub const QUESTION_PLACEHOLDER: &str = "{question}";
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

pub const DEFAULT_TEMPLATE: &str = "You are an assistant for question-answering tasks. Use the context below to answer the question.
Be personal, friendly, and make the answer interesting and engaging.
If unsure, respond with \"I don't know.\"
Question: {question}
Context: {context}
Answer:";

/// Configuration for answer generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Prompt with exactly one `{question}` and one `{context}`
    pub template: String,
    /// Separator placed between context chunks
    pub context_delimiter: String,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            context_delimiter: "\n\n".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Question,
    Context,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Slot),
}

/// A prompt template with one `{question}` and one `{context}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        for placeholder in [QUESTION_PLACEHOLDER, CONTEXT_PLACEHOLDER] {
            let count = template.matches(placeholder).count();
            if count != 1 {
                return Err(RagError::InvalidConfig(format!(
                    "prompt template must contain {} exactly once (found {})",
                    placeholder, count
                )));
            }
        }

        let mut segments = Vec::new();
        let mut rest = template;
        while !rest.is_empty() {
            let next = [
                (rest.find(QUESTION_PLACEHOLDER), Slot::Question, QUESTION_PLACEHOLDER),
                (rest.find(CONTEXT_PLACEHOLDER), Slot::Context, CONTEXT_PLACEHOLDER),
            ]
            .into_iter()
            .filter_map(|(pos, slot, token)| pos.map(|p| (p, slot, token)))
            .min_by_key(|(pos, _, _)| *pos);

            match next {
                Some((pos, slot, token)) => {
                    if pos > 0 {
                        segments.push(Segment::Literal(rest[..pos].to_string()));
                    }
                    segments.push(Segment::Slot(slot));
                    rest = &rest[pos + token.len()..];
                }
                None => {
                    segments.push(Segment::Literal(rest.to_string()));
                    rest = "";
                }
            }
        }

        Ok(Self { segments })
    }

    /// Substitute both slots in one pass; substituted text is never re-expanded.
    pub fn render(&self, question: &str, context: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(Slot::Question) => out.push_str(question),
                Segment::Slot(Slot::Context) => out.push_str(context),
            }
        }
        out
    }
}

pub struct Answerer {
    model: Arc<dyn LanguageModel>,
    template: PromptTemplate,
    context_delimiter: String,
    max_tokens: Option<u32>,
}

impl Answerer {
    pub fn new(model: Arc<dyn LanguageModel>, config: &AnswerConfig) -> Result<Self> {
        Ok(Self {
            model,
            template: PromptTemplate::parse(&config.template)?,
            context_delimiter: config.context_delimiter.clone(),
            max_tokens: None,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Chunk texts in retrieval order, joined by the delimiter.
    pub fn format_context(&self, context: &RetrievalResult) -> String {
        context
            .texts()
            .collect::<Vec<_>>()
            .join(&self.context_delimiter)
    }

    pub fn render_prompt(&self, question: &str, context: &RetrievalResult) -> String {
        self.template.render(question, &self.format_context(context))
    }

    /// Ask the model; the generated text is returned untouched.
    pub async fn answer(&self, question: &str, context: &RetrievalResult) -> Result<Answer> {
        let prompt = self.render_prompt(question, context);
        tracing::debug!(
            "Sending {} char prompt with {} context chunks to {}",
            prompt.chars().count(),
            context.len(),
            self.model.name()
        );

        let request = GenerateRequest::new(prompt)
            .deterministic()
            .with_max_tokens(self.max_tokens);
        let text = self.model.generate(request).await?;
        Ok(Answer { text })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::rag::types::{Chunk, EmbeddedChunk, ScoredChunk};

    /// Echoes a digest of the prompt; varies its output unless asked to be deterministic.
    struct RecordingModel {
        prompts: Mutex<Vec<GenerateRequest>>,
        calls: Mutex<u32>,
    }

    impl RecordingModel {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, request: GenerateRequest) -> Result<String> {
            let mut calls = self.calls.lock().expect("lock");
            *calls += 1;
            let text = if request.deterministic {
                format!("answer for {} chars", request.prompt.len())
            } else {
                format!("sampled #{}", calls)
            };
            self.prompts.lock().expect("lock").push(request);
            Ok(text)
        }
    }

    struct DownModel;

    #[async_trait]
    impl LanguageModel for DownModel {
        fn name(&self) -> &str {
            "down"
        }

        async fn generate(&self, _request: GenerateRequest) -> Result<String> {
            Err(RagError::ModelUnavailable("connection refused".to_string()))
        }
    }

    fn context(texts: &[&str]) -> RetrievalResult {
        RetrievalResult::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| ScoredChunk {
                    entry: EmbeddedChunk::new(
                        Chunk {
                            text: text.to_string(),
                            sequence_index: i,
                            source_url: "doc".to_string(),
                            start_offset: 0,
                        },
                        vec![1.0],
                    ),
                    score: 1.0 - i as f32 * 0.1,
                })
                .collect(),
        )
    }

    #[test]
    fn template_requires_both_placeholders_once() {
        assert!(PromptTemplate::parse("Q: {question}").is_err());
        assert!(PromptTemplate::parse("C: {context}").is_err());
        assert!(PromptTemplate::parse("{question} {question} {context}").is_err());
        assert!(PromptTemplate::parse("{context}{question}").is_ok());
    }

    #[test]
    fn render_substitutes_in_a_single_pass() {
        let template = PromptTemplate::parse("Q: {question}\nC: {context}\nA:").expect("parse");
        let rendered = template.render("what is {context}?", "ctx mentions {question}");
        assert_eq!(rendered, "Q: what is {context}?\nC: ctx mentions {question}\nA:");
    }

    #[test]
    fn context_keeps_retrieval_order_and_delimiter() {
        let answerer = Answerer::new(
            Arc::new(RecordingModel::new()),
            &AnswerConfig {
                template: "{question}|{context}".to_string(),
                context_delimiter: "\n---\n".to_string(),
            },
        )
        .expect("answerer");

        let prompt = answerer.render_prompt("Q", &context(&["best", "second", "third"]));
        assert_eq!(prompt, "Q|best\n---\nsecond\n---\nthird");
    }

    #[test]
    fn default_template_is_valid() {
        let template = PromptTemplate::parse(DEFAULT_TEMPLATE).expect("parse");
        let rendered = template.render("What is FlightScope Mevo+?", "Mevo+ is a launch monitor.");
        assert!(rendered.contains("Question: What is FlightScope Mevo+?"));
        assert!(rendered.contains("Context: Mevo+ is a launch monitor."));
        assert!(rendered.ends_with("Answer:"));
    }

    #[tokio::test]
    async fn answer_requests_deterministic_output() {
        let model = Arc::new(RecordingModel::new());
        let answerer = Answerer::new(model.clone(), &AnswerConfig::default()).expect("answerer");

        answerer
            .answer("What is FlightScope Mevo+?", &context(&["Mevo+ is a launch monitor."]))
            .await
            .expect("answer");

        let prompts = model.prompts.lock().expect("lock");
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].deterministic);
        assert!(prompts[0].prompt.contains("Mevo+ is a launch monitor."));
    }

    #[tokio::test]
    async fn answering_twice_gives_identical_text() {
        let answerer =
            Answerer::new(Arc::new(RecordingModel::new()), &AnswerConfig::default()).expect("answerer");
        let ctx = context(&["alpha", "beta"]);

        let first = answerer.answer("question", &ctx).await.expect("first");
        let second = answerer.answer("question", &ctx).await.expect("second");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_context_still_renders() {
        let model = Arc::new(RecordingModel::new());
        let answerer = Answerer::new(
            model.clone(),
            &AnswerConfig {
                template: "{question}[{context}]".to_string(),
                ..AnswerConfig::default()
            },
        )
        .expect("answerer");

        answerer
            .answer("q", &RetrievalResult::default())
            .await
            .expect("answer");
        assert_eq!(model.prompts.lock().expect("lock")[0].prompt, "q[]");
    }

    #[tokio::test]
    async fn model_errors_propagate_unchanged() {
        let answerer = Answerer::new(Arc::new(DownModel), &AnswerConfig::default()).expect("answerer");
        let err = answerer.answer("q", &context(&["a"])).await.unwrap_err();
        assert!(matches!(err, RagError::ModelUnavailable(_)));
    }
}
