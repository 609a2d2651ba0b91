//! Answer and comparison pipelines.
//!
//! Both are single-pass: load the template, render it, make one model call.
//! Comparison output is additionally cleaned and parsed. The service holds
//! no mutable state, so one instance can be shared behind an `Arc` by any
//! number of concurrent callers.

use tracing::{debug, info};

use crate::error::Result;
use crate::model::CompletionModel;
use crate::prompt::{self, COMPARE_PROMPT, PromptLoader, QA_PROMPT};
use crate::response::{self, ComparisonResult};

/// Composes a [`PromptLoader`] with an injected [`CompletionModel`].
pub struct LlmService<M> {
    model: M,
    prompts: PromptLoader,
}

impl<M: CompletionModel> LlmService<M> {
    pub fn new(model: M, prompts: PromptLoader) -> Self {
        Self { model, prompts }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn prompts(&self) -> &PromptLoader {
        &self.prompts
    }

    /// Answer `question` from `context` as free text.
    ///
    /// The completion is returned as produced (whitespace-trimmed by the
    /// model client); it is never cleaned or parsed.
    pub async fn generate_answer(&self, context: &str, question: &str) -> Result<String> {
        info!("Generating answer: model={}", self.model.model_id());
        let prompt = self.render(QA_PROMPT, context, question)?;
        let answer = self.model.complete(&prompt).await?;
        debug!("Answer: {} chars", answer.len());
        Ok(answer)
    }

    /// Ask for a structured comparison and parse the model's JSON.
    ///
    /// Template, rendering, and model failures propagate. Output that is not
    /// valid JSON after cleanup becomes [`ComparisonResult::ParseError`].
    pub async fn generate_comparison(
        &self,
        context: &str,
        question: &str,
    ) -> Result<ComparisonResult> {
        info!("Generating comparison: model={}", self.model.model_id());
        let prompt = self.render(COMPARE_PROMPT, context, question)?;
        let raw = self.model.complete(&prompt).await?;
        Ok(response::process_comparison(&raw))
    }

    fn render(&self, template_name: &str, context: &str, question: &str) -> Result<String> {
        let template = self.prompts.load(template_name)?;
        let rendered = prompt::render(&template, context, question)?;
        debug!(
            "Rendered {template_name}: {} bytes (context={}, question={})",
            rendered.len(),
            context.len(),
            question.len()
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::CompletionFuture;
    use crate::prompt::TemplateError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Returns a fixed reply and records every prompt it receives.
    struct CannedModel {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl CompletionModel for CannedModel {
        fn model_id(&self) -> &str {
            "canned"
        }

        fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let reply = self.reply.clone();
            Box::pin(async move { Ok::<_, Error>(reply) })
        }
    }

    struct FailingModel;

    impl CompletionModel for FailingModel {
        fn model_id(&self) -> &str {
            "failing"
        }

        fn complete<'a>(&'a self, _prompt: &'a str) -> CompletionFuture<'a> {
            Box::pin(async {
                Err::<String, _>(Error::Api {
                    status: 429,
                    message: "quota exceeded".into(),
                })
            })
        }
    }

    fn prompt_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(QA_PROMPT),
            "QA\ncontext={context}\nquestion={question}",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(COMPARE_PROMPT),
            "COMPARE {{\"json\": true}}\ncontext={context}\nquestion={question}",
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn answer_sends_rendered_qa_prompt() {
        let dir = prompt_dir();
        let service = LlmService::new(CannedModel::new("42"), PromptLoader::new(dir.path()));

        let answer = service.generate_answer("docs", "what?").await.unwrap();
        assert_eq!(answer, "42");
        assert_eq!(
            service.model().prompts(),
            vec!["QA\ncontext=docs\nquestion=what?".to_string()]
        );
    }

    #[tokio::test]
    async fn answer_is_never_parsed() {
        let dir = prompt_dir();
        let reply = "```json\n{\"a\": 1}\n```";
        let service = LlmService::new(CannedModel::new(reply), PromptLoader::new(dir.path()));

        let answer = service.generate_answer("c", "q").await.unwrap();
        assert_eq!(answer, reply);
    }

    #[tokio::test]
    async fn comparison_uses_compare_template_and_parses() {
        let dir = prompt_dir();
        let service = LlmService::new(
            CannedModel::new("```json\n{\"result\": \"A\"}\n```"),
            PromptLoader::new(dir.path()),
        );

        let result = service.generate_comparison("x vs y", "which?").await.unwrap();
        assert_eq!(result, ComparisonResult::Parsed(json!({"result": "A"})));
        assert_eq!(
            service.model().prompts(),
            vec!["COMPARE {\"json\": true}\ncontext=x vs y\nquestion=which?".to_string()]
        );
    }

    #[tokio::test]
    async fn comparison_recovers_from_bad_json() {
        let dir = prompt_dir();
        let service = LlmService::new(
            CannedModel::new("  JSON not json at all "),
            PromptLoader::new(dir.path()),
        );

        let result = service.generate_comparison("c", "q").await.unwrap();
        assert_eq!(result, ComparisonResult::parse_error("not json at all"));
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let dir = prompt_dir();
        let service = LlmService::new(FailingModel, PromptLoader::new(dir.path()));

        let err = service.generate_answer("c", "q").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 429, .. }));

        let err = service.generate_comparison("c", "q").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn missing_template_fails_before_model_call() {
        let dir = tempfile::tempdir().unwrap();
        let service = LlmService::new(CannedModel::new("unused"), PromptLoader::new(dir.path()));

        let err = service.generate_comparison("c", "q").await.unwrap_err();
        assert!(matches!(err, Error::PromptNotFound { .. }));
        assert!(service.model().prompts().is_empty());
    }

    #[tokio::test]
    async fn bad_template_fails_before_model_call() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(QA_PROMPT), "{context} {\"k\": 1} {question}").unwrap();
        let service = LlmService::new(CannedModel::new("unused"), PromptLoader::new(dir.path()));

        let err = service.generate_answer("c", "q").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Template(TemplateError::UnknownPlaceholder(_))
        ));
        assert!(service.model().prompts().is_empty());
    }

    #[test]
    fn exposes_injected_parts() {
        let dir = prompt_dir();
        let service = LlmService::new(CannedModel::new("ok"), PromptLoader::new(dir.path()));
        assert_eq!(service.prompts().dir(), dir.path());
        assert_eq!(service.model().model_id(), "canned");
    }

    #[tokio::test]
    async fn template_is_reloaded_on_every_call() {
        let dir = prompt_dir();
        let service = LlmService::new(CannedModel::new("ok"), PromptLoader::new(dir.path()));

        service.generate_answer("c", "q").await.unwrap();
        std::fs::write(dir.path().join(QA_PROMPT), "v2 {context} {question}").unwrap();
        service.generate_answer("c", "q").await.unwrap();

        let prompts = service.model().prompts();
        assert_eq!(prompts[1], "v2 c q");
    }
}
