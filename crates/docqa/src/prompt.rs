//! Prompt template loading and rendering.
//!
//! Templates are plain text files containing the literal fields `{context}`
//! and `{question}`. Literal braces are written doubled (`{{` / `}}`). Files
//! are read fresh on every call; nothing is cached between invocations.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{Error, Result};

/// Directory holding the bundled templates, resolved at build time.
pub const DEFAULT_PROMPTS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/prompts");

/// Template used by free-text question answering.
pub const QA_PROMPT: &str = "qa_prompt.txt";

/// Template used by structured comparison.
pub const COMPARE_PROMPT: &str = "compare_prompt.txt";

/// Reads named templates from a fixed directory.
#[derive(Debug, Clone)]
pub struct PromptLoader {
    dir: PathBuf,
}

impl PromptLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the template `name` and return its contents unmodified.
    ///
    /// Returns [`Error::PromptNotFound`] when the file is absent and
    /// [`Error::PromptRead`] for any other I/O failure.
    pub fn load(&self, name: &str) -> Result<String> {
        let path = self.dir.join(name);
        match fs::read_to_string(&path) {
            Ok(text) => {
                trace!("Loaded prompt {} ({} bytes)", path.display(), text.len());
                Ok(text)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::PromptNotFound { path }),
            Err(source) => Err(Error::PromptRead { path, source }),
        }
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPTS_DIR)
    }
}

/// Why a template could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template references unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),
    #[error("template is missing the {{{0}}} placeholder")]
    MissingPlaceholder(&'static str),
    #[error("unmatched brace at byte {offset} of template")]
    UnmatchedBrace { offset: usize },
}

/// Substitute `context` and `question` into `template`.
///
/// Values are inserted verbatim and never re-scanned for fields. Both fields
/// must appear at least once.
pub fn render(
    template: &str,
    context: &str,
    question: &str,
) -> std::result::Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + context.len() + question.len());
    let mut has_context = false;
    let mut has_question = false;
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, n)| n == '{').is_some() {
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '{')) | None => {
                            return Err(TemplateError::UnmatchedBrace { offset });
                        }
                        Some((_, ch)) => name.push(ch),
                    }
                }
                match name.as_str() {
                    "context" => {
                        out.push_str(context);
                        has_context = true;
                    }
                    "question" => {
                        out.push_str(question);
                        has_question = true;
                    }
                    _ => return Err(TemplateError::UnknownPlaceholder(name)),
                }
            }
            '}' => {
                if chars.next_if(|&(_, n)| n == '}').is_none() {
                    return Err(TemplateError::UnmatchedBrace { offset });
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    if !has_context {
        return Err(TemplateError::MissingPlaceholder("context"));
    }
    if !has_question {
        return Err(TemplateError::MissingPlaceholder("question"));
    }
    Ok(out)
}
