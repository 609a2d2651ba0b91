//! The seam between the service and whatever produces completions.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Result;

/// Boxed future returned by [`CompletionModel::complete`].
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// A text-generation backend.
///
/// Implementors send one fully rendered prompt and resolve to the completion
/// text with surrounding whitespace removed. Failures are returned as-is;
/// implementors do not retry.
pub trait CompletionModel: Send + Sync {
    /// Model identifier, used for logging.
    fn model_id(&self) -> &str;

    /// Run a single completion for `prompt`.
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a>;
}

impl<M: CompletionModel + ?Sized> CompletionModel for Arc<M> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        (**self).complete(prompt)
    }
}
