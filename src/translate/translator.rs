//! Translator trait for utterance text.

use crate::error::{DolmetError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Trait for machine translation of one utterance's text.
///
/// Implementations load their model once and are called sequentially from
/// the pipeline loop — translation latency never affects playback ordering.
pub trait Translator: Send {
    /// Translate text from the source to the target language.
    fn translate(&mut self, text: &str) -> Result<String>;

    /// Return the name of this translator for logging.
    fn name(&self) -> &str;
}

/// Mock translator for testing.
///
/// Returns a configured mapping, or `"<text> (translated)"` for unmapped
/// input. Cloned instances share the call log.
#[derive(Clone, Default)]
pub struct MockTranslator {
    mapping: HashMap<String, String>,
    fail_on: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `source` to `target` exactly.
    pub fn with_mapping(mut self, source: &str, target: &str) -> Self {
        self.mapping.insert(source.to_string(), target.to_string());
        self
    }

    /// Fail whenever the input equals `text`.
    pub fn with_failure_on(mut self, text: &str) -> Self {
        self.fail_on = Some(text.to_string());
        self
    }

    /// Texts passed to `translate`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Translator for MockTranslator {
    fn translate(&mut self, text: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());

        if self.fail_on.as_deref() == Some(text) {
            return Err(DolmetError::Translation {
                message: format!("mock translation failure for '{text}'"),
            });
        }

        Ok(self
            .mapping
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("{text} (translated)")))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
