//! Validation request model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// The category a response was collected under, with the labels an
/// operator considers admissible for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryContext {
    pub name: String,
    #[serde(default)]
    pub allowed_labels: Vec<String>,
}

impl CategoryContext {
    pub fn new(name: impl Into<String>, allowed_labels: Vec<String>) -> Self {
        Self {
            name: name.into(),
            allowed_labels,
        }
    }
}

/// Immutable input to one validation call.
///
/// Owned by the orchestrator for the duration of the request; tiers only
/// ever see a shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub id: Uuid,
    /// The label whose correctness is being judged.
    pub candidate_label: String,
    /// The original free-text response the label was assigned to.
    pub response_text: String,
    /// English translation of the response, when the original needed one.
    pub translated_text: Option<String>,
    pub category: CategoryContext,
    /// Image URLs already known to the caller, merged with whatever web
    /// search discovers before the image-dependent tiers run.
    #[serde(default)]
    pub known_image_urls: Vec<String>,
}

impl ValidationRequest {
    /// Build a request, rejecting inputs no tier could work with.
    ///
    /// This is the only validation that can fail before tier dispatch.
    pub fn new(
        candidate_label: impl Into<String>,
        response_text: impl Into<String>,
        category: CategoryContext,
    ) -> Result<Self, EngineError> {
        let candidate_label = candidate_label.into();
        let response_text = response_text.into();

        if candidate_label.trim().is_empty() {
            return Err(EngineError::InvalidRequest(
                "candidate label is empty".into(),
            ));
        }
        if response_text.trim().is_empty() {
            return Err(EngineError::InvalidRequest("response text is empty".into()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            candidate_label,
            response_text,
            translated_text: None,
            category,
            known_image_urls: Vec::new(),
        })
    }

    pub fn with_translation(mut self, translated: impl Into<String>) -> Self {
        self.translated_text = Some(translated.into());
        self
    }

    pub fn with_known_images(mut self, urls: Vec<String>) -> Self {
        self.known_image_urls = urls;
        self
    }

    /// The text tiers should reason over: the translation when present,
    /// the original response otherwise.
    pub fn effective_text(&self) -> &str {
        self.translated_text
            .as_deref()
            .unwrap_or(&self.response_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category() -> CategoryContext {
        CategoryContext::new("sportswear", vec!["Nike".into(), "Adidas".into()])
    }

    #[test]
    fn test_rejects_empty_label() {
        let err = ValidationRequest::new("  ", "I bought Nike shoes", category());
        assert!(matches!(err, Err(EngineError::InvalidRequest(_))));
    }

    #[test]
    fn test_rejects_empty_text() {
        let err = ValidationRequest::new("Nike", "", category());
        assert!(matches!(err, Err(EngineError::InvalidRequest(_))));
    }

    #[test]
    fn test_effective_text_prefers_translation() {
        let request = ValidationRequest::new("Nike", "Compré zapatos Nike", category())
            .unwrap()
            .with_translation("I bought Nike shoes");
        assert_eq!(request.effective_text(), "I bought Nike shoes");
    }

    #[test]
    fn test_effective_text_falls_back_to_original() {
        let request = ValidationRequest::new("Nike", "I bought Nike shoes", category()).unwrap();
        assert_eq!(request.effective_text(), "I bought Nike shoes");
    }
}
