//! AI-summary tier.
//!
//! Feeds the response text and the image URLs discovered by web search to
//! an LLM and asks for a strict-JSON brand judgment. Runs in phase two:
//! without images there is nothing the summarizer can add over the text
//! tiers, so it reports `Skipped` immediately.

use std::time::Instant;

use async_trait::async_trait;

use brandvet_common::{EvidencePayload, TierKind, TierResult, ValidationRequest};

use crate::clients::LlmClient;
use crate::tier::{fold_error, EvidenceTier};

/// Cap on response text folded into the prompt.
const MAX_PROMPT_TEXT: usize = 1_000;

pub struct AiSummaryTier {
    client: LlmClient,
}

impl AiSummaryTier {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EvidenceTier for AiSummaryTier {
    fn kind(&self) -> TierKind {
        TierKind::AiSummary
    }

    async fn evaluate(&self, request: &ValidationRequest, images: &[String]) -> TierResult {
        if images.is_empty() {
            return TierResult::skipped(self.kind(), "no image URLs available");
        }

        let started = Instant::now();
        let prompt = build_prompt(request, images);

        match self.client.judge(&prompt).await {
            Ok(judgment) => {
                let latency = started.elapsed().as_millis() as u64;
                TierResult::succeeded(
                    self.kind(),
                    EvidencePayload::Judgment {
                        judgment: judgment.clone(),
                    },
                    Some(judgment.label),
                    judgment.confidence,
                    latency,
                )
            }
            Err(err) => fold_error(self.kind(), err, started.elapsed().as_millis() as u64),
        }
    }
}

fn build_prompt(request: &ValidationRequest, images: &[String]) -> String {
    let mut text = request.effective_text().to_string();
    if text.len() > MAX_PROMPT_TEXT {
        let cut = (0..=MAX_PROMPT_TEXT)
            .rev()
            .find(|i| text.is_char_boundary(*i))
            .unwrap_or(0);
        text.truncate(cut);
    }

    let mut prompt = String::new();
    prompt.push_str(
        "You are verifying a brand label assigned to a survey response.\n\
         Answer with strict JSON only: {\"label\": string, \"confidence\": number 0-1, \"rationale\": string}.\n\
         The label field must hold the brand the evidence actually supports.\n\n",
    );
    prompt.push_str(&format!("Candidate label: {}\n", request.candidate_label));
    prompt.push_str(&format!("Category: {}\n", request.category.name));
    if !request.category.allowed_labels.is_empty() {
        prompt.push_str(&format!(
            "Labels allowed in this category: {}\n",
            request.category.allowed_labels.join(", ")
        ));
    }
    prompt.push_str(&format!("Response text: {}\n", text));
    prompt.push_str("Image URLs found alongside the response:\n");
    for url in images {
        prompt.push_str(&format!("- {}\n", url));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandvet_common::CategoryContext;

    fn request() -> ValidationRequest {
        ValidationRequest::new(
            "Nike",
            "Compré zapatos Nike",
            CategoryContext::new("sportswear", vec!["Nike".into(), "Adidas".into()]),
        )
        .unwrap()
        .with_translation("I bought Nike shoes")
    }

    #[test]
    fn test_prompt_uses_translated_text() {
        let prompt = build_prompt(&request(), &["https://img.example/a.png".into()]);
        assert!(prompt.contains("I bought Nike shoes"));
        assert!(!prompt.contains("Compré"));
    }

    #[test]
    fn test_prompt_lists_images_and_allowed_labels() {
        let prompt = build_prompt(&request(), &["https://img.example/a.png".into()]);
        assert!(prompt.contains("https://img.example/a.png"));
        assert!(prompt.contains("Nike, Adidas"));
        assert!(prompt.contains("strict JSON"));
    }

    #[test]
    fn test_prompt_truncates_long_text() {
        let mut request = request();
        request.translated_text = Some("x".repeat(5_000));
        let prompt = build_prompt(&request, &["https://img.example/a.png".into()]);
        assert!(prompt.len() < 2_500);
    }
}
