//! Wire types for the Generative Language `generateContent` call.
//!
//! Only the fields the adapter reads or writes are modelled; unknown fields
//! in responses are ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentRequest<'a> {
    pub(super) system_instruction: ContentDto<'a>,
    pub(super) contents: [ContentDto<'a>; 1],
    pub(super) generation_config: GenerationConfigDto,
}

#[derive(Debug, Serialize)]
pub(super) struct ContentDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) role: Option<&'static str>,
    pub(super) parts: [PartDto<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(super) struct PartDto<'a> {
    pub(super) text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerationConfigDto {
    pub(super) temperature: f32,
    pub(super) response_mime_type: &'static str,
}

impl<'a> GenerateContentRequest<'a> {
    pub(super) fn new(system_instruction: &'a str, prompt: &'a str, temperature: f32) -> Self {
        Self {
            system_instruction: ContentDto {
                role: None,
                parts: [PartDto {
                    text: system_instruction,
                }],
            },
            contents: [ContentDto {
                role: Some("user"),
                parts: [PartDto { text: prompt }],
            }],
            generation_config: GenerationConfigDto {
                temperature,
                response_mime_type: "application/json",
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentResponse {
    #[serde(default)]
    pub(super) candidates: Vec<CandidateDto>,
    pub(super) prompt_feedback: Option<PromptFeedbackDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CandidateDto {
    pub(super) content: Option<CandidateContentDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CandidateContentDto {
    #[serde(default)]
    pub(super) parts: Vec<ResponsePartDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResponsePartDto {
    pub(super) text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PromptFeedbackDto {
    pub(super) block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Reason the prompt was refused, when the API blocked it outright.
    pub(super) fn block_reason(&self) -> Option<&str> {
        if !self.candidates.is_empty() {
            return None;
        }
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }

    /// Concatenated text of the first candidate; empty when there is none.
    pub(super) fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorEnvelope {
    pub(super) error: ApiErrorDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDto {
    pub(super) message: String,
}
