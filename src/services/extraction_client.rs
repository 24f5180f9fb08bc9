// src/services/extraction_client.rs
//! Client for the AI credential-extraction gateway.
//!
//! Sends a certificate image (base64 data URL) to the gateway's
//! chat-completions endpoint with a forced `extract_credential` tool call
//! and parses the tool arguments into a [`CredentialRecord`].
//!
//! The extracted record is untrusted, best-effort input: callers feed it
//! through the same validation and canonicalization path as manually
//! entered data.

use crate::models::credential::CredentialRecord;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Extraction request failure.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Gateway rate limit (HTTP 429).
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// Gateway credit balance exhausted (HTTP 402).
    #[error("AI credits depleted. Please add credits to your workspace.")]
    CreditsDepleted,

    /// Any other non-success gateway status.
    #[error("AI gateway error: {0}")]
    Gateway(StatusCode),

    /// The response carried no tool call to read a record from.
    #[error("No credential data extracted from image")]
    EmptyResult,

    /// Transport-level failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The tool-call arguments were not a credential record.
    #[error("malformed extraction payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: ToolCallFunction,
}

#[derive(Deserialize)]
struct ToolCallFunction {
    /// JSON-encoded arguments object
    arguments: String,
}

/// Async client for the extraction gateway.
#[derive(Clone)]
pub struct ExtractionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ExtractionClient {
    /// Creates a client for the given chat-completions endpoint.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        ExtractionClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Extracts credential fields from a certificate image.
    ///
    /// # Arguments
    /// * `image_base64` - Base64 data URL of the certificate image
    ///
    /// # Errors
    /// Distinguishes gateway rate limiting (429) and depleted credits (402)
    /// from other failures so callers can surface them verbatim.
    pub async fn extract(&self, image_base64: &str) -> Result<CredentialRecord, ExtractionError> {
        let body = Self::request_body(image_base64);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(ExtractionError::RateLimited),
            StatusCode::PAYMENT_REQUIRED => return Err(ExtractionError::CreditsDepleted),
            status if !status.is_success() => {
                log::error!("extraction gateway returned {}", status);
                return Err(ExtractionError::Gateway(status));
            }
            _ => {}
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let tool_call = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.tool_calls.into_iter().next())
            .ok_or(ExtractionError::EmptyResult)?;

        let record: CredentialRecord = serde_json::from_str(&tool_call.function.arguments)?;
        Ok(record)
    }

    /// The fixed chat-completions request: a vision message plus a forced
    /// `extract_credential` tool call whose schema pins the six fields.
    fn request_body(image_base64: &str) -> serde_json::Value {
        json!({
            "model": "google/gemini-2.5-flash",
            "messages": [
                {
                    "role": "system",
                    "content": "You are an expert at extracting structured data from academic credentials and certificates. Extract the following fields exactly as they appear: student_name, university_name, degree_type, major, gpa, graduation_date. Return ONLY valid JSON with these exact field names. If a field is not found, use an empty string."
                },
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "text",
                            "text": "Extract the academic credential information from this certificate image. Return a JSON object with these fields: student_name, university_name, degree_type, major, gpa, graduation_date"
                        },
                        {
                            "type": "image_url",
                            "image_url": { "url": image_base64 }
                        }
                    ]
                }
            ],
            "tools": [
                {
                    "type": "function",
                    "function": {
                        "name": "extract_credential",
                        "description": "Extract structured credential data from academic certificate",
                        "parameters": {
                            "type": "object",
                            "properties": {
                                "student_name": { "type": "string", "description": "Full name of the student" },
                                "university_name": { "type": "string", "description": "Name of the university" },
                                "degree_type": { "type": "string", "description": "Type of degree (e.g., Bachelor of Science)" },
                                "major": { "type": "string", "description": "Field of study or major" },
                                "gpa": { "type": "string", "description": "Grade point average" },
                                "graduation_date": { "type": "string", "description": "Year of graduation" }
                            },
                            "required": ["student_name", "university_name", "degree_type", "major", "gpa", "graduation_date"],
                            "additionalProperties": false
                        }
                    }
                }
            ],
            "tool_choice": { "type": "function", "function": { "name": "extract_credential" } }
        })
    }
}
