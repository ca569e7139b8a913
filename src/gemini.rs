use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::{CopyRequest, CopyResponse, ImageAttachment};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.5-flash";

// Moderate creative sampling; the house style does the rest.
const TEMPERATURE: f32 = 0.7;

const SYSTEM_INSTRUCTION: &str = "\
You are an expert UX writer adhering to a strict style guide. Your task is \
to analyze a user's request and generate 2-3 distinct, on-brand copy options \
for their user interface.

Your core voice must be:
- Clear: Use simple vocabulary and the active voice.
- Relevant: Connect to user goals and context.
- Truthful: Be accurate and transparent.
- Believable: Be consistent and avoid hyperbole.
- Memorable: Be concise and relatable.
- The tone should be helpful, professional, and supportive, unless the user \
specifies a different tone.

Follow these writing principles:
- Clarity: Be direct and unambiguous.
- Conciseness: Use the minimum text necessary.
- Usefulness: Help the user achieve their goal.
- Empathy: Consider the user's emotional state and context.
- Conversational: Use words your audience uses. Avoid jargon unless it's \
standard for the audience.
- Scannability: Put the most important information first. Write for scanning \
first, reading second.

Always generate a response that strictly follows the requested JSON schema.";

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<ImageAttachment>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline_image(image: ImageAttachment) -> Self {
        Self {
            text: None,
            inline_data: Some(image),
        }
    }
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// The strict output shape the model is asked to honor. Character counts
/// are produced by the model under this schema and trusted as reported.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "options": {
                "type": "ARRAY",
                "description": "A list of 2-3 distinct copy suggestions.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "text": {
                            "type": "STRING",
                            "description": "The generated UX copy."
                        },
                        "tone": {
                            "type": "STRING",
                            "description": "The tone of the generated copy (e.g., 'Friendly', 'Neutral', 'Serious')."
                        },
                        "characterCount": {
                            "type": "INTEGER",
                            "description": "The character count of the generated text."
                        }
                    },
                    "required": ["text", "tone", "characterCount"]
                }
            }
        },
        "required": ["options"]
    })
}

/// Assemble the user prompt: one labeled line per non-empty field.
pub fn build_prompt(request: &CopyRequest) -> String {
    let mut prompt = String::from("Generate UX copy based on the following requirements:\n");
    prompt.push_str(&format!("- Description: {}\n", request.description));

    let optional_lines = [
        ("Content Type", &request.content_type),
        ("Component/Location", &request.location),
        ("Trigger/User Action", &request.trigger),
        ("Intended Outcome", &request.outcome),
        ("Requested Tone", &request.tone),
    ];
    for (label, value) in optional_lines {
        if !value.is_empty() {
            prompt.push_str(&format!("- {}: {}\n", label, value));
        }
    }
    if !request.char_limit.is_empty() {
        prompt.push_str(&format!(
            "- Character Limit: Approximately {} characters\n",
            request.char_limit
        ));
    }

    if request.image.is_some() {
        prompt.push_str(
            "\nAn image has been provided for visual context of where the text \
             will appear. Use it to inform your copy suggestions.",
        );
    }

    prompt
}

fn build_request_body(request: &CopyRequest) -> GenerateContentRequest {
    let mut parts = vec![Part::text(build_prompt(request))];
    if let Some(image) = &request.image {
        parts.push(Part::inline_image(image.clone()));
    }

    GenerateContentRequest {
        contents: vec![Content { parts }],
        system_instruction: Content {
            parts: vec![Part::text(SYSTEM_INSTRUCTION.to_string())],
        },
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(),
        },
    }
}

/// Parse the model's reply text into a `CopyResponse`.
///
/// The reply must be a JSON object; anything else (markdown fences,
/// apologies, truncated output) is an invalid response. An object with an
/// empty `options` array counts as no suggestions.
pub fn parse_reply(text: &str) -> Result<CopyResponse> {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') {
        return Err(anyhow!(
            "Received an invalid response from the AI. Please try again."
        ));
    }

    let response: CopyResponse = serde_json::from_str(trimmed).map_err(|e| {
        tracing::warn!("unparseable model reply: {}", e);
        anyhow!("Received an invalid response from the AI. Please try again.")
    })?;

    if response.options.is_empty() {
        return Err(anyhow!(
            "The AI did not return any suggestions. Try rephrasing your request."
        ));
    }

    Ok(response)
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Build a client from `GEMINI_API_KEY`. A missing key is a startup
    /// error, reported before the terminal is initialized.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow!("GEMINI_API_KEY is not set. Export it and relaunch."))?;
        Ok(Self::new(&api_key))
    }

    /// Generate copy suggestions for a request.
    ///
    /// Rejects an empty description before any network traffic. All
    /// transport and API failures collapse into one descriptive error;
    /// there are no retries.
    pub async fn generate(&self, request: &CopyRequest) -> Result<CopyResponse> {
        if request.description.trim().is_empty() {
            return Err(anyhow!("Description cannot be empty."));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, MODEL);
        let body = build_request_body(request);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to get suggestions from AI: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Failed to get suggestions from AI: API error {}: {}",
                status,
                text
            ));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to get suggestions from AI: {}", e))?;

        let text = reply
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        parse_reply(&text)
    }
}
