//! Gemini adapter for plant analysis, image edits, and follow-up chat.
//!
//! Talks to the `generateContent` REST endpoint in two output modes:
//! schema-constrained JSON (diagnosis) and image-only (recolor, future
//! bloom). Implements `ModelPort` with robust JSON parsing and markdown
//! stripping.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::domain::{ChatMessage, Diagnosis, DomainError, PlantPhoto, Role};
use crate::ports::ModelPort;
use crate::shared::config::AppConfig;

/// Gemini REST adapter.
///
/// `api_url` is the API base (e.g. the public
/// `https://generativelanguage.googleapis.com/v1beta`); `text_model` serves
/// diagnosis and chat, `image_model` serves the image-output calls.
pub struct GeminiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl GeminiAdapter {
    pub fn new(api_url: String, api_key: String, text_model: String, image_model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            text_model,
            image_model,
        }
    }

    /// Build from config. The API key is the one required credential.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, DomainError> {
        let api_key = cfg.api_key().ok_or_else(|| {
            DomainError::Configuration("LEAFLOG_API_KEY is not set".to_string())
        })?;
        Ok(Self::new(
            cfg.api_url_or_default(),
            api_key,
            cfg.text_model_or_default(),
            cfg.image_model_or_default(),
        ))
    }

    /// System instruction for the diagnosis call: the ten analytical tasks
    /// the model must perform, matching the response schema.
    fn diagnosis_system_instruction() -> &'static str {
        "You are a botanist and gardening expert. Analyze the provided plant photo and the \
         user's question, and respond in the required JSON format. Give the plant's most \
         common name, its scientific name, and any widely used alias. If the plant is a \
         flower, include its flower language (symbolic meaning). Then assess the following \
         in detail: \
         1. Hydration: judge underwatered, adequate, or overwatered from visual cues such as \
         drooping leaves and soil condition; put a concise summary in hydrationSummary and a \
         detailed explanation of why you judged so and the effect on the plant in \
         hydrationDetail. \
         2. Sunlight: judge insufficient, sufficient, or excessive light from shadows, \
         brightness, and legginess; put a concise summary in sunlightSummary and the \
         reasoning with its effect on the plant in sunlightDetail. \
         3. Repotting: compare plant and pot size; treat roots breaking the soil surface or \
         escaping the drainage holes as the key signal. Put a concise summary such as \
         'repotting needed' in repottingSummary. If repotting is not needed, return null for \
         both repottingSummary and repottingDetail. \
         4. Harvest: only if the plant is an edible crop, describe the expected harvest time \
         and method, and summarize it such as 'ready to harvest' in harvestSummary. For \
         non-edible plants both harvestSummary and harvestDetail must be null — never text \
         like 'not applicable'. \
         5. Pruning: judge from the plant's shape whether pruning is needed and how. If so, \
         put 'pruning needed' in pruningSummary; otherwise return null for both pruning \
         fields. \
         6. Pests and disease: look for visual signs such as leaf spots, insects, or webbing. \
         If anything is suspected, put a concise summary such as 'possible pests' in \
         pestDiseaseSummary and the details in pestDiseaseDetail; if clear, return null for \
         both. \
         7. Color-changing bloom: set isColorChangingFlower to true only if the species \
         changes flower color with soil pH, like hydrangeas. \
         8. Soil acidity: if isColorChangingFlower is true, estimate the soil pH from the \
         current bloom color (blue suggests acidic, pink alkaline) in soilAcidity. \
         9. Color-change guide: if isColorChangingFlower is true, estimate the pot size from \
         the photo and give concrete dosing to turn blooms blue (e.g. aluminum sulfate \
         amount) and pink (e.g. garden lime amount) in colorChangeGuide. \
         10. Potential bloom colors: if the plant is a flowering species with no visible \
         blooms, suggest up to 3 likely flower colors in potentialFlowerColors."
    }

    /// Strict output schema for the diagnosis call, sent as `responseSchema`.
    fn diagnosis_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "plantName": {
                    "type": "STRING",
                    "description": "The plant's most common name."
                },
                "commonAlias": {
                    "type": "STRING",
                    "description": "Another widely used name or nickname, if any. Null when none."
                },
                "scientificName": {
                    "type": "STRING",
                    "description": "Scientific name, e.g. Rosa 'Peace'. Null when unknown."
                },
                "flowerLanguage": {
                    "type": "STRING",
                    "description": "The flower's symbolic meaning, if it is a flower. Null otherwise."
                },
                "healthStatus": {
                    "type": "STRING",
                    "description": "Overall health, e.g. healthy, needs attention, unwell."
                },
                "hydrationSummary": {
                    "type": "STRING",
                    "description": "Concise hydration judgement, e.g. 'underwatered', 'hydration adequate', 'overwatered'. Null when not assessable."
                },
                "hydrationDetail": {
                    "type": "STRING",
                    "description": "Why the hydration judgement was made and its effect on the plant. Null when not assessable."
                },
                "sunlightSummary": {
                    "type": "STRING",
                    "description": "Concise sunlight judgement, e.g. 'sufficient light', 'insufficient light', 'light too strong'. Null when not assessable."
                },
                "sunlightDetail": {
                    "type": "STRING",
                    "description": "Why the sunlight judgement was made and its effect on the plant. Null when not assessable."
                },
                "soilAcidity": {
                    "type": "STRING",
                    "description": "Estimated soil pH from current bloom color, only for color-changing species. Null otherwise."
                },
                "isColorChangingFlower": {
                    "type": "BOOLEAN",
                    "description": "True only if flower color shifts with soil pH, like hydrangeas."
                },
                "diagnosis": {
                    "type": "STRING",
                    "description": "Detailed diagnosis covering disease, pests, and nutrient issues."
                },
                "recommendations": {
                    "type": "ARRAY",
                    "items": {"type": "STRING"},
                    "description": "Concrete care actions: watering, light, fertilizer, pest control."
                },
                "harvestSummary": {
                    "type": "STRING",
                    "description": "Only for edible crops, e.g. 'ready to harvest', 'harvest in 2 weeks'. Must be null for non-edible plants."
                },
                "harvestDetail": {
                    "type": "STRING",
                    "description": "Expected harvest time and method for edible crops. Must be null for non-edible plants."
                },
                "repottingSummary": {
                    "type": "STRING",
                    "description": "E.g. 'repotting needed' or 'repot in 6 months'. Must be null when repotting is not needed."
                },
                "repottingDetail": {
                    "type": "STRING",
                    "description": "Whether repotting is needed and why, judged from plant vs pot size and visible root overgrowth. Null when not needed."
                },
                "pruningSummary": {
                    "type": "STRING",
                    "description": "'pruning needed' only when pruning is required. Must be null otherwise."
                },
                "pruningDetail": {
                    "type": "STRING",
                    "description": "Whether pruning is needed, why, and how. Null when not needed."
                },
                "pestDiseaseSummary": {
                    "type": "STRING",
                    "description": "Concise note only when pests or disease are suspected, e.g. 'possible pests', 'early powdery mildew'. Must be null when clear."
                },
                "pestDiseaseDetail": {
                    "type": "STRING",
                    "description": "Detailed analysis of observed pest or disease signs. Null when clear."
                },
                "colorChangeGuide": {
                    "type": "OBJECT",
                    "description": "Dosing guide to shift bloom color, only for color-changing species; estimate the pot size from the photo. Null otherwise.",
                    "properties": {
                        "toBlue": {"type": "STRING"},
                        "toPink": {"type": "STRING"}
                    }
                },
                "potentialFlowerColors": {
                    "type": "ARRAY",
                    "items": {"type": "STRING"},
                    "description": "Up to 3 likely bloom colors when the plant is a flowering species with no visible blooms. Null otherwise."
                }
            },
            "required": [
                "plantName",
                "healthStatus",
                "isColorChangingFlower",
                "diagnosis",
                "recommendations"
            ]
        })
    }

    /// Sanitize JSON text from the model.
    ///
    /// Models sometimes wrap JSON in markdown code blocks. This strips them.
    fn sanitize_json(raw_text: &str) -> String {
        let trimmed = raw_text.trim();

        // Handle markdown code blocks: ```json ... ``` or ``` ... ```
        if trimmed.starts_with("```") {
            let without_prefix = if trimmed.starts_with("```json") {
                trimmed.strip_prefix("```json").unwrap_or(trimmed)
            } else {
                trimmed.strip_prefix("```").unwrap_or(trimmed)
            };

            if let Some(end_idx) = without_prefix.rfind("```") {
                return without_prefix[..end_idx].trim().to_string();
            }
            return without_prefix.trim().to_string();
        }

        // Handle cases where JSON might be wrapped in other prose
        if let Some(start) = trimmed.find('{') {
            if let Some(end) = trimmed.rfind('}') {
                if start < end {
                    return trimmed[start..=end].to_string();
                }
            }
        }

        trimmed.to_string()
    }

    fn image_part(photo: &PlantPhoto) -> Part {
        Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: photo.media_type.as_mime().to_string(),
                data: BASE64.encode(&photo.bytes),
            }),
        }
    }

    fn text_part(text: impl Into<String>) -> Part {
        Part {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// POST a generateContent request and return the parsed response.
    /// `label` names the call for error messages ("diagnosis", "recolor"...).
    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
        label: &str,
    ) -> Result<GenerateResponse, DomainError> {
        let url = format!("{}/models/{}:generateContent", self.api_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| map_call_error(label, format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Gemini API returned error");
            return Err(map_call_error(
                label,
                format!(
                    "API error {}: {}",
                    status,
                    text.chars().take(200).collect::<String>()
                ),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| map_call_error(label, format!("failed to parse API response: {e}")))
    }

    /// First text part of the first candidate.
    fn first_text(response: &GenerateResponse) -> Option<String> {
        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|p| p.text.clone()))
    }

    /// First inline image of the first candidate, decoded.
    fn first_image(response: &GenerateResponse) -> Option<Result<Vec<u8>, DomainError>> {
        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|p| p.inline_data.as_ref()))
            .map(|inline| {
                BASE64
                    .decode(&inline.data)
                    .map_err(|e| DomainError::Generation(format!("invalid image payload: {e}")))
            })
    }
}

/// Route transport/parse failures to the right taxonomy bucket per call.
fn map_call_error(label: &str, detail: String) -> DomainError {
    match label {
        "diagnosis" => DomainError::Diagnosis(detail),
        "chat" => DomainError::Chat(detail),
        _ => DomainError::Generation(detail),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
    #[serde(
        rename = "inlineData",
        skip_serializing_if = "Option::is_none",
        default
    )]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[async_trait::async_trait]
impl ModelPort for GeminiAdapter {
    async fn diagnose(
        &self,
        photo: &PlantPhoto,
        question: &str,
    ) -> Result<Diagnosis, DomainError> {
        info!(
            bytes = photo.bytes.len(),
            media_type = photo.media_type.as_mime(),
            "sending photo for diagnosis"
        );

        let request = GenerateRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Self::text_part(Self::diagnosis_system_instruction())],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Self::image_part(photo),
                    Self::text_part(format!(
                        "Analyze this plant's health and tell me how to care for it. \
                         The user's additional question: \"{question}\""
                    )),
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(Self::diagnosis_schema()),
                response_modalities: None,
            }),
        };

        let response = self.generate(&self.text_model, &request, "diagnosis").await?;
        let raw_text = Self::first_text(&response)
            .ok_or_else(|| DomainError::Diagnosis("model returned no text".to_string()))?;

        debug!(raw_len = raw_text.len(), "received diagnosis response");

        let clean_json = Self::sanitize_json(&raw_text);
        let diagnosis: Diagnosis = serde_json::from_str(&clean_json).map_err(|e| {
            warn!(error = %e, json = %clean_json.chars().take(200).collect::<String>(), "diagnosis JSON parse failed");
            DomainError::Diagnosis(format!("failed to parse diagnosis JSON: {e}"))
        })?;

        info!(
            plant = %diagnosis.plant_name,
            health = %diagnosis.health_status,
            recommendations = diagnosis.recommendations.len(),
            "diagnosis complete"
        );

        Ok(diagnosis)
    }

    async fn recolor_flower(
        &self,
        photo: &PlantPhoto,
        target_color: &str,
    ) -> Result<Vec<u8>, DomainError> {
        info!(target_color, "sending photo for flower recolor");

        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Self::image_part(photo),
                    Self::text_part(format!(
                        "Change the color of the flower in this image to a natural \
                         {target_color}. Do not alter anything except the flower — leaves, \
                         background, and everything else must stay untouched."
                    )),
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_schema: None,
                response_modalities: Some(vec!["IMAGE".to_string()]),
            }),
        };

        let response = self.generate(&self.image_model, &request, "recolor").await?;
        Self::first_image(&response)
            .unwrap_or_else(|| Err(DomainError::Generation("model returned no image".to_string())))
    }

    async fn render_future_bloom(
        &self,
        photo: &PlantPhoto,
        plant_name: &str,
        target_color: &str,
    ) -> Result<Vec<u8>, DomainError> {
        info!(plant_name, target_color, "sending photo for future-bloom render");

        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Self::image_part(photo),
                    Self::text_part(format!(
                        "This photo shows a '{plant_name}' that is not currently blooming. \
                         Considering the plant's current leaves and size, generate a realistic \
                         image of it after natural growth, blooming with {target_color} \
                         flowers. Keep the amount and size of the blossoms proportionate to \
                         the plant's current state so it does not look excessive. Keep the \
                         existing leaves, stem, pot, and background, allowing only natural \
                         growth that harmonizes with the flowers."
                    )),
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_schema: None,
                response_modalities: Some(vec!["IMAGE".to_string()]),
            }),
        };

        let response = self.generate(&self.image_model, &request, "bloom").await?;
        Self::first_image(&response)
            .unwrap_or_else(|| Err(DomainError::Generation("model returned no image".to_string())))
    }

    async fn chat_reply(
        &self,
        diagnosis: &Diagnosis,
        transcript: &[ChatMessage],
    ) -> Result<String, DomainError> {
        let context = serde_json::to_string(diagnosis)
            .map_err(|e| DomainError::Chat(format!("serialize diagnosis context: {e}")))?;

        let contents = transcript
            .iter()
            .map(|m| Content {
                role: Some(
                    match m.role {
                        Role::User => "user",
                        Role::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Self::text_part(m.text.clone())],
            })
            .collect();

        let request = GenerateRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Self::text_part(format!(
                    "You are the expert on the user's plant. The user has just received an AI \
                     diagnosis of it; answer their follow-up questions based on this \
                     diagnosis. Diagnosis: {context}"
                ))],
            }),
            contents,
            generation_config: None,
        };

        let response = self.generate(&self.text_model, &request, "chat").await?;
        Self::first_text(&response)
            .map(|t| t.trim().to_string())
            .ok_or_else(|| DomainError::Chat("model returned no text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_json_clean() {
        let input = r#"{"plantName": "Rose"}"#;
        assert_eq!(GeminiAdapter::sanitize_json(input), input);
    }

    #[test]
    fn sanitize_json_markdown() {
        let input = "```json\n{\"plantName\": \"Rose\"}\n```";
        assert_eq!(
            GeminiAdapter::sanitize_json(input),
            r#"{"plantName": "Rose"}"#
        );
    }

    #[test]
    fn sanitize_json_markdown_no_lang() {
        let input = "```\n{\"plantName\": \"Rose\"}\n```";
        assert_eq!(
            GeminiAdapter::sanitize_json(input),
            r#"{"plantName": "Rose"}"#
        );
    }

    #[test]
    fn sanitize_json_with_text() {
        let input = "Here is the analysis:\n{\"plantName\": \"Rose\", \"recommendations\": []}";
        assert_eq!(
            GeminiAdapter::sanitize_json(input),
            r#"{"plantName": "Rose", "recommendations": []}"#
        );
    }

    #[test]
    fn schema_pins_the_required_fields() {
        let schema = GeminiAdapter::diagnosis_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec![
                "plantName",
                "healthStatus",
                "isColorChangingFlower",
                "diagnosis",
                "recommendations"
            ]
        );
        // Every summary field the notification engine keys off must be in
        // the declared schema.
        for field in [
            "hydrationSummary",
            "sunlightSummary",
            "pestDiseaseSummary",
            "repottingSummary",
            "pruningSummary",
            "harvestSummary",
        ] {
            assert!(schema["properties"][field].is_object(), "{field} missing");
        }
    }

    #[test]
    fn schema_constrained_output_parses_into_diagnosis() {
        // Shape the model returns under the declared schema.
        let raw = "```json\n{\
            \"plantName\": \"Hydrangea\",\
            \"healthStatus\": \"healthy\",\
            \"isColorChangingFlower\": true,\
            \"soilAcidity\": \"acidic soil (blue blooms)\",\
            \"colorChangeGuide\": {\"toBlue\": \"1/2 tsp aluminum sulfate\", \"toPink\": \"1/2 tsp garden lime\"},\
            \"diagnosis\": \"Thriving.\",\
            \"recommendations\": [\"keep soil moist\"]\
        }\n```";
        let diagnosis: Diagnosis =
            serde_json::from_str(&GeminiAdapter::sanitize_json(raw)).unwrap();
        assert!(diagnosis.is_color_changing_flower);
        assert_eq!(
            diagnosis.color_change_guide.unwrap().to_blue,
            "1/2 tsp aluminum sulfate"
        );
        assert_eq!(diagnosis.hydration_summary, None);
    }
}
