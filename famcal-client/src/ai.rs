//! AI-assisted intake: the backend reads an email or a photo (a flyer, a
//! school letter) and proposes events.

use famcal_core::EventDraft;
use famcal_core::validation::ValidationErrors;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};

/// Largest image the backend accepts.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const IMAGE_TYPES: [(&str, &str); 5] = [
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
];

/// Events the backend extracted, not yet saved.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub events: Vec<EventDraft>,
    /// Free-text note from the analyzer (e.g. what it could not read)
    #[serde(default)]
    pub summary: Option<String>,
}

/// MIME type for an image file name, by extension.
pub fn image_mime_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

fn invalid(field: &str, message: &str) -> ApiError {
    let mut errors = ValidationErrors::new();
    errors.add(field, message);
    ApiError::Validation(errors)
}

impl ApiClient {
    /// POST /ai/analyze-email
    pub async fn analyze_email(&self, content: &str, child_id: Option<i64>) -> ApiResult<AnalysisResult> {
        if content.trim().is_empty() {
            return Err(invalid("content", "Paste the email text to analyze"));
        }

        let request = self
            .request(Method::POST, "/ai/analyze-email", true)?
            .json(&json!({ "content": content, "childId": child_id }));

        let result: AnalysisResult = self.send(request).await?;
        tracing::debug!(proposed = result.events.len(), "analyzed email");
        Ok(result)
    }

    /// POST /ai/analyze-image (multipart, field `image`)
    pub async fn analyze_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        child_id: Option<i64>,
    ) -> ApiResult<AnalysisResult> {
        let mime = image_mime_type(file_name)
            .ok_or_else(|| invalid("image", "Image must be a JPEG, PNG, WebP or HEIC file"))?;
        if bytes.is_empty() {
            return Err(invalid("image", "Image file is empty"));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(invalid("image", "Image must be 10 MB or smaller"));
        }

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let mut form = Form::new().part("image", part);
        if let Some(id) = child_id {
            form = form.text("childId", id.to_string());
        }

        let request = self
            .request(Method::POST, "/ai/analyze-image", true)?
            .multipart(form);

        let result: AnalysisResult = self.send(request).await?;
        tracing::debug!(proposed = result.events.len(), file_name, "analyzed image");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types_by_extension() {
        assert_eq!(image_mime_type("flyer.JPG"), Some("image/jpeg"));
        assert_eq!(image_mime_type("letter.png"), Some("image/png"));
        assert_eq!(image_mime_type("notes.pdf"), None);
        assert_eq!(image_mime_type("no-extension"), None);
    }

    #[test]
    fn decodes_partial_drafts() {
        let result: AnalysisResult = serde_json::from_value(serde_json::json!({
            "events": [{ "title": "Field trip", "startDate": "2025-04-11", "type": "school" }],
            "summary": "Found one event"
        }))
        .unwrap();

        let draft = result.events[0].clone().with_default_color();
        assert_eq!(draft.kind, famcal_core::EventType::School);
        assert_eq!(draft.color, "#3B82F6");
    }
}
