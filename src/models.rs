use crate::aggregate::AggregationResult;
use crate::capacity::TableSpots;
use crate::charts::{Chart, DashboardCharts};
use crate::trend::TrendPoint;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One row of the registration sheet as returned by the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Registrant {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub table: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub languages: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
}

impl Registrant {
    pub fn at_table(table: &str) -> Self {
        Self {
            table: Some(table.to_string()),
            ..Self::default()
        }
    }
}

/// Response of a `type=latest` read. Older gateway deployments only send
/// `count`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestResponse {
    #[serde(default)]
    pub registrants: Option<Vec<Registrant>>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl LatestResponse {
    pub fn registrants(&self) -> &[Registrant] {
        self.registrants.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryEntry {
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "deleteKey",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub delete_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub table: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default = "default_rating")]
    pub rating: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub image: String,
    pub mime_type: String,
    pub filename: String,
    pub date: String,
    pub name: String,
}

/// `{result, error}` answer to gateway writes that report an outcome.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WriteOutcome {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        self.result.as_deref() == Some("success")
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadPayload {
    /// Base64 image bytes, with or without a `data:` URL prefix.
    pub image: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Dashboard query; `table` narrows the aggregation to one table.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<String>,
    pub table: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextEventResponse {
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationStatus {
    pub date: String,
    pub registered: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationConfirmation {
    pub name: String,
    pub table: String,
    pub date: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusMessage {
    pub ok: bool,
    pub message: String,
}

impl StatusMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GalleryCard {
    pub url: String,
    pub display_date: String,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub date: String,
    pub aggregation: AggregationResult,
    pub spots: Vec<TableSpots>,
    pub charts: DashboardCharts,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub start: String,
    pub end: String,
    pub points: Vec<TrendPoint>,
    pub chart: Chart,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticResponse {
    pub ok: bool,
    pub message: String,
    pub chart: Chart,
}

fn default_rating() -> String {
    "0".to_string()
}

/// Spreadsheet cells come back as strings, numbers or booleans.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registrant_reads_mixed_cell_types() {
        let registrant: Registrant = serde_json::from_value(serde_json::json!({
            "name": 42,
            "table": "it",
            "first_time": true,
            "languages": null
        }))
        .unwrap();
        assert_eq!(registrant.name.as_deref(), Some("42"));
        assert_eq!(registrant.first_time.as_deref(), Some("true"));
        assert_eq!(registrant.languages, None);
        assert_eq!(registrant.date, None);
    }

    #[test]
    fn latest_response_accepts_legacy_count() {
        let response: LatestResponse = serde_json::from_str(r#"{"count": 7}"#).unwrap();
        assert!(response.registrants().is_empty());
        assert_eq!(response.count, Some(7));
    }

    #[test]
    fn gallery_entry_reads_delete_key() {
        let entry: GalleryEntry = serde_json::from_str(
            r#"{"url":"https://img/1.jpg","date":"2025-10-22","id":3,"deleteKey":"abc"}"#,
        )
        .unwrap();
        assert_eq!(entry.id.as_deref(), Some("3"));
        assert_eq!(entry.delete_key.as_deref(), Some("abc"));
    }

    #[test]
    fn upload_request_uses_gateway_field_names() {
        let request = UploadRequest {
            image: "AAAA".to_string(),
            mime_type: "image/jpeg".to_string(),
            filename: "upload-1.jpg".to_string(),
            date: "2024-01-04".to_string(),
            name: "Admin".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["mimeType"], "image/jpeg");
    }
}
