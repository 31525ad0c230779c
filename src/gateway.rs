use crate::errors::GatewayError;
use crate::models::{
    FeedbackRequest, GalleryEntry, LatestResponse, RegistrationRequest, UploadRequest, WriteOutcome,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Tagged write bodies understood by the gateway. Registrations carry no
/// `type` and are sent as a bare [`RegistrationRequest`].
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedWrite<'a> {
    Feedback(&'a FeedbackRequest),
    Upload(&'a UploadRequest),
    Delete { key: &'a str },
}

/// Client for the spreadsheet-backed endpoint that stores registrations,
/// feedback and gallery photos.
#[derive(Clone)]
pub struct Gateway {
    client: reqwest::Client,
    url: String,
}

impl Gateway {
    pub fn new(url: impl Into<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn latest(&self, date: NaiveDate) -> Result<LatestResponse, GatewayError> {
        let date = crate::dates::date_key(date);
        let response = self
            .client
            .get(&self.url)
            .query(&[("type", "latest"), ("date", date.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Newest first, as the sheet stores them. Anything other than a list
    /// reads as an empty gallery.
    pub async fn gallery(&self) -> Result<Vec<GalleryEntry>, GatewayError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("type", "gallery")])
            .send()
            .await?
            .error_for_status()?;
        let payload: Value = response.json().await?;
        match payload {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    /// The sheet answers registrations opaquely, so failures are only logged.
    pub async fn register(&self, request: &RegistrationRequest) {
        if let Err(err) = self.post(request).await {
            warn!(date = %request.date, "registration write not confirmed: {err}");
        }
    }

    pub async fn feedback(&self, request: &FeedbackRequest) {
        if let Err(err) = self.post(&TaggedWrite::Feedback(request)).await {
            warn!("feedback write not confirmed: {err}");
        }
    }

    pub async fn upload(&self, request: &UploadRequest) -> Result<(), GatewayError> {
        let outcome: WriteOutcome = self.post(&TaggedWrite::Upload(request)).await?.json().await?;
        if outcome.is_success() {
            Ok(())
        } else {
            Err(GatewayError::Rejected(
                outcome.error.unwrap_or_else(|| "Upload failed".to_string()),
            ))
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), GatewayError> {
        let outcome: WriteOutcome = self.post(&TaggedWrite::Delete { key }).await?.json().await?;
        if outcome.is_success() {
            Ok(())
        } else {
            Err(GatewayError::Rejected("Failed to delete".to_string()))
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, body: &T) -> Result<reqwest::Response, GatewayError> {
        // The sheet script reads the raw post body, not a JSON content type.
        let payload = serde_json::to_string(body).map_err(|err| GatewayError::Rejected(err.to_string()))?;
        debug!(bytes = payload.len(), "posting to gateway");
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_writes_carry_their_type() {
        let feedback = FeedbackRequest {
            name: "Ann".to_string(),
            topic: "venue".to_string(),
            rating: "5".to_string(),
            message: "great".to_string(),
        };
        let value = serde_json::to_value(TaggedWrite::Feedback(&feedback)).unwrap();
        assert_eq!(value["type"], "feedback");
        assert_eq!(value["rating"], "5");

        let value = serde_json::to_value(TaggedWrite::Delete { key: "abc" }).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "delete", "key": "abc" }));
    }

    #[test]
    fn registration_body_has_no_type() {
        let request = RegistrationRequest {
            name: "Ann".to_string(),
            table: "it".to_string(),
            date: "2024-01-04".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("type").is_none());
    }
}
