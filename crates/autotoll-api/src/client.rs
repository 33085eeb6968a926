//! Typed client for the autotoll backend REST API

use autotoll_types::{
    AnalysisResult, AnalyticsReport, Error, ImportOutcome, RawDetection, RegistrationForm,
    RegistryOwner, RegistryVehicle, Result, Summary, VehicleStatusReport, VehicleType,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// Default backend address when no configuration overrides it
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Client for the toll backend. Cheap to clone; all clones share
/// the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TollApi {
    http: reqwest::Client,
    base_url: String,
}

impl TollApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        TollApi {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a response body, mapping non-2xx statuses to errors.
    /// A JSON body with a `detail` field becomes a verbatim rejection.
    async fn take_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
                return Err(Error::Rejected(detail.to_string()));
            }
        }
        log::warn!("backend returned {} for request: {}", status, body);
        Err(Error::Http {
            status: status.as_u16(),
        })
    }

    /// Submit a captured image for recognition
    pub async fn analyze(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<AnalysisResult> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| Error::InvalidImage(e.to_string()))?;
        let form = Form::new().part("file", part);
        let response = self.http.post(self.url("/analyze")).multipart(form).send().await?;
        Self::take_json(response).await
    }

    /// Fetch persisted detections, newest first
    pub async fn history(&self) -> Result<Vec<RawDetection>> {
        let response = self.http.get(self.url("/api/history")).send().await?;
        Self::take_json(response).await
    }

    /// Fetch the trip log for one registered vehicle
    pub async fn vehicle_history(&self, vehicle_id: i64) -> Result<Vec<RawDetection>> {
        let response = self
            .http
            .get(self.url(&format!("/api/vehicles/{vehicle_id}/history")))
            .send()
            .await?;
        Self::take_json(response).await
    }

    /// Fetch the aggregate dashboard snapshot
    pub async fn summary(&self) -> Result<Summary> {
        let response = self.http.get(self.url("/api/summary")).send().await?;
        Self::take_json(response).await
    }

    /// Fetch chart datasets
    pub async fn analytics(&self) -> Result<AnalyticsReport> {
        let response = self.http.get(self.url("/api/analytics")).send().await?;
        Self::take_json(response).await
    }

    /// Fetch detections awaiting manual review
    pub async fn review_queue(&self) -> Result<Vec<RawDetection>> {
        let response = self.http.get(self.url("/api/review_queue")).send().await?;
        Self::take_json(response).await
    }

    /// Confirm a reviewed detection with corrected type and toll
    pub async fn confirm_detection(
        &self,
        id: i64,
        vehicle_type: VehicleType,
        toll_amount: f64,
    ) -> Result<()> {
        let form = Form::new()
            .text("vehicle_type", vehicle_type.label())
            .text("toll_amount", toll_amount.to_string());
        let response = self
            .http
            .put(self.url(&format!("/api/detections/{id}")))
            .multipart(form)
            .send()
            .await?;
        Self::take_json::<serde_json::Value>(response).await.map(|_| ())
    }

    /// Discard a detection permanently
    pub async fn delete_detection(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/detections/{id}")))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NO_CONTENT {
            return Ok(());
        }
        Self::take_json::<serde_json::Value>(response).await.map(|_| ())
    }

    /// Register an owner and vehicle, with an optional owner photo
    pub async fn register(
        &self,
        form_data: &RegistrationForm,
        photo: Option<(String, Vec<u8>)>,
    ) -> Result<()> {
        let mut form = Form::new()
            .text("name", form_data.name.clone())
            .text("contact_info", form_data.contact_info.clone())
            .text("license_plate", form_data.normalized_plate())
            .text("make_model", form_data.make_model.clone());
        if let Some((file_name, bytes)) = photo {
            form = form.part("photo", Part::bytes(bytes).file_name(file_name));
        }
        let response = self.http.post(self.url("/api/register")).multipart(form).send().await?;
        Self::take_json::<serde_json::Value>(response).await.map(|_| ())
    }

    /// Bulk-import registry rows from an uploaded file
    pub async fn import(&self, file_name: &str, bytes: Vec<u8>) -> Result<ImportOutcome> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let response = self.http.post(self.url("/api/import")).multipart(form).send().await?;
        Self::take_json(response).await
    }

    /// List registered vehicles
    pub async fn vehicles(&self) -> Result<Vec<RegistryVehicle>> {
        let response = self.http.get(self.url("/api/vehicles")).send().await?;
        Self::take_json(response).await
    }

    /// List registered owners
    pub async fn owners(&self) -> Result<Vec<RegistryOwner>> {
        let response = self.http.get(self.url("/api/owners")).send().await?;
        Self::take_json(response).await
    }

    /// Look up a plate's registration and outstanding balance
    pub async fn vehicle_status(&self, plate: &str) -> Result<VehicleStatusReport> {
        let plate = plate.trim().to_uppercase();
        let response = self
            .http
            .get(self.url(&format!("/api/vehicle/status/{plate}")))
            .send()
            .await?;
        Self::take_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let api = TollApi::new("http://localhost:8000/");
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url("/api/summary"), "http://localhost:8000/api/summary");
    }
}
