use std::time::Duration;

use reqwest::Client;

use super::error::KieError;
use super::types::{CreateTaskRequest, CreateTaskResponse, UploadRequest, UploadResponse};

const API_BASE_URL: &str = "https://api.kie.ai";
const UPLOAD_BASE_URL: &str = "https://kieai.redpandaai.co";

/// HTTP client for the Kie.ai job API: file upload and task submission.
///
/// Credentials and endpoints are explicit constructor inputs; nothing is
/// read from ambient state.
pub struct KieClient {
    api_key: String,
    client: Client,
    api_base_url: String,
    upload_base_url: String,
}

impl KieClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_urls(api_key, API_BASE_URL.to_string(), UPLOAD_BASE_URL.to_string())
    }

    /// Create a client pointing at custom base URLs (useful for testing).
    pub fn with_base_urls(api_key: String, api_base_url: String, upload_base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self {
            api_key,
            client,
            api_base_url,
            upload_base_url,
        }
    }

    /// Upload a base64-encoded image; returns the hosted download URL.
    pub async fn upload_file(&self, req: &UploadRequest) -> Result<String, KieError> {
        let url = format!("{}/api/file-base64-upload", self.upload_base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(KieError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<UploadResponse>().await?;
        if !body.success {
            return Err(KieError::MalformedResponse(
                "upload response reported success=false".into(),
            ));
        }
        body.data
            .map(|d| d.download_url)
            .ok_or_else(|| KieError::MalformedResponse("upload response missing downloadUrl".into()))
    }

    /// Submit a generation task; returns the provider-assigned task id.
    ///
    /// An HTTP 200 with a logical `code != 200` in the body is still a
    /// submission failure and maps to [`KieError::LogicalError`].
    pub async fn create_task(&self, req: &CreateTaskRequest) -> Result<String, KieError> {
        let url = format!("{}/api/v1/jobs/createTask", self.api_base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(KieError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<CreateTaskResponse>().await?;
        if body.code != 200 {
            return Err(KieError::LogicalError {
                code: body.code,
                message: body.msg.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        body.data
            .map(|d| d.task_id)
            .ok_or_else(|| KieError::MalformedResponse("createTask response missing taskId".into()))
    }
}
