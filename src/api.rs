use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{ApplicationStatus, RawApplication, RawJob, RecruiterProfile};

/// The recruiting backend as seen from this client. Everything the dashboard
/// knows about jobs and applications comes through here.
#[async_trait]
pub trait RecruiterApi: Send + Sync {
    async fn get_recruiter_profile(&self, user_id: &str) -> Result<RecruiterProfile, ApiError>;

    async fn get_recruiter_jobs(&self, recruiter_id: &str) -> Result<Vec<RawJob>, ApiError>;

    async fn get_recruiter_applications(
        &self,
        recruiter_id: &str,
    ) -> Result<Vec<RawApplication>, ApiError>;

    async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<(), ApiError>;
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: ApplicationStatus,
}

#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApiClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        debug!(%url, "GET");
        let response = self.authorize(self.client.get(&url)).send().await?;
        let body = Self::check(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Turns non-2xx responses into `ApiError::Status`, returning the body text otherwise.
    async fn check(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl RecruiterApi for HttpApiClient {
    async fn get_recruiter_profile(&self, user_id: &str) -> Result<RecruiterProfile, ApiError> {
        self.get_json(&format!("recruiters/user/{}", user_id)).await
    }

    async fn get_recruiter_jobs(&self, recruiter_id: &str) -> Result<Vec<RawJob>, ApiError> {
        // A recruiter without postings may come back as `null`
        let jobs: Option<Vec<RawJob>> = self
            .get_json(&format!("recruiters/{}/jobs", recruiter_id))
            .await?;
        Ok(jobs.unwrap_or_default())
    }

    async fn get_recruiter_applications(
        &self,
        recruiter_id: &str,
    ) -> Result<Vec<RawApplication>, ApiError> {
        let applications: Option<Vec<RawApplication>> = self
            .get_json(&format!("recruiters/{}/applications", recruiter_id))
            .await?;
        Ok(applications.unwrap_or_default())
    }

    async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("applications/{}/status", application_id));
        debug!(%url, status = status.as_wire(), "PATCH");
        let response = self
            .authorize(self.client.patch(&url))
            .json(&StatusUpdate { status })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client =
            HttpApiClient::new("http://localhost:3001/api/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint("/recruiters/user/u1"),
            "http://localhost:3001/api/recruiters/user/u1"
        );
        assert_eq!(
            client.endpoint("applications/a1/status"),
            "http://localhost:3001/api/applications/a1/status"
        );
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let result = HttpApiClient::new("localhost:3001", None, Duration::from_secs(5));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_status_update_body() {
        let body = serde_json::to_string(&StatusUpdate {
            status: ApplicationStatus::UnderReview,
        })
        .unwrap();
        assert_eq!(body, r#"{"status":"UNDER_REVIEW"}"#);
    }
}
