use reqwest::{Client, Method, RequestBuilder};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::api::error::RequestError;
use crate::api::types::{decode_body, is_empty_body};
use crate::api::{AdminBackend, ApiResult, KycBackend};
use crate::config::ClientConfig;
use crate::models::kyc::{KycReviewRecord, KycStatusReport, KycSubmission, ReviewRequest, ReviewStatus};
use crate::utils::form_data::FormPayload;

/// REST implementation of the backend traits.
#[derive(Debug, Clone)]
pub struct HttpKycBackend {
    base_url: String,
    access_token: Option<String>,
    client: Client,
}

impl HttpKycBackend {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &ClientConfig, client: Client) -> Self {
        Self {
            base_url: config.api_url.clone(),
            access_token: config.access_token.clone(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the body of a 2xx response.
    /// Anything else is normalised into a [`RequestError`].
    async fn execute(&self, action: &'static str, builder: RequestBuilder) -> ApiResult<String> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("kyc_request", request_id = %request_id, action);

        async move {
            let response = builder
                .header("X-Request-Id", request_id.as_str())
                .send()
                .await
                .map_err(|e| {
                    warn!(action, error = %e, "backend unreachable");
                    RequestError::from(e)
                })?;

            let status = response.status();
            let body = response.text().await.map_err(RequestError::from)?;

            if status.is_success() {
                info!(action, status = status.as_u16(), "backend call succeeded");
                Ok(body)
            } else {
                let err = RequestError::from_response(status.as_u16(), &body);
                warn!(action, status = status.as_u16(), error = %err, "backend call failed");
                Err(err)
            }
        }
        .instrument(span)
        .await
    }

    fn multipart(payload: FormPayload) -> ApiResult<reqwest::multipart::Form> {
        payload
            .into_multipart()
            .map_err(|e| RequestError::validation(e.to_string()))
    }
}

impl KycBackend for HttpKycBackend {
    async fn submit(&self, payload: FormPayload) -> ApiResult<KycSubmission> {
        let form = Self::multipart(payload)?;
        let body = self
            .execute("kyc_submit", self.request(Method::POST, "/kyc/submit/").multipart(form))
            .await?;
        decode_body(&body)
    }

    async fn fetch_mine(&self) -> ApiResult<Option<KycSubmission>> {
        match self.execute("kyc_fetch_mine", self.request(Method::GET, "/kyc/my-kyc/")).await {
            Ok(body) if is_empty_body(&body) => Ok(None),
            Ok(body) => decode_body(&body).map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn update(&self, payload: FormPayload) -> ApiResult<KycSubmission> {
        let form = Self::multipart(payload)?;
        let body = self
            .execute("kyc_update", self.request(Method::PUT, "/kyc/update/").multipart(form))
            .await?;
        decode_body(&body)
    }

    async fn fetch_status(&self) -> ApiResult<KycStatusReport> {
        match self.execute("kyc_status", self.request(Method::GET, "/kyc/status/")).await {
            Ok(body) => decode_body(&body),
            // The backend answers 404 {"status": "not_submitted"} before a first submission.
            Err(err) if err.is_not_found() => Ok(KycStatusReport::not_submitted()),
            Err(err) => Err(err),
        }
    }
}

impl AdminBackend for HttpKycBackend {
    async fn list(&self, filter: Option<ReviewStatus>) -> ApiResult<Vec<KycReviewRecord>> {
        let mut builder = self.request(Method::GET, "/kyc/admin/list/");
        if let Some(status) = filter {
            builder = builder.query(&[("status", status.as_str())]);
        }
        let body = self.execute("admin_kyc_list", builder).await?;
        if is_empty_body(&body) {
            return Ok(Vec::new());
        }
        decode_body(&body)
    }

    async fn detail(&self, id: u64) -> ApiResult<KycReviewRecord> {
        let path = format!("/kyc/admin/detail/{}/", id);
        let body = self.execute("admin_kyc_detail", self.request(Method::GET, &path)).await?;
        decode_body(&body)
    }

    async fn review(&self, id: u64, request: ReviewRequest) -> ApiResult<KycReviewRecord> {
        let path = format!("/kyc/admin/review/{}/", id);
        let body = self
            .execute("admin_kyc_review", self.request(Method::PATCH, &path).json(&request))
            .await?;
        decode_body(&body)
    }
}
