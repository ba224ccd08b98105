use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{CONTENT_RANGE, HeaderMap, HeaderValue, USER_AGENT};

use crate::chunk::ChunkRange;
use crate::domain::{JobParameters, Session, SubmissionLink};
use crate::error::MaraError;

/// One chunk ready for transmission: the owning file's basename, its byte
/// range within that file, and the bytes themselves. Dropped as soon as its
/// attempt loop finishes.
#[derive(Debug, Clone)]
pub struct ChunkTransfer {
    pub file_name: String,
    pub range: ChunkRange,
    pub bytes: Vec<u8>,
}

/// Payload of the final run trigger: the job parameters minus the size map,
/// plus the remote references collected during classification.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub email: String,
    pub project: String,
    pub data_type: String,
    pub organism: String,
    pub mirna: bool,
    pub urls: Vec<String>,
    pub accessions: Vec<String>,
}

impl RunRequest {
    pub fn new(params: &JobParameters, urls: Vec<String>, accessions: Vec<String>) -> Self {
        Self {
            email: params.email.clone(),
            project: params.project.clone(),
            data_type: params.data_type.to_string(),
            organism: params.organism.to_string(),
            mirna: params.mirna,
            urls,
            accessions,
        }
    }

    pub fn url_list(&self) -> String {
        self.urls.join("\n")
    }

    pub fn srr_list(&self) -> String {
        self.accessions.join("\n")
    }
}

pub trait MaraClient: Send + Sync {
    fn acquire_session(&self) -> Result<Session, MaraError>;
    fn register_job(&self, session: &Session, params: &JobParameters) -> Result<(), MaraError>;
    fn upload_chunk(&self, session: &Session, chunk: &ChunkTransfer) -> Result<(), MaraError>;
    fn trigger_run(
        &self,
        session: &Session,
        request: &RunRequest,
    ) -> Result<SubmissionLink, MaraError>;
}

#[derive(Clone)]
pub struct MaraHttpClient {
    client: Client,
    base_url: String,
}

impl MaraHttpClient {
    pub fn new() -> Result<Self, MaraError> {
        Self::with_base_url("https://ismara.unibas.ch".to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, MaraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("ismara-upload/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MaraError::SessionHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|err| MaraError::SessionHttp(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl MaraClient for MaraHttpClient {
    fn acquire_session(&self) -> Result<Session, MaraError> {
        let response = self
            .client
            .get(self.endpoint("/mara/get_sd"))
            .send()
            .map_err(|err| MaraError::SessionHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "session request failed".to_string());
            return Err(MaraError::SessionStatus { status, message });
        }
        let body = response
            .text()
            .map_err(|err| MaraError::SessionHttp(err.to_string()))?;
        let token = body.lines().next().unwrap_or("").trim().to_string();
        if token.is_empty() {
            return Err(MaraError::EmptySession);
        }
        Ok(Session::new(token))
    }

    fn register_job(&self, session: &Session, params: &JobParameters) -> Result<(), MaraError> {
        let data = serde_json::to_string(params)
            .map_err(|err| MaraError::RegisterHttp(err.to_string()))?;
        let response = self
            .client
            .post(self.endpoint("/mara/save_json"))
            .form(&[("sd", session.as_str()), ("data", data.as_str())])
            .send()
            .map_err(|err| MaraError::RegisterHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "parameter registration failed".to_string());
            return Err(MaraError::RegisterStatus { status, message });
        }
        Ok(())
    }

    fn upload_chunk(&self, session: &Session, chunk: &ChunkTransfer) -> Result<(), MaraError> {
        let part = Part::bytes(chunk.bytes.clone())
            .file_name(chunk.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(|err| MaraError::UploadHttp(err.to_string()))?;
        let form = Form::new()
            .part("files[]", part)
            .text("sd", session.as_str().to_string());
        let content_range = HeaderValue::from_str(&chunk.range.content_range())
            .map_err(|err| MaraError::UploadHttp(err.to_string()))?;
        let response = self
            .client
            .post(self.endpoint("/mara/upload"))
            .header(CONTENT_RANGE, content_range)
            .multipart(form)
            .send()
            .map_err(|err| MaraError::UploadHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "chunk upload failed".to_string());
            return Err(MaraError::UploadStatus { status, message });
        }
        Ok(())
    }

    fn trigger_run(
        &self,
        session: &Session,
        request: &RunRequest,
    ) -> Result<SubmissionLink, MaraError> {
        let mirna = if request.mirna { "true" } else { "false" };
        let url_list = request.url_list();
        let srr_list = request.srr_list();
        let form = [
            ("sd", session.as_str()),
            ("email", request.email.as_str()),
            ("project", request.project.as_str()),
            ("type", request.data_type.as_str()),
            ("method", "ismara_uploader"),
            ("organism", request.organism.as_str()),
            ("url_list", url_list.as_str()),
            ("srr_list", srr_list.as_str()),
            ("mirna", mirna),
        ];
        let response = self
            .client
            .post(self.endpoint("/mara/run"))
            .form(&form)
            .send()
            .map_err(|err| MaraError::RunHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "job run request failed".to_string());
            return Err(MaraError::RunStatus { status, message });
        }
        let path = response
            .text()
            .map_err(|err| MaraError::RunHttp(err.to_string()))?;
        Ok(SubmissionLink::new(self.endpoint(path.trim())))
    }
}
