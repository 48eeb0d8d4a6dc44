use anyhow::{Context, Result};
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url).context("invalid server URL")?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("server URL must start with http:// or https://");
        }
        // Relative joins replace the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("failed to build API URL")
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<Envelope<T>> {
        let response = req.send().await.context("request failed")?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("API error ({}): {}", status, describe_failure(&body));
        }
        serde_json::from_str(&body).context("unexpected response body")
    }

    async fn send_data<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        self.send::<T>(req)
            .await?
            .data
            .ok_or_else(|| anyhow::anyhow!("response carried no data"))
    }

    pub async fn list_contacts(&self, page: Option<u32>) -> Result<ContactPage> {
        let mut url = self.url("contacts")?;
        if let Some(page) = page {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }
        let envelope: Envelope<Vec<Contact>> = self.send(self.http.get(url)).await?;
        Ok(ContactPage {
            contacts: envelope.data.unwrap_or_default(),
            meta: envelope
                .meta
                .ok_or_else(|| anyhow::anyhow!("listing carried no pagination meta"))?,
        })
    }

    pub async fn get_contact(&self, id: i64) -> Result<Contact> {
        let url = self.url(&format!("contacts/{id}"))?;
        self.send_data(self.http.get(url)).await
    }

    pub async fn create_contact(&self, form: ContactForm) -> Result<Contact> {
        let url = self.url("contacts")?;
        self.send_data(self.http.post(url).multipart(form.into_multipart()?))
            .await
    }

    /// Sent as a POST with `_method=PUT` so an attachment can ride along.
    pub async fn update_contact(&self, id: i64, form: ContactForm) -> Result<Contact> {
        let mut url = self.url(&format!("contacts/{id}"))?;
        url.query_pairs_mut().append_pair("_method", "PUT");
        self.send_data(self.http.post(url).multipart(form.into_multipart()?))
            .await
    }

    pub async fn delete_contact(&self, id: i64) -> Result<String> {
        let url = self.url(&format!("contacts/{id}"))?;
        let envelope: Envelope<serde_json::Value> = self.send(self.http.delete(url)).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.url("health")?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("health request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("health check failed ({status}): {body}");
        }

        Ok(response.json::<HealthResponse>().await?)
    }
}

/// Render a failure envelope (message plus field errors) for the terminal.
/// Falls back to the raw body when it is not an envelope.
fn describe_failure(body: &str) -> String {
    let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(body) else {
        return body.to_string();
    };

    let mut out = envelope
        .message
        .or(envelope.error)
        .unwrap_or_else(|| body.to_string());
    if let Some(errors) = envelope.errors {
        for (field, messages) in errors {
            for message in messages {
                out.push_str(&format!("\n  {field}: {message}"));
            }
        }
    }
    out
}

// =============================================================================
// Request/response types (mirrored from server handlers)
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub message: String,
    pub file_path: Option<String>,
    pub file_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

#[derive(Debug)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// A file to attach to a submission.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Fields of a create or edit request; `None` fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub message: Option<String>,
    pub file: Option<Attachment>,
}

impl ContactForm {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.business_name.is_none()
            && self.message.is_none()
            && self.file.is_none()
    }

    fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for (field, value) in [
            ("name", self.name),
            ("email", self.email),
            ("phone", self.phone),
            ("business_name", self.business_name),
            ("message", self.message),
        ] {
            if let Some(value) = value {
                form = form.text(field, value);
            }
        }
        if let Some(file) = self.file {
            let part = Part::bytes(file.data)
                .file_name(file.filename)
                .mime_str("application/octet-stream")
                .context("invalid attachment content type")?;
            form = form.part("file", part);
        }
        Ok(form)
    }
}
