use super::{Backend, types::*};
use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, multipart};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(cfg: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if cfg.api.request_timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(cfg.api.request_timeout_seconds));
        }
        let client = builder.build().with_context(|| "building HTTP client")?;
        Ok(Self {
            client,
            base_url: cfg.api.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Backend for HttpBackend {
    fn submit(&self, job: &Job) -> Result<RawReply> {
        let url = self.url(job.endpoint());
        let body = job
            .body()
            .with_context(|| format!("serializing {} body", job.label()))?;
        debug!("POST {url}");
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .with_context(|| format!("POST {url}"))?;
        let status = resp.status().as_u16();
        // An unreadable body still leaves the status code to report.
        let body = resp.text().unwrap_or_default();
        Ok(RawReply { status, body })
    }

    fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        let url = self.url(&format!("/api/task/{task_id}/"));
        debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET {url}"))?;
        if !resp.status().is_success() {
            return Err(anyhow!("task status request failed: {}", resp.status().as_u16()));
        }
        let status: TaskStatus = resp
            .json()
            .with_context(|| format!("parsing task status JSON: {task_id}"))?;
        Ok(status)
    }

    fn fetch_report(&self) -> Result<String> {
        let url = self.url("/api/markdown/");
        debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .with_context(|| format!("GET {url}"))?;
        if !resp.status().is_success() {
            return Err(anyhow!("Report fetch failed: {}", resp.status().as_u16()));
        }
        resp.text().with_context(|| "reading report body")
    }

    fn download_template(&self) -> Result<Vec<u8>> {
        let url = self.url("/api/yaml/template/");
        debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET {url}"))?;
        if !resp.status().is_success() {
            return Err(anyhow!("Template download failed: {}", resp.status().as_u16()));
        }
        let bytes = resp.bytes().with_context(|| "reading template body")?;
        Ok(bytes.to_vec())
    }

    fn upload_config(&self, file: &Path) -> Result<UploadReply> {
        let url = self.url("/api/yaml/upload/");
        debug!("POST {url} file={}", file.display());
        let form = multipart::Form::new()
            .file("file", file)
            .with_context(|| format!("opening upload file: {}", file.display()))?;
        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .with_context(|| format!("POST {url}"))?;
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        if !status.is_success() {
            let msg = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| format!("Config upload failed: {}", status.as_u16()));
            return Err(anyhow!(msg));
        }
        serde_json::from_str(&body).with_context(|| "parsing upload reply JSON")
    }

    fn current_config(&self) -> Result<CurrentConfig> {
        let url = self.url("/api/yaml/config/");
        debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET {url}"))?;
        if !resp.status().is_success() {
            return Err(anyhow!("Config fetch failed: {}", resp.status().as_u16()));
        }
        resp.json().with_context(|| "parsing config JSON")
    }
}
