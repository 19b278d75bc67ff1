//! Three-phase artifact publishing client.
//!
//! Phase ordering is enforced structurally: `upload` and `finalize` consume
//! the [`RemoteArtifact`] that only `register` can produce, so a later phase
//! cannot run before an earlier one has succeeded. Each phase carries its
//! own retry budget; no phase retries by re-running an earlier one.

use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::response::{interpret_finish, interpret_register, RemoteArtifact};
use crate::retry::RetryPolicy;

const USER_AGENT: &str = "adeploy/0.2.0";

/// Closed set of artifact type tags understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    File,
    AndroidPackage,
    ApplePackage,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::File => "file",
            ArtifactKind::AndroidPackage => "android-package",
            ArtifactKind::ApplePackage => "apple-package",
        }
    }

    /// Content type sent with the binary upload, where the format has one.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            ArtifactKind::AndroidPackage => Some("application/vnd.android.package-archive"),
            _ => None,
        }
    }
}

/// Notification targets attached during finalize. The literal value `none`
/// and the empty value both mean "no recipients".
#[derive(Debug, Clone, Default)]
pub struct NotifyTargets {
    user_groups: Option<String>,
    emails: Option<String>,
}

impl NotifyTargets {
    pub fn new(user_groups: Option<String>, emails: Option<String>) -> Self {
        Self {
            user_groups,
            emails,
        }
    }

    pub fn user_groups(&self) -> &str {
        match self.user_groups.as_deref() {
            None | Some("") | Some("none") => "",
            Some(groups) => groups,
        }
    }

    pub fn emails(&self) -> &str {
        self.emails.as_deref().unwrap_or("")
    }
}

pub struct ArtifactClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    retry: RetryPolicy,
}

impl ArtifactClient {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self::with_retry(base_url, api_token, RetryPolicy::default())
    }

    pub fn with_retry(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            retry,
        }
    }

    /// Phase 1: create the artifact record on the service and obtain the
    /// upload target.
    pub async fn register(
        &self,
        title: &str,
        filename: &str,
        kind: ArtifactKind,
        file_size_bytes: u64,
    ) -> Result<RemoteArtifact> {
        let url = format!("{}/artifacts.json", self.base_url);
        let size = file_size_bytes.to_string();
        debug!("registering {} ({} bytes) at {}", filename, size, url);

        self.retry
            .run("register", || {
                self.register_once(&url, title, filename, kind, &size)
            })
            .await
    }

    async fn register_once(
        &self,
        url: &str,
        title: &str,
        filename: &str,
        kind: ArtifactKind,
        size: &str,
    ) -> Result<RemoteArtifact> {
        let response = self
            .http
            .post(url)
            .form(&[
                ("api_token", self.api_token.as_str()),
                ("title", title),
                ("filename", filename),
                ("artifact_type", kind.as_str()),
                ("file_size_bytes", size),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        interpret_register(status, &body)
    }

    /// Phase 2: binary PUT of the artifact bytes to the upload target from
    /// phase 1.
    pub async fn upload(
        &self,
        remote: &RemoteArtifact,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<()> {
        info!("uploading {} bytes", bytes.len());
        self.retry
            .run("upload", || self.upload_once(remote, bytes, content_type))
            .await
    }

    async fn upload_once(
        &self,
        remote: &RemoteArtifact,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<()> {
        let mut request = self.http.put(&remote.upload_url).body(bytes.to_vec());
        if let Some(content_type) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    /// Phase 3: attach metadata and notification targets, and resolve the
    /// public install page URL (empty string when the page was not
    /// requested).
    pub async fn finalize(
        &self,
        remote: &RemoteArtifact,
        artifact_info: Option<&str>,
        notify: &NotifyTargets,
        public_page: bool,
    ) -> Result<String> {
        let url = format!(
            "{}/artifacts/{}/finish_upload.json",
            self.base_url, remote.id
        );
        debug!("finalizing artifact {} at {}", remote.id, url);

        self.retry
            .run("finalize", || {
                self.finalize_once(&url, artifact_info, notify, public_page)
            })
            .await
    }

    async fn finalize_once(
        &self,
        url: &str,
        artifact_info: Option<&str>,
        notify: &NotifyTargets,
        public_page: bool,
    ) -> Result<String> {
        let mut form: Vec<(&str, &str)> = vec![("api_token", self.api_token.as_str())];
        if let Some(info) = artifact_info {
            form.push(("artifact_info", info));
        }
        form.push(("notify_user_groups", notify.user_groups()));
        form.push(("notify_emails", notify.emails()));
        if public_page {
            form.push(("is_enable_public_page", "yes"));
        }

        let response = self.http.post(url).form(&form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        interpret_finish(status, &body, public_page)
    }
}
