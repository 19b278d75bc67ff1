//! Deployment dispatcher and batch orchestrator.
//!
//! The dispatcher selects the extraction and upload strategy per artifact
//! from the filename suffix; the orchestrator walks the deploy source and
//! aggregates the per-artifact outcomes. Execution is strictly sequential:
//! one artifact at a time, one phase at a time, and any fatal error aborts
//! the whole run.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use adeploy_client::{ArtifactClient, ArtifactKind, NotifyTargets, RemoteArtifact};
use adeploy_meta::{ApkInfo, BadgingSource, IpaInfo, IpaReader};
use tracing::{debug, info, warn};

use crate::archive::compress_dir;
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};

pub struct Deployer<B, R> {
    config: DeployConfig,
    client: ArtifactClient,
    badging: B,
    ipa_reader: R,
}

impl<B: BadgingSource, R: IpaReader> Deployer<B, R> {
    pub fn new(config: DeployConfig, badging: B, ipa_reader: R) -> Self {
        let client = ArtifactClient::new(&config.base_url, &config.api_token);
        Self {
            config,
            client,
            badging,
            ipa_reader,
        }
    }

    /// Deploy the configured source and return the aggregate public install
    /// page URL: the first non-empty per-artifact outcome, or the empty
    /// string when no artifact produced one.
    pub async fn run(&self) -> Result<String> {
        let path = &self.config.deploy_path;
        if !path.exists() {
            return Err(DeployError::SourceMissing(path.clone()));
        }

        if !path.is_dir() {
            info!("Deploying single file");
            return self.deploy_file(path).await;
        }

        if self.config.compress {
            info!("Compressing the deploy directory");
            let archive = compress_dir(path)?;
            info!(" (i) archive: {}", archive.path().display());
            let url = self.deploy_file(archive.path()).await;
            // The temp archive guard removes the file on every exit path.
            return url;
        }

        info!("Uploading the deploy directory contents separately");
        let targets = collect_targets(path)?;
        if targets.is_empty() {
            info!("No files found to deploy");
        }
        for target in &targets {
            info!(" * {}", target.display());
        }

        deploy_each(targets, |target| async move {
            self.deploy_file(&target).await
        })
        .await
    }

    /// Deploy one artifact, selecting the strategy by filename suffix.
    pub async fn deploy_file(&self, path: &Path) -> Result<String> {
        let size = fs::metadata(path)?.len();
        info!(
            "Deploying {} ({:.2} MB)",
            path.display(),
            size as f64 / 1024.0 / 1024.0
        );

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ipa") => self.deploy_ipa(path, size).await,
            Some("apk") => self.deploy_apk(path, size).await,
            _ => self.deploy_generic(path, size).await,
        }
    }

    async fn deploy_ipa(&self, path: &Path, size: u64) -> Result<String> {
        info!("Analyzing the Apple package");
        let descriptors = self.ipa_reader.descriptors(path)?;
        let ipa_info = IpaInfo::from_descriptors(&descriptors, size);
        debug!("parsed package info: {:?}", ipa_info);

        let remote = self.register(path, ArtifactKind::ApplePackage, size).await?;
        self.upload(path, &remote, ArtifactKind::ApplePackage).await?;

        info!("=> Finishing the artifact");
        let info_json = ipa_info.artifact_info()?;
        Ok(self
            .client
            .finalize(
                &remote,
                Some(&info_json),
                &self.notify_targets(),
                self.config.public_page,
            )
            .await?)
    }

    async fn deploy_apk(&self, path: &Path, size: u64) -> Result<String> {
        info!("Collecting Android package metadata");
        let badging = self.badging.badging(path)?;
        let apk_info = ApkInfo::from_badging(&badging);
        debug!("parsed package info: {:?}", apk_info);

        let remote = self
            .register(path, ArtifactKind::AndroidPackage, size)
            .await?;
        self.upload(path, &remote, ArtifactKind::AndroidPackage)
            .await?;

        // The service has no public install page for Android packages.
        if self.config.public_page {
            warn!("public install page is not available for Android packages, disabling");
        }

        info!("=> Finishing the artifact");
        let info_json = apk_info.artifact_info(size)?;
        Ok(self
            .client
            .finalize(&remote, Some(&info_json), &self.notify_targets(), false)
            .await?)
    }

    async fn deploy_generic(&self, path: &Path, size: u64) -> Result<String> {
        let remote = self.register(path, ArtifactKind::File, size).await?;
        self.upload(path, &remote, ArtifactKind::File).await?;

        info!("=> Finishing the artifact");
        Ok(self
            .client
            .finalize(&remote, None, &NotifyTargets::default(), false)
            .await?)
    }

    async fn register(
        &self,
        path: &Path,
        kind: ArtifactKind,
        size: u64,
    ) -> Result<RemoteArtifact> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("=> Registering the artifact");
        Ok(self.client.register(&filename, &filename, kind, size).await?)
    }

    async fn upload(&self, path: &Path, remote: &RemoteArtifact, kind: ArtifactKind) -> Result<()> {
        info!("=> Uploading the artifact");
        let bytes = fs::read(path)?;
        Ok(self
            .client
            .upload(remote, &bytes, kind.content_type())
            .await?)
    }

    fn notify_targets(&self) -> NotifyTargets {
        NotifyTargets::new(
            self.config.notify_user_groups.clone(),
            self.config.notify_emails.clone(),
        )
    }
}

/// Immediate non-directory entries of `dir`, in enumeration order.
pub(crate) fn collect_targets(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut targets = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            targets.push(path);
        }
    }
    Ok(targets)
}

/// Deploy every target in order and keep the first non-empty outcome.
/// Finding a public page URL does not short-circuit the batch: the
/// remaining files are still deployed, their URLs just aren't kept.
pub(crate) async fn deploy_each<F, Fut>(targets: Vec<PathBuf>, mut deploy: F) -> Result<String>
where
    F: FnMut(PathBuf) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut first_url = String::new();
    for target in targets {
        let url = deploy(target).await?;
        if first_url.is_empty() && !url.is_empty() {
            first_url = url;
        }
    }
    Ok(first_url)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[tokio::test]
    async fn test_deploy_each_keeps_first_nonempty_outcome_but_dispatches_all() {
        let targets = vec![
            PathBuf::from("a.txt"),
            PathBuf::from("b.ipa"),
            PathBuf::from("c.ipa"),
        ];
        let dispatched = RefCell::new(Vec::new());

        let aggregate = deploy_each(targets, |target| {
            dispatched.borrow_mut().push(target.clone());
            let outcome = match target.to_string_lossy().as_ref() {
                "b.ipa" => "https://host.example.com/i/b",
                "c.ipa" => "https://host.example.com/i/c",
                _ => "",
            }
            .to_string();
            async move { Ok(outcome) }
        })
        .await
        .unwrap();

        assert_eq!(aggregate, "https://host.example.com/i/b");
        assert_eq!(dispatched.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_deploy_each_empty_batch_yields_empty_outcome() {
        let aggregate = deploy_each(Vec::new(), |_| async move { Ok(String::new()) })
            .await
            .unwrap();
        assert_eq!(aggregate, "");
    }

    #[tokio::test]
    async fn test_deploy_each_aborts_the_batch_on_a_fatal_error() {
        let targets = vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")];
        let dispatched = RefCell::new(0u32);

        let result = deploy_each(targets, |target| {
            *dispatched.borrow_mut() += 1;
            async move {
                if target.as_path() == Path::new("b") {
                    Err(DeployError::SourceMissing(target))
                } else {
                    Ok(String::new())
                }
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(*dispatched.borrow(), 2);
    }

    #[test]
    fn test_collect_targets_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.apk"), "apk").unwrap();
        fs::write(dir.path().join("notes.txt"), "notes").unwrap();
        fs::create_dir(dir.path().join("screenshots")).unwrap();

        let targets = collect_targets(dir.path()).unwrap();
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| !t.is_dir()));
    }
}
