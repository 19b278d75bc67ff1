//! adeploy-client: client for the artifact-hosting service
//!
//! Implements the three-phase publish protocol:
//! - **register** creates the remote artifact record and returns the upload
//!   target,
//! - **upload** transfers the artifact bytes to that target,
//! - **finalize** attaches the extracted metadata and resolves the public
//!   install page URL.
//!
//! Each phase retries transient network failures under a fixed-delay,
//! 3-attempts-total budget. A failed upload never re-registers and a failed
//! finalize never re-uploads, so a flaky network cannot create duplicate
//! artifact records on the service.

pub mod client;
pub mod error;
pub mod response;
pub mod retry;

pub use client::{ArtifactClient, ArtifactKind, NotifyTargets};
pub use error::{ClientError, Result};
pub use response::RemoteArtifact;
pub use retry::RetryPolicy;
