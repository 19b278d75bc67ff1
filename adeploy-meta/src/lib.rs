//! adeploy-meta: metadata extraction for deployable application packages
//!
//! This crate provides:
//! - Android package metadata via pattern matching over one
//!   `aapt dump badging` text blob
//! - Android SDK build-tools discovery (numerically newest release)
//! - Apple package metadata via projection from the bundle's Info.plist and
//!   embedded provisioning profile
//! - Injected inspector capabilities so extraction is testable without the
//!   real toolchain
//!
//! The two extraction paths deliberately disagree about absence: Android
//! fields that did not match degrade to the empty string, Apple fields that
//! are missing stay `null`. Downstream consumers depend on both sentinels.

pub mod apk;
pub mod error;
pub mod inspector;
pub mod ipa;
pub mod sdk;

pub use apk::ApkInfo;
pub use error::{MetaError, Result};
pub use inspector::{AaptBadging, BadgingSource, IpaReader, ZipIpaReader};
pub use ipa::{IpaDescriptors, IpaInfo};
pub use sdk::latest_build_tool;
