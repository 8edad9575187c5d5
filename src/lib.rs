// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # apigw-domains - Custom domain reconciler for API Gateway
//!
//! apigw-domains provisions and reconciles custom domain names for API
//! Gateway REST, HTTP and WebSocket APIs as part of a serverless
//! deployment.
//!
//! ## Overview
//!
//! For every configured domain, this library:
//!
//! - Selects an existing ACM certificate (explicit ARN, name, or best match)
//! - Creates the custom domain through the right API Gateway version
//! - Maps the deployment's API onto the domain under a base path
//! - Maintains Route53 alias records pointing at the domain's target
//! - Publishes the domain target as CloudFormation template outputs
//!
//! ## Modules
//!
//! - [`config`] - Manifest loading and the deployment context
//! - [`domain`] - Validated per-domain configuration
//! - [`services`] - Capability traits for the remote services
//! - [`aws`] - AWS SDK implementations of those traits
//! - [`reconcilers`] - Per-domain reconciliation steps
//! - [`manager`] - Lifecycle operations across all domains
//! - [`template`] - Template output binding
//!
//! ## Example
//!
//! ```rust,no_run
//! use apigw_domains::config::{load_domains, DeploymentContext, DeploymentOptions, ServiceManifest};
//! use apigw_domains::manager::DomainManager;
//! use apigw_domains::reconcilers::DomainReconciler;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let manifest = ServiceManifest::load(Path::new("serverless.yml"))?;
//! let ctx = Arc::new(DeploymentContext::from_manifest(&manifest, &DeploymentOptions::default()));
//! let domains = load_domains(&manifest, &ctx)?;
//! let services = apigw_domains::aws::connect(&ctx, None).await;
//!
//! let mut manager = DomainManager::new(DomainReconciler::new(ctx, services), domains);
//! manager.create_domains().await?;
//! # Ok(())
//! # }
//! ```

pub mod aws;
pub mod config;
pub mod constants;
pub mod domain;
pub mod errors;
pub mod manager;
pub mod reconcilers;
pub mod services;
pub mod template;

#[cfg(test)]
mod test_support;
