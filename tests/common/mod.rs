// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

use apigw_domains::config::{DeploymentContext, DeploymentOptions, ServiceManifest};

/// Environment variable naming the custom domain the tests may create
pub const DOMAIN_ENV: &str = "APIGW_DOMAINS_IT_DOMAIN";

/// Environment variable with the deployment region (default `us-east-1`)
pub const REGION_ENV: &str = "APIGW_DOMAINS_IT_REGION";

/// The domain under test, or `None` to skip
pub fn domain_or_skip() -> Option<String> {
    match std::env::var(DOMAIN_ENV) {
        Ok(domain) if !domain.trim().is_empty() => {
            println!("✓ Running AWS integration test against {domain}");
            Some(domain)
        }
        _ => {
            eprintln!("⊘ Skipping integration test: {DOMAIN_ENV} is not set");
            None
        }
    }
}

/// Manifest with one regional domain for the test domain
pub fn manifest(domain: &str) -> ServiceManifest {
    let region = std::env::var(REGION_ENV).unwrap_or_else(|_| "us-east-1".to_string());
    ServiceManifest::from_yaml(&format!(
        r#"
service: apigw-domains-it
provider:
  region: {region}
  stage: it
custom:
  customDomain:
    domainName: {domain}
    endpointType: regional
    apiType: http
"#
    ))
    .expect("valid integration manifest")
}

/// Deployment context for [`manifest`]
pub fn context(manifest: &ServiceManifest) -> DeploymentContext {
    DeploymentContext::from_manifest(manifest, &DeploymentOptions::default())
}
