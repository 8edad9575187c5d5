// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! User configuration loading and normalization.
//!
//! The manifest follows the serverless layout: deployment settings live under
//! `provider`, custom domains under `custom.customDomain` (a single domain) or
//! `custom.customDomains` (a list). Raw values are kept loosely typed here and
//! normalized into [`DomainConfig`](crate::domain::DomainConfig) by the domain
//! module, so that ambiguous input fails fast with a [`ConfigError`].
//!
//! # Example
//!
//! ```rust
//! use apigw_domains::config::{DeploymentContext, DeploymentOptions, ServiceManifest};
//!
//! let manifest = ServiceManifest::from_yaml(
//!     r#"
//! service: orders
//! provider:
//!   region: eu-west-1
//! custom:
//!   customDomain:
//!     domainName: api.example.com
//! "#,
//! )
//! .unwrap();
//!
//! let ctx = DeploymentContext::from_manifest(&manifest, &DeploymentOptions::default());
//! assert_eq!(ctx.stack_name, "orders-dev");
//! ```

use crate::constants::{DEFAULT_REGION, DEFAULT_STAGE};
use crate::domain::{ApiType, DomainConfig};
use crate::errors::ConfigError;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Parse a boolean-ish configuration value.
///
/// Missing values yield `default_value`. Native booleans are returned as-is.
/// Strings are compared case- and whitespace-insensitively against
/// `true`/`1` and `false`/`0`. Anything else is rejected, raw truthiness is
/// never trusted.
///
/// # Errors
///
/// Returns [`ConfigError::AmbiguousBoolean`] for any other value.
///
/// # Example
///
/// ```rust
/// use apigw_domains::config::evaluate_boolean;
/// use serde_yaml::Value;
///
/// assert!(evaluate_boolean(None, true).unwrap());
/// assert!(!evaluate_boolean(Some(&Value::String(" FALSE ".into())), true).unwrap());
/// assert!(evaluate_boolean(Some(&Value::String("yes".into())), true).is_err());
/// ```
pub fn evaluate_boolean(value: Option<&Value>, default_value: bool) -> Result<bool, ConfigError> {
    match value {
        None | Some(Value::Null) => Ok(default_value),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::String(text)) => match text.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::AmbiguousBoolean {
                value: text.clone(),
            }),
        },
        Some(other) => Err(ConfigError::AmbiguousBoolean {
            value: render_value(other),
        }),
    }
}

/// Render a YAML value for an error message.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        other => serde_yaml::to_string(other)
            .map(|rendered| rendered.trim().to_string())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

/// Where the physical id of an existing API comes from.
///
/// Mirrors the three forms accepted in the manifest: a literal id, a
/// cross-stack `Fn::ImportValue`, or an intra-stack `Ref`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ApiIdSource {
    /// A literal API id
    Literal(String),
    /// A CloudFormation export name
    Import {
        /// Export name
        #[serde(rename = "Fn::ImportValue")]
        export_name: String,
    },
    /// A logical resource id in the deployment's stack
    Reference {
        /// Logical resource id
        #[serde(rename = "Ref")]
        logical_id: String,
    },
}

/// Raw settings for one custom domain, as written in the manifest.
///
/// Boolean-ish fields are kept as YAML values so they can be normalized by
/// [`evaluate_boolean`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDomainConfig {
    pub domain_name: Option<String>,
    pub base_path: Option<String>,
    pub stage: Option<String>,
    pub certificate_name: Option<String>,
    pub certificate_arn: Option<String>,
    pub create_route53_record: Option<Value>,
    #[serde(rename = "createRoute53IPv6Record")]
    pub create_route53_ipv6_record: Option<Value>,
    pub endpoint_type: Option<String>,
    pub api_type: Option<String>,
    pub hosted_zone_id: Option<String>,
    pub hosted_zone_private: Option<Value>,
    pub split_horizon_dns: Option<Value>,
    pub enabled: Option<Value>,
    pub security_policy: Option<String>,
    pub auto_domain: Option<Value>,
    pub auto_domain_wait_for: Option<Value>,
    pub allow_path_matching: Option<Value>,
    pub preserve_external_path_mappings: Option<Value>,
    pub route53_params: Option<RawRoute53Params>,
    pub tls_truststore_uri: Option<String>,
    pub tls_truststore_version: Option<String>,
}

/// Raw Route53 routing settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoute53Params {
    pub routing_policy: Option<String>,
    pub set_identifier: Option<String>,
    pub weight: Option<i64>,
    pub health_check_id: Option<String>,
}

/// A `customDomains` entry keyed by API type (`rest`, `http` or `websocket`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyedDomainConfig {
    pub rest: Option<RawDomainConfig>,
    pub http: Option<RawDomainConfig>,
    pub websocket: Option<RawDomainConfig>,
}

/// One item of `custom.customDomains`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DomainEntry {
    /// `- http: { domainName: ... }`
    Keyed(KeyedDomainConfig),
    /// `- domainName: ...`
    Plain(RawDomainConfig),
}

/// The `custom` section of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSection {
    pub custom_domain: Option<RawDomainConfig>,
    pub custom_domains: Option<Vec<DomainEntry>>,
}

/// `provider.apiGateway`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProvider {
    pub rest_api_id: Option<ApiIdSource>,
    pub websocket_api_id: Option<ApiIdSource>,
}

/// `provider.httpApi`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HttpApiProvider {
    pub id: Option<ApiIdSource>,
}

/// The `provider` section of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub region: Option<String>,
    pub stage: Option<String>,
    pub stack_name: Option<String>,
    #[serde(default)]
    pub stack_tags: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub api_gateway: ApiGatewayProvider,
    #[serde(default)]
    pub http_api: HttpApiProvider,
}

/// The deployment manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceManifest {
    pub service: String,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub custom: CustomSection,
}

impl ServiceManifest {
    /// Parse a manifest from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Manifest`] if the YAML does not match the manifest layout.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Manifest {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Manifest`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading manifest");
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Manifest {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_yaml::from_str(&text).map_err(|e| ConfigError::Manifest {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Flatten `customDomain` and `customDomains` into raw domain entries.
    ///
    /// Keyed entries get their `apiType` from the key.
    #[must_use]
    pub fn raw_domains(&self) -> Vec<RawDomainConfig> {
        let mut domains = Vec::new();

        if let Some(single) = &self.custom.custom_domain {
            domains.push(single.clone());
        }

        for entry in self.custom.custom_domains.iter().flatten() {
            match entry {
                DomainEntry::Plain(raw) => domains.push(raw.clone()),
                DomainEntry::Keyed(keyed) => {
                    let typed = [
                        (&keyed.rest, ApiType::Rest),
                        (&keyed.http, ApiType::Http),
                        (&keyed.websocket, ApiType::Websocket),
                    ];
                    for (raw, api_type) in typed {
                        if let Some(raw) = raw {
                            let mut raw = raw.clone();
                            raw.api_type = Some(api_type.as_str().to_string());
                            domains.push(raw);
                        }
                    }
                }
            }
        }

        domains
    }
}

/// Command-line overrides applied on top of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentOptions {
    pub stage: Option<String>,
    pub region: Option<String>,
}

/// Immutable deployment-wide settings shared by every component.
///
/// Built once per run and passed by reference; there is no ambient
/// configuration state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    /// Service name from the manifest
    pub service: String,
    /// Effective stage
    pub stage: String,
    /// Deployment region
    pub region: String,
    /// Name of the deployment's CloudFormation stack
    pub stack_name: String,
    /// Stack-level tags
    pub stack_tags: BTreeMap<String, String>,
    /// Service-level tags
    pub tags: BTreeMap<String, String>,
    /// Explicit REST API id
    pub rest_api_id: Option<ApiIdSource>,
    /// Explicit HTTP API id
    pub http_api_id: Option<ApiIdSource>,
    /// Explicit WebSocket API id
    pub websocket_api_id: Option<ApiIdSource>,
}

impl DeploymentContext {
    /// Build the context from the manifest and command-line overrides.
    ///
    /// Stage: CLI, then `provider.stage`, then `dev`. Region: CLI, then
    /// `provider.region`, then `us-east-1`. Stack name: `provider.stackName`,
    /// then `<service>-<stage>`.
    #[must_use]
    pub fn from_manifest(manifest: &ServiceManifest, options: &DeploymentOptions) -> Self {
        let provider = &manifest.provider;
        let stage = options
            .stage
            .clone()
            .or_else(|| provider.stage.clone())
            .unwrap_or_else(|| DEFAULT_STAGE.to_string());
        let region = options
            .region
            .clone()
            .or_else(|| provider.region.clone())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let stack_name = provider
            .stack_name
            .clone()
            .unwrap_or_else(|| format!("{}-{}", manifest.service, stage));

        Self {
            service: manifest.service.clone(),
            stage,
            region,
            stack_name,
            stack_tags: provider.stack_tags.clone(),
            tags: provider.tags.clone(),
            rest_api_id: provider.api_gateway.rest_api_id.clone(),
            http_api_id: provider.http_api.id.clone(),
            websocket_api_id: provider.api_gateway.websocket_api_id.clone(),
        }
    }

    /// Stack tags merged with service tags; service tags win on collision.
    #[must_use]
    pub fn merged_tags(&self) -> BTreeMap<String, String> {
        let mut merged = self.stack_tags.clone();
        merged.extend(self.tags.clone());
        merged
    }

    /// The explicit API id configured for an API type, if any.
    #[must_use]
    pub fn api_id_source(&self, api_type: ApiType) -> Option<&ApiIdSource> {
        match api_type {
            ApiType::Rest => self.rest_api_id.as_ref(),
            ApiType::Http => self.http_api_id.as_ref(),
            ApiType::Websocket => self.websocket_api_id.as_ref(),
        }
    }
}

/// Build validated domain configurations from the manifest.
///
/// Disabled domains are dropped. An empty result is not an error as long as
/// at least one domain was configured.
///
/// # Errors
///
/// Returns [`ConfigError::MissingDomains`] if no domain is configured at all,
/// or the first validation error of any enabled domain.
pub fn load_domains(
    manifest: &ServiceManifest,
    ctx: &DeploymentContext,
) -> Result<Vec<DomainConfig>, ConfigError> {
    let raw_domains = manifest.raw_domains();
    if raw_domains.is_empty() {
        return Err(ConfigError::MissingDomains);
    }

    let mut domains = Vec::with_capacity(raw_domains.len());
    for raw in &raw_domains {
        if !evaluate_boolean(raw.enabled.as_ref(), true)? {
            info!(
                domain = raw.domain_name.as_deref().unwrap_or_default(),
                "Custom domain is disabled, skipping"
            );
            continue;
        }
        domains.push(DomainConfig::new(raw, ctx)?);
    }

    debug!(
        configured = raw_domains.len(),
        enabled = domains.len(),
        "Loaded custom domain configuration"
    );

    Ok(domains)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
