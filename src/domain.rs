// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Validated per-domain configuration.
//!
//! A [`DomainConfig`] is the unit of work for every reconciler. It is built
//! once from a [`RawDomainConfig`] plus the [`DeploymentContext`], validated
//! up front, and afterwards only its derived fields (`domain_info`, `api_id`,
//! `api_mapping`) change as remote lookups complete.

use crate::config::{evaluate_boolean, render_value, DeploymentContext, RawDomainConfig};
use crate::constants::{
    DEFAULT_AUTO_DOMAIN_WAIT_SECS, DEFAULT_BASE_PATH, DEFAULT_ROUTE53_WEIGHT, RESERVED_BASE_PATHS,
};
use crate::errors::ConfigError;
use crate::services::{ApiMapping, DomainInfo};
use percent_encoding::percent_decode_str;
use serde_yaml::Value;
use std::fmt;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Declares a configuration enum with its accepted (case-insensitive) spellings.
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical spelling used by the remote APIs
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Parse a case-insensitive spelling
            #[must_use]
            pub fn parse(text: &str) -> Option<Self> {
                let wanted = text.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(wanted))
            }

            fn allowed() -> String {
                Self::ALL
                    .iter()
                    .map(|candidate| candidate.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

config_enum! {
    /// Where the API endpoint is served from.
    EndpointType {
        /// CloudFront-fronted, global
        Edge => "EDGE",
        /// Region-local
        Regional => "REGIONAL",
        /// VPC-only
        Private => "PRIVATE",
    }
}

config_enum! {
    /// Kind of API behind the domain.
    ApiType {
        Rest => "REST",
        Http => "HTTP",
        Websocket => "WEBSOCKET",
    }
}

config_enum! {
    /// Minimum TLS version negotiated by the domain.
    SecurityPolicy {
        Tls10 => "TLS_1_0",
        Tls12 => "TLS_1_2",
        Tls13 => "TLS_1_3",
    }
}

config_enum! {
    /// Route53 routing policy for the alias records.
    RoutingPolicy {
        Simple => "simple",
        Latency => "latency",
        Weighted => "weighted",
    }
}

/// Route53 record settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route53Params {
    pub routing_policy: RoutingPolicy,
    pub set_identifier: Option<String>,
    pub weight: i64,
    pub health_check_id: Option<String>,
}

impl Default for Route53Params {
    fn default() -> Self {
        Self {
            routing_policy: RoutingPolicy::Simple,
            set_identifier: None,
            weight: DEFAULT_ROUTE53_WEIGHT,
            health_check_id: None,
        }
    }
}

/// Validated settings for one custom domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainConfig {
    /// The user-facing domain name
    pub given_domain_name: String,
    /// Base path, `(none)` for the domain root
    pub base_path: String,
    /// Stage the API is mapped to
    pub stage: String,
    pub endpoint_type: EndpointType,
    pub api_type: ApiType,
    pub security_policy: SecurityPolicy,
    pub certificate_arn: Option<String>,
    pub certificate_name: Option<String>,
    pub create_route53_record: bool,
    pub create_route53_ipv6_record: bool,
    pub hosted_zone_id: Option<String>,
    pub hosted_zone_private: Option<bool>,
    /// Create records in both the public and the private zone
    pub split_horizon_dns: bool,
    pub route53_params: Route53Params,
    pub tls_truststore_uri: Option<String>,
    pub tls_truststore_version: Option<String>,
    pub auto_domain: bool,
    pub auto_domain_wait_for: Duration,
    pub allow_path_matching: bool,
    pub preserve_external_path_mappings: bool,

    /// Remote domain state; `None` until looked up, or if the domain does not exist
    pub domain_info: Option<DomainInfo>,
    /// Resolved id of the API behind the domain
    pub api_id: Option<String>,
    /// Current remote mapping of this API on the domain
    pub api_mapping: Option<ApiMapping>,
}

impl DomainConfig {
    /// Validate raw settings against the deployment context.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a missing domain name, an unknown enum
    /// value, an ambiguous boolean, or an incompatible combination (EDGE with
    /// HTTP/WebSocket, EDGE with latency/weighted routing, EDGE with mutual TLS).
    pub fn new(raw: &RawDomainConfig, ctx: &DeploymentContext) -> Result<Self, ConfigError> {
        let given_domain_name = non_blank(raw.domain_name.as_deref())
            .ok_or(ConfigError::MissingDomainName)?
            .to_string();
        let domain = given_domain_name.as_str();

        let base_path = non_blank(raw.base_path.as_deref())
            .unwrap_or(DEFAULT_BASE_PATH)
            .to_string();
        if RESERVED_BASE_PATHS.contains(&base_path.as_str()) {
            warn!(
                domain = %domain,
                base_path = %base_path,
                "Base path is reserved by API Gateway and may conflict with its health checks"
            );
        }

        let stage = non_blank(raw.stage.as_deref())
            .unwrap_or(&ctx.stage)
            .to_string();

        let endpoint_type = parse_choice(
            domain,
            "endpointType",
            raw.endpoint_type.as_deref(),
            EndpointType::Edge,
            EndpointType::parse,
            EndpointType::allowed,
        )?;
        let api_type = parse_choice(
            domain,
            "apiType",
            raw.api_type.as_deref(),
            ApiType::Rest,
            ApiType::parse,
            ApiType::allowed,
        )?;
        let security_policy = parse_choice(
            domain,
            "securityPolicy",
            raw.security_policy.as_deref(),
            SecurityPolicy::Tls12,
            SecurityPolicy::parse,
            SecurityPolicy::allowed,
        )?;

        if endpoint_type == EndpointType::Edge && api_type != ApiType::Rest {
            return Err(ConfigError::EdgeApiType {
                domain: domain.to_string(),
                api_type: api_type.to_string(),
            });
        }

        let hosted_zone_id = non_blank(raw.hosted_zone_id.as_deref()).map(str::to_string);
        let hosted_zone_private = match &raw.hosted_zone_private {
            None | Some(Value::Null) => None,
            Some(value) => Some(evaluate_boolean(Some(value), false)?),
        };
        let split_horizon_dns = hosted_zone_id.is_none()
            && hosted_zone_private.is_none()
            && evaluate_boolean(raw.split_horizon_dns.as_ref(), false)?;

        let route53_params = build_route53_params(domain, raw, endpoint_type)?;

        let tls_truststore_uri = non_blank(raw.tls_truststore_uri.as_deref()).map(str::to_string);
        if let Some(uri) = &tls_truststore_uri {
            if endpoint_type == EndpointType::Edge {
                return Err(ConfigError::EdgeMutualTls {
                    domain: domain.to_string(),
                });
            }
            parse_s3_uri(uri).map_err(|reason| ConfigError::InvalidTruststoreUri {
                domain: domain.to_string(),
                uri: uri.clone(),
                reason,
            })?;
        }

        Ok(Self {
            base_path,
            stage,
            endpoint_type,
            api_type,
            security_policy,
            certificate_arn: non_blank(raw.certificate_arn.as_deref()).map(str::to_string),
            certificate_name: non_blank(raw.certificate_name.as_deref()).map(str::to_string),
            create_route53_record: evaluate_boolean(raw.create_route53_record.as_ref(), true)?,
            create_route53_ipv6_record: evaluate_boolean(
                raw.create_route53_ipv6_record.as_ref(),
                true,
            )?,
            hosted_zone_id,
            hosted_zone_private,
            split_horizon_dns,
            route53_params,
            tls_truststore_uri,
            tls_truststore_version: non_blank(raw.tls_truststore_version.as_deref())
                .map(str::to_string),
            auto_domain: evaluate_boolean(raw.auto_domain.as_ref(), false)?,
            auto_domain_wait_for: parse_wait_for(domain, raw.auto_domain_wait_for.as_ref())?,
            allow_path_matching: evaluate_boolean(raw.allow_path_matching.as_ref(), false)?,
            preserve_external_path_mappings: evaluate_boolean(
                raw.preserve_external_path_mappings.as_ref(),
                false,
            )?,
            domain_info: None,
            api_id: None,
            api_mapping: None,
            given_domain_name,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

fn parse_choice<T>(
    domain: &str,
    field: &'static str,
    raw: Option<&str>,
    default: T,
    parse: fn(&str) -> Option<T>,
    allowed: fn() -> String,
) -> Result<T, ConfigError> {
    match non_blank(raw) {
        None => Ok(default),
        Some(text) => parse(text).ok_or_else(|| ConfigError::UnsupportedValue {
            domain: domain.to_string(),
            field,
            value: text.to_string(),
            allowed: allowed(),
        }),
    }
}

fn build_route53_params(
    domain: &str,
    raw: &RawDomainConfig,
    endpoint_type: EndpointType,
) -> Result<Route53Params, ConfigError> {
    let Some(params) = &raw.route53_params else {
        return Ok(Route53Params::default());
    };

    let routing_policy = parse_choice(
        domain,
        "route53Params.routingPolicy",
        params.routing_policy.as_deref(),
        RoutingPolicy::Simple,
        RoutingPolicy::parse,
        RoutingPolicy::allowed,
    )?;

    if endpoint_type == EndpointType::Edge && routing_policy != RoutingPolicy::Simple {
        return Err(ConfigError::EdgeRoutingPolicy {
            domain: domain.to_string(),
            policy: routing_policy.to_string(),
        });
    }

    Ok(Route53Params {
        routing_policy,
        set_identifier: non_blank(params.set_identifier.as_deref()).map(str::to_string),
        weight: params.weight.unwrap_or(DEFAULT_ROUTE53_WEIGHT),
        health_check_id: non_blank(params.health_check_id.as_deref()).map(str::to_string),
    })
}

fn parse_wait_for(domain: &str, value: Option<&Value>) -> Result<Duration, ConfigError> {
    let invalid = |value: &Value| ConfigError::InvalidWaitFor {
        domain: domain.to_string(),
        value: render_value(value),
    };

    match value {
        None | Some(Value::Null) => Ok(Duration::from_secs(DEFAULT_AUTO_DOMAIN_WAIT_SECS)),
        Some(raw @ Value::Number(number)) => number
            .as_u64()
            .map(Duration::from_secs)
            .ok_or_else(|| invalid(raw)),
        Some(raw @ Value::String(text)) => text
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| invalid(raw)),
        Some(other) => Err(invalid(other)),
    }
}

/// Bucket and key of an `s3://bucket/key` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
}

/// Split an `s3://bucket/key` URI.
///
/// # Errors
///
/// Returns a description of the problem if the URI is malformed, uses
/// another scheme, or lacks a bucket or key.
pub fn parse_s3_uri(uri: &str) -> Result<S3Location, String> {
    let parsed = Url::parse(uri).map_err(|e| e.to_string())?;
    if parsed.scheme() != "s3" {
        return Err(format!("expected scheme 's3', got '{}'", parsed.scheme()));
    }
    let bucket = parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| "missing bucket name".to_string())?;
    let key = percent_decode_str(parsed.path().trim_start_matches('/'))
        .decode_utf8()
        .map_err(|e| format!("object key is not valid UTF-8: {e}"))?;
    if key.is_empty() {
        return Err("missing object key".to_string());
    }

    Ok(S3Location {
        bucket: bucket.to_string(),
        key: key.into_owned(),
    })
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod domain_tests;
