// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for custom domain reconciliation.
//!
//! This module provides specialized error types for:
//! - Configuration validation (fails fast, before any remote call)
//! - Remote service failures (API Gateway, ACM, Route53, CloudFormation, S3)
//! - Per-domain reconciliation steps (certificate, hosted zone, domain, mapping, DNS)
//! - Aggregated lifecycle failures across independent domains

use std::fmt;
use thiserror::Error;

/// Errors raised while validating user configuration.
///
/// These are deterministic and never retried. They are reported before any
/// remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A boolean-ish value that is neither a boolean nor one of `true`/`false`/`1`/`0`
    #[error("Ambiguous boolean config: \"{value}\"")]
    AmbiguousBoolean {
        /// Rendered form of the offending value
        value: String,
    },

    /// A domain entry without `domainName`
    #[error("domainName is required for every custom domain")]
    MissingDomainName,

    /// No enabled custom domain configuration was found
    #[error("No custom domain configuration found under custom.customDomain or custom.customDomains")]
    MissingDomains,

    /// An enum-like setting with a value outside the allowed set
    #[error("{field} '{value}' is not supported for '{domain}', expected one of: {allowed}")]
    UnsupportedValue {
        /// The domain being configured
        domain: String,
        /// Config key, e.g. `endpointType`
        field: &'static str,
        /// The rejected value
        value: String,
        /// Comma separated list of accepted values
        allowed: String,
    },

    /// EDGE endpoints only serve REST APIs
    #[error("'{domain}': EDGE endpointType is not compatible with {api_type} APIs")]
    EdgeApiType {
        /// The domain being configured
        domain: String,
        /// The incompatible API type
        api_type: String,
    },

    /// Latency and weighted records require a regional endpoint
    #[error("'{domain}': {policy} routing policy is not supported with EDGE endpointType")]
    EdgeRoutingPolicy {
        /// The domain being configured
        domain: String,
        /// The rejected routing policy
        policy: String,
    },

    /// Mutual TLS requires a regional endpoint
    #[error("'{domain}': EDGE APIs do not support mutual TLS, remove tlsTruststoreUri or change to a regional API")]
    EdgeMutualTls {
        /// The domain being configured
        domain: String,
    },

    /// `tlsTruststoreUri` is not of the form `s3://bucket/key`
    #[error("'{domain}': tlsTruststoreUri '{uri}' is not a valid S3 URI: {reason}")]
    InvalidTruststoreUri {
        /// The domain being configured
        domain: String,
        /// The rejected URI
        uri: String,
        /// What is wrong with it
        reason: String,
    },

    /// `autoDomainWaitFor` is not a non-negative number of seconds
    #[error("'{domain}': autoDomainWaitFor must be a number of seconds, got '{value}'")]
    InvalidWaitFor {
        /// The domain being configured
        domain: String,
        /// The rejected value
        value: String,
    },

    /// The manifest could not be read or parsed
    #[error("Unable to load configuration from {path}: {reason}")]
    Manifest {
        /// Manifest path
        path: String,
        /// Underlying I/O or parse failure
        reason: String,
    },
}

/// A failure reported by a remote service, independent of the transport.
///
/// The vendor error code and HTTP status are kept so callers can tell
/// throttling, not-found and permission failures apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// Vendor error code, e.g. `TooManyRequestsException`
    pub code: Option<String>,
    /// HTTP status of the raw response, when one was received
    pub status: Option<u16>,
    /// Human readable message
    pub message: String,
}

/// Error codes the remote services use to signal rate limiting.
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "TooManyRequestsException",
    "RequestThrottled",
    "RequestThrottledException",
    "RequestLimitExceeded",
    "RequestLimitExceededException",
    "PriorRequestNotComplete",
    "ProvisionedThroughputExceededException",
    "SlowDown",
];

impl RemoteError {
    /// Create an error carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: None,
            message: message.into(),
        }
    }

    /// Attach a vendor error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the HTTP status of the raw response.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns true for rate-limit errors that warrant a retry.
    #[must_use]
    pub fn is_throttling(&self) -> bool {
        self.status == Some(429)
            || self
                .code
                .as_deref()
                .is_some_and(|code| THROTTLING_CODES.contains(&code))
    }

    /// Returns true when the remote resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
            || matches!(
                self.code.as_deref(),
                Some("NotFoundException" | "NotFound" | "NoSuchKey")
            )
    }

    /// Returns true when the caller lacks permission for the call.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.status == Some(403)
            || matches!(
                self.code.as_deref(),
                Some("AccessDenied" | "AccessDeniedException" | "Forbidden")
            )
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Errors raised while reconciling a single custom domain.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Invalid configuration detected during reconciliation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Listing certificates failed
    #[error("Unable to list ACM certificates in {region}: {source}")]
    CertificateLookup {
        /// Region the lookup ran in
        region: String,
        /// Underlying remote failure
        source: RemoteError,
    },

    /// No certificate matched the search key
    #[error("Could not find an ACM certificate matching '{search}'")]
    CertificateNotFound {
        /// Certificate name or domain name that was searched for
        search: String,
    },

    /// Listing hosted zones failed
    #[error("Unable to list hosted zones in Route53: {source}")]
    HostedZoneLookup {
        /// Underlying remote failure
        source: RemoteError,
    },

    /// No hosted zone is a suffix of the domain
    #[error("Could not find hosted zone for '{domain}'")]
    HostedZoneNotFound {
        /// The domain that needed a zone
        domain: String,
    },

    /// Enumerating stacks or exports failed
    #[error("Unable to read CloudFormation data for stack '{stack}': {source}")]
    StackLookup {
        /// Primary stack name
        stack: String,
        /// Underlying remote failure
        source: RemoteError,
    },

    /// The API resource was found neither in the primary stack nor in any nested stack
    #[error("Unable to find resource '{logical_id}' in CloudFormation stack '{stack}' or its nested stacks")]
    StackResourceNotFound {
        /// Primary stack name
        stack: String,
        /// Logical id that was searched for
        logical_id: String,
    },

    /// The API resource exists but has no physical id, or no API id could be resolved
    #[error("No API id associated with '{logical_id}' in CloudFormation stack '{stack}'")]
    MissingApiId {
        /// Stack the resource was resolved in
        stack: String,
        /// Logical id of the API resource
        logical_id: String,
    },

    /// Reading the custom domain failed for a reason other than "not found"
    #[error("Unable to fetch information about '{domain}': {source}")]
    DomainLookup {
        /// Custom domain name
        domain: String,
        /// Underlying remote failure
        source: RemoteError,
    },

    /// Creating the custom domain failed
    #[error("Failed to create custom domain '{domain}': {source}")]
    DomainCreation {
        /// Custom domain name
        domain: String,
        /// Underlying remote failure
        source: RemoteError,
    },

    /// Deleting the custom domain failed
    #[error("Failed to delete custom domain '{domain}': {source}")]
    DomainDeletion {
        /// Custom domain name
        domain: String,
        /// Underlying remote failure
        source: RemoteError,
    },

    /// Listing API mappings failed
    #[error("Unable to read API mappings for '{domain}': {source}")]
    MappingLookup {
        /// Custom domain name
        domain: String,
        /// Underlying remote failure
        source: RemoteError,
    },

    /// Creating the API mapping failed
    #[error("Unable to create API mapping '{base_path}' for '{domain}': {source}")]
    MappingCreation {
        /// Custom domain name
        domain: String,
        /// Base path being mapped
        base_path: String,
        /// Underlying remote failure
        source: RemoteError,
    },

    /// Updating the API mapping failed
    #[error("Unable to update API mapping '{base_path}' for '{domain}': {source}")]
    MappingUpdate {
        /// Custom domain name
        domain: String,
        /// Base path being mapped
        base_path: String,
        /// Underlying remote failure
        source: RemoteError,
    },

    /// A step needed the remote domain state before it was resolved
    #[error("Custom domain '{domain}' has no resolved target, it may not exist yet")]
    MissingDomainInfo {
        /// Custom domain name
        domain: String,
    },

    /// Submitting a Route53 change batch failed
    #[error("Failed to {action} Route53 record for '{domain}': {source}")]
    DnsChange {
        /// `UPSERT` or `DELETE`
        action: String,
        /// Custom domain name
        domain: String,
        /// Underlying remote failure
        source: RemoteError,
    },

    /// The mutual TLS truststore object could not be verified
    #[error("Unable to verify truststore '{uri}' for '{domain}': {reason}")]
    TruststoreValidation {
        /// Custom domain name
        domain: String,
        /// Truststore URI
        uri: String,
        /// Why the check failed
        reason: String,
    },
}

impl DomainError {
    /// Stable reason code for this error, used in structured logs.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Config(_) => "InvalidConfiguration",
            Self::CertificateLookup { .. } => "CertificateLookupFailed",
            Self::CertificateNotFound { .. } => "CertificateNotFound",
            Self::HostedZoneLookup { .. } => "HostedZoneLookupFailed",
            Self::HostedZoneNotFound { .. } => "HostedZoneNotFound",
            Self::StackLookup { .. } => "StackLookupFailed",
            Self::StackResourceNotFound { .. } => "StackResourceNotFound",
            Self::MissingApiId { .. } => "MissingApiId",
            Self::DomainLookup { .. } => "DomainLookupFailed",
            Self::DomainCreation { .. } => "DomainCreationFailed",
            Self::DomainDeletion { .. } => "DomainDeletionFailed",
            Self::MappingLookup { .. } => "MappingLookupFailed",
            Self::MappingCreation { .. } => "MappingCreationFailed",
            Self::MappingUpdate { .. } => "MappingUpdateFailed",
            Self::MissingDomainInfo { .. } => "MissingDomainInfo",
            Self::DnsChange { .. } => "DnsChangeFailed",
            Self::TruststoreValidation { .. } => "TruststoreValidationFailed",
        }
    }
}

/// Errors raised while writing outputs into a compiled template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template root or its `Outputs` section is not a JSON object
    #[error("Compiled template {section} is not a JSON object")]
    NotAnObject {
        /// `root` or `Outputs`
        section: &'static str,
    },
}

/// A single domain's failure within a lifecycle operation.
#[derive(Error, Debug, Clone)]
#[error("'{domain}': {error}")]
pub struct DomainFailure {
    /// Custom domain name
    pub domain: String,
    /// What went wrong
    #[source]
    pub error: DomainError,
}

/// Aggregate failure of a lifecycle operation.
///
/// Domains are reconciled independently, so one failure never stops the
/// others. This error lists every domain that did not complete.
#[derive(Error, Debug, Clone)]
pub struct LifecycleError {
    /// Lifecycle operation name, e.g. `create`
    pub operation: &'static str,
    /// Per-domain failures, in configuration order
    pub failures: Vec<DomainFailure>,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {} domain(s)",
            self.operation,
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
