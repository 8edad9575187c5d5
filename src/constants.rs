// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the custom domain reconciler.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Domain Configuration Defaults
// ============================================================================

/// Sentinel base path meaning "map the API at the domain root"
pub const DEFAULT_BASE_PATH: &str = "(none)";

/// Base paths reserved by API Gateway; using them only triggers a warning
pub const RESERVED_BASE_PATHS: &[&str] = &["ping", "sping"];

/// Stage used when neither the domain, the CLI nor the provider names one
pub const DEFAULT_STAGE: &str = "dev";

/// Region used when neither the CLI nor the provider names one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Stage every HTTP API mapping is bound to
pub const HTTP_API_DEFAULT_STAGE: &str = "$default";

/// Default seconds to wait for an auto-created domain to become available
pub const DEFAULT_AUTO_DOMAIN_WAIT_SECS: u64 = 120;

/// Interval between availability checks while waiting for an auto-created domain
pub const AUTO_DOMAIN_POLL_INTERVAL_SECS: u64 = 10;

// ============================================================================
// Certificate Constants
// ============================================================================

/// Edge-optimized domains must use certificates issued in this region
pub const EDGE_CERTIFICATE_REGION: &str = "us-east-1";

/// Certificate statuses considered when searching the inventory (everything not expired)
pub const CERTIFICATE_STATUSES: &[&str] = &["PENDING_VALIDATION", "ISSUED", "INACTIVE"];

/// Key algorithms included in the inventory; ACM lists only RSA 2048 keys by default
pub const CERTIFICATE_KEY_TYPES: &[&str] = &[
    "RSA_1024",
    "RSA_2048",
    "RSA_3072",
    "RSA_4096",
    "EC_prime256v1",
    "EC_secp384r1",
    "EC_secp521r1",
];

// ============================================================================
// Route53 Constants
// ============================================================================

/// CloudFront hosted zone id, used when an edge domain does not report one
pub const DEFAULT_EDGE_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// Default weight for weighted routing records
pub const DEFAULT_ROUTE53_WEIGHT: i64 = 200;

/// Prefix Route53 puts in front of hosted zone ids
pub const HOSTED_ZONE_ID_PREFIX: &str = "/hostedzone/";

// ============================================================================
// CloudFormation Constants
// ============================================================================

/// Default logical id of a REST API in the compiled template
pub const REST_API_LOGICAL_ID: &str = "ApiGatewayRestApi";

/// Default logical id of an HTTP API in the compiled template
pub const HTTP_API_LOGICAL_ID: &str = "HttpApi";

/// Default logical id of a WebSocket API in the compiled template
pub const WEBSOCKET_API_LOGICAL_ID: &str = "WebsocketsApi";

/// Template output key for the distribution (target) domain name
pub const OUTPUT_DISTRIBUTION_DOMAIN_NAME: &str = "DistributionDomainName";

/// Template output key for the custom domain name
pub const OUTPUT_DOMAIN_NAME: &str = "DomainName";

/// Template output key for the distribution hosted zone id
pub const OUTPUT_HOSTED_ZONE_ID: &str = "HostedZoneId";

// ============================================================================
// API Gateway Constants
// ============================================================================

/// Page size requested when listing base path mappings
pub const BASE_PATH_MAPPING_PAGE_SIZE: i32 = 500;

/// Page size requested when listing hosted zones
pub const HOSTED_ZONE_PAGE_SIZE: i32 = 100;

// ============================================================================
// Throttling Retry Constants
// ============================================================================

/// Minimum wait between throttled retries (3 seconds)
pub const THROTTLE_MIN_WAIT_SECS: u64 = 3;

/// Maximum wait between throttled retries (60 seconds)
pub const THROTTLE_MAX_WAIT_SECS: u64 = 60;

/// Cumulative retry budget per remote call (5 minutes)
pub const THROTTLE_MAX_ELAPSED_SECS: u64 = 300;

/// Growth factor of the decorrelated jitter window
pub const THROTTLE_BACKOFF_MULTIPLIER: f64 = 3.0;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;
