// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Capability interfaces for the remote services the reconcilers depend on.
//!
//! Each trait exposes exactly the operations the reconcilers call, with
//! transport-neutral request and response types. The [`aws`](crate::aws)
//! module implements them on top of the AWS SDK; tests use in-memory fakes.
//!
//! List operations return one [`Page`] per call. Draining all pages (and
//! retrying throttled calls) is done by
//! [`get_all_pages`](crate::reconcilers::pagination::get_all_pages).

use crate::domain::{EndpointType, SecurityPolicy};
use crate::errors::RemoteError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Result of a remote call.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Cursor for the next page, `None` on the last page
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no successor.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

/// An ACM certificate as returned by the inventory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    pub arn: String,
    /// Primary domain name
    pub domain_name: String,
    /// Subject alternative names
    pub subject_alternative_names: Vec<String>,
}

/// A Route53 hosted zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZoneSummary {
    /// Zone id, possibly prefixed with `/hostedzone/`
    pub id: String,
    /// Zone name, possibly ending with a dot
    pub name: String,
    pub private: bool,
}

/// Remote state of a custom domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainInfo {
    /// Target the alias records point at (distribution or regional domain name)
    pub domain_name: String,
    /// Hosted zone of the target; edge domains may omit it
    pub hosted_zone_id: Option<String>,
    /// Security policy reported by the service, e.g. `TLS_1_2`
    pub security_policy: Option<String>,
}

/// A base path (API) mapping on a custom domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiMapping {
    pub api_id: String,
    /// Base path, `(none)` for the root
    pub base_path: String,
    pub stage: String,
    /// Mapping id; the legacy API has none and identifies mappings by base path
    pub mapping_id: Option<String>,
}

/// Mutual TLS truststore location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutualTlsConfig {
    pub truststore_uri: String,
    pub truststore_version: Option<String>,
}

/// Request to create a domain through the legacy (edge-capable) gateway API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyDomainRequest {
    pub domain_name: String,
    /// Set for EDGE endpoints
    pub certificate_arn: Option<String>,
    /// Set for REGIONAL and PRIVATE endpoints
    pub regional_certificate_arn: Option<String>,
    pub endpoint_type: EndpointType,
    pub security_policy: SecurityPolicy,
    pub mutual_tls: Option<MutualTlsConfig>,
    pub tags: BTreeMap<String, String>,
}

/// One entry of a modern domain's configuration list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainNameConfiguration {
    pub certificate_arn: String,
    pub endpoint_type: EndpointType,
    pub security_policy: SecurityPolicy,
}

/// Request to create a domain through the modern (regional) gateway API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModernDomainRequest {
    pub domain_name: String,
    pub domain_name_configurations: Vec<DomainNameConfiguration>,
    pub mutual_tls: Option<MutualTlsConfig>,
    pub tags: BTreeMap<String, String>,
}

/// Route53 change action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    Upsert,
    Delete,
}

impl ChangeAction {
    /// Wire spelling
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upsert => "UPSERT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alias record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
}

impl RecordType {
    /// Wire spelling
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
        }
    }
}

/// Target of an alias record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTarget {
    pub dns_name: String,
    pub hosted_zone_id: String,
    pub evaluate_target_health: bool,
}

/// One alias record change in a Route53 change batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub name: String,
    pub record_type: RecordType,
    pub alias_target: AliasTarget,
    pub set_identifier: Option<String>,
    /// Latency routing region
    pub region: Option<String>,
    /// Weighted routing weight
    pub weight: Option<i64>,
    pub health_check_id: Option<String>,
}

/// A resource of a CloudFormation stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResource {
    pub logical_id: String,
    pub physical_id: Option<String>,
}

/// A CloudFormation stack, as listed by `describeStacks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSummary {
    pub stack_name: String,
    /// ARN of the root stack, set for nested stacks
    pub root_id: Option<String>,
}

/// A CloudFormation export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackExport {
    pub name: String,
    pub value: String,
}

/// Legacy API Gateway (REST, edge-capable, supports TLS 1.0).
#[async_trait]
pub trait LegacyGatewayApi: Send + Sync {
    async fn create_domain_name(&self, request: &LegacyDomainRequest) -> RemoteResult<DomainInfo>;
    async fn get_domain_name(&self, domain_name: &str) -> RemoteResult<DomainInfo>;
    async fn delete_domain_name(&self, domain_name: &str) -> RemoteResult<()>;
    async fn create_base_path_mapping(
        &self,
        domain_name: &str,
        base_path: &str,
        rest_api_id: &str,
        stage: &str,
    ) -> RemoteResult<()>;
    async fn get_base_path_mappings(
        &self,
        domain_name: &str,
        position: Option<String>,
    ) -> RemoteResult<Page<ApiMapping>>;
    /// Point the mapping `current` at a new base path, API and stage.
    async fn update_base_path_mapping(
        &self,
        domain_name: &str,
        current: &ApiMapping,
        new_base_path: &str,
        rest_api_id: &str,
        stage: &str,
    ) -> RemoteResult<()>;
    async fn delete_base_path_mapping(&self, domain_name: &str, base_path: &str)
        -> RemoteResult<()>;
}

/// Modern API Gateway (regional, REST/HTTP/WebSocket).
#[async_trait]
pub trait ModernGatewayApi: Send + Sync {
    async fn create_domain_name(&self, request: &ModernDomainRequest) -> RemoteResult<DomainInfo>;
    async fn get_domain_name(&self, domain_name: &str) -> RemoteResult<DomainInfo>;
    async fn delete_domain_name(&self, domain_name: &str) -> RemoteResult<()>;
    async fn create_api_mapping(
        &self,
        domain_name: &str,
        api_id: &str,
        api_mapping_key: &str,
        stage: &str,
    ) -> RemoteResult<()>;
    async fn get_api_mappings(
        &self,
        domain_name: &str,
        next_token: Option<String>,
    ) -> RemoteResult<Page<ApiMapping>>;
    async fn update_api_mapping(
        &self,
        domain_name: &str,
        api_mapping_id: &str,
        api_id: &str,
        api_mapping_key: &str,
        stage: &str,
    ) -> RemoteResult<()>;
    async fn delete_api_mapping(&self, domain_name: &str, api_mapping_id: &str)
        -> RemoteResult<()>;
}

/// Certificate inventory (ACM).
#[async_trait]
pub trait CertificateApi: Send + Sync {
    /// List certificates in `region` with one of `statuses`.
    async fn list_certificates(
        &self,
        region: &str,
        statuses: &[&str],
        next_token: Option<String>,
    ) -> RemoteResult<Page<CertificateSummary>>;
}

/// DNS (Route53).
#[async_trait]
pub trait DnsApi: Send + Sync {
    async fn list_hosted_zones(&self, marker: Option<String>)
        -> RemoteResult<Page<HostedZoneSummary>>;
    async fn change_resource_record_sets(
        &self,
        hosted_zone_id: &str,
        changes: &[RecordChange],
    ) -> RemoteResult<()>;
}

/// Stack introspection (CloudFormation).
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Fails if the stack or the resource does not exist.
    async fn describe_stack_resource(
        &self,
        stack_name: &str,
        logical_id: &str,
    ) -> RemoteResult<StackResource>;
    async fn describe_stacks(&self, next_token: Option<String>) -> RemoteResult<Page<StackSummary>>;
    async fn list_exports(&self, next_token: Option<String>) -> RemoteResult<Page<StackExport>>;
}

/// Object storage (S3).
#[async_trait]
pub trait ObjectStorageApi: Send + Sync {
    /// Succeeds if the object exists.
    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> RemoteResult<()>;
}

/// Handles to every remote service, shared by all domain tasks.
#[derive(Clone)]
pub struct Services {
    pub gateway_v1: Arc<dyn LegacyGatewayApi>,
    pub gateway_v2: Arc<dyn ModernGatewayApi>,
    pub certificates: Arc<dyn CertificateApi>,
    pub dns: Arc<dyn DnsApi>,
    pub stacks: Arc<dyn StackApi>,
    pub object_storage: Arc<dyn ObjectStorageApi>,
}
