// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! API Gateway version adapters.
//!
//! Custom domains can be managed through two API versions:
//!
//! - **v1** (legacy) supports EDGE endpoints and the `TLS_1_0` policy, but
//!   only maps REST APIs by base path
//! - **v2** (modern) supports REST, HTTP and WebSocket APIs on REGIONAL and
//!   PRIVATE endpoints, with mappings identified by id
//!
//! Both are wrapped behind [`ApiGateway`], so the reconcilers never branch
//! on the version themselves. [`select_gateway_version`] picks the version
//! from the endpoint type and security policy.

use crate::constants::{DEFAULT_BASE_PATH, HTTP_API_DEFAULT_STAGE};
use crate::domain::{ApiType, DomainConfig, EndpointType, SecurityPolicy};
use crate::errors::{DomainError, RemoteError};
use crate::reconcilers::pagination::get_all_pages;
use crate::reconcilers::retry::throttled_call;
use crate::services::{
    ApiMapping, DomainInfo, DomainNameConfiguration, LegacyDomainRequest, LegacyGatewayApi,
    ModernDomainRequest, ModernGatewayApi, MutualTlsConfig, Services,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// API Gateway version used for a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayVersion {
    V1,
    V2,
}

impl fmt::Display for GatewayVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

/// Pick the gateway version for an endpoint type and security policy.
///
/// EDGE endpoints and `TLS_1_0` are only supported by v1.
#[must_use]
pub fn select_gateway_version(
    endpoint_type: EndpointType,
    security_policy: SecurityPolicy,
) -> GatewayVersion {
    if endpoint_type == EndpointType::Edge || security_policy == SecurityPolicy::Tls10 {
        GatewayVersion::V1
    } else {
        GatewayVersion::V2
    }
}

/// Pick the gateway version for reading and updating mappings.
///
/// Uses the security policy the existing remote domain reports, so a domain
/// created with an older policy keeps being handled by the version that
/// created it. Falls back to the configured policy when the remote state is
/// unknown or unparseable.
#[must_use]
pub fn select_mapping_gateway_version(domain: &DomainConfig) -> GatewayVersion {
    let observed = domain
        .domain_info
        .as_ref()
        .and_then(|info| info.security_policy.as_deref())
        .and_then(SecurityPolicy::parse)
        .unwrap_or(domain.security_policy);
    select_gateway_version(domain.endpoint_type, observed)
}

/// Version-neutral custom domain and mapping operations.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Which API version this adapter talks to
    fn version(&self) -> GatewayVersion;

    /// Create the custom domain with the given certificate and tags.
    async fn create_custom_domain(
        &self,
        domain: &DomainConfig,
        certificate_arn: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<DomainInfo, DomainError>;

    /// Fetch the custom domain; `None` when it does not exist.
    async fn get_custom_domain(&self, domain: &DomainConfig)
        -> Result<Option<DomainInfo>, DomainError>;

    async fn delete_custom_domain(&self, domain: &DomainConfig) -> Result<(), DomainError>;

    /// Map `api_id` under the domain's base path.
    async fn create_base_path_mapping(
        &self,
        domain: &DomainConfig,
        api_id: &str,
    ) -> Result<(), DomainError>;

    /// Every mapping on the domain, whichever API it points at.
    async fn get_base_path_mappings(
        &self,
        domain: &DomainConfig,
    ) -> Result<Vec<ApiMapping>, DomainError>;

    /// Point `current` at the domain's configured base path and stage, and at `api_id`.
    async fn update_base_path_mapping(
        &self,
        domain: &DomainConfig,
        current: &ApiMapping,
        api_id: &str,
    ) -> Result<(), DomainError>;

    /// Remove `mapping`; failures are logged and swallowed.
    async fn delete_base_path_mapping(&self, domain: &DomainConfig, mapping: &ApiMapping);
}

fn mutual_tls(domain: &DomainConfig) -> Option<MutualTlsConfig> {
    domain
        .tls_truststore_uri
        .as_ref()
        .map(|uri| MutualTlsConfig {
            truststore_uri: uri.clone(),
            truststore_version: domain.tls_truststore_version.clone(),
        })
}

fn lookup_result(
    domain: &DomainConfig,
    version: GatewayVersion,
    result: Result<DomainInfo, RemoteError>,
) -> Result<Option<DomainInfo>, DomainError> {
    match result {
        Ok(info) => Ok(Some(info)),
        Err(e) if e.is_not_found() => {
            info!(
                domain = %domain.given_domain_name,
                gateway = %version,
                "Custom domain does not exist"
            );
            Ok(None)
        }
        Err(source) => Err(DomainError::DomainLookup {
            domain: domain.given_domain_name.clone(),
            source,
        }),
    }
}

/// Adapter for the v1 (legacy) API.
#[derive(Clone)]
pub struct ApiGatewayV1 {
    client: Arc<dyn LegacyGatewayApi>,
}

impl ApiGatewayV1 {
    #[must_use]
    pub fn new(client: Arc<dyn LegacyGatewayApi>) -> Self {
        Self { client }
    }

    /// The create request for a domain.
    ///
    /// EDGE domains take `certificateArn`; regional ones take
    /// `regionalCertificateArn`.
    #[must_use]
    pub fn domain_request(
        domain: &DomainConfig,
        certificate_arn: &str,
        tags: &BTreeMap<String, String>,
    ) -> LegacyDomainRequest {
        let is_edge = domain.endpoint_type == EndpointType::Edge;
        LegacyDomainRequest {
            domain_name: domain.given_domain_name.clone(),
            certificate_arn: is_edge.then(|| certificate_arn.to_string()),
            regional_certificate_arn: (!is_edge).then(|| certificate_arn.to_string()),
            endpoint_type: domain.endpoint_type,
            security_policy: domain.security_policy,
            mutual_tls: mutual_tls(domain),
            tags: tags.clone(),
        }
    }
}

#[async_trait]
impl ApiGateway for ApiGatewayV1 {
    fn version(&self) -> GatewayVersion {
        GatewayVersion::V1
    }

    async fn create_custom_domain(
        &self,
        domain: &DomainConfig,
        certificate_arn: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<DomainInfo, DomainError> {
        let request = Self::domain_request(domain, certificate_arn, tags);
        let info = throttled_call(|| self.client.create_domain_name(&request), "createDomainName")
            .await
            .map_err(|source| DomainError::DomainCreation {
                domain: domain.given_domain_name.clone(),
                source,
            })?;

        info!(domain = %domain.given_domain_name, gateway = "v1", "Created custom domain");
        Ok(info)
    }

    async fn get_custom_domain(
        &self,
        domain: &DomainConfig,
    ) -> Result<Option<DomainInfo>, DomainError> {
        let name = domain.given_domain_name.as_str();
        let result = throttled_call(|| self.client.get_domain_name(name), "getDomainName").await;
        lookup_result(domain, GatewayVersion::V1, result)
    }

    async fn delete_custom_domain(&self, domain: &DomainConfig) -> Result<(), DomainError> {
        let name = domain.given_domain_name.as_str();
        throttled_call(|| self.client.delete_domain_name(name), "deleteDomainName")
            .await
            .map_err(|source| DomainError::DomainDeletion {
                domain: name.to_string(),
                source,
            })?;

        info!(domain = %name, gateway = "v1", "Deleted custom domain");
        Ok(())
    }

    async fn create_base_path_mapping(
        &self,
        domain: &DomainConfig,
        api_id: &str,
    ) -> Result<(), DomainError> {
        let name = domain.given_domain_name.as_str();
        let base_path = domain.base_path.as_str();
        let stage = domain.stage.as_str();

        throttled_call(
            || self.client.create_base_path_mapping(name, base_path, api_id, stage),
            "createBasePathMapping",
        )
        .await
        .map_err(|source| DomainError::MappingCreation {
            domain: name.to_string(),
            base_path: base_path.to_string(),
            source,
        })?;

        info!(domain = %name, base_path = %base_path, api_id = %api_id, stage = %stage, "Created base path mapping");
        Ok(())
    }

    async fn get_base_path_mappings(
        &self,
        domain: &DomainConfig,
    ) -> Result<Vec<ApiMapping>, DomainError> {
        let name = domain.given_domain_name.as_str();
        get_all_pages(
            |position| self.client.get_base_path_mappings(name, position),
            "getBasePathMappings",
        )
        .await
        .map_err(|source| DomainError::MappingLookup {
            domain: name.to_string(),
            source,
        })
    }

    async fn update_base_path_mapping(
        &self,
        domain: &DomainConfig,
        current: &ApiMapping,
        api_id: &str,
    ) -> Result<(), DomainError> {
        let name = domain.given_domain_name.as_str();
        let base_path = domain.base_path.as_str();
        let stage = domain.stage.as_str();

        throttled_call(
            || {
                self.client
                    .update_base_path_mapping(name, current, base_path, api_id, stage)
            },
            "updateBasePathMapping",
        )
        .await
        .map_err(|source| DomainError::MappingUpdate {
            domain: name.to_string(),
            base_path: base_path.to_string(),
            source,
        })?;

        info!(
            domain = %name,
            from = %current.base_path,
            to = %base_path,
            api_id = %api_id,
            stage = %stage,
            "Updated base path mapping"
        );
        Ok(())
    }

    async fn delete_base_path_mapping(&self, domain: &DomainConfig, mapping: &ApiMapping) {
        let name = domain.given_domain_name.as_str();
        let result = throttled_call(
            || self.client.delete_base_path_mapping(name, &mapping.base_path),
            "deleteBasePathMapping",
        )
        .await;

        match result {
            Ok(()) => info!(domain = %name, base_path = %mapping.base_path, "Removed base path mapping"),
            Err(e) => warn!(
                domain = %name,
                base_path = %mapping.base_path,
                error = %e,
                "Unable to remove base path mapping, it may need manual cleanup"
            ),
        }
    }
}

/// Adapter for the v2 (modern) API.
#[derive(Clone)]
pub struct ApiGatewayV2 {
    client: Arc<dyn ModernGatewayApi>,
}

impl ApiGatewayV2 {
    #[must_use]
    pub fn new(client: Arc<dyn ModernGatewayApi>) -> Self {
        Self { client }
    }

    /// The create request for a domain.
    #[must_use]
    pub fn domain_request(
        domain: &DomainConfig,
        certificate_arn: &str,
        tags: &BTreeMap<String, String>,
    ) -> ModernDomainRequest {
        ModernDomainRequest {
            domain_name: domain.given_domain_name.clone(),
            domain_name_configurations: vec![DomainNameConfiguration {
                certificate_arn: certificate_arn.to_string(),
                endpoint_type: domain.endpoint_type,
                security_policy: domain.security_policy,
            }],
            mutual_tls: mutual_tls(domain),
            tags: tags.clone(),
        }
    }
}

/// v2 mapping key for a base path; the root is the empty key.
#[must_use]
pub fn api_mapping_key(base_path: &str) -> &str {
    if base_path == DEFAULT_BASE_PATH {
        ""
    } else {
        base_path
    }
}

/// Stage a v2 mapping points at; HTTP APIs always use `$default`.
#[must_use]
pub fn api_mapping_stage(domain: &DomainConfig) -> &str {
    if domain.api_type == ApiType::Http {
        HTTP_API_DEFAULT_STAGE
    } else {
        &domain.stage
    }
}

#[async_trait]
impl ApiGateway for ApiGatewayV2 {
    fn version(&self) -> GatewayVersion {
        GatewayVersion::V2
    }

    async fn create_custom_domain(
        &self,
        domain: &DomainConfig,
        certificate_arn: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<DomainInfo, DomainError> {
        let request = Self::domain_request(domain, certificate_arn, tags);
        let info = throttled_call(|| self.client.create_domain_name(&request), "createDomainName")
            .await
            .map_err(|source| DomainError::DomainCreation {
                domain: domain.given_domain_name.clone(),
                source,
            })?;

        info!(domain = %domain.given_domain_name, gateway = "v2", "Created custom domain");
        Ok(info)
    }

    async fn get_custom_domain(
        &self,
        domain: &DomainConfig,
    ) -> Result<Option<DomainInfo>, DomainError> {
        let name = domain.given_domain_name.as_str();
        let result = throttled_call(|| self.client.get_domain_name(name), "getDomainName").await;
        lookup_result(domain, GatewayVersion::V2, result)
    }

    async fn delete_custom_domain(&self, domain: &DomainConfig) -> Result<(), DomainError> {
        let name = domain.given_domain_name.as_str();
        throttled_call(|| self.client.delete_domain_name(name), "deleteDomainName")
            .await
            .map_err(|source| DomainError::DomainDeletion {
                domain: name.to_string(),
                source,
            })?;

        info!(domain = %name, gateway = "v2", "Deleted custom domain");
        Ok(())
    }

    async fn create_base_path_mapping(
        &self,
        domain: &DomainConfig,
        api_id: &str,
    ) -> Result<(), DomainError> {
        let name = domain.given_domain_name.as_str();
        let key = api_mapping_key(&domain.base_path);
        let stage = api_mapping_stage(domain);

        throttled_call(
            || self.client.create_api_mapping(name, api_id, key, stage),
            "createApiMapping",
        )
        .await
        .map_err(|source| DomainError::MappingCreation {
            domain: name.to_string(),
            base_path: domain.base_path.clone(),
            source,
        })?;

        info!(domain = %name, base_path = %domain.base_path, api_id = %api_id, stage = %stage, "Created API mapping");
        Ok(())
    }

    async fn get_base_path_mappings(
        &self,
        domain: &DomainConfig,
    ) -> Result<Vec<ApiMapping>, DomainError> {
        let name = domain.given_domain_name.as_str();
        let mappings = get_all_pages(
            |token| self.client.get_api_mappings(name, token),
            "getApiMappings",
        )
        .await
        .map_err(|source| DomainError::MappingLookup {
            domain: name.to_string(),
            source,
        })?;

        Ok(mappings
            .into_iter()
            .map(|mut mapping| {
                if mapping.base_path.is_empty() {
                    mapping.base_path = DEFAULT_BASE_PATH.to_string();
                }
                mapping
            })
            .collect())
    }

    async fn update_base_path_mapping(
        &self,
        domain: &DomainConfig,
        current: &ApiMapping,
        api_id: &str,
    ) -> Result<(), DomainError> {
        let name = domain.given_domain_name.as_str();
        let key = api_mapping_key(&domain.base_path);
        let stage = api_mapping_stage(domain);
        let mapping_error = |source: RemoteError| DomainError::MappingUpdate {
            domain: name.to_string(),
            base_path: domain.base_path.clone(),
            source,
        };

        let mapping_id = current
            .mapping_id
            .as_deref()
            .ok_or_else(|| mapping_error(RemoteError::new("existing API mapping has no id")))?;

        throttled_call(
            || {
                self.client
                    .update_api_mapping(name, mapping_id, api_id, key, stage)
            },
            "updateApiMapping",
        )
        .await
        .map_err(mapping_error)?;

        info!(
            domain = %name,
            mapping_id = %mapping_id,
            from = %current.base_path,
            to = %domain.base_path,
            "Updated API mapping"
        );
        Ok(())
    }

    async fn delete_base_path_mapping(&self, domain: &DomainConfig, mapping: &ApiMapping) {
        let name = domain.given_domain_name.as_str();
        let Some(mapping_id) = mapping.mapping_id.as_deref() else {
            warn!(domain = %name, base_path = %mapping.base_path, "API mapping has no id, skipping removal");
            return;
        };

        let result = throttled_call(
            || self.client.delete_api_mapping(name, mapping_id),
            "deleteApiMapping",
        )
        .await;

        match result {
            Ok(()) => info!(domain = %name, mapping_id = %mapping_id, "Removed API mapping"),
            Err(e) => warn!(
                domain = %name,
                mapping_id = %mapping_id,
                error = %e,
                "Unable to remove API mapping, it may need manual cleanup"
            ),
        }
    }
}

/// Both adapters, with version selection.
#[derive(Clone)]
pub struct Gateways {
    v1: ApiGatewayV1,
    v2: ApiGatewayV2,
}

impl Gateways {
    #[must_use]
    pub fn new(services: &Services) -> Self {
        Self {
            v1: ApiGatewayV1::new(Arc::clone(&services.gateway_v1)),
            v2: ApiGatewayV2::new(Arc::clone(&services.gateway_v2)),
        }
    }

    /// The adapter for a version.
    #[must_use]
    pub fn get(&self, version: GatewayVersion) -> &dyn ApiGateway {
        match version {
            GatewayVersion::V1 => &self.v1,
            GatewayVersion::V2 => &self.v2,
        }
    }

    /// Adapter for domain create/get/delete, from the configured settings.
    #[must_use]
    pub fn for_domain(&self, domain: &DomainConfig) -> &dyn ApiGateway {
        self.get(select_gateway_version(
            domain.endpoint_type,
            domain.security_policy,
        ))
    }

    /// Adapter for mapping reads and updates, from the observed remote policy.
    #[must_use]
    pub fn for_mappings(&self, domain: &DomainConfig) -> &dyn ApiGateway {
        self.get(select_mapping_gateway_version(domain))
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod gateway_tests;
