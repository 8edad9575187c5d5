// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Legacy API Gateway (`apigateway`) transport.

use crate::aws::{next_token, tag_map, IntoRemote};
use crate::constants::BASE_PATH_MAPPING_PAGE_SIZE;
use crate::services::{
    ApiMapping, DomainInfo, LegacyDomainRequest, LegacyGatewayApi, Page, RemoteResult,
};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_apigateway::types::{
    EndpointConfiguration, EndpointType, MutualTlsAuthenticationInput, Op, PatchOperation,
    SecurityPolicy,
};
use aws_sdk_apigateway::Client;

/// Patch paths of a base path mapping
const BASE_PATH_PATCH_PATH: &str = "/basePath";
const REST_API_ID_PATCH_PATH: &str = "/restapiId";
const STAGE_PATCH_PATH: &str = "/stage";

/// API Gateway v1 client.
pub struct LegacyGatewayClient {
    client: Client,
}

impl LegacyGatewayClient {
    #[must_use]
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

/// Replace operations for every field of `current` that differs from the target.
fn mapping_patches(
    current: &ApiMapping,
    base_path: &str,
    rest_api_id: &str,
    stage: &str,
) -> Vec<PatchOperation> {
    [
        (BASE_PATH_PATCH_PATH, current.base_path.as_str(), base_path),
        (REST_API_ID_PATCH_PATH, current.api_id.as_str(), rest_api_id),
        (STAGE_PATCH_PATH, current.stage.as_str(), stage),
    ]
    .into_iter()
    .filter(|(_, from, to)| from != to)
    .map(|(path, _, to)| PatchOperation::builder().op(Op::Replace).path(path).value(to).build())
    .collect()
}

/// Domain state from a v1 response: the distribution target for edge
/// domains, the regional target otherwise.
fn legacy_domain_info(
    distribution_domain_name: Option<&str>,
    distribution_hosted_zone_id: Option<&str>,
    regional_domain_name: Option<&str>,
    regional_hosted_zone_id: Option<&str>,
    security_policy: Option<&SecurityPolicy>,
) -> DomainInfo {
    let (domain_name, hosted_zone_id) = match distribution_domain_name {
        Some(name) => (name, distribution_hosted_zone_id),
        None => (regional_domain_name.unwrap_or_default(), regional_hosted_zone_id),
    };
    DomainInfo {
        domain_name: domain_name.to_string(),
        hosted_zone_id: hosted_zone_id.map(str::to_string),
        security_policy: security_policy.map(|p| p.as_str().to_string()),
    }
}

#[async_trait]
impl LegacyGatewayApi for LegacyGatewayClient {
    async fn create_domain_name(&self, request: &LegacyDomainRequest) -> RemoteResult<DomainInfo> {
        let endpoint = EndpointConfiguration::builder()
            .types(EndpointType::from(request.endpoint_type.as_str()))
            .build();
        let mutual_tls = request.mutual_tls.as_ref().map(|mtls| {
            MutualTlsAuthenticationInput::builder()
                .truststore_uri(&mtls.truststore_uri)
                .set_truststore_version(mtls.truststore_version.clone())
                .build()
        });

        let response = self
            .client
            .create_domain_name()
            .domain_name(&request.domain_name)
            .set_certificate_arn(request.certificate_arn.clone())
            .set_regional_certificate_arn(request.regional_certificate_arn.clone())
            .endpoint_configuration(endpoint)
            .security_policy(SecurityPolicy::from(request.security_policy.as_str()))
            .set_mutual_tls_authentication(mutual_tls)
            .set_tags(tag_map(&request.tags))
            .send()
            .await
            .into_remote()?;

        Ok(legacy_domain_info(
            response.distribution_domain_name(),
            response.distribution_hosted_zone_id(),
            response.regional_domain_name(),
            response.regional_hosted_zone_id(),
            response.security_policy(),
        ))
    }

    async fn get_domain_name(&self, domain_name: &str) -> RemoteResult<DomainInfo> {
        let response = self
            .client
            .get_domain_name()
            .domain_name(domain_name)
            .send()
            .await
            .into_remote()?;

        Ok(legacy_domain_info(
            response.distribution_domain_name(),
            response.distribution_hosted_zone_id(),
            response.regional_domain_name(),
            response.regional_hosted_zone_id(),
            response.security_policy(),
        ))
    }

    async fn delete_domain_name(&self, domain_name: &str) -> RemoteResult<()> {
        self.client
            .delete_domain_name()
            .domain_name(domain_name)
            .send()
            .await
            .into_remote()
            .map(drop)
    }

    async fn create_base_path_mapping(
        &self,
        domain_name: &str,
        base_path: &str,
        rest_api_id: &str,
        stage: &str,
    ) -> RemoteResult<()> {
        self.client
            .create_base_path_mapping()
            .domain_name(domain_name)
            .base_path(base_path)
            .rest_api_id(rest_api_id)
            .stage(stage)
            .send()
            .await
            .into_remote()
            .map(drop)
    }

    async fn get_base_path_mappings(
        &self,
        domain_name: &str,
        position: Option<String>,
    ) -> RemoteResult<Page<ApiMapping>> {
        let response = self
            .client
            .get_base_path_mappings()
            .domain_name(domain_name)
            .limit(BASE_PATH_MAPPING_PAGE_SIZE)
            .set_position(position)
            .send()
            .await
            .into_remote()?;

        let items = response
            .items()
            .iter()
            .map(|mapping| ApiMapping {
                api_id: mapping.rest_api_id().unwrap_or_default().to_string(),
                base_path: mapping.base_path().unwrap_or_default().to_string(),
                stage: mapping.stage().unwrap_or_default().to_string(),
                mapping_id: None,
            })
            .collect();

        Ok(Page {
            items,
            next_token: next_token(response.position()),
        })
    }

    async fn update_base_path_mapping(
        &self,
        domain_name: &str,
        current: &ApiMapping,
        new_base_path: &str,
        rest_api_id: &str,
        stage: &str,
    ) -> RemoteResult<()> {
        let patches = mapping_patches(current, new_base_path, rest_api_id, stage);
        if patches.is_empty() {
            return Ok(());
        }

        self.client
            .update_base_path_mapping()
            .domain_name(domain_name)
            .base_path(&current.base_path)
            .set_patch_operations(Some(patches))
            .send()
            .await
            .into_remote()
            .map(drop)
    }

    async fn delete_base_path_mapping(
        &self,
        domain_name: &str,
        base_path: &str,
    ) -> RemoteResult<()> {
        self.client
            .delete_base_path_mapping()
            .domain_name(domain_name)
            .base_path(base_path)
            .send()
            .await
            .into_remote()
            .map(drop)
    }
}

#[cfg(test)]
#[path = "apigateway_tests.rs"]
mod apigateway_tests;
