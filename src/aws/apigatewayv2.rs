// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Modern API Gateway (`apigatewayv2`) transport.

use crate::aws::{next_token, tag_map, IntoRemote};
use crate::constants::BASE_PATH_MAPPING_PAGE_SIZE;
use crate::services::{
    ApiMapping, DomainInfo, ModernDomainRequest, ModernGatewayApi, Page, RemoteResult,
};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_apigatewayv2::types::{
    DomainNameConfiguration, EndpointType, MutualTlsAuthenticationInput, SecurityPolicy,
};
use aws_sdk_apigatewayv2::Client;

/// API Gateway v2 client.
pub struct ModernGatewayClient {
    client: Client,
}

impl ModernGatewayClient {
    #[must_use]
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

/// Domain state from the first entry of a v2 configuration list.
fn modern_domain_info(configurations: &[DomainNameConfiguration]) -> DomainInfo {
    let first = configurations.first();
    DomainInfo {
        domain_name: first
            .and_then(DomainNameConfiguration::api_gateway_domain_name)
            .unwrap_or_default()
            .to_string(),
        hosted_zone_id: first
            .and_then(DomainNameConfiguration::hosted_zone_id)
            .map(str::to_string),
        security_policy: first
            .and_then(DomainNameConfiguration::security_policy)
            .map(|p| p.as_str().to_string()),
    }
}

#[async_trait]
impl ModernGatewayApi for ModernGatewayClient {
    async fn create_domain_name(&self, request: &ModernDomainRequest) -> RemoteResult<DomainInfo> {
        let configurations = request
            .domain_name_configurations
            .iter()
            .map(|c| {
                DomainNameConfiguration::builder()
                    .certificate_arn(&c.certificate_arn)
                    .endpoint_type(EndpointType::from(c.endpoint_type.as_str()))
                    .security_policy(SecurityPolicy::from(c.security_policy.as_str()))
                    .build()
            })
            .collect();
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
            .set_domain_name_configurations(Some(configurations))
            .set_mutual_tls_authentication(mutual_tls)
            .set_tags(tag_map(&request.tags))
            .send()
            .await
            .into_remote()?;

        Ok(modern_domain_info(response.domain_name_configurations()))
    }

    async fn get_domain_name(&self, domain_name: &str) -> RemoteResult<DomainInfo> {
        let response = self
            .client
            .get_domain_name()
            .domain_name(domain_name)
            .send()
            .await
            .into_remote()?;

        Ok(modern_domain_info(response.domain_name_configurations()))
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

    async fn create_api_mapping(
        &self,
        domain_name: &str,
        api_id: &str,
        api_mapping_key: &str,
        stage: &str,
    ) -> RemoteResult<()> {
        self.client
            .create_api_mapping()
            .domain_name(domain_name)
            .api_id(api_id)
            .api_mapping_key(api_mapping_key)
            .stage(stage)
            .send()
            .await
            .into_remote()
            .map(drop)
    }

    async fn get_api_mappings(
        &self,
        domain_name: &str,
        token: Option<String>,
    ) -> RemoteResult<Page<ApiMapping>> {
        let response = self
            .client
            .get_api_mappings()
            .domain_name(domain_name)
            .max_results(BASE_PATH_MAPPING_PAGE_SIZE.to_string())
            .set_next_token(token)
            .send()
            .await
            .into_remote()?;

        let items = response
            .items()
            .iter()
            .map(|mapping| ApiMapping {
                api_id: mapping.api_id().unwrap_or_default().to_string(),
                base_path: mapping.api_mapping_key().unwrap_or_default().to_string(),
                stage: mapping.stage().unwrap_or_default().to_string(),
                mapping_id: mapping.api_mapping_id().map(str::to_string),
            })
            .collect();

        Ok(Page {
            items,
            next_token: next_token(response.next_token()),
        })
    }

    async fn update_api_mapping(
        &self,
        domain_name: &str,
        api_mapping_id: &str,
        api_id: &str,
        api_mapping_key: &str,
        stage: &str,
    ) -> RemoteResult<()> {
        self.client
            .update_api_mapping()
            .domain_name(domain_name)
            .api_mapping_id(api_mapping_id)
            .api_id(api_id)
            .api_mapping_key(api_mapping_key)
            .stage(stage)
            .send()
            .await
            .into_remote()
            .map(drop)
    }

    async fn delete_api_mapping(&self, domain_name: &str, api_mapping_id: &str) -> RemoteResult<()> {
        self.client
            .delete_api_mapping()
            .domain_name(domain_name)
            .api_mapping_id(api_mapping_id)
            .send()
            .await
            .into_remote()
            .map(drop)
    }
}

#[cfg(test)]
#[path = "apigatewayv2_tests.rs"]
mod apigatewayv2_tests;
