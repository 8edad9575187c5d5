// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! ACM certificate inventory.

use crate::aws::{next_token, IntoRemote};
use crate::constants::CERTIFICATE_KEY_TYPES;
use crate::services::{CertificateApi, CertificateSummary, Page, RemoteResult};
use async_trait::async_trait;
use aws_config::{Region, SdkConfig};
use aws_sdk_acm::types::{CertificateStatus, Filters, KeyAlgorithm};
use aws_sdk_acm::Client;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// ACM client; one SDK client is created lazily per region.
pub struct CertificateClient {
    config: SdkConfig,
    clients: Mutex<HashMap<String, Client>>,
}

impl CertificateClient {
    #[must_use]
    pub fn new(config: SdkConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn client(&self, region: &str) -> Client {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        clients
            .entry(region.to_string())
            .or_insert_with(|| {
                debug!(region = %region, "Creating ACM client");
                let config = aws_sdk_acm::config::Builder::from(&self.config)
                    .region(Region::new(region.to_string()))
                    .build();
                Client::from_conf(config)
            })
            .clone()
    }
}

#[async_trait]
impl CertificateApi for CertificateClient {
    async fn list_certificates(
        &self,
        region: &str,
        statuses: &[&str],
        token: Option<String>,
    ) -> RemoteResult<Page<CertificateSummary>> {
        let includes = Filters::builder()
            .set_key_types(Some(
                CERTIFICATE_KEY_TYPES
                    .iter()
                    .map(|key_type| KeyAlgorithm::from(*key_type))
                    .collect(),
            ))
            .build();

        let response = self
            .client(region)
            .list_certificates()
            .set_certificate_statuses(Some(
                statuses.iter().map(|s| CertificateStatus::from(*s)).collect(),
            ))
            .includes(includes)
            .set_next_token(token)
            .send()
            .await
            .into_remote()?;

        let items = response
            .certificate_summary_list()
            .iter()
            .filter_map(|summary| {
                Some(CertificateSummary {
                    arn: summary.certificate_arn()?.to_string(),
                    domain_name: summary.domain_name().unwrap_or_default().to_string(),
                    subject_alternative_names: summary
                        .subject_alternative_name_summaries()
                        .to_vec(),
                })
            })
            .collect();

        Ok(Page {
            items,
            next_token: next_token(response.next_token()),
        })
    }
}
