// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route53 transport.

use crate::aws::{build_error, next_token, IntoRemote};
use crate::constants::HOSTED_ZONE_PAGE_SIZE;
use crate::services::{
    ChangeAction, DnsApi, HostedZoneSummary, Page, RecordChange, RecordType, RemoteResult,
};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_route53::error::BuildError;
use aws_sdk_route53::types::{
    AliasTarget, Change, ChangeAction as SdkChangeAction, ChangeBatch, ResourceRecordSet,
    ResourceRecordSetRegion, RrType,
};
use aws_sdk_route53::Client;

/// Route53 client. Route53 is a global service, any region works.
pub struct DnsClient {
    client: Client,
}

impl DnsClient {
    #[must_use]
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn sdk_change(change: &RecordChange) -> Result<Change, BuildError> {
    let action = match change.action {
        ChangeAction::Upsert => SdkChangeAction::Upsert,
        ChangeAction::Delete => SdkChangeAction::Delete,
    };
    let record_type = match change.record_type {
        RecordType::A => RrType::A,
        RecordType::Aaaa => RrType::Aaaa,
    };

    let alias_target = AliasTarget::builder()
        .dns_name(&change.alias_target.dns_name)
        .hosted_zone_id(&change.alias_target.hosted_zone_id)
        .evaluate_target_health(change.alias_target.evaluate_target_health)
        .build()?;
    let record_set = ResourceRecordSet::builder()
        .name(&change.name)
        .r#type(record_type)
        .alias_target(alias_target)
        .set_set_identifier(change.set_identifier.clone())
        .set_region(change.region.as_deref().map(ResourceRecordSetRegion::from))
        .set_weight(change.weight)
        .set_health_check_id(change.health_check_id.clone())
        .build()?;

    Change::builder()
        .action(action)
        .resource_record_set(record_set)
        .build()
}

#[async_trait]
impl DnsApi for DnsClient {
    async fn list_hosted_zones(
        &self,
        marker: Option<String>,
    ) -> RemoteResult<Page<HostedZoneSummary>> {
        let response = self
            .client
            .list_hosted_zones()
            .max_items(HOSTED_ZONE_PAGE_SIZE)
            .set_marker(marker)
            .send()
            .await
            .into_remote()?;

        let items = response
            .hosted_zones()
            .iter()
            .map(|zone| HostedZoneSummary {
                id: zone.id().to_string(),
                name: zone.name().to_string(),
                private: zone.config().is_some_and(|config| config.private_zone()),
            })
            .collect();

        let marker = if response.is_truncated() {
            next_token(response.next_marker())
        } else {
            None
        };
        Ok(Page {
            items,
            next_token: marker,
        })
    }

    async fn change_resource_record_sets(
        &self,
        hosted_zone_id: &str,
        changes: &[RecordChange],
    ) -> RemoteResult<()> {
        let changes = changes
            .iter()
            .map(sdk_change)
            .collect::<Result<Vec<_>, _>>()
            .map_err(build_error)?;
        let batch = ChangeBatch::builder()
            .set_changes(Some(changes))
            .build()
            .map_err(build_error)?;

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(hosted_zone_id)
            .change_batch(batch)
            .send()
            .await
            .into_remote()
            .map(drop)
    }
}

#[cfg(test)]
#[path = "route53_tests.rs"]
mod route53_tests;
