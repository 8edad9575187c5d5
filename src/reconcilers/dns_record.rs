// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route53 alias records for custom domains.
//!
//! Each domain gets an `A` alias (and an `AAAA` alias unless IPv6 records
//! are disabled) pointing at the gateway's distribution or regional target.
//! With split-horizon DNS the same batch goes to both the public and the
//! private zone.

use crate::config::DeploymentContext;
use crate::constants::DEFAULT_EDGE_HOSTED_ZONE_ID;
use crate::domain::{DomainConfig, RoutingPolicy};
use crate::errors::DomainError;
use crate::reconcilers::hosted_zone::get_hosted_zone_id;
use crate::reconcilers::retry::throttled_call;
use crate::services::{AliasTarget, ChangeAction, DnsApi, RecordChange, RecordType};
use tracing::{debug, info};

/// Build the change batch for a domain.
///
/// # Errors
///
/// Returns [`DomainError::MissingDomainInfo`] if the remote domain target
/// has not been resolved.
pub fn record_changes(
    action: ChangeAction,
    domain: &DomainConfig,
    ctx: &DeploymentContext,
) -> Result<Vec<RecordChange>, DomainError> {
    let info = domain
        .domain_info
        .as_ref()
        .ok_or_else(|| DomainError::MissingDomainInfo {
            domain: domain.given_domain_name.clone(),
        })?;

    let alias_target = AliasTarget {
        dns_name: info.domain_name.clone(),
        hosted_zone_id: info
            .hosted_zone_id
            .clone()
            .unwrap_or_else(|| DEFAULT_EDGE_HOSTED_ZONE_ID.to_string()),
        evaluate_target_health: false,
    };

    let params = &domain.route53_params;
    let set_identifier = || {
        Some(
            params
                .set_identifier
                .clone()
                .unwrap_or_else(|| info.domain_name.clone()),
        )
    };

    let mut record_types = vec![RecordType::A];
    if domain.create_route53_ipv6_record {
        record_types.push(RecordType::Aaaa);
    }

    Ok(record_types
        .into_iter()
        .map(|record_type| {
            let mut change = RecordChange {
                action,
                name: domain.given_domain_name.clone(),
                record_type,
                alias_target: alias_target.clone(),
                set_identifier: None,
                region: None,
                weight: None,
                health_check_id: None,
            };
            match params.routing_policy {
                RoutingPolicy::Simple => {}
                RoutingPolicy::Latency => {
                    change.region = Some(ctx.region.clone());
                    change.set_identifier = set_identifier();
                    change.health_check_id = params.health_check_id.clone();
                }
                RoutingPolicy::Weighted => {
                    change.weight = Some(params.weight);
                    change.set_identifier = set_identifier();
                    change.health_check_id = params.health_check_id.clone();
                }
            }
            change
        })
        .collect())
}

/// Zone privacy preferences to submit to: one lookup normally, public and
/// private with split-horizon DNS.
#[must_use]
pub fn zone_targets(domain: &DomainConfig) -> Vec<Option<bool>> {
    if domain.split_horizon_dns {
        vec![Some(false), Some(true)]
    } else {
        vec![None]
    }
}

/// Upsert or delete the alias records of a domain.
///
/// Does nothing when `createRoute53Record` is false.
///
/// # Errors
///
/// Returns a hosted zone error if a zone cannot be resolved and
/// [`DomainError::DnsChange`] if a submission fails.
pub async fn change_resource_record_set(
    dns: &dyn DnsApi,
    ctx: &DeploymentContext,
    action: ChangeAction,
    domain: &DomainConfig,
) -> Result<(), DomainError> {
    let name = domain.given_domain_name.as_str();
    if !domain.create_route53_record {
        info!(domain = %name, action = %action, "Route53 record creation disabled, skipping");
        return Ok(());
    }

    let changes = record_changes(action, domain, ctx)?;

    for private in zone_targets(domain) {
        let zone_id = get_hosted_zone_id(dns, domain, private).await?;
        debug!(domain = %name, zone_id = %zone_id, records = changes.len(), "Submitting Route53 change batch");

        throttled_call(
            || dns.change_resource_record_sets(&zone_id, &changes),
            "changeResourceRecordSets",
        )
        .await
        .map_err(|source| DomainError::DnsChange {
            action: action.to_string(),
            domain: name.to_string(),
            source,
        })?;

        info!(domain = %name, zone_id = %zone_id, action = %action, "Route53 records changed");
    }

    Ok(())
}

#[cfg(test)]
#[path = "dns_record_tests.rs"]
mod dns_record_tests;
