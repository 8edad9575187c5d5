// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route53 hosted zone resolution.

use crate::constants::HOSTED_ZONE_ID_PREFIX;
use crate::domain::DomainConfig;
use crate::errors::DomainError;
use crate::reconcilers::pagination::get_all_pages;
use crate::services::{DnsApi, HostedZoneSummary};
use tracing::debug;

/// Resolve the hosted zone id records for `domain` go into.
///
/// `private_override` takes precedence over the domain's `hostedZonePrivate`
/// and is used for split-horizon lookups. When neither is set, public and
/// private zones are both candidates.
///
/// # Errors
///
/// Returns [`DomainError::HostedZoneLookup`] if listing fails and
/// [`DomainError::HostedZoneNotFound`] if no zone matches.
pub async fn get_hosted_zone_id(
    dns: &dyn DnsApi,
    domain: &DomainConfig,
    private_override: Option<bool>,
) -> Result<String, DomainError> {
    if let Some(id) = &domain.hosted_zone_id {
        return Ok(strip_hosted_zone_prefix(id).to_string());
    }

    let zones = get_all_pages(|marker| dns.list_hosted_zones(marker), "listHostedZones")
        .await
        .map_err(|source| DomainError::HostedZoneLookup { source })?;

    let private = private_override.or(domain.hosted_zone_private);
    let zone = select_hosted_zone(&zones, &domain.given_domain_name, private).ok_or_else(|| {
        DomainError::HostedZoneNotFound {
            domain: domain.given_domain_name.clone(),
        }
    })?;

    debug!(
        domain = %domain.given_domain_name,
        zone = %zone.name,
        zone_id = %zone.id,
        private = zone.private,
        "Selected hosted zone"
    );
    Ok(strip_hosted_zone_prefix(&zone.id).to_string())
}

/// The zone with the longest name that is a suffix of `domain_name`.
///
/// Zone names are compared without their trailing dot. Matching is a plain
/// string suffix. Equal-length matches keep inventory order.
#[must_use]
pub fn select_hosted_zone<'a>(
    zones: &'a [HostedZoneSummary],
    domain_name: &str,
    private: Option<bool>,
) -> Option<&'a HostedZoneSummary> {
    let mut best: Option<(&'a HostedZoneSummary, usize)> = None;

    let candidates = zones
        .iter()
        .filter(|zone| private.map_or(true, |wanted| zone.private == wanted));
    for zone in candidates {
        let name = zone.name.trim_end_matches('.');
        if !domain_name.ends_with(name) {
            continue;
        }
        if best.map_or(true, |(_, length)| name.len() > length) {
            best = Some((zone, name.len()));
        }
    }

    best.map(|(zone, _)| zone)
}

/// Drop a leading `/hostedzone/` from a zone id.
#[must_use]
pub fn strip_hosted_zone_prefix(id: &str) -> &str {
    id.strip_prefix(HOSTED_ZONE_ID_PREFIX).unwrap_or(id)
}

#[cfg(test)]
#[path = "hosted_zone_tests.rs"]
mod hosted_zone_tests;
