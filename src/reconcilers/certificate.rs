// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TLS certificate resolution.
//!
//! An explicit `certificateArn` is used as-is. Otherwise the full ACM
//! inventory of the right region is listed and searched, either by
//! `certificateName` or by best match against the domain name.

use crate::config::DeploymentContext;
use crate::constants::{CERTIFICATE_STATUSES, EDGE_CERTIFICATE_REGION};
use crate::domain::{DomainConfig, EndpointType};
use crate::errors::DomainError;
use crate::reconcilers::pagination::get_all_pages;
use crate::services::{CertificateApi, CertificateSummary};
use tracing::{debug, info};

/// Region certificates must be looked up in.
///
/// EDGE domains are served by CloudFront, which only accepts certificates
/// from `us-east-1`.
#[must_use]
pub fn certificate_region<'a>(domain: &DomainConfig, ctx: &'a DeploymentContext) -> &'a str {
    if domain.endpoint_type == EndpointType::Edge {
        EDGE_CERTIFICATE_REGION
    } else {
        &ctx.region
    }
}

/// Resolve the certificate ARN for a domain.
///
/// # Errors
///
/// Returns [`DomainError::CertificateLookup`] if listing fails and
/// [`DomainError::CertificateNotFound`] if nothing matches.
pub async fn get_certificate_arn(
    certificates: &dyn CertificateApi,
    domain: &DomainConfig,
    ctx: &DeploymentContext,
) -> Result<String, DomainError> {
    if let Some(arn) = &domain.certificate_arn {
        debug!(domain = %domain.given_domain_name, certificate_arn = %arn, "Using configured certificate ARN");
        return Ok(arn.clone());
    }

    let region = certificate_region(domain, ctx);
    let inventory = get_all_pages(
        |token| certificates.list_certificates(region, CERTIFICATE_STATUSES, token),
        "listCertificates",
    )
    .await
    .map_err(|source| DomainError::CertificateLookup {
        region: region.to_string(),
        source,
    })?;

    let (search, found) = match &domain.certificate_name {
        Some(name) => (name.as_str(), find_by_name(&inventory, name)),
        None => (
            domain.given_domain_name.as_str(),
            find_best_match(&inventory, &domain.given_domain_name),
        ),
    };

    let certificate = found.ok_or_else(|| DomainError::CertificateNotFound {
        search: search.to_string(),
    })?;

    info!(
        domain = %domain.given_domain_name,
        certificate_arn = %certificate.arn,
        certificate_domain = %certificate.domain_name,
        "Found certificate"
    );
    Ok(certificate.arn.clone())
}

/// First certificate whose primary name or a SAN equals `name`, or `*.name`
/// when `name` is not itself a wildcard.
#[must_use]
pub fn find_by_name<'a>(
    inventory: &'a [CertificateSummary],
    name: &str,
) -> Option<&'a CertificateSummary> {
    let wildcard = (!name.starts_with("*.")).then(|| format!("*.{name}"));
    let matches = |candidate: &str| {
        candidate == name || wildcard.as_deref().is_some_and(|w| candidate == w)
    };

    inventory
        .iter()
        .find(|cert| names_of(cert).any(|candidate| matches(candidate)))
}

/// Most specific certificate whose (wildcard-stripped) name is contained in
/// `domain_name`.
///
/// Containment is a plain substring check. The longest matching name wins;
/// on a tie the earlier certificate is kept.
#[must_use]
pub fn find_best_match<'a>(
    inventory: &'a [CertificateSummary],
    domain_name: &str,
) -> Option<&'a CertificateSummary> {
    let mut best: Option<(&CertificateSummary, usize)> = None;

    for cert in inventory {
        for candidate in names_of(cert) {
            let normalized = candidate.strip_prefix("*.").unwrap_or(candidate);
            if normalized.is_empty() || !domain_name.contains(normalized) {
                continue;
            }
            if best.map_or(true, |(_, length)| normalized.len() > length) {
                best = Some((cert, normalized.len()));
            }
        }
    }

    best.map(|(cert, _)| cert)
}

fn names_of(cert: &CertificateSummary) -> impl Iterator<Item = &str> {
    std::iter::once(cert.domain_name.as_str())
        .chain(cert.subject_alternative_names.iter().map(String::as_str))
}

#[cfg(test)]
#[path = "certificate_tests.rs"]
mod certificate_tests;
