// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-domain reconciliation flows.
//!
//! [`DomainReconciler`] runs one lifecycle step for one domain. Steps within
//! a domain are strictly sequential: the certificate is resolved before the
//! domain is created, and the domain exists before DNS records point at it.
//! Running many domains concurrently is the job of
//! [`DomainManager`](crate::manager::DomainManager).

use crate::config::DeploymentContext;
use crate::constants::AUTO_DOMAIN_POLL_INTERVAL_SECS;
use crate::domain::DomainConfig;
use crate::errors::DomainError;
use crate::reconcilers::certificate::get_certificate_arn;
use crate::reconcilers::dns_record::change_resource_record_set;
use crate::reconcilers::gateway::{api_mapping_stage, Gateways};
use crate::reconcilers::stack::{default_logical_id, find_api_id};
use crate::reconcilers::truststore::verify_truststore;
use crate::services::{ApiMapping, ChangeAction, DomainInfo, Services};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What `summary` reports for an existing domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSummary {
    pub domain_name: String,
    /// Distribution or regional domain name the alias records point at
    pub target_domain: String,
    pub hosted_zone_id: Option<String>,
}

/// The current mapping of the domain's API among all of the domain's mappings.
///
/// Matches on API id, or on base path when `allowPathMatching` is set.
#[must_use]
pub fn select_api_mapping(
    mappings: &[ApiMapping],
    api_id: Option<&str>,
    domain: &DomainConfig,
) -> Option<ApiMapping> {
    mappings
        .iter()
        .find(|mapping| {
            api_id.is_some_and(|id| mapping.api_id == id)
                || (domain.allow_path_matching && mapping.base_path == domain.base_path)
        })
        .cloned()
}

/// Runs lifecycle steps for single domains.
#[derive(Clone)]
pub struct DomainReconciler {
    ctx: Arc<DeploymentContext>,
    services: Services,
    gateways: Gateways,
}

impl DomainReconciler {
    #[must_use]
    pub fn new(ctx: Arc<DeploymentContext>, services: Services) -> Self {
        let gateways = Gateways::new(&services);
        Self {
            ctx,
            services,
            gateways,
        }
    }

    /// The deployment context shared by every step.
    #[must_use]
    pub fn context(&self) -> &DeploymentContext {
        &self.ctx
    }

    /// Look up the remote domain and store the result in `domain_info`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DomainLookup`] for failures other than "not found".
    pub async fn refresh_domain_info(
        &self,
        domain: &mut DomainConfig,
    ) -> Result<Option<DomainInfo>, DomainError> {
        let info = self
            .gateways
            .for_domain(domain)
            .get_custom_domain(domain)
            .await?;
        domain.domain_info.clone_from(&info);
        Ok(info)
    }

    /// Create the domain if it does not exist, then upsert its DNS records.
    ///
    /// DNS records are upserted even when the domain already existed, so
    /// records that drifted are repaired.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn create_domain(&self, domain: &mut DomainConfig) -> Result<(), DomainError> {
        if self.refresh_domain_info(domain).await?.is_none() {
            verify_truststore(self.services.object_storage.as_ref(), domain).await?;
            let certificate_arn =
                get_certificate_arn(self.services.certificates.as_ref(), domain, &self.ctx).await?;

            let gateway = self.gateways.for_domain(domain);
            let info = gateway
                .create_custom_domain(domain, &certificate_arn, &self.ctx.merged_tags())
                .await?;
            domain.domain_info = Some(info);
            info!(domain = %domain.given_domain_name, gateway = %gateway.version(), "Custom domain created");
        } else {
            info!(domain = %domain.given_domain_name, "Custom domain already exists");
        }

        change_resource_record_set(
            self.services.dns.as_ref(),
            &self.ctx,
            ChangeAction::Upsert,
            domain,
        )
        .await
    }

    /// Delete the domain and its DNS records if it exists.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn delete_domain(&self, domain: &mut DomainConfig) -> Result<(), DomainError> {
        if self.refresh_domain_info(domain).await?.is_none() {
            info!(domain = %domain.given_domain_name, "Custom domain does not exist, nothing to delete");
            return Ok(());
        }

        self.gateways
            .for_domain(domain)
            .delete_custom_domain(domain)
            .await?;
        change_resource_record_set(
            self.services.dns.as_ref(),
            &self.ctx,
            ChangeAction::Delete,
            domain,
        )
        .await?;

        domain.domain_info = None;
        domain.api_mapping = None;
        info!(domain = %domain.given_domain_name, "Custom domain deleted");
        Ok(())
    }

    /// Resolve the domain's remote state for template outputs.
    ///
    /// With `autoDomain`, a missing domain is created and polled until it is
    /// readable or `autoDomainWaitFor` runs out.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn prepare_domain(&self, domain: &mut DomainConfig) -> Result<(), DomainError> {
        if self.refresh_domain_info(domain).await?.is_some() {
            return Ok(());
        }

        if !domain.auto_domain {
            warn!(
                domain = %domain.given_domain_name,
                "Custom domain does not exist and autoDomain is disabled, run create first"
            );
            return Ok(());
        }

        info!(domain = %domain.given_domain_name, "Creating custom domain before deployment");
        self.create_domain(domain).await?;
        self.wait_for_domain(domain).await
    }

    async fn wait_for_domain(&self, domain: &mut DomainConfig) -> Result<(), DomainError> {
        let poll_interval = Duration::from_secs(AUTO_DOMAIN_POLL_INTERVAL_SECS);
        let deadline = Instant::now() + domain.auto_domain_wait_for;
        let gateway = self.gateways.for_domain(domain);

        loop {
            if let Some(info) = gateway.get_custom_domain(domain).await? {
                domain.domain_info = Some(info);
                debug!(domain = %domain.given_domain_name, "Custom domain is available");
                return Ok(());
            }
            if Instant::now() + poll_interval > deadline {
                warn!(
                    domain = %domain.given_domain_name,
                    wait_for = ?domain.auto_domain_wait_for,
                    "Timed out waiting for custom domain, using creation response"
                );
                return Ok(());
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Create or update the mapping of the deployment's API on the domain.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MissingDomainInfo`] if the domain does not
    /// exist, [`DomainError::MissingApiId`] if the API id cannot be resolved,
    /// or the failing mapping call's error.
    pub async fn setup_mapping(&self, domain: &mut DomainConfig) -> Result<(), DomainError> {
        if self.refresh_domain_info(domain).await?.is_none() {
            return Err(DomainError::MissingDomainInfo {
                domain: domain.given_domain_name.clone(),
            });
        }

        let api_id = find_api_id(self.services.stacks.as_ref(), &self.ctx, domain.api_type)
            .await?
            .ok_or_else(|| DomainError::MissingApiId {
                stack: self.ctx.stack_name.clone(),
                logical_id: default_logical_id(domain.api_type).to_string(),
            })?;
        domain.api_id = Some(api_id.clone());

        let mapping_gateway = self.gateways.for_mappings(domain);
        let mappings = mapping_gateway.get_base_path_mappings(domain).await?;
        domain.api_mapping = select_api_mapping(&mappings, Some(&api_id), domain);

        match &domain.api_mapping {
            None => {
                self.gateways
                    .for_domain(domain)
                    .create_base_path_mapping(domain, &api_id)
                    .await?;
            }
            Some(current)
                if current.api_id == api_id
                    && current.base_path == domain.base_path
                    && current.stage == api_mapping_stage(domain) =>
            {
                info!(
                    domain = %domain.given_domain_name,
                    base_path = %domain.base_path,
                    stage = %current.stage,
                    "API mapping is up to date"
                );
            }
            Some(current) => {
                mapping_gateway
                    .update_base_path_mapping(domain, current, &api_id)
                    .await?;
            }
        }

        Ok(())
    }

    /// Remove the mapping of the deployment's API, and with `autoDomain` the domain too.
    ///
    /// An API id that cannot be resolved is logged, the mapping then needs
    /// manual cleanup.
    ///
    /// # Errors
    ///
    /// Returns mapping lookup or domain deletion errors.
    pub async fn remove_mapping(&self, domain: &mut DomainConfig) -> Result<(), DomainError> {
        if self.refresh_domain_info(domain).await?.is_none() {
            info!(domain = %domain.given_domain_name, "Custom domain does not exist, no mapping to remove");
            return Ok(());
        }

        let api_id = match find_api_id(self.services.stacks.as_ref(), &self.ctx, domain.api_type).await {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                warn!(domain = %domain.given_domain_name, "Unable to resolve API id, remove the API mapping manually");
                None
            }
            Err(e) => {
                warn!(
                    domain = %domain.given_domain_name,
                    error = %e,
                    "Unable to resolve API id, remove the API mapping manually"
                );
                None
            }
        };
        domain.api_id.clone_from(&api_id);

        let gateway = self.gateways.for_mappings(domain);
        let mappings = gateway.get_base_path_mappings(domain).await?;
        domain.api_mapping = select_api_mapping(&mappings, api_id.as_deref(), domain);

        if let Some(current) = &domain.api_mapping {
            gateway.delete_base_path_mapping(domain, current).await;
        } else {
            info!(domain = %domain.given_domain_name, "No API mapping found for this API");
        }

        if !domain.auto_domain {
            return Ok(());
        }

        let external = mappings
            .iter()
            .filter(|mapping| Some(*mapping) != domain.api_mapping.as_ref())
            .count();
        if domain.preserve_external_path_mappings && external > 0 {
            info!(
                domain = %domain.given_domain_name,
                external_mappings = external,
                "Custom domain still has mappings from other APIs, keeping it"
            );
            return Ok(());
        }

        self.delete_domain(domain).await
    }

    /// Remote target of an existing domain.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DomainLookup`] for failures other than "not found".
    pub async fn summarize(
        &self,
        domain: &mut DomainConfig,
    ) -> Result<Option<DomainSummary>, DomainError> {
        Ok(self
            .refresh_domain_info(domain)
            .await?
            .map(|info| DomainSummary {
                domain_name: domain.given_domain_name.clone(),
                target_domain: info.domain_name,
                hosted_zone_id: info.hosted_zone_id,
            }))
    }
}

#[cfg(test)]
#[path = "custom_domain_tests.rs"]
mod custom_domain_tests;
