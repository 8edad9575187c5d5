// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lifecycle orchestration across all configured domains.
//!
//! Every lifecycle operation fans out one future per domain and awaits them
//! all. Domains share no mutable state, so a failing domain never stops its
//! siblings; failures are collected into a single [`LifecycleError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use apigw_domains::manager::DomainManager;
//!
//! async fn deploy(mut manager: DomainManager) -> anyhow::Result<()> {
//!     manager.create_domains().await?;
//!     manager.setup_mappings().await?;
//!     Ok(())
//! }
//! ```

use crate::domain::DomainConfig;
use crate::errors::{DomainError, DomainFailure, LifecycleError, TemplateError};
use crate::reconcilers::{DomainReconciler, DomainSummary};
use crate::template::add_domain_outputs;
use futures::future::join_all;
use serde_json::Value;
use std::future::Future;
use tracing::{error, info};

/// Runs lifecycle operations over every enabled domain.
pub struct DomainManager {
    reconciler: DomainReconciler,
    domains: Vec<DomainConfig>,
}

impl DomainManager {
    #[must_use]
    pub fn new(reconciler: DomainReconciler, domains: Vec<DomainConfig>) -> Self {
        Self {
            reconciler,
            domains,
        }
    }

    /// The managed domains, with whatever remote state the last operation observed.
    #[must_use]
    pub fn domains(&self) -> &[DomainConfig] {
        &self.domains
    }

    /// Create missing domains and upsert their DNS records.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] listing every domain that failed.
    pub async fn create_domains(&mut self) -> Result<(), LifecycleError> {
        self.for_each_domain("create", DomainReconciler::create_domain)
            .await
            .map(drop)
    }

    /// Delete existing domains and their DNS records.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] listing every domain that failed.
    pub async fn delete_domains(&mut self) -> Result<(), LifecycleError> {
        self.for_each_domain("delete", DomainReconciler::delete_domain)
            .await
            .map(drop)
    }

    /// Resolve domains before deployment, creating `autoDomain` domains that are missing.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] listing every domain that failed.
    pub async fn prepare_domains(&mut self) -> Result<(), LifecycleError> {
        self.for_each_domain("prepare-outputs", DomainReconciler::prepare_domain)
            .await
            .map(drop)
    }

    /// Write the outputs of every resolved domain into a compiled template.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if the template is malformed.
    pub fn write_outputs(&self, template: &mut Value) -> Result<(), TemplateError> {
        add_domain_outputs(template, &self.domains, self.reconciler.context())
    }

    /// Create or update the API mapping of every domain.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] listing every domain that failed.
    pub async fn setup_mappings(&mut self) -> Result<(), LifecycleError> {
        self.for_each_domain("setup-mappings", DomainReconciler::setup_mapping)
            .await
            .map(drop)
    }

    /// Remove the API mapping of every domain.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] listing every domain that failed.
    pub async fn remove_mappings(&mut self) -> Result<(), LifecycleError> {
        self.for_each_domain("remove-mappings", DomainReconciler::remove_mapping)
            .await
            .map(drop)
    }

    /// Summaries of the domains that exist, in configuration order.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] listing every domain whose lookup failed.
    pub async fn summary(&mut self) -> Result<Vec<DomainSummary>, LifecycleError> {
        let summaries = self
            .for_each_domain("summary", DomainReconciler::summarize)
            .await?;
        Ok(summaries.into_iter().flatten().collect())
    }

    async fn for_each_domain<'a, T, F, Fut>(
        &'a mut self,
        operation: &'static str,
        step: F,
    ) -> Result<Vec<T>, LifecycleError>
    where
        F: Fn(&'a DomainReconciler, &'a mut DomainConfig) -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let Self {
            reconciler,
            domains,
        } = self;
        if domains.is_empty() {
            info!(operation, "No enabled custom domains, nothing to do");
            return Ok(Vec::new());
        }

        let reconciler: &'a DomainReconciler = reconciler;
        let names: Vec<String> = domains
            .iter()
            .map(|domain| domain.given_domain_name.clone())
            .collect();
        info!(operation, domains = names.len(), "Starting lifecycle operation");

        let results = join_all(domains.iter_mut().map(|domain| step(reconciler, domain))).await;

        let mut values = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (domain, result) in names.into_iter().zip(results) {
            match result {
                Ok(value) => values.push(value),
                Err(e) => {
                    error!(
                        operation,
                        domain = %domain,
                        reason = e.reason(),
                        error = %e,
                        "Custom domain operation failed"
                    );
                    failures.push(DomainFailure { domain, error: e });
                }
            }
        }

        if failures.is_empty() {
            info!(operation, "Lifecycle operation completed");
            Ok(values)
        } else {
            Err(LifecycleError {
                operation,
                failures,
            })
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod manager_tests;
