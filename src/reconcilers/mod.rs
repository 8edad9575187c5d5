// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for API Gateway custom domains.
//!
//! Each lifecycle step compares the desired state (a validated
//! [`DomainConfig`](crate::domain::DomainConfig)) with the remote state and
//! makes only the calls needed to converge:
//!
//! 1. **Lookup** - Read the domain, certificate, hosted zone and API id
//! 2. **Converge** - Create, update or delete the domain, mapping and records
//! 3. **Record** - Store the observed remote state on the domain config
//!
//! # Available Steps
//!
//! ## Domains
//!
//! - [`DomainReconciler::create_domain`] - Creates the domain and upserts its alias records
//! - [`DomainReconciler::delete_domain`] - Deletes the domain and its alias records
//! - [`DomainReconciler::prepare_domain`] - Resolves (and with `autoDomain` creates) the domain before deployment
//!
//! ## Mappings
//!
//! - [`DomainReconciler::setup_mapping`] - Creates or updates the API mapping
//! - [`DomainReconciler::remove_mapping`] - Removes the API mapping
//!
//! ## Lookups
//!
//! - [`certificate::get_certificate_arn`] - Certificate matching a domain
//! - [`hosted_zone::get_hosted_zone_id`] - Hosted zone owning a domain
//! - [`stack::find_api_id`] - API id from the deployment stack
//!
//! All remote calls go through [`retry::throttled_call`] and
//! [`pagination::get_all_pages`].

pub mod certificate;
pub mod custom_domain;
pub mod dns_record;
pub mod gateway;
pub mod hosted_zone;
pub mod pagination;
pub mod retry;
pub mod stack;
pub mod truststore;

pub use custom_domain::{select_api_mapping, DomainReconciler, DomainSummary};
pub use gateway::{ApiGateway, GatewayVersion, Gateways};
