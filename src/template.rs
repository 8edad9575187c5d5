// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Output binding for the compiled CloudFormation template.
//!
//! Before deployment, every resolved domain publishes its target as stack
//! outputs so other stacks can import them. Keys are suffixed per API type
//! (`DomainNameHttp`, `HostedZoneIdWebsocket`, ...) so that a deployment
//! with several API types does not collide.

use crate::config::DeploymentContext;
use crate::constants::{OUTPUT_DISTRIBUTION_DOMAIN_NAME, OUTPUT_DOMAIN_NAME, OUTPUT_HOSTED_ZONE_ID};
use crate::domain::{ApiType, DomainConfig};
use crate::errors::TemplateError;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Output key suffix for an API type; REST keeps the bare key.
#[must_use]
pub fn output_suffix(api_type: ApiType) -> &'static str {
    match api_type {
        ApiType::Rest => "",
        ApiType::Http => "Http",
        ApiType::Websocket => "Websocket",
    }
}

/// Name under which an output is exported.
#[must_use]
pub fn export_name(ctx: &DeploymentContext, key: &str) -> String {
    format!("sls-{}-{}-{key}", ctx.service, ctx.stage)
}

/// Outputs describing one resolved domain, keyed by output name.
///
/// Domains without `domain_info` produce no outputs.
#[must_use]
pub fn domain_outputs(domain: &DomainConfig, ctx: &DeploymentContext) -> Map<String, Value> {
    let mut outputs = Map::new();
    let Some(info) = &domain.domain_info else {
        return outputs;
    };

    let suffix = output_suffix(domain.api_type);
    let mut insert = |base: &str, value: &str| {
        let key = format!("{base}{suffix}");
        let output = json!({
            "Value": value,
            "Export": { "Name": export_name(ctx, &key) },
        });
        outputs.insert(key, output);
    };

    insert(OUTPUT_DOMAIN_NAME, &domain.given_domain_name);
    insert(OUTPUT_DISTRIBUTION_DOMAIN_NAME, &info.domain_name);
    if let Some(zone) = &info.hosted_zone_id {
        insert(OUTPUT_HOSTED_ZONE_ID, zone);
    }

    outputs
}

/// Merge the outputs of every resolved domain into `template.Outputs`.
///
/// A missing `Outputs` section is created. Existing outputs with other keys
/// are kept; outputs with the same key are replaced.
///
/// # Errors
///
/// Returns [`TemplateError::NotAnObject`] if the template or its `Outputs`
/// section is not a JSON object.
pub fn add_domain_outputs(
    template: &mut Value,
    domains: &[DomainConfig],
    ctx: &DeploymentContext,
) -> Result<(), TemplateError> {
    let root = template
        .as_object_mut()
        .ok_or(TemplateError::NotAnObject { section: "root" })?;
    let outputs = root
        .entry("Outputs")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or(TemplateError::NotAnObject { section: "Outputs" })?;

    for domain in domains {
        let domain_outputs = domain_outputs(domain, ctx);
        if domain_outputs.is_empty() {
            warn!(
                domain = %domain.given_domain_name,
                "Custom domain is not resolved, no outputs written"
            );
            continue;
        }
        debug!(
            domain = %domain.given_domain_name,
            outputs = domain_outputs.len(),
            "Adding template outputs"
        );
        outputs.extend(domain_outputs);
    }

    Ok(())
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod template_tests;
