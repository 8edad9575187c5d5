// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resolution of the API id behind a custom domain.
//!
//! The id comes from the manifest when given explicitly, otherwise from the
//! deployment's CloudFormation stack. Resources split into nested stacks are
//! found by searching every stack whose root is the deployment's stack.

use crate::config::{ApiIdSource, DeploymentContext};
use crate::constants::{HTTP_API_LOGICAL_ID, REST_API_LOGICAL_ID, WEBSOCKET_API_LOGICAL_ID};
use crate::domain::ApiType;
use crate::errors::{DomainError, RemoteError};
use crate::reconcilers::pagination::get_all_pages;
use crate::reconcilers::retry::throttled_call;
use crate::services::{StackApi, StackResource};
use tracing::{debug, info, warn};

/// Logical resource id the framework gives the API of each type.
#[must_use]
pub fn default_logical_id(api_type: ApiType) -> &'static str {
    match api_type {
        ApiType::Rest => REST_API_LOGICAL_ID,
        ApiType::Http => HTTP_API_LOGICAL_ID,
        ApiType::Websocket => WEBSOCKET_API_LOGICAL_ID,
    }
}

/// Resolve the id of the deployment's API of `api_type`.
///
/// Returns `Ok(None)` only when an `Fn::ImportValue` names an export that
/// does not exist; callers decide whether that is fatal.
///
/// # Errors
///
/// Returns [`DomainError::StackLookup`] if stacks or exports cannot be
/// read for a reason other than a missing resource,
/// [`DomainError::StackResourceNotFound`] if the resource is in no
/// stack, and [`DomainError::MissingApiId`] if it has no physical id.
pub async fn find_api_id(
    stacks: &dyn StackApi,
    ctx: &DeploymentContext,
    api_type: ApiType,
) -> Result<Option<String>, DomainError> {
    match ctx.api_id_source(api_type) {
        Some(ApiIdSource::Literal(id)) => {
            info!(api_type = %api_type, api_id = %id, "Using configured API id");
            Ok(Some(id.clone()))
        }
        Some(ApiIdSource::Import { export_name }) => {
            let value = resolve_import(stacks, ctx, export_name).await?;
            if value.is_none() {
                warn!(
                    api_type = %api_type,
                    export = %export_name,
                    "Unable to resolve Fn::ImportValue, no export with that name"
                );
            }
            Ok(value)
        }
        Some(ApiIdSource::Reference { logical_id }) => {
            get_api_id(stacks, ctx, logical_id).await.map(Some)
        }
        None => get_api_id(stacks, ctx, default_logical_id(api_type))
            .await
            .map(Some),
    }
}

/// Value of the CloudFormation export named `export_name`.
///
/// # Errors
///
/// Returns [`DomainError::StackLookup`] if exports cannot be listed.
pub async fn resolve_import(
    stacks: &dyn StackApi,
    ctx: &DeploymentContext,
    export_name: &str,
) -> Result<Option<String>, DomainError> {
    let exports = get_all_pages(|token| stacks.list_exports(token), "listExports")
        .await
        .map_err(|source| DomainError::StackLookup {
            stack: ctx.stack_name.clone(),
            source,
        })?;

    Ok(exports
        .into_iter()
        .find(|export| export.name == export_name)
        .map(|export| export.value))
}

/// Physical id of `logical_id` in the deployment stack or its nested stacks.
///
/// # Errors
///
/// See [`find_api_id`].
pub async fn get_api_id(
    stacks: &dyn StackApi,
    ctx: &DeploymentContext,
    logical_id: &str,
) -> Result<String, DomainError> {
    let stack_name = ctx.stack_name.as_str();
    debug!(stack = %stack_name, logical_id = %logical_id, "Looking up API id in stack");

    let (found_in, resource) = match describe_resource(stacks, stack_name, logical_id).await? {
        Some(resource) => (stack_name.to_string(), resource),
        None => find_in_nested_stacks(stacks, stack_name, logical_id)
            .await?
            .ok_or_else(|| DomainError::StackResourceNotFound {
                stack: stack_name.to_string(),
                logical_id: logical_id.to_string(),
            })?,
    };

    let api_id = resource
        .physical_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DomainError::MissingApiId {
            stack: found_in.clone(),
            logical_id: logical_id.to_string(),
        })?;

    info!(stack = %found_in, logical_id = %logical_id, api_id = %api_id, "Found API id");
    Ok(api_id)
}

/// CloudFormation reports a missing resource as a `ValidationError` rather than a 404.
fn is_missing_resource(error: &RemoteError) -> bool {
    error.is_not_found()
        || (error.code.as_deref() == Some("ValidationError")
            && error.message.contains("does not exist"))
}

async fn describe_resource(
    stacks: &dyn StackApi,
    stack_name: &str,
    logical_id: &str,
) -> Result<Option<StackResource>, DomainError> {
    match throttled_call(
        || stacks.describe_stack_resource(stack_name, logical_id),
        "describeStackResource",
    )
    .await
    {
        Ok(resource) => Ok(Some(resource)),
        Err(e) if is_missing_resource(&e) => {
            debug!(stack = %stack_name, logical_id = %logical_id, error = %e, "Resource not found in stack");
            Ok(None)
        }
        Err(source) => Err(DomainError::StackLookup {
            stack: stack_name.to_string(),
            source,
        }),
    }
}

/// Stacks whose root stack is `stack_name`, in listing order.
///
/// # Errors
///
/// Returns [`DomainError::StackLookup`] if stacks cannot be listed.
pub async fn nested_stack_names(
    stacks: &dyn StackApi,
    stack_name: &str,
) -> Result<Vec<String>, DomainError> {
    let all = get_all_pages(|token| stacks.describe_stacks(token), "describeStacks")
        .await
        .map_err(|source| DomainError::StackLookup {
            stack: stack_name.to_string(),
            source,
        })?;

    let marker = format!("/{stack_name}/");
    Ok(all
        .into_iter()
        .filter(|stack| stack.root_id.as_deref().is_some_and(|root| root.contains(&marker)))
        .map(|stack| stack.stack_name)
        .collect())
}

async fn find_in_nested_stacks(
    stacks: &dyn StackApi,
    stack_name: &str,
    logical_id: &str,
) -> Result<Option<(String, StackResource)>, DomainError> {
    let nested = nested_stack_names(stacks, stack_name).await?;
    debug!(stack = %stack_name, nested = nested.len(), "Searching nested stacks");

    for nested_name in nested {
        if let Some(resource) = describe_resource(stacks, &nested_name, logical_id).await? {
            return Ok(Some((nested_name, resource)));
        }
    }
    Ok(None)
}

#[cfg(test)]
#[path = "stack_tests.rs"]
mod stack_tests;
