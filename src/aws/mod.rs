// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! AWS SDK implementations of the capability traits in [`services`](crate::services).
//!
//! Each submodule wraps one SDK client and translates between the SDK's
//! request/response types and the transport-neutral types the reconcilers
//! use. Every SDK failure is converted into a [`RemoteError`] carrying the
//! vendor error code and HTTP status, so retry and not-found handling stay
//! independent of the SDK.

pub mod acm;
pub mod apigateway;
pub mod apigatewayv2;
pub mod cloudformation;
pub mod route53;
pub mod s3;

use crate::config::DeploymentContext;
use crate::errors::RemoteError;
use crate::services::{RemoteResult, Services};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_apigateway::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::SdkError;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::sync::Arc;
use tracing::debug;

/// Load shared SDK configuration for the deployment region.
///
/// Credentials come from the default provider chain, or from `profile`
/// when one is given.
pub async fn load_sdk_config(region: &str, profile: Option<&str>) -> SdkConfig {
    debug!(region = %region, profile = ?profile, "Loading AWS configuration");
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}

/// Build the SDK-backed services for a deployment.
pub async fn connect(ctx: &DeploymentContext, profile: Option<&str>) -> Services {
    let config = load_sdk_config(&ctx.region, profile).await;

    Services {
        gateway_v1: Arc::new(apigateway::LegacyGatewayClient::new(&config)),
        gateway_v2: Arc::new(apigatewayv2::ModernGatewayClient::new(&config)),
        certificates: Arc::new(acm::CertificateClient::new(config.clone())),
        dns: Arc::new(route53::DnsClient::new(&config)),
        stacks: Arc::new(cloudformation::StackClient::new(&config)),
        object_storage: Arc::new(s3::ObjectStorageClient::new(&config)),
    }
}

/// Convert an SDK failure into a [`RemoteError`].
pub(crate) fn remote_error<E>(err: &SdkError<E, HttpResponse>) -> RemoteError
where
    E: ProvideErrorMetadata + Error + 'static,
{
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(err).to_string(), str::to_string);
    let mut remote = RemoteError::new(message);
    if let Some(code) = err.code() {
        remote = remote.with_code(code);
    }
    if let Some(response) = err.raw_response() {
        remote = remote.with_status(response.status().as_u16());
    }
    remote
}

/// Conversion of SDK results into [`RemoteResult`]s.
pub(crate) trait IntoRemote<T> {
    fn into_remote(self) -> RemoteResult<T>;
}

impl<T, E> IntoRemote<T> for Result<T, SdkError<E, HttpResponse>>
where
    E: ProvideErrorMetadata + Error + 'static,
{
    fn into_remote(self) -> RemoteResult<T> {
        self.map_err(|e| remote_error(&e))
    }
}

/// Error for a request that could not be assembled.
pub(crate) fn build_error(err: impl std::fmt::Display) -> RemoteError {
    RemoteError::new(format!("invalid request: {err}"))
}

/// The SDKs take tags as a `HashMap`.
pub(crate) fn tag_map(tags: &BTreeMap<String, String>) -> Option<HashMap<String, String>> {
    (!tags.is_empty()).then(|| tags.clone().into_iter().collect())
}

/// Next-page cursor, treating an empty token as the last page.
pub(crate) fn next_token(token: Option<&str>) -> Option<String> {
    token.filter(|t| !t.is_empty()).map(str::to_string)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
