// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CloudFormation stack introspection.

use crate::aws::{next_token, IntoRemote};
use crate::errors::RemoteError;
use crate::services::{Page, RemoteResult, StackApi, StackExport, StackResource, StackSummary};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudformation::Client;

/// CloudFormation client.
pub struct StackClient {
    client: Client,
}

impl StackClient {
    #[must_use]
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl StackApi for StackClient {
    async fn describe_stack_resource(
        &self,
        stack_name: &str,
        logical_id: &str,
    ) -> RemoteResult<StackResource> {
        let response = self
            .client
            .describe_stack_resource()
            .stack_name(stack_name)
            .logical_resource_id(logical_id)
            .send()
            .await
            .into_remote()?;

        let detail = response.stack_resource_detail().ok_or_else(|| {
            RemoteError::new(format!(
                "Resource {logical_id} does not exist for stack {stack_name}"
            ))
        })?;
        Ok(StackResource {
            logical_id: detail
                .logical_resource_id()
                .unwrap_or(logical_id)
                .to_string(),
            physical_id: detail.physical_resource_id().map(str::to_string),
        })
    }

    async fn describe_stacks(&self, token: Option<String>) -> RemoteResult<Page<StackSummary>> {
        let response = self
            .client
            .describe_stacks()
            .set_next_token(token)
            .send()
            .await
            .into_remote()?;

        let items = response
            .stacks()
            .iter()
            .filter_map(|stack| {
                Some(StackSummary {
                    stack_name: stack.stack_name()?.to_string(),
                    root_id: stack.root_id().map(str::to_string),
                })
            })
            .collect();

        Ok(Page {
            items,
            next_token: next_token(response.next_token()),
        })
    }

    async fn list_exports(&self, token: Option<String>) -> RemoteResult<Page<StackExport>> {
        let response = self
            .client
            .list_exports()
            .set_next_token(token)
            .send()
            .await
            .into_remote()?;

        let items = response
            .exports()
            .iter()
            .filter_map(|export| {
                Some(StackExport {
                    name: export.name()?.to_string(),
                    value: export.value()?.to_string(),
                })
            })
            .collect();

        Ok(Page {
            items,
            next_token: next_token(response.next_token()),
        })
    }
}
