// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! S3 object checks for mutual TLS truststores.

use crate::aws::IntoRemote;
use crate::services::{ObjectStorageApi, RemoteResult};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;

/// S3 client.
pub struct ObjectStorageClient {
    client: Client,
}

impl ObjectStorageClient {
    #[must_use]
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ObjectStorageApi for ObjectStorageClient {
    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> RemoteResult<()> {
        self.client
            .head_object()
            .bucket(bucket)
            .key(key)
            .set_version_id(version_id.map(str::to_string))
            .send()
            .await
            .into_remote()
            .map(drop)
    }
}
