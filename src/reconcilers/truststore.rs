// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Mutual TLS truststore verification.

use crate::domain::{parse_s3_uri, DomainConfig};
use crate::errors::DomainError;
use crate::reconcilers::retry::throttled_call;
use crate::services::ObjectStorageApi;
use tracing::{debug, warn};

/// Check that the domain's truststore object exists before creating the domain.
///
/// A permission error only means the object cannot be checked, so it is
/// logged and creation proceeds.
///
/// # Errors
///
/// Returns [`DomainError::TruststoreValidation`] if the URI is malformed or
/// the object cannot be found.
pub async fn verify_truststore(
    object_storage: &dyn ObjectStorageApi,
    domain: &DomainConfig,
) -> Result<(), DomainError> {
    let Some(uri) = domain.tls_truststore_uri.as_deref() else {
        return Ok(());
    };
    let name = domain.given_domain_name.as_str();
    let validation_error = |reason: String| DomainError::TruststoreValidation {
        domain: name.to_string(),
        uri: uri.to_string(),
        reason,
    };

    let location = parse_s3_uri(uri).map_err(validation_error)?;
    let version = domain.tls_truststore_version.as_deref();

    match throttled_call(
        || object_storage.head_object(&location.bucket, &location.key, version),
        "headObject",
    )
    .await
    {
        Ok(()) => {
            debug!(domain = %name, uri = %uri, "Truststore object found");
            Ok(())
        }
        Err(e) if e.is_forbidden() => {
            warn!(
                domain = %name,
                uri = %uri,
                "Forbidden to check truststore object, make sure it exists before deploying"
            );
            Ok(())
        }
        Err(e) => Err(validation_error(e.to_string())),
    }
}

#[cfg(test)]
#[path = "truststore_tests.rs"]
mod truststore_tests;
