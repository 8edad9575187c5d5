// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pagination helpers for cursor-paginated list operations.
//!
//! Certificate, hosted zone, stack, export and mapping listings are all
//! cursor-paginated. [`get_all_pages`] drains any of them into one ordered
//! `Vec`, issuing one throttled call per page.

use crate::errors::RemoteError;
use crate::reconcilers::retry::throttled_call;
use crate::services::Page;
use std::future::Future;
use tracing::debug;

/// List all items with automatic pagination.
///
/// `fetch_page` receives the cursor returned by the previous page (`None`
/// for the first call) and returns one [`Page`]. Pages are requested until
/// one comes back without a next token. Each page request is retried on
/// throttling.
///
/// # Arguments
///
/// * `fetch_page` - Async function that fetches one page for a cursor
/// * `operation_name` - Human-readable name for logging (e.g., "listCertificates")
///
/// # Example
///
/// ```no_run
/// use apigw_domains::reconcilers::pagination::get_all_pages;
/// use apigw_domains::services::DnsApi;
///
/// # async fn example(dns: &dyn DnsApi) -> Result<(), apigw_domains::errors::RemoteError> {
/// let zones = get_all_pages(|marker| dns.list_hosted_zones(marker), "listHostedZones").await?;
/// println!("Found {} zones", zones.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns the first page error that is not resolved by retrying.
pub async fn get_all_pages<T, F, Fut>(
    mut fetch_page: F,
    operation_name: &str,
) -> Result<Vec<T>, RemoteError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, RemoteError>>,
{
    let mut all_items = Vec::new();
    let mut next_token: Option<String> = None;
    let mut page_count = 0;

    loop {
        page_count += 1;
        let page = throttled_call(|| fetch_page(next_token.clone()), operation_name).await?;

        let item_count = page.items.len();
        all_items.extend(page.items);

        debug!(
            operation = operation_name,
            page = page_count,
            items_in_page = item_count,
            total_items = all_items.len(),
            "Fetched page"
        );

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    debug!(
        operation = operation_name,
        total_pages = page_count,
        total_items = all_items.len(),
        "Completed paginated list operation"
    );

    Ok(all_items)
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod pagination_tests;
