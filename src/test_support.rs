// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory fakes of the remote services, shared by unit tests.
//!
//! Every fake records the calls it receives so tests can assert on the
//! exact sequence of remote operations. Failures are injected per
//! operation name.

use crate::config::{DeploymentContext, RawDomainConfig};
use crate::constants::DEFAULT_EDGE_HOSTED_ZONE_ID;
use crate::domain::{DomainConfig, EndpointType};
use crate::errors::RemoteError;
use crate::services::{
    ApiMapping, CertificateApi, CertificateSummary, DnsApi, DomainInfo, HostedZoneSummary,
    LegacyDomainRequest, LegacyGatewayApi, ModernDomainRequest, ModernGatewayApi,
    ObjectStorageApi, Page, RecordChange, RemoteResult, Services, StackApi, StackExport,
    StackResource, StackSummary,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Hosted zone id the fakes report for regional domains.
pub const REGIONAL_TARGET_ZONE_ID: &str = "Z2OJLYMUO9EFXC";

/// Deployment context used across tests.
pub fn test_context() -> DeploymentContext {
    DeploymentContext {
        service: "orders".to_string(),
        stage: "dev".to_string(),
        region: "eu-west-1".to_string(),
        stack_name: "orders-dev".to_string(),
        stack_tags: BTreeMap::from([("team".to_string(), "payments".to_string())]),
        tags: BTreeMap::from([("owner".to_string(), "platform".to_string())]),
        rest_api_id: None,
        http_api_id: None,
        websocket_api_id: None,
    }
}

/// Raw settings with only a domain name.
pub fn raw_domain(name: &str) -> RawDomainConfig {
    RawDomainConfig {
        domain_name: Some(name.to_string()),
        ..RawDomainConfig::default()
    }
}

/// Validate raw settings against [`test_context`].
pub fn domain_config(raw: &RawDomainConfig) -> DomainConfig {
    DomainConfig::new(raw, &test_context()).expect("valid test domain")
}

/// An EDGE REST domain with default settings.
pub fn edge_domain(name: &str) -> DomainConfig {
    domain_config(&raw_domain(name))
}

/// A REGIONAL domain of the given API type.
pub fn regional_domain(name: &str, api_type: &str) -> DomainConfig {
    domain_config(&RawDomainConfig {
        endpoint_type: Some("regional".to_string()),
        api_type: Some(api_type.to_string()),
        ..raw_domain(name)
    })
}

/// Remote error the gateways return for unknown domains.
pub fn not_found() -> RemoteError {
    RemoteError::new("Invalid domain name identifier specified")
        .with_code("NotFoundException")
        .with_status(404)
}

/// Call log and failure injection shared by the fakes.
#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
    failures: Mutex<BTreeMap<&'static str, RemoteError>>,
}

impl CallLog {
    fn record(&self, operation: &'static str, subject: &str) -> RemoteResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{operation} {subject}"));
        match self.failures.lock().unwrap().get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Make every future call to `operation` fail with `error`.
    pub fn fail(&self, operation: &'static str, error: RemoteError) {
        self.failures.lock().unwrap().insert(operation, error);
    }

    /// Recorded calls, formatted as `"<operation> <subject>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls to `operation`.
    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.split(' ').next() == Some(operation))
            .count()
    }
}

/// Domains and mappings held by a fake gateway.
#[derive(Default)]
pub struct GatewayState {
    pub log: CallLog,
    pub domains: Mutex<BTreeMap<String, DomainInfo>>,
    pub mappings: Mutex<BTreeMap<String, Vec<ApiMapping>>>,
}

impl GatewayState {
    /// Seed an existing domain.
    pub fn insert_domain(&self, name: &str, info: DomainInfo) {
        self.domains.lock().unwrap().insert(name.to_string(), info);
    }

    /// Seed an existing mapping.
    pub fn insert_mapping(&self, name: &str, mapping: ApiMapping) {
        self.mappings
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push(mapping);
    }

    /// Current mappings of a domain.
    pub fn mappings_of(&self, name: &str) -> Vec<ApiMapping> {
        self.mappings
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn get(&self, name: &str) -> RemoteResult<DomainInfo> {
        self.domains
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(not_found)
    }

    fn remove(&self, name: &str) -> RemoteResult<()> {
        self.mappings.lock().unwrap().remove(name);
        self.domains
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(not_found)
    }
}

/// Fake legacy (v1) gateway.
#[derive(Default)]
pub struct FakeLegacyGateway {
    pub state: GatewayState,
    pub create_requests: Mutex<Vec<LegacyDomainRequest>>,
}

#[async_trait]
impl LegacyGatewayApi for FakeLegacyGateway {
    async fn create_domain_name(&self, request: &LegacyDomainRequest) -> RemoteResult<DomainInfo> {
        self.state.log.record("createDomainName", &request.domain_name)?;
        self.create_requests.lock().unwrap().push(request.clone());

        let info = if request.endpoint_type == EndpointType::Edge {
            DomainInfo {
                domain_name: format!("{}.cloudfront.net", request.domain_name),
                hosted_zone_id: Some(DEFAULT_EDGE_HOSTED_ZONE_ID.to_string()),
                security_policy: Some(request.security_policy.as_str().to_string()),
            }
        } else {
            DomainInfo {
                domain_name: format!("{}.legacy.execute-api.eu-west-1.amazonaws.com", request.domain_name),
                hosted_zone_id: Some(REGIONAL_TARGET_ZONE_ID.to_string()),
                security_policy: Some(request.security_policy.as_str().to_string()),
            }
        };
        self.state.insert_domain(&request.domain_name, info.clone());
        Ok(info)
    }

    async fn get_domain_name(&self, domain_name: &str) -> RemoteResult<DomainInfo> {
        self.state.log.record("getDomainName", domain_name)?;
        self.state.get(domain_name)
    }

    async fn delete_domain_name(&self, domain_name: &str) -> RemoteResult<()> {
        self.state.log.record("deleteDomainName", domain_name)?;
        self.state.remove(domain_name)
    }

    async fn create_base_path_mapping(
        &self,
        domain_name: &str,
        base_path: &str,
        rest_api_id: &str,
        stage: &str,
    ) -> RemoteResult<()> {
        self.state
            .log
            .record("createBasePathMapping", &format!("{domain_name} {base_path}"))?;
        self.state.insert_mapping(
            domain_name,
            ApiMapping {
                api_id: rest_api_id.to_string(),
                base_path: base_path.to_string(),
                stage: stage.to_string(),
                mapping_id: None,
            },
        );
        Ok(())
    }

    async fn get_base_path_mappings(
        &self,
        domain_name: &str,
        _position: Option<String>,
    ) -> RemoteResult<Page<ApiMapping>> {
        self.state.log.record("getBasePathMappings", domain_name)?;
        Ok(Page::last(self.state.mappings_of(domain_name)))
    }

    async fn update_base_path_mapping(
        &self,
        domain_name: &str,
        current: &ApiMapping,
        new_base_path: &str,
        rest_api_id: &str,
        stage: &str,
    ) -> RemoteResult<()> {
        self.state.log.record(
            "updateBasePathMapping",
            &format!("{domain_name} {}->{new_base_path}", current.base_path),
        )?;
        let mut mappings = self.state.mappings.lock().unwrap();
        let mapping = mappings
            .get_mut(domain_name)
            .and_then(|all| all.iter_mut().find(|m| m.base_path == current.base_path))
            .ok_or_else(not_found)?;
        mapping.base_path = new_base_path.to_string();
        mapping.api_id = rest_api_id.to_string();
        mapping.stage = stage.to_string();
        Ok(())
    }

    async fn delete_base_path_mapping(
        &self,
        domain_name: &str,
        base_path: &str,
    ) -> RemoteResult<()> {
        self.state
            .log
            .record("deleteBasePathMapping", &format!("{domain_name} {base_path}"))?;
        let mut mappings = self.state.mappings.lock().unwrap();
        let all = mappings.get_mut(domain_name).ok_or_else(not_found)?;
        all.retain(|m| m.base_path != base_path);
        Ok(())
    }
}

/// Fake modern (v2) gateway.
#[derive(Default)]
pub struct FakeModernGateway {
    pub state: GatewayState,
    pub create_requests: Mutex<Vec<ModernDomainRequest>>,
    next_mapping_id: AtomicUsize,
}

#[async_trait]
impl ModernGatewayApi for FakeModernGateway {
    async fn create_domain_name(&self, request: &ModernDomainRequest) -> RemoteResult<DomainInfo> {
        self.state.log.record("createDomainName", &request.domain_name)?;
        self.create_requests.lock().unwrap().push(request.clone());

        let info = DomainInfo {
            domain_name: format!("{}.execute-api.eu-west-1.amazonaws.com", request.domain_name),
            hosted_zone_id: Some(REGIONAL_TARGET_ZONE_ID.to_string()),
            security_policy: request
                .domain_name_configurations
                .first()
                .map(|c| c.security_policy.as_str().to_string()),
        };
        self.state.insert_domain(&request.domain_name, info.clone());
        Ok(info)
    }

    async fn get_domain_name(&self, domain_name: &str) -> RemoteResult<DomainInfo> {
        self.state.log.record("getDomainName", domain_name)?;
        self.state.get(domain_name)
    }

    async fn delete_domain_name(&self, domain_name: &str) -> RemoteResult<()> {
        self.state.log.record("deleteDomainName", domain_name)?;
        self.state.remove(domain_name)
    }

    async fn create_api_mapping(
        &self,
        domain_name: &str,
        api_id: &str,
        api_mapping_key: &str,
        stage: &str,
    ) -> RemoteResult<()> {
        self.state
            .log
            .record("createApiMapping", &format!("{domain_name} {api_mapping_key}"))?;
        let id = self.next_mapping_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.insert_mapping(
            domain_name,
            ApiMapping {
                api_id: api_id.to_string(),
                base_path: api_mapping_key.to_string(),
                stage: stage.to_string(),
                mapping_id: Some(format!("m-{id}")),
            },
        );
        Ok(())
    }

    async fn get_api_mappings(
        &self,
        domain_name: &str,
        _next_token: Option<String>,
    ) -> RemoteResult<Page<ApiMapping>> {
        self.state.log.record("getApiMappings", domain_name)?;
        Ok(Page::last(self.state.mappings_of(domain_name)))
    }

    async fn update_api_mapping(
        &self,
        domain_name: &str,
        api_mapping_id: &str,
        api_id: &str,
        api_mapping_key: &str,
        stage: &str,
    ) -> RemoteResult<()> {
        self.state.log.record(
            "updateApiMapping",
            &format!("{domain_name} {api_mapping_id} {api_mapping_key}"),
        )?;
        let mut mappings = self.state.mappings.lock().unwrap();
        let mapping = mappings
            .get_mut(domain_name)
            .and_then(|all| {
                all.iter_mut()
                    .find(|m| m.mapping_id.as_deref() == Some(api_mapping_id))
            })
            .ok_or_else(not_found)?;
        mapping.api_id = api_id.to_string();
        mapping.base_path = api_mapping_key.to_string();
        mapping.stage = stage.to_string();
        Ok(())
    }

    async fn delete_api_mapping(&self, domain_name: &str, api_mapping_id: &str) -> RemoteResult<()> {
        self.state
            .log
            .record("deleteApiMapping", &format!("{domain_name} {api_mapping_id}"))?;
        let mut mappings = self.state.mappings.lock().unwrap();
        let all = mappings.get_mut(domain_name).ok_or_else(not_found)?;
        all.retain(|m| m.mapping_id.as_deref() != Some(api_mapping_id));
        Ok(())
    }
}

/// Fake certificate inventory; serves `page_size` certificates per page.
pub struct FakeCertificates {
    pub log: CallLog,
    pub certificates: Mutex<Vec<CertificateSummary>>,
    pub page_size: usize,
}

impl Default for FakeCertificates {
    fn default() -> Self {
        Self {
            log: CallLog::default(),
            certificates: Mutex::new(Vec::new()),
            page_size: 2,
        }
    }
}

impl FakeCertificates {
    /// Inventory with one certificate per `(arn, domain name)` pair.
    pub fn with(certificates: &[(&str, &str)]) -> Self {
        let fake = Self::default();
        *fake.certificates.lock().unwrap() = certificates
            .iter()
            .map(|(arn, name)| CertificateSummary {
                arn: (*arn).to_string(),
                domain_name: (*name).to_string(),
                subject_alternative_names: Vec::new(),
            })
            .collect();
        fake
    }
}

#[async_trait]
impl CertificateApi for FakeCertificates {
    async fn list_certificates(
        &self,
        region: &str,
        _statuses: &[&str],
        next_token: Option<String>,
    ) -> RemoteResult<Page<CertificateSummary>> {
        self.log.record("listCertificates", region)?;
        Ok(paginate(
            &self.certificates.lock().unwrap(),
            self.page_size,
            next_token,
        ))
    }
}

/// Fake Route53.
pub struct FakeDns {
    pub log: CallLog,
    pub zones: Mutex<Vec<HostedZoneSummary>>,
    pub changes: Mutex<Vec<(String, Vec<RecordChange>)>>,
    pub page_size: usize,
}

impl Default for FakeDns {
    fn default() -> Self {
        Self {
            log: CallLog::default(),
            zones: Mutex::new(Vec::new()),
            changes: Mutex::new(Vec::new()),
            page_size: 2,
        }
    }
}

impl FakeDns {
    /// Inventory with one zone per `(id, name, private)` triple.
    pub fn with(zones: &[(&str, &str, bool)]) -> Self {
        let fake = Self::default();
        *fake.zones.lock().unwrap() = zones
            .iter()
            .map(|(id, name, private)| HostedZoneSummary {
                id: (*id).to_string(),
                name: (*name).to_string(),
                private: *private,
            })
            .collect();
        fake
    }

    /// Submitted change batches, in order.
    pub fn submitted(&self) -> Vec<(String, Vec<RecordChange>)> {
        self.changes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsApi for FakeDns {
    async fn list_hosted_zones(&self, marker: Option<String>) -> RemoteResult<Page<HostedZoneSummary>> {
        self.log.record("listHostedZones", marker.as_deref().unwrap_or("-"))?;
        Ok(paginate(&self.zones.lock().unwrap(), self.page_size, marker))
    }

    async fn change_resource_record_sets(
        &self,
        hosted_zone_id: &str,
        changes: &[RecordChange],
    ) -> RemoteResult<()> {
        self.log.record("changeResourceRecordSets", hosted_zone_id)?;
        self.changes
            .lock()
            .unwrap()
            .push((hosted_zone_id.to_string(), changes.to_vec()));
        Ok(())
    }
}

/// Fake CloudFormation.
#[derive(Default)]
pub struct FakeStacks {
    pub log: CallLog,
    /// Keyed by `(stack name, logical id)`
    pub resources: Mutex<BTreeMap<(String, String), StackResource>>,
    pub stacks: Mutex<Vec<StackSummary>>,
    pub exports: Mutex<Vec<StackExport>>,
}

impl FakeStacks {
    /// Seed a stack resource.
    pub fn insert_resource(&self, stack: &str, logical_id: &str, physical_id: Option<&str>) {
        self.resources.lock().unwrap().insert(
            (stack.to_string(), logical_id.to_string()),
            StackResource {
                logical_id: logical_id.to_string(),
                physical_id: physical_id.map(str::to_string),
            },
        );
    }
}

#[async_trait]
impl StackApi for FakeStacks {
    async fn describe_stack_resource(
        &self,
        stack_name: &str,
        logical_id: &str,
    ) -> RemoteResult<StackResource> {
        self.log
            .record("describeStackResource", &format!("{stack_name} {logical_id}"))?;
        self.resources
            .lock()
            .unwrap()
            .get(&(stack_name.to_string(), logical_id.to_string()))
            .cloned()
            .ok_or_else(|| {
                RemoteError::new(format!(
                    "Resource {logical_id} does not exist for stack {stack_name}"
                ))
                .with_code("ValidationError")
                .with_status(400)
            })
    }

    async fn describe_stacks(&self, next_token: Option<String>) -> RemoteResult<Page<StackSummary>> {
        self.log
            .record("describeStacks", next_token.as_deref().unwrap_or("-"))?;
        Ok(paginate(&self.stacks.lock().unwrap(), 2, next_token))
    }

    async fn list_exports(&self, next_token: Option<String>) -> RemoteResult<Page<StackExport>> {
        self.log
            .record("listExports", next_token.as_deref().unwrap_or("-"))?;
        Ok(paginate(&self.exports.lock().unwrap(), 2, next_token))
    }
}

/// Fake S3.
#[derive(Default)]
pub struct FakeObjectStorage {
    pub log: CallLog,
    /// `(bucket, key)` pairs that exist
    pub objects: Mutex<BTreeSet<(String, String)>>,
}

#[async_trait]
impl ObjectStorageApi for FakeObjectStorage {
    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
        _version_id: Option<&str>,
    ) -> RemoteResult<()> {
        self.log.record("headObject", &format!("{bucket}/{key}"))?;
        if self
            .objects
            .lock()
            .unwrap()
            .contains(&(bucket.to_string(), key.to_string()))
        {
            Ok(())
        } else {
            Err(RemoteError::new("Not Found").with_code("NotFound").with_status(404))
        }
    }
}

/// One fake per remote service.
#[derive(Default, Clone)]
pub struct FakeServices {
    pub gateway_v1: Arc<FakeLegacyGateway>,
    pub gateway_v2: Arc<FakeModernGateway>,
    pub certificates: Arc<FakeCertificates>,
    pub dns: Arc<FakeDns>,
    pub stacks: Arc<FakeStacks>,
    pub object_storage: Arc<FakeObjectStorage>,
}

impl FakeServices {
    /// Trait-object handles to the fakes.
    pub fn services(&self) -> Services {
        Services {
            gateway_v1: self.gateway_v1.clone(),
            gateway_v2: self.gateway_v2.clone(),
            certificates: self.certificates.clone(),
            dns: self.dns.clone(),
            stacks: self.stacks.clone(),
            object_storage: self.object_storage.clone(),
        }
    }
}

/// Serve `items` in pages of `page_size`, using the item offset as cursor.
fn paginate<T: Clone>(items: &[T], page_size: usize, token: Option<String>) -> Page<T> {
    let start = token.and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
    let end = (start + page_size.max(1)).min(items.len());
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        next_token: (end < items.len()).then(|| end.to_string()),
    }
}
