// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `dns_record.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::{RawDomainConfig, RawRoute53Params};
    use crate::errors::RemoteError;
    use crate::services::DomainInfo;
    use crate::test_support::{domain_config, edge_domain, raw_domain, test_context, FakeDns};
    use serde_yaml::Value;

    fn resolved(mut domain: DomainConfig, zone: Option<&str>) -> DomainConfig {
        domain.domain_info = Some(DomainInfo {
            domain_name: "d-abc.execute-api.eu-west-1.amazonaws.com".to_string(),
            hosted_zone_id: zone.map(str::to_string),
            security_policy: Some("TLS_1_2".to_string()),
        });
        domain
    }

    fn routed(policy: &str, set_identifier: Option<&str>) -> DomainConfig {
        resolved(
            domain_config(&RawDomainConfig {
                endpoint_type: Some("regional".to_string()),
                route53_params: Some(RawRoute53Params {
                    routing_policy: Some(policy.to_string()),
                    set_identifier: set_identifier.map(str::to_string),
                    weight: None,
                    health_check_id: Some("hc-1".to_string()),
                }),
                ..raw_domain("api.example.com")
            }),
            Some("ZREGIONAL"),
        )
    }

    #[test]
    fn test_simple_records_have_no_routing_fields() {
        let domain = resolved(edge_domain("api.example.com"), None);

        let changes = record_changes(ChangeAction::Upsert, &domain, &test_context()).unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].record_type, RecordType::A);
        assert_eq!(changes[1].record_type, RecordType::Aaaa);
        for change in &changes {
            assert_eq!(change.name, "api.example.com");
            assert_eq!(change.alias_target.hosted_zone_id, "Z2FDTNDATAQYW2");
            assert!(!change.alias_target.evaluate_target_health);
            assert!(change.set_identifier.is_none());
            assert!(change.region.is_none());
            assert!(change.weight.is_none());
            assert!(change.health_check_id.is_none());
        }
    }

    #[test]
    fn test_ipv6_record_can_be_disabled() {
        let domain = resolved(
            domain_config(&RawDomainConfig {
                create_route53_ipv6_record: Some(Value::Bool(false)),
                ..raw_domain("api.example.com")
            }),
            Some("Z1"),
        );

        let changes = record_changes(ChangeAction::Delete, &domain, &test_context()).unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ChangeAction::Delete);
        assert_eq!(changes[0].alias_target.hosted_zone_id, "Z1");
    }

    #[test]
    fn test_latency_records_carry_region_and_default_identifier() {
        let changes =
            record_changes(ChangeAction::Upsert, &routed("latency", None), &test_context())
                .unwrap();

        assert_eq!(changes[0].region.as_deref(), Some("eu-west-1"));
        assert_eq!(
            changes[0].set_identifier.as_deref(),
            Some("d-abc.execute-api.eu-west-1.amazonaws.com")
        );
        assert_eq!(changes[0].health_check_id.as_deref(), Some("hc-1"));
        assert!(changes[0].weight.is_none());
    }

    #[test]
    fn test_weighted_records_carry_weight() {
        let changes = record_changes(
            ChangeAction::Upsert,
            &routed("weighted", Some("blue")),
            &test_context(),
        )
        .unwrap();

        assert_eq!(changes[0].weight, Some(200));
        assert_eq!(changes[0].set_identifier.as_deref(), Some("blue"));
        assert!(changes[0].region.is_none());
    }

    #[test]
    fn test_unresolved_domain_is_an_error() {
        let error = record_changes(
            ChangeAction::Upsert,
            &edge_domain("api.example.com"),
            &test_context(),
        )
        .unwrap_err();

        assert_eq!(error.reason(), "MissingDomainInfo");
    }

    #[tokio::test]
    async fn test_disabled_records_make_no_calls() {
        let dns = FakeDns::with(&[("/hostedzone/Z1", "example.com.", false)]);
        let domain = resolved(
            domain_config(&RawDomainConfig {
                create_route53_record: Some(Value::String("false".to_string())),
                ..raw_domain("api.example.com")
            }),
            None,
        );

        change_resource_record_set(&dns, &test_context(), ChangeAction::Upsert, &domain)
            .await
            .unwrap();

        assert!(dns.log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_goes_to_resolved_zone() {
        let dns = FakeDns::with(&[("/hostedzone/Z1", "example.com.", false)]);
        let domain = resolved(edge_domain("api.example.com"), None);

        change_resource_record_set(&dns, &test_context(), ChangeAction::Upsert, &domain)
            .await
            .unwrap();

        let submitted = dns.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0, "Z1");
        assert_eq!(submitted[0].1.len(), 2);
    }

    #[tokio::test]
    async fn test_split_horizon_submits_to_both_zones() {
        let dns = FakeDns::with(&[
            ("/hostedzone/ZPUBLIC", "example.com.", false),
            ("/hostedzone/ZPRIVATE", "example.com.", true),
        ]);
        let domain = resolved(
            domain_config(&RawDomainConfig {
                split_horizon_dns: Some(Value::Bool(true)),
                ..raw_domain("api.example.com")
            }),
            None,
        );
        assert!(domain.split_horizon_dns);

        change_resource_record_set(&dns, &test_context(), ChangeAction::Upsert, &domain)
            .await
            .unwrap();

        let submitted = dns.submitted();
        assert_eq!(submitted.len(), 2, "exactly one batch per zone");
        assert_eq!(submitted[0].0, "ZPUBLIC");
        assert_eq!(submitted[1].0, "ZPRIVATE");
        assert_eq!(submitted[0].1, submitted[1].1, "identical record content");
    }

    #[tokio::test]
    async fn test_submission_failure_names_action() {
        let dns = FakeDns::with(&[("/hostedzone/Z1", "example.com.", false)]);
        dns.log.fail(
            "changeResourceRecordSets",
            RemoteError::new("Invalid change batch").with_code("InvalidChangeBatch"),
        );
        let domain = resolved(edge_domain("api.example.com"), None);

        let error =
            change_resource_record_set(&dns, &test_context(), ChangeAction::Delete, &domain)
                .await
                .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Failed to DELETE Route53 record for 'api.example.com': InvalidChangeBatch: Invalid change batch"
        );
    }
}
