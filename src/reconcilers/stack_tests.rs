// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `stack.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::services::{StackExport, StackSummary};
    use crate::test_support::{test_context, FakeStacks};

    fn nested(name: &str, root: Option<&str>) -> StackSummary {
        StackSummary {
            stack_name: name.to_string(),
            root_id: root.map(str::to_string),
        }
    }

    const ROOT_ARN: &str = "arn:aws:cloudformation:eu-west-1:123:stack/orders-dev/abc-123";

    #[test]
    fn test_default_logical_ids() {
        assert_eq!(default_logical_id(ApiType::Rest), "ApiGatewayRestApi");
        assert_eq!(default_logical_id(ApiType::Http), "HttpApi");
        assert_eq!(default_logical_id(ApiType::Websocket), "WebsocketsApi");
    }

    #[tokio::test]
    async fn test_literal_id_skips_stack() {
        let stacks = FakeStacks::default();
        let ctx = DeploymentContext {
            rest_api_id: Some(ApiIdSource::Literal("literal123".to_string())),
            ..test_context()
        };

        let id = find_api_id(&stacks, &ctx, ApiType::Rest).await.unwrap();

        assert_eq!(id.as_deref(), Some("literal123"));
        assert!(stacks.log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_primary_stack_resource() {
        let stacks = FakeStacks::default();
        stacks.insert_resource("orders-dev", "HttpApi", Some("http123"));

        let id = find_api_id(&stacks, &test_context(), ApiType::Http)
            .await
            .unwrap();

        assert_eq!(id.as_deref(), Some("http123"));
        assert_eq!(stacks.log.count("describeStacks"), 0);
    }

    #[tokio::test]
    async fn test_reference_resolves_referenced_logical_id() {
        let stacks = FakeStacks::default();
        stacks.insert_resource("orders-dev", "CustomRestApi", Some("custom123"));
        let ctx = DeploymentContext {
            rest_api_id: Some(ApiIdSource::Reference {
                logical_id: "CustomRestApi".to_string(),
            }),
            ..test_context()
        };

        let id = find_api_id(&stacks, &ctx, ApiType::Rest).await.unwrap();
        assert_eq!(id.as_deref(), Some("custom123"));
    }

    #[tokio::test]
    async fn test_nested_stack_search() {
        let stacks = FakeStacks::default();
        *stacks.stacks.lock().unwrap() = vec![
            nested("orders-dev", None),
            nested("unrelated-nested", Some("arn:aws:cloudformation:eu-west-1:123:stack/billing-dev/x")),
            nested("orders-dev-Api-1", Some(ROOT_ARN)),
            nested("orders-dev-Ws-2", Some(ROOT_ARN)),
        ];
        stacks.insert_resource("orders-dev-Ws-2", "WebsocketsApi", Some("ws123"));

        let id = find_api_id(&stacks, &test_context(), ApiType::Websocket)
            .await
            .unwrap();

        assert_eq!(id.as_deref(), Some("ws123"));
        assert_eq!(
            stacks.log.count("describeStackResource"),
            3,
            "primary, then each nested stack in order"
        );
    }

    #[tokio::test]
    async fn test_resource_missing_everywhere() {
        let stacks = FakeStacks::default();
        *stacks.stacks.lock().unwrap() = vec![nested("orders-dev-Api-1", Some(ROOT_ARN))];

        let error = find_api_id(&stacks, &test_context(), ApiType::Rest)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            DomainError::StackResourceNotFound { ref stack, ref logical_id }
                if stack == "orders-dev" && logical_id == "ApiGatewayRestApi"
        ));
    }

    #[tokio::test]
    async fn test_access_denied_is_not_treated_as_missing() {
        let stacks = FakeStacks::default();
        *stacks.stacks.lock().unwrap() = vec![nested("orders-dev-Api-1", Some(ROOT_ARN))];
        stacks.log.fail(
            "describeStackResource",
            RemoteError::new("User is not authorized to perform cloudformation:DescribeStackResource")
                .with_code("AccessDenied")
                .with_status(403),
        );

        let error = find_api_id(&stacks, &test_context(), ApiType::Rest)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            DomainError::StackLookup { ref stack, ref source }
                if stack == "orders-dev" && source.is_forbidden()
        ));
        assert_eq!(stacks.log.count("describeStacks"), 0);
    }

    #[test]
    fn test_missing_resource_classification() {
        let validation = RemoteError::new("Resource ApiGatewayRestApi does not exist for stack orders-dev")
            .with_code("ValidationError")
            .with_status(400);
        let other_validation = RemoteError::new("Stack with id orders-dev is in an invalid state")
            .with_code("ValidationError")
            .with_status(400);

        assert!(is_missing_resource(&validation));
        assert!(is_missing_resource(&RemoteError::new("gone").with_status(404)));
        assert!(!is_missing_resource(&other_validation));
        assert!(!is_missing_resource(&RemoteError::new("slow").with_code("Throttling")));
    }

    #[tokio::test]
    async fn test_resource_without_physical_id() {
        let stacks = FakeStacks::default();
        stacks.insert_resource("orders-dev", "ApiGatewayRestApi", None);

        let error = find_api_id(&stacks, &test_context(), ApiType::Rest)
            .await
            .unwrap_err();

        assert_eq!(error.reason(), "MissingApiId");
    }

    #[tokio::test]
    async fn test_import_value_resolution() {
        let stacks = FakeStacks::default();
        *stacks.exports.lock().unwrap() = vec![
            StackExport {
                name: "shared-a".to_string(),
                value: "aaa".to_string(),
            },
            StackExport {
                name: "shared-b".to_string(),
                value: "bbb".to_string(),
            },
            StackExport {
                name: "shared-rest-api".to_string(),
                value: "imported123".to_string(),
            },
        ];
        let ctx = DeploymentContext {
            rest_api_id: Some(ApiIdSource::Import {
                export_name: "shared-rest-api".to_string(),
            }),
            ..test_context()
        };

        let id = find_api_id(&stacks, &ctx, ApiType::Rest).await.unwrap();

        assert_eq!(id.as_deref(), Some("imported123"));
        assert_eq!(stacks.log.count("listExports"), 2);
    }

    #[tokio::test]
    async fn test_unresolved_import_yields_none() {
        let stacks = FakeStacks::default();
        let ctx = DeploymentContext {
            http_api_id: Some(ApiIdSource::Import {
                export_name: "missing-export".to_string(),
            }),
            ..test_context()
        };

        let id = find_api_id(&stacks, &ctx, ApiType::Http).await.unwrap();
        assert!(id.is_none());
    }
}
