//! End to end authorization of requests against a schema loaded from its
//! serialized document.

use odata_authorization::{
    AuthorizationError, Authorizer, AuthorizerSettings, Decision, Identity, Method,
    RequestContext, RequestPath, ScopeFinderContext, ScopeSource, ScopeSourceError, Scopes,
    ScopesEvaluator, extract_permissions,
};
use odata_capability::Schema;
use serde_json::{Value, json};
use testresult::TestResult;

fn permissions(scopes: &[&str]) -> Value {
    json!({
        "Permissions": [{
            "SchemeName": "oauth",
            "Scopes": scopes.iter().map(|scope| json!({ "Scope": scope })).collect::<Vec<_>>(),
        }]
    })
}

fn annotation(term: &str, value: Value) -> Value {
    json!({ "term": format!("Org.OData.Capabilities.V1.{term}"), "value": value })
}

fn schema() -> Schema {
    let document = json!({
        "namespace": "Default",
        "entitySets": [
            {
                "name": "Customers",
                "navigationProperties": [
                    { "name": "Products", "target": "Products", "collection": true }
                ],
                "annotations": [
                    annotation("UpdateRestrictions", permissions(&["Customers.Update"])),
                    annotation("DeleteRestrictions", json!({ "Permissions": [] })),
                    annotation("NavigationRestrictions", json!({
                        "RestrictedProperties": [{
                            "NavigationProperty": "Products",
                            "ReadRestrictions": permissions(&["Products.Read"]),
                        }]
                    })),
                ]
            },
            {
                "name": "Products",
                "annotations": [
                    annotation("DeleteRestrictions", permissions(&["Products.Delete"])),
                ]
            },
            { "name": "Orders" },
            {
                "name": "Suppliers",
                "annotations": [
                    annotation("ReadRestrictions", json!({
                        "Permissions": [
                            { "SchemeName": "oauth" },
                            { "SchemeName": "oauth", "Scopes": "Suppliers.Read" },
                            { "SchemeName": "oauth", "Scopes": [{ "Scope": 7 }] }
                        ]
                    })),
                ]
            }
        ],
        "singletons": [
            {
                "name": "TopCustomer",
                "annotations": [
                    annotation("ReadRestrictions", permissions(&["Customers.Read"])),
                    annotation("UpdateRestrictions", permissions(&["Customers.Update"])),
                ]
            }
        ],
        "operations": [
            {
                "name": "Rate",
                "kind": "Action",
                "bound": true,
                "annotations": [
                    annotation("OperationRestrictions", permissions(&["Customers.Rate"])),
                ]
            }
        ]
    });

    Schema::from_json(&document.to_string()).expect("valid schema document")
}

fn scopes(scopes: &[&str]) -> Scopes {
    scopes.iter().copied().collect()
}

mod extraction {
    use super::*;

    #[test_log::test]
    fn it_allows_unrestricted_paths_with_no_scopes() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema).entity_set("Orders")?.key()?.build();

        for method in ["GET", "POST", "PATCH", "DELETE"] {
            let requirements = extract_permissions(&Method::parse(method), &path);
            assert!(requirements.is_empty(), "{method}");
            assert!(requirements.allows(&Scopes::new()), "{method}");
        }
        Ok(())
    }

    #[test_log::test]
    fn it_denies_restrictions_without_permissions() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema).entity_set("Customers")?.key()?.build();

        let requirements = extract_permissions(&Method::Delete, &path);

        assert!(!requirements.allows(&scopes(&["Customers.Update", "Customers.Delete"])));
        Ok(())
    }

    #[test_log::test]
    fn it_denies_restrictions_with_malformed_permissions() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema).entity_set("Suppliers")?.build();

        let requirements = extract_permissions(&Method::Get, &path);

        assert_eq!(requirements.len(), 1);
        assert!(!requirements.allows(&Scopes::new()));
        assert!(!requirements.allows(&scopes(&["Suppliers.Read"])));
        Ok(())
    }

    #[test_log::test]
    fn it_matches_nested_navigation_restrictions() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .navigation("Products")?
            .build();

        let requirements = extract_permissions(&Method::Get, &path);

        assert!(requirements.allows(&scopes(&["Products.Read"])));
        assert!(!requirements.allows(&scopes(&["Orders.Read"])));
        Ok(())
    }

    #[test_log::test]
    fn it_retargets_reference_links_to_the_owner() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .link("Products")?
            .build();

        let requirements = extract_permissions(&Method::Delete, &path);

        assert!(requirements.allows(&scopes(&["Customers.Update"])));
        assert!(!requirements.allows(&scopes(&["Products.Delete"])));
        Ok(())
    }

    #[test_log::test]
    fn it_requires_only_the_operation_restriction() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema)
            .singleton("TopCustomer")?
            .bound_operation("Default.Rate")?
            .build();

        for method in [Method::Post, Method::Get, Method::parse("OPTIONS")] {
            let requirements = extract_permissions(&method, &path);
            assert!(requirements.allows(&scopes(&["Customers.Rate"])), "{method}");
            assert!(!requirements.allows(&scopes(&["Customers.Read"])), "{method}");
        }
        Ok(())
    }

    #[test_log::test]
    fn it_reads_singleton_properties_with_read_scopes() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema)
            .singleton("TopCustomer")?
            .property("Name")
            .build();

        let read = extract_permissions(&Method::Get, &path);
        assert!(read.allows(&scopes(&["Customers.Read"])));

        let write = extract_permissions(&Method::Delete, &path);
        assert!(write.allows(&scopes(&["Customers.Update"])));
        assert!(!write.allows(&scopes(&["Customers.Read"])));
        Ok(())
    }
}

mod authorizer {
    use super::*;
    use async_trait::async_trait;

    struct FixedScopes(Vec<&'static str>);

    #[async_trait]
    impl ScopeSource for FixedScopes {
        async fn find_scopes(
            &self,
            _context: &ScopeFinderContext<'_>,
        ) -> Result<Vec<String>, ScopeSourceError> {
            Ok(self.0.iter().map(|scope| scope.to_string()).collect())
        }
    }

    struct TenantScopes;

    #[async_trait]
    impl ScopeSource for TenantScopes {
        async fn find_scopes(
            &self,
            context: &ScopeFinderContext<'_>,
        ) -> Result<Vec<String>, ScopeSourceError> {
            match context.request.properties.get("tenant").map(String::as_str) {
                Some("contoso") => Ok(vec!["Products.Read".into()]),
                _ => Ok(Vec::new()),
            }
        }
    }

    struct Offline;

    #[async_trait]
    impl ScopeSource for Offline {
        async fn find_scopes(
            &self,
            _context: &ScopeFinderContext<'_>,
        ) -> Result<Vec<String>, ScopeSourceError> {
            Err(ScopeSourceError::Unavailable("token service offline".into()))
        }
    }

    #[test_log::test(tokio::test)]
    async fn it_authorizes_with_scope_claims() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .navigation("Products")?
            .build();
        let authorizer = Authorizer::default();

        let reader = Identity::new().with_claim("Scope", "Orders.Read  Products.Read");
        let stranger = Identity::new().with_claim("Scope", "Orders.Read");
        let anonymous = Identity::new();

        assert_eq!(authorizer.authorize(&reader, &Method::Get, &path).await?, Decision::Allow);
        assert_eq!(authorizer.authorize(&stranger, &Method::Get, &path).await?, Decision::Deny);
        assert_eq!(authorizer.authorize(&anonymous, &Method::Get, &path).await?, Decision::Deny);
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn it_reads_the_configured_claim() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema).singleton("TopCustomer")?.build();
        let authorizer = Authorizer::new(AuthorizerSettings::default().with_scope_claim("scp"));

        let caller = Identity::new()
            .with_claim("Scope", "Customers.Read")
            .with_claim("scp", "Profile.Read")
            .with_claim("scp", "Customers.Update");

        assert_eq!(authorizer.authorize(&caller, &Method::Get, &path).await?, Decision::Deny);
        assert_eq!(authorizer.authorize(&caller, &Method::Put, &path).await?, Decision::Allow);
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn it_uses_a_custom_scope_source() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .bound_operation("Rate")?
            .build();
        let authorizer =
            Authorizer::default().with_scope_source(FixedScopes(vec!["Customers.Rate"]));

        let decision = authorizer.authorize(&Identity::new(), &Method::Post, &path).await?;

        assert!(decision.is_allowed());
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn it_passes_request_properties_to_the_scope_source() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema)
            .entity_set("Customers")?
            .key()?
            .navigation("Products")?
            .build();
        let authorizer = Authorizer::default().with_scope_source(TenantScopes);

        let contoso =
            RequestContext::new(Method::Get, path.template()).with_property("tenant", "contoso");
        let fabrikam =
            RequestContext::new(Method::Get, path.template()).with_property("tenant", "fabrikam");

        let caller = Identity::new();
        assert_eq!(
            authorizer.authorize_request(&caller, &contoso, &path).await?,
            Decision::Allow
        );
        assert_eq!(
            authorizer.authorize_request(&caller, &fabrikam, &path).await?,
            Decision::Deny
        );
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn it_propagates_scope_source_failures() -> TestResult {
        let schema = schema();
        let path = RequestPath::builder(&schema).entity_set("Orders")?.build();
        let authorizer = Authorizer::default().with_scope_source(Offline);

        let result = authorizer.authorize(&Identity::new(), &Method::Get, &path).await;

        assert!(matches!(
            result,
            Err(AuthorizationError::ScopeSource(ScopeSourceError::Unavailable(_)))
        ));
        Ok(())
    }
}
