//! Cache-aside search through the HTTP surface.

use axum::http::StatusCode;
use proptest::prelude::*;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::time::Duration;
use tokio::runtime::Runtime;
use warden_core::Document;
use warden_test_utils::{acme, arb_new_document, arb_tenant_pair, other_tenant};

#[path = "support/gateway.rs"]
mod gateway;
use gateway::{TestGateway, TestResponse};

#[derive(Deserialize)]
struct SearchBody<'a> {
    source: String,
    #[serde(borrow)]
    results: &'a RawValue,
}

fn parse(response: &TestResponse) -> Result<SearchBody<'_>, String> {
    serde_json::from_slice(&response.body).map_err(|e| format!("Bad search body: {}", e))
}

fn documents(body: &SearchBody<'_>) -> Result<Vec<Document>, String> {
    serde_json::from_str(body.results.get()).map_err(|e| e.to_string())
}

#[tokio::test(start_paused = true)]
async fn test_second_search_is_a_byte_identical_hit() -> Result<(), String> {
    let gw = TestGateway::new();
    gw.create_document(&acme(), "Alpha", "first doc").await?;

    let first = gw.search(&acme(), "Alpha").await?;
    let second = gw.search(&acme(), "Alpha").await?;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);

    let first = parse(&first)?;
    let second = parse(&second)?;
    assert_eq!(first.source, "store");
    assert_eq!(second.source, "cache");
    assert_eq!(first.results.get(), second.results.get());
    assert_eq!(documents(&second)?.len(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_hit_expires_with_ttl() -> Result<(), String> {
    let gw = TestGateway::new();
    gw.search(&acme(), "Alpha").await?;

    tokio::time::advance(Duration::from_secs(30)).await;
    let warm = gw.search(&acme(), "Alpha").await?;
    assert_eq!(parse(&warm)?.source, "cache");

    tokio::time::advance(Duration::from_secs(31)).await;
    let cold = gw.search(&acme(), "Alpha").await?;
    assert_eq!(parse(&cold)?.source, "store");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_query_text_is_not_normalized() -> Result<(), String> {
    let gw = TestGateway::new();
    gw.search(&acme(), "Alpha").await?;

    let other_case = gw.search(&acme(), "alpha").await?;
    assert_eq!(parse(&other_case)?.source, "store");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_separator_in_tenant_cannot_alias_another_cache_entry() -> Result<(), String> {
    let gw = TestGateway::new();
    let colon_tenant = warden_core::TenantId::parse("a:b").map_err(|e| e.to_string())?;
    let plain_tenant = warden_core::TenantId::parse("a").map_err(|e| e.to_string())?;

    gw.create_document(&colon_tenant, "c", "secret").await?;
    let warm = gw.search(&colon_tenant, "c").await?;
    assert_eq!(documents(&parse(&warm)?)?.len(), 1);

    let probe = gw.search(&plain_tenant, "b:c").await?;
    let probe = parse(&probe)?;
    assert_eq!(probe.source, "store");
    assert!(documents(&probe)?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_cache_outage_does_not_fail_search() -> Result<(), String> {
    let gw = TestGateway::new();
    gw.create_document(&other_tenant(), "Alpha", "first doc").await?;
    gw.counters.set_offline(true);

    let response = gw.search(&other_tenant(), "Alpha").await?;
    assert_eq!(response.status, StatusCode::OK);
    let body = parse(&response)?;
    assert_eq!(body.source, "store");
    assert_eq!(documents(&body)?.len(), 1);
    Ok(())
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn paused_runtime() -> Result<Runtime, TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// The same literal query from two tenants never shares a cache entry.
    #[test]
    fn prop_identical_queries_do_not_share_entries(
        (owner, other) in arb_tenant_pair(),
        new in arb_new_document(),
    ) {
        let rt = paused_runtime()?;
        rt.block_on(async {
            let gw = TestGateway::new();
            gw.create_document(&owner, &new.title, &new.content)
                .await
                .map_err(TestCaseError::fail)?;

            let owner_first = gw.search(&owner, &new.title).await.map_err(TestCaseError::fail)?;
            let other_first = gw.search(&other, &new.title).await.map_err(TestCaseError::fail)?;

            let owner_first = parse(&owner_first).map_err(TestCaseError::fail)?;
            let other_first = parse(&other_first).map_err(TestCaseError::fail)?;
            prop_assert_eq!(owner_first.source.as_str(), "store");
            prop_assert_eq!(other_first.source.as_str(), "store");

            let leaked = documents(&other_first).map_err(TestCaseError::fail)?;
            prop_assert!(leaked.iter().all(|d| d.tenant_id == other));
            prop_assert!(!documents(&owner_first).map_err(TestCaseError::fail)?.is_empty());
            Ok(())
        })?;
    }
}
