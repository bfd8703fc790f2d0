//! Integration tests for the dispatch gateway
//!
//! Drives the public API with fake adapters on tokio's paused clock, so the
//! 60 second windows elapse instantly and waits are measured exactly.

use async_trait::async_trait;
use futures::future::join_all;
use llmgate_core::secrets::CredentialChain;
use llmgate_core::{
    ChatMessage, ChatRequest, ChatResponse, DispatchGateway, GateError, GateResult,
    ProviderAdapter, ProviderCatalog, ProviderConfig, RateLimitPolicy, RequestContext,
    StaticSecretResolver, TokenUsage,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("llmgate_core=debug")
        .try_init();
}

/// Adapter replaying a scripted sequence of token totals
struct Scripted {
    totals: Mutex<VecDeque<u32>>,
}

impl Scripted {
    fn new(totals: &[u32]) -> Arc<Self> {
        Arc::new(Self {
            totals: Mutex::new(totals.iter().copied().collect()),
        })
    }
}

#[async_trait]
impl ProviderAdapter for Scripted {
    async fn chat(
        &self,
        config: &ProviderConfig,
        _api_key: Option<&str>,
        _request: &ChatRequest,
    ) -> GateResult<ChatResponse> {
        let total = self.totals.lock().pop_front().unwrap_or(0);
        Ok(ChatResponse::new(format!("reply from {}", config.model))
            .with_usage(TokenUsage::new(total, 0)))
    }
}

fn gateway(provider: &str, adapter: Arc<dyn ProviderAdapter>) -> DispatchGateway {
    let empty = Arc::new(StaticSecretResolver::new());
    DispatchGateway::builder()
        .with_adapter(provider, adapter)
        .with_credentials(CredentialChain::new(empty.clone()).with_environment(empty))
        .build()
}

fn request() -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system("You are terse."),
        ChatMessage::user("Summarise the plan."),
    ])
}

#[tokio::test(start_paused = true)]
async fn test_request_budget_queues_third_call() -> GateResult<()> {
    init_tracing();
    let gw = gateway("openai", Scripted::new(&[]));
    let config = ProviderConfig::new("openai", "gpt-4o")
        .with_rate_limit(RateLimitPolicy::unlimited().with_requests_per_minute(2));

    let start = Instant::now();
    let calls = (0..3).map(|_| {
        let gw = &gw;
        let config = &config;
        async move {
            gw.chat(config, &request(), Some(RequestContext::chat())).await?;
            Ok::<_, GateError>(start.elapsed())
        }
    });
    let mut elapsed = join_all(calls)
        .await
        .into_iter()
        .collect::<GateResult<Vec<_>>>()?;
    elapsed.sort();

    assert!(elapsed[0] < Duration::from_millis(5));
    assert!(elapsed[1] < Duration::from_millis(5));
    assert_eq!(elapsed[2], Duration::from_secs(60));

    let snapshot = gw.observatory().snapshot();
    assert!(snapshot.pending.is_empty());
    assert_eq!(snapshot.recent_delayed.len(), 1);
    assert_eq!(snapshot.recent_delayed[0].key, "openai:gpt-4o:default");
    assert_eq!(snapshot.recent_delayed[0].waited_ms, 60_000);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_token_budget_tightens_after_usage() -> GateResult<()> {
    init_tracing();
    let gw = gateway("anthropic", Scripted::new(&[800, 300, 10]));
    let config = ProviderConfig::new("anthropic", "claude-3-5-sonnet")
        .with_id("writer")
        .with_rate_limit(RateLimitPolicy::unlimited().with_tokens_per_minute(1_000));

    let start = Instant::now();
    gw.chat(&config, &request(), None).await?;
    gw.chat(&config, &request(), None).await?;
    assert!(start.elapsed() < Duration::from_millis(5));
    assert_eq!(gw.observatory().windows()[0].tokens_used, 1_100);

    gw.chat(&config, &request(), None).await?;
    assert_eq!(start.elapsed(), Duration::from_secs(60));

    // the third call opened a fresh window and debited its own usage
    let windows = gw.observatory().windows();
    assert_eq!(windows[0].key, "writer");
    assert_eq!(windows[0].request_count, 1);
    assert_eq!(windows[0].tokens_used, 10);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_saturated_key_does_not_block_others() -> GateResult<()> {
    init_tracing();
    let gw = Arc::new(gateway("openai", Scripted::new(&[])));
    let policy = RateLimitPolicy::unlimited().with_requests_per_minute(1);
    let busy = ProviderConfig::new("openai", "gpt-4o")
        .with_id("busy")
        .with_rate_limit(policy);
    let idle = ProviderConfig::new("openai", "gpt-4o")
        .with_id("idle")
        .with_rate_limit(policy);

    gw.chat(&busy, &request(), None).await?;
    let queued = {
        let gw = Arc::clone(&gw);
        let busy = busy.clone();
        tokio::spawn(async move { gw.chat(&busy, &request(), None).await })
    };
    while gw.observatory().pending_count() == 0 {
        tokio::task::yield_now().await;
    }

    let start = Instant::now();
    gw.chat(&idle, &request(), None).await?;
    assert!(start.elapsed() < Duration::from_millis(5));
    assert_eq!(gw.observatory().pending_count(), 1);

    queued.await.map_err(|e| GateError::other(e.to_string()))??;
    assert_eq!(gw.observatory().pending_count(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_json_while_waiting() -> GateResult<()> {
    init_tracing();
    let gw = Arc::new(gateway("openai", Scripted::new(&[])));
    let config = ProviderConfig::new("openai", "gpt-4o")
        .with_id("flows")
        .with_rate_limit(RateLimitPolicy::unlimited().with_requests_per_minute(1));

    gw.chat(&config, &request(), None).await?;
    let queued = {
        let gw = Arc::clone(&gw);
        let config = config.clone();
        tokio::spawn(async move {
            gw.chat(
                &config,
                &request(),
                Some(RequestContext::workflow("wf-42", "run-3")),
            )
            .await
        })
    };
    while gw.observatory().pending_count() == 0 {
        tokio::task::yield_now().await;
    }

    let json: serde_json::Value = serde_json::from_str(&gw.observatory().snapshot_json()?)?;
    let pending = json["pending"].as_array().cloned().unwrap_or_default();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["key"], "flows");
    assert_eq!(pending[0]["context"]["source"], "workflow");
    assert_eq!(pending[0]["context"]["executionId"], "run-3");
    assert!(pending[0]["id"].is_string());
    assert!(pending[0]["addedAt"].is_string());
    assert_eq!(json["recentDelayed"], serde_json::json!([]));

    queued.await.map_err(|e| GateError::other(e.to_string()))??;
    Ok(())
}

#[tokio::test]
async fn test_catalog_configuration_drives_dispatch() -> GateResult<()> {
    init_tracing();
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("providers.toml");
    fs::write(
        &path,
        r#"
[[providers]]
id = "summaries"
provider = "openai"
model = "gpt-4o-mini"

[providers.extra]
apiKey = "sk-test-summaries"

[providers.extra.rateLimit]
requestsPerMinute = 30
tokensPerMinute = 5000
"#,
    )?;

    let catalog = ProviderCatalog::load_from_file(&path)?;
    let config = catalog
        .get("summaries")
        .cloned()
        .ok_or_else(|| GateError::config("missing catalog entry"))?;

    let gw = gateway("openai", Scripted::new(&[120]));
    let response = gw.chat(&config, &request(), None).await?;
    assert_eq!(response.content, "reply from gpt-4o-mini");

    let windows = gw.observatory().windows();
    assert_eq!(windows[0].key, "summaries");
    assert_eq!(windows[0].policy, RateLimitPolicy::new(30, 5_000));
    assert_eq!(windows[0].tokens_used, 120);
    Ok(())
}

#[tokio::test]
async fn test_unknown_provider_is_not_queued() {
    init_tracing();
    let gw = gateway("openai", Scripted::new(&[]));
    let config = ProviderConfig::new("groq", "llama-3.1-70b");

    let result = gw.chat(&config, &request(), None).await;
    assert!(matches!(result, Err(GateError::ProviderNotRegistered { .. })));
    assert_eq!(gw.observatory().snapshot().pending.len(), 0);
}
