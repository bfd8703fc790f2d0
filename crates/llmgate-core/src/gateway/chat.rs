//! Chat dispatch

use super::types::DispatchGateway;
use crate::config::ProviderConfig;
use crate::context::RequestContext;
use crate::error::{GateError, GateResult};
use crate::provider::{ChatRequest, ChatResponse, ProviderFamily};
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, instrument, warn};

impl DispatchGateway {
    /// Send a chat request through admission control.
    ///
    /// Waits as long as the configuration's rate budget requires. Adapter
    /// errors are returned unchanged and never retried.
    ///
    /// # Errors
    ///
    /// - [`GateError::ProviderNotRegistered`] when no adapter serves
    ///   `config.provider`; raised before queueing
    /// - [`GateError::Config`] when the effective policy has a zero limit
    /// - whatever the adapter returns
    #[instrument(
        skip_all,
        fields(provider = %config.provider, model = %config.model, key, source)
    )]
    pub async fn chat(
        &self,
        config: &ProviderConfig,
        request: &ChatRequest,
        context: Option<RequestContext>,
    ) -> GateResult<ChatResponse> {
        self.dispatch(config, request, context.unwrap_or_default(), None)
            .await
    }

    /// Like [`chat`](Self::chat), but stops waiting for admission when
    /// `cancel` fires, failing with [`GateError::Cancelled`].
    ///
    /// Cancellation has no effect once the adapter call has started.
    #[instrument(
        skip_all,
        fields(provider = %config.provider, model = %config.model, key, source)
    )]
    pub async fn chat_with_cancel(
        &self,
        config: &ProviderConfig,
        request: &ChatRequest,
        context: Option<RequestContext>,
        cancel: &CancellationToken,
    ) -> GateResult<ChatResponse> {
        self.dispatch(config, request, context.unwrap_or_default(), Some(cancel))
            .await
    }

    async fn dispatch(
        &self,
        config: &ProviderConfig,
        request: &ChatRequest,
        context: RequestContext,
        cancel: Option<&CancellationToken>,
    ) -> GateResult<ChatResponse> {
        let key = config.rate_limit_key();
        let span = Span::current();
        span.record("key", key.as_str());
        span.record("source", tracing::field::display(context.source));

        let adapter = self
            .registry
            .get(&config.provider)
            .ok_or_else(|| GateError::provider_not_registered(&config.provider))?;

        let policy = self.effective_policy(config);
        if let Err(e) = policy.validate() {
            warn!(key = %key, error = %e, "Rejecting call with unusable rate limit");
            return Err(GateError::config_with_context(
                e.to_string(),
                format!("Effective rate limit for '{}'", key),
            ));
        }

        let admission = match cancel {
            Some(token) => {
                self.limiter
                    .acquire_with_cancel(&key, &policy, &context, token)
                    .await?
            }
            None => self.limiter.acquire(&key, &policy, &context).await,
        };
        if admission.queued {
            debug!(
                waited_ms = admission.waited.as_millis() as u64,
                "Dispatching after rate limit wait"
            );
        }

        let api_key = if ProviderFamily::of(&config.provider).requires_api_key() {
            let info = self.credentials.resolve(config).await;
            debug!(
                source = %info.source,
                api_key = ?info.masked_key(),
                "Resolved API credential"
            );
            info.key
        } else {
            None
        };

        let response = match adapter.chat(config, api_key.as_deref(), request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Provider call failed");
                return Err(e);
            }
        };

        let total_tokens = response.total_tokens();
        if total_tokens > 0 && policy.limits_tokens() {
            self.limiter.record_tokens(&key, total_tokens);
        }

        Ok(response)
    }
}
