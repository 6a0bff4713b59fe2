use crate::{LanguageModelInput, LanguageModelResult, ModelResponse};
use std::{future::Future, time::Instant};
use tracing::{field, info_span, warn};
use tracing_futures::Instrument;

/// Run a `generate` call inside an `llm.generate` span and record token usage
/// and latency once it resolves.
pub async fn trace_generate<F, Fut>(
    provider: &'static str,
    model_id: &str,
    input: LanguageModelInput,
    f: F,
) -> LanguageModelResult<ModelResponse>
where
    F: FnOnce(LanguageModelInput) -> Fut,
    Fut: Future<Output = LanguageModelResult<ModelResponse>>,
{
    let span = info_span!(
        "llm.generate",
        provider,
        model = model_id,
        messages = input.messages.len(),
        input_tokens = field::Empty,
        output_tokens = field::Empty,
        elapsed_ms = field::Empty,
    );
    let start_time = Instant::now();

    let result = f(input).instrument(span.clone()).await;

    span.record(
        "elapsed_ms",
        u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX),
    );
    match &result {
        Ok(response) => {
            if let Some(usage) = &response.usage {
                span.record("input_tokens", usage.input_tokens);
                span.record("output_tokens", usage.output_tokens);
            }
        }
        Err(error) => {
            span.in_scope(|| warn!(%error, "language model request failed"));
        }
    }

    result
}
