use std::time::Duration;

use morsel_config::{ProviderConfig, Retry};

use crate::AdviceProvider;

/// Call the provider until it yields text, retrying only failures the
/// provider classifies as transient. The delay grows linearly with the
/// attempt ordinal; the final failed attempt propagates without a delay.
pub(crate) async fn generate_with_retry(
	provider: &dyn AdviceProvider,
	cfg: &ProviderConfig,
	retry: &Retry,
	prompt: &str,
	temperature: f32,
) -> morsel_providers::Result<String> {
	let attempts = retry.max_attempts.max(1);
	let mut attempt = 1;

	loop {
		match provider.generate(cfg, prompt, temperature).await {
			Ok(text) => return Ok(text),
			Err(err) if err.is_transient() && attempt < attempts => {
				let delay = backoff_for_attempt(attempt, retry.backoff_step_ms);

				tracing::warn!(
					attempt,
					delay_ms = delay.as_millis() as u64,
					error = %err,
					"Generation endpoint overloaded; backing off."
				);
				tokio::time::sleep(delay).await;

				attempt += 1;
			},
			Err(err) => return Err(err),
		}
	}
}

/// Delay before the retry that follows failed attempt `attempt` (1-based).
fn backoff_for_attempt(attempt: u32, step_ms: u64) -> Duration {
	let ordinal = u64::from(attempt.max(1));

	Duration::from_millis(ordinal.saturating_mul(step_ms))
}
