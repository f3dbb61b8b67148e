mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Cache, Config, ProviderConfig, Retry};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.provider.api_base.is_empty() {
		return Err(Error::Validation {
			message: "provider.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.provider.api_key.is_empty() {
		return Err(Error::Validation { message: "provider.api_key must be non-empty.".to_string() });
	}
	if cfg.provider.model.is_empty() {
		return Err(Error::Validation { message: "provider.model must be non-empty.".to_string() });
	}
	if cfg.provider.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "provider.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.retry.max_attempts == 0 {
		return Err(Error::Validation {
			message: "retry.max_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.retry.backoff_step_ms == 0 {
		return Err(Error::Validation {
			message: "retry.backoff_step_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.freshness_window_days <= 0 {
		return Err(Error::Validation {
			message: "cache.freshness_window_days must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for field in [
		&mut cfg.provider.api_base,
		&mut cfg.provider.api_key,
		&mut cfg.provider.path,
		&mut cfg.provider.model,
	] {
		let trimmed = field.trim();

		if trimmed.len() != field.len() {
			*field = trimmed.to_string();
		}
	}
}
