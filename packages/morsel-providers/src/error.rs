pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to reach the generation endpoint.")]
	Network { source: reqwest::Error },
	#[error("Generation endpoint is overloaded (status {status}).")]
	Overloaded { status: u16 },
	#[error("Generation endpoint rejected the request (status {status}): {message}")]
	Api { status: u16, message: String },
	#[error("Generation endpoint returned an empty completion.")]
	EmptyCompletion,
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}
impl Error {
	/// Retrying only helps when the upstream reports a capacity problem.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::Overloaded { .. })
	}
}
