pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Store unavailable: {message}")]
	Unavailable { message: String },
	#[error("Malformed document: {message}")]
	Malformed { message: String },
}
