pub mod entry;
pub mod fingerprint;
pub mod freshness;
pub mod truncate;

pub use entry::DiaryEntrySummary;
pub use fingerprint::{EMPTY_FINGERPRINT, Fingerprint};
pub use freshness::is_fresh;
pub use truncate::truncate_to_chars;
