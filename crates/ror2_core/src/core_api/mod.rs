mod engine;
mod error;
mod types;

pub use engine::{Engine, MAX_COINS};
pub use error::{CoreError, CoreErrorCode};
pub use types::{LogbookSummary, Outcome, ProfileListing, ProfileSummary, RejectReason};
