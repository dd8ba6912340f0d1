//! Access grant adapters.
//!
//! - `StubAccessGrant` - Logs and succeeds (development)
//! - `RecordingAccessGrant` - Captures calls for tests

mod recording_access_grant;
mod stub_access_grant;

pub use recording_access_grant::{AccessCall, RecordingAccessGrant};
pub use stub_access_grant::StubAccessGrant;
