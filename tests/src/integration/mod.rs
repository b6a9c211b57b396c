//! Cross-crate integration flows.

pub mod access_flows;
pub mod federation_flows;
pub mod watch_flows;
