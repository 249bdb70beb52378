pub mod actions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use mocks::{MockTeamProvider, MockTransport};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
