//! Common test utilities shared by the integration tests.
//!
//! - Fixtures: sample projects, catalogs and wired collaborators
//! - Mock sinks with controllable timing
//! - Event assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_sinks;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_sinks::*;
