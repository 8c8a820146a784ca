pub mod actions;
pub mod assertions;
pub mod evening_builders;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::StatAssertion;
pub use evening_builders::EveningBuilder;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
