// Library surface for the binary, headless runs and integration tests.
pub mod analysis;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod corpus;
pub mod error;
pub mod runtime;
pub mod script;
pub mod session;
pub mod stats;
pub mod timer;
pub mod util;
pub mod word;

pub use config::{Mode, TestConfig};
pub use error::{Error, Result};
pub use stats::TestResult;
pub use typing_test::{Phase, Progress, TypingTest};
