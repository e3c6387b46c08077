//! Validation-oracle adapters.

mod mock;
mod openai;
mod resilient;

pub use mock::MockOracle;
pub use openai::{OpenAiOracle, OpenAiOracleConfig};
pub use resilient::ResilientOracle;
