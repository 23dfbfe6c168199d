pub mod compare;
pub mod config;
pub mod contracts;
pub mod derive;
pub mod error;
pub mod types;

pub use compare::{addresses_match, compare, Comparison, MismatchWarning, Verdict};
pub use config::{CodeHashAccessor, DiagConfig, PairSpec, TelegramConfig};
pub use derive::{derive_pair_address, pair_salt};
pub use error::{DiagError, Result};
pub use types::TokenPair;
