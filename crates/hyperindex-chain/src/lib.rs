mod hash_source;
mod network;
mod pair_verifier;
mod provider;
mod telegram;

pub use hash_source::{CodeHashSource, PairLookup, RpcHashSource};
pub use network::{NetworkProbe, NetworkStatus};
pub use pair_verifier::{OnChainPair, PairReport, PairVerifier, RouterHashCheck, VerificationReport};
pub use provider::{with_timeout, BoxedProvider, ProviderManager};
pub use telegram::TelegramNotifier;
