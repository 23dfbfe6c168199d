mod token_pair;

pub use token_pair::TokenPair;
