//! Value objects

mod intents;
mod token;

pub use intents::Intents;
pub use token::Token;
