//! Application event handlers

mod echo;

pub use echo::EchoHandler;
