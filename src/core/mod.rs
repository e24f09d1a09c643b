pub mod cache;
pub mod frequency;
pub mod protocol;
pub mod quotes;
pub mod retry;
pub mod server;
pub mod symbol;
pub mod types;

#[cfg(feature = "cli")]
pub(crate) mod commands;
#[cfg(feature = "cli")]
pub(crate) mod display;

#[cfg(feature = "fetch")]
pub mod sim;
