pub mod config;
pub mod hash;
pub mod id;
pub mod style;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "origin")]
pub mod origin;
