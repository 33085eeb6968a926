//! Application services shared by the CLI and GUI

pub mod capture;
pub mod config;
pub mod refresh;
pub mod review;

pub use capture::*;
pub use config::*;
pub use refresh::*;
pub use review::*;
