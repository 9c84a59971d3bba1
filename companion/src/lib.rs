//! Companion daemon for the multiview browser extension: tracks the live
//! status of watched SOOP and CHZZK channels, raises notifications, keeps
//! the toolbar badge current and repairs partner-site auth cookies.

pub mod app;
pub mod background;
pub mod bootstrap;
pub mod config;
pub mod events;
pub mod host;
pub mod server;
pub mod services;
pub mod store;

pub use bootstrap::init_foundation;
