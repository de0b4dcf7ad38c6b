pub mod attendance;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod navigation;
