pub mod audio;
pub mod catalog;
pub mod compute;
pub mod config;
pub mod entities;
pub mod events;
pub mod hud;
pub mod input;
pub mod session;
pub mod store;
