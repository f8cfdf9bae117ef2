//! Command implementations for the Photopick CLI.

pub mod config;
pub mod crop_surface;
pub mod desktop;
pub mod pick;
pub mod theme;
