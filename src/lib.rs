//! Regenerates the libpng loader header from `png.h`.
//!
//! [`scan`] reads the header into a [`model::Model`], [`classify::classify`]
//! marks which exported functions the loader may skip, and a
//! [`render::Renderer`] writes the result out.

pub mod classify;
pub mod error;
pub mod model;
pub mod render;
pub mod scanner;

pub use scanner::{scan, scan_str};
