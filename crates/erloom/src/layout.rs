//! Layering and positioning of schema tables.
//!
//! Layout runs in two stages:
//!
//! 1. [`layering`] sorts the foreign-key dependency graph and gives every
//!    connected table an integer layer.
//! 2. [`positioning`] turns layers into canvas coordinates.

pub mod layering;
pub mod positioning;

pub use layering::Layering;
pub use positioning::{Placement, Positioner};
