//! Erloom Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Erloom layout
//! engine and its command-line front end. It includes:
//!
//! - **Schema**: The relational input model ([`schema::Schema`], [`schema::Table`], [`schema::Column`])
//! - **Geometry**: Canvas positions and cell geometries ([`geometry`] module)
//! - **Style**: Ordered style maps in the draw.io style grammar ([`style::Style`])
//! - **Diagram**: The structural cell model of a diagram document ([`diagram`] module)
//! - **Colors**: CSS color handling for canvas settings ([`color::Color`])

pub mod color;
pub mod diagram;
pub mod geometry;
pub mod schema;
pub mod style;
