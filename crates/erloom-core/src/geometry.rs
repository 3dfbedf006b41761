//! Geometric primitives for diagram layout and cell geometry.
//!
//! # Overview
//!
//! - [`Position`] - An integer canvas coordinate computed by the layout engine
//! - [`Point`] - An `mxPoint`, whose coordinates may be omitted
//! - [`Geometry`] - The `mxGeometry` of a cell
//!
//! # Coordinate System
//!
//! Erloom uses the draw.io canvas coordinate system:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Shape geometries are absolute for top-level cells and relative to the
//! parent for nested cells (column rows). Edge label geometries are
//! `relative`: `x` runs from `-1` (source end) to `1` (target end) along the
//! edge.

/// An integer position on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> i32 {
        self.x
    }

    pub fn y(self) -> i32 {
        self.y
    }
}

/// A point attached to a geometry (`mxPoint`).
///
/// draw.io omits coordinates equal to zero, so both are optional and a
/// missing coordinate is read as `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: Option<f64>,
    y: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    /// Creates a point with explicitly optional coordinates.
    pub fn from_parts(x: Option<f64>, y: Option<f64>) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> Option<f64> {
        self.x
    }

    pub fn y(self) -> Option<f64> {
        self.y
    }
}

/// The geometry of a cell (`mxGeometry`).
///
/// Shapes use `x`, `y`, `width` and `height`. Lines are `relative` and may
/// carry waypoints the user routed by hand. Labels are `relative` with an
/// `offset` point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    relative: bool,
    offset: Option<Point>,
    source_point: Option<Point>,
    target_point: Option<Point>,
    points: Vec<Point>,
}

impl Geometry {
    /// Creates an absolute rectangle geometry.
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Creates the relative geometry of an edge.
    pub fn edge() -> Self {
        Self {
            relative: true,
            ..Self::default()
        }
    }

    /// Creates the relative geometry of an edge label at `position` along the edge.
    pub fn edge_label(position: f64) -> Self {
        Self {
            x: Some(position),
            y: Some(0.0),
            relative: true,
            offset: Some(Point::default()),
            ..Self::default()
        }
    }

    pub fn x(&self) -> Option<f64> {
        self.x
    }

    pub fn y(&self) -> Option<f64> {
        self.y
    }

    pub fn width(&self) -> Option<f64> {
        self.width
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn offset(&self) -> Option<Point> {
        self.offset
    }

    pub fn source_point(&self) -> Option<Point> {
        self.source_point
    }

    pub fn target_point(&self) -> Option<Point> {
        self.target_point
    }

    /// Returns the waypoints of an edge.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn set_x(&mut self, x: Option<f64>) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: Option<f64>) {
        self.y = y;
    }

    pub fn set_width(&mut self, width: Option<f64>) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: Option<f64>) {
        self.height = height;
    }

    pub fn set_relative(&mut self, relative: bool) {
        self.relative = relative;
    }

    pub fn set_offset(&mut self, offset: Option<Point>) {
        self.offset = offset;
    }

    pub fn set_source_point(&mut self, point: Option<Point>) {
        self.source_point = point;
    }

    pub fn set_target_point(&mut self, point: Option<Point>) {
        self.target_point = point;
    }

    pub fn set_points(&mut self, points: Vec<Point>) {
        self.points = points;
    }

    /// Returns the right edge (`x + width`), treating missing values as `0`.
    pub fn right(&self) -> f64 {
        self.x.unwrap_or_default() + self.width.unwrap_or_default()
    }

    /// Returns the bottom edge (`y + height`), treating missing values as `0`.
    pub fn bottom(&self) -> f64 {
        self.y.unwrap_or_default() + self.height.unwrap_or_default()
    }
}
