//! Structural model of a draw.io diagram document.
//!
//! A [`Diagram`] is an ordered sequence of [`Cell`]s plus the document and
//! canvas attributes that surround them. The model is independent of layout:
//! the layout engine fills it, the codec serializes it, and the merger
//! overwrites geometries in place.
//!
//! # Cell kinds
//!
//! - [`Shape`] - a vertex with a geometry (tables and column rows)
//! - [`Line`] - an edge between two cells
//! - [`Label`] - an edge label, nested under its [`Line`]
//!
//! The two sentinel cells every draw.io document carries (`"0"`, the root,
//! and `"1"`, the default layer) are implicit and never stored in
//! [`Diagram::cells`].

use std::fmt;

use crate::{geometry::Geometry, style::Style};

/// The kind of a [`Cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Shape,
    Line,
    Label,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellKind::Shape => "shape",
            CellKind::Line => "line",
            CellKind::Label => "label",
        };
        f.write_str(name)
    }
}

macro_rules! common_accessors {
    ($ty:ident) => {
        impl $ty {
            pub fn id(&self) -> &str {
                &self.id
            }

            pub fn parent(&self) -> &str {
                &self.parent
            }

            pub fn value(&self) -> Option<&str> {
                self.value.as_deref()
            }

            pub fn style(&self) -> &Style {
                &self.style
            }

            pub fn geometry(&self) -> &Geometry {
                &self.geometry
            }
        }
    };
}

common_accessors!(Shape);
common_accessors!(Line);
common_accessors!(Label);

/// A vertex cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: String,
    parent: String,
    value: Option<String>,
    style: Style,
    geometry: Geometry,
}

impl Shape {
    /// Creates a shape parented to the default layer.
    pub fn new(id: impl Into<String>, style: Style, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            parent: Diagram::LAYER_ID.to_string(),
            value: None,
            style,
            geometry,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }
}

/// An edge cell connecting `source` to `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    id: String,
    parent: String,
    value: Option<String>,
    style: Style,
    source: String,
    target: String,
    geometry: Geometry,
}

impl Line {
    /// Creates a line parented to the default layer with a relative geometry.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        style: Style,
    ) -> Self {
        Self {
            id: id.into(),
            parent: Diagram::LAYER_ID.to_string(),
            value: None,
            style,
            source: source.into(),
            target: target.into(),
            geometry: Geometry::edge(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// A label nested under a [`Line`].
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    id: String,
    parent: String,
    value: Option<String>,
    style: Style,
    geometry: Geometry,
    connectable: bool,
}

impl Label {
    /// Creates a non-connectable label under the line `parent`.
    pub fn new(
        id: impl Into<String>,
        parent: impl Into<String>,
        style: Style,
        geometry: Geometry,
    ) -> Self {
        Self {
            id: id.into(),
            parent: parent.into(),
            value: None,
            style,
            geometry,
            connectable: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_connectable(mut self, connectable: bool) -> Self {
        self.connectable = connectable;
        self
    }

    pub fn is_connectable(&self) -> bool {
        self.connectable
    }
}

/// A diagram cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Shape(Shape),
    Line(Line),
    Label(Label),
}

macro_rules! cell_field {
    ($self:ident, $field:ident) => {
        match $self {
            Cell::Shape(cell) => &cell.$field,
            Cell::Line(cell) => &cell.$field,
            Cell::Label(cell) => &cell.$field,
        }
    };
}

macro_rules! cell_field_mut {
    ($self:ident, $field:ident) => {
        match $self {
            Cell::Shape(cell) => &mut cell.$field,
            Cell::Line(cell) => &mut cell.$field,
            Cell::Label(cell) => &mut cell.$field,
        }
    };
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Shape(_) => CellKind::Shape,
            Cell::Line(_) => CellKind::Line,
            Cell::Label(_) => CellKind::Label,
        }
    }

    pub fn id(&self) -> &str {
        cell_field!(self, id)
    }

    pub fn parent(&self) -> &str {
        cell_field!(self, parent)
    }

    pub fn value(&self) -> Option<&str> {
        cell_field!(self, value).as_deref()
    }

    pub fn style(&self) -> &Style {
        cell_field!(self, style)
    }

    pub fn geometry(&self) -> &Geometry {
        cell_field!(self, geometry)
    }

    pub fn set_parent(&mut self, parent: impl Into<String>) {
        *cell_field_mut!(self, parent) = parent.into();
    }

    pub fn set_style(&mut self, style: Style) {
        *cell_field_mut!(self, style) = style;
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        *cell_field_mut!(self, geometry) = geometry;
    }

    pub fn style_mut(&mut self) -> &mut Style {
        cell_field_mut!(self, style)
    }

    pub fn geometry_mut(&mut self) -> &mut Geometry {
        cell_field_mut!(self, geometry)
    }

    /// Returns `true` if the cell sits directly on the default layer.
    pub fn is_top_level(&self) -> bool {
        self.parent() == Diagram::LAYER_ID
    }
}

impl From<Shape> for Cell {
    fn from(shape: Shape) -> Self {
        Cell::Shape(shape)
    }
}

impl From<Line> for Cell {
    fn from(line: Line) -> Self {
        Cell::Line(line)
    }
}

impl From<Label> for Cell {
    fn from(label: Label) -> Self {
        Cell::Label(label)
    }
}

/// Attributes of the `mxfile` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub host: String,
    pub agent: String,
    pub version: String,
    pub file_type: String,
    pub modified: Option<String>,
    pub etag: Option<String>,
}

impl Default for FileInfo {
    fn default() -> Self {
        Self {
            host: "erloom".to_string(),
            agent: concat!("erloom/", env!("CARGO_PKG_VERSION")).to_string(),
            version: "21.7.5".to_string(),
            file_type: "device".to_string(),
            modified: None,
            etag: None,
        }
    }
}

/// Canvas attributes of the `mxGraphModel` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub dx: i32,
    pub dy: i32,
    pub grid: bool,
    pub grid_size: u32,
    pub guides: bool,
    pub tooltips: bool,
    pub connect: bool,
    pub arrows: bool,
    pub fold: bool,
    pub page: bool,
    pub page_scale: u32,
    pub page_width: i32,
    pub page_height: i32,
    pub background: String,
    pub math: bool,
    pub shadow: bool,
}

impl Canvas {
    /// Creates the default canvas for a page of `width` x `height`.
    pub fn with_page_size(width: i32, height: i32) -> Self {
        Self {
            dx: width / 2,
            dy: height / 2,
            page_width: width,
            page_height: height,
            ..Self::default()
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            dx: 0,
            dy: 0,
            grid: true,
            grid_size: 10,
            guides: true,
            tooltips: true,
            connect: true,
            arrows: true,
            fold: true,
            page: true,
            page_scale: 1,
            page_width: 0,
            page_height: 0,
            background: "none".to_string(),
            math: false,
            shadow: false,
        }
    }
}

/// A single-page diagram document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    file: FileInfo,
    name: String,
    id: String,
    canvas: Canvas,
    cells: Vec<Cell>,
}

impl Diagram {
    /// Id of the root sentinel cell.
    pub const ROOT_ID: &'static str = "0";

    /// Id of the default layer sentinel cell.
    pub const LAYER_ID: &'static str = "1";

    pub fn new(name: impl Into<String>, id: impl Into<String>, canvas: Canvas) -> Self {
        Self {
            file: FileInfo::default(),
            name: name.into(),
            id: id.into(),
            canvas,
            cells: Vec::new(),
        }
    }

    pub fn with_file_info(mut self, file: FileInfo) -> Self {
        self.file = file;
        self
    }

    pub fn file_info(&self) -> &FileInfo {
        &self.file
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Appends a cell. An empty parent is replaced by the default layer.
    pub fn push(&mut self, cell: impl Into<Cell>) {
        let mut cell = cell.into();
        if cell.parent().is_empty() {
            cell.set_parent(Self::LAYER_ID);
        }
        self.cells.push(cell);
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Finds a cell by id.
    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id() == id)
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.cells.iter().filter_map(|cell| match cell {
            Cell::Shape(shape) => Some(shape),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.cells.iter().filter_map(|cell| match cell {
            Cell::Line(line) => Some(line),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.cells.iter().filter_map(|cell| match cell {
            Cell::Label(label) => Some(label),
            _ => None,
        })
    }
}
