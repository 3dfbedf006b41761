//! Parsing of `mxfile` XML into a [`Diagram`].

use log::{debug, trace};
use roxmltree::{Document, Node};

use erloom_core::{
    diagram::{Canvas, Cell, Diagram, FileInfo, Label, Line, Shape},
    geometry::{Geometry, Point},
    style::{CELL_ASSIGN, Style},
};

use super::Error;

/// Parses the first page of an `mxfile` document.
///
/// # Errors
///
/// Returns [`Error::Xml`] if `xml` is not well-formed, [`Error::Malformed`]
/// if the document does not have the draw.io structure (including
/// compressed page payloads) and [`Error::InvalidNumber`] for a numeric
/// attribute that does not parse.
pub fn decode(xml: &str) -> Result<Diagram, Error> {
    let document = Document::parse(xml)?;
    let file = document.root_element();
    if !file.has_tag_name("mxfile") {
        return Err(malformed(format!(
            "expected `mxfile` root element, found `{}`",
            file.tag_name().name()
        )));
    }

    let page = child(file, "diagram").ok_or_else(|| malformed("no `diagram` element"))?;
    let Some(model) = child(page, "mxGraphModel") else {
        let compressed = page.text().is_some_and(|text| !text.trim().is_empty());
        return Err(malformed(if compressed {
            "compressed diagram payloads are not supported"
        } else {
            "no `mxGraphModel` element"
        }));
    };
    let root = child(model, "root").ok_or_else(|| malformed("no `root` element"))?;

    let mut diagram = Diagram::new(
        page.attribute("name").unwrap_or_default(),
        page.attribute("id").unwrap_or_default(),
        read_canvas(model)?,
    )
    .with_file_info(read_file_info(file));

    let mut has_root = false;
    let mut has_layer = false;
    for element in root.children().filter(Node::is_element) {
        let Some(raw) = RawCell::from_node(element) else {
            trace!(tag = element.tag_name().name(); "Skipping unknown element");
            continue;
        };
        match raw.id {
            Diagram::ROOT_ID => has_root = true,
            Diagram::LAYER_ID => has_layer = true,
            _ => diagram.push(raw.into_cell()?),
        }
    }
    if !has_root || !has_layer {
        return Err(malformed("missing sentinel cells `0` and `1`"));
    }

    debug!(cells = diagram.cells().len(); "Diagram decoded");
    Ok(diagram)
}

fn malformed(message: impl Into<String>) -> Error {
    Error::Malformed(message.into())
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(name))
}

fn read_file_info(file: Node<'_, '_>) -> FileInfo {
    let text = |name: &str| file.attribute(name).unwrap_or_default().to_string();
    FileInfo {
        host: text("host"),
        agent: text("agent"),
        version: text("version"),
        file_type: text("type"),
        modified: file.attribute("modified").map(str::to_string),
        etag: file.attribute("etag").map(str::to_string),
    }
}

fn read_canvas(model: Node<'_, '_>) -> Result<Canvas, Error> {
    let defaults = Canvas::default();
    let flag = |name: &str, default: bool| match model.attribute(name) {
        Some(value) => value == "1",
        None => default,
    };
    Ok(Canvas {
        dx: int_attr(model, "dx")?.unwrap_or(defaults.dx),
        dy: int_attr(model, "dy")?.unwrap_or(defaults.dy),
        grid: flag("grid", defaults.grid),
        grid_size: int_attr(model, "gridSize")?
            .and_then(|size| u32::try_from(size).ok())
            .unwrap_or(defaults.grid_size),
        guides: flag("guides", defaults.guides),
        tooltips: flag("tooltips", defaults.tooltips),
        connect: flag("connect", defaults.connect),
        arrows: flag("arrows", defaults.arrows),
        fold: flag("fold", defaults.fold),
        page: flag("page", defaults.page),
        page_scale: int_attr(model, "pageScale")?
            .and_then(|scale| u32::try_from(scale).ok())
            .unwrap_or(defaults.page_scale),
        page_width: int_attr(model, "pageWidth")?.unwrap_or(defaults.page_width),
        page_height: int_attr(model, "pageHeight")?.unwrap_or(defaults.page_height),
        background: model
            .attribute("background")
            .map_or(defaults.background, str::to_string),
        math: flag("math", defaults.math),
        shadow: flag("shadow", defaults.shadow),
    })
}

/// The attributes of one cell, flattened from `mxCell` or a wrapping
/// `UserObject` / `object` element.
struct RawCell<'a, 'input> {
    id: &'a str,
    value: Option<&'a str>,
    cell: Node<'a, 'input>,
}

impl<'a, 'input> RawCell<'a, 'input> {
    fn from_node(node: Node<'a, 'input>) -> Option<Self> {
        match node.tag_name().name() {
            "mxCell" => Some(Self {
                id: node.attribute("id")?,
                value: node.attribute("value"),
                cell: node,
            }),
            "UserObject" | "object" => Some(Self {
                id: node.attribute("id")?,
                value: node.attribute("label"),
                cell: child(node, "mxCell")?,
            }),
            _ => None,
        }
    }

    fn into_cell(self) -> Result<Cell, Error> {
        let attribute = |name: &str| self.cell.attribute(name).unwrap_or_default();
        let style = Style::parse(attribute("style"), CELL_ASSIGN);
        let geometry = self
            .cell
            .children()
            .find(|node| node.has_tag_name("mxGeometry") && node.attribute("as") == Some("geometry"))
            .map(read_geometry)
            .transpose()?
            .unwrap_or_default();
        let parent = attribute("parent");

        let cell = if style.contains_key("edgeLabel") {
            let mut label = Label::new(self.id, parent, style, geometry)
                .with_connectable(attribute("connectable") != "0");
            if let Some(value) = self.value {
                label = label.with_value(value);
            }
            Cell::Label(label)
        } else if style.contains_key("edgeStyle") || attribute("edge") == "1" {
            let mut line = Line::new(self.id, attribute("source"), attribute("target"), style)
                .with_parent(parent)
                .with_geometry(geometry);
            if let Some(value) = self.value {
                line = line.with_value(value);
            }
            Cell::Line(line)
        } else {
            let mut shape = Shape::new(self.id, style, geometry).with_parent(parent);
            if let Some(value) = self.value {
                shape = shape.with_value(value);
            }
            Cell::Shape(shape)
        };
        Ok(cell)
    }
}

fn read_geometry(node: Node<'_, '_>) -> Result<Geometry, Error> {
    let mut geometry = Geometry::default();
    geometry.set_x(float_attr(node, "x")?);
    geometry.set_y(float_attr(node, "y")?);
    geometry.set_width(float_attr(node, "width")?);
    geometry.set_height(float_attr(node, "height")?);
    geometry.set_relative(node.attribute("relative") == Some("1"));

    for element in node.children().filter(Node::is_element) {
        match (element.tag_name().name(), element.attribute("as")) {
            ("mxPoint", Some("offset")) => geometry.set_offset(Some(read_point(element)?)),
            ("mxPoint", Some("sourcePoint")) => {
                geometry.set_source_point(Some(read_point(element)?));
            }
            ("mxPoint", Some("targetPoint")) => {
                geometry.set_target_point(Some(read_point(element)?));
            }
            ("Array", Some("points")) => {
                let points = element
                    .children()
                    .filter(|point| point.has_tag_name("mxPoint"))
                    .map(read_point)
                    .collect::<Result<Vec<_>, _>>()?;
                geometry.set_points(points);
            }
            _ => {}
        }
    }
    Ok(geometry)
}

fn read_point(node: Node<'_, '_>) -> Result<Point, Error> {
    Ok(Point::from_parts(
        float_attr(node, "x")?,
        float_attr(node, "y")?,
    ))
}

fn float_attr(node: Node<'_, '_>, name: &str) -> Result<Option<f64>, Error> {
    node.attribute(name)
        .map(|value| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .ok_or_else(|| Error::InvalidNumber {
                    attribute: name.to_string(),
                    value: value.to_string(),
                })
        })
        .transpose()
}

/// Integer attribute; draw.io writes some of them with a fraction.
fn int_attr(node: Node<'_, '_>, name: &str) -> Result<Option<i32>, Error> {
    Ok(float_attr(node, name)?.map(|value| value.round() as i32))
}
