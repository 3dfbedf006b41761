//! Serialization of a [`Diagram`] to `mxfile` XML.

use std::fmt::Write as _;

use log::trace;

use super::is_xml_char;

use erloom_core::{
    diagram::{Canvas, Cell, Diagram, FileInfo},
    geometry::{Geometry, Point},
    style::CELL_ASSIGN,
};

const INDENT: &str = "  ";

/// Serializes `diagram` as an indented `mxfile` document.
///
/// Output depends only on the model, so an unchanged diagram always
/// encodes to the same bytes.
pub fn encode(diagram: &Diagram) -> String {
    let mut out = String::new();

    write_file_open(&mut out, diagram.file_info());
    let _ = writeln!(
        out,
        r#"{INDENT}<diagram name="{}" id="{}">"#,
        escape_attr(diagram.name()),
        escape_attr(diagram.id())
    );
    write_model_open(&mut out, diagram.canvas());
    let _ = writeln!(out, "{}<root>", indent(3));
    let _ = writeln!(out, r#"{}<mxCell id="{}" />"#, indent(4), Diagram::ROOT_ID);
    let _ = writeln!(
        out,
        r#"{}<mxCell id="{}" parent="{}" />"#,
        indent(4),
        Diagram::LAYER_ID,
        Diagram::ROOT_ID
    );
    for cell in diagram.cells() {
        write_cell(&mut out, cell);
    }
    let _ = writeln!(out, "{}</root>", indent(3));
    let _ = writeln!(out, "{}</mxGraphModel>", indent(2));
    let _ = writeln!(out, "{INDENT}</diagram>");
    out.push_str("</mxfile>\n");

    trace!(bytes = out.len(); "Diagram encoded");
    out
}

fn write_file_open(out: &mut String, file: &FileInfo) {
    let _ = write!(out, r#"<mxfile host="{}""#, escape_attr(&file.host));
    if let Some(modified) = &file.modified {
        let _ = write!(out, r#" modified="{}""#, escape_attr(modified));
    }
    let _ = write!(out, r#" agent="{}""#, escape_attr(&file.agent));
    if let Some(etag) = &file.etag {
        let _ = write!(out, r#" etag="{}""#, escape_attr(etag));
    }
    let _ = writeln!(
        out,
        r#" version="{}" type="{}">"#,
        escape_attr(&file.version),
        escape_attr(&file.file_type)
    );
}

fn write_model_open(out: &mut String, canvas: &Canvas) {
    let _ = writeln!(
        out,
        "{}<mxGraphModel dx=\"{}\" dy=\"{}\" grid=\"{}\" gridSize=\"{}\" guides=\"{}\" tooltips=\"{}\" \
         connect=\"{}\" arrows=\"{}\" fold=\"{}\" page=\"{}\" pageScale=\"{}\" pageWidth=\"{}\" \
         pageHeight=\"{}\" background=\"{}\" math=\"{}\" shadow=\"{}\">",
        indent(2),
        canvas.dx,
        canvas.dy,
        flag(canvas.grid),
        canvas.grid_size,
        flag(canvas.guides),
        flag(canvas.tooltips),
        flag(canvas.connect),
        flag(canvas.arrows),
        flag(canvas.fold),
        flag(canvas.page),
        canvas.page_scale,
        canvas.page_width,
        canvas.page_height,
        escape_attr(&canvas.background),
        flag(canvas.math),
        flag(canvas.shadow),
    );
}

fn write_cell(out: &mut String, cell: &Cell) {
    let _ = write!(out, r#"{}<mxCell id="{}""#, indent(4), escape_attr(cell.id()));
    if let Some(value) = cell.value() {
        let _ = write!(out, r#" value="{}""#, escape_attr(value));
    }
    let _ = write!(
        out,
        r#" style="{}""#,
        escape_attr(&cell.style().join(CELL_ASSIGN))
    );
    match cell {
        Cell::Shape(shape) => {
            let _ = write!(out, r#" parent="{}" vertex="1""#, escape_attr(shape.parent()));
        }
        Cell::Line(line) => {
            let _ = write!(out, r#" edge="1" parent="{}""#, escape_attr(line.parent()));
            if !line.source().is_empty() {
                let _ = write!(out, r#" source="{}""#, escape_attr(line.source()));
            }
            if !line.target().is_empty() {
                let _ = write!(out, r#" target="{}""#, escape_attr(line.target()));
            }
        }
        Cell::Label(label) => {
            let _ = write!(out, r#" parent="{}" vertex="1""#, escape_attr(label.parent()));
            if !label.is_connectable() {
                out.push_str(r#" connectable="0""#);
            }
        }
    }
    out.push_str(">\n");
    write_geometry(out, cell.geometry());
    let _ = writeln!(out, "{}</mxCell>", indent(4));
}

fn write_geometry(out: &mut String, geometry: &Geometry) {
    let _ = write!(out, "{}<mxGeometry", indent(5));
    for (name, value) in [
        ("x", geometry.x()),
        ("y", geometry.y()),
        ("width", geometry.width()),
        ("height", geometry.height()),
    ] {
        if let Some(value) = value {
            let _ = write!(out, r#" {name}="{}""#, fmt_number(value));
        }
    }
    if geometry.is_relative() {
        out.push_str(r#" relative="1""#);
    }
    out.push_str(r#" as="geometry""#);

    let has_children = geometry.offset().is_some()
        || geometry.source_point().is_some()
        || geometry.target_point().is_some()
        || !geometry.points().is_empty();
    if !has_children {
        out.push_str(" />\n");
        return;
    }

    out.push_str(">\n");
    for (role, point) in [
        ("sourcePoint", geometry.source_point()),
        ("targetPoint", geometry.target_point()),
        ("offset", geometry.offset()),
    ] {
        if let Some(point) = point {
            write_point(out, 6, point, Some(role));
        }
    }
    if !geometry.points().is_empty() {
        let _ = writeln!(out, r#"{}<Array as="points">"#, indent(6));
        for point in geometry.points() {
            write_point(out, 7, *point, None);
        }
        let _ = writeln!(out, "{}</Array>", indent(6));
    }
    let _ = writeln!(out, "{}</mxGeometry>", indent(5));
}

fn write_point(out: &mut String, depth: usize, point: Point, role: Option<&str>) {
    let _ = write!(out, "{}<mxPoint", indent(depth));
    if let Some(x) = point.x() {
        let _ = write!(out, r#" x="{}""#, fmt_number(x));
    }
    if let Some(y) = point.y() {
        let _ = write!(out, r#" y="{}""#, fmt_number(y));
    }
    if let Some(role) = role {
        let _ = write!(out, r#" as="{role}""#);
    }
    out.push_str(" />\n");
}

fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Shortest round-tripping decimal, with `-0` written as `0`.
fn fmt_number(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Escapes an attribute value, keeping newlines as character references and
/// dropping characters XML 1.0 does not allow.
fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            ch if !is_xml_char(ch) => {}
            _ => out.push(ch),
        }
    }
    out
}
