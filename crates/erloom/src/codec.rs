//! draw.io interchange format.
//!
//! This module converts a [`Diagram`] to and from the `mxfile` XML document
//! draw.io reads and writes. It is the last stage of generation and, for a
//! regeneration, the first stage of the merge:
//!
//! ```text
//! Schema
//!     ↓ layout + assembly
//! Diagram (fresh)          prior file ──decode──▶ Diagram (prior)
//!     ↓ merge ◀──────────────────────────────────────┘
//! Diagram (merged)
//!     ↓ encode (this module)
//! mxfile XML
//! ```
//!
//! # Document shape
//!
//! ```text
//! mxfile
//! └── diagram
//!     └── mxGraphModel      canvas attributes
//!         └── root
//!             ├── mxCell id="0"
//!             ├── mxCell id="1" parent="0"
//!             └── mxCell ...  shapes, lines, labels
//! ```
//!
//! Cell kinds are recognized by style: an `edgeLabel` flag marks a label,
//! an `edgeStyle` key a line. Cells without either are lines when they carry
//! `edge="1"` and shapes otherwise.
//!
//! [`Diagram`]: erloom_core::diagram::Diagram

mod reader;
mod writer;

pub use reader::decode;
pub use writer::encode;

use thiserror::Error;

/// Errors that can occur while decoding a diagram document.
///
/// A prior diagram that fails to decode is reported as
/// [`ErloomError::MalformedPriorFile`] with this error as the reason.
///
/// [`ErloomError::MalformedPriorFile`]: crate::ErloomError::MalformedPriorFile
#[derive(Debug, Error)]
pub enum Error {
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("malformed diagram: {0}")]
    Malformed(String),

    #[error("invalid number `{value}` in attribute `{attribute}`")]
    InvalidNumber { attribute: String, value: String },
}

/// Whether `ch` may appear in an XML 1.0 document.
pub(crate) fn is_xml_char(ch: char) -> bool {
    !matches!(ch, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use erloom_core::{
        diagram::{Canvas, Cell, CellKind, Diagram, FileInfo, Label, Line, Shape},
        geometry::{Geometry, Point},
        style::Style,
    };

    use super::*;

    fn sample() -> Diagram {
        let mut diagram = Diagram::new("Page-1", "erloom-diagram", Canvas::with_page_size(1169, 827));
        diagram.push(
            Shape::new(
                "t-0",
                Style::parse("verticalAlign=top;html=1;", '='),
                Geometry::rect(0.0, 36.0, 180.0, 68.0),
            )
            .with_value(r#"<div style="a:b;"><div>users &amp; co</div></div>"#),
        );
        diagram.push(
            Shape::new("t-0-0", Style::parse("text;points=[[0,0.5],[1,0.5]];", '='), Geometry::rect(0.0, 20.0, 180.0, 16.0))
                .with_parent("t-0")
                .with_value("id"),
        );
        let mut routed = Geometry::edge();
        routed.set_points(vec![Point::new(200.0, 60.5), Point::new(220.0, 80.0)]);
        routed.set_source_point(Some(Point::new(10.0, 10.0)));
        diagram.push(
            Line::new("fk-0", "t-0", "t-1", Style::parse("edgeStyle=orthogonalEdgeStyle;exitY=0.8824;", '='))
                .with_geometry(routed),
        );
        diagram.push(
            Label::new(
                "fk-0-1",
                "fk-0",
                Style::parse("edgeLabel;html=1;", '='),
                Geometry::edge_label(-0.8),
            )
            .with_value("org_id"),
        );
        diagram
    }

    #[test]
    fn test_round_trip() {
        let diagram = sample();
        let decoded = decode(&encode(&diagram)).unwrap();

        assert_eq!(decoded, diagram);
    }

    #[test]
    fn test_encoding_is_stable() {
        let diagram = sample();
        let once = encode(&diagram);
        let twice = encode(&decode(&once).unwrap());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_round_trip_of_file_info() {
        let file = FileInfo {
            modified: Some("2024-01-01T00:00:00.000Z".to_string()),
            etag: Some("abc".to_string()),
            ..FileInfo::default()
        };
        let diagram = sample().with_file_info(file.clone());

        let decoded = decode(&encode(&diagram)).unwrap();
        assert_eq!(decoded.file_info(), &file);
    }

    #[test]
    fn test_decode_draw_io_document() {
        let xml = r#"<mxfile host="Electron" modified="2023-10-10T10:10:10.000Z" agent="draw.io" etag="x" version="21.7.5" type="device">
  <diagram name="Page-1" id="abc">
    <mxGraphModel dx="1434.5" dy="780" grid="1" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" pageWidth="827" pageHeight="1169" math="0" shadow="0">
      <root>
        <mxCell id="0" />
        <mxCell id="1" parent="0" />
        <mxCell id="a" value="users" style="rounded=0;whiteSpace=wrap;html=1;" vertex="1" parent="1">
          <mxGeometry x="120" y="200" width="120" height="60" as="geometry" />
        </mxCell>
        <mxCell id="e" style="endArrow=classic;html=1;" edge="1" parent="1" source="a" target="b">
          <mxGeometry width="50" height="50" relative="1" as="geometry">
            <mxPoint x="390" y="430" as="sourcePoint" />
            <Array as="points">
              <mxPoint x="300" y="400" />
            </Array>
          </mxGeometry>
        </mxCell>
        <UserObject label="orders" id="b">
          <mxCell style="rounded=0;" vertex="1" parent="1">
            <mxGeometry x="400" y="200" width="120" height="60" as="geometry" />
          </mxCell>
        </UserObject>
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>"#;
        let diagram = decode(xml).unwrap();

        assert_eq!(diagram.id(), "abc");
        assert_eq!(diagram.canvas().dx, 1435);
        assert_eq!(diagram.canvas().background, "none");
        assert_eq!(diagram.file_info().host, "Electron");

        let kinds: Vec<CellKind> = diagram.cells().iter().map(Cell::kind).collect();
        assert_eq!(kinds, vec![CellKind::Shape, CellKind::Line, CellKind::Shape]);

        let line = diagram.lines().next().unwrap();
        assert_eq!(line.source(), "a");
        assert_eq!(line.geometry().points(), &[Point::new(300.0, 400.0)]);
        assert_approx_eq!(f64, line.geometry().source_point().unwrap().x().unwrap(), 390.0);

        let object = diagram.cell("b").unwrap();
        assert_eq!(object.value(), Some("orders"));
        assert_approx_eq!(f64, object.geometry().x().unwrap(), 400.0);
    }

    #[test]
    fn test_attribute_escaping() {
        let mut diagram = Diagram::new("Page-1", "d", Canvas::default());
        diagram.push(
            Shape::new("s", Style::new(), Geometry::rect(0.0, 0.0, 1.0, 1.0))
                .with_value("a & b < c > \"d\" 'e'\nf"),
        );
        let xml = encode(&diagram);

        assert!(xml.contains(r#"value="a &amp; b &lt; c &gt; &quot;d&quot; &apos;e&apos;&#10;f""#));
        assert_eq!(
            decode(&xml).unwrap().cells()[0].value(),
            Some("a & b < c > \"d\" 'e'\nf")
        );
    }

    #[test]
    fn test_compressed_diagram_is_malformed() {
        let xml = r#"<mxfile><diagram id="x" name="Page-1">7VZNc5swEP01HOPhw2B8xG7SHNoZz</diagram></mxfile>"#;

        assert!(matches!(decode(xml), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_missing_sentinels_is_malformed() {
        let xml = r#"<mxfile><diagram id="x" name="P"><mxGraphModel><root><mxCell id="a" parent="1" vertex="1" /></root></mxGraphModel></diagram></mxfile>"#;

        assert!(matches!(decode(xml), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_invalid_number() {
        let xml = r#"<mxfile><diagram id="x" name="P"><mxGraphModel><root><mxCell id="0" /><mxCell id="1" parent="0" /><mxCell id="a" parent="1" vertex="1"><mxGeometry x="ten" as="geometry" /></mxCell></root></mxGraphModel></diagram></mxfile>"#;

        match decode(xml) {
            Err(Error::InvalidNumber { attribute, value }) => {
                assert_eq!(attribute, "x");
                assert_eq!(value, "ten");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_not_xml() {
        assert!(matches!(decode("not xml at all"), Err(Error::Xml(_))));
    }

    #[test]
    fn test_wrong_root_element() {
        assert!(matches!(decode("<svg />"), Err(Error::Malformed(_))));
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use erloom_core::{
        diagram::{Canvas, Diagram, Shape},
        geometry::Geometry,
        style::Style,
    };

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Printable text mixed with markup, quotes and whitespace escapes.
    fn text_strategy() -> impl Strategy<Value = String> {
        "[ -~\t\néü<>&\"']{0,40}"
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Any value and page name survives the attribute escaping.
    fn check_text_survives_escaping(name: String, value: String) -> Result<(), TestCaseError> {
        let mut diagram = Diagram::new(name.clone(), "d", Canvas::default());
        diagram.push(
            Shape::new("s", Style::parse("html=1;", '='), Geometry::rect(0.0, 0.0, 10.0, 10.0))
                .with_value(value.clone()),
        );

        let decoded = decode(&encode(&diagram)).map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(decoded.name(), name.as_str());
        prop_assert_eq!(decoded.cells()[0].value(), Some(value.as_str()));
        Ok(())
    }

    proptest! {
        #[test]
        fn text_survives_escaping(name in text_strategy(), value in text_strategy()) {
            check_text_survives_escaping(name, value)?;
        }
    }
}
