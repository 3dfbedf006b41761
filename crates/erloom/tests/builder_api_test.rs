//! Integration tests for the DiagramBuilder API
//!
//! These tests drive the whole pipeline through the public API: layout,
//! rendering, decoding and merging with a prior document.

use std::fs;

use float_cmp::assert_approx_eq;
use tempfile::tempdir;

use erloom::{
    DiagramBuilder, ErloomError, codec,
    config::{AnchorMode, AppConfig, LayoutConfig, MalformedPolicy, MergeConfig},
    diagram::{Cell, Diagram},
    merge,
    schema::{Column, ColumnRef, Schema, Table},
};

fn shop() -> Schema {
    Schema::new(vec![
        Table::new(
            "orders",
            vec![
                Column::new("id").with_type("BIGINT").with_primary_key(true),
                Column::new("customer_id")
                    .with_type("BIGINT")
                    .with_reference(ColumnRef::new("customers", "id")),
                Column::new("product_id")
                    .with_type("BIGINT")
                    .with_reference(ColumnRef::new("products", "id")),
            ],
        ),
        Table::new(
            "customers",
            vec![
                Column::new("id").with_type("BIGINT").with_primary_key(true),
                Column::new("region_id").with_reference(ColumnRef::new("regions", "id")),
            ],
        ),
        Table::new("products", vec![Column::new("id").with_type("BIGINT")]),
        Table::new("regions", vec![Column::new("id").with_type("INT")]),
        Table::new("settings", vec![Column::new("key"), Column::new("value")]),
    ])
}

fn table_geometries(diagram: &Diagram) -> Vec<(String, String)> {
    let keys = merge::identify(diagram);
    let mut geometries: Vec<(String, String)> = diagram
        .cells()
        .iter()
        .filter_map(|cell| match (cell, keys.get(cell.id())) {
            (Cell::Shape(_), Some(merge::CellKey::Table(name))) => {
                Some((name.clone(), format!("{:?}", cell.geometry())))
            }
            _ => None,
        })
        .collect();
    geometries.sort();
    geometries
}

#[test]
fn test_builder_api_exists() {
    let _builder = DiagramBuilder::default();
}

#[test]
fn test_render_produces_complete_document() {
    let xml = DiagramBuilder::default()
        .render(&shop(), None)
        .expect("Failed to render");

    assert!(xml.starts_with("<mxfile"));
    assert!(xml.trim_end().ends_with("</mxfile>"));
    assert!(xml.contains(r#"<mxCell id="0" />"#));
    assert!(xml.contains(r#"<mxCell id="1" parent="0" />"#));
    // 5 tables, 3 foreign keys with 2 labels each
    assert_eq!(xml.matches("vertex=\"1\"").count(), 5 + 6);
    assert_eq!(xml.matches("edge=\"1\"").count(), 3);
}

#[test]
fn test_rendering_is_deterministic() {
    let builder = DiagramBuilder::default();
    let first = builder.render(&shop(), None).unwrap();
    let second = builder.render(&shop(), None).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_layered_columns_read_left_to_right() {
    let diagram = DiagramBuilder::default().build(&shop()).unwrap();
    let x_of = |table: &str| {
        let keys = merge::identify(&diagram);
        let id = keys
            .iter()
            .find(|(_, key)| **key == merge::CellKey::Table(table.to_string()))
            .map(|(id, _)| id.to_string())
            .unwrap();
        diagram.cell(&id).unwrap().geometry().x().unwrap()
    };

    // orders (2) -> customers (1) -> regions (0)
    assert_approx_eq!(f64, x_of("orders"), 0.0);
    assert_approx_eq!(f64, x_of("customers"), 260.0);
    assert_approx_eq!(f64, x_of("regions"), 520.0);
    assert_approx_eq!(f64, x_of("products"), 520.0);
}

#[test]
fn test_decode_of_rendered_document() {
    let builder = DiagramBuilder::default();
    let fresh = builder.build(&shop()).unwrap();
    let decoded = codec::decode(&codec::encode(&fresh)).unwrap();

    assert_eq!(decoded, fresh);
}

#[test]
fn test_regeneration_is_idempotent() {
    let builder = DiagramBuilder::default();
    let first = builder.render(&shop(), None).unwrap();
    let second = builder.render(&shop(), Some(&first)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_manual_edits_survive_regeneration() {
    let builder = DiagramBuilder::default();
    let mut edited = builder.build(&shop()).unwrap();
    for cell in edited.cells_mut() {
        if cell.id() == "erloom-2" {
            cell.geometry_mut().set_x(Some(900.0));
            cell.geometry_mut().set_y(Some(450.0));
        }
    }
    let prior = codec::encode(&edited);

    // Add a table in front so every generated id shifts
    let mut tables = shop().tables().to_vec();
    tables.insert(0, Table::new("audit", vec![Column::new("at")]));
    let grown = Schema::new(tables);

    let merged = codec::decode(&builder.render(&grown, Some(&prior)).unwrap()).unwrap();
    let products = merged.cell("erloom-3").unwrap().geometry();
    assert_approx_eq!(f64, products.x().unwrap(), 900.0);
    assert_approx_eq!(f64, products.y().unwrap(), 450.0);

    let before = table_geometries(&edited);
    let after: Vec<(String, String)> = table_geometries(&merged)
        .into_iter()
        .filter(|(name, _)| name != "audit")
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_malformed_prior_falls_back_to_fresh_layout() {
    let builder = DiagramBuilder::default();
    let fresh = builder.render(&shop(), None).unwrap();
    let merged = builder.render(&shop(), Some("<mxfile><broken")).unwrap();

    assert_eq!(fresh, merged);
}

#[test]
fn test_malformed_prior_can_be_fatal() {
    let config = AppConfig::default()
        .with_merge(MergeConfig::default().with_on_malformed(MalformedPolicy::Fail));
    let builder = DiagramBuilder::new(config);

    let result = builder.render(&shop(), Some("not a diagram"));
    assert!(matches!(result, Err(ErloomError::MalformedPriorFile { .. })));
}

#[test]
fn test_prior_file_on_disk() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("shop.drawio");
    let builder = DiagramBuilder::default();

    // Missing file: fresh layout
    let first = builder.render_with_prior_file(&shop(), &path).unwrap();
    fs::write(&path, &first).unwrap();

    let second = builder.render_with_prior_file(&shop(), &path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cyclic_schema_still_renders() {
    let schema = Schema::new(vec![
        Table::new(
            "a",
            vec![
                Column::new("id"),
                Column::new("b_id").with_reference(ColumnRef::new("b", "id")),
            ],
        ),
        Table::new(
            "b",
            vec![
                Column::new("id"),
                Column::new("a_id").with_reference(ColumnRef::new("a", "id")),
            ],
        ),
    ]);
    let diagram = DiagramBuilder::default().build(&schema).unwrap();

    assert_eq!(diagram.shapes().count(), 2);
    assert_eq!(diagram.lines().count(), 2);
}

#[test]
fn test_dangling_foreign_key_is_fatal() {
    let schema = Schema::new(vec![Table::new(
        "orders",
        vec![Column::new("customer_id").with_reference(ColumnRef::new("customers", "id"))],
    )]);

    let result = DiagramBuilder::default().render(&schema, None);
    assert!(matches!(result, Err(ErloomError::Schema(_))));
}

#[test]
fn test_reserved_characters_survive_the_document() {
    let schema = Schema::new(vec![Table::new(
        "R&D <\"labs\"> 'x'",
        vec![Column::new("a&b").with_default("'<none>'")],
    )]);
    let xml = DiagramBuilder::default().render(&schema, None).unwrap();
    let decoded = codec::decode(&xml).unwrap();

    let keys = merge::identify(&decoded);
    assert!(keys.values().any(|key| *key == merge::CellKey::Table("R&D <\"labs\"> 'x'".to_string())));
}

#[test]
fn test_inserted_column_restacks_rows() {
    let builder = DiagramBuilder::new(
        AppConfig::default().with_layout(LayoutConfig::default().with_anchor(AnchorMode::Row)),
    );
    let before = Schema::new(vec![Table::new(
        "users",
        vec![Column::new("id"), Column::new("name")],
    )]);
    let after = Schema::new(vec![Table::new(
        "users",
        vec![Column::new("id"), Column::new("email"), Column::new("name")],
    )]);

    let prior = builder.render(&before, None).unwrap();
    let merged = codec::decode(&builder.render(&after, Some(&prior)).unwrap()).unwrap();

    let rows: Vec<f64> = merged
        .shapes()
        .filter(|shape| shape.parent() == "erloom-0")
        .map(|shape| shape.geometry().y().unwrap())
        .collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.windows(2).all(|pair| pair[0] < pair[1]), "rows overlap: {rows:?}");
    assert_approx_eq!(f64, merged.cell("erloom-0").unwrap().geometry().height().unwrap(), 68.0);
}

#[test]
fn test_control_characters_do_not_break_regeneration() {
    let schema = Schema::new(vec![Table::new("bell\u{7}table", vec![Column::new("id")])]);
    let builder = DiagramBuilder::default();
    let first = builder.render(&schema, None).unwrap();

    assert!(codec::decode(&first).is_ok());
    let strict = DiagramBuilder::new(
        AppConfig::default()
            .with_merge(MergeConfig::default().with_on_malformed(MalformedPolicy::Fail)),
    );
    assert_eq!(strict.render(&schema, Some(&first)).unwrap(), first);
}
