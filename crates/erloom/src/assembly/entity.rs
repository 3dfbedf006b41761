//! HTML markup embedded in entity shapes.
//!
//! An entity shape's value is a small HTML fragment: a title bar holding
//! the table name above a `table` with one row per column. The columns of
//! each row are name, type, `NN`, `PK`, `AI`, `U` and the default value,
//! with `-` standing in for an unset flag.
//!
//! Interpolated text and styles are escaped for `& < > " '` and stripped
//! of newlines, so the fragment is well-formed and can be read back with
//! [`entity_title`].

use std::fmt::Write as _;

use erloom_core::{
    schema::{Column, Table},
    style::CSS_ASSIGN,
};

use crate::codec::is_xml_char;

use super::stylesheet::StyleSheet;

/// Renders the markup fragment of `table`.
pub fn entity_fragment(table: &Table, sheet: &StyleSheet) -> String {
    let header = sheet.header().join(CSS_ASSIGN);
    let body = sheet.table().join(CSS_ASSIGN);
    let cell = escape_markup(&sheet.cell().join(CSS_ASSIGN));

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div style="display:flex;flex-direction:column;height:100%;"><div style="{}flex:0">{}</div><table style="{}flex:1;">"#,
        escape_markup(&header),
        escape_markup(table.name()),
        escape_markup(&body),
    );
    for column in table.columns() {
        out.push_str("<tr>");
        for text in row_cells(column) {
            let _ = write!(out, r#"<td style="{cell}">{}</td>"#, escape_markup(text));
        }
        out.push_str("</tr>");
    }
    out.push_str("</table></div>");
    out
}

fn row_cells(column: &Column) -> [&str; 7] {
    let flag = |set: bool, text: &'static str| if set { text } else { "-" };
    [
        column.name(),
        column.data_type(),
        flag(column.is_not_null(), "NN"),
        flag(column.is_primary_key(), "PK"),
        flag(column.is_auto_increment(), "AI"),
        flag(column.is_unique(), "U"),
        column.default_value().unwrap_or_default(),
    ]
}

/// Escapes the reserved markup characters and removes newlines and other
/// characters XML does not allow.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' | '\r' => {}
            ch if !is_xml_char(ch) => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Extracts the table name from an entity fragment.
///
/// Returns `None` when the value has no recognizable title bar.
pub fn entity_title(fragment: &str) -> Option<String> {
    match roxmltree::Document::parse(fragment) {
        Ok(document) => {
            let title = document
                .root_element()
                .children()
                .find(|node| node.has_tag_name("div"))?;
            let text: String = title
                .descendants()
                .filter(|node| node.is_text())
                .filter_map(|node| node.text())
                .collect();
            Some(text)
        }
        // Hand-edited values are not always well-formed XML
        Err(_) => scan_title(fragment),
    }
}

fn scan_title(fragment: &str) -> Option<String> {
    let inner = fragment.strip_prefix("<div")?;
    let start = inner.find("<div")?;
    let title = &inner[start..];
    let open_end = title.find('>')? + 1;
    let close = title.find("</div>")?;
    if close < open_end {
        return None;
    }
    Some(unescape_markup(&title[open_end..close]))
}

fn unescape_markup(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use erloom_core::schema::Column;

    use super::*;

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id")
                    .with_type("BIGINT")
                    .with_not_null(true)
                    .with_primary_key(true)
                    .with_auto_increment(true),
                Column::new("email").with_type("VARCHAR(255)").with_unique(true),
                Column::new("status").with_type("INT").with_default("0"),
            ],
        )
    }

    #[test]
    fn test_fragment_layout() {
        let fragment = entity_fragment(&users(), &StyleSheet::default());

        assert!(fragment.starts_with(
            r#"<div style="display:flex;flex-direction:column;height:100%;"><div style="box-sizing:border-box;width:100%;background:#e4e4e4;padding:2px;color:black;flex:0">users</div>"#
        ));
        assert!(fragment.contains(
            r#"<table style="width:100%;font-size:1em;background:DimGray;border-collapse:collapse;flex:1;">"#
        ));
        assert!(fragment.contains(
            r#"<tr><td style="border:1px solid;">id</td><td style="border:1px solid;">BIGINT</td><td style="border:1px solid;">NN</td><td style="border:1px solid;">PK</td><td style="border:1px solid;">AI</td><td style="border:1px solid;">-</td><td style="border:1px solid;"></td></tr>"#
        ));
        assert!(fragment.ends_with("</tr></table></div>"));
        assert_eq!(fragment.matches("<tr>").count(), 3);
    }

    #[test]
    fn test_flags_and_default() {
        let fragment = entity_fragment(&users(), &StyleSheet::default());

        assert!(fragment.contains(">VARCHAR(255)</td><td style=\"border:1px solid;\">-</td><td style=\"border:1px solid;\">-</td><td style=\"border:1px solid;\">-</td><td style=\"border:1px solid;\">U</td>"));
        assert!(fragment.contains(">0</td></tr>"));
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape_markup("a&b<c>\"d\"'e'\nf"),
            "a&amp;b&lt;c&gt;&quot;d&quot;&apos;e&apos;f"
        );
    }

    #[test]
    fn test_escape_markup_drops_control_characters() {
        assert_eq!(escape_markup("bell\u{7}\ttab\u{1b}"), "bell\ttab");
    }

    #[test]
    fn test_title_round_trip_with_reserved_characters() {
        let table = Table::new("R&D <\"quoted\"> 'x'", vec![Column::new("a<b")]);
        let fragment = entity_fragment(&table, &StyleSheet::default());

        assert!(!fragment.contains('\n'));
        assert_eq!(
            entity_title(&fragment).as_deref(),
            Some("R&D <\"quoted\"> 'x'")
        );
    }

    #[test]
    fn test_title_of_malformed_fragment() {
        let fragment = r#"<div style="x"><div style="y">orders</div><table><tr><td>id<br></td></tr></table></div>"#;

        assert_eq!(entity_title(fragment).as_deref(), Some("orders"));
    }

    #[test]
    fn test_title_of_plain_text() {
        assert_eq!(entity_title("orders"), None);
    }
}
