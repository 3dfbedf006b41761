//! Default styles of generated cells.

use erloom_core::style::Style;

use crate::config::StyleConfig;

/// Keys of the link style that pin a line to a point on the table border.
pub const ANCHOR_KEYS: [&str; 8] = [
    "exitX", "exitY", "exitDx", "exitDy", "entryX", "entryY", "entryDx", "entryDy",
];

/// The style of every generated cell role.
///
/// `header`, `table` and `cell` are CSS declarations for the entity
/// markup; the others are draw.io cell styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    entity: Style,
    header: Style,
    table: Style,
    cell: Style,
    link: Style,
    edge_label: Style,
    row_table: Style,
    row: Style,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            entity: Style::from_pairs([
                ("verticalAlign", "top"),
                ("align", "left"),
                ("overflow", "fill"),
                ("html", "1"),
                ("rounded", "0"),
                ("shadow", "0"),
                ("comic", "0"),
                ("labelBackgroundColor", "none"),
                ("strokeWidth", "1"),
                ("fontFamily", "Verdana"),
                ("fontSize", "12"),
            ]),
            header: Style::from_pairs([
                ("box-sizing", "border-box"),
                ("width", "100%"),
                ("background", "#e4e4e4"),
                ("padding", "2px"),
                ("color", "black"),
            ]),
            table: Style::from_pairs([
                ("width", "100%"),
                ("font-size", "1em"),
                ("background", "DimGray"),
                ("border-collapse", "collapse"),
            ]),
            cell: Style::from_pairs([("border", "1px solid")]),
            link: Style::from_pairs([
                ("edgeStyle", "orthogonalEdgeStyle"),
                ("rounded", "0"),
                ("orthogonalLoop", "1"),
                ("jettySize", "auto"),
                ("html", "1"),
                ("exitX", "1"),
                ("exitY", "0.5"),
                ("exitDx", "0"),
                ("exitDy", "0"),
                ("entryX", "0"),
                ("entryY", "0.5"),
                ("entryDx", "0"),
                ("entryDy", "0"),
            ]),
            edge_label: Style::from_pairs([
                ("edgeLabel", ""),
                ("html", "1"),
                ("align", "center"),
                ("verticalAlign", "middle"),
                ("resizable", "0"),
                ("points", "[]"),
            ]),
            row_table: Style::from_pairs([
                ("swimlane", ""),
                ("fontStyle", "1"),
                ("childLayout", "stackLayout"),
                ("horizontal", "1"),
                ("startSize", "20"),
                ("horizontalStack", "0"),
                ("resizeParent", "1"),
                ("resizeLast", "0"),
                ("collapsible", "0"),
                ("marginBottom", "0"),
                ("html", "0"),
                ("fontFamily", "Verdana"),
                ("fontSize", "12"),
            ]),
            row: Style::from_pairs([
                ("text", ""),
                ("strokeColor", "none"),
                ("fillColor", "none"),
                ("align", "left"),
                ("verticalAlign", "middle"),
                ("spacingLeft", "4"),
                ("spacingRight", "4"),
                ("overflow", "hidden"),
                ("points", "[[0,0.5],[1,0.5]]"),
                ("portConstraint", "eastwest"),
                ("rotatable", "0"),
                ("fontFamily", "Verdana"),
                ("fontSize", "12"),
            ]),
        }
    }
}

impl StyleSheet {
    /// Builds the default sheet with the configured overrides applied.
    pub fn from_config(config: &StyleConfig) -> Self {
        let mut sheet = Self::default();
        sheet.entity.extend(config.entity());
        sheet.header.extend(config.header());
        sheet.table.extend(config.table());
        sheet.cell.extend(config.cell());
        sheet.link.extend(config.link());
        sheet.edge_label.extend(config.edge_label());
        sheet.row_table.extend(config.row_table());
        sheet.row.extend(config.row());
        sheet
    }

    pub fn entity(&self) -> &Style {
        &self.entity
    }

    pub fn header(&self) -> &Style {
        &self.header
    }

    pub fn table(&self) -> &Style {
        &self.table
    }

    pub fn cell(&self) -> &Style {
        &self.cell
    }

    pub fn link(&self) -> &Style {
        &self.link
    }

    pub fn edge_label(&self) -> &Style {
        &self.edge_label
    }

    pub fn row_table(&self) -> &Style {
        &self.row_table
    }

    pub fn row(&self) -> &Style {
        &self.row
    }
}
