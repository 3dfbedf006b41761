//! Loading of TOML schema descriptions.
//!
//! ```toml
//! [[tables]]
//! name = "users"
//!
//! [[tables.columns]]
//! name = "org_id"
//! type = "BIGINT"
//! references = { table = "orgs", column = "id" }
//! ```

use std::{fs, path::Path};

use log::debug;

use erloom::{ErloomError, schema::Schema};

/// Read and deserialize the schema at `path`.
///
/// # Errors
///
/// Returns [`ErloomError::Io`] if the file cannot be read and
/// [`ErloomError::SchemaSource`] with the offending span if it is not a
/// valid schema document.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema, ErloomError> {
    let source = fs::read_to_string(path)?;
    parse_schema(source)
}

fn parse_schema(source: String) -> Result<Schema, ErloomError> {
    match toml::from_str::<Schema>(&source) {
        Ok(schema) => {
            debug!(tables = schema.tables().len(); "Schema loaded");
            Ok(schema)
        }
        Err(err) => Err(ErloomError::new_schema_source_error(
            err.message(),
            err.span(),
            source,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema() {
        let schema = parse_schema(
            r#"
[[tables]]
name = "orgs"

[[tables.columns]]
name = "id"
type = "BIGINT"
primary_key = true

[[tables]]
name = "users"

[[tables.columns]]
name = "org_id"
not_null = true
references = { table = "orgs", column = "id" }
"#
            .to_string(),
        )
        .unwrap();

        assert_eq!(schema.tables().len(), 2);
        let users = schema.table("users").unwrap();
        assert_eq!(users.foreign_keys().count(), 1);
        assert!(users.columns()[0].is_not_null());
        assert_eq!(schema.table("orgs").unwrap().columns()[0].data_type(), "BIGINT");
    }

    #[test]
    fn test_error_carries_span() {
        let source = "[[tables]]\nname = 42\n";
        let err = parse_schema(source.to_string()).unwrap_err();

        match err {
            ErloomError::SchemaSource { span, src, .. } => {
                let span = span.unwrap();
                assert!(src[span].contains("42"));
            }
            other => panic!("Expected SchemaSource, got {other:?}"),
        }
    }
}
