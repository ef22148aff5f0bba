/// Arrow schema definitions for knowledge base export.
pub mod kb {
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    /// Column names of the list-valued knowledge record fields, in schema order.
    pub const LIST_COLUMNS: &[&str] = &[
        "medicine_names",
        "precautions",
        "preparation_tips",
        "buy_links",
        "source",
    ];

    fn utf8_list() -> DataType {
        DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)))
    }

    /// Schema for the knowledge base table: one row per disease.
    pub fn knowledge_base_schema() -> Schema {
        let mut fields = vec![Field::new("disease", DataType::Utf8, false)];
        fields.extend(
            LIST_COLUMNS
                .iter()
                .map(|name| Field::new(*name, utf8_list(), false)),
        );
        Schema::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::kb;

    #[test]
    fn knowledge_base_schema_has_expected_fields() {
        let schema = kb::knowledge_base_schema();
        assert_eq!(schema.fields().len(), 6);
        assert!(schema.field_with_name("disease").is_ok());
        assert!(schema.field_with_name("medicine_names").is_ok());
        assert!(schema.field_with_name("source").is_ok());
    }

    #[test]
    fn list_columns_follow_disease_key() {
        let schema = kb::knowledge_base_schema();
        assert_eq!(schema.field(0).name(), "disease");
        for (i, name) in kb::LIST_COLUMNS.iter().enumerate() {
            assert_eq!(schema.field(i + 1).name(), *name);
        }
    }
}
