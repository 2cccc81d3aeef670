/// Arrow schemas for the flat review tables written between pipeline stages.
pub mod tables {
    use arrow::datatypes::{DataType, Field, Schema};

    /// Column holding the review text in every table.
    pub const REVIEW_COLUMN: &str = "review";
    /// Column holding the integer label in the processed table.
    pub const PREDICTION_COLUMN: &str = "prediction";

    /// Schema of the intermediate review table: one `review` column.
    pub fn review_schema() -> Schema {
        Schema::new(vec![Field::new(REVIEW_COLUMN, DataType::Utf8, true)])
    }

    /// Schema of the processed table: `review` plus a nullable `prediction`.
    ///
    /// Rows that were blank after trimming keep a null prediction.
    pub fn processed_schema() -> Schema {
        Schema::new(vec![
            Field::new(REVIEW_COLUMN, DataType::Utf8, true),
            Field::new(PREDICTION_COLUMN, DataType::Int64, true),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::tables;

    #[test]
    fn review_schema_has_single_review_column() {
        let schema = tables::review_schema();
        assert_eq!(schema.fields().len(), 1);
        assert!(schema.field_with_name("review").is_ok());
    }

    #[test]
    fn processed_schema_prediction_is_nullable() {
        let schema = tables::processed_schema();
        assert_eq!(schema.fields().len(), 2);
        let pred = schema.field_with_name("prediction").unwrap();
        assert!(pred.is_nullable());
    }
}
