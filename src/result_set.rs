use std::sync::Arc;

use crate::{Error, FromSpanner, StructType, StructValue, Value};

/// A single row of a [`ResultSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    row_type: Arc<StructType>,
    columns: Vec<Value>,
}

impl Row {
    /// Builds a row from named column values; mostly useful to implement a store or to test one.
    pub fn new(columns: StructValue) -> Self {
        let row_type = Arc::new(columns.struct_type());
        Self {
            row_type,
            columns: columns.0.into_iter().map(|(_, value)| value).collect(),
        }
    }

    pub fn row_type(&self) -> &StructType {
        &self.row_type
    }

    pub fn get_value(&self, column: usize) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn get_value_by_name(&self, column_name: &str) -> Option<&Value> {
        self.row_type
            .field_index(column_name)
            .and_then(|idx| self.get_value(idx))
    }

    /// Reads the named column as `T`.
    pub fn get<'a, T>(&'a self, column_name: &str) -> Result<T, Error>
    where
        T: FromSpanner<'a>,
    {
        self.get_value_by_name(column_name)
            .ok_or_else(|| Error::Codec(format!("no such column: {}", column_name)))
            .and_then(T::from_spanner_nullable)
    }

    /// Reads the column at `column` as `T`.
    pub fn get_by_index<'a, T>(&'a self, column: usize) -> Result<T, Error>
    where
        T: FromSpanner<'a>,
    {
        self.get_value(column)
            .ok_or_else(|| Error::Codec(format!("no column at index {}", column)))
            .and_then(T::from_spanner_nullable)
    }
}

/// The rows returned by a query.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    row_type: StructType,
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(row_type: StructType, rows: Vec<Row>) -> Self {
        Self { row_type, rows }
    }

    pub fn row_type(&self) -> &StructType {
        &self.row_type
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(feature = "grpc")]
mod wire {
    use super::{ResultSet, Row};
    use crate::{Error, StructType, StructValue};
    use google_api_proto::google::spanner::v1::ResultSet as SpannerResultSet;
    use std::convert::TryFrom;
    use std::sync::Arc;

    impl TryFrom<SpannerResultSet> for ResultSet {
        type Error = Error;

        fn try_from(value: SpannerResultSet) -> Result<Self, Self::Error> {
            let row_type: StructType = value
                .metadata
                .ok_or_else(|| Error::Codec("missing result set metadata".to_string()))
                .and_then(|rsm| {
                    rsm.row_type
                        .ok_or_else(|| Error::Codec("missing row type metadata".to_string()))
                })
                .and_then(|row_type| StructType::try_from(&row_type))?;

            let shared_type = Arc::new(row_type.clone());
            let rows = value
                .rows
                .into_iter()
                .map(|row| {
                    StructValue::try_from_proto(&row_type, row).map(|StructValue(columns)| Row {
                        row_type: shared_type.clone(),
                        columns: columns.into_iter().map(|(_, value)| value).collect(),
                    })
                })
                .collect::<Result<Vec<Row>, Error>>()?;

            Ok(Self { row_type, rows })
        }
    }
}
