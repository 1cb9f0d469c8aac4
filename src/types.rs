use std::fmt;

/// The Cloud Spanner [`Struct`](https://cloud.google.com/spanner/docs/data-types#struct_type) type which is composed of optionally named fields and their data type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructType(pub(crate) Vec<(Option<String>, Type)>);

impl StructType {
    /// Creates a new `StructType` with the provided fields.
    ///
    /// Note that Cloud Spanner allows "unnamed" fields. If a provided field name is the empty string,
    /// it will be converted to a `None` in the resulting `StructType`.
    pub fn new(fields: Vec<(&str, Type)>) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(name, tpe)| {
                    let field_name = if !name.is_empty() {
                        Some(name.to_string())
                    } else {
                        None
                    };
                    (field_name, tpe)
                })
                .collect(),
        )
    }

    /// Returns a reference to this struct's fields.
    pub fn fields(&self) -> &Vec<(Option<String>, Type)> {
        &self.0
    }

    /// Returns an iterator over the names of this struct's fields.
    pub fn field_names(&self) -> impl Iterator<Item = &Option<String>> {
        self.0.iter().map(|(name, _)| name)
    }

    /// Returns the index of the provided field name.
    /// Returns `None` if no field matches the provided name.
    /// Note that this function ignores unnamed fields.
    pub fn field_index(&self, field_name: &str) -> Option<usize> {
        self.0.iter().position(|(name, _)| match name {
            Some(col) => *col == field_name,
            None => false,
        })
    }
}

/// An enumeration of the Cloud Spanner [data types](https://cloud.google.com/spanner/docs/data-types)
/// that can be bound as query parameters or read back from rows.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    /// The [`BOOL`](https://cloud.google.com/spanner/docs/data-types#boolean_type) data type.
    Bool,

    /// The [`INT64`](https://cloud.google.com/spanner/docs/data-types#integer_type) data type.
    Int64,

    /// The [`FLOAT64`](https://cloud.google.com/spanner/docs/data-types#floating_point_types) data type.
    Float64,

    /// The [`STRING`](https://cloud.google.com/spanner/docs/data-types#string_type) data type.
    String,

    /// The [`BYTES`](https://cloud.google.com/spanner/docs/data-types#bytes_type) data type.
    Bytes,

    /// The [`JSON`](https://cloud.google.com/spanner/docs/data-types#json_type) data type.
    #[cfg(feature = "json")]
    Json,

    /// The [`NUMERIC`](https://cloud.google.com/spanner/docs/data-types#numeric_type) data type.
    #[cfg(feature = "numeric")]
    Numeric,

    /// The [`TIMESTAMP`](https://cloud.google.com/spanner/docs/data-types#timestamp_type) data type.
    #[cfg(feature = "temporal")]
    Timestamp,

    /// The [`DATE`](https://cloud.google.com/spanner/docs/data-types#date_type) data type.
    #[cfg(feature = "temporal")]
    Date,

    /// The [`ARRAY`](https://cloud.google.com/spanner/docs/data-types#array_type) data type.
    /// Arrays of arrays are not allowed.
    Array(Box<Type>),

    /// The [`STRUCT`](https://cloud.google.com/spanner/docs/data-types#struct_type) data type.
    Struct(StructType),
}

impl Type {
    /// Creates a new `Type::Array` with elements of the specified type.
    ///
    /// # Panics
    ///
    /// If the provided type is itself an `Type::Array`.
    pub fn array(inner: Type) -> Self {
        if let Type::Array(_) = &inner {
            panic!("array of array is not supported by Cloud Spanner");
        }
        Type::Array(Box::new(inner))
    }

    /// Creates a new `Type::Struct` with the provided field names and types.
    pub fn strct(fields: Vec<(&str, Type)>) -> Self {
        Type::Struct(StructType::new(fields))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "BOOL"),
            Type::Int64 => write!(f, "INT64"),
            Type::Float64 => write!(f, "FLOAT64"),
            Type::String => write!(f, "STRING"),
            Type::Bytes => write!(f, "BYTES"),
            #[cfg(feature = "json")]
            Type::Json => write!(f, "JSON"),
            #[cfg(feature = "numeric")]
            Type::Numeric => write!(f, "NUMERIC"),
            #[cfg(feature = "temporal")]
            Type::Timestamp => write!(f, "TIMESTAMP"),
            #[cfg(feature = "temporal")]
            Type::Date => write!(f, "DATE"),
            Type::Array(inner) => write!(f, "ARRAY<{}>", inner),
            Type::Struct(StructType(fields)) => {
                write!(f, "STRUCT<")?;
                for (idx, (name, tpe)) in fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    match name {
                        Some(name) => write!(f, "{} {}", name, tpe)?,
                        None => write!(f, "{}", tpe)?,
                    }
                }
                write!(f, ">")
            }
        }
    }
}

#[cfg(feature = "grpc")]
mod wire {
    use super::{StructType, Type};
    use google_api_proto::google::spanner::v1 as proto;
    use std::convert::TryFrom;

    impl Type {
        pub(crate) fn code(&self) -> proto::TypeCode {
            match self {
                Type::Bool => proto::TypeCode::Bool,
                Type::Int64 => proto::TypeCode::Int64,
                Type::Float64 => proto::TypeCode::Float64,
                Type::String => proto::TypeCode::String,
                Type::Bytes => proto::TypeCode::Bytes,
                #[cfg(feature = "json")]
                Type::Json => proto::TypeCode::Json,
                #[cfg(feature = "numeric")]
                Type::Numeric => proto::TypeCode::Numeric,
                #[cfg(feature = "temporal")]
                Type::Timestamp => proto::TypeCode::Timestamp,
                #[cfg(feature = "temporal")]
                Type::Date => proto::TypeCode::Date,
                Type::Array(_) => proto::TypeCode::Array,
                Type::Struct(_) => proto::TypeCode::Struct,
            }
        }
    }

    impl TryFrom<&proto::StructType> for StructType {
        type Error = crate::Error;

        fn try_from(value: &proto::StructType) -> Result<Self, Self::Error> {
            value
                .fields
                .iter()
                .map(|field| {
                    field
                        .r#type
                        .as_ref()
                        .ok_or_else(|| {
                            Self::Error::Codec(format!("field '{}' is missing type", field.name))
                        })
                        .and_then(Type::try_from)
                        .map(|tpe| (Some(field.name.clone()), tpe))
                })
                .collect::<Result<Vec<(Option<String>, Type)>, Self::Error>>()
                .map(StructType)
        }
    }

    impl TryFrom<&proto::Type> for Type {
        type Error = crate::Error;

        fn try_from(value: &proto::Type) -> Result<Self, Self::Error> {
            match proto::TypeCode::from_i32(value.code) {
                Some(proto::TypeCode::Bool) => Ok(Type::Bool),
                Some(proto::TypeCode::Int64) => Ok(Type::Int64),
                Some(proto::TypeCode::Float64) => Ok(Type::Float64),
                Some(proto::TypeCode::String) => Ok(Type::String),
                Some(proto::TypeCode::Bytes) => Ok(Type::Bytes),
                #[cfg(feature = "json")]
                Some(proto::TypeCode::Json) => Ok(Type::Json),
                #[cfg(feature = "numeric")]
                Some(proto::TypeCode::Numeric) => Ok(Type::Numeric),
                #[cfg(feature = "temporal")]
                Some(proto::TypeCode::Timestamp) => Ok(Type::Timestamp),
                #[cfg(feature = "temporal")]
                Some(proto::TypeCode::Date) => Ok(Type::Date),
                Some(proto::TypeCode::Array) => value
                    .array_element_type
                    .as_ref()
                    .ok_or_else(|| Self::Error::Codec("missing array element type".to_string()))
                    .and_then(|tpe| Type::try_from(tpe.as_ref()))
                    .map(|tpe| Type::Array(Box::new(tpe))),
                Some(proto::TypeCode::Struct) => value
                    .struct_type
                    .as_ref()
                    .ok_or_else(|| {
                        Self::Error::Codec("missing struct type definition".to_string())
                    })
                    .and_then(StructType::try_from)
                    .map(Type::Struct),
                Some(other) => Err(Self::Error::Codec(format!(
                    "unsupported type code {:?}; is the matching cargo feature enabled?",
                    other
                ))),
                None => Err(Self::Error::Codec(format!(
                    "unknown type code {}",
                    value.code
                ))),
            }
        }
    }

    impl From<&Type> for proto::Type {
        fn from(value: &Type) -> Self {
            match value {
                Type::Array(inner) => proto::Type {
                    code: value.code() as i32,
                    array_element_type: Some(Box::new(inner.as_ref().into())),
                    ..Default::default()
                },
                Type::Struct(StructType(fields)) => proto::Type {
                    code: value.code() as i32,
                    struct_type: Some(proto::StructType {
                        fields: fields
                            .iter()
                            .map(|(name, tpe)| proto::struct_type::Field {
                                name: name.clone().unwrap_or_default(),
                                r#type: Some(tpe.into()),
                            })
                            .collect(),
                    }),
                    ..Default::default()
                },
                other => proto::Type {
                    code: other.code() as i32,
                    ..Default::default()
                },
            }
        }
    }

}
