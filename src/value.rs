use crate::{Error, StructType, Type};

#[cfg(feature = "numeric")]
use bigdecimal::BigDecimal;
#[cfg(feature = "temporal")]
use chrono::{DateTime, NaiveDate, Utc};

/// The value of a `STRUCT`: its fields, in order, with their optional names.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue(pub Vec<(Option<String>, Value)>);

impl StructValue {
    pub fn struct_type(&self) -> StructType {
        StructType(
            self.0
                .iter()
                .map(|(name, value)| (name.clone(), value.spanner_type()))
                .collect(),
        )
    }

    pub fn get(&self, field_name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name.as_deref() == Some(field_name))
            .map(|(_, value)| value)
    }
}

// https://github.com/googleapis/googleapis/blob/master/google/spanner/v1/type.proto
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null(Type),
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    #[cfg(feature = "json")]
    Json(serde_json::Value),
    #[cfg(feature = "numeric")]
    Numeric(BigDecimal),
    #[cfg(feature = "temporal")]
    Timestamp(DateTime<Utc>),
    #[cfg(feature = "temporal")]
    Date(NaiveDate),
    /// An array of values along with the type of its elements.
    Array(Type, Vec<Value>),
    Struct(StructValue),
}

impl Value {
    pub fn spanner_type(&self) -> Type {
        match self {
            Value::Null(tpe) => tpe.clone(),
            Value::Bool(_) => Type::Bool,
            Value::Int64(_) => Type::Int64,
            Value::Float64(_) => Type::Float64,
            Value::String(_) => Type::String,
            Value::Bytes(_) => Type::Bytes,
            #[cfg(feature = "json")]
            Value::Json(_) => Type::Json,
            #[cfg(feature = "numeric")]
            Value::Numeric(_) => Type::Numeric,
            #[cfg(feature = "temporal")]
            Value::Timestamp(_) => Type::Timestamp,
            #[cfg(feature = "temporal")]
            Value::Date(_) => Type::Date,
            Value::Array(inner, _) => Type::Array(Box::new(inner.clone())),
            Value::Struct(strct) => Type::Struct(strct.struct_type()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Converts this value to the text spliced into a query by a template expression.
    ///
    /// Only scalar, non-null values have a textual form.
    pub fn try_to_text(&self) -> Result<String, Error> {
        match self {
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int64(i) => Ok(i.to_string()),
            Value::Float64(f) => Ok(f.to_string()),
            Value::String(s) => Ok(s.clone()),
            #[cfg(feature = "json")]
            Value::Json(json) => Ok(json.to_string()),
            #[cfg(feature = "numeric")]
            Value::Numeric(n) => Ok(n.to_string()),
            #[cfg(feature = "temporal")]
            Value::Timestamp(ts) => Ok(ts.to_rfc3339()),
            #[cfg(feature = "temporal")]
            Value::Date(date) => Ok(date.format("%Y-%m-%d").to_string()),
            Value::Null(_) => Err(Error::Evaluation(
                "null cannot be converted to query text".to_string(),
            )),
            other => Err(Error::Evaluation(format!(
                "value of type {} cannot be converted to query text",
                other.spanner_type()
            ))),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[cfg(feature = "grpc")]
mod wire {
    use super::{StructValue, Value};
    use crate::{Error, StructType, Type};
    use prost_types::value::Kind;
    use prost_types::{ListValue, NullValue, Value as SpannerValue};

    impl StructValue {
        pub(crate) fn try_from_proto(
            tpe: &StructType,
            list_value: ListValue,
        ) -> Result<Self, Error> {
            if tpe.0.len() != list_value.values.len() {
                Err(Error::Codec(format!(
                    "unmatched number of fields: expected {}, got {}",
                    tpe.0.len(),
                    list_value.values.len()
                )))
            } else {
                tpe.0
                    .iter()
                    .zip(list_value.values)
                    .map(|((name, tpe), value)| {
                        Value::try_from_proto(tpe, value).map(|value| (name.clone(), value))
                    })
                    .collect::<Result<Vec<(Option<String>, Value)>, Error>>()
                    .map(StructValue)
            }
        }
    }

    fn codec<E: std::fmt::Display>(tpe: &Type) -> impl Fn(E) -> Error + '_ {
        move |err| Error::Codec(format!("invalid {} value: {}", tpe, err))
    }

    impl Value {
        pub(crate) fn try_from_proto(tpe: &Type, value: SpannerValue) -> Result<Self, Error> {
            let kind = match value.kind {
                None | Some(Kind::NullValue(_)) => return Ok(Value::Null(tpe.clone())),
                Some(kind) => kind,
            };
            match (tpe, kind) {
                (Type::Bool, Kind::BoolValue(b)) => Ok(Value::Bool(b)),
                (Type::Int64, Kind::StringValue(s)) => {
                    s.parse::<i64>().map(Value::Int64).map_err(codec(tpe))
                }
                (Type::Float64, Kind::NumberValue(n)) => Ok(Value::Float64(n)),
                (Type::Float64, Kind::StringValue(s)) => match s.as_str() {
                    "NaN" => Ok(Value::Float64(f64::NAN)),
                    "Infinity" => Ok(Value::Float64(f64::INFINITY)),
                    "-Infinity" => Ok(Value::Float64(f64::NEG_INFINITY)),
                    _ => Err(Error::Codec(format!("{} is not a valid FLOAT64", s))),
                },
                (Type::String, Kind::StringValue(s)) => Ok(Value::String(s)),
                (Type::Bytes, Kind::StringValue(s)) => {
                    base64::decode(s).map(Value::Bytes).map_err(codec(tpe))
                }
                #[cfg(feature = "json")]
                (Type::Json, Kind::StringValue(s)) => {
                    serde_json::from_str(&s).map(Value::Json).map_err(codec(tpe))
                }
                #[cfg(feature = "numeric")]
                (Type::Numeric, Kind::StringValue(s)) => s
                    .parse::<bigdecimal::BigDecimal>()
                    .map(Value::Numeric)
                    .map_err(codec(tpe)),
                #[cfg(feature = "temporal")]
                (Type::Timestamp, Kind::StringValue(s)) => chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|ts| Value::Timestamp(ts.with_timezone(&chrono::Utc)))
                    .map_err(codec(tpe)),
                #[cfg(feature = "temporal")]
                (Type::Date, Kind::StringValue(s)) => {
                    chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                        .map(Value::Date)
                        .map_err(codec(tpe))
                }
                (Type::Array(inner), Kind::ListValue(list_value)) => list_value
                    .values
                    .into_iter()
                    .map(|v| Value::try_from_proto(inner, v))
                    .collect::<Result<Vec<Value>, Error>>()
                    .map(|values| Value::Array(inner.as_ref().clone(), values)),
                (Type::Struct(row_type), Kind::ListValue(list_value)) => {
                    StructValue::try_from_proto(row_type, list_value).map(Value::Struct)
                }
                _ => Err(Error::Codec(format!("invalid value kind for type {}", tpe))),
            }
        }
    }

    impl From<Value> for SpannerValue {
        fn from(value: Value) -> Self {
            let kind = match value {
                Value::Null(_) => Kind::NullValue(NullValue::NullValue as i32),
                Value::Bool(b) => Kind::BoolValue(b),
                Value::Int64(i) => Kind::StringValue(i.to_string()),
                Value::Float64(f) if f.is_nan() => Kind::StringValue("NaN".to_string()),
                Value::Float64(f) if f.is_infinite() => Kind::StringValue(
                    if f.is_sign_positive() {
                        "Infinity"
                    } else {
                        "-Infinity"
                    }
                    .to_string(),
                ),
                Value::Float64(f) => Kind::NumberValue(f),
                Value::String(s) => Kind::StringValue(s),
                Value::Bytes(b) => Kind::StringValue(base64::encode(b)),
                #[cfg(feature = "json")]
                Value::Json(json) => Kind::StringValue(json.to_string()),
                #[cfg(feature = "numeric")]
                Value::Numeric(n) => Kind::StringValue(n.to_string()),
                #[cfg(feature = "temporal")]
                Value::Timestamp(ts) => {
                    Kind::StringValue(ts.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
                }
                #[cfg(feature = "temporal")]
                Value::Date(date) => Kind::StringValue(date.format("%Y-%m-%d").to_string()),
                Value::Array(_, values) => Kind::ListValue(ListValue {
                    values: values.into_iter().map(|v| v.into()).collect(),
                }),
                Value::Struct(StructValue(values)) => Kind::ListValue(ListValue {
                    values: values.into_iter().map(|(_, value)| value.into()).collect(),
                }),
            };
            Self { kind: Some(kind) }
        }
    }

}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_spanner_type() {
        assert_eq!(Value::Int64(1).spanner_type(), Type::Int64);
        assert_eq!(Value::Null(Type::Bool).spanner_type(), Type::Bool);
        assert_eq!(
            Value::Array(Type::String, vec![]).spanner_type(),
            Type::array(Type::String)
        );
        assert_eq!(
            Value::Struct(StructValue(vec![(Some("a".to_string()), Value::Bool(true))]))
                .spanner_type(),
            Type::strct(vec![("a", Type::Bool)])
        );
    }

    #[test]
    fn test_try_to_text() {
        assert_eq!(Value::from("trades").try_to_text().unwrap(), "trades");
        assert_eq!(Value::Int64(-3).try_to_text().unwrap(), "-3");
        assert_eq!(Value::Bool(true).try_to_text().unwrap(), "true");
        assert_eq!(Value::Float64(1.5).try_to_text().unwrap(), "1.5");
        assert!(Value::Null(Type::String).try_to_text().is_err());
        assert!(Value::Array(Type::Int64, vec![Value::Int64(1)])
            .try_to_text()
            .is_err());
        assert!(Value::Bytes(vec![1, 2]).try_to_text().is_err());
    }

    #[test]
    fn test_struct_get() {
        let strct = StructValue(vec![
            (Some("symbol".to_string()), Value::from("stock1")),
            (None, Value::Int64(1)),
        ]);
        assert_eq!(strct.get("symbol"), Some(&Value::from("stock1")));
        assert_eq!(strct.get("missing"), None);
    }
}
