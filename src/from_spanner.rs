use crate::{Error, Type, Value};

#[cfg(feature = "numeric")]
use bigdecimal::BigDecimal;
#[cfg(feature = "temporal")]
use chrono::{DateTime, NaiveDate, Utc};

/// Conversion of a Cloud Spanner [`Value`] read from a row into a Rust value.
pub trait FromSpanner<'a>: Sized {
    fn from_spanner(value: &'a Value) -> Result<Self, Error>;

    #[allow(unused_variables)]
    fn from_spanner_null(tpe: &Type) -> Result<Self, Error> {
        Err(Error::Codec(format!("value of type {} was null", tpe)))
    }

    fn from_spanner_nullable(value: &'a Value) -> Result<Self, Error> {
        match value {
            Value::Null(tpe) => Self::from_spanner_null(tpe),
            not_null => Self::from_spanner(not_null),
        }
    }
}

impl<'a, T> FromSpanner<'a> for Option<T>
where
    T: FromSpanner<'a>,
{
    fn from_spanner(value: &'a Value) -> Result<Self, Error> {
        <T as FromSpanner>::from_spanner(value).map(Some)
    }

    fn from_spanner_null(_tpe: &Type) -> Result<Self, Error> {
        Ok(None)
    }
}

fn mismatch<T>(expected: Type, value: &Value) -> Result<T, Error> {
    Err(Error::Codec(format!(
        "cannot decode a {} value as {}",
        value.spanner_type(),
        expected
    )))
}

impl<'a> FromSpanner<'a> for &'a str {
    fn from_spanner(value: &'a Value) -> Result<Self, Error> {
        match value {
            Value::String(v) => Ok(v),
            _ => mismatch(Type::String, value),
        }
    }
}

impl<'a> FromSpanner<'a> for &'a [u8] {
    fn from_spanner(value: &'a Value) -> Result<Self, Error> {
        match value {
            Value::Bytes(v) => Ok(v),
            _ => mismatch(Type::Bytes, value),
        }
    }
}

macro_rules! simple_from {
    ($t:ty, $f:ident) => {
        impl<'a> FromSpanner<'a> for $t {
            fn from_spanner(value: &'a Value) -> Result<$t, Error> {
                match value {
                    Value::$f(v) => <$t>::try_from(*v).map_err(|err| {
                        Error::Codec(format!("{} is out of range for {}: {}", v, stringify!($t), err))
                    }),
                    _ => mismatch(Type::$f, value),
                }
            }
        }
    };
    ($t:ty, $f:ident, clone) => {
        impl<'a> FromSpanner<'a> for $t {
            fn from_spanner(value: &'a Value) -> Result<$t, Error> {
                match value {
                    Value::$f(v) => Ok(v.clone()),
                    _ => mismatch(Type::$f, value),
                }
            }
        }
    };
}

simple_from!(i8, Int64);
simple_from!(u8, Int64);
simple_from!(i16, Int64);
simple_from!(u16, Int64);
simple_from!(i32, Int64);
simple_from!(u32, Int64);
simple_from!(i64, Int64);
simple_from!(u64, Int64);
simple_from!(f64, Float64);
simple_from!(bool, Bool);
simple_from!(String, String, clone);
simple_from!(Vec<u8>, Bytes, clone);
#[cfg(feature = "json")]
simple_from!(serde_json::Value, Json, clone);
#[cfg(feature = "numeric")]
simple_from!(BigDecimal, Numeric, clone);
#[cfg(feature = "temporal")]
simple_from!(DateTime<Utc>, Timestamp, clone);
#[cfg(feature = "temporal")]
simple_from!(NaiveDate, Date, clone);

#[cfg(test)]
mod test {
    use super::*;

    // Decodes `value` as a `T` the way `Row::get` does.
    fn decode<'a, T: FromSpanner<'a>>(value: &'a Value) -> Result<T, Error> {
        T::from_spanner_nullable(value)
    }

    macro_rules! int64_decodes {
        ($($t:ty),+) => {
            $(
                assert_eq!(decode::<$t>(&Value::Int64(<$t>::MIN as i64)).unwrap(), <$t>::MIN);
                assert_eq!(decode::<$t>(&Value::Int64(<$t>::MAX as i64)).unwrap(), <$t>::MAX);
                assert!(decode::<$t>(&Value::Float64(42.5)).is_err());
                assert!(decode::<$t>(&Value::from("42")).is_err());
                assert!(decode::<$t>(&Value::Null(Type::Int64)).is_err());
                assert_eq!(decode::<Option<$t>>(&Value::Null(Type::Int64)).unwrap(), None);
            )+
        };
    }

    #[test]
    fn test_int64() {
        int64_decodes!(i8, u8, i16, u16, i32, u32, i64);
    }

    #[test]
    fn test_out_of_range() {
        assert!(decode::<u32>(&Value::Int64(-1)).is_err());
        assert!(decode::<u64>(&Value::Int64(-1)).is_err());
        assert!(decode::<i8>(&Value::Int64(128)).is_err());
        assert_eq!(decode::<u64>(&Value::Int64(7)).unwrap(), 7);
    }

    #[test]
    fn test_scalars() {
        assert_eq!(decode::<f64>(&Value::Float64(12345.6)).unwrap(), 12345.6);
        assert!(decode::<f64>(&Value::Int64(1)).is_err());
        assert!(decode::<bool>(&Value::Bool(true)).unwrap());
        assert!(decode::<bool>(&Value::Int64(0)).is_err());
        assert_eq!(decode::<Option<bool>>(&Value::Null(Type::Bool)).unwrap(), None);
    }

    #[test]
    fn test_trade_columns() {
        let symbol = Value::from("stock1");
        assert_eq!(decode::<String>(&symbol).unwrap(), "stock1");
        assert_eq!(decode::<&str>(&symbol).unwrap(), "stock1");
        assert_eq!(decode::<Option<String>>(&symbol).unwrap().as_deref(), Some("stock1"));
        assert!(decode::<String>(&Value::Null(Type::String)).is_err());
        assert!(decode::<String>(&Value::Float64(0.0)).is_err());
    }

    #[test]
    fn test_bytes() {
        let value = Value::Bytes(vec![1, 2, 3]);
        assert_eq!(decode::<Vec<u8>>(&value).unwrap(), vec![1, 2, 3]);
        assert_eq!(decode::<&[u8]>(&value).unwrap(), &[1u8, 2, 3][..]);
        assert!(decode::<Vec<u8>>(&Value::from("AQID")).is_err());
    }

    #[test]
    fn test_mismatch_message() {
        match decode::<i64>(&Value::from("x")) {
            Err(Error::Codec(message)) => {
                assert_eq!(message, "cannot decode a STRING value as INT64")
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
