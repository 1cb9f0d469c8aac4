use crate::{Error, Type, Value};

#[cfg(feature = "numeric")]
use bigdecimal::BigDecimal;
#[cfg(feature = "temporal")]
use chrono::{DateTime, NaiveDate, Utc};

/// Conversion of a Rust value into a Cloud Spanner [`Value`] so it can be bound as a query parameter.
pub trait ToSpanner {
    fn to_spanner(&self) -> Result<Value, Error>;

    /// The Spanner type this Rust type converts to; used to type `NULL` values.
    fn spanner_type() -> Type
    where
        Self: Sized;
}

macro_rules! simple_to {
    ($t:ty, $v:ident, $self:ident, $into:expr) => {
        impl ToSpanner for $t {
            fn to_spanner(&self) -> Result<Value, Error> {
                let $self = self;
                Ok(Value::$v($into))
            }

            fn spanner_type() -> Type {
                Type::$v
            }
        }
    };
    ($t:ty, i64_from) => {
        simple_to!($t, Int64, v, i64::from(*v));
    };
    ($t:ty, $v:ident, clone) => {
        simple_to!($t, $v, v, v.clone());
    };
    ($t:ty, $v:ident, copy) => {
        simple_to!($t, $v, v, *v);
    };
}

impl<T> ToSpanner for Option<T>
where
    T: ToSpanner,
{
    fn to_spanner(&self) -> Result<Value, Error> {
        match self.as_ref() {
            Some(v) => v.to_spanner(),
            None => Ok(Value::Null(<T as ToSpanner>::spanner_type())),
        }
    }

    fn spanner_type() -> Type {
        <T as ToSpanner>::spanner_type()
    }
}

impl ToSpanner for u64 {
    fn to_spanner(&self) -> Result<Value, Error> {
        i64::try_from(*self)
            .map(Value::Int64)
            .map_err(|_| Error::Codec(format!("{} does not fit in an INT64", self)))
    }

    fn spanner_type() -> Type {
        Type::Int64
    }
}

simple_to!(i8, i64_from);
simple_to!(u8, i64_from);
simple_to!(i16, i64_from);
simple_to!(u16, i64_from);
simple_to!(i32, i64_from);
simple_to!(u32, i64_from);
simple_to!(i64, i64_from);
simple_to!(f32, Float64, v, f64::from(*v));
simple_to!(f64, Float64, copy);
simple_to!(bool, Bool, copy);
simple_to!(String, String, clone);
simple_to!(&str, String, v, v.to_string());
simple_to!(Vec<u8>, Bytes, clone);
#[cfg(feature = "json")]
simple_to!(serde_json::Value, Json, clone);
#[cfg(feature = "numeric")]
simple_to!(BigDecimal, Numeric, clone);
#[cfg(feature = "temporal")]
simple_to!(DateTime<Utc>, Timestamp, copy);
#[cfg(feature = "temporal")]
simple_to!(NaiveDate, Date, copy);

macro_rules! array_to {
    ($($t:ty),+) => {
        $(
            impl ToSpanner for Vec<$t> {
                fn to_spanner(&self) -> Result<Value, Error> {
                    self.iter()
                        .map(|v| v.to_spanner())
                        .collect::<Result<Vec<Value>, Error>>()
                        .map(|values| Value::Array(<$t as ToSpanner>::spanner_type(), values))
                }

                fn spanner_type() -> Type {
                    Type::array(<$t as ToSpanner>::spanner_type())
                }
            }
        )+
    };
}

// Vec<u8> is BYTES, not ARRAY<INT64>
array_to!(bool, i32, i64, f64, String, &str);
