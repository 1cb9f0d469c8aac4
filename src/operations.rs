use async_trait::async_trait;

use crate::{Error, Key, Row, Statement, Value};

/// A Rust type stored as the rows of a single Cloud Spanner table.
pub trait SpannerEntity: Sized + Send + Sync + 'static {
    /// The name of the backing table.
    const TABLE: &'static str;

    /// Every column of the table, in the order used by [`SpannerEntity::to_values`].
    fn columns() -> &'static [&'static str];

    /// The primary key columns, in key order. Each must also appear in [`SpannerEntity::columns`].
    fn key_columns() -> &'static [&'static str];

    /// The value of every column, in the order of [`SpannerEntity::columns`].
    fn to_values(&self) -> Result<Vec<Value>, Error>;

    fn from_row(row: &Row) -> Result<Self, Error>;

    /// The primary key of this entity.
    fn key(&self) -> Result<Key, Error> {
        let values = self.to_values()?;
        Self::key_columns()
            .iter()
            .map(|key_column| {
                Self::columns()
                    .iter()
                    .position(|column| column == key_column)
                    .and_then(|idx| values.get(idx).cloned())
                    .ok_or_else(|| {
                        Error::Codec(format!(
                            "key column {} is not a column of {}",
                            key_column,
                            Self::TABLE
                        ))
                    })
            })
            .collect()
    }
}

/// Returns the statement reading every row of `T`'s table.
pub fn select_all<T: SpannerEntity>() -> Statement {
    Statement::of(format!(
        "SELECT {} FROM {}",
        T::columns().join(", "),
        T::TABLE
    ))
}

/// The operations a repository needs from a Cloud Spanner database.
#[async_trait]
pub trait SpannerOperations: Send + Sync {
    /// Runs `statement` and converts each returned row into a `T`.
    async fn find<T: SpannerEntity>(&self, statement: &Statement) -> Result<Vec<T>, Error>;

    async fn find_all<T: SpannerEntity>(&self) -> Result<Vec<T>, Error> {
        self.find(&select_all::<T>()).await
    }

    /// The number of rows in `T`'s table.
    async fn count<T: SpannerEntity>(&self) -> Result<i64, Error>;

    async fn insert<T: SpannerEntity>(&self, entity: &T) -> Result<(), Error>;

    async fn delete_by_id<T: SpannerEntity>(&self, key: Key) -> Result<(), Error>;

    /// Deletes every row of `T`'s table.
    async fn delete_all<T: SpannerEntity>(&self) -> Result<(), Error>;

    /// The primary key identifying `entity`.
    fn get_id<T: SpannerEntity>(&self, entity: &T) -> Result<Key, Error> {
        entity.key()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Account {
        bank: String,
        number: i64,
        owner: String,
    }

    impl SpannerEntity for Account {
        const TABLE: &'static str = "accounts";

        fn columns() -> &'static [&'static str] {
            &["owner", "number", "bank"]
        }

        fn key_columns() -> &'static [&'static str] {
            &["bank", "number"]
        }

        fn to_values(&self) -> Result<Vec<Value>, Error> {
            Ok(vec![
                Value::from(self.owner.as_str()),
                Value::Int64(self.number),
                Value::from(self.bank.as_str()),
            ])
        }

        fn from_row(row: &Row) -> Result<Self, Error> {
            Ok(Account {
                bank: row.get("bank")?,
                number: row.get("number")?,
                owner: row.get("owner")?,
            })
        }
    }

    #[test]
    fn test_key_follows_key_columns() {
        let account = Account {
            bank: "ferris-bank".to_string(),
            number: 42,
            owner: "ferris".to_string(),
        };
        assert_eq!(
            account.key().unwrap(),
            Key::from((Value::from("ferris-bank"), Value::Int64(42)))
        );
    }

    #[test]
    fn test_select_all() {
        assert_eq!(
            select_all::<Account>().sql(),
            "SELECT owner, number, bank FROM accounts"
        );
    }

    #[test]
    fn test_from_row() {
        let row = Row::new(crate::StructValue(vec![
            (Some("owner".to_string()), Value::from("ferris")),
            (Some("number".to_string()), Value::Int64(7)),
            (Some("bank".to_string()), Value::from("crab-bank")),
        ]));
        let account = Account::from_row(&row).unwrap();
        assert_eq!(account.owner, "ferris");
        assert_eq!(account.number, 7);
        assert_eq!(account.bank, "crab-bank");
    }
}
