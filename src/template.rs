use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use google_api_proto::google::spanner::v1 as proto;
use log::debug;
use prost_types::ListValue;

use crate::{
    Connection, Error, Key, KeySet, SessionManager, SpannerEntity, SpannerOperations, Statement,
    TimestampBound, TransactionSelector,
};

/// [`SpannerOperations`] over the Cloud Spanner gRPC API.
///
/// Reads run in single-use read-only transactions, writes are committed as mutations in
/// single-use read-write transactions. Each operation borrows a session from the pool.
///
/// Cloning is cheap and clones share the session pool.
#[derive(Clone)]
pub struct SpannerTemplate {
    connection: Box<dyn Connection>,
    pool: Pool<SessionManager>,
    timestamp_bound: TimestampBound,
}

impl SpannerTemplate {
    pub(crate) fn new(connection: Box<dyn Connection>, pool: Pool<SessionManager>) -> Self {
        Self {
            connection,
            pool,
            timestamp_bound: TimestampBound::Strong,
        }
    }

    /// Returns a template whose reads observe data at the given bound.
    pub fn with_timestamp_bound(mut self, timestamp_bound: TimestampBound) -> Self {
        self.timestamp_bound = timestamp_bound;
        self
    }

    async fn session(&self) -> Result<PooledConnection<'_, SessionManager>, Error> {
        Ok(self.pool.get().await?)
    }

    async fn commit(&self, mutation: proto::mutation::Operation) -> Result<(), Error> {
        let session = self.session().await?;
        self.connection
            .clone()
            .commit(
                &session,
                vec![proto::Mutation {
                    operation: Some(mutation),
                }],
            )
            .await
    }
}

fn insert_mutation<T: SpannerEntity>(entity: &T) -> Result<proto::mutation::Operation, Error> {
    let values = entity.to_values()?;
    if values.len() != T::columns().len() {
        return Err(Error::Codec(format!(
            "{} has {} column(s) but {} value(s) were provided",
            T::TABLE,
            T::columns().len(),
            values.len()
        )));
    }
    Ok(proto::mutation::Operation::Insert(proto::mutation::Write {
        table: T::TABLE.to_string(),
        columns: T::columns().iter().map(|c| c.to_string()).collect(),
        values: vec![ListValue {
            values: values.into_iter().map(Into::into).collect(),
        }],
    }))
}

fn delete_mutation<T: SpannerEntity>(key_set: KeySet) -> proto::mutation::Operation {
    proto::mutation::Operation::Delete(proto::mutation::Delete {
        table: T::TABLE.to_string(),
        key_set: Some(key_set.into()),
    })
}

#[async_trait]
impl SpannerOperations for SpannerTemplate {
    async fn find<T: SpannerEntity>(&self, statement: &Statement) -> Result<Vec<T>, Error> {
        debug!(
            "find on {}: {} with {} parameter(s)",
            T::TABLE,
            statement.sql(),
            statement.params().len()
        );
        let session = self.session().await?;
        let selector = TransactionSelector::SingleUseReadOnly(self.timestamp_bound.clone());
        let result_set = self
            .connection
            .clone()
            .execute_sql(&session, &selector, statement)
            .await?;
        result_set.iter().map(T::from_row).collect()
    }

    async fn count<T: SpannerEntity>(&self) -> Result<i64, Error> {
        debug!("count on {}", T::TABLE);
        let statement = Statement::of(format!("SELECT COUNT(*) FROM {}", T::TABLE));
        let session = self.session().await?;
        let selector = TransactionSelector::SingleUseReadOnly(self.timestamp_bound.clone());
        let result_set = self
            .connection
            .clone()
            .execute_sql(&session, &selector, &statement)
            .await?;
        let count = result_set
            .iter()
            .next()
            .ok_or_else(|| Error::Codec("COUNT(*) returned no row".to_string()))?
            .get_by_index(0);
        count
    }

    async fn insert<T: SpannerEntity>(&self, entity: &T) -> Result<(), Error> {
        debug!("insert into {}", T::TABLE);
        self.commit(insert_mutation(entity)?).await
    }

    async fn delete_by_id<T: SpannerEntity>(&self, key: Key) -> Result<(), Error> {
        debug!("delete {} from {}", key, T::TABLE);
        self.commit(delete_mutation::<T>(key.into())).await
    }

    async fn delete_all<T: SpannerEntity>(&self) -> Result<(), Error> {
        debug!("delete all from {}", T::TABLE);
        self.commit(delete_mutation::<T>(KeySet::all())).await
    }
}

impl std::fmt::Debug for SpannerTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpannerTemplate")
            .field("pool", &self.pool.state())
            .field("timestamp_bound", &self.timestamp_bound)
            .finish()
    }
}
