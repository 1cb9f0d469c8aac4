use async_trait::async_trait;
use dyn_clone::DynClone;
use google_api_proto::google::spanner::v1 as proto;

use crate::{Error, ResultSet, Session, Statement, TransactionSelector};

/// The Cloud Spanner RPCs used by [`crate::SpannerTemplate`].
#[async_trait]
pub(crate) trait Connection
where
    Self: DynClone + Send + Sync,
{
    async fn create_session(&mut self) -> Result<Session, Error>;

    async fn execute_sql(
        &mut self,
        session: &Session,
        selector: &TransactionSelector,
        statement: &Statement,
    ) -> Result<ResultSet, Error>;

    /// Applies `mutations` atomically in a single-use read-write transaction.
    async fn commit(
        &mut self,
        session: &Session,
        mutations: Vec<proto::Mutation>,
    ) -> Result<(), Error>;
}

dyn_clone::clone_trait_object!(Connection);

pub(crate) mod grpc;
