use async_trait::async_trait;
use gcp_auth::AuthenticationManager;
use google_api_proto::google::spanner::v1 as proto;
use log::trace;
use proto::{spanner_client::SpannerClient, CommitRequest, CreateSessionRequest, ExecuteSqlRequest};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::Request;
use tower::filter::{AsyncFilter, AsyncFilterLayer};
use tower::util::Either;
use tower::ServiceBuilder;

use super::Connection;
use crate::auth::AuthFilter;
use crate::{
    DatabaseId, Error, ResultSet, Session, SpannerResource, Statement, TransactionSelector,
};

const SPANNER_ENDPOINT: &str = "https://spanner.googleapis.com";

#[derive(Clone)]
struct GrpcConnection {
    database: DatabaseId,
    spanner: SpannerClient<Either<AsyncFilter<Channel, AuthFilter>, Channel>>,
}

// The default endpoint always requires TLS, a custom one (e.g.: the emulator) may not.
fn endpoint(url: Option<String>, tls_config: Option<ClientTlsConfig>) -> Result<Endpoint, Error> {
    let endpoint = match url {
        Some(url) => Channel::from_shared(url)
            .map_err(|invalid| Error::Config(format!("invalid endpoint: {}", invalid)))?,
        None if tls_config.is_none() => {
            return Err(Error::Config(format!("{} requires TLS", SPANNER_ENDPOINT)))
        }
        None => Channel::from_static(SPANNER_ENDPOINT),
    };
    Ok(match tls_config {
        Some(tls_config) => endpoint.tls_config(tls_config)?,
        None => endpoint,
    })
}

pub(crate) async fn connect(
    url: Option<String>,
    tls_config: Option<ClientTlsConfig>,
    auth: Option<AuthenticationManager>,
    database: DatabaseId,
) -> Result<Box<dyn Connection>, Error> {
    let channel = endpoint(url, tls_config)?.connect().await?;
    let service = ServiceBuilder::new()
        .option_layer(auth.map(|auth| AsyncFilterLayer::new(AuthFilter::new(auth))))
        .service(channel);

    Ok(Box::new(GrpcConnection {
        database,
        spanner: SpannerClient::new(service),
    }))
}

#[async_trait]
impl Connection for GrpcConnection {
    async fn create_session(&mut self) -> Result<Session, Error> {
        let response = self
            .spanner
            .create_session(Request::new(CreateSessionRequest {
                database: self.database.id(),
                ..Default::default()
            }))
            .await?;
        Ok(response.into_inner().into())
    }

    async fn execute_sql(
        &mut self,
        session: &Session,
        selector: &TransactionSelector,
        statement: &Statement,
    ) -> Result<ResultSet, Error> {
        trace!("executing on {}: {}", session.name(), statement.sql());
        self.spanner
            .execute_sql(Request::new(ExecuteSqlRequest {
                session: session.name().to_string(),
                transaction: Some(selector.clone().into()),
                sql: statement.sql().to_string(),
                params: Some(statement.proto_params()),
                param_types: statement.proto_param_types(),
                ..Default::default()
            }))
            .await?
            .into_inner()
            .try_into()
    }

    async fn commit(
        &mut self,
        session: &Session,
        mutations: Vec<proto::Mutation>,
    ) -> Result<(), Error> {
        trace!("committing {} mutation(s) on {}", mutations.len(), session.name());
        self.spanner
            .commit(Request::new(CommitRequest {
                session: session.name().to_string(),
                mutations,
                transaction: Some(proto::commit_request::Transaction::SingleUseTransaction(
                    proto::TransactionOptions {
                        mode: Some(proto::transaction_options::Mode::ReadWrite(
                            Default::default(),
                        )),
                        ..Default::default()
                    },
                )),
                ..Default::default()
            }))
            .await?;
        Ok(())
    }
}
