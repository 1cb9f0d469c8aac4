use derive_builder::Builder;
use log::debug;
use tonic::transport::ClientTlsConfig;

use crate::{DatabaseId, Error, InstanceId, SessionManager, SpannerResource, SpannerTemplate};

/// Configuration for connecting to Cloud Spanner.
///
/// Connecting to the emulator:
///
/// ```no_run
/// # use spanner_query::*;
/// # async fn connect() -> Result<SpannerTemplate, Error> {
/// Config::builder()
///     .project("test-project")
///     .instance("test-instance")
///     .database("test-database")
///     .with_emulator_host("localhost:9010")
///     .connect()
///     .await
/// # }
/// ```
#[derive(Builder, Debug)]
#[builder(pattern = "owned", build_fn(error = "crate::Error"))]
pub struct Config {
    /// The Cloud Spanner endpoint, `https://spanner.googleapis.com` when unset.
    #[builder(setter(strip_option, into), default)]
    endpoint: Option<String>,

    /// TLS settings, required when connecting to the default endpoint.
    #[builder(setter(strip_option), default = "Some(ClientTlsConfig::new())")]
    tls_config: Option<ClientTlsConfig>,

    /// Whether to obtain OAuth tokens through `gcp_auth`.
    #[builder(default = "true")]
    authenticate: bool,

    #[builder(setter(into))]
    project: String,

    #[builder(setter(into))]
    instance: String,

    #[builder(setter(into))]
    database: String,

    /// The maximum number of sessions kept open.
    #[builder(default = "10")]
    session_pool_size: u32,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn database_id(&self) -> DatabaseId {
        DatabaseId::new(InstanceId::new(&self.project, &self.instance), &self.database)
    }

    /// Opens the gRPC channel and the session pool.
    pub async fn connect(self) -> Result<SpannerTemplate, Error> {
        let database = self.database_id();
        let auth = if self.authenticate {
            Some(gcp_auth::init().await?)
        } else {
            None
        };
        debug!(
            "connecting to {} through {}",
            database.id(),
            self.endpoint.as_deref().unwrap_or("the default endpoint")
        );

        let connection =
            crate::connection::grpc::connect(self.endpoint, self.tls_config, auth, database)
                .await?;

        let pool = bb8::Pool::builder()
            .max_size(self.session_pool_size)
            .build(SessionManager::new(connection.clone()))
            .await?;

        Ok(SpannerTemplate::new(connection, pool))
    }
}

impl ConfigBuilder {
    /// Connects to the emulator listening at `host`, e.g.: the value of `SPANNER_EMULATOR_HOST`.
    ///
    /// The emulator is reached in plain text and without authentication.
    pub fn with_emulator_host(self, host: &str) -> Self {
        let mut builder = self.endpoint(format!("http://{}", host));
        builder.tls_config = Some(None);
        builder.authenticate = Some(false);
        builder
    }

    /// Connects to the emulator listening on `localhost` at `port`.
    pub fn with_emulator_grpc_port(self, port: u16) -> Self {
        self.with_emulator_host(&format!("localhost:{}", port))
    }

    pub async fn connect(self) -> Result<SpannerTemplate, Error> {
        self.build()?.connect().await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = Config::builder()
            .project("p")
            .instance("i")
            .database("d")
            .build()
            .unwrap();
        assert_eq!(config.endpoint, None);
        assert!(config.tls_config.is_some());
        assert!(config.authenticate);
        assert_eq!(config.session_pool_size, 10);
        assert_eq!(
            config.database_id().id(),
            "projects/p/instances/i/databases/d"
        );
    }

    #[test]
    fn test_emulator() {
        let config = Config::builder()
            .project("p")
            .instance("i")
            .database("d")
            .with_emulator_grpc_port(9010)
            .session_pool_size(2u32)
            .build()
            .unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9010"));
        assert!(config.tls_config.is_none());
        assert!(!config.authenticate);
        assert_eq!(config.session_pool_size, 2);
    }

    #[test]
    fn test_missing_database() {
        let result = Config::builder().project("p").instance("i").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
