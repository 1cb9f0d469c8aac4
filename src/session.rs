use async_trait::async_trait;
use bb8::ManageConnection;
use google_api_proto::google::spanner::v1 as proto;
use log::debug;

use crate::{Connection, Error};

/// A Cloud Spanner session, identified by its resource name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    name: String,
}

impl Session {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl From<proto::Session> for Session {
    fn from(session: proto::Session) -> Self {
        Self { name: session.name }
    }
}

/// Opens sessions for the pool backing [`crate::SpannerTemplate`].
///
/// Sessions are never checked: an expired session surfaces as a `NOT_FOUND` status on the
/// operation using it.
pub(crate) struct SessionManager(Box<dyn Connection>);

impl SessionManager {
    pub(crate) fn new(connection: Box<dyn Connection>) -> Self {
        Self(connection)
    }
}

#[async_trait]
impl ManageConnection for SessionManager {
    type Connection = Session;
    type Error = Error;

    async fn connect(&self) -> Result<Session, Error> {
        let mut connection = self.0.clone();
        let session = connection.create_session().await?;
        debug!("opened session {}", session.name());
        Ok(session)
    }

    async fn is_valid(&self, _session: &mut Session) -> Result<(), Error> {
        Ok(())
    }

    fn has_broken(&self, _session: &mut Session) -> bool {
        false
    }
}
