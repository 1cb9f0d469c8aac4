use std::{future::Future, pin::Pin, sync::Arc};

use gcp_auth::AuthenticationManager;
use http::{header::AUTHORIZATION, HeaderValue, Request};
use log::trace;
use tonic::body::BoxBody;
use tower::{filter::AsyncPredicate, BoxError};

// Reading and writing rows only requires the data scope.
const DATA_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/spanner.data",
];

/// Adds a bearer token to every outgoing request.
#[derive(Clone)]
pub(crate) struct AuthFilter(Arc<AuthenticationManager>);

impl AuthFilter {
    pub(crate) fn new(auth_manager: AuthenticationManager) -> Self {
        Self(Arc::new(auth_manager))
    }
}

async fn authorize(
    auth_manager: Arc<AuthenticationManager>,
    mut request: Request<BoxBody>,
) -> Result<Request<BoxBody>, BoxError> {
    let token = auth_manager.get_token(&DATA_SCOPES).await?;
    let bearer = HeaderValue::try_from(format!("Bearer {}", token.as_str()))
        .map_err(|err| crate::Error::Client(format!("invalid auth token: {}", err)))?;
    trace!("authorizing request to {}", request.uri());
    request.headers_mut().insert(AUTHORIZATION, bearer);
    Ok(request)
}

impl AsyncPredicate<Request<BoxBody>> for AuthFilter {
    type Future = Pin<Box<dyn Future<Output = Result<Self::Request, BoxError>> + Send>>;
    type Request = Request<BoxBody>;

    fn check(&mut self, request: Request<BoxBody>) -> Self::Future {
        Box::pin(authorize(self.0.clone(), request))
    }
}
