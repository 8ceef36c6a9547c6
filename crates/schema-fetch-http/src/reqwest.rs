use std::{future::Future, pin::Pin};

use buildstructor::buildstructor;
use reqwest::{Client, ClientBuilder};
use tower::{util::BoxCloneSyncService, Service, ServiceBuilder};

use crate::{
    body::body_to_bytes, HttpRequest, HttpResponse, HttpService, HttpServiceConfig,
    HttpServiceError, HttpServiceFactory, DEFAULT_TIMEOUT,
};

type ReqwestClientService =
    BoxCloneSyncService<reqwest::Request, reqwest::Response, HttpServiceError>;

/// Hands out [`ReqwestService`]s built from one [`HttpServiceConfig`]
#[derive(Clone, Debug)]
pub struct ReqwestServiceFactory {
    config: HttpServiceConfig,
    client: Option<Client>,
}

#[buildstructor]
impl ReqwestServiceFactory {
    /// `client`, when given, is shared by every service; otherwise each gets its own
    #[builder]
    pub fn new(
        config: Option<HttpServiceConfig>,
        client: Option<Client>,
    ) -> ReqwestServiceFactory {
        ReqwestServiceFactory {
            config: config.unwrap_or_default(),
            client,
        }
    }
}

impl HttpServiceFactory for ReqwestServiceFactory {
    fn create(&self) -> Result<HttpService, HttpServiceError> {
        let service = ReqwestService::builder()
            .config(self.config.clone())
            .and_client(self.client.clone())
            .build()?;
        Ok(service.into())
    }
}

/// [`reqwest`] behind the [`HttpService`] interface, with the configured timeout applied
#[derive(Clone)]
pub struct ReqwestService {
    client: ReqwestClientService,
}

impl std::fmt::Debug for ReqwestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestService").finish_non_exhaustive()
    }
}

#[buildstructor]
impl ReqwestService {
    #[builder]
    pub fn new(
        config: Option<HttpServiceConfig>,
        client: Option<Client>,
    ) -> Result<ReqwestService, reqwest::Error> {
        let config = config.unwrap_or_default();
        let client = match client {
            Some(client) => client,
            None => build_client(&config)?,
        };
        let timeout = config.timeout().unwrap_or(DEFAULT_TIMEOUT);
        tracing::debug!(?timeout, "building HTTP client");
        let client = ServiceBuilder::new()
            .map_err(HttpServiceError::from)
            .timeout(timeout)
            .service(client);
        Ok(ReqwestService {
            client: BoxCloneSyncService::new(client),
        })
    }
}

fn build_client(config: &HttpServiceConfig) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .danger_accept_invalid_certs(config.accept_invalid_certificates().unwrap_or_default())
        .danger_accept_invalid_hostnames(config.accept_invalid_hostnames().unwrap_or_default())
        .build()
}

impl From<reqwest::Error> for HttpServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpServiceError::TimedOut
        } else if err.is_connect() {
            HttpServiceError::Connect(err.into())
        } else if err.is_body() {
            HttpServiceError::Body(err.into())
        } else if err.is_decode() {
            HttpServiceError::Decode(err.into())
        } else {
            HttpServiceError::Unexpected(err.into())
        }
    }
}

/// Sends `req`, buffering both bodies
async fn send(
    mut client: ReqwestClientService,
    mut req: HttpRequest,
) -> Result<HttpResponse, HttpServiceError> {
    let body = body_to_bytes(&mut req)
        .await
        .map_err(|err| HttpServiceError::Body(Box::new(err)))?;
    let req = reqwest::Request::try_from(req.map(|_| reqwest::Body::from(body)))?;
    tracing::debug!(method = %req.method(), url = %req.url(), "sending request");

    let mut resp = http::Response::from(client.call(req).await?);
    tracing::debug!(status = %resp.status(), "received response");
    let body = body_to_bytes(&mut resp).await?;
    Ok(resp.map(|_| body))
}

impl Service<HttpRequest> for ReqwestService {
    type Response = HttpResponse;
    type Error = HttpServiceError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.client.poll_ready(cx)
    }

    fn call(&mut self, req: HttpRequest) -> Self::Future {
        let cloned = self.client.clone();
        let ready = std::mem::replace(&mut self.client, cloned);
        Box::pin(send(ready, req))
    }
}

impl From<ReqwestService> for HttpService {
    fn from(service: ReqwestService) -> Self {
        BoxCloneSyncService::new(service)
    }
}
