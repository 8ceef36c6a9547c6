//! [`tower::Layer`] that adds a fixed set of headers to every request

use http::HeaderMap;
use tower::{Layer, Service};

/// Produces [`ExtendHeaders`] services carrying `headers`
#[derive(Clone, Debug, Default)]
pub struct ExtendHeadersLayer {
    headers: HeaderMap,
}

impl ExtendHeadersLayer {
    /// Creates a layer that will add `headers` to each request
    pub fn new(headers: impl Into<HeaderMap>) -> ExtendHeadersLayer {
        ExtendHeadersLayer {
            headers: headers.into(),
        }
    }
}

impl<S> Layer<S> for ExtendHeadersLayer {
    type Service = ExtendHeaders<S>;
    fn layer(&self, inner: S) -> Self::Service {
        ExtendHeaders::new(self.headers.clone(), inner)
    }
}

/// Service that overwrites request headers with the configured ones before
/// handing the request to `inner`
#[derive(Clone, Debug)]
pub struct ExtendHeaders<S> {
    headers: HeaderMap,
    inner: S,
}

impl<S> ExtendHeaders<S> {
    /// Wraps `inner`
    pub const fn new(headers: HeaderMap, inner: S) -> ExtendHeaders<S> {
        ExtendHeaders { headers, inner }
    }
}

impl<Req, S> Service<http::Request<Req>> for ExtendHeaders<S>
where
    S: Service<http::Request<Req>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<Req>) -> Self::Future {
        for (name, value) in self.headers.iter() {
            req.headers_mut().insert(name.clone(), value.clone());
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, HeaderValue};
    use speculoos::prelude::*;
    use tower::{ServiceBuilder, ServiceExt};
    use tower_test::mock;

    use super::ExtendHeadersLayer;

    #[tokio::test]
    async fn configured_headers_replace_request_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("service:abc:123"));
        headers.insert("a", HeaderValue::from_static("2"));

        let (mock_service, mut handle) = mock::pair::<http::Request<()>, ()>();
        let service = ServiceBuilder::new()
            .layer(ExtendHeadersLayer::new(headers))
            .service(mock_service);

        let request = http::Request::builder()
            .header("a", "1")
            .header("b", "3")
            .body(())
            .unwrap();

        let call = tokio::spawn(service.oneshot(request));

        let (actual, send_response) = handle.next_request().await.unwrap();
        assert_that!(actual.headers().get("x-api-key"))
            .is_some()
            .is_equal_to(&HeaderValue::from_static("service:abc:123"));
        assert_that!(actual.headers().get_all("a").iter().count()).is_equal_to(1);
        assert_that!(actual.headers().get("a"))
            .is_some()
            .is_equal_to(&HeaderValue::from_static("2"));
        assert_that!(actual.headers().get("b"))
            .is_some()
            .is_equal_to(&HeaderValue::from_static("3"));
        send_response.send_response(());

        assert_that!(call.await.unwrap()).is_ok();
    }
}
