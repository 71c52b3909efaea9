use crate::http::{Bytes, HeaderMap, HeaderName, HeaderValue, Method, Response, Uri};
use std::sync::{Arc, Mutex};

/// Per-request view handed to guards (by reference) and handlers (by value).
///
/// Reading is free of side effects. The only mutable part is the set of
/// response headers added with [`Context::set_header`], which is shared by
/// every clone of the context and merged into the final response, whatever
/// its status.
#[derive(Debug, Clone)]
pub struct Context {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: Vec<(String, String)>,
    body: Bytes,
    response_headers: Arc<Mutex<HeaderMap>>,
}

impl Context {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
            params: Vec::new(),
            body: Bytes::new(),
            response_headers: Arc::default(),
        }
    }

    /// Attach matched path parameters.
    pub fn with_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Attach the raw request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, without the query string.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a request header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw query string, empty when the URI has none.
    pub fn query_string(&self) -> &str {
        self.uri.query().unwrap_or("")
    }

    /// First value of a query parameter, percent-decoded.
    pub fn query(&self, name: &str) -> Option<String> {
        form_urlencoded::parse(self.query_string().as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// A path parameter by name (`{id}` in the route path).
    ///
    /// Linear scan; routes rarely have more than a few parameters.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Add a header to the response, replacing any earlier value.
    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        self.response_headers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name, value);
    }

    /// Copy the collected response headers onto `response`.
    pub(crate) fn apply_response_headers(&self, mut response: Response) -> Response {
        let extra = self
            .response_headers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (name, value) in extra.iter() {
            response.headers_mut().insert(name.clone(), value.clone());
        }
        response
    }
}
