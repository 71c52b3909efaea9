use brisk_core::http::{Body, HeaderName, HeaderValue, Method, Router, StatusCode};
use brisk_core::{
    endpoint, join_paths, middleware, App, Context, Controller, Describe, In, Middleware,
    RegistrationError, Result, Route,
};
use garde::Validate;
use http::Request;
use http_body_util::BodyExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Debug, Serialize, Deserialize, Describe, JsonSchema, Validate)]
struct Item {
    #[garde(skip)]
    id: u32,
}

async fn ok(_ctx: Context, _input: In) -> Result<String> {
    Ok("ok".into())
}

async fn not_a_record(_ctx: Context, input: u32) -> Result<u32> {
    Ok(input)
}

struct ItemController;

impl Controller for ItemController {
    fn routes(&self) -> Vec<Route> {
        vec![
            endpoint::<In, String>().path("/items").handle(ok),
            endpoint::<In, String>()
                .path("/items/{id}")
                .method(Method::DELETE)
                .handle(ok),
        ]
    }
}

/// A guard that appends `name` to a shared trace and always passes.
fn tracing_guard(name: &'static str, trace: &Arc<Mutex<Vec<&'static str>>>) -> Middleware {
    let trace = trace.clone();
    middleware(move |_: &Context| -> Result<()> {
        trace.lock().unwrap().push(name);
        Ok(())
    })
}

async fn status_of(router: Router, method: &str, uri: &str) -> StatusCode {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    router.oneshot(req).await.unwrap().status()
}

fn paths(app: &App) -> Vec<(Method, String)> {
    app.routes()
        .iter()
        .map(|r| (r.method().clone(), r.path.clone()))
        .collect()
}

// ── Path joining ────────────────────────────────────────────────────────────

#[test]
fn join_normalizes_slashes() {
    assert_eq!(join_paths(["api", "/v1/", "/items"]), "/api/v1/items");
    assert_eq!(join_paths(["/", "/"]), "/");
}

// ── Registration ────────────────────────────────────────────────────────────

#[test]
fn controller_routes_are_prefixed() {
    let mut app = App::new();
    app.must_register("/api", &ItemController, []);

    assert_eq!(
        paths(&app),
        [
            (Method::GET, "/api/items".to_string()),
            (Method::DELETE, "/api/items/{id}".to_string()),
        ]
    );
}

#[tokio::test]
async fn methods_on_one_path_share_a_router_entry() {
    let mut app = App::new();
    app.must_register("/api", &ItemController, []);
    let router = app.build();

    assert_eq!(status_of(router.clone(), "GET", "/api/items").await, StatusCode::OK);
    assert_eq!(status_of(router.clone(), "DELETE", "/api/items/3").await, StatusCode::OK);
    assert_eq!(
        status_of(router.clone(), "POST", "/api/items").await,
        StatusCode::METHOD_NOT_ALLOWED
    );
    assert_eq!(status_of(router, "GET", "/nope").await, StatusCode::NOT_FOUND);
}

#[test]
fn duplicate_route_is_rejected() {
    let mut app = App::new();
    app.must_register("/api", &ItemController, []);

    let err = app.try_register("/api/", &ItemController, []).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::DuplicateRoute {
            method: Method::GET,
            path: "/api/items".into(),
        }
    );
}

#[test]
fn duplicate_within_one_batch_is_rejected() {
    let twice = vec![
        endpoint::<In, String>().path("/a").handle(ok),
        endpoint::<In, String>().path("a/").handle(ok),
    ];
    let mut app = App::new();
    let err = app.try_register("/", &twice, []).unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateRoute { .. }));
    assert!(app.routes().is_empty());
}

#[test]
fn failed_batch_registers_nothing() {
    let mixed = vec![
        endpoint::<In, String>().path("/fine").handle(ok),
        endpoint::<In, String>().path("/bad/:id").handle(ok),
    ];
    let mut app = App::new();
    let err = app.try_register("/", &mixed, []).unwrap_err();

    assert_eq!(
        err,
        RegistrationError::InvalidPath {
            path: "/bad/:id".into(),
            segment: ":id".into(),
        }
    );
    assert!(app.routes().is_empty());
    app.must_register("/", &mixed[0], []);
    assert_eq!(app.routes().len(), 1);
}

#[test]
fn non_record_input_is_rejected() {
    let route = endpoint::<u32, u32>()
        .path("/square")
        .method(Method::POST)
        .handle(not_a_record);
    let mut app = App::new();
    let err = app.try_register("/", &route, []).unwrap_err();

    assert_eq!(
        err,
        RegistrationError::NotARecord {
            method: Method::POST,
            path: "/square".into(),
            found: "integer",
        }
    );
    assert!(err.to_string().contains("named fields"));
}

#[test]
fn unroutable_method_is_rejected() {
    let method = Method::from_bytes(b"PURGE").unwrap();
    let route = endpoint::<In, String>().method(method).handle(ok);
    let mut app = App::new();
    let err = app.try_register("/cache", &route, []).unwrap_err();
    assert!(matches!(err, RegistrationError::UnsupportedMethod { .. }));
}

#[test]
#[should_panic(expected = "failed to register routes")]
fn must_register_panics_on_fault() {
    let mut app = App::new();
    app.must_register("/", &endpoint::<In, String>().path("/a b").handle(ok), []);
}

#[test]
fn named_record_routes_register() {
    async fn fetch(_ctx: Context, item: Item) -> Result<Item> {
        Ok(item)
    }
    let mut app = App::new();
    app.must_register("/", &endpoint::<Item, Item>().path("/item").handle(fetch), []);
    assert_eq!(app.routes()[0].route.input_shape().name(), Some("Item"));
}

// ── Groups ──────────────────────────────────────────────────────────────────

#[test]
fn nested_groups_equal_direct_registration() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let outer = tracing_guard("outer", &trace);
    let inner = tracing_guard("inner", &trace);
    let call = tracing_guard("call", &trace);

    let mut grouped = App::new();
    grouped
        .group("/api", [outer.clone()])
        .group("v1", [inner.clone()])
        .must_register("/shop", &ItemController, [call.clone()]);

    let mut direct = App::new();
    direct.must_register("/api/v1/shop", &ItemController, [outer, inner, call]);

    assert_eq!(paths(&grouped), paths(&direct));
    for (g, d) in grouped.routes().iter().zip(direct.routes()) {
        assert_eq!(g.middlewares.len(), d.middlewares.len());
        for (a, b) in g.middlewares.iter().zip(&d.middlewares) {
            assert!(Arc::ptr_eq(a, b));
        }
    }
}

#[tokio::test]
async fn guard_chain_runs_outer_to_inner_then_route() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let route = endpoint::<In, String>()
        .path("/ping")
        .middlewares([tracing_guard("route", &trace)])
        .handle(ok);

    let mut app = App::new();
    app.group("/a", [tracing_guard("group-a", &trace)])
        .group("/b", [tracing_guard("group-b", &trace)])
        .must_register("/", &route, [tracing_guard("call", &trace)]);

    assert_eq!(app.routes()[0].path, "/a/b/ping");
    assert_eq!(status_of(app.build(), "GET", "/a/b/ping").await, StatusCode::OK);
    assert_eq!(
        *trace.lock().unwrap(),
        ["group-a", "group-b", "call", "route"]
    );
}

#[test]
fn group_prefix_is_normalized() {
    let mut app = App::new();
    let group = app.group("api/", []);
    assert_eq!(group.prefix(), "/api");
}

// ── Builder options ─────────────────────────────────────────────────────────

#[tokio::test]
async fn layers_and_base_router_are_applied() {
    use brisk_core::http::routing::get;

    let mut app = App::new();
    app.with_router(Router::new().route("/health", get(|| async { "up" })))
        .must_register("/", &ItemController, [])
        .with_layer_fn(|router| {
            router.layer(tower::util::MapResponseLayer::new(
                |mut res: brisk_core::http::Response| {
                    res.headers_mut().insert(
                        HeaderName::from_static("x-layered"),
                        HeaderValue::from_static("1"),
                    );
                    res
                },
            ))
        });
    let router = app.build();

    let res = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.headers()["x-layered"], "1");
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"up");

    assert_eq!(status_of(router, "GET", "/items").await, StatusCode::OK);
}

#[tokio::test]
async fn meta_consumers_see_every_route() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut app = App::new();
    app.must_register("/api", &ItemController, [])
        .with_meta_consumer(move |routes| {
            sink.lock()
                .unwrap()
                .extend(routes.iter().map(|r| r.path.clone()));
            Router::new()
        });
    let _ = app.build();

    assert_eq!(*seen.lock().unwrap(), ["/api/items", "/api/items/{id}"]);
}
