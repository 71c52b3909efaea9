use brisk::prelude::*;
use brisk_test::TestApp;
use serde_json::json;

#[derive(Debug, Deserialize, Serialize, Describe, JsonSchema, Validate)]
struct GreetingQuery {
    #[garde(required, length(min = 1))]
    name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Describe, JsonSchema, Validate)]
struct Greeting {
    #[garde(skip)]
    message: String,
}

#[derive(Debug, Deserialize, Serialize, Describe, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct NewGreeting {
    #[garde(length(min = 1))]
    template_text: String,
}

async fn greet(_ctx: Context, query: GreetingQuery) -> Result<Greeting> {
    Ok(Greeting {
        message: format!("Hello, {}!", query.name.unwrap_or_default()),
    })
}

async fn save(_ctx: Context, _input: NewGreeting) -> Result<Greeting> {
    Err(Error::msg("greeting store is read-only"))
}

async fn admin(_ctx: Context, _input: In) -> Result<Out> {
    Ok("welcome".into())
}

struct Greetings;

impl Controller for Greetings {
    fn routes(&self) -> Vec<Route> {
        vec![
            endpoint::<GreetingQuery, Greeting>()
                .path("/greeting")
                .handle(greet),
            endpoint::<NewGreeting, Greeting>()
                .path("/greeting")
                .method(Method::POST)
                .handle(save),
        ]
    }
}

fn api_key() -> Middleware {
    middleware(|ctx: &Context| -> Result<()> {
        match ctx.header("x-api-key") {
            Some("letmein") => Ok(()),
            _ => Err(HttpError::unauthorized("invalid API key").into()),
        }
    })
}

fn app() -> TestApp {
    let mut app = App::new();
    app.must_register("/", &Greetings, []);
    app.group("/admin", [api_key()])
        .must_register("/", &endpoint::<In, Out>().path("/panel").handle(admin), []);
    app.with(OpenApiPlugin::new(OpenApiConfig::new("Greeter", "1.0.0")));
    TestApp::from_app(app)
}

// ── Request scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn greeting_from_query() {
    app()
        .get("/greeting?name=Ana")
        .send()
        .await
        .assert_ok()
        .assert_json_path("message", "Hello, Ana!");
}

#[tokio::test]
async fn missing_name_is_rejected() {
    let resp = app().get("/greeting").send().await.assert_unprocessable();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert_eq!(body["errors"][0]["field"], "name");
}

#[tokio::test]
async fn guard_rejects_without_key() {
    app()
        .get("/admin/panel")
        .send()
        .await
        .assert_unauthorized()
        .assert_text("invalid API key");

    app()
        .get("/admin/panel")
        .header("x-api-key", "letmein")
        .send()
        .await
        .assert_ok()
        .assert_text("\"welcome\"");
}

#[tokio::test]
async fn handler_failure_is_opaque() {
    app()
        .post("/greeting")
        .json(&json!({"templateText": "Hi {name}"}))
        .send()
        .await
        .assert_internal_error()
        .assert_empty_body();
}

// ── Documentation ───────────────────────────────────────────────────────────

#[tokio::test]
async fn document_lists_every_route() {
    let resp = app().get("/swagger.json").send().await.assert_ok();
    let doc: serde_json::Value = resp.json();

    assert_eq!(doc["info"]["title"], "Greeter");
    assert!(doc["paths"]["/greeting"]["get"].is_object());
    assert!(doc["paths"]["/greeting"]["post"].is_object());
    assert!(doc["paths"]["/admin/panel"]["get"].is_object());
    assert_eq!(
        doc["paths"]["/greeting"]["post"]["requestBody"]["content"]["application/json"]["schema"]
            ["$ref"],
        "#/components/schemas/NewGreeting"
    );
    assert_eq!(
        doc["components"]["schemas"]["NewGreeting"]["properties"]["templateText"]["type"],
        "string"
    );
    assert_eq!(doc["paths"]["/greeting"]["get"]["parameters"][0]["name"], "name");
    assert_eq!(doc["paths"]["/greeting"]["get"]["parameters"][0]["required"], true);
}

#[tokio::test]
async fn document_revalidates_with_etag() {
    let app = app();
    let first = app.get("/swagger.json").send().await.assert_ok();
    let tag = first.header("etag").unwrap().to_string();

    app.get("/swagger.json")
        .header("if-none-match", &tag)
        .send()
        .await
        .assert_not_modified()
        .assert_empty_body();
}

#[tokio::test]
async fn swagger_ui_is_served() {
    let resp = app().get("/swagger").send().await.assert_ok();
    assert!(resp.text().contains("SwaggerUIBundle"));
}
