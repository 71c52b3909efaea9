use crate::config::OpenApiConfig;
use crate::generator::OpenApiGenerator;
use brisk_core::http::routing::get;
use brisk_core::http::{
    HeaderMap, Html, IntoResponse, Json, Response, Router, StatusCode, CONTENT_TYPE, ETAG,
    IF_NONE_MATCH,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Router serving the JSON document and, if enabled, the Swagger UI page.
///
/// The document is regenerated on every request; clients that send back the
/// previous `ETag` in `If-None-Match` get an empty 304.
pub fn openapi_routes(config: &OpenApiConfig, generator: Arc<OpenApiGenerator>) -> Router {
    let mut router = Router::new().route(
        &config.json_path,
        get(move |headers: HeaderMap| {
            let generator = generator.clone();
            async move { document_response(&generator, &headers) }
        }),
    );

    if config.docs_ui {
        let page = swagger_ui_html(&config.title, &config.json_path);
        router = router.route(
            &config.ui_path,
            get(move || {
                let page = page.clone();
                async move { Html(page) }
            }),
        );
    }

    router
}

fn document_response(generator: &OpenApiGenerator, headers: &HeaderMap) -> Response {
    let json = match generator.generate_json() {
        Ok(json) => json,
        Err(err) => {
            tracing::error!(error = %err, "Failed to generate OpenAPI schema");
            let body = serde_json::json!({ "error": "Failed to generate OpenAPI schema" });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
    };

    let etag = etag_for(json.as_bytes());
    let cached = headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|candidates| etag_matches(&etag, candidates));

    if cached {
        return (StatusCode::NOT_MODIFIED, [(ETAG, etag)]).into_response();
    }

    (
        StatusCode::OK,
        [(CONTENT_TYPE, "application/json".to_string()), (ETAG, etag)],
        json,
    )
        .into_response()
}

/// Strong ETag: the quoted hex SHA-256 of `body`.
pub fn etag_for(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// `If-None-Match` check: `*`, or any listed tag equal to `etag` (weak
/// comparison, so `W/"x"` matches `"x"`).
pub fn etag_matches(etag: &str, if_none_match: &str) -> bool {
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

fn swagger_ui_html(title: &str, doc_url: &str) -> String {
    SWAGGER_UI_HTML
        .replace("__TITLE__", title)
        .replace("__DOC_URL__", doc_url)
}

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>__TITLE__</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@4.5.0/swagger-ui.css" />
    <link rel="icon" type="image/png" href="https://unpkg.com/swagger-ui-dist@4.5.0/favicon-32x32.png" sizes="32x32" />
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@4.5.0/swagger-ui-bundle.js" charset="UTF-8"></script>
    <script src="https://unpkg.com/swagger-ui-dist@4.5.0/swagger-ui-standalone-preset.js" charset="UTF-8"></script>
    <script>
        window.onload = function () {
            window.ui = SwaggerUIBundle({
                url: "__DOC_URL__",
                dom_id: "#swagger-ui",
                deepLinking: true,
                presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                plugins: [SwaggerUIBundle.plugins.DownloadUrl],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_is_quoted_sha256() {
        let tag = etag_for(b"{}");
        assert!(tag.starts_with('"') && tag.ends_with('"'));
        assert_eq!(tag.len(), 64 + 2);
        assert_eq!(tag, etag_for(b"{}"));
        assert_ne!(tag, etag_for(b"[]"));
    }

    #[test]
    fn if_none_match_forms() {
        let tag = "\"abc\"";
        assert!(etag_matches(tag, "\"abc\""));
        assert!(etag_matches(tag, "*"));
        assert!(etag_matches(tag, "\"zzz\", \"abc\""));
        assert!(etag_matches(tag, "W/\"abc\""));
        assert!(!etag_matches(tag, "\"abd\""));
    }

    #[test]
    fn ui_page_points_at_json_path() {
        let page = swagger_ui_html("Pets", "/api/swagger.json");
        assert!(page.contains("url: \"/api/swagger.json\""));
        assert!(page.contains("<title>Pets</title>"));
    }
}
