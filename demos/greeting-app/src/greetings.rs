use brisk::prelude::*;
use std::sync::Arc;

#[derive(Debug, Deserialize, Serialize, Describe, JsonSchema, Validate)]
pub struct GreetingQuery {
    #[garde(required, length(min = 1, max = 64))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Describe, JsonSchema, Validate)]
pub struct Greeting {
    #[garde(length(min = 1))]
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize, Describe, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSalutation {
    #[garde(length(min = 1, max = 32))]
    pub salutation: String,
    #[garde(skip)]
    #[serde(default)]
    pub shout: bool,
}

#[derive(Debug, Deserialize, Serialize, Describe, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Casual,
}

#[derive(Debug, Deserialize, Serialize, Describe, JsonSchema, Validate)]
pub struct Stats {
    #[garde(skip)]
    pub salutation: String,
    #[garde(skip)]
    pub tone: Tone,
    #[garde(skip)]
    pub supported: Vec<String>,
}

/// Greeting routes sharing one configured salutation.
pub struct Greetings {
    salutation: Arc<str>,
}

impl Greetings {
    pub fn new(salutation: &str) -> Self {
        Self {
            salutation: Arc::from(salutation),
        }
    }
}

impl Controller for Greetings {
    fn routes(&self) -> Vec<Route> {
        let salutation = self.salutation.clone();
        let greet = endpoint::<GreetingQuery, Greeting>()
            .path("/greeting")
            .handle(move |_ctx, query| {
                let salutation = salutation.clone();
                async move {
                    let name = query.name.unwrap_or_default();
                    Ok::<_, Error>(Greeting {
                        message: format!("{salutation}, {name}!"),
                    })
                }
            });

        // Writes are not supported yet; the handler error becomes an opaque 500.
        let update = endpoint::<NewSalutation, Greeting>()
            .path("/greeting")
            .method(Method::POST)
            .handle(|_ctx, _input| async move {
                Err::<Greeting, _>(Error::msg("salutation store is read-only"))
            });

        let salutation = self.salutation.clone();
        let stats = endpoint::<In, Stats>()
            .path("/greeting/stats")
            .handle(move |_ctx, _input| {
                let salutation = salutation.to_string();
                async move {
                    Ok::<_, Error>(Stats {
                        salutation,
                        tone: Tone::Casual,
                        supported: vec!["en".into()],
                    })
                }
            });

        vec![greet, update, stats]
    }
}

/// Reject requests whose `X-Api-Key` header differs from `expected`.
pub fn api_key_guard(expected: String) -> Middleware {
    middleware(move |ctx: &Context| -> Result<()> {
        match ctx.header("x-api-key") {
            Some(key) if key == expected => Ok(()),
            _ => Err(HttpError::unauthorized("invalid API key").into()),
        }
    })
}
