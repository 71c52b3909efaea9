use brisk::brisk_openapi::{OpenApiConfig, OpenApiPlugin};
use brisk::layers::{catch_panic_layer, default_cors, default_trace, init_tracing};
use brisk::{App, BriskConfig, ServerSettings};

mod greetings;

use greetings::{api_key_guard, Greetings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = BriskConfig::load("dev")?;
    let settings = ServerSettings::from_config(&config)?;
    let salutation: String = config.get_or("greeting.salutation", "Hello".to_string());
    let api_key: String = config.get_or("security.api_key", "change-me".to_string());
    let openapi = OpenApiConfig::from_config(&config)?;

    tracing::info!(profile = config.profile(), addr = %settings.addr, "Starting greeting-app");

    let greetings = Greetings::new(&salutation);

    let mut app = App::new();
    app.with_settings(&settings)
        .must_register("/", &greetings, [])
        .group("/admin", [api_key_guard(api_key)])
        .must_register("/", &greetings, []);

    app.with(OpenApiPlugin::new(openapi))
        .with_layer(default_trace())
        .with_layer(default_cors())
        .with_layer(catch_panic_layer());

    app.serve(&settings.addr).await
}
