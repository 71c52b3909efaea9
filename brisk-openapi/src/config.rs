use crate::document::Info;
use brisk_core::{BriskConfig, ConfigError};

/// Configuration for the generated document and its HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenApiConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    /// Where the JSON document is served. Default `/swagger.json`.
    pub json_path: String,
    /// Where the Swagger UI page is served. Default `/swagger`.
    pub ui_path: String,
    pub docs_ui: bool,
}

impl OpenApiConfig {
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            title: title.to_string(),
            version: version.to_string(),
            description: None,
            json_path: "/swagger.json".to_string(),
            ui_path: "/swagger".to_string(),
            docs_ui: true,
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_json_path(mut self, path: &str) -> Self {
        self.json_path = path.to_string();
        self
    }

    pub fn with_ui_path(mut self, path: &str) -> Self {
        self.ui_path = path.to_string();
        self
    }

    pub fn with_docs_ui(mut self, enabled: bool) -> Self {
        self.docs_ui = enabled;
        self
    }

    /// Read `openapi.*` keys; anything missing keeps its default.
    ///
    /// ```yaml
    /// openapi:
    ///   title: Pet Store
    ///   version: 2.1.0
    ///   json_path: /api/swagger.json
    ///   docs_ui: false
    /// ```
    pub fn from_config(config: &BriskConfig) -> Result<Self, ConfigError> {
        let defaults = Self::new("API", "1.0.0");
        Ok(Self {
            title: config.get_optional("openapi.title")?.unwrap_or(defaults.title),
            version: config
                .get_optional("openapi.version")?
                .unwrap_or(defaults.version),
            description: config.get_optional("openapi.description")?,
            json_path: config
                .get_optional("openapi.json_path")?
                .unwrap_or(defaults.json_path),
            ui_path: config
                .get_optional("openapi.ui_path")?
                .unwrap_or(defaults.ui_path),
            docs_ui: config
                .get_optional("openapi.docs_ui")?
                .unwrap_or(defaults.docs_ui),
        })
    }

    /// The document's `info` block.
    pub fn info(&self) -> Info {
        Info {
            title: self.title.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
        }
    }
}
