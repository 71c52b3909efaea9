//! Schema Generator: accumulates routes and renders the OpenAPI document.

use crate::document::{
    json_content, Components, Info, OpenApiDocument, Operation, Parameter, ParameterLocation,
    RequestBody, ResponseObject, Tag, OPENAPI_VERSION,
};
use crate::schema::{wire_fields, SchemaKind, SchemaMapper, SchemaNode};
use brisk_core::http::Method;
use brisk_core::{Contract, Route, TypeShape};
use std::collections::BTreeMap;

/// Collects routes during registration and builds documents on demand.
///
/// Registration needs `&mut self`; generation is `&self` and builds its
/// component table from scratch each time, so a shared generator can serve
/// concurrent requests.
#[derive(Debug)]
pub struct OpenApiGenerator {
    info: Info,
    /// Keyed by (path, lowercase method).
    routes: BTreeMap<(String, String), Route>,
    path_tags: BTreeMap<String, Vec<String>>,
    tags: BTreeMap<String, Tag>,
}

impl OpenApiGenerator {
    pub fn new(info: Info) -> Self {
        Self {
            info,
            routes: BTreeMap::new(),
            path_tags: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Document `route` as served at `path` (the full, joined path).
    ///
    /// Registering the same (path, method) again replaces the earlier route.
    pub fn register(&mut self, path: &str, route: &Route) {
        let method = route.method().as_str().to_lowercase();
        self.routes
            .insert((path.to_string(), method), route.clone());
        self.infer_tags(path);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    /// First literal segment gives the primary tag, the second a compound
    /// one ("Admin Users"). `{param}` segments are ignored.
    fn infer_tags(&mut self, path: &str) {
        let literals: Vec<&str> = path
            .split('/')
            .filter(|s| !s.is_empty() && !is_param(s))
            .take(2)
            .collect();

        let names: Vec<String> = match literals.as_slice() {
            [] => return,
            [primary] => vec![title_case(primary)],
            [primary, second, ..] => vec![
                title_case(primary),
                title_case(&format!("{primary} {second}")),
            ],
        };

        for name in &names {
            self.tags.entry(name.clone()).or_insert_with(|| Tag {
                name: name.clone(),
                description: format!("Operations related to {name}"),
            });
        }
        self.path_tags.insert(path.to_string(), names);
    }

    /// Build the document for every registered route.
    pub fn generate_schema(&self) -> OpenApiDocument {
        let mut mapper = SchemaMapper::new();
        let mut paths: BTreeMap<String, BTreeMap<String, Operation>> = BTreeMap::new();

        for ((path, method), route) in &self.routes {
            let operation = self.operation(&mut mapper, path, method, route);
            paths
                .entry(path.clone())
                .or_default()
                .insert(method.clone(), operation);
        }

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info.clone(),
            paths,
            components: Components {
                schemas: mapper.into_components(),
            },
            tags: self.tags.values().cloned().collect(),
        }
    }

    /// The document as pretty-printed JSON.
    pub fn generate_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.generate_schema())
    }

    fn operation(
        &self,
        mapper: &mut SchemaMapper,
        path: &str,
        method: &str,
        route: &Route,
    ) -> Operation {
        let mut parameters = path_parameters(path);
        let mut request_body = None;

        mapper.set_contract(Contract::Deserialize);
        let input = route.input_shape();
        if let Some(record) = input.as_record() {
            if *route.method() == Method::GET {
                for field in wire_fields(record, Contract::Deserialize) {
                    parameters.push(Parameter {
                        name: field.key_for(Contract::Deserialize).to_string(),
                        location: ParameterLocation::Query,
                        required: field.is_required(),
                        schema: mapper.nested_schema(&field.resolve()),
                    });
                }
            } else if let Some(name) = mapper.register(record) {
                request_body = Some(RequestBody {
                    content: json_content(SchemaNode::reference(&name)),
                    required: true,
                });
            }
        }

        mapper.set_contract(Contract::Serialize);
        let mut responses = BTreeMap::new();
        responses.insert(
            "200".to_string(),
            ResponseObject::json("Successful operation", response_schema(mapper, &route.output_shape())),
        );
        responses.insert("400".to_string(), ResponseObject::empty("Bad request"));
        responses.insert("422".to_string(), ResponseObject::empty("Validation error"));
        responses.insert("500".to_string(), ResponseObject::empty("Internal server error"));

        Operation {
            operation_id: operation_id(method, path),
            tags: self.path_tags.get(path).cloned().unwrap_or_default(),
            parameters,
            request_body,
            responses,
        }
    }
}

/// `$ref` for a named record, the inline schema for anything else.
fn response_schema(mapper: &mut SchemaMapper, shape: &TypeShape) -> SchemaNode {
    match shape.as_record() {
        Some(record) if record.name.is_some() => mapper.nested_schema(shape),
        _ => mapper.schema_for(shape),
    }
}

fn path_parameters(path: &str) -> Vec<Parameter> {
    path.split('/')
        .filter(|s| is_param(s))
        .map(|segment| Parameter {
            name: segment
                .trim_start_matches('{')
                .trim_end_matches('}')
                .trim_start_matches('*')
                .to_string(),
            location: ParameterLocation::Path,
            required: true,
            schema: SchemaNode::of(SchemaKind::String),
        })
        .collect()
}

fn is_param(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

/// `get` + `/pet/{petId}` -> `get_pet_petId`.
pub fn operation_id(method: &str, path: &str) -> String {
    let flattened: String = path
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .map(|c| if c == '/' { '_' } else { c })
        .collect();
    format!("{}{}", method.to_lowercase(), flattened)
}

/// `api-users` -> `Api Users`.
pub fn title_case(raw: &str) -> String {
    raw.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_ids() {
        assert_eq!(operation_id("GET", "/pet/{petId}"), "get_pet_petId");
        assert_eq!(operation_id("post", "/admin/users"), "post_admin_users");
    }

    #[test]
    fn title_case_splits_separators() {
        assert_eq!(title_case("api-users"), "Api Users");
        assert_eq!(title_case("order_items"), "Order Items");
        assert_eq!(title_case("admin users"), "Admin Users");
    }

    #[test]
    fn path_params_are_required_strings() {
        let params = path_parameters("/pets/{id}/files/{*rest}");
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["id", "rest"]);
        assert!(params.iter().all(|p| p.required && p.location == ParameterLocation::Path));
    }
}
