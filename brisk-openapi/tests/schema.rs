use brisk_core::{Contract, Describe};
use brisk_openapi::{SchemaKind, SchemaMapper, SchemaNode};
use garde::Validate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[describe(skip_validation)]
#[serde(rename_all = "camelCase")]
struct Pet {
    pet_name: String,
    age: Option<u32>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(skip)]
    secret: String,
    #[serde(rename = "kind")]
    species: Species,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum Species {
    Cat,
    Dog,
    #[serde(rename = "parrot")]
    Bird,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[describe(skip_validation)]
struct Owner {
    name: String,
    pet: Pet,
    pets: Vec<Pet>,
    labels: HashMap<String, String>,
    extra: serde_json::Value,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[describe(skip_validation)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
    parent: Option<Box<TreeNode>>,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[describe(skip_validation)]
struct Paging {
    page: u32,
    #[serde(default)]
    per_page: u32,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[describe(skip_validation)]
struct Listing {
    query: String,
    #[serde(flatten)]
    paging: Paging,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema, Validate)]
struct Signup {
    #[garde(required)]
    invite: Option<String>,
    #[garde(skip)]
    note: Option<String>,
    #[garde(skip)]
    #[serde(skip_serializing_if = "String::is_empty")]
    nickname: String,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[describe(skip_validation)]
struct User {
    name: String,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[describe(skip_validation)]
struct Page<T> {
    items: Vec<T>,
    total: u32,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[describe(skip_validation)]
struct Catalog {
    users: Page<User>,
    pets: Page<Pet>,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[describe(skip_validation)]
struct Account {
    #[serde(rename(serialize = "accountId", deserialize = "id"))]
    id: String,
    #[serde(skip_deserializing)]
    created_at: String,
    #[serde(skip_serializing)]
    password: String,
}

#[derive(Serialize, Deserialize, Describe, JsonSchema)]
#[describe(skip_validation)]
struct Holder {
    account: Account,
}

fn keys(node: &SchemaNode) -> Vec<&str> {
    node.properties.keys().map(String::as_str).collect()
}

// ── Field mapping ───────────────────────────────────────────────────────────

#[test]
fn record_properties_follow_wire_names_in_declaration_order() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&Pet::shape());

    assert_eq!(schema.kind, Some(SchemaKind::Object));
    assert_eq!(keys(&schema), ["petName", "age", "tags", "kind"]);
}

#[test]
fn skipped_fields_are_absent() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&Pet::shape());
    assert!(!schema.properties.contains_key("secret"));
}

#[test]
fn scalar_and_collection_kinds() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&Pet::shape());

    assert_eq!(schema.properties["petName"].kind, Some(SchemaKind::String));
    assert_eq!(schema.properties["age"].kind, Some(SchemaKind::Integer));

    let tags = &schema.properties["tags"];
    assert_eq!(tags.kind, Some(SchemaKind::Array));
    assert_eq!(
        tags.items.as_ref().unwrap().kind,
        Some(SchemaKind::String)
    );
}

#[test]
fn unit_enum_becomes_string_enum() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&Pet::shape());

    let kind = &schema.properties["kind"];
    assert_eq!(kind.kind, Some(SchemaKind::String));
    assert_eq!(kind.variants, ["cat", "dog", "parrot"]);
}

#[test]
fn maps_and_any_are_objects() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&Owner::shape());

    assert_eq!(schema.properties["labels"].kind, Some(SchemaKind::Object));
    assert_eq!(schema.properties["extra"].kind, Some(SchemaKind::Object));
}

// ── Required policy ─────────────────────────────────────────────────────────

#[test]
fn options_and_defaults_are_not_required() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&Pet::shape());
    assert_eq!(schema.required, ["petName", "kind"]);
}

#[test]
fn garde_required_overrides_option_and_skip_if_relaxes() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&Signup::shape());
    assert_eq!(schema.required, ["invite"]);
}

// ── Components ──────────────────────────────────────────────────────────────

#[test]
fn nested_named_records_become_references() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&Owner::shape());

    let pet = &schema.properties["pet"];
    assert!(pet.is_reference());
    assert_eq!(pet.reference.as_deref(), Some("#/components/schemas/Pet"));

    let pets = &schema.properties["pets"];
    assert_eq!(pets.kind, Some(SchemaKind::Array));
    assert!(pets.items.as_ref().unwrap().is_reference());

    assert!(mapper.contains("Pet"));
    assert!(!mapper.contains("Owner"), "top-level record stays inline");
    assert_eq!(mapper.components().len(), 1);
}

#[test]
fn registering_twice_keeps_one_component() {
    let mut mapper = SchemaMapper::new();
    let shape = Pet::shape();
    let record = shape.as_record().unwrap();
    assert_eq!(mapper.register(record).as_deref(), Some("Pet"));
    assert_eq!(mapper.register(record).as_deref(), Some("Pet"));
    assert_eq!(mapper.components().len(), 1);
    assert_eq!(keys(&mapper.components()["Pet"]), ["petName", "age", "tags", "kind"]);
}

#[test]
fn self_referential_type_terminates() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&TreeNode::shape());

    let children = &schema.properties["children"];
    assert_eq!(
        children.items.as_ref().unwrap().reference.as_deref(),
        Some("#/components/schemas/TreeNode")
    );
    assert!(schema.properties["parent"].is_reference());
    assert_eq!(schema.required, ["label", "children"]);

    let component = &mapper.components()["TreeNode"];
    assert_eq!(keys(component), ["label", "children", "parent"]);
}

#[test]
fn generic_records_get_one_component_per_instantiation() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&Catalog::shape());

    let users = <Page<User> as JsonSchema>::schema_name();
    let pets = <Page<Pet> as JsonSchema>::schema_name();
    assert_eq!(users, "Page_for_User");
    assert_eq!(pets, "Page_for_Pet");

    assert_eq!(
        schema.properties["users"].reference.as_deref(),
        Some("#/components/schemas/Page_for_User")
    );
    assert_eq!(
        schema.properties["pets"].reference.as_deref(),
        Some("#/components/schemas/Page_for_Pet")
    );

    let item_ref = |name: &str| {
        mapper.components()[name].properties["items"]
            .items
            .as_ref()
            .unwrap()
            .reference
            .clone()
    };
    assert_eq!(item_ref("Page_for_User").as_deref(), Some("#/components/schemas/User"));
    assert_eq!(item_ref("Page_for_Pet").as_deref(), Some("#/components/schemas/Pet"));
    assert!(!mapper.contains("Page"));
}

#[test]
fn flattened_fields_are_inlined() {
    let mut mapper = SchemaMapper::new();
    let schema = mapper.schema_for(&Listing::shape());

    assert_eq!(keys(&schema), ["query", "page", "per_page"]);
    assert_eq!(schema.required, ["query", "page"]);
    assert!(!mapper.contains("Paging"));
}

// ── Direction ───────────────────────────────────────────────────────────────

#[test]
fn requests_and_responses_see_their_own_fields_and_keys() {
    let mut mapper = SchemaMapper::new();
    let input = mapper.schema_for(&Account::shape());
    assert_eq!(keys(&input), ["id", "password"]);

    let mut mapper = SchemaMapper::for_contract(Contract::Serialize);
    let output = mapper.schema_for(&Account::shape());
    assert_eq!(keys(&output), ["accountId", "created_at"]);
}

#[test]
fn asymmetric_records_get_a_separate_input_component() {
    let mut mapper = SchemaMapper::new();
    let input = mapper.schema_for(&Holder::shape());
    assert_eq!(
        input.properties["account"].reference.as_deref(),
        Some("#/components/schemas/Account_Input")
    );

    mapper.set_contract(Contract::Serialize);
    let output = mapper.schema_for(&Holder::shape());
    assert_eq!(
        output.properties["account"].reference.as_deref(),
        Some("#/components/schemas/Account")
    );

    assert_eq!(keys(&mapper.components()["Account_Input"]), ["id", "password"]);
    assert_eq!(keys(&mapper.components()["Account"]), ["accountId", "created_at"]);
}

#[test]
fn symmetric_records_keep_their_name_on_both_sides() {
    let mut mapper = SchemaMapper::new();
    mapper.schema_for(&Owner::shape());
    mapper.set_contract(Contract::Serialize);
    mapper.schema_for(&Owner::shape());

    assert!(mapper.contains("Pet"));
    assert!(!mapper.contains("Pet_Input"));
    assert_eq!(mapper.components().len(), 1);
}

// ── Serialization ───────────────────────────────────────────────────────────

#[test]
fn empty_parts_are_omitted_from_json() {
    let json = serde_json::to_value(SchemaNode::of(SchemaKind::String)).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "string" }));

    let json = serde_json::to_value(SchemaNode::reference("Pet")).unwrap();
    assert_eq!(json, serde_json::json!({ "$ref": "#/components/schemas/Pet" }));
}
