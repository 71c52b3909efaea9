//! Type-Schema Mapper: [`TypeShape`] to OpenAPI schema objects.
//!
//! Named records are stored once in a component table and referenced with
//! `$ref` from everywhere else. A name is reserved before its fields are
//! mapped, so self-referential types terminate.
//!
//! The mapper reads shapes for one [`Contract`] at a time: request bodies and
//! query parameters are deserialized, responses serialized. A record that
//! reads differently on the two sides gets a separate `<Name>_Input`
//! component for requests.

use brisk_core::{Contract, FieldShape, RecordShape, TypeShape};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Prefix of every component reference.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Boolean,
    Integer,
    Number,
}

/// One OpenAPI schema object (the subset this crate emits).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,
    /// Declaration order is kept.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
}

impl SchemaNode {
    pub fn of(kind: SchemaKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("{COMPONENTS_PREFIX}{name}")),
            ..Self::default()
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        Self {
            kind: Some(SchemaKind::Array),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }
}

/// Suffix of components describing the request side of an asymmetric record.
pub const INPUT_SUFFIX: &str = "_Input";

/// Maps shapes to schemas, accumulating named records as components.
#[derive(Debug, Default)]
pub struct SchemaMapper {
    components: BTreeMap<String, SchemaNode>,
    contract: Contract,
}

impl SchemaMapper {
    /// A mapper for request shapes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_contract(contract: Contract) -> Self {
        Self {
            contract,
            ..Self::default()
        }
    }

    /// Switch sides; components already mapped are kept.
    pub fn set_contract(&mut self, contract: Contract) {
        self.contract = contract;
    }

    pub fn contract(&self) -> Contract {
        self.contract
    }

    /// Component name of `record` under the current contract.
    pub fn component_name(&self, record: &RecordShape) -> Option<String> {
        let name = record.name.as_deref()?;
        if self.contract == Contract::Deserialize && record.differs_by_contract() {
            Some(format!("{name}{INPUT_SUFFIX}"))
        } else {
            Some(name.to_owned())
        }
    }

    /// Schema for `shape`. A top-level record is returned inline; records
    /// nested inside it become references.
    pub fn schema_for(&mut self, shape: &TypeShape) -> SchemaNode {
        match shape {
            TypeShape::Optional(inner) => self.schema_for(inner),
            TypeShape::Record(record) => self.record_schema(record),
            TypeShape::Sequence(inner) => SchemaNode::array(self.nested_schema(inner)),
            TypeShape::Map(_) | TypeShape::Any => SchemaNode::of(SchemaKind::Object),
            TypeShape::String => SchemaNode::of(SchemaKind::String),
            TypeShape::Boolean => SchemaNode::of(SchemaKind::Boolean),
            TypeShape::Integer => SchemaNode::of(SchemaKind::Integer),
            TypeShape::Number => SchemaNode::of(SchemaKind::Number),
            TypeShape::Enum(e) => SchemaNode {
                variants: e.variants.iter().map(|v| v.to_string()).collect(),
                ..SchemaNode::of(SchemaKind::String)
            },
        }
    }

    /// Schema for a value nested in another: named records become `$ref`s.
    pub fn nested_schema(&mut self, shape: &TypeShape) -> SchemaNode {
        match shape.unwrap_optional() {
            TypeShape::Record(record) => match self.register(record) {
                Some(name) => SchemaNode::reference(&name),
                None => self.record_schema(record),
            },
            TypeShape::Sequence(inner) => SchemaNode::array(self.nested_schema(inner)),
            other => self.schema_for(other),
        }
    }

    /// Add a named `record` to the component table and return its component
    /// name. Known names are not mapped again; anonymous records give `None`.
    pub fn register(&mut self, record: &RecordShape) -> Option<String> {
        let name = self.component_name(record)?;
        if !self.components.contains_key(&name) {
            self.components
                .insert(name.clone(), SchemaNode::of(SchemaKind::Object));
            let schema = self.record_schema(record);
            self.components.insert(name.clone(), schema);
        }
        Some(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn components(&self) -> &BTreeMap<String, SchemaNode> {
        &self.components
    }

    pub fn into_components(self) -> BTreeMap<String, SchemaNode> {
        self.components
    }

    fn record_schema(&mut self, record: &RecordShape) -> SchemaNode {
        let mut node = SchemaNode::of(SchemaKind::Object);
        self.collect_fields(record, &mut node);
        node
    }

    fn collect_fields(&mut self, record: &RecordShape, node: &mut SchemaNode) {
        let contract = self.contract;
        for field in record.visible_fields(contract) {
            let shape = field.resolve();
            if field.flatten {
                if let Some(inner) = shape.as_record() {
                    self.collect_fields(inner, node);
                }
                continue;
            }
            let key = field.key_for(contract).to_string();
            let schema = self.nested_schema(&shape);
            node.properties.insert(key.clone(), schema);
            if field.is_required() {
                node.required.push(key);
            }
        }
    }
}

/// Fields of a record on the wire for `contract`, with `flatten` fields
/// expanded in place.
pub fn wire_fields(record: &RecordShape, contract: Contract) -> Vec<FieldShape> {
    let mut out = Vec::new();
    for field in record.visible_fields(contract) {
        if field.flatten {
            if let Some(inner) = field.resolve().as_record() {
                out.extend(wire_fields(inner, contract));
            }
        } else {
            out.push(*field);
        }
    }
    out
}
