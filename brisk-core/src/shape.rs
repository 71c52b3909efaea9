//! Type shapes: a static description of how a type serializes.
//!
//! [`Describe`] is implemented for the std scalar and collection types here and
//! derived for user records and enums with `#[derive(Describe)]`. The derive
//! reads `serde` attributes, so a shape always matches the wire format on
//! both sides of serde, and takes type names from `schemars`.
//!
//! Both the request pipeline (to decide whether an output is a record and to
//! translate validation paths) and the schema generator walk these shapes.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

/// Types that can describe their serialized structure.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Describe`",
    label = "this type has no shape",
    note = "add `#[derive(Describe)]` to your struct or enum"
)]
pub trait Describe {
    fn shape() -> TypeShape;
}

/// Structural description of a type.
#[derive(Debug, Clone)]
pub enum TypeShape {
    String,
    Boolean,
    Integer,
    Number,
    /// `Option<T>`: the value may be absent or null.
    Optional(Box<TypeShape>),
    /// Any list-like collection.
    Sequence(Box<TypeShape>),
    /// String-keyed map; carries the value shape.
    Map(Box<TypeShape>),
    /// Enum made only of unit variants, serialized as strings.
    Enum(EnumShape),
    /// Struct with named fields.
    Record(RecordShape),
    /// Anything without a more precise description.
    Any,
}

impl TypeShape {
    /// Strip every `Optional` layer.
    pub fn unwrap_optional(&self) -> &TypeShape {
        let mut shape = self;
        while let TypeShape::Optional(inner) = shape {
            shape = inner;
        }
        shape
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeShape::Optional(_))
    }

    /// True when the type (ignoring `Option`) is a struct with named fields.
    pub fn is_record(&self) -> bool {
        matches!(self.unwrap_optional(), TypeShape::Record(_))
    }

    /// The record behind this shape, ignoring `Option`.
    pub fn as_record(&self) -> Option<&RecordShape> {
        match self.unwrap_optional() {
            TypeShape::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Schema name for records and enums, one per generic instantiation
    /// (`Page_for_User`).
    pub fn name(&self) -> Option<&str> {
        match self.unwrap_optional() {
            TypeShape::Record(record) => record.name.as_deref(),
            TypeShape::Enum(e) => Some(e.name.as_ref()),
            _ => None,
        }
    }

    /// Shape of the elements (sequences) or values (maps).
    pub fn element(&self) -> Option<&TypeShape> {
        match self.unwrap_optional() {
            TypeShape::Sequence(inner) | TypeShape::Map(inner) => Some(inner),
            _ => None,
        }
    }

    /// Short label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TypeShape::String => "string",
            TypeShape::Boolean => "boolean",
            TypeShape::Integer => "integer",
            TypeShape::Number => "number",
            TypeShape::Optional(_) => "optional",
            TypeShape::Sequence(_) => "sequence",
            TypeShape::Map(_) => "map",
            TypeShape::Enum(_) => "enum",
            TypeShape::Record(_) => "record",
            TypeShape::Any => "any",
        }
    }
}

/// Which side of serde a shape is read for.
///
/// Request inputs are deserialized and responses serialized; a field can
/// look different on each side (`skip_deserializing`, split `rename`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Contract {
    #[default]
    Deserialize,
    Serialize,
}

/// A unit-variant enum.
#[derive(Debug, Clone)]
pub struct EnumShape {
    pub name: Cow<'static, str>,
    /// Serialized variant names, in declaration order.
    pub variants: Vec<&'static str>,
}

/// A struct with named fields.
#[derive(Debug, Clone)]
pub struct RecordShape {
    /// `None` for anonymous records such as the [`In`](crate::In) placeholder.
    pub name: Option<Cow<'static, str>>,
    pub fields: Vec<FieldShape>,
}

impl RecordShape {
    pub fn anonymous(fields: Vec<FieldShape>) -> Self {
        Self { name: None, fields }
    }

    pub fn named(name: impl Into<Cow<'static, str>>, fields: Vec<FieldShape>) -> Self {
        Self {
            name: Some(name.into()),
            fields,
        }
    }

    /// Fields that appear on the wire for `contract`.
    pub fn visible_fields(&self, contract: Contract) -> impl Iterator<Item = &FieldShape> {
        self.fields.iter().filter(move |f| f.is_visible(contract))
    }

    /// Look a field up by its Rust member name.
    pub fn field_by_member(&self, member: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|f| f.member == member)
    }

    /// True when this record, or any record reachable from it, has a field
    /// whose key or presence depends on the direction.
    pub fn differs_by_contract(&self) -> bool {
        let mut seen = BTreeSet::new();
        record_differs(self, &mut seen)
    }
}

fn record_differs(record: &RecordShape, seen: &mut BTreeSet<String>) -> bool {
    if let Some(name) = &record.name {
        if !seen.insert(name.to_string()) {
            return false;
        }
    }
    record.fields.iter().any(|field| {
        let asymmetric =
            field.key != field.input_key || field.skip_serializing != field.skip_deserializing;
        asymmetric || (!field.is_skipped() && shape_differs(&field.resolve(), seen))
    })
}

fn shape_differs(shape: &TypeShape, seen: &mut BTreeSet<String>) -> bool {
    match shape {
        TypeShape::Optional(inner) | TypeShape::Sequence(inner) | TypeShape::Map(inner) => {
            shape_differs(inner, seen)
        }
        TypeShape::Record(record) => record_differs(record, seen),
        _ => false,
    }
}

/// One field of a [`RecordShape`].
///
/// The field's own shape is resolved lazily so that self-referential types
/// (`struct Node { children: Vec<Node> }`) have a finite description.
#[derive(Debug, Clone, Copy)]
pub struct FieldShape {
    /// Rust member name.
    pub member: &'static str,
    /// Key written when serializing, after `rename` / `rename_all`.
    pub key: &'static str,
    /// Key read when deserializing.
    pub input_key: &'static str,
    pub skip_serializing: bool,
    pub skip_deserializing: bool,
    /// `#[serde(flatten)]`: the inner record's fields are inlined.
    pub flatten: bool,
    /// `#[serde(default)]`: may be absent from input.
    pub defaulted: bool,
    /// `skip_serializing_if`: may be absent from output.
    pub skip_if: bool,
    /// A validation rule demands a value (`#[garde(required)]`).
    pub force_required: bool,
    pub shape: fn() -> TypeShape,
}

impl FieldShape {
    pub fn new(member: &'static str, shape: fn() -> TypeShape) -> Self {
        Self {
            member,
            key: member,
            input_key: member,
            skip_serializing: false,
            skip_deserializing: false,
            flatten: false,
            defaulted: false,
            skip_if: false,
            force_required: false,
            shape,
        }
    }

    /// Same key on both sides.
    pub fn key(mut self, key: &'static str) -> Self {
        self.key = key;
        self.input_key = key;
        self
    }

    /// Key read when deserializing, when it differs from [`key`](Self::key).
    pub fn input_key(mut self, key: &'static str) -> Self {
        self.input_key = key;
        self
    }

    /// `#[serde(skip)]`: gone from both sides.
    pub fn skipped(self) -> Self {
        self.skip_serializing().skip_deserializing()
    }

    pub fn skip_serializing(mut self) -> Self {
        self.skip_serializing = true;
        self
    }

    pub fn skip_deserializing(mut self) -> Self {
        self.skip_deserializing = true;
        self
    }

    pub fn flattened(mut self) -> Self {
        self.flatten = true;
        self
    }

    pub fn defaulted(mut self) -> Self {
        self.defaulted = true;
        self
    }

    pub fn skip_if(mut self) -> Self {
        self.skip_if = true;
        self
    }

    pub fn force_required(mut self) -> Self {
        self.force_required = true;
        self
    }

    /// Resolve the field's shape.
    pub fn resolve(&self) -> TypeShape {
        (self.shape)()
    }

    /// Wire key for `contract`.
    pub fn key_for(&self, contract: Contract) -> &'static str {
        match contract {
            Contract::Deserialize => self.input_key,
            Contract::Serialize => self.key,
        }
    }

    pub fn is_visible(&self, contract: Contract) -> bool {
        match contract {
            Contract::Deserialize => !self.skip_deserializing,
            Contract::Serialize => !self.skip_serializing,
        }
    }

    /// Neither side ever sees the field.
    pub fn is_skipped(&self) -> bool {
        self.skip_serializing && self.skip_deserializing
    }

    /// Whether the field is always present on the wire.
    ///
    /// `Option` fields are never required, nor are fields either side may
    /// omit (a serde default on input, `skip_serializing_if` on output). A
    /// validation rule that requires a value overrides both.
    pub fn is_required(&self) -> bool {
        self.force_required
            || (!self.defaulted && !self.skip_if && !self.resolve().is_optional())
    }
}

// ── Std impls ──────────────────────────────────────────────────────────

macro_rules! describe_as {
    ($variant:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn shape() -> TypeShape {
                    TypeShape::$variant
                }
            }
        )+
    };
}

describe_as!(String: String, str, char);
describe_as!(Boolean: bool);
describe_as!(Integer: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_as!(Number: f32, f64);
describe_as!(Any: (), serde_json::Value);

impl<T: Describe> Describe for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::Optional(Box::new(T::shape()))
    }
}

macro_rules! describe_transparent {
    ($($ty:ident),+) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ty<T> {
                fn shape() -> TypeShape {
                    T::shape()
                }
            }
        )+
    };
}

describe_transparent!(Box, Rc, Arc);

impl<T: Describe + ?Sized> Describe for &T {
    fn shape() -> TypeShape {
        T::shape()
    }
}

impl<T: Describe + ToOwned + ?Sized> Describe for Cow<'_, T> {
    fn shape() -> TypeShape {
        T::shape()
    }
}

macro_rules! describe_sequence {
    ($($ty:ident),+) => {
        $(
            impl<T: Describe> Describe for $ty<T> {
                fn shape() -> TypeShape {
                    TypeShape::Sequence(Box::new(T::shape()))
                }
            }
        )+
    };
}

describe_sequence!(Vec, VecDeque, LinkedList, BTreeSet);

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn shape() -> TypeShape {
        TypeShape::Sequence(Box::new(T::shape()))
    }
}

impl<T: Describe> Describe for [T] {
    fn shape() -> TypeShape {
        TypeShape::Sequence(Box::new(T::shape()))
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn shape() -> TypeShape {
        TypeShape::Sequence(Box::new(T::shape()))
    }
}

impl<K, V: Describe, S> Describe for HashMap<K, V, S> {
    fn shape() -> TypeShape {
        TypeShape::Map(Box::new(V::shape()))
    }
}

impl<K, V: Describe> Describe for BTreeMap<K, V> {
    fn shape() -> TypeShape {
        TypeShape::Map(Box::new(V::shape()))
    }
}
