extern crate proc_macro;
use proc_macro::TokenStream;

pub(crate) mod attrs;
pub(crate) mod crate_path;
pub(crate) mod describe_derive;
pub(crate) mod rename;

/// Derive `Describe` (the type's serialized shape) and `Validatable`.
///
/// The shape follows the type's `serde` attributes so that it matches what
/// actually goes over the wire:
///
/// | Attribute | Effect on the shape |
/// |-----------|---------------------|
/// | `#[serde(rename = "...")]` | field key / variant name |
/// | `rename(serialize = "...", deserialize = "...")` | key per direction |
/// | `#[serde(rename_all = "...")]` | every field or variant of the type |
/// | `#[serde(skip)]` | field omitted |
/// | `skip_serializing`, `skip_deserializing` | field omitted on that side only |
/// | `#[serde(default)]` | field optional in requests |
/// | `skip_serializing_if = "..."` | field optional in responses |
/// | `#[serde(flatten)]` | nested record fields inlined |
/// | `#[serde(transparent)]` | shape of the single inner field |
/// | `#[garde(required)]` | field required even when it is an `Option` |
///
/// Structs with named fields become records; unit-only enums become string
/// enums; other enums describe as `Any`; single-field tuple structs take the
/// inner type's shape.
///
/// Records and string enums are named by `schemars::JsonSchema::schema_name`,
/// so derive `JsonSchema` too. Generic records get one name per instantiation
/// (`Page<User>` is `Page_for_User`).
///
/// For named-field structs the derive also implements `Validatable` by
/// delegating to `garde::Validate`, so derive `garde::Validate` as well, or
/// opt out with `#[describe(skip_validation)]` (the type then always passes).
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Describe, JsonSchema, Validate)]
/// #[serde(rename_all = "camelCase")]
/// pub struct Pet {
///     #[garde(length(min = 1))]
///     pub pet_name: String,
///     #[garde(skip)]
///     #[serde(default)]
///     pub tags: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Describe, attributes(describe, serde, garde))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    describe_derive::expand(input)
}
