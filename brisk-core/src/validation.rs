use crate::http::{IntoResponse, Json, Response, StatusCode};
use crate::shape::{Contract, TypeShape};
use serde::Serialize;
use std::fmt;

// ── Error types ────────────────────────────────────────────

/// A field-level validation error.
///
/// `field` is the serialization key path (`address.city`, `items[0].name`).
/// Empty parts are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub field: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// `{"errors": [...]}` body shared by input (422) and output (500) failures.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

impl ValidationErrorResponse {
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// A failed validation: the engine report plus the shape it was checked against.
#[derive(Debug)]
pub struct ValidationFailure {
    report: garde::Report,
    shape: TypeShape,
    contract: Contract,
}

impl ValidationFailure {
    /// A failure on a request input.
    pub fn new(report: garde::Report, shape: TypeShape) -> Self {
        Self {
            report,
            shape,
            contract: Contract::Deserialize,
        }
    }

    /// Report field paths with the keys the value is serialized under.
    pub fn into_output(mut self) -> Self {
        self.contract = Contract::Serialize;
        self
    }

    pub fn contract(&self) -> Contract {
        self.contract
    }

    pub fn report(&self) -> &garde::Report {
        &self.report
    }

    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {}", self.report)
    }
}

impl std::error::Error for ValidationFailure {}

// ── Validatable ────────────────────────────────────────────

/// Object-safe entry point into the validation engine.
///
/// `#[derive(Describe)]` implements this for named-field structs by calling
/// `garde::Validate::validate`, so the struct must also derive
/// `garde::Validate` (or opt out with `#[describe(skip_validation)]`).
/// Enums, tuple structs and std types have no rules and always pass.
pub trait Validatable: Send + Sync {
    fn check(&self) -> Result<(), garde::Report>;
}

macro_rules! always_valid {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Validatable for $ty {
                fn check(&self) -> Result<(), garde::Report> {
                    Ok(())
                }
            }
        )+
    };
}

always_valid!(
    String, bool, char, (), serde_json::Value,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
);

impl<T: Validatable> Validatable for Option<T> {
    fn check(&self) -> Result<(), garde::Report> {
        match self {
            Some(value) => value.check(),
            None => Ok(()),
        }
    }
}

impl<T: Validatable + ?Sized> Validatable for Box<T> {
    fn check(&self) -> Result<(), garde::Report> {
        (**self).check()
    }
}

impl<T: Validatable + ?Sized> Validatable for std::sync::Arc<T> {
    fn check(&self) -> Result<(), garde::Report> {
        (**self).check()
    }
}

impl<T: Send + Sync> Validatable for Vec<T> {
    fn check(&self) -> Result<(), garde::Report> {
        Ok(())
    }
}

impl<K: Send + Sync, V: Send + Sync, S: Send + Sync> Validatable
    for std::collections::HashMap<K, V, S>
{
    fn check(&self) -> Result<(), garde::Report> {
        Ok(())
    }
}

impl<K: Send + Sync, V: Send + Sync> Validatable for std::collections::BTreeMap<K, V> {
    fn check(&self) -> Result<(), garde::Report> {
        Ok(())
    }
}

// ── Validator ──────────────────────────────────────────────

/// Pluggable validation engine used by the request pipeline.
pub trait Validator: Send + Sync + 'static {
    /// Check `value` (described by `shape`) against its declared rules.
    fn validate(&self, value: &dyn Validatable, shape: &TypeShape) -> Result<(), ValidationFailure>;

    /// Turn a failure into field errors keyed by serialization names.
    fn translate(&self, failure: &ValidationFailure) -> Vec<FieldError>;
}

/// The default [`Validator`], backed by `garde`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GardeValidator;

impl Validator for GardeValidator {
    fn validate(&self, value: &dyn Validatable, shape: &TypeShape) -> Result<(), ValidationFailure> {
        value
            .check()
            .map_err(|report| ValidationFailure::new(report, shape.clone()))
    }

    fn translate(&self, failure: &ValidationFailure) -> Vec<FieldError> {
        failure
            .report()
            .iter()
            .map(|(path, error)| FieldError {
                field: serialized_path(&path.to_string(), failure.shape(), failure.contract()),
                message: error.message().to_string(),
            })
            .collect()
    }
}

/// Rewrite a garde path (Rust member names) into wire keys for `contract`.
///
/// Segments are separated by `.`; a segment may carry `[index]` suffixes.
/// Flattened members have no key of their own and vanish from the path.
/// Members the shape does not know are kept verbatim.
pub(crate) fn serialized_path(raw: &str, shape: &TypeShape, contract: Contract) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut current = Some(shape.clone());
    let mut out = Vec::new();

    for segment in raw.split('.') {
        let (member, suffix) = match segment.find('[') {
            Some(at) => segment.split_at(at),
            None => (segment, ""),
        };

        let field = current
            .as_ref()
            .and_then(TypeShape::as_record)
            .and_then(|record| record.field_by_member(member))
            .copied();

        let mut next = match field {
            Some(field) if field.flatten && suffix.is_empty() => Some(field.resolve()),
            Some(field) => {
                out.push(format!("{}{}", field.key_for(contract), suffix));
                Some(field.resolve())
            }
            None => {
                out.push(segment.to_string());
                None
            }
        };

        for _ in suffix.matches('[') {
            next = next.as_ref().and_then(TypeShape::element).cloned();
        }
        current = next;
    }

    out.join(".")
}
