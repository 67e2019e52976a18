//! Normalizes the binding call shapes into canonical `(key, source, type)` triples.
//!
//! Nothing is applied to a statement until every binding of a call has
//! resolved and the driver has accepted each one through
//! `DriverStatement::check`, so a bad entry in a batch leaves the statement
//! untouched.

use serde_json::Value as JsonValue;

use crate::error::SqlFacadeError;
use crate::translation::catalog;
use crate::types::{BindSource, ParamCell, ParamKey, ParamType, SqlValue, TypeTag};

/// One binding as submitted: placeholder, value, optional type tag (string when absent).
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<V> {
    pub key: ParamKey,
    pub value: V,
    pub ty: Option<TypeTag>,
}

impl<V> Binding<V> {
    pub fn new(key: impl Into<ParamKey>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
            ty: None,
        }
    }

    #[must_use]
    pub fn typed(mut self, ty: impl Into<TypeTag>) -> Self {
        self.ty = Some(ty.into());
        self
    }
}

/// Either one binding or a batch of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Bindings<V> {
    Single(Binding<V>),
    Batch(Vec<Binding<V>>),
}

impl<V> Bindings<V> {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Bindings::Single(_) => 1,
            Bindings::Batch(batch) => batch.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_vec(self) -> Vec<Binding<V>> {
        match self {
            Bindings::Single(binding) => vec![binding],
            Bindings::Batch(batch) => batch,
        }
    }
}

impl<V> From<Binding<V>> for Bindings<V> {
    fn from(binding: Binding<V>) -> Self {
        Bindings::Single(binding)
    }
}

impl<V> From<Vec<Binding<V>>> for Bindings<V> {
    fn from(batch: Vec<Binding<V>>) -> Self {
        Bindings::Batch(batch)
    }
}

impl Bindings<SqlValue> {
    /// Dispatch untyped input on its shape.
    ///
    /// Accepted forms:
    /// - one positional triple: `["name", value, "type"]` (type optional)
    /// - one keyed triple: `{"name": "a", "value": 1, "type": "int"}` (`column` may replace `name`)
    /// - an array whose elements are all triples of either form
    ///
    /// # Errors
    /// Returns `SqlFacadeError::BindError` when the array mixes triples with
    /// scalars, or an entry is malformed.
    pub fn from_json(input: &JsonValue) -> Result<Self, SqlFacadeError> {
        match input {
            JsonValue::Object(_) => Ok(Bindings::Single(triple_from_json(input)?)),
            JsonValue::Array(items) if items.is_empty() => {
                Err(catalog::BIND_INVALID_FORMAT.error_with("no bindings given"))
            }
            JsonValue::Array(items) => {
                let compound = items.iter().filter(|item| is_compound(item)).count();
                if compound == items.len() {
                    items
                        .iter()
                        .map(triple_from_json)
                        .collect::<Result<Vec<_>, _>>()
                        .map(Bindings::Batch)
                } else if compound == 0 {
                    triple_from_json(input).map(Bindings::Single)
                } else {
                    Err(catalog::BIND_INVALID_FORMAT.error())
                }
            }
            other => {
                let message = format!("expected an array or object of bindings, got {other}");
                Err(catalog::BIND_INVALID_FORMAT.error_with(message))
            }
        }
    }
}

fn is_compound(value: &JsonValue) -> bool {
    matches!(value, JsonValue::Array(_) | JsonValue::Object(_))
}

fn triple_from_json(entry: &JsonValue) -> Result<Binding<SqlValue>, SqlFacadeError> {
    let (name, value, ty) = match entry {
        JsonValue::Array(parts) if (2..=3).contains(&parts.len()) => {
            (&parts[0], &parts[1], parts.get(2))
        }
        JsonValue::Array(parts) => {
            return Err(catalog::BIND_INVALID_FORMAT.error_with(format!(
                "a binding triple has 2 or 3 elements, got {}",
                parts.len()
            )));
        }
        JsonValue::Object(map) => {
            let name = map.get("name").or_else(|| map.get("column"));
            let (Some(name), Some(value)) = (name, map.get("value")) else {
                let message = "keyed binding needs `name` (or `column`) and `value`";
                return Err(catalog::BIND_INVALID_FORMAT.error_with(message));
            };
            (name, value, map.get("type"))
        }
        _ => return Err(catalog::BIND_INVALID_FORMAT.error()),
    };

    let key = match name {
        JsonValue::String(s) => ParamKey::named(s),
        JsonValue::Number(n) => match n.as_u64().and_then(|pos| usize::try_from(pos).ok()) {
            Some(pos) => ParamKey::Positional(pos),
            None => {
                let message = format!("invalid position {n}");
                return Err(catalog::BIND_INVALID_NAME.error_with(message));
            }
        },
        other => {
            let message = format!("invalid parameter name {other}");
            return Err(catalog::BIND_INVALID_NAME.error_with(message));
        }
    };
    let value = SqlValue::from_json(value).ok_or_else(|| {
        catalog::BIND_INVALID_FORMAT.error_with(format!("value for {key} is not a scalar"))
    })?;
    let ty = match ty {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(TypeTag::Name(s.clone())),
        Some(JsonValue::Number(n)) => match n.as_i64() {
            Some(tag) => Some(TypeTag::Numeric(tag)),
            None => return Err(invalid_type(&n.to_string())),
        },
        Some(other) => return Err(invalid_type(&other.to_string())),
    };
    Ok(Binding { key, value, ty })
}

fn invalid_type(tag: &str) -> SqlFacadeError {
    catalog::BIND_INVALID_TYPE.error_with(format!(
        "unknown parameter type `{tag}`; expected string, integer, boolean or null"
    ))
}

/// A binding whose key and type have been checked.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedBinding {
    pub key: ParamKey,
    pub source: BindSource,
    pub ty: ParamType,
}

/// How a bound value reaches the driver.
pub trait IntoBindSource {
    fn into_bind_source(self) -> BindSource;
}

impl IntoBindSource for SqlValue {
    fn into_bind_source(self) -> BindSource {
        BindSource::Value(self)
    }
}

impl IntoBindSource for ParamCell {
    fn into_bind_source(self) -> BindSource {
        BindSource::Reference(self)
    }
}

/// Check one binding.
pub(crate) fn resolve<V: IntoBindSource>(
    binding: Binding<V>,
) -> Result<ResolvedBinding, SqlFacadeError> {
    if !binding.key.is_valid() {
        return Err(catalog::BIND_INVALID_NAME
            .error_with(format!("invalid parameter key `{}`", binding.key)));
    }
    let ty = match &binding.ty {
        None => ParamType::default(),
        Some(tag) => tag.resolve().map_err(|e| invalid_type(&e.0))?,
    };
    Ok(ResolvedBinding {
        key: binding.key,
        source: binding.value.into_bind_source(),
        ty,
    })
}

/// Check every binding; the first failure rejects the whole call.
pub(crate) fn resolve_all<V: IntoBindSource>(
    bindings: Bindings<V>,
) -> Result<Vec<ResolvedBinding>, SqlFacadeError> {
    bindings.into_vec().into_iter().map(resolve).collect()
}
