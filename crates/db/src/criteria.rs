use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

/// A field value that criteria can require.
///
/// Values compare by their semantic type only: `Text("1")` never equals
/// `Integer(1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Integer(i64),
    Uuid(Uuid),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

/// An entity whose fields can be inspected by name.
pub trait Fields {
    /// The closed set of field names for this entity.
    type Field: Copy + Ord + fmt::Debug + Send + Sync + 'static;

    /// Current value of `field`, or `None` when the entity leaves it unset.
    fn field(&self, field: Self::Field) -> Option<Value>;
}

/// Partial-match filter: every present field must equal the entity's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria<F: Ord> {
    fields: BTreeMap<F, Value>,
}

impl<F: Ord + Copy> Criteria<F> {
    /// Criteria with no constraints; matches every entity.
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Require `field` to equal `value`, replacing any earlier requirement.
    pub fn with(mut self, field: F, value: impl Into<Value>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    /// Combine with `other`; on overlap the requirement from `other` wins.
    pub fn merge(mut self, other: &Criteria<F>) -> Self {
        for (field, value) in &other.fields {
            self.fields.insert(*field, value.clone());
        }
        self
    }

    pub fn get(&self, field: F) -> Option<&Value> {
        self.fields.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &Value)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }
}

impl<F: Ord + Copy> Default for Criteria<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide whether `entity` satisfies every requirement in `criteria`.
///
/// A field the entity leaves unset never satisfies a requirement on it.
pub fn matches<E: Fields>(entity: &E, criteria: &Criteria<E::Field>) -> bool {
    criteria
        .iter()
        .all(|(field, expected)| entity.field(field).as_ref() == Some(expected))
}
