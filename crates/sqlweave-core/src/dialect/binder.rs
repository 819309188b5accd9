//! Placeholder emission and parameter collection.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::profile::{DialectProfile, PlaceholderStyle};
use crate::error::{Error, Result};
use crate::ident::Identifier;
use crate::value::SqlValue;

/// Parameters in the shape the target driver binds them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BoundParams {
    /// One value per placeholder number or occurrence, in order.
    Ordered(Vec<SqlValue>),
    /// Values by placeholder name.
    Named(BTreeMap<String, SqlValue>),
}

impl BoundParams {
    /// Number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Ordered(values) => values.len(),
            Self::Named(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ordered values, for positional and numbered dialects.
    #[must_use]
    pub fn as_ordered(&self) -> Option<&[SqlValue]> {
        match self {
            Self::Ordered(values) => Some(values),
            Self::Named(_) => None,
        }
    }

    /// The name map, for named dialects.
    #[must_use]
    pub const fn as_named(&self) -> Option<&BTreeMap<String, SqlValue>> {
        match self {
            Self::Named(values) => Some(values),
            Self::Ordered(_) => None,
        }
    }
}

/// Identifies one bound value: a parameter, or one element of a list parameter.
type BindKey = (String, Option<usize>);

/// Turns parameter references into placeholders while recording the values.
#[derive(Debug)]
pub(crate) struct Binder<'a> {
    profile: &'a DialectProfile,
    source: &'a BTreeMap<String, SqlValue>,
    ordered: Vec<SqlValue>,
    numbers: BTreeMap<BindKey, usize>,
    named: BTreeMap<String, SqlValue>,
    /// Emitted names, for named styles.
    names: BTreeMap<BindKey, String>,
    taken: BTreeSet<String>,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(profile: &'a DialectProfile, source: &'a BTreeMap<String, SqlValue>) -> Self {
        Self {
            profile,
            source,
            ordered: Vec::new(),
            numbers: BTreeMap::new(),
            named: BTreeMap::new(),
            names: BTreeMap::new(),
            taken: source.keys().cloned().collect(),
        }
    }

    /// Returns the value bound to `name`.
    pub(crate) fn value(&self, name: &Identifier) -> Result<&'a SqlValue> {
        self.source
            .get(name.as_str())
            .ok_or_else(|| Error::MissingParameter(name.to_string()))
    }

    /// Emits a placeholder for the scalar parameter `name`.
    pub(crate) fn scalar(&mut self, name: &Identifier) -> Result<String> {
        let value = self.value(name)?;
        if let SqlValue::List(_) = value {
            return Err(Error::TypeMismatch {
                parameter: name.to_string(),
                expected: String::from("a scalar"),
                found: String::from("list"),
            });
        }
        Ok(self.emit((name.to_string(), None), value.clone()))
    }

    /// Emits one placeholder for the whole value of `name`.
    pub(crate) fn whole(&mut self, name: &Identifier) -> Result<String> {
        let value = self.value(name)?;
        Ok(self.emit((name.to_string(), None), value.clone()))
    }

    /// Emits a placeholder for element `index` of the list parameter `name`.
    pub(crate) fn element(&mut self, name: &Identifier, index: usize, value: &SqlValue) -> String {
        self.emit((name.to_string(), Some(index)), value.clone())
    }

    fn emit(&mut self, key: BindKey, value: SqlValue) -> String {
        match self.profile.placeholder {
            PlaceholderStyle::Positional => {
                self.ordered.push(value);
                String::from("?")
            }
            PlaceholderStyle::Numbered => {
                let next = self.ordered.len() + 1;
                let number = *self.numbers.entry(key).or_insert_with(|| {
                    self.ordered.push(value);
                    next
                });
                format!("${number}")
            }
            PlaceholderStyle::Named { sigil } => {
                let emitted = self.emitted_name(key);
                self.named.entry(emitted.clone()).or_insert(value);
                format!("{sigil}{emitted}")
            }
        }
    }

    /// Chooses a stable bind name that is unique in this statement, is not a
    /// reserved word and does not start with a digit. Parameters keep their
    /// own name when they can.
    fn emitted_name(&mut self, key: BindKey) -> String {
        if let Some(name) = self.names.get(&key) {
            return name.clone();
        }
        let (param, index) = &key;
        let mut base = match index {
            Some(i) => format!("{param}_{i}"),
            None => param.clone(),
        };
        if base.starts_with(|c: char| c.is_ascii_digit()) || self.profile.is_reserved(&base) {
            base = format!("p_{base}");
        }
        let keeps_own_name = index.is_none() && base == *param;
        let mut name = base.clone();
        if !keeps_own_name {
            let mut n = 0;
            while self.taken.contains(&name) {
                n += 1;
                name = format!("{base}_{n}");
            }
            self.taken.insert(name.clone());
        }
        self.names.insert(key, name.clone());
        name
    }

    pub(crate) fn finish(self) -> BoundParams {
        match self.profile.placeholder {
            PlaceholderStyle::Named { .. } => BoundParams::Named(self.named),
            _ => BoundParams::Ordered(self.ordered),
        }
    }
}
