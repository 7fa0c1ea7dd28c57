//! Filter dimensions and their selections.
//!
//! A [`Facet`] describes how a catalog exposes one field to the engine; a
//! [`Filter`] is what the shopper currently has selected for it. Keeping the
//! two apart lets every catalog share one predicate implementation.

use crate::error::CommerceError;
use crate::search::FacetValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

type TextAccessor<T> = Box<dyn Fn(&T) -> &str + Send + Sync>;
type NumberAccessor<T> = Box<dyn Fn(&T) -> f64 + Send + Sync>;

/// Field a facet reads from an item.
pub enum Field<T> {
    /// One or more string fields; text search matches any of them.
    Text(Vec<TextAccessor<T>>),
    /// A numeric field (price, rating, days...).
    Number(NumberAccessor<T>),
}

/// The input control a facet is rendered with, which also decides how raw
/// input is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    /// Single-select dropdown; exact match.
    Exact,
    /// Checkbox group; item value must be one of the selected.
    MultiSelect,
    /// Upper bound slider (`field <= value`).
    AtMost,
    /// Lower bound slider (`field >= value`).
    AtLeast,
    /// Two-handle slider (`min <= field <= max`).
    Range,
    /// Free-text box; case-insensitive substring.
    Search,
}

/// One filter dimension of a catalog.
pub struct Facet<T> {
    key: &'static str,
    label: &'static str,
    kind: FacetKind,
    field: Field<T>,
}

impl<T> Facet<T> {
    fn text<F>(key: &'static str, label: &'static str, kind: FacetKind, accessor: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        Self {
            key,
            label,
            kind,
            field: Field::Text(vec![Box::new(accessor)]),
        }
    }

    fn number<F>(key: &'static str, label: &'static str, kind: FacetKind, accessor: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        Self {
            key,
            label,
            kind,
            field: Field::Number(Box::new(accessor)),
        }
    }

    /// Single-select exact match on a string field.
    pub fn exact<F>(key: &'static str, label: &'static str, accessor: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        Self::text(key, label, FacetKind::Exact, accessor)
    }

    /// Multi-select membership on a string field.
    pub fn multi_select<F>(key: &'static str, label: &'static str, accessor: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        Self::text(key, label, FacetKind::MultiSelect, accessor)
    }

    /// Free-text search; chain [`Facet::also`] to search more fields.
    pub fn search<F>(key: &'static str, label: &'static str, accessor: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        Self::text(key, label, FacetKind::Search, accessor)
    }

    pub fn at_most<F>(key: &'static str, label: &'static str, accessor: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        Self::number(key, label, FacetKind::AtMost, accessor)
    }

    pub fn at_least<F>(key: &'static str, label: &'static str, accessor: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        Self::number(key, label, FacetKind::AtLeast, accessor)
    }

    pub fn range<F>(key: &'static str, label: &'static str, accessor: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        Self::number(key, label, FacetKind::Range, accessor)
    }

    /// Add another string field to a text facet. Ignored on numeric facets.
    pub fn also<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        if let Field::Text(accessors) = &mut self.field {
            accessors.push(Box::new(accessor));
        }
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn kind(&self) -> FacetKind {
        self.kind
    }

    /// Whether `item` satisfies `filter` on this dimension.
    ///
    /// Inactive filters match everything. A selection that does not fit the
    /// field type (e.g. a range on a text field) is treated as inactive.
    pub fn matches(&self, item: &T, filter: &Filter) -> bool {
        if !filter.is_active() {
            return true;
        }
        match (&self.field, filter) {
            (Field::Text(fields), Filter::Equals(value)) => fields.iter().any(|f| f(item) == value),
            (Field::Text(fields), Filter::OneOf(values)) => {
                fields.iter().any(|f| values.contains(f(item)))
            }
            (Field::Text(fields), Filter::Contains(query)) => {
                let needle = query.trim().to_lowercase();
                fields
                    .iter()
                    .any(|f| f(item).to_lowercase().contains(&needle))
            }
            (Field::Number(f), Filter::AtMost(max)) => f(item) <= *max,
            (Field::Number(f), Filter::AtLeast(min)) => f(item) >= *min,
            (Field::Number(f), Filter::Range { min, max }) => {
                let value = f(item);
                min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
            }
            (_, filter) => {
                tracing::warn!(facet = self.key, ?filter, "filter does not apply to field type");
                true
            }
        }
    }

    /// Turn raw control input into a selection for this facet.
    ///
    /// Blank input, `any` and `all` clear the dimension. Numeric input is
    /// clamped here so predicates only ever see well-formed bounds.
    pub fn parse_filter(&self, raw: &str) -> Result<Filter, CommerceError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("any") || raw.eq_ignore_ascii_case("all") {
            return Ok(Filter::Any);
        }
        let filter = match self.kind {
            FacetKind::Exact => Filter::equals(raw),
            FacetKind::MultiSelect => Filter::one_of(raw.split(',').map(str::trim)),
            FacetKind::Search => Filter::contains(raw),
            FacetKind::AtMost => Filter::at_most(self.parse_number(raw)?),
            FacetKind::AtLeast => Filter::at_least(self.parse_number(raw)?),
            FacetKind::Range => {
                let Some((min, max)) = raw.split_once("..") else {
                    return Err(self.invalid(format!("expected MIN..MAX, got {raw:?}")));
                };
                let min = self.parse_bound(min)?;
                let max = self.parse_bound(max)?;
                Filter::range(min, max)
            }
        };
        Ok(filter)
    }

    fn parse_number(&self, raw: &str) -> Result<f64, CommerceError> {
        raw.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.invalid(format!("{raw:?} is not a number")))
    }

    fn parse_bound(&self, raw: &str) -> Result<Option<f64>, CommerceError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        self.parse_number(raw).map(Some)
    }

    fn invalid(&self, reason: String) -> CommerceError {
        CommerceError::InvalidFilter {
            facet: self.key.to_string(),
            reason,
        }
    }

    /// Distinct values of a text facet across `items`, with counts.
    ///
    /// Numeric facets have no discrete options and return an empty list.
    pub fn options<'a>(&self, items: impl IntoIterator<Item = &'a T>, selected: &Filter) -> Vec<FacetValue>
    where
        T: 'a,
    {
        let Field::Text(fields) = &self.field else {
            return Vec::new();
        };
        if self.kind == FacetKind::Search {
            return Vec::new();
        }
        let Some(primary) = fields.first() else {
            return Vec::new();
        };

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for item in items {
            *counts.entry(primary(item)).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(value, count)| FacetValue {
                value: value.to_string(),
                count,
                selected: selected.selects(value),
            })
            .collect()
    }
}

impl<T> fmt::Debug for Facet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facet")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Current selection for one filter dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Filter {
    /// Dimension is inactive.
    #[default]
    Any,
    /// Exact, case-sensitive match (e.g., CPU model, location).
    Equals(String),
    /// Membership in a set of checked values.
    OneOf(BTreeSet<String>),
    /// `field <= value`.
    AtMost(f64),
    /// `field >= value`.
    AtLeast(f64),
    /// Inclusive range; a missing bound is open.
    Range { min: Option<f64>, max: Option<f64> },
    /// Case-insensitive substring.
    Contains(String),
}

impl Filter {
    pub fn equals(value: impl Into<String>) -> Self {
        Filter::Equals(value.into())
    }

    /// Multi-select filter; empty values are dropped.
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::OneOf(
            values
                .into_iter()
                .map(Into::into)
                .filter(|v: &String| !v.is_empty())
                .collect(),
        )
    }

    /// Upper bound; NaN clears the dimension.
    pub fn at_most(max: f64) -> Self {
        if max.is_nan() {
            return Filter::Any;
        }
        Filter::AtMost(max)
    }

    /// Lower bound; NaN clears the dimension.
    pub fn at_least(min: f64) -> Self {
        if min.is_nan() {
            return Filter::Any;
        }
        Filter::AtLeast(min)
    }

    /// Inclusive range. Crossed bounds are swapped and NaN bounds dropped.
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        let min = min.filter(|v| !v.is_nan());
        let max = max.filter(|v| !v.is_nan());
        match (min, max) {
            (Some(a), Some(b)) if a > b => Filter::Range {
                min: Some(b),
                max: Some(a),
            },
            (min, max) => Filter::Range { min, max },
        }
    }

    pub fn contains(query: impl Into<String>) -> Self {
        Filter::Contains(query.into())
    }

    /// Whether this selection constrains anything.
    pub fn is_active(&self) -> bool {
        match self {
            Filter::Any => false,
            Filter::Equals(value) => !value.is_empty(),
            Filter::OneOf(values) => !values.is_empty(),
            Filter::AtMost(v) | Filter::AtLeast(v) => !v.is_nan(),
            Filter::Range { min, max } => min.is_some() || max.is_some(),
            Filter::Contains(query) => !query.trim().is_empty(),
        }
    }

    /// Whether a discrete option is part of this selection.
    pub fn selects(&self, value: &str) -> bool {
        match self {
            Filter::Equals(v) => v == value,
            Filter::OneOf(values) => values.contains(value),
            _ => false,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Any => write!(f, "any"),
            Filter::Equals(v) => write!(f, "= {v}"),
            Filter::OneOf(values) => {
                let joined: Vec<&str> = values.iter().map(String::as_str).collect();
                write!(f, "in [{}]", joined.join(", "))
            }
            Filter::AtMost(v) => write!(f, "<= {v}"),
            Filter::AtLeast(v) => write!(f, ">= {v}"),
            Filter::Range { min, max } => {
                let lo = min.map(|v| v.to_string()).unwrap_or_default();
                let hi = max.map(|v| v.to_string()).unwrap_or_default();
                write!(f, "{lo}..{hi}")
            }
            Filter::Contains(q) => write!(f, "~ {q:?}"),
        }
    }
}
