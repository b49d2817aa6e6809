//! Cross-dimension constraints
//!
//! A constraint is attached to a value `v` of dimension `D` and restricts the
//! values of another dimension `E` a point may hold while `D = v`. Entries
//! that are absent allow everything.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dimension::{ContentDimension, ContentDimensionIdentifier};
use crate::error::ConfigurationError;

/// Allowed values of one dimension, relative to a fixed value elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDimensionConstraints {
    /// Applies to every value without an explicit restriction
    pub wildcard_allowed: bool,
    /// Per-value overrides of the wildcard
    pub identifier_restrictions: BTreeMap<String, bool>,
}

impl Default for ContentDimensionConstraints {
    fn default() -> Self {
        Self {
            wildcard_allowed: true,
            identifier_restrictions: BTreeMap::new(),
        }
    }
}

impl ContentDimensionConstraints {
    /// Everything allowed except the given values
    pub fn disallowing<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            wildcard_allowed: true,
            identifier_restrictions: values.into_iter().map(|v| (v.into(), false)).collect(),
        }
    }

    /// Nothing allowed except the given values
    pub fn allowing_only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            wildcard_allowed: false,
            identifier_restrictions: values.into_iter().map(|v| (v.into(), true)).collect(),
        }
    }

    #[inline]
    pub fn allows(&self, value: &str) -> bool {
        self.identifier_restrictions
            .get(value)
            .copied()
            .unwrap_or(self.wildcard_allowed)
    }
}

type Restrictions = BTreeMap<ContentDimensionIdentifier, ContentDimensionConstraints>;

/// All cross-dimension constraints of a configuration
#[derive(Debug, Clone, Default)]
pub struct ConstraintTable {
    // dimension -> value -> other dimension -> constraints
    entries: AHashMap<ContentDimensionIdentifier, AHashMap<String, Restrictions>>,
}

impl ConstraintTable {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `other` while `dimension = value`. Repeated calls for the same
    /// triple replace the earlier constraints.
    pub fn insert(
        &mut self,
        dimension: ContentDimensionIdentifier,
        value: impl Into<String>,
        other: ContentDimensionIdentifier,
        constraints: ContentDimensionConstraints,
    ) {
        self.entries
            .entry(dimension)
            .or_default()
            .entry(value.into())
            .or_default()
            .insert(other, constraints);
    }

    /// Shorthand for the plain "disallowed values" form
    #[must_use]
    pub fn disallow<I, S>(
        mut self,
        dimension: ContentDimensionIdentifier,
        value: impl Into<String>,
        other: ContentDimensionIdentifier,
        disallowed: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(dimension, value, other, ContentDimensionConstraints::disallowing(disallowed));
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `dimension = value` permits `other = other_value`, looking only
    /// at constraints declared on `dimension = value`
    pub fn permits(
        &self,
        dimension: &ContentDimensionIdentifier,
        value: &str,
        other: &ContentDimensionIdentifier,
        other_value: &str,
    ) -> bool {
        self.entries
            .get(dimension)
            .and_then(|values| values.get(value))
            .and_then(|restrictions| restrictions.get(other))
            .map_or(true, |constraints| constraints.allows(other_value))
    }

    /// Whether two coordinates may appear in the same point.
    ///
    /// Constraints are declared one-sided but hold both ways: either side
    /// forbidding the other rules the combination out.
    pub fn can_be_combined(
        &self,
        (dimension, value): (&ContentDimensionIdentifier, &str),
        (other, other_value): (&ContentDimensionIdentifier, &str),
    ) -> bool {
        self.permits(dimension, value, other, other_value)
            && self.permits(other, other_value, dimension, value)
    }

    /// Check that every referenced dimension and value exists.
    pub fn validate(&self, dimensions: &[ContentDimension]) -> Result<(), ConfigurationError> {
        let find = |identifier: &ContentDimensionIdentifier| {
            dimensions.iter().find(|dimension| dimension.identifier() == identifier)
        };
        let unknown = |dimension: &ContentDimensionIdentifier, token: &str| {
            ConfigurationError::UnknownConstraintTarget {
                dimension: dimension.to_string(),
                token: token.to_string(),
            }
        };

        for (identifier, values) in &self.entries {
            let dimension = find(identifier).ok_or_else(|| unknown(identifier, "*"))?;
            for (value, restrictions) in values {
                if !dimension.has_value(value) {
                    return Err(unknown(identifier, value));
                }
                for (other_identifier, constraints) in restrictions {
                    let other = find(other_identifier).ok_or_else(|| unknown(other_identifier, "*"))?;
                    if other_identifier == identifier {
                        return Err(unknown(other_identifier, "*"));
                    }
                    for token in constraints.identifier_restrictions.keys() {
                        if !other.has_value(token) {
                            return Err(unknown(other_identifier, token));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
