//! Content dimensions
//!
//! A content dimension is one axis of content variation (market, language,
//! channel). Its values form a forest: each value has at most one direct
//! generalization, and the roots of the forest are the most general values.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::ConfigurationError;

/// Name of a content dimension, e.g. `language`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDimensionIdentifier(String);

impl ContentDimensionIdentifier {
    /// Create an identifier, rejecting empty or malformed names.
    ///
    /// Identifiers end up as JSON keys and URI segments, so only ASCII
    /// alphanumerics, `_` and `-` are accepted.
    pub fn new(identifier: impl Into<String>) -> Result<Self, ConfigurationError> {
        let identifier = identifier.into();
        let valid = !identifier.is_empty()
            && identifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ConfigurationError::ContentDimensionIdentifierIsInvalid(identifier));
        }
        Ok(Self(identifier))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentDimensionIdentifier {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ContentDimensionIdentifier {
    type Error = ConfigurationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentDimensionIdentifier> for String {
    fn from(identifier: ContentDimensionIdentifier) -> Self {
        identifier.0
    }
}

impl Borrow<str> for ContentDimensionIdentifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDimensionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single value of a content dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDimensionValue {
    value: String,
    /// 0 for root values; derived from the variation edges on construction
    specialization_depth: u32,
    /// Label, icon and other presentation attributes, opaque to the engine
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    configuration: BTreeMap<String, serde_json::Value>,
}

impl ContentDimensionValue {
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            specialization_depth: 0,
            configuration: BTreeMap::new(),
        }
    }

    /// Declare the expected depth. Zero means "unset"; a non-zero depth must
    /// match the value's position in the variation tree.
    #[inline]
    #[must_use]
    pub fn with_specialization_depth(mut self, depth: u32) -> Self {
        self.specialization_depth = depth;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_configuration(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.configuration.insert(key.into(), value);
        self
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn specialization_depth(&self) -> u32 {
        self.specialization_depth
    }

    #[inline]
    pub fn configuration(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.configuration
    }
}

/// Directed edge from a value to its direct generalization
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariationEdge {
    pub specialization: String,
    pub generalization: String,
}

impl VariationEdge {
    #[inline]
    #[must_use]
    pub fn new(specialization: impl Into<String>, generalization: impl Into<String>) -> Self {
        Self {
            specialization: specialization.into(),
            generalization: generalization.into(),
        }
    }
}

/// Options consulted by request resolution (routing), not by the engine.
///
/// `allow_empty_value` marks a dimension whose value may be omitted from a
/// request URI; the default value is used instead. It never adds points to
/// the allowed subspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOptions {
    #[serde(default)]
    pub allow_empty_value: bool,
}

/// One axis of content variation
#[derive(Debug, Clone)]
pub struct ContentDimension {
    identifier: ContentDimensionIdentifier,
    values: Vec<ContentDimensionValue>,
    index: AHashMap<String, usize>,
    default_value: usize,
    edges: Vec<VariationEdge>,
    // adjacency, by position in `values`
    generalization: Vec<Option<usize>>,
    specializations: Vec<Vec<usize>>,
    resolution: ResolutionOptions,
    configuration: BTreeMap<String, serde_json::Value>,
}

impl ContentDimension {
    /// Build a dimension and its adjacency index.
    ///
    /// Fails if the default value or an edge endpoint is unknown, if a value
    /// has two direct generalizations, if the edges form a cycle, or if a
    /// declared specialization depth disagrees with the edge tree.
    pub fn new(
        identifier: ContentDimensionIdentifier,
        values: Vec<ContentDimensionValue>,
        default_value: &str,
        edges: Vec<VariationEdge>,
    ) -> Result<Self, ConfigurationError> {
        let dimension = identifier.as_str();
        if values.is_empty() {
            return Err(ConfigurationError::EmptyDimension(dimension.to_string()));
        }

        let mut index = AHashMap::with_capacity(values.len());
        for (position, value) in values.iter().enumerate() {
            if value.value.is_empty() {
                return Err(ConfigurationError::InvalidValueToken {
                    dimension: dimension.to_string(),
                    token: value.value.clone(),
                });
            }
            if index.insert(value.value.clone(), position).is_some() {
                return Err(ConfigurationError::DuplicateValue {
                    dimension: dimension.to_string(),
                    token: value.value.clone(),
                });
            }
        }

        let default_position = *index.get(default_value).ok_or_else(|| {
            ConfigurationError::MissingDefaultValue {
                dimension: dimension.to_string(),
                token: default_value.to_string(),
            }
        })?;

        let lookup = |token: &str| {
            index
                .get(token)
                .copied()
                .ok_or_else(|| ConfigurationError::DanglingEdge {
                    dimension: dimension.to_string(),
                    token: token.to_string(),
                })
        };

        let mut generalization: Vec<Option<usize>> = vec![None; values.len()];
        for edge in &edges {
            let special = lookup(&edge.specialization)?;
            let general = lookup(&edge.generalization)?;
            if special == general {
                return Err(ConfigurationError::EdgeCycle {
                    dimension: dimension.to_string(),
                    token: edge.specialization.clone(),
                });
            }
            if generalization[special].is_some_and(|existing| existing != general) {
                return Err(ConfigurationError::MultipleGeneralizations {
                    dimension: dimension.to_string(),
                    token: edge.specialization.clone(),
                });
            }
            generalization[special] = Some(general);
        }

        let depths = derive_depths(dimension, &values, &generalization)?;

        let mut values = values;
        for (value, derived) in values.iter_mut().zip(depths) {
            if value.specialization_depth != 0 && value.specialization_depth != derived {
                return Err(ConfigurationError::InconsistentSpecializationDepth {
                    dimension: dimension.to_string(),
                    token: value.value.clone(),
                    declared: value.specialization_depth,
                    derived,
                });
            }
            value.specialization_depth = derived;
        }

        let mut specializations = vec![Vec::new(); values.len()];
        for (special, general) in generalization.iter().enumerate() {
            if let Some(general) = general {
                specializations[*general].push(special);
            }
        }

        // duplicates of the same edge are tolerated above, keep one copy
        let mut edges = edges;
        let mut seen = ahash::AHashSet::with_capacity(edges.len());
        edges.retain(|edge| seen.insert(edge.clone()));

        debug!(
            dimension = %identifier,
            values = values.len(),
            edges = edges.len(),
            "content dimension constructed"
        );

        Ok(Self {
            identifier,
            values,
            index,
            default_value: default_position,
            edges,
            generalization,
            specializations,
            resolution: ResolutionOptions::default(),
            configuration: BTreeMap::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn with_resolution(mut self, resolution: ResolutionOptions) -> Self {
        self.resolution = resolution;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_configuration(mut self, configuration: BTreeMap<String, serde_json::Value>) -> Self {
        self.configuration = configuration;
        self
    }

    #[inline]
    pub fn identifier(&self) -> &ContentDimensionIdentifier {
        &self.identifier
    }

    /// Values in configuration order
    #[inline]
    pub fn values(&self) -> &[ContentDimensionValue] {
        &self.values
    }

    #[inline]
    pub fn value(&self, token: &str) -> Option<&ContentDimensionValue> {
        self.position(token).map(|position| &self.values[position])
    }

    #[inline]
    pub fn has_value(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    #[inline]
    pub fn default_value(&self) -> &ContentDimensionValue {
        &self.values[self.default_value]
    }

    #[inline]
    pub fn edges(&self) -> &[VariationEdge] {
        &self.edges
    }

    #[inline]
    pub fn resolution(&self) -> &ResolutionOptions {
        &self.resolution
    }

    #[inline]
    pub fn configuration(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.configuration
    }

    /// The direct generalization of a value, `None` for roots and unknown tokens
    pub fn generalization(&self, token: &str) -> Option<&ContentDimensionValue> {
        let position = self.position(token)?;
        self.generalization[position].map(|general| &self.values[general])
    }

    /// Direct generalizations as a set; never more than one element
    pub fn generalizations(&self, token: &str) -> Vec<&ContentDimensionValue> {
        self.generalization(token).into_iter().collect()
    }

    /// Direct specializations, in configuration order
    pub fn specializations(&self, token: &str) -> Vec<&ContentDimensionValue> {
        match self.position(token) {
            Some(position) => self.specializations[position]
                .iter()
                .map(|special| &self.values[*special])
                .collect(),
            None => Vec::new(),
        }
    }

    /// All transitive generalizations, closest first
    pub fn ancestors(&self, token: &str) -> Vec<&ContentDimensionValue> {
        let mut ancestors = Vec::new();
        let mut current = self.position(token).and_then(|p| self.generalization[p]);
        while let Some(position) = current {
            ancestors.push(&self.values[position]);
            current = self.generalization[position];
        }
        ancestors
    }

    /// All transitive specializations in depth-first pre-order
    pub fn descendants(&self, token: &str) -> Vec<&ContentDimensionValue> {
        let mut descendants = Vec::new();
        let Some(position) = self.position(token) else {
            return descendants;
        };
        let mut stack: Vec<usize> = self.specializations[position].iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            descendants.push(&self.values[current]);
            stack.extend(self.specializations[current].iter().rev());
        }
        descendants
    }

    /// Values without a generalization
    pub fn root_values(&self) -> Vec<&ContentDimensionValue> {
        self.values
            .iter()
            .zip(&self.generalization)
            .filter(|(_, general)| general.is_none())
            .map(|(value, _)| value)
            .collect()
    }

    pub fn maximum_depth(&self) -> u32 {
        self.values
            .iter()
            .map(|value| value.specialization_depth)
            .max()
            .unwrap_or(0)
    }

    /// Whether `general` is a strict (possibly indirect) generalization of `special`
    pub fn is_generalization_of(&self, general: &str, special: &str) -> bool {
        self.specialization_depth_between(special, general)
            .is_some_and(|distance| distance > 0)
    }

    /// Number of edges walked from `special` up to `general`.
    ///
    /// `Some(0)` when both are the same value, `None` when `general` is not
    /// on the path from `special` to its root.
    pub fn specialization_depth_between(&self, special: &str, general: &str) -> Option<u32> {
        let target = self.position(general)?;
        let mut current = Some(self.position(special)?);
        let mut distance = 0;
        while let Some(position) = current {
            if position == target {
                return Some(distance);
            }
            distance += 1;
            current = self.generalization[position];
        }
        None
    }

    #[inline]
    fn position(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }
}

/// Walk each value up to its root, assigning depths and rejecting cycles.
fn derive_depths(
    dimension: &str,
    values: &[ContentDimensionValue],
    generalization: &[Option<usize>],
) -> Result<Vec<u32>, ConfigurationError> {
    let mut depths: Vec<Option<u32>> = vec![None; values.len()];
    let mut on_path = vec![false; values.len()];

    for start in 0..values.len() {
        let mut path = Vec::new();
        let mut current = Some(start);
        let mut resolved_ancestor = None;
        while let Some(position) = current {
            if let Some(depth) = depths[position] {
                resolved_ancestor = Some(depth);
                break;
            }
            if on_path[position] {
                return Err(ConfigurationError::EdgeCycle {
                    dimension: dimension.to_string(),
                    token: values[position].value.clone(),
                });
            }
            on_path[position] = true;
            path.push(position);
            current = generalization[position];
        }

        let mut depth = resolved_ancestor.map_or(0, |depth| depth + 1);
        for position in path.into_iter().rev() {
            depths[position] = Some(depth);
            on_path[position] = false;
            depth += 1;
        }
    }

    Ok(depths.into_iter().map(|depth| depth.unwrap_or(0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier(name: &str) -> ContentDimensionIdentifier {
        ContentDimensionIdentifier::new(name).unwrap()
    }

    fn market() -> ContentDimension {
        ContentDimension::new(
            identifier("market"),
            vec![
                ContentDimensionValue::new("WORLD"),
                ContentDimensionValue::new("EU"),
                ContentDimensionValue::new("DE").with_specialization_depth(2),
                ContentDimensionValue::new("GB"),
            ],
            "WORLD",
            vec![
                VariationEdge::new("EU", "WORLD"),
                VariationEdge::new("DE", "EU"),
                VariationEdge::new("GB", "WORLD"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_identifier_validation() {
        assert!(ContentDimensionIdentifier::new("language").is_ok());
        assert!(ContentDimensionIdentifier::new("sales-channel_2").is_ok());
        assert_eq!(
            ContentDimensionIdentifier::new(""),
            Err(ConfigurationError::ContentDimensionIdentifierIsInvalid(String::new()))
        );
        assert!(ContentDimensionIdentifier::new("market language").is_err());
        assert!(serde_json::from_str::<ContentDimensionIdentifier>("\"\"").is_err());
    }

    #[test]
    fn test_depths_derived_from_edges() {
        let market = market();
        assert_eq!(market.value("WORLD").unwrap().specialization_depth(), 0);
        assert_eq!(market.value("EU").unwrap().specialization_depth(), 1);
        assert_eq!(market.value("DE").unwrap().specialization_depth(), 2);
        assert_eq!(market.value("GB").unwrap().specialization_depth(), 1);
        assert_eq!(market.maximum_depth(), 2);
        assert_eq!(market.default_value().value(), "WORLD");
    }

    #[test]
    fn test_adjacency_queries() {
        let market = market();
        assert_eq!(market.generalization("DE").unwrap().value(), "EU");
        assert!(market.generalization("WORLD").is_none());
        assert!(market.generalizations("WORLD").is_empty());

        let specializations: Vec<_> = market.specializations("WORLD").iter().map(|v| v.value()).collect();
        assert_eq!(specializations, vec!["EU", "GB"]);

        let ancestors: Vec<_> = market.ancestors("DE").iter().map(|v| v.value()).collect();
        assert_eq!(ancestors, vec!["EU", "WORLD"]);

        let descendants: Vec<_> = market.descendants("WORLD").iter().map(|v| v.value()).collect();
        assert_eq!(descendants, vec!["EU", "DE", "GB"]);

        let roots: Vec<_> = market.root_values().iter().map(|v| v.value()).collect();
        assert_eq!(roots, vec!["WORLD"]);
    }

    #[test]
    fn test_generalization_relation() {
        let market = market();
        assert!(market.is_generalization_of("WORLD", "DE"));
        assert!(market.is_generalization_of("EU", "DE"));
        assert!(!market.is_generalization_of("DE", "DE"));
        assert!(!market.is_generalization_of("GB", "DE"));
        assert_eq!(market.specialization_depth_between("DE", "WORLD"), Some(2));
        assert_eq!(market.specialization_depth_between("DE", "DE"), Some(0));
        assert_eq!(market.specialization_depth_between("WORLD", "DE"), None);
    }

    #[test]
    fn test_missing_default_value() {
        let result = ContentDimension::new(
            identifier("language"),
            vec![ContentDimensionValue::new("en")],
            "de",
            vec![],
        );
        assert!(matches!(result, Err(ConfigurationError::MissingDefaultValue { .. })));
    }

    #[test]
    fn test_dangling_edge() {
        let result = ContentDimension::new(
            identifier("language"),
            vec![ContentDimensionValue::new("en")],
            "en",
            vec![VariationEdge::new("en_GB", "en")],
        );
        assert!(matches!(result, Err(ConfigurationError::DanglingEdge { token, .. }) if token == "en_GB"));
    }

    #[test]
    fn test_edge_cycle() {
        let result = ContentDimension::new(
            identifier("language"),
            vec![
                ContentDimensionValue::new("a"),
                ContentDimensionValue::new("b"),
                ContentDimensionValue::new("c"),
            ],
            "a",
            vec![
                VariationEdge::new("a", "b"),
                VariationEdge::new("b", "c"),
                VariationEdge::new("c", "a"),
            ],
        );
        assert!(matches!(result, Err(ConfigurationError::EdgeCycle { .. })));

        let self_loop = ContentDimension::new(
            identifier("language"),
            vec![ContentDimensionValue::new("a")],
            "a",
            vec![VariationEdge::new("a", "a")],
        );
        assert!(matches!(self_loop, Err(ConfigurationError::EdgeCycle { .. })));
    }

    #[test]
    fn test_multiple_generalizations() {
        let result = ContentDimension::new(
            identifier("language"),
            vec![
                ContentDimensionValue::new("en"),
                ContentDimensionValue::new("de"),
                ContentDimensionValue::new("en_DE"),
            ],
            "en",
            vec![VariationEdge::new("en_DE", "en"), VariationEdge::new("en_DE", "de")],
        );
        assert!(matches!(result, Err(ConfigurationError::MultipleGeneralizations { .. })));
    }

    #[test]
    fn test_inconsistent_declared_depth() {
        let result = ContentDimension::new(
            identifier("language"),
            vec![
                ContentDimensionValue::new("en"),
                ContentDimensionValue::new("en_GB").with_specialization_depth(3),
            ],
            "en",
            vec![VariationEdge::new("en_GB", "en")],
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::InconsistentSpecializationDepth { declared: 3, derived: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_value() {
        let result = ContentDimension::new(
            identifier("language"),
            vec![ContentDimensionValue::new("en"), ContentDimensionValue::new("en")],
            "en",
            vec![],
        );
        assert!(matches!(result, Err(ConfigurationError::DuplicateValue { .. })));
    }
}
