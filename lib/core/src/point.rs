//! Dimension space points and point sets
//!
//! A point is one coordinate in the dimension space: one value token per
//! configured dimension. Points are immutable and hashable; they are the
//! keys the content graph uses to address variants.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use crate::dimension::ContentDimensionIdentifier;

/// A coordinate in the dimension space
///
/// Coordinates are kept sorted by identifier so that equality, hashing and
/// the JSON form do not depend on construction order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionSpacePoint {
    coordinates: BTreeMap<ContentDimensionIdentifier, String>,
}

impl DimensionSpacePoint {
    #[inline]
    #[must_use]
    pub fn new(coordinates: BTreeMap<ContentDimensionIdentifier, String>) -> Self {
        Self { coordinates }
    }

    /// Build a point from `(dimension, value)` pairs, validating identifiers.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, crate::error::ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let coordinates = pairs
            .into_iter()
            .map(|(dimension, value)| Ok((ContentDimensionIdentifier::new(dimension)?, value.into())))
            .collect::<Result<_, crate::error::ConfigurationError>>()?;
        Ok(Self { coordinates })
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Canonical JSON, keys sorted
    pub fn to_json(&self) -> String {
        // a map of strings always serializes
        serde_json::to_string(&self.coordinates).unwrap_or_default()
    }

    #[inline]
    pub fn coordinate(&self, dimension: &str) -> Option<&str> {
        self.coordinates.get(dimension).map(String::as_str)
    }

    #[inline]
    pub fn coordinates(&self) -> &BTreeMap<ContentDimensionIdentifier, String> {
        &self.coordinates
    }

    #[inline]
    pub fn dimension_count(&self) -> usize {
        self.coordinates.len()
    }

    /// Copy of this point with one coordinate replaced (or added)
    #[must_use]
    pub fn vary(&self, dimension: &ContentDimensionIdentifier, value: impl Into<String>) -> Self {
        let mut coordinates = self.coordinates.clone();
        coordinates.insert(dimension.clone(), value.into());
        Self { coordinates }
    }

    /// Whether `other` differs from this point in exactly `dimension`
    pub fn is_direct_variant_in_dimension(
        &self,
        other: &DimensionSpacePoint,
        dimension: &ContentDimensionIdentifier,
    ) -> bool {
        if self.coordinates.len() != other.coordinates.len() {
            return false;
        }
        let mut differs_in_dimension = false;
        for (identifier, value) in &self.coordinates {
            match other.coordinates.get(identifier) {
                Some(other_value) if other_value == value => {}
                Some(_) if identifier == dimension => differs_in_dimension = true,
                _ => return false,
            }
        }
        differs_in_dimension
    }

    /// Stable content hash (hex SHA-256 of the canonical JSON)
    pub fn content_hash(&self) -> String {
        let digest = Sha256::digest(self.to_json().as_bytes());
        format!("{:x}", digest)
    }
}

impl fmt::Display for DimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

/// A set of dimension space points with deterministic iteration order
///
/// Iteration follows insertion order; membership and equality ignore it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<DimensionSpacePoint>", into = "Vec<DimensionSpacePoint>")]
pub struct DimensionSpacePointSet {
    points: Vec<DimensionSpacePoint>,
    members: AHashSet<DimensionSpacePoint>,
}

impl DimensionSpacePointSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point, returning `false` if it was already present
    pub fn insert(&mut self, point: DimensionSpacePoint) -> bool {
        if self.members.contains(&point) {
            return false;
        }
        self.members.insert(point.clone());
        self.points.push(point);
        true
    }

    #[inline]
    pub fn contains(&self, point: &DimensionSpacePoint) -> bool {
        self.members.contains(point)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, DimensionSpacePoint> {
        self.points.iter()
    }

    #[inline]
    pub fn points(&self) -> &[DimensionSpacePoint] {
        &self.points
    }

    /// Points of `self` followed by the points of `other` not yet present
    #[must_use]
    pub fn union(&self, other: &DimensionSpacePointSet) -> Self {
        let mut union = self.clone();
        for point in other {
            union.insert(point.clone());
        }
        union
    }

    /// Points of `self` also present in `other`, in `self`'s order
    #[must_use]
    pub fn intersection(&self, other: &DimensionSpacePointSet) -> Self {
        self.iter().filter(|point| other.contains(point)).cloned().collect()
    }

    /// Points of `self` not present in `other`, in `self`'s order
    #[must_use]
    pub fn difference(&self, other: &DimensionSpacePointSet) -> Self {
        self.iter().filter(|point| !other.contains(point)).cloned().collect()
    }

    /// Points keyed by their content hash
    pub fn points_by_hash(&self) -> AHashMap<String, &DimensionSpacePoint> {
        self.points.iter().map(|point| (point.content_hash(), point)).collect()
    }
}

impl PartialEq for DimensionSpacePointSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for DimensionSpacePointSet {}

impl FromIterator<DimensionSpacePoint> for DimensionSpacePointSet {
    fn from_iter<T: IntoIterator<Item = DimensionSpacePoint>>(iter: T) -> Self {
        let mut set = Self::new();
        for point in iter {
            set.insert(point);
        }
        set
    }
}

impl From<Vec<DimensionSpacePoint>> for DimensionSpacePointSet {
    fn from(points: Vec<DimensionSpacePoint>) -> Self {
        points.into_iter().collect()
    }
}

impl From<DimensionSpacePointSet> for Vec<DimensionSpacePoint> {
    fn from(set: DimensionSpacePointSet) -> Self {
        set.points
    }
}

impl<'a> IntoIterator for &'a DimensionSpacePointSet {
    type Item = &'a DimensionSpacePoint;
    type IntoIter = std::slice::Iter<'a, DimensionSpacePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl IntoIterator for DimensionSpacePointSet {
    type Item = DimensionSpacePoint;
    type IntoIter = std::vec::IntoIter<DimensionSpacePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}
