//! Variation weights
//!
//! Per-dimension specialization depths of a point, in dimension configuration order.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::dimension::ContentDimensionIdentifier;

/// Specialization depth of a point's value on every axis, in dimension order
///
/// Weights are derived on demand and only used for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariationWeight {
    depths: Vec<(ContentDimensionIdentifier, u32)>,
}

impl VariationWeight {
    #[inline]
    #[must_use]
    pub fn new(depths: Vec<(ContentDimensionIdentifier, u32)>) -> Self {
        Self { depths }
    }

    pub fn get(&self, dimension: &str) -> Option<u32> {
        self.depths
            .iter()
            .find(|(identifier, _)| identifier.as_str() == dimension)
            .map(|(_, depth)| *depth)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&ContentDimensionIdentifier, u32)> {
        self.depths.iter().map(|(identifier, depth)| (identifier, *depth))
    }

    /// Sum of all depths; the number of single-axis generalization steps
    /// separating the point from its roots
    pub fn total(&self) -> u32 {
        self.depths.iter().map(|(_, depth)| depth).sum()
    }

    pub fn is_root(&self) -> bool {
        self.depths.iter().all(|(_, depth)| *depth == 0)
    }

    /// Weights are comparable when they cover the same dimensions in the same order
    pub fn can_be_compared_to(&self, other: &VariationWeight) -> bool {
        self.depths.len() == other.depths.len()
            && self
                .depths
                .iter()
                .zip(&other.depths)
                .all(|((a, _), (b, _))| a == b)
    }

    /// Whether every component is less than or equal to `other`'s
    pub fn is_dominated_by(&self, other: &VariationWeight) -> bool {
        self.can_be_compared_to(other)
            && self.depths.iter().zip(&other.depths).all(|((_, a), (_, b))| a <= b)
    }

    /// Component-wise difference `self - other`.
    ///
    /// `None` if the weights are incomparable or any component would drop
    /// below zero, i.e. `other` does not generalize `self` axis by axis.
    pub fn decreased_by(&self, other: &VariationWeight) -> Option<VariationWeight> {
        if !other.is_dominated_by(self) {
            return None;
        }
        Some(Self {
            depths: self
                .depths
                .iter()
                .zip(&other.depths)
                .map(|((identifier, a), (_, b))| (identifier.clone(), a - b))
                .collect(),
        })
    }

    /// Collapse into one number, reading the depths as digits in `base`
    /// with the first dimension most significant.
    ///
    /// `base` must exceed every depth for the result to preserve the
    /// lexicographic order of the weights.
    pub fn normalize(&self, base: u32) -> u64 {
        self.depths.iter().fold(0u64, |acc, (_, depth)| {
            acc.saturating_mul(u64::from(base)).saturating_add(u64::from(*depth))
        })
    }
}

impl Serialize for VariationWeight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.depths.len()))?;
        for (identifier, depth) in &self.depths {
            map.serialize_entry(identifier.as_str(), depth)?;
        }
        map.end()
    }
}
