//! Allowed combinations of content dimension values
//!
//! The zookeeper enumerates every point the configuration permits: one value
//! per dimension, minus the combinations ruled out by the constraint table.
//! The enumeration runs once and is cached for the zookeeper's lifetime.

use ahash::AHashSet;
use std::sync::{Arc, OnceLock};
use tracing::{info, trace};

use crate::constraint::ConstraintTable;
use crate::dimension::{ContentDimension, ContentDimensionIdentifier};
use crate::error::{ConfigurationError, Error, Result};
use crate::point::{DimensionSpacePoint, DimensionSpacePointSet};
use crate::source::ContentDimensionSource;

pub struct ContentDimensionZookeeper {
    source: Arc<dyn ContentDimensionSource>,
    constraints: ConstraintTable,
    allowed: OnceLock<DimensionSpacePointSet>,
}

impl ContentDimensionZookeeper {
    /// Zookeeper without cross-dimension constraints
    pub fn new(source: Arc<dyn ContentDimensionSource>) -> Self {
        Self {
            source,
            constraints: ConstraintTable::new(),
            allowed: OnceLock::new(),
        }
    }

    /// Zookeeper honouring `constraints`, which must only reference known
    /// dimensions and values
    pub fn with_constraints(
        source: Arc<dyn ContentDimensionSource>,
        constraints: ConstraintTable,
    ) -> std::result::Result<Self, ConfigurationError> {
        constraints.validate(source.dimensions())?;
        Ok(Self {
            source,
            constraints,
            allowed: OnceLock::new(),
        })
    }

    #[inline]
    pub fn source(&self) -> &Arc<dyn ContentDimensionSource> {
        &self.source
    }

    #[inline]
    pub fn constraints(&self) -> &ConstraintTable {
        &self.constraints
    }

    /// Every permitted point, in depth-first construction order
    pub fn allowed_combinations(&self) -> &DimensionSpacePointSet {
        self.allowed.get_or_init(|| {
            let allowed = self.enumerate();
            info!(points = allowed.len(), "allowed dimension subspace computed");
            allowed
        })
    }

    #[inline]
    pub fn is_allowed(&self, point: &DimensionSpacePoint) -> bool {
        self.allowed_combinations().contains(point)
    }

    /// Like [`is_allowed`](Self::is_allowed), but tells incomplete points
    /// apart from complete ones the constraints rule out
    pub fn ensure_allowed(&self, point: &DimensionSpacePoint) -> Result<()> {
        if self.is_allowed(point) {
            return Ok(());
        }
        let dimensions = self.source.dimensions();
        let complete = point.dimension_count() == dimensions.len()
            && dimensions
                .iter()
                .all(|dimension| point.coordinate(dimension.identifier().as_str()).is_some());
        if complete {
            Err(Error::PointNotInAllowedSubspace(point.clone()))
        } else {
            Err(Error::IncompletePoint { point: point.clone() })
        }
    }

    /// Depth-first construction over dimensions in configuration order.
    ///
    /// Each stack entry holds the value positions fixed so far, one per
    /// leading dimension. A branch whose next dimension has no candidate
    /// left is dropped without descending further.
    fn enumerate(&self) -> DimensionSpacePointSet {
        let dimensions = self.source.dimensions();
        let mut allowed = DimensionSpacePointSet::new();
        let mut stack: Vec<Vec<usize>> = vec![Vec::with_capacity(dimensions.len())];

        while let Some(partial) = stack.pop() {
            let level = partial.len();
            if level == dimensions.len() {
                allowed.insert(point_from(dimensions, &partial));
                continue;
            }

            let dimension = &dimensions[level];
            let candidates: Vec<usize> = dimension
                .values()
                .iter()
                .enumerate()
                .filter(|(_, value)| {
                    partial.iter().enumerate().all(|(fixed_level, fixed)| {
                        let fixed_dimension = &dimensions[fixed_level];
                        self.constraints.can_be_combined(
                            (fixed_dimension.identifier(), fixed_dimension.values()[*fixed].value()),
                            (dimension.identifier(), value.value()),
                        )
                    })
                })
                .map(|(position, _)| position)
                .collect();

            if candidates.is_empty() {
                trace!(dimension = %dimension.identifier(), level, "branch pruned");
                continue;
            }

            // reversed so the first candidate is popped first
            for candidate in candidates.into_iter().rev() {
                let mut next = partial.clone();
                next.push(candidate);
                stack.push(next);
            }
        }

        allowed
    }

    /// Configured values that no allowed point uses, in configuration order
    pub fn unreachable_values(&self) -> Vec<(ContentDimensionIdentifier, String)> {
        let mut used: AHashSet<(&str, &str)> = AHashSet::new();
        for point in self.allowed_combinations() {
            for (identifier, value) in point.coordinates() {
                used.insert((identifier.as_str(), value.as_str()));
            }
        }

        self.source
            .dimensions()
            .iter()
            .flat_map(|dimension| {
                dimension
                    .values()
                    .iter()
                    .map(move |value| (dimension.identifier(), value.value()))
            })
            .filter(|(identifier, value)| !used.contains(&(identifier.as_str(), *value)))
            .map(|(identifier, value)| (identifier.clone(), value.to_string()))
            .collect()
    }
}

fn point_from(dimensions: &[ContentDimension], positions: &[usize]) -> DimensionSpacePoint {
    DimensionSpacePoint::new(
        dimensions
            .iter()
            .zip(positions)
            .map(|(dimension, position)| {
                (dimension.identifier().clone(), dimension.values()[*position].value().to_string())
            })
            .collect(),
    )
}
