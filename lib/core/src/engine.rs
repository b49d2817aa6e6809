//! The dimension space engine
//!
//! Built once during bootstrap from static configuration and then shared
//! read-only (behind an `Arc`) with every consumer. A configuration change
//! means building a new engine; there is no incremental update.

use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

use crate::constraint::ConstraintTable;
use crate::dimension::{ContentDimension, ContentDimensionIdentifier};
use crate::error::{ConfigurationError, Result};
use crate::point::{DimensionSpacePoint, DimensionSpacePointSet};
use crate::source::{ContentDimensionSource, InMemoryContentDimensionSource};
use crate::variation::{InterDimensionalVariationGraph, VariantType};
use crate::weight::VariationWeight;
use crate::zookeeper::ContentDimensionZookeeper;

/// Collects dimensions, constraints and fallback priority for [`DimensionSpace`]
#[derive(Debug, Default)]
pub struct DimensionSpaceBuilder {
    dimensions: Vec<ContentDimension>,
    constraints: ConstraintTable,
    priority: Option<Vec<ContentDimensionIdentifier>>,
}

impl DimensionSpaceBuilder {
    #[must_use]
    pub fn dimension(mut self, dimension: ContentDimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    #[must_use]
    pub fn dimensions(mut self, dimensions: impl IntoIterator<Item = ContentDimension>) -> Self {
        self.dimensions.extend(dimensions);
        self
    }

    #[must_use]
    pub fn constraints(mut self, constraints: ConstraintTable) -> Self {
        self.constraints = constraints;
        self
    }

    /// Fallback priority; configuration order when never set
    #[must_use]
    pub fn priority(mut self, priority: Vec<ContentDimensionIdentifier>) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Validate everything, enumerate the allowed subspace and build the
    /// variation graph. Fails without producing a partial engine.
    pub fn build(self) -> std::result::Result<Arc<DimensionSpace>, ConfigurationError> {
        let priority = self.priority.unwrap_or_else(|| {
            self.dimensions
                .iter()
                .map(|dimension| dimension.identifier().clone())
                .collect()
        });

        let source: Arc<dyn ContentDimensionSource> =
            Arc::new(InMemoryContentDimensionSource::new(self.dimensions)?);
        let zookeeper = Arc::new(ContentDimensionZookeeper::with_constraints(
            source,
            self.constraints,
        )?);
        for (dimension, value) in zookeeper.unreachable_values() {
            warn!(%dimension, value = %value, "constraints exclude this value from every allowed point");
        }
        let graph = InterDimensionalVariationGraph::new(zookeeper.clone(), &priority)?;

        info!(
            dimensions = zookeeper.source().dimensions().len(),
            points = zookeeper.allowed_combinations().len(),
            "dimension space built"
        );
        Ok(Arc::new(DimensionSpace { zookeeper, graph }))
    }
}

/// Read-only query surface over the configured dimension space
pub struct DimensionSpace {
    zookeeper: Arc<ContentDimensionZookeeper>,
    graph: InterDimensionalVariationGraph,
}

impl std::fmt::Debug for DimensionSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DimensionSpace").finish_non_exhaustive()
    }
}

impl DimensionSpace {
    #[inline]
    #[must_use]
    pub fn builder() -> DimensionSpaceBuilder {
        DimensionSpaceBuilder::default()
    }

    /// Dimensions in configuration order
    #[inline]
    pub fn dimensions(&self) -> &[ContentDimension] {
        self.zookeeper.source().dimensions()
    }

    #[inline]
    pub fn dimension(&self, identifier: &str) -> Option<&ContentDimension> {
        self.zookeeper.source().dimension(identifier)
    }

    #[inline]
    pub fn zookeeper(&self) -> &ContentDimensionZookeeper {
        &self.zookeeper
    }

    #[inline]
    pub fn variation_graph(&self) -> &InterDimensionalVariationGraph {
        &self.graph
    }

    #[inline]
    pub fn allowed_combinations(&self) -> &DimensionSpacePointSet {
        self.zookeeper.allowed_combinations()
    }

    #[inline]
    pub fn is_allowed(&self, point: &DimensionSpacePoint) -> bool {
        self.zookeeper.is_allowed(point)
    }

    /// Point holding every dimension's default value, if allowed
    pub fn default_point(&self) -> Option<DimensionSpacePoint> {
        let point = DimensionSpacePoint::new(
            self.dimensions()
                .iter()
                .map(|dimension| {
                    (dimension.identifier().clone(), dimension.default_value().value().to_string())
                })
                .collect(),
        );
        self.is_allowed(&point).then_some(point)
    }

    #[inline]
    pub fn weight(&self, point: &DimensionSpacePoint) -> Result<VariationWeight> {
        self.graph.weight(point)
    }

    #[inline]
    pub fn compare(&self, a: &DimensionSpacePoint, b: &DimensionSpacePoint) -> Result<Ordering> {
        self.graph.compare(a, b)
    }

    #[inline]
    pub fn variant_type(&self, subject: &DimensionSpacePoint, other: &DimensionSpacePoint) -> Result<VariantType> {
        self.graph.variant_type(subject, other)
    }

    #[inline]
    pub fn specializations(&self, point: &DimensionSpacePoint, include_self: bool) -> Result<DimensionSpacePointSet> {
        self.graph.specialization_set(point, include_self)
    }

    #[inline]
    pub fn generalizations(&self, point: &DimensionSpacePoint, include_self: bool) -> Result<DimensionSpacePointSet> {
        self.graph.generalization_set(point, include_self)
    }

    #[inline]
    pub fn primary_generalization(&self, point: &DimensionSpacePoint) -> Result<Option<DimensionSpacePoint>> {
        self.graph.primary_generalization(point)
    }

    #[inline]
    pub fn fallback_chain(&self, point: &DimensionSpacePoint) -> Result<Vec<DimensionSpacePoint>> {
        self.graph.fallback_chain(point)
    }
}
