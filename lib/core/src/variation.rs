//! Inter-dimensional variation graph
//!
//! Point `a` generalizes point `b` when, on every axis, `a`'s value equals
//! `b`'s value or is one of its ancestors in that axis' variation tree. The
//! relation is the product of the per-axis tree orders and therefore a
//! partial order: two points specialized along different axes (or holding
//! unrelated values on some axis) are incomparable.
//!
//! Fallback needs a total order, which the graph provides separately through
//! [`InterDimensionalVariationGraph::primary_generalization`], driven by an
//! explicit dimension priority list.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

use crate::dimension::{ContentDimension, ContentDimensionIdentifier};
use crate::error::{ConfigurationError, Error, Result};
use crate::point::{DimensionSpacePoint, DimensionSpacePointSet};
use crate::weight::VariationWeight;
use crate::zookeeper::ContentDimensionZookeeper;

/// How a point relates to another one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantType {
    Same,
    /// The subject is more specific than the other point
    Specialization,
    /// The subject is more general than the other point
    Generalization,
    /// Neither generalizes the other
    Peer,
}

type Closures = AHashMap<DimensionSpacePoint, DimensionSpacePointSet>;

pub struct InterDimensionalVariationGraph {
    zookeeper: Arc<ContentDimensionZookeeper>,
    /// Dimension positions, highest fallback priority first
    priority: Vec<usize>,
    normalization_base: u32,
    // inclusive closures (the point itself is a member), keyed by point
    specializations: Closures,
    generalizations: Closures,
    roots: DimensionSpacePointSet,
}

impl InterDimensionalVariationGraph {
    /// Build the graph over the zookeeper's allowed subspace.
    ///
    /// `priority` lists every configured dimension exactly once, in the
    /// order in which primary generalization falls back.
    pub fn new(
        zookeeper: Arc<ContentDimensionZookeeper>,
        priority: &[ContentDimensionIdentifier],
    ) -> std::result::Result<Self, ConfigurationError> {
        let dimensions = zookeeper.source().dimensions();
        if priority.len() != dimensions.len() {
            return Err(ConfigurationError::InvalidPriority(format!(
                "expected {} dimensions, got {}",
                dimensions.len(),
                priority.len()
            )));
        }

        let mut positions = Vec::with_capacity(priority.len());
        for identifier in priority {
            let position = dimensions
                .iter()
                .position(|dimension| dimension.identifier() == identifier)
                .ok_or_else(|| {
                    ConfigurationError::InvalidPriority(format!("unknown dimension '{}'", identifier))
                })?;
            if positions.contains(&position) {
                return Err(ConfigurationError::InvalidPriority(format!(
                    "dimension '{}' listed twice",
                    identifier
                )));
            }
            positions.push(position);
        }

        Ok(Self::from_positions(zookeeper, positions))
    }

    /// Graph whose fallback priority is the configuration order
    pub fn with_configuration_order(zookeeper: Arc<ContentDimensionZookeeper>) -> Self {
        let positions = (0..zookeeper.source().dimensions().len()).collect();
        Self::from_positions(zookeeper, positions)
    }

    fn from_positions(zookeeper: Arc<ContentDimensionZookeeper>, priority: Vec<usize>) -> Self {
        let normalization_base = zookeeper
            .source()
            .dimensions()
            .iter()
            .map(ContentDimension::maximum_depth)
            .max()
            .unwrap_or(0)
            + 1;

        let (specializations, generalizations) =
            index_closures(zookeeper.source().dimensions(), zookeeper.allowed_combinations());
        let roots = zookeeper
            .allowed_combinations()
            .iter()
            .filter(|point| generalizations.get(*point).map_or(true, |closure| closure.len() == 1))
            .cloned()
            .collect();

        let graph = Self {
            zookeeper,
            priority,
            normalization_base,
            specializations,
            generalizations,
            roots,
        };

        info!(
            points = graph.allowed_combinations().len(),
            roots = graph.roots.len(),
            normalization_base,
            "inter-dimensional variation graph initialized"
        );
        graph
    }

    #[inline]
    pub fn allowed_combinations(&self) -> &DimensionSpacePointSet {
        self.zookeeper.allowed_combinations()
    }

    #[inline]
    pub fn is_allowed(&self, point: &DimensionSpacePoint) -> bool {
        self.zookeeper.is_allowed(point)
    }

    #[inline]
    pub fn zookeeper(&self) -> &Arc<ContentDimensionZookeeper> {
        &self.zookeeper
    }

    /// Dimension identifiers in fallback priority order
    pub fn priority(&self) -> Vec<&ContentDimensionIdentifier> {
        let dimensions = self.dimensions();
        self.priority
            .iter()
            .map(|position| dimensions[*position].identifier())
            .collect()
    }

    /// One more than the deepest value of any dimension
    #[inline]
    pub fn weight_normalization_base(&self) -> u32 {
        self.normalization_base
    }

    pub fn weight(&self, point: &DimensionSpacePoint) -> Result<VariationWeight> {
        self.zookeeper.ensure_allowed(point)?;
        Ok(self.weight_of(point))
    }

    /// Order two allowed points by specialization.
    ///
    /// `Less` means `a` generalizes `b`, `Greater` means `a` specializes `b`.
    pub fn compare(&self, a: &DimensionSpacePoint, b: &DimensionSpacePoint) -> Result<Ordering> {
        self.zookeeper.ensure_allowed(a)?;
        self.zookeeper.ensure_allowed(b)?;
        if a == b {
            Ok(Ordering::Equal)
        } else if self.generalizes_or_equals(a, b) {
            Ok(Ordering::Less)
        } else if self.generalizes_or_equals(b, a) {
            Ok(Ordering::Greater)
        } else {
            Err(Error::IncomparableWeights {
                a: a.clone(),
                b: b.clone(),
            })
        }
    }

    /// How `subject` relates to `other`; never fails on incomparable points
    pub fn variant_type(&self, subject: &DimensionSpacePoint, other: &DimensionSpacePoint) -> Result<VariantType> {
        match self.compare(subject, other) {
            Ok(Ordering::Equal) => Ok(VariantType::Same),
            Ok(Ordering::Greater) => Ok(VariantType::Specialization),
            Ok(Ordering::Less) => Ok(VariantType::Generalization),
            Err(Error::IncomparableWeights { .. }) => Ok(VariantType::Peer),
            Err(error) => Err(error),
        }
    }

    /// Fail with [`Error::NotASpecialization`] unless `specialization` is
    /// strictly more specific than `generalization`
    pub fn ensure_specialization(
        &self,
        specialization: &DimensionSpacePoint,
        generalization: &DimensionSpacePoint,
    ) -> Result<()> {
        match self.compare(specialization, generalization) {
            Ok(Ordering::Greater) => Ok(()),
            Ok(_) | Err(Error::IncomparableWeights { .. }) => Err(Error::NotASpecialization {
                specialization: specialization.clone(),
                generalization: generalization.clone(),
            }),
            Err(error) => Err(error),
        }
    }

    /// Allowed points at least as specific as `point`, in allowed-set order
    pub fn specialization_set(&self, point: &DimensionSpacePoint, include_self: bool) -> Result<DimensionSpacePointSet> {
        self.zookeeper.ensure_allowed(point)?;
        Ok(without_origin(self.specializations.get(point), point, include_self))
    }

    /// [`specialization_set`](Self::specialization_set) minus `excluded`
    pub fn specialization_set_excluding(
        &self,
        point: &DimensionSpacePoint,
        include_self: bool,
        excluded: &DimensionSpacePointSet,
    ) -> Result<DimensionSpacePointSet> {
        Ok(self.specialization_set(point, include_self)?.difference(excluded))
    }

    /// Allowed points at least as general as `point`, in allowed-set order
    pub fn generalization_set(&self, point: &DimensionSpacePoint, include_self: bool) -> Result<DimensionSpacePointSet> {
        self.zookeeper.ensure_allowed(point)?;
        Ok(without_origin(self.generalizations.get(point), point, include_self))
    }

    pub fn intersection(&self, a: &DimensionSpacePointSet, b: &DimensionSpacePointSet) -> DimensionSpacePointSet {
        a.intersection(b)
    }

    /// Strict generalizations of `point`, closest first.
    ///
    /// Closeness is the number of single-axis steps between the points; ties
    /// go to the candidate that has given up more on high-priority axes,
    /// which keeps the order consistent with primary generalization.
    pub fn indexed_generalizations(&self, point: &DimensionSpacePoint) -> Result<Vec<DimensionSpacePoint>> {
        let own = self.weight(point)?;
        let mut generalizations: Vec<(u32, u64, DimensionSpacePoint)> = self
            .generalization_set(point, false)?
            .into_iter()
            .map(|generalization| {
                let weight = self.weight_of(&generalization);
                let distance = own.total() - weight.total();
                (distance, self.priority_normalized(&weight), generalization)
            })
            .collect();
        generalizations.sort_by(|(da, na, _), (db, nb, _)| da.cmp(db).then(na.cmp(nb)));
        Ok(generalizations.into_iter().map(|(_, _, point)| point).collect())
    }

    /// The single fallback point used when no variant exists at `point`.
    ///
    /// Walks the dimensions in priority order and generalizes the first axis
    /// whose value has a direct generalization, provided the resulting point
    /// is allowed. When constraints rule out every single-axis step, the
    /// closest allowed generalization is used instead. `None` once no
    /// allowed generalization remains, which for unconstrained spaces is
    /// exactly the all-root point.
    pub fn primary_generalization(&self, point: &DimensionSpacePoint) -> Result<Option<DimensionSpacePoint>> {
        self.zookeeper.ensure_allowed(point)?;
        let dimensions = self.dimensions();
        for position in &self.priority {
            let dimension = &dimensions[*position];
            let Some(value) = point.coordinate(dimension.identifier().as_str()) else {
                continue;
            };
            if let Some(generalization) = dimension.generalization(value) {
                let candidate = point.vary(dimension.identifier(), generalization.value());
                if self.is_allowed(&candidate) {
                    return Ok(Some(candidate));
                }
            }
        }
        Ok(self.indexed_generalizations(point)?.into_iter().next())
    }

    /// `point` followed by its primary generalizations until none is left
    pub fn fallback_chain(&self, point: &DimensionSpacePoint) -> Result<Vec<DimensionSpacePoint>> {
        let mut chain = vec![point.clone()];
        let mut current = point.clone();
        while let Some(next) = self.primary_generalization(&current)? {
            chain.push(next.clone());
            current = next;
        }
        Ok(chain)
    }

    /// Allowed points without any allowed strict generalization
    #[inline]
    pub fn root_generalizations(&self) -> &DimensionSpacePointSet {
        &self.roots
    }

    fn dimensions(&self) -> &[ContentDimension] {
        self.zookeeper.source().dimensions()
    }

    fn weight_of(&self, point: &DimensionSpacePoint) -> VariationWeight {
        VariationWeight::new(
            self.dimensions()
                .iter()
                .map(|dimension| {
                    let depth = point
                        .coordinate(dimension.identifier().as_str())
                        .and_then(|value| dimension.value(value))
                        .map_or(0, |value| value.specialization_depth());
                    (dimension.identifier().clone(), depth)
                })
                .collect(),
        )
    }

    /// Weight digits read in priority order rather than configuration order
    fn priority_normalized(&self, weight: &VariationWeight) -> u64 {
        let dimensions = self.dimensions();
        self.priority.iter().fold(0u64, |acc, position| {
            let depth = weight
                .get(dimensions[*position].identifier().as_str())
                .unwrap_or(0);
            acc.saturating_mul(u64::from(self.normalization_base))
                .saturating_add(u64::from(depth))
        })
    }

    fn generalizes_or_equals(&self, general: &DimensionSpacePoint, special: &DimensionSpacePoint) -> bool {
        generalizes_or_equals(self.dimensions(), general, special)
    }
}

/// `general <= special` on every axis of the variation trees
fn generalizes_or_equals(
    dimensions: &[ContentDimension],
    general: &DimensionSpacePoint,
    special: &DimensionSpacePoint,
) -> bool {
    dimensions.iter().all(|dimension| {
        let identifier = dimension.identifier().as_str();
        match (general.coordinate(identifier), special.coordinate(identifier)) {
            (Some(g), Some(s)) => dimension.specialization_depth_between(s, g).is_some(),
            _ => false,
        }
    })
}

/// Inclusive specialization and generalization closures of every allowed
/// point. Both keep allowed-set order.
fn index_closures(dimensions: &[ContentDimension], allowed: &DimensionSpacePointSet) -> (Closures, Closures) {
    let mut specializations = Closures::with_capacity(allowed.len());
    let mut generalizations = Closures::with_capacity(allowed.len());
    for general in allowed {
        for special in allowed {
            if generalizes_or_equals(dimensions, general, special) {
                specializations
                    .entry(general.clone())
                    .or_default()
                    .insert(special.clone());
                generalizations
                    .entry(special.clone())
                    .or_default()
                    .insert(general.clone());
            }
        }
    }
    debug!(
        relations = specializations.values().map(DimensionSpacePointSet::len).sum::<usize>(),
        "variation closures indexed"
    );
    (specializations, generalizations)
}

fn without_origin(
    closure: Option<&DimensionSpacePointSet>,
    origin: &DimensionSpacePoint,
    include_self: bool,
) -> DimensionSpacePointSet {
    let Some(closure) = closure else {
        return DimensionSpacePointSet::default();
    };
    if include_self {
        closure.clone()
    } else {
        closure.iter().filter(|point| *point != origin).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintTable;
    use crate::dimension::{ContentDimensionValue, VariationEdge};
    use crate::source::{ContentDimensionSource, InMemoryContentDimensionSource};

    fn id(name: &str) -> ContentDimensionIdentifier {
        ContentDimensionIdentifier::new(name).unwrap()
    }

    fn point(market: &str, language: &str) -> DimensionSpacePoint {
        DimensionSpacePoint::from_pairs([("market", market), ("language", language)]).unwrap()
    }

    fn dimensions() -> Vec<ContentDimension> {
        vec![
            ContentDimension::new(
                id("market"),
                vec![
                    ContentDimensionValue::new("WORLD"),
                    ContentDimensionValue::new("GB"),
                    ContentDimensionValue::new("DE"),
                ],
                "WORLD",
                vec![VariationEdge::new("GB", "WORLD"), VariationEdge::new("DE", "WORLD")],
            )
            .unwrap(),
            ContentDimension::new(
                id("language"),
                vec![
                    ContentDimensionValue::new("en"),
                    ContentDimensionValue::new("en_GB"),
                    ContentDimensionValue::new("de"),
                ],
                "en",
                vec![VariationEdge::new("en_GB", "en")],
            )
            .unwrap(),
        ]
    }

    fn graph_with(constraints: ConstraintTable, priority: &[&str]) -> InterDimensionalVariationGraph {
        let source: Arc<dyn ContentDimensionSource> =
            Arc::new(InMemoryContentDimensionSource::new(dimensions()).unwrap());
        let zookeeper = Arc::new(ContentDimensionZookeeper::with_constraints(source, constraints).unwrap());
        let priority: Vec<_> = priority.iter().map(|name| id(name)).collect();
        InterDimensionalVariationGraph::new(zookeeper, &priority).unwrap()
    }

    fn graph() -> InterDimensionalVariationGraph {
        graph_with(ConstraintTable::new(), &["market", "language"])
    }

    #[test]
    fn test_weight() {
        let graph = graph();
        let weight = graph.weight(&point("GB", "en_GB")).unwrap();
        assert_eq!(weight.get("market"), Some(1));
        assert_eq!(weight.get("language"), Some(1));
        assert!(graph.weight(&point("WORLD", "de")).unwrap().is_root());
        assert_eq!(graph.weight_normalization_base(), 2);
    }

    #[test]
    fn test_compare() {
        let graph = graph();
        assert_eq!(graph.compare(&point("GB", "en_GB"), &point("WORLD", "en")).unwrap(), Ordering::Greater);
        assert_eq!(graph.compare(&point("WORLD", "en"), &point("GB", "en")).unwrap(), Ordering::Less);
        assert_eq!(graph.compare(&point("DE", "de"), &point("DE", "de")).unwrap(), Ordering::Equal);
        // same weights, different values
        assert!(matches!(
            graph.compare(&point("GB", "de"), &point("DE", "de")),
            Err(Error::IncomparableWeights { .. })
        ));
        // diverging along different axes
        assert!(matches!(
            graph.compare(&point("GB", "en"), &point("WORLD", "en_GB")),
            Err(Error::IncomparableWeights { .. })
        ));
    }

    #[test]
    fn test_queries_reject_points_outside_the_subspace() {
        let graph = graph();
        let unknown = point("FR", "en");
        assert!(matches!(graph.weight(&unknown), Err(Error::PointNotInAllowedSubspace(_))));
        assert!(matches!(
            graph.compare(&unknown, &point("WORLD", "en")),
            Err(Error::PointNotInAllowedSubspace(_))
        ));
        assert!(graph.specialization_set(&unknown, true).is_err());
        assert!(graph.primary_generalization(&unknown).is_err());
    }

    #[test]
    fn test_specialization_and_generalization_sets() {
        let graph = graph();
        let specializations = graph.specialization_set(&point("WORLD", "en"), false).unwrap();
        assert_eq!(
            specializations.points(),
            &[
                point("WORLD", "en_GB"),
                point("GB", "en"),
                point("GB", "en_GB"),
                point("DE", "en"),
                point("DE", "en_GB"),
            ]
        );

        let with_self = graph.specialization_set(&point("WORLD", "en"), true).unwrap();
        assert_eq!(with_self.len(), 6);
        assert!(with_self.contains(&point("WORLD", "en")));

        let generalizations = graph.generalization_set(&point("GB", "en_GB"), false).unwrap();
        assert_eq!(
            generalizations.points(),
            &[point("WORLD", "en"), point("WORLD", "en_GB"), point("GB", "en")]
        );

        // closures are indexed once; repeated queries agree
        assert_eq!(graph.specialization_set(&point("WORLD", "en"), false).unwrap(), specializations);
    }

    #[test]
    fn test_specialization_set_excluding() {
        let graph = graph();
        let excluded: DimensionSpacePointSet = vec![point("GB", "en"), point("GB", "en_GB")].into();
        let remaining = graph
            .specialization_set_excluding(&point("WORLD", "en"), true, &excluded)
            .unwrap();
        assert_eq!(
            remaining.points(),
            &[point("WORLD", "en"), point("WORLD", "en_GB"), point("DE", "en"), point("DE", "en_GB")]
        );
    }

    #[test]
    fn test_variant_type_and_ensure_specialization() {
        let graph = graph();
        assert_eq!(graph.variant_type(&point("GB", "en"), &point("WORLD", "en")).unwrap(), VariantType::Specialization);
        assert_eq!(graph.variant_type(&point("WORLD", "en"), &point("GB", "en")).unwrap(), VariantType::Generalization);
        assert_eq!(graph.variant_type(&point("GB", "en"), &point("GB", "en")).unwrap(), VariantType::Same);
        assert_eq!(graph.variant_type(&point("GB", "en"), &point("DE", "en")).unwrap(), VariantType::Peer);

        assert!(graph.ensure_specialization(&point("GB", "en"), &point("WORLD", "en")).is_ok());
        assert!(matches!(
            graph.ensure_specialization(&point("WORLD", "en"), &point("GB", "en")),
            Err(Error::NotASpecialization { .. })
        ));
        assert!(matches!(
            graph.ensure_specialization(&point("GB", "en"), &point("GB", "en")),
            Err(Error::NotASpecialization { .. })
        ));
    }

    #[test]
    fn test_primary_generalization_follows_priority() {
        let graph = graph();
        assert_eq!(
            graph.primary_generalization(&point("GB", "en_GB")).unwrap(),
            Some(point("WORLD", "en_GB"))
        );
        assert_eq!(
            graph.primary_generalization(&point("WORLD", "en_GB")).unwrap(),
            Some(point("WORLD", "en"))
        );
        assert_eq!(graph.primary_generalization(&point("WORLD", "en")).unwrap(), None);

        let language_first = graph_with(ConstraintTable::new(), &["language", "market"]);
        assert_eq!(
            language_first.primary_generalization(&point("GB", "en_GB")).unwrap(),
            Some(point("GB", "en"))
        );
    }

    #[test]
    fn test_primary_generalization_skips_disallowed_steps() {
        let constraints = ConstraintTable::new().disallow(id("market"), "WORLD", id("language"), ["en_GB"]);
        let graph = graph_with(constraints, &["market", "language"]);
        assert!(!graph.is_allowed(&point("WORLD", "en_GB")));
        assert_eq!(
            graph.primary_generalization(&point("GB", "en_GB")).unwrap(),
            Some(point("GB", "en"))
        );
    }

    #[test]
    fn test_primary_generalization_when_every_single_step_is_blocked() {
        let constraints = ConstraintTable::new()
            .disallow(id("market"), "WORLD", id("language"), ["en_GB"])
            .disallow(id("market"), "GB", id("language"), ["en"]);
        let graph = graph_with(constraints, &["market", "language"]);
        assert!(!graph.is_allowed(&point("WORLD", "en_GB")));
        assert!(!graph.is_allowed(&point("GB", "en")));

        assert_eq!(
            graph.primary_generalization(&point("GB", "en_GB")).unwrap(),
            Some(point("WORLD", "en"))
        );
        let chain = graph.fallback_chain(&point("GB", "en_GB")).unwrap();
        assert_eq!(chain, vec![point("GB", "en_GB"), point("WORLD", "en")]);
    }

    #[test]
    fn test_indexed_closures_match_pairwise_comparison() {
        let constraints = ConstraintTable::new().disallow(id("market"), "DE", id("language"), ["en_GB"]);
        let graph = graph_with(constraints, &["market", "language"]);
        let allowed = graph.allowed_combinations();

        for p in allowed {
            let specializations: DimensionSpacePointSet = allowed
                .iter()
                .filter(|q| matches!(graph.compare(p, q), Ok(Ordering::Less | Ordering::Equal)))
                .cloned()
                .collect();
            let generalizations: DimensionSpacePointSet = allowed
                .iter()
                .filter(|q| matches!(graph.compare(p, q), Ok(Ordering::Greater | Ordering::Equal)))
                .cloned()
                .collect();
            assert_eq!(graph.specialization_set(p, true).unwrap(), specializations);
            assert_eq!(graph.generalization_set(p, true).unwrap(), generalizations);
            assert_eq!(graph.root_generalizations().contains(p), generalizations.len() == 1);
        }
    }

    #[test]
    fn test_fallback_chain() {
        let graph = graph();
        assert_eq!(
            graph.fallback_chain(&point("GB", "en_GB")).unwrap(),
            vec![point("GB", "en_GB"), point("WORLD", "en_GB"), point("WORLD", "en")]
        );
    }

    #[test]
    fn test_indexed_generalizations() {
        let graph = graph();
        assert_eq!(
            graph.indexed_generalizations(&point("GB", "en_GB")).unwrap(),
            vec![point("WORLD", "en_GB"), point("GB", "en"), point("WORLD", "en")]
        );
    }

    #[test]
    fn test_root_generalizations() {
        let graph = graph();
        let roots = graph.root_generalizations();
        assert_eq!(roots.points(), &[point("WORLD", "en"), point("WORLD", "de")]);
    }

    #[test]
    fn test_invalid_priority() {
        let source: Arc<dyn ContentDimensionSource> =
            Arc::new(InMemoryContentDimensionSource::new(dimensions()).unwrap());
        let zookeeper = Arc::new(ContentDimensionZookeeper::new(source));
        for priority in [vec![id("market")], vec![id("market"), id("market")], vec![id("market"), id("channel")]] {
            assert!(matches!(
                InterDimensionalVariationGraph::new(zookeeper.clone(), &priority),
                Err(ConfigurationError::InvalidPriority(_))
            ));
        }
    }
}
