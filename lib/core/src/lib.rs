//! # dimspace Core
//!
//! Core library for the dimspace content dimension engine.
//!
//! Content exists in variants along independent axes ("dimensions", e.g.
//! market or language). Each axis orders its values from general to
//! specific. This crate computes, from a fixed configuration:
//!
//! - [`ContentDimension`] - one axis with its values and variation edges
//! - [`DimensionSpacePoint`] / [`DimensionSpacePointSet`] - coordinates and set algebra
//! - [`ContentDimensionZookeeper`] - every combination the configuration allows
//! - [`InterDimensionalVariationGraph`] - the specialization partial order,
//!   weights, comparisons and fallback resolution
//! - [`DimensionSpace`] - the engine bundling all of the above
//!
//! ## Example
//!
//! ```rust
//! use dimspace_core::{
//!     ContentDimension, ContentDimensionIdentifier, ContentDimensionValue,
//!     DimensionSpace, DimensionSpacePoint, VariationEdge,
//! };
//!
//! let market = ContentDimension::new(
//!     ContentDimensionIdentifier::new("market").unwrap(),
//!     vec![ContentDimensionValue::new("WORLD"), ContentDimensionValue::new("GB")],
//!     "WORLD",
//!     vec![VariationEdge::new("GB", "WORLD")],
//! )
//! .unwrap();
//! let language = ContentDimension::new(
//!     ContentDimensionIdentifier::new("language").unwrap(),
//!     vec![ContentDimensionValue::new("en"), ContentDimensionValue::new("de")],
//!     "en",
//!     vec![],
//! )
//! .unwrap();
//!
//! let space = DimensionSpace::builder()
//!     .dimension(market)
//!     .dimension(language)
//!     .build()
//!     .unwrap();
//! assert_eq!(space.allowed_combinations().len(), 4);
//!
//! let gb_de = DimensionSpacePoint::from_pairs([("market", "GB"), ("language", "de")]).unwrap();
//! let fallback = space.primary_generalization(&gb_de).unwrap();
//! assert_eq!(fallback.unwrap().coordinate("market"), Some("WORLD"));
//! ```

pub mod constraint;
pub mod dimension;
pub mod engine;
pub mod error;
pub mod point;
pub mod source;
pub mod variation;
pub mod weight;
pub mod zookeeper;

pub use constraint::{ConstraintTable, ContentDimensionConstraints};
pub use dimension::{
    ContentDimension, ContentDimensionIdentifier, ContentDimensionValue, ResolutionOptions,
    VariationEdge,
};
pub use engine::{DimensionSpace, DimensionSpaceBuilder};
pub use error::{ConfigurationError, Error, Result};
pub use point::{DimensionSpacePoint, DimensionSpacePointSet};
pub use source::{ContentDimensionSource, InMemoryContentDimensionSource};
pub use variation::{InterDimensionalVariationGraph, VariantType};
pub use weight::VariationWeight;
pub use zookeeper::ContentDimensionZookeeper;
