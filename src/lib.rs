//! # dimspace
//!
//! Multi-axis content variation: content exists in variants along
//! independent dimensions (market, language, channel, ...), and each
//! dimension orders its values from general to specific ("GB" specializes
//! "WORLD").
//!
//! dimspace computes, once, from a static configuration:
//!
//! - the complete set of allowed dimension combinations
//! - the specialization partial order over that set
//! - deterministic weights, comparisons and fallback points used to pick the
//!   best matching variant for a request
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! dimspace --config dimensions.json combinations
//! dimspace --config dimensions.json fallback '{"market":"GB","language":"de"}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use dimspace::prelude::*;
//!
//! let space = dimspace::config::load("dimensions.json").unwrap();
//! let point = DimensionSpacePoint::from_json(r#"{"market":"GB","language":"de"}"#).unwrap();
//! for fallback in space.fallback_chain(&point).unwrap() {
//!     println!("{}", fallback);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - [`dimspace-core`](https://docs.rs/dimspace-core) - Dimensions, points, zookeeper, variation graph, engine
//! - [`dimspace-config`](https://docs.rs/dimspace-config) - JSON configuration descriptors

// Re-export core types
pub use dimspace_core::{
    ConfigurationError, ConstraintTable, ContentDimension, ContentDimensionConstraints,
    ContentDimensionIdentifier, ContentDimensionSource, ContentDimensionValue,
    ContentDimensionZookeeper, DimensionSpace, DimensionSpaceBuilder, DimensionSpacePoint,
    DimensionSpacePointSet, Error, InMemoryContentDimensionSource,
    InterDimensionalVariationGraph, ResolutionOptions, Result, VariantType, VariationEdge,
    VariationWeight,
};

/// Configuration loading
pub mod config {
    pub use dimspace_config::{
        load, ConfigError, ConstraintDescriptor, DimensionDescriptor, DimensionSpaceDescriptor,
        ValueDescriptor,
    };
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ContentDimension, ContentDimensionIdentifier, ContentDimensionValue, DimensionSpace,
        DimensionSpacePoint, DimensionSpacePointSet, Error, InterDimensionalVariationGraph,
        Result, VariantType, VariationEdge, VariationWeight,
    };
    pub use crate::config::DimensionSpaceDescriptor;
}
