//! Content dimension sources
//!
//! Where the engine gets its ordered dimensions from.

use ahash::AHashMap;

use crate::dimension::{ContentDimension, ContentDimensionIdentifier};
use crate::error::ConfigurationError;

/// Supplies the configured content dimensions
pub trait ContentDimensionSource: Send + Sync {
    fn dimension(&self, identifier: &str) -> Option<&ContentDimension>;

    /// All dimensions, in configuration order
    fn dimensions(&self) -> &[ContentDimension];

    fn identifiers(&self) -> Vec<&ContentDimensionIdentifier> {
        self.dimensions().iter().map(ContentDimension::identifier).collect()
    }
}

/// Dimensions held in memory, typically built by a configuration loader
#[derive(Debug, Clone)]
pub struct InMemoryContentDimensionSource {
    dimensions: Vec<ContentDimension>,
    index: AHashMap<ContentDimensionIdentifier, usize>,
}

impl InMemoryContentDimensionSource {
    pub fn new(dimensions: Vec<ContentDimension>) -> Result<Self, ConfigurationError> {
        if dimensions.is_empty() {
            return Err(ConfigurationError::NoDimensions);
        }
        let mut index = AHashMap::with_capacity(dimensions.len());
        for (position, dimension) in dimensions.iter().enumerate() {
            if index.insert(dimension.identifier().clone(), position).is_some() {
                return Err(ConfigurationError::DuplicateDimension(
                    dimension.identifier().to_string(),
                ));
            }
        }
        Ok(Self { dimensions, index })
    }
}

impl ContentDimensionSource for InMemoryContentDimensionSource {
    fn dimension(&self, identifier: &str) -> Option<&ContentDimension> {
        self.index.get(identifier).map(|position| &self.dimensions[*position])
    }

    fn dimensions(&self) -> &[ContentDimension] {
        &self.dimensions
    }
}
