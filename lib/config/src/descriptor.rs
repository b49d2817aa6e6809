//! Dimension configuration descriptors
//!
//! Serde mirror of the JSON configuration format. Descriptors are plain
//! data; [`DimensionSpaceDescriptor::build`] validates them and produces the
//! engine.

use dimspace_core::{
    ConfigurationError, ConstraintTable, ContentDimension, ContentDimensionConstraints,
    ContentDimensionIdentifier, ContentDimensionValue, DimensionSpace, DimensionSpaceBuilder,
    ResolutionOptions, VariationEdge,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::ConfigError;

/// Key of the wildcard entry in the explicit constraint form
pub const WILDCARD: &str = "*";

/// Top-level configuration: ordered dimensions plus optional fallback priority
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionSpaceDescriptor {
    pub dimensions: Vec<DimensionDescriptor>,

    /// Dimension identifiers in fallback order; configuration order if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_priority: Option<Vec<String>>,
}

/// One dimension of the configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionDescriptor {
    pub identifier: String,

    /// Token of the default value
    pub default: String,

    pub values: Vec<ValueDescriptor>,

    /// value of this dimension -> other dimension -> constraint
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constraints: BTreeMap<String, BTreeMap<String, ConstraintDescriptor>>,

    #[serde(default)]
    pub resolution: ResolutionOptions,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configuration: BTreeMap<String, serde_json::Value>,
}

/// One value of a dimension
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueDescriptor {
    #[serde(alias = "token")]
    pub value: String,

    /// Direct generalization of this value, if any
    #[serde(default, alias = "generalizationToken", skip_serializing_if = "Option::is_none")]
    pub generalization: Option<String>,

    /// Must match the position in the variation tree when given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization_depth: Option<u32>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configuration: BTreeMap<String, serde_json::Value>,
}

/// Constraint on another dimension, in either of two forms:
///
/// - `["de", "fr"]`: these values are disallowed, all others allowed
/// - `{"*": false, "en": true}`: wildcard default plus per-value overrides
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ConstraintDescriptor {
    Disallowed(Vec<String>),
    Explicit(BTreeMap<String, bool>),
}

impl ConstraintDescriptor {
    pub fn to_constraints(&self) -> ContentDimensionConstraints {
        match self {
            ConstraintDescriptor::Disallowed(values) => {
                ContentDimensionConstraints::disallowing(values.iter().cloned())
            }
            ConstraintDescriptor::Explicit(entries) => ContentDimensionConstraints {
                wildcard_allowed: entries.get(WILDCARD).copied().unwrap_or(true),
                identifier_restrictions: entries
                    .iter()
                    .filter(|(token, _)| token.as_str() != WILDCARD)
                    .map(|(token, allowed)| (token.clone(), *allowed))
                    .collect(),
            },
        }
    }
}

impl DimensionDescriptor {
    pub fn to_dimension(&self) -> Result<ContentDimension, ConfigurationError> {
        let identifier = ContentDimensionIdentifier::new(self.identifier.as_str())?;

        let values = self
            .values
            .iter()
            .map(|descriptor| {
                let mut value = ContentDimensionValue::new(descriptor.value.as_str())
                    .with_specialization_depth(descriptor.specialization_depth.unwrap_or(0));
                for (key, attribute) in &descriptor.configuration {
                    value = value.with_configuration(key.as_str(), attribute.clone());
                }
                value
            })
            .collect();

        let edges = self
            .values
            .iter()
            .filter_map(|descriptor| {
                descriptor
                    .generalization
                    .as_ref()
                    .map(|generalization| VariationEdge::new(descriptor.value.as_str(), generalization.as_str()))
            })
            .collect();

        let dimension = ContentDimension::new(identifier, values, &self.default, edges)?
            .with_resolution(self.resolution.clone())
            .with_configuration(self.configuration.clone());

        // an explicit zero is "unset" for the core type, but not here
        for descriptor in &self.values {
            if let Some(declared) = descriptor.specialization_depth {
                let derived = dimension
                    .value(&descriptor.value)
                    .map_or(0, ContentDimensionValue::specialization_depth);
                if declared != derived {
                    return Err(ConfigurationError::InconsistentSpecializationDepth {
                        dimension: self.identifier.clone(),
                        token: descriptor.value.clone(),
                        declared,
                        derived,
                    });
                }
            }
        }

        debug!(dimension = %self.identifier, "dimension descriptor converted");
        Ok(dimension)
    }
}

impl DimensionSpaceDescriptor {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading dimension configuration");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_dimensions(&self) -> Result<Vec<ContentDimension>, ConfigurationError> {
        self.dimensions.iter().map(DimensionDescriptor::to_dimension).collect()
    }

    pub fn to_constraint_table(&self) -> Result<ConstraintTable, ConfigurationError> {
        let mut table = ConstraintTable::new();
        for dimension in &self.dimensions {
            let identifier = ContentDimensionIdentifier::new(dimension.identifier.as_str())?;
            for (value, restrictions) in &dimension.constraints {
                for (other, descriptor) in restrictions {
                    table.insert(
                        identifier.clone(),
                        value.as_str(),
                        ContentDimensionIdentifier::new(other.as_str())?,
                        descriptor.to_constraints(),
                    );
                }
            }
        }
        Ok(table)
    }

    pub fn priority(&self) -> Result<Option<Vec<ContentDimensionIdentifier>>, ConfigurationError> {
        self.fallback_priority
            .as_ref()
            .map(|priority| {
                priority
                    .iter()
                    .map(|identifier| ContentDimensionIdentifier::new(identifier.as_str()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
    }

    /// Engine builder populated from this descriptor
    pub fn to_builder(&self) -> Result<DimensionSpaceBuilder, ConfigurationError> {
        let mut builder = DimensionSpace::builder()
            .dimensions(self.to_dimensions()?)
            .constraints(self.to_constraint_table()?);
        if let Some(priority) = self.priority()? {
            builder = builder.priority(priority);
        }
        Ok(builder)
    }

    pub fn build(&self) -> Result<Arc<DimensionSpace>, ConfigError> {
        Ok(self.to_builder()?.build()?)
    }
}
