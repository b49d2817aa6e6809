//! # dimspace Config
//!
//! Loads content dimension configuration from JSON and turns it into a
//! [`DimensionSpace`](dimspace_core::DimensionSpace).
//!
//! ```rust
//! use dimspace_config::DimensionSpaceDescriptor;
//!
//! let descriptor = DimensionSpaceDescriptor::from_json_str(r#"{
//!     "dimensions": [
//!         {
//!             "identifier": "market",
//!             "default": "WORLD",
//!             "values": [
//!                 {"value": "WORLD"},
//!                 {"value": "GB", "generalization": "WORLD"},
//!                 {"value": "DE", "generalization": "WORLD"}
//!             ],
//!             "constraints": {"GB": {"language": ["de"]}}
//!         },
//!         {
//!             "identifier": "language",
//!             "default": "en",
//!             "values": [{"value": "en"}, {"value": "de"}]
//!         }
//!     ]
//! }"#).unwrap();
//!
//! let space = descriptor.build().unwrap();
//! assert_eq!(space.allowed_combinations().len(), 5);
//! ```

pub mod descriptor;

use dimspace_core::{ConfigurationError, DimensionSpace};
use std::path::Path;
use std::sync::Arc;

pub use descriptor::{
    ConstraintDescriptor, DimensionDescriptor, DimensionSpaceDescriptor, ValueDescriptor, WILDCARD,
};

/// Errors that can occur while loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Dimension(#[from] ConfigurationError),
}

/// Read a JSON configuration file and build the engine
pub fn load<P: AsRef<Path>>(path: P) -> Result<Arc<DimensionSpace>, ConfigError> {
    DimensionSpaceDescriptor::from_path(path)?.build()
}
