use thiserror::Error;

use crate::point::DimensionSpacePoint;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal problems found while building dimensions from configuration.
///
/// None of these are ever returned from a query; an engine is either built
/// completely or not at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Content dimension identifier is invalid: {0:?}")]
    ContentDimensionIdentifierIsInvalid(String),

    #[error("No content dimensions configured")]
    NoDimensions,

    #[error("Content dimension '{0}' is configured more than once")]
    DuplicateDimension(String),

    #[error("Content dimension '{0}' has no values")]
    EmptyDimension(String),

    #[error("Content dimension '{dimension}' has an invalid value token: {token:?}")]
    InvalidValueToken { dimension: String, token: String },

    #[error("Content dimension '{dimension}' declares value '{token}' more than once")]
    DuplicateValue { dimension: String, token: String },

    #[error("Default value '{token}' is not a value of content dimension '{dimension}'")]
    MissingDefaultValue { dimension: String, token: String },

    #[error("Variation edge in content dimension '{dimension}' references unknown value '{token}'")]
    DanglingEdge { dimension: String, token: String },

    #[error("Value '{token}' of content dimension '{dimension}' has more than one direct generalization")]
    MultipleGeneralizations { dimension: String, token: String },

    #[error("Variation edges of content dimension '{dimension}' form a cycle through '{token}'")]
    EdgeCycle { dimension: String, token: String },

    #[error("Value '{token}' of content dimension '{dimension}' declares specialization depth {declared}, but its position in the variation tree is {derived}")]
    InconsistentSpecializationDepth {
        dimension: String,
        token: String,
        declared: u32,
        derived: u32,
    },

    #[error("Constraint references unknown dimension value {dimension}:{token}")]
    UnknownConstraintTarget { dimension: String, token: String },

    #[error("Invalid fallback priority: {0}")]
    InvalidPriority(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid dimension configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Dimension space point {0} is not within the allowed dimension subspace")]
    PointNotInAllowedSubspace(DimensionSpacePoint),

    #[error("Dimension space point {point} does not cover the configured dimensions")]
    IncompletePoint { point: DimensionSpacePoint },

    #[error("Dimension space point {specialization} is no specialization of {generalization}")]
    NotASpecialization {
        specialization: DimensionSpacePoint,
        generalization: DimensionSpacePoint,
    },

    #[error("Content subgraph variation weights of {a} and {b} are incomparable")]
    IncomparableWeights {
        a: DimensionSpacePoint,
        b: DimensionSpacePoint,
    },
}

impl Error {
    /// Whether this error can only occur while building an engine.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
