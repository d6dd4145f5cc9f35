use thiserror::Error;

/// Error taxonomy for the nutrition service.
///
/// `Parse` and `ExplicitlyInvalid` are expected outcomes of talking to a
/// probabilistic model and map to clean user-facing messages; the rest are
/// service-level failures surfaced with a 500-equivalent status.
#[derive(Error, Debug)]
pub enum NutrigenError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("model call failed: {0}")]
    ModelCall(String),

    #[error("model reply was not parseable JSON: {0}")]
    Parse(String),

    #[error("input was explicitly rejected by the model")]
    ExplicitlyInvalid,

    #[error("model reply is missing required field: {0}")]
    MissingField(String),

    #[error("image generation returned no inline image data")]
    AssetGeneration,

    #[error("object store error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, NutrigenError>;
