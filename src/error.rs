use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeobitsError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Target size must be at least 1, got: {0}")]
    InvalidTargetSize(u32),

    #[error("Reduction factor must be at least 1, got: {0}")]
    InvalidReductionFactor(u32),

    #[error("Quality must be between 1 and 100, got: {0}")]
    InvalidQuality(u8),

    #[error("Bearing must be a finite number of degrees, got: {0}")]
    InvalidBearing(f64),

    #[error("Distance must be a finite number of metres, got: {0}")]
    InvalidDistance(f64),

    #[error("Options --{0} and --{1} are mutually exclusive")]
    MutuallyExclusiveOptions(String, String),

    #[error("GeoJSON parse error: {0}")]
    GeojsonParseError(String),

    #[error("No named point features found in the GeoJSON")]
    EmptyGeojson,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, GeobitsError>;
