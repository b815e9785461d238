use vistrack_image::ImageError;

/// An error type for the tracking module.
#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    /// Error from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The tracker buffers have been released.
    #[error("The tracker has been released")]
    Released,

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error reading a configuration file.
    #[error("Failed to read the configuration file. {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Error parsing a configuration document.
    #[error("Failed to parse the configuration. {0}")]
    ConfigParse(#[from] serde_json::Error),
}
