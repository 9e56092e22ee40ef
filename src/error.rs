//! Error types for kotoba3d

use thiserror::Error;

/// Main error type for kotoba3d
#[derive(Error, Debug)]
pub enum Kotoba3dError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Model-manifest errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model manifest: {0}")]
    ReadManifest(String),

    #[error("Failed to parse model manifest: {0}")]
    Parse(String),

    #[error("Model has no skinned meshes")]
    NoMeshes,
}

/// Audio playback errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output: {0}")]
    OutputInit(String),

    #[error("Invalid audio payload: {0}")]
    InvalidPayload(String),

    #[error("Failed to decode audio: {0}")]
    Decode(String),
}

/// Result type alias for kotoba3d operations
pub type Result<T> = std::result::Result<T, Kotoba3dError>;
