use thiserror::Error;

/// Main error type for the ffmpeg showcase
#[derive(Error, Debug)]
pub enum ShowcaseError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Operation error: {0}")]
    Hook(#[from] HookError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the transcoding engine and its storage
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine is not loaded")]
    NotLoaded,

    #[error("Failed to load engine: {reason}")]
    LoadFailed { reason: String },

    #[error("Failed to spawn {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Invocation failed with exit code {code:?}: {args}")]
    RunFailed { args: String, code: Option<i32> },

    #[error("File not found in engine storage: {name}")]
    FileNotFound { name: String },

    #[error("Invalid storage name: {name}")]
    InvalidName { name: String },

    #[error("Storage operation failed on {name}: {reason}")]
    Storage { name: String, reason: String },
}

/// Errors raised while a feature hook projects its result
#[derive(Error, Debug)]
pub enum HookError {
    #[error("{feature} produced no output file: {name}")]
    OutputMissing { feature: String, name: String },

    #[error("Failed to publish {path}: {reason}")]
    PublishFailed { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using ShowcaseError
pub type Result<T> = std::result::Result<T, ShowcaseError>;

impl ShowcaseError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Engine(EngineError::LoadFailed { reason }) => {
                format!("Could not load the ffmpeg engine ({}). Is ffmpeg installed and on PATH?", reason)
            }
            Self::Engine(EngineError::RunFailed { args, code }) => match code {
                Some(code) => format!("ffmpeg {} exited with status {}.", args, code),
                None => format!("ffmpeg {} was terminated by a signal.", args),
            },
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            Self::Config(ConfigError::MissingKey { key }) => {
                format!("Missing required setting '{}'. Pass it on the command line or in the config file.", key)
            }
            _ => self.to_string(),
        }
    }
}
