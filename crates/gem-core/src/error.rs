use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShaderError {
    #[error("unknown shader template `{0}`")]
    UnknownTemplate(String),
    #[error("template has no value for placeholder `{0}`")]
    MissingPlaceholder(String),
    #[error("unterminated #INJECT marker at byte {0}")]
    MalformedMarker(usize),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: String, value: String },
    #[error("invalid colour `{0}`, expected six hex digits")]
    InvalidColor(String),
}
