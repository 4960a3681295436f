use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("YouTube URL is empty")]
    EmptyUrl,

    #[error("Not a recognizable YouTube URL: {0}")]
    InvalidYoutubeUrl(String),

    #[error("Invalid month: {0}")]
    InvalidMonth(String),
}

impl ValidationError {
    /// The banner text shown for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::MissingField("name") => "Please enter a task name".to_string(),
            ValidationError::MissingField("deadline") => "Please select a deadline".to_string(),
            ValidationError::MissingField(field) => format!("Please fill in the {field}"),
            ValidationError::InvalidDate(raw) => format!("Invalid date: {raw}"),
            ValidationError::EmptyUrl => "Please enter a YouTube URL".to_string(),
            ValidationError::InvalidYoutubeUrl(_) => "Please enter a valid YouTube URL".to_string(),
            ValidationError::InvalidMonth(raw) => format!("Invalid month: {raw}"),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
