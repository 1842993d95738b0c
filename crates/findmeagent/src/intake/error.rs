use super::form::LeadField;

/// The form was submitted with required fields left blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("required fields are blank: {}", render_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<LeadField>,
}

fn render_fields(fields: &[LeadField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Programmer misuse of the intake API; never shown to visitors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown lead form field '{0}'")]
    UnknownField(String),
}

/// Failure while handing a lead to the backend. Logged, never displayed.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("leads backend responded with status {status}")]
    Rejected { status: u16 },
    #[error("leads backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Errors the presentation layer can receive back from the controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
