//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::NotFound { .. }) => {
                        crate::exitcode::NOINPUT
                    }
                    ApplicationError::Domain(_) | ApplicationError::Validation { .. } => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Store { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TeamId;

    #[test]
    fn given_domain_errors_when_mapping_exit_code_then_distinguishes_kinds() {
        let missing: CliError = ApplicationError::from(DomainError::team_not_found(TeamId(3))).into();
        assert_eq!(missing.exit_code(), crate::exitcode::NOINPUT);

        let cycle: CliError =
            ApplicationError::from(DomainError::IntegrityViolation("loop".into())).into();
        assert_eq!(cycle.exit_code(), crate::exitcode::DATAERR);

        let usage = CliError::Usage("nope".into());
        assert_eq!(usage.exit_code(), crate::exitcode::USAGE);
    }
}
