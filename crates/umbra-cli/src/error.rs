use thiserror::Error;
use umbra_core::FusionError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] umbra_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Fusion(#[from] FusionError),

    #[error("strict mode failed: warnings={warning_count}, failures={failure_count}")]
    StrictModeViolation {
        warning_count: usize,
        failure_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Fusion(error) => match error {
                FusionError::Validation(_) => 2,
                FusionError::Yaml(_) | FusionError::Json(_) => 4,
                FusionError::Io(_) => 10,
                _ => 3,
            },
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_category() {
        let validation = CliError::from(umbra_core::ValidationError::EmptyInstrumentList);
        assert_eq!(validation.exit_code(), 2);

        let io = CliError::from(FusionError::from(std::io::Error::other("disk")));
        assert_eq!(io.exit_code(), 10);

        let strict = CliError::StrictModeViolation {
            warning_count: 1,
            failure_count: 0,
        };
        assert_eq!(strict.exit_code(), 5);
    }
}
