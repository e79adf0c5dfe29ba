use super::error::ValidationError;
use cf_protocol::{Process, MAX_DELAY_MS, MAX_NAME_LEN};

/// Check the scalar fields of `process`, reporting the first violated rule.
pub fn validate_process(process: &Process) -> Result<(), ValidationError> {
    if process.name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if process.name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }
    if !process.execution_mode.is_known() {
        return Err(ValidationError::InvalidExecutionMode(
            process.execution_mode.to_string(),
        ));
    }
    if process.delay_between_steps < 0 {
        return Err(ValidationError::NegativeDelay);
    }
    if process.delay_between_steps > MAX_DELAY_MS {
        return Err(ValidationError::DelayTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_protocol::ExecutionMode;

    #[test]
    fn test_valid_process() {
        let mut process = Process::new("ok");
        assert_eq!(validate_process(&process), Ok(()));

        process.delay_between_steps = 0;
        assert_eq!(validate_process(&process), Ok(()));
        process.delay_between_steps = MAX_DELAY_MS;
        assert_eq!(validate_process(&process), Ok(()));
        process.name = "x".repeat(MAX_NAME_LEN);
        assert_eq!(validate_process(&process), Ok(()));
    }

    #[test]
    fn test_name_rules() {
        let blank = Process::new("   ");
        assert_eq!(validate_process(&blank), Err(ValidationError::NameRequired));

        let long = Process::new("x".repeat(MAX_NAME_LEN + 1));
        assert_eq!(validate_process(&long), Err(ValidationError::NameTooLong));

        // length is counted in characters, not bytes
        let wide = Process::new("é".repeat(MAX_NAME_LEN));
        assert_eq!(validate_process(&wide), Ok(()));
    }

    #[test]
    fn test_first_violation_wins() {
        let mut process = Process::new("");
        process.execution_mode = ExecutionMode::from("turbo");
        process.delay_between_steps = -1;
        assert_eq!(validate_process(&process), Err(ValidationError::NameRequired));

        process.name = "named".to_string();
        let err = validate_process(&process).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid execution mode. Must be one of: sequential, parallel, manual"
        );

        process.execution_mode = ExecutionMode::Manual;
        assert_eq!(validate_process(&process), Err(ValidationError::NegativeDelay));

        process.delay_between_steps = MAX_DELAY_MS + 1;
        assert_eq!(
            validate_process(&process).unwrap_err().to_string(),
            "Delay between steps is too long (max 60 seconds)"
        );
    }
}
