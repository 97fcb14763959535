//! Register write command builders.
//!
//! Commands are validated here so an out-of-range register or a non-finite
//! value never reaches `POST /commands`.

use crate::error::ValidationError;
use crate::types::{Command, REGISTER_COUNT, WRITE_REGISTER_ACTION};

/// Build a `write_register` command.
pub fn write_register(target_register: i64, value: f64) -> Result<Command, ValidationError> {
    if !(0..REGISTER_COUNT as i64).contains(&target_register) {
        return Err(ValidationError::RegisterOutOfRange(
            target_register.to_string(),
        ));
    }
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue(value.to_string()));
    }

    Ok(Command {
        action: WRITE_REGISTER_ACTION.to_string(),
        target_register: target_register as u8,
        value,
    })
}

/// Raw text typed by the operator for a new command.
#[derive(Debug, Clone, Default)]
pub struct CommandDraft {
    pub register: String,
    pub value: String,
}

impl CommandDraft {
    pub fn new(register: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            value: value.into(),
        }
    }

    /// Parse and validate the draft into a command.
    pub fn build(&self) -> Result<Command, ValidationError> {
        let register_text = self.register.trim();
        let register: i64 = register_text
            .parse()
            .map_err(|_| ValidationError::RegisterOutOfRange(register_text.to_string()))?;

        let value_text = self.value.trim();
        let value: f64 = value_text
            .parse()
            .map_err(|_| ValidationError::InvalidValue(value_text.to_string()))?;

        write_register(register, value)
    }

    pub fn clear(&mut self) {
        self.register.clear();
        self.value.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_register_bounds() {
        assert!(write_register(9, 1.0).is_ok());
        assert!(write_register(0, 1.0).is_ok());
        assert_eq!(
            write_register(10, 1.0),
            Err(ValidationError::RegisterOutOfRange("10".to_string()))
        );
        assert!(write_register(-1, 1.0).is_err());
    }

    #[test]
    fn test_write_register_rejects_non_finite() {
        assert!(write_register(1, f64::NAN).is_err());
        assert!(write_register(1, f64::INFINITY).is_err());
    }

    #[test]
    fn test_write_register_action() {
        let cmd = write_register(4, 1500.0).unwrap();
        assert_eq!(cmd.action, "write_register");
        assert_eq!(cmd.target_register, 4);
        assert_eq!(cmd.value, 1500.0);
    }

    #[test]
    fn test_draft_parsing() {
        assert!(CommandDraft::new("9", "100").build().is_ok());
        assert!(CommandDraft::new(" 3 ", "-2.5").build().is_ok());
        assert!(CommandDraft::new("10", "100").build().is_err());
        assert!(CommandDraft::new("3.5", "100").build().is_err());
        assert!(CommandDraft::new("", "100").build().is_err());
        assert!(matches!(
            CommandDraft::new("3", "abc").build(),
            Err(ValidationError::InvalidValue(_))
        ));
        assert!(CommandDraft::new("3", "inf").build().is_err());
    }

    #[test]
    fn test_draft_clear() {
        let mut draft = CommandDraft::new("1", "2");
        draft.clear();
        assert!(draft.register.is_empty());
        assert!(draft.value.is_empty());
    }
}
