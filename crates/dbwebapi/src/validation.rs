//! Identifier validation for names interpolated into SQL

use crate::Error;

/// Maximum length for SQL identifiers (HANA limit is 127)
const MAX_IDENTIFIER_LENGTH: usize = 127;

/// Validate SQL identifier (schema/procedure name) to prevent injection
pub fn is_valid_identifier(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_IDENTIFIER_LENGTH {
        return false;
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }

    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '#')
}

/// Validate identifier and return error if invalid
pub fn validate_identifier(name: &str, context: &str) -> Result<(), Error> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(Error::InvalidProcedureName(format!(
            "Invalid {context}: '{name}'. \
             Must be 1-127 alphanumeric characters (a-z, A-Z, 0-9, _, $, #), \
             cannot start with a digit."
        )))
    }
}

/// Validate procedure name (schema.procedure or procedure)
pub fn validate_procedure_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::InvalidProcedureName("empty name".to_string()));
    }

    match parse_qualified_name(name) {
        (Some(schema), procedure) if !procedure.contains('.') => {
            validate_identifier(schema, "schema name")?;
            validate_identifier(procedure, "procedure name")
        }
        (None, procedure) => validate_identifier(procedure, "procedure name"),
        _ => Err(Error::InvalidProcedureName(format!(
            "too many dots in name: {name}"
        ))),
    }
}

/// Split a qualified procedure name into (schema, procedure)
pub fn parse_qualified_name(name: &str) -> (Option<&str>, &str) {
    name.split_once('.')
        .map_or((None, name), |(schema, procedure)| {
            (Some(schema), procedure)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifier_simple() {
        assert!(is_valid_identifier("users"));
        assert!(is_valid_identifier("USERS"));
        assert!(is_valid_identifier("_private"));
    }

    #[test]
    fn test_valid_identifier_special_chars() {
        assert!(is_valid_identifier("my$table"));
        assert!(is_valid_identifier("tmp#1"));
    }

    #[test]
    fn test_invalid_identifier_empty() {
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_invalid_identifier_starts_with_digit() {
        assert!(!is_valid_identifier("1table"));
    }

    #[test]
    fn test_invalid_identifier_special_chars() {
        assert!(!is_valid_identifier("my-table"));
        assert!(!is_valid_identifier("my table"));
        assert!(!is_valid_identifier("t;DROP"));
        assert!(!is_valid_identifier("a'b"));
    }

    #[test]
    fn test_invalid_identifier_too_long() {
        let long = "a".repeat(128);
        assert!(!is_valid_identifier(&long));
        assert!(is_valid_identifier(&long[..127]));
    }

    #[test]
    fn test_validate_procedure_name_plain() {
        assert!(validate_procedure_name("DETECT_DDL_CHANGES").is_ok());
    }

    #[test]
    fn test_validate_procedure_name_qualified() {
        assert!(validate_procedure_name("ADMIN.DETECT_DDL_CHANGES").is_ok());
    }

    #[test]
    fn test_validate_procedure_name_rejects_empty() {
        assert!(validate_procedure_name("").is_err());
    }

    #[test]
    fn test_validate_procedure_name_rejects_too_many_dots() {
        let err = validate_procedure_name("a.b.c").unwrap_err();
        assert!(err.to_string().contains("too many dots"));
    }

    #[test]
    fn test_validate_procedure_name_rejects_injection() {
        assert!(validate_procedure_name("P(1); DROP TABLE X").is_err());
        assert!(validate_procedure_name("S.P--").is_err());
    }

    #[test]
    fn test_parse_qualified_name() {
        assert_eq!(parse_qualified_name("S.P"), (Some("S"), "P"));
        assert_eq!(parse_qualified_name("P"), (None, "P"));
        assert_eq!(parse_qualified_name("A.B.C"), (Some("A"), "B.C"));
    }
}
