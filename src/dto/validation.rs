//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a sex marker is exactly `M` or `F`.
pub fn validate_sex(sex: &str) -> Result<(), ValidationError> {
    if sex == "M" || sex == "F" {
        return Ok(());
    }
    let mut err = ValidationError::new("sex");
    err.message = Some(format!("sex must be `M` or `F` (got `{sex}`)").into());
    Err(err)
}

/// Validates that a team identifier is non-empty and URL-safe.
pub fn validate_team_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > 64 {
        let mut err = ValidationError::new("team_id_length");
        err.message = Some("team id must be between 1 and 64 characters".into());
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        let mut err = ValidationError::new("team_id_format");
        err.message =
            Some("team id must contain only alphanumeric characters, `-` or `_`".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sex() {
        assert!(validate_sex("M").is_ok());
        assert!(validate_sex("F").is_ok());
        assert!(validate_sex("m").is_err());
        assert!(validate_sex("X").is_err());
        assert!(validate_sex("").is_err());
    }

    #[test]
    fn test_validate_team_id() {
        assert!(validate_team_id("jc-lyon").is_ok());
        assert!(validate_team_id("equipe_1").is_ok());
        assert!(validate_team_id("").is_err());
        assert!(validate_team_id("has space").is_err());
        assert!(validate_team_id(&"x".repeat(65)).is_err());
    }
}
