/// Error type shared by every service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The referenced entity does not exist.
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    /// Input was rejected before any store mutation.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    /// Builds a `Validation` error naming every field whose flag is `true`.
    pub(crate) fn missing_fields<const N: usize>(checks: [(&'static str, bool); N]) -> Self {
        let missing: Vec<&str> = checks
            .iter()
            .filter(|(_, is_missing)| *is_missing)
            .map(|(field, _)| *field)
            .collect();
        Self::Validation(format!("Missing required fields: {}", missing.join(", ")))
    }
}

/// Trims a text field, treating blank input as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_name_only_missing_fields() {
        let error = ServiceError::missing_fields([
            ("title", true),
            ("authorUserId", true),
            ("projectId", false),
        ]);

        let ServiceError::Validation(message) = error else {
            panic!("expected validation error");
        };
        assert_eq!(message, "Missing required fields: title, authorUserId");
    }

    #[test]
    fn can_treat_blank_text_as_missing() {
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(
            non_blank(Some("  Apollo ".to_string())),
            Some("Apollo".to_string())
        );
    }

    #[test]
    fn can_format_not_found() {
        let error = ServiceError::not_found("Project", 42);
        assert_eq!(error.to_string(), "Project with ID 42 not found");
    }
}
