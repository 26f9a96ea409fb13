// ============================================================================
// Request Validation
// ============================================================================
//
// Local, pre-upstream validation of request bodies. Each validated input
// declares a fixed field shape; the produced error map always contains every
// declared field, with an empty list for fields that passed. Consumers can
// therefore distinguish "no error" from "field unknown" by key presence.
//
// ============================================================================

use std::collections::BTreeMap;

/// Per-field validation messages, keyed by the declared field names.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

/// An error map with every declared field present and empty.
pub fn empty_field_errors(shape: &'static [&'static str]) -> FieldErrors {
    shape.iter().map(|&field| (field, Vec::new())).collect()
}

/// Accumulates rule failures against a declared field shape.
pub struct Rules {
    errors: FieldErrors,
    failed: bool,
}

impl Rules {
    pub fn new(shape: &'static [&'static str]) -> Self {
        Self {
            errors: empty_field_errors(shape),
            failed: false,
        }
    }

    /// The field must be non-empty after trimming.
    pub fn required(mut self, field: &'static str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.push(field, format!("{field} is required"));
        }
        self
    }

    /// The field must look like an email address. Empty values are left to
    /// `required`; this rule only rejects present-but-malformed input.
    pub fn email(mut self, field: &'static str, value: &str) -> Self {
        if !value.trim().is_empty() && !is_email(value) {
            self.push(field, format!("{field} must be an email"));
        }
        self
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.failed {
            Err(self.errors)
        } else {
            Ok(())
        }
    }

    fn push(&mut self, field: &'static str, message: String) {
        self.failed = true;
        self.errors.entry(field).or_default().push(message);
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: &[&str] = &["name", "email", "password"];

    #[test]
    fn passing_input_yields_ok() {
        let result = Rules::new(SHAPE)
            .required("name", "a")
            .required("email", "a@x.com")
            .email("email", "a@x.com")
            .required("password", "p")
            .finish();
        assert!(result.is_ok());
    }

    #[test]
    fn error_map_contains_every_declared_field() {
        let errors = Rules::new(SHAPE)
            .required("name", "")
            .required("email", "")
            .email("email", "")
            .required("password", "")
            .finish()
            .unwrap_err();

        assert_eq!(errors.len(), SHAPE.len());
        for field in SHAPE {
            assert!(!errors[field].is_empty(), "{field} should have a message");
        }
    }

    #[test]
    fn clean_fields_stay_present_with_empty_lists() {
        let errors = Rules::new(SHAPE)
            .required("name", "a")
            .required("email", "")
            .required("password", "p")
            .finish()
            .unwrap_err();

        assert!(errors["name"].is_empty());
        assert_eq!(errors["email"], vec!["email is required"]);
        assert!(errors["password"].is_empty());
    }

    #[test]
    fn email_rule_rejects_malformed_addresses() {
        for bad in ["plain", "@x.com", "a@", "a@nodot", "a@.com", "a@x."] {
            let errors = Rules::new(&["email"]).email("email", bad).finish();
            assert!(errors.is_err(), "{bad:?} should fail");
        }
        for good in ["a@x.com", "first.last@sub.example.org"] {
            assert!(Rules::new(&["email"]).email("email", good).finish().is_ok());
        }
    }

    #[test]
    fn email_rule_leaves_empty_values_to_required() {
        assert!(Rules::new(&["email"]).email("email", "").finish().is_ok());
    }
}
