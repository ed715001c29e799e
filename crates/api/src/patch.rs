//! Patch-document application for the update representation.
//!
//! Paths are interpreted against the fixed member set of
//! [`ContactForUpdate`] rather than a generic JSON tree. Operations run in
//! order against a private copy of the document; the caller only ever sees a
//! fully patched and revalidated document, or an error.

use std::fmt;

use contacts_types::ContactForUpdate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::validation::{ValidationErrors, validate_update};

/// One operation of a patch document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl PatchOperation {
    /// Convenience constructor for the most common operation.
    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Replace {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Addressable members of the update representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
}

impl ContactField {
    const ALL: [ContactField; 3] = [ContactField::FirstName, ContactField::LastName, ContactField::Email];

    /// Resolve a single-segment pointer such as `/email`. Member names match case-insensitively.
    pub fn from_pointer(pointer: &str) -> Option<Self> {
        let segment = pointer.strip_prefix('/')?;
        if segment.contains('/') {
            return None;
        }
        let segment = segment.replace("~1", "/").replace("~0", "~");
        Self::ALL.into_iter().find(|field| field.member_name().eq_ignore_ascii_case(&segment))
    }

    pub fn member_name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
        }
    }

    fn read(self, document: &ContactForUpdate) -> Value {
        match self {
            Self::FirstName => Value::String(document.first_name.clone()),
            Self::LastName => Value::String(document.last_name.clone()),
            Self::Email => document.email.clone().map(Value::String).unwrap_or(Value::Null),
        }
    }

    /// Null clears the member; required names become empty and fail revalidation.
    fn write(self, document: &mut ContactForUpdate, value: &Value) -> Result<(), &'static str> {
        let text = match value {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            _ => return Err("a string or null"),
        };
        match self {
            Self::FirstName => document.first_name = text.unwrap_or_default(),
            Self::LastName => document.last_name = text.unwrap_or_default(),
            Self::Email => document.email = text,
        }
        Ok(())
    }

    fn clear(self, document: &mut ContactForUpdate) {
        match self {
            Self::FirstName => document.first_name.clear(),
            Self::LastName => document.last_name.clear(),
            Self::Email => document.email = None,
        }
    }
}

/// Reason code reported with a rejected patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchRejection {
    InvalidPath,
    InvalidValue,
    TestFailed,
    ValidationFailed,
}

impl PatchRejection {
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidPath => "invalid_path",
            Self::InvalidValue => "invalid_value",
            Self::TestFailed => "test_failed",
            Self::ValidationFailed => "validation_failed",
        }
    }
}

impl fmt::Display for PatchRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors emitted while applying a patch document.
#[derive(Debug, Error)]
pub enum PatchError {
    /// An operation targets a path the update representation does not have.
    #[error("operation {index}: path '{path}' does not resolve against the contact")]
    UnresolvedPath { index: usize, path: String },

    /// An operation supplies a value of the wrong type.
    #[error("operation {index}: value for '{path}' must be {expected}")]
    InvalidValue {
        index: usize,
        path: String,
        expected: &'static str,
    },

    /// A `test` operation did not match the current document.
    #[error("operation {index}: test of '{path}' failed")]
    TestFailed { index: usize, path: String },

    /// Every operation applied but the result breaks a field or domain rule.
    #[error("patched contact failed validation: {0}")]
    Validation(ValidationErrors),
}

impl PatchError {
    pub fn rejection(&self) -> PatchRejection {
        match self {
            Self::UnresolvedPath { .. } => PatchRejection::InvalidPath,
            Self::InvalidValue { .. } => PatchRejection::InvalidValue,
            Self::TestFailed { .. } => PatchRejection::TestFailed,
            Self::Validation(_) => PatchRejection::ValidationFailed,
        }
    }
}

/// Apply `operations` in order to a copy of `base` and revalidate the result.
pub fn apply_patch(base: &ContactForUpdate, operations: &[PatchOperation]) -> Result<ContactForUpdate, PatchError> {
    let mut document = base.clone();
    for (index, operation) in operations.iter().enumerate() {
        apply_operation(&mut document, index, operation)?;
    }
    validate_update(&document).into_result().map_err(PatchError::Validation)?;
    Ok(document)
}

fn apply_operation(document: &mut ContactForUpdate, index: usize, operation: &PatchOperation) -> Result<(), PatchError> {
    match operation {
        PatchOperation::Add { path, value } | PatchOperation::Replace { path, value } => {
            let field = resolve(index, path)?;
            write(document, index, path, field, value)
        }
        PatchOperation::Remove { path } => {
            resolve(index, path)?.clear(document);
            Ok(())
        }
        PatchOperation::Move { from, path } => {
            let source = resolve(index, from)?;
            let target = resolve(index, path)?;
            if source == target {
                return Ok(());
            }
            let value = source.read(document);
            source.clear(document);
            write(document, index, path, target, &value)
        }
        PatchOperation::Copy { from, path } => {
            let source = resolve(index, from)?;
            let target = resolve(index, path)?;
            let value = source.read(document);
            write(document, index, path, target, &value)
        }
        PatchOperation::Test { path, value } => {
            let field = resolve(index, path)?;
            if field.read(document) == *value {
                Ok(())
            } else {
                Err(PatchError::TestFailed {
                    index,
                    path: path.clone(),
                })
            }
        }
    }
}

fn resolve(index: usize, path: &str) -> Result<ContactField, PatchError> {
    ContactField::from_pointer(path).ok_or_else(|| PatchError::UnresolvedPath {
        index,
        path: path.to_string(),
    })
}

fn write(document: &mut ContactForUpdate, index: usize, path: &str, field: ContactField, value: &Value) -> Result<(), PatchError> {
    field.write(document, value).map_err(|expected| PatchError::InvalidValue {
        index,
        path: path.to_string(),
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> ContactForUpdate {
        ContactForUpdate {
            first_name: "Jan".into(),
            last_name: "Kowalski".into(),
            email: None,
        }
    }

    #[test]
    fn replace_sets_email_and_leaves_other_fields() {
        let patched = apply_patch(&base(), &[PatchOperation::replace("/email", "a@b.com")]).unwrap();
        assert_eq!(patched.email.as_deref(), Some("a@b.com"));
        assert_eq!(patched.first_name, "Jan");
        assert_eq!(patched.last_name, "Kowalski");
    }

    #[test]
    fn equal_names_after_patch_fail_validation() {
        let operations = [PatchOperation::replace("/firstName", "X"), PatchOperation::replace("/lastName", "X")];
        let error = apply_patch(&base(), &operations).unwrap_err();
        assert_eq!(error.rejection(), PatchRejection::ValidationFailed);
        let PatchError::Validation(errors) = error else {
            panic!("expected validation failure");
        };
        assert!(errors.get("wrongName").is_some());
    }

    #[test]
    fn unknown_path_rejects_whole_document() {
        let operations = [
            PatchOperation::replace("/email", "a@b.com"),
            PatchOperation::replace("/nickname", "JK"),
        ];
        let error = apply_patch(&base(), &operations).unwrap_err();
        assert!(matches!(error, PatchError::UnresolvedPath { index: 1, .. }));
    }

    #[test]
    fn identifier_and_nested_paths_do_not_resolve() {
        for path in ["/id", "/phones", "/email/domain", "email", "", "/"] {
            assert!(ContactField::from_pointer(path).is_none(), "{path} should not resolve");
        }
        assert_eq!(ContactField::from_pointer("/FirstName"), Some(ContactField::FirstName));
    }

    #[test]
    fn operations_see_previous_results() {
        let operations = [
            PatchOperation::Add {
                path: "/email".into(),
                value: json!("jk@u.pl"),
            },
            PatchOperation::Test {
                path: "/email".into(),
                value: json!("jk@u.pl"),
            },
        ];
        assert!(apply_patch(&base(), &operations).is_ok());
    }

    #[test]
    fn failed_test_reports_its_index() {
        let operations = [PatchOperation::Test {
            path: "/firstName".into(),
            value: json!("Adam"),
        }];
        let error = apply_patch(&base(), &operations).unwrap_err();
        assert!(matches!(error, PatchError::TestFailed { index: 0, .. }));
    }

    #[test]
    fn move_and_copy_transfer_values() {
        let mut start = base();
        start.email = Some("jk@u.pl".into());

        let copied = apply_patch(
            &start,
            &[PatchOperation::Copy {
                from: "/lastName".into(),
                path: "/firstName".into(),
            }],
        );
        assert_eq!(copied.unwrap_err().rejection(), PatchRejection::ValidationFailed);

        let moved = apply_patch(
            &start,
            &[
                PatchOperation::Move {
                    from: "/firstName".into(),
                    path: "/email".into(),
                },
                PatchOperation::replace("/firstName", "Janek"),
                PatchOperation::replace("/email", "janek@u.pl"),
            ],
        )
        .unwrap();
        assert_eq!(moved.first_name, "Janek");
        assert_eq!(moved.email.as_deref(), Some("janek@u.pl"));
    }

    #[test]
    fn removing_required_member_fails_validation() {
        let error = apply_patch(
            &base(),
            &[PatchOperation::Remove {
                path: "/firstName".into(),
            }],
        )
        .unwrap_err();
        let PatchError::Validation(errors) = error else {
            panic!("expected validation failure");
        };
        assert!(errors.get("firstName").is_some());
    }

    #[test]
    fn non_string_values_are_rejected() {
        let error = apply_patch(&base(), &[PatchOperation::replace("/email", 42)]).unwrap_err();
        assert_eq!(error.rejection(), PatchRejection::InvalidValue);
    }

    #[test]
    fn wire_format_uses_op_tag() {
        let operations: Vec<PatchOperation> = serde_json::from_value(json!([
            {"op": "replace", "path": "/email", "value": "new@new.pl"},
            {"op": "move", "from": "/email", "path": "/lastName"},
            {"op": "remove", "path": "/email"}
        ]))
        .unwrap();
        assert_eq!(operations[0], PatchOperation::replace("/email", "new@new.pl"));
        assert!(matches!(operations[1], PatchOperation::Move { .. }));
        assert!(serde_json::from_value::<Vec<PatchOperation>>(json!([{"op": "rename", "path": "/email"}])).is_err());
    }
}
