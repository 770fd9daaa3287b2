//! Partial profile updates and the sanitizer guarding them.
//!
//! Callers hand over whatever record they hold, often a profile decorated
//! with joined data. Only the fields the profile table owns and that a
//! generic update may touch survive [`sanitize`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::identity::id::ProfileId;
use crate::identity::profile::Role;

/// Keep an explicit `null` apart from a missing key.
///
/// Missing keys fall back to `None` through `#[serde(default)]`; a present
/// key, `null` included, becomes `Some`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial profile record as submitted by a caller.
///
/// Nullable columns are three-state: `None` when the key is missing,
/// `Some(None)` for an explicit `null`, `Some(Some(_))` for a value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub id: Option<Value>,
    pub email: Option<String>,
    pub role: Option<Value>,
    #[serde(alias = "createdAt")]
    pub created_at: Option<Value>,

    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(alias = "firstName", default, deserialize_with = "nullable")]
    pub first_name: Option<Option<String>>,
    #[serde(alias = "lastName", default, deserialize_with = "nullable")]
    pub last_name: Option<Option<String>>,
    #[serde(alias = "builderId", default, deserialize_with = "nullable")]
    pub builder_id: Option<Option<String>>,

    #[serde(alias = "builderName")]
    pub builder_name: Option<Value>,
    pub projects: Option<Value>,
    pub email_confirmed_at: Option<Value>,
    pub last_sign_in_at: Option<Value>,

    /// Keys the profile table does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields written by a profile update. `None` leaves the column untouched;
/// `Some(None)` on a nullable column writes `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileChanges {
    pub name: Option<String>,
    /// Only set by provisioning; [`sanitize`] never fills it.
    pub role: Option<Role>,
    pub phone: Option<Option<String>>,
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub builder_id: Option<Option<ProfileId>>,
}

impl ProfileChanges {
    /// Whether applying these changes would write nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.phone.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.builder_id.is_none()
    }
}

/// Noteworthy removals made by [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeWarning {
    /// Email changes are never accepted through the update path.
    EmailChangeRejected,
    /// `builder_id` was not a valid profile identifier.
    InvalidBuilderId(String),
}

/// Result of [`sanitize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizedPatch {
    pub changes: ProfileChanges,
    pub warnings: Vec<SanitizeWarning>,
}

/// Strip immutable, unauthorized and non-persistable fields from `patch`.
pub fn sanitize(patch: ProfilePatch) -> SanitizedPatch {
    let mut warnings = Vec::new();

    if patch.email.is_some() {
        tracing::warn!("email updates are not allowed through profile updates");
        warnings.push(SanitizeWarning::EmailChangeRejected);
    }

    if !patch.extra.is_empty() {
        tracing::debug!(
            fields = ?patch.extra.keys().collect::<Vec<_>>(),
            "ignoring fields unknown to the profile table"
        );
    }

    let builder_id = match patch.builder_id {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => match ProfileId::parse(raw.as_str()) {
            Ok(id) => Some(Some(id)),
            Err(_) => {
                tracing::warn!(
                    builder_id = %raw,
                    "ignoring invalid builder id"
                );
                warnings.push(SanitizeWarning::InvalidBuilderId(raw));
                None
            },
        },
    };

    SanitizedPatch {
        changes: ProfileChanges {
            name: patch.name,
            role: None,
            phone: patch.phone,
            first_name: patch.first_name,
            last_name: patch.last_name,
            builder_id,
        },
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> ProfilePatch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_strips_protected_fields() {
        let sanitized = sanitize(patch(json!({
            "id": "homeowner1",
            "role": "admin",
            "email": "new@x.com",
            "createdAt": "2020-01-01T00:00:00Z",
            "name": "Jane Doe",
        })));

        assert_eq!(
            sanitized.changes,
            ProfileChanges {
                name: Some("Jane Doe".into()),
                ..Default::default()
            }
        );
        assert_eq!(
            sanitized.warnings,
            vec![SanitizeWarning::EmailChangeRejected]
        );
    }

    #[test]
    fn test_no_warning_without_email() {
        let sanitized =
            sanitize(patch(json!({ "id": "builder1", "role": "admin" })));
        assert!(sanitized.warnings.is_empty());
        assert!(sanitized.changes.is_empty());
    }

    #[test]
    fn test_derived_and_unknown_fields_are_dropped() {
        let sanitized = sanitize(patch(json!({
            "builderName": "Acme Homes",
            "projects": [{ "id": "p1" }],
            "email_confirmed_at": "2024-01-01T00:00:00Z",
            "last_sign_in_at": "2024-01-02T00:00:00Z",
            "favouriteColour": "blue",
        })));

        assert!(sanitized.changes.is_empty());
        assert!(sanitized.warnings.is_empty());
    }

    #[test]
    fn test_only_email_becomes_empty() {
        let sanitized = sanitize(patch(json!({ "email": "x@y.z" })));
        assert!(sanitized.changes.is_empty());
        assert_eq!(
            sanitized.warnings,
            vec![SanitizeWarning::EmailChangeRejected]
        );
    }

    #[test]
    fn test_native_fields_are_kept() {
        let sanitized = sanitize(patch(json!({
            "phone": "555-0100",
            "first_name": "Jane",
            "lastName": "Doe",
            "builderId": "builder7",
        })));

        let changes = sanitized.changes;
        assert_eq!(changes.phone, Some(Some("555-0100".into())));
        assert_eq!(changes.first_name, Some(Some("Jane".into())));
        assert_eq!(changes.last_name, Some(Some("Doe".into())));
        assert_eq!(
            changes.builder_id,
            Some(Some(ProfileId::parse("builder7").unwrap()))
        );
        assert_eq!(changes.role, None);
    }

    #[test]
    fn test_explicit_null_clears_field() {
        let sanitized =
            sanitize(patch(json!({ "builderId": null, "phone": null })));

        assert!(!sanitized.changes.is_empty());
        assert_eq!(sanitized.changes.builder_id, Some(None));
        assert_eq!(sanitized.changes.phone, Some(None));
        assert_eq!(sanitized.changes.first_name, None);
        assert_eq!(sanitized.changes.last_name, None);
        assert!(sanitized.warnings.is_empty());
    }

    #[test]
    fn test_missing_key_is_not_null() {
        let patch = patch(json!({ "firstName": null }));
        assert_eq!(patch.first_name, Some(None));
        assert_eq!(patch.last_name, None);
        assert_eq!(patch.builder_id, None);
    }

    #[test]
    fn test_invalid_builder_id_is_dropped() {
        let sanitized = sanitize(patch(json!({ "builderId": "acme" })));
        assert!(sanitized.changes.is_empty());
        assert_eq!(
            sanitized.warnings,
            vec![SanitizeWarning::InvalidBuilderId("acme".into())]
        );
    }
}
