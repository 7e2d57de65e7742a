// Apple-specific account detail helpers
use serde::{Deserialize, Serialize};

/// Name fields sent to the server alongside the identity token
///
/// Apple only hands out the user's name on the very first authorization, so
/// every field is optional and omitted from the JSON when absent.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AppleUserName {
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "fullName", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Account details carried in the `X-account-details` header
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AppleUserInfo {
    #[serde(flatten)]
    pub name: AppleUserName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AppleUserInfo {
    /// Encode as a compact JSON object
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.name.first_name.is_none()
            && self.name.last_name.is_none()
            && self.name.full_name.is_none()
    }
}

/// Join given and family name with a single space
///
/// Empty components are skipped; `None` when nothing is left.
#[must_use]
pub fn join_full_name(first_name: Option<&str>, last_name: Option<&str>) -> Option<String> {
    let joined = [first_name, last_name]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_join_full_name() {
        assert_eq!(
            join_full_name(Some("John"), Some("Doe")),
            Some("John Doe".to_string())
        );
        assert_eq!(join_full_name(Some("John"), None), Some("John".to_string()));
        assert_eq!(join_full_name(None, Some("Doe")), Some("Doe".to_string()));
        assert_eq!(join_full_name(Some(""), Some("")), None);
        assert_eq!(join_full_name(None, None), None);
    }

    #[test]
    fn test_account_details_json_is_flat() {
        let info = AppleUserInfo {
            name: AppleUserName {
                first_name: Some("John".to_string()),
                last_name: Some("Doe".to_string()),
                full_name: Some("John Doe".to_string()),
            },
            email: Some("john.doe@apple.com".to_string()),
        };

        let value: Value = serde_json::from_str(&info.to_json().unwrap()).unwrap();
        assert_eq!(value["firstName"], "John");
        assert_eq!(value["lastName"], "Doe");
        assert_eq!(value["fullName"], "John Doe");
        assert_eq!(value["email"], "john.doe@apple.com");
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let info = AppleUserInfo {
            name: AppleUserName::default(),
            email: Some("only@email.com".to_string()),
        };

        let value: Value = serde_json::from_str(&info.to_json().unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("email"));

        assert!(AppleUserInfo::default().is_empty());
        assert_eq!(AppleUserInfo::default().to_json().unwrap(), "{}");
    }
}
