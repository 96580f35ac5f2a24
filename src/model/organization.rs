use serde::{Deserialize, Serialize};

/// The academy's public profile. A singleton: there is exactly one document,
/// stored under the well-known key `"main"` and replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_description: Option<String>,
    pub history: String,
    pub contact: ContactInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_notice_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let org = Organization {
            name: "re: Play".to_string(),
            description: "Fitness programs".to_string(),
            organization_description: None,
            history: "Founded 2015".to_string(),
            contact: ContactInfo {
                phone: "02-1234-5678".to_string(),
                email: "info@replay-fitness.com".to_string(),
                address: "123 Teheran-ro".to_string(),
            },
            registration_notice_title: None,
            registration_notice: None,
        };

        let json = serde_json::to_string(&org).unwrap();
        assert!(!json.contains("registrationNotice"));
        assert!(!json.contains("organizationDescription"));

        let parsed: Organization = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, org);
    }

    #[test]
    fn documents_without_new_fields_still_deserialize() {
        // Older documents predate the registration notice fields.
        let json = r#"{
            "name": "re: Play",
            "description": "desc",
            "history": "hist",
            "contact": {"phone": "p", "email": "e", "address": "a"}
        }"#;
        let org: Organization = serde_json::from_str(json).unwrap();
        assert_eq!(org.registration_notice, None);
        assert_eq!(org.registration_notice_title, None);
    }
}
