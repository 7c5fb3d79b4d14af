use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{Id, Language};

/// Location shown for guides that never filled one in
pub const DEFAULT_LOCATION: &str = "東京都 東京";
/// Rating shown on public cards until reviews are aggregated
pub const DEFAULT_AVERAGE_RATING: f64 = 4.8;

/// Fields a registration must carry before a guide record is created
pub const REQUIRED_REGISTRATION_FIELDS: [&str; 10] = [
    "guideName",
    "guideEmail",
    "guideGender",
    "guideAge",
    "guideExperience",
    "guideLanguages",
    "guideIntroduction",
    "guideSpecialties",
    "guideSessionRate",
    "guideAvailability",
];

/// Keys an edit can never overwrite
pub const PROTECTED_EDIT_FIELDS: [&str; 6] = [
    "id",
    "phoneNumber",
    "guideEmail",
    "phoneVerified",
    "documents",
    "registeredAt",
];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub enum GuideStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl<'de> Deserialize<'de> for GuideStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        crate::model::loose_string(deserializer).map(Self::from)
    }
}

impl From<String> for GuideStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => GuideStatus::Pending,
            "approved" => GuideStatus::Approved,
            "rejected" => GuideStatus::Rejected,
            _ => GuideStatus::Other(value),
        }
    }
}

impl From<GuideStatus> for String {
    fn from(status: GuideStatus) -> Self {
        status.as_str().to_string()
    }
}

impl GuideStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GuideStatus::Pending => "pending",
            GuideStatus::Approved => "approved",
            GuideStatus::Rejected => "rejected",
            GuideStatus::Other(s) => s,
        }
    }
}

/// Languages are stored either as a single string or a list, depending on
/// which form produced the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuideLanguages {
    One(String),
    Many(Vec<String>),
}

impl GuideLanguages {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            GuideLanguages::One(s) => vec![s.clone()],
            GuideLanguages::Many(v) => v.clone(),
        }
    }
}

/// A guide record as stored in guides.json. Unknown keys survive a
/// load/save cycle through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    #[serde(default)]
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_languages: Option<GuideLanguages>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_specialties: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_experience: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_session_rate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_availability: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_introduction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_language: Option<Language>,
    #[serde(default)]
    pub status: GuideStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Card shown on the public guide list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicGuide {
    pub id: Id,
    pub name: Option<String>,
    pub guide_name: Option<String>,
    pub email: Option<String>,
    pub location: String,
    pub languages: Vec<String>,
    pub specialties: Option<Value>,
    pub experience: Option<Value>,
    pub session_rate: Option<Value>,
    pub availability: Option<Value>,
    pub registration_language: Language,
    pub profile_photo: Option<String>,
    pub introduction: Option<String>,
    pub average_rating: f64,
    pub status: GuideStatus,
    pub registered_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGuideSummary {
    pub id: Id,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub status: GuideStatus,
    pub registered_at: Option<String>,
    pub updated_at: Option<String>,
    pub session_rate: Option<Value>,
    pub experience: Option<Value>,
}

/// Short form echoed back by mutating endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideAck {
    pub id: Id,
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: GuideStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Guide {
    pub fn display_name(&self) -> &str {
        self.guide_name.as_deref().unwrap_or("(unnamed)")
    }

    pub fn language(&self) -> Language {
        self.registration_language.unwrap_or_default()
    }

    pub fn is_approved(&self) -> bool {
        self.status == GuideStatus::Approved
    }

    /// Uploaded photos are addressed by their object-storage file id.
    pub fn profile_photo_url(&self) -> Option<String> {
        self.profile_photo
            .as_ref()
            .and_then(|photo| photo.get("fileId"))
            .and_then(Value::as_str)
            .map(|file_id| format!("/objects/uploads/{}", file_id))
    }

    pub fn public_view(&self) -> PublicGuide {
        PublicGuide {
            id: self.id.clone(),
            name: self.guide_name.clone(),
            guide_name: self.guide_name.clone(),
            email: self.guide_email.clone(),
            location: self
                .location
                .clone()
                .or_else(|| self.prefecture.clone())
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            languages: self
                .guide_languages
                .as_ref()
                .map(GuideLanguages::to_vec)
                .unwrap_or_default(),
            specialties: self.guide_specialties.clone(),
            experience: self.guide_experience.clone(),
            session_rate: self.guide_session_rate.clone(),
            availability: self.guide_availability.clone(),
            registration_language: self.language(),
            profile_photo: self.profile_photo_url(),
            introduction: self.guide_introduction.clone(),
            average_rating: DEFAULT_AVERAGE_RATING,
            status: self.status.clone(),
            registered_at: self.registered_at.clone(),
        }
    }

    pub fn admin_view(&self) -> AdminGuideSummary {
        AdminGuideSummary {
            id: self.id.clone(),
            name: self.guide_name.clone(),
            email: self.guide_email.clone(),
            phone_number: self.phone_number.clone(),
            status: self.status.clone(),
            registered_at: self.registered_at.clone(),
            updated_at: self.updated_at.clone(),
            session_rate: self.guide_session_rate.clone(),
            experience: self.guide_experience.clone(),
        }
    }

    pub fn ack(&self) -> GuideAck {
        GuideAck {
            id: self.id.clone(),
            name: self.guide_name.clone(),
            email: self.guide_email.clone(),
            status: self.status.clone(),
            registered_at: self.registered_at.clone(),
            updated_at: self.updated_at.clone(),
            rejection_reason: self.rejection_reason.clone(),
        }
    }
}

/// Convert a phone number to the international form used as a lookup key.
/// Japanese mobile numbers (070/080/090 + 8 digits) gain the +81 prefix.
pub fn normalize_phone_number(phone_number: &str) -> String {
    let stripped: String = phone_number
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();

    let bytes = stripped.as_bytes();
    let is_domestic_mobile = bytes.len() == 11
        && bytes[0] == b'0'
        && matches!(bytes[1], b'7' | b'8' | b'9')
        && bytes[2] == b'0'
        && bytes.iter().all(u8::is_ascii_digit);

    if is_domestic_mobile {
        format!("+81{}", &stripped[1..])
    } else {
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored_guide() -> Value {
        json!({
            "id": "g-1",
            "guideName": "田中 太郎",
            "guideEmail": "taro@example.com",
            "phoneNumber": "+819012345678",
            "guideLanguages": "日本語",
            "prefecture": "京都府",
            "status": "approved",
            "profilePhoto": {"fileId": "abc123", "fileName": "me.jpg"},
            "guideGender": "male",
            "registeredAt": "2024-05-01T09:00:00.000Z"
        })
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let guide: Guide = serde_json::from_value(stored_guide()).unwrap();
        assert_eq!(guide.extra.get("guideGender"), Some(&json!("male")));

        let back = serde_json::to_value(&guide).unwrap();
        assert_eq!(back["guideGender"], json!("male"));
        assert_eq!(back["status"], json!("approved"));
        // absent optionals are not written as null
        assert!(back.get("rejectionReason").is_none());
    }

    #[test]
    fn test_public_view_fallbacks() {
        let guide: Guide = serde_json::from_value(stored_guide()).unwrap();
        let card = guide.public_view();
        assert_eq!(card.location, "京都府");
        assert_eq!(card.languages, vec!["日本語".to_string()]);
        assert_eq!(card.registration_language, Language::Ja);
        assert_eq!(card.profile_photo.as_deref(), Some("/objects/uploads/abc123"));
        assert_eq!(card.average_rating, DEFAULT_AVERAGE_RATING);

        let bare: Guide = serde_json::from_value(json!({"id": "g-2"})).unwrap();
        let card = bare.public_view();
        assert_eq!(card.location, DEFAULT_LOCATION);
        assert!(card.languages.is_empty());
        assert_eq!(card.profile_photo, None);
        assert_eq!(card.status, GuideStatus::Pending);
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let guide: Guide =
            serde_json::from_value(json!({"id": "g-3", "status": "suspended"})).unwrap();
        assert_eq!(guide.status, GuideStatus::Other("suspended".to_string()));
        assert_eq!(serde_json::to_value(&guide).unwrap()["status"], json!("suspended"));
    }

    #[test]
    fn test_unexpected_language_reads_as_japanese() {
        for language in [json!(""), json!("fr"), json!(null)] {
            let guide: Guide = serde_json::from_value(
                json!({"id": "g-4", "status": "approved", "registrationLanguage": language}),
            )
            .unwrap();
            assert_eq!(guide.language(), Language::Ja);
        }
        let untitled: Guide = serde_json::from_value(json!({"status": "approved"})).unwrap();
        assert_eq!(untitled.id, "");
    }

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(normalize_phone_number("090-1234-5678"), "+819012345678");
        assert_eq!(normalize_phone_number("080 1234 5678"), "+818012345678");
        assert_eq!(normalize_phone_number("+81 90 1234 5678"), "+819012345678");
        // landlines are left alone apart from stripping
        assert_eq!(normalize_phone_number("03-1234-5678"), "0312345678");
        assert_eq!(normalize_phone_number("060-1234-5678"), "06012345678");
    }
}
