use itertools::Itertools;
use serde_json::{Map, Value};

use crate::model::{
    generate_id, normalize_phone_number, now_timestamp, Guide, GuideStatus, Language,
    PublicGuide, PROTECTED_EDIT_FIELDS, REQUIRED_REGISTRATION_FIELDS,
};
use crate::store::StoreError;

pub const DEFAULT_REJECTION_REASON: &str = "承認基準を満たしていません";

/// Approved guides registered in `lang`, newest registration first.
pub fn public_listing(guides: &[Guide], lang: Language) -> Vec<PublicGuide> {
    guides
        .iter()
        .filter(|g| g.is_approved())
        .filter(|g| g.language() == lang)
        .sorted_by(|a, b| {
            crate::model::parse_timestamp(b.registered_at.as_deref())
                .cmp(&crate::model::parse_timestamp(a.registered_at.as_deref()))
        })
        .map(Guide::public_view)
        .collect()
}

#[derive(Debug, PartialEq)]
pub enum RegistrationError {
    MissingField(&'static str),
    MissingPhoneNumber,
    Invalid(String),
}

/// Build a pending guide from a registration form.
pub fn register(form: Map<String, Value>) -> Result<Guide, RegistrationError> {
    for field in REQUIRED_REGISTRATION_FIELDS {
        if is_blank(form.get(field)) {
            return Err(RegistrationError::MissingField(field));
        }
    }
    let phone = form
        .get("phoneNumber")
        .and_then(Value::as_str)
        .filter(|p| !p.trim().is_empty())
        .ok_or(RegistrationError::MissingPhoneNumber)?;
    let phone = normalize_phone_number(phone);

    let now = now_timestamp();
    let mut record = form;
    record.insert("id".into(), Value::String(generate_id()));
    record.insert("phoneNumber".into(), Value::String(phone));
    record.insert("status".into(), Value::String(GuideStatus::Pending.as_str().into()));
    record.insert("registeredAt".into(), Value::String(now.clone()));
    record.insert("updatedAt".into(), Value::String(now));
    record
        .entry("phoneVerified")
        .or_insert(Value::Bool(false));
    record
        .entry("registrationLanguage")
        .or_insert(Value::String(Language::Ja.as_str().into()));
    for key in ["approvedBy", "rejectedBy", "rejectionReason"] {
        record.remove(key);
    }

    serde_json::from_value(Value::Object(record))
        .map_err(|e| RegistrationError::Invalid(e.to_string()))
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Merge an edit form over the stored guide, keeping identity and
/// verification fields from the stored record.
pub fn apply_edit(existing: Guide, updates: &Value) -> Result<Guide, StoreError> {
    let Value::Object(updates) = updates else {
        return Err(StoreError::InvalidUpdate(
            "guide update must be a JSON object".to_string(),
        ));
    };

    let mut merged = serde_json::to_value(&existing).map_err(StoreError::Serialize)?;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in updates {
            if !PROTECTED_EDIT_FIELDS.contains(&key.as_str()) {
                fields.insert(key.clone(), value.clone());
            }
        }
        fields.insert("updatedAt".into(), Value::String(now_timestamp()));
    }

    serde_json::from_value(merged).map_err(|e| StoreError::InvalidUpdate(e.to_string()))
}

pub fn approve(mut guide: Guide, admin: &str) -> Guide {
    guide.status = GuideStatus::Approved;
    guide.approved_by = Some(admin.to_string());
    guide.updated_at = Some(now_timestamp());
    guide
}

pub fn reject(mut guide: Guide, admin: &str, reason: Option<&str>) -> Guide {
    guide.status = GuideStatus::Rejected;
    guide.rejection_reason = Some(
        reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(DEFAULT_REJECTION_REASON)
            .to_string(),
    );
    guide.rejected_by = Some(admin.to_string());
    guide.updated_at = Some(now_timestamp());
    guide
}
