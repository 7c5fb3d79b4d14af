use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub type Id = String;

/// Registration language of a guide profile; pages are split by language.
/// Stored values other than `en` read as Japanese.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ja,
    En,
}

impl Language {
    /// Anything other than an explicit `en` falls back to Japanese.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("en") => Language::En,
            _ => Language::Ja,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
        }
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = loose_string(deserializer)?;
        Ok(Language::from_query(Some(value.as_str())))
    }
}

/// Read a string-valued field written by hand or by older forms: null reads
/// as empty, other non-strings as their JSON text.
pub fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Current time as an RFC 3339 timestamp with millisecond precision
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Parse a stored timestamp for ordering; unparseable values sort oldest.
pub fn parse_timestamp(value: Option<&str>) -> Option<chrono::DateTime<chrono::Utc>> {
    value
        .and_then(|v| chrono::DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&chrono::Utc))
}
