use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{generate_id, now_timestamp, Id};

pub const DEFAULT_COMMISSION_RATE: &str = "10.00";
pub const DEFAULT_REFERRAL_SOURCE: &str = "web";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum CommissionStatus {
    #[default]
    Pending,
    Approved,
    Paid,
    Cancelled,
    Other(String),
}

impl<'de> Deserialize<'de> for CommissionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        crate::model::loose_string(deserializer).map(Self::from)
    }
}

impl From<String> for CommissionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => CommissionStatus::Pending,
            "approved" => CommissionStatus::Approved,
            "paid" => CommissionStatus::Paid,
            "cancelled" => CommissionStatus::Cancelled,
            _ => CommissionStatus::Other(value),
        }
    }
}

impl From<CommissionStatus> for String {
    fn from(status: CommissionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl CommissionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CommissionStatus::Pending => "pending",
            CommissionStatus::Approved => "approved",
            CommissionStatus::Paid => "paid",
            CommissionStatus::Cancelled => "cancelled",
            CommissionStatus::Other(s) => s,
        }
    }

    /// The customer showed up and a commission was earned
    pub fn is_booked(&self) -> bool {
        matches!(self, CommissionStatus::Approved | CommissionStatus::Paid)
    }
}

/// A guide sending a customer to a sponsor store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    /// Hand-entered records may lack ids; they are listed but not addressable.
    #[serde(default)]
    pub id: Id,
    #[serde(default)]
    pub guide_id: Id,
    #[serde(default, alias = "storeId")]
    pub sponsor_store_id: Id,
    #[serde(default)]
    pub referral_date: Option<String>,
    #[serde(default)]
    pub commission_rate: Option<Value>,
    /// Stored as written by the client: string, number or null.
    #[serde(default)]
    pub commission_amount: Option<Value>,
    #[serde(default)]
    pub commission_status: CommissionStatus,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub referral_source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReferral {
    pub guide_id: Option<Id>,
    #[serde(alias = "storeId")]
    pub sponsor_store_id: Option<Id>,
    pub commission_rate: Option<Value>,
    pub referral_source: Option<String>,
    pub notes: Option<String>,
}

impl Referral {
    /// Build a pending referral. Returns `None` unless both ids are present.
    pub fn create(new: NewReferral) -> Option<Self> {
        let guide_id = new.guide_id.filter(|s| !s.is_empty())?;
        let sponsor_store_id = new.sponsor_store_id.filter(|s| !s.is_empty())?;
        let now = now_timestamp();

        Some(Self {
            id: generate_id(),
            guide_id,
            sponsor_store_id,
            referral_date: Some(now.clone()),
            commission_rate: Some(
                new.commission_rate
                    .filter(|v| !v.is_null())
                    .unwrap_or_else(|| Value::String(DEFAULT_COMMISSION_RATE.to_string())),
            ),
            commission_amount: None,
            commission_status: CommissionStatus::Pending,
            payment_date: None,
            referral_source: Some(
                new.referral_source
                    .unwrap_or_else(|| DEFAULT_REFERRAL_SOURCE.to_string()),
            ),
            notes: Some(new.notes.unwrap_or_default()),
            created_at: Some(now.clone()),
            updated_at: Some(now),
            extra: Map::new(),
        })
    }

    /// Commission as a number; missing, null or unparseable amounts count as absent.
    pub fn commission_amount_value(&self) -> Option<f64> {
        match self.commission_amount.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
    }

    pub fn referral_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        crate::model::parse_timestamp(self.referral_date.as_deref())
    }
}
