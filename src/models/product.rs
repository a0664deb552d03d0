use anyhow::{Result, anyhow};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{ActivityFlag, Record};

/// Product row as extracted from the listing page.
///
/// Field order here is the order written to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub medicine_name: String,
    pub category_name: String,
    pub description: String,
    pub application_rates: String,
    pub frequency_of_use: String,
    pub side_effect: String,
    pub crops_pests: String,
    pub crops: String,
    pub pest: String,
    pub symptoms: String,
    pub causes: String,
    pub product_tags: Vec<String>,
    pub product_price: String,
    pub reg_no: String,
    pub serial_no: String,
    pub product_url: String,
    pub origin: String,
    #[serde(rename = "isActive", skip_serializing_if = "Option::is_none", default)]
    pub is_active: Option<ActivityFlag>,
    #[serde(rename = "Stocks", skip_serializing_if = "Option::is_none", default)]
    pub stocks: Option<String>,
    pub extraction_date: String,
}

impl Product {
    pub fn to_record(&self) -> Result<Record> {
        match serde_json::to_value(self)? {
            Value::Object(record) => Ok(record),
            other => Err(anyhow!("Product serialized to a non-object: {}", other)),
        }
    }
}

/// Local wall-clock time with microseconds, e.g. `2025-03-09T14:05:07.000123`
pub fn extraction_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
