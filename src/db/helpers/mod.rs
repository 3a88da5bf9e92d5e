use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use crate::models::DeviceStatus;

const DB_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn date_to_db(date: NaiveDate) -> String {
    date.format(DB_DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DB_DATE_FORMAT)
        .map_err(|err| anyhow!("invalid {field} date '{value}': {err}"))
}

pub fn parse_optional_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>> {
    match value {
        Some(raw) => parse_date(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_status(value: Option<&str>, field: &str) -> Result<DeviceStatus> {
    let raw = value.unwrap_or("");
    DeviceStatus::from_db(raw).ok_or_else(|| anyhow!("unknown {field} value '{raw}'"))
}
