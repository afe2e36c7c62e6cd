use serde::{Deserialize, Serialize};

use crate::config::{DOWNLOAD_HEADER, UPLOAD_HEADER};

// ---------------------------------------------------------------------------
// PriceRecord: Single persisted price item
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PriceRecord {
    pub id: i64,
    pub created_date: String,
    pub name: String,
    pub category: String,
    pub price: f64,
}

impl PriceRecord {
    /// Price formatted with exactly two fractional digits.
    pub fn price_text(&self) -> String {
        format!("{:.2}", self.price)
    }

    /// Fields in download order (see [`DOWNLOAD_HEADER`]).
    pub fn download_fields(&self) -> [String; DOWNLOAD_HEADER.len()] {
        [
            self.id.to_string(),
            self.created_date.clone(),
            self.name.clone(),
            self.category.clone(),
            self.price_text(),
        ]
    }

    /// Fields in upload order (see [`UPLOAD_HEADER`]).
    pub fn upload_fields(&self) -> [String; UPLOAD_HEADER.len()] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            self.price_text(),
            self.created_date.clone(),
        ]
    }
}

// ---------------------------------------------------------------------------
// ImportSummary: Totals reported after a committed import
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ImportSummary {
    pub total_items: i64,
    pub total_categories: i64,
    pub total_price: f64,
}

impl ImportSummary {
    pub fn new(total_items: i64, total_categories: i64, total_price: f64) -> Self {
        Self {
            total_items,
            total_categories,
            total_price: round_cents(total_price),
        }
    }
}

/// Round to two decimal places, dropping float noise from summed prices.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
