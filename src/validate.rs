//! Conversion of raw upload fields into [`PriceRecord`]s.

use crate::config::{PRICE_LIMIT, UPLOAD_HEADER};
use crate::error::{PricesError, Result};
use crate::models::PriceRecord;

const ID: usize = 0;
const NAME: usize = 1;
const CATEGORY: usize = 2;
const PRICE: usize = 3;
const CREATED_DATE: usize = 4;

/// Build a record from one upload row (`id, name, category, price, created_date`).
///
/// Only `id` and `price` are typed here. Name, category and date are taken
/// verbatim; a bad date is left for the store to reject on insert.
pub fn to_record<S: AsRef<str>>(fields: &[S]) -> Result<PriceRecord> {
    if fields.len() < UPLOAD_HEADER.len() {
        return Err(PricesError::MalformedTable(format!(
            "expected {} fields, found {}",
            UPLOAD_HEADER.len(),
            fields.len()
        )));
    }

    let id_text = fields[ID].as_ref();
    let id = id_text
        .parse::<i64>()
        .map_err(|_| PricesError::InvalidId(id_text.to_string()))?;

    Ok(PriceRecord {
        id,
        created_date: fields[CREATED_DATE].as_ref().to_string(),
        name: fields[NAME].as_ref().to_string(),
        category: fields[CATEGORY].as_ref().to_string(),
        price: parse_price(fields[PRICE].as_ref())?,
    })
}

fn parse_price(text: &str) -> Result<f64> {
    match text.parse::<f64>() {
        Ok(price) if (0.0..PRICE_LIMIT).contains(&price) => Ok(price),
        _ => Err(PricesError::InvalidPrice(text.to_string())),
    }
}
