//! Seed construction.
//!
//! Two distinct seeds exist on purpose and must never be merged: the content
//! seed includes a coarse time bucket so messages vary across calls while
//! staying reproducible within the bucket; the speaker key excludes any
//! timestamp so a given personalization always maps to the same voice.

use chrono::{DateTime, Utc};

use crate::compose::Locale;

/// One bucket per hour: enough variety across visits, stable within a visit.
const BUCKET_SECS: i64 = 3600;

pub fn content_seed(identifier: &str, locale: Locale, now: DateTime<Utc>) -> String {
    let bucket = now.timestamp().div_euclid(BUCKET_SECS);
    format!("{identifier}|{}|{bucket}", locale.code())
}
