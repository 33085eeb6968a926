//! Coercing raw backend rows and fresh analysis results into toll records

use autotoll_types::{
    AnalysisResult, RawDetection, RecordStatus, TollRecord, VehicleType, UNKNOWN_PLATE,
};
use chrono::DateTime;

use crate::rates::TollTable;

/// Confidence strictly above this is processed automatically;
/// at or below it the record is queued for manual review.
pub const REVIEW_THRESHOLD: f64 = 0.7;

/// Backend status string that marks a detection as reviewed and settled
const STATUS_VERIFIED: &str = "verified";

fn status_from_backend(status: Option<&str>) -> RecordStatus {
    match status {
        Some(STATUS_VERIFIED) => RecordStatus::Processed,
        _ => RecordStatus::ManualReview,
    }
}

/// Parse a backend timestamp into epoch milliseconds.
///
/// The backend writes naive UTC datetimes without a zone suffix; a bare
/// timestamp gets a 'Z' appended before parsing. Unparseable input returns
/// the supplied fallback instead of failing.
pub fn parse_backend_timestamp(raw: &str, fallback_ms: i64) -> i64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return fallback_ms;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }
    DateTime::parse_from_rfc3339(&format!("{raw}Z"))
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(fallback_ms)
}

/// Promote a fresh analysis response into a display record.
///
/// A server-assigned status and toll are canonical when present; otherwise
/// the record is classified by [`REVIEW_THRESHOLD`] and rated locally.
pub fn promote(
    result: &AnalysisResult,
    table: &TollTable,
    id: String,
    timestamp_ms: i64,
    image_url: String,
) -> TollRecord {
    let status = match result.status.as_deref() {
        Some(s) => status_from_backend(Some(s)),
        None if result.confidence > REVIEW_THRESHOLD => RecordStatus::Processed,
        None => RecordStatus::ManualReview,
    };
    let toll_amount = result
        .toll_amount
        .unwrap_or_else(|| table.rate(result.vehicle_type));

    TollRecord {
        id,
        timestamp_ms,
        vehicle_type: result.vehicle_type,
        license_plate: result.license_plate.clone(),
        confidence: result.confidence,
        toll_amount,
        image_url,
        status,
        color: result.color.clone(),
        make_model: result.make_model.clone(),
        description: result.description.clone(),
        owner: result.owner.clone(),
    }
}

/// Reconcile a persisted detection row into a display record.
///
/// Every missing field is coerced to a displayable default; the row's own
/// status is canonical and the review threshold is never re-applied here.
pub fn reconcile(raw: &RawDetection, base_url: &str, fallback_ms: i64) -> TollRecord {
    let vehicle_type = raw
        .vehicle_type
        .as_deref()
        .map(|s| s.parse().unwrap_or(VehicleType::Unknown))
        .unwrap_or_default();

    let license_plate = match raw.license_plate.as_deref() {
        Some(p) if !p.trim().is_empty() => p.to_string(),
        _ => UNKNOWN_PLATE.to_string(),
    };

    let timestamp_ms = raw
        .timestamp
        .as_deref()
        .map(|ts| parse_backend_timestamp(ts, fallback_ms))
        .unwrap_or(fallback_ms);

    let image_url = raw
        .image_path
        .as_deref()
        .map(|path| format!("{}{}", base_url.trim_end_matches('/'), path))
        .unwrap_or_default();

    TollRecord {
        id: raw.id.to_string(),
        timestamp_ms,
        vehicle_type,
        license_plate,
        confidence: raw.confidence,
        toll_amount: raw.toll_amount.unwrap_or(0.0),
        image_url,
        status: status_from_backend(raw.status.as_deref()),
        color: String::new(),
        make_model: raw.make_model.clone().unwrap_or_default(),
        description: raw.description.clone().unwrap_or_default(),
        owner: None,
    }
}

/// Reconcile a page of detection rows, preserving order
pub fn reconcile_all(rows: &[RawDetection], base_url: &str, fallback_ms: i64) -> Vec<TollRecord> {
    rows.iter()
        .map(|raw| reconcile(raw, base_url, fallback_ms))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: i64) -> RawDetection {
        RawDetection {
            id,
            ..Default::default()
        }
    }

    #[test]
    fn threshold_is_strict() {
        let table = TollTable::default();
        let mut result = AnalysisResult {
            confidence: 0.70,
            ..Default::default()
        };
        let record = promote(&result, &table, "a".into(), 0, String::new());
        assert_eq!(record.status, RecordStatus::ManualReview);

        result.confidence = 0.71;
        let record = promote(&result, &table, "a".into(), 0, String::new());
        assert_eq!(record.status, RecordStatus::Processed);
    }

    #[test]
    fn server_status_overrides_threshold() {
        let table = TollTable::default();
        let result = AnalysisResult {
            confidence: 0.99,
            status: Some("pending".into()),
            ..Default::default()
        };
        let record = promote(&result, &table, "a".into(), 0, String::new());
        assert_eq!(record.status, RecordStatus::ManualReview);

        let result = AnalysisResult {
            confidence: 0.1,
            status: Some("verified".into()),
            ..Default::default()
        };
        let record = promote(&result, &table, "a".into(), 0, String::new());
        assert_eq!(record.status, RecordStatus::Processed);
    }

    #[test]
    fn server_toll_wins_over_local_rate() {
        let table = TollTable::default();
        let result = AnalysisResult {
            vehicle_type: VehicleType::Car,
            toll_amount: Some(42.0),
            ..Default::default()
        };
        let record = promote(&result, &table, "a".into(), 0, String::new());
        assert_eq!(record.toll_amount, 42.0);

        let result = AnalysisResult {
            vehicle_type: VehicleType::Car,
            ..Default::default()
        };
        let record = promote(&result, &table, "a".into(), 0, String::new());
        assert_eq!(record.toll_amount, 5.00);
    }

    #[test]
    fn timestamp_without_zone_is_read_as_utc() {
        let ms = parse_backend_timestamp("2025-06-01T00:00:00", -1);
        assert_eq!(ms, 1748736000000);
        // already zoned input is untouched
        assert_eq!(parse_backend_timestamp("2025-06-01T00:00:00Z", -1), ms);
    }

    #[test]
    fn bad_timestamp_uses_fallback() {
        assert_eq!(parse_backend_timestamp("yesterday", 123), 123);
        assert_eq!(parse_backend_timestamp("", 123), 123);
    }

    #[test]
    fn reconcile_coerces_missing_fields() {
        let row = raw(17);
        let record = reconcile(&row, "http://localhost:8000", 999);
        assert_eq!(record.id, "17");
        assert_eq!(record.license_plate, UNKNOWN_PLATE);
        assert_eq!(record.vehicle_type, VehicleType::Unknown);
        assert_eq!(record.toll_amount, 0.0);
        assert_eq!(record.timestamp_ms, 999);
        assert_eq!(record.status, RecordStatus::ManualReview);
        assert!(record.image_url.is_empty());
    }

    #[test]
    fn reconcile_builds_image_url_from_base() {
        let row = RawDetection {
            id: 1,
            image_path: Some("/uploads/cap_1.jpg".into()),
            ..Default::default()
        };
        let record = reconcile(&row, "http://localhost:8000/", 0);
        assert_eq!(record.image_url, "http://localhost:8000/uploads/cap_1.jpg");
    }

    #[test]
    fn reconcile_trusts_row_status_even_at_low_confidence() {
        let row = RawDetection {
            id: 2,
            confidence: 0.2,
            status: Some("verified".into()),
            ..Default::default()
        };
        let record = reconcile(&row, "http://x", 0);
        assert_eq!(record.status, RecordStatus::Processed);
    }

    #[test]
    fn unknown_vehicle_string_maps_to_unknown() {
        let row = RawDetection {
            id: 3,
            vehicle_type: Some("Rickshaw".into()),
            ..Default::default()
        };
        let record = reconcile(&row, "http://x", 0);
        assert_eq!(record.vehicle_type, VehicleType::Unknown);
    }
}
