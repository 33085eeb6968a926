//! Data model shared by the API client, domain rules, CLI, and GUI.
//!
//! Wire-facing structs are deliberately tolerant: the backend emits camelCase
//! for the analyze response and snake_case for persisted detections, stores
//! confidence as text, and omits fields freely. Everything missing or
//! malformed is coerced to a displayable default instead of failing.

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Sentinel plate text for unreadable or missing plates
pub const UNKNOWN_PLATE: &str = "UNKNOWN";

/// Deserialize null as default value
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

/// Deserialize a confidence that may arrive as a JSON number or a string
/// (the backend persists it as text). Unparseable input coerces to 0.0.
fn confidence_from_any<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(v)) => Ok(v),
        Some(Raw::Text(s)) => Ok(s.trim().parse().unwrap_or(0.0)),
        None => Ok(0.0),
    }
}

/// Deserialize a plate, substituting the UNKNOWN sentinel for null/empty
fn plate_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => UNKNOWN_PLATE.to_string(),
    })
}

fn unknown_plate() -> String {
    UNKNOWN_PLATE.to_string()
}

/// Vehicle classification used for toll rating
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum VehicleType {
    Car,
    Truck,
    Motorcycle,
    Bus,
    Van,
    #[default]
    #[serde(other)]
    Unknown,
}

impl VehicleType {
    /// All enumerated types, Unknown last
    pub const ALL: [VehicleType; 6] = [
        VehicleType::Car,
        VehicleType::Truck,
        VehicleType::Motorcycle,
        VehicleType::Bus,
        VehicleType::Van,
        VehicleType::Unknown,
    ];

    /// Wire/display label (matches the backend's PascalCase strings)
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::Car => "Car",
            VehicleType::Truck => "Truck",
            VehicleType::Motorcycle => "Motorcycle",
            VehicleType::Bus => "Bus",
            VehicleType::Van => "Van",
            VehicleType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for VehicleType {
    type Err = std::convert::Infallible;

    /// Unrecognized names map to Unknown rather than failing
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "car" => VehicleType::Car,
            "truck" => VehicleType::Truck,
            "motorcycle" => VehicleType::Motorcycle,
            "bus" => VehicleType::Bus,
            "van" => VehicleType::Van,
            _ => VehicleType::Unknown,
        })
    }
}

/// Registered owner annotation attached to a recognized vehicle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub photo: String,
}

/// One recognition outcome for a single image (`POST /analyze` response)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "null_to_default")]
    pub vehicle_type: VehicleType,

    #[serde(default = "unknown_plate", deserialize_with = "plate_or_unknown")]
    pub license_plate: String,

    #[serde(default, deserialize_with = "confidence_from_any")]
    pub confidence: f64,

    #[serde(default, deserialize_with = "null_to_default")]
    pub color: String,

    #[serde(default, deserialize_with = "null_to_default")]
    pub make_model: String,

    #[serde(default, deserialize_with = "null_to_default")]
    pub description: String,

    /// Present only when the plate matched a registry entry
    #[serde(default)]
    pub owner: Option<OwnerInfo>,

    /// Toll computed server-side, when the backend already rated the pass
    #[serde(default)]
    pub toll_amount: Option<f64>,

    /// Server-assigned status string, when the backend already persisted it
    #[serde(default)]
    pub status: Option<String>,
}

impl AnalysisResult {
    pub fn is_registered(&self) -> bool {
        self.owner.is_some()
    }
}

/// Review status of a persisted detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Processed,
    ManualReview,
}

impl RecordStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RecordStatus::Processed => "processed",
            RecordStatus::ManualReview => "manual_review",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A persisted, reviewable detection in display form.
///
/// Only reconciliation produces these; raw backend rows arrive as
/// [`RawDetection`] and are coerced field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TollRecord {
    pub id: String,
    /// Capture time, epoch milliseconds
    pub timestamp_ms: i64,
    pub vehicle_type: VehicleType,
    pub license_plate: String,
    pub confidence: f64,
    pub toll_amount: f64,
    pub image_url: String,
    pub status: RecordStatus,
    pub color: String,
    pub make_model: String,
    pub description: String,
    pub owner: Option<OwnerInfo>,
}

impl TollRecord {
    pub fn needs_review(&self) -> bool {
        self.status == RecordStatus::ManualReview
    }
}

/// Raw persisted detection row (`GET /api/history`, `GET /api/review_queue`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDetection {
    pub id: i64,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default, deserialize_with = "confidence_from_any")]
    pub confidence: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub toll_amount: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub make_model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Aggregate snapshot recomputed by the backend (`GET /api/summary`)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total_vehicles: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub avg_confidence: f64,
    #[serde(default)]
    pub pending_review: u64,
}

/// One point of the revenue-over-time series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenuePoint {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub revenue: f64,
}

/// One point of the traffic-by-hour series
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TrafficPoint {
    #[serde(default)]
    pub hour: u32,
    #[serde(default)]
    pub count: u64,
}

/// One slice of the vehicle-type distribution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionSlice {
    #[serde(rename = "type", default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub count: u64,
}

/// Chart datasets (`GET /api/analytics`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    #[serde(default)]
    pub revenue_trend: Vec<RevenuePoint>,
    #[serde(default)]
    pub hourly_traffic: Vec<TrafficPoint>,
    #[serde(default)]
    pub vehicle_distribution: Vec<DistributionSlice>,
    #[serde(default)]
    pub summary: Summary,
}

/// Registered vehicle row (`GET /api/vehicles`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryVehicle {
    pub id: i64,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub make_model: String,
    #[serde(default)]
    pub owner_id: Option<i64>,
}

/// Registered owner row (`GET /api/owners`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryOwner {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub photo_path: Option<String>,
}

/// Owner self-service lookup (`GET /api/vehicle/status/{plate}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleStatusReport {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub vehicle: Option<RegistryVehicle>,
    #[serde(default)]
    pub owner: Option<RegistryOwner>,
    #[serde(default)]
    pub history_count: Option<u64>,
    #[serde(default)]
    pub total_due: Option<f64>,
}

/// Result of a registry bulk import (`POST /api/import`)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ImportOutcome {
    #[serde(default)]
    pub imported: u64,
    #[serde(default)]
    pub failed: u64,
}

/// Owner/vehicle registration submission (`POST /api/register`)
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub contact_info: String,
    pub license_plate: String,
    pub make_model: String,
    /// Optional owner photo to upload alongside the form fields
    pub photo: Option<PathBuf>,
}

impl RegistrationForm {
    /// Plates are stored uppercase; normalize before submission
    pub fn normalized_plate(&self) -> String {
        self.license_plate.trim().to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_type_tolerates_unknown_strings() {
        let t: VehicleType = serde_json::from_str("\"Hovercraft\"").unwrap();
        assert_eq!(t, VehicleType::Unknown);

        let t: VehicleType = serde_json::from_str("\"Truck\"").unwrap();
        assert_eq!(t, VehicleType::Truck);
    }

    #[test]
    fn vehicle_type_from_str_never_fails() {
        assert_eq!("bus".parse::<VehicleType>().unwrap(), VehicleType::Bus);
        assert_eq!("???".parse::<VehicleType>().unwrap(), VehicleType::Unknown);
    }

    #[test]
    fn analysis_result_fills_missing_fields() {
        let result: AnalysisResult = serde_json::from_str("{}").unwrap();
        assert_eq!(result.vehicle_type, VehicleType::Unknown);
        assert_eq!(result.license_plate, UNKNOWN_PLATE);
        assert_eq!(result.confidence, 0.0);
        assert!(result.owner.is_none());
    }

    #[test]
    fn analysis_result_parses_full_response() {
        let json = r#"{
            "vehicleType": "Car",
            "licensePlate": "KA01AB1234",
            "confidence": 0.93,
            "color": "Blue",
            "makeModel": "Toyota Camry",
            "description": "A blue sedan.",
            "owner": {"name": "Asha", "info": "asha@example.com", "photo": "/uploads/a.jpg"},
            "tollAmount": 50.0,
            "status": "verified"
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.vehicle_type, VehicleType::Car);
        assert_eq!(result.license_plate, "KA01AB1234");
        assert!(result.is_registered());
        assert_eq!(result.toll_amount, Some(50.0));
        assert_eq!(result.status.as_deref(), Some("verified"));
    }

    #[test]
    fn raw_detection_accepts_string_confidence() {
        let json = r#"{"id": 7, "confidence": "0.85", "toll_amount": 150.0}"#;
        let raw: RawDetection = serde_json::from_str(json).unwrap();
        assert_eq!(raw.confidence, 0.85);

        let json = r#"{"id": 8, "confidence": 0.42}"#;
        let raw: RawDetection = serde_json::from_str(json).unwrap();
        assert_eq!(raw.confidence, 0.42);

        let json = r#"{"id": 9, "confidence": "n/a"}"#;
        let raw: RawDetection = serde_json::from_str(json).unwrap();
        assert_eq!(raw.confidence, 0.0);
    }

    #[test]
    fn analytics_report_defaults_to_empty_series() {
        let report: AnalyticsReport = serde_json::from_str("{}").unwrap();
        assert!(report.revenue_trend.is_empty());
        assert!(report.vehicle_distribution.is_empty());
        assert_eq!(report.summary.total_vehicles, 0);
    }

    #[test]
    fn registration_form_normalizes_plate() {
        let form = RegistrationForm {
            license_plate: " ka01ab1234 ".to_string(),
            ..Default::default()
        };
        assert_eq!(form.normalized_plate(), "KA01AB1234");
    }
}
