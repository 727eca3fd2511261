//! Decoded report types shared between the decoder and the event surface.

use serde::{Serialize, Deserialize};

/// Represents one fully decoded position report from a tracker device.
///
/// Serialized field names follow the device wire vocabulary; members that
/// only exist in the extended 28-field report variant are omitted from the
/// serialized form when absent.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrackRecord {

    /// The trimmed report line exactly as the device delivered it, retained
    /// verbatim for audit and debugging.
    pub raw: String,

    /// Device clock timestamp, rewritten as `20YY-MM-DD HH:mm:ss` when the
    /// field has its expected 12-digit shape.
    pub datetime: String,

    /// Device-reported subscriber number. Opaque passthrough.
    pub phone: String,

    /// Device hardware identifier, with its `imei:` prefix stripped.
    pub imei: String,

    /// GPS fix status for this report.
    pub gps: GpsStatus,

    /// Serving cell tower details. Only the 28-field report variant carries
    /// these.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<CellInfo>,

    /// Decoded position and heading.
    pub geo: GeoPosition,

    /// Reported speed in the three common units.
    pub speed: SpeedReading,

    /// Battery reading as reported, e.g. `F:4.24V`. 28-field variant only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<String>,

    /// Charger connection flag as reported. 28-field variant only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging: Option<String>,

    /// Whether the checksum embedded in the line matched the computed one.
    /// A mismatch does not suppress the record.
    pub checksum: bool
}

/// GPS receiver state attached to a report.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GpsStatus {

    /// Fix date, rewritten as `20YY-MM-DD` from the device's `DDMMYY` field
    /// when it has its expected shape. Reconstructed independently of
    /// [`TrackRecord::datetime`], so the two may legitimately differ.
    pub date: String,

    /// Fix time of day as `HH:MM:SS`, sub-second part dropped.
    pub time: String,

    /// Reported signal strength.
    pub signal: SignalStrength,

    /// Whether the receiver holds a positioned fix.
    pub fix: FixStatus,

    /// Number of satellites in view. Passthrough; 28-field variant only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sats: Option<String>
}

/// GSM signal strength as the device classifies it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum SignalStrength {

    /// Device reported full signal (`F`).
    #[serde(rename = "full")]
    Full,

    /// Anything other than a full-signal report.
    #[serde(rename = "low")]
    Low
}

/// GPS lock state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum FixStatus {

    /// Receiver is positioned (`A`).
    #[serde(rename = "active")]
    Active,

    /// No usable lock.
    #[serde(rename = "invalid")]
    Invalid
}

/// Serving cell tower identification from the extended report variant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CellInfo {

    /// Mobile country code.
    pub mcc: String,

    /// Mobile network code.
    pub mnc: String,

    /// Location area code.
    pub lac: String,

    /// GSM cell id.
    pub id: String
}

/// Decoded position in signed decimal degrees.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeoPosition {

    /// Latitude, positive north, rounded to 6 decimal places. NaN when the
    /// coordinate field did not parse.
    pub latitude: f64,

    /// Longitude, positive east, rounded to 6 decimal places. NaN when the
    /// coordinate field did not parse.
    pub longitude: f64,

    /// Heading in whole degrees, fractional part truncated. `None` when the
    /// field carried no leading integer.
    pub bearing: Option<i32>
}

/// One reported speed, derived into the three common units and rounded to
/// 3 decimal places.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SpeedReading {

    /// Speed as reported, in knots.
    pub knots: f64,

    /// Speed in kilometers per hour.
    pub kmh: f64,

    /// Speed in miles per hour.
    pub mph: f64
}
