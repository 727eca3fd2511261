//! The vendor GPRMC report dialect spoken by XT009/TK102 firmware.

use crate::decoder::{checksum, geo, leading_int, SentenceLayout};
use crate::types::*;

/// Comma-separated field count of the base report variant.
const BASE_FIELDS: usize = 18;

/// Comma-separated field count of the extended report variant.
const EXTENDED_FIELDS: usize = 28;

/// Sentence-type marker expected at field 2.
const MARKER: &str = "GPRMC";

/// Literal prefix on the IMEI field.
const IMEI_PREFIX: &str = "imei:";

const KNOTS_TO_KMH: f64 = 1.852;
const KNOTS_TO_MPH: f64 = 1.151;

/// Layout for the vendor GPRMC dialect.
///
/// Accepts lines with exactly 18 or 28 comma-separated fields and the
/// `GPRMC` marker at field 2. The extended variant appends satellite count,
/// battery, charging and cell tower fields; the base variant carries the
/// IMEI one field earlier and none of the extras. Structural validity is all
/// that gates acceptance: a failed checksum still produces a record, flagged
/// through [`TrackRecord::checksum`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GprmcLayout;

impl SentenceLayout for GprmcLayout {
    fn try_decode(&self, raw: &str) -> Option<TrackRecord> {
        let raw = raw.trim();
        let fields: Vec<&str> = raw.split(',').collect();

        let extended = match fields.len() {
            BASE_FIELDS => false,
            EXTENDED_FIELDS => true,
            _ => return None,
        };
        if fields[2] != MARKER {
            return None;
        }

        // The extended firmware pads its IMEI field with whitespace.
        let imei = if extended {
            fields[17].replacen(IMEI_PREFIX, "", 1).trim().to_string()
        } else {
            fields[16].replacen(IMEI_PREFIX, "", 1)
        };

        let knots = numeric(fields[9]);

        Some(TrackRecord {
            raw: raw.to_string(),
            datetime: rewrite_datetime(fields[0]),
            phone: fields[1].to_string(),
            imei,
            gps: GpsStatus {
                date: rewrite_date(fields[11]),
                time: rewrite_time(fields[3]),
                signal: if fields[15] == "F" {
                    SignalStrength::Full
                } else {
                    SignalStrength::Low
                },
                fix: if fields[4] == "A" {
                    FixStatus::Active
                } else {
                    FixStatus::Invalid
                },
                sats: extended.then(|| fields[18].to_string()),
            },
            cell: extended.then(|| CellInfo {
                mcc: fields[24].to_string(),
                mnc: fields[25].to_string(),
                lac: fields[26].to_string(),
                id: fields[27].to_string(),
            }),
            geo: GeoPosition {
                latitude: geo::to_decimal_degrees(fields[5], fields[6]),
                longitude: geo::to_decimal_degrees(fields[7], fields[8]),
                bearing: leading_int(fields[10]).and_then(|v| i32::try_from(v).ok()),
            },
            speed: SpeedReading {
                knots: round3(knots),
                kmh: round3(knots * KNOTS_TO_KMH),
                mph: round3(knots * KNOTS_TO_MPH),
            },
            battery: extended.then(|| fields[20].to_string()),
            charging: extended.then(|| fields[21].to_string()),
            checksum: checksum::verify(raw),
        })
    }
}

/// Rewrite the 12-digit device clock field `YYMMDDHHmmss` as
/// `20YY-MM-DD HH:mm:ss`. Fields of any other shape pass through verbatim.
fn rewrite_datetime(field: &str) -> String {
    if field.len() == 12 && field.bytes().all(|b| b.is_ascii_digit()) {
        format!(
            "20{}-{}-{} {}:{}:{}",
            &field[0..2],
            &field[2..4],
            &field[4..6],
            &field[6..8],
            &field[8..10],
            &field[10..12]
        )
    } else {
        field.to_string()
    }
}

/// Rewrite the 6-digit GPS fix date `DDMMYY` as `20YY-MM-DD`. Token order
/// differs from the device clock field: day first, year last. Fields of any
/// other shape pass through verbatim.
fn rewrite_date(field: &str) -> String {
    if field.len() == 6 && field.bytes().all(|b| b.is_ascii_digit()) {
        format!("20{}-{}-{}", &field[4..6], &field[2..4], &field[0..2])
    } else {
        field.to_string()
    }
}

/// Rewrite the GPS fix time `HHMMSS.mmm` as `HH:MM:SS`, dropping the
/// sub-second part. Fields of any other shape pass through verbatim.
fn rewrite_time(field: &str) -> String {
    let bytes = field.as_bytes();
    if bytes.len() == 10
        && bytes[6] == b'.'
        && bytes[..6].iter().all(u8::is_ascii_digit)
        && bytes[7..].iter().all(u8::is_ascii_digit)
    {
        format!("{}:{}:{}", &field[0..2], &field[2..4], &field[4..6])
    } else {
        field.to_string()
    }
}

/// Numeric field coercion: empty fields read as zero, unparseable ones as
/// NaN.
fn numeric(field: &str) -> f64 {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse().unwrap_or(f64::NAN)
    }
}

/// Round to 3 decimal places, halves away from zero.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENDED_REPORT: &str = "170517225424,00385918985008,GPRMC,205424.000,A,4310.1757,N,01626.4730,E,0.10,123.43,170517,,,A*69,F,, imei:863070018466416,10,-0.8,F:4.24V,1,127,19274,219,01,047E,8CEC";
    const BASE_REPORT: &str = "1203292316,0031698765432,GPRMC,211657.000,A,5213.0247,N,00516.7757,E,0.00,273.30,290312,,,A*62,F,imei:123456789012345,123";

    fn decode(raw: &str) -> Option<TrackRecord> {
        GprmcLayout.try_decode(raw)
    }

    #[test]
    fn decodes_the_extended_variant() {
        let record = decode(EXTENDED_REPORT).unwrap();

        assert_eq!(record.raw, EXTENDED_REPORT);
        assert_eq!(record.datetime, "2017-05-17 22:54:24");
        assert_eq!(record.phone, "00385918985008");
        assert_eq!(record.imei, "863070018466416");
        assert_eq!(record.gps.date, "2017-05-17");
        assert_eq!(record.gps.time, "20:54:24");
        assert_eq!(record.gps.signal, SignalStrength::Full);
        assert_eq!(record.gps.fix, FixStatus::Active);
        assert_eq!(record.gps.sats.as_deref(), Some("10"));
        assert_eq!(record.geo.latitude, 43.169595);
        assert_eq!(record.geo.longitude, 16.441217);
        assert_eq!(record.geo.bearing, Some(123));
        assert_eq!(record.speed.knots, 0.1);
        assert_eq!(record.speed.kmh, 0.185);
        assert_eq!(record.speed.mph, 0.115);
        assert_eq!(record.battery.as_deref(), Some("F:4.24V"));
        assert_eq!(record.charging.as_deref(), Some("1"));
        assert!(record.checksum);

        let cell = record.cell.unwrap();
        assert_eq!(cell.mcc, "219");
        assert_eq!(cell.mnc, "01");
        assert_eq!(cell.lac, "047E");
        assert_eq!(cell.id, "8CEC");
    }

    #[test]
    fn decodes_the_base_variant() {
        let record = decode(BASE_REPORT).unwrap();

        assert_eq!(record.raw, BASE_REPORT);
        assert_eq!(record.phone, "0031698765432");
        assert_eq!(record.imei, "123456789012345");
        assert_eq!(record.gps.date, "2012-03-29");
        assert_eq!(record.gps.time, "21:16:57");
        assert_eq!(record.gps.signal, SignalStrength::Full);
        assert_eq!(record.gps.fix, FixStatus::Active);
        assert_eq!(record.geo.latitude, 52.217078);
        assert_eq!(record.geo.longitude, 5.279595);
        assert_eq!(record.geo.bearing, Some(273));
        assert_eq!(record.speed.knots, 0.0);
        assert_eq!(record.speed.kmh, 0.0);
        assert_eq!(record.speed.mph, 0.0);
        assert!(record.checksum);

        assert!(record.gps.sats.is_none());
        assert!(record.cell.is_none());
        assert!(record.battery.is_none());
        assert!(record.charging.is_none());
    }

    #[test]
    fn base_variant_device_clock_passes_through_when_malformed() {
        // The fixture's clock field is 10 digits, not the expected 12.
        let record = decode(BASE_REPORT).unwrap();
        assert_eq!(record.datetime, "1203292316");
    }

    #[test]
    fn declines_unknown_input() {
        assert!(decode("invalid input").is_none());
        assert!(decode("").is_none());
    }

    #[test]
    fn declines_wrong_field_counts() {
        let too_few = EXTENDED_REPORT.rsplit_once(',').unwrap().0;
        assert!(decode(too_few).is_none());
        assert!(decode(&format!("{EXTENDED_REPORT},extra")).is_none());
    }

    #[test]
    fn declines_missing_marker() {
        assert!(decode(&EXTENDED_REPORT.replace("GPRMC", "GPGGA")).is_none());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let record = decode(&format!("  {EXTENDED_REPORT}\r\n")).unwrap();
        assert_eq!(record.raw, EXTENDED_REPORT);
        assert!(record.checksum);
    }

    #[test]
    fn checksum_mismatch_still_produces_a_record() {
        let tampered = EXTENDED_REPORT.replace("A*69", "A*70");
        let record = decode(&tampered).unwrap();
        assert!(!record.checksum);
        assert_eq!(record.imei, "863070018466416");
    }

    #[test]
    fn empty_speed_field_reads_as_zero() {
        let quiet = BASE_REPORT.replace(",0.00,", ",,");
        let record = decode(&quiet).unwrap();
        assert_eq!(record.speed.knots, 0.0);
        assert_eq!(record.speed.kmh, 0.0);
    }

    #[test]
    fn digitless_bearing_reads_as_none() {
        let adrift = BASE_REPORT.replace(",273.30,", ",unknown,");
        let record = decode(&adrift).unwrap();
        assert_eq!(record.geo.bearing, None);
    }

    #[test]
    fn non_numeric_coordinates_read_as_nan() {
        let lost = BASE_REPORT.replace("5213.0247", "badcoord1");
        let record = decode(&lost).unwrap();
        assert!(record.geo.latitude.is_nan());
        assert_eq!(record.geo.longitude, 5.279595);
    }

    #[test]
    fn base_variant_keeps_imei_padding() {
        // Only the extended variant trims its IMEI field.
        let padded = BASE_REPORT.replace(",F,imei:", ",F, imei:");
        let record = decode(&padded).unwrap();
        assert_eq!(record.imei, " 123456789012345");

        let record = decode(EXTENDED_REPORT).unwrap();
        assert_eq!(record.imei, "863070018466416");
    }

    #[test]
    fn low_signal_and_invalid_fix_letters() {
        let weak = BASE_REPORT
            .replace(",A,5213", ",V,5213")
            .replace(",F,imei:", ",L,imei:");
        let record = decode(&weak).unwrap();
        assert_eq!(record.gps.signal, SignalStrength::Low);
        assert_eq!(record.gps.fix, FixStatus::Invalid);
    }

    #[test]
    fn serializes_under_wire_names() {
        let value = serde_json::to_value(decode(EXTENDED_REPORT).unwrap()).unwrap();

        assert_eq!(value["gps"]["signal"], "full");
        assert_eq!(value["gps"]["fix"], "active");
        assert_eq!(value["cell"]["id"], "8CEC");
        assert_eq!(value["speed"]["kmh"], 0.185);
        assert_eq!(value["checksum"], true);
    }

    #[test]
    fn absent_extended_members_vanish_from_json() {
        let value = serde_json::to_value(decode(BASE_REPORT).unwrap()).unwrap();
        let object = value.as_object().unwrap();

        assert!(!object.contains_key("cell"));
        assert!(!object.contains_key("battery"));
        assert!(!object.contains_key("charging"));
        assert!(!value["gps"].as_object().unwrap().contains_key("sats"));

        // The bearing member always serializes, as null when unreadable.
        let adrift = BASE_REPORT.replace(",273.30,", ",unknown,");
        let value = serde_json::to_value(decode(&adrift).unwrap()).unwrap();
        assert!(value["geo"]["bearing"].is_null());
    }
}
