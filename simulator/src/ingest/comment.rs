use std::collections::BTreeMap;
use trackcore::track::GpsStatus;

const GPS_ERROR_KEY: &str = "GPS_ERROR";
const GPS_OK_VALUE: &str = "NONE";

/// Splits a `KEY:VALUE,KEY:VALUE` machine comment into upper-cased keys.
///
/// Pairs without a key or value are ignored.
pub fn parse_comment(comment: &str) -> BTreeMap<String, String> {
    comment
        .split(',')
        .filter_map(|pair| pair.split_once(':'))
        .filter_map(|(key, value)| {
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                None
            } else {
                Some((key.to_ascii_uppercase(), value.to_string()))
            }
        })
        .collect()
}

fn status_from_value(value: &str) -> Option<GpsStatus> {
    let value = value.trim();
    if value.is_empty()
        || value.eq_ignore_ascii_case("undefined")
        || value.eq_ignore_ascii_case("null")
    {
        return None;
    }
    if value.eq_ignore_ascii_case(GPS_OK_VALUE) {
        Some(GpsStatus::Valid)
    } else {
        Some(GpsStatus::Invalid)
    }
}

/// GPS usability encoded in a comment, `None` when the comment carries no flag.
pub fn gps_status_from_comment(comment: &str) -> Option<GpsStatus> {
    parse_comment(comment)
        .get(GPS_ERROR_KEY)
        .and_then(|value| status_from_value(value))
}

/// Resolves the status of a feed row: an explicit `gps_error` column wins
/// over the comment.
pub fn resolve_gps_status(gps_error: Option<&str>, comment: Option<&str>) -> Option<GpsStatus> {
    if let Some(raw) = gps_error {
        let raw = raw.trim();
        let value = match raw.split_once(':') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case(GPS_ERROR_KEY) => value,
            _ => raw,
        };
        if let Some(status) = status_from_value(value) {
            return Some(status);
        }
    }
    comment.and_then(gps_status_from_comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_comment_collects_pairs() {
        let parsed = parse_comment("MODE:NORMAL, comm:OK,GPS:LOCKED,,broken,ERROR:");
        assert_eq!(parsed.get("MODE").map(String::as_str), Some("NORMAL"));
        assert_eq!(parsed.get("COMM").map(String::as_str), Some("OK"));
        assert_eq!(parsed.get("GPS").map(String::as_str), Some("LOCKED"));
        assert!(!parsed.contains_key("ERROR"));
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn comment_flag_maps_to_status() {
        assert_eq!(
            gps_status_from_comment("MODE:NORMAL,GPS_ERROR:NONE"),
            Some(GpsStatus::Valid)
        );
        assert_eq!(
            gps_status_from_comment("GPS_ERROR:ERROR,MODE:NORMAL"),
            Some(GpsStatus::Invalid)
        );
        assert_eq!(
            gps_status_from_comment("GPS_ERROR:NO_FIX/TIMEOUT"),
            Some(GpsStatus::Invalid)
        );
        assert_eq!(gps_status_from_comment("MODE:NORMAL"), None);
    }

    #[test]
    fn explicit_column_wins_over_comment() {
        assert_eq!(
            resolve_gps_status(Some("GPS_ERROR:NONE"), Some("GPS_ERROR:ERROR")),
            Some(GpsStatus::Valid)
        );
        assert_eq!(
            resolve_gps_status(Some("ERROR"), None),
            Some(GpsStatus::Invalid)
        );
        // placeholder strings count as absent
        assert_eq!(
            resolve_gps_status(Some("undefined"), Some("GPS_ERROR:ERROR")),
            Some(GpsStatus::Invalid)
        );
        assert_eq!(resolve_gps_status(Some("null"), None), None);
        assert_eq!(resolve_gps_status(None, None), None);
    }
}
