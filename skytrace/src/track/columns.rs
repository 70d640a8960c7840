//! Track file header columns.
//!
//! The first line of a track file names its columns. Old files predate the
//! FlySight-compatible naming, so a small fixed set of legacy aliases is
//! accepted (`timeMillis`/`millis`, `latitude`/`lat`, `longitude`/`lon`,
//! `altitude_gps`/`hMSL`).

use std::collections::HashMap;

use chrono::DateTime;

/// Column name → index map for one track file.
#[derive(Debug)]
pub struct TrackColumns {
    index: HashMap<String, usize>,
}

impl TrackColumns {
    /// Parse a comma-separated header line and register the legacy aliases.
    pub fn from_header(line: &str) -> Self {
        let mut index = HashMap::new();
        for (i, name) in line.split(',').enumerate() {
            index.insert(name.trim().to_string(), i);
        }
        let mut columns = Self { index };
        columns.alias("timeMillis", "millis");
        columns.alias("latitude", "lat");
        columns.alias("longitude", "lon");
        columns.alias("altitude_gps", "hMSL");
        columns
    }

    /// Make two column names interchangeable: whichever one the file
    /// declares also answers for the other.
    fn alias(&mut self, a: &str, b: &str) {
        match (self.index.get(a).copied(), self.index.get(b).copied()) {
            (Some(i), None) => {
                self.index.insert(b.to_string(), i);
            }
            (None, Some(i)) => {
                self.index.insert(a.to_string(), i);
            }
            _ => {}
        }
    }

    /// Index of a column, if declared.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Raw field value of `name` in `row`, if the column exists and the
    /// row is long enough.
    pub fn get_str<'a>(&self, row: &[&'a str], name: &str) -> Option<&'a str> {
        row.get(self.get(name)?).copied()
    }

    /// Parse a float field. `None` on missing column or unparsable value.
    pub fn get_f64(&self, row: &[&str], name: &str) -> Option<f64> {
        self.get_str(row, name)?.trim().parse().ok()
    }

    /// Parse an integer field.
    pub fn get_u64(&self, row: &[&str], name: &str) -> Option<u64> {
        self.get_str(row, name)?.trim().parse().ok()
    }

    /// Parse an ISO-8601 date field into unix milliseconds.
    ///
    /// FlySight writes e.g. `2018-06-02T14:35:10.20Z`.
    pub fn get_millis(&self, row: &[&str], name: &str) -> Option<u64> {
        let text = self.get_str(row, name)?.trim();
        let parsed = DateTime::parse_from_rfc3339(text).ok()?;
        u64::try_from(parsed.timestamp_millis()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_lookup() {
        let columns = TrackColumns::from_header("millis,lat,lon,hMSL");
        assert_eq!(columns.get("millis"), Some(0));
        assert_eq!(columns.get("hMSL"), Some(3));
        assert_eq!(columns.get("pressure"), None);
    }

    #[test]
    fn test_legacy_aliases() {
        let columns = TrackColumns::from_header("timeMillis,latitude,longitude,altitude_gps");
        assert_eq!(columns.get("millis"), Some(0));
        assert_eq!(columns.get("lat"), Some(1));
        assert_eq!(columns.get("lon"), Some(2));
        assert_eq!(columns.get("hMSL"), Some(3));
    }

    #[test]
    fn test_aliases_work_both_ways() {
        let columns = TrackColumns::from_header("millis,lat,lon,hMSL");
        assert_eq!(columns.get("timeMillis"), Some(0));
        assert_eq!(columns.get("altitude_gps"), Some(3));
    }

    #[test]
    fn test_field_parsing() {
        let columns = TrackColumns::from_header("millis,lat,junk");
        let row = ["1500", "46.97", "zzz"];
        assert_eq!(columns.get_u64(&row, "millis"), Some(1500));
        assert_eq!(columns.get_f64(&row, "lat"), Some(46.97));
        assert_eq!(columns.get_f64(&row, "junk"), None);
        // Short row
        assert_eq!(columns.get_f64(&["1500"], "lat"), None);
    }

    #[test]
    fn test_iso_date_parsing() {
        let columns = TrackColumns::from_header("time");
        let row = ["2018-06-02T14:35:10.20Z"];
        let millis = columns.get_millis(&row, "time").unwrap();
        assert_eq!(millis % 1000, 200);
        assert!(columns.get_millis(&["not a date"], "time").is_none());
    }
}
