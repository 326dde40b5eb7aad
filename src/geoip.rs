//! Geolocation lookups on top of [`Reader`]
//!
//! [`GeoIp`] resolves the conventional geographic columns of an IPDB city
//! database (`country_name`, `region_name`, `city_name`, `district_name`)
//! against the field list of the dataset that answered each lookup, so a
//! reload that reorders columns takes effect atomically. Lookups never fail:
//! a bad address or missing record yields an empty result.

use crate::error::{IpdbError, Result};
use crate::reader::Reader;
use log::debug;
use serde::Serialize;
use std::path::Path;

/// Language used when none is configured
pub const DEFAULT_LANGUAGE: &str = "CN";

/// Geographic location of an address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeoResult {
    /// Country name
    pub country: String,
    /// Region / province name
    pub region: String,
    /// City name
    pub city: String,
    /// District name
    pub district: String,
}

impl GeoResult {
    /// Whether no column was filled in.
    pub fn is_empty(&self) -> bool {
        self.country.is_empty()
            && self.region.is_empty()
            && self.city.is_empty()
            && self.district.is_empty()
    }
}

/// Positions of the geographic columns within `fields`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FieldIndices {
    country: Option<usize>,
    region: Option<usize>,
    city: Option<usize>,
    district: Option<usize>,
}

impl FieldIndices {
    fn from_fields(fields: &[String]) -> Self {
        let mut indices = FieldIndices::default();
        for (i, field) in fields.iter().enumerate() {
            match field.as_str() {
                "country_name" => indices.country = Some(i),
                "region_name" => indices.region = Some(i),
                "city_name" => indices.city = Some(i),
                "district_name" => indices.district = Some(i),
                _ => {}
            }
        }
        indices
    }
}

fn column(values: &[String], index: Option<usize>) -> String {
    index
        .and_then(|i| values.get(i))
        .cloned()
        .unwrap_or_default()
}

/// IP geolocation backed by an IPDB file
#[derive(Debug)]
pub struct GeoIp {
    reader: Reader,
    language: String,
}

impl GeoIp {
    /// Open `path` and look up names in [`DEFAULT_LANGUAGE`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_language(path, DEFAULT_LANGUAGE)
    }

    /// Open `path` and look up names in `language`.
    pub fn open_with_language<P: AsRef<Path>>(path: P, language: &str) -> Result<Self> {
        Self::from_reader(Reader::open(path)?, language)
    }

    /// Wrap an already opened reader.
    ///
    /// # Errors
    ///
    /// Returns [`IpdbError::Closed`] if `reader` has been closed.
    pub fn from_reader(reader: Reader, language: &str) -> Result<Self> {
        if reader.is_closed() {
            return Err(IpdbError::Closed);
        }
        Ok(GeoIp {
            reader,
            language: language.to_string(),
        })
    }

    /// The underlying reader
    pub fn reader(&self) -> &Reader {
        &self.reader
    }

    /// Configured lookup language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Locate `ip`. Any failure yields an empty [`GeoResult`].
    pub fn lookup(&self, ip: &str) -> GeoResult {
        let found = self.reader.find_with(ip, &self.language, |meta, values| {
            let indices = FieldIndices::from_fields(&meta.fields);
            GeoResult {
                country: column(&values, indices.country),
                region: column(&values, indices.region),
                city: column(&values, indices.city),
                district: column(&values, indices.district),
            }
        });
        match found {
            Ok(result) => result,
            Err(e) => {
                debug!("geoip lookup failed for {}: {}", ip, e);
                GeoResult::default()
            }
        }
    }

    /// Reload the database from `path`.
    pub fn reload<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.reader.reload(path)
    }

    /// Close the underlying reader; later lookups return empty results.
    pub fn close(&self) -> Result<()> {
        self.reader.close()
    }
}
