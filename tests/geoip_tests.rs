//! GeoIP facade: column resolution, empty results and reload

mod common;

use common::{city_db, write_temp, IpdbWriter};
use ipdb::{GeoIp, GeoResult, IpdbError, Reader};

#[test]
fn test_lookup_resolves_named_columns() {
    let file = city_db().write_temp();
    let geo = GeoIp::open(file.path()).unwrap();

    assert_eq!(geo.language(), "CN");
    let result = geo.lookup("114.114.114.114");
    assert_eq!(
        result,
        GeoResult {
            country: "中国".to_string(),
            region: "江苏".to_string(),
            city: "南京".to_string(),
            district: String::new(),
        }
    );
}

#[test]
fn test_lookup_with_language() {
    let file = city_db().write_temp();
    let geo = GeoIp::open_with_language(file.path(), "EN").unwrap();

    let result = geo.lookup("2001:4860:4860::8888");
    assert_eq!(result.country, "United States");
    assert_eq!(result.city, "Mountain View");
}

#[test]
fn test_lookup_failures_are_empty() {
    let geo = GeoIp::from_reader(Reader::from_bytes(city_db().build()).unwrap(), "CN").unwrap();

    assert!(geo.lookup("not-an-ip").is_empty());
    assert!(geo.lookup("192.168.1.1").is_empty());

    let unknown_language =
        GeoIp::from_reader(Reader::from_bytes(city_db().build()).unwrap(), "FR").unwrap();
    assert!(unknown_language.lookup("114.114.114.114").is_empty());
}

#[test]
fn test_lookup_after_close() {
    let file = city_db().write_temp();
    let geo = GeoIp::open(file.path()).unwrap();
    geo.close().unwrap();

    assert_eq!(geo.lookup("114.114.114.114"), GeoResult::default());
    assert!(geo.reader().is_closed());
}

#[test]
fn test_from_closed_reader() {
    let reader = Reader::from_bytes(city_db().build()).unwrap();
    reader.close().unwrap();

    let result = GeoIp::from_reader(reader, "CN");
    assert!(matches!(result, Err(IpdbError::Closed)));
}

#[test]
fn test_open_invalid_path() {
    assert!(GeoIp::open("/nonexistent/path.ipdb").is_err());
}

#[test]
fn test_reload_picks_up_new_columns() {
    let file = city_db().write_temp();
    let geo = GeoIp::open_with_language(file.path(), "EN").unwrap();

    // Same data, columns in a different order plus a district column
    let mut writer = IpdbWriter::new(
        &["city_name", "district_name", "country_name"],
        &["EN"],
    );
    writer.insert("114.114.114.0/24", &["Nanjing", "Xuanwu", "China"]);
    let reordered = writer.write_temp();

    geo.reload(reordered.path()).unwrap();
    let result = geo.lookup("114.114.114.114");
    assert_eq!(result.country, "China");
    assert_eq!(result.city, "Nanjing");
    assert_eq!(result.district, "Xuanwu");
    assert_eq!(result.region, "");
}

#[test]
fn test_failed_reload_keeps_columns() {
    let file = city_db().write_temp();
    let geo = GeoIp::open(file.path()).unwrap();

    let broken = write_temp(&[0xff, 0xff, 0xff, 0xff]);
    assert!(geo.reload(broken.path()).is_err());
    assert_eq!(geo.lookup("114.114.114.114").city, "南京");
}
