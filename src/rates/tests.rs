#![allow(clippy::unwrap_used)]

use super::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
	<gesmes:subject>Reference rates</gesmes:subject>
	<Cube>
		<Cube time='2024-06-14'>
			<Cube currency='USD' rate='1.0713'/>
			<Cube currency='JPY' rate='168.67'/>
			<Cube currency='GBP' rate='0.84355'/>
			<Cube currency='CHF' rate='0.9561'/>
		</Cube>
	</Cube>
</gesmes:Envelope>"#;

#[test]
fn test_parse_ecb_feed() {
    let rates = parse_ecb_feed(FEED).unwrap();
    assert_eq!(rates.foreign_count(), 4);
    assert_eq!(rates.rate("USD"), Some(dec!(1.0713)));
    assert_eq!(rates.rate("JPY"), Some(dec!(168.67)));
    assert_eq!(rates.rate("GBP"), Some(dec!(0.84355)));
    assert_eq!(rates.rate("EUR"), Some(Decimal::ONE));
}

#[test]
fn test_parse_ecb_feed_publication_date() {
    let rates = parse_ecb_feed(FEED).unwrap();
    assert_eq!(
        rates.published(),
        Some(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap())
    );
}

#[test]
fn test_parse_feed_with_double_quotes() {
    let xml = r#"<Cube time="2024-01-02"><Cube currency="SEK" rate="11.2"/></Cube>"#;
    let rates = parse_ecb_feed(xml).unwrap();
    assert_eq!(rates.rate("SEK"), Some(dec!(11.2)));
}

#[test]
fn test_parse_feed_without_date() {
    let xml = "<Cube currency='USD' rate='1.1'/>";
    let rates = parse_ecb_feed(xml).unwrap();
    assert!(rates.published().is_none());
}

#[test]
fn test_parse_empty_feed_rejected() {
    let err = parse_ecb_feed("<html>Service unavailable</html>").unwrap_err();
    assert!(err.to_string().contains("No exchange rates"));
}

#[test]
fn test_parse_feed_ignores_zero_rate() {
    let xml = "<Cube currency='USD' rate='1.1'/><Cube currency='XXX' rate='0'/>";
    let rates = parse_ecb_feed(xml).unwrap();
    assert!(!rates.contains("XXX"));
    assert_eq!(rates.foreign_count(), 1);
}

#[test]
fn test_parse_feed_skips_rate_below_minimum() {
    let xml = "<Cube currency='USD' rate='1.1'/><Cube currency='JPY' rate='0.0000000000000000000001'/>";
    let rates = parse_ecb_feed(xml).unwrap();
    assert!(!rates.contains("JPY"));
    assert_eq!(rates.rate("USD"), Some(dec!(1.1)));
}

#[test]
fn test_import_ecb_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eurofxref-daily.xml");
    std::fs::write(&path, FEED).unwrap();
    let rates = import_ecb_file(path.to_str().unwrap()).unwrap();
    assert_eq!(rates.rate("CHF"), Some(dec!(0.9561)));
}

#[test]
fn test_import_missing_file() {
    assert!(import_ecb_file("/nonexistent/rates.xml").is_err());
}

#[test]
fn test_database_provides_stored_rates() {
    let mut db = Database::open_in_memory().unwrap();
    db.save_rates(&parse_ecb_feed(FEED).unwrap()).unwrap();
    let provider: &dyn RateProvider = &db;
    let rates = provider.current_rates().unwrap();
    assert_eq!(rates.rate("USD"), Some(dec!(1.0713)));
}
