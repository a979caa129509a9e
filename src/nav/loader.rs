//! Load NAV history and cash flows from CSV files or the fund API's JSON

use super::{NavPoint, NavSeries};
use crate::error::{CalcError, Result};
use crate::returns::CashFlow;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Date formats accepted in input files: ISO and the API's day-first form
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| CalcError::Parse(format!("unrecognised date: {:?}", raw)))
}

/// Raw CSV row: `date,nav`
#[derive(Debug, Deserialize)]
struct NavCsvRow {
    date: String,
    nav: f64,
}

/// Raw CSV row: `date,amount`
#[derive(Debug, Deserialize)]
struct CashFlowCsvRow {
    date: String,
    amount: f64,
}

/// NAV response body from the fund API: `{ "meta": {...}, "data": [{ "date", "nav" }] }`
#[derive(Debug, Deserialize)]
struct NavApiResponse {
    #[serde(default)]
    meta: Option<serde_json::Value>,
    data: Vec<NavApiPoint>,
}

#[derive(Debug, Deserialize)]
struct NavApiPoint {
    date: String,
    #[serde(deserialize_with = "number_or_string")]
    nav: f64,
}

/// The API sends NAV as either a JSON number or a quoted decimal
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl NavSeries {
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut points = Vec::new();

        for result in reader.deserialize() {
            let row: NavCsvRow = result?;
            points.push(NavPoint {
                date: parse_date(&row.date)?,
                nav: row.nav,
            });
        }

        let series = NavSeries::new(points);
        if series.is_empty() {
            return Err(CalcError::EmptySeries);
        }
        log::debug!("loaded {} NAV points from CSV", series.len());
        Ok(series)
    }

    /// Parse the fund API's NAV history response
    pub fn from_api_json(body: &str) -> Result<Self> {
        let response: NavApiResponse = serde_json::from_str(body)?;
        if let Some(name) = response
            .meta
            .as_ref()
            .and_then(|m| m.get("scheme_name"))
            .and_then(|v| v.as_str())
        {
            log::debug!("parsing NAV history for {}", name);
        }

        let points = response
            .data
            .into_iter()
            .map(|p| Ok(NavPoint { date: parse_date(&p.date)?, nav: p.nav }))
            .collect::<Result<Vec<_>>>()?;

        let series = NavSeries::new(points);
        if series.is_empty() {
            return Err(CalcError::EmptySeries);
        }
        Ok(series)
    }

    /// Load from a path, choosing JSON or CSV by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_api_json(&std::fs::read_to_string(path)?)
        } else {
            Self::from_csv_path(path)
        }
    }
}

/// Load dated cash flows from a `date,amount` CSV
pub fn load_cash_flows<R: Read>(reader: R) -> Result<Vec<CashFlow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut flows = Vec::new();

    for result in reader.deserialize() {
        let row: CashFlowCsvRow = result?;
        flows.push(CashFlow::new(parse_date(&row.date)?, row.amount));
    }

    Ok(flows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date("2024-03-05").unwrap(), expected);
        assert_eq!(parse_date("05-03-2024").unwrap(), expected);
        assert_eq!(parse_date(" 05/03/2024 ").unwrap(), expected);
        assert!(parse_date("March 5").is_err());
    }

    #[test]
    fn test_nav_csv() {
        let data = "date,nav\n2024-01-02,10.5\n2024-01-01,10.0\n";
        let series = NavSeries::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().nav, 10.0);
    }

    #[test]
    fn test_empty_csv_is_an_error() {
        let data = "date,nav\n";
        assert!(matches!(
            NavSeries::from_csv_reader(data.as_bytes()),
            Err(CalcError::EmptySeries)
        ));
    }

    #[test]
    fn test_api_json_mixed_nav_types() {
        let body = r#"{
            "meta": { "scheme_name": "Example Flexi Cap Fund" },
            "data": [
                { "date": "02-01-2024", "nav": "101.25" },
                { "date": "01-01-2024", "nav": 100.0 }
            ]
        }"#;

        let series = NavSeries::from_api_json(body).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().unwrap().nav, 101.25);
    }

    #[test]
    fn test_api_json_bad_nav() {
        let body = r#"{ "data": [{ "date": "01-01-2024", "nav": "n/a" }] }"#;
        assert!(matches!(NavSeries::from_api_json(body), Err(CalcError::Json(_))));
    }

    #[test]
    fn test_cash_flow_csv() {
        let data = "date,amount\n2023-01-01,-1000\n2024-01-01,1100\n";
        let flows = load_cash_flows(data.as_bytes()).unwrap();
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].amount, -1000.0);
    }
}
