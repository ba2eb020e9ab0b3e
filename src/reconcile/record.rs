//! # Bibliographic Records
//!
//! Common record shape shared by every source adapter and every stage of the
//! reconcile pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::normalize::normalize;

/// Column names of the six recognized raw fields, in output order
pub const RAW_COLUMNS: [&str; 6] = [
    "Title",
    "Publication Year",
    "Venue",
    "Venue Type",
    "Authors",
    "Link",
];

/// Provenance column appended by the aggregator
pub const SOURCE_COLUMN: &str = "Source";

/// Derived comparison key column
pub const PROCESSED_TITLE_COLUMN: &str = "ProcessedTitle";

/// Literature-search providers, in the fixed union order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceName {
    Scopus,
    Ieee,
    EngineeringVillage,
    ScienceDirect,
    Hal,
    Acm,
}

impl SourceName {
    /// Every source in fetch order. Representative selection depends on it.
    pub const ALL: [Self; 6] = [
        Self::Scopus,
        Self::Ieee,
        Self::EngineeringVillage,
        Self::ScienceDirect,
        Self::Hal,
        Self::Acm,
    ];

    /// Name written into the `Source` column
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Scopus => "Scopus",
            Self::Ieee => "IEEE",
            Self::EngineeringVillage => "Engineering Village",
            Self::ScienceDirect => "Science Direct",
            Self::Hal => "Hal Open Science",
            Self::Acm => "ACM Digital Library",
        }
    }

    /// Configuration key (`engineering_village`, `acm`)
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Scopus => "scopus",
            Self::Ieee => "ieee",
            Self::EngineeringVillage => "engineering_village",
            Self::ScienceDirect => "science_direct",
            Self::Hal => "hal",
            Self::Acm => "acm",
        }
    }

    /// File stem of the per-source result file (`engineering_village`)
    #[must_use]
    pub fn file_stem(self) -> String {
        self.display_name().replace(' ', "_").to_lowercase()
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SourceName {
    type Err = crate::Error;

    /// Accepts the display name, the file stem, or the snake_case key,
    /// ignoring case.
    fn from_str(s: &str) -> crate::Result<Self> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|source| source.key() == wanted || source.file_stem() == wanted)
            .ok_or_else(|| crate::Error::InvalidInput {
                field: "source".to_string(),
                reason: format!("unknown source '{s}'"),
            })
    }
}

/// Publication year as delivered by a provider: some send integers, some
/// send strings cut out of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicationYear {
    Integer(i64),
    Text(String),
}

impl PublicationYear {
    /// Map a JSON value into a year; anything other than a number or a
    /// string counts as absent. Integral floats (`2019.0`) become integers.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(integral))
                .map(Self::Integer)
                .or_else(|| Some(Self::Text(n.to_string()))),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Integer coercion; surrounding whitespace and an integral decimal form
    /// (`"2019.0"`) are tolerated, fractions and any other text are not.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(year) => Some(*year),
            Self::Text(text) => {
                let text = text.trim();
                text.parse()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(integral))
            }
        }
    }
}

fn integral(value: f64) -> Option<i64> {
    #[allow(clippy::cast_possible_truncation)]
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15).then(|| value as i64)
}

impl fmt::Display for PublicationYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(year) => write!(f, "{year}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for PublicationYear {
    fn from(year: i64) -> Self {
        Self::Integer(year)
    }
}

impl From<&str> for PublicationYear {
    fn from(year: &str) -> Self {
        Self::Text(year.to_string())
    }
}

/// Record as produced by a source adapter, before tagging and normalization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Publication Year", default)]
    pub publication_year: Option<PublicationYear>,
    #[serde(rename = "Venue", default)]
    pub venue: Option<String>,
    #[serde(rename = "Venue Type", default)]
    pub venue_type: Option<String>,
    /// Author names joined by `", "`
    #[serde(rename = "Authors", default)]
    pub authors: Option<String>,
    #[serde(rename = "Link", default)]
    pub link: Option<String>,
    /// Source-specific columns, passed through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl RawRecord {
    /// Create a raw record with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Set the publication year
    #[must_use]
    pub fn with_year(mut self, year: impl Into<PublicationYear>) -> Self {
        self.publication_year = Some(year.into());
        self
    }
}

/// Record tagged with its provenance and comparison key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Publication Year")]
    pub publication_year: Option<PublicationYear>,
    #[serde(rename = "Venue")]
    pub venue: Option<String>,
    #[serde(rename = "Venue Type")]
    pub venue_type: Option<String>,
    #[serde(rename = "Authors")]
    pub authors: Option<String>,
    #[serde(rename = "Link")]
    pub link: Option<String>,
    /// Originating provider, or the merged provenance of a duplicate group
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "ProcessedTitle")]
    pub processed_title: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Record {
    /// Tag a raw record with its source and derive the processed title
    pub fn from_raw(raw: RawRecord, source: impl Into<String>) -> Self {
        let processed_title = normalize(raw.title.as_deref());
        Self {
            title: raw.title,
            publication_year: raw.publication_year,
            venue: raw.venue,
            venue_type: raw.venue_type,
            authors: raw.authors,
            link: raw.link,
            source: source.into(),
            processed_title,
            extra: raw.extra,
        }
    }

    /// Copy of this record carrying a different provenance string
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Drop provenance and key, keeping the provider fields
    #[must_use]
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            title: self.title.clone(),
            publication_year: self.publication_year.clone(),
            venue: self.venue.clone(),
            venue_type: self.venue_type.clone(),
            authors: self.authors.clone(),
            link: self.link.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Values of the six raw columns in [`RAW_COLUMNS`] order
    #[must_use]
    pub fn raw_cells(&self) -> [Option<String>; 6] {
        [
            self.title.clone(),
            self.publication_year.as_ref().map(ToString::to_string),
            self.venue.clone(),
            self.venue_type.clone(),
            self.authors.clone(),
            self.link.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_names_and_stems() {
        assert_eq!(SourceName::Ieee.to_string(), "IEEE");
        assert_eq!(SourceName::Hal.to_string(), "Hal Open Science");
        assert_eq!(
            SourceName::EngineeringVillage.file_stem(),
            "engineering_village"
        );
        assert_eq!(SourceName::Acm.file_stem(), "acm_digital_library");
    }

    #[test]
    fn test_source_name_parsing() {
        assert_eq!("Scopus".parse::<SourceName>().unwrap(), SourceName::Scopus);
        assert_eq!(
            "science direct".parse::<SourceName>().unwrap(),
            SourceName::ScienceDirect
        );
        assert_eq!(
            "engineering_village".parse::<SourceName>().unwrap(),
            SourceName::EngineeringVillage
        );
        assert_eq!("acm".parse::<SourceName>().unwrap(), SourceName::Acm);
        assert!("web of science".parse::<SourceName>().is_err());
    }

    #[test]
    fn test_publication_year_coercion() {
        assert_eq!(PublicationYear::Integer(2019).as_integer(), Some(2019));
        assert_eq!(PublicationYear::from(" 2020 ").as_integer(), Some(2020));
        assert_eq!(PublicationYear::from("").as_integer(), None);
        assert_eq!(PublicationYear::from("2019-05").as_integer(), None);
        assert_eq!(PublicationYear::from("2019.0").as_integer(), Some(2019));
        assert_eq!(PublicationYear::from("2019.5").as_integer(), None);
        assert_eq!(PublicationYear::from("NaN").as_integer(), None);
    }

    #[test]
    fn test_publication_year_from_json() {
        assert_eq!(
            PublicationYear::from_json(&serde_json::json!(2018)),
            Some(PublicationYear::Integer(2018))
        );
        assert_eq!(
            PublicationYear::from_json(&serde_json::json!("2018")),
            Some(PublicationYear::Text("2018".to_string()))
        );
        assert_eq!(
            PublicationYear::from_json(&serde_json::json!(2019.0)),
            Some(PublicationYear::Integer(2019))
        );
        assert_eq!(
            PublicationYear::from_json(&serde_json::json!(2019.5)),
            Some(PublicationYear::Text("2019.5".to_string()))
        );
        assert_eq!(PublicationYear::from_json(&serde_json::Value::Null), None);
    }

    #[test]
    fn test_raw_record_accepts_adapter_shape() {
        let raw: RawRecord = serde_json::from_value(serde_json::json!({
            "Title": "Docs Agility!",
            "Publication Year": 2019,
            "Venue": null,
            "Authors": "A. Author, B. Author",
            "DOI": "10.1000/example"
        }))
        .unwrap();

        assert_eq!(raw.title.as_deref(), Some("Docs Agility!"));
        assert_eq!(raw.publication_year, Some(PublicationYear::Integer(2019)));
        assert_eq!(raw.venue, None);
        assert_eq!(raw.link, None);
        assert_eq!(raw.extra.get("DOI").map(String::as_str), Some("10.1000/example"));
    }

    #[test]
    fn test_from_raw_tags_and_normalizes() {
        let record = Record::from_raw(RawRecord::titled("Docs Agility!"), "Scopus");
        assert_eq!(record.source, "Scopus");
        assert_eq!(record.processed_title, "docsagility");
        assert_eq!(record.to_raw(), RawRecord::titled("Docs Agility!"));
    }
}
