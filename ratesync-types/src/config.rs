//! Configuration types shared across the synchronizer and its statement builders.

use core::fmt;
use std::io::Read;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SyncError;

/// Reporting cadence of a source; sizes the advance applied to a persisted extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    /// One observation per calendar day.
    #[default]
    Daily,
    /// One observation per calendar month.
    Monthly,
    /// One observation per calendar quarter.
    Quarterly,
    /// One observation per calendar year.
    Annual,
}

impl Periodicity {
    /// Parse a periodicity label as returned by reporting views.
    ///
    /// Accepts full names and the usual single-letter codes, case-insensitively.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "d" | "day" | "daily" => Some(Self::Daily),
            "m" | "month" | "monthly" => Some(Self::Monthly),
            "q" | "quarter" | "quarterly" => Some(Self::Quarterly),
            "a" | "y" | "annual" | "annually" | "year" | "yearly" => Some(Self::Annual),
            _ => None,
        }
    }

    /// Number of calendar months in one period, `None` for daily cadence.
    #[must_use]
    pub const fn months(self) -> Option<u32> {
        match self {
            Self::Daily => None,
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Annual => Some(12),
        }
    }
}

/// Physical layout of the target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One row per date, one column per series.
    #[default]
    Wide,
    /// One row per (date, series) observation.
    Vertical,
}

/// Key column(s) of the target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyColumns {
    /// A single date-like key column.
    Single(String),
    /// A composite key; the first column is the date-like key.
    Composite(Vec<String>),
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

impl KeyColumns {
    /// All key column names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Composite(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// The date-like key column (the first one for composite keys).
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.names().into_iter().next().filter(|n| !n.trim().is_empty())
    }

    /// True if no usable key column is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names().iter().all(|n| n.trim().is_empty())
    }

    /// True if `column` is one of the key columns.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.names().contains(&column)
    }
}

/// Declared value columns.
///
/// A list names series whose table column has the same name. A mapping renames
/// fetched series (keys) into table columns (values); an empty value keeps the
/// source name. Declaration order is preserved in both forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Items {
    /// Ordered list of column names.
    List(Vec<String>),
    /// Ordered `source -> target` pairs.
    Map(Vec<(String, String)>),
}

impl Default for Items {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Items {
    /// Resolve into ordered `(source, target)` pairs.
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        match self {
            Self::List(names) => names.iter().map(|n| (n.clone(), n.clone())).collect(),
            Self::Map(pairs) => pairs
                .iter()
                .map(|(source, target)| {
                    let target = if target.is_empty() { source } else { target };
                    (source.clone(), target.clone())
                })
                .collect(),
        }
    }

    /// Number of declared columns.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::List(names) => names.len(),
            Self::Map(pairs) => pairs.len(),
        }
    }

    /// True if no columns are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Items {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::List(names) => names.serialize(serializer),
            Self::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (source, target) in pairs {
                    map.serialize_entry(source, target)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Items {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ItemsVisitor;

        impl<'de> Visitor<'de> for ItemsVisitor {
            type Value = Items;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of column names or a map of source to target names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Items, A::Error> {
                let mut names = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(name) = seq.next_element::<String>()? {
                    names.push(name);
                }
                Ok(Items::List(names))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Items, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((source, target)) = map.next_entry::<String, String>()? {
                    pairs.push((source, target));
                }
                Ok(Items::Map(pairs))
            }
        }

        deserializer.deserialize_any(ItemsVisitor)
    }
}

/// Which column(s) of a view result hold the persisted extent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Locator {
    /// A single named column.
    Column(String),
    /// Several candidate columns; the earliest non-null value wins.
    Candidates(Vec<String>),
}

/// Query describing the table's current persisted extent and snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurrentView {
    /// `SELECT * FROM <name>;`
    Table {
        /// Table or view name.
        name: String,
        /// Column(s) holding the extent; defaults to the key column.
        #[serde(default)]
        location: Option<Locator>,
    },
    /// A literal SELECT statement.
    Query {
        /// Full SELECT text.
        query: String,
        /// Column(s) holding the extent; defaults to the key column.
        #[serde(default)]
        location: Option<Locator>,
    },
    /// A stored procedure returning a result set whose last field is the reporting periodicity.
    Procedure {
        /// Procedure name.
        name: String,
        /// Literal procedure arguments.
        #[serde(default)]
        args: Vec<String>,
        /// Column(s) holding the extent; defaults to the key column.
        #[serde(default)]
        location: Option<Locator>,
    },
}

impl CurrentView {
    /// Column(s) holding the extent, if configured.
    #[must_use]
    pub const fn location(&self) -> Option<&Locator> {
        match self {
            Self::Table { location, .. }
            | Self::Query { location, .. }
            | Self::Procedure { location, .. } => location.as_ref(),
        }
    }

    /// True for stored-procedure backed views.
    #[must_use]
    pub const fn is_procedure(&self) -> bool {
        matches!(self, Self::Procedure { .. })
    }
}

/// Sparse-row and placeholder-row exclusion policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionPolicy {
    /// Rows whose absent fraction exceeds this value are excluded.
    pub threshold: f64,
    /// Rows whose absolute mean and variance both fall below this value are
    /// treated as placeholder data and excluded. `None` disables the check.
    pub flat_epsilon: Option<f64>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.295,
            flat_epsilon: Some(0.0001),
        }
    }
}

impl ExclusionPolicy {
    /// Validate the configured bounds.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if `threshold` is outside `[0, 1]` or
    /// `flat_epsilon` is negative or not finite.
    pub fn validate(&self) -> Result<(), SyncError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SyncError::config(format!(
                "exclusion threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if let Some(eps) = self.flat_epsilon
            && !(eps.is_finite() && eps >= 0.0)
        {
            return Err(SyncError::config(format!(
                "flat epsilon must be a non-negative finite number, got {eps}"
            )));
        }
        Ok(())
    }
}

/// Column names used when vertical rows are written as keyed records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalMapping {
    /// Column receiving the observation date.
    pub date: String,
    /// Column receiving the series identifier.
    pub id: String,
    /// Column receiving the observed value.
    pub value: String,
}

impl Default for VerticalMapping {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            id: "series_id".to_string(),
            value: "value".to_string(),
        }
    }
}

/// Configuration of one synchronization target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Target table.
    pub table: String,
    /// Key column(s) of the target table.
    pub index_name: KeyColumns,
    /// Declared value columns.
    pub items: Items,
    /// Wide or vertical target layout.
    pub layout: Layout,
    /// Keyed-record column mapping for vertical tables with more than four columns.
    pub vertical: VerticalMapping,
    /// Source tag written alongside each observation (e.g. "FRED").
    pub source: Option<String>,
    /// Column receiving the source tag.
    pub source_column: String,
    /// Query describing the current persisted extent.
    pub current_view: Option<CurrentView>,
    /// Requested start date (`YYYY-MM-DD`); a future date is a placeholder for "resume".
    pub start_date: Option<String>,
    /// Optional end date (`YYYY-MM-DD`).
    pub end_date: Option<String>,
    /// Advance the start date past the persisted extent before fetching.
    pub append: bool,
    /// Record statements instead of executing writes.
    pub dry_run: bool,
    /// Sparse-row and placeholder-row exclusion policy.
    pub exclusion: ExclusionPolicy,
    /// Maximum rows per vertical parameter batch.
    pub batch_size: usize,
    /// Retry a failed bulk wide INSERT one row at a time.
    pub row_fallback: bool,
    /// UPDATE template override for record updates.
    pub update_template: Option<String>,
    /// Timezone used to decide what "today" is.
    pub timezone: chrono_tz::Tz,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            table: String::new(),
            index_name: KeyColumns::default(),
            items: Items::default(),
            layout: Layout::Wide,
            vertical: VerticalMapping::default(),
            source: None,
            source_column: "source".to_string(),
            current_view: None,
            start_date: None,
            end_date: None,
            append: false,
            dry_run: false,
            exclusion: ExclusionPolicy::default(),
            batch_size: 1000,
            row_fallback: true,
            update_template: None,
            timezone: chrono_tz::UTC,
        }
    }
}

impl SyncConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if the JSON is malformed or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, SyncError> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| SyncError::config(format!("invalid configuration: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON reader (e.g. an options file).
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if the JSON is malformed or fails validation.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, SyncError> {
        let cfg: Self = serde_json::from_reader(reader)
            .map_err(|e| SyncError::config(format!("invalid configuration: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the structural requirements shared by every operation.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` when the table or key metadata is
    /// missing, no value columns are declared, or the exclusion policy or
    /// batch size is invalid.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.table.trim().is_empty() {
            return Err(SyncError::config("table must be specified"));
        }
        if self.index_name.is_empty() {
            return Err(SyncError::config("index_name must be specified"));
        }
        if self.items.is_empty() {
            return Err(SyncError::config("items must declare at least one column"));
        }
        if self.batch_size == 0 {
            return Err(SyncError::config("batch_size must be greater than zero"));
        }
        self.exclusion.validate()
    }
}
