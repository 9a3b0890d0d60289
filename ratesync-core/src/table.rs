//! Validated description of a target table.

use ratesync_types::{ExclusionPolicy, KeyColumns, Layout, SyncConfig, VerticalMapping};

use crate::SyncError;
use crate::sql::naming::validate_identifier;

/// One declared wide column: a fetched series and the table column it lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Series name in the fetched batch.
    pub source: String,
    /// Column name in the target table.
    pub target: String,
}

impl ColumnMapping {
    /// Mapping from `source` to `target`.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Non-key columns of a vertical table and how keyed records fill them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerticalColumns {
    /// Non-key insert columns in order.
    pub columns: Vec<String>,
    /// Names of the date, series and value columns for keyed records.
    pub mapping: VerticalMapping,
}

/// Value columns of a target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    /// One column per series.
    Wide(Vec<ColumnMapping>),
    /// One row per observation.
    Vertical(VerticalColumns),
}

/// Source tag written into a dedicated column next to every observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTag {
    /// Column receiving the tag.
    pub column: String,
    /// Tag value, e.g. "FRED".
    pub tag: String,
}

/// A validated target table: name, key, value columns and exclusion policy.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    table: String,
    key: KeyColumns,
    columns: ColumnSpec,
    source: Option<SourceTag>,
    exclusion: ExclusionPolicy,
}

impl TableSpec {
    /// Wide table spec.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` when the table or key is missing or
    /// invalid, no mapping is declared, or two mappings share a target.
    pub fn wide(
        table: impl Into<String>,
        key: KeyColumns,
        mappings: Vec<ColumnMapping>,
    ) -> Result<Self, SyncError> {
        let table = table.into();
        validate_table(&table, &key)?;
        if mappings.is_empty() {
            return Err(SyncError::config(format!(
                "'{table}' declares no value columns"
            )));
        }
        for (i, m) in mappings.iter().enumerate() {
            validate_identifier(&m.target)?;
            if mappings[..i].iter().any(|other| other.target == m.target) {
                return Err(SyncError::config(format!(
                    "column '{}' of '{table}' is declared twice",
                    m.target
                )));
            }
        }
        Ok(Self {
            table,
            key,
            columns: ColumnSpec::Wide(mappings),
            source: None,
            exclusion: ExclusionPolicy::default(),
        })
    }

    /// Vertical table spec.
    ///
    /// Key columns listed in `columns` are dropped from the non-key list.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` when the table or key is missing or
    /// invalid, or fewer than two non-key columns (series and value) remain.
    pub fn vertical<I, S>(
        table: impl Into<String>,
        key: KeyColumns,
        columns: I,
        mapping: VerticalMapping,
    ) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = table.into();
        validate_table(&table, &key)?;
        let columns: Vec<String> = columns
            .into_iter()
            .map(Into::into)
            .filter(|c| !key.contains(c))
            .collect();
        if columns.len() < 2 {
            return Err(SyncError::config(format!(
                "vertical table '{table}' needs series and value columns besides its key"
            )));
        }
        for column in &columns {
            validate_identifier(column)?;
        }
        Ok(Self {
            table,
            key,
            columns: ColumnSpec::Vertical(VerticalColumns { columns, mapping }),
            source: None,
            exclusion: ExclusionPolicy::default(),
        })
    }

    /// Spec described by a `SyncConfig`.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if the configuration is invalid.
    pub fn from_config(cfg: &SyncConfig) -> Result<Self, SyncError> {
        cfg.validate()?;
        let spec = match cfg.layout {
            Layout::Wide => Self::wide(
                cfg.table.clone(),
                cfg.index_name.clone(),
                cfg.items
                    .pairs()
                    .into_iter()
                    .map(|(source, target)| ColumnMapping { source, target })
                    .collect(),
            )?,
            Layout::Vertical => Self::vertical(
                cfg.table.clone(),
                cfg.index_name.clone(),
                cfg.items.pairs().into_iter().map(|(_, target)| target),
                cfg.vertical.clone(),
            )?,
        };
        let spec = match &cfg.source {
            Some(tag) => spec.with_source(cfg.source_column.clone(), tag.clone())?,
            None => spec,
        };
        spec.with_exclusion(cfg.exclusion)
    }

    /// Tag every observation with `tag` in `column`.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if `column` is not a valid identifier.
    pub fn with_source(
        mut self,
        column: impl Into<String>,
        tag: impl Into<String>,
    ) -> Result<Self, SyncError> {
        let column = column.into();
        validate_identifier(&column)?;
        self.source = Some(SourceTag {
            column,
            tag: tag.into(),
        });
        Ok(self)
    }

    /// Replace the exclusion policy.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if the policy is out of range.
    pub fn with_exclusion(mut self, policy: ExclusionPolicy) -> Result<Self, SyncError> {
        policy.validate()?;
        self.exclusion = policy;
        Ok(self)
    }

    /// Table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Key column metadata.
    #[must_use]
    pub const fn key(&self) -> &KeyColumns {
        &self.key
    }

    /// The date-like key column.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if no key column is declared.
    pub fn date_column(&self) -> Result<&str, SyncError> {
        self.key
            .primary()
            .ok_or_else(|| SyncError::config(format!("'{}' has no key column", self.table)))
    }

    /// Value columns.
    #[must_use]
    pub const fn columns(&self) -> &ColumnSpec {
        &self.columns
    }

    /// Source tag, if configured.
    #[must_use]
    pub const fn source(&self) -> Option<&SourceTag> {
        self.source.as_ref()
    }

    /// Exclusion policy.
    #[must_use]
    pub const fn exclusion(&self) -> &ExclusionPolicy {
        &self.exclusion
    }

    /// Target layout.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        match self.columns {
            ColumnSpec::Wide(_) => Layout::Wide,
            ColumnSpec::Vertical(_) => Layout::Vertical,
        }
    }

    /// Wide column mappings.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` for vertical tables.
    pub fn wide_mappings(&self) -> Result<&[ColumnMapping], SyncError> {
        match &self.columns {
            ColumnSpec::Wide(mappings) => Ok(mappings),
            ColumnSpec::Vertical(_) => Err(SyncError::config(format!(
                "'{}' is a vertical table; wide column mappings are undefined",
                self.table
            ))),
        }
    }

    /// Vertical column layout.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` for wide tables.
    pub fn vertical_columns(&self) -> Result<&VerticalColumns, SyncError> {
        match &self.columns {
            ColumnSpec::Vertical(v) => Ok(v),
            ColumnSpec::Wide(_) => Err(SyncError::config(format!(
                "'{}' is a wide table; vertical columns are undefined",
                self.table
            ))),
        }
    }
}

fn validate_table(table: &str, key: &KeyColumns) -> Result<(), SyncError> {
    if table.trim().is_empty() {
        return Err(SyncError::config("table must be specified"));
    }
    validate_identifier(table)?;
    if key.is_empty() {
        return Err(SyncError::config(format!(
            "'{table}' requires key column metadata"
        )));
    }
    key.names().into_iter().try_for_each(validate_identifier)
}
