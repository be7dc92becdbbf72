//! History read query and identifier validation.
//!
//! Table and column names are interpolated into the statement text, so they
//! must pass [`SqlIdentifier::parse`] first. The record identifier is always a
//! bound parameter.

use std::fmt;

use uuid::Uuid;

use super::ddm_column::DdmColumn;

const MAX_IDENTIFIER_BYTES: usize = 63;

/// Identifier rejected by [`SqlIdentifier::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SqlIdentifierError {
    /// Identifier was empty.
    #[error("identifier must not be empty")]
    Empty,
    /// Identifier exceeded the Postgres length limit.
    #[error("identifier {identifier:?} exceeds {MAX_IDENTIFIER_BYTES} bytes")]
    TooLong {
        /// Rejected identifier.
        identifier: String,
    },
    /// Identifier contained characters outside `[a-z0-9_]` or started with a
    /// digit.
    #[error("identifier {identifier:?} must match [a-z_][a-z0-9_]*")]
    InvalidCharacters {
        /// Rejected identifier.
        identifier: String,
    },
}

/// Unquoted, lowercase SQL identifier safe for interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlIdentifier(String);

impl SqlIdentifier {
    /// Validate a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SqlIdentifierError`] when the identifier is empty, longer
    /// than 63 bytes, or outside `[a-z_][a-z0-9_]*`.
    ///
    /// # Examples
    ///
    /// ```
    /// use history_excerptor::domain::history::SqlIdentifier;
    ///
    /// assert!(SqlIdentifier::parse("person_hst").is_ok());
    /// assert!(SqlIdentifier::parse("person; drop table x").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, SqlIdentifierError> {
        let mut chars = raw.chars();
        let Some(first) = chars.next() else {
            return Err(SqlIdentifierError::Empty);
        };
        if raw.len() > MAX_IDENTIFIER_BYTES {
            return Err(SqlIdentifierError::TooLong {
                identifier: raw.to_owned(),
            });
        }
        let valid_first = first == '_' || first.is_ascii_lowercase();
        let valid_rest =
            chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit());
        if !(valid_first && valid_rest) {
            return Err(SqlIdentifierError::InvalidCharacters {
                identifier: raw.to_owned(),
            });
        }
        Ok(Self(raw.to_owned()))
    }

    /// Identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SqlIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Audit-trail query for one business record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    table: SqlIdentifier,
    search_column: SqlIdentifier,
    record_id: Uuid,
}

impl HistoryQuery {
    /// Assemble a query from validated identifiers.
    pub fn new(table: SqlIdentifier, search_column: SqlIdentifier, record_id: Uuid) -> Self {
        Self {
            table,
            search_column,
            record_id,
        }
    }

    /// History table to read.
    pub fn table(&self) -> &SqlIdentifier {
        &self.table
    }

    /// Equality search column.
    pub fn search_column(&self) -> &SqlIdentifier {
        &self.search_column
    }

    /// Business record identifier, bound as `$1`.
    pub fn record_id(&self) -> Uuid {
        self.record_id
    }

    /// Statement text, newest entries first.
    ///
    /// # Examples
    ///
    /// ```
    /// use history_excerptor::domain::history::{HistoryQuery, SqlIdentifier};
    /// use uuid::Uuid;
    ///
    /// let query = HistoryQuery::new(
    ///     SqlIdentifier::parse("person_hst")?,
    ///     SqlIdentifier::parse("person_id")?,
    ///     Uuid::nil(),
    /// );
    /// assert_eq!(
    ///     query.select_statement(),
    ///     "select * from person_hst where person_id = $1 order by ddm_created_at desc",
    /// );
    /// # Ok::<(), history_excerptor::domain::history::SqlIdentifierError>(())
    /// ```
    pub fn select_statement(&self) -> String {
        self.select_statement_for("*")
    }

    /// Statement text with an explicit select list.
    ///
    /// `projection` is emitted verbatim, so callers must build it from
    /// trusted column metadata and quote each column name.
    pub fn select_statement_for(&self, projection: &str) -> String {
        format!(
            "select {projection} from {table} where {column} = $1 order by {created_at} desc",
            table = self.table,
            column = self.search_column,
            created_at = DdmColumn::CreatedAt.column_name(),
        )
    }
}
