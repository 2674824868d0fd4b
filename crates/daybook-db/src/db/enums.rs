//! Database enum types with Diesel serialization.
//!
//! The recurrence kind is stored as text under a CHECK constraint; decoding
//! an unknown value fails the row load rather than producing a fallback.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use daybook_core::types::RecurrenceKind;

/// Text-mapped wrapper for `RecurrenceKind`.
///
/// Maps to the `recurring_event.recurrence` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct Recurrence(pub RecurrenceKind);

impl Recurrence {
    #[must_use]
    pub const fn kind(self) -> RecurrenceKind {
        self.0
    }
}

impl From<RecurrenceKind> for Recurrence {
    fn from(kind: RecurrenceKind) -> Self {
        Self(kind)
    }
}

impl ToSql<Text, Pg> for Recurrence {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.0.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Recurrence {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let text = std::str::from_utf8(bytes.as_bytes())?;
        let kind = RecurrenceKind::from_str(text)?;
        Ok(Self(kind))
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_display_matches_stored_text() {
        assert_eq!(Recurrence(RecurrenceKind::Weekdays).to_string(), "weekdays");
        assert_eq!(Recurrence(RecurrenceKind::Weekly).to_string(), "weekly");
        assert_eq!(Recurrence(RecurrenceKind::Yearly).to_string(), "yearly");
    }

    #[test_log::test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&Recurrence(RecurrenceKind::Weekly)).unwrap();
        assert_eq!(json, "\"weekly\"");

        let parsed: Recurrence = serde_json::from_str("\"yearly\"").unwrap();
        assert_eq!(parsed.kind(), RecurrenceKind::Yearly);
    }

    #[test_log::test]
    fn test_serde_rejects_unknown_kind() {
        assert!(serde_json::from_str::<Recurrence>("\"fortnightly\"").is_err());
    }
}
