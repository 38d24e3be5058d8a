use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Layout accepted for `startTime`/`endTime` when strict checking is on,
/// e.g. `2014-03-31 10:00:00 +0000`.
const TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S %z";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
}

/// How timestamps in entry bodies are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimePolicy {
    /// Stored and echoed back verbatim.
    #[default]
    Opaque,
    /// Must match `YYYY-MM-DD HH:MM:SS +HHMM` exactly. The original string is
    /// still what gets stored.
    Strict,
}

impl TimePolicy {
    fn check(self, field: &str, value: &str) -> Result<()> {
        if self == TimePolicy::Opaque {
            return Ok(());
        }

        // chrono parsing also takes `+00:00` offsets and unpadded fields, so the
        // text must survive a round trip through the layout unchanged.
        match DateTime::parse_from_str(value, TIME_LAYOUT) {
            Ok(parsed) if parsed.format(TIME_LAYOUT).to_string() == value => Ok(()),
            _ => Err(Error::Validation(format!("{field}: Malformed time specification"))),
        }
    }
}

/// Body of a calendar create or update request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarInput {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of an entry create or update request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCalendar {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarPatch {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub description: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

// Empty strings count as "not supplied".
fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

impl CalendarInput {
    pub fn into_new(self) -> Result<NewCalendar> {
        let name = present(self.name)
            .ok_or_else(|| Error::Validation("name: Required attribute missing".into()))?;

        Ok(NewCalendar { name })
    }

    #[must_use]
    pub fn into_patch(self) -> CalendarPatch {
        CalendarPatch {
            name: present(self.name),
        }
    }
}

impl EntryInput {
    pub fn into_new(self, times: TimePolicy) -> Result<NewEntry> {
        let EntryPatch {
            description,
            start_time,
            end_time,
        } = self.into_patch(times)?;

        let missing = [
            ("description", description.is_none()),
            ("startTime", start_time.is_none()),
            ("endTime", end_time.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, missing)| missing.then_some(field))
        .collect::<Vec<_>>();

        match (description, start_time, end_time) {
            (Some(description), Some(start_time), Some(end_time)) => Ok(NewEntry {
                description,
                start_time,
                end_time,
            }),
            _ => Err(Error::Validation(format!(
                "{}: Required attribute missing",
                missing.join(", ")
            ))),
        }
    }

    pub fn into_patch(self, times: TimePolicy) -> Result<EntryPatch> {
        let start_time = present(self.start_time);
        let end_time = present(self.end_time);

        if let Some(start_time) = &start_time {
            times.check("startTime", start_time)?;
        }
        if let Some(end_time) = &end_time {
            times.check("endTime", end_time)?;
        }

        Ok(EntryPatch {
            description: present(self.description),
            start_time,
            end_time,
        })
    }
}
