use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{Calendar, CalendarPatch, Entry, EntryPatch, Error, NewCalendar, NewEntry, Result};

struct Record {
    calendar: Calendar,
    entries: BTreeMap<String, Entry>,
}

/// In-memory state for all calendars and their entries.
///
/// Every operation takes the lock exactly once, so each one is atomic with
/// respect to the others.
#[derive(Default)]
pub struct Store {
    inner: RwLock<BTreeMap<String, Record>>,
}

/// 8 random bytes as lowercase hex, unique among the keys of `taken`.
fn generate_id<V>(taken: &BTreeMap<String, V>) -> String {
    loop {
        let id = hex::encode(rand::random::<[u8; 8]>());
        if !taken.contains_key(&id) {
            return id;
        }
    }
}

fn record<'a>(calendars: &'a BTreeMap<String, Record>, id: &str) -> Result<&'a Record> {
    calendars
        .get(id)
        .ok_or_else(|| Error::CalendarNotFound(id.to_owned()))
}

fn record_mut<'a>(
    calendars: &'a mut BTreeMap<String, Record>,
    id: &str,
) -> Result<&'a mut Record> {
    calendars
        .get_mut(id)
        .ok_or_else(|| Error::CalendarNotFound(id.to_owned()))
}

fn entry_not_found(calendar_id: &str, entry_id: &str) -> Error {
    Error::EntryNotFound {
        calendar: calendar_id.to_owned(),
        entry: entry_id.to_owned(),
    }
}

impl Store {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn list_calendars(&self) -> BTreeMap<String, Calendar> {
        self.inner
            .read()
            .await
            .iter()
            .map(|(id, record)| (id.clone(), record.calendar.clone()))
            .collect()
    }

    pub async fn create_calendar(&self, new: NewCalendar) -> Calendar {
        let mut calendars = self.inner.write().await;

        let calendar = Calendar {
            id: generate_id(&calendars),
            name: new.name,
        };

        calendars.insert(
            calendar.id.clone(),
            Record {
                calendar: calendar.clone(),
                entries: BTreeMap::new(),
            },
        );

        info!(calendar = %calendar.id, "created calendar");
        calendar
    }

    pub async fn get_calendar(&self, id: &str) -> Result<Calendar> {
        let calendars = self.inner.read().await;
        Ok(record(&calendars, id)?.calendar.clone())
    }

    pub async fn update_calendar(&self, id: &str, patch: CalendarPatch) -> Result<Calendar> {
        let mut calendars = self.inner.write().await;
        let record = record_mut(&mut calendars, id)?;

        if let Some(name) = patch.name {
            record.calendar.name = name;
            debug!(calendar = %id, "renamed calendar");
        }

        Ok(record.calendar.clone())
    }

    /// Removes the calendar together with all of its entries.
    pub async fn delete_calendar(&self, id: &str) -> Result<()> {
        let record = self
            .inner
            .write()
            .await
            .remove(id)
            .ok_or_else(|| Error::CalendarNotFound(id.to_owned()))?;

        info!(
            calendar = %id,
            entries = record.entries.len(),
            "deleted calendar"
        );
        Ok(())
    }

    pub async fn list_entries(&self, calendar_id: &str) -> Result<BTreeMap<String, Entry>> {
        let calendars = self.inner.read().await;
        Ok(record(&calendars, calendar_id)?.entries.clone())
    }

    pub async fn create_entry(&self, calendar_id: &str, new: NewEntry) -> Result<Entry> {
        let mut calendars = self.inner.write().await;
        let record = record_mut(&mut calendars, calendar_id)?;

        let entry = Entry {
            id: generate_id(&record.entries),
            description: new.description,
            start_time: new.start_time,
            end_time: new.end_time,
        };

        record.entries.insert(entry.id.clone(), entry.clone());

        info!(calendar = %calendar_id, entry = %entry.id, "created entry");
        Ok(entry)
    }

    pub async fn get_entry(&self, calendar_id: &str, entry_id: &str) -> Result<Entry> {
        let calendars = self.inner.read().await;

        record(&calendars, calendar_id)?
            .entries
            .get(entry_id)
            .cloned()
            .ok_or_else(|| entry_not_found(calendar_id, entry_id))
    }

    /// Merges the supplied fields into the stored entry.
    pub async fn update_entry(
        &self,
        calendar_id: &str,
        entry_id: &str,
        patch: EntryPatch,
    ) -> Result<Entry> {
        let mut calendars = self.inner.write().await;
        let entry = record_mut(&mut calendars, calendar_id)?
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| entry_not_found(calendar_id, entry_id))?;

        if let Some(description) = patch.description {
            entry.description = description;
        }
        if let Some(start_time) = patch.start_time {
            entry.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            entry.end_time = end_time;
        }

        debug!(calendar = %calendar_id, entry = %entry_id, "updated entry");
        Ok(entry.clone())
    }

    pub async fn delete_entry(&self, calendar_id: &str, entry_id: &str) -> Result<()> {
        let mut calendars = self.inner.write().await;

        record_mut(&mut calendars, calendar_id)?
            .entries
            .remove(entry_id)
            .ok_or_else(|| entry_not_found(calendar_id, entry_id))?;

        info!(calendar = %calendar_id, entry = %entry_id, "deleted entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_calendar(name: &str) -> NewCalendar {
        NewCalendar { name: name.into() }
    }

    fn new_entry() -> NewEntry {
        NewEntry {
            description: "First entry".into(),
            start_time: "2014-03-31 10:00:00 +0000".into(),
            end_time: "2014-03-31 11:00:00 +0000".into(),
        }
    }

    #[tokio::test]
    async fn starts_empty() {
        assert!(Store::new().list_calendars().await.is_empty());
    }

    #[tokio::test]
    async fn created_calendar_is_listed() {
        let store = Store::new();
        let calendar = store.create_calendar(new_calendar("First")).await;

        assert_eq!(calendar.name, "First");
        assert_eq!(calendar.id.len(), 16);
        assert!(calendar.id.chars().all(|c| c.is_ascii_hexdigit()));

        let listed = store.list_calendars().await;
        assert_eq!(listed.get(&calendar.id), Some(&calendar));
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let store = Store::new();
        for i in 0..100 {
            store.create_calendar(new_calendar(&i.to_string())).await;
        }
        assert_eq!(store.list_calendars().await.len(), 100);
    }

    #[tokio::test]
    async fn update_renames_and_keeps_entries() {
        let store = Store::new();
        let calendar = store.create_calendar(new_calendar("First")).await;
        let entry = store.create_entry(&calendar.id, new_entry()).await.unwrap();

        let patch = CalendarPatch {
            name: Some("Second".into()),
        };
        let updated = store.update_calendar(&calendar.id, patch).await.unwrap();

        assert_eq!(updated.id, calendar.id);
        assert_eq!(updated.name, "Second");
        assert_eq!(store.get_calendar(&calendar.id).await.unwrap().name, "Second");
        assert_eq!(
            store.get_entry(&calendar.id, &entry.id).await.unwrap(),
            entry
        );
    }

    #[tokio::test]
    async fn empty_patch_changes_nothing() {
        let store = Store::new();
        let calendar = store.create_calendar(new_calendar("First")).await;

        let updated = store
            .update_calendar(&calendar.id, CalendarPatch::default())
            .await
            .unwrap();

        assert_eq!(updated, calendar);
    }

    #[tokio::test]
    async fn missing_calendar_is_not_found() {
        let store = Store::new();

        assert_eq!(
            store.get_calendar("nope").await,
            Err(Error::CalendarNotFound("nope".into()))
        );
        assert!(store.delete_calendar("nope").await.unwrap_err().is_not_found());
        assert!(store.list_entries("nope").await.unwrap_err().is_not_found());
        assert!(store
            .create_entry("nope", new_entry())
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn delete_cascades_to_entries() {
        let store = Store::new();
        let calendar = store.create_calendar(new_calendar("First")).await;
        let entry = store.create_entry(&calendar.id, new_entry()).await.unwrap();

        store.delete_calendar(&calendar.id).await.unwrap();

        assert!(store.list_calendars().await.is_empty());
        assert!(store.get_calendar(&calendar.id).await.is_err());
        assert_eq!(
            store.get_entry(&calendar.id, &entry.id).await,
            Err(Error::CalendarNotFound(calendar.id.clone()))
        );
    }

    #[tokio::test]
    async fn partial_entry_update_keeps_description() {
        let store = Store::new();
        let calendar = store.create_calendar(new_calendar("First")).await;
        let entry = store.create_entry(&calendar.id, new_entry()).await.unwrap();

        let patch = EntryPatch {
            start_time: Some("2014-03-31 11:00:00 +0000".into()),
            end_time: Some("2014-03-31 12:00:00 +0000".into()),
            ..EntryPatch::default()
        };
        let updated = store
            .update_entry(&calendar.id, &entry.id, patch)
            .await
            .unwrap();

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.description, "First entry");
        assert_eq!(updated.start_time, "2014-03-31 11:00:00 +0000");
        assert_eq!(updated.end_time, "2014-03-31 12:00:00 +0000");
        assert_eq!(
            store.list_entries(&calendar.id).await.unwrap().get(&entry.id),
            Some(&updated)
        );
    }

    #[tokio::test]
    async fn entries_are_scoped_to_their_calendar() {
        let store = Store::new();
        let first = store.create_calendar(new_calendar("First")).await;
        let second = store.create_calendar(new_calendar("Second")).await;
        let entry = store.create_entry(&first.id, new_entry()).await.unwrap();

        assert!(store.list_entries(&second.id).await.unwrap().is_empty());
        assert_eq!(
            store.delete_entry(&second.id, &entry.id).await,
            Err(Error::EntryNotFound {
                calendar: second.id.clone(),
                entry: entry.id.clone(),
            })
        );

        store.delete_entry(&first.id, &entry.id).await.unwrap();
        assert!(store.list_entries(&first.id).await.unwrap().is_empty());
        assert!(store
            .delete_entry(&first.id, &entry.id)
            .await
            .unwrap_err()
            .is_not_found());
    }
}
