use crate::errors::TrackerError;
use crate::models::{Entry, EntryDraft};
use crate::storage::Storage;
use chrono::NaiveDate;
use uuid::Uuid;

/// Ordered entry collection that writes through to storage after every
/// mutation that changed something.
#[derive(Debug)]
pub struct EntryRepository {
    storage: Storage,
    entries: Vec<Entry>,
}

impl EntryRepository {
    pub async fn open(storage: Storage) -> Self {
        let entries = storage.load_entries().await;
        Self { storage, entries }
    }

    pub fn list(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Date descending; entries logged later on the same date come first.
    pub fn sorted_for_display(&self) -> Vec<Entry> {
        let mut rows: Vec<Entry> = self.entries.iter().rev().cloned().collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows
    }

    pub async fn add(&mut self, draft: EntryDraft) -> Result<Entry, TrackerError> {
        let entry = Entry::from_draft(self.mint_id(), draft);
        self.entries.push(entry.clone());
        self.persist().await?;
        Ok(entry)
    }

    pub async fn update(&mut self, id: &str, draft: EntryDraft) -> Result<Entry, TrackerError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))?;
        *slot = Entry::from_draft(slot.id.clone(), draft);
        let updated = slot.clone();
        self.persist().await?;
        Ok(updated)
    }

    pub async fn remove(&mut self, id: &str) -> Result<bool, TrackerError> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    pub async fn remove_by_date(&mut self, date: NaiveDate) -> Result<usize, TrackerError> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.date != date);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.persist().await?;
        }
        Ok(removed)
    }

    pub async fn clear(&mut self) -> Result<(), TrackerError> {
        self.entries.clear();
        self.persist().await
    }

    pub async fn replace_all(&mut self, entries: Vec<Entry>) -> Result<(), TrackerError> {
        self.entries = entries;
        self.persist().await
    }

    pub async fn flush(&self) -> Result<(), TrackerError> {
        self.persist().await
    }

    fn mint_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    async fn persist(&self) -> Result<(), TrackerError> {
        self.storage.save_entries(&self.entries).await
    }
}
