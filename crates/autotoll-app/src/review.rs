//! Review queue workflow state
//!
//! Tracks per-record edit drafts and in-flight submissions so a record
//! cannot be confirmed twice, and a failed submission leaves the record
//! in the queue with its edits intact.

use autotoll_types::{TollRecord, VehicleType};
use std::collections::HashMap;

/// Editable correction for one queued record
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub vehicle_type: VehicleType,
    pub toll_text: String,
    /// A confirm or discard for this record is in flight
    pub busy: bool,
}

impl ReviewDraft {
    fn for_record(record: &TollRecord) -> Self {
        ReviewDraft {
            vehicle_type: record.vehicle_type,
            toll_text: format!("{:.2}", record.toll_amount),
            busy: false,
        }
    }
}

/// Records awaiting manual review plus their edit state
#[derive(Debug, Default)]
pub struct ReviewQueue {
    items: Vec<TollRecord>,
    drafts: HashMap<String, ReviewDraft>,
}

impl ReviewQueue {
    /// Replace the queue contents with a fresh fetch.
    ///
    /// Drafts for records still in the queue survive the reload, so an
    /// in-flight submission or half-typed edit is not wiped by a poll.
    pub fn replace(&mut self, items: Vec<TollRecord>) {
        let mut drafts = HashMap::new();
        for record in &items {
            let draft = self
                .drafts
                .remove(&record.id)
                .unwrap_or_else(|| ReviewDraft::for_record(record));
            drafts.insert(record.id.clone(), draft);
        }
        self.items = items;
        self.drafts = drafts;
    }

    pub fn items(&self) -> &[TollRecord] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn draft_mut(&mut self, id: &str) -> Option<&mut ReviewDraft> {
        self.drafts.get_mut(id)
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.drafts.get(id).map(|d| d.busy).unwrap_or(false)
    }

    /// Start a confirm for a record: validate the draft and mark it busy.
    /// Returns the corrected values to submit.
    pub fn begin(&mut self, id: &str) -> Result<(VehicleType, f64), String> {
        let draft = self
            .drafts
            .get_mut(id)
            .ok_or_else(|| format!("record {id} is not in the queue"))?;
        if draft.busy {
            return Err(format!("record {id} already has a submission in flight"));
        }
        let toll: f64 = draft
            .toll_text
            .trim()
            .parse()
            .map_err(|_| "toll amount must be a number".to_string())?;
        if toll < 0.0 || !toll.is_finite() {
            return Err("toll amount must be zero or positive".to_string());
        }
        draft.busy = true;
        Ok((draft.vehicle_type, toll))
    }

    /// Start a discard for a record, marking it busy
    pub fn begin_discard(&mut self, id: &str) -> Result<(), String> {
        let draft = self
            .drafts
            .get_mut(id)
            .ok_or_else(|| format!("record {id} is not in the queue"))?;
        if draft.busy {
            return Err(format!("record {id} already has a submission in flight"));
        }
        draft.busy = true;
        Ok(())
    }

    /// Finish an in-flight submission. On success the record leaves the
    /// queue; on failure it stays, with edits intact and busy cleared.
    pub fn settle(&mut self, id: &str, ok: bool) {
        if ok {
            self.items.retain(|r| r.id != id);
            self.drafts.remove(id);
        } else if let Some(draft) = self.drafts.get_mut(id) {
            draft.busy = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotoll_types::RecordStatus;

    fn record(id: &str, toll: f64) -> TollRecord {
        TollRecord {
            id: id.to_string(),
            timestamp_ms: 0,
            vehicle_type: VehicleType::Unknown,
            license_plate: "AB123".to_string(),
            confidence: 0.5,
            toll_amount: toll,
            image_url: String::new(),
            status: RecordStatus::ManualReview,
            color: String::new(),
            make_model: String::new(),
            description: String::new(),
            owner: None,
        }
    }

    fn queue_with(ids: &[&str]) -> ReviewQueue {
        let mut queue = ReviewQueue::default();
        queue.replace(ids.iter().map(|id| record(id, 10.0)).collect());
        queue
    }

    #[test]
    fn begin_returns_validated_draft() {
        let mut queue = queue_with(&["1"]);
        {
            let draft = queue.draft_mut("1").unwrap();
            draft.vehicle_type = VehicleType::Bus;
            draft.toll_text = "8.00".to_string();
        }
        assert_eq!(queue.begin("1"), Ok((VehicleType::Bus, 8.0)));
        assert!(queue.is_busy("1"));
    }

    #[test]
    fn begin_rejects_second_submission() {
        let mut queue = queue_with(&["1"]);
        queue.begin("1").unwrap();
        assert!(queue.begin("1").is_err());
    }

    #[test]
    fn begin_rejects_bad_toll_text() {
        let mut queue = queue_with(&["1"]);
        queue.draft_mut("1").unwrap().toll_text = "lots".to_string();
        assert!(queue.begin("1").is_err());
        assert!(!queue.is_busy("1"));

        queue.draft_mut("1").unwrap().toll_text = "-4".to_string();
        assert!(queue.begin("1").is_err());
    }

    #[test]
    fn successful_settle_removes_the_record() {
        let mut queue = queue_with(&["1", "2"]);
        queue.begin("1").unwrap();
        queue.settle("1", true);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.items()[0].id, "2");
    }

    #[test]
    fn failed_settle_keeps_record_and_edits() {
        let mut queue = queue_with(&["1"]);
        queue.draft_mut("1").unwrap().toll_text = "9.99".to_string();
        queue.begin("1").unwrap();
        queue.settle("1", false);
        assert_eq!(queue.len(), 1);
        assert!(!queue.is_busy("1"));
        assert_eq!(queue.draft_mut("1").unwrap().toll_text, "9.99");
    }

    #[test]
    fn reload_preserves_drafts_for_surviving_records() {
        let mut queue = queue_with(&["1", "2"]);
        queue.draft_mut("1").unwrap().toll_text = "3.33".to_string();

        queue.replace(vec![record("1", 10.0), record("3", 10.0)]);
        assert_eq!(queue.draft_mut("1").unwrap().toll_text, "3.33");
        assert!(queue.draft_mut("2").is_none());
        assert_eq!(queue.draft_mut("3").unwrap().toll_text, "10.00");
    }

    #[test]
    fn discard_follows_the_same_busy_protocol() {
        let mut queue = queue_with(&["1"]);
        queue.begin_discard("1").unwrap();
        assert!(queue.begin("1").is_err());
        queue.settle("1", true);
        assert!(queue.is_empty());
    }
}
