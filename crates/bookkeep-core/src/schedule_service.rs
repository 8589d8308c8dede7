use bookkeep_domain::{Book, ScheduledTransaction};
use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::CoreError;

/// One occurrence of a scheduled transaction that is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueOccurrence {
    pub schedule_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
}

pub struct ScheduleService;

impl ScheduleService {
    pub fn add(book: &mut Book, schedule: ScheduledTransaction) -> Result<Uuid, CoreError> {
        if schedule.name.trim().is_empty() {
            return Err(CoreError::Validation("schedule name cannot be empty".into()));
        }
        if book.scheduled_by_name(&schedule.name).is_some() {
            return Err(CoreError::DuplicateName(schedule.name.clone()));
        }
        if book.account(schedule.account_id).is_none() {
            return Err(CoreError::AccountNotFound(schedule.account_id.to_string()));
        }
        if let Some(transfer) = schedule.transfer_account {
            if book.account(transfer).is_none() {
                return Err(CoreError::AccountNotFound(transfer.to_string()));
            }
        }
        if let Some(end) = schedule.end_date {
            if end < schedule.next_date {
                return Err(CoreError::Validation(
                    "end date precedes the first occurrence".into(),
                ));
            }
        }
        let id = schedule.id;
        info!(schedule = %schedule.name, interval = %schedule.interval, "schedule added");
        book.scheduled.push(schedule);
        book.touch();
        Ok(id)
    }

    pub fn remove(book: &mut Book, id: Uuid) -> Result<ScheduledTransaction, CoreError> {
        let index = book
            .scheduled
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CoreError::ScheduleNotFound(id.to_string()))?;
        book.touch();
        Ok(book.scheduled.remove(index))
    }

    /// Every occurrence due on or before `through`, oldest first.
    pub fn due(book: &Book, through: NaiveDate) -> Vec<DueOccurrence> {
        let mut due: Vec<_> = book
            .scheduled
            .iter()
            .flat_map(|schedule| {
                schedule
                    .occurrences_through(through)
                    .into_iter()
                    .map(|date| DueOccurrence {
                        schedule_id: schedule.id,
                        name: schedule.name.clone(),
                        date,
                    })
            })
            .collect();
        due.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        due
    }

    /// Posts due occurrences as transactions and advances each schedule.
    /// Schedules whose next date passes their end date are disabled.
    /// Returns the ids of the posted transactions.
    pub fn post_due(book: &mut Book, through: NaiveDate) -> Result<Vec<Uuid>, CoreError> {
        let mut posted = Vec::new();
        for idx in 0..book.scheduled.len() {
            let schedule = &book.scheduled[idx];
            if book.account(schedule.account_id).is_none() {
                warn!(schedule = %schedule.name, "skipping schedule for missing account");
                continue;
            }
            let dates = schedule.occurrences_through(through);
            let Some(last) = dates.last().copied() else {
                continue;
            };
            let transactions: Vec<_> = dates.iter().map(|date| schedule.instantiate(*date)).collect();
            posted.extend(transactions.iter().map(|txn| txn.id));
            book.transactions.extend(transactions);

            let schedule = &mut book.scheduled[idx];
            schedule.next_date = schedule.step(last);
            if schedule.end_date.is_some_and(|end| schedule.next_date > end) {
                schedule.enabled = false;
                info!(schedule = %schedule.name, "schedule finished");
            }
        }
        if !posted.is_empty() {
            info!(count = posted.len(), "scheduled transactions posted");
            book.touch();
        }
        Ok(posted)
    }
}
