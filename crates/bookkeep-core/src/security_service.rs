use bookkeep_domain::{Book, PriceEntry, Security};
use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::CoreError;

pub struct SecurityService;

impl SecurityService {
    pub fn add(book: &mut Book, security: Security) -> Result<Uuid, CoreError> {
        if security.name.trim().is_empty() {
            return Err(CoreError::Validation("security name cannot be empty".into()));
        }
        let clash = book.securities.iter().any(|existing| {
            existing.name.eq_ignore_ascii_case(security.name.trim())
                || (!security.symbol.is_empty() && existing.symbol == security.symbol)
        });
        if clash {
            return Err(CoreError::DuplicateName(security.name.clone()));
        }
        let id = security.id;
        info!(security = %security.name, symbol = %security.symbol, "security added");
        book.securities.push(security);
        book.touch();
        Ok(id)
    }

    /// Records a price, replacing any entry on the same date.
    pub fn record_price(book: &mut Book, id: Uuid, entry: PriceEntry) -> Result<(), CoreError> {
        if entry.price < 0.0 || !entry.price.is_finite() {
            return Err(CoreError::Validation("price must be zero or positive".into()));
        }
        let security = book
            .security_mut(id)
            .ok_or_else(|| CoreError::SecurityNotFound(id.to_string()))?;
        if let Some(previous) = security.upsert_price(entry) {
            debug!(security = %security.name, date = %previous.date, "price replaced");
        }
        book.touch();
        Ok(())
    }

    pub fn remove_price(book: &mut Book, id: Uuid, date: NaiveDate) -> Result<PriceEntry, CoreError> {
        let security = book
            .security_mut(id)
            .ok_or_else(|| CoreError::SecurityNotFound(id.to_string()))?;
        let removed = security.remove_price(date).ok_or_else(|| {
            CoreError::InvalidOperation(format!("no price recorded on {}", date))
        })?;
        book.touch();
        Ok(removed)
    }

    /// Replaces the full history, e.g. after editing a price-history view.
    pub fn replace_history(
        book: &mut Book,
        id: Uuid,
        entries: Vec<PriceEntry>,
    ) -> Result<(), CoreError> {
        let security = book
            .security_mut(id)
            .ok_or_else(|| CoreError::SecurityNotFound(id.to_string()))?;
        let before = entries.len();
        security.set_price_history(entries);
        if security.price_history().len() != before {
            warn!(
                security = %security.name,
                dropped = before - security.price_history().len(),
                "duplicate price dates collapsed"
            );
        }
        book.touch();
        Ok(())
    }

    pub fn latest_price(book: &Book, id: Uuid) -> Result<Option<f64>, CoreError> {
        let security = book
            .security(id)
            .ok_or_else(|| CoreError::SecurityNotFound(id.to_string()))?;
        Ok(security.latest_price().map(|entry| entry.price))
    }

    pub fn find<'a>(book: &'a Book, name: &str) -> Result<&'a Security, CoreError> {
        debug!(name, "security lookup");
        book.security_by_name(name)
            .ok_or_else(|| CoreError::SecurityNotFound(name.to_string()))
    }
}
