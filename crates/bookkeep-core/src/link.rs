//! Selection model for choosing the account another account links to.

use bookkeep_domain::Book;
use uuid::Uuid;

use crate::{account_service::AccountService, CoreError};

pub const NONE_LABEL: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkItem {
    pub account_id: Option<Uuid>,
    pub label: String,
}

/// Combo-box style list: "None" first, then every open account other than
/// the owner, sorted by name ignoring case.
#[derive(Debug, Clone)]
pub struct AccountLinkModel {
    owner: Uuid,
    items: Vec<LinkItem>,
    selected: usize,
}

impl AccountLinkModel {
    pub fn new(book: &Book, owner: Uuid) -> Result<Self, CoreError> {
        let account = book
            .account(owner)
            .ok_or_else(|| CoreError::AccountNotFound(owner.to_string()))?;
        let mut candidates: Vec<_> = book
            .accounts
            .iter()
            .filter(|a| a.id != owner && !a.closed)
            .map(|a| LinkItem {
                account_id: Some(a.id),
                label: a.name.clone(),
            })
            .collect();
        candidates.sort_by_key(|item| item.label.to_lowercase());

        let mut items = Vec::with_capacity(candidates.len() + 1);
        items.push(LinkItem {
            account_id: None,
            label: NONE_LABEL.to_string(),
        });
        items.extend(candidates);

        let mut model = Self {
            owner,
            items,
            selected: 0,
        };
        model.select_account(account.linked_account);
        Ok(model)
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn element_at(&self, index: usize) -> Option<&LinkItem> {
        self.items.get(index)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.label.as_str()).collect()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> &LinkItem {
        &self.items[self.selected]
    }

    pub fn selected_account(&self) -> Option<Uuid> {
        self.selected_item().account_id
    }

    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    /// Selects the item for `account`; unknown ids fall back to "None".
    pub fn select_account(&mut self, account: Option<Uuid>) -> bool {
        let found = self
            .items
            .iter()
            .position(|item| item.account_id == account);
        self.selected = found.unwrap_or(0);
        found.is_some()
    }

    pub fn select_label(&mut self, label: &str) -> bool {
        let label = label.trim();
        match self
            .items
            .iter()
            .position(|item| item.label.eq_ignore_ascii_case(label))
        {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// Writes the current selection back to the owner account.
    pub fn apply(&self, book: &mut Book) -> Result<(), CoreError> {
        AccountService::link(book, self.owner, self.selected_account())
    }
}

#[cfg(test)]
mod tests {
    use bookkeep_domain::{Account, AccountKind};

    use super::*;

    fn book() -> (Book, Uuid, Uuid) {
        let mut book = Book::new("Links");
        let brokerage = Account::new("Brokerage", AccountKind::Investment);
        let checking = Account::new("checking", AccountKind::Bank);
        let mut closed = Account::new("Archive", AccountKind::Bank);
        closed.closed = true;
        let (b, c) = (brokerage.id, checking.id);
        book.accounts.extend([
            brokerage,
            Account::new("Savings", AccountKind::Bank),
            checking,
            closed,
        ]);
        (book, b, c)
    }

    #[test]
    fn items_start_with_none_and_skip_owner_and_closed() {
        let (book, brokerage, _) = book();
        let model = AccountLinkModel::new(&book, brokerage).unwrap();
        assert_eq!(model.labels(), vec!["None", "checking", "Savings"]);
        assert_eq!(model.size(), 3);
        assert_eq!(model.selected_index(), 0);
        assert_eq!(model.selected_account(), None);
        assert!(model.element_at(3).is_none());
    }

    #[test]
    fn selection_by_label_and_apply() {
        let (mut book, brokerage, checking) = book();
        let mut model = AccountLinkModel::new(&book, brokerage).unwrap();
        assert!(model.select_label("CHECKING"));
        assert_eq!(model.selected_account(), Some(checking));
        model.apply(&mut book).unwrap();
        assert_eq!(book.account(brokerage).unwrap().linked_account, Some(checking));

        let reopened = AccountLinkModel::new(&book, brokerage).unwrap();
        assert_eq!(reopened.selected_index(), 1);
        assert!(!model.clone().select_index(9));
    }
}
