//! bookkeep-core
//!
//! Formatting, view models, reports and services for Bookkeep.
//! Depends on bookkeep-domain. No terminal I/O, no concrete storage backend.

pub mod account_service;
pub mod dates;
pub mod error;
pub mod format;
pub mod link;
pub mod money;
pub mod portfolio_service;
pub mod report;
pub mod schedule_service;
pub mod security_service;
pub mod storage;
pub mod time;
pub mod transaction_service;
pub mod typeahead;
pub mod views;

pub use account_service::*;
pub use error::{CoreError, EditError, PersistenceError};
pub use link::{AccountLinkModel, LinkItem};
pub use portfolio_service::*;
pub use report::{ExpressionRegistry, ReportContext, ReportExpression};
pub use schedule_service::*;
pub use security_service::*;
pub use transaction_service::*;
pub use typeahead::{Completion, TypeAhead, TypeAheadField};
