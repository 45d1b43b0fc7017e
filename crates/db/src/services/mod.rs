//! Domain services layered over the repositories.
//!
//! Services own validation and workflow decisions; the repositories under
//! [`crate::db`] own SQL. Handlers and tooling should call services, not
//! repositories.

pub mod accounts;
pub mod import;
pub mod orders;
pub mod tokens;

pub use accounts::{AccountError, AccountService};
pub use import::{ImportError, ImportService, ImportSummary, PriceList};
pub use orders::{OrderError, OrderService};
pub use tokens::{OsTokenGenerator, TokenGenerator};
