//! Parties domain module (customers and suppliers).
//!
//! Both kinds share one contact record shape; the id type decides which
//! table a record belongs to.

pub mod party;

pub use party::{Customer, Party, PartyDraft, PartyFields, PartyRole, Supplier};
