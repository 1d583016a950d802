//! Purchasing domain module (purchase orders placed with suppliers).
//!
//! Pure domain logic; whether the referenced product and supplier exist is
//! checked by the caller against its stores.

pub mod order;

pub use order::{PurchaseOrder, PurchaseOrderDraft, PurchaseOrderFields};
