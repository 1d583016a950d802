//! `tillpoint-core` - domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the domain error model, field validation helpers and the
//! record traits shared by every catalog entity.

pub mod decimal;
pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use entity::{Draft, Editable, Entity};
pub use error::{DomainError, DomainResult};
pub use id::{
    CategoryId, CustomerId, ProductId, PurchaseOrderId, SessionId, SupplierId, UnitId, UserId,
};
pub use validation::{FieldErrors, NON_FIELD_ERRORS};
