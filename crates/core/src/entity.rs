//! Record traits: identity, lifecycle timestamps and validated editing.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::DomainResult;
use crate::validation::FieldErrors;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy
        + Eq
        + core::hash::Hash
        + core::fmt::Debug
        + core::fmt::Display
        + core::str::FromStr
        + Default
        + Send
        + Sync
        + 'static;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    fn created_at(&self) -> DateTime<Utc>;

    /// Soft-disable flag. Records are never hard-deleted.
    fn is_active(&self) -> bool;
}

/// A record whose writable state is a validated `Fields` value.
///
/// Full replacement and partial update both funnel through [`Editable::replace`]:
/// a partial update first overlays the supplied values onto [`Editable::fields`].
pub trait Editable: Entity + Sized {
    /// Complete writable state of the record.
    type Fields: Clone;

    /// Client-supplied input where every field may be absent.
    type Draft: Draft<Fields = Self::Fields> + DeserializeOwned + Send;

    /// Field constraints that need nothing but the values themselves.
    fn validate(fields: &Self::Fields) -> FieldErrors;

    fn create(id: Self::Id, fields: Self::Fields, now: DateTime<Utc>) -> DomainResult<Self>;

    fn fields(&self) -> Self::Fields;

    /// Replace the writable state, bumping `updated_at`.
    fn replace(&mut self, fields: Self::Fields, now: DateTime<Utc>) -> DomainResult<()>;
}

/// Partially specified input for an [`Editable`] record.
pub trait Draft {
    type Fields;

    /// Full input: required fields must be present, omitted optional fields
    /// take their defaults.
    fn complete(self) -> DomainResult<Self::Fields>;

    /// Partial input: only supplied fields change `base`.
    fn overlay(self, base: Self::Fields) -> Self::Fields;
}
