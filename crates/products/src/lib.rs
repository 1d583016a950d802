//! Catalog domain module: units of measure, categories and products.
//!
//! Pure validation and state rules (no IO, no HTTP, no storage). Cross-record
//! checks such as "the referenced unit exists" belong to the caller, which has
//! access to the stores.

pub mod category;
pub mod product;
pub mod unit;

pub use category::{Category, CategoryDraft, CategoryFields};
pub use product::{Product, ProductDraft, ProductFields};
pub use unit::{Unit, UnitDraft, UnitFields};
