use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::decimal::{MONEY, PERCENTAGE};
use tillpoint_core::validation::{check_non_negative, require_text};
use tillpoint_core::{
    CategoryId, Draft, DomainResult, Editable, Entity, FieldErrors, ProductId, UnitId,
};

pub const CODE_MAX_LEN: usize = 255;
pub const NAME_MAX_LEN: usize = 255;

/// Sellable catalog item.
///
/// # Invariants
/// - `unit_price` fits `NUMERIC(12, 2)` and `discount_percentage` fits `NUMERIC(4, 2)`;
///   both are stored rescaled to two places.
/// - `categories` holds no duplicates.
/// - Stock and reorder level are finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    id: ProductId,
    #[serde(flatten)]
    fields: ProductFields,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductFields {
    pub code: String,
    pub name: String,
    pub unit: UnitId,
    pub categories: Vec<CategoryId>,
    pub unit_in_stock: f64,
    pub unit_price: Decimal,
    pub discount_percentage: Decimal,
    pub reorder_level: f64,
    pub on_sale: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDraft {
    pub code: Option<String>,
    pub name: Option<String>,
    pub unit: Option<UnitId>,
    pub categories: Option<Vec<CategoryId>>,
    pub unit_in_stock: Option<f64>,
    pub unit_price: Option<Decimal>,
    pub discount_percentage: Option<Decimal>,
    pub reorder_level: Option<f64>,
    pub on_sale: Option<bool>,
    pub is_active: Option<bool>,
}

impl Product {
    pub fn code(&self) -> &str {
        &self.fields.code
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn unit(&self) -> UnitId {
        self.fields.unit
    }

    pub fn categories(&self) -> &[CategoryId] {
        &self.fields.categories
    }

    pub fn unit_price(&self) -> Decimal {
        self.fields.unit_price
    }

    pub fn discount_percentage(&self) -> Decimal {
        self.fields.discount_percentage
    }

    pub fn on_sale(&self) -> bool {
        self.fields.on_sale
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl ProductFields {
    fn normalized(mut self) -> Self {
        self.code = self.code.trim().to_string();
        self.name = self.name.trim().to_string();
        self.unit_price = MONEY.quantize(self.unit_price);
        self.discount_percentage = PERCENTAGE.quantize(self.discount_percentage);
        let mut seen = Vec::with_capacity(self.categories.len());
        self.categories.retain(|c| {
            if seen.contains(c) {
                false
            } else {
                seen.push(*c);
                true
            }
        });
        self
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_active(&self) -> bool {
        self.fields.is_active
    }
}

impl Editable for Product {
    type Fields = ProductFields;
    type Draft = ProductDraft;

    fn validate(fields: &ProductFields) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "code", &fields.code, CODE_MAX_LEN);
        require_text(&mut errors, "name", &fields.name, NAME_MAX_LEN);
        check_non_negative(&mut errors, "unit_in_stock", fields.unit_in_stock);
        check_non_negative(&mut errors, "reorder_level", fields.reorder_level);
        MONEY.check(&mut errors, "unit_price", fields.unit_price);
        PERCENTAGE.check(&mut errors, "discount_percentage", fields.discount_percentage);
        errors
    }

    fn create(id: ProductId, fields: ProductFields, now: DateTime<Utc>) -> DomainResult<Self> {
        Self::validate(&fields).into_result()?;
        Ok(Self {
            id,
            fields: fields.normalized(),
            created_at: now,
            updated_at: now,
        })
    }

    fn fields(&self) -> ProductFields {
        self.fields.clone()
    }

    fn replace(&mut self, fields: ProductFields, now: DateTime<Utc>) -> DomainResult<()> {
        Self::validate(&fields).into_result()?;
        self.fields = fields.normalized();
        self.updated_at = now;
        Ok(())
    }
}

impl Draft for ProductDraft {
    type Fields = ProductFields;

    /// Omitted `categories` means "no categories", so a full update without
    /// them clears the association.
    fn complete(self) -> DomainResult<ProductFields> {
        let mut errors = FieldErrors::new();
        errors.require("code", &self.code);
        errors.require("name", &self.name);
        errors.require("unit", &self.unit);
        errors.require("unit_in_stock", &self.unit_in_stock);
        errors.require("unit_price", &self.unit_price);
        errors.require("discount_percentage", &self.discount_percentage);
        errors.require("reorder_level", &self.reorder_level);

        match (
            self.code,
            self.name,
            self.unit,
            self.unit_in_stock,
            self.unit_price,
            self.discount_percentage,
            self.reorder_level,
        ) {
            (
                Some(code),
                Some(name),
                Some(unit),
                Some(unit_in_stock),
                Some(unit_price),
                Some(discount_percentage),
                Some(reorder_level),
            ) => Ok(ProductFields {
                code,
                name,
                unit,
                categories: self.categories.unwrap_or_default(),
                unit_in_stock,
                unit_price,
                discount_percentage,
                reorder_level,
                on_sale: self.on_sale.unwrap_or(false),
                is_active: self.is_active.unwrap_or(true),
            }),
            _ => Err(errors.into()),
        }
    }

    fn overlay(self, base: ProductFields) -> ProductFields {
        ProductFields {
            code: self.code.unwrap_or(base.code),
            name: self.name.unwrap_or(base.name),
            unit: self.unit.unwrap_or(base.unit),
            categories: self.categories.unwrap_or(base.categories),
            unit_in_stock: self.unit_in_stock.unwrap_or(base.unit_in_stock),
            unit_price: self.unit_price.unwrap_or(base.unit_price),
            discount_percentage: self.discount_percentage.unwrap_or(base.discount_percentage),
            reorder_level: self.reorder_level.unwrap_or(base.reorder_level),
            on_sale: self.on_sale.unwrap_or(base.on_sale),
            is_active: self.is_active.unwrap_or(base.is_active),
        }
    }
}
