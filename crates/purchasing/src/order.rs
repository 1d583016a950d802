use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::decimal::MONEY;
use tillpoint_core::validation::check_positive;
use tillpoint_core::{
    Draft, DomainResult, Editable, Entity, FieldErrors, ProductId, PurchaseOrderId, SupplierId,
};

/// An order for one product placed with one supplier.
///
/// # Invariants
/// - `quantity` is finite and strictly positive.
/// - `unit_price` and `sub_total` fit `NUMERIC(12, 2)` and are stored with two places.
/// - Orders are withdrawn by setting `is_cancelled`, never removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    #[serde(flatten)]
    fields: PurchaseOrderFields,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseOrderFields {
    pub product: ProductId,
    pub supplier: SupplierId,
    pub quantity: f64,
    pub unit_price: Decimal,
    pub sub_total: Decimal,
    pub required_date: NaiveDate,
    pub is_cancelled: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOrderDraft {
    pub product: Option<ProductId>,
    pub supplier: Option<SupplierId>,
    pub quantity: Option<f64>,
    pub unit_price: Option<Decimal>,
    pub sub_total: Option<Decimal>,
    pub required_date: Option<NaiveDate>,
    pub is_cancelled: Option<bool>,
    pub is_active: Option<bool>,
}

/// `quantity × unit_price` rounded to cents. Values that cannot be represented
/// saturate so that the digit check rejects them.
pub fn line_total(quantity: f64, unit_price: Decimal) -> Decimal {
    let Ok(quantity) = Decimal::try_from(quantity) else {
        return Decimal::ZERO;
    };
    quantity
        .checked_mul(unit_price)
        .map(|total| total.round_dp(MONEY.decimal_places))
        .unwrap_or(Decimal::MAX)
}

impl PurchaseOrder {
    pub fn product(&self) -> ProductId {
        self.fields.product
    }

    pub fn supplier(&self) -> SupplierId {
        self.fields.supplier
    }

    pub fn quantity(&self) -> f64 {
        self.fields.quantity
    }

    pub fn sub_total(&self) -> Decimal {
        self.fields.sub_total
    }

    pub fn required_date(&self) -> NaiveDate {
        self.fields.required_date
    }

    pub fn is_cancelled(&self) -> bool {
        self.fields.is_cancelled
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl PurchaseOrderFields {
    fn normalized(mut self) -> Self {
        self.unit_price = MONEY.quantize(self.unit_price);
        self.sub_total = MONEY.quantize(self.sub_total);
        self
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

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

impl Editable for PurchaseOrder {
    type Fields = PurchaseOrderFields;
    type Draft = PurchaseOrderDraft;

    fn validate(fields: &PurchaseOrderFields) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_positive(&mut errors, "quantity", fields.quantity);
        MONEY.check(&mut errors, "unit_price", fields.unit_price);
        MONEY.check(&mut errors, "sub_total", fields.sub_total);
        errors
    }

    fn create(
        id: PurchaseOrderId,
        fields: PurchaseOrderFields,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::validate(&fields).into_result()?;
        Ok(Self {
            id,
            fields: fields.normalized(),
            created_at: now,
            updated_at: now,
        })
    }

    fn fields(&self) -> PurchaseOrderFields {
        self.fields.clone()
    }

    fn replace(&mut self, fields: PurchaseOrderFields, now: DateTime<Utc>) -> DomainResult<()> {
        Self::validate(&fields).into_result()?;
        self.fields = fields.normalized();
        self.updated_at = now;
        Ok(())
    }
}

impl Draft for PurchaseOrderDraft {
    type Fields = PurchaseOrderFields;

    fn complete(self) -> DomainResult<PurchaseOrderFields> {
        let mut errors = FieldErrors::new();
        errors.require("product", &self.product);
        errors.require("supplier", &self.supplier);
        errors.require("quantity", &self.quantity);
        errors.require("unit_price", &self.unit_price);
        errors.require("required_date", &self.required_date);

        match (
            self.product,
            self.supplier,
            self.quantity,
            self.unit_price,
            self.required_date,
        ) {
            (
                Some(product),
                Some(supplier),
                Some(quantity),
                Some(unit_price),
                Some(required_date),
            ) => Ok(PurchaseOrderFields {
                product,
                supplier,
                quantity,
                unit_price,
                sub_total: self
                    .sub_total
                    .unwrap_or_else(|| line_total(quantity, unit_price)),
                required_date,
                is_cancelled: self.is_cancelled.unwrap_or(false),
                is_active: self.is_active.unwrap_or(true),
            }),
            _ => Err(errors.into()),
        }
    }

    /// A changed quantity or price without an explicit `sub_total` recomputes it.
    fn overlay(self, base: PurchaseOrderFields) -> PurchaseOrderFields {
        let reprice = self.quantity.is_some() || self.unit_price.is_some();
        let quantity = self.quantity.unwrap_or(base.quantity);
        let unit_price = self.unit_price.unwrap_or(base.unit_price);
        let sub_total = match self.sub_total {
            Some(sub_total) => sub_total,
            None if reprice => line_total(quantity, unit_price),
            None => base.sub_total,
        };

        PurchaseOrderFields {
            product: self.product.unwrap_or(base.product),
            supplier: self.supplier.unwrap_or(base.supplier),
            quantity,
            unit_price,
            sub_total,
            required_date: self.required_date.unwrap_or(base.required_date),
            is_cancelled: self.is_cancelled.unwrap_or(base.is_cancelled),
            is_active: self.is_active.unwrap_or(base.is_active),
        }
    }
}
