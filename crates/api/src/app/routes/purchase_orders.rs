use std::cmp::Ordering;

use tillpoint_auth::ResourceKind;
use tillpoint_core::FieldErrors;
use tillpoint_infra::{newest_first, InMemoryRecordStore};
use tillpoint_purchasing::{PurchaseOrder, PurchaseOrderFields};

use crate::app::resource::{check_exists, Resource};
use crate::app::services::AppServices;

/// Managers and above only, reads included.
pub struct PurchaseOrders;

impl Resource for PurchaseOrders {
    type Record = PurchaseOrder;
    type Filter = ();

    const KIND: ResourceKind = ResourceKind::PurchaseOrder;

    fn store(services: &AppServices) -> &InMemoryRecordStore<PurchaseOrder> {
        &services.purchase_orders
    }

    fn order(a: &PurchaseOrder, b: &PurchaseOrder) -> Ordering {
        newest_first(a, b)
    }

    fn check_references(
        services: &AppServices,
        fields: &PurchaseOrderFields,
        errors: &mut FieldErrors,
    ) {
        check_exists(errors, "product", &services.products, &fields.product);
        check_exists(errors, "supplier", &services.suppliers, &fields.supplier);
    }
}
