use std::cmp::Ordering;

use tillpoint_auth::ResourceKind;
use tillpoint_infra::{by_name, InMemoryRecordStore};
use tillpoint_parties::Supplier;

use crate::app::resource::Resource;
use crate::app::services::AppServices;

pub struct Suppliers;

impl Resource for Suppliers {
    type Record = Supplier;
    type Filter = ();

    const KIND: ResourceKind = ResourceKind::Supplier;

    fn store(services: &AppServices) -> &InMemoryRecordStore<Supplier> {
        &services.suppliers
    }

    fn order(a: &Supplier, b: &Supplier) -> Ordering {
        by_name(Supplier::name)(a, b)
    }
}
