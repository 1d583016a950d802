use std::cmp::Ordering;

use tillpoint_auth::ResourceKind;
use tillpoint_infra::{by_name, InMemoryRecordStore};
use tillpoint_products::Unit;

use crate::app::resource::Resource;
use crate::app::services::AppServices;

pub struct Units;

impl Resource for Units {
    type Record = Unit;
    type Filter = ();

    const KIND: ResourceKind = ResourceKind::Unit;

    fn store(services: &AppServices) -> &InMemoryRecordStore<Unit> {
        &services.units
    }

    fn order(a: &Unit, b: &Unit) -> Ordering {
        by_name(Unit::name)(a, b)
    }
}
