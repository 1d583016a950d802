use std::cmp::Ordering;

use tillpoint_auth::ResourceKind;
use tillpoint_infra::{by_name, InMemoryRecordStore};
use tillpoint_parties::Customer;

use crate::app::resource::Resource;
use crate::app::services::AppServices;

pub struct Customers;

impl Resource for Customers {
    type Record = Customer;
    type Filter = ();

    const KIND: ResourceKind = ResourceKind::Customer;

    fn store(services: &AppServices) -> &InMemoryRecordStore<Customer> {
        &services.customers
    }

    fn order(a: &Customer, b: &Customer) -> Ordering {
        by_name(Customer::name)(a, b)
    }
}
