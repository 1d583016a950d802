use std::cmp::Ordering;

use tillpoint_auth::ResourceKind;
use tillpoint_infra::{by_name, InMemoryRecordStore};
use tillpoint_products::Category;

use crate::app::resource::Resource;
use crate::app::services::AppServices;

pub struct Categories;

impl Resource for Categories {
    type Record = Category;
    type Filter = ();

    const KIND: ResourceKind = ResourceKind::Category;

    fn store(services: &AppServices) -> &InMemoryRecordStore<Category> {
        &services.categories
    }

    fn order(a: &Category, b: &Category) -> Ordering {
        by_name(Category::name)(a, b)
    }
}
