use std::cmp::Ordering;

use tillpoint_auth::ResourceKind;
use tillpoint_core::{CategoryId, FieldErrors, UnitId};
use tillpoint_infra::{by_name, InMemoryRecordStore};
use tillpoint_products::{Product, ProductFields};

use crate::app::resource::{check_exists, parse_id_list, QueryParams, Resource};
use crate::app::services::AppServices;

pub struct Products;

/// `?unit=<id>,<id>&categories=<id>,<id>`: any listed id matches within a
/// parameter, every supplied parameter must match.
#[derive(Debug, Default)]
pub struct ProductFilter {
    units: Option<Vec<UnitId>>,
    categories: Option<Vec<CategoryId>>,
}

impl Resource for Products {
    type Record = Product;
    type Filter = ProductFilter;

    const KIND: ResourceKind = ResourceKind::Product;

    fn store(services: &AppServices) -> &InMemoryRecordStore<Product> {
        &services.products
    }

    fn parse_filter(params: &QueryParams) -> Result<ProductFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let units = parse_id_list(params, "unit", &mut errors);
        let categories = parse_id_list(params, "categories", &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ProductFilter { units, categories })
    }

    fn matches(filter: &ProductFilter, product: &Product) -> bool {
        let unit_ok = filter
            .units
            .as_ref()
            .is_none_or(|units| units.contains(&product.unit()));
        let category_ok = filter.categories.as_ref().is_none_or(|wanted| {
            product.categories().iter().any(|c| wanted.contains(c))
        });
        unit_ok && category_ok
    }

    fn order(a: &Product, b: &Product) -> Ordering {
        by_name(Product::name)(a, b)
    }

    fn check_references(services: &AppServices, fields: &ProductFields, errors: &mut FieldErrors) {
        check_exists(errors, "unit", &services.units, &fields.unit);
        for category in &fields.categories {
            check_exists(errors, "categories", &services.categories, category);
        }
    }
}
