//! Property tests for cart merging and the search pipeline.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use voyage_commerce::prelude::*;
use voyage_commerce::search::SortRegistry;

#[derive(Debug, Clone)]
struct Row {
    id: usize,
    group: String,
    price: f64,
}

fn rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec((0..4u8, 0..50u32), 0..40).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(id, (group, price))| Row {
                id,
                group: format!("g{group}"),
                price: f64::from(price),
            })
            .collect()
    })
}

fn config() -> CatalogConfig<Row> {
    CatalogConfig::new("rows")
        .facet(Facet::exact("group", "Group", |r: &Row| r.group.as_str()))
        .facet(Facet::at_most("price", "Max price", |r: &Row| r.price))
        .sorts(
            SortRegistry::new()
                .ascending(SortOption::PriceAsc, |r: &Row| r.price)
                .descending(SortOption::PriceDesc, |r: &Row| r.price),
        )
}

fn add_request(id: u8, variant: Option<u8>, qty: Option<u32>) -> NewCartItem {
    let mut item = NewCartItem::new(format!("item-{id}"), "Thing", Money::new(1000, Currency::USD));
    if let Some(v) = variant {
        item = item.with_variant(format!("v{v}"), format!("Variant {v}"));
    }
    item.qty = qty;
    item
}

proptest! {
    #[test]
    fn merging_never_duplicates_keys(
        adds in prop::collection::vec((0..3u8, prop::option::of(0..2u8), prop::option::of(0..5u32)), 1..30)
    ) {
        let cart = CartStore::new();
        let mut expected: BTreeMap<(u8, Option<u8>), u64> = BTreeMap::new();
        for (id, variant, qty) in adds {
            cart.add_to_cart(add_request(id, variant, qty));
            *expected.entry((id, variant)).or_default() += u64::from(qty.unwrap_or(1).max(1));
        }

        prop_assert_eq!(cart.line_count(), expected.len());
        prop_assert_eq!(cart.item_count(), expected.values().sum::<u64>());
        for item in cart.items() {
            prop_assert!(item.qty >= 1);
        }
    }

    #[test]
    fn quantity_never_drops_below_one(qty in -20i64..20) {
        let cart = CartStore::new();
        cart.add_to_cart(add_request(1, None, Some(3)));
        cart.update_qty(&ItemId::new("item-1"), qty, None);

        let expected = if qty >= 1 { qty as u32 } else { 3 };
        prop_assert_eq!(cart.items()[0].qty, expected);
    }

    #[test]
    fn removal_only_touches_its_line(variant in 0..2u8) {
        let cart = CartStore::new();
        cart.add_to_cart(add_request(1, Some(0), None));
        cart.add_to_cart(add_request(1, Some(1), None));
        cart.add_to_cart(add_request(2, None, None));

        let removed = VariantId::new(format!("v{variant}"));
        prop_assert!(cart.remove_from_cart(&ItemId::new("item-1"), Some(&removed)));
        prop_assert_eq!(cart.line_count(), 2);
        prop_assert!(cart.items().iter().all(|i| i.variant_id.as_ref() != Some(&removed)));
    }

    #[test]
    fn relaxing_a_filter_never_shrinks_results(rows in rows(), group in 0..4u8, max in 0..50u32) {
        let config = config();
        let both = SearchState::default()
            .with_filter("group", Filter::equals(format!("g{group}")))
            .with_filter("price", Filter::at_most(f64::from(max)));
        let relaxed = both.clone().with_filter("price", Filter::Any);

        let narrow = config.derive(&rows, &both).pagination.total;
        let wide = config.derive(&rows, &relaxed).pagination.total;
        prop_assert!(narrow <= wide);

        for row in config.derive(&rows, &both).items {
            prop_assert_eq!(&row.group, &format!("g{group}"));
            prop_assert!(row.price <= f64::from(max));
        }
    }

    #[test]
    fn price_sort_is_stable(rows in rows()) {
        let results = config().derive(&rows, &SearchState::default().with_sort(SortOption::PriceAsc));
        for pair in results.items.windows(2) {
            prop_assert!(pair[0].price <= pair[1].price);
            if pair[0].price == pair[1].price {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn pages_cover_every_match_once(rows in rows(), size in 1..10usize) {
        let config = config().paginated(size);
        let state = config.default_state().with_sort(SortOption::PriceDesc);
        let all = config.derive(&rows, &state);
        let pages = all.pagination.total_pages;

        let mut seen = Vec::new();
        for page in 1..=pages {
            let results = config.derive(&rows, &state.clone().with_page(page));
            prop_assert!(results.len() <= size);
            seen.extend(results.items.iter().map(|r| r.id));
        }
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..rows.len()).collect::<Vec<_>>());
    }

    #[test]
    fn reset_restores_the_unfiltered_view(rows in rows(), group in 0..4u8, page in 1..5usize) {
        let total = rows.len();
        let mut session = SearchSession::new(Arc::new(config().paginated(3)), rows);
        session.set_filter("group", Filter::equals(format!("g{group}")));
        session.set_page(page);

        let before = session.revision();
        session.reset_filters();
        prop_assert!(session.revision() <= before + 1);
        prop_assert_eq!(session.state().page, 1);
        prop_assert!(!session.state().has_active_filters());
        prop_assert_eq!(session.total(), total);
    }
}
