//! End-to-end flows across catalog, search, and cart.

use std::sync::Arc;
use std::time::Duration;
use voyage_commerce::catalog::parse_listings;
use voyage_commerce::prelude::*;

const TOURS: &str = r#"[
    {"id": 1, "name": "Alps Trek", "destination": "Chamonix", "category": "adventure", "price": 120, "rating": 4.8, "durationDays": 6, "startDate": "2025-07-14"},
    {"id": 2, "name": "Paris Food Walk", "destination": "Paris", "category": "food", "price": 45.5, "rating": 4.6, "durationDays": 1},
    {"id": 3, "name": "Nile Cruise", "destination": "Luxor", "category": "cruise", "price": 80, "rating": 4.1, "durationDays": 4},
    {"id": 4, "name": "Paris by Night", "destination": "Paris", "category": "sightseeing", "price": 30, "rating": 4.3, "durationDays": 1}
]"#;

fn usd(amount: f64) -> Money {
    Money::from_decimal(amount, Currency::USD)
}

#[test]
fn search_then_book_then_checkout() {
    let tours: Vec<Tour> = parse_listings(TOURS).unwrap();
    let mut session = SearchSession::new(Arc::new(Tour::config()), tours);

    session.set_filter_input("q", "paris").unwrap();
    session.set_sort(SortOption::PriceAsc);
    let results = session.results();
    let names: Vec<_> = results.items.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Paris by Night", "Paris Food Walk"]);

    let cart = CartStore::new();
    for tour in &results.items {
        cart.add_to_cart(tour.to_cart_item(Currency::USD));
    }
    cart.add_to_cart(results.items[0].to_cart_item(Currency::USD));
    assert_eq!(cart.line_count(), 2);
    assert_eq!(cart.item_count(), 3);

    // 30 * 2 + 45.50 = 105.50, under the free shipping threshold.
    let totals = cart.totals(&PricingPolicy::default()).unwrap();
    assert_eq!(totals.subtotal, usd(105.5));
    assert_eq!(totals.shipping, usd(50.0));
    assert_eq!(totals.tax, Money::new(528, Currency::USD));
    assert_eq!(totals.total, Money::new(16078, Currency::USD));

    let settled = cart.checkout(&PricingPolicy::default()).unwrap();
    assert_eq!(settled.total, totals.total);
    assert!(cart.is_empty());
    assert!(matches!(
        cart.checkout(&PricingPolicy::default()),
        Err(CommerceError::EmptyCart)
    ));
}

#[test]
fn worked_example_with_promo_codes() {
    let cart = CartStore::new();
    cart.add_to_cart(NewCartItem::new("a", "Backpack", usd(100.0)).with_qty(2));
    cart.add_to_cart(NewCartItem::new("b", "Bottle", usd(25.0)).with_variant("blue", "Blue"));
    cart.add_to_cart(NewCartItem::new("b", "Bottle", usd(25.0)).with_variant("red", "Red"));

    let policy = PricingPolicy::default();
    let totals = cart.totals(&policy).unwrap();
    assert_eq!(totals.subtotal, usd(250.0));
    assert!(totals.ships_free());
    assert_eq!(totals.total, usd(262.5));

    let promos = PromoTable::default();
    cart.apply_promo("save10", &promos).unwrap();
    assert_eq!(cart.totals(&policy).unwrap().total, usd(237.5));

    assert!(cart.apply_promo("BOGUS", &promos).is_err());
    assert_eq!(cart.promo().map(|p| p.code), Some("SAVE10".to_string()));

    cart.remove_from_cart(&ItemId::new("a"), None);
    cart.apply_promo("FREESHIP", &promos).unwrap();
    let totals = cart.totals(&policy).unwrap();
    assert_eq!(totals.shipping, usd(50.0));
    assert_eq!(totals.discount, usd(50.0));
    assert_eq!(totals.total, usd(52.5));
}

#[test]
fn snapshot_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("cart.json");

    let cart = CartStore::new();
    cart.add_to_cart(NewCartItem::new(7u64, "VPS Standard", usd(12.0)).with_variant("fra", "Frankfurt"));
    cart.update_qty(&ItemId::from(7u64), 3, Some(&VariantId::new("fra")));
    cart.apply_promo("SAVE10", &PromoTable::default()).unwrap();
    cart.to_snapshot().save(&path).unwrap();

    let restored = CartStore::new();
    restored.restore(CartSnapshot::load(&path).unwrap()).unwrap();
    assert_eq!(restored.items(), cart.items());
    assert_eq!(restored.promo(), cart.promo());
    assert_eq!(restored.revision(), 1);
}

#[tokio::test]
async fn subscribers_see_each_change_once() {
    let cart = CartStore::new();
    let mut rx = cart.subscribe();
    let handle = cart.clone();

    handle.add_to_cart(NewCartItem::new("x", "Map", usd(5.0)));
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().items.len(), 1);

    // Rejected input does not notify.
    handle.update_qty(&ItemId::new("x"), 0, None);
    assert!(!rx.has_changed().unwrap());

    handle.clear_cart();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().items.is_empty());
}

#[tokio::test(start_paused = true)]
async fn debounced_search_box() {
    let tours: Vec<Tour> = parse_listings(TOURS).unwrap();
    let mut session = SearchSession::new(Arc::new(Tour::config()), tours);
    let (search_box, mut queries) = Debouncer::spawn(voyage_commerce::search::DEFAULT_DEBOUNCE);

    for typed in ["n", "ni", "nil", "nile"] {
        search_box.push(typed.to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let query = queries.recv().await.unwrap();
    let revision = session.revision();
    session.set_filter("q", Filter::contains(query));
    assert_eq!(session.revision(), revision + 1);
    assert_eq!(session.total(), 1);
    assert_eq!(session.results().items[0].name, "Nile Cruise");
}
