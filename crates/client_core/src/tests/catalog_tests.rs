use super::*;
use crate::{
    cart::CartLedger,
    test_support::{id, lesson},
};

fn held(catalog: &mut CatalogCache, cart: &mut Cart, raw: u64, seats: usize) {
    let mut ledger = CartLedger::new(cart, catalog);
    for _ in 0..seats {
        ledger.add(&id(raw)).expect("seat");
    }
}

#[test]
fn listing_keeps_server_order() {
    let catalog = CatalogCache::from_lessons(vec![
        lesson(3, "Music", "Bath", 50.0, 1),
        lesson(1, "Math", "London", 100.0, 2),
    ]);
    let ids: Vec<_> = catalog.listed().map(|l| l.id.clone()).collect();
    assert_eq!(ids, vec![id(3), id(1)]);
    assert_eq!(catalog.len(), 2);
}

#[test]
fn duplicate_ids_in_listing_keep_first() {
    let catalog = CatalogCache::from_lessons(vec![
        lesson(1, "Math", "London", 100.0, 2),
        lesson(1, "Math again", "Leeds", 10.0, 9),
    ]);
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get(&id(1)).expect("lesson").subject, "Math");
}

#[test]
fn refetch_subtracts_seats_held_by_cart() {
    let mut catalog = CatalogCache::from_lessons(vec![lesson(1, "Math", "London", 100.0, 5)]);
    let mut cart = Cart::default();
    held(&mut catalog, &mut cart, 1, 2);

    let released = catalog.apply_listing(vec![lesson(1, "Math", "London", 100.0, 5)], &mut cart);

    assert!(released.is_empty());
    assert_eq!(catalog.get(&id(1)).expect("lesson").spaces, 3);
    assert_eq!(cart.count_of(&id(1)), 2);
}

#[test]
fn refetch_releases_holds_the_server_cannot_cover() {
    let mut catalog = CatalogCache::from_lessons(vec![lesson(1, "Math", "London", 100.0, 4)]);
    let mut cart = Cart::default();
    held(&mut catalog, &mut cart, 1, 3);

    let released = catalog.apply_listing(vec![lesson(1, "Math", "London", 100.0, 1)], &mut cart);

    assert_eq!(
        released,
        vec![ReleasedHold {
            lesson_id: id(1),
            released: 2,
        }]
    );
    assert_eq!(cart.count_of(&id(1)), 1);
    assert_eq!(catalog.get(&id(1)).expect("lesson").spaces, 0);
}

#[test]
fn held_lessons_survive_a_narrowed_listing() {
    let mut catalog = CatalogCache::from_lessons(vec![
        lesson(1, "Math", "London", 100.0, 4),
        lesson(2, "Art", "Oxford", 80.0, 4),
    ]);
    let mut cart = Cart::default();
    held(&mut catalog, &mut cart, 2, 1);

    catalog.apply_listing(vec![lesson(1, "Math", "London", 100.0, 4)], &mut cart);

    let listed: Vec<_> = catalog.listed().map(|l| l.id.clone()).collect();
    assert_eq!(listed, vec![id(1)]);
    let art = catalog.get(&id(2)).expect("held lesson retained");
    assert_eq!(art.spaces, 3);
}

#[test]
fn unheld_lessons_outside_listing_are_dropped() {
    let mut catalog = CatalogCache::from_lessons(vec![
        lesson(1, "Math", "London", 100.0, 4),
        lesson(2, "Art", "Oxford", 80.0, 4),
    ]);
    catalog.apply_listing(vec![lesson(1, "Math", "London", 100.0, 4)], &mut Cart::default());
    assert!(catalog.get(&id(2)).is_none());
}

#[test]
fn rating_updates_known_lessons_only() {
    let mut catalog = CatalogCache::from_lessons(vec![lesson(1, "Math", "London", 100.0, 4)]);
    assert!(catalog.set_rating(&id(1), 5));
    assert!(!catalog.set_rating(&id(9), 5));
    assert_eq!(catalog.get(&id(1)).expect("lesson").rating, Some(5));
}
