//! Universal invariants (spec §8) exercised independently of the end-to-end
//! scenarios in `scenarios.rs`.

use std::cell::RefCell;
use std::rc::Rc;

use docmodel::{to_delete, to_sync, to_update, Node};
use serde_json::json;

use crate::fixtures::{Equipment, Player};

#[test]
fn clean_root_emits_empty_everything() {
    let player = Player::new();
    assert!(!player.any_updated());
    assert!(!player.any_deleted());
    assert_eq!(to_update(&player).into_json(), json!({}));
    assert_eq!(to_sync(&player), json!({}));
    assert_eq!(to_delete(&player), json!({}));
}

#[test]
fn reset_returns_to_clean_state() {
    let mut player = Player::new();
    player.set_uid(1);
    player.wallet_mut().set_coin_total(5);
    player.equipments().put("A".to_string(), Rc::new(RefCell::new(Equipment::new(1))));
    player.items_mut().put(1, 1);
    assert!(player.any_updated());

    player.reset();
    assert!(!player.any_updated());
    assert!(!player.any_deleted());
    assert_eq!(to_update(&player).into_json(), json!({}));
}

#[test]
fn minimality_setting_then_reverting_a_field_yields_no_update() {
    let mut player = Player::new();
    player.set_uid(7);
    player.reset();

    player.set_uid(99);
    player.set_uid(7); // back to the loaded/reset value
    assert!(!player.any_updated(), "flipping a field back to its prior value must not dirty it");
    assert_eq!(to_update(&player).into_json(), json!({}));
}

#[test]
fn path_correctness_for_every_node_shape() {
    let mut player = Player::new();
    assert_eq!(player.xpath().value(), "");
    assert_eq!(player.wallet().xpath().value(), "wlt");
    assert_eq!(player.items().xpath().value(), "itm");
    assert_eq!(player.cash_info().xpath().value(), "cs");
    assert_eq!(player.cash_info().stages().xpath().value(), "cs.stg");

    let v = Rc::new(RefCell::new(Equipment::new(1)));
    player.equipments().put("XYZ".to_string(), Rc::clone(&v));
    assert_eq!(v.borrow().xpath().value(), "eqm.XYZ");
}

#[test]
fn map_updated_and_removed_keys_stay_disjoint_through_a_put_remove_put_cycle() {
    let mut player = Player::new();
    player.items_mut().put(1, 10);
    player.reset();

    player.items_mut().remove(&1);
    assert!(player.items().any_deleted());

    player.items_mut().put(1, 11);
    assert!(!player.items().any_deleted(), "re-inserting a removed key must clear the pending deletion");
    assert!(player.items().any_updated());
}

#[test]
fn object_map_put_then_remove_in_the_same_generation_emits_only_unset() {
    let player = Player::new();
    let v1 = Rc::new(RefCell::new(Equipment::new(1)));
    player.equipments().put("A".to_string(), Rc::clone(&v1));
    player.equipments().remove(&"A".to_string());

    let updates = to_update(&player).into_json();
    assert!(updates.get("$set").is_none());
    assert_eq!(updates["$unset"]["eqm.A"], "");
}

#[test]
fn loading_twice_is_idempotent() {
    let mut source = Player::new();
    source.set_uid(42);
    source.wallet_mut().set_coin_total(100);
    source.items_mut().put(1, 1);
    source.equipments().put("A".to_string(), Rc::new(RefCell::new(Equipment::new(5))));
    source.reset();
    let doc = source.to_document_value();

    let mut target = Player::new();
    target.load_document(doc.as_object().unwrap()).unwrap();
    let first = target.to_document_value();
    target.load_document(doc.as_object().unwrap()).unwrap();
    let second = target.to_document_value();
    assert_eq!(first, second);
    assert!(!target.any_updated());
}

#[test]
fn load_document_surfaces_type_mismatch_and_does_not_panic() {
    let mut doc = serde_json::Map::new();
    doc.insert("uid".to_string(), json!("not-a-number"));
    let mut player = Player::new();
    let err = player.load_document(&doc).unwrap_err();
    assert!(err.is_type_mismatch());
}

#[test]
fn load_document_skips_unparseable_integer_map_keys() {
    let mut doc = serde_json::Map::new();
    let mut items = serde_json::Map::new();
    items.insert("2001".to_string(), json!(5));
    items.insert("not-an-int".to_string(), json!(9));
    doc.insert("itm".to_string(), serde_json::Value::Object(items));

    let mut player = Player::new();
    player.load_document(&doc).unwrap();
    assert_eq!(player.items().get(&2001), Some(&5));
    assert_eq!(player.items().len(), 1);
}
