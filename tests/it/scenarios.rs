//! End-to-end scenarios A-F (spec §8), run against the `Player` fixture.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{TimeZone, Utc};
use docmodel::{to_document_json, to_update, Node};
use serde_json::json;

use crate::fixtures::{Equipment, Player};

fn t1() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn t2() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_003_600, 0).unwrap()
}

/// Builds the state at the end of Scenario A: inserted, reset, clean.
fn scenario_a_player() -> Player {
    let mut player = Player::new();
    player.set_uid(123);
    player.wallet_mut().set_coin_total(5000);
    player.wallet_mut().set_coin_used(2000);
    player.wallet_mut().set_diamond(10);
    player.equipments().put("A".to_string(), Rc::new(RefCell::new(Equipment::new(100))));
    player.equipments().put("B".to_string(), Rc::new(RefCell::new(Equipment::new(100))));
    player.items_mut().put(2001, 10);
    player.items_mut().put(2002, 1);
    player.set_update_version(1);
    player.set_create_time(t1());
    player.set_update_time(t1());
    player.reset();
    player
}

#[test]
fn scenario_a_insert() {
    let player = scenario_a_player();

    assert!(!player.any_updated());
    assert_eq!(to_update(&player).into_json(), json!({}));

    let doc = player.to_document_value();
    assert_eq!(doc["uid"], 123);
    assert_eq!(doc["wlt"], json!({"ct": 5000, "cu": 2000, "d": 10}));
    assert_eq!(doc["eqm"], json!({"A": {"hp": 100}, "B": {"hp": 100}}));
    assert_eq!(doc["itm"], json!({"2001": 10, "2002": 1}));
    assert_eq!(doc["_uv"], 1);

    // JSON wrapper renders the same document.
    let via_json: serde_json::Value = serde_json::from_str(&to_document_json(&player)).unwrap();
    assert_eq!(via_json, doc);
}

#[test]
fn scenario_b_incremental_update() {
    let mut player = scenario_a_player();

    player.wallet_mut().set_coin_total(5200);
    player.wallet_mut().set_coin_used(2100);
    player.wallet_mut().set_diamond(11);

    player.equipments().remove(&"A".to_string());
    player.equipments().get(&"B".to_string()).unwrap().borrow_mut().set_hp(20);
    player.equipments().put("C".to_string(), Rc::new(RefCell::new(Equipment::new(30))));

    player.items_mut().put(2001, 12);
    player.items_mut().put(2002, 0);
    player.items_mut().put(2003, 1);

    player.set_update_version(2);
    player.set_update_time(t2());

    let updates = to_update(&player).into_json();
    let set = &updates["$set"];
    assert_eq!(set["wlt.ct"], 5200);
    assert_eq!(set["wlt.cu"], 2100);
    assert_eq!(set["wlt.d"], 11);
    assert_eq!(set["eqm.B.hp"], 20);
    assert_eq!(set["eqm.C"], json!({"hp": 30}));
    assert_eq!(set["itm.2001"], 12);
    assert_eq!(set["itm.2002"], 0);
    assert_eq!(set["itm.2003"], 1);
    assert_eq!(set["_uv"], 2);
    assert_eq!(set["_ut"], docmodel::DateTimeType::to_document_value(&t2()));

    let unset = &updates["$unset"];
    assert_eq!(unset["eqm.A"], "");

    // Exactly the expected key sets, nothing extra: wlt.{ct,cu,d}, eqm.B.hp,
    // eqm.C, itm.{2001,2002,2003}, _uv, _ut.
    assert_eq!(set.as_object().unwrap().len(), 10);
    assert_eq!(unset.as_object().unwrap().len(), 1);
}

#[test]
fn scenario_c_map_replace_is_fully_updated_and_does_not_descend() {
    let player = scenario_a_player();
    // "B" already holds v1 from scenario A. Replace it with a fresh instance.
    let v2 = Rc::new(RefCell::new(Equipment::new(55)));
    player.equipments().put("B".to_string(), Rc::clone(&v2));

    let updates = to_update(&player).into_json();
    let set = updates["$set"].as_object().unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set["eqm.B"], json!({"hp": 55}));
    assert!(!set.contains_key("eqm.B.hp"));
}

#[test]
fn scenario_d_nested_delete_emits_only_unset() {
    let mut player = scenario_a_player();
    player.cash_info_mut().stages_mut().put(1, 5);
    player.reset();

    player.cash_info_mut().stages_mut().remove(&1);
    player.cash_info_mut().set_cards(None);

    let updates = to_update(&player).into_json();
    assert!(updates.get("$set").is_none());
    let unset = updates["$unset"].as_object().unwrap();
    assert_eq!(unset.len(), 2);
    assert_eq!(unset["cs.stg.1"], "");
    assert_eq!(unset["cs.cs"], "");
}

#[test]
fn scenario_e_load_round_trips_and_is_idempotent() {
    let player = scenario_a_player();
    let doc = player.to_document_value();

    let mut reloaded = Player::new();
    reloaded.load_document(doc.as_object().unwrap()).unwrap();
    assert_eq!(reloaded.to_document_value(), doc);
    assert!(!reloaded.any_updated());
    assert_eq!(to_update(&reloaded).into_json(), json!({}));

    // Loading the same document again is a no-op on the resulting shape.
    reloaded.load_document(doc.as_object().unwrap()).unwrap();
    assert_eq!(reloaded.to_document_value(), doc);
    assert!(!reloaded.any_updated());
}

#[test]
fn scenario_f_rebind_moves_ownership_between_maps() {
    use docmodel::ObjectMap;

    let m1: ObjectMap<String, Equipment> = ObjectMap::new(docmodel::Path::of("m1"));
    let m2: ObjectMap<String, Equipment> = ObjectMap::new(docmodel::Path::of("m2"));
    let v = Rc::new(RefCell::new(Equipment::new(1)));

    m1.put("k".to_string(), Rc::clone(&v));
    m1.reset();
    m2.put("k".to_string(), Rc::clone(&v));

    // v.parent() == M2, and M1 contains no entry for v (spec §8 Scenario F).
    assert_eq!(v.borrow().xpath().value(), "m2.k");
    assert!(m2.get(&"k".to_string()).is_some());
    assert!(m1.get(&"k".to_string()).is_none());

    // Both maps' change state stays internally consistent: m1's old path is a
    // pending deletion, m2's new path is a pending (fully-updated) write.
    let mut m1_updates = docmodel::Updates::new();
    m1.append_updates(&mut m1_updates);
    assert_eq!(m1_updates.into_json()["$unset"]["m1.k"], "");

    let mut m2_updates = docmodel::Updates::new();
    m2.append_updates(&mut m2_updates);
    assert_eq!(m2_updates.into_json()["$set"]["m2.k"], json!({"hp": 1}));
}
