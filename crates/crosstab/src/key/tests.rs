use crate::{
    error::KeyError,
    key::{CompositeKey, KeyComponent, PositionOrder},
    types::Date,
    value::{Value, ValueKind},
};
use proptest::prelude::*;
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

fn key(values: Vec<Value>) -> CompositeKey {
    CompositeKey::from_values(values).expect("test key arity")
}

fn pattern(components: Vec<KeyComponent>) -> CompositeKey {
    CompositeKey::new(components).expect("test pattern arity")
}

fn hash_of(key: &CompositeKey) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        "[a-zA-Z0-9]{0,8}".prop_map(Value::Text),
        (-100_000i32..100_000).prop_map(|days| Value::Date(Date::from_days(days))),
    ]
}

fn arb_key() -> impl Strategy<Value = CompositeKey> {
    prop::collection::vec(arb_value(), 2..=5).prop_map(key)
}

#[test]
fn construction_rejects_out_of_range_arity() {
    assert_eq!(
        CompositeKey::from_values(vec![1i64]).unwrap_err(),
        KeyError::UnsupportedArity { arity: 1 }
    );
    assert_eq!(
        CompositeKey::from_values(vec![1i64, 2, 3, 4, 5, 6]).unwrap_err(),
        KeyError::UnsupportedArity { arity: 6 }
    );
    assert!(CompositeKey::from_values(vec![1i64, 2]).is_ok());
    assert!(CompositeKey::from_values(vec![1i64, 2, 3, 4, 5]).is_ok());
}

#[test]
fn component_access_is_bounds_checked() {
    let k = key(vec![Value::Int(1), Value::Text("x".to_string())]);
    assert!(k.component(1).is_ok());
    assert_eq!(
        k.component(2).unwrap_err(),
        KeyError::IndexOutOfBounds { index: 2, arity: 2 }
    );
}

#[test]
fn wildcard_inspection_reports_positions_in_order() {
    let k = pattern(vec![
        KeyComponent::Wildcard(ValueKind::Text),
        KeyComponent::Value(Value::Int(3)),
        KeyComponent::Wildcard(ValueKind::Int),
    ]);

    assert!(k.is_wildcard(0));
    assert!(!k.is_wildcard(1));
    assert!(k.is_wildcard(2));
    assert!(!k.is_wildcard(9));
    assert_eq!(k.first_wildcard(), Some(0));
    assert_eq!(k.wildcard_positions(), vec![0, 2]);
    assert_eq!(k.wildcard_count(), 2);
}

#[test]
fn fully_concrete_key_has_no_wildcards() {
    let k = key(vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(k.first_wildcard(), None);
    assert!(k.wildcard_positions().is_empty());
    assert_eq!(k.wildcard_count(), 0);
}

#[test]
fn with_component_replaces_matching_kind() {
    let k = key(vec![Value::Text("aspirin".to_string()), Value::Int(3)]);
    let replaced = k.with_component(0, Value::Text("statin".to_string())).unwrap();

    assert_eq!(replaced.value_at(0), Some(&Value::Text("statin".to_string())));
    // the original key is untouched
    assert_eq!(k.value_at(0), Some(&Value::Text("aspirin".to_string())));
}

#[test]
fn with_component_fills_a_wildcard_of_the_declared_kind() {
    let p = pattern(vec![
        KeyComponent::Wildcard(ValueKind::Text),
        KeyComponent::Value(Value::Int(1)),
    ]);
    let filled = p.with_component(0, Value::Text("b".to_string())).unwrap();
    assert_eq!(filled.first_wildcard(), None);
}

#[test]
fn with_component_rejects_kind_mismatch() {
    let k = key(vec![Value::Text("a".to_string()), Value::Int(1)]);
    assert_eq!(
        k.with_component(0, Value::Int(9)).unwrap_err(),
        KeyError::TypeMismatch {
            position: 0,
            expected: ValueKind::Text,
            found: ValueKind::Int,
        }
    );
}

#[test]
fn appended_grows_until_the_bound() {
    let mut k = key(vec![Value::Int(1), Value::Int(2)]);
    for n in 3i64..=5 {
        k = k.appended(Value::Int(n)).unwrap();
        assert_eq!(k.arity(), n as usize);
    }

    assert_eq!(
        k.appended(Value::Int(6)).unwrap_err(),
        KeyError::ArityExceeded { arity: 5 }
    );
    // the failed growth left the key unchanged
    assert_eq!(k.arity(), 5);
}

#[test]
fn matches_accepts_wildcards_and_equal_prefixes() {
    let k = key(vec![
        Value::Text("a".to_string()),
        Value::Text("x".to_string()),
        Value::Int(7),
    ]);

    let exact = pattern(vec![
        KeyComponent::Value(Value::Text("a".to_string())),
        KeyComponent::Value(Value::Text("x".to_string())),
        KeyComponent::Value(Value::Int(7)),
    ]);
    let wild = pattern(vec![
        KeyComponent::Wildcard(ValueKind::Text),
        KeyComponent::Value(Value::Text("x".to_string())),
        KeyComponent::Wildcard(ValueKind::Int),
    ]);
    let prefix = pattern(vec![
        KeyComponent::Value(Value::Text("a".to_string())),
        KeyComponent::Wildcard(ValueKind::Text),
    ]);

    assert!(k.matches(&exact));
    assert!(k.matches(&wild));
    assert!(k.matches(&prefix));
}

#[test]
fn matches_rejects_mismatch_and_absent_positions() {
    let k = key(vec![Value::Text("a".to_string()), Value::Int(7)]);

    let wrong = pattern(vec![
        KeyComponent::Value(Value::Text("b".to_string())),
        KeyComponent::Value(Value::Int(7)),
    ]);
    assert!(!k.matches(&wrong));

    // a wildcard beyond this key's arity does not match absence
    let longer = pattern(vec![
        KeyComponent::Value(Value::Text("a".to_string())),
        KeyComponent::Value(Value::Int(7)),
        KeyComponent::Wildcard(ValueKind::Int),
    ]);
    assert!(!k.matches(&longer));
}

#[test]
fn position_of_finds_first_structural_match() {
    let k = key(vec![Value::Int(5), Value::Int(9), Value::Int(5)]);
    assert_eq!(k.position_of(&Value::Int(5)), Some(0));
    assert_eq!(k.position_of(&Value::Int(9)), Some(1));
    assert_eq!(k.position_of(&Value::Int(42)), None);
}

#[test]
fn display_joins_components_with_commas() {
    let k = pattern(vec![
        KeyComponent::Value(Value::Text("warfarin".to_string())),
        KeyComponent::Wildcard(ValueKind::Int),
        KeyComponent::Value(Value::Date(Date::new_checked(2014, 7, 1).unwrap())),
    ]);
    assert_eq!(k.to_string(), "warfarin,*,2014-07-01");
}

#[test]
fn primary_cmp_orders_by_position_zero_only() {
    let low = key(vec![Value::Int(1), Value::Int(999)]);
    let high = key(vec![Value::Int(2), Value::Int(0)]);
    assert_eq!(low.primary_cmp(&high), std::cmp::Ordering::Less);
    assert_eq!(high.primary_cmp(&low), std::cmp::Ordering::Greater);
    assert_eq!(low.primary_cmp(&low), std::cmp::Ordering::Equal);
}

#[test]
fn position_order_sorts_null_low() {
    let order = PositionOrder::new(2);
    let mut keys = vec![
        key(vec![Value::Int(0), Value::Int(0), Value::Text("b".to_string())]),
        key(vec![Value::Int(0), Value::Int(0), Value::Text("a".to_string())]),
        // arity 2: no value at position 2, sorts first
        key(vec![Value::Int(9), Value::Int(9)]),
    ];
    order.sort(&mut keys);

    assert_eq!(keys[0].value_at(2), None);
    assert_eq!(keys[1].value_at(2), Some(&Value::Text("a".to_string())));
    assert_eq!(keys[2].value_at(2), Some(&Value::Text("b".to_string())));
}

#[test]
fn position_order_treats_wildcard_slots_as_absent() {
    let order = PositionOrder::new(0);
    let wild = pattern(vec![
        KeyComponent::Wildcard(ValueKind::Int),
        KeyComponent::Value(Value::Int(1)),
    ]);
    let concrete = key(vec![Value::Int(-100), Value::Int(1)]);

    assert_eq!(order.cmp(&wild, &concrete), std::cmp::Ordering::Less);
}

#[test]
fn serde_validates_arity_on_deserialize() {
    let k = key(vec![Value::Int(1), Value::Text("x".to_string())]);
    let json = serde_json::to_string(&k).unwrap();
    assert_eq!(serde_json::from_str::<CompositeKey>(&json).unwrap(), k);

    // a one-component list is rejected by the same arity rule as `new`
    let short = r#"[{"Value":{"Int":1}}]"#;
    assert!(serde_json::from_str::<CompositeKey>(short).is_err());
}

proptest! {
    #[test]
    fn structurally_equal_keys_hash_identically(k in arb_key()) {
        let rebuilt = CompositeKey::new(k.components().to_vec()).unwrap();
        prop_assert_eq!(&k, &rebuilt);
        prop_assert_eq!(hash_of(&k), hash_of(&rebuilt));
    }

    #[test]
    fn replace_with_current_value_round_trips(k in arb_key(), index in 0usize..5) {
        let index = index % k.arity();
        let current = k.value_at(index).unwrap().clone();
        let replaced = k.with_component(index, current).unwrap();
        prop_assert_eq!(replaced, k);
    }

    #[test]
    fn appended_increments_arity_below_the_bound(k in arb_key(), v in any::<i64>()) {
        let arity = k.arity();
        match k.appended(Value::Int(v)) {
            Ok(grown) => {
                prop_assert!(arity < 5);
                prop_assert_eq!(grown.arity(), arity + 1);
            }
            Err(err) => {
                prop_assert_eq!(arity, 5);
                prop_assert_eq!(err, KeyError::ArityExceeded { arity: 5 });
            }
        }
    }

    #[test]
    fn every_key_matches_itself(k in arb_key()) {
        prop_assert!(k.matches(&k));
    }
}
