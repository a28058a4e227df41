//! Property tests for dot-path operations.

use proptest::prelude::*;

use confdir::Value;
use confdir::value::{Table, dot_get, dot_remove, dot_set};

fn keys() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9]{0,5}", 1..5).prop_map(|segments| segments.join("."))
}

proptest! {
    #[test]
    fn set_then_get_returns_the_value(key in keys(), n in any::<i64>()) {
        let mut table = Table::new();
        dot_set(&mut table, &key, Value::Integer(n));
        prop_assert_eq!(dot_get(&table, &key), Some(&Value::Integer(n)));
    }

    #[test]
    fn remove_then_get_returns_none(key in keys(), n in any::<i64>()) {
        let mut table = Table::new();
        dot_set(&mut table, &key, Value::Integer(n));
        prop_assert!(dot_remove(&mut table, &key).is_some());
        prop_assert_eq!(dot_get(&table, &key), None);
    }

    #[test]
    fn sibling_keys_survive_overwrites(key in keys(), a in any::<i64>(), b in any::<i64>()) {
        let sibling = format!("{key}.left");
        let target = format!("{key}.right");

        let mut table = Table::new();
        dot_set(&mut table, &sibling, Value::Integer(a));
        dot_set(&mut table, &target, Value::Integer(b));
        dot_set(&mut table, &target, Value::Integer(a));

        prop_assert_eq!(dot_get(&table, &sibling), Some(&Value::Integer(a)));
        prop_assert_eq!(dot_get(&table, &target), Some(&Value::Integer(a)));
    }

    #[test]
    fn deeper_set_replaces_a_scalar_prefix(key in keys(), n in any::<i64>()) {
        let deeper = format!("{key}.inner");

        let mut table = Table::new();
        dot_set(&mut table, &key, Value::Integer(n));
        dot_set(&mut table, &deeper, Value::Integer(n));

        prop_assert_eq!(dot_get(&table, &deeper), Some(&Value::Integer(n)));
        prop_assert!(matches!(dot_get(&table, &key), Some(Value::Table(_))));
    }
}
