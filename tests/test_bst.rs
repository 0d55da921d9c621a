use ordered_collections::bst::BstMap;
use rand::Rng;
use std::collections::BTreeMap;

#[test]
fn test_random_operations_match_btreemap() {
    let mut rng = rand::thread_rng();
    let mut map = BstMap::new();
    let mut expected: BTreeMap<u32, u32> = BTreeMap::new();

    for _ in 0..10_000 {
        let key = rng.gen_range(0, 2000);
        if rng.gen::<bool>() {
            let value = rng.gen::<u32>();
            assert_eq!(
                map.insert(key, value),
                expected.insert(key, value).map(|old| (key, old)),
            );
        } else {
            assert_eq!(map.remove(&key), expected.remove(&key).map(|old| (key, old)));
        }
        assert_eq!(map.len(), expected.len());
    }

    let actual = map.iter().map(|(key, value)| (*key, *value)).collect::<Vec<(u32, u32)>>();
    let wanted = expected
        .into_iter()
        .collect::<Vec<(u32, u32)>>();
    assert_eq!(actual, wanted);
}

#[test]
fn test_iteration_strictly_ascending() {
    let mut rng = rand::thread_rng();
    let mut map = BstMap::new();
    for _ in 0..1000 {
        map.insert(rng.gen::<u32>(), ());
    }

    let keys = map.iter().map(|(key, _)| *key).collect::<Vec<u32>>();
    assert!(keys.windows(2).all(|window| window[0] < window[1]));
}

#[test]
fn test_remove_then_find_is_end() {
    let mut map = BstMap::new();
    for key in &[5, 2, 8, 1, 3, 7, 9] {
        map.insert(*key, *key);
    }

    assert_eq!(map.remove(&5), Some((5, 5)));
    assert!(map.find(&5).is_end());
    assert_eq!(map.remove(&5), None);
    assert_eq!(
        map.iter().map(|(key, _)| *key).collect::<Vec<u32>>(),
        vec![1, 2, 3, 7, 8, 9],
    );
}

#[test]
fn test_clear_is_idempotent() {
    let mut map = BstMap::new();
    map.insert(1, 1);
    map.clear();
    assert!(map.is_empty());
    map.clear();
    assert!(map.is_empty());
}

#[test]
fn test_balance_diagnostic() {
    let mut sorted = BstMap::new();
    for key in 0..64 {
        sorted.insert(key, key);
    }
    // Sorted insertion builds a chain.
    assert!(!sorted.is_balanced());

    let mut bushy = BstMap::new();
    for key in &[4, 2, 6, 1, 3, 5, 7] {
        bushy.insert(*key, *key);
    }
    assert!(bushy.is_balanced());
}
