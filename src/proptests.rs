use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, BTreeSet};

/// Checks every red-black invariant plus parent-link symmetry and returns the
/// black height.
pub(crate) fn validate_tree<T: Ord + fmt::Debug>(t: &RbTree<T>) -> usize {
    if t.root.is_nil() {
        assert!(t.nodes.is_empty(), "empty root with live arena nodes");
        return 0;
    }

    let root = t.node(t.root);
    assert!(root.parent.is_nil(), "root must not have a parent");
    assert_eq!(root.color, Color::Black, "root must be black");

    let mut reachable = 0usize;
    let mut leaf_black: Option<usize> = None;
    let mut stack: Vec<(NodeId, usize)> = vec![(t.root, 0)];

    while let Some((id, above)) = stack.pop() {
        reachable += 1;
        let node = t.node(id);
        let here = above + usize::from(node.color == Color::Black);

        for dir in [Dir::Left, Dir::Right] {
            let child_id = node.child(dir);
            if child_id.is_nil() {
                match leaf_black {
                    None => leaf_black = Some(here),
                    Some(expected) => assert_eq!(
                        here, expected,
                        "black count differs on path ending below {:?}",
                        node.value
                    ),
                }
                continue;
            }

            let child = t.node(child_id);
            assert_eq!(child.parent, id, "parent link must mirror child link");
            if node.color == Color::Red {
                assert_eq!(
                    child.color,
                    Color::Black,
                    "red node {:?} has a red child {:?}",
                    node.value,
                    child.value
                );
            }
            match dir {
                Dir::Left => assert!(child.value < node.value, "left child out of order"),
                Dir::Right => assert!(child.value > node.value, "right child out of order"),
            }
            stack.push((child_id, here));
        }
    }

    assert_eq!(reachable, t.len(), "reachable node count must match len");

    let values = t.in_order();
    assert!(
        values.windows(2).all(|w| w[0] < w[1]),
        "in-order traversal must be strictly ascending"
    );

    let height = leaf_black.unwrap_or(0);
    assert_eq!(t.black_height(), height);
    height
}

/// Keyed record: ordered by `key`, `payload` rides along.
#[derive(Clone, Debug)]
struct Entry {
    key: u16,
    payload: u32,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Borrow<u16> for Entry {
    fn borrow(&self) -> &u16 {
        &self.key
    }
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "0u16..512")] u16, u32),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "0u16..512")] u16),
    #[proptest(weight = 2)]
    Get(#[proptest(strategy = "0u16..512")] u16),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_btreemap(ops in prop::collection::vec(any::<Op>(), 0..=400)) {
        let mut t: RbTree<Entry> = RbTree::new();
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, payload) => {
                    let got = t.insert(Entry { key, payload });
                    if m.contains_key(&key) {
                        prop_assert_eq!(got, Err(IndexError::DuplicateKey));
                    } else {
                        prop_assert_eq!(got, Ok(()));
                        m.insert(key, payload);
                    }
                }
                Op::Remove(key) => {
                    let got = t.remove(&key).map(|e| e.payload);
                    match m.remove(&key) {
                        Some(payload) => prop_assert_eq!(got, Ok(payload)),
                        None => prop_assert_eq!(got, Err(IndexError::NotFound)),
                    }
                }
                Op::Get(key) => {
                    let got = t.get(&key).map(|e| e.payload);
                    let expected = if m.is_empty() {
                        Err(IndexError::EmptyContainer)
                    } else {
                        m.get(&key).copied().ok_or(IndexError::NotFound)
                    };
                    prop_assert_eq!(got, expected);
                    prop_assert_eq!(t.contains(&key), m.contains_key(&key));
                }
            }

            prop_assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }

        let got: Vec<(u16, u32)> = t.iter().map(|e| (e.key, e.payload)).collect();
        let expected: Vec<(u16, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_ordering_round_trip(keys in prop::collection::btree_set(any::<i64>(), 0..300), seed in any::<u64>()) {
        use rand::rngs::StdRng;
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let mut shuffled: Vec<i64> = keys.iter().copied().collect();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

        let t: RbTree<i64> = shuffled.into_iter().collect();
        validate_tree(&t);
        prop_assert_eq!(t.len(), keys.len());
        let got: Vec<i64> = t.iter().copied().collect();
        let expected: Vec<i64> = keys.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_failed_calls_leave_tree_unchanged(keys in prop::collection::vec(0u8..64, 1..64), probe in 64u8..=255) {
        let mut t: RbTree<u8> = RbTree::new();
        for k in &keys {
            let _ = t.insert(*k);
        }
        let before = t.clone();

        prop_assert_eq!(t.insert(keys[0]), Err(IndexError::DuplicateKey));
        prop_assert_eq!(t.remove(&probe), Err(IndexError::NotFound));
        prop_assert_eq!(t.get(&probe), Err(IndexError::NotFound));

        prop_assert_eq!(t.root, before.root);
        for (a, b) in t.nodes.iter().zip(before.nodes.iter()) {
            prop_assert_eq!(a.value, b.value);
            prop_assert_eq!(a.parent, b.parent);
            prop_assert_eq!(a.children, b.children);
            prop_assert_eq!(a.color, b.color);
        }
        prop_assert_eq!(t.nodes.len(), before.nodes.len());
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u32> = (1..=7).collect();

    for_each_permutation(&keys, |perm| {
        let mut t: RbTree<u32> = RbTree::new();
        for k in perm {
            t.insert(k).unwrap();
            validate_tree(&t);
        }
        let got: Vec<u32> = t.iter().copied().collect();
        assert_eq!(got, keys);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<u32> = (1..=7).collect();

    for_each_permutation(&keys, |perm| {
        let mut t: RbTree<u32> = keys.iter().copied().collect();
        let mut m: BTreeSet<u32> = keys.iter().copied().collect();

        for k in perm {
            assert_eq!(t.remove(&k), Ok(k));
            m.remove(&k);
            validate_tree(&t);
            let got: Vec<u32> = t.iter().copied().collect();
            let expected: Vec<u32> = m.iter().copied().collect();
            assert_eq!(got, expected);
        }
        assert!(t.is_empty());
    });
}

#[test]
fn exhaustive_remove_from_shuffled_builds() {
    // Every insert order of 6 keys, then remove the middle key: covers red and
    // black siblings on both sides.
    let keys: Vec<u32> = (1..=6).collect();

    for_each_permutation(&keys, |perm| {
        let mut t: RbTree<u32> = RbTree::new();
        for k in perm {
            t.insert(k).unwrap();
        }
        for k in [3, 1, 6] {
            assert_eq!(t.remove(&k), Ok(k));
            validate_tree(&t);
        }
        assert_eq!(t.in_order(), vec![&2, &4, &5]);
    });
}
