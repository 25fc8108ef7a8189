use super::*;

use proptest::prelude::*;
use proptest::sample::Index;
use proptest_derive::Arbitrary;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet};

fn validate_map<T: Ord, V, G>(m: &TicketMap<T, V, G>) {
    m.storage.validate();
    assert_eq!(m.iter().count(), m.len(), "iteration must visit every element");
    if m.is_ordered() {
        let tickets: Vec<&T> = m.keys().collect();
        assert!(
            tickets.windows(2).all(|w| w[0] < w[1]),
            "live slots must hold ascending tickets"
        );
    }
}

fn config_with_search_limit(linear_search_limit: usize) -> TicketMapConfig {
    TicketMapConfig {
        linear_search_limit,
        ..TicketMapConfig::default()
    }
}

/// Picks a ticket in `0..=next + 1`, so both live, removed and never
/// issued tickets get probed.
fn pick(index: &Index, next: u64) -> u64 {
    index.index(next as usize + 2) as u64
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(u32),
    #[proptest(weight = 3)]
    Remove(Index),
    #[proptest(weight = 2)]
    Get(Index),
    #[proptest(weight = 2)]
    Update(Index, u32),
    #[proptest(skip)]
    Clear,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        200 => any::<Op>(),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1500)
}

#[derive(Clone, Debug, Arbitrary)]
enum CursorOp {
    #[proptest(weight = 4)]
    Step,
    #[proptest(weight = 2)]
    Insert,
    #[proptest(weight = 3)]
    Remove(Index),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 20_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: TicketMap<u64, u32> = TicketMap::new();
        let mut m: BTreeMap<u64, u32> = BTreeMap::new();
        let mut next = 0u64;

        for op in ops {
            match op {
                Op::Insert(value) => {
                    let ticket = t.insert(value);
                    prop_assert_eq!(ticket, next);
                    m.insert(ticket, value);
                    next += 1;
                }
                Op::Remove(index) => {
                    let ticket = pick(&index, next);
                    prop_assert_eq!(t.remove(&ticket), m.remove(&ticket));
                    prop_assert_eq!(t.remove(&ticket), None);
                }
                Op::Get(index) => {
                    let ticket = pick(&index, next);
                    prop_assert_eq!(t.get(&ticket), m.get(&ticket));
                    prop_assert_eq!(t.contains_key(&ticket), m.contains_key(&ticket));
                }
                Op::Update(index, value) => {
                    let ticket = pick(&index, next);
                    let expected = m.get_mut(&ticket).map(|v| std::mem::replace(v, value));
                    prop_assert_eq!(t.try_update(value, &ticket), expected);
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.len(), m.len());
            prop_assert_eq!(t.next_ticket(), &next);
        }

        validate_map(&t);
        let got: Vec<(u64, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u64, u32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_linear_and_binary_agree(
        ops in prop::collection::vec(any::<Op>(), 0..=1200),
    ) {
        let mut linear = TicketMap::with_config(0u64, Successor, config_with_search_limit(usize::MAX));
        let mut binary = TicketMap::with_config(0u64, Successor, config_with_search_limit(0));

        for op in ops {
            let next = *linear.next_ticket();
            match op {
                Op::Insert(value) => {
                    prop_assert_eq!(linear.insert(value), binary.insert(value));
                }
                Op::Remove(index) => {
                    let ticket = pick(&index, next);
                    prop_assert_eq!(linear.remove(&ticket), binary.remove(&ticket));
                }
                Op::Get(index) | Op::Update(index, _) => {
                    let ticket = pick(&index, next);
                    prop_assert_eq!(linear.get(&ticket), binary.get(&ticket));
                }
                Op::Clear => {}
            }
        }

        for ticket in 0..=*linear.next_ticket() {
            prop_assert_eq!(linear.get(&ticket), binary.get(&ticket));
        }
        validate_map(&binary);
    }

    #[test]
    fn prop_tickets_follow_generator(start in 0u64..1_000, step in 1u64..50, n in 0usize..300) {
        let generator = move |t: &u64| t + step;
        let mut map = TicketMap::with_generator(start, generator);
        let tickets: Vec<u64> = (0..n).map(|i| map.insert(i)).collect();

        for pair in tickets.windows(2) {
            prop_assert_eq!(pair[1], generator(&pair[0]));
        }
        let distinct: BTreeSet<u64> = tickets.iter().copied().collect();
        prop_assert_eq!(distinct.len(), n);
        for (i, ticket) in tickets.iter().enumerate() {
            prop_assert_eq!(map.get(ticket), Some(&i));
        }
    }

    #[test]
    fn prop_equality_ignores_next_ticket(
        values in prop::collection::vec(any::<u16>(), 0..100),
        removals in prop::collection::vec(any::<Index>(), 0..50),
        gap in 1u64..1_000,
    ) {
        let mut a: TicketMap<u64, u16> = TicketMap::new();
        for v in &values {
            a.insert(*v);
        }
        for index in &removals {
            a.remove(&pick(index, values.len() as u64));
        }

        let b = TicketMap::from_entries(
            a.iter().map(|(t, v)| (*t, *v)),
            a.next_ticket() + gap,
            |t: &u64| t + 7,
        )
        .unwrap();
        prop_assert!(a == b);

        if let Some((&ticket, &value)) = a.first() {
            let mut c = a.clone();
            c.try_update(value.wrapping_add(1), &ticket);
            prop_assert!(a != c);
        }
    }

    #[test]
    fn prop_cursor_tolerates_mutation(
        setup in 0u64..400,
        ops in prop::collection::vec(any::<CursorOp>(), 0..600),
    ) {
        let mut map: TicketMap<u64, u64> = TicketMap::new();
        for i in 0..setup {
            map.insert(i);
        }
        let initial: BTreeSet<u64> = map.keys().copied().collect();
        let mut removed = BTreeSet::new();

        let mut cursor = map.cursor();
        let mut yielded = Vec::new();
        let mut done = false;
        for op in ops {
            match op {
                CursorOp::Step => {
                    if done {
                        continue;
                    }
                    match cursor.next(&map) {
                        Some((t, v)) => {
                            prop_assert_eq!(t, v);
                            yielded.push(*t);
                        }
                        None => done = true,
                    }
                }
                CursorOp::Insert => {
                    let next = *map.next_ticket();
                    map.insert(next);
                }
                CursorOp::Remove(index) => {
                    let ticket = pick(&index, *map.next_ticket());
                    if map.remove(&ticket).is_some() {
                        removed.insert(ticket);
                    }
                }
            }
        }
        if !done {
            while let Some((t, _)) = cursor.next(&map) {
                yielded.push(*t);
            }
        }

        prop_assert!(yielded.windows(2).all(|w| w[0] < w[1]), "cursor must move forward");
        let yielded: BTreeSet<u64> = yielded.into_iter().collect();
        for ticket in initial.difference(&removed) {
            prop_assert!(yielded.contains(ticket), "ticket {} was skipped", ticket);
        }
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
fn exhaustive_remove_order_small_set() {
    // Small minimum so compaction kicks in on a handful of elements.
    let config = TicketMapConfig {
        initial_capacity: 2,
        min_count_to_compact: 1,
        ..TicketMapConfig::default()
    };
    let mut base: TicketMap<u32, char> = TicketMap::with_config(0, Successor, config);
    for c in "abcdefg".chars() {
        base.insert(c);
    }
    let tickets: Vec<u32> = base.keys().copied().collect();

    for_each_permutation(&tickets, |perm| {
        let mut t = base.clone();
        let mut m: BTreeMap<u32, char> = t.iter().map(|(k, v)| (*k, *v)).collect();

        for ticket in perm {
            assert_eq!(t.remove(&ticket), m.remove(&ticket));
            assert_eq!(t.len(), m.len());
            validate_map(&t);
            for (k, v) in &m {
                assert_eq!(t.get(k), Some(v));
            }
        }
        assert!(t.is_empty());
        assert_eq!(t.insert('h'), 7);
    });
}

#[test]
fn scenario_three_values() {
    let mut map: TicketMap<u64, f64> = TicketMap::with_generator(0, Successor);
    let tickets: Vec<u64> = [2.71, 3.14, 6.28].into_iter().map(|v| map.insert(v)).collect();
    assert_eq!(tickets, vec![0, 1, 2]);

    assert_eq!(map.remove(&1), Some(3.14));
    assert!(map.contains_key(&0));
    assert!(!map.contains_key(&1));
    assert!(map.contains_key(&2));
    assert_eq!(map.len(), 2);
}

#[test]
fn scenario_remove_evens_shuffled() {
    let mut map: TicketMap<u64, u64> = TicketMap::new();
    for i in 0..500u64 {
        assert_eq!(map.insert(i * 100), i);
    }

    let mut evens: Vec<u64> = (0..500).step_by(2).collect();
    evens.shuffle(&mut StdRng::seed_from_u64(3));
    for ticket in evens {
        assert_eq!(map.remove(&ticket), Some(ticket * 100));
    }

    assert_eq!(map.len(), 250);
    for ticket in 0..500u64 {
        if ticket % 2 == 1 {
            assert_eq!(map.get(&ticket), Some(&(ticket * 100)));
        } else {
            assert!(!map.contains_key(&ticket));
        }
    }
    validate_map(&map);
}

#[test]
fn compaction_preserves_values() {
    let mut map: TicketMap<u64, String> = TicketMap::new();
    for i in 0..256u64 {
        map.insert(format!("value-{i}"));
    }
    assert_eq!(map.capacity(), 256);

    // Removing down to 127 live slots drops below half and compacts.
    for ticket in 0..129u64 {
        map.remove(&ticket);
    }
    assert_eq!(map.len(), 127);
    assert_eq!(map.capacity(), 127);
    for ticket in 129..256u64 {
        assert_eq!(map.get(&ticket), Some(&format!("value-{ticket}")));
    }
    validate_map(&map);
}

#[test]
fn straddling_search_threshold() {
    let mut rng = StdRng::seed_from_u64(11);
    for n in [128u64, 129, 199, 201] {
        // One map always scans and one always bisects; the default one
        // switches over once the buffer reaches 200 slots.
        let mut linear = TicketMap::with_config(0u64, Successor, config_with_search_limit(usize::MAX));
        let mut binary = TicketMap::with_config(0u64, Successor, config_with_search_limit(0));
        let mut default: TicketMap<u64, u64> = TicketMap::new();
        for i in 0..n {
            linear.insert(i);
            binary.insert(i);
            default.insert(i);
        }

        let mut victims: Vec<u64> = (0..n).collect();
        victims.shuffle(&mut rng);
        for ticket in victims.into_iter().take(n as usize / 3) {
            linear.remove(&ticket);
            binary.remove(&ticket);
            default.remove(&ticket);
        }

        for ticket in 0..n + 5 {
            assert_eq!(linear.get(&ticket), binary.get(&ticket), "n={n} ticket={ticket}");
            assert_eq!(linear.get(&ticket), default.get(&ticket), "n={n} ticket={ticket}");
        }
    }
}
