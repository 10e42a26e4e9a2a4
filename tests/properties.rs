use std::collections::BTreeSet;

use poset_registry::{hasse, Poset};
use proptest::prelude::*;

const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

#[derive(Debug, Clone)]
enum Op {
    Insert(usize),
    Remove(usize),
    Add(usize, usize),
    Del(usize, usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    let i = 0..NAMES.len();
    prop_oneof![
        2 => i.clone().prop_map(Op::Insert),
        1 => i.clone().prop_map(Op::Remove),
        4 => (i.clone(), i.clone()).prop_map(|(a, b)| Op::Add(a, b)),
        2 => (i.clone(), i).prop_map(|(a, b)| Op::Del(a, b)),
    ]
}

/// Brute-force picture: live elements plus every strict pair.
#[derive(Default)]
struct Model {
    elements: BTreeSet<usize>,
    pairs: BTreeSet<(usize, usize)>,
}

impl Model {
    fn leq(&self, a: usize, b: usize) -> bool {
        a == b || self.pairs.contains(&(a, b))
    }

    fn close(&mut self) {
        loop {
            let mut extra = Vec::new();
            for &(x, y) in &self.pairs {
                for &(y2, z) in &self.pairs {
                    if y2 == y && !self.pairs.contains(&(x, z)) {
                        extra.push((x, z));
                    }
                }
            }
            if extra.is_empty() {
                return;
            }
            self.pairs.extend(extra);
        }
    }

    fn apply(&mut self, op: &Op) -> bool {
        match *op {
            Op::Insert(a) => self.elements.insert(a),
            Op::Remove(a) => {
                let present = self.elements.remove(&a);
                self.pairs.retain(|&(x, y)| x != a && y != a);
                present
            }
            Op::Add(a, b) => {
                if !self.elements.contains(&a) || !self.elements.contains(&b) {
                    return false;
                }
                if self.leq(a, b) || self.leq(b, a) {
                    return false;
                }
                self.pairs.insert((a, b));
                self.close();
                true
            }
            Op::Del(a, b) => {
                if !self.elements.contains(&a) || !self.elements.contains(&b) || a == b {
                    return false;
                }
                if !self.pairs.contains(&(a, b)) {
                    return false;
                }
                let between = self
                    .elements
                    .iter()
                    .any(|&m| m != a && m != b && self.leq(a, m) && self.leq(m, b));
                if between {
                    return false;
                }
                self.pairs.remove(&(a, b));
                true
            }
        }
    }
}

fn apply(poset: &mut Poset, op: &Op) -> bool {
    match *op {
        Op::Insert(a) => poset.insert(NAMES[a]).is_ok(),
        Op::Remove(a) => poset.remove(NAMES[a]).is_ok(),
        Op::Add(a, b) => poset.add(NAMES[a], NAMES[b]).is_ok(),
        Op::Del(a, b) => poset.del(NAMES[a], NAMES[b]).is_ok(),
    }
}

proptest! {
    #[test]
    fn agrees_with_brute_force(ops in prop::collection::vec(arb_op(), 0..60)) {
        let mut poset = Poset::new();
        let mut model = Model::default();
        for op in &ops {
            let got = apply(&mut poset, op);
            let want = model.apply(op);
            prop_assert_eq!(got, want, "outcome of {:?}", op);
            prop_assert!(poset.verify().is_ok(), "{:?}", poset.verify());
            prop_assert_eq!(poset.len(), model.elements.len());
        }
        for a in 0..NAMES.len() {
            for b in 0..NAMES.len() {
                let want = model.elements.contains(&a)
                    && model.elements.contains(&b)
                    && model.leq(a, b);
                prop_assert_eq!(poset.test(NAMES[a], NAMES[b]), want);
            }
        }
    }

    #[test]
    fn linear_extension_is_consistent(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut poset = Poset::new();
        for op in &ops {
            apply(&mut poset, op);
        }
        let order = hasse::linear_extension(&poset).unwrap();
        prop_assert_eq!(order.len(), poset.len());
        for (i, a) in order.iter().enumerate() {
            for b in &order[..i] {
                prop_assert!(!poset.test(a, b) || a == b);
            }
        }
    }

    #[test]
    fn every_pair_of_the_closure_follows_from_covers(
        ops in prop::collection::vec(arb_op(), 0..40)
    ) {
        let mut poset = Poset::new();
        for op in &ops {
            apply(&mut poset, op);
        }
        let covers = hasse::covers(&poset);
        let snap = hasse::snapshot(&poset);
        for (a, b) in &covers {
            prop_assert!(snap.relations.contains(&(a.clone(), b.clone())));
        }
        // Each strict pair starts with a covering step.
        for (a, b) in &snap.relations {
            let starts = covers.iter().any(|(x, y)| x == a && (y == b || poset.test(y, b)));
            prop_assert!(starts, "{} <= {} has no covering first step", a, b);
        }
    }
}
