/// Property test: under any interleaving of adds, destroys (live,
/// queued, or stale ids) and ticks, the registry's dense and sparse
/// views agree with a naive model of which ids should be live.
use std::collections::HashSet;

use proptest::prelude::*;

use tether_shared::{ComponentStorage, EntityId, EntityRegistry, EventRegistry};
use tether_test::Bullet;

#[derive(Clone, Debug)]
enum Op {
    Add,
    Destroy(usize),
    Tick,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        2 => any::<usize>().prop_map(Op::Destroy),
        1 => Just(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn dense_and_sparse_views_agree(ops in proptest::collection::vec(op_strategy(), 1..120)) {
        let mut registry = EntityRegistry::new();
        let mut components = ComponentStorage::new();
        let mut events = EventRegistry::new();

        let mut issued: Vec<EntityId> = Vec::new();
        let mut live: HashSet<EntityId> = HashSet::new();
        let mut queued: HashSet<EntityId> = HashSet::new();

        for op in ops {
            match op {
                Op::Add => {
                    let id = registry.add_entity(
                        Bullet::boxed(0.0, 0.0),
                        &mut components,
                        &mut events,
                    );
                    issued.push(id);
                    live.insert(id);
                }
                Op::Destroy(seed) => {
                    if issued.is_empty() {
                        continue;
                    }
                    let id = issued[seed % issued.len()];
                    registry.queue_destroy(id);
                    // Destroying a stale or already-queued id changes
                    // nothing in the model either.
                    if live.contains(&id) {
                        queued.insert(id);
                    }
                }
                Op::Tick => {
                    let destroyed = registry.update(1.0, &mut components, &mut events);
                    for id in &destroyed {
                        prop_assert!(queued.remove(id), "unexpected destruction of {:?}", id);
                        live.remove(id);
                    }
                    prop_assert!(queued.is_empty(), "queued ids survived the flush: {:?}", queued);
                }
            }

            prop_assert_eq!(registry.len(), live.len());
            for id in &issued {
                prop_assert_eq!(registry.contains(*id), live.contains(id));
            }
            let dense: HashSet<EntityId> = registry.iter().map(|(id, _)| id).collect();
            prop_assert_eq!(&dense, &live);
        }
    }
}
