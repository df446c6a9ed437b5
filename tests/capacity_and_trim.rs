use archetype_ecs::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq)]
struct A;

// 10,000 entities created then destroyed; trim_excess reduces the
// archetype to one empty chunk, and a subsequent create still succeeds.
#[test]
fn trim_excess_reclaims_chunks_after_mass_destruction() {
    let mut world = World::default();
    let entities: Vec<_> = (0..10_000).map(|_| world.create((A,))).collect();
    let capacity_before_trim = world.capacity();
    assert!(capacity_before_trim > 0);

    for e in entities {
        world.destroy(e).unwrap();
    }
    assert_eq!(world.len(), 0);

    world.trim_excess();
    // One empty chunk is kept rather than releasing every chunk.
    assert!(world.capacity() > 0);
    assert!(world.capacity() < capacity_before_trim);

    // A fresh create after trimming must not go out of bounds anywhere.
    let e = world.create((A,));
    assert!(world.is_alive(e));
    assert_eq!(world.len(), 1);
}

// trim_excess is idempotent when nothing structural happens in between.
#[test]
fn trim_excess_is_idempotent() {
    let mut world = World::default();
    let e = world.create((A,));
    world.destroy(e).unwrap();

    world.trim_excess();
    let after_first = world.capacity();
    world.trim_excess();
    assert_eq!(world.capacity(), after_first);
}

// clear, followed by clear again, is a no-op.
#[test]
fn clear_twice_is_a_no_op() {
    let mut world = World::default();
    world.create((A,));
    world.create((A,));

    world.clear();
    assert_eq!(world.len(), 0);
    assert_eq!(world.capacity(), 0);

    world.clear();
    assert_eq!(world.len(), 0);
    assert_eq!(world.capacity(), 0);

    // The world must still be usable after clearing.
    let e = world.create((A,));
    assert!(world.is_alive(e));
}

// capacity == sum of each archetype's chunk capacity; size == live count.
#[test]
fn capacity_tracks_allocated_chunks_not_just_live_entities() {
    let mut world = World::default();
    let e = world.create((A,));
    let capacity_with_one_entity = world.capacity();
    assert!(capacity_with_one_entity > 0, "creating an entity allocates a chunk");

    world.destroy(e).unwrap();
    assert_eq!(world.len(), 0);
    // Capacity is not released just by destroying; only trim_excess does that.
    assert_eq!(world.capacity(), capacity_with_one_entity);
}
