use std::collections::HashSet;

use archetype_ecs::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
struct A;
#[derive(Clone, Copy, Debug, PartialEq, Default)]
struct B;
#[derive(Clone, Copy, Debug, PartialEq, Default)]
struct C;

// archetypes {A}, {A,B}, {A,C}; query(All={A}, None={B}) yields {A} and {A,C} only.
#[test]
fn all_and_none_filters_combine_correctly() {
    let mut world = World::default();
    let only_a = world.create((A,));
    let a_and_b = world.create((A, B));
    let a_and_c = world.create((A, C));

    let a_id = ComponentRegistry::register::<A>();
    let b_id = ComponentRegistry::register::<B>();
    let desc = QueryDescription::new().with_all([a_id]).with_none([b_id]);

    let matched: HashSet<_> = world.query(&desc).entities().collect();
    assert!(matched.contains(&only_a));
    assert!(matched.contains(&a_and_c));
    assert!(!matched.contains(&a_and_b));
}

#[test]
fn any_filter_matches_archetypes_sharing_at_least_one_component() {
    let mut world = World::default();
    let with_b = world.create((A, B));
    let with_c = world.create((A, C));
    let neither = world.create((A,));

    let b_id = ComponentRegistry::register::<B>();
    let c_id = ComponentRegistry::register::<C>();
    let desc = QueryDescription::new().with_any([b_id, c_id]);

    let matched: HashSet<_> = world.query(&desc).entities().collect();
    assert!(matched.contains(&with_b));
    assert!(matched.contains(&with_c));
    assert!(!matched.contains(&neither));
}

#[test]
fn exclusive_filter_requires_exact_signature_match() {
    let mut world = World::default();
    let exact = world.create((A, B));
    let _superset = world.create((A, B, C));

    let a_id = ComponentRegistry::register::<A>();
    let b_id = ComponentRegistry::register::<B>();
    let desc = QueryDescription::new().with_exclusive([a_id, b_id]);

    let matched: Vec<_> = world.query(&desc).entities().collect();
    assert_eq!(matched, vec![exact]);
}

// an archetype appears in a query's results iff its signature matches
// the description, including archetypes created after the cache was warmed.
#[test]
fn query_cache_picks_up_archetypes_created_after_first_lookup() {
    let mut world = World::default();
    let _e0 = world.create((A,));

    let a_id = ComponentRegistry::register::<A>();
    let desc = QueryDescription::new().with_all([a_id]);
    assert_eq!(world.query(&desc).entity_count(), 1);

    // Force a new {A, B} archetype into existence after the cache has
    // already resolved the {A}-only lookup above.
    let e1 = world.create((A,));
    world.add(e1, B).unwrap();

    assert_eq!(world.query(&desc).entity_count(), 2);
}

// bulk add onto 1000 entities moves every one to {A, B} and none remain in {A}.
#[test]
fn bulk_add_moves_every_matching_entity_to_the_extended_archetype() {
    let mut world = World::default();
    let entities: Vec<_> = (0..1000).map(|_| world.create((A,))).collect();

    let a_id = ComponentRegistry::register::<A>();
    let desc = QueryDescription::new().with_all([a_id]);
    world.bulk_add::<B>(&desc).unwrap();

    for e in &entities {
        assert!(world.has::<B>(*e));
        assert!(world.has::<A>(*e));
    }

    let a_only = QueryDescription::new().with_exclusive([a_id]);
    assert_eq!(world.query(&a_only).entity_count(), 0);
    assert_eq!(world.len(), 1000);
}

#[test]
fn bulk_remove_strips_component_from_every_matching_entity() {
    let mut world = World::default();
    let entities: Vec<_> = (0..200).map(|_| world.create((A, B))).collect();

    let b_id = ComponentRegistry::register::<B>();
    let desc = QueryDescription::new().with_all([b_id]);
    world.bulk_remove::<B>(&desc).unwrap();

    for e in &entities {
        assert!(!world.has::<B>(*e));
        assert!(world.has::<A>(*e));
    }
}

#[test]
fn bulk_destroy_removes_exactly_the_matching_entities() {
    let mut world = World::default();
    for _ in 0..5 {
        world.create((A, B));
    }
    let surviving = world.create((A,));

    let b_id = ComponentRegistry::register::<B>();
    let desc = QueryDescription::new().with_all([b_id]);
    world.bulk_destroy(&desc).unwrap();

    assert_eq!(world.len(), 1);
    assert!(world.is_alive(surviving));
}
