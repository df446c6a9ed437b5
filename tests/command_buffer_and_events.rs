use archetype_ecs::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Velocity {
    dx: f32,
}

#[test]
fn command_buffer_applies_every_queued_command_in_order() {
    let mut world = World::default();
    let e0 = world.create((Position { x: 0.0, y: 0.0 },));

    let mut buffer = CommandBuffer::new();
    buffer.create_entity((Position { x: 1.0, y: 1.0 },));
    buffer.add_component(e0, Velocity { dx: 5.0 });
    buffer.set_component(e0, Position { x: 9.0, y: 9.0 });
    buffer.destroy_entity(e0);

    world.apply_commands(&mut buffer).unwrap();

    assert!(buffer.is_empty());
    assert!(!world.is_alive(e0), "queued destroy should have run last");
    assert_eq!(world.len(), 1, "only the queued create_entity should survive");
}

#[test]
fn command_buffer_remove_component_runs_inside_the_batch() {
    let mut world = World::default();
    let e = world.create((Position { x: 0.0, y: 0.0 }, Velocity { dx: 1.0 }));

    let mut buffer = CommandBuffer::new();
    buffer.remove_component::<Velocity>(e);
    world.apply_commands(&mut buffer).unwrap();

    assert!(!world.has::<Velocity>(e));
    assert!(world.has::<Position>(e));
}

#[derive(Default)]
struct Counts {
    created: u32,
    destroyed: u32,
    added: u32,
    removed: u32,
    set: u32,
}

struct RecordingSink(std::sync::Arc<std::sync::Mutex<Counts>>);

impl EventSink for RecordingSink {
    fn on_entity_created(&mut self, _entity: Entity) {
        self.0.lock().unwrap().created += 1;
    }
    fn on_entity_destroyed(&mut self, _entity: Entity) {
        self.0.lock().unwrap().destroyed += 1;
    }
    fn on_component_added(&mut self, _entity: Entity, _component: ComponentId) {
        self.0.lock().unwrap().added += 1;
    }
    fn on_component_removed(&mut self, _entity: Entity, _component: ComponentId) {
        self.0.lock().unwrap().removed += 1;
    }
    fn on_component_set(&mut self, _entity: Entity, _component: ComponentId) {
        self.0.lock().unwrap().set += 1;
    }
}

#[test]
fn event_sink_observes_every_structural_hook() {
    let counts = std::sync::Arc::new(std::sync::Mutex::new(Counts::default()));
    let mut world = World::default().with_event_sink(Box::new(RecordingSink(counts.clone())));

    let e = world.create((Position { x: 0.0, y: 0.0 },));
    world.add(e, Velocity { dx: 1.0 }).unwrap();
    world.set(e, Velocity { dx: 2.0 }).unwrap();
    world.remove::<Velocity>(e).unwrap();
    world.destroy(e).unwrap();

    let counts = counts.lock().unwrap();
    assert_eq!(counts.created, 1);
    assert_eq!(counts.added, 1);
    assert_eq!(counts.set, 1);
    assert_eq!(counts.removed, 1);
    assert_eq!(counts.destroyed, 1);
}

#[test]
fn clearing_the_sink_stops_further_notifications() {
    let counts = std::sync::Arc::new(std::sync::Mutex::new(Counts::default()));
    let mut world = World::default().with_event_sink(Box::new(RecordingSink(counts.clone())));
    world.create((Position { x: 0.0, y: 0.0 },));
    assert_eq!(counts.lock().unwrap().created, 1);

    world.set_event_sink(None);
    world.create((Position { x: 1.0, y: 1.0 },));
    assert_eq!(counts.lock().unwrap().created, 1, "no sink installed, count must not move");
}

#[test]
fn with_no_sink_structural_changes_still_work() {
    let mut world = World::default();
    let e = world.create((Position { x: 0.0, y: 0.0 },));
    world.add(e, Velocity { dx: 1.0 }).unwrap();
    world.destroy(e).unwrap();
}
