/// End-to-end replication: server writes dirty-bit-driven update
/// records, clients mirror them. The wire layout is asserted byte by
/// byte because both sides derive it independently from sorted names.
use tether_client::{Client, ClientEvent};
use tether_server::{AttemptRegistry, Server};
use tether_shared::{EntityId, FieldValue, UserId, WireError};
use tether_test::{
    deliver_to_client, init_logging, protocol, Bullet, ProjectileShotAttempt, REGISTRATIONS,
};

const USER_A: UserId = 1;
const USER_B: UserId = 2;

fn server() -> Server {
    let mut attempts = AttemptRegistry::new();
    attempts.register("projectile_shot", Box::new(ProjectileShotAttempt::new()));
    Server::new(protocol(), REGISTRATIONS, attempts)
}

fn spawned_entity(events: &[ClientEvent]) -> EntityId {
    for event in events {
        if let ClientEvent::Spawned { entity, .. } = event {
            return *entity;
        }
    }
    panic!("no spawn event in {:?}", events);
}

#[test]
fn dirty_fields_replicate_byte_exactly() {
    init_logging();
    let mut server = server();
    server.connect_user(USER_A);

    let bullet = server.spawn_entity(Bullet::boxed(0.0, 0.0));
    server
        .replica_mut(bullet)
        .unwrap()
        .set_field(0, FieldValue::Vec2(3.0, 4.0));
    server.tick(0.0);

    let packets = server.take_outgoing(USER_A).unwrap();
    assert_eq!(packets.len(), 2);

    // [Spawn][kind 0][entity u32]
    assert_eq!(packets[0], vec![0, 0, 0, 0, 0, 0]);

    // [Update][kind 0][entity u32][mask: bit 0 only][x f32][y f32] —
    // `pos` is dirty, `test` contributes nothing.
    let mut expected = vec![2, 0, 0, 0, 0, 0, 0b0000_0001];
    expected.extend_from_slice(&3.0f32.to_be_bytes());
    expected.extend_from_slice(&4.0f32.to_be_bytes());
    assert_eq!(packets[1], expected);
    assert_eq!(packets[1].len(), 15);
}

#[test]
fn quiet_tick_writes_nothing() {
    init_logging();
    let mut server = server();
    server.connect_user(USER_A);

    let bullet = server.spawn_entity(Bullet::boxed(0.0, 0.0));
    server
        .replica_mut(bullet)
        .unwrap()
        .set_field(0, FieldValue::Vec2(3.0, 4.0));
    server.tick(0.0);
    let _ = server.take_outgoing(USER_A).unwrap();

    // No field touched since the last serialization pass.
    server.tick(0.0);
    assert!(server.take_outgoing(USER_A).unwrap().is_empty());
}

#[test]
fn client_mirrors_the_replicated_state() {
    init_logging();
    let mut server = server();
    let mut client = Client::new(protocol());
    server.connect_user(USER_A);

    let bullet = server.spawn_entity(Bullet::boxed(0.0, 0.0));
    server
        .replica_mut(bullet)
        .unwrap()
        .set_field(0, FieldValue::Vec2(3.0, 4.0));
    server.tick(0.0);
    deliver_to_client(&mut server, USER_A, &mut client);

    let events = client.take_events();
    let entity = spawned_entity(&events);
    assert_eq!(entity, bullet);
    assert!(matches!(
        events.last(),
        Some(ClientEvent::Updated { fields, .. }) if fields == &[0]
    ));

    assert_eq!(
        client.remote().field(entity, 0),
        Some(&FieldValue::Vec2(3.0, 4.0))
    );
    // `test` was never written; the mirror still holds its default.
    assert_eq!(client.remote().field(entity, 1), Some(&FieldValue::F32(0.0)));
    // A field index past the kind's declared fields is a miss.
    assert_eq!(client.remote().field(entity, 9), None);
}

#[test]
fn spawn_with_unknown_kind_is_a_decode_error() {
    init_logging();
    let mut client = Client::new(protocol());

    // [Spawn][kind 99][entity u32] — no kind 99 exists.
    let result = client.receive(&[0, 99, 0, 0, 0, 0]);
    assert!(matches!(
        result,
        Err(WireError::UnknownDiscriminant { value: 99, .. })
    ));
    assert!(client.remote().is_empty());
    assert!(client.take_events().is_empty());
}

#[test]
fn despawn_reaches_every_client() {
    init_logging();
    let mut server = server();
    let mut client_a = Client::new(protocol());
    let mut client_b = Client::new(protocol());
    server.connect_user(USER_A);
    server.connect_user(USER_B);

    let bullet = server.spawn_entity(Bullet::boxed(0.0, 0.0));
    server.tick(0.0);
    deliver_to_client(&mut server, USER_A, &mut client_a);
    deliver_to_client(&mut server, USER_B, &mut client_b);
    assert!(client_a.remote().contains(bullet));
    assert!(client_b.remote().contains(bullet));

    server.destroy_entity(bullet);
    server.tick(0.0);

    let packets = server.take_outgoing(USER_B).unwrap();
    assert_eq!(packets, vec![vec![1, 0, 0, 0, 0, 0]]);
    for packet in packets {
        client_b.receive(&packet).unwrap();
    }
    assert!(!client_b.remote().contains(bullet));

    deliver_to_client(&mut server, USER_A, &mut client_a);
    assert!(!client_a.remote().contains(bullet));
}

#[test]
fn spawn_and_destroy_in_one_tick_send_nothing() {
    init_logging();
    let mut server = server();
    server.connect_user(USER_A);

    let bullet = server.spawn_entity(Bullet::boxed(0.0, 0.0));
    server.destroy_entity(bullet);
    server.tick(0.0);

    assert!(server.take_outgoing(USER_A).unwrap().is_empty());
}
