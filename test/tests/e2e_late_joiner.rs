/// Late-joiner catch-up: a connecting user receives one spawn record
/// per live replica plus one update built from the lifetime mask, so
/// fields that replicated before the join are not lost.
use tether_client::Client;
use tether_server::{AttemptRegistry, Server};
use tether_shared::{FieldValue, UserId};
use tether_test::{
    deliver_to_client, init_logging, protocol, Bullet, ProjectileShotAttempt, REGISTRATIONS,
};

const USER_A: UserId = 1;
const USER_B: UserId = 2;
const USER_C: UserId = 3;

fn server() -> Server {
    let mut attempts = AttemptRegistry::new();
    attempts.register("projectile_shot", Box::new(ProjectileShotAttempt::new()));
    Server::new(protocol(), REGISTRATIONS, attempts)
}

#[test]
fn late_joiner_receives_lifetime_fields() {
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

    // `pos` has replicated once, so it is in the lifetime mask.
    server.connect_user(USER_B);
    let mut client_b = Client::new(protocol());
    let packets = server.take_outgoing(USER_B).unwrap();
    assert_eq!(packets.len(), 2);
    assert_eq!(packets[0], vec![0, 0, 0, 0, 0, 0]);

    let mut catchup = vec![2, 0, 0, 0, 0, 0, 0b0000_0001];
    catchup.extend_from_slice(&3.0f32.to_be_bytes());
    catchup.extend_from_slice(&4.0f32.to_be_bytes());
    assert_eq!(packets[1], catchup);

    for packet in packets {
        client_b.receive(&packet).unwrap();
    }
    assert_eq!(
        client_b.remote().field(bullet, 0),
        Some(&FieldValue::Vec2(3.0, 4.0))
    );
}

#[test]
fn catchup_does_not_disturb_dirty_tracking() {
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

    server.connect_user(USER_B);
    let _ = server.take_outgoing(USER_B).unwrap();

    // Writing the catch-up must not have re-dirtied anything.
    server.tick(0.0);
    assert!(server.take_outgoing(USER_A).unwrap().is_empty());
    assert!(server.take_outgoing(USER_B).unwrap().is_empty());
}

#[test]
fn lifetime_mask_accumulates_across_fields() {
    init_logging();
    let mut server = server();
    let mut client_b = Client::new(protocol());
    server.connect_user(USER_A);

    let bullet = server.spawn_entity(Bullet::boxed(0.0, 0.0));
    server
        .replica_mut(bullet)
        .unwrap()
        .set_field(0, FieldValue::Vec2(3.0, 4.0));
    server.tick(0.0);
    let _ = server.take_outgoing(USER_A).unwrap();

    server.connect_user(USER_B);
    deliver_to_client(&mut server, USER_B, &mut client_b);

    // Second field replicates after B joined; the ordinary update
    // stream carries only `test`.
    server
        .replica_mut(bullet)
        .unwrap()
        .set_field(1, FieldValue::F32(7.5));
    server.tick(0.0);

    let packets = server.take_outgoing(USER_B).unwrap();
    let mut update = vec![2, 0, 0, 0, 0, 0, 0b0000_0010];
    update.extend_from_slice(&7.5f32.to_be_bytes());
    assert_eq!(packets, vec![update]);
    for packet in packets {
        client_b.receive(&packet).unwrap();
    }
    assert_eq!(
        client_b.remote().field(bullet, 1),
        Some(&FieldValue::F32(7.5))
    );

    // A third joiner now catches up on both fields in one record.
    server.connect_user(USER_C);
    let packets = server.take_outgoing(USER_C).unwrap();
    assert_eq!(packets.len(), 2);
    let mut catchup = vec![2, 0, 0, 0, 0, 0, 0b0000_0011];
    catchup.extend_from_slice(&3.0f32.to_be_bytes());
    catchup.extend_from_slice(&4.0f32.to_be_bytes());
    catchup.extend_from_slice(&7.5f32.to_be_bytes());
    assert_eq!(packets[1], catchup);
}

#[test]
fn joiner_during_pending_spawn_gets_exactly_one_spawn_record() {
    init_logging();
    let mut server = server();
    server.connect_user(USER_A);

    let bullet = server.spawn_entity(Bullet::boxed(0.0, 0.0));
    // B connects after the spawn but before the tick that writes it.
    server.connect_user(USER_B);
    server.tick(0.0);

    let packets = server.take_outgoing(USER_B).unwrap();
    let spawns = packets
        .iter()
        .filter(|packet| packet.first() == Some(&0))
        .count();
    assert_eq!(spawns, 1);

    let mut client_b = Client::new(protocol());
    for packet in packets {
        client_b.receive(&packet).unwrap();
    }
    assert!(client_b.remote().contains(bullet));
}
