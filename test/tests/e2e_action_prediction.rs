/// End-to-end action prediction: request, arbitration, and the two
/// acknowledgement paths. The failure path is asserted byte-exactly
/// against the [action][error code][correlation] ack-fail layout.
use std::cell::RefCell;
use std::rc::Rc;

use tether_client::{Client, ClientEvent, Predicted, PredictionState};
use tether_server::{AttemptRegistry, Server};
use tether_shared::{ActionErrorCode, CorrelationId, FieldValue, UserId};
use tether_test::{
    deliver_to_client, deliver_to_server, init_logging, protocol, ProjectileShotAttempt,
    REGISTRATIONS,
};

const USER_A: UserId = 1;
const USER_B: UserId = 2;

struct ShotPrediction {
    log: Rc<RefCell<Vec<String>>>,
}

impl ShotPrediction {
    fn boxed(log: &Rc<RefCell<Vec<String>>>) -> Box<dyn Predicted> {
        Box::new(Self { log: log.clone() })
    }
}

impl Predicted for ShotPrediction {
    fn confirm(&mut self, results: &[FieldValue]) {
        self.log.borrow_mut().push(format!("confirm {:?}", results));
    }

    fn rollback(&mut self, code: ActionErrorCode) {
        self.log.borrow_mut().push(format!("rollback {:?}", code));
    }
}

fn server_with(handler: ProjectileShotAttempt) -> Server {
    let mut attempts = AttemptRegistry::new();
    attempts.register("projectile_shot", Box::new(handler));
    Server::new(protocol(), REGISTRATIONS, attempts)
}

#[test]
fn rejected_attempt_rolls_back_the_originator_only() {
    init_logging();
    // USER_A has no ammo at all.
    let mut server = server_with(ProjectileShotAttempt::new());
    let mut client_a = Client::new(protocol());
    let mut client_b = Client::new(protocol());
    server.connect_user(USER_A);
    server.connect_user(USER_B);

    let log = Rc::new(RefCell::new(Vec::new()));
    let correlation = client_a.predict_action(
        "projectile_shot",
        vec![FieldValue::Vec2(1.0, 0.0)],
        ShotPrediction::boxed(&log),
    );
    assert_eq!(correlation, CorrelationId(1));

    deliver_to_server(&mut client_a, &mut server, USER_A);
    server.tick(0.0);

    // [AckFail][action 0][OutOfAmmo][correlation 1]; nothing spawned,
    // nothing broadcast.
    let packets = server.take_outgoing(USER_A).unwrap();
    assert_eq!(packets, vec![vec![6, 0, 1, 0, 0, 0, 1]]);
    assert!(server.take_outgoing(USER_B).unwrap().is_empty());
    assert!(server.world().is_empty());

    for packet in packets {
        client_a.receive(&packet).unwrap();
    }
    let events = client_a.take_events();
    assert!(matches!(
        events.as_slice(),
        [ClientEvent::RolledBack { correlation: CorrelationId(1), code: ActionErrorCode::OutOfAmmo }]
    ));
    assert_eq!(*log.borrow(), vec!["rollback OutOfAmmo".to_string()]);
    assert_eq!(
        client_a.prediction_state(correlation),
        Some(PredictionState::RolledBack)
    );
}

#[test]
fn accepted_attempt_confirms_originator_and_notifies_others() {
    init_logging();
    let mut server = server_with(ProjectileShotAttempt::new().with_ammo(USER_A, 1));
    let mut client_a = Client::new(protocol());
    let mut client_b = Client::new(protocol());
    server.connect_user(USER_A);
    server.connect_user(USER_B);

    let log = Rc::new(RefCell::new(Vec::new()));
    let correlation = client_a.predict_action(
        "projectile_shot",
        vec![FieldValue::Vec2(1.0, 0.0)],
        ShotPrediction::boxed(&log),
    );

    deliver_to_server(&mut client_a, &mut server, USER_A);
    server.tick(0.0);

    deliver_to_client(&mut server, USER_A, &mut client_a);
    deliver_to_client(&mut server, USER_B, &mut client_b);

    // Originator: ack-success first, then the ordinary spawn/update
    // stream for the bullet the attempt spawned.
    let events_a = client_a.take_events();
    assert!(matches!(
        events_a.first(),
        Some(ClientEvent::Confirmed { results, .. }) if matches!(results.as_slice(), [FieldValue::U32(_)])
    ));
    assert_eq!(*log.borrow(), vec!["confirm [U32(0)]".to_string()]);
    assert_eq!(
        client_a.prediction_state(correlation),
        Some(PredictionState::Confirmed)
    );

    // Other client: do-notification instead of an ack; no prediction
    // to settle.
    let events_b = client_b.take_events();
    assert!(matches!(
        events_b.first(),
        Some(ClientEvent::DidAction { results, .. }) if matches!(results.as_slice(), [FieldValue::U32(_)])
    ));
    assert!(events_b
        .iter()
        .any(|event| matches!(event, ClientEvent::Spawned { .. })));

    assert_eq!(server.world().len(), 1);
    assert_eq!(client_a.remote().len(), 1);
    assert_eq!(client_b.remote().len(), 1);
}

#[test]
fn second_shot_without_ammo_fails() {
    init_logging();
    let mut server = server_with(ProjectileShotAttempt::new().with_ammo(USER_A, 1));
    let mut client_a = Client::new(protocol());
    server.connect_user(USER_A);

    let log = Rc::new(RefCell::new(Vec::new()));
    client_a.predict_action(
        "projectile_shot",
        vec![FieldValue::Vec2(1.0, 0.0)],
        ShotPrediction::boxed(&log),
    );
    let second = client_a.predict_action(
        "projectile_shot",
        vec![FieldValue::Vec2(0.0, 1.0)],
        ShotPrediction::boxed(&log),
    );
    assert_eq!(second, CorrelationId(2));

    deliver_to_server(&mut client_a, &mut server, USER_A);
    server.tick(0.0);
    deliver_to_client(&mut server, USER_A, &mut client_a);

    assert_eq!(
        client_a.prediction_state(CorrelationId(1)),
        Some(PredictionState::Confirmed)
    );
    assert_eq!(
        client_a.prediction_state(second),
        Some(PredictionState::RolledBack)
    );
    assert_eq!(server.world().len(), 1);
}

#[test]
fn ack_for_unknown_correlation_is_ignored() {
    init_logging();
    let mut client = Client::new(protocol());

    // [AckFail][action 0][OutOfAmmo][correlation 99] — never minted.
    client.receive(&[6, 0, 1, 0, 0, 0, 99]).unwrap();
    assert!(client.take_events().is_empty());
}

#[test]
fn unknown_action_id_gets_ack_fail_not_disconnect() {
    init_logging();
    let mut server = server_with(ProjectileShotAttempt::new());
    server.connect_user(USER_A);

    // [ActionRequest][action 7 — undeclared][correlation 5]
    server.receive(USER_A, vec![3, 7, 0, 0, 0, 5]).unwrap();
    server.tick(0.0);

    let packets = server.take_outgoing(USER_A).unwrap();
    assert_eq!(packets, vec![vec![6, 7, 0, 0, 0, 0, 5]]);

    // Still connected: the request was answerable, not malformed.
    assert!(server.receive(USER_A, vec![3, 7, 0, 0, 0, 6]).is_ok());
}

#[test]
fn truncated_packet_disconnects_only_that_user() {
    init_logging();
    let mut server = server_with(ProjectileShotAttempt::new());
    server.connect_user(USER_A);
    server.connect_user(USER_B);

    // ActionRequest cut off mid-correlation-id.
    server.receive(USER_A, vec![3, 0, 0, 0]).unwrap();
    server.tick(0.0);

    assert!(server.receive(USER_A, vec![3, 0, 0, 0, 0, 1]).is_err());
    assert!(server.receive(USER_B, Vec::new()).is_ok());
}
