/// Startup validation: configuration mismatches between the schema,
/// the kind registrations and the attempt catalogue must kill the
/// process before any connection is accepted.
use tether_server::{AttemptRegistry, Server};
use tether_shared::KindRegistration;
use tether_test::{protocol, ProjectileShotAttempt, REGISTRATIONS};

#[test]
fn matching_configuration_starts() {
    let mut attempts = AttemptRegistry::new();
    attempts.register("projectile_shot", Box::new(ProjectileShotAttempt::new()));
    let server = Server::new(protocol(), REGISTRATIONS, attempts);
    assert_eq!(server.schema().kind_count(), 2);
}

#[test]
#[should_panic(expected = "no registered attempt handler")]
fn missing_attempt_handler_is_fatal() {
    let _ = Server::new(protocol(), REGISTRATIONS, AttemptRegistry::new());
}

#[test]
#[should_panic(expected = "registered twice")]
fn duplicate_attempt_handler_is_fatal() {
    let mut attempts = AttemptRegistry::new();
    attempts.register("projectile_shot", Box::new(ProjectileShotAttempt::new()));
    attempts.register("projectile_shot", Box::new(ProjectileShotAttempt::new()));
}

#[test]
#[should_panic(expected = "never declared")]
fn handler_for_undeclared_action_is_fatal() {
    let mut attempts = AttemptRegistry::new();
    attempts.register("projectile_shot", Box::new(ProjectileShotAttempt::new()));
    attempts.register("teleport", Box::new(ProjectileShotAttempt::new()));
    let _ = Server::new(protocol(), REGISTRATIONS, attempts);
}

#[test]
#[should_panic(expected = "missing from concrete registration")]
fn registration_field_mismatch_is_fatal() {
    let mut attempts = AttemptRegistry::new();
    attempts.register("projectile_shot", Box::new(ProjectileShotAttempt::new()));
    let bad: &[KindRegistration] = &[
        KindRegistration {
            name: "bullet",
            replicated_fields: &["pos"],
        },
        KindRegistration {
            name: "item_entity",
            replicated_fields: &["count"],
        },
    ];
    let _ = Server::new(protocol(), bad, attempts);
}
