//! Packet-plumbing helpers standing in for a transport layer.

use tether_client::Client;
use tether_server::Server;
use tether_shared::UserId;

/// Delivers everything the server has queued for `user` into the
/// client, panicking on any decode failure (tests want a loud stream
/// desync, not a dropped connection).
pub fn deliver_to_client(server: &mut Server, user: UserId, client: &mut Client) {
    let packets = server
        .take_outgoing(user)
        .unwrap_or_else(|error| panic!("draining user {}: {}", user, error));
    for packet in packets {
        client
            .receive(&packet)
            .unwrap_or_else(|error| panic!("user {} stream desynced: {}", user, error));
    }
}

/// Delivers everything the client has queued into the server's
/// inbound queue for `user`.
pub fn deliver_to_server(client: &mut Client, server: &mut Server, user: UserId) {
    for packet in client.take_outgoing() {
        server
            .receive(user, packet)
            .unwrap_or_else(|error| panic!("user {} not connected: {}", user, error));
    }
}

/// Installs the env_logger backend once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
