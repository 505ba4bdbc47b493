//! Lets socket-bound tests skip in sandboxes that forbid binding localhost.
//!
//! Set `SITEFETCH_REQUIRE_SOCKET_TESTS=1` in CI to turn a skip into a failure.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

const STRICT_ENV: &str = "SITEFETCH_REQUIRE_SOCKET_TESTS";

fn strict_mode() -> bool {
    std::env::var(STRICT_ENV).is_ok_and(|value| {
        let value = value.trim();
        value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
    })
}

/// True when localhost cannot be bound and the calling test should return early.
#[track_caller]
#[must_use]
pub fn should_skip_socket_bound_test() -> bool {
    let Err(bind_error) = TcpListener::bind(("127.0.0.1", 0)) else {
        return false;
    };
    let caller = Location::caller();
    assert!(
        !strict_mode(),
        "{caller}: localhost bind failed ({bind_error}) and {STRICT_ENV} is set"
    );
    eprintln!("{caller}: localhost bind failed ({bind_error}), skipping");
    true
}

/// Starts a wiremock server, or returns `None` when sockets are unavailable.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl Future<Output = Option<MockServer>> {
    let skip = should_skip_socket_bound_test();
    async move {
        if skip {
            None
        } else {
            Some(MockServer::start().await)
        }
    }
}
