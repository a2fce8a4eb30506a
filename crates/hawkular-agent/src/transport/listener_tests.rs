//! Tests for the gateway listener.

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use hawkular_agent_config::GatewayEndpoint;
use rstest::rstest;

use super::listener::SocketListener;
use super::{ConnectionHandler, CountingHandler, ListenerError};

/// Polls `handled` until it reaches `expected` or two seconds pass.
fn handled_at_least(handled: &AtomicUsize, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while handled.load(Ordering::SeqCst) < expected {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(10));
    }
    true
}

#[rstest]
fn every_tcp_client_reaches_the_handler() {
    let listener =
        SocketListener::bind(&GatewayEndpoint::tcp("127.0.0.1", 0)).expect("bind gateway");
    let (handled, handler) = CountingHandler::new();
    let handle = listener
        .start(handler as Arc<dyn ConnectionHandler>)
        .expect("start gateway");
    let addr = handle.local_addr().expect("tcp address");

    for _ in 0..3 {
        TcpStream::connect(addr).expect("connect client");
    }

    assert!(handled_at_least(&handled, 3), "expected three connections");
    handle.shutdown();
    handle.join().expect("join gateway");
}

#[rstest]
fn unresolvable_host_is_reported() {
    let error = SocketListener::bind(&GatewayEndpoint::tcp("no-such-host.invalid", 9779))
        .expect_err("bind fails");
    assert!(
        matches!(error, ListenerError::Resolve { .. } | ListenerError::NoAddress { .. }),
        "{error:?}"
    );
}

#[cfg(unix)]
mod unix {
    use std::fs;
    use std::os::unix::net::{UnixListener, UnixStream};

    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;

    #[rstest::fixture]
    fn socket_dir() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn socket_path(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join("agent.sock")).expect("utf8 path")
    }

    #[rstest]
    fn stale_socket_is_reclaimed_and_removed_on_stop(socket_dir: TempDir) {
        let path = socket_path(&socket_dir);
        drop(UnixListener::bind(&path).expect("bind stale socket"));
        assert!(path.exists(), "stale socket should remain");

        let listener = SocketListener::bind(&GatewayEndpoint::unix(path.clone())).expect("rebind");
        let (handled, handler) = CountingHandler::new();
        let handle = listener.start(handler).expect("start gateway");

        UnixStream::connect(&path).expect("connect client");
        assert!(handled_at_least(&handled, 1), "expected one connection");

        handle.shutdown();
        handle.join().expect("join gateway");
        assert!(!path.exists(), "socket file should be removed on stop");
    }

    #[rstest]
    fn live_socket_is_left_alone(socket_dir: TempDir) {
        let path = socket_path(&socket_dir);
        let _live = UnixListener::bind(&path).expect("bind live socket");

        let error = SocketListener::bind(&GatewayEndpoint::unix(path.clone())).expect_err("in use");
        assert!(matches!(error, ListenerError::UnixInUse { .. }), "{error:?}");
        assert!(path.exists());
    }

    #[rstest]
    fn regular_file_is_never_removed(socket_dir: TempDir) {
        let path = socket_path(&socket_dir);
        fs::write(&path, b"agent state").expect("write file");

        let error =
            SocketListener::bind(&GatewayEndpoint::unix(path.clone())).expect_err("not a socket");
        assert!(matches!(error, ListenerError::UnixNotSocket { .. }), "{error:?}");
        assert_eq!(fs::read(&path).expect("file kept"), b"agent state");
    }
}
