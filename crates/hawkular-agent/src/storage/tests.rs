//! Unit tests for the storage sink and notification dispatch.

use std::fs;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use camino::Utf8PathBuf;
use hawkular_cmdgw_api::RawMessage;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

use super::writer::MockPayloadWriter;
use super::*;
use crate::feedcomm::{Exchange, ResponseListener};

const WAIT: Duration = Duration::from_secs(2);

#[fixture]
fn spool_dir() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

fn spool_path(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join("nested").join("spool.jsonl")).expect("utf8 path")
}

fn spooled(path: &Utf8PathBuf) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("spool file")
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

fn resource_reply(status: &str) -> RawMessage {
    RawMessage::new(
        "RemoveDatasourceResponse",
        json!({"feedId": "feed", "resourceId": "feed~Local DMR~/subsystem=datasources", "status": status}),
        None,
    )
}

#[rstest]
fn waiting_store_reports_the_write() {
    let mut writer = MockPayloadWriter::new();
    writer
        .expect_write()
        .once()
        .withf(|payload| payload == &json!({"kind": "avail"}))
        .returning(|_| Ok(()));
    let sink = StorageSink::start(Box::new(writer)).expect("sink");

    let stored = sink.store(json!({"kind": "avail"}), Some(WAIT)).expect("stored");
    assert_eq!(stored, Stored::Written);
}

#[rstest]
fn write_failure_within_the_wait_surfaces() {
    let mut writer = MockPayloadWriter::new();
    writer
        .expect_write()
        .once()
        .returning(|_| Err(StorageError::io("/spool", io::ErrorKind::PermissionDenied.into())));
    let sink = StorageSink::start(Box::new(writer)).expect("sink");

    let error = sink.store(json!({}), Some(WAIT)).expect_err("write fails");
    assert!(matches!(error, StorageError::Io { .. }), "{error:?}");
}

#[rstest]
fn slow_write_is_pending_not_failed() {
    let mut writer = MockPayloadWriter::new();
    writer.expect_write().once().returning(|_| {
        thread::sleep(Duration::from_millis(200));
        Ok(())
    });
    let sink = StorageSink::start(Box::new(writer)).expect("sink");

    let stored = sink
        .store(json!({}), Some(Duration::from_millis(10)))
        .expect("not an error");
    assert_eq!(stored, Stored::Pending);
}

#[rstest]
fn queued_payloads_are_drained_on_drop(spool_dir: TempDir) {
    let path = spool_path(&spool_dir);
    let sink = StorageSink::start(Box::new(SpoolWriter::new(path.clone()))).expect("sink");
    assert_eq!(sink.store(json!({"n": 1}), None).expect("queued"), Stored::Queued);
    assert_eq!(sink.store(json!({"n": 2}), None).expect("queued"), Stored::Queued);
    drop(sink);

    assert_eq!(spooled(&path), [json!({"n": 1}), json!({"n": 2})]);
}

#[rstest]
fn successful_change_is_notified(spool_dir: TempDir) {
    let path = spool_path(&spool_dir);
    let sink = Arc::new(StorageSink::start(Box::new(SpoolWriter::new(path.clone()))).expect("sink"));
    let dispatcher = NotificationDispatcher::new(Arc::clone(&sink));

    let exchange = Exchange::new("RemoveDatasourceRequest", true, Some(resource_reply("OK")));
    dispatcher.on_response(&exchange, Ok(()));
    drop(dispatcher);
    drop(Arc::into_inner(sink));

    assert_eq!(
        spooled(&path),
        [json!({
            "notification": RESOURCE_CHANGED,
            "feedId": "feed",
            "resourceId": "feed~Local DMR~/subsystem=datasources",
            "operation": "RemoveDatasourceRequest",
        })]
    );
}

#[rstest]
#[case(Exchange::new("RemoveDatasourceRequest", true, Some(resource_reply("ERROR"))), true)]
#[case(
    Exchange::new(
        "EchoRequest",
        false,
        Some(RawMessage::new("EchoResponse", json!({"reply": "ECHO []"}), None))
    ),
    true
)]
#[case(Exchange::new("RemoveDatasourceRequest", true, Some(resource_reply("OK"))), false)]
#[case(Exchange::new("GenericErrorResponse", false, None), true)]
fn other_outcomes_are_not_notified(
    spool_dir: TempDir,
    #[case] exchange: Exchange,
    #[case] sent: bool,
) {
    let path = spool_path(&spool_dir);
    let sink = Arc::new(StorageSink::start(Box::new(SpoolWriter::new(path.clone()))).expect("sink"));
    let dispatcher = NotificationDispatcher::new(Arc::clone(&sink));

    let failure = io::Error::from(io::ErrorKind::BrokenPipe);
    let outcome = if sent { Ok(()) } else { Err(&failure) };
    dispatcher.on_response(&exchange, outcome);
    drop(dispatcher);
    drop(Arc::into_inner(sink));

    assert!(!path.exists(), "nothing should be spooled");
}
