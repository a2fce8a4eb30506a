//! Unit tests for gateway framing.

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::{
    AddDatasourceRequest, AddJdbcDriverRequest, DeployApplicationRequest, EchoRequest,
    EchoResponse, RemoveDatasourceResponse, ResourceRequest, ResourceResponseFields,
    ResponseStatus,
};

#[rstest]
fn decodes_text_frame_with_qualified_name() {
    let frame = br#"org.hawkular.cmdgw.api.EchoRequest={"echoMessage":"hi"}"#;
    let raw = decode(frame).expect("decode");
    assert_eq!(raw.name(), "EchoRequest");
    assert!(raw.binary_data().is_none());
    let envelope = raw.into_envelope::<EchoRequest>().expect("echo");
    assert_eq!(envelope.basic_message.echo_message, "hi");
}

#[rstest]
fn trailing_bytes_become_binary_data() {
    let mut frame = br#"DeployApplicationRequest={"resourcePath":"/t;x/f;y/r;z","destinationFileName":"app.war"}"#.to_vec();
    frame.extend_from_slice(&[0x50, 0x4b, 0x03, 0x04, b'{', b'=']);

    let envelope = decode_as::<DeployApplicationRequest>(&frame).expect("decode");
    assert_eq!(
        envelope.binary_data.as_deref(),
        Some(&[0x50, 0x4b, 0x03, 0x04, b'{', b'='][..])
    );
    assert_eq!(envelope.basic_message.resource_id(), Some("/t;x/f;y/r;z"));
    assert_eq!(
        envelope.basic_message.deployment.destination_file_name.as_deref(),
        Some("app.war")
    );
}

#[rstest]
#[case(b"".as_slice())]
#[case(b"\n".as_slice())]
#[case(b"\r\n".as_slice())]
fn final_line_ending_is_not_binary(#[case] ending: &[u8]) {
    let mut frame = b"EchoRequest={\"echoMessage\":\"x\"}".to_vec();
    frame.extend_from_slice(ending);
    let raw = decode(&frame).expect("decode");
    assert!(raw.binary_data().is_none());
}

#[rstest]
#[case(b"  ".as_slice())]
#[case(b"\n\n".as_slice())]
#[case(b"\t\r\n ".as_slice())]
fn whitespace_payload_is_kept_as_binary(#[case] payload: &[u8]) {
    let mut frame = br#"DeployApplicationRequest={"destinationFileName":"notes.txt"}"#.to_vec();
    frame.extend_from_slice(payload);
    let raw = decode(&frame).expect("decode");
    assert_eq!(raw.binary_data(), Some(payload));
}

#[rstest]
#[case(b"no separator here".as_slice())]
#[case(b"={}".as_slice())]
#[case(b"Bad Name={}".as_slice())]
fn rejects_frames_without_a_name(#[case] frame: &[u8]) {
    let error = decode(frame).expect_err("must fail");
    assert!(matches!(error, CodecError::MissingName { .. }), "{error}");
}

#[rstest]
fn invalid_json_names_the_message() {
    let error = decode(b"EchoRequest={not json").expect_err("must fail");
    assert!(error.to_string().starts_with("cannot decode EchoRequest body"));
}

#[rstest]
fn quoted_scalars_are_accepted() {
    let frame = br#"AddJdbcDriverRequest={"resourceId":"feed~Local~/","driverName":"mysql","driverMajorVersion":"5","jdbcCompliant":"TRUE"}"#;
    let envelope = decode_as::<AddJdbcDriverRequest>(frame).expect("decode");
    let request = envelope.basic_message;
    assert_eq!(request.driver_major_version, Some(5));
    assert_eq!(request.driver_minor_version, None);
    assert_eq!(request.jdbc_compliant, Some(true));
}

#[rstest]
fn datasource_properties_and_xa_flag_decode() {
    let frame = br#"AddDatasourceRequest={"resourcePath":"r","xaDatasource":"false","datasourceName":"ds","datasourceProperties":{"a":"1"}}"#;
    let request = decode_as::<AddDatasourceRequest>(frame)
        .expect("decode")
        .basic_message;
    assert_eq!(request.xa_datasource, Some(false));
    assert_eq!(request.datasource.datasource_name.as_deref(), Some("ds"));
    assert_eq!(request.datasource.datasource_properties.get("a").map(String::as_str), Some("1"));
}

#[rstest]
fn wrong_type_is_reported() {
    let raw = decode(b"EchoRequest={}").expect("decode");
    let error = raw.into_envelope::<EchoResponse>().expect_err("must fail");
    assert_eq!(error.to_string(), "expected EchoResponse message but received EchoRequest");
}

#[rstest]
fn encode_appends_binary_after_json() {
    let message = EchoResponse {
        reply: "ECHO [hi]".to_owned(),
    };
    let frame = encode(MessageEnvelope::with_binary(message, vec![1, 2, 3])).expect("encode");
    let mut expected = br#"EchoResponse={"reply":"ECHO [hi]"}"#.to_vec();
    expected.extend_from_slice(&[1, 2, 3]);
    assert_eq!(frame, expected);
}

#[rstest]
fn responses_serialise_camel_case_with_status() {
    let response = RemoveDatasourceResponse {
        resource: ResourceResponseFields {
            resource_id: Some("r".to_owned()),
            status: ResponseStatus::Ok,
            message: Some("done".to_owned()),
            ..ResourceResponseFields::default()
        },
    };
    let raw = RawMessage::from_message(response).expect("encode");
    assert_eq!(
        raw.body(),
        &json!({"resourceId": "r", "status": "OK", "message": "done"})
    );
}

#[rstest]
fn authentication_is_filled_only_when_missing() {
    let credentials = Authentication::new("jdoe", "secret");
    let mut response = RawMessage::from_message(RemoveDatasourceResponse::default()).expect("encode");
    assert!(response.fill_authentication(&credentials));
    assert_eq!(
        response.body().get("authentication"),
        Some(&json!({"username": "jdoe", "password": "secret"}))
    );
    assert!(!response.fill_authentication(&Authentication::new("other", "pw")));

    let mut echo = RawMessage::from_message(EchoResponse::default()).expect("encode");
    assert!(!echo.fill_authentication(&credentials));
}

#[rstest]
#[case("EchoRequest", "EchoResponse")]
#[case("GenericErrorResponse", "GenericErrorResponse")]
fn maps_request_to_response_name(#[case] request: &str, #[case] response: &str) {
    assert_eq!(crate::response_name_for(request), response);
}
