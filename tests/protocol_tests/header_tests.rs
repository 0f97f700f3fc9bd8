//! Header Tests
//!
//! Tests for binary header encoding, parsing and extras blocks.

use mcwire::protocol::{
    body_length, ArithExtras, Extras, FlushExtras, Opcode, RequestHeader, ResponseHeader,
    ResponseStatus, SetExtras, TouchExtras, HEADER_SIZE, MAX_EXTRAS_SIZE, MAX_KEY_LEN,
    REQUEST_MAGIC, RESPONSE_MAGIC,
};
use mcwire::WireError;

// =============================================================================
// Request Header Tests
// =============================================================================

#[test]
fn test_request_header_layout_is_big_endian() {
    let header = RequestHeader::for_body(Opcode::Set, 8, 3, 0x0102)
        .unwrap()
        .with_cas(0x0A0B_0C0D_0E0F_1011);
    let bytes = header.encode();

    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(bytes[0], REQUEST_MAGIC);
    assert_eq!(bytes[1], 0x01);
    assert_eq!(&bytes[2..4], &[0x00, 0x03]);
    assert_eq!(bytes[4], 8);
    assert_eq!(bytes[5], 0);
    assert_eq!(&bytes[6..8], &[0x00, 0x00]);
    // 8 + 3 + 0x0102 = 0x010D
    assert_eq!(&bytes[8..12], &[0x00, 0x00, 0x01, 0x0D]);
    assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);
    assert_eq!(
        &bytes[16..24],
        &[0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10, 0x11]
    );
}

#[test]
fn test_request_header_parse_back() {
    let header = RequestHeader::for_body(Opcode::Touch, 4, 5, 0)
        .unwrap()
        .with_cas(99);
    let parsed = RequestHeader::parse(&header.encode()).unwrap();

    assert_eq!(parsed, header);
    assert_eq!(parsed.value_len(), 0);
}

#[test]
fn test_request_header_value_len() {
    let header = RequestHeader::for_body(Opcode::Set, 8, 3, 100).unwrap();
    assert_eq!(header.total_body_len, 111);
    assert_eq!(header.value_len(), 100);
}

#[test]
fn test_parse_ignores_trailing_body() {
    let header = RequestHeader::for_body(Opcode::Get, 0, 3, 0).unwrap();
    let mut frame = header.encode().to_vec();
    frame.extend_from_slice(b"foo");

    let parsed = RequestHeader::parse(&frame).unwrap();
    assert_eq!(parsed.key_len, 3);
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_parse_rejects_short_input() {
    let bytes = [REQUEST_MAGIC; 10];
    let result = RequestHeader::parse(&bytes);
    assert!(matches!(result, Err(WireError::Protocol(_))));
}

#[test]
fn test_parse_rejects_wrong_magic() {
    let header = RequestHeader::for_body(Opcode::Get, 0, 1, 0).unwrap();
    let bytes = header.encode();

    // A request header is not a response header
    assert!(matches!(
        ResponseHeader::parse(&bytes),
        Err(WireError::Protocol(_))
    ));
}

#[test]
fn test_parse_rejects_unknown_opcode() {
    let mut bytes = RequestHeader::for_body(Opcode::Get, 0, 1, 0)
        .unwrap()
        .encode();
    bytes[1] = 0x7F;

    match RequestHeader::parse(&bytes) {
        Err(WireError::Protocol(msg)) => assert!(msg.contains("opcode")),
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_parse_rejects_inconsistent_body_length() {
    let mut header = RequestHeader::for_body(Opcode::Set, 8, 3, 0).unwrap();
    header.total_body_len = 5;
    let bytes = header.encode();

    assert!(matches!(
        RequestHeader::parse(&bytes),
        Err(WireError::Protocol(_))
    ));
}

// =============================================================================
// Body Length Tests
// =============================================================================

#[test]
fn test_body_length_sums_parts() {
    assert_eq!(body_length(3, 8, 5).unwrap(), 16);
    assert_eq!(body_length(0, 0, 0).unwrap(), 0);
}

#[test]
fn test_body_length_rejects_long_key() {
    match body_length(MAX_KEY_LEN + 1, 0, 0) {
        Err(WireError::FieldTooLarge { field, value, max }) => {
            assert_eq!(field, "key length");
            assert_eq!(value, MAX_KEY_LEN as u64 + 1);
            assert_eq!(max, MAX_KEY_LEN as u64);
        }
        other => panic!("Expected FieldTooLarge, got {:?}", other),
    }
}

#[test]
fn test_body_length_accepts_longest_key() {
    assert_eq!(body_length(MAX_KEY_LEN, 0, 0).unwrap(), MAX_KEY_LEN as u32);
}

#[test]
fn test_body_length_rejects_oversized_extras() {
    assert!(matches!(
        body_length(0, 256, 0),
        Err(WireError::FieldTooLarge { field: "extras length", .. })
    ));
}

#[test]
fn test_body_length_rejects_total_overflow() {
    let value_len = u32::MAX as usize;
    assert!(matches!(
        body_length(1, 0, value_len),
        Err(WireError::FieldTooLarge { field: "total body length", .. })
    ));
    assert!(body_length(0, 0, value_len).is_ok());
}

#[test]
fn test_body_length_does_not_wrap() {
    assert!(body_length(1, 1, usize::MAX).is_err());
}

// =============================================================================
// Response Header Tests
// =============================================================================

#[test]
fn test_response_header_status() {
    let header =
        ResponseHeader::for_body(Opcode::Get, ResponseStatus::KeyNotFound, 0, 0, 9).unwrap();
    let bytes = header.encode();

    assert_eq!(bytes[0], RESPONSE_MAGIC);
    assert_eq!(&bytes[6..8], &[0x00, 0x01]);

    let parsed = ResponseHeader::parse(&bytes).unwrap();
    assert_eq!(parsed.status(), Some(ResponseStatus::KeyNotFound));
    assert_eq!(parsed.value_len(), 9);
    assert_eq!(
        ResponseStatus::KeyNotFound.description(),
        "Key not found"
    );
}

#[test]
fn test_response_status_unknown() {
    assert_eq!(ResponseStatus::from_u16(0x00FF), None);
    assert_eq!(ResponseStatus::from_u16(0x0085), Some(ResponseStatus::Busy));
}

// =============================================================================
// Extras Tests
// =============================================================================

#[test]
fn test_set_extras() {
    let extras = SetExtras {
        flags: 0xDEAD_BEEF,
        exptime: 3600,
    };
    let mut buf = [0u8; SetExtras::SIZE];
    extras.write(&mut buf);

    assert_eq!(&buf[0..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(&buf[4..8], &3600u32.to_be_bytes());
    assert_eq!(SetExtras::parse(&buf).unwrap(), extras);
}

#[test]
fn test_arith_extras_is_largest() {
    assert_eq!(ArithExtras::SIZE, MAX_EXTRAS_SIZE);
    assert!(SetExtras::SIZE < MAX_EXTRAS_SIZE);
    assert!(TouchExtras::SIZE < MAX_EXTRAS_SIZE);
    assert!(FlushExtras::SIZE < MAX_EXTRAS_SIZE);
}

#[test]
fn test_arith_extras_fields() {
    let extras = ArithExtras {
        delta: 7,
        initial_value: 0,
        exptime: 60,
    };
    let mut buf = [0u8; ArithExtras::SIZE];
    extras.write(&mut buf);

    assert_eq!(&buf[0..4], &[0, 0, 0, 7]);
    assert_eq!(&buf[4..8], &[0, 0, 0, 0]);
    assert_eq!(&buf[8..12], &[0, 0, 0, 60]);
}

#[test]
fn test_extras_parse_rejects_short_input() {
    assert!(matches!(
        TouchExtras::parse(&[0, 0]),
        Err(WireError::Protocol(_))
    ));
    assert!(matches!(
        ArithExtras::parse(&[0u8; 8]),
        Err(WireError::Protocol(_))
    ));
}
