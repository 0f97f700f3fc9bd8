//! Text Reply Tests
//!
//! Tests for the text reply encoder.

use bytes::Bytes;
use mcwire::protocol::{McReply, MetagetInfo, OpKind, ResultCode, Value};
use mcwire::serialize::{AsciiReplySerializer, REPLY_MAX_IOVS};

// =============================================================================
// Helpers
// =============================================================================

fn render(reply: McReply, key: &str) -> String {
    let mut serializer = AsciiReplySerializer::new();
    let iovs = serializer.prepare(reply, key.as_bytes());
    assert_eq!(iovs.to_vec().len(), iovs.total_len());
    String::from_utf8(iovs.to_vec()).unwrap()
}

fn reply(op: OpKind, result: ResultCode) -> McReply {
    McReply::new(op, result)
}

// =============================================================================
// Get-like Tests
// =============================================================================

#[test]
fn test_get_hit() {
    let out = render(McReply::hit(OpKind::Get, 0, "bar"), "foo");
    assert_eq!(out, "VALUE foo 0 3\r\nbar\r\n");
}

#[test]
fn test_get_hit_with_flags() {
    let out = render(McReply::hit(OpKind::Get, 4096, "hello"), "k");
    assert_eq!(out, "VALUE k 4096 5\r\nhello\r\n");
}

#[test]
fn test_gets_hit_includes_cas() {
    let out = render(McReply::hit(OpKind::Gets, 1, "bar").with_cas(77), "foo");
    assert_eq!(out, "VALUE foo 1 3 77\r\nbar\r\n");
}

#[test]
fn test_get_cas_ignored_for_plain_get() {
    let out = render(McReply::hit(OpKind::Get, 0, "bar").with_cas(77), "foo");
    assert_eq!(out, "VALUE foo 0 3\r\nbar\r\n");
}

#[test]
fn test_stale_hit_is_still_a_hit() {
    let out = render(
        reply(OpKind::Get, ResultCode::FoundStale).with_value("old"),
        "k",
    );
    assert_eq!(out, "VALUE k 0 3\r\nold\r\n");
}

#[test]
fn test_get_hit_with_fragmented_value() {
    let value = Value::from_fragments(vec![Bytes::from_static(b"ba"), Bytes::from_static(b"r")]);
    let out = render(McReply::hit(OpKind::Get, 0, value), "foo");
    assert_eq!(out, "VALUE foo 0 3\r\nbar\r\n");
}

#[test]
fn test_get_miss_is_silent() {
    assert_eq!(render(McReply::miss(OpKind::Get), "foo"), "");
}

#[test]
fn test_empty_key_ends_sequence() {
    assert_eq!(render(McReply::miss(OpKind::Get), ""), "END\r\n");
    assert_eq!(render(McReply::hit(OpKind::Gets, 0, "x"), ""), "END\r\n");
}

#[test]
fn test_empty_key_propagates_pending_error() {
    let out = render(reply(OpKind::Get, ResultCode::Busy), "");
    assert_eq!(out, "SERVER_ERROR 307 busy\r\nEND\r\n");

    let out = render(
        McReply::error(OpKind::Get, ResultCode::RemoteError, "backend down"),
        "",
    );
    assert_eq!(out, "SERVER_ERROR backend down\r\nEND\r\n");
}

#[test]
fn test_get_error_with_key() {
    let out = render(reply(OpKind::Get, ResultCode::Timeout), "foo");
    assert_eq!(out, "SERVER_ERROR timeout\r\n");
}

#[test]
fn test_lease_get_not_found_issues_lease() {
    let out = render(
        reply(OpKind::LeaseGet, ResultCode::NotFound).with_lease_token(42),
        "foo",
    );
    assert_eq!(out, "LVALUE foo 42 0 0\r\n\r\n");
}

#[test]
fn test_lease_get_hot_miss() {
    let out = render(reply(OpKind::LeaseGet, ResultCode::NotFoundHot), "foo");
    assert_eq!(out, "NOT_FOUND_HOT\r\n");
}

#[test]
fn test_lease_get_hit() {
    let out = render(McReply::hit(OpKind::LeaseGet, 2, "val"), "foo");
    assert_eq!(out, "VALUE foo 2 3\r\nval\r\n");
}

#[test]
fn test_metaget_hit() {
    let info = MetagetInfo {
        age: Some(10),
        exptime: 20,
        ip: Some("10.0.0.1".parse().unwrap()),
    };
    let out = render(
        reply(OpKind::Metaget, ResultCode::Found).with_metaget(info),
        "foo",
    );
    assert_eq!(
        out,
        "META foo age: 10; exptime: 20; from: 10.0.0.1; is_transient: 0\r\n"
    );
}

#[test]
fn test_metaget_unknown_fields() {
    let out = render(reply(OpKind::Metaget, ResultCode::Found), "foo");
    assert_eq!(
        out,
        "META foo age: unknown; exptime: 0; from: unknown; is_transient: 0\r\n"
    );
}

#[test]
fn test_metaget_widest_fields() {
    let info = MetagetInfo {
        age: Some(u32::MAX),
        exptime: u32::MAX,
        ip: Some("2001:db8:85a3:1234:5678:8a2e:370:7334".parse().unwrap()),
    };
    let out = render(
        reply(OpKind::Metaget, ResultCode::Found).with_metaget(info),
        "foo",
    );
    assert_eq!(
        out,
        "META foo age: 4294967295; exptime: 4294967295; \
         from: 2001:db8:85a3:1234:5678:8a2e:370:7334; is_transient: 0\r\n"
    );
}

#[test]
fn test_metaget_miss_is_silent() {
    assert_eq!(render(McReply::miss(OpKind::Metaget), "foo"), "");
}

// =============================================================================
// Update-like Tests
// =============================================================================

#[test]
fn test_set_stored() {
    assert_eq!(render(reply(OpKind::Set, ResultCode::Ok), "k"), "STORED\r\n");
    assert_eq!(render(reply(OpKind::Set, ResultCode::Stored), "k"), "STORED\r\n");
    assert_eq!(
        render(reply(OpKind::LeaseSet, ResultCode::StaleStored), "k"),
        "STORED\r\n"
    );
}

#[test]
fn test_update_failures() {
    assert_eq!(
        render(reply(OpKind::Add, ResultCode::NotStored), "k"),
        "NOT_STORED\r\n"
    );
    assert_eq!(render(reply(OpKind::Cas, ResultCode::Exists), "k"), "EXISTS\r\n");
    assert_eq!(
        render(reply(OpKind::Cas, ResultCode::NotFound), "k"),
        "NOT_FOUND\r\n"
    );
}

#[test]
fn test_update_unexpected_result() {
    let out = render(reply(OpKind::Set, ResultCode::Deleted), "k");
    assert_eq!(out, "SERVER_ERROR unexpected result deleted (1) for set\r\n");
}

// =============================================================================
// Arithmetic Tests
// =============================================================================

#[test]
fn test_incr_returns_counter() {
    let out = render(reply(OpKind::Incr, ResultCode::Stored).with_delta(5), "c");
    assert_eq!(out, "5\r\n");
}

#[test]
fn test_decr_widest_counter() {
    let out = render(
        reply(OpKind::Decr, ResultCode::Stored).with_delta(u64::MAX),
        "c",
    );
    assert_eq!(out, format!("{}\r\n", u64::MAX));
}

#[test]
fn test_incr_not_found() {
    assert_eq!(
        render(reply(OpKind::Incr, ResultCode::NotFound), "c"),
        "NOT_FOUND\r\n"
    );
}

// =============================================================================
// Delete / Touch Tests
// =============================================================================

#[test]
fn test_delete_replies() {
    assert_eq!(
        render(reply(OpKind::Delete, ResultCode::Deleted), "k"),
        "DELETED\r\n"
    );
    assert_eq!(
        render(reply(OpKind::Delete, ResultCode::NotFound), "k"),
        "NOT_FOUND\r\n"
    );
}

#[test]
fn test_touch_replies() {
    assert_eq!(
        render(reply(OpKind::Touch, ResultCode::Touched), "k"),
        "TOUCHED\r\n"
    );
    assert_eq!(
        render(reply(OpKind::Touch, ResultCode::NotFound), "k"),
        "NOT_FOUND\r\n"
    );
}

// =============================================================================
// Administrative Tests
// =============================================================================

#[test]
fn test_version() {
    let out = render(reply(OpKind::Version, ResultCode::Ok).with_value("1.6.21"), "");
    assert_eq!(out, "VERSION 1.6.21\r\n");

    let out = render(reply(OpKind::Version, ResultCode::Ok), "");
    assert_eq!(out, "VERSION \r\n");
}

#[test]
fn test_stats_lines() {
    let out = render(
        reply(OpKind::Stats, ResultCode::Ok).with_stats(["STAT pid 1", "STAT uptime 5"]),
        "",
    );
    assert_eq!(out, "STAT pid 1\r\nSTAT uptime 5\r\nEND\r\n");
}

#[test]
fn test_stats_without_lines() {
    assert_eq!(render(reply(OpKind::Stats, ResultCode::Ok), ""), "END\r\n");
}

#[test]
fn test_exec() {
    assert_eq!(render(reply(OpKind::Exec, ResultCode::Ok), ""), "OK\r\n");
    let out = render(reply(OpKind::Exec, ResultCode::Ok).with_value("done"), "");
    assert_eq!(out, "done\r\n");
}

#[test]
fn test_ok_commands_treat_non_errors_as_success() {
    for op in [OpKind::Shutdown, OpKind::FlushAll, OpKind::FlushRe] {
        assert_eq!(render(reply(op, ResultCode::Ok), ""), "OK\r\n");
        assert_eq!(render(reply(op, ResultCode::Unknown), ""), "OK\r\n");
    }
    let mut serializer = AsciiReplySerializer::new();
    serializer.prepare(reply(OpKind::FlushAll, ResultCode::NotFound), b"");
    assert_eq!(serializer.unexpected_results(), 0);
}

#[test]
fn test_flush_error() {
    let out = render(reply(OpKind::FlushRe, ResultCode::ConnectError), "");
    assert_eq!(out, "SERVER_ERROR connection error\r\n");
}

#[test]
fn test_quit_is_silent() {
    assert_eq!(render(reply(OpKind::Quit, ResultCode::Ok), ""), "");
    assert_eq!(
        render(reply(OpKind::Quit, ResultCode::LocalError), ""),
        "SERVER_ERROR local error\r\n"
    );
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_client_error_with_message() {
    let out = render(
        McReply::error(OpKind::Set, ResultCode::ClientError, "bad command line format"),
        "k",
    );
    assert_eq!(out, "CLIENT_ERROR bad command line format\r\n");
}

#[test]
fn test_server_error_with_app_code() {
    let out = render(
        McReply::error(OpKind::Delete, ResultCode::RemoteError, "boom").with_app_error_code(42),
        "k",
    );
    assert_eq!(out, "SERVER_ERROR 42 boom\r\n");
}

#[test]
fn test_client_category_selects_prefix() {
    let out = render(
        McReply::error(OpKind::Touch, ResultCode::BadKey, "key too long"),
        "k",
    );
    assert_eq!(out, "CLIENT_ERROR key too long\r\n");

    let out = render(McReply::error(OpKind::Touch, ResultCode::Busy, "slow"), "k");
    assert_eq!(out, "SERVER_ERROR slow\r\n");
}

#[test]
fn test_canonical_lines_without_message() {
    assert_eq!(
        render(reply(OpKind::Set, ResultCode::ClientError), "k"),
        "CLIENT_ERROR\r\n"
    );
    assert_eq!(
        render(reply(OpKind::Set, ResultCode::BadExptime), "k"),
        "CLIENT_ERROR bad exptime\r\n"
    );
    assert_eq!(
        render(reply(OpKind::Incr, ResultCode::TryAgain), "k"),
        "SERVER_ERROR 302 try again\r\n"
    );
}

#[test]
fn test_empty_message_uses_canonical_line() {
    let out = render(McReply::error(OpKind::Set, ResultCode::BadFlags, ""), "k");
    assert_eq!(out, "CLIENT_ERROR bad flags\r\n");
}

#[test]
fn test_app_code_ignored_without_message() {
    let out = render(
        reply(OpKind::Set, ResultCode::Aborted).with_app_error_code(9),
        "k",
    );
    assert_eq!(out, "SERVER_ERROR aborted\r\n");
}

// =============================================================================
// Unexpected Result Tests
// =============================================================================

#[test]
fn test_unexpected_is_counted() {
    let mut serializer = AsciiReplySerializer::new();

    let out = serializer
        .prepare(reply(OpKind::Touch, ResultCode::Exists), b"k")
        .to_vec();
    assert_eq!(out, b"SERVER_ERROR unexpected result exists (11) for touch\r\n");

    let out = serializer
        .prepare(reply(OpKind::Version, ResultCode::NotFound), b"")
        .to_vec();
    assert_eq!(
        out,
        b"SERVER_ERROR unexpected result not_found (5) for version\r\n"
    );
    assert_eq!(serializer.unexpected_results(), 2);
}

#[test]
fn test_unexpected_line_names() {
    let out = render(reply(OpKind::Metaget, ResultCode::Stored), "k");
    assert_eq!(
        out,
        "SERVER_ERROR unexpected result stored (10) for metaget\r\n"
    );

    let out = render(reply(OpKind::FlushAll, ResultCode::Unknown), "");
    assert_eq!(out, "OK\r\n");

    let out = render(reply(OpKind::LeaseSet, ResultCode::FoundStale), "k");
    assert_eq!(
        out,
        "SERVER_ERROR unexpected result found_stale (4) for lease-set\r\n"
    );
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_prepare_replaces_previous_reply() {
    let mut serializer = AsciiReplySerializer::new();

    let first = serializer
        .prepare(McReply::hit(OpKind::Get, 0, "a long value"), b"key")
        .to_vec();
    assert!(!first.is_empty());

    let second = serializer
        .prepare(reply(OpKind::Delete, ResultCode::Deleted), b"key")
        .to_vec();
    assert_eq!(second, b"DELETED\r\n");
    assert_eq!(serializer.total_len(), second.len());
}

#[test]
fn test_clear_resets() {
    let mut serializer = AsciiReplySerializer::new();
    serializer.prepare(
        McReply::error(OpKind::Set, ResultCode::BadValue, "too big"),
        b"k",
    );
    assert!(!serializer.is_clear());

    serializer.clear();
    assert!(serializer.is_clear());
    assert_eq!(serializer.total_len(), 0);

    // Clearing twice is harmless
    serializer.clear();
    assert!(serializer.is_clear());
}

#[test]
fn test_write_to_matches_gathered_bytes() {
    let mut serializer = AsciiReplySerializer::new();
    let iovs = serializer.prepare(McReply::hit(OpKind::Gets, 3, "value").with_cas(1), b"key");

    let mut sink = Vec::new();
    iovs.write_to(&mut sink).unwrap();
    assert_eq!(sink, iovs.to_vec());
    assert_eq!(sink, b"VALUE key 3 5 1\r\nvalue\r\n");
}

// =============================================================================
// Whole-grid Properties
// =============================================================================

#[test]
fn test_total_len_matches_descriptors_for_every_pair() {
    let mut serializer = AsciiReplySerializer::new();

    for op in OpKind::ALL {
        for result in ResultCode::ALL {
            for key in [&b""[..], &b"some-key"[..]] {
                for message in [None, Some("diagnostic")] {
                    let mut r = McReply::new(op, result)
                        .with_value("payload")
                        .with_flags(u32::MAX)
                        .with_cas(u64::MAX)
                        .with_lease_token(u64::MAX)
                        .with_delta(u64::MAX)
                        .with_app_error_code(u16::MAX)
                        .with_stats(["a 1", "b 2"]);
                    if let Some(message) = message {
                        r = r.with_message(message);
                    }

                    let iovs = serializer.prepare(r, key);
                    let sum: usize = iovs.as_slices().iter().map(|s| s.len()).sum();
                    assert_eq!(sum, iovs.total_len(), "{} / {}", op.name(), result.name());
                    assert!(iovs.len() <= REPLY_MAX_IOVS);

                    let text = iovs.to_vec();
                    assert!(
                        text.is_empty() || text.ends_with(b"\r\n"),
                        "{} / {} produced an unterminated reply",
                        op.name(),
                        result.name()
                    );
                }
            }
        }
    }
}

#[test]
fn test_error_results_always_produce_error_line() {
    let mut serializer = AsciiReplySerializer::new();

    for op in OpKind::ALL {
        for result in ResultCode::ALL.into_iter().filter(|r| r.is_error()) {
            let text = serializer.prepare(McReply::new(op, result), b"k").to_vec();
            let expected_prefix: &[u8] = if result.is_client_error() {
                b"CLIENT_ERROR"
            } else {
                b"SERVER_ERROR"
            };
            assert!(
                text.starts_with(expected_prefix),
                "{} / {}",
                op.name(),
                result.name()
            );
        }
    }
    assert_eq!(serializer.unexpected_results(), 0);
}
