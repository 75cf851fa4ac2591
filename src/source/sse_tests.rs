//! Tests for event-stream parsing.

use super::*;
use futures_util::stream;

fn parse_all(input: &str) -> Vec<String> {
    EventParser::new().feed(input.as_bytes()).unwrap()
}

// ===== Framing =====

#[test]
fn single_data_line_dispatches_on_blank_line() {
    assert_eq!(parse_all("data: cats sleep a lot\n\n"), vec!["cats sleep a lot"]);
}

#[test]
fn message_without_blank_line_is_not_dispatched() {
    assert!(parse_all("data: pending\n").is_empty());
}

#[test]
fn multi_line_data_is_joined_with_newline() {
    assert_eq!(
        parse_all("data: first\ndata: second\ndata:third\n\n"),
        vec!["first\nsecond\nthird"]
    );
}

#[test]
fn only_one_leading_space_is_stripped() {
    assert_eq!(parse_all("data:   padded\n\n"), vec!["  padded"]);
}

#[test]
fn comments_are_ignored() {
    assert_eq!(
        parse_all(": keep-alive\ndata: x\n: another\n\n"),
        vec!["x"]
    );
}

#[test]
fn crlf_and_cr_line_endings_are_accepted() {
    assert_eq!(parse_all("data: a\r\n\r\ndata: b\r\r"), vec!["a", "b"]);
}

#[test]
fn blank_line_without_data_dispatches_nothing() {
    assert!(parse_all("\n\nevent: ping\n\n").is_empty());
}

#[test]
fn empty_data_field_dispatches_empty_message() {
    assert_eq!(parse_all("data\n\n"), vec![""]);
}

#[test]
fn named_events_are_skipped_but_message_events_delivered() {
    assert_eq!(
        parse_all("event: update\ndata: skip\n\nevent: message\ndata: keep\n\ndata: plain\n\n"),
        vec!["keep", "plain"]
    );
}

#[test]
fn id_and_retry_fields_do_not_affect_payload() {
    assert_eq!(parse_all("id: 7\nretry: 100\ndata: x\n\n"), vec!["x"]);
}

#[test]
fn chunks_may_split_lines_and_characters() {
    let mut parser = EventParser::new();
    let bytes = "data: caf\u{e9}\r\n\r\n".as_bytes();
    let mut out = Vec::new();
    for byte in bytes {
        out.extend(parser.feed(std::slice::from_ref(byte)).unwrap());
    }
    assert_eq!(out, vec!["caf\u{e9}"]);
}

#[test]
fn cr_at_chunk_end_followed_by_lf_is_one_line_break() {
    let mut parser = EventParser::new();
    assert!(parser.feed(b"data: a\r").unwrap().is_empty());
    assert!(parser.feed(b"\n").unwrap().is_empty());
    assert_eq!(parser.feed(b"\r\n").unwrap(), vec!["a"]);
}

// ===== Limits =====

#[test]
fn unterminated_line_past_limit_is_rejected() {
    let mut parser = EventParser::with_max_event_bytes(16);

    assert!(parser.feed(b"data: 0123456789").unwrap().is_empty());
    assert_eq!(parser.feed(b"abcdef"), Err(EventTooLarge { limit: 16 }));
}

#[test]
fn many_data_lines_without_dispatch_count_toward_limit() {
    let mut parser = EventParser::with_max_event_bytes(16);

    assert!(parser.feed(b"data: 12345\ndata: 67890\n").unwrap().is_empty());
    assert!(parser.feed(b"data: abcdefgh\n").is_err());
}

#[test]
fn dispatch_resets_the_budget() {
    let mut parser = EventParser::with_max_event_bytes(16);

    for i in 0..100 {
        let frame = format!("data: {:05}\n\n", i);
        assert_eq!(parser.feed(frame.as_bytes()).unwrap(), vec![format!("{:05}", i)]);
    }
}

// ===== Stream adapter =====

#[tokio::test]
async fn messages_ends_with_closed_error() {
    let chunks: Vec<Result<&[u8], String>> = vec![Ok(&b"data: one\n\nda"[..]), Ok(&b"ta: two\n\n"[..])];
    let collected: Vec<_> = messages(stream::iter(chunks), "https://x/stream".to_string())
        .collect()
        .await;

    assert_eq!(
        collected,
        vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Err(TransportError::Closed {
                url: "https://x/stream".to_string()
            }),
        ]
    );
}

#[tokio::test]
async fn messages_reports_read_failure_once() {
    let chunks: Vec<Result<&[u8], String>> = vec![
        Ok(&b"data: one\n\n"[..]),
        Err("connection reset".to_string()),
        Ok(&b"data: never\n\n"[..]),
    ];
    let collected: Vec<_> = messages(stream::iter(chunks), "u".to_string())
        .collect()
        .await;

    assert_eq!(
        collected,
        vec![
            Ok("one".to_string()),
            Err(TransportError::Stream {
                url: "u".to_string(),
                reason: "connection reset".to_string()
            }),
        ]
    );
}

#[tokio::test]
async fn oversized_event_ends_stream_with_stream_error() {
    let chunks: Vec<Result<&[u8], String>> = vec![
        Ok(&b"data: ok\n\n"[..]),
        Ok(&b"data: this line never ends"[..]),
        Ok(&b"data: never\n\n"[..]),
    ];
    let parser = EventParser::with_max_event_bytes(12);
    let collected: Vec<_> = messages_with_parser(stream::iter(chunks), "u".to_string(), parser)
        .collect()
        .await;

    assert_eq!(
        collected,
        vec![
            Ok("ok".to_string()),
            Err(TransportError::Stream {
                url: "u".to_string(),
                reason: "event exceeds 12 bytes without being dispatched".to_string()
            }),
        ]
    );
}
