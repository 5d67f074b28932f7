use xhs_note_writer::WriterError;
use xhs_note_writer::metrics::StreamMetrics;
use xhs_note_writer::models::StreamFrame;
use xhs_note_writer::streaming::{StreamAccumulator, StreamReassembler, StreamStatus};
use std::sync::Arc;

#[test]
fn test_hello_split_across_chunks() {
    let mut acc = StreamAccumulator::new();

    assert_eq!(
        acc.push_str("data: {\"content\":\"He").unwrap(),
        StreamStatus::Open
    );
    assert_eq!(
        acc.push_str("llo\"}\ndata: [DONE]\n").unwrap(),
        StreamStatus::Finished
    );
    assert_eq!(acc.text(), "Hello");
    assert!(acc.is_finished());
}

#[test]
fn test_nothing_processed_after_done() {
    let mut acc = StreamAccumulator::new();

    let status = acc
        .push_str("data: {\"content\":\"A\"}\ndata: [DONE]\ndata: {\"content\":\"B\"}\n")
        .unwrap();
    assert_eq!(status, StreamStatus::Finished);

    acc.push_str("data: {\"content\":\"C\"}\n").unwrap();
    acc.close().unwrap();
    assert_eq!(acc.text(), "A");
}

#[test]
fn test_malformed_frame_is_skipped() {
    let metrics = Arc::new(StreamMetrics::new());
    let mut acc = StreamAccumulator::with_metrics(metrics.clone());

    acc.push_str("data: not json\n").unwrap();
    acc.push_str("data: {\"content\":\"still here\"}\n").unwrap();

    assert_eq!(acc.text(), "still here");
    assert_eq!(metrics.snapshot().malformed_frames, 1);
}

#[test]
fn test_error_frame_aborts() {
    let mut acc = StreamAccumulator::new();

    let err = acc
        .push_str("data: {\"content\":\"ok\"}\ndata: {\"error\":\"rate limited\"}\n")
        .unwrap_err();

    match err {
        WriterError::GenerationError(message) => assert_eq!(message, "rate limited"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(acc.text(), "ok");
}

#[test]
fn test_empty_error_does_not_abort() {
    let mut acc = StreamAccumulator::new();

    acc.push_str("data: {\"content\":\"a\",\"error\":\"\"}\n").unwrap();
    acc.push_str("data: {\"error\":false}\ndata: {\"content\":\"b\"}\n")
        .unwrap();

    assert_eq!(acc.text(), "ab");
}

#[test]
fn test_non_data_lines_ignored() {
    let mut acc = StreamAccumulator::new();

    acc.push_str(": keep-alive\nevent: message\n\nid: 7\ndata:\ndata:   \n")
        .unwrap();
    acc.push_str("  data: {\"content\":\"x\"}  \n").unwrap();
    acc.push_str("data: {\"other\":1}\n").unwrap();

    assert_eq!(acc.text(), "x");
}

#[test]
fn test_trailing_frame_without_newline() {
    let mut acc = StreamAccumulator::new();

    acc.push_str("data: {\"content\":\"a\"}\ndata: {\"content\":\"b\"}")
        .unwrap();
    assert_eq!(acc.text(), "a");

    assert_eq!(acc.close().unwrap(), StreamStatus::Finished);
    assert_eq!(acc.text(), "ab");
}

#[test]
fn test_multibyte_split_across_byte_chunks() {
    let body = "data: {\"content\":\"你好，世界\"}\ndata: [DONE]\n".as_bytes();

    for chunk_size in 1..8 {
        let mut acc = StreamAccumulator::new();
        for chunk in body.chunks(chunk_size) {
            acc.push_bytes(chunk).unwrap();
        }
        assert_eq!(acc.text(), "你好，世界", "chunk size {chunk_size}");
        assert!(acc.is_finished());
    }
}

#[test]
fn test_reassembler_emits_frames_in_order() {
    let mut reassembler = StreamReassembler::new();

    let mut frames = reassembler.feed("data: 1\nda");
    frames.extend(reassembler.feed("ta: 2\ndata: [DONE]\ndata: 3\n"));

    assert_eq!(
        frames,
        vec![
            StreamFrame::Payload("1".to_string()),
            StreamFrame::Payload("2".to_string()),
            StreamFrame::Done,
        ]
    );
    assert!(reassembler.finish().is_none());
}
