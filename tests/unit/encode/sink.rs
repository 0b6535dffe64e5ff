use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::default(),
        total_frames: 2,
    }
}

#[test]
fn in_memory_sink_records_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &FrameRGBA::transparent(2, 2))
        .unwrap();
    sink.push_frame(FrameIndex(1), &FrameRGBA::transparent(2, 2))
        .unwrap();
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.config().unwrap().total_frames, 2);
}

#[test]
fn in_memory_sink_rejects_gaps_and_wrong_sizes() {
    let mut sink = InMemorySink::new();
    assert!(
        sink.push_frame(FrameIndex(0), &FrameRGBA::transparent(2, 2))
            .is_err()
    );
    sink.begin(cfg()).unwrap();
    assert!(
        sink.push_frame(FrameIndex(1), &FrameRGBA::transparent(2, 2))
            .is_err()
    );
    assert!(
        sink.push_frame(FrameIndex(0), &FrameRGBA::transparent(4, 2))
            .is_err()
    );
}
