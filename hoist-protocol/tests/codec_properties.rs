//! Property tests for the streaming frame codec.
//!
//! Host only, proptest does not build for the firmware target.

use hoist_protocol::{Command, Frame, FrameCodec, Marker};
use proptest::prelude::*;

/// Drain every frame currently decodable
fn drain(codec: &mut FrameCodec, out: &mut Vec<Frame>) {
    while let Some(frame) = codec.next_frame() {
        out.push(frame);
    }
}

/// A stream segment: a valid incoming frame or line noise
fn segment() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        (any::<u8>(), proptest::collection::vec(any::<u8>(), 0..6)).prop_map(|(id, payload)| {
            Frame::new(Marker::Incoming, id, &payload)
                .unwrap()
                .encode_to_vec()
                .to_vec()
        }),
        proptest::collection::vec(any::<u8>(), 0..8),
    ]
}

/// A well-formed frame whose body never contains a marker byte
fn clean_frame() -> impl Strategy<Value = Frame> {
    (0u8..0xF2, proptest::collection::vec(0u8..0xF2, 1..6))
        .prop_map(|(id, payload)| Frame::new(Marker::Incoming, id, &payload).unwrap())
}

// ── Chunk boundary independence ───────────────────────────────

proptest! {
    /// Feeding a stream in arbitrary chunks yields the same frames as
    /// feeding it in one piece.
    #[test]
    fn chunking_does_not_change_frames(
        segments in proptest::collection::vec(segment(), 0..24),
        chunk_sizes in proptest::collection::vec(1usize..16, 1..64),
    ) {
        let stream: Vec<u8> = segments.concat();

        let mut whole = FrameCodec::new();
        let mut expected = Vec::new();
        whole.feed(&stream);
        drain(&mut whole, &mut expected);

        let mut chunked = FrameCodec::new();
        let mut actual = Vec::new();
        let mut rest = stream.as_slice();
        let mut sizes = chunk_sizes.iter().cycle();
        while !rest.is_empty() {
            let n = (*sizes.next().unwrap()).min(rest.len());
            chunked.feed(&rest[..n]);
            drain(&mut chunked, &mut actual);
            rest = &rest[n..];
        }

        prop_assert_eq!(expected, actual);
    }
}

// ── Checksum resynchronization ────────────────────────────────

proptest! {
    /// Corrupting one payload byte costs exactly one resync and never the
    /// frame appended right after it.
    #[test]
    fn corrupt_payload_resyncs_to_next_frame(
        bad in clean_frame(),
        good in clean_frame(),
        index in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let mut corrupted = bad.encode_to_vec().to_vec();
        let at = 4 + index.index(bad.payload.len());
        corrupted[at] ^= mask;
        prop_assume!(corrupted[at] != 0xF2);

        let mut codec = FrameCodec::new();
        codec.feed(&corrupted);
        codec.feed(&good.encode_to_vec());

        let mut frames = Vec::new();
        drain(&mut codec, &mut frames);

        prop_assert_eq!(frames, vec![good]);
        prop_assert_eq!(codec.stats().resyncs, 1);
    }
}

// ── GoToHeight round trip ─────────────────────────────────────

#[test]
fn go_to_height_round_trips_for_every_height() {
    for h in 0..=u16::MAX {
        let bytes = FrameCodec::encode(Command::GoToHeight(h));
        let frame = Frame::decode(&bytes).unwrap();
        assert_eq!(Command::from_frame(&frame), Some(Command::GoToHeight(h)));

        let mut sniffer = FrameCodec::for_marker(Marker::Outgoing);
        sniffer.feed(&bytes);
        assert_eq!(sniffer.next_frame(), Some(frame));
    }
}
