use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use spff::host::{FrameAllocator, FrameMut, PacketAllocator};
use spff::*;

fn checkerboard(w: usize, h: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * bpp];
    for y in 0..h {
        for x in 0..w {
            let off = (y * w + x) * bpp;
            for c in 0..bpp {
                pixels[off + c] = if (x + y) % 2 == 0 {
                    200 + (c as u8 * 20)
                } else {
                    10 + (c as u8 * 30)
                };
            }
        }
    }
    pixels
}

fn noise_pattern(w: usize, h: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * bpp];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in pixels.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8;
    }
    pixels
}

#[derive(Default)]
struct Collect(RefCell<Vec<Warning>>);

impl Diagnostics for Collect {
    fn warn(&self, warning: &Warning) {
        self.0.borrow_mut().push(warning.clone());
    }
}

// ── Reference scenario ───────────────────────────────────────────────

#[test]
fn two_by_two_rgb_reference_file() {
    let pixels = PixelBuffer::new(
        vec![
            255, 0, 0, 0, 255, 0, // row 0: red green
            0, 0, 255, 255, 255, 255, // row 1: blue white
        ],
        2,
        2,
        PixelLayout::Rgb24,
    )
    .unwrap();

    let encoded = encode(&pixels, 24).unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(b"SF");
    expected.extend_from_slice(&50u32.to_le_bytes()); // file size
    expected.extend_from_slice(&34u32.to_le_bytes()); // header size
    expected.extend_from_slice(&24u32.to_le_bytes()); // info header size
    expected.extend_from_slice(&2i32.to_le_bytes()); // width
    expected.extend_from_slice(&2i32.to_le_bytes()); // height, positive
    expected.extend_from_slice(&1u16.to_le_bytes()); // planes
    expected.extend_from_slice(&24u16.to_le_bytes()); // bit count
    expected.extend_from_slice(&0u32.to_le_bytes()); // compression
    expected.extend_from_slice(&16u32.to_le_bytes()); // image data size
    // bottom row first, stored B,G,R, padded to 8 bytes
    expected.extend_from_slice(&[255, 0, 0, 255, 255, 255, 0, 0]);
    expected.extend_from_slice(&[0, 0, 255, 0, 255, 0, 0, 0]);
    assert_eq!(encoded, expected);

    let (header, decoded) = DecodeRequest::new(&encoded)
        .with_layout(PixelLayout::Rgb24)
        .decode(Unstoppable)
        .unwrap();
    assert_eq!(header.width, 2);
    assert_eq!(header.height, 2);
    assert_eq!(header.bit_count, 24);
    assert_eq!(header.header_size, 34);
    assert_eq!(header.file_size, 50);
    assert_eq!(header.stride(), 8);
    assert_eq!(header.scan_direction, ScanDirection::BottomUp);
    assert_eq!(decoded, pixels);
}

#[test]
fn native_24bit_decode_is_bgr() {
    let pixels = PixelBuffer::new(vec![1, 2, 3, 4, 5, 6], 2, 1, PixelLayout::Rgb24).unwrap();
    let (_, decoded) = decode(&encode(&pixels, 24).unwrap()).unwrap();
    assert_eq!(decoded.layout, PixelLayout::Bgr24);
    assert_eq!(decoded.pixels(), &[3, 2, 1, 6, 5, 4]);
}

// ── Roundtrips ───────────────────────────────────────────────────────

#[test]
fn roundtrip_every_layout_across_odd_widths() {
    let cases = [
        (8, PixelLayout::Indexed8),
        (8, PixelLayout::Gray8),
        (24, PixelLayout::Bgr24),
        (24, PixelLayout::Rgb24),
    ];
    for (bit_count, layout) in cases {
        for (w, h) in [(1, 1), (2, 3), (3, 2), (5, 4), (7, 1), (1, 7), (13, 5)] {
            let data = noise_pattern(w, h, layout.bytes_per_pixel());
            let pixels = PixelBuffer::new(data, w as u32, h as u32, layout).unwrap();
            let encoded = encode(&pixels, bit_count).unwrap();

            let stride = compute_stride(w as u32, layout.bytes_per_pixel() as u32) as usize;
            let header_size = if bit_count == 8 { 26 } else { 34 };
            assert_eq!(encoded.len(), header_size + stride * h, "{layout:?} {w}x{h}");

            let (header, decoded) = DecodeRequest::new(&encoded)
                .with_layout(layout)
                .with_diagnostics(&Silent)
                .decode(Unstoppable)
                .unwrap();
            assert_eq!((header.width, header.height), (w as u32, h as u32));
            assert_eq!(header.bit_count, bit_count);
            assert_eq!(decoded, pixels, "{layout:?} {w}x{h}");
        }
    }
}

#[test]
fn roundtrip_extreme_aspect_ratios() {
    for (w, h) in [(4096, 1), (1, 4096), (4095, 2)] {
        let data = checkerboard(w, h, 3);
        let pixels = PixelBuffer::new(data, w as u32, h as u32, PixelLayout::Bgr24).unwrap();
        let encoded = encode(&pixels, 24).unwrap();
        let (_, decoded) = decode(&encoded).unwrap();
        assert_eq!(decoded, pixels, "{w}x{h}");
    }
}

#[test]
fn eight_bit_defaults_to_indexed_and_can_read_as_gray() {
    let pixels = PixelBuffer::new(vec![0, 64, 128, 192, 255, 42], 3, 2, PixelLayout::Gray8).unwrap();
    let encoded = encode(&pixels, 8).unwrap();

    let (_, indexed) = decode(&encoded).unwrap();
    assert_eq!(indexed.layout, PixelLayout::Indexed8);
    assert_eq!(indexed.pixels(), pixels.pixels());

    let (_, gray) = DecodeRequest::new(&encoded)
        .with_layout(PixelLayout::Gray8)
        .decode(Unstoppable)
        .unwrap();
    assert_eq!(gray, pixels);
}

#[test]
fn encode_request_infers_depth_from_layout() {
    let pixels = PixelBuffer::new(checkerboard(4, 4, 1), 4, 4, PixelLayout::Indexed8).unwrap();
    let inferred = EncodeRequest::new().encode(&pixels, Unstoppable).unwrap();
    let explicit = encode(&pixels, 8).unwrap();
    assert_eq!(inferred, explicit);
}

#[test]
fn layout_outside_capability_table_is_rejected() {
    let pixels = PixelBuffer::new(vec![9; 4], 2, 2, PixelLayout::Gray8).unwrap();
    let encoded = encode(&pixels, 8).unwrap();
    let err = DecodeRequest::new(&encoded)
        .with_layout(PixelLayout::Rgb24)
        .decode(Unstoppable)
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::LayoutMismatch {
            requested: PixelLayout::Rgb24,
            bit_count: 8
        }
    ));
}

// ── Scan direction ───────────────────────────────────────────────────

#[test]
fn top_down_file_keeps_row_order() {
    let mut file = Vec::new();
    file.extend_from_slice(b"SF");
    file.extend_from_slice(&34u32.to_le_bytes());
    file.extend_from_slice(&26u32.to_le_bytes());
    file.extend_from_slice(&16u32.to_le_bytes());
    file.extend_from_slice(&2i32.to_le_bytes());
    file.extend_from_slice(&(-2i32).to_le_bytes());
    file.extend_from_slice(&1u16.to_le_bytes());
    file.extend_from_slice(&8u16.to_le_bytes());
    file.extend_from_slice(&[1, 2, 0, 0, 3, 4, 0, 0]);

    let (header, decoded) = decode(&file).unwrap();
    assert_eq!(header.height, 2);
    assert_eq!(header.scan_direction, ScanDirection::TopDown);
    assert_eq!(decoded.pixels(), &[1, 2, 3, 4]);

    // Flipping the sign flips the output.
    file[18..22].copy_from_slice(&2i32.to_le_bytes());
    let (header, decoded) = decode(&file).unwrap();
    assert_eq!(header.scan_direction, ScanDirection::BottomUp);
    assert_eq!(decoded.pixels(), &[3, 4, 1, 2]);
}

// ── Host hooks ───────────────────────────────────────────────────────

struct FixedPacket {
    buf: [u8; 64],
}

impl PacketAllocator for FixedPacket {
    fn allocate_packet(&mut self, n_bytes: usize) -> Result<&mut [u8], AllocError> {
        self.buf
            .get_mut(..n_bytes)
            .ok_or(AllocError { requested: n_bytes })
    }
}

#[test]
fn encode_into_host_packet() {
    let pixels = PixelBuffer::new(vec![7; 6], 2, 1, PixelLayout::Bgr24).unwrap();
    let mut packets = FixedPacket { buf: [0xAA; 64] };
    let n = EncodeRequest::new()
        .encode_into_packet(&pixels, &mut packets, Unstoppable)
        .unwrap();
    assert_eq!(n, 34 + 8);
    assert_eq!(&packets.buf[..n], &encode(&pixels, 24).unwrap()[..]);
    assert_eq!(packets.buf[n], 0xAA);
}

#[test]
fn packet_allocation_failure_is_reported() {
    let pixels = PixelBuffer::new(vec![7; 300], 100, 1, PixelLayout::Bgr24).unwrap();
    let mut packets = FixedPacket { buf: [0; 64] };
    let err = EncodeRequest::new()
        .encode_into_packet(&pixels, &mut packets, Unstoppable)
        .unwrap_err();
    assert!(matches!(
        err,
        EncodeError::AllocationFailed { requested: 334 }
    ));
}

struct PaddedFrames {
    data: Vec<u8>,
    stride: usize,
}

impl FrameAllocator for PaddedFrames {
    fn allocate_frame(
        &mut self,
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<FrameMut<'_>, AllocError> {
        self.stride = width as usize * layout.bytes_per_pixel() + 5;
        self.data = vec![0xEE; self.stride * height as usize];
        Ok(FrameMut {
            data: &mut self.data,
            stride: self.stride,
        })
    }
}

#[test]
fn decode_into_host_frame_with_line_padding() {
    let pixels = PixelBuffer::new(checkerboard(3, 3, 3), 3, 3, PixelLayout::Rgb24).unwrap();
    let encoded = encode(&pixels, 24).unwrap();

    let mut frames = PaddedFrames {
        data: Vec::new(),
        stride: 0,
    };
    let (header, layout) = DecodeRequest::new(&encoded)
        .with_layout(PixelLayout::Rgb24)
        .decode_into_frame(&mut frames, Unstoppable)
        .unwrap();
    assert_eq!(layout, PixelLayout::Rgb24);
    assert_eq!(frames.stride, 14);
    for y in 0..header.height {
        let start = y as usize * frames.stride;
        assert_eq!(&frames.data[start..start + 9], pixels.row(y).unwrap());
        assert_eq!(&frames.data[start + 9..start + 14], &[0xEE; 5]);
    }
}

// ── Cancellation ─────────────────────────────────────────────────────

/// Lets `checks` calls through, then reports cancellation.
struct StopAfter {
    remaining: AtomicUsize,
}

impl StopAfter {
    fn new(checks: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(checks),
        }
    }
}

impl Stop for StopAfter {
    fn check(&self) -> Result<(), enough::StopReason> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| enough::StopReason::Cancelled)
    }
}

#[derive(Default)]
struct TrackingPackets {
    buf: Vec<u8>,
    requests: usize,
}

impl PacketAllocator for TrackingPackets {
    fn allocate_packet(&mut self, n_bytes: usize) -> Result<&mut [u8], AllocError> {
        self.requests += 1;
        self.buf = vec![0xAA; n_bytes];
        Ok(self.buf.as_mut_slice())
    }
}

#[test]
fn decode_cancelled_before_allocation() {
    let pixels = PixelBuffer::new(checkerboard(3, 40, 3), 3, 40, PixelLayout::Bgr24).unwrap();
    let encoded = encode(&pixels, 24).unwrap();

    let mut frames = PaddedFrames {
        data: Vec::new(),
        stride: 0,
    };
    let err = DecodeRequest::new(&encoded)
        .decode_into_frame(&mut frames, StopAfter::new(0))
        .unwrap_err();
    assert!(matches!(err, DecodeError::Cancelled(_)));
    assert!(frames.data.is_empty());
}

#[test]
fn decode_cancelled_partway_through_rows() {
    let pixels = PixelBuffer::new(checkerboard(3, 40, 3), 3, 40, PixelLayout::Bgr24).unwrap();
    let encoded = encode(&pixels, 24).unwrap();

    // One check before allocation, then one every 16 rows: the third check
    // lands on stored row 16.
    let mut frames = PaddedFrames {
        data: Vec::new(),
        stride: 0,
    };
    let err = DecodeRequest::new(&encoded)
        .decode_into_frame(&mut frames, StopAfter::new(2))
        .unwrap_err();
    assert!(matches!(err, DecodeError::Cancelled(_)));

    // Stored rows 0..16 are the bottom 16 image rows.
    let stride = frames.stride;
    let bottom = 39 * stride;
    assert_eq!(&frames.data[bottom..bottom + 9], pixels.row(39).unwrap());
    let first_skipped = 23 * stride;
    assert_eq!(&frames.data[first_skipped..first_skipped + 9], &[0xEE; 9]);
    assert_eq!(&frames.data[..9], &[0xEE; 9]);

    let (_, decoded) = DecodeRequest::new(&encoded)
        .decode(StopAfter::new(4))
        .unwrap();
    assert_eq!(decoded, pixels);
}

#[test]
fn encode_cancelled_before_allocation() {
    let pixels = PixelBuffer::new(checkerboard(3, 40, 3), 3, 40, PixelLayout::Bgr24).unwrap();
    let mut packets = TrackingPackets::default();
    let err = EncodeRequest::new()
        .encode_into_packet(&pixels, &mut packets, StopAfter::new(0))
        .unwrap_err();
    assert!(matches!(err, EncodeError::Cancelled(_)));
    assert_eq!(packets.requests, 0);
}

#[test]
fn encode_cancelled_partway_through_rows() {
    let pixels = PixelBuffer::new(checkerboard(3, 40, 3), 3, 40, PixelLayout::Bgr24).unwrap();
    let mut packets = TrackingPackets::default();
    let err = EncodeRequest::new()
        .encode_into_packet(&pixels, &mut packets, StopAfter::new(2))
        .unwrap_err();
    assert!(matches!(err, EncodeError::Cancelled(_)));
    assert_eq!(packets.requests, 1);

    // Header and the first 16 stored rows (12-byte stride) were written.
    assert_eq!(&packets.buf[..2], b"SF");
    let body = &packets.buf[34..];
    assert_eq!(&body[..9], pixels.row(39).unwrap());
    assert_eq!(&body[15 * 12..15 * 12 + 9], pixels.row(24).unwrap());
    assert_eq!(&body[16 * 12..16 * 12 + 12], &[0xAA; 12]);

    let encoded = EncodeRequest::new()
        .encode(&pixels, StopAfter::new(4))
        .unwrap();
    assert_eq!(encoded, encode(&pixels, 24).unwrap());
}

// ── Diagnostics, limits, probing ─────────────────────────────────────

#[test]
fn clean_file_raises_no_warnings() {
    let pixels = PixelBuffer::new(checkerboard(5, 3, 1), 5, 3, PixelLayout::Gray8).unwrap();
    let encoded = encode(&pixels, 8).unwrap();
    let sink = Collect::default();
    DecodeRequest::new(&encoded)
        .with_diagnostics(&sink)
        .decode(Unstoppable)
        .unwrap();
    assert!(sink.0.borrow().is_empty());
}

#[test]
fn limits_reject_large() {
    let pixels = PixelBuffer::new(vec![255u8; 6], 1, 2, PixelLayout::Bgr24).unwrap();
    let encoded = encode(&pixels, 24).unwrap();

    let limits = Limits {
        max_pixels: Some(1),
        ..Default::default()
    };
    let err = DecodeRequest::new(&encoded)
        .with_limits(&limits)
        .decode(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, DecodeError::LimitExceeded(_)));

    let limits = Limits {
        max_memory_bytes: Some(5),
        ..Default::default()
    };
    let err = DecodeRequest::new(&encoded)
        .with_limits(&limits)
        .decode(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, DecodeError::LimitExceeded(_)));
}

#[test]
fn image_info_probe() {
    let pixels = PixelBuffer::new(vec![0u8; 12], 4, 1, PixelLayout::Rgb24).unwrap();
    let encoded = encode(&pixels, 24).unwrap();
    let info = ImageInfo::from_bytes(&encoded).unwrap();
    assert_eq!(info.width, 4);
    assert_eq!(info.height, 1);
    assert_eq!(info.bit_count, 24);
    assert_eq!(info.native_layout, PixelLayout::Bgr24);
    assert_eq!(info.scan_direction, ScanDirection::BottomUp);
    assert!(FORMAT.matches(&encoded));
}

#[test]
fn decode_is_reentrant_across_threads() {
    let pixels = PixelBuffer::new(noise_pattern(9, 9, 3), 9, 9, PixelLayout::Bgr24).unwrap();
    let encoded = encode(&pixels, 24).unwrap();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let (_, decoded) = decode(&encoded).unwrap();
                assert_eq!(decoded, pixels);
            });
        }
    });
}

// ── Typed pixels ─────────────────────────────────────────────────────

#[cfg(feature = "imgref")]
#[test]
fn imgref_roundtrip() {
    let pixels = PixelBuffer::new(checkerboard(3, 2, 3), 3, 2, PixelLayout::Rgb24).unwrap();
    let img = pixels.to_imgvec::<rgb::Rgb<u8>>().unwrap();
    assert_eq!(img.width(), 3);
    assert_eq!(img.height(), 2);

    let rebuilt = PixelBuffer::from_imgref(img.as_ref()).unwrap();
    assert_eq!(rebuilt, pixels);

    let encoded = encode(&rebuilt, 24).unwrap();
    let (_, decoded) = DecodeRequest::new(&encoded)
        .with_layout(PixelLayout::Rgb24)
        .decode(Unstoppable)
        .unwrap();
    let view = decoded.as_imgref::<rgb::Rgb<u8>>().unwrap();
    assert_eq!(*view.buf(), img.buf().as_slice());
}
