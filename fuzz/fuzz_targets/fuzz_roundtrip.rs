#![no_main]
use libfuzzer_sys::fuzz_target;
use spff::*;

fuzz_target!(|data: &[u8]| {
    // If we can decode it, re-encoding and decoding again must produce identical pixels
    let Ok((header, decoded)) = DecodeRequest::new(data)
        .with_diagnostics(&Silent)
        .decode(enough::Unstoppable)
    else {
        return;
    };

    let Ok(reencoded) = encode(&decoded, header.bit_count) else {
        panic!("decoded frame failed to re-encode");
    };
    let Ok((header2, decoded2)) = DecodeRequest::new(&reencoded)
        .with_diagnostics(&Silent)
        .decode(enough::Unstoppable)
    else {
        panic!("re-encoded data failed to decode");
    };

    assert_eq!(decoded.pixels(), decoded2.pixels(), "roundtrip pixel mismatch");
    assert_eq!(header.width, header2.width);
    assert_eq!(header.height, header2.height);
    assert_eq!(header2.scan_direction, ScanDirection::BottomUp);
    assert_eq!(reencoded.len(), header2.file_size as usize);
});
