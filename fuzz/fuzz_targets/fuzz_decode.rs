#![no_main]
use libfuzzer_sys::fuzz_target;
use spff::{DecodeRequest, ImageInfo, PixelLayout, Silent};

fuzz_target!(|data: &[u8]| {
    // Default layout, probe, and every alternate layout must never panic
    let _ = spff::decode(data);
    let probed = ImageInfo::from_bytes(data);

    for layout in [PixelLayout::Gray8, PixelLayout::Rgb24] {
        let _ = DecodeRequest::new(data)
            .with_layout(layout)
            .with_diagnostics(&Silent)
            .decode(enough::Unstoppable);
    }

    // A successful probe promises a successful decode
    if probed.is_ok() {
        assert!(spff::decode(data).is_ok(), "probe accepted what decode rejected");
    }
});
