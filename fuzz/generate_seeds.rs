#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn spff(width: i32, height: i32, bit_count: u16, info_header_size: u32, payload: &[u8]) -> Vec<u8> {
    let header_size = 10 + info_header_size;
    let file_size = header_size + payload.len() as u32;
    let mut out = Vec::new();
    out.extend_from_slice(b"SF");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&header_size.to_le_bytes());
    out.extend_from_slice(&info_header_size.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&bit_count.to_le_bytes());
    out.resize(header_size as usize, 0); // compression 0, image size 0
    out.extend_from_slice(payload);
    out
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // 24-bit 2x2, bottom-up, padded rows
    let rgb = spff(2, 2, 24, 24, &[255, 0, 0, 255, 255, 255, 0, 0, 0, 0, 255, 0, 255, 0, 0, 0]);
    fs::write(format!("{dir}/bgr_2x2.spff"), &rgb).unwrap();

    // 8-bit 3x2, top-down
    let gray = spff(3, -2, 8, 16, &[0x00, 0x40, 0x80, 0, 0xc0, 0xff, 0x64, 0]);
    fs::write(format!("{dir}/gray_3x2_topdown.spff"), &gray).unwrap();

    // 40-byte info header carrying a compression field
    let rle = {
        let mut f = spff(1, 1, 8, 40, &[7, 0, 0, 0]);
        f[26..30].copy_from_slice(&1u32.to_le_bytes());
        f
    };
    fs::write(format!("{dir}/rle8_1x1.spff"), rle).unwrap();

    // Rows without padding
    let unpadded = spff(1, 2, 24, 16, &[1, 2, 3, 4, 5, 6]);
    fs::write(format!("{dir}/unpadded_1x2.spff"), unpadded).unwrap();

    // File size holding the header size
    let mut repaired = gray.clone();
    repaired[2..6].copy_from_slice(&26u32.to_le_bytes());
    fs::write(format!("{dir}/header_sized_file_size.spff"), repaired).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/just_magic.bin"), b"SF").unwrap();
    fs::write(format!("{dir}/short_fixed.bin"), &rgb[..9]).unwrap();
    fs::write(format!("{dir}/cut_info.bin"), &rgb[..20]).unwrap();
    fs::write(format!("{dir}/cut_rows.bin"), &rgb[..40]).unwrap();

    println!("Generated seed corpus in {dir}/");
}
