// SPDX-License-Identifier: ISC
use proptest::prelude::*;
use xz_stream::{
    EncoderOptions, IntegrityCheck, XZ_MAGIC, compress, compress_with_options, decompress,
};

const LICENSE_TEXT: &str = "
 * Redistribution and use in source and binary forms, with or without
 * modification, are permitted provided that the following conditions are
 * met:
 * * Redistributions of source code must retain the above copyright
 *   notice, this list of conditions and the following disclaimer.
 * * Redistributions in binary form must reproduce the above copyright
 *   notice, this list of conditions and the following disclaimer in
 *   the documentation and/or other materials provided with the
 *   distribution.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS \"AS
 * IS\" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED
 * TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A
 * PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT OWNER
 * OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
 * EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
 * PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
 * PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
 * LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
 * NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
 * SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
";

fn lcg_data(size: usize) -> Vec<u8> {
    let mut x = 0x1234_5678u32;
    let mut out = vec![0u8; size];
    for b in &mut out {
        x = x.wrapping_mul(1664525).wrapping_add(1013904223);
        *b = (x >> 24) as u8;
    }
    out
}

fn text_with_binary_tail() -> Vec<u8> {
    let mut input = LICENSE_TEXT.as_bytes().to_vec();
    input.extend_from_slice(&[0, 1, 2, 3, 4, 254, 255]);
    input
}

#[test]
fn text_roundtrip_shrinks_and_has_magic() {
    let input = text_with_binary_tail();
    let packed = compress(&input).expect("compress");

    assert_eq!(&packed[..XZ_MAGIC.len()], &XZ_MAGIC);
    assert_eq!(&packed[1..5], b"7zXZ");
    assert!(packed.len() <= input.len(), "{} > {}", packed.len(), input.len());
    assert_eq!(decompress(&packed).expect("decompress"), input);
}

#[test]
fn zeroes_compress_well() {
    let input = vec![0u8; 8192];
    let packed = compress(&input).expect("compress");
    assert!(packed.len() < input.len());
    assert_eq!(decompress(&packed).expect("decompress"), input);
}

#[test]
fn empty_roundtrip() {
    let packed = compress(b"").expect("compress");
    assert_eq!(&packed[..XZ_MAGIC.len()], &XZ_MAGIC);
    assert!(decompress(&packed).expect("decompress").is_empty());
}

#[test]
fn multi_megabyte_roundtrip() {
    let mut input = lcg_data(1 << 20);
    input.extend((0..2 * 1024 * 1024).map(|i: usize| (i % 251) as u8));
    let packed = compress_with_options(&input, EncoderOptions { level: 6, ..Default::default() })
        .expect("compress");
    assert_eq!(decompress(&packed).expect("decompress"), input);
}

#[test]
fn every_integrity_check_roundtrips() {
    let input = text_with_binary_tail();
    for check in
        [IntegrityCheck::None, IntegrityCheck::Crc32, IntegrityCheck::Crc64, IntegrityCheck::Sha256]
    {
        let packed =
            compress_with_options(&input, EncoderOptions { level: 1, check }).expect("compress");
        assert_eq!(decompress(&packed).expect("decompress"), input, "{check:?}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn arbitrary_bytes_roundtrip(input in proptest::collection::vec(any::<u8>(), 0..20_000)) {
        let packed = compress_with_options(&input, EncoderOptions { level: 0, ..Default::default() })
            .expect("compress");
        prop_assert_eq!(&packed[..XZ_MAGIC.len()], &XZ_MAGIC[..]);
        prop_assert_eq!(decompress(&packed).expect("decompress"), input);
    }
}
