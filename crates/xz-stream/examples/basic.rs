// SPDX-License-Identifier: ISC
use xz_stream::{compress, decompress};

fn main() {
    let input = b"XZ XZ XZ XZ XZ XZ XZ XZ XZ XZ XZ XZ XZ XZ XZ XZ";
    let compressed = compress(input).expect("compression failed");
    let restored = decompress(&compressed).expect("decompression failed");

    println!("in={} compressed={} out={}", input.len(), compressed.len(), restored.len());
    assert_eq!(&restored, input);
}
