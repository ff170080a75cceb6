// SPDX-License-Identifier: ISC
use xz_stream::{Progress, ReadStatus, XzReader, XzWriter};

fn main() {
    let input = b"stream stream stream stream stream";

    let mut writer = XzWriter::new(Vec::new()).expect("writer");
    writer.write_encoded(input).result.expect("write");
    writer.close().expect("close");
    let encoded = writer.into_inner().into_inner();

    let mut reader = XzReader::new(encoded.as_slice()).expect("reader");
    let mut decoded = Vec::new();
    let mut chunk = [0u8; 64];
    loop {
        let Progress { bytes, result } = reader.read_decoded(&mut chunk);
        decoded.extend_from_slice(&chunk[..bytes]);
        if result.expect("read") == ReadStatus::End {
            break;
        }
    }
    reader.close().expect("close");

    assert_eq!(decoded, input);
    println!("encoded={} decoded={}", encoded.len(), decoded.len());
}
