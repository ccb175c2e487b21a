//! zlib compression, applied before sealing (compress-then-encrypt).
//!
//! These wrappers carry no inner framing header: whether a stream is
//! compressed is already
//! recorded by the single `compress_flag` byte in the stream header
//! (see [`crate::stream_cipher`]), so `CompressSource`/`ExtractSink`
//! are bare passthroughs to `flate2`.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::ZlibEncoder;
use flate2::write::ZlibDecoder;

/// When read from, it reads uncompressed plaintext and yields compressed
/// bytes.
pub struct CompressSource<'a> {
    encoder: ZlibEncoder<&'a mut dyn Read>,
}

impl<'a> CompressSource<'a> {
    pub fn new(reader: &'a mut dyn Read) -> Self {
        Self {
            encoder: ZlibEncoder::new(reader, Compression::best()),
        }
    }
}

impl Read for CompressSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.encoder.read(buf)
    }
}

/// When written to, it decompresses the incoming bytes and forwards the
/// plaintext to the inner writer.
pub struct ExtractSink<'a> {
    decoder: ZlibDecoder<&'a mut dyn Write>,
}

impl<'a> ExtractSink<'a> {
    pub fn new(writer: &'a mut dyn Write) -> Self {
        Self {
            decoder: ZlibDecoder::new(writer),
        }
    }

    /// Flush and surface the inner decoder's final state.
    pub fn finish(mut self) -> io::Result<()> {
        self.decoder.flush()
    }
}

impl Write for ExtractSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.decoder.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.decoder.flush()
    }
}
