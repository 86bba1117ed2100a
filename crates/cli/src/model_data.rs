//! Compiled-in sine model

/// Sine model flatbuffer: 24-byte header declaring schema version 3,
/// followed by an opaque body the simulated engine does not read.
pub static SINE_MODEL: [u8; 40] = [
    // root table offset
    0x10, 0x00, 0x00, 0x00, //
    // file identifier
    b'T', b'F', b'L', b'3', //
    // vtable: len 6, table len 8, version at +4
    0x06, 0x00, 0x08, 0x00, 0x04, 0x00, 0x00, 0x00, //
    // root table: soffset to vtable, version
    0x08, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, //
    // body
    0x0C, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, //
    0x10, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, //
];
