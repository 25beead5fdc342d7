//! NetFlow v5 export packet decoding.
//!
//! One export datagram carries a fixed 24-byte header followed by the number
//! of fixed 48-byte flow records the header declares. [`decode`] checks an
//! untrusted UDP payload against that framing and returns a [`FlowBatch`],
//! or a typed [`DecodeError`] for the caller to log and drop.
//!
//! The decoder is a pure function of its input bytes: no I/O, no state
//! across calls, allocation bounded by the 16-bit record count. Socket
//! handling and flow rendering live in the `netflow-listener` binary.

// Rejection reasons
pub mod error;

// Framing validation, record iteration, decode entry point
pub mod decode;

// Wire layout and network-to-host conversion
pub mod wire;

pub use decode::{FlowBatch, RecordIter, ValidatedPacket, decode};
pub use error::{DecodeError, Result};
pub use wire::{FLOW_RECORD_SIZE, FlowRecord, PACKET_HEADER_SIZE, PacketHeader};
