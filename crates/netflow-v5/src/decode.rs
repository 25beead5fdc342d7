//! Framing validation and record extraction for NetFlow v5 datagrams.

use crate::error::{DecodeError, Result};
use crate::wire::{
    FLOW_RECORD_SIZE, FlowRecord, NETFLOW_V5, PACKET_HEADER_SIZE, PacketHeader, RawFlowRecord,
    RawPacketHeader,
};
use std::iter::FusedIterator;
use std::slice::ChunksExact;
use zerocopy::FromBytes;

/// A datagram whose framing has been checked against the declared record
/// count.
///
/// This is the single gate between untrusted bytes and typed access: record
/// iteration is only constructible from one of these, and holding one proves
/// the record range spans exactly `record_count * 48` bytes. Callers that
/// only need header metadata can stop here without allocating.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedPacket<'a> {
    header: PacketHeader,
    records: &'a [u8],
}

impl<'a> ValidatedPacket<'a> {
    /// Checks an untrusted UDP payload against the v5 framing rules.
    ///
    /// A zero record count is valid and yields an empty record range.
    /// Trailing bytes beyond the declared records are ignored: UDP payloads
    /// may be padded past the declared content.
    pub fn new(buffer: &'a [u8]) -> Result<Self> {
        let Ok((raw, rest)) = RawPacketHeader::ref_from_prefix(buffer) else {
            return Err(DecodeError::HeaderTooShort);
        };

        let header = PacketHeader::from_raw(raw);
        if header.version != NETFLOW_V5 {
            return Err(DecodeError::UnsupportedVersion(header.version));
        }

        // Widened before multiplying; the wire value is attacker-controlled
        // and must never feed narrower arithmetic that could wrap.
        let record_bytes = usize::from(header.record_count) * FLOW_RECORD_SIZE;
        if rest.len() < record_bytes {
            return Err(DecodeError::Truncated {
                expected: PACKET_HEADER_SIZE + record_bytes,
                actual: buffer.len(),
            });
        }

        Ok(Self {
            header,
            records: &rest[..record_bytes],
        })
    }

    pub fn header(&self) -> &PacketHeader {
        &self.header
    }

    /// Iterates the records lazily, in wire order (the exporter's send
    /// order, which is semantically meaningful).
    pub fn records(&self) -> RecordIter<'a> {
        RecordIter {
            chunks: self.records.chunks_exact(FLOW_RECORD_SIZE),
        }
    }
}

/// Lazy decoder over a validated record range.
///
/// Finite: yields exactly the declared record count, then fuses. Single
/// forward pass, no allocation.
#[derive(Debug, Clone)]
pub struct RecordIter<'a> {
    chunks: ChunksExact<'a, u8>,
}

impl Iterator for RecordIter<'_> {
    type Item = FlowRecord;

    fn next(&mut self) -> Option<FlowRecord> {
        let chunk = self.chunks.next()?;
        // The validator sized the range, so every chunk is exactly one
        // record wide; a missized chunk here means the gate was bypassed.
        debug_assert_eq!(chunk.len(), FLOW_RECORD_SIZE);
        let raw = RawFlowRecord::ref_from_bytes(chunk).ok()?;
        Some(FlowRecord::from_raw(raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for RecordIter<'_> {}
impl FusedIterator for RecordIter<'_> {}

/// One successfully decoded export datagram: header metadata plus the flow
/// records in wire order. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowBatch {
    header: PacketHeader,
    records: Vec<FlowRecord>,
}

impl FlowBatch {
    pub fn header(&self) -> &PacketHeader {
        &self.header
    }

    pub fn records(&self) -> &[FlowRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FlowRecord> {
        self.records
    }
}

/// Decodes one UDP payload into a [`FlowBatch`].
///
/// Stateless and side-effect free; concurrent calls on independent buffers
/// need no coordination. A rejected buffer yields no partial data, and
/// malformed input is reported as a [`DecodeError`], never a panic.
pub fn decode(buffer: &[u8]) -> Result<FlowBatch> {
    let packet = ValidatedPacket::new(buffer)?;
    Ok(FlowBatch {
        header: *packet.header(),
        records: packet.records().collect(),
    })
}
