//! Byte layout of the NetFlow v5 export format.
//!
//! A datagram is a 24-byte header followed by `count` 48-byte flow records.
//! All multi-byte fields are big-endian on the wire. The raw structs below
//! mirror that layout byte for byte (alignment 1, no implicit padding) and
//! are only instantiated over windows the validator has already sized, so
//! conversion into the host-order types cannot fail.

use std::net::Ipv4Addr;
use zerocopy::byteorder::network_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

/// Size of the fixed packet header on the wire.
pub const PACKET_HEADER_SIZE: usize = 24;

/// Size of one flow record on the wire.
pub const FLOW_RECORD_SIZE: usize = 48;

/// The only export format version this crate decodes.
pub const NETFLOW_V5: u16 = 5;

#[derive(FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub(crate) struct RawPacketHeader {
    version: U16,
    count: U16,
    sys_uptime: U32,
    unix_secs: U32,
    unix_nsecs: U32,
    flow_sequence: U32,
    engine_type: u8,
    engine_id: u8,
    sampling_interval: U16,
}

#[derive(FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub(crate) struct RawFlowRecord {
    src_addr: U32,
    dst_addr: U32,
    next_hop: U32,
    input: U16,
    output: U16,
    d_pkts: U32,
    d_octets: U32,
    first: U32,
    last: U32,
    src_port: U16,
    dst_port: U16,
    pad1: u8,
    tcp_flags: u8,
    protocol: u8,
    tos: u8,
    src_as: U16,
    dst_as: U16,
    src_mask: u8,
    dst_mask: u8,
    pad2: [u8; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<RawPacketHeader>(), PACKET_HEADER_SIZE);
static_assertions::const_assert_eq!(std::mem::size_of::<RawFlowRecord>(), FLOW_RECORD_SIZE);

/// Header of one export datagram, in host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub version: u16,
    pub record_count: u16,
    /// Milliseconds since the exporter booted.
    pub sys_uptime_ms: u32,
    pub unix_seconds: u32,
    pub unix_nanoseconds: u32,
    /// Exporter-assigned counter for detecting lost export packets. Not
    /// validated here.
    pub flow_sequence: u32,
    pub engine_type: u8,
    pub engine_id: u8,
    pub sampling_interval: u16,
}

impl PacketHeader {
    pub(crate) fn from_raw(raw: &RawPacketHeader) -> Self {
        Self {
            version: raw.version.get(),
            record_count: raw.count.get(),
            sys_uptime_ms: raw.sys_uptime.get(),
            unix_seconds: raw.unix_secs.get(),
            unix_nanoseconds: raw.unix_nsecs.get(),
            flow_sequence: raw.flow_sequence.get(),
            engine_type: raw.engine_type,
            engine_id: raw.engine_id,
            sampling_interval: raw.sampling_interval.get(),
        }
    }
}

/// One decoded flow record, in host byte order.
///
/// Every field is exporter-provided and untrusted; in particular the wire
/// format does not guarantee `last_seen_ms >= first_seen_ms`. Timestamps are
/// relative to exporter boot and need `sys_uptime_ms` plus `unix_seconds`
/// from the header to convert to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRecord {
    pub src_addr: u32,
    pub dst_addr: u32,
    pub next_hop: u32,
    pub input_if: u16,
    pub output_if: u16,
    pub packet_count: u32,
    pub octet_count: u32,
    pub first_seen_ms: u32,
    pub last_seen_ms: u32,
    pub src_port: u16,
    pub dst_port: u16,
    pub tcp_flags: u8,
    /// IANA protocol number (TCP=6, UDP=17, ...).
    pub protocol: u8,
    pub tos: u8,
    pub src_as: u16,
    pub dst_as: u16,
    pub src_mask: u8,
    pub dst_mask: u8,
}

impl FlowRecord {
    pub(crate) fn from_raw(raw: &RawFlowRecord) -> Self {
        Self {
            src_addr: raw.src_addr.get(),
            dst_addr: raw.dst_addr.get(),
            next_hop: raw.next_hop.get(),
            input_if: raw.input.get(),
            output_if: raw.output.get(),
            packet_count: raw.d_pkts.get(),
            octet_count: raw.d_octets.get(),
            first_seen_ms: raw.first.get(),
            last_seen_ms: raw.last.get(),
            src_port: raw.src_port.get(),
            dst_port: raw.dst_port.get(),
            tcp_flags: raw.tcp_flags,
            protocol: raw.protocol,
            tos: raw.tos,
            src_as: raw.src_as.get(),
            dst_as: raw.dst_as.get(),
            src_mask: raw.src_mask,
            dst_mask: raw.dst_mask,
        }
    }

    pub fn src_ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.src_addr)
    }

    pub fn dst_ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dst_addr)
    }

    pub fn next_hop_ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.next_hop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::FromBytes;

    // Every field offset per the v5 record layout, checked against a buffer
    // where each field carries a distinctive value.
    #[test]
    fn record_fields_decode_from_documented_offsets() {
        let mut buf = [0_u8; FLOW_RECORD_SIZE];
        buf[0..4].copy_from_slice(&[10, 0, 0, 1]); // src_addr
        buf[4..8].copy_from_slice(&[192, 168, 1, 2]); // dst_addr
        buf[8..12].copy_from_slice(&[172, 16, 0, 254]); // next_hop
        buf[12..14].copy_from_slice(&0x0102_u16.to_be_bytes()); // input
        buf[14..16].copy_from_slice(&0x0304_u16.to_be_bytes()); // output
        buf[16..20].copy_from_slice(&0x0506_0708_u32.to_be_bytes()); // d_pkts
        buf[20..24].copy_from_slice(&0x090a_0b0c_u32.to_be_bytes()); // d_octets
        buf[24..28].copy_from_slice(&1_000_u32.to_be_bytes()); // first
        buf[28..32].copy_from_slice(&2_000_u32.to_be_bytes()); // last
        buf[32..34].copy_from_slice(&443_u16.to_be_bytes()); // src_port
        buf[34..36].copy_from_slice(&55_000_u16.to_be_bytes()); // dst_port
        buf[36] = 0xff; // pad1, must be ignored
        buf[37] = 0x12; // tcp_flags
        buf[38] = 6; // protocol
        buf[39] = 0xb8; // tos
        buf[40..42].copy_from_slice(&64_512_u16.to_be_bytes()); // src_as
        buf[42..44].copy_from_slice(&64_513_u16.to_be_bytes()); // dst_as
        buf[44] = 24; // src_mask
        buf[45] = 16; // dst_mask
        buf[46..48].copy_from_slice(&[0xff, 0xff]); // pad2, must be ignored

        let raw = RawFlowRecord::ref_from_bytes(&buf).expect("sized window");
        let record = FlowRecord::from_raw(raw);

        assert_eq!(record.src_ip(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(record.dst_ip(), Ipv4Addr::new(192, 168, 1, 2));
        assert_eq!(record.next_hop_ip(), Ipv4Addr::new(172, 16, 0, 254));
        assert_eq!(record.input_if, 0x0102);
        assert_eq!(record.output_if, 0x0304);
        assert_eq!(record.packet_count, 0x0506_0708);
        assert_eq!(record.octet_count, 0x090a_0b0c);
        assert_eq!(record.first_seen_ms, 1_000);
        assert_eq!(record.last_seen_ms, 2_000);
        assert_eq!(record.src_port, 443);
        assert_eq!(record.dst_port, 55_000);
        assert_eq!(record.tcp_flags, 0x12);
        assert_eq!(record.protocol, 6);
        assert_eq!(record.tos, 0xb8);
        assert_eq!(record.src_as, 64_512);
        assert_eq!(record.dst_as, 64_513);
        assert_eq!(record.src_mask, 24);
        assert_eq!(record.dst_mask, 16);
    }

    #[test]
    fn header_fields_decode_from_documented_offsets() {
        let mut buf = [0_u8; PACKET_HEADER_SIZE];
        buf[0..2].copy_from_slice(&5_u16.to_be_bytes()); // version
        buf[2..4].copy_from_slice(&30_u16.to_be_bytes()); // count
        buf[4..8].copy_from_slice(&86_400_000_u32.to_be_bytes()); // sys_uptime
        buf[8..12].copy_from_slice(&1_700_000_000_u32.to_be_bytes()); // unix_secs
        buf[12..16].copy_from_slice(&123_456_000_u32.to_be_bytes()); // unix_nsecs
        buf[16..20].copy_from_slice(&0xdead_beef_u32.to_be_bytes()); // flow_sequence
        buf[20] = 1; // engine_type
        buf[21] = 7; // engine_id
        buf[22..24].copy_from_slice(&100_u16.to_be_bytes()); // sampling_interval

        let raw = RawPacketHeader::ref_from_bytes(&buf).expect("sized window");
        let header = PacketHeader::from_raw(raw);

        assert_eq!(header.version, 5);
        assert_eq!(header.record_count, 30);
        assert_eq!(header.sys_uptime_ms, 86_400_000);
        assert_eq!(header.unix_seconds, 1_700_000_000);
        assert_eq!(header.unix_nanoseconds, 123_456_000);
        assert_eq!(header.flow_sequence, 0xdead_beef);
        assert_eq!(header.engine_type, 1);
        assert_eq!(header.engine_id, 7);
        assert_eq!(header.sampling_interval, 100);
    }
}
