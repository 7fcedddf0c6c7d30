/// The fixed 512-byte Ancast image header.
///
/// Two wire layouts share the same leading fields; the tail of the header
/// differs per variant:
///
/// ```text
/// Offset  Size  Field
/// 0       4     magic 0xEFA282D9
/// 8       4     format version 0x20
/// 32      4     image type 0x02
/// 416     2     flag bits (bit 0 = body stored unencrypted)
/// 420     4     constant 0x21
/// 424     4     constant 0x02
/// 428     4     body length
/// -- standard --
/// 432     20    SHA-1 digest of the body
/// 452     4     constant 0x02
/// -- hybrid MBR --
/// 447     14    partition/boot metadata marker
/// 510     2     boot-sector signature 55 AA
/// ```
///
/// All integers are big-endian; every unlisted byte is zero.
use anyhow::{Context, Result};

use crate::crypto::BodyDigest;

/// Size of the fixed image header.
pub const ANCAST_HEADER_LEN: usize = 512;

/// Magic constant the boot ROM checks at offset 0.
pub const ANCAST_MAGIC: u32 = 0xEFA2_82D9;

const FORMAT_VERSION: u32 = 0x20;
const IMAGE_TYPE: u32 = 0x02;

/// Partition/boot metadata identifying the image to legacy boot-sector
/// consumers.
const MBR_MARKER: [u8; 14] = [
    0x01, 0x41, 0x01, 0x0B, 0xFE, 0xC2, 0xFF, 0x00, 0x00, 0x02, 0x00, 0x00, 0x40, 0x1C,
];
const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];

// Field offsets within the header.
const OFF_MAGIC: usize = 0;
const OFF_VERSION: usize = 8;
const OFF_IMAGE_TYPE: usize = 32;
const OFF_FLAGS: usize = 416;
const OFF_CONST_A: usize = 420; // 0x21
const OFF_CONST_B: usize = 424; // 0x02
const OFF_BODY_LEN: usize = 428;
const OFF_DIGEST: usize = 432;
const OFF_TRAILER: usize = 452; // 0x02, standard variant only
const OFF_MBR_MARKER: usize = 447;
const OFF_BOOT_SIG: usize = 510;

/// Which of the two wire layouts the header uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncastVariant {
    /// Plain Ancast header carrying the body digest.
    Standard,
    /// Boot-sector compatible layout. The digest area is repurposed for
    /// MBR metadata; the digest is computed and logged but not embedded.
    HybridMbr,
}

/// Pack the 512-byte header for the given variant.
///
/// `digest` is embedded by the standard variant only. Fails only when the
/// body length does not fit the 32-bit field.
pub fn build(
    variant: AncastVariant,
    flags: u16,
    body_len: usize,
    digest: &BodyDigest,
) -> Result<[u8; ANCAST_HEADER_LEN]> {
    let body_len =
        u32::try_from(body_len).context("body length does not fit the header's 32-bit field")?;

    let mut header = [0u8; ANCAST_HEADER_LEN];
    write_be32(&mut header, OFF_MAGIC, ANCAST_MAGIC);
    write_be32(&mut header, OFF_VERSION, FORMAT_VERSION);
    write_be32(&mut header, OFF_IMAGE_TYPE, IMAGE_TYPE);
    write_be16(&mut header, OFF_FLAGS, flags);
    write_be32(&mut header, OFF_CONST_A, 0x21);
    write_be32(&mut header, OFF_CONST_B, 0x02);
    write_be32(&mut header, OFF_BODY_LEN, body_len);

    match variant {
        AncastVariant::Standard => {
            header[OFF_DIGEST..OFF_DIGEST + 20].copy_from_slice(digest.as_slice());
            write_be32(&mut header, OFF_TRAILER, 0x02);
        }
        AncastVariant::HybridMbr => {
            header[OFF_MBR_MARKER..OFF_MBR_MARKER + MBR_MARKER.len()]
                .copy_from_slice(&MBR_MARKER);
            header[OFF_BOOT_SIG..OFF_BOOT_SIG + 2].copy_from_slice(&BOOT_SIGNATURE);
        }
    }

    Ok(header)
}

fn write_be16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

fn write_be32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}
