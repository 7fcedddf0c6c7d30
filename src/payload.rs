/// Payload assembly.
///
/// Rebuilds the loader header, splices in the replacement ELF, and pads
/// the result out to the boot ROM's 4 KB block-read granularity:
///
/// ```text
/// [rebuilt 16-byte header][header extension][loader body][ELF][zeros]
/// ```
use anyhow::{Context, Result};
use log::warn;

use crate::error::BuildError;
use crate::loader::{LoaderImage, LOADER_HEADER_LEN};

/// Block-read granularity of the boot ROM. The payload is zero-padded to
/// a multiple of this regardless of variant.
pub const PAYLOAD_ALIGN: usize = 4096;

/// Written to the rebuilt header_length field of hybrid MBR images; the
/// boot ROM keys the hybrid layout off this value. Slicing offsets still
/// use the real header length.
pub const HYBRID_HEADER_SENTINEL: u32 = 0xEA00_0002;

/// Serialize the payload from a parsed loader image and the replacement
/// ELF bytes.
///
/// The loader body must fit its declared length; a shorter body is
/// zero-padded up to it. The `arg` field is always rebuilt as 0.
pub fn assemble(image: &LoaderImage<'_>, elf: &[u8], hybrid: bool) -> Result<Vec<u8>> {
    let declared = image.header.loader_length as usize;
    let body = image.loader_body;

    if body.len() > declared {
        return Err(BuildError::LoaderTooLarge {
            declared: image.header.loader_length,
            actual: body.len(),
        }
        .into());
    }
    let body_pad = declared - body.len();
    if body_pad > 0 {
        warn!("Padding loader with 0x{:X} zeroes.", body_pad);
    }

    let elf_length = u32::try_from(elf.len()).context("ELF too large for the 32-bit length field")?;
    let header_length = if hybrid {
        HYBRID_HEADER_SENTINEL
    } else {
        image.header.header_length
    };

    let total = LOADER_HEADER_LEN + image.header_extra.len() + declared + elf.len();
    let mut payload = Vec::with_capacity(total.next_multiple_of(PAYLOAD_ALIGN));
    payload.extend_from_slice(&header_length.to_be_bytes());
    payload.extend_from_slice(&image.header.loader_length.to_be_bytes());
    payload.extend_from_slice(&elf_length.to_be_bytes());
    payload.extend_from_slice(&0u32.to_be_bytes()); // arg
    debug_assert_eq!(payload.len(), LOADER_HEADER_LEN);
    payload.extend_from_slice(image.header_extra);
    payload.extend_from_slice(body);
    payload.resize(payload.len() + body_pad, 0);
    payload.extend_from_slice(elf);

    let aligned = payload.len().next_multiple_of(PAYLOAD_ALIGN);
    if aligned > payload.len() {
        warn!("Padding payload with 0x{:X} zeroes.", aligned - payload.len());
        payload.resize(aligned, 0);
    }

    Ok(payload)
}
