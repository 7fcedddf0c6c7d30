/// Final image assembly.
///
/// Runs the whole pipeline over in-memory buffers: parse the loader,
/// assemble the payload, apply the body transform, pack the header, and
/// concatenate. Nothing touches the filesystem here, so the complete
/// assembly is testable end to end.
use anyhow::Result;
use log::{debug, info};

use crate::crypto::{self, BodyCipher};
use crate::error::BuildError;
use crate::header::{self, AncastVariant, ANCAST_HEADER_LEN};
use crate::loader;
use crate::payload;

/// Hybrid images occupy a fixed 0x80-sector boot region on legacy media.
pub const HYBRID_IMAGE_LEN: usize = 0x80 * 0x200;

/// Build a complete Ancast image from raw loader and ELF bytes.
pub fn build(
    loader_data: &[u8],
    elf: &[u8],
    variant: AncastVariant,
    cipher: BodyCipher,
) -> Result<Vec<u8>> {
    debug!("Building payload...");
    let parsed = loader::parse(loader_data)?;

    info!("Header size: 0x{:X} bytes.", parsed.header.header_length);
    info!("Loader size: 0x{:X} bytes.", parsed.header.loader_length);
    info!("ELF size:    0x{:X} bytes.", elf.len());

    let payload = payload::assemble(&parsed, elf, variant == AncastVariant::HybridMbr)?;

    debug!("Building ancast image...");
    let body = cipher.apply(payload)?;
    let digest = crypto::body_digest(&body);

    let header = header::build(variant, cipher.flags(), body.len(), &digest)?;

    info!("Body size:   0x{:X} bytes.", body.len());
    info!("Body hash:   {:x}.", digest);

    compose(&header, body, variant)
}

/// Concatenate header and body. Hybrid images are zero-padded out to the
/// fixed boot region and must not exceed it.
pub fn compose(
    header: &[u8; ANCAST_HEADER_LEN],
    body: Vec<u8>,
    variant: AncastVariant,
) -> Result<Vec<u8>> {
    let mut image = Vec::with_capacity(match variant {
        AncastVariant::Standard => ANCAST_HEADER_LEN + body.len(),
        AncastVariant::HybridMbr => HYBRID_IMAGE_LEN,
    });
    image.extend_from_slice(header);
    image.extend_from_slice(&body);

    if variant == AncastVariant::HybridMbr {
        if image.len() > HYBRID_IMAGE_LEN {
            return Err(BuildError::ImageTooLarge {
                length: image.len(),
                budget: HYBRID_IMAGE_LEN,
            }
            .into());
        }
        image.resize(HYBRID_IMAGE_LEN, 0);
    }

    Ok(image)
}
