//! Stage-0 loader image parsing.
//!
//! A loader file begins with a 16-byte big-endian header:
//!
//! ```text
//! [0..4)    header_length   total header size, including these 16 bytes
//! [4..8)    loader_length   declared size of the loader body
//! [8..12)   elf_length      legacy embedded ELF size (replaced by this tool)
//! [12..16)  arg             opaque boot argument (cleared on rebuild)
//! ```
//!
//! followed by `header_length - 16` opaque header extension bytes, the
//! loader body, and optionally the embedded ELF.

use anyhow::Result;
use log::warn;

use crate::error::BuildError;

/// Size of the fixed portion of the loader header.
pub const LOADER_HEADER_LEN: usize = 16;

/// The four fixed fields at the start of a loader image.
#[derive(Debug, Clone, Copy)]
pub struct LoaderHeader {
    pub header_length: u32,
    pub loader_length: u32,
    pub elf_length: u32,
    pub arg: u32,
}

/// A loader image sliced into its header-declared regions.
///
/// Slices borrow from the input buffer and are clamped to the bytes
/// actually present; the assembler validates and pads short regions.
#[derive(Debug)]
pub struct LoaderImage<'a> {
    pub header: LoaderHeader,
    /// Header bytes past the fixed 16, preserved verbatim on rebuild.
    pub header_extra: &'a [u8],
    /// Loader body as present in the file (may be shorter than declared).
    pub loader_body: &'a [u8],
}

/// Parse a loader image and slice out its regions.
///
/// Fails when the declared header length (or the file itself) cannot hold
/// the 16 fixed bytes. An embedded ELF is reported but not fatal: its
/// bytes are discarded and replaced by the externally supplied ELF.
pub fn parse(data: &[u8]) -> Result<LoaderImage<'_>> {
    if data.len() < LOADER_HEADER_LEN {
        return Err(BuildError::MalformedHeader {
            header_length: data.len() as u32,
        }
        .into());
    }

    let header = LoaderHeader {
        header_length: read_be32(data, 0),
        loader_length: read_be32(data, 4),
        elf_length: read_be32(data, 8),
        arg: read_be32(data, 12),
    };

    if (header.header_length as usize) < LOADER_HEADER_LEN {
        return Err(BuildError::MalformedHeader {
            header_length: header.header_length,
        }
        .into());
    }

    if header.elf_length > 0 {
        warn!(
            "Loader already contains a 0x{:X}-byte ELF, replacing it.",
            header.elf_length
        );
    }

    let loader_off = (header.header_length as usize).min(data.len());
    let elf_off = (header.header_length as usize)
        .saturating_add(header.loader_length as usize)
        .min(data.len());

    Ok(LoaderImage {
        header,
        header_extra: &data[LOADER_HEADER_LEN..loader_off],
        loader_body: &data[loader_off..elf_off],
    })
}

fn read_be32(buf: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader_bytes(fields: [u32; 4], rest: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        for f in fields {
            data.extend_from_slice(&f.to_be_bytes());
        }
        data.extend_from_slice(rest);
        data
    }

    #[test]
    fn parse_slices_declared_regions() {
        // 4 extension bytes, 8 body bytes, 2 embedded-ELF bytes
        let data = loader_bytes(
            [20, 8, 2, 7],
            &[0xAA, 0xBB, 0xCC, 0xDD, 1, 2, 3, 4, 5, 6, 7, 8, 0xEE, 0xFF],
        );
        let image = parse(&data).unwrap();

        assert_eq!(image.header.header_length, 20);
        assert_eq!(image.header.loader_length, 8);
        assert_eq!(image.header.elf_length, 2);
        assert_eq!(image.header.arg, 7);
        assert_eq!(image.header_extra, &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(image.loader_body, &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn header_length_below_minimum_is_fatal() {
        let data = loader_bytes([15, 0, 0, 0], &[]);
        let err = parse(&data).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BuildError>(),
            Some(&BuildError::MalformedHeader { header_length: 15 })
        );
    }

    #[test]
    fn file_too_short_for_fixed_header_is_fatal() {
        let err = parse(&[0u8; 8]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn short_file_yields_clamped_body() {
        // Declares an 8-byte body but only 3 bytes are present.
        let data = loader_bytes([16, 8, 0, 0], &[9, 9, 9]);
        let image = parse(&data).unwrap();
        assert_eq!(image.header_extra, &[] as &[u8]);
        assert_eq!(image.loader_body, &[9, 9, 9]);
    }
}
