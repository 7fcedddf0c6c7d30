use thiserror::Error;

/// Fatal validation failures. Any of these aborts the run before the
/// output file is created.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// The loader's declared header length cannot hold the 16 fixed bytes.
    #[error("loader header length 0x{header_length:X} is below the 0x10-byte minimum")]
    MalformedHeader { header_length: u32 },

    /// The loader file holds more body bytes than its header declares.
    /// The loader and its self-reported header disagree; continuing would
    /// produce a corrupt boot image.
    #[error("loader body is 0x{actual:X} bytes, larger than its reported length 0x{declared:X}")]
    LoaderTooLarge { declared: u32, actual: usize },

    /// A hybrid MBR image must fit the fixed boot region exactly; it cannot
    /// be padded down to size.
    #[error("image is 0x{length:X} bytes, over the 0x{budget:X}-byte boot region")]
    ImageTooLarge { length: usize, budget: usize },
}
