//! Parsers for Windows module images
//!
//! This module reads the parts of a PE/COFF image needed to identify a module's
//! version: the section table and data directories, the CLR metadata tables of
//! managed assemblies, and the `VS_VERSIONINFO` resource of native modules.

pub mod clr_metadata;
pub mod pe_image;
pub mod version_resource;

#[cfg(test)]
#[path = "../../tests/fixtures/pe_builder.rs"]
pub(crate) mod pe_builder;

pub use clr_metadata::{read_assembly_identity, AssemblyIdentity};
pub use pe_image::{DataDirectory, PeImage, Section};
pub use version_resource::{read_version_resource, VersionStrings};

use thiserror::Error;

/// Errors raised while decoding a module image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("The file is not a Windows executable image (missing MZ signature)")]
    MissingDosSignature,

    #[error("Invalid PE header signature")]
    MissingPeSignature,

    #[error("Unsupported optional header magic 0x{0:x}")]
    UnsupportedOptionalHeader(u16),

    #[error("Unexpected end of image data at offset 0x{offset:x}")]
    Truncated { offset: usize },

    #[error("RVA 0x{0:x} does not map to file data")]
    InvalidRva(u32),

    #[error("The module was expected to contain an assembly manifest.")]
    NoAssemblyManifest,

    #[error("Invalid CLR metadata: {0}")]
    InvalidMetadata(String),

    #[error("Invalid version resource: {0}")]
    InvalidResource(String),
}

pub(crate) fn read_bytes(data: &[u8], offset: usize, len: usize) -> Result<&[u8], ImageError> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(ImageError::Truncated { offset })
}

pub(crate) fn read_u8(data: &[u8], offset: usize) -> Result<u8, ImageError> {
    Ok(read_bytes(data, offset, 1)?[0])
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Result<u16, ImageError> {
    let b = read_bytes(data, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32, ImageError> {
    let b = read_bytes(data, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_u64(data: &[u8], offset: usize) -> Result<u64, ImageError> {
    let b = read_bytes(data, offset, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(b);
    Ok(u64::from_le_bytes(raw))
}

/// Round `value` up to the next multiple of four
pub(crate) fn align4(value: usize) -> usize {
    (value + 3) & !3
}
