//! PE/COFF image headers
//!
//! Only what version probing needs is decoded: the optional header magic, the
//! data directory table and the section table used to map RVAs to file offsets.

use super::{read_bytes, read_u16, read_u32, ImageError};

const DOS_SIGNATURE: u16 = 0x5A4D; // "MZ"
const PE_SIGNATURE: u32 = 0x0000_4550; // "PE\0\0"
const PE32_MAGIC: u16 = 0x10B;
const PE32_PLUS_MAGIC: u16 = 0x20B;

const COFF_HEADER_SIZE: usize = 20;
const SECTION_HEADER_SIZE: usize = 40;

/// Data directory index of the resource table
pub const DIRECTORY_RESOURCE: usize = 2;
/// Data directory index of the CLR runtime (COM descriptor) header
pub const DIRECTORY_CLR_RUNTIME: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDirectory {
    pub rva: u32,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub virtual_address: u32,
    pub virtual_size: u32,
    pub raw_size: u32,
    pub raw_offset: u32,
}

impl Section {
    fn contains_rva(&self, rva: u32) -> bool {
        let extent = self.virtual_size.max(self.raw_size);
        rva >= self.virtual_address && (rva - self.virtual_address) < extent
    }
}

/// A parsed view over the bytes of a PE image
#[derive(Debug)]
pub struct PeImage<'a> {
    data: &'a [u8],
    pe32_plus: bool,
    size_of_headers: u32,
    directories: Vec<DataDirectory>,
    sections: Vec<Section>,
}

impl<'a> PeImage<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, ImageError> {
        if read_u16(data, 0).ok() != Some(DOS_SIGNATURE) {
            return Err(ImageError::MissingDosSignature);
        }

        let pe_offset = read_u32(data, 0x3C)? as usize;
        if read_u32(data, pe_offset)? != PE_SIGNATURE {
            return Err(ImageError::MissingPeSignature);
        }

        let coff = pe_offset + 4;
        let section_count = read_u16(data, coff + 2)? as usize;
        let optional_size = read_u16(data, coff + 16)? as usize;
        let optional = coff + COFF_HEADER_SIZE;

        let magic = read_u16(data, optional)?;
        let (count_offset, directories_offset, pe32_plus) = match magic {
            PE32_MAGIC => (92, 96, false),
            PE32_PLUS_MAGIC => (108, 112, true),
            other => return Err(ImageError::UnsupportedOptionalHeader(other)),
        };

        let size_of_headers = read_u32(data, optional + 60)?;

        // Never trust the directory count beyond what the optional header can hold
        let declared = read_u32(data, optional + count_offset)? as usize;
        let room = optional_size.saturating_sub(directories_offset) / 8;
        let directory_count = declared.min(room).min(16);

        let mut directories = Vec::with_capacity(directory_count);
        for index in 0..directory_count {
            let entry = optional + directories_offset + index * 8;
            directories.push(DataDirectory {
                rva: read_u32(data, entry)?,
                size: read_u32(data, entry + 4)?,
            });
        }

        let table = optional + optional_size;
        let mut sections = Vec::with_capacity(section_count);
        for index in 0..section_count {
            let header = table + index * SECTION_HEADER_SIZE;
            let raw_name = read_bytes(data, header, 8)?;
            let name_len = raw_name.iter().position(|&b| b == 0).unwrap_or(8);
            sections.push(Section {
                name: String::from_utf8_lossy(&raw_name[..name_len]).into_owned(),
                virtual_size: read_u32(data, header + 8)?,
                virtual_address: read_u32(data, header + 12)?,
                raw_size: read_u32(data, header + 16)?,
                raw_offset: read_u32(data, header + 20)?,
            });
        }

        Ok(Self {
            data,
            pe32_plus,
            size_of_headers,
            directories,
            sections,
        })
    }

    /// Whether the image uses the 64-bit (PE32+) optional header
    pub fn is_pe32_plus(&self) -> bool {
        self.pe32_plus
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// A data directory, or None when it is absent or empty
    pub fn data_directory(&self, index: usize) -> Option<DataDirectory> {
        self.directories
            .get(index)
            .copied()
            .filter(|dir| dir.rva != 0 && dir.size != 0)
    }

    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        if rva < self.size_of_headers {
            return Some(rva as usize);
        }

        let section = self.sections.iter().find(|s| s.contains_rva(rva))?;
        let delta = rva - section.virtual_address;
        if delta >= section.raw_size {
            return None;
        }
        Some(section.raw_offset as usize + delta as usize)
    }

    /// `len` bytes of file data starting at `rva`
    pub fn slice_at_rva(&self, rva: u32, len: usize) -> Result<&'a [u8], ImageError> {
        let offset = self.rva_to_offset(rva).ok_or(ImageError::InvalidRva(rva))?;
        read_bytes(self.data, offset, len)
    }

    /// The bytes covered by a data directory, if the image has one
    pub fn directory_data(&self, index: usize) -> Result<Option<&'a [u8]>, ImageError> {
        match self.data_directory(index) {
            Some(dir) => self.slice_at_rva(dir.rva, dir.size as usize).map(Some),
            None => Ok(None),
        }
    }
}
