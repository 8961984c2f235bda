//! `VS_VERSIONINFO` resource reader
//!
//! Finds the first `RT_VERSION` resource in the image and decodes the string
//! table that best matches the resource's declared translation.

use super::pe_image::{PeImage, DIRECTORY_RESOURCE};
use super::{align4, read_bytes, read_u16, read_u32, ImageError};

const RT_VERSION: u32 = 16;
const SUBDIRECTORY_FLAG: u32 = 0x8000_0000;
const BLOCK_HEADER_SIZE: usize = 6;
const MAX_BLOCK_DEPTH: usize = 8;

/// String tables tried when no declared translation matches
const FALLBACK_TABLES: [&str; 3] = ["040904b0", "040904e4", "04090000"];

/// Key/value pairs from the selected `StringFileInfo` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionStrings {
    entries: Vec<(String, String)>,
}

impl VersionStrings {
    /// Value for `key`, or None when absent or blank
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    pub fn file_description(&self) -> Option<&str> {
        self.get("FileDescription")
    }

    pub fn internal_name(&self) -> Option<&str> {
        self.get("InternalName")
    }

    pub fn original_filename(&self) -> Option<&str> {
        self.get("OriginalFilename")
    }

    pub fn file_version(&self) -> Option<&str> {
        self.get("FileVersion")
    }

    pub fn product_version(&self) -> Option<&str> {
        self.get("ProductVersion")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One node of the version resource tree
struct Block<'a> {
    key: String,
    value: &'a [u8],
    is_text: bool,
    children: Vec<Block<'a>>,
}

impl Block<'_> {
    fn child(&self, key: &str) -> Option<&Block<'_>> {
        self.children.iter().find(|c| c.key == key)
    }

    fn text(&self) -> String {
        decode_utf16z(self.value)
    }
}

/// Read the version strings of an image; None when it has no version resource
pub fn read_version_resource(image: &PeImage<'_>) -> Result<Option<VersionStrings>, ImageError> {
    let Some(resources) = image.directory_data(DIRECTORY_RESOURCE)? else {
        return Ok(None);
    };

    let Some(type_dir) = find_entry(resources, 0, Some(RT_VERSION))? else {
        return Ok(None);
    };
    let type_dir = expect_subdirectory(Some(type_dir))?;
    let name_dir = expect_subdirectory(find_entry(resources, type_dir, None)?)?;
    let leaf = find_entry(resources, name_dir, None)?
        .ok_or_else(|| ImageError::InvalidResource("empty language directory".to_string()))?;
    if leaf & SUBDIRECTORY_FLAG != 0 {
        return Err(ImageError::InvalidResource("unexpected nested directory".to_string()));
    }

    let data_rva = read_u32(resources, leaf as usize)?;
    let data_size = read_u32(resources, leaf as usize + 4)? as usize;
    let data = image.slice_at_rva(data_rva, data_size)?;

    parse_version_info(data).map(Some)
}

/// Decode a raw `VS_VERSIONINFO` blob
pub fn parse_version_info(data: &[u8]) -> Result<VersionStrings, ImageError> {
    let (root, _) = parse_block(data, 0, 0)?;
    if root.key != "VS_VERSION_INFO" {
        return Err(ImageError::InvalidResource(format!("unexpected root key '{}'", root.key)));
    }

    let Some(string_info) = root.child("StringFileInfo") else {
        return Ok(VersionStrings::default());
    };

    let translations = root
        .child("VarFileInfo")
        .and_then(|var| var.child("Translation"))
        .map(|t| translation_keys(t.value))
        .unwrap_or_default();

    let table = translations
        .iter()
        .map(String::as_str)
        .chain(FALLBACK_TABLES)
        .find_map(|key| {
            string_info
                .children
                .iter()
                .find(|table| table.key.eq_ignore_ascii_case(key))
        })
        .or_else(|| string_info.children.first());

    let entries = table
        .map(|table| {
            table
                .children
                .iter()
                .map(|s| (s.key.clone(), s.text()))
                .collect()
        })
        .unwrap_or_default();

    Ok(VersionStrings { entries })
}

/// Offset of the matching entry's target: a subdirectory (flag set) or a data entry
fn find_entry(resources: &[u8], dir: u32, id: Option<u32>) -> Result<Option<u32>, ImageError> {
    let dir = (dir & !SUBDIRECTORY_FLAG) as usize;
    let named = read_u16(resources, dir + 12)? as usize;
    let ids = read_u16(resources, dir + 14)? as usize;

    for index in 0..named + ids {
        let entry = dir + 16 + index * 8;
        let name = read_u32(resources, entry)?;
        let target = read_u32(resources, entry + 4)?;
        match id {
            Some(wanted) if name != wanted => continue,
            _ => return Ok(Some(target)),
        }
    }

    Ok(None)
}

fn expect_subdirectory(target: Option<u32>) -> Result<u32, ImageError> {
    match target {
        Some(offset) if offset & SUBDIRECTORY_FLAG != 0 => Ok(offset),
        _ => Err(ImageError::InvalidResource("malformed resource directory".to_string())),
    }
}

fn parse_block(data: &[u8], offset: usize, depth: usize) -> Result<(Block<'_>, usize), ImageError> {
    if depth > MAX_BLOCK_DEPTH {
        return Err(ImageError::InvalidResource("version blocks nested too deeply".to_string()));
    }

    let length = read_u16(data, offset)? as usize;
    if length < BLOCK_HEADER_SIZE {
        return Err(ImageError::InvalidResource(format!("block at 0x{:x} is too short", offset)));
    }
    let end = offset + length;
    read_bytes(data, offset, length)?;

    let value_length = read_u16(data, offset + 2)? as usize;
    let is_text = read_u16(data, offset + 4)? == 1;

    let key_start = offset + BLOCK_HEADER_SIZE;
    let key_units = data[key_start..end]
        .chunks_exact(2)
        .position(|unit| unit[0] == 0 && unit[1] == 0)
        .ok_or_else(|| ImageError::InvalidResource("unterminated block key".to_string()))?;
    let key = decode_utf16z(&data[key_start..key_start + key_units * 2]);

    let value_start = align4(key_start + (key_units + 1) * 2).min(end);
    let value_bytes = if is_text { value_length * 2 } else { value_length };
    let value_end = (value_start + value_bytes).min(end);
    let value = &data[value_start..value_end];

    let mut children = Vec::new();
    let mut cursor = align4(value_end);
    while cursor + BLOCK_HEADER_SIZE <= end {
        // Trailing zero padding inside the parent ends the child list
        if read_u16(data, cursor)? == 0 {
            break;
        }
        let (child, child_end) = parse_block(&data[..end], cursor, depth + 1)?;
        children.push(child);
        cursor = align4(child_end);
    }

    Ok((
        Block {
            key,
            value,
            is_text,
            children,
        },
        end,
    ))
}

fn translation_keys(value: &[u8]) -> Vec<String> {
    value
        .chunks_exact(4)
        .map(|pair| {
            let language = u16::from_le_bytes([pair[0], pair[1]]);
            let code_page = u16::from_le_bytes([pair[2], pair[3]]);
            format!("{:04x}{:04x}", language, code_page)
        })
        .collect()
}

fn decode_utf16z(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}
