//! Builds minimal PE images for tests
//!
//! The images carry a single `.data` section holding an optional CLR header
//! with metadata tables and an optional `RT_VERSION` resource tree.
#![allow(dead_code)]

use std::io;
use std::path::Path;

const PE_OFFSET: usize = 0x40;
const FILE_ALIGNMENT: usize = 0x200;
const SECTION_RVA: u32 = 0x1000;
const CLR_HEADER_SIZE: usize = 72;

#[derive(Debug, Clone, Default)]
pub struct PeBuilder {
    pe32_plus: bool,
    assembly: Option<(String, [u16; 4])>,
    module_only: bool,
    version_strings: Vec<(String, String)>,
    empty_version_resource: bool,
}

impl PeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pe32_plus(mut self) -> Self {
        self.pe32_plus = true;
        self
    }

    /// Managed metadata whose Assembly row carries `name` and `version`
    pub fn with_assembly(mut self, name: &str, version: [u16; 4]) -> Self {
        self.assembly = Some((name.to_string(), version));
        self
    }

    /// Managed metadata without an Assembly row, like a netmodule
    pub fn with_module_only_metadata(mut self) -> Self {
        self.module_only = true;
        self
    }

    pub fn with_version_string(mut self, key: &str, value: &str) -> Self {
        self.version_strings.push((key.to_string(), value.to_string()));
        self
    }

    /// A version resource with fixed info but no string table
    pub fn with_empty_version_resource(mut self) -> Self {
        self.empty_version_resource = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        let mut clr_directory = (0u32, 0u32);
        let mut resource_directory = (0u32, 0u32);

        if self.assembly.is_some() || self.module_only {
            let clr_rva = SECTION_RVA + payload.len() as u32;
            let metadata_rva = clr_rva + CLR_HEADER_SIZE as u32;
            let metadata = self.metadata();

            let mut header = vec![0u8; CLR_HEADER_SIZE];
            put_u32(&mut header, 0, CLR_HEADER_SIZE as u32);
            put_u16(&mut header, 4, 2);
            put_u16(&mut header, 6, 5);
            put_u32(&mut header, 8, metadata_rva);
            put_u32(&mut header, 12, metadata.len() as u32);
            put_u32(&mut header, 16, 1);

            payload.extend_from_slice(&header);
            payload.extend_from_slice(&metadata);
            clr_directory = (clr_rva, CLR_HEADER_SIZE as u32);
        }

        if !self.version_strings.is_empty() || self.empty_version_resource {
            pad_to(&mut payload, 4);
            let resource_rva = SECTION_RVA + payload.len() as u32;
            let blob = if self.empty_version_resource && self.version_strings.is_empty() {
                root_block(Vec::new())
            } else {
                let pairs: Vec<(&str, &str)> = self
                    .version_strings
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                version_info_blob(&pairs)
            };
            let tree = resource_tree(resource_rva, &blob);
            resource_directory = (resource_rva, tree.len() as u32);
            payload.extend_from_slice(&tree);
        }

        let virtual_size = payload.len().max(1);
        pad_to(&mut payload, FILE_ALIGNMENT);
        if payload.is_empty() {
            payload.resize(FILE_ALIGNMENT, 0);
        }

        let mut image = self.headers(virtual_size, payload.len(), clr_directory, resource_directory);
        image.extend_from_slice(&payload);
        image
    }

    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.build())
    }

    fn headers(
        &self,
        virtual_size: usize,
        raw_size: usize,
        clr: (u32, u32),
        resources: (u32, u32),
    ) -> Vec<u8> {
        let mut data = vec![0u8; FILE_ALIGNMENT];
        data[0] = b'M';
        data[1] = b'Z';
        put_u32(&mut data, 0x3C, PE_OFFSET as u32);
        data[PE_OFFSET..PE_OFFSET + 4].copy_from_slice(b"PE\0\0");

        let (magic, optional_size, count_offset, directories_offset, machine) = if self.pe32_plus {
            (0x20Bu16, 240usize, 108usize, 112usize, 0x8664u16)
        } else {
            (0x10B, 224, 92, 96, 0x14C)
        };

        let coff = PE_OFFSET + 4;
        put_u16(&mut data, coff, machine);
        put_u16(&mut data, coff + 2, 1);
        put_u16(&mut data, coff + 16, optional_size as u16);
        put_u16(&mut data, coff + 18, 0x2102);

        let optional = coff + 20;
        put_u16(&mut data, optional, magic);
        put_u32(&mut data, optional + 32, 0x1000);
        put_u32(&mut data, optional + 36, FILE_ALIGNMENT as u32);
        put_u32(&mut data, optional + 56, SECTION_RVA + align(virtual_size, 0x1000) as u32);
        put_u32(&mut data, optional + 60, FILE_ALIGNMENT as u32);
        put_u32(&mut data, optional + count_offset, 16);

        let directory = |index: usize| optional + directories_offset + index * 8;
        put_u32(&mut data, directory(2), resources.0);
        put_u32(&mut data, directory(2) + 4, resources.1);
        put_u32(&mut data, directory(14), clr.0);
        put_u32(&mut data, directory(14) + 4, clr.1);

        let section = optional + optional_size;
        data[section..section + 5].copy_from_slice(b".data");
        put_u32(&mut data, section + 8, virtual_size as u32);
        put_u32(&mut data, section + 12, SECTION_RVA);
        put_u32(&mut data, section + 16, raw_size as u32);
        put_u32(&mut data, section + 20, FILE_ALIGNMENT as u32);
        put_u32(&mut data, section + 36, 0xC000_0040);

        data
    }

    fn metadata(&self) -> Vec<u8> {
        let (assembly_name, version) = match &self.assembly {
            Some((name, version)) if !self.module_only => (Some(name.as_str()), *version),
            _ => (None, [0; 4]),
        };

        // #Strings heap: empty string, module name, assembly name
        let module_name = format!("{}.dll", assembly_name.unwrap_or("module"));
        let mut strings = vec![0u8];
        let module_index = strings.len() as u16;
        strings.extend_from_slice(module_name.as_bytes());
        strings.push(0);
        let assembly_index = strings.len() as u16;
        if let Some(name) = assembly_name {
            strings.extend_from_slice(name.as_bytes());
            strings.push(0);
        }
        pad_to(&mut strings, 4);

        // #~ stream with Module, TypeDef and optionally Assembly rows
        let mut tables = vec![0u8; 24];
        tables[4] = 2;
        tables[7] = 1;
        let mut valid: u64 = (1 << 0x00) | (1 << 0x02);
        if assembly_name.is_some() {
            valid |= 1 << 0x20;
        }
        tables[8..16].copy_from_slice(&valid.to_le_bytes());
        for _ in 0..valid.count_ones() {
            tables.extend_from_slice(&1u32.to_le_bytes());
        }

        let mut module_row = vec![0u8; 10];
        put_u16(&mut module_row, 2, module_index);
        tables.extend_from_slice(&module_row);
        tables.extend_from_slice(&[0u8; 14]);

        if assembly_name.is_some() {
            let mut row = vec![0u8; 22];
            put_u32(&mut row, 0, 0x8004);
            for (index, part) in version.iter().enumerate() {
                put_u16(&mut row, 4 + index * 2, *part);
            }
            put_u16(&mut row, 18, assembly_index);
            tables.extend_from_slice(&row);
        }
        pad_to(&mut tables, 4);

        let header_size = 64usize;
        let mut root = Vec::with_capacity(header_size + tables.len() + strings.len());
        root.extend_from_slice(b"BSJB");
        root.extend_from_slice(&1u16.to_le_bytes());
        root.extend_from_slice(&1u16.to_le_bytes());
        root.extend_from_slice(&0u32.to_le_bytes());
        root.extend_from_slice(&12u32.to_le_bytes());
        let mut version_text = b"v4.0.30319".to_vec();
        version_text.resize(12, 0);
        root.extend_from_slice(&version_text);
        root.extend_from_slice(&0u16.to_le_bytes());
        root.extend_from_slice(&2u16.to_le_bytes());

        let tables_offset = header_size as u32;
        let strings_offset = tables_offset + tables.len() as u32;
        stream_header(&mut root, tables_offset, tables.len() as u32, "#~");
        stream_header(&mut root, strings_offset, strings.len() as u32, "#Strings");
        debug_assert_eq!(root.len(), header_size);

        root.extend_from_slice(&tables);
        root.extend_from_slice(&strings);
        root
    }
}

/// A complete `VS_VERSIONINFO` blob with one `040904b0` string table
pub fn version_info_blob(strings: &[(&str, &str)]) -> Vec<u8> {
    let entries = strings
        .iter()
        .map(|(key, value)| {
            let text = utf16z(value);
            block(key, &text, (text.len() / 2) as u16, true, Vec::new())
        })
        .collect();

    let table = block("040904b0", &[], 0, true, entries);
    let string_info = block("StringFileInfo", &[], 0, true, vec![table]);

    let mut translation = Vec::new();
    translation.extend_from_slice(&0x0409u16.to_le_bytes());
    translation.extend_from_slice(&0x04b0u16.to_le_bytes());
    let var = block("Translation", &translation, 4, false, Vec::new());
    let var_info = block("VarFileInfo", &[], 0, true, vec![var]);

    root_block(vec![string_info, var_info])
}

fn root_block(children: Vec<Vec<u8>>) -> Vec<u8> {
    let mut fixed = vec![0u8; 52];
    put_u32(&mut fixed, 0, 0xFEEF_04BD);
    put_u32(&mut fixed, 4, 0x0001_0000);
    block("VS_VERSION_INFO", &fixed, 52, false, children)
}

fn block(key: &str, value: &[u8], value_length: u16, is_text: bool, children: Vec<Vec<u8>>) -> Vec<u8> {
    let mut data = vec![0u8; 6];
    data.extend_from_slice(&utf16z(key));
    pad_to(&mut data, 4);
    data.extend_from_slice(value);
    for child in children {
        pad_to(&mut data, 4);
        data.extend_from_slice(&child);
    }

    let length = data.len() as u16;
    put_u16(&mut data, 0, length);
    put_u16(&mut data, 2, value_length);
    put_u16(&mut data, 4, u16::from(is_text));
    data
}

/// Root, type, name and language levels pointing at `blob`
fn resource_tree(resource_rva: u32, blob: &[u8]) -> Vec<u8> {
    const SUBDIRECTORY: u32 = 0x8000_0000;

    let mut tree = vec![0u8; 88];
    for (dir, id, target) in [(0usize, 16u32, SUBDIRECTORY | 24), (24, 1, SUBDIRECTORY | 48), (48, 0x409, 72)] {
        put_u16(&mut tree, dir + 14, 1);
        put_u32(&mut tree, dir + 16, id);
        put_u32(&mut tree, dir + 20, target);
    }
    put_u32(&mut tree, 72, resource_rva + 88);
    put_u32(&mut tree, 76, blob.len() as u32);

    tree.extend_from_slice(blob);
    tree
}

fn stream_header(data: &mut Vec<u8>, offset: u32, size: u32, name: &str) {
    data.extend_from_slice(&offset.to_le_bytes());
    data.extend_from_slice(&size.to_le_bytes());
    data.extend_from_slice(name.as_bytes());
    data.push(0);
    pad_to(data, 4);
}

fn utf16z(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

fn pad_to(data: &mut Vec<u8>, alignment: usize) {
    let len = align(data.len(), alignment);
    data.resize(len, 0);
}

fn align(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

fn put_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
