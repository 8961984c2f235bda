//! CLR metadata reader
//!
//! Locates the metadata root through the CLR runtime header, then walks the
//! compressed table stream far enough to decode row 1 of the Assembly table.
//! Row sizes depend on heap index widths and on the row counts of every table
//! an index or coded index can point at (ECMA-335 partition II, 24.2.6).

use super::pe_image::{PeImage, DIRECTORY_CLR_RUNTIME};
use super::{align4, read_bytes, read_u16, read_u32, read_u64, read_u8, ImageError};

const METADATA_SIGNATURE: u32 = 0x424A_5342; // "BSJB"
const CLR_HEADER_SIZE: usize = 16;
const TABLE_COUNT: usize = 64;

const HEAP_STRINGS_WIDE: u8 = 0x01;
const HEAP_GUID_WIDE: u8 = 0x02;
const HEAP_BLOB_WIDE: u8 = 0x04;
const HEAP_EXTRA_DATA: u8 = 0x40;

// Table identifiers
const MODULE: usize = 0x00;
const TYPE_REF: usize = 0x01;
const TYPE_DEF: usize = 0x02;
const FIELD: usize = 0x04;
const METHOD_DEF: usize = 0x06;
const PARAM: usize = 0x08;
const INTERFACE_IMPL: usize = 0x09;
const MEMBER_REF: usize = 0x0A;
const DECL_SECURITY: usize = 0x0E;
const STAND_ALONE_SIG: usize = 0x11;
const EVENT: usize = 0x14;
const PROPERTY: usize = 0x17;
const MODULE_REF: usize = 0x1A;
const TYPE_SPEC: usize = 0x1B;
const ASSEMBLY: usize = 0x20;
const ASSEMBLY_REF: usize = 0x23;
const FILE: usize = 0x26;
const EXPORTED_TYPE: usize = 0x27;
const MANIFEST_RESOURCE: usize = 0x28;
const GENERIC_PARAM: usize = 0x2A;
const METHOD_SPEC: usize = 0x2B;
const GENERIC_PARAM_CONSTRAINT: usize = 0x2C;

#[derive(Debug, Clone, Copy)]
enum CodedIndex {
    TypeDefOrRef,
    HasConstant,
    HasCustomAttribute,
    HasFieldMarshal,
    HasDeclSecurity,
    MemberRefParent,
    HasSemantics,
    MethodDefOrRef,
    MemberForwarded,
    ResolutionScope,
    CustomAttributeType,
}

impl CodedIndex {
    fn tag_bits(self) -> u32 {
        match self {
            CodedIndex::HasCustomAttribute => 5,
            CodedIndex::MemberRefParent | CodedIndex::CustomAttributeType => 3,
            CodedIndex::TypeDefOrRef
            | CodedIndex::HasConstant
            | CodedIndex::HasDeclSecurity
            | CodedIndex::ResolutionScope => 2,
            CodedIndex::HasFieldMarshal
            | CodedIndex::HasSemantics
            | CodedIndex::MethodDefOrRef
            | CodedIndex::MemberForwarded => 1,
        }
    }

    fn tables(self) -> &'static [usize] {
        match self {
            CodedIndex::TypeDefOrRef => &[TYPE_DEF, TYPE_REF, TYPE_SPEC],
            CodedIndex::HasConstant => &[FIELD, PARAM, PROPERTY],
            CodedIndex::HasCustomAttribute => &[
                METHOD_DEF, FIELD, TYPE_REF, TYPE_DEF, PARAM, INTERFACE_IMPL, MEMBER_REF,
                MODULE, DECL_SECURITY, PROPERTY, EVENT, STAND_ALONE_SIG, MODULE_REF, TYPE_SPEC,
                ASSEMBLY, ASSEMBLY_REF, FILE, EXPORTED_TYPE, MANIFEST_RESOURCE, GENERIC_PARAM,
                GENERIC_PARAM_CONSTRAINT, METHOD_SPEC,
            ],
            CodedIndex::HasFieldMarshal => &[FIELD, PARAM],
            CodedIndex::HasDeclSecurity => &[TYPE_DEF, METHOD_DEF, ASSEMBLY],
            CodedIndex::MemberRefParent => &[TYPE_DEF, TYPE_REF, MODULE_REF, METHOD_DEF, TYPE_SPEC],
            CodedIndex::HasSemantics => &[EVENT, PROPERTY],
            CodedIndex::MethodDefOrRef => &[METHOD_DEF, MEMBER_REF],
            CodedIndex::MemberForwarded => &[FIELD, METHOD_DEF],
            CodedIndex::ResolutionScope => &[MODULE, MODULE_REF, ASSEMBLY_REF, TYPE_REF],
            CodedIndex::CustomAttributeType => &[METHOD_DEF, MEMBER_REF],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Column {
    Fixed(usize),
    Str,
    Guid,
    Blob,
    Table(usize),
    Coded(CodedIndex),
}

use CodedIndex as C;
use Column::{Blob, Coded, Fixed, Guid, Str, Table};

/// Column layouts of tables 0x00 through 0x20 (Assembly)
const SCHEMAS: [&[Column]; ASSEMBLY + 1] = [
    /* 0x00 Module          */ &[Fixed(2), Str, Guid, Guid, Guid],
    /* 0x01 TypeRef         */ &[Coded(C::ResolutionScope), Str, Str],
    /* 0x02 TypeDef         */ &[Fixed(4), Str, Str, Coded(C::TypeDefOrRef), Table(FIELD), Table(METHOD_DEF)],
    /* 0x03 FieldPtr        */ &[Table(FIELD)],
    /* 0x04 Field           */ &[Fixed(2), Str, Blob],
    /* 0x05 MethodPtr       */ &[Table(METHOD_DEF)],
    /* 0x06 MethodDef       */ &[Fixed(4), Fixed(2), Fixed(2), Str, Blob, Table(PARAM)],
    /* 0x07 ParamPtr        */ &[Table(PARAM)],
    /* 0x08 Param           */ &[Fixed(2), Fixed(2), Str],
    /* 0x09 InterfaceImpl   */ &[Table(TYPE_DEF), Coded(C::TypeDefOrRef)],
    /* 0x0A MemberRef       */ &[Coded(C::MemberRefParent), Str, Blob],
    /* 0x0B Constant        */ &[Fixed(2), Coded(C::HasConstant), Blob],
    /* 0x0C CustomAttribute */ &[Coded(C::HasCustomAttribute), Coded(C::CustomAttributeType), Blob],
    /* 0x0D FieldMarshal    */ &[Coded(C::HasFieldMarshal), Blob],
    /* 0x0E DeclSecurity    */ &[Fixed(2), Coded(C::HasDeclSecurity), Blob],
    /* 0x0F ClassLayout     */ &[Fixed(2), Fixed(4), Table(TYPE_DEF)],
    /* 0x10 FieldLayout     */ &[Fixed(4), Table(FIELD)],
    /* 0x11 StandAloneSig   */ &[Blob],
    /* 0x12 EventMap        */ &[Table(TYPE_DEF), Table(EVENT)],
    /* 0x13 EventPtr        */ &[Table(EVENT)],
    /* 0x14 Event           */ &[Fixed(2), Str, Coded(C::TypeDefOrRef)],
    /* 0x15 PropertyMap     */ &[Table(TYPE_DEF), Table(PROPERTY)],
    /* 0x16 PropertyPtr     */ &[Table(PROPERTY)],
    /* 0x17 Property        */ &[Fixed(2), Str, Blob],
    /* 0x18 MethodSemantics */ &[Fixed(2), Table(METHOD_DEF), Coded(C::HasSemantics)],
    /* 0x19 MethodImpl      */ &[Table(TYPE_DEF), Coded(C::MethodDefOrRef), Coded(C::MethodDefOrRef)],
    /* 0x1A ModuleRef       */ &[Str],
    /* 0x1B TypeSpec        */ &[Blob],
    /* 0x1C ImplMap         */ &[Fixed(2), Coded(C::MemberForwarded), Str, Table(MODULE_REF)],
    /* 0x1D FieldRVA        */ &[Fixed(4), Table(FIELD)],
    /* 0x1E EncLog          */ &[Fixed(4), Fixed(4)],
    /* 0x1F EncMap          */ &[Fixed(4)],
    /* 0x20 Assembly        */ &[Fixed(4), Fixed(2), Fixed(2), Fixed(2), Fixed(2), Fixed(4), Blob, Str, Str],
];

/// Name and version from an assembly manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyIdentity {
    pub name: String,
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

impl AssemblyIdentity {
    /// Four-part dotted version
    pub fn version_string(&self) -> String {
        format!("{}.{}.{}.{}", self.major, self.minor, self.build, self.revision)
    }
}

/// Heap index widths and table row counts from the `#~` stream header
struct TableLayout {
    heap_sizes: u8,
    rows: [u32; TABLE_COUNT],
}

impl TableLayout {
    fn heap_index_size(&self, flag: u8) -> usize {
        if self.heap_sizes & flag != 0 {
            4
        } else {
            2
        }
    }

    fn table_index_size(&self, table: usize) -> usize {
        if self.rows[table] < (1 << 16) {
            2
        } else {
            4
        }
    }

    fn coded_index_size(&self, coded: CodedIndex) -> usize {
        let max_rows = coded
            .tables()
            .iter()
            .map(|&table| self.rows[table])
            .max()
            .unwrap_or(0);
        if max_rows < (1u32 << (16 - coded.tag_bits())) {
            2
        } else {
            4
        }
    }

    fn column_size(&self, column: Column) -> usize {
        match column {
            Fixed(size) => size,
            Str => self.heap_index_size(HEAP_STRINGS_WIDE),
            Guid => self.heap_index_size(HEAP_GUID_WIDE),
            Blob => self.heap_index_size(HEAP_BLOB_WIDE),
            Table(table) => self.table_index_size(table),
            Coded(coded) => self.coded_index_size(coded),
        }
    }

    fn row_size(&self, table: usize) -> usize {
        SCHEMAS[table].iter().map(|&column| self.column_size(column)).sum()
    }
}

struct Streams<'a> {
    tables: &'a [u8],
    strings: &'a [u8],
}

/// Read the assembly name and version from a managed image
pub fn read_assembly_identity(image: &PeImage<'_>) -> Result<AssemblyIdentity, ImageError> {
    let clr = image
        .data_directory(DIRECTORY_CLR_RUNTIME)
        .ok_or(ImageError::NoAssemblyManifest)?;
    let header = image.slice_at_rva(clr.rva, CLR_HEADER_SIZE)?;

    let metadata_rva = read_u32(header, 8)?;
    let metadata_size = read_u32(header, 12)? as usize;
    let metadata = image.slice_at_rva(metadata_rva, metadata_size)?;

    let streams = locate_streams(metadata)?;
    read_assembly_row(&streams)
}

fn locate_streams(metadata: &[u8]) -> Result<Streams<'_>, ImageError> {
    if read_u32(metadata, 0)? != METADATA_SIGNATURE {
        return Err(ImageError::InvalidMetadata("bad metadata signature".to_string()));
    }

    let version_length = read_u32(metadata, 12)? as usize;
    let mut offset = 16 + align4(version_length);
    let stream_count = read_u16(metadata, offset + 2)? as usize;
    offset += 4;

    let mut tables = None;
    let mut strings = None;

    for _ in 0..stream_count {
        let stream_offset = read_u32(metadata, offset)? as usize;
        let stream_size = read_u32(metadata, offset + 4)? as usize;

        let name_start = offset + 8;
        let name_bytes = metadata
            .get(name_start..)
            .ok_or(ImageError::Truncated { offset: name_start })?;
        let name_len = name_bytes
            .iter()
            .take(32)
            .position(|&b| b == 0)
            .ok_or_else(|| ImageError::InvalidMetadata("unterminated stream name".to_string()))?;
        let name = &name_bytes[..name_len];
        offset = name_start + align4(name_len + 1);

        let data = read_bytes(metadata, stream_offset, stream_size)?;
        match name {
            b"#~" | b"#-" => tables = Some(data),
            b"#Strings" => strings = Some(data),
            _ => {}
        }
    }

    match (tables, strings) {
        (Some(tables), Some(strings)) => Ok(Streams { tables, strings }),
        (None, _) => Err(ImageError::InvalidMetadata("missing table stream".to_string())),
        (_, None) => Err(ImageError::InvalidMetadata("missing #Strings heap".to_string())),
    }
}

fn read_assembly_row(streams: &Streams<'_>) -> Result<AssemblyIdentity, ImageError> {
    let data = streams.tables;
    let heap_sizes = read_u8(data, 6)?;
    let valid = read_u64(data, 8)?;

    let mut rows = [0u32; TABLE_COUNT];
    let mut offset = 24;
    for (table, count) in rows.iter_mut().enumerate() {
        if valid & (1u64 << table) != 0 {
            *count = read_u32(data, offset)?;
            offset += 4;
        }
    }
    if heap_sizes & HEAP_EXTRA_DATA != 0 {
        offset += 4;
    }

    let layout = TableLayout { heap_sizes, rows };
    if layout.rows[ASSEMBLY] == 0 {
        return Err(ImageError::NoAssemblyManifest);
    }

    for table in 0..ASSEMBLY {
        offset += layout.rows[table] as usize * layout.row_size(table);
    }

    let string_width = layout.heap_index_size(HEAP_STRINGS_WIDE);
    let blob_width = layout.heap_index_size(HEAP_BLOB_WIDE);

    let major = read_u16(data, offset + 4)?;
    let minor = read_u16(data, offset + 6)?;
    let build = read_u16(data, offset + 8)?;
    let revision = read_u16(data, offset + 10)?;
    let name_offset = offset + 16 + blob_width;
    let name_index = read_heap_index(data, name_offset, string_width)?;

    Ok(AssemblyIdentity {
        name: read_string(streams.strings, name_index)?,
        major,
        minor,
        build,
        revision,
    })
}

fn read_heap_index(data: &[u8], offset: usize, width: usize) -> Result<usize, ImageError> {
    if width == 4 {
        Ok(read_u32(data, offset)? as usize)
    } else {
        Ok(read_u16(data, offset)? as usize)
    }
}

fn read_string(heap: &[u8], index: usize) -> Result<String, ImageError> {
    let tail = heap
        .get(index..)
        .ok_or_else(|| ImageError::InvalidMetadata(format!("string index 0x{:x} out of range", index)))?;
    let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    Ok(String::from_utf8_lossy(&tail[..len]).into_owned())
}
