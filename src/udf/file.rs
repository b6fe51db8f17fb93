use super::{DescriptorTag, Extent, ExtentLong, TagIdentifier};
use crate::{Cursor, Result, UdfError};

/// ICB file type codes used by the reader.
pub const FILE_TYPE_DIRECTORY: u8 = 4;
pub const FILE_TYPE_REGULAR: u8 = 5;

/// Directory-entry characteristics bits.
pub const CHAR_HIDDEN: u8 = 0x01;
pub const CHAR_DIRECTORY: u8 = 0x02;
pub const CHAR_DELETED: u8 = 0x04;
pub const CHAR_PARENT: u8 = 0x08;
pub const CHAR_METADATA: u8 = 0x10;

/// Directory flag in the conventional mode integer.
pub const MODE_DIRECTORY: u32 = 0o40000;

/// The top two bits of an allocation descriptor length carry the extent
/// type, not size.
const EXTENT_LENGTH_MASK: u32 = 0x3FFF_FFFF;

#[derive(Debug, Clone)]
pub struct IcbTag {
    pub prior_direct_entries: u32,
    pub strategy_type: u16,
    pub max_entries: u16,
    pub file_type: u8,
    pub flags: u16,
}

impl IcbTag {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let prior_direct_entries = c.read_u32()?;
        let strategy_type = c.read_u16()?;
        c.skip(2)?; // strategy parameter
        let max_entries = c.read_u16()?;
        c.skip(1)?; // reserved
        let file_type = c.read_u8()?;
        c.skip(6)?; // parent ICB location
        let flags = c.read_u16()?;
        Ok(IcbTag {
            prior_direct_entries,
            strategy_type,
            max_entries,
            file_type,
            flags,
        })
    }
}

/// Names the root directory's ICB within the partition.
#[derive(Debug, Clone)]
pub struct FileSetDescriptor {
    pub tag: DescriptorTag,
    pub recording_time: time::OffsetDateTime,
    pub interchange_level: u16,
    pub maximum_interchange_level: u16,
    pub file_set_number: u32,
    pub logical_volume_identifier: String,
    pub file_set_identifier: String,
    pub root_directory_icb: ExtentLong,
}

impl FileSetDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::FileSet)?;
        let recording_time = c.read_timestamp()?;
        let interchange_level = c.read_u16()?;
        let maximum_interchange_level = c.read_u16()?;
        c.skip(8)?; // character set lists
        let file_set_number = c.read_u32()?;
        c.skip(4)?; // file set descriptor number
        c.skip(64)?; // logical volume identifier character set
        let logical_volume_identifier = c.read_dstring(128)?;
        c.skip(64)?; // file set character set
        let file_set_identifier = c.read_dstring(32)?;
        c.skip(64)?; // copyright + abstract file identifiers
        let root_directory_icb = ExtentLong::read(c)?;
        Ok(FileSetDescriptor {
            tag,
            recording_time,
            interchange_level,
            maximum_interchange_level,
            file_set_number,
            logical_volume_identifier,
            file_set_identifier,
            root_directory_icb,
        })
    }
}

/// A file or directory's metadata plus the extents holding its data.
#[derive(Debug, Clone)]
pub struct FileEntryDescriptor {
    pub tag: DescriptorTag,
    pub icb_tag: IcbTag,
    pub uid: u32,
    pub gid: u32,
    pub permissions: Permissions,
    pub link_count: u16,
    pub information_length: u64,
    pub logical_blocks_recorded: u64,
    pub access_time: time::OffsetDateTime,
    pub modification_time: time::OffsetDateTime,
    pub attribute_time: time::OffsetDateTime,
    pub unique_id: u64,
    pub allocation_descriptors: Vec<Extent>,
}

impl FileEntryDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::FileEntry)?;
        let icb_tag = IcbTag::read(c)?;
        let uid = c.read_u32()?;
        let gid = c.read_u32()?;
        let permissions = Permissions(c.read_u32()?);
        let link_count = c.read_u16()?;
        c.skip(2)?; // record format + record display attributes
        c.skip(4)?; // record length
        let information_length = c.read_u64()?;
        let logical_blocks_recorded = c.read_u64()?;
        let access_time = c.read_timestamp()?;
        let modification_time = c.read_timestamp()?;
        let attribute_time = c.read_timestamp()?;
        c.skip(4)?; // checkpoint
        c.skip(16)?; // extended attribute ICB
        c.skip(32)?; // implementation identifier
        let unique_id = c.read_u64()?;
        let extended_attributes_length = c.read_u32()?;
        let allocation_descriptors_length = c.read_u32()?;
        c.skip(extended_attributes_length as usize)?;

        let mut allocation_descriptors =
            Vec::with_capacity(allocation_descriptors_length as usize / 8);
        for _ in 0..allocation_descriptors_length / 8 {
            let mut extent = Extent::read(c)?;
            extent.length &= EXTENT_LENGTH_MASK;
            allocation_descriptors.push(extent);
        }

        Ok(FileEntryDescriptor {
            tag,
            icb_tag,
            uid,
            gid,
            permissions,
            link_count,
            information_length,
            logical_blocks_recorded,
            access_time,
            modification_time,
            attribute_time,
            unique_id,
            allocation_descriptors,
        })
    }

    pub fn is_directory(&self) -> bool {
        self.icb_tag.file_type == FILE_TYPE_DIRECTORY
    }
}

/// One directory entry: the child's decoded name, characteristics and the
/// ICB locating its file entry. On disk the record is padded to a four byte
/// boundary; `read` consumes the padding.
#[derive(Debug, Clone)]
pub struct FileIdentifierDescriptor {
    pub tag: DescriptorTag,
    pub version_number: u16,
    pub characteristics: u8,
    pub icb: ExtentLong,
    pub identifier: String,
}

impl FileIdentifierDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::FileIdentifier)?;
        let version_number = c.read_u16()?;
        let characteristics = c.read_u8()?;
        let identifier_length = c.read_u8()? as usize;
        let icb = ExtentLong::read(c)?;
        let implementation_use_length = c.read_u16()? as usize;
        c.skip(implementation_use_length)?;
        let identifier = c.read_dchars(identifier_length)?;

        let total = 38 + implementation_use_length + identifier_length;
        c.skip((4 - total % 4) % 4)?;

        Ok(FileIdentifierDescriptor {
            tag,
            version_number,
            characteristics,
            icb,
            identifier,
        })
    }

    pub fn is_directory(&self) -> bool {
        self.characteristics & CHAR_DIRECTORY != 0
    }

    pub fn is_deleted(&self) -> bool {
        self.characteristics & CHAR_DELETED != 0
    }

    pub fn is_parent(&self) -> bool {
        self.characteristics & CHAR_PARENT != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.characteristics & CHAR_HIDDEN != 0
    }
}

/// 15-bit permission field: three five-bit groups (other, group, owner),
/// each holding execute, write, read, change-attribute and delete bits from
/// lowest to highest.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Permissions(pub u32);

impl Permissions {
    /// Conventional mode bits: `owner << 6 | group << 3 | other`, with
    /// execute 1, write 2, read 4. The change-attribute and delete bits
    /// have no conventional counterpart and are dropped.
    pub fn to_unix_mode(self) -> u32 {
        let group = |shift: u32| (self.0 >> shift) & 0x7;
        group(10) << 6 | group(5) << 3 | group(0)
    }

    pub fn from_unix_mode(mode: u32) -> Self {
        Permissions(((mode >> 6) & 0x7) << 10 | ((mode >> 3) & 0x7) << 5 | (mode & 0x7))
    }
}

/// Public view over one file or directory in the image. The root carries no
/// file identifier and takes its name from the logical volume identifier.
#[derive(Debug, Clone)]
pub struct FileInfo {
    entry: FileEntryDescriptor,
    identifier: Option<FileIdentifierDescriptor>,
    name: String,
    path: String,
}

impl FileInfo {
    pub(crate) fn new(
        entry: FileEntryDescriptor,
        identifier: Option<FileIdentifierDescriptor>,
        name: String,
        path: String,
    ) -> Self {
        FileInfo {
            entry,
            identifier,
            name,
            path,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path from the root, with components joined by `/`. Empty for the
    /// root itself.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.entry.information_length
    }

    pub fn permissions(&self) -> Permissions {
        self.entry.permissions
    }

    pub fn mode(&self) -> u32 {
        let mode = self.entry.permissions.to_unix_mode();
        if self.is_dir() {
            mode | MODE_DIRECTORY
        } else {
            mode
        }
    }

    pub fn mod_time(&self) -> time::OffsetDateTime {
        self.entry.modification_time
    }

    pub fn uid(&self) -> u32 {
        self.entry.uid
    }

    pub fn gid(&self) -> u32 {
        self.entry.gid
    }

    pub fn is_dir(&self) -> bool {
        self.entry.is_directory()
    }

    pub fn is_root(&self) -> bool {
        self.identifier.is_none()
    }

    pub fn is_hidden(&self) -> bool {
        self.identifier
            .as_ref()
            .map(|id| id.is_hidden())
            .unwrap_or(false)
    }

    pub fn entry(&self) -> &FileEntryDescriptor {
        &self.entry
    }

    pub fn identifier(&self) -> Option<&FileIdentifierDescriptor> {
        self.identifier.as_ref()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::udf::tag::tests::tag_bytes;

    #[test]
    fn permissions_round_trip() {
        for mode in 0..=0o777 {
            let packed = Permissions::from_unix_mode(mode);
            assert_eq!(mode, packed.to_unix_mode());
        }
    }

    #[test]
    fn permissions_drop_nonconventional_bits() {
        // Owner read+write+chattr+delete, group read, other read.
        let perms = Permissions(0b11110 << 10 | 0b00100 << 5 | 0b00100);
        assert_eq!(0o644, perms.to_unix_mode());
    }

    pub(crate) fn fid_bytes(name: &str, characteristics: u8, location: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&tag_bytes(TagIdentifier::FileIdentifier as u16, 0));
        buf.extend_from_slice(&1_u16.to_le_bytes()); // version
        buf.push(characteristics);
        let identifier_length = if name.is_empty() { 0 } else { name.len() + 1 };
        buf.push(identifier_length as u8);
        buf.extend_from_slice(&2048_u32.to_le_bytes()); // icb length
        buf.extend_from_slice(&(location as u64).to_le_bytes()[..6]); // icb location
        buf.extend_from_slice(&[0; 6]); // icb reserved
        buf.extend_from_slice(&0_u16.to_le_bytes()); // implementation use length
        if !name.is_empty() {
            buf.push(8);
            buf.extend_from_slice(name.as_bytes());
        }
        let total = 38 + identifier_length;
        buf.resize(buf.len() + (4 - total % 4) % 4, 0);
        buf
    }

    #[test]
    fn file_identifier_with_padding() {
        let buf = fid_bytes("a.txt", 0, 9);
        let mut c = Cursor::new(&buf);
        let fid = FileIdentifierDescriptor::read(&mut c).unwrap();

        assert_eq!("a.txt", fid.identifier);
        assert_eq!(9, fid.icb.location);
        assert!(!fid.is_directory());
        // 38 + 6 = 44, already aligned: the whole record must be consumed.
        assert_eq!(0, c.remaining());
    }

    #[test]
    fn parent_entry_has_empty_identifier() {
        let buf = fid_bytes("", CHAR_PARENT | CHAR_DIRECTORY, 1);
        let mut c = Cursor::new(&buf);
        let fid = FileIdentifierDescriptor::read(&mut c).unwrap();

        assert_eq!("", fid.identifier);
        assert!(fid.is_parent());
        assert!(fid.is_directory());
        // 38 rounds up to 40 on disk.
        assert_eq!(0, c.remaining());
    }

    #[test]
    fn consecutive_identifiers_in_one_buffer() {
        let mut buf = fid_bytes("first", CHAR_HIDDEN, 2);
        buf.extend_from_slice(&fid_bytes("second", 0, 3));
        let mut c = Cursor::new(&buf);

        let first = FileIdentifierDescriptor::read(&mut c).unwrap();
        let second = FileIdentifierDescriptor::read(&mut c).unwrap();
        assert_eq!("first", first.identifier);
        assert!(first.is_hidden());
        assert_eq!("second", second.identifier);
        assert_eq!(0, c.remaining());
    }
}
