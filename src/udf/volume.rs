use super::{DescriptorTag, TagIdentifier};
use crate::{Cursor, Result, UdfError};

/// Contiguous run of sectors: byte length plus starting sector.
#[derive(Debug, Copy, Clone, Default)]
pub struct Extent {
    pub length: u32,
    pub location: u32,
}

impl Extent {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        Ok(Extent {
            length: c.read_u32()?,
            location: c.read_u32()?,
        })
    }
}

/// Wide extent form used by ICB references: the location is a 48-bit field
/// and the remaining six bytes of the record are reserved.
#[derive(Debug, Copy, Clone, Default)]
pub struct ExtentLong {
    pub length: u32,
    pub location: u64,
}

impl ExtentLong {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let length = c.read_u32()?;
        let location = c.read_u48()?;
        c.skip(6)?;
        Ok(ExtentLong { length, location })
    }
}

/// 32-byte registered identifier carried by several descriptors.
#[derive(Debug, Copy, Clone)]
pub struct EntityId {
    pub flags: u8,
    pub identifier: [u8; 23],
    pub suffix: [u8; 8],
}

impl EntityId {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let flags = c.read_u8()?;
        let mut identifier = [0_u8; 23];
        identifier.copy_from_slice(c.read_bytes(23)?);
        let mut suffix = [0_u8; 8];
        suffix.copy_from_slice(c.read_bytes(8)?);
        Ok(EntityId {
            flags,
            identifier,
            suffix,
        })
    }

    pub fn identifier_str(&self) -> String {
        self.identifier
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| char::from(b))
            .collect()
    }
}

/// CD-ROM style volume structure descriptors found at the start of the
/// image, recognized by a five byte ASCII identifier. They are only used to
/// confirm the image is UDF-formatted before descriptor parsing begins.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VolumeStructureDescriptor {
    ExtendedArea,
    Boot,
    Cdw,
    Nsr,
    Terminal,
}

impl VolumeStructureDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        c.skip(1)?; // structure type
        let identifier = c.read_bytes(5)?;
        match identifier {
            b"BEA01" => Ok(VolumeStructureDescriptor::ExtendedArea),
            b"BOOT2" => Ok(VolumeStructureDescriptor::Boot),
            b"CDW02" => Ok(VolumeStructureDescriptor::Cdw),
            b"NSR02" | b"NSR03" => Ok(VolumeStructureDescriptor::Nsr),
            b"TEA01" => Ok(VolumeStructureDescriptor::Terminal),
            other => Err(UdfError::UnknownVolumeStructure(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrimaryVolumeDescriptor {
    pub tag: DescriptorTag,
    pub sequence_number: u32,
    pub descriptor_number: u32,
    pub volume_identifier: String,
    pub volume_sequence_number: u16,
    pub maximum_volume_sequence_number: u16,
    pub interchange_level: u16,
    pub maximum_interchange_level: u16,
    pub volume_set_identifier: String,
    pub recording_time: time::OffsetDateTime,
}

impl PrimaryVolumeDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::PrimaryVolume)?;
        let sequence_number = c.read_u32()?;
        let descriptor_number = c.read_u32()?;
        let volume_identifier = c.read_dstring(32)?;
        let volume_sequence_number = c.read_u16()?;
        let maximum_volume_sequence_number = c.read_u16()?;
        let interchange_level = c.read_u16()?;
        let maximum_interchange_level = c.read_u16()?;
        c.skip(8)?; // character set lists
        let volume_set_identifier = c.read_dstring(128)?;
        c.skip(128)?; // descriptor + explanatory character sets
        c.skip(16)?; // volume abstract + copyright notice extents
        c.skip(32)?; // application identifier
        let recording_time = c.read_timestamp()?;
        Ok(PrimaryVolumeDescriptor {
            tag,
            sequence_number,
            descriptor_number,
            volume_identifier,
            volume_sequence_number,
            maximum_volume_sequence_number,
            interchange_level,
            maximum_interchange_level,
            volume_set_identifier,
            recording_time,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AnchorVolumeDescriptorPointer {
    pub tag: DescriptorTag,
    pub main_sequence: Extent,
    pub reserve_sequence: Extent,
}

impl AnchorVolumeDescriptorPointer {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::AnchorVolumePointer)?;
        Ok(AnchorVolumeDescriptorPointer {
            tag,
            main_sequence: Extent::read(c)?,
            reserve_sequence: Extent::read(c)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct VolumeDescriptorPointer {
    pub tag: DescriptorTag,
    pub sequence_number: u32,
    pub next_sequence: Extent,
}

impl VolumeDescriptorPointer {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::VolumePointer)?;
        Ok(VolumeDescriptorPointer {
            tag,
            sequence_number: c.read_u32()?,
            next_sequence: Extent::read(c)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ImplementationUseVolumeDescriptor {
    pub tag: DescriptorTag,
    pub sequence_number: u32,
    pub implementation_identifier: EntityId,
}

impl ImplementationUseVolumeDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::ImplementationUseVolume)?;
        Ok(ImplementationUseVolumeDescriptor {
            tag,
            sequence_number: c.read_u32()?,
            implementation_identifier: EntityId::read(c)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PartitionDescriptor {
    pub tag: DescriptorTag,
    pub sequence_number: u32,
    pub flags: u16,
    pub partition_number: u16,
    pub contents: EntityId,
    pub access_type: u32,
    /// First sector of the partition; every partition-relative location on
    /// the volume resolves against this.
    pub starting_location: u32,
    pub length: u32,
}

impl PartitionDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::Partition)?;
        let sequence_number = c.read_u32()?;
        let flags = c.read_u16()?;
        let partition_number = c.read_u16()?;
        let contents = EntityId::read(c)?;
        c.skip(128)?; // partition contents use
        let access_type = c.read_u32()?;
        let starting_location = c.read_u32()?;
        let length = c.read_u32()?;
        Ok(PartitionDescriptor {
            tag,
            sequence_number,
            flags,
            partition_number,
            contents,
            access_type,
            starting_location,
            length,
        })
    }
}

/// Single-partition short-form map entry. Any other map type makes the
/// volume unreadable here.
#[derive(Debug, Copy, Clone)]
pub struct PartitionMap {
    pub volume_sequence_number: u16,
    pub partition_number: u16,
}

impl PartitionMap {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let map_type = c.read_u8()?;
        if map_type != 1 {
            return Err(UdfError::UnsupportedPartitionMap(map_type));
        }
        c.skip(1)?; // map length, fixed at 6 for type 1
        Ok(PartitionMap {
            volume_sequence_number: c.read_u16()?,
            partition_number: c.read_u16()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LogicalVolumeDescriptor {
    pub tag: DescriptorTag,
    pub sequence_number: u32,
    /// Gives the root `FileInfo` its name.
    pub volume_identifier: String,
    pub block_size: u32,
    pub domain_identifier: EntityId,
    pub file_set_extent: ExtentLong,
    pub partition_maps: Vec<PartitionMap>,
}

impl LogicalVolumeDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::LogicalVolume)?;
        let sequence_number = c.read_u32()?;
        c.skip(64)?; // descriptor character set
        let volume_identifier = c.read_dstring(128)?;
        let block_size = c.read_u32()?;
        let domain_identifier = EntityId::read(c)?;
        let file_set_extent = ExtentLong::read(c)?;
        c.skip(4)?; // map table length
        let map_count = c.read_u32()?;
        c.skip(32)?; // implementation identifier
        c.skip(128)?; // implementation use
        c.skip(8)?; // integrity sequence extent
        let mut partition_maps = Vec::with_capacity(map_count as usize);
        for _ in 0..map_count {
            partition_maps.push(PartitionMap::read(c)?);
        }
        Ok(LogicalVolumeDescriptor {
            tag,
            sequence_number,
            volume_identifier,
            block_size,
            domain_identifier,
            file_set_extent,
            partition_maps,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UnallocatedSpaceDescriptor {
    pub tag: DescriptorTag,
    pub sequence_number: u32,
    pub allocation_descriptors: Vec<Extent>,
}

impl UnallocatedSpaceDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::UnallocatedSpace)?;
        let sequence_number = c.read_u32()?;
        let count = c.read_u32()?;
        let mut allocation_descriptors = Vec::with_capacity(count as usize);
        for _ in 0..count {
            allocation_descriptors.push(Extent::read(c)?);
        }
        Ok(UnallocatedSpaceDescriptor {
            tag,
            sequence_number,
            allocation_descriptors,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TerminatingDescriptor {
    pub tag: DescriptorTag,
}

impl TerminatingDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::Terminating)?;
        Ok(TerminatingDescriptor { tag })
    }
}

#[derive(Debug, Clone)]
pub struct LogicalVolumeIntegrityDescriptor {
    pub tag: DescriptorTag,
    pub recording_time: time::OffsetDateTime,
    pub integrity_type: u32,
}

impl LogicalVolumeIntegrityDescriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let tag = DescriptorTag::read(c)?;
        tag.expect(TagIdentifier::LogicalVolumeIntegrity)?;
        Ok(LogicalVolumeIntegrityDescriptor {
            tag,
            recording_time: c.read_timestamp()?,
            integrity_type: c.read_u32()?,
        })
    }
}
