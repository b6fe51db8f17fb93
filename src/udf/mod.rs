use crate::{Cursor, Result, UdfError};

/// First sector of the CD-ROM volume structure descriptor sequence.
pub const VOLUME_STRUCTURE_SECTOR: u64 = 16;
/// Fixed sector of the anchor volume descriptor pointer.
pub const ANCHOR_SECTOR: u64 = 256;

pub mod tag;
pub use tag::*;

pub mod volume;
pub use volume::*;

pub mod file;
pub use file::*;

pub mod image;
pub use image::*;

/// Closed set of structured descriptor variants. The variant is selected by
/// peeking the tag identifier; the chosen variant's own decode routine then
/// consumes the tag again as part of its layout.
#[derive(Debug, Clone)]
pub enum Descriptor {
    PrimaryVolume(PrimaryVolumeDescriptor),
    AnchorVolumePointer(AnchorVolumeDescriptorPointer),
    VolumePointer(VolumeDescriptorPointer),
    ImplementationUseVolume(ImplementationUseVolumeDescriptor),
    Partition(PartitionDescriptor),
    LogicalVolume(LogicalVolumeDescriptor),
    UnallocatedSpace(UnallocatedSpaceDescriptor),
    Terminating(TerminatingDescriptor),
    LogicalVolumeIntegrity(LogicalVolumeIntegrityDescriptor),
    FileSet(FileSetDescriptor),
    FileIdentifier(FileIdentifierDescriptor),
    FileEntry(FileEntryDescriptor),
}

impl Descriptor {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let raw = c.peek_u16()?;
        let identifier: TagIdentifier = match num_traits::FromPrimitive::from_u16(raw) {
            Some(identifier) => identifier,
            None => return Err(UdfError::UnexpectedTagIdentifier(raw)),
        };

        Ok(match identifier {
            TagIdentifier::PrimaryVolume => {
                Descriptor::PrimaryVolume(PrimaryVolumeDescriptor::read(c)?)
            }
            TagIdentifier::AnchorVolumePointer => {
                Descriptor::AnchorVolumePointer(AnchorVolumeDescriptorPointer::read(c)?)
            }
            TagIdentifier::VolumePointer => {
                Descriptor::VolumePointer(VolumeDescriptorPointer::read(c)?)
            }
            TagIdentifier::ImplementationUseVolume => {
                Descriptor::ImplementationUseVolume(ImplementationUseVolumeDescriptor::read(c)?)
            }
            TagIdentifier::Partition => Descriptor::Partition(PartitionDescriptor::read(c)?),
            TagIdentifier::LogicalVolume => {
                Descriptor::LogicalVolume(LogicalVolumeDescriptor::read(c)?)
            }
            TagIdentifier::UnallocatedSpace => {
                Descriptor::UnallocatedSpace(UnallocatedSpaceDescriptor::read(c)?)
            }
            TagIdentifier::Terminating => {
                Descriptor::Terminating(TerminatingDescriptor::read(c)?)
            }
            TagIdentifier::LogicalVolumeIntegrity => {
                Descriptor::LogicalVolumeIntegrity(LogicalVolumeIntegrityDescriptor::read(c)?)
            }
            TagIdentifier::FileSet => Descriptor::FileSet(FileSetDescriptor::read(c)?),
            TagIdentifier::FileIdentifier => {
                Descriptor::FileIdentifier(FileIdentifierDescriptor::read(c)?)
            }
            TagIdentifier::FileEntry => Descriptor::FileEntry(FileEntryDescriptor::read(c)?),
        })
    }

    pub fn tag(&self) -> &DescriptorTag {
        match self {
            Descriptor::PrimaryVolume(d) => &d.tag,
            Descriptor::AnchorVolumePointer(d) => &d.tag,
            Descriptor::VolumePointer(d) => &d.tag,
            Descriptor::ImplementationUseVolume(d) => &d.tag,
            Descriptor::Partition(d) => &d.tag,
            Descriptor::LogicalVolume(d) => &d.tag,
            Descriptor::UnallocatedSpace(d) => &d.tag,
            Descriptor::Terminating(d) => &d.tag,
            Descriptor::LogicalVolumeIntegrity(d) => &d.tag,
            Descriptor::FileSet(d) => &d.tag,
            Descriptor::FileIdentifier(d) => &d.tag,
            Descriptor::FileEntry(d) => &d.tag,
        }
    }
}
