use crate::{Cursor, Result, UdfError};

/// Standard tag identifier codes, one per structured descriptor variant.
#[derive(Debug, Copy, Clone, FromPrimitive, ToPrimitive, Eq, PartialEq)]
pub enum TagIdentifier {
    PrimaryVolume = 1,
    AnchorVolumePointer = 2,
    VolumePointer = 3,
    ImplementationUseVolume = 4,
    Partition = 5,
    LogicalVolume = 6,
    UnallocatedSpace = 7,
    Terminating = 8,
    LogicalVolumeIntegrity = 9,
    FileSet = 256,
    FileIdentifier = 257,
    FileEntry = 261,
}

/// 16-byte header carried by every structured descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorTag {
    pub identifier: TagIdentifier,
    pub version: u16,
    pub serial_number: u16,
    pub crc: u16,
    pub crc_length: u16,
    /// Sector the descriptor claims to have been recorded at.
    pub location: u32,
}

impl DescriptorTag {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let bytes = c.read_bytes(16)?;

        // One-byte checksum over the other fifteen tag bytes.
        let sum = bytes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 4)
            .fold(0_u8, |acc, (_, b)| acc.wrapping_add(*b));

        let mut c = Cursor::new(bytes);
        let raw_identifier = c.read_u16()?;
        let identifier: TagIdentifier = match num_traits::FromPrimitive::from_u16(raw_identifier) {
            Some(identifier) => identifier,
            None => return Err(UdfError::UnexpectedTagIdentifier(raw_identifier)),
        };
        let version = c.read_u16()?;
        let checksum = c.read_u8()?;
        c.skip(1)?; // reserved
        let serial_number = c.read_u16()?;
        let crc = c.read_u16()?;
        let crc_length = c.read_u16()?;
        let location = c.read_u32()?;

        if checksum != sum {
            return Err(UdfError::TagChecksum(location));
        }

        Ok(DescriptorTag {
            identifier,
            version,
            serial_number,
            crc,
            crc_length,
            location,
        })
    }

    /// Fails unless the tag carries the identifier the call site requires.
    pub fn expect(&self, identifier: TagIdentifier) -> Result<()> {
        if self.identifier != identifier {
            return Err(UdfError::TagMismatch {
                expected: identifier as u16,
                actual: self.identifier as u16,
            });
        }
        Ok(())
    }
}
