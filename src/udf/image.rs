use std::io;

use log::debug;

use super::*;
use crate::{sizes, Cursor, ReadAt, Result, UdfError};

/// Pulls the single required descriptor of one variant out of the main
/// sequence; none or more than one is a hard failure.
macro_rules! extract_one {
    ($descriptors:expr, $variant:ident, $what:expr) => {{
        let mut found = $descriptors.iter().filter_map(|d| match d {
            Descriptor::$variant(inner) => Some(inner),
            _ => None,
        });
        let first = found.next().ok_or(UdfError::DescriptorNotFound($what))?;
        if found.next().is_some() {
            return Err(UdfError::DuplicateDescriptor($what));
        }
        first.clone()
    }};
}

/// Read-only view over a UDF-formatted disk image. Navigation starts at
/// [`UdfImage::root_dir`]; the reader performs no caching beyond the
/// descriptors resolved at open time and holds no locks, so share one
/// instance across threads only with external synchronization.
pub struct UdfImage<R: ReadAt> {
    source: R,
    primary: PrimaryVolumeDescriptor,
    partition: PartitionDescriptor,
    logical: LogicalVolumeDescriptor,
    file_set: FileSetDescriptor,
    descriptors: Vec<Descriptor>,
}

fn read_sector_from<R: ReadAt>(source: &R, sector: u64) -> Result<Vec<u8>> {
    let mut buf = vec![0_u8; sizes::SECTOR as usize];
    source.read_exact_at(sector * sizes::SECTOR_U64, &mut buf)?;
    Ok(buf)
}

impl<R: ReadAt> UdfImage<R> {
    pub fn open(source: R) -> Result<Self> {
        // CD-ROM volume structure sweep: the image must announce an NSR
        // structure before the terminator for UDF parsing to proceed.
        let mut sector = VOLUME_STRUCTURE_SECTOR;
        let mut nsr_found = false;
        loop {
            let buf = read_sector_from(&source, sector)?;
            match VolumeStructureDescriptor::read(&mut Cursor::new(&buf))? {
                VolumeStructureDescriptor::Nsr => nsr_found = true,
                VolumeStructureDescriptor::Terminal => break,
                _ => {}
            }
            sector += 1;
        }
        if !nsr_found {
            return Err(UdfError::NotUdf);
        }

        let buf = read_sector_from(&source, ANCHOR_SECTOR)?;
        let anchor = AnchorVolumeDescriptorPointer::read(&mut Cursor::new(&buf))?;
        debug!(
            "main descriptor sequence at sector {}, {} bytes",
            anchor.main_sequence.location, anchor.main_sequence.length
        );

        // One descriptor per sector until the terminating descriptor; the
        // anchor extent bounds the walk.
        let first = u64::from(anchor.main_sequence.location);
        let end = first + u64::from(anchor.main_sequence.length) / sizes::SECTOR_U64;
        let mut descriptors = Vec::new();
        let mut terminated = false;
        let mut sector = first;
        while sector < end {
            let buf = read_sector_from(&source, sector)?;
            let descriptor = Descriptor::read(&mut Cursor::new(&buf))?;
            sector += 1;
            let terminal = matches!(descriptor, Descriptor::Terminating(_));
            descriptors.push(descriptor);
            if terminal {
                terminated = true;
                break;
            }
        }
        if !terminated {
            return Err(UdfError::UnterminatedSequence);
        }

        let primary = extract_one!(descriptors, PrimaryVolume, "primary volume");
        let partition = extract_one!(descriptors, Partition, "partition");
        let logical = extract_one!(descriptors, LogicalVolume, "logical volume");
        debug!(
            "volume '{}', partition {} at sector {}",
            logical.volume_identifier, partition.partition_number, partition.starting_location
        );

        let buf = read_sector_from(&source, u64::from(partition.starting_location))?;
        let file_set = FileSetDescriptor::read(&mut Cursor::new(&buf))?;

        Ok(UdfImage {
            source,
            primary,
            partition,
            logical,
            file_set,
            descriptors,
        })
    }

    /// Resolves a partition-relative sector to an absolute one.
    fn absolute_sector(&self, location: u64) -> u64 {
        u64::from(self.partition.starting_location) + location
    }

    fn read_sector(&self, sector: u64) -> Result<Vec<u8>> {
        read_sector_from(&self.source, sector)
    }

    fn read_exact(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0_u8; length];
        self.source.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }

    fn file_entry_at(&self, sector: u64) -> Result<FileEntryDescriptor> {
        let buf = self.read_sector(sector)?;
        FileEntryDescriptor::read(&mut Cursor::new(&buf))
    }

    /// The root directory, named after the logical volume.
    pub fn root_dir(&self) -> Result<FileInfo> {
        let entry =
            self.file_entry_at(self.absolute_sector(self.file_set.root_directory_icb.location))?;
        Ok(FileInfo::new(
            entry,
            None,
            self.logical.volume_identifier.clone(),
            String::new(),
        ))
    }

    /// Children of `dir` in on-disk order. Reserved directory slots (empty
    /// identifiers) are skipped.
    pub fn read_dir(&self, dir: &FileInfo) -> Result<Vec<FileInfo>> {
        if !dir.is_dir() {
            return Err(UdfError::NotADirectory(dir.path().to_string()));
        }

        let mut children = Vec::new();
        for extent in &dir.entry().allocation_descriptors {
            if extent.length == 0 {
                continue;
            }
            let offset = self.absolute_sector(u64::from(extent.location)) * sizes::SECTOR_U64;
            let buf = self.read_exact(offset, extent.length as usize)?;
            let mut c = Cursor::new(&buf);
            while c.remaining() > 0 {
                let fid = FileIdentifierDescriptor::read(&mut c)?;
                if fid.identifier.is_empty() {
                    continue;
                }
                let entry = self.file_entry_at(self.absolute_sector(fid.icb.location))?;
                let name = fid.identifier.clone();
                let path = if dir.is_root() {
                    name.clone()
                } else {
                    format!("{}/{}", dir.path(), name)
                };
                children.push(FileInfo::new(entry, Some(fid), name, path));
            }
        }
        Ok(children)
    }

    /// A stream over the file's content, concatenating its extents in
    /// on-disk order.
    pub fn file_reader<'a>(&'a self, file: &FileInfo) -> Result<FileReader<'a, R>> {
        if file.is_dir() {
            return Err(UdfError::IsADirectory(file.path().to_string()));
        }
        let segments = file
            .entry()
            .allocation_descriptors
            .iter()
            .filter(|extent| extent.length > 0)
            .map(|extent| Segment {
                offset: self.absolute_sector(u64::from(extent.location)) * sizes::SECTOR_U64,
                length: u64::from(extent.length),
            })
            .collect();
        Ok(FileReader {
            source: &self.source,
            segments,
            index: 0,
            consumed: 0,
        })
    }

    pub fn volume_identifier(&self) -> &str {
        &self.logical.volume_identifier
    }

    pub fn block_size(&self) -> u32 {
        self.logical.block_size
    }

    /// The main volume descriptor sequence in on-disk order, terminator
    /// included.
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn primary_volume(&self) -> &PrimaryVolumeDescriptor {
        &self.primary
    }

    pub fn partition(&self) -> &PartitionDescriptor {
        &self.partition
    }

    pub fn logical_volume(&self) -> &LogicalVolumeDescriptor {
        &self.logical
    }

    pub fn file_set(&self) -> &FileSetDescriptor {
        &self.file_set
    }
}

struct Segment {
    offset: u64,
    length: u64,
}

/// Reads a file's content as one stream assembled from its extents. Each
/// extent contributes its exact byte length, so the final sector of an
/// extent is not padded out.
pub struct FileReader<'a, R: ReadAt> {
    source: &'a R,
    segments: Vec<Segment>,
    index: usize,
    consumed: u64,
}

impl<R: ReadAt> FileReader<'_, R> {
    /// Total content length in bytes.
    pub fn len(&self) -> u64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: ReadAt> io::Read for FileReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while let Some(segment) = self.segments.get(self.index) {
            if self.consumed == segment.length {
                self.index += 1;
                self.consumed = 0;
                continue;
            }
            let want = buf.len().min((segment.length - self.consumed) as usize);
            let read = self
                .source
                .read_at(segment.offset + self.consumed, &mut buf[..want])
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            if read == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    UdfError::UnexpectedEod,
                ));
            }
            self.consumed += read as u64;
            return Ok(read);
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::udf::file::tests::fid_bytes;
    use crate::udf::tag::tests::tag_bytes;

    const SECTOR: usize = sizes::SECTOR as usize;

    // Synthetic image geometry, all partition-relative sectors counted from
    // the partition start at sector 261:
    //   261 file set descriptor          (fsd at partition start)
    //   262 root file entry              (location 1)
    //   263 root directory data          (location 2)
    //   264 a.txt file entry             (location 3)
    //   265 subdir file entry            (location 4)
    //   266 a.txt data                   (location 5)
    //   267 subdir directory data       (location 6)
    //   268 nested.txt file entry        (location 7)
    //   269 nested.txt data, 1st extent  (location 8)
    //   271 nested.txt data, 2nd extent  (location 10)
    const PARTITION_START: u32 = 261;

    struct ImageBuilder {
        data: Vec<u8>,
    }

    impl ImageBuilder {
        fn new(sectors: usize) -> Self {
            ImageBuilder {
                data: vec![0_u8; sectors * SECTOR],
            }
        }

        fn put(&mut self, sector: u64, bytes: &[u8]) {
            let start = sector as usize * SECTOR;
            self.data[start..start + bytes.len()].copy_from_slice(bytes);
        }
    }

    fn vsd(identifier: &[u8; 5]) -> Vec<u8> {
        let mut buf = vec![0_u8; 7];
        buf[1..6].copy_from_slice(identifier);
        buf[6] = 1;
        buf
    }

    fn dstring(s: &str, len: usize) -> Vec<u8> {
        let mut buf = vec![0_u8; len];
        buf[0] = 8;
        buf[1..1 + s.len()].copy_from_slice(s.as_bytes());
        buf[len - 1] = (s.len() + 1) as u8;
        buf
    }

    fn timestamp() -> Vec<u8> {
        let mut buf = vec![0_u8; 12];
        buf[2..4].copy_from_slice(&2023_u16.to_le_bytes());
        buf[4..9].copy_from_slice(&[6, 15, 12, 30, 45]);
        buf
    }

    fn long_ad(length: u32, location: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&length.to_le_bytes());
        buf.extend_from_slice(&(location as u64).to_le_bytes()[..6]);
        buf.extend_from_slice(&[0; 6]);
        buf
    }

    fn anchor(main_location: u32, main_length: u32) -> Vec<u8> {
        let mut buf = tag_bytes(TagIdentifier::AnchorVolumePointer as u16, 256).to_vec();
        buf.extend_from_slice(&main_length.to_le_bytes());
        buf.extend_from_slice(&main_location.to_le_bytes());
        buf
    }

    fn primary_volume(sector: u32) -> Vec<u8> {
        let mut buf = tag_bytes(TagIdentifier::PrimaryVolume as u16, sector).to_vec();
        buf.extend_from_slice(&1_u32.to_le_bytes());
        buf.extend_from_slice(&1_u32.to_le_bytes());
        buf.extend_from_slice(&dstring("TESTVOL", 32));
        buf.extend_from_slice(&1_u16.to_le_bytes());
        buf.extend_from_slice(&1_u16.to_le_bytes());
        buf.extend_from_slice(&2_u16.to_le_bytes());
        buf.extend_from_slice(&2_u16.to_le_bytes());
        buf.extend_from_slice(&[0; 8]); // character set lists
        buf.extend_from_slice(&dstring("TESTSET", 128));
        buf.extend_from_slice(&[0; 176]); // charsets, extents, application id
        buf.extend_from_slice(&timestamp());
        buf
    }

    fn partition(sector: u32, starting_location: u32, length: u32) -> Vec<u8> {
        let mut buf = tag_bytes(TagIdentifier::Partition as u16, sector).to_vec();
        buf.extend_from_slice(&1_u32.to_le_bytes());
        buf.extend_from_slice(&1_u16.to_le_bytes()); // flags: allocated
        buf.extend_from_slice(&0_u16.to_le_bytes()); // partition number
        buf.extend_from_slice(&[0; 160]); // contents id + contents use
        buf.extend_from_slice(&1_u32.to_le_bytes()); // access type
        buf.extend_from_slice(&starting_location.to_le_bytes());
        buf.extend_from_slice(&length.to_le_bytes());
        buf
    }

    fn logical_volume(sector: u32, name: &str) -> Vec<u8> {
        let mut buf = tag_bytes(TagIdentifier::LogicalVolume as u16, sector).to_vec();
        buf.extend_from_slice(&1_u32.to_le_bytes());
        buf.extend_from_slice(&[0; 64]); // descriptor character set
        buf.extend_from_slice(&dstring(name, 128));
        buf.extend_from_slice(&2048_u32.to_le_bytes()); // block size
        buf.extend_from_slice(&[0; 32]); // domain identifier
        buf.extend_from_slice(&long_ad(2048, 0)); // file set extent
        buf.extend_from_slice(&6_u32.to_le_bytes()); // map table length
        buf.extend_from_slice(&1_u32.to_le_bytes()); // map count
        buf.extend_from_slice(&[0; 168]); // impl id, impl use, integrity extent
        buf.extend_from_slice(&[1, 6]); // type 1 map, 6 bytes
        buf.extend_from_slice(&1_u16.to_le_bytes());
        buf.extend_from_slice(&0_u16.to_le_bytes());
        buf
    }

    fn terminating(sector: u32) -> Vec<u8> {
        tag_bytes(TagIdentifier::Terminating as u16, sector).to_vec()
    }

    fn file_set(sector: u32, root_location: u32) -> Vec<u8> {
        let mut buf = tag_bytes(TagIdentifier::FileSet as u16, sector).to_vec();
        buf.extend_from_slice(&timestamp());
        buf.extend_from_slice(&3_u16.to_le_bytes());
        buf.extend_from_slice(&3_u16.to_le_bytes());
        buf.extend_from_slice(&[0; 8]); // character set lists
        buf.extend_from_slice(&0_u32.to_le_bytes()); // file set number
        buf.extend_from_slice(&0_u32.to_le_bytes()); // descriptor number
        buf.extend_from_slice(&[0; 64]); // lv identifier charset
        buf.extend_from_slice(&dstring("UDFVOL", 128));
        buf.extend_from_slice(&[0; 64]); // file set charset
        buf.extend_from_slice(&dstring("FILESET", 32));
        buf.extend_from_slice(&[0; 64]); // copyright + abstract identifiers
        buf.extend_from_slice(&long_ad(2048, root_location));
        buf
    }

    fn file_entry(
        sector: u32,
        file_type: u8,
        permissions: u32,
        information_length: u64,
        extents: &[(u32, u32)],
    ) -> Vec<u8> {
        let mut buf = tag_bytes(TagIdentifier::FileEntry as u16, sector).to_vec();
        // icb tag
        buf.extend_from_slice(&0_u32.to_le_bytes());
        buf.extend_from_slice(&4_u16.to_le_bytes()); // strategy
        buf.extend_from_slice(&[0; 2]);
        buf.extend_from_slice(&1_u16.to_le_bytes()); // max entries
        buf.push(0);
        buf.push(file_type);
        buf.extend_from_slice(&[0; 6]);
        buf.extend_from_slice(&0_u16.to_le_bytes()); // flags: short descriptors
        // entry body
        buf.extend_from_slice(&1000_u32.to_le_bytes()); // uid
        buf.extend_from_slice(&100_u32.to_le_bytes()); // gid
        buf.extend_from_slice(&permissions.to_le_bytes());
        buf.extend_from_slice(&1_u16.to_le_bytes()); // link count
        buf.extend_from_slice(&[0; 6]); // record fields
        buf.extend_from_slice(&information_length.to_le_bytes());
        buf.extend_from_slice(&1_u64.to_le_bytes()); // blocks recorded
        buf.extend_from_slice(&timestamp());
        buf.extend_from_slice(&timestamp());
        buf.extend_from_slice(&timestamp());
        buf.extend_from_slice(&[0; 52]); // checkpoint, ext attr icb, impl id
        buf.extend_from_slice(&7_u64.to_le_bytes()); // unique id
        buf.extend_from_slice(&0_u32.to_le_bytes()); // ext attr length
        buf.extend_from_slice(&(extents.len() as u32 * 8).to_le_bytes());
        for (length, location) in extents {
            buf.extend_from_slice(&length.to_le_bytes());
            buf.extend_from_slice(&location.to_le_bytes());
        }
        buf
    }

    /// UDF permission bits for rw-r--r--.
    const PERM_644: u32 = 6 << 10 | 4 << 5 | 4;
    /// UDF permission bits for rwxr-xr-x.
    const PERM_755: u32 = 7 << 10 | 5 << 5 | 5;

    fn build_image() -> Vec<u8> {
        let mut image = ImageBuilder::new(272);

        image.put(16, &vsd(b"BEA01"));
        image.put(17, &vsd(b"NSR02"));
        image.put(18, &vsd(b"TEA01"));

        image.put(256, &anchor(257, 8 * SECTOR as u32));
        image.put(257, &primary_volume(257));
        image.put(258, &partition(258, PARTITION_START, 11));
        image.put(259, &logical_volume(259, "UDFVOL"));
        image.put(260, &terminating(260));

        image.put(261, &file_set(261, 1));
        image.put(262, &file_entry(262, FILE_TYPE_DIRECTORY, PERM_755, 132, &[(132, 2)]));

        let mut root_dir = fid_bytes("a.txt", 0, 3);
        root_dir.extend_from_slice(&fid_bytes("", CHAR_PARENT | CHAR_DIRECTORY, 1));
        root_dir.extend_from_slice(&fid_bytes("subdir", CHAR_DIRECTORY, 4));
        assert_eq!(132, root_dir.len());
        image.put(263, &root_dir);

        image.put(264, &file_entry(264, FILE_TYPE_REGULAR, PERM_644, 11, &[(11, 5)]));
        image.put(265, &file_entry(265, FILE_TYPE_DIRECTORY, PERM_755, 52, &[(52, 6)]));
        image.put(266, b"hello world");

        let subdir = fid_bytes("nested.txt", 0, 7);
        assert_eq!(52, subdir.len());
        image.put(267, &subdir);

        image.put(
            268,
            &file_entry(268, FILE_TYPE_REGULAR, PERM_644, 10, &[(4, 8), (6, 10)]),
        );
        image.put(269, b"ABCD");
        image.put(271, b"EFGHIJ");

        image.data
    }

    #[test]
    fn open_resolves_the_volume() {
        let image = UdfImage::open(build_image()).unwrap();

        assert_eq!("UDFVOL", image.volume_identifier());
        assert_eq!(2048, image.block_size());
        assert_eq!(PARTITION_START, image.partition().starting_location);
        assert_eq!("TESTVOL", image.primary_volume().volume_identifier);
        assert_eq!(1, image.file_set().root_directory_icb.location);
        // pvd, partition, lvd, terminating
        assert_eq!(4, image.descriptors().len());
    }

    #[test]
    fn partition_relative_translation() {
        let image = UdfImage::open(build_image()).unwrap();
        assert_eq!(266, image.absolute_sector(5));
        assert_eq!(u64::from(PARTITION_START), image.absolute_sector(0));
    }

    #[test]
    fn root_dir_is_named_after_the_logical_volume() {
        let image = UdfImage::open(build_image()).unwrap();
        let root = image.root_dir().unwrap();

        assert!(root.is_root());
        assert!(root.is_dir());
        assert_eq!("UDFVOL", root.name());
        assert_eq!("", root.path());
        assert_eq!(0o755 | MODE_DIRECTORY, root.mode());
    }

    #[test]
    fn read_dir_skips_reserved_slots() {
        let image = UdfImage::open(build_image()).unwrap();
        let root = image.root_dir().unwrap();
        let children = image.read_dir(&root).unwrap();

        // Three identifiers on disk, one of them the empty parent slot.
        assert_eq!(2, children.len());
        assert_eq!("a.txt", children[0].name());
        assert_eq!("a.txt", children[0].path());
        assert_eq!("subdir", children[1].name());
        assert!(children[1].is_dir());
        assert!(!children[0].is_root());
    }

    #[test]
    fn nested_paths_join_with_the_parent() {
        let image = UdfImage::open(build_image()).unwrap();
        let root = image.root_dir().unwrap();
        let children = image.read_dir(&root).unwrap();
        let nested = image.read_dir(&children[1]).unwrap();

        assert_eq!(1, nested.len());
        assert_eq!("nested.txt", nested[0].name());
        assert_eq!("subdir/nested.txt", nested[0].path());
    }

    #[test]
    fn file_metadata() {
        let image = UdfImage::open(build_image()).unwrap();
        let root = image.root_dir().unwrap();
        let children = image.read_dir(&root).unwrap();
        let file = &children[0];

        assert_eq!(11, file.size());
        assert_eq!(0o644, file.mode());
        assert_eq!(1000, file.uid());
        assert_eq!(100, file.gid());
        assert_eq!(2023, file.mod_time().year());
        assert!(!file.is_hidden());
    }

    #[test]
    fn single_extent_contents() {
        let image = UdfImage::open(build_image()).unwrap();
        let root = image.root_dir().unwrap();
        let children = image.read_dir(&root).unwrap();

        let mut reader = image.file_reader(&children[0]).unwrap();
        assert_eq!(11, reader.len());
        let mut contents = String::new();
        reader.read_to_string(&mut contents).unwrap();
        assert_eq!("hello world", contents);
    }

    #[test]
    fn multi_extent_contents_concatenate_in_order() {
        let image = UdfImage::open(build_image()).unwrap();
        let root = image.root_dir().unwrap();
        let children = image.read_dir(&root).unwrap();
        let nested = image.read_dir(&children[1]).unwrap();

        let mut reader = image.file_reader(&nested[0]).unwrap();
        assert_eq!(10, reader.len());
        let mut contents = String::new();
        reader.read_to_string(&mut contents).unwrap();
        assert_eq!("ABCDEFGHIJ", contents);
    }

    #[test]
    fn usage_errors_name_the_offender() {
        let image = UdfImage::open(build_image()).unwrap();
        let root = image.root_dir().unwrap();
        let children = image.read_dir(&root).unwrap();

        assert!(matches!(
            image.read_dir(&children[0]),
            Err(UdfError::NotADirectory(path)) if path == "a.txt"
        ));
        assert!(matches!(
            image.file_reader(&root),
            Err(UdfError::IsADirectory(path)) if path.is_empty()
        ));
    }

    #[test]
    fn image_without_nsr_is_rejected() {
        let mut image = ImageBuilder::new(32);
        image.put(16, &vsd(b"BEA01"));
        image.put(17, &vsd(b"BOOT2"));
        image.put(18, &vsd(b"TEA01"));

        assert!(matches!(
            UdfImage::open(image.data),
            Err(UdfError::NotUdf)
        ));
    }

    #[test]
    fn missing_partition_descriptor() {
        let mut image = ImageBuilder::new(272);
        image.put(16, &vsd(b"NSR03"));
        image.put(17, &vsd(b"TEA01"));
        image.put(256, &anchor(257, 8 * SECTOR as u32));
        image.put(257, &primary_volume(257));
        image.put(258, &logical_volume(258, "UDFVOL"));
        image.put(259, &terminating(259));

        assert!(matches!(
            UdfImage::open(image.data),
            Err(UdfError::DescriptorNotFound("partition"))
        ));
    }

    #[test]
    fn duplicate_primary_descriptor() {
        let mut image = ImageBuilder::new(272);
        image.put(16, &vsd(b"NSR03"));
        image.put(17, &vsd(b"TEA01"));
        image.put(256, &anchor(257, 8 * SECTOR as u32));
        image.put(257, &primary_volume(257));
        image.put(258, &primary_volume(258));
        image.put(259, &terminating(259));

        assert!(matches!(
            UdfImage::open(image.data),
            Err(UdfError::DuplicateDescriptor("primary volume"))
        ));
    }

    #[test]
    fn sequence_without_terminator() {
        let mut image = ImageBuilder::new(272);
        image.put(16, &vsd(b"NSR03"));
        image.put(17, &vsd(b"TEA01"));
        image.put(256, &anchor(257, 2 * SECTOR as u32));
        image.put(257, &primary_volume(257));
        image.put(258, &partition(258, PARTITION_START, 11));

        assert!(matches!(
            UdfImage::open(image.data),
            Err(UdfError::UnterminatedSequence)
        ));
    }

    #[test]
    fn truncated_image_is_an_explicit_error() {
        let image = build_image();
        assert!(matches!(
            UdfImage::open(&image[..20 * SECTOR]),
            Err(UdfError::UnexpectedEod)
        ));
    }
}
