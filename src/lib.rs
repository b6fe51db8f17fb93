//! Read-only access to UDF (ECMA-167) filesystem images, plus a small
//! keyed collect-and-run barrier for coordinating parallel contributors.
#[macro_use]
extern crate num_derive;

mod error;
pub use error::UdfError;
pub type Result<T> = std::result::Result<T, UdfError>;

mod traits;
pub use traits::*;

mod util;
pub use util::*;

pub mod udf;

pub mod barrier;

pub mod sizes {
    pub const SECTOR: u32 = 2048;
    pub const SECTOR_U64: u64 = SECTOR as u64;
    pub const SECTOR_SHIFT: u32 = 11;
    pub const KIB: u64 = 1024;
    pub const MIB: u64 = 1024 * KIB;
}

/* Layout of a UDF image:
 *
 * +--------------------------------------------------+
 * | Sectors 0..16: system area (unused by UDF)       |
 * +--------------------------------------------------+
 * | Sector 16: volume structure descriptors          |
 * |   - one per sector: BEA01, NSR02/NSR03, ...      |
 * |   - closed by a TEA01 terminator                 |
 * +--------------------------------------------------+
 * | Sector 256: anchor volume descriptor pointer     |
 * |   - extent of the main descriptor sequence       |
 * +--------------------------------------------------+
 * | Main volume descriptor sequence                  |
 * |   - primary volume / partition / logical volume  |
 * |     descriptors, one per sector, closed by a     |
 * |     terminating descriptor                       |
 * +--------------------------------------------------+
 * | Partition space                                  |
 * |   - file set descriptor at the partition start   |
 * |   - file entries, directory data, file data      |
 * |     addressed by partition-relative sectors      |
 * +--------------------------------------------------+
 */
