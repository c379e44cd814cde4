//! Page layout errors.

/// Page layout errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLayoutError {
    /// The page offsets violate `24 <= lower <= upper <= special <= pagesize`.
    ///
    /// Rendering such a page would produce a nonsensical diagram, so it is
    /// refused instead.
    Inconsistent {
        lower: u32,
        upper: u32,
        special: u32,
        pagesize: u32,
    },
    /// Fill factor outside the accepted `10..=100` percent.
    FillFactor(u8),
    /// A free-space entry claims more bytes than a page holds.
    ///
    /// A zero page size makes every entry invalid, including `avail == 0`.
    InvalidFreeSpace {
        /// Block number of the offending entry.
        blkno: u64,
        avail: u32,
        pagesize: u32,
    },
}

impl std::fmt::Display for PageLayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageLayoutError::Inconsistent {
                lower,
                upper,
                special,
                pagesize,
            } => write!(
                f,
                "inconsistent page offsets: lower={} upper={} special={} pagesize={}",
                lower, upper, special, pagesize
            ),
            PageLayoutError::FillFactor(ff) => {
                write!(f, "fillfactor {} is outside 10..=100", ff)
            }
            PageLayoutError::InvalidFreeSpace {
                blkno,
                avail,
                pagesize,
            } => write!(
                f,
                "block {} reports {} free bytes on a {}-byte page",
                blkno, avail, pagesize
            ),
        }
    }
}

impl std::error::Error for PageLayoutError {}
