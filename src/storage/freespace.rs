//! Free-space ratios per page and across a relation.
//!
//! The per-page figure is `100 * avail / pagesize` rounded to two decimals.
//! The relation-wide figure averages the raw `avail` values first and
//! converts once, so rounding error does not compound across pages.

use std::fmt;

use super::error::PageLayoutError;
use crate::table::TextTable;

/// Percentage of a page that is free, rounded to two decimals.
///
/// `pagesize` must be non-zero; debug builds panic on zero, release builds
/// return a non-finite value.
pub fn free_space_ratio(avail: u32, pagesize: u32) -> f64 {
    ratio(f64::from(avail), pagesize)
}

/// Free-space ratio of the mean `avail` across `avails`.
///
/// Returns `None` for an empty batch.
pub fn average_free_space_ratio(avails: &[u32], pagesize: u32) -> Option<f64> {
    mean(avails.iter().copied()).map(|avg| ratio(avg, pagesize))
}

fn ratio(avail: f64, pagesize: u32) -> f64 {
    debug_assert!(pagesize != 0, "free space ratio of a zero-sized page");
    round2(100.0 * avail / f64::from(pagesize))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(avails: impl ExactSizeIterator<Item = u32>) -> Option<f64> {
    let count = avails.len();
    if count == 0 {
        return None;
    }
    let total: u64 = avails.map(u64::from).sum();
    Some(total as f64 / count as f64)
}

/// Formats a byte count the way `pg_size_pretty` does.
pub fn size_pretty(bytes: u64) -> String {
    const LIMIT: u64 = 10 * 1024;
    const LIMIT2: u64 = LIMIT * 2 - 1;

    if bytes < LIMIT {
        return format!("{} bytes", bytes);
    }
    // Keep one extra bit for rounding
    let mut size = bytes >> 9;
    for unit in ["kB", "MB", "GB"] {
        if size < LIMIT2 {
            return format!("{} {}", size.div_ceil(2), unit);
        }
        size >>= 10;
    }
    format!("{} TB", size.div_ceil(2))
}

/// Free space of one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeSpaceEntry {
    pub blkno: u64,
    pub avail: u32,
    /// `100 * avail / pagesize`, two decimals.
    pub ratio: f64,
}

/// Relation-wide free-space averages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeSpaceSummary {
    pub pages: usize,
    /// Mean free bytes per page (unrounded).
    pub avg_avail: f64,
    /// Ratio of the mean, two decimals.
    pub avg_ratio: f64,
}

/// Free-space report over the blocks of one relation.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeSpaceReport {
    pagesize: u32,
    entries: Vec<FreeSpaceEntry>,
}

impl FreeSpaceReport {
    /// Builds a report from per-block free bytes, in block order.
    ///
    /// # Errors
    ///
    /// [`PageLayoutError::InvalidFreeSpace`] if an entry exceeds the page
    /// size, or if the page size is zero.
    pub fn new(
        pagesize: u32,
        avails: impl IntoIterator<Item = u32>,
    ) -> Result<Self, PageLayoutError> {
        let mut entries = Vec::new();
        for (blkno, avail) in (0u64..).zip(avails) {
            if pagesize == 0 || avail > pagesize {
                return Err(PageLayoutError::InvalidFreeSpace {
                    blkno,
                    avail,
                    pagesize,
                });
            }
            entries.push(FreeSpaceEntry {
                blkno,
                avail,
                ratio: free_space_ratio(avail, pagesize),
            });
        }

        tracing::debug!(pagesize, pages = entries.len(), "built free space report");
        Ok(Self { pagesize, entries })
    }

    pub fn pagesize(&self) -> u32 {
        self.pagesize
    }

    pub fn entries(&self) -> &[FreeSpaceEntry] {
        &self.entries
    }

    /// Averages across all blocks; `None` when the relation has no blocks.
    pub fn summary(&self) -> Option<FreeSpaceSummary> {
        let avg_avail = mean(self.entries.iter().map(|e| e.avail))?;
        Some(FreeSpaceSummary {
            pages: self.entries.len(),
            avg_avail,
            avg_ratio: ratio(avg_avail, self.pagesize),
        })
    }
}

impl fmt::Display for FreeSpaceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pages = TextTable::new(&["blkno", "avail", "freespace ratio (%)"])
            .align_right(0)
            .align_right(1)
            .align_right(2);
        for entry in &self.entries {
            pages.push_row(vec![
                entry.blkno.to_string(),
                entry.avail.to_string(),
                format!("{:.2}", entry.ratio),
            ]);
        }
        f.write_str(&pages.render())?;

        if let Some(summary) = self.summary() {
            let mut overall = TextTable::new(&[
                "pages",
                "Avg freespace size",
                "Avg freespace ratio (%)",
            ])
            .align_right(0)
            .align_right(2);
            overall.push_row(vec![
                summary.pages.to_string(),
                size_pretty(summary.avg_avail.round() as u64),
                format!("{:.2}", summary.avg_ratio),
            ]);
            writeln!(f)?;
            f.write_str(&overall.render())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_space_ratio() {
        assert_eq!(free_space_ratio(7432 - 64, 8192), 89.94);
        assert_eq!(free_space_ratio(0, 8192), 0.0);
        assert_eq!(free_space_ratio(8192, 8192), 100.0);
        assert_eq!(free_space_ratio(1, 3), 33.33);
        assert_eq!(free_space_ratio(2, 3), 66.67);
    }

    #[test]
    fn test_average_converts_once() {
        // Per-page ratios are 0.00 and 0.05; averaging those would give 0.03.
        // The mean avail is 2 bytes, which is 0.02%.
        assert_eq!(average_free_space_ratio(&[0, 4], 8192), Some(0.02));

        assert_eq!(average_free_space_ratio(&[1, 2], 8), Some(18.75));
        assert_eq!(average_free_space_ratio(&[1, 1, 1], 3), Some(33.33));
    }

    #[test]
    fn test_average_empty() {
        assert_eq!(average_free_space_ratio(&[], 8192), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "zero-sized page")]
    fn test_free_space_ratio_zero_pagesize() {
        free_space_ratio(0, 0);
    }

    #[test]
    fn test_summary_matches_batch_average() {
        let avails = [7368, 0, 4096, 12];
        let report = FreeSpaceReport::new(8192, avails).unwrap();
        assert_eq!(
            report.summary().map(|s| s.avg_ratio),
            average_free_space_ratio(&avails, 8192)
        );
    }

    #[test]
    fn test_size_pretty() {
        assert_eq!(size_pretty(0), "0 bytes");
        assert_eq!(size_pretty(10239), "10239 bytes");
        assert_eq!(size_pretty(10240), "10 kB");
        assert_eq!(size_pretty(20 * 1024 * 1024), "20 MB");
        assert_eq!(size_pretty(5 * 1024 * 1024 * 1024 * 1024 * 10), "50 TB");
    }

    #[test]
    fn test_report_entries_and_summary() {
        let report = FreeSpaceReport::new(8192, [7368, 0, 4096]).unwrap();
        assert_eq!(report.entries().len(), 3);
        assert_eq!(report.entries()[0].ratio, 89.94);
        assert_eq!(report.entries()[2].blkno, 2);
        assert_eq!(report.entries()[2].ratio, 50.0);

        let summary = report.summary().unwrap();
        assert_eq!(summary.pages, 3);
        assert!((summary.avg_avail - 3821.333).abs() < 0.001);
        assert_eq!(summary.avg_ratio, 46.65);
    }

    #[test]
    fn test_report_rejects_bad_entries() {
        assert_eq!(
            FreeSpaceReport::new(8192, [100, 9000]),
            Err(PageLayoutError::InvalidFreeSpace {
                blkno: 1,
                avail: 9000,
                pagesize: 8192,
            })
        );
        assert!(FreeSpaceReport::new(0, [0]).is_err());
        // Nothing to validate without blocks
        assert!(FreeSpaceReport::new(0, []).unwrap().summary().is_none());
    }

    #[test]
    fn test_report_render() {
        let report = FreeSpaceReport::new(8192, [7368, 0]).unwrap();
        let expected = "\
 blkno | avail | freespace ratio (%)
-------+-------+---------------------
     0 |  7368 |               89.94
     1 |     0 |                0.00

 pages | Avg freespace size | Avg freespace ratio (%)
-------+--------------------+-------------------------
     2 | 3684 bytes         |                   44.97
";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_report_render_empty() {
        let report = FreeSpaceReport::new(8192, []).unwrap();
        assert_eq!(report.to_string(), " blkno | avail | freespace ratio (%)\n-------+-------+---------------------\n");
    }
}
