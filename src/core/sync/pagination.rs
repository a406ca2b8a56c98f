//! Page windows over a counted collection

/// Documents fetched per page
pub const PAGE_SIZE: u64 = 1000;

/// Offsets of every page needed to cover `[0, total)`
///
/// The last window may be partial; no offset at or beyond `total` is produced.
pub fn page_offsets(total: u64, page_size: u64) -> impl Iterator<Item = u64> {
    let step = page_size.max(1);
    (0..total).step_by(step as usize)
}
