//! Byte-signature search over flat image buffers
//!
//! All searches are byte-exact over the whole buffer, with no wildcards.

/// Find the first occurrence of `pattern` in `data`
pub fn find_first(data: &[u8], pattern: &[u8]) -> Option<usize> {
    find_from(data, pattern, 0)
}

/// Find the last occurrence of `pattern` in `data`
pub fn find_last(data: &[u8], pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || data.len() < pattern.len() {
        return None;
    }
    data.windows(pattern.len()).rposition(|w| w == pattern)
}

/// Find the first occurrence of `pattern` starting at or after `start`
pub fn find_from(data: &[u8], pattern: &[u8], start: usize) -> Option<usize> {
    if pattern.is_empty() || start >= data.len() || data.len() - start < pattern.len() {
        return None;
    }
    data[start..]
        .windows(pattern.len())
        .position(|w| w == pattern)
        .map(|pos| start + pos)
}

/// Iterate over every occurrence of `pattern`, overlapping ones included
pub fn find_all<'a>(data: &'a [u8], pattern: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    let mut next = 0;
    core::iter::from_fn(move || {
        let pos = find_from(data, pattern, next)?;
        next = pos + 1;
        Some(pos)
    })
}

/// Borrow `len` bytes at `offset`, or `None` when the range leaves `data`
pub fn slice_at(data: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    data.get(offset..offset.checked_add(len)?)
}
