//! Zero-allocation field parsing for tab-delimited records.

use memchr::memchr_iter;

/// Fast u64 parsing - no allocation, no error formatting.
///
/// Returns None if the input is empty, contains non-digit characters, or
/// overflows.
#[inline(always)]
pub fn parse_u64_fast(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(d as u64)?;
    }
    Some(n)
}

/// Same as [`parse_u64_fast`], narrowed to u32.
#[inline(always)]
pub fn parse_u32_fast(bytes: &[u8]) -> Option<u32> {
    parse_u64_fast(bytes).and_then(|n| u32::try_from(n).ok())
}

/// Strip a trailing `\n` or `\r\n`.
#[inline(always)]
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Split a line on tabs into at most `N` fields using memchr.
///
/// Returns the filled prefix of the array and the total number of fields
/// present in the line (which may exceed `N`).
#[inline]
pub fn split_tabs<const N: usize>(line: &[u8]) -> ([&[u8]; N], usize) {
    let mut fields: [&[u8]; N] = [&[]; N];
    let mut count = 0;
    let mut field_start = 0;

    for tab in memchr_iter(b'\t', line) {
        if count < N {
            fields[count] = &line[field_start..tab];
        }
        count += 1;
        field_start = tab + 1;
    }
    if count < N {
        fields[count] = &line[field_start..];
    }
    count += 1;

    (fields, count)
}

/// Blank lines carry no record.
#[inline(always)]
pub fn should_skip_line(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64_fast() {
        assert_eq!(parse_u64_fast(b"12345"), Some(12345));
        assert_eq!(parse_u64_fast(b"0"), Some(0));
        assert_eq!(parse_u64_fast(b""), None);
        assert_eq!(parse_u64_fast(b"abc"), None);
        assert_eq!(parse_u64_fast(b"-5"), None);
        assert_eq!(parse_u64_fast(b"18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_u64_fast(b"18446744073709551616"), None);
    }

    #[test]
    fn test_parse_u32_fast_rejects_wide_values() {
        assert_eq!(parse_u32_fast(b"7"), Some(7));
        assert_eq!(parse_u32_fast(b"4294967296"), None);
    }

    #[test]
    fn test_split_tabs_counts_all_fields() {
        let (fields, n) = split_tabs::<3>(b"a\tb\tc\td");
        assert_eq!(n, 4);
        assert_eq!(fields, [&b"a"[..], &b"b"[..], &b"c"[..]]);

        let (fields, n) = split_tabs::<4>(b"a\t\tc\t");
        assert_eq!(n, 4);
        assert_eq!(fields[1], b"");
        assert_eq!(fields[3], b"");
    }

    #[test]
    fn test_trim_line_end() {
        assert_eq!(trim_line_end(b"abc\n"), b"abc");
        assert_eq!(trim_line_end(b"abc\r\n"), b"abc");
        assert_eq!(trim_line_end(b"abc"), b"abc");
    }

    #[test]
    fn test_should_skip_line() {
        assert!(should_skip_line(b""));
        assert!(should_skip_line(b"  \t"));
        assert!(!should_skip_line(b"read1\t+\tchr1"));
    }
}
