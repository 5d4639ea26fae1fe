use super::PkgVersion;
use std::cmp::{Ord, Ordering};

/// The rpmvercmp algorithm, as used by pacman
/// Check https://fedoraproject.org/wiki/Archive:Tools/RPM/VersionComparison
pub fn rpmvercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let one = a.as_bytes();
    let two = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < one.len() && j < two.len() {
        let (sep_i, sep_j) = (i, j);
        while i < one.len() && !one[i].is_ascii_alphanumeric() {
            i += 1;
        }
        while j < two.len() && !two[j].is_ascii_alphanumeric() {
            j += 1;
        }
        if i == one.len() || j == two.len() {
            break;
        }

        // Different separator length decides it
        let (sep_len_one, sep_len_two) = (i - sep_i, j - sep_j);
        if sep_len_one != sep_len_two {
            return sep_len_one.cmp(&sep_len_two);
        }

        let is_num = one[i].is_ascii_digit();
        let end_i = segment_end(one, i, is_num);
        let end_j = segment_end(two, j, is_num);

        // Segments of different types: numeric one is newer
        if end_j == j {
            return if is_num {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let res = if is_num {
            let x = strip_zeros(&one[i..end_i]);
            let y = strip_zeros(&two[j..end_j]);
            // A longer number (without leading zeros) is always larger
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        } else {
            one[i..end_i].cmp(&two[j..end_j])
        };
        if res != Ordering::Equal {
            return res;
        }

        i = end_i;
        j = end_j;
    }

    let one_done = i >= one.len();
    let two_done = j >= two.len();
    if one_done && two_done {
        // Only the separators were different
        return Ordering::Equal;
    }

    // A remaining alpha segment never beats the end of the string
    if (one_done && !two[j].is_ascii_alphabetic()) || (!one_done && one[i].is_ascii_alphabetic())
    {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

fn segment_end(s: &[u8], start: usize, is_num: bool) -> usize {
    let mut end = start;
    while end < s.len()
        && ((is_num && s[end].is_ascii_digit()) || (!is_num && s[end].is_ascii_alphabetic()))
    {
        end += 1;
    }
    end
}

fn strip_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|c| *c != b'0').unwrap_or(s.len());
    &s[start..]
}

impl Ord for PkgVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        rpmvercmp(&self.epoch, &other.epoch)
            .then_with(|| rpmvercmp(&self.version, &other.version))
            .then_with(|| match (&self.release, &other.release) {
                // Release only matters if both sides have one
                (Some(this), Some(that)) => rpmvercmp(this, that),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for PkgVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PkgVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PkgVersion {}
