use super::PkgVersion;

use nom::{
    character::complete::{char, digit0},
    sequence::terminated,
    IResult,
};

/// Parse the epoch part of a version, like `2:`
fn epoch(i: &str) -> IResult<&str, &str> {
    terminated(digit0, char(':'))(i)
}

/// Split a version into epoch, version and release
///
/// This never fails: anything that doesn't look like an epoch is considered
/// part of the version, and the release is whatever follows the last `-`.
pub fn parse_version(i: &str) -> PkgVersion {
    let (rest, epoch) = match epoch(i) {
        // An empty epoch (":1.0") counts as zero
        Ok((rest, e)) if e.is_empty() => (rest, "0"),
        Ok((rest, e)) => (rest, e),
        Err(_) => (i, "0"),
    };

    let (version, release) = match rest.rfind('-') {
        Some(pos) => (&rest[..pos], Some(rest[pos + 1..].to_owned())),
        None => (rest, None),
    };

    PkgVersion {
        epoch: epoch.to_owned(),
        version: version.to_owned(),
        release,
    }
}
