//! Binary town format.
//!
//! Layout (all integers 32-bit little-endian, flags one byte, `SEPARATOR`
//! is a single `0x0A` byte):
//! - version major, minor, patch
//! - administrator id, round, money (signed)
//! - grid width, grid height
//! - `SEPARATOR`
//! - hidden flags, x outer / y inner, one byte per cell
//! - field codes, x outer / y inner, one u32 per cell
//! - `SEPARATOR`
//! - construction count, `SEPARATOR`, then `(field, x, y, progress)` records
//! - mercenary count, `SEPARATOR`, then `(kind, x, y, hp, faction)` records
//!
//! Files written by a different major version are rejected; minor and
//! patch differences are accepted with a warning.

use std::fmt;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::error::ErrorKind;
use crate::town::{
    buildable, coords, Construction, Coord, Faction, Field, Mercenary, Town, HEIGHT,
    MAX_CONSTRUCTIONS, MAX_MERCENARIES, WIDTH,
};

/// Separator byte between sections.
pub const SEPARATOR: u8 = b'\n';

/// Version of the format written by this build.
pub const FORMAT_VERSION: Version = Version {
    major: 1,
    minor: 0,
    patch: 0,
};

/// A format version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    /// Incompatible layout changes.
    pub major: u32,
    /// Compatible additions.
    pub minor: u32,
    /// Fixes.
    pub patch: u32,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Errors from encoding, decoding or accessing town files.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A file operation failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A stream operation failed.
    #[error("stream error: {0}")]
    Stream(#[from] io::Error),
    /// The data ended before the town was complete.
    #[error("town data is truncated")]
    Truncated,
    /// The grid dimensions in the file do not match this build.
    #[error("town grid is {width}x{height}, expected {}x{}; the file is corrupted", WIDTH, HEIGHT)]
    GridMismatch {
        /// Width found in the file.
        width: u32,
        /// Height found in the file.
        height: u32,
    },
    /// The file was written by an incompatible format version.
    #[error("town format {found} is not supported (this build reads {})", FORMAT_VERSION)]
    IncompatibleVersion {
        /// Version found in the file.
        found: Version,
    },
    /// Any other structural problem.
    #[error("town data is corrupted: {0}")]
    Corrupt(String),
}

impl CodecError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Io { .. } | CodecError::Stream(_) => ErrorKind::Io,
            CodecError::Truncated
            | CodecError::GridMismatch { .. }
            | CodecError::IncompatibleVersion { .. }
            | CodecError::Corrupt(_) => ErrorKind::Validation,
        }
    }
}

fn count_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn put_u32<W: Write>(out: &mut W, value: u32) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

/// Write a town in the binary format.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn encode<W: Write>(town: &Town, out: &mut W) -> io::Result<()> {
    put_u32(out, FORMAT_VERSION.major)?;
    put_u32(out, FORMAT_VERSION.minor)?;
    put_u32(out, FORMAT_VERSION.patch)?;

    put_u32(out, u32::from(town.admin))?;
    put_u32(out, town.round)?;
    out.write_all(&town.money.to_le_bytes())?;

    put_u32(out, count_u32(WIDTH))?;
    put_u32(out, count_u32(HEIGHT))?;
    out.write_all(&[SEPARATOR])?;

    for (_, hidden) in town.hidden().iter() {
        out.write_all(&[u8::from(hidden)])?;
    }
    for (_, field) in town.fields().iter() {
        put_u32(out, field.code())?;
    }
    out.write_all(&[SEPARATOR])?;

    put_u32(out, count_u32(town.constructions().len()))?;
    out.write_all(&[SEPARATOR])?;
    for site in town.constructions() {
        put_u32(out, site.target.code())?;
        put_u32(out, u32::from(site.at.x))?;
        put_u32(out, u32::from(site.at.y))?;
        put_u32(out, site.progress)?;
    }

    put_u32(out, count_u32(town.mercenaries().len()))?;
    out.write_all(&[SEPARATOR])?;
    for merc in town.mercenaries() {
        put_u32(out, u32::from(merc.kind))?;
        put_u32(out, u32::from(merc.at.x))?;
        put_u32(out, u32::from(merc.at.y))?;
        put_u32(out, merc.hp)?;
        put_u32(out, merc.faction.code())?;
    }

    Ok(())
}

/// Encode a town into a byte vector.
#[must_use]
pub fn to_bytes(town: &Town) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(1200);
    // Writing into a Vec cannot fail.
    let _ = encode(town, &mut bytes);
    bytes
}

/// Sequential reader that maps a short read to [`CodecError::Truncated`].
struct Fields<R> {
    inner: R,
}

impl<R: Read> Fields<R> {
    fn exact<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                CodecError::Truncated
            } else {
                CodecError::Stream(e)
            }
        })?;
        Ok(buf)
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        self.exact::<4>().map(u32::from_le_bytes)
    }

    fn i32(&mut self) -> Result<i32, CodecError> {
        self.exact::<4>().map(i32::from_le_bytes)
    }

    fn flag(&mut self) -> Result<bool, CodecError> {
        match self.exact::<1>()? {
            [0] => Ok(false),
            [1] => Ok(true),
            [other] => Err(CodecError::Corrupt(format!("invalid flag byte {other}"))),
        }
    }

    fn separator(&mut self, section: &str) -> Result<(), CodecError> {
        match self.exact::<1>()? {
            [SEPARATOR] => Ok(()),
            [other] => Err(CodecError::Corrupt(format!(
                "expected separator before {section}, found byte {other:#04x}"
            ))),
        }
    }

    fn coord(&mut self) -> Result<Coord, CodecError> {
        let x = self.u32()?;
        let y = self.u32()?;
        Coord::checked(i64::from(x), i64::from(y))
            .map_err(|e| CodecError::Corrupt(e.to_string()))
    }

    fn field(&mut self) -> Result<Field, CodecError> {
        let code = self.u32()?;
        Field::from_code(code).ok_or_else(|| CodecError::Corrupt(format!("unknown field code {code}")))
    }

    fn at_end(&mut self) -> Result<bool, CodecError> {
        let mut probe = [0u8; 1];
        loop {
            match self.inner.read(&mut probe) {
                Ok(n) => return Ok(n == 0),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(CodecError::Stream(e)),
            }
        }
    }
}

/// Apply the version policy to a version read from a file.
///
/// # Errors
///
/// Returns [`CodecError::IncompatibleVersion`] if the major version differs
/// from [`FORMAT_VERSION`].
pub fn check_version(found: Version) -> Result<(), CodecError> {
    if found.major != FORMAT_VERSION.major {
        return Err(CodecError::IncompatibleVersion { found });
    }
    if found != FORMAT_VERSION {
        tracing::warn!(%found, current = %FORMAT_VERSION, "town was written by a different format revision");
    }
    Ok(())
}

/// Read a town in the binary format.
///
/// Grid dimensions are checked before any grid data is read.
///
/// # Errors
///
/// Returns [`CodecError::GridMismatch`] on wrong dimensions,
/// [`CodecError::IncompatibleVersion`] on a different major version,
/// [`CodecError::Truncated`] on short input and [`CodecError::Corrupt`] on
/// any other malformed content.
pub fn decode<R: Read>(input: R) -> Result<Town, CodecError> {
    let mut r = Fields { inner: input };

    let version = Version {
        major: r.u32()?,
        minor: r.u32()?,
        patch: r.u32()?,
    };
    check_version(version)?;

    let admin_raw = r.u32()?;
    let round = r.u32()?;
    let money = r.i32()?;

    let width = r.u32()?;
    let height = r.u32()?;
    if width != count_u32(WIDTH) || height != count_u32(HEIGHT) {
        return Err(CodecError::GridMismatch { width, height });
    }
    r.separator("grid")?;

    let admin = u8::try_from(admin_raw)
        .map_err(|_| CodecError::Corrupt(format!("administrator id {admin_raw} out of range")))?;
    let mut town = Town::new(admin).map_err(|e| CodecError::Corrupt(e.to_string()))?;
    town.round = round;
    town.money = money;

    for at in coords() {
        town.set_hidden(at, r.flag()?);
    }
    for at in coords() {
        let field = r.field()?;
        town.set_field(at, field);
    }
    r.separator("constructions")?;

    let construction_count = r.u32()?;
    if usize::try_from(construction_count).map_or(true, |n| n > MAX_CONSTRUCTIONS) {
        return Err(CodecError::Corrupt(format!(
            "{construction_count} constructions exceed capacity {MAX_CONSTRUCTIONS}"
        )));
    }
    r.separator("construction records")?;
    for _ in 0..construction_count {
        let target = r.field()?;
        if buildable(target).is_none() {
            return Err(CodecError::Corrupt(format!("{} is not buildable", target.name())));
        }
        let at = r.coord()?;
        let progress = r.u32()?;
        if town.field(at) != Some(Field::Construction) {
            return Err(CodecError::Corrupt(format!(
                "construction record at {at} has no construction site"
            )));
        }
        town.add_construction(Construction { target, at, progress })
            .map_err(|e| CodecError::Corrupt(e.to_string()))?;
    }

    let merc_count = r.u32()?;
    if usize::try_from(merc_count).map_or(true, |n| n > MAX_MERCENARIES) {
        return Err(CodecError::Corrupt(format!(
            "{merc_count} mercenaries exceed capacity {MAX_MERCENARIES}"
        )));
    }
    r.separator("mercenary records")?;
    for _ in 0..merc_count {
        let kind_raw = r.u32()?;
        let at = r.coord()?;
        let hp = r.u32()?;
        let faction_raw = r.u32()?;
        let kind = u8::try_from(kind_raw)
            .map_err(|_| CodecError::Corrupt(format!("mercenary kind {kind_raw} out of range")))?;
        let faction = Faction::from_code(faction_raw)
            .ok_or_else(|| CodecError::Corrupt(format!("unknown faction {faction_raw}")))?;
        let mut merc =
            Mercenary::new(kind, at, faction).map_err(|e| CodecError::Corrupt(e.to_string()))?;
        merc.hp = hp;
        town.add_mercenary(merc)
            .map_err(|e| CodecError::Corrupt(e.to_string()))?;
    }

    if !r.at_end()? {
        return Err(CodecError::Corrupt("trailing bytes after mercenary records".to_string()));
    }

    Ok(town)
}

/// Decode a town from a byte slice.
///
/// # Errors
///
/// See [`decode`].
pub fn from_bytes(bytes: &[u8]) -> Result<Town, CodecError> {
    decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::town::generate;

    const WIDTH_OFFSET: usize = 24;
    const GRID_START: usize = 33;

    fn sample() -> Town {
        let mut town = generate(1, 99).unwrap();
        town.construct(Field::Quarry, Coord::new(6, 6)).unwrap();
        town.round = 31;
        town.money = -4;
        town.spawn_mercenary(0, Coord::new(5, 5), Faction::Town).unwrap();
        town.spawn_mercenary(2, Coord::new(9, 9), Faction::Raider).unwrap();
        town
    }

    #[test]
    fn test_encoded_length() {
        let town = sample();
        let bytes = to_bytes(&town);
        let expected = 12 + 12 + 8 + 1 + 225 + 900 + 1
            + 4 + 1 + 16 * town.constructions().len()
            + 4 + 1 + 20 * town.mercenaries().len();
        assert_eq!(bytes.len(), expected);
        assert_eq!(bytes[32], SEPARATOR);
    }

    #[test]
    fn test_roundtrip() {
        let town = sample();
        assert_eq!(from_bytes(&to_bytes(&town)).unwrap(), town);
    }

    #[test]
    fn test_grid_mismatch_detected_before_grid() {
        let mut bytes = to_bytes(&sample());
        bytes[WIDTH_OFFSET..WIDTH_OFFSET + 4].copy_from_slice(&16u32.to_le_bytes());
        // Even a file that stops right after the header reports the mismatch.
        bytes.truncate(GRID_START);
        assert!(matches!(
            from_bytes(&bytes),
            Err(CodecError::GridMismatch { width: 16, height: 15 })
        ));
    }

    #[test]
    fn test_truncated() {
        let bytes = to_bytes(&sample());
        for len in [0, 5, 40, bytes.len() - 1] {
            assert!(
                matches!(from_bytes(&bytes[..len]), Err(CodecError::Truncated)),
                "length {len}"
            );
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = to_bytes(&sample());
        bytes.push(0);
        assert!(matches!(from_bytes(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn test_bad_separator() {
        let mut bytes = to_bytes(&sample());
        bytes[32] = b' ';
        assert!(matches!(from_bytes(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn test_version_policy() {
        let mut bytes = to_bytes(&sample());
        bytes[4..8].copy_from_slice(&7u32.to_le_bytes());
        assert!(from_bytes(&bytes).is_ok());

        bytes[0..4].copy_from_slice(&2u32.to_le_bytes());
        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::IncompatibleVersion { found } if found.major == 2));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_unknown_field_code() {
        let mut bytes = to_bytes(&sample());
        let first_field = GRID_START + 225;
        bytes[first_field..first_field + 4].copy_from_slice(&99u32.to_le_bytes());
        assert!(matches!(from_bytes(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn test_construction_record_needs_a_site() {
        let town = sample();
        let site = Coord::new(6, 6);
        assert_eq!(town.field(site), Some(Field::Construction));

        let mut bytes = to_bytes(&town);
        // Column-major: x outer, y inner.
        let cell = GRID_START + 225 + 4 * (6 * HEIGHT + 6);
        bytes[cell..cell + 4].copy_from_slice(&Field::Empty.code().to_le_bytes());
        assert!(matches!(from_bytes(&bytes), Err(CodecError::Corrupt(_))));

        bytes[cell..cell + 4].copy_from_slice(&Field::Administration.code().to_le_bytes());
        assert!(matches!(from_bytes(&bytes), Err(CodecError::Corrupt(_))));
    }
}
