//! Answer archives
//!
//! Each puzzle ships with a `.npz` archive (a zip of `.npy` arrays). Only
//! the `target` array is read: the index of the correct completion panel.
//!
//! `.npy` layout: magic `\x93NUMPY`, a major/minor version byte pair, a
//! little-endian header length (`u16` for version 1, `u32` after), a
//! Python dict literal header, then the raw array data.

use crate::error::{SynthError, SynthResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const MAGIC: &[u8] = b"\x93NUMPY";
const TARGET_MEMBER: &str = "target.npy";

/// Element type of an integer array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dtype {
    Signed(usize),
    Unsigned(usize),
}

impl Dtype {
    fn parse(descr: &str) -> Option<Self> {
        let (order, kind) = (descr.get(..1)?, descr.get(1..2)?);
        if order == ">" {
            return None;
        }
        let width: usize = descr.get(2..)?.parse().ok()?;
        if !matches!(width, 1 | 2 | 4 | 8) {
            return None;
        }
        match kind {
            "i" => Some(Dtype::Signed(width)),
            "u" => Some(Dtype::Unsigned(width)),
            _ => None,
        }
    }

    fn width(self) -> usize {
        match self {
            Dtype::Signed(w) | Dtype::Unsigned(w) => w,
        }
    }

    fn decode(self, bytes: &[u8]) -> Option<i64> {
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(bytes);
        match self {
            Dtype::Signed(w) => {
                // sign-extend from the top byte of the element
                if bytes.get(w - 1).is_some_and(|b| b & 0x80 != 0) {
                    buf[w..].fill(0xff);
                }
                Some(i64::from_le_bytes(buf))
            }
            Dtype::Unsigned(_) => i64::try_from(u64::from_le_bytes(buf)).ok(),
        }
    }
}

/// First element of an integer `.npy` payload
fn first_integer(data: &[u8]) -> Result<i64, String> {
    let rest = data.strip_prefix(MAGIC).ok_or("missing .npy magic")?;
    let (&major, rest) = rest.split_first().ok_or("truncated version")?;
    let rest = rest.get(1..).ok_or("truncated version")?;
    let (len, rest) = match major {
        1 => {
            let raw = rest.get(..2).ok_or("truncated header length")?;
            (usize::from(u16::from_le_bytes([raw[0], raw[1]])), &rest[2..])
        }
        2 | 3 => {
            let raw = rest.get(..4).ok_or("truncated header length")?;
            let len = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            (usize::try_from(len).map_err(|e| e.to_string())?, &rest[4..])
        }
        other => return Err(format!("unsupported .npy version {other}")),
    };
    let header = rest.get(..len).ok_or("truncated header")?;
    let header = std::str::from_utf8(header).map_err(|e| e.to_string())?;
    let descr = header_field(header, "descr").ok_or("header has no descr")?;
    let dtype = Dtype::parse(descr).ok_or_else(|| format!("unsupported dtype '{descr}'"))?;

    let body = &rest[len..];
    let element = body.get(..dtype.width()).ok_or("array is empty")?;
    dtype.decode(element).ok_or_else(|| "value out of range".to_string())
}

/// Quoted string value of `'key': '...'` in the header dict
fn header_field<'h>(header: &'h str, key: &str) -> Option<&'h str> {
    let start = header.find(&format!("'{key}'"))? + key.len() + 2;
    let after = header[start..].trim_start().strip_prefix(':')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let value = &after[1..];
    value.find(quote).map(|end| &value[..end])
}

/// Read the `target` entry of a `.npz` archive
///
/// # Errors
///
/// [`SynthError::Io`] if the file cannot be opened, [`SynthError::Zip`]
/// if it is not a zip archive or lacks `target.npy`, [`SynthError::Array`]
/// if the array is not an integer array.
pub fn read_target(path: impl AsRef<Path>) -> SynthResult<i64> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SynthError::io_error(path, e))?;
    let zip_error = |source| SynthError::Zip {
        path: path.to_path_buf(),
        source,
    };
    let mut archive = zip::ZipArchive::new(file).map_err(zip_error)?;
    let mut member = archive.by_name(TARGET_MEMBER).map_err(zip_error)?;
    let mut data = Vec::new();
    member
        .read_to_end(&mut data)
        .map_err(|e| SynthError::io_error(path, e))?;
    let target = first_integer(&data).map_err(|message| SynthError::array(path, TARGET_MEMBER, message))?;
    tracing::debug!(path = %path.display(), target, "read answer archive");
    Ok(target)
}
