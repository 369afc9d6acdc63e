//! Deterministic content fingerprints for features.
//!
//! A fingerprint folds three materials, in this order:
//! 1. the SHA-256 of the feature's command,
//! 2. one directory digest per input, in declaration order,
//! 3. one `name` + `fingerprint` entry per dependency (no separator), sorted
//!    by dependency name.
//!
//! The parts are joined with `|` and hashed again with SHA-256.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::feature::Feature;

const READ_BUFFER_SIZE: usize = 64 * 1024;
const SHORT_LEN: usize = 8;

/// Lowercase hex SHA-256 digest identifying one state of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wraps an already computed digest, e.g. one read back from the cache.
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, used for image tags.
    pub fn short(&self) -> &str {
        self.0.get(..SHORT_LEN).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex SHA-256 of a string.
pub fn hash_str(s: &str) -> String {
    format!("{:x}", Sha256::digest(s.as_bytes()))
}

/// Hex SHA-256 of a file's raw bytes.
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| Error::hash(path, e))?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| Error::hash(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Files under `path`, sorted byte-wise by full path.
///
/// A path that is itself a file yields just that file. Symlinks to files are
/// kept and hashed through to their target; a dangling link is an error.
/// Symlinked directories are not descended into.
fn collect_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry.map_err(|e| {
            let failed = e.path().unwrap_or(path).to_path_buf();
            Error::hash(failed, e)
        })?;
        let file_type = entry.file_type();
        if file_type.is_file() {
            files.push(entry.into_path());
        } else if file_type.is_symlink() {
            let target = fs::metadata(entry.path()).map_err(|e| {
                Error::hash(entry.path(), format!("cannot resolve symlink: {}", e))
            })?;
            if target.is_file() {
                files.push(entry.into_path());
            }
        }
    }
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(files)
}

/// Combined digest of every file under `path`.
///
/// Only path order and file bytes matter: timestamps, permissions and empty
/// directories do not affect the result.
pub fn hash_dir(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    for file in collect_files(path)? {
        let file_hash = hash_file(&file)?;
        trace!(file = %file.display(), hash = %file_hash, "hashed input file");
        hasher.update(file_hash.as_bytes());
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Computes a feature's fingerprint from its command, inputs and the
/// fingerprints of its direct dependencies.
///
/// Dependency fingerprints may arrive in any order; they are sorted by name
/// before folding.
///
/// # Errors
///
/// Returns [`Error::Hash`] if an input path or file cannot be read.
pub fn compute<'a, I>(feature: &Feature, dependency_fingerprints: I) -> Result<Fingerprint>
where
    I: IntoIterator<Item = (&'a str, &'a Fingerprint)>,
{
    let mut parts = Vec::with_capacity(1 + feature.inputs.len());
    parts.push(hash_str(&feature.command));

    for input in &feature.inputs {
        parts.push(hash_dir(input)?);
    }

    let mut deps: Vec<(&str, &Fingerprint)> = dependency_fingerprints.into_iter().collect();
    deps.sort_by(|a, b| a.0.cmp(b.0));
    parts.extend(deps.into_iter().map(|(name, fp)| format!("{}{}", name, fp)));

    Ok(Fingerprint(hash_str(&parts.join("|"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_string_digest() {
        assert_eq!(
            hash_str("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn short_form_is_prefix() {
        let fp = Fingerprint::new(hash_str("x"));
        assert_eq!(fp.short().len(), 8);
        assert!(fp.as_str().starts_with(fp.short()));
        assert_eq!(Fingerprint::new("abc").short(), "abc");
    }

    #[test]
    fn command_only_feature_needs_no_io() {
        let feature = Feature::new("a", vec![], "make", vec![]);
        let first = compute(&feature, []).unwrap();
        let second = compute(&feature, []).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 64);
    }
}
