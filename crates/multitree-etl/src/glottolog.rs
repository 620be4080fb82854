//! Glottolog languoid catalogue.
//!
//! Two layouts are supported:
//!
//! - a repository checkout, where each languoid lives in
//!   `languoids/tree/**/<glottocode>/md.ini`;
//! - a JSON snapshot: an array of objects shaped like
//!   [`ExternalLanguoid`](multitree_core::model::ExternalLanguoid).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use multitree_core::model::ExternalLanguoid;

use crate::error::{ConvertError, ConvertResult};

/// Where the languoid catalogue is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlottologCatalogue {
    /// Root of a Glottolog repository checkout.
    Repository(PathBuf),
    /// A JSON snapshot file.
    Snapshot(PathBuf),
}

impl GlottologCatalogue {
    /// Pick the layout from the path: `.json` files are snapshots,
    /// anything else is treated as a repository.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::Snapshot(path.to_path_buf())
        } else {
            Self::Repository(path.to_path_buf())
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Repository(p) | Self::Snapshot(p) => p,
        }
    }

    /// Read every languoid in the catalogue.
    pub fn load(&self) -> ConvertResult<Vec<ExternalLanguoid>> {
        let languoids = match self {
            Self::Repository(root) => load_repository(root)?,
            Self::Snapshot(path) => load_snapshot(path)?,
        };
        log::info!(
            "Read {} languoids from {}",
            languoids.len(),
            self.path().display()
        );
        Ok(languoids)
    }
}

fn catalogue_error(path: &Path, message: impl Into<String>) -> ConvertError {
    ConvertError::Catalogue {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn load_snapshot(path: &Path) -> ConvertResult<Vec<ExternalLanguoid>> {
    let content = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| catalogue_error(path, e.to_string()))
}

fn load_repository(root: &Path) -> ConvertResult<Vec<ExternalLanguoid>> {
    let tree = root.join("languoids").join("tree");
    if !tree.is_dir() {
        return Err(catalogue_error(
            root,
            "not a Glottolog repository (no languoids/tree directory)",
        ));
    }

    let mut languoids = Vec::new();
    for entry in WalkDir::new(&tree).sort_by_file_name() {
        let entry = entry.map_err(|e| catalogue_error(&tree, e.to_string()))?;
        if !entry.file_type().is_file() || entry.file_name() != "md.ini" {
            continue;
        }
        let path = entry.path();
        let glottocode = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|s| s.to_str())
            .ok_or_else(|| catalogue_error(path, "cannot derive glottocode"))?;
        let content = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        let ini = parse_ini(&content).map_err(|message| catalogue_error(path, message))?;
        languoids.push(languoid_from_ini(glottocode, &ini, path)?);
    }
    Ok(languoids)
}

/// Sections of an INI file: section → key → value.
///
/// Continuation lines (indented lines following a key) are appended to
/// the value separated by newlines.
type Ini = BTreeMap<String, BTreeMap<String, String>>;

fn parse_ini(content: &str) -> Result<Ini, String> {
    let mut ini = Ini::new();
    let mut section: Option<String> = None;
    let mut key: Option<String> = None;

    for (number, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            let (Some(s), Some(k)) = (&section, &key) else {
                return Err(format!("line {}: unexpected continuation", number + 1));
            };
            if let Some(value) = ini.get_mut(s).and_then(|m| m.get_mut(k)) {
                if !value.is_empty() {
                    value.push('\n');
                }
                value.push_str(trimmed);
            }
            continue;
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let name = name.trim().to_string();
            ini.entry(name.clone()).or_default();
            section = Some(name);
            key = None;
            continue;
        }

        let Some(current) = &section else {
            return Err(format!("line {}: key outside of a section", number + 1));
        };
        let (k, v) = trimmed
            .split_once('=')
            .or_else(|| trimmed.split_once(':'))
            .ok_or_else(|| format!("line {}: expected key = value", number + 1))?;
        let k = k.trim().to_string();
        ini.entry(current.clone())
            .or_default()
            .insert(k.clone(), v.trim().to_string());
        key = Some(k);
    }
    Ok(ini)
}

fn languoid_from_ini(glottocode: &str, ini: &Ini, path: &Path) -> ConvertResult<ExternalLanguoid> {
    let core = ini
        .get("core")
        .ok_or_else(|| catalogue_error(path, "missing [core] section"))?;
    let name = core
        .get("name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| catalogue_error(path, "missing core name"))?;

    let mut languoid = ExternalLanguoid::new(glottocode, name.as_str());
    languoid.latitude = coordinate(core, "latitude", path)?;
    languoid.longitude = coordinate(core, "longitude", path)?;

    if let Some(altnames) = ini.get("altnames") {
        for (namespace, value) in altnames {
            for alt in value.lines().map(str::trim).filter(|l| !l.is_empty()) {
                languoid = languoid.with_name(namespace, alt);
            }
        }
    }
    if let Some(identifiers) = ini.get("identifier") {
        for (namespace, value) in identifiers {
            if !value.is_empty() {
                languoid = languoid.with_identifier(namespace, value.as_str());
            }
        }
    }
    Ok(languoid)
}

fn coordinate(
    core: &BTreeMap<String, String>,
    key: &str,
    path: &Path,
) -> ConvertResult<Option<f64>> {
    match core.get(key).map(String::as_str) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|e| catalogue_error(path, format!("bad {key} {raw:?}: {e}"))),
    }
}
