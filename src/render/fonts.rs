use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use usvg::fontdb;

use crate::foundation::error::{BannerError, BannerResult};

/// CSS-style generic family used when a named family is not installed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenericFamily {
    Serif,
    SansSerif,
    Monospace,
    Cursive,
}

impl GenericFamily {
    fn as_fontdb(self) -> fontdb::Family<'static> {
        match self {
            Self::Serif => fontdb::Family::Serif,
            Self::SansSerif => fontdb::Family::SansSerif,
            Self::Monospace => fontdb::Family::Monospace,
            Self::Cursive => fontdb::Family::Cursive,
        }
    }
}

/// Where the catalog looks for font files.
#[derive(Clone, Debug, Default)]
pub struct FontSources {
    pub system_fonts: bool,
    pub dirs: Vec<PathBuf>,
}

/// A resolved font face with its raw bytes.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub id: fontdb::ID,
    /// Family name of the face that was actually selected.
    pub family: String,
    /// `false` when the requested family was missing and a fallback was used.
    pub exact: bool,
    pub data: Arc<Vec<u8>>,
    pub index: u32,
}

/// Font lookup over system fonts and configured directories.
pub struct FontCatalog {
    db: fontdb::Database,
    cache: HashMap<(String, GenericFamily), FontFace>,
}

impl std::fmt::Debug for FontCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontCatalog")
            .field("faces", &self.db.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl FontCatalog {
    /// Build the catalog. Fails when no face at all could be loaded.
    pub fn load(sources: &FontSources) -> BannerResult<Self> {
        let mut db = fontdb::Database::new();
        if sources.system_fonts {
            db.load_system_fonts();
        }
        for dir in &sources.dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        if db.is_empty() {
            return Err(BannerError::font(format!(
                "no font faces found (system fonts: {}, dirs: {:?})",
                sources.system_fonts, sources.dirs
            )));
        }
        settle_monospace_family(&mut db);
        tracing::debug!(faces = db.len(), "font catalog loaded");
        Ok(Self {
            db,
            cache: HashMap::new(),
        })
    }

    /// Resolve `family`, falling back to `generic`, then the other generics, then any face.
    pub fn resolve(&mut self, family: &str, generic: GenericFamily) -> BannerResult<FontFace> {
        let key = (family.to_string(), generic);
        if let Some(face) = self.cache.get(&key) {
            return Ok(face.clone());
        }

        let named = self.query(&[fontdb::Family::Name(family)]);
        let exact = named.is_some();
        let id = named
            .or_else(|| self.query(&[generic.as_fontdb()]))
            .or_else(|| {
                self.query(&[
                    fontdb::Family::SansSerif,
                    fontdb::Family::Serif,
                    fontdb::Family::Monospace,
                ])
            })
            .or_else(|| self.db.faces().next().map(|f| f.id))
            .ok_or_else(|| BannerError::font("font database is empty"))?;

        let face = self.load_face(id, exact)?;
        if !exact {
            tracing::warn!(
                requested = family,
                fallback = %face.family,
                "font family not installed, using fallback face"
            );
        }
        self.cache.insert(key, face.clone());
        Ok(face)
    }

    fn query(&self, families: &[fontdb::Family<'_>]) -> Option<fontdb::ID> {
        self.db.query(&fontdb::Query {
            families,
            ..Default::default()
        })
    }

    fn load_face(&self, id: fontdb::ID, exact: bool) -> BannerResult<FontFace> {
        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_default();
        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| BannerError::font(format!("font face '{family}' could not be read")))?;
        Ok(FontFace {
            id,
            family,
            exact,
            data: Arc::new(data),
            index,
        })
    }
}

/// Point the monospace generic at an installed monospaced face when the platform default is missing.
fn settle_monospace_family(db: &mut fontdb::Database) {
    let installed = db
        .query(&fontdb::Query {
            families: &[fontdb::Family::Monospace],
            ..Default::default()
        })
        .is_some();
    if installed {
        return;
    }
    let name = db
        .faces()
        .find(|f| f.monospaced)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()));
    if let Some(name) = name {
        db.set_monospace_family(name);
    }
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fonts.rs"]
mod tests;
