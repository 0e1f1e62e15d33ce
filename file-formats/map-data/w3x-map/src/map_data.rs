//! All decoded files of one map directory.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::camera::{Camera, CamerasTranslator};
use crate::doodad::{Doodad, DoodadPlacements, DoodadsTranslator, SpecialDoodad};
use crate::error::{Error, Result};
use crate::file_kind::FileKind;
use crate::info::{InfoTranslator, MapInfo};
use crate::objects::{ObjectCategory, ObjectModificationTable, ObjectTranslator};
use crate::region::{Region, RegionsTranslator};
use crate::terrain::{Terrain, TerrainTranslator};
use crate::translator::{DecodeOptions, Diagnostic, Translator};
use crate::unit::{Unit, UnitsTranslator};

/// Options applied when loading a map directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadOptions {
    pub decode: DecodeOptions,
    /// Also load the `war3mapSkin.*` tables
    pub load_skins: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            decode: DecodeOptions::default(),
            load_skins: true,
        }
    }
}

impl LoadOptions {
    pub fn with_decode(mut self, decode: DecodeOptions) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_skins(mut self, load_skins: bool) -> Self {
        self.load_skins = load_skins;
        self
    }
}

/// A warning raised while loading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiagnostic {
    pub kind: FileKind,
    pub diagnostic: Diagnostic,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Contents {
    info: Option<MapInfo>,
    terrain: Option<Terrain>,
    units: Vec<Unit>,
    doodads: DoodadPlacements,
    cameras: Vec<Camera>,
    regions: Vec<Region>,
    objects: [ObjectModificationTable; 7],
    skins: [ObjectModificationTable; 7],
}

/// The in-memory form of a map directory.
///
/// Files are loaded together by [`load`](Self::load) and saved one kind at
/// a time. Every `_mut` accessor marks its kind as touched so that
/// [`save_touched`](Self::save_touched) writes back exactly what changed.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    options: LoadOptions,
    map_dir: Option<PathBuf>,
    contents: Contents,
    touched: BTreeSet<FileKind>,
    diagnostics: Vec<FileDiagnostic>,
}

impl MapData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    pub fn map_dir(&self) -> Option<&Path> {
        self.map_dir.as_deref()
    }

    /// Directory that subsequent saves write to.
    pub fn set_map_dir(&mut self, dir: impl Into<PathBuf>) {
        self.map_dir = Some(dir.into());
    }

    /// Load every known file under `dir`.
    ///
    /// Info, terrain and both placement files are required. The remaining
    /// files fall back to empty tables when absent. On error the previously
    /// loaded contents are left untouched.
    pub fn load(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        let mut contents = Contents::default();
        let mut diagnostics = Vec::new();

        for kind in FileKind::all() {
            if matches!(kind, FileKind::Skins(_)) && !self.options.load_skins {
                continue;
            }
            let path = dir.join(kind.file_name());
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound && kind.is_optional() => {
                    log::debug!("{} not present, using an empty {kind} table", path.display());
                    continue;
                }
                Err(e) => return Err(Error::io(path, e)),
            };
            log::debug!("Loading {kind} from {} ({} bytes)", path.display(), bytes.len());

            let found = self.decode_into(&mut contents, kind, &bytes)?;
            diagnostics.extend(
                found
                    .into_iter()
                    .map(|diagnostic| FileDiagnostic { kind, diagnostic }),
            );
        }

        log::info!(
            "Loaded map {}: {} units, {} doodads, {} diagnostics",
            dir.display(),
            contents.units.len(),
            contents.doodads.doodads.len(),
            diagnostics.len()
        );
        self.contents = contents;
        self.diagnostics = diagnostics;
        self.touched.clear();
        self.map_dir = Some(dir.to_path_buf());
        Ok(())
    }

    fn decode_into(
        &self,
        contents: &mut Contents,
        kind: FileKind,
        bytes: &[u8],
    ) -> Result<Vec<Diagnostic>> {
        let options = self.options.decode;
        Ok(match kind {
            FileKind::Info => {
                let decoded = InfoTranslator.decode_with(bytes, options)?;
                contents.info = Some(decoded.model);
                decoded.diagnostics
            }
            FileKind::Terrain => {
                let decoded = TerrainTranslator.decode_with(bytes, options)?;
                contents.terrain = Some(decoded.model);
                decoded.diagnostics
            }
            FileKind::Units => {
                let decoded = UnitsTranslator.decode_with(bytes, options)?;
                contents.units = decoded.model;
                decoded.diagnostics
            }
            FileKind::Doodads => {
                let decoded = DoodadsTranslator.decode_with(bytes, options)?;
                contents.doodads = decoded.model;
                decoded.diagnostics
            }
            FileKind::Cameras => {
                let decoded = CamerasTranslator.decode_with(bytes, options)?;
                contents.cameras = decoded.model;
                decoded.diagnostics
            }
            FileKind::Regions => {
                let decoded = RegionsTranslator.decode_with(bytes, options)?;
                contents.regions = decoded.model;
                decoded.diagnostics
            }
            FileKind::Objects(category) => {
                let decoded = ObjectTranslator::new(category).decode_with(bytes, options)?;
                contents.objects[category.index()] = decoded.model;
                decoded.diagnostics
            }
            FileKind::Skins(category) => {
                let decoded = ObjectTranslator::skin(category).decode_with(bytes, options)?;
                contents.skins[category.index()] = decoded.model;
                decoded.diagnostics
            }
        })
    }

    /// Encode one kind without writing it.
    pub fn encode(&self, kind: FileKind) -> Result<Vec<u8>> {
        let contents = &self.contents;
        match kind {
            FileKind::Info => {
                let info = contents.info.as_ref().ok_or(Error::NotLoaded(kind))?;
                InfoTranslator.encode(info)
            }
            FileKind::Terrain => {
                let terrain = contents.terrain.as_ref().ok_or(Error::NotLoaded(kind))?;
                TerrainTranslator.encode(terrain)
            }
            FileKind::Units => UnitsTranslator.encode(&contents.units),
            FileKind::Doodads => DoodadsTranslator.encode(&contents.doodads),
            FileKind::Cameras => CamerasTranslator.encode(&contents.cameras),
            FileKind::Regions => RegionsTranslator.encode(&contents.regions),
            FileKind::Objects(category) => {
                ObjectTranslator::new(category).encode(&contents.objects[category.index()])
            }
            FileKind::Skins(category) => {
                ObjectTranslator::skin(category).encode(&contents.skins[category.index()])
            }
        }
    }

    /// Encode `kind` and overwrite its file in the map directory.
    pub fn save(&mut self, kind: FileKind) -> Result<()> {
        if self.map_dir.is_none() {
            return Err(Error::NoMapDirectory);
        }
        let bytes = self.encode(kind)?;
        self.write_files(vec![(kind, bytes)])?;
        Ok(())
    }

    /// Save a kind given by name, e.g. `"unitData"`.
    pub fn save_by_name(&mut self, name: &str) -> Result<()> {
        self.save(name.parse()?)
    }

    /// Save every touched kind. Returns the kinds written.
    ///
    /// Every kind is encoded before the first file is written, so an
    /// encoding error leaves the directory untouched. An I/O failure stops
    /// the writes; kinds not yet written stay touched.
    pub fn save_touched(&mut self) -> Result<Vec<FileKind>> {
        if self.map_dir.is_none() {
            return Err(Error::NoMapDirectory);
        }
        let files = self
            .touched
            .iter()
            .map(|&kind| Ok((kind, self.encode(kind)?)))
            .collect::<Result<Vec<_>>>()?;
        self.write_files(files)
    }

    /// Write already encoded files and clear their touched marks.
    pub(crate) fn write_files(
        &mut self,
        files: Vec<(FileKind, Vec<u8>)>,
    ) -> Result<Vec<FileKind>> {
        let dir = self.map_dir.clone().ok_or(Error::NoMapDirectory)?;
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let mut written = Vec::with_capacity(files.len());
        for (kind, bytes) in files {
            let path = dir.join(kind.file_name());
            fs::write(&path, &bytes).map_err(|e| Error::io(&path, e))?;
            log::debug!("Saved {kind} to {} ({} bytes)", path.display(), bytes.len());
            self.touched.remove(&kind);
            written.push(kind);
        }
        if written.len() > 1 {
            log::info!("Saved {} map files", written.len());
        }
        Ok(written)
    }

    /// Mark `kind` for the next [`save_touched`](Self::save_touched).
    pub fn touch(&mut self, kind: FileKind) {
        self.touched.insert(kind);
    }

    pub fn is_touched(&self, kind: FileKind) -> bool {
        self.touched.contains(&kind)
    }

    pub fn touched(&self) -> impl Iterator<Item = FileKind> + '_ {
        self.touched.iter().copied()
    }

    /// Warnings raised by the last [`load`](Self::load).
    pub fn diagnostics(&self) -> &[FileDiagnostic] {
        &self.diagnostics
    }

    pub fn info(&self) -> Option<&MapInfo> {
        self.contents.info.as_ref()
    }

    pub fn info_mut(&mut self) -> Option<&mut MapInfo> {
        self.touch(FileKind::Info);
        self.contents.info.as_mut()
    }

    pub fn set_info(&mut self, info: MapInfo) {
        self.touch(FileKind::Info);
        self.contents.info = Some(info);
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.contents.terrain.as_ref()
    }

    pub fn terrain_mut(&mut self) -> Option<&mut Terrain> {
        self.touch(FileKind::Terrain);
        self.contents.terrain.as_mut()
    }

    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.touch(FileKind::Terrain);
        self.contents.terrain = Some(terrain);
    }

    pub fn units(&self) -> &[Unit] {
        &self.contents.units
    }

    pub fn units_mut(&mut self) -> &mut Vec<Unit> {
        self.touch(FileKind::Units);
        &mut self.contents.units
    }

    pub fn doodads(&self) -> &[Doodad] {
        &self.contents.doodads.doodads
    }

    pub fn doodads_mut(&mut self) -> &mut Vec<Doodad> {
        self.touch(FileKind::Doodads);
        &mut self.contents.doodads.doodads
    }

    pub fn special_doodads(&self) -> &[SpecialDoodad] {
        &self.contents.doodads.special
    }

    pub fn special_doodads_mut(&mut self) -> &mut Vec<SpecialDoodad> {
        self.touch(FileKind::Doodads);
        &mut self.contents.doodads.special
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.contents.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut Vec<Camera> {
        self.touch(FileKind::Cameras);
        &mut self.contents.cameras
    }

    pub fn regions(&self) -> &[Region] {
        &self.contents.regions
    }

    pub fn regions_mut(&mut self) -> &mut Vec<Region> {
        self.touch(FileKind::Regions);
        &mut self.contents.regions
    }

    pub fn objects(&self, category: ObjectCategory) -> &ObjectModificationTable {
        &self.contents.objects[category.index()]
    }

    pub fn objects_mut(&mut self, category: ObjectCategory) -> &mut ObjectModificationTable {
        self.touch(FileKind::Objects(category));
        &mut self.contents.objects[category.index()]
    }

    pub fn skins(&self, category: ObjectCategory) -> &ObjectModificationTable {
        &self.contents.skins[category.index()]
    }

    pub fn skins_mut(&mut self, category: ObjectCategory) -> &mut ObjectModificationTable {
        self.touch(FileKind::Skins(category));
        &mut self.contents.skins[category.index()]
    }
}
