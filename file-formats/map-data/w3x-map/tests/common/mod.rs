//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;
use w3_data::FourCC;
use w3x_map::{
    DoodadPlacements, DoodadsTranslator, InfoTranslator, MapInfo, Terrain, TerrainTranslator,
    Translator, UnitsTranslator,
};

pub fn code(s: &str) -> FourCC {
    s.parse().expect("valid type code")
}

/// A 64x64 Lordaeron terrain with two ground textures and one cliff.
pub fn sample_terrain() -> Terrain {
    let mut terrain = Terrain::flat('L', 64, 64);
    terrain.tile_palette = vec![code("Ldrt"), code("Lgrs")];
    terrain.cliff_palette = vec![code("CLdi")];
    terrain.map.offset = [-4096.0, -4096.0];
    terrain.ground_texture.set(10, 12, 1);
    terrain.ground_height.set(10, 12, 0x2100);
    terrain
}

/// Write the four required files of a map into `dir`.
pub fn write_minimal_map(dir: &Path) {
    let files = [
        (
            "war3map.w3i",
            InfoTranslator
                .encode(&MapInfo::default())
                .expect("encode info"),
        ),
        (
            "war3map.w3e",
            TerrainTranslator
                .encode(&sample_terrain())
                .expect("encode terrain"),
        ),
        (
            "war3mapUnits.doo",
            UnitsTranslator.encode(&Vec::new()).expect("encode units"),
        ),
        (
            "war3map.doo",
            DoodadsTranslator
                .encode(&DoodadPlacements::default())
                .expect("encode doodads"),
        ),
    ];
    for (name, bytes) in files {
        std::fs::write(dir.join(name), bytes).expect("write map file");
    }
}

/// A temporary directory holding a minimal map.
pub fn minimal_map() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_minimal_map(dir.path());
    dir
}

/// Every file in `dir` with its contents, sorted by name.
pub fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .expect("read map dir")
        .map(|entry| {
            let entry = entry.expect("dir entry");
            (
                entry.file_name().to_string_lossy().into_owned(),
                std::fs::read(entry.path()).expect("read map file"),
            )
        })
        .collect();
    files.sort();
    files
}
