//! Camera presets (`war3map.w3c`).

use w3_data::{W3Reader, W3Vec, W3Writer};

use crate::error::Result;
use crate::translator::{Diagnostic, Translator};

pub const CAMERAS_FILE: &str = "war3map.w3c";

const CAMERAS_VERSION: i32 = 0;

/// Near clipping distance used when a camera does not set one.
pub const DEFAULT_NEAR_CLIPPING: f32 = 16.0;

/// A camera preset as placed in the editor.
///
/// Fields wrapped in `Option` may be left unset; they are written with
/// their default value (`0`, or [`DEFAULT_NEAR_CLIPPING`] for the near
/// clipping plane). Decoding always fills them in.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Camera {
    pub target: [f32; 2],
    pub offset_z: f32,
    pub rotation: Option<f32>,
    /// Angle of attack
    pub aoa: f32,
    pub distance: f32,
    pub roll: Option<f32>,
    /// Field of view
    pub fov: f32,
    pub far_clipping: f32,
    pub near_clipping: Option<f32>,
    pub local_pitch: Option<f32>,
    pub local_yaw: Option<f32>,
    pub local_roll: Option<f32>,
    pub name: String,
}

/// Codec for the camera list.
#[derive(Debug, Clone, Copy, Default)]
pub struct CamerasTranslator;

impl Translator for CamerasTranslator {
    type Model = Vec<Camera>;

    fn label(&self) -> &'static str {
        CAMERAS_FILE
    }

    fn read(
        &self,
        reader: &mut W3Reader<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<Camera>> {
        let offset = reader.position();
        let version = reader.read_i32()?;
        if version != CAMERAS_VERSION {
            diagnostics.push(Diagnostic::new(
                offset,
                format!("unexpected camera file version {version}"),
            ));
        }

        let count = reader.read_count()?;
        let mut cameras = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            cameras.push(Camera {
                target: [reader.read_f32()?, reader.read_f32()?],
                offset_z: reader.read_f32()?,
                rotation: Some(reader.read_f32()?),
                aoa: reader.read_f32()?,
                distance: reader.read_f32()?,
                roll: Some(reader.read_f32()?),
                fov: reader.read_f32()?,
                far_clipping: reader.read_f32()?,
                near_clipping: Some(reader.read_f32()?),
                local_pitch: Some(reader.read_f32()?),
                local_yaw: Some(reader.read_f32()?),
                local_roll: Some(reader.read_f32()?),
                name: reader.read_cstring()?,
            });
        }
        Ok(cameras)
    }

    fn write(&self, cameras: &Vec<Camera>, writer: &mut W3Writer) -> Result<()> {
        writer.write_i32(CAMERAS_VERSION);
        writer.write_count(cameras.len())?;
        for camera in cameras {
            writer.write_f32(camera.target[0]);
            writer.write_f32(camera.target[1]);
            writer.write_f32(camera.offset_z);
            writer.write_f32(camera.rotation.unwrap_or(0.0));
            writer.write_f32(camera.aoa);
            writer.write_f32(camera.distance);
            writer.write_f32(camera.roll.unwrap_or(0.0));
            writer.write_f32(camera.fov);
            writer.write_f32(camera.far_clipping);
            writer.write_f32(camera.near_clipping.unwrap_or(DEFAULT_NEAR_CLIPPING));
            writer.write_f32(camera.local_pitch.unwrap_or(0.0));
            writer.write_f32(camera.local_yaw.unwrap_or(0.0));
            writer.write_f32(camera.local_roll.unwrap_or(0.0));
            writer.write_cstring(&camera.name)?;
        }
        Ok(())
    }
}
