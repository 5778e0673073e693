//! CPU-side texture data: the particle sprite and the skybox cubemap.
//!
//! Images are decoded to RGBA8 here; [`crate::gpu`] uploads them. Loading
//! never panics, callers decide on a fallback when it fails.

use std::path::{Path, PathBuf};

use crate::error::AssetError;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    /// Wrap raw RGBA data.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not exactly `width * height * 4` bytes.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "RGBA data size mismatch"
        );
        Self { data, width, height }
    }

    /// Decode an image file (PNG or JPEG).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let img = image::open(path.as_ref())?.into_rgba8();
        let (width, height) = img.dimensions();
        log::debug!("decoded {} ({}x{})", path.as_ref().display(), width, height);
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
        })
    }

    /// Soft round sprite: white, with alpha falling off quadratically from
    /// the centre to zero at the edge of the inscribed circle.
    pub fn radial_sprite(size: u32) -> Self {
        let size = size.max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        let centre = (size as f32 - 1.0) * 0.5;
        let radius = (size as f32 * 0.5).max(f32::EPSILON);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - centre;
                let dy = y as f32 - centre;
                let r = (dx * dx + dy * dy).sqrt() / radius;
                let falloff = (1.0 - r).clamp(0.0, 1.0);
                let alpha = (falloff * falloff * 255.0).round() as u8;
                data.extend_from_slice(&[255, 255, 255, alpha]);
            }
        }
        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// Load the sprite at `path`, falling back to [`radial_sprite`](Self::radial_sprite).
    pub fn sprite_or_fallback(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(tex) => {
                log::info!("loaded sprite texture {}", path.display());
                tex
            }
            Err(e) => {
                log::warn!(
                    "sprite texture {} unavailable ({}), using generated sprite",
                    path.display(),
                    e
                );
                Self::radial_sprite(64)
            }
        }
    }

    /// RGBA at pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// Six square faces of equal size, in `+x, -x, +y, -y, +z, -z` order.
#[derive(Debug, Clone, PartialEq)]
pub struct CubemapData {
    pub faces: [TextureData; 6],
    /// Edge length of every face in pixels.
    pub size: u32,
}

impl CubemapData {
    /// Build from decoded faces, checking they are square and equal-sized.
    pub fn from_faces(faces: [TextureData; 6], paths: &[PathBuf; 6]) -> Result<Self, AssetError> {
        let expected = (faces[0].width, faces[0].width);
        for (face, path) in faces.iter().zip(paths) {
            let found = (face.width, face.height);
            if found != expected {
                return Err(AssetError::CubemapFaceMismatch {
                    path: path.clone(),
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            size: expected.0,
            faces,
        })
    }

    /// Decode the six face files.
    pub fn load(paths: &[PathBuf; 6]) -> Result<Self, AssetError> {
        let [px, nx, py, ny, pz, nz] = paths;
        let faces = [
            TextureData::from_file(px)?,
            TextureData::from_file(nx)?,
            TextureData::from_file(py)?,
            TextureData::from_file(ny)?,
            TextureData::from_file(pz)?,
            TextureData::from_file(nz)?,
        ];
        let cubemap = Self::from_faces(faces, paths)?;
        log::info!("loaded skybox ({}px faces)", cubemap.size);
        Ok(cubemap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(size: u32, v: u8) -> TextureData {
        TextureData::from_rgba(vec![v; (size * size * 4) as usize], size, size)
    }

    fn face_paths() -> [PathBuf; 6] {
        std::array::from_fn(|i| PathBuf::from(format!("face{i}.png")))
    }

    #[test]
    fn test_radial_sprite_falls_off() {
        let tex = TextureData::radial_sprite(33);
        assert_eq!(tex.data.len(), 33 * 33 * 4);
        let centre = tex.pixel(16, 16);
        let corner = tex.pixel(0, 0);
        assert_eq!(centre, [255, 255, 255, 255]);
        assert_eq!(corner[3], 0);
        let mid = tex.pixel(24, 16)[3];
        assert!(mid > 0 && mid < 255);
    }

    #[test]
    fn test_radial_sprite_zero_size() {
        let tex = TextureData::radial_sprite(0);
        assert_eq!((tex.width, tex.height), (1, 1));
    }

    #[test]
    #[should_panic(expected = "RGBA data size mismatch")]
    fn test_from_rgba_checks_size() {
        TextureData::from_rgba(vec![0; 3], 1, 1);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(TextureData::from_file("no/such/sprite.png").is_err());
    }

    #[test]
    fn test_sprite_fallback() {
        let tex = TextureData::sprite_or_fallback(Path::new("no/such/sprite.png"));
        assert_eq!((tex.width, tex.height), (64, 64));
    }

    #[test]
    fn test_cubemap_accepts_matching_faces() {
        let faces = std::array::from_fn(|i| solid(4, i as u8));
        let cube = CubemapData::from_faces(faces, &face_paths()).unwrap();
        assert_eq!(cube.size, 4);
    }

    #[test]
    fn test_cubemap_rejects_mismatched_face() {
        let faces = std::array::from_fn(|i| if i == 3 { solid(2, 0) } else { solid(4, 0) });
        match CubemapData::from_faces(faces, &face_paths()) {
            Err(AssetError::CubemapFaceMismatch { path, found, .. }) => {
                assert_eq!(path, PathBuf::from("face3.png"));
                assert_eq!(found, (2, 2));
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_cubemap_rejects_non_square() {
        let faces = std::array::from_fn(|_| TextureData::from_rgba(vec![0; 4 * 4 * 2], 4, 2));
        assert!(CubemapData::from_faces(faces, &face_paths()).is_err());
    }
}
