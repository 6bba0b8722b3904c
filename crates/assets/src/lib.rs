//! Asset loading: content-addressed mesh and texture handles.
//!
//! Assets are identified by a hash of their bytes, so loading the same file
//! twice (or two identical files) yields the same handle. Scene objects and
//! renderers hold handles, never paths.
//!
//! Geometry and pixel decoding belong to the rendering backend; the store
//! records what the runtime needs to reason about an asset (name, size,
//! physics kind, element counts).

use cadence_common::PhysicsCategory;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Content-addressed asset ID computed from the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// Handle to a loaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub AssetId);

/// Handle to a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub AssetId);

/// How a mesh will be used by physics when a collision shape is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshPhysicsKind {
    /// Purely visual.
    None,
    /// Static walkable geometry.
    Terrain,
    /// A moving character.
    Entity,
}

impl MeshPhysicsKind {
    /// The collision category objects built from this mesh usually get.
    pub fn category(self) -> PhysicsCategory {
        match self {
            Self::None => PhysicsCategory::Unclassified,
            Self::Terrain => PhysicsCategory::Terrain,
            Self::Entity => PhysicsCategory::Person,
        }
    }
}

/// Mesh metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub source: Option<PathBuf>,
    pub physics_kind: MeshPhysicsKind,
    pub vertex_count: u32,
    pub face_count: u32,
}

/// Encoded image format, sniffed from the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFormat {
    Png,
    Jpeg,
    Unknown,
}

/// Texture metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub name: String,
    pub source: Option<PathBuf>,
    pub format: TextureFormat,
    pub byte_len: u64,
}

/// An asset entry in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Asset {
    Mesh(Mesh),
    Texture(Texture),
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is empty", .0.display())]
    Empty(PathBuf),
    #[error("{} is not a usable mesh: {reason}", .path.display())]
    BadMesh { path: PathBuf, reason: String },
}

/// Content-addressed asset store.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: BTreeMap<AssetId, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a Wavefront OBJ mesh. Only element counts are extracted; the
    /// render backend uploads the geometry itself.
    pub fn load_mesh(
        &mut self,
        path: impl AsRef<Path>,
        physics_kind: MeshPhysicsKind,
    ) -> Result<MeshHandle, AssetError> {
        let path = path.as_ref();
        let bytes = read_non_empty(path)?;
        let text = String::from_utf8_lossy(&bytes);

        let mut vertex_count = 0u32;
        let mut face_count = 0u32;
        for line in text.lines() {
            let mut words = line.split_whitespace();
            match words.next() {
                Some("v") => vertex_count += 1,
                Some("f") => face_count += 1,
                _ => {}
            }
        }
        if vertex_count == 0 {
            return Err(AssetError::BadMesh {
                path: path.to_path_buf(),
                reason: "no vertices".into(),
            });
        }

        let id = content_hash(&[
            b"mesh".as_slice(),
            bytes.as_slice(),
            [physics_kind as u8].as_slice(),
        ]);
        let mesh = Mesh {
            name: file_name(path),
            source: Some(path.to_path_buf()),
            physics_kind,
            vertex_count,
            face_count,
        };
        tracing::debug!(
            path = %path.display(),
            vertex_count,
            face_count,
            "mesh loaded"
        );
        self.assets.insert(id, Asset::Mesh(mesh));
        Ok(MeshHandle(id))
    }

    /// Load a texture file.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> Result<TextureHandle, AssetError> {
        let path = path.as_ref();
        let bytes = read_non_empty(path)?;
        let format = sniff_format(&bytes);
        let id = content_hash(&[b"texture".as_slice(), bytes.as_slice()]);
        let texture = Texture {
            name: file_name(path),
            source: Some(path.to_path_buf()),
            format,
            byte_len: bytes.len() as u64,
        };
        tracing::debug!(path = %path.display(), ?format, "texture loaded");
        self.assets.insert(id, Asset::Texture(texture));
        Ok(TextureHandle(id))
    }

    /// Register the built-in unit cube (24 vertices, 12 triangles).
    pub fn builtin_cube(&mut self, physics_kind: MeshPhysicsKind) -> MeshHandle {
        let id = content_hash(&[
            b"mesh".as_slice(),
            b"builtin:unit_cube".as_slice(),
            [physics_kind as u8].as_slice(),
        ]);
        self.assets.entry(id).or_insert_with(|| {
            Asset::Mesh(Mesh {
                name: "unit_cube".into(),
                source: None,
                physics_kind,
                vertex_count: 24,
                face_count: 12,
            })
        });
        MeshHandle(id)
    }

    /// Register the built-in 1x1 white texture.
    pub fn builtin_white(&mut self) -> TextureHandle {
        let id = content_hash(&[b"texture".as_slice(), b"builtin:white".as_slice()]);
        self.assets.entry(id).or_insert_with(|| {
            Asset::Texture(Texture {
                name: "white".into(),
                source: None,
                format: TextureFormat::Unknown,
                byte_len: 4,
            })
        });
        TextureHandle(id)
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        match self.assets.get(&handle.0) {
            Some(Asset::Mesh(m)) => Some(m),
            _ => None,
        }
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        match self.assets.get(&handle.0) {
            Some(Asset::Texture(t)) => Some(t),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

fn read_non_empty(path: &Path) -> Result<Vec<u8>, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(AssetError::Empty(path.to_path_buf()));
    }
    Ok(bytes)
}

fn file_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".into())
}

fn sniff_format(bytes: &[u8]) -> TextureFormat {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        TextureFormat::Png
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        TextureFormat::Jpeg
    } else {
        TextureFormat::Unknown
    }
}

fn content_hash(parts: &[&[u8]]) -> AssetId {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TRIANGLE_OBJ: &str = "# triangle\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1 2 3\n";

    fn write_temp(contents: &[u8], suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn load_mesh_counts_elements() {
        let file = write_temp(TRIANGLE_OBJ.as_bytes(), ".obj");
        let mut store = AssetStore::new();
        let handle = store.load_mesh(file.path(), MeshPhysicsKind::Entity).unwrap();
        let mesh = store.mesh(handle).unwrap();
        assert_eq!(mesh.vertex_count, 3);
        assert_eq!(mesh.face_count, 1);
        assert_eq!(mesh.physics_kind, MeshPhysicsKind::Entity);
    }

    #[test]
    fn identical_content_dedups() {
        let a = write_temp(TRIANGLE_OBJ.as_bytes(), ".obj");
        let b = write_temp(TRIANGLE_OBJ.as_bytes(), ".obj");
        let mut store = AssetStore::new();
        let ha = store.load_mesh(a.path(), MeshPhysicsKind::Entity).unwrap();
        let hb = store.load_mesh(b.path(), MeshPhysicsKind::Entity).unwrap();
        assert_eq!(ha, hb);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn physics_kind_is_part_of_identity() {
        let file = write_temp(TRIANGLE_OBJ.as_bytes(), ".obj");
        let mut store = AssetStore::new();
        let entity = store.load_mesh(file.path(), MeshPhysicsKind::Entity).unwrap();
        let terrain = store.load_mesh(file.path(), MeshPhysicsKind::Terrain).unwrap();
        assert_ne!(entity, terrain);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut store = AssetStore::new();
        let err = store
            .load_texture("/definitely/not/here.png")
            .unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn mesh_without_vertices_is_rejected() {
        let file = write_temp(b"# nothing here\n", ".obj");
        let mut store = AssetStore::new();
        let err = store.load_mesh(file.path(), MeshPhysicsKind::None).unwrap_err();
        assert!(matches!(err, AssetError::BadMesh { .. }));
    }

    #[test]
    fn empty_texture_is_rejected() {
        let file = write_temp(b"", ".png");
        let mut store = AssetStore::new();
        assert!(matches!(
            store.load_texture(file.path()),
            Err(AssetError::Empty(_))
        ));
    }

    #[test]
    fn texture_format_is_sniffed() {
        let png = write_temp(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A], ".png");
        let mut store = AssetStore::new();
        let handle = store.load_texture(png.path()).unwrap();
        let tex = store.texture(handle).unwrap();
        assert_eq!(tex.format, TextureFormat::Png);
        assert_eq!(tex.byte_len, 6);
        assert!(store.mesh(MeshHandle(handle.0)).is_none());
    }

    #[test]
    fn builtins_are_stable() {
        let mut store = AssetStore::new();
        let a = store.builtin_cube(MeshPhysicsKind::Entity);
        let b = store.builtin_cube(MeshPhysicsKind::Entity);
        assert_eq!(a, b);
        store.builtin_white();
        assert_eq!(store.len(), 2);
        assert_eq!(
            MeshPhysicsKind::Terrain.category(),
            PhysicsCategory::Terrain
        );
    }
}
