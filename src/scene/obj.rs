use std::path::Path;

use glam::{Vec2, Vec3};

use crate::scene::{ImportError, ImportedMaterial, ImportedMesh, ImportedScene, SceneNode, Topology};

/// Loads a Wavefront OBJ file and its material libraries. Each object becomes
/// a child node of an empty root, owning exactly one mesh.
pub fn import(path: &Path) -> Result<ImportedScene, ImportError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| ImportError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let mut materials: Vec<ImportedMaterial> = match materials {
        Ok(materials) => materials
            .into_iter()
            .map(|material| ImportedMaterial {
                name: material.name,
                diffuse: material.diffuse_texture.into_iter().collect(),
                specular: material.specular_texture.into_iter().collect(),
            })
            .collect(),
        Err(error) => {
            log::warn!(
                "could not load the materials of '{}': {error}",
                path.display()
            );
            Vec::new()
        }
    };
    // Meshes without a usable material share an untextured default one.
    let default_material = materials.len();
    materials.push(ImportedMaterial {
        name: "default".into(),
        ..Default::default()
    });

    let mut meshes = Vec::with_capacity(models.len());
    let mut children = Vec::with_capacity(models.len());
    for model in models {
        let mesh = model.mesh;
        let material = mesh
            .material_id
            .filter(|&id| id < default_material)
            .unwrap_or(default_material);
        let positions = mesh
            .positions
            .chunks_exact(3)
            .map(Vec3::from_slice)
            .collect::<Vec<_>>();
        let normals = mesh
            .normals
            .chunks_exact(3)
            .map(Vec3::from_slice)
            .collect::<Vec<_>>();
        let tex_coords = mesh
            .texcoords
            .chunks_exact(2)
            .map(Vec2::from_slice)
            .collect::<Vec<_>>();

        children.push(SceneNode::new(model.name.clone(), vec![meshes.len()], Vec::new()));
        meshes.push(ImportedMesh {
            name: model.name,
            positions,
            normals,
            tex_coords,
            topology: Topology::Triangles,
            indices: mesh.indices,
            material,
        });
    }

    Ok(ImportedScene {
        root: SceneNode::new("root", Vec::new(), children),
        meshes,
        materials,
        embedded_textures: Vec::new(),
    })
}
