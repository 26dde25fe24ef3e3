//! In-memory GLB documents for tests.

use glam::Vec3;
use serde_json::json;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

pub struct CubeFixture {
    /// Half the edge length along each axis.
    pub half_extent: Vec3,
    pub translation: Vec3,
    pub material: Option<&'static str>,
}

impl Default for CubeFixture {
    fn default() -> Self {
        Self {
            half_extent: Vec3::ONE,
            translation: Vec3::ZERO,
            material: None,
        }
    }
}

/// A box centered on its node origin, as a single-node GLB without normals.
pub fn cube_glb(fixture: &CubeFixture) -> Vec<u8> {
    let h = fixture.half_extent;
    let positions: Vec<[f32; 3]> = (0..8)
        .map(|i| {
            [
                if i & 1 == 0 { -h.x } else { h.x },
                if i & 2 == 0 { -h.y } else { h.y },
                if i & 4 == 0 { -h.z } else { h.z },
            ]
        })
        .collect();

    #[rustfmt::skip]
    let indices: [u32; 36] = [
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ];

    let mut bin: Vec<u8> = bytemuck::cast_slice(&positions).to_vec();
    let positions_len = bin.len();
    bin.extend_from_slice(bytemuck::cast_slice(&indices));

    let mut primitive = json!({
        "attributes": { "POSITION": 0 },
        "indices": 1,
    });

    let mut document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{
            "name": "Cube node",
            "mesh": 0,
            "translation": fixture.translation.to_array(),
        }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": positions_len },
            { "buffer": 0, "byteOffset": positions_len, "byteLength": bin.len() - positions_len },
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": 8,
                "type": "VEC3",
                "min": (-h).to_array(),
                "max": h.to_array(),
            },
            {
                "bufferView": 1,
                "componentType": 5125,
                "count": indices.len(),
                "type": "SCALAR",
            },
        ],
    });

    if let Some(name) = fixture.material {
        primitive["material"] = json!(0);
        document["materials"] = json!([{
            "name": name,
            "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] },
        }]);
    }

    document["meshes"] = json!([{ "name": "Cube", "primitives": [primitive] }]);

    glb(&document.to_string(), &bin)
}

fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json_chunk = json.as_bytes().to_vec();
    while json_chunk.len() % 4 != 0 {
        json_chunk.push(b' ');
    }

    let mut bin_chunk = bin.to_vec();
    while bin_chunk.len() % 4 != 0 {
        bin_chunk.push(0);
    }

    let total_len = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();

    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(GLB_MAGIC);
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total_len as u32).to_le_bytes());

    out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json_chunk);

    out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(&bin_chunk);

    out
}
