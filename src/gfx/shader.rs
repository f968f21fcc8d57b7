//! Shader interface shared by every graphics backend
//!
//! The names below are the contract between the scene and a compiled program. A
//! backend reports a name as present only if its program actually declares it.

/// Vertex position attribute (xyz)
pub const A_POSITION: &str = "a_Position";
/// Per-vertex color attribute (rgb)
pub const A_COLOR: &str = "a_Color";
/// Per-vertex normal attribute (xyz)
pub const A_NORMAL: &str = "a_Normal";
/// Texture coordinate attribute (uv)
pub const A_TEX_COORDS: &str = "a_TexCoords";

pub const U_MODEL_MATRIX: &str = "u_ModelMatrix";
pub const U_MVP_MATRIX: &str = "u_MVPMatrix";
pub const U_NORMAL_MATRIX: &str = "u_NormalMatrix";
pub const U_LIGHT_COLOR: &str = "u_LightColor";
pub const U_LIGHT_POSITION: &str = "u_LightPosition";
pub const U_AMBIENT_LIGHT: &str = "u_AmbientLight";
pub const U_IS_LIGHTING: &str = "u_IsLighting";
pub const U_USE_TEXTURES: &str = "u_UseTextures";
/// Sampler bound to texture unit 0
pub const U_SAMPLER: &str = "u_Sampler";

/// Attributes in shader location order
pub const ATTRIBUTES: [&str; 4] = [A_POSITION, A_COLOR, A_NORMAL, A_TEX_COORDS];

pub const UNIFORMS: [&str; 9] = [
    U_MODEL_MATRIX,
    U_MVP_MATRIX,
    U_NORMAL_MATRIX,
    U_LIGHT_COLOR,
    U_LIGHT_POSITION,
    U_AMBIENT_LIGHT,
    U_IS_LIGHTING,
    U_USE_TEXTURES,
    U_SAMPLER,
];

/// WGSL vertex stage of the scene program
pub const VERTEX_SHADER: &str = include_str!("shaders/scene_vertex.wgsl");
/// WGSL fragment stage of the scene program
pub const FRAGMENT_SHADER: &str = include_str!("shaders/scene_fragment.wgsl");

/// Names from `candidates` that occur as identifiers in any of `sources`
pub fn declared_names<'a>(candidates: &[&'a str], sources: &[&str]) -> Vec<&'a str> {
    candidates
        .iter()
        .copied()
        .filter(|name| sources.iter().any(|source| declares(source, name)))
        .collect()
}

fn declares(source: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    source.match_indices(name).any(|(start, _)| {
        let before = source[..start].chars().next_back();
        let after = source[start + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}
