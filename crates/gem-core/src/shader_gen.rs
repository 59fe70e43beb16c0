//! Turns facet planes into WGSL snippets and instantiates shader templates.
//!
//! Templates mark insertion points as `#INJECT(NAME)`. Generation is pure:
//! it depends only on the facets and the ray depth, never on a GPU context.

use crate::error::ShaderError;
use crate::gemstone::Facet;
use glam::Vec3;
use std::collections::BTreeMap;

pub const FACETS_DEFINITION: &str = "FACETS_DEFINITION";
pub const COMPUTE_ENTRY_POINT: &str = "COMPUTE_ENTRY_POINT";
pub const CHECK_IF_INSIDE: &str = "CHECK_IF_INSIDE";
pub const COMPUTE_INTERNAL_INTERSECTION: &str = "COMPUTE_INTERNAL_INTERSECTION";
pub const RAY_DEPTH: &str = "RAY_DEPTH";

pub const VERTEX_TEMPLATE: &str = "gem.vert.wgsl";
pub const FRAGMENT_TEMPLATE: &str = "gem.frag.wgsl";

pub static GEM_VERT_WGSL: &str = include_str!("../shaders/gem.vert.wgsl");
pub static GEM_FRAG_WGSL: &str = include_str!("../shaders/gem.frag.wgsl");

const INVOCATION_SEPARATOR: &str = "\n        ";
const INSIDE_SEPARATOR: &str = " && ";
const MARKER_OPEN: &str = "#INJECT(";

/// Placeholder name → substitution text.
pub type Injected = BTreeMap<&'static str, String>;

/// The four per-facet snippets, already joined.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetSnippets {
    pub facets_definition: String,
    pub compute_entry_point: String,
    pub check_if_inside: String,
    pub compute_internal_intersection: String,
}

pub fn facet_snippets(facets: &[Facet]) -> FacetSnippets {
    let mut definitions = Vec::with_capacity(2 * facets.len());
    let mut entry = Vec::with_capacity(facets.len());
    let mut inside = Vec::with_capacity(facets.len());
    let mut internal = Vec::with_capacity(facets.len());

    for (i, facet) in facets.iter().enumerate() {
        let point = format!("FACET_{i}_POINT");
        let normal = format!("FACET_{i}_NORMAL");

        definitions.push(format!("const {point}: vec3<f32> = {};", vec3_literal(facet.point)));
        definitions.push(format!("const {normal}: vec3<f32> = {};", vec3_literal(facet.normal)));
        entry.push(format!(
            "entry_intersection({point}, {normal}, eye_position, from_eye, &theta, &facet_normal);"
        ));
        inside.push(format!("is_inside({point}, {normal}, entry_point)"));
        internal.push(format!(
            "exit_intersection({point}, {normal}, position, direction, &theta, &facet_normal);"
        ));
    }

    FacetSnippets {
        facets_definition: definitions.join("\n"),
        compute_entry_point: entry.join(INVOCATION_SEPARATOR),
        check_if_inside: inside.join(INSIDE_SEPARATOR),
        compute_internal_intersection: internal.join(INVOCATION_SEPARATOR),
    }
}

/// Full substitution map for the gem templates.
pub fn generate(facets: &[Facet], ray_depth: u32) -> Injected {
    let snippets = facet_snippets(facets);
    let mut injected = Injected::new();
    injected.insert(FACETS_DEFINITION, snippets.facets_definition);
    injected.insert(COMPUTE_ENTRY_POINT, snippets.compute_entry_point);
    injected.insert(CHECK_IF_INSIDE, snippets.check_if_inside);
    injected.insert(
        COMPUTE_INTERNAL_INTERSECTION,
        snippets.compute_internal_intersection,
    );
    injected.insert(RAY_DEPTH, ray_depth.to_string());
    injected
}

pub fn template_source(id: &str) -> Result<&'static str, ShaderError> {
    match id {
        VERTEX_TEMPLATE => Ok(GEM_VERT_WGSL),
        FRAGMENT_TEMPLATE => Ok(GEM_FRAG_WGSL),
        other => Err(ShaderError::UnknownTemplate(other.to_string())),
    }
}

/// Replace every `#INJECT(NAME)` marker in `template` with `injected[NAME]`.
pub fn instantiate(template: &str, injected: &Injected) -> Result<String, ShaderError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0usize;
    while let Some(start) = rest.find(MARKER_OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + MARKER_OPEN.len()..];
        let end = after
            .find(')')
            .ok_or(ShaderError::MalformedMarker(offset + start))?;
        let name = after[..end].trim();
        let value = injected
            .get(name)
            .ok_or_else(|| ShaderError::MissingPlaceholder(name.to_string()))?;
        out.push_str(value);
        let consumed = start + MARKER_OPEN.len() + end + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

#[inline]
fn vec3_literal(v: Vec3) -> String {
    format!("vec3<f32>({:?}, {:?}, {:?})", v.x, v.y, v.z)
}
