// Host-side tests for facet → WGSL snippet generation and template instantiation.

use gem_core::shader_gen::*;
use gem_core::{Cut, Facet, Gemstone, ShaderError};
use glam::Vec3;

fn sample_facets(n: usize) -> Vec<Facet> {
    (0..n)
        .map(|i| {
            let a = i as f32;
            Facet::new(Vec3::new(a, 0.5, -a), Vec3::new(0.0, 1.0, 0.0))
        })
        .collect()
}

#[test]
fn n_facets_produce_n_lines_of_each_kind() {
    for n in [1usize, 2, 7, 25] {
        let s = facet_snippets(&sample_facets(n));

        let defs: Vec<&str> = s.facets_definition.lines().collect();
        assert_eq!(defs.len(), 2 * n);
        assert_eq!(defs.iter().filter(|l| l.contains("_POINT: vec3<f32>")).count(), n);
        assert_eq!(defs.iter().filter(|l| l.contains("_NORMAL: vec3<f32>")).count(), n);

        assert_eq!(s.compute_entry_point.lines().count(), n);
        assert_eq!(s.compute_entry_point.matches("entry_intersection(").count(), n);
        assert_eq!(s.compute_internal_intersection.lines().count(), n);
        assert_eq!(
            s.compute_internal_intersection.matches("exit_intersection(").count(),
            n
        );

        assert_eq!(s.check_if_inside.matches("is_inside(").count(), n);
        assert_eq!(s.check_if_inside.matches("&&").count(), n - 1);
    }
}

#[test]
fn zero_facets_give_empty_snippets() {
    let s = facet_snippets(&[]);
    assert_eq!(s, FacetSnippets::default());
    assert!(s.facets_definition.is_empty());
    assert!(s.compute_entry_point.is_empty());
    assert!(s.check_if_inside.is_empty());
    assert!(s.compute_internal_intersection.is_empty());
}

#[test]
fn names_follow_facet_index() {
    let s = facet_snippets(&sample_facets(3));
    let defs: Vec<&str> = s.facets_definition.lines().collect();
    assert_eq!(
        defs[0],
        "const FACET_0_POINT: vec3<f32> = vec3<f32>(0.0, 0.5, -0.0);"
    );
    assert_eq!(
        defs[1],
        "const FACET_0_NORMAL: vec3<f32> = vec3<f32>(0.0, 1.0, 0.0);"
    );
    assert!(defs[4].starts_with("const FACET_2_POINT"));
    assert_eq!(
        s.check_if_inside,
        "is_inside(FACET_0_POINT, FACET_0_NORMAL, entry_point) && \
         is_inside(FACET_1_POINT, FACET_1_NORMAL, entry_point) && \
         is_inside(FACET_2_POINT, FACET_2_NORMAL, entry_point)"
    );
}

#[test]
fn invocations_are_indented_after_the_first_line() {
    let s = facet_snippets(&sample_facets(2));
    let lines: Vec<&str> = s.compute_entry_point.lines().collect();
    assert!(lines[0].starts_with("entry_intersection("));
    assert!(lines[1].starts_with("        entry_intersection("));
}

#[test]
fn generate_fills_every_placeholder() {
    let injected = generate(&sample_facets(4), 6);
    let keys: Vec<&str> = injected.keys().copied().collect();
    assert_eq!(
        keys,
        vec![
            CHECK_IF_INSIDE,
            COMPUTE_ENTRY_POINT,
            COMPUTE_INTERNAL_INTERSECTION,
            FACETS_DEFINITION,
            RAY_DEPTH
        ]
    );
    assert_eq!(injected[RAY_DEPTH], "6");
}

#[test]
fn instantiate_replaces_markers() {
    let mut injected = Injected::new();
    injected.insert("A", "1".to_string());
    injected.insert("B", "two".to_string());
    let out = instantiate("x=#INJECT(A); y=#INJECT( B ); z=#INJECT(A)", &injected).unwrap();
    assert_eq!(out, "x=1; y=two; z=1");
}

#[test]
fn instantiate_rejects_missing_placeholder() {
    let err = instantiate("#INJECT(NOPE)", &Injected::new()).unwrap_err();
    assert_eq!(err, ShaderError::MissingPlaceholder("NOPE".to_string()));
}

#[test]
fn unknown_template_is_an_error() {
    assert_eq!(
        template_source("shader.glsl"),
        Err(ShaderError::UnknownTemplate("shader.glsl".to_string()))
    );
    assert!(template_source(VERTEX_TEMPLATE).is_ok());
    assert!(template_source(FRAGMENT_TEMPLATE).is_ok());
}

#[test]
fn fragment_template_instantiates_for_a_brilliant_cut() {
    let gem = Gemstone::brilliant(&Cut::default());
    let injected = generate(&gem.facets, 4);
    let frag = instantiate(GEM_FRAG_WGSL, &injected).unwrap();
    assert!(frag.contains("const RAY_DEPTH: i32 = 4;"));
    assert!(frag.contains("const FACET_0_POINT"));
    assert_eq!(frag.matches("is_inside(FACET_").count(), gem.facets.len());
    assert!(!frag.contains("#INJECT"));
}
