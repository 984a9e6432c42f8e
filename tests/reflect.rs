extern crate charcoal;
extern crate env_logger;

use charcoal::shader::{ShaderData, ShaderDataType, ShaderDomain, ShaderSource};
use charcoal::video::Rid;

fn parse(vs: &str, fs: &str) -> std::sync::Arc<ShaderData> {
    env_logger::try_init().ok();
    let source = ShaderSource::build().vertex(vs).fragment(fs).finish();
    ShaderData::parse(Rid::none(), source)
}

#[test]
fn std140_layout_of_parsed_uniforms() {
    let data = parse(
        "uniform float a;\nuniform vec3 b;\nuniform mat4 m;\nuniform float arr[4];",
        "",
    );

    let block = data.std140_layout();
    assert_eq!(block.item("a").unwrap().offset, 0);
    assert_eq!(block.item("b").unwrap().offset, 16);
    assert_eq!(block.item("m").unwrap().offset, 32);
    assert_eq!(block.item("arr").unwrap().offset, 96);

    assert_eq!(block.item("a").unwrap().stride, 4);
    assert_eq!(block.item("b").unwrap().stride, 12);
    assert_eq!(block.item("m").unwrap().stride, 64);
    assert_eq!(block.item("arr").unwrap().stride, 64);
}

#[test]
fn std140_offsets_respect_alignment() {
    let data = parse(
        "uniform bool flag;\nuniform vec2 uv;\nuniform vec3 normal;\nuniform mat3 rot;\nuniform float weights[3];",
        "uniform vec4 tint;",
    );

    let block = data.std140_layout();
    for item in block.items() {
        let alignment = item.ty.std140_alignment(item.count > 1);
        assert_eq!(
            item.offset % alignment,
            0,
            "{} is misaligned ({} % {})",
            item.name,
            item.offset,
            alignment
        );
    }
}

#[test]
fn identical_uniforms_merge_across_domains() {
    let data = parse("uniform vec4 tint;", "uniform vec4 tint;");

    assert_eq!(data.uniforms().len(), 1);
    let tint = data.find_uniform("tint").unwrap();
    assert!(tint.domains.contains(ShaderDomain::Vertex));
    assert!(tint.domains.contains(ShaderDomain::Fragment));
    assert_eq!(tint.ty, ShaderDataType::Vec4);
    assert_eq!(tint.count, 1);
}

#[test]
fn parsing_twice_yields_identical_layouts() {
    let vs = "struct Light { vec3 position; float intensity; };\n\
              uniform Light u_light;\nuniform mat4 u_model;\nuniform float u_weights[8];";
    let fs = "uniform sampler2D t_albedo;\nuniform mat4 u_model;";

    let lhs = parse(vs, fs);
    let rhs = parse(vs, fs);

    assert_eq!(lhs.uniforms().len(), rhs.uniforms().len());
    assert_eq!(lhs.uniforms().size(), rhs.uniforms().size());
    for (l, r) in lhs.uniforms().iter().zip(rhs.uniforms().iter()) {
        assert_eq!(l.name, r.name);
        assert_eq!(l.ty, r.ty);
        assert_eq!(l.count, r.count);
        assert_eq!(l.offset(), r.offset());
    }

    let (lblock, rblock) = (lhs.std140_layout(), rhs.std140_layout());
    assert_eq!(lblock.size(), rblock.size());
    for (l, r) in lblock.items().iter().zip(rblock.items().iter()) {
        assert_eq!(l, r);
    }
}

#[test]
fn samplers_take_sequential_registers() {
    let data = parse(
        "",
        "uniform sampler2D t_albedo;\nuniform sampler2D t_shadow[4];\nuniform samplerCube t_sky;",
    );

    let resources = data.resources();
    assert_eq!(resources.len(), 3);
    assert_eq!(resources[0].register, 0);
    assert_eq!(resources[1].register, 1);
    assert_eq!(resources[2].register, 5);
}

#[test]
fn comments_and_directives_do_not_confuse_the_parser() {
    let vs = "#version 450 core\n\
              // uniform float bogus;\n\
              /* uniform vec4 also_bogus; */\n\
              uniform float real;";
    let data = parse(vs, "");

    assert_eq!(data.uniforms().len(), 1);
    assert!(data.find_uniform("real").is_some());
}

#[test]
fn function_locals_are_not_uniforms() {
    let vs = "uniform float a;\nvoid main() { float local; vec3 tmp; }";
    let data = parse(vs, "");

    assert_eq!(data.uniforms().len(), 1);
}
