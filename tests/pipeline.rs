extern crate charcoal;
extern crate env_logger;

use charcoal::shader::{ShaderDataType, ShaderSource};
use charcoal::video::prelude::*;
use charcoal::window;
use charcoal::window::Window;
use charcoal::window::WindowParams;

fn headless() -> (Renderer, DeviceProbe) {
    env_logger::try_init().ok();
    let window = window::headless(WindowParams::default());
    Renderer::headless(window).unwrap()
}

fn flush(renderer: &Renderer) {
    renderer.advance().unwrap();
    renderer.advance().unwrap();
}

#[test]
fn triangle_setup() {
    let (renderer, probe) = headless();
    let ctx = renderer.context();

    let positions = [
        [0.0f32, 0.5, 0.0],
        [-0.5, -0.5, 0.0],
        [0.5, -0.5, 0.0],
    ];
    let layout = VertexLayout::build()
        .with("position", ShaderDataType::Vec3, false)
        .finish();

    let vbo = VertexBuffer::new(&ctx, &positions, layout, BufferUsage::Static);
    let mut vao = VertexArray::new(&ctx);
    vao.add_vertex_buffer(&vbo);

    flush(&renderer);

    // Exactly one VAO and one VBO on the render side.
    assert_eq!(probe.vertex_array_count(), 1);
    assert_eq!(probe.buffer_count(), 1);

    // One attribute was configured, and the buffer carries the vertex bytes.
    let state = probe.vertex_array(vao.rid()).unwrap();
    assert_eq!(state.attrib_index, 1);
    assert_eq!(state.vertex_buffers, 1);
    assert_eq!(probe.buffer(vbo.rid()).unwrap().len, 36);

    // And one vertex buffer on the main side.
    assert_eq!(vao.vertex_buffers().len(), 1);
}

#[test]
fn index_buffer_attaches() {
    let (renderer, probe) = headless();
    let ctx = renderer.context();

    let layout = VertexLayout::build()
        .with("position", ShaderDataType::Vec2, false)
        .finish();
    let vbo = VertexBuffer::new(&ctx, &[[0.0f32, 0.0]; 4], layout, BufferUsage::Static);
    let ibo = IndexBuffer::new(&ctx, &[0, 1, 2, 2, 3, 0]);

    let mut vao = VertexArray::new(&ctx);
    vao.add_vertex_buffer(&vbo);
    vao.set_index_buffer(&ibo);

    flush(&renderer);

    let state = probe.vertex_array(vao.rid()).unwrap();
    assert_eq!(state.index_buffer, Some(ibo.rid().raw()));
    assert_eq!(vao.index_buffer(), Some(ibo.rid()));
    assert_eq!(ibo.count(), 6);
}

#[test]
fn registry_empties_once_creation_executes() {
    let (renderer, _probe) = headless();
    let ctx = renderer.context();

    let layout = VertexLayout::build()
        .with("position", ShaderDataType::Vec3, false)
        .finish();
    let vbo = VertexBuffer::new(&ctx, &[[0.0f32; 3]; 3], layout, BufferUsage::Static);
    let mut vao = VertexArray::new(&ctx);
    vao.add_vertex_buffer(&vbo);

    assert!(ctx.registry().pending_len() > 0);

    flush(&renderer);

    // Creation and attach commands executed and released every id they
    // carried.
    assert!(!ctx.registry().is_pending(vbo.rid()));
    assert!(!ctx.registry().is_pending(vao.rid()));
    assert_eq!(ctx.registry().pending_len(), 0);
}

#[test]
fn dropping_wrappers_deletes_render_side_objects() {
    let (renderer, probe) = headless();
    let ctx = renderer.context();

    let layout = VertexLayout::build()
        .with("position", ShaderDataType::Vec3, false)
        .finish();

    {
        let _vbo = VertexBuffer::new(&ctx, &[[0.0f32; 3]; 3], layout, BufferUsage::Static);
        let _vao = VertexArray::new(&ctx);
        flush(&renderer);
        assert_eq!(probe.buffer_count(), 1);
        assert_eq!(probe.vertex_array_count(), 1);
    }

    // The wrappers queued their deletions on drop.
    flush(&renderer);
    assert_eq!(probe.buffer_count(), 0);
    assert_eq!(probe.vertex_array_count(), 0);
}

#[test]
fn program_uploads_present_uniform_slots() {
    let (renderer, probe) = headless();
    let ctx = renderer.context();

    let source = ShaderSource::build()
        .vertex("uniform mat4 u_model;\nuniform vec4 u_tint;\nvoid main() {}")
        .fragment("uniform vec4 u_tint;\nvoid main() {}")
        .finish();

    let program = Program::new(&ctx, source);
    program.bind();

    let mut writer = program.writer();
    writer.set("u_tint", [1.0f32, 0.0, 0.0, 1.0]);
    program.upload_uniforms(&writer);

    flush(&renderer);

    let state = probe.program(program.rid()).unwrap();
    assert!(state.loaded);
    assert_eq!(state.uniform_count, 2);
    // Only the slot that was set uploads.
    assert_eq!(state.uploads, 1);
}

#[test]
fn shutdown_drains_pending_commands() {
    let (renderer, probe) = headless();

    // Recorded but never advanced; dropping the renderer must still drain
    // it before the render thread exits.
    renderer.set_clear_color(0.25, 0.5, 0.75, 1.0);
    drop(renderer);

    assert_eq!(probe.clear_color(), [0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn clear_rides_the_queue() {
    let (renderer, probe) = headless();

    renderer.set_clear_color(0.0, 0.0, 0.0, 1.0);
    renderer.clear();
    flush(&renderer);

    let ops: Vec<&'static str> = probe.log().iter().map(|v| v.0).collect();
    assert_eq!(ops, vec!["set_clear_color", "clear"]);
}

#[test]
fn window_destroy_is_idempotent() {
    let window = window::headless(WindowParams::default());
    window.destroy();
    window.destroy();
}
