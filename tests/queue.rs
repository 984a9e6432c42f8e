extern crate charcoal;
extern crate env_logger;
extern crate rand;

use charcoal::video::command::{DrawCall, Primitive, RenderCommand};
use charcoal::video::state::RenderState;
use charcoal::video::{Renderer, Rid};
use charcoal::window;
use charcoal::window::WindowParams;

fn headless() -> (Renderer, charcoal::video::prelude::DeviceProbe) {
    env_logger::try_init().ok();
    let window = window::headless(WindowParams::default());
    Renderer::headless(window).unwrap()
}

/// Waits until everything submitted before the call has been drained.
fn flush(renderer: &Renderer) {
    renderer.advance().unwrap();
    renderer.advance().unwrap();
}

fn marker(renderer: &Renderer) -> Rid {
    renderer.context().registry().allocate()
}

fn submit_marker(renderer: &Renderer, rid: Rid) {
    // Binding an id the device never saw still logs an execution entry, so
    // unregistered ids work as pure order markers.
    renderer
        .context()
        .submit(RenderState::command(), RenderCommand::BindVertexArray(rid));
}

fn executed_markers(
    probe: &charcoal::video::prelude::DeviceProbe,
    markers: &[Rid],
) -> Vec<u64> {
    let raw: Vec<u64> = markers.iter().map(|v| v.raw()).collect();
    probe
        .log()
        .iter()
        .filter(|v| v.0 == "bind_vertex_array" && raw.contains(&v.1))
        .map(|v| v.1)
        .collect()
}

#[test]
fn submission_order_within_a_group() {
    let (renderer, probe) = headless();
    let ctx = renderer.context();

    let markers: Vec<Rid> = (0..8).map(|_| marker(&renderer)).collect();

    ctx.begin_group();
    for &rid in &markers {
        submit_marker(&renderer, rid);
    }
    ctx.end_group();

    flush(&renderer);

    let expected: Vec<u64> = markers.iter().map(|v| v.raw()).collect();
    assert_eq!(executed_markers(&probe, &markers), expected);
}

#[test]
fn groups_execute_in_ascending_order() {
    let (renderer, probe) = headless();
    let ctx = renderer.context();

    let a = marker(&renderer);
    let b = marker(&renderer);
    let c = marker(&renderer);

    // Three groups, one command each; execution must follow group creation
    // order regardless of anything else.
    for &rid in &[a, b, c] {
        ctx.begin_group();
        submit_marker(&renderer, rid);
        ctx.end_group();
    }

    flush(&renderer);
    assert_eq!(executed_markers(&probe, &[a, b, c]), vec![a.raw(), b.raw(), c.raw()]);
}

#[test]
fn closed_groups_never_reopen() {
    // The scenario: group G1 gets X, group G2 gets Y, then more work meant
    // for "G1" is submitted. Groups are never reopened here, so the late
    // work lands in a fresh later group and the execution order is X, Y, Z.
    let (renderer, probe) = headless();
    let ctx = renderer.context();

    let x = marker(&renderer);
    let y = marker(&renderer);
    let z = marker(&renderer);

    ctx.begin_group();
    submit_marker(&renderer, x);
    ctx.end_group();

    ctx.begin_group();
    submit_marker(&renderer, y);
    ctx.end_group();

    ctx.begin_group();
    submit_marker(&renderer, z);
    ctx.end_group();

    flush(&renderer);
    assert_eq!(
        executed_markers(&probe, &[x, y, z]),
        vec![x.raw(), y.raw(), z.raw()]
    );
}

#[test]
fn ungrouped_commands_keep_submission_order() {
    let (renderer, probe) = headless();

    let markers: Vec<Rid> = (0..16).map(|_| marker(&renderer)).collect();
    for &rid in &markers {
        submit_marker(&renderer, rid);
    }

    flush(&renderer);

    let expected: Vec<u64> = markers.iter().map(|v| v.raw()).collect();
    assert_eq!(executed_markers(&probe, &markers), expected);
}

#[test]
fn draws_sort_by_state_inside_a_group_only() {
    let (renderer, probe) = headless();
    let ctx = renderer.context();

    let far = marker(&renderer);
    let near = marker(&renderer);
    let other = marker(&renderer);

    let draw = |rid: Rid, depth: u8| {
        ctx.submit(
            RenderState::draw().with_depth(depth),
            RenderCommand::Draw(DrawCall {
                vertex_array: rid,
                program: Rid::none(),
                primitive: Primitive::Triangles,
                first: 0,
                count: 3,
            }),
        );
    };

    // First group: two draws submitted far-then-near; the state sort may
    // reorder them to near-then-far for locality.
    ctx.begin_group();
    draw(far, 2);
    draw(near, 1);
    ctx.end_group();

    // Second group: a depth-0 draw. Despite the smallest depth it must not
    // jump the group boundary.
    ctx.begin_group();
    draw(other, 0);
    ctx.end_group();

    flush(&renderer);

    let draws: Vec<u64> = probe
        .log()
        .iter()
        .filter(|v| v.0 == "draw")
        .map(|v| v.1)
        .collect();
    assert_eq!(draws, vec![near.raw(), far.raw(), other.raw()]);
}

#[test]
fn frames_never_interleave() {
    let (renderer, probe) = headless();

    let mut expected = Vec::new();
    for _ in 0..4 {
        let batch = 1 + rand::random::<usize>() % 8;
        for _ in 0..batch {
            let rid = marker(&renderer);
            submit_marker(&renderer, rid);
            expected.push(rid);
        }
        renderer.advance().unwrap();
    }

    flush(&renderer);

    // Every command of frame N executed before every command of frame N+1;
    // with per-frame batches in submission order that collapses to one
    // global order.
    let raw: Vec<u64> = expected.iter().map(|v| v.raw()).collect();
    assert_eq!(executed_markers(&probe, &expected), raw);
}
