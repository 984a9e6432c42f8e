//! A driverless device. It keeps the same render-side resource maps the GL
//! device keeps, plus an execution log, so ordering and lifetime behavior of
//! the pipeline can be asserted without a context.

use std::sync::{Arc, Mutex};

use crate::shader::uniforms::{UniformHeader, UNIFORM_HEADER_SIZE};
use crate::shader::ShaderData;
use crate::utils::FastHashMap;

use super::super::assets::buffer::VertexLayout;
use super::super::command::{BufferKind, BufferUsage, DrawCall};
use super::super::errors::{Error, Result};
use super::super::registry::Rid;
use super::Device;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VaoState {
    /// Next free vertex-attribute slot; advances once per layout element.
    pub attrib_index: u32,
    pub vertex_buffers: u32,
    pub index_buffer: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferState {
    pub kind: BufferKind,
    pub usage: BufferUsage,
    pub len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProgramState {
    pub loaded: bool,
    pub uniform_count: usize,
    pub uploads: usize,
}

#[derive(Debug, Default)]
struct ProbeState {
    vaos: FastHashMap<u64, VaoState>,
    buffers: FastHashMap<u64, BufferState>,
    programs: FastHashMap<u64, ProgramState>,
    log: Vec<(&'static str, u64)>,
    clear_color: [f32; 4],
    draw_calls: usize,
}

/// A shared view into the headless device's state, handed to tests.
#[derive(Debug, Clone, Default)]
pub struct DeviceProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl DeviceProbe {
    pub fn vertex_array_count(&self) -> usize {
        self.state.lock().unwrap().vaos.len()
    }

    pub fn buffer_count(&self) -> usize {
        self.state.lock().unwrap().buffers.len()
    }

    pub fn program_count(&self) -> usize {
        self.state.lock().unwrap().programs.len()
    }

    pub fn vertex_array(&self, rid: Rid) -> Option<VaoState> {
        self.state.lock().unwrap().vaos.get(&rid.raw()).cloned()
    }

    pub fn buffer(&self, rid: Rid) -> Option<BufferState> {
        self.state.lock().unwrap().buffers.get(&rid.raw()).cloned()
    }

    pub fn program(&self, rid: Rid) -> Option<ProgramState> {
        self.state.lock().unwrap().programs.get(&rid.raw()).cloned()
    }

    pub fn draw_calls(&self) -> usize {
        self.state.lock().unwrap().draw_calls
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.state.lock().unwrap().clear_color
    }

    /// The executed operations in order, as `(op, rid)` pairs.
    pub fn log(&self) -> Vec<(&'static str, u64)> {
        self.state.lock().unwrap().log.clone()
    }
}

pub struct HeadlessDevice {
    shaders: FastHashMap<u64, Arc<ShaderData>>,
    probe: DeviceProbe,
}

impl HeadlessDevice {
    pub fn new() -> (HeadlessDevice, DeviceProbe) {
        let probe = DeviceProbe::default();
        let device = HeadlessDevice {
            shaders: FastHashMap::default(),
            probe: probe.clone(),
        };
        (device, probe)
    }

    fn record(&self, op: &'static str, rid: Rid) {
        self.probe.state.lock().unwrap().log.push((op, rid.raw()));
    }
}

impl Device for HeadlessDevice {
    unsafe fn create_vertex_array(&mut self, id: Rid) -> Result<()> {
        self.record("create_vertex_array", id);
        let mut state = self.probe.state.lock().unwrap();
        state.vaos.insert(id.raw(), VaoState::default());
        Ok(())
    }

    unsafe fn delete_vertex_array(&mut self, id: Rid) -> Result<()> {
        self.record("delete_vertex_array", id);
        self.probe.state.lock().unwrap().vaos.remove(&id.raw());
        Ok(())
    }

    unsafe fn bind_vertex_array(&mut self, id: Rid) -> Result<()> {
        self.record("bind_vertex_array", id);
        if !self.probe.state.lock().unwrap().vaos.contains_key(&id.raw()) {
            return Err(Error::ResourceInvalid(id));
        }
        Ok(())
    }

    unsafe fn unbind_vertex_array(&mut self) -> Result<()> {
        self.record("unbind_vertex_array", Rid::none());
        Ok(())
    }

    unsafe fn attach_vertex_buffer(
        &mut self,
        vao: Rid,
        vbo: Rid,
        layout: &VertexLayout,
    ) -> Result<()> {
        self.record("attach_vertex_buffer", vao);
        let mut state = self.probe.state.lock().unwrap();
        if !state.buffers.contains_key(&vbo.raw()) {
            return Err(Error::ResourceInvalid(vbo));
        }

        match state.vaos.get_mut(&vao.raw()) {
            Some(v) => {
                v.attrib_index += layout.elements().len() as u32;
                v.vertex_buffers += 1;
                Ok(())
            }
            None => Err(Error::ResourceInvalid(vao)),
        }
    }

    unsafe fn attach_index_buffer(&mut self, vao: Rid, ibo: Rid) -> Result<()> {
        self.record("attach_index_buffer", vao);
        let mut state = self.probe.state.lock().unwrap();
        match state.vaos.get_mut(&vao.raw()) {
            Some(v) => {
                v.index_buffer = Some(ibo.raw());
                Ok(())
            }
            None => Err(Error::ResourceInvalid(vao)),
        }
    }

    unsafe fn create_buffer(&mut self, id: Rid, kind: BufferKind, usage: BufferUsage)
        -> Result<()> {
        self.record("create_buffer", id);
        let mut state = self.probe.state.lock().unwrap();
        state.buffers.insert(id.raw(), BufferState { kind, usage, len: 0 });
        Ok(())
    }

    unsafe fn delete_buffer(&mut self, id: Rid, _: BufferKind) -> Result<()> {
        self.record("delete_buffer", id);
        self.probe.state.lock().unwrap().buffers.remove(&id.raw());
        Ok(())
    }

    unsafe fn bind_buffer(&mut self, id: Rid, _: BufferKind) -> Result<()> {
        self.record("bind_buffer", id);
        if !self.probe.state.lock().unwrap().buffers.contains_key(&id.raw()) {
            return Err(Error::ResourceInvalid(id));
        }
        Ok(())
    }

    unsafe fn upload_buffer(&mut self, id: Rid, _: BufferKind, data: &[u8]) -> Result<()> {
        self.record("upload_buffer", id);
        let mut state = self.probe.state.lock().unwrap();
        match state.buffers.get_mut(&id.raw()) {
            Some(v) => {
                v.len = data.len();
                Ok(())
            }
            None => Err(Error::ResourceInvalid(id)),
        }
    }

    unsafe fn create_program(&mut self, id: Rid, data: &Arc<ShaderData>) -> Result<()> {
        self.record("create_program", id);
        self.shaders.insert(id.raw(), data.clone());
        let mut state = self.probe.state.lock().unwrap();
        state.programs.insert(
            id.raw(),
            ProgramState {
                loaded: !data.source().is_empty(),
                uniform_count: data.uniforms().len(),
                uploads: 0,
            },
        );
        Ok(())
    }

    unsafe fn delete_program(&mut self, id: Rid) -> Result<()> {
        self.record("delete_program", id);
        self.shaders.remove(&id.raw());
        self.probe.state.lock().unwrap().programs.remove(&id.raw());
        Ok(())
    }

    unsafe fn bind_program(&mut self, id: Rid) -> Result<()> {
        self.record("bind_program", id);
        if !self.probe.state.lock().unwrap().programs.contains_key(&id.raw()) {
            return Err(Error::ResourceInvalid(id));
        }
        Ok(())
    }

    unsafe fn upload_uniforms(&mut self, id: Rid, bytes: &[u8]) -> Result<()> {
        self.record("upload_uniforms", id);

        let data = match self.shaders.get(&id.raw()) {
            Some(v) => v.clone(),
            None => return Err(Error::ResourceInvalid(id)),
        };

        // Walk the slot headers exactly like the GL device would.
        let mut present = 0;
        for decl in data.uniforms().iter() {
            let offset = decl.offset() as usize;
            if offset + UNIFORM_HEADER_SIZE as usize > bytes.len() {
                break;
            }
            if UniformHeader::read(&bytes[offset..]).size > 0 {
                present += 1;
            }
        }

        let mut state = self.probe.state.lock().unwrap();
        if let Some(v) = state.programs.get_mut(&id.raw()) {
            v.uploads += present;
        }
        Ok(())
    }

    unsafe fn set_clear_color(&mut self, color: [f32; 4]) -> Result<()> {
        self.record("set_clear_color", Rid::none());
        self.probe.state.lock().unwrap().clear_color = color;
        Ok(())
    }

    unsafe fn clear(&mut self) -> Result<()> {
        self.record("clear", Rid::none());
        Ok(())
    }

    unsafe fn draw(&mut self, call: DrawCall) -> Result<()> {
        self.record("draw", call.vertex_array);
        self.probe.state.lock().unwrap().draw_calls += 1;
        Ok(())
    }
}
