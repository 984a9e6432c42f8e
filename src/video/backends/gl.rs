//! The OpenGL device. Runs on the render thread with the context current;
//! resource ids map to driver names here and nowhere else.

use std::ffi::CString;
use std::os::raw::c_void;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use gl;
use gl::types::*;
use smallvec::SmallVec;

use crate::shader::reflect::Field;
use crate::shader::uniforms::{UniformHeader, UNIFORM_HEADER_SIZE};
use crate::shader::{ShaderData, ShaderDataType, ShaderDomain};
use crate::utils::FastHashMap;

use super::super::assets::buffer::VertexLayout;
use super::super::command::{BufferKind, BufferUsage, DrawCall, Primitive};
use super::super::errors::{Error, Result};
use super::super::registry::Rid;
use super::Device;

/// Resolved location of one uniform; struct uniforms resolve per field.
#[derive(Debug)]
enum UniformLocations {
    Single(GLint),
    Fields(Vec<GLint>),
}

struct GlProgramData {
    id: GLuint,
    loaded: bool,
    locations: Vec<UniformLocations>,
    data: Arc<ShaderData>,
}

pub struct GlDevice {
    vaos: FastHashMap<u64, GLuint>,
    buffers: FastHashMap<u64, (GLuint, BufferUsage)>,
    programs: FastHashMap<u64, GlProgramData>,
    scratch: Vec<f32>,
}

impl GlDevice {
    /// Loads the function pointers through the window's symbol loader. Must
    /// run on the render thread after the context went current.
    pub unsafe fn new<F>(mut loader: F) -> crate::errors::Result<GlDevice>
    where
        F: FnMut(&str) -> *const c_void,
    {
        gl::load_with(|symbol| loader(symbol) as *const _);

        if !gl::GenVertexArrays::is_loaded() {
            bail!("failed to load the OpenGL function pointers");
        }

        info!("OpenGL device ready");
        Ok(GlDevice {
            vaos: FastHashMap::default(),
            buffers: FastHashMap::default(),
            programs: FastHashMap::default(),
            scratch: Vec::new(),
        })
    }

    fn vao(&self, id: Rid) -> Result<GLuint> {
        self.vaos
            .get(&id.raw())
            .cloned()
            .ok_or_else(|| Error::ResourceInvalid(id))
    }

    fn buffer(&self, id: Rid) -> Result<GLuint> {
        self.buffers
            .get(&id.raw())
            .map(|v| v.0)
            .ok_or_else(|| Error::ResourceInvalid(id))
    }
}

impl Device for GlDevice {
    unsafe fn create_vertex_array(&mut self, id: Rid) -> Result<()> {
        let mut name = 0;
        gl::GenVertexArrays(1, &mut name);
        check()?;

        self.vaos.insert(id.raw(), name);
        Ok(())
    }

    unsafe fn delete_vertex_array(&mut self, id: Rid) -> Result<()> {
        if let Some(name) = self.vaos.remove(&id.raw()) {
            gl::DeleteVertexArrays(1, &name);
            check()?;
        }
        Ok(())
    }

    unsafe fn bind_vertex_array(&mut self, id: Rid) -> Result<()> {
        let name = self.vao(id)?;
        gl::BindVertexArray(name);
        check()
    }

    unsafe fn unbind_vertex_array(&mut self) -> Result<()> {
        gl::BindVertexArray(0);
        check()
    }

    unsafe fn attach_vertex_buffer(
        &mut self,
        vao: Rid,
        vbo: Rid,
        layout: &VertexLayout,
    ) -> Result<()> {
        gl::BindVertexArray(self.vao(vao)?);
        gl::BindBuffer(gl::ARRAY_BUFFER, self.buffer(vbo)?);

        for (index, element) in layout.elements().iter().enumerate() {
            let index = index as GLuint;
            let base = gl_base_type(element.ty);

            gl::EnableVertexAttribArray(index);
            if base == gl::INT {
                gl::VertexAttribIPointer(
                    index,
                    element.ty.components() as GLint,
                    base,
                    layout.stride() as GLsizei,
                    element.offset as usize as *const _,
                );
            } else {
                gl::VertexAttribPointer(
                    index,
                    element.ty.components() as GLint,
                    base,
                    if element.normalized { gl::TRUE } else { gl::FALSE },
                    layout.stride() as GLsizei,
                    element.offset as usize as *const _,
                );
            }
        }

        check()
    }

    unsafe fn attach_index_buffer(&mut self, vao: Rid, ibo: Rid) -> Result<()> {
        gl::BindVertexArray(self.vao(vao)?);
        gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, self.buffer(ibo)?);
        check()
    }

    unsafe fn create_buffer(&mut self, id: Rid, _: BufferKind, usage: BufferUsage) -> Result<()> {
        let mut name = 0;
        gl::GenBuffers(1, &mut name);
        check()?;

        self.buffers.insert(id.raw(), (name, usage));
        Ok(())
    }

    unsafe fn delete_buffer(&mut self, id: Rid, _: BufferKind) -> Result<()> {
        if let Some((name, _)) = self.buffers.remove(&id.raw()) {
            gl::DeleteBuffers(1, &name);
            check()?;
        }
        Ok(())
    }

    unsafe fn bind_buffer(&mut self, id: Rid, kind: BufferKind) -> Result<()> {
        gl::BindBuffer(gl_buffer_target(kind), self.buffer(id)?);
        check()
    }

    unsafe fn upload_buffer(&mut self, id: Rid, kind: BufferKind, data: &[u8]) -> Result<()> {
        let (name, usage) = *self
            .buffers
            .get(&id.raw())
            .ok_or_else(|| Error::ResourceInvalid(id))?;

        let target = gl_buffer_target(kind);
        gl::BindBuffer(target, name);
        gl::BufferData(
            target,
            data.len() as isize,
            data.as_ptr() as *const _,
            match usage {
                BufferUsage::Static => gl::STATIC_DRAW,
                BufferUsage::Dynamic => gl::DYNAMIC_DRAW,
            },
        );
        check()
    }

    unsafe fn create_program(&mut self, id: Rid, data: &Arc<ShaderData>) -> Result<()> {
        let mut entry = GlProgramData {
            id: 0,
            loaded: false,
            locations: Vec::new(),
            data: data.clone(),
        };

        // Compile and link failures leave the program registered but not
        // loaded, so binds and uploads degrade to no-ops.
        if let Some(program) = compile_and_link(data) {
            entry.id = program;
            entry.loaded = true;
            entry.locations = resolve_uniforms(program, data);
        }

        self.programs.insert(id.raw(), entry);
        check()
    }

    unsafe fn delete_program(&mut self, id: Rid) -> Result<()> {
        if let Some(entry) = self.programs.remove(&id.raw()) {
            if entry.loaded {
                gl::DeleteProgram(entry.id);
                check()?;
            }
        }
        Ok(())
    }

    unsafe fn bind_program(&mut self, id: Rid) -> Result<()> {
        let entry = self
            .programs
            .get(&id.raw())
            .ok_or_else(|| Error::ResourceInvalid(id))?;

        if entry.loaded {
            gl::UseProgram(entry.id);
        }
        check()
    }

    unsafe fn upload_uniforms(&mut self, id: Rid, bytes: &[u8]) -> Result<()> {
        let entry = match self.programs.get(&id.raw()) {
            Some(v) if v.loaded => v,
            Some(_) => return Ok(()),
            None => return Err(Error::ResourceInvalid(id)),
        };

        gl::UseProgram(entry.id);

        for (i, decl) in entry.data.uniforms().iter().enumerate() {
            let offset = decl.offset() as usize;
            if offset + UNIFORM_HEADER_SIZE as usize > bytes.len() {
                break;
            }

            let header = UniformHeader::read(&bytes[offset..]);
            if header.size == 0 {
                continue;
            }

            let payload = &bytes[offset + UNIFORM_HEADER_SIZE as usize..];
            match entry.locations[i] {
                UniformLocations::Single(location) => {
                    if location < 0 {
                        continue;
                    }
                    let count = header.size / decl.ty.size();
                    upload_value(
                        &mut self.scratch,
                        location,
                        decl.ty,
                        count,
                        &payload[..header.size as usize],
                    );
                }
                UniformLocations::Fields(ref locations) => {
                    if decl.is_array() {
                        warn!("uniform '{}': struct arrays do not upload", decl.name);
                        continue;
                    }
                    upload_struct(&mut self.scratch, locations, &decl.fields, payload);
                }
            }
        }

        check()
    }

    unsafe fn set_clear_color(&mut self, color: [f32; 4]) -> Result<()> {
        gl::ClearColor(color[0], color[1], color[2], color[3]);
        check()
    }

    unsafe fn clear(&mut self) -> Result<()> {
        gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        check()
    }

    unsafe fn draw(&mut self, call: DrawCall) -> Result<()> {
        self.bind_program(call.program)?;
        gl::BindVertexArray(self.vao(call.vertex_array)?);
        gl::DrawArrays(
            gl_primitive(call.primitive),
            call.first as GLint,
            call.count as GLsizei,
        );
        check()
    }
}

unsafe fn compile_and_link(data: &Arc<ShaderData>) -> Option<GLuint> {
    let program = gl::CreateProgram();
    let mut stages: SmallVec<[GLuint; 3]> = SmallVec::new();

    for &domain in &ShaderDomain::ALL {
        let source = data.source().get(domain);
        if source.is_empty() {
            continue;
        }

        let stage = gl::CreateShader(gl_domain(domain));
        let text = CString::new(source.as_bytes()).unwrap_or_default();
        gl::ShaderSource(stage, 1, &text.as_ptr(), ::std::ptr::null());
        gl::CompileShader(stage);

        let mut status = 0;
        gl::GetShaderiv(stage, gl::COMPILE_STATUS, &mut status);
        if status != GLint::from(gl::TRUE) {
            error!(
                "{:?} shader compilation failed:\n{}",
                domain,
                shader_info_log(stage)
            );

            gl::DeleteShader(stage);
            for &v in &stages {
                gl::DeleteShader(v);
            }
            gl::DeleteProgram(program);
            return None;
        }

        gl::AttachShader(program, stage);
        stages.push(stage);
    }

    gl::LinkProgram(program);

    let mut status = 0;
    gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
    if status != GLint::from(gl::TRUE) {
        error!("program link failed:\n{}", program_info_log(program));

        for &v in &stages {
            gl::DeleteShader(v);
        }
        gl::DeleteProgram(program);
        return None;
    }

    for &v in &stages {
        gl::DetachShader(program, v);
        gl::DeleteShader(v);
    }

    debug!("program {} linked", program);
    Some(program)
}

unsafe fn resolve_uniforms(program: GLuint, data: &Arc<ShaderData>) -> Vec<UniformLocations> {
    gl::UseProgram(program);

    let mut locations = Vec::with_capacity(data.uniforms().len());
    for decl in data.uniforms().iter() {
        if decl.ty == ShaderDataType::Struct {
            let fields = decl
                .fields
                .iter()
                .map(|f| uniform_location(program, &format!("{}.{}", decl.name, f.name)))
                .collect();
            locations.push(UniformLocations::Fields(fields));
        } else {
            locations.push(UniformLocations::Single(uniform_location(
                program, &decl.name,
            )));
        }
    }

    // Samplers bind to their registers once; draws only rebind textures.
    for resource in data.resources() {
        let location = uniform_location(program, &resource.name);
        if location >= 0 {
            gl::Uniform1i(location, resource.register as GLint);
        }
    }

    locations
}

unsafe fn uniform_location(program: GLuint, name: &str) -> GLint {
    let c_name = match CString::new(name.as_bytes()) {
        Ok(v) => v,
        Err(_) => return -1,
    };

    let location = gl::GetUniformLocation(program, c_name.as_ptr());
    if location == -1 {
        warn!("could not find uniform '{}' in shader", name);
    }
    location
}

/// Decodes the little-endian payload into the scratch buffer and forwards it
/// to the typed `glUniform*` call.
unsafe fn upload_value(
    scratch: &mut Vec<f32>,
    location: GLint,
    ty: ShaderDataType,
    count: u32,
    bytes: &[u8],
) {
    scratch.clear();
    for chunk in bytes.chunks(4) {
        if chunk.len() == 4 {
            scratch.push(f32::from_bits(LittleEndian::read_u32(chunk)));
        }
    }

    let n = count as GLsizei;
    let ptr = scratch.as_ptr();
    match ty {
        ShaderDataType::Bool | ShaderDataType::Int => {
            gl::Uniform1iv(location, n, ptr as *const GLint)
        }
        ShaderDataType::Float => gl::Uniform1fv(location, n, ptr),
        ShaderDataType::Vec2 => gl::Uniform2fv(location, n, ptr),
        ShaderDataType::Vec3 => gl::Uniform3fv(location, n, ptr),
        ShaderDataType::Vec4 => gl::Uniform4fv(location, n, ptr),
        ShaderDataType::Mat2 => gl::UniformMatrix2fv(location, n, gl::FALSE, ptr),
        ShaderDataType::Mat3 => gl::UniformMatrix3fv(location, n, gl::FALSE, ptr),
        ShaderDataType::Mat4 => gl::UniformMatrix4fv(location, n, gl::FALSE, ptr),
        ShaderDataType::Struct => {}
    }
}

unsafe fn upload_struct(
    scratch: &mut Vec<f32>,
    locations: &[GLint],
    fields: &[Field],
    payload: &[u8],
) {
    let mut offset = 0usize;
    for (field, &location) in fields.iter().zip(locations) {
        let capacity = field.capacity() as usize;
        if offset + capacity > payload.len() {
            break;
        }

        if location >= 0 && field.ty != ShaderDataType::Struct {
            upload_value(
                scratch,
                location,
                field.ty,
                field.count,
                &payload[offset..offset + capacity],
            );
        }
        offset += capacity;
    }
}

unsafe fn shader_info_log(stage: GLuint) -> String {
    let mut len = 0;
    gl::GetShaderiv(stage, gl::INFO_LOG_LENGTH, &mut len);
    let mut buf = vec![0u8; usize::max(len as usize, 1)];
    gl::GetShaderInfoLog(stage, len, ::std::ptr::null_mut(), buf.as_mut_ptr() as *mut _);
    String::from_utf8_lossy(&buf).trim_end_matches('\0').to_owned()
}

unsafe fn program_info_log(program: GLuint) -> String {
    let mut len = 0;
    gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
    let mut buf = vec![0u8; usize::max(len as usize, 1)];
    gl::GetProgramInfoLog(program, len, ::std::ptr::null_mut(), buf.as_mut_ptr() as *mut _);
    String::from_utf8_lossy(&buf).trim_end_matches('\0').to_owned()
}

unsafe fn check() -> Result<()> {
    let code = gl::GetError();
    if code == gl::NO_ERROR {
        Ok(())
    } else {
        Err(Error::Driver(format!("error {:#x}", code)))
    }
}

fn gl_buffer_target(kind: BufferKind) -> GLenum {
    match kind {
        BufferKind::Vertex => gl::ARRAY_BUFFER,
        BufferKind::Index => gl::ELEMENT_ARRAY_BUFFER,
    }
}

fn gl_primitive(primitive: Primitive) -> GLenum {
    match primitive {
        Primitive::Points => gl::POINTS,
        Primitive::Lines => gl::LINES,
        Primitive::Triangles => gl::TRIANGLES,
    }
}

fn gl_domain(domain: ShaderDomain) -> GLenum {
    match domain {
        ShaderDomain::Vertex => gl::VERTEX_SHADER,
        ShaderDomain::Fragment => gl::FRAGMENT_SHADER,
        ShaderDomain::Geometry => gl::GEOMETRY_SHADER,
    }
}

fn gl_base_type(ty: ShaderDataType) -> GLenum {
    match ty {
        ShaderDataType::Int | ShaderDataType::Bool => gl::INT,
        _ => gl::FLOAT,
    }
}
