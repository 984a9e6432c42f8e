//! The client side of the uniform upload path. A `UniformWriter` owns a
//! buffer shaped like the parsed uniform layout: one slot per uniform, each
//! an 8 byte `{kind, size}` header followed by the packed payload. Slots with
//! a zero-sized header are skipped by the consumer, so a partially filled
//! writer uploads only what was set.

use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};

use super::reflect::{Field, ShaderData, UniformDecl};
use super::types::{ShaderDataType, UniformValue};

pub const UNIFORM_HEADER_SIZE: u32 = 8;

/// The per-slot header: the data-type tag and the payload length in bytes.
/// Consumers derive the element count as `size / size_of(kind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformHeader {
    pub kind: u32,
    pub size: u32,
}

impl UniformHeader {
    pub fn read(buf: &[u8]) -> UniformHeader {
        UniformHeader {
            kind: LittleEndian::read_u32(&buf[0..4]),
            size: LittleEndian::read_u32(&buf[4..8]),
        }
    }

    pub fn write(self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[0..4], self.kind);
        LittleEndian::write_u32(&mut buf[4..8], self.size);
    }
}

/// Builds upload buffers against one program's uniform layout.
pub struct UniformWriter {
    data: Arc<ShaderData>,
    bytes: Vec<u8>,
}

impl UniformWriter {
    pub fn new(data: Arc<ShaderData>) -> Self {
        let size = data.uniforms().size() as usize;
        UniformWriter {
            data,
            bytes: vec![0; size],
        }
    }

    /// Sets a uniform by name, or a struct-uniform field as `"name.field"`.
    /// Unknown names and type mismatches warn and leave the buffer untouched.
    pub fn set<T: Into<UniformValue>>(&mut self, name: &str, value: T) {
        let value = value.into();

        let (base, field) = match name.find('.') {
            Some(split) => (&name[..split], Some(&name[split + 1..])),
            None => (name, None),
        };

        let decl = match self.data.uniforms().find(base) {
            Some(decl) => decl.clone(),
            None => {
                warn!("failed to find uniform '{}'", base);
                return;
            }
        };

        match field {
            Some(field) => self.set_struct_field(&decl, field, value),
            None => self.set_plain(&decl, value),
        }
    }

    fn set_plain(&mut self, decl: &UniformDecl, value: UniformValue) {
        if decl.ty == ShaderDataType::Struct {
            warn!(
                "uniform '{}' is a struct, set its fields individually",
                decl.name
            );
            return;
        }

        if value.data_type() != decl.ty {
            warn!(
                "uniform '{}' expects {:?}, got {:?}",
                decl.name,
                decl.ty,
                value.data_type()
            );
            return;
        }

        let payload = value.to_bytes();
        if payload.len() as u32 > decl.capacity() {
            warn!(
                "uniform '{}' overflows its slot ({} > {} bytes)",
                decl.name,
                payload.len(),
                decl.capacity()
            );
            return;
        }

        let offset = decl.offset() as usize;
        UniformHeader {
            kind: decl.ty as u32,
            size: payload.len() as u32,
        }
        .write(&mut self.bytes[offset..offset + 8]);

        let data = offset + UNIFORM_HEADER_SIZE as usize;
        self.bytes[data..data + payload.len()].copy_from_slice(&payload);
    }

    fn set_struct_field(&mut self, decl: &UniformDecl, field: &str, value: UniformValue) {
        if decl.ty != ShaderDataType::Struct {
            warn!("uniform '{}' is not a struct", decl.name);
            return;
        }

        let (field_offset, field_decl) = match locate_field(&decl.fields, field) {
            Some(v) => v,
            None => {
                warn!("failed to find field '{}' of uniform '{}'", field, decl.name);
                return;
            }
        };

        if value.data_type() != field_decl.ty {
            warn!(
                "field '{}.{}' expects {:?}, got {:?}",
                decl.name,
                field,
                field_decl.ty,
                value.data_type()
            );
            return;
        }

        let payload = value.to_bytes();
        if payload.len() as u32 > field_decl.capacity() {
            warn!(
                "field '{}.{}' overflows its slot ({} > {} bytes)",
                decl.name,
                field,
                payload.len(),
                field_decl.capacity()
            );
            return;
        }

        // Setting any field marks the whole struct slot present.
        let offset = decl.offset() as usize;
        UniformHeader {
            kind: ShaderDataType::Struct as u32,
            size: decl.capacity(),
        }
        .write(&mut self.bytes[offset..offset + 8]);

        let data = offset + UNIFORM_HEADER_SIZE as usize + field_offset as usize;
        self.bytes[data..data + payload.len()].copy_from_slice(&payload);
    }

    /// Zeroes every slot header; set values stay in place but upload as
    /// absent until re-set.
    pub fn clear(&mut self) {
        for decl in self.data.uniforms().iter() {
            let offset = decl.offset() as usize;
            UniformHeader { kind: 0, size: 0 }.write(&mut self.bytes[offset..offset + 8]);
        }
    }

    #[inline]
    pub fn shader_data(&self) -> &Arc<ShaderData> {
        &self.data
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Finds a field by name and returns its packed offset within the struct's
/// payload.
fn locate_field<'a>(fields: &'a [Field], name: &str) -> Option<(u32, &'a Field)> {
    let mut offset = 0;
    for field in fields {
        if field.name == name {
            return Some((offset, field));
        }
        offset += field.capacity();
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shader::source::ShaderSource;
    use crate::video::registry::Rid;

    fn writer(vs: &str) -> UniformWriter {
        let source = ShaderSource::build().vertex(vs).finish();
        UniformWriter::new(ShaderData::parse(Rid::none(), source))
    }

    #[test]
    fn roundtrip() {
        let mut writer = writer("uniform float a;\nuniform vec3 b;");
        writer.set("a", 2.0f32);
        writer.set("b", [1.0f32, 2.0, 3.0]);

        let decl = writer.shader_data().find_uniform("b").unwrap().clone();
        let offset = decl.offset() as usize;
        let header = UniformHeader::read(&writer.as_bytes()[offset..]);
        assert_eq!(header.kind, ShaderDataType::Vec3 as u32);
        assert_eq!(header.size, 12);
    }

    #[test]
    fn unset_slots_are_empty() {
        let mut writer = writer("uniform float a;\nuniform float b;");
        writer.set("b", 1.0f32);

        let a = writer.shader_data().find_uniform("a").unwrap().clone();
        let header = UniformHeader::read(&writer.as_bytes()[a.offset() as usize..]);
        assert_eq!(header.size, 0);
    }

    #[test]
    fn arrays_carry_length() {
        let mut writer = writer("uniform float arr[4];");
        writer.set("arr", &[1.0f32, 2.0][..]);

        let decl = writer.shader_data().find_uniform("arr").unwrap().clone();
        let header = UniformHeader::read(&writer.as_bytes()[decl.offset() as usize..]);
        // Two of four elements present; consumers divide by the element size.
        assert_eq!(header.size, 8);
    }

    #[test]
    fn type_mismatch_is_ignored() {
        let mut writer = writer("uniform float a;");
        writer.set("a", [1.0f32, 2.0, 3.0]);

        let decl = writer.shader_data().find_uniform("a").unwrap().clone();
        let header = UniformHeader::read(&writer.as_bytes()[decl.offset() as usize..]);
        assert_eq!(header.size, 0);
    }

    #[test]
    fn struct_fields() {
        let mut writer =
            writer("struct Light { vec3 position; float intensity; };\nuniform Light u_light;");
        writer.set("u_light.intensity", 0.5f32);

        let decl = writer.shader_data().find_uniform("u_light").unwrap().clone();
        let offset = decl.offset() as usize;
        let header = UniformHeader::read(&writer.as_bytes()[offset..]);
        assert_eq!(header.kind, ShaderDataType::Struct as u32);
        assert_eq!(header.size, 16);

        // intensity sits after the packed vec3.
        let data = &writer.as_bytes()[offset + 8 + 12..offset + 8 + 16];
        assert_eq!(LittleEndian::read_f32(data), 0.5);
    }
}
