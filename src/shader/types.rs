use byteorder::{ByteOrder, LittleEndian};
use cgmath::{Matrix2, Matrix3, Matrix4, Vector2, Vector3, Vector4};
use smallvec::SmallVec;

/// Data types recognized in uniform and struct-field declarations. The
/// numeric value doubles as the `kind` tag of the uniform upload buffer
/// headers, so it must stay stable within a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ShaderDataType {
    Bool = 1,
    Int = 2,
    Float = 3,
    Vec2 = 4,
    Vec3 = 5,
    Vec4 = 6,
    Mat2 = 7,
    Mat3 = 8,
    Mat4 = 9,
    Struct = 10,
}

impl ShaderDataType {
    pub fn from_glsl(name: &str) -> Option<ShaderDataType> {
        match name {
            "bool" => Some(ShaderDataType::Bool),
            "int" => Some(ShaderDataType::Int),
            "float" => Some(ShaderDataType::Float),
            "vec2" => Some(ShaderDataType::Vec2),
            "vec3" => Some(ShaderDataType::Vec3),
            "vec4" => Some(ShaderDataType::Vec4),
            "mat2" => Some(ShaderDataType::Mat2),
            "mat3" => Some(ShaderDataType::Mat3),
            "mat4" => Some(ShaderDataType::Mat4),
            _ => None,
        }
    }

    /// Tightly packed size in bytes, as consumed by the `glUniform*` family.
    pub fn size(self) -> u32 {
        match self {
            ShaderDataType::Bool | ShaderDataType::Int | ShaderDataType::Float => 4,
            ShaderDataType::Vec2 => 8,
            ShaderDataType::Vec3 => 12,
            ShaderDataType::Vec4 | ShaderDataType::Mat2 => 16,
            ShaderDataType::Mat3 => 36,
            ShaderDataType::Mat4 => 64,
            ShaderDataType::Struct => 0,
        }
    }

    /// Number of scalar components per element.
    pub fn components(self) -> u32 {
        match self {
            ShaderDataType::Bool | ShaderDataType::Int | ShaderDataType::Float => 1,
            ShaderDataType::Vec2 => 2,
            ShaderDataType::Vec3 => 3,
            ShaderDataType::Vec4 | ShaderDataType::Mat2 => 4,
            ShaderDataType::Mat3 => 9,
            ShaderDataType::Mat4 => 16,
            ShaderDataType::Struct => 0,
        }
    }

    /// Base alignment under the std140 rules. Array elements always align to
    /// a 16 byte boundary.
    pub fn std140_alignment(self, array: bool) -> u32 {
        if array {
            return 16;
        }

        match self {
            ShaderDataType::Bool | ShaderDataType::Int | ShaderDataType::Float => 4,
            ShaderDataType::Vec2 => 8,
            _ => 16,
        }
    }

    /// Size under the std140 rules. Matrices are column arrays of vec4; array
    /// strides round up to 16 bytes.
    pub fn std140_size(self, count: u32) -> u32 {
        let element = match self {
            ShaderDataType::Mat2 => 2 * 16,
            ShaderDataType::Mat3 => 3 * 16,
            ShaderDataType::Mat4 => 4 * 16,
            other => other.size(),
        };

        if count > 1 {
            round_up(element, 16) * count
        } else {
            element
        }
    }

    pub fn from_kind(kind: u32) -> Option<ShaderDataType> {
        match kind {
            1 => Some(ShaderDataType::Bool),
            2 => Some(ShaderDataType::Int),
            3 => Some(ShaderDataType::Float),
            4 => Some(ShaderDataType::Vec2),
            5 => Some(ShaderDataType::Vec3),
            6 => Some(ShaderDataType::Vec4),
            7 => Some(ShaderDataType::Mat2),
            8 => Some(ShaderDataType::Mat3),
            9 => Some(ShaderDataType::Mat4),
            10 => Some(ShaderDataType::Struct),
            _ => None,
        }
    }
}

#[inline]
pub(crate) fn round_up(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) / alignment * alignment
}

/// Sampler types. Unlike plain uniforms these are routed to the resource
/// list and bound to texture registers instead of the uniform buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Sampler2D,
    SamplerCube,
    Sampler2DShadow,
}

impl ResourceType {
    pub fn from_glsl(name: &str) -> Option<ResourceType> {
        match name {
            "sampler2D" => Some(ResourceType::Sampler2D),
            "samplerCube" => Some(ResourceType::SamplerCube),
            "sampler2DShadow" => Some(ResourceType::Sampler2DShadow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixLayout {
    ColumnMajor,
    RowMajor,
}

/// A value destined for one uniform slot. Matrices are supplied in column
/// major order.
#[derive(Debug, Clone)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([[f32; 2]; 2]),
    Mat3([[f32; 3]; 3]),
    Mat4([[f32; 4]; 4]),
    Ints(Vec<i32>),
    Floats(Vec<f32>),
}

impl UniformValue {
    pub fn data_type(&self) -> ShaderDataType {
        match *self {
            UniformValue::Bool(_) => ShaderDataType::Bool,
            UniformValue::Int(_) | UniformValue::Ints(_) => ShaderDataType::Int,
            UniformValue::Float(_) | UniformValue::Floats(_) => ShaderDataType::Float,
            UniformValue::Vec2(_) => ShaderDataType::Vec2,
            UniformValue::Vec3(_) => ShaderDataType::Vec3,
            UniformValue::Vec4(_) => ShaderDataType::Vec4,
            UniformValue::Mat2(_) => ShaderDataType::Mat2,
            UniformValue::Mat3(_) => ShaderDataType::Mat3,
            UniformValue::Mat4(_) => ShaderDataType::Mat4,
        }
    }

    pub(crate) fn to_bytes(&self) -> SmallVec<[u8; 64]> {
        let mut bytes = SmallVec::new();
        match *self {
            UniformValue::Bool(v) => push_i32(&mut bytes, v as i32),
            UniformValue::Int(v) => push_i32(&mut bytes, v),
            UniformValue::Float(v) => push_f32(&mut bytes, v),
            UniformValue::Vec2(v) => push_f32s(&mut bytes, &v),
            UniformValue::Vec3(v) => push_f32s(&mut bytes, &v),
            UniformValue::Vec4(v) => push_f32s(&mut bytes, &v),
            UniformValue::Mat2(v) => {
                for col in &v {
                    push_f32s(&mut bytes, col);
                }
            }
            UniformValue::Mat3(v) => {
                for col in &v {
                    push_f32s(&mut bytes, col);
                }
            }
            UniformValue::Mat4(v) => {
                for col in &v {
                    push_f32s(&mut bytes, col);
                }
            }
            UniformValue::Ints(ref v) => {
                for &i in v {
                    push_i32(&mut bytes, i);
                }
            }
            UniformValue::Floats(ref v) => push_f32s(&mut bytes, v),
        }
        bytes
    }
}

fn push_f32(bytes: &mut SmallVec<[u8; 64]>, v: f32) {
    let mut buf = [0; 4];
    LittleEndian::write_f32(&mut buf, v);
    bytes.extend_from_slice(&buf);
}

fn push_i32(bytes: &mut SmallVec<[u8; 64]>, v: i32) {
    let mut buf = [0; 4];
    LittleEndian::write_i32(&mut buf, v);
    bytes.extend_from_slice(&buf);
}

fn push_f32s(bytes: &mut SmallVec<[u8; 64]>, vs: &[f32]) {
    for &v in vs {
        push_f32(bytes, v);
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Vector2<f32>> for UniformValue {
    fn from(v: Vector2<f32>) -> Self {
        UniformValue::Vec2(*v.as_ref())
    }
}

impl From<Vector3<f32>> for UniformValue {
    fn from(v: Vector3<f32>) -> Self {
        UniformValue::Vec3(*v.as_ref())
    }
}

impl From<Vector4<f32>> for UniformValue {
    fn from(v: Vector4<f32>) -> Self {
        UniformValue::Vec4(*v.as_ref())
    }
}

impl From<Matrix2<f32>> for UniformValue {
    fn from(v: Matrix2<f32>) -> Self {
        UniformValue::Mat2(*v.as_ref())
    }
}

impl From<Matrix3<f32>> for UniformValue {
    fn from(v: Matrix3<f32>) -> Self {
        UniformValue::Mat3(*v.as_ref())
    }
}

impl From<Matrix4<f32>> for UniformValue {
    fn from(v: Matrix4<f32>) -> Self {
        UniformValue::Mat4(*v.as_ref())
    }
}

impl<'a> From<&'a [f32]> for UniformValue {
    fn from(v: &'a [f32]) -> Self {
        UniformValue::Floats(v.to_vec())
    }
}

impl<'a> From<&'a [i32]> for UniformValue {
    fn from(v: &'a [i32]) -> Self {
        UniformValue::Ints(v.to_vec())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(ShaderDataType::Float.size(), 4);
        assert_eq!(ShaderDataType::Vec3.size(), 12);
        assert_eq!(ShaderDataType::Mat3.size(), 36);
        assert_eq!(ShaderDataType::Mat4.size(), 64);
    }

    #[test]
    fn std140() {
        assert_eq!(ShaderDataType::Float.std140_alignment(false), 4);
        assert_eq!(ShaderDataType::Vec2.std140_alignment(false), 8);
        assert_eq!(ShaderDataType::Vec3.std140_alignment(false), 16);
        assert_eq!(ShaderDataType::Float.std140_alignment(true), 16);

        assert_eq!(ShaderDataType::Vec3.std140_size(1), 12);
        assert_eq!(ShaderDataType::Mat4.std140_size(1), 64);
        assert_eq!(ShaderDataType::Float.std140_size(4), 64);
        assert_eq!(ShaderDataType::Mat3.std140_size(2), 96);
    }

    #[test]
    fn value_bytes() {
        let v: UniformValue = 1.0f32.into();
        assert_eq!(v.to_bytes().len(), 4);
        assert_eq!(v.data_type(), ShaderDataType::Float);

        let v: UniformValue = Matrix4::<f32>::from_scale(2.0).into();
        assert_eq!(v.to_bytes().len(), 64);

        let v: UniformValue = (&[0.0f32, 1.0, 2.0][..]).into();
        assert_eq!(v.to_bytes().len(), 12);
        assert_eq!(v.data_type(), ShaderDataType::Float);
    }
}
