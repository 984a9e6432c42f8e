//! Shader reflection: parsing of a GLSL subset, std140 layout and the
//! client-side uniform buffer format.
//!
//! A [`ShaderData`] is the parsed form of one program's sources. It is
//! produced once on the main thread, shared between programs behind an `Arc`,
//! and consumed by the render thread when the program is compiled, linked and
//! its uniform locations are resolved.

mod lexer;

pub mod reflect;
pub mod source;
pub mod std140;
pub mod types;
pub mod uniforms;

pub mod prelude {
    pub use super::reflect::{ShaderData, UniformDecl};
    pub use super::source::{ShaderDomain, ShaderDomains, ShaderSource};
    pub use super::types::{MatrixLayout, ResourceType, ShaderDataType, UniformValue};
    pub use super::uniforms::UniformWriter;
}

pub use self::reflect::ShaderData;
pub use self::source::{ShaderDomain, ShaderDomains, ShaderSource};
pub use self::types::{MatrixLayout, ResourceType, ShaderDataType, UniformValue};
pub use self::uniforms::UniformWriter;
