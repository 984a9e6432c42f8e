//! Declaration extraction over the tokenized sources and the resulting
//! reflection data.

use std::sync::Arc;

use crate::utils::{FastHashMap, HashValue};
use crate::video::registry::Rid;

use super::lexer::{tokenize, Token};
use super::source::{ShaderDomain, ShaderDomains, ShaderSource};
use super::std140::Std140Block;
use super::types::{ResourceType, ShaderDataType};
use super::uniforms::UNIFORM_HEADER_SIZE;

/// One field of a struct-typed uniform. Nested struct fields carry their own
/// field list.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: ShaderDataType,
    pub count: u32,
    pub fields: Vec<Field>,
}

impl Field {
    /// Packed byte capacity of this field in the upload buffer.
    pub fn capacity(&self) -> u32 {
        if self.ty == ShaderDataType::Struct {
            self.count * self.fields.iter().map(Field::capacity).sum::<u32>()
        } else {
            self.ty.size() * self.count
        }
    }
}

/// A struct declaration parsed from one stage. Structs resolve only within
/// the stage that declared them.
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: String,
    pub domain: ShaderDomain,
    pub fields: Vec<Field>,
}

/// A uniform declaration, merged across stages.
#[derive(Debug, Clone)]
pub struct UniformDecl {
    pub name: String,
    pub ty: ShaderDataType,
    pub count: u32,
    pub domains: ShaderDomains,
    /// Non-empty iff `ty` is `Struct`.
    pub fields: Vec<Field>,
    offset: u32,
}

impl UniformDecl {
    /// Offset of this uniform's slot header in the upload buffer.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Packed byte capacity of the slot payload.
    pub fn capacity(&self) -> u32 {
        if self.ty == ShaderDataType::Struct {
            self.count * self.fields.iter().map(Field::capacity).sum::<u32>()
        } else {
            self.ty.size() * self.count
        }
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.count > 1
    }
}

/// A sampler declaration, bound to a texture register after link.
#[derive(Debug, Clone)]
pub struct ResourceDecl {
    pub name: String,
    pub ty: ResourceType,
    pub count: u32,
    pub register: u32,
}

/// A recognized `layout(std140) uniform NAME { .. }` block. Parsed and
/// recorded; binding comes later.
#[derive(Debug, Clone)]
pub struct UniformBlockDecl {
    pub name: String,
    pub domain: ShaderDomain,
}

/// The uniforms of a program in declaration order, with their upload-buffer
/// offsets and a hashed name index.
#[derive(Debug, Clone, Default)]
pub struct UniformLayout {
    uniforms: Vec<UniformDecl>,
    index: FastHashMap<HashValue<str>, usize>,
    size: u32,
}

impl UniformLayout {
    #[inline]
    pub fn len(&self) -> usize {
        self.uniforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.uniforms.is_empty()
    }

    /// Total upload-buffer size, headers included.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn iter(&self) -> ::std::slice::Iter<UniformDecl> {
        self.uniforms.iter()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&UniformDecl> {
        self.uniforms.get(index)
    }

    pub fn index_of<T: AsRef<str>>(&self, name: T) -> Option<usize> {
        self.index.get(&HashValue::from(name)).cloned()
    }

    pub fn find<T: AsRef<str>>(&self, name: T) -> Option<&UniformDecl> {
        self.index_of(name).map(|v| &self.uniforms[v])
    }

    fn finalize(&mut self) {
        let mut offset = 0;
        for (i, decl) in self.uniforms.iter_mut().enumerate() {
            decl.offset = offset;
            offset += UNIFORM_HEADER_SIZE + decl.capacity();
            self.index.insert(HashValue::from(&decl.name), i);
        }
        self.size = offset;
    }
}

/// The parsed form of one program's sources: structs, merged uniforms,
/// sampler resources and recognized std140 blocks. Immutable once parsed and
/// shared between programs behind an `Arc`.
#[derive(Debug)]
pub struct ShaderData {
    rid: Rid,
    source: ShaderSource,
    structs: Vec<StructDecl>,
    uniforms: UniformLayout,
    resources: Vec<ResourceDecl>,
    blocks: Vec<UniformBlockDecl>,
}

impl ShaderData {
    /// Parses the given sources. Unknown declarations are dropped with a
    /// warning; parsing itself never fails.
    pub fn parse(rid: Rid, source: ShaderSource) -> Arc<ShaderData> {
        let mut data = ShaderData {
            rid,
            source,
            structs: Vec::new(),
            uniforms: UniformLayout::default(),
            resources: Vec::new(),
            blocks: Vec::new(),
        };

        for &domain in &ShaderDomain::ALL {
            let text = data.source.get(domain).to_owned();
            if text.is_empty() {
                continue;
            }

            let tokens = tokenize(&text);
            data.extract_structs(&tokens, domain);
            data.extract_uniforms(&tokens, domain);
        }

        data.uniforms.finalize();

        let mut register = 0;
        for resource in &mut data.resources {
            resource.register = register;
            register += resource.count;
        }

        Arc::new(data)
    }

    #[inline]
    pub fn rid(&self) -> Rid {
        self.rid
    }

    #[inline]
    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    #[inline]
    pub fn structs(&self) -> &[StructDecl] {
        &self.structs
    }

    #[inline]
    pub fn uniforms(&self) -> &UniformLayout {
        &self.uniforms
    }

    #[inline]
    pub fn resources(&self) -> &[ResourceDecl] {
        &self.resources
    }

    #[inline]
    pub fn blocks(&self) -> &[UniformBlockDecl] {
        &self.blocks
    }

    #[inline]
    pub fn find_uniform<T: AsRef<str>>(&self, name: T) -> Option<&UniformDecl> {
        self.uniforms.find(name)
    }

    /// Lays the uniform list out under the std140 rules.
    pub fn std140_layout(&self) -> Std140Block {
        let mut block = Std140Block::new();
        for decl in self.uniforms.iter() {
            if decl.ty == ShaderDataType::Struct {
                block.push_struct(&decl.name, &decl.fields, decl.count);
            } else {
                block.push(&decl.name, decl.ty, decl.count);
            }
        }
        block
    }

    fn find_struct(&self, name: &str, domain: ShaderDomain) -> Option<&StructDecl> {
        self.structs
            .iter()
            .find(|v| v.domain == domain && v.name == name)
    }

    fn extract_structs(&mut self, tokens: &[Token], domain: ShaderDomain) {
        let mut i = 0;
        let mut depth = 0i32;

        while i < tokens.len() {
            match tokens[i] {
                Token::Punct('{') => {
                    depth += 1;
                    i += 1;
                }
                Token::Punct('}') => {
                    depth -= 1;
                    i += 1;
                }
                ref token if depth == 0 && token.is_ident("struct") => {
                    let name = match tokens.get(i + 1).and_then(Token::as_ident) {
                        Some(v) => v.to_owned(),
                        None => {
                            i += 1;
                            continue;
                        }
                    };

                    if tokens.get(i + 2).map(|v| v.is_punct('{')) != Some(true) {
                        i += 1;
                        continue;
                    }

                    let (fields, next) = self.parse_fields(tokens, i + 3, domain, &name);
                    self.structs.push(StructDecl {
                        name,
                        domain,
                        fields,
                    });
                    i = next;
                }
                _ => i += 1,
            }
        }
    }

    /// Parses `TYPE NAME [N]? ;` items until the closing brace; returns the
    /// fields and the index just past it.
    fn parse_fields(
        &self,
        tokens: &[Token],
        start: usize,
        domain: ShaderDomain,
        owner: &str,
    ) -> (Vec<Field>, usize) {
        let mut fields = Vec::new();
        let mut i = start;

        loop {
            match tokens.get(i) {
                None => return (fields, i),
                Some(&Token::Punct('}')) => return (fields, i + 1),
                Some(&Token::Ident(ref ty_name)) => {
                    let name = match tokens.get(i + 1).and_then(Token::as_ident) {
                        Some(v) => v.to_owned(),
                        None => {
                            i = skip_statement(tokens, i);
                            continue;
                        }
                    };

                    let (count, mut j) = parse_array_suffix(tokens, i + 2);
                    if tokens.get(j).map(|v| v.is_punct(';')) != Some(true) {
                        i = skip_statement(tokens, i);
                        continue;
                    }
                    j += 1;

                    if let Some(ty) = ShaderDataType::from_glsl(ty_name) {
                        fields.push(Field {
                            name,
                            ty,
                            count,
                            fields: Vec::new(),
                        });
                    } else if let Some(decl) = self.find_struct(ty_name, domain) {
                        fields.push(Field {
                            name,
                            ty: ShaderDataType::Struct,
                            count,
                            fields: decl.fields.clone(),
                        });
                    } else {
                        warn!(
                            "unknown type '{}' for field '{}.{}', declaration dropped",
                            ty_name, owner, name
                        );
                    }

                    i = j;
                }
                Some(_) => i += 1,
            }
        }
    }

    fn extract_uniforms(&mut self, tokens: &[Token], domain: ShaderDomain) {
        let mut i = 0;
        let mut depth = 0i32;

        while i < tokens.len() {
            match tokens[i] {
                Token::Punct('{') => {
                    depth += 1;
                    i += 1;
                }
                Token::Punct('}') => {
                    depth -= 1;
                    i += 1;
                }
                ref token if depth == 0 && token.is_ident("layout") => {
                    i = self.parse_block(tokens, i, domain);
                }
                ref token if depth == 0 && token.is_ident("uniform") => {
                    i = self.parse_uniform(tokens, i + 1, domain);
                }
                _ => i += 1,
            }
        }
    }

    /// Parses `layout(std140) uniform NAME { .. } ;` starting at `layout`.
    /// Returns the index to resume scanning at.
    fn parse_block(&mut self, tokens: &[Token], start: usize, domain: ShaderDomain) -> usize {
        let mut i = start + 1;

        if tokens.get(i).map(|v| v.is_punct('(')) != Some(true) {
            return i;
        }
        i += 1;

        let std140 = tokens.get(i).map(|v| v.is_ident("std140")) == Some(true);
        while i < tokens.len() && !tokens[i].is_punct(')') {
            i += 1;
        }
        i += 1;

        if !std140 || tokens.get(i).map(|v| v.is_ident("uniform")) != Some(true) {
            return i;
        }
        i += 1;

        let name = match tokens.get(i).and_then(Token::as_ident) {
            Some(v) => v.to_owned(),
            None => return i,
        };
        i += 1;

        if tokens.get(i).map(|v| v.is_punct('{')) != Some(true) {
            return i;
        }

        // Skip the block body; member reflection is deferred until binding
        // points land.
        let mut depth = 0i32;
        while i < tokens.len() {
            match tokens[i] {
                Token::Punct('{') => depth += 1,
                Token::Punct('}') => {
                    depth -= 1;
                    if depth == 0 {
                        i += 1;
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        self.blocks.push(UniformBlockDecl { name, domain });
        skip_statement(tokens, i)
    }

    /// Parses `TYPE NAME [N]? ;` following the `uniform` keyword.
    fn parse_uniform(&mut self, tokens: &[Token], start: usize, domain: ShaderDomain) -> usize {
        let ty_name = match tokens.get(start).and_then(Token::as_ident) {
            Some(v) => v.to_owned(),
            None => return start,
        };

        let name = match tokens.get(start + 1).and_then(Token::as_ident) {
            Some(v) => v.to_owned(),
            None => return skip_statement(tokens, start),
        };

        let (count, mut i) = parse_array_suffix(tokens, start + 2);
        if tokens.get(i).map(|v| v.is_punct(';')) != Some(true) {
            return skip_statement(tokens, start);
        }
        i += 1;

        if let Some(ty) = ResourceType::from_glsl(&ty_name) {
            self.push_resource(ResourceDecl {
                name,
                ty,
                count,
                register: 0,
            });
        } else if let Some(ty) = ShaderDataType::from_glsl(&ty_name) {
            self.push_uniform(name, ty, count, Vec::new(), domain);
        } else if let Some(decl) = self.find_struct(&ty_name, domain) {
            let fields = decl.fields.clone();
            self.push_uniform(name, ShaderDataType::Struct, count, fields, domain);
        } else {
            warn!(
                "unknown type '{}' referenced by uniform '{}', declaration dropped",
                ty_name, name
            );
        }

        i
    }

    fn push_uniform(
        &mut self,
        name: String,
        ty: ShaderDataType,
        count: u32,
        fields: Vec<Field>,
        domain: ShaderDomain,
    ) {
        if let Some(existing) = self
            .uniforms
            .uniforms
            .iter_mut()
            .find(|v| v.name == name)
        {
            if existing.ty == ty && existing.count == count {
                existing.domains.insert(domain);
            } else {
                warn!(
                    "uniform '{}' redeclared with a different type, declaration dropped",
                    name
                );
            }
            return;
        }

        self.uniforms.uniforms.push(UniformDecl {
            name,
            ty,
            count,
            domains: domain.into(),
            fields,
            offset: 0,
        });
    }

    fn push_resource(&mut self, decl: ResourceDecl) {
        if let Some(existing) = self.resources.iter().find(|v| v.name == decl.name) {
            if existing.ty != decl.ty || existing.count != decl.count {
                warn!(
                    "resource '{}' redeclared with a different type, declaration dropped",
                    decl.name
                );
            }
            return;
        }

        self.resources.push(decl);
    }
}

/// Parses an optional `[N]` suffix; returns the element count and the index
/// after the suffix.
fn parse_array_suffix(tokens: &[Token], start: usize) -> (u32, usize) {
    if tokens.get(start).map(|v| v.is_punct('[')) == Some(true) {
        if let (Some(&Token::Number(count)), Some(true)) = (
            tokens.get(start + 1),
            tokens.get(start + 2).map(|v| v.is_punct(']')),
        ) {
            return (u32::max(count, 1), start + 3);
        }
    }
    (1, start)
}

/// Advances past the next `;`, stopping early at a closing brace.
fn skip_statement(tokens: &[Token], start: usize) -> usize {
    let mut i = start;
    while let Some(token) = tokens.get(i) {
        if token.is_punct(';') {
            return i + 1;
        }
        if token.is_punct('}') {
            return i;
        }
        i += 1;
    }
    i
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shader::source::ShaderSource;

    fn parse(vs: &str, fs: &str) -> Arc<ShaderData> {
        let source = ShaderSource::build().vertex(vs).fragment(fs).finish();
        ShaderData::parse(Rid::none(), source)
    }

    #[test]
    fn uniforms() {
        let data = parse("uniform float a;\nuniform vec3 b;", "");
        assert_eq!(data.uniforms().len(), 2);

        let a = data.find_uniform("a").unwrap();
        assert_eq!(a.ty, ShaderDataType::Float);
        assert_eq!(a.count, 1);
        assert!(a.domains.contains(ShaderDomain::Vertex));
        assert!(!a.domains.contains(ShaderDomain::Fragment));
    }

    #[test]
    fn buffer_offsets() {
        let data = parse("uniform float a;\nuniform vec3 b;\nuniform mat4 m;", "");
        // Slots are header + packed payload, in declaration order.
        assert_eq!(data.find_uniform("a").unwrap().offset(), 0);
        assert_eq!(data.find_uniform("b").unwrap().offset(), 12);
        assert_eq!(data.find_uniform("m").unwrap().offset(), 32);
        assert_eq!(data.uniforms().size(), 104);
    }

    #[test]
    fn domain_merge() {
        let data = parse("uniform vec4 tint;", "uniform vec4 tint;");
        assert_eq!(data.uniforms().len(), 1);

        let tint = data.find_uniform("tint").unwrap();
        assert!(tint.domains.contains(ShaderDomain::Vertex));
        assert!(tint.domains.contains(ShaderDomain::Fragment));
    }

    #[test]
    fn mismatching_redeclaration_dropped() {
        let data = parse("uniform vec4 tint;", "uniform vec3 tint;");
        assert_eq!(data.uniforms().len(), 1);
        assert_eq!(data.find_uniform("tint").unwrap().ty, ShaderDataType::Vec4);
        assert!(!data
            .find_uniform("tint")
            .unwrap()
            .domains
            .contains(ShaderDomain::Fragment));
    }

    #[test]
    fn samplers_are_resources() {
        let data = parse("", "uniform sampler2D t_albedo;\nuniform samplerCube t_sky;");
        assert!(data.uniforms().is_empty());
        assert_eq!(data.resources().len(), 2);
        assert_eq!(data.resources()[0].ty, ResourceType::Sampler2D);
        assert_eq!(data.resources()[0].register, 0);
        assert_eq!(data.resources()[1].register, 1);
    }

    #[test]
    fn structs() {
        let vs = "struct Light { vec3 position; float intensity; };\nuniform Light u_light;";
        let data = parse(vs, "");

        let light = data.find_uniform("u_light").unwrap();
        assert_eq!(light.ty, ShaderDataType::Struct);
        assert_eq!(light.fields.len(), 2);
        assert_eq!(light.capacity(), 16);
    }

    #[test]
    fn struct_is_domain_scoped() {
        // The struct lives in the vertex stage; the fragment uniform cannot
        // see it and gets dropped.
        let data = parse(
            "struct Light { vec3 position; };",
            "uniform Light u_light;",
        );
        assert!(data.find_uniform("u_light").is_none());
    }

    #[test]
    fn unknown_type_dropped() {
        let data = parse("uniform Missing u_thing;\nuniform float a;", "");
        assert_eq!(data.uniforms().len(), 1);
        assert!(data.find_uniform("a").is_some());
    }

    #[test]
    fn std140_blocks_are_recognized() {
        let vs = "layout(std140) uniform Globals { mat4 view; mat4 proj; };\nuniform float a;";
        let data = parse(vs, "");
        assert_eq!(data.blocks().len(), 1);
        assert_eq!(data.blocks()[0].name, "Globals");
        // Block members do not leak into the plain uniform list.
        assert_eq!(data.uniforms().len(), 1);
    }

    #[test]
    fn parse_is_deterministic() {
        let vs = "struct S { vec2 a; };\nuniform S s;\nuniform float arr[3];";
        let lhs = parse(vs, "uniform vec4 tint;");
        let rhs = parse(vs, "uniform vec4 tint;");

        assert_eq!(lhs.uniforms().len(), rhs.uniforms().len());
        for (l, r) in lhs.uniforms().iter().zip(rhs.uniforms().iter()) {
            assert_eq!(l.name, r.name);
            assert_eq!(l.offset(), r.offset());
            assert_eq!(l.capacity(), r.capacity());
        }
        assert_eq!(lhs.uniforms().size(), rhs.uniforms().size());
    }
}
