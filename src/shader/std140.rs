//! The std140 layout pass. Offsets computed here satisfy the uniform-block
//! alignment rules: scalars align to 4 bytes, vec2 to 8, vec3/vec4 to 16,
//! array strides round up to 16, matrices are column arrays of vec4 and
//! structs sit on 16 byte boundaries.

use super::reflect::Field;
use super::types::{round_up, MatrixLayout, ShaderDataType};

pub const STD140_STRUCT_ALIGNMENT: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Std140Item {
    pub name: String,
    pub ty: ShaderDataType,
    pub count: u32,
    pub matrix_layout: MatrixLayout,
    pub front_padding: u32,
    pub offset: u32,
    pub stride: u32,
}

/// A uniform block laid out under the std140 rules, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Std140Block {
    items: Vec<Std140Item>,
    cursor: u32,
}

impl Std140Block {
    pub fn new() -> Self {
        Std140Block::default()
    }

    pub fn push(&mut self, name: &str, ty: ShaderDataType, count: u32) {
        debug_assert!(ty != ShaderDataType::Struct);

        let alignment = ty.std140_alignment(count > 1);
        let offset = round_up(self.cursor, alignment);
        let stride = ty.std140_size(count);

        self.items.push(Std140Item {
            name: name.to_owned(),
            ty,
            count,
            matrix_layout: MatrixLayout::ColumnMajor,
            front_padding: offset - self.cursor,
            offset,
            stride,
        });

        self.cursor = offset + stride;
    }

    /// Lays a struct-typed uniform out recursively; every element starts and
    /// ends on a 16 byte boundary.
    pub fn push_struct(&mut self, name: &str, fields: &[Field], count: u32) {
        self.cursor = round_up(self.cursor, STD140_STRUCT_ALIGNMENT);

        for element in 0..count {
            for field in fields {
                let label = if count > 1 {
                    format!("{}[{}].{}", name, element, field.name)
                } else {
                    format!("{}.{}", name, field.name)
                };

                if field.ty == ShaderDataType::Struct {
                    self.push_struct(&label, &field.fields, field.count);
                } else {
                    self.push(&label, field.ty, field.count);
                }
            }
            self.cursor = round_up(self.cursor, STD140_STRUCT_ALIGNMENT);
        }
    }

    #[inline]
    pub fn items(&self) -> &[Std140Item] {
        &self.items
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn item<T: AsRef<str>>(&self, name: T) -> Option<&Std140Item> {
        let name = name.as_ref();
        self.items.iter().find(|v| v.name == name)
    }

    /// Total block size; whole blocks pad out to a 16 byte boundary.
    pub fn size(&self) -> u32 {
        round_up(self.cursor, STD140_STRUCT_ALIGNMENT)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scalars_and_vectors() {
        let mut block = Std140Block::new();
        block.push("a", ShaderDataType::Float, 1);
        block.push("b", ShaderDataType::Vec3, 1);
        block.push("m", ShaderDataType::Mat4, 1);
        block.push("arr", ShaderDataType::Float, 4);

        assert_eq!(block.item("a").unwrap().offset, 0);
        assert_eq!(block.item("b").unwrap().offset, 16);
        assert_eq!(block.item("m").unwrap().offset, 32);
        assert_eq!(block.item("arr").unwrap().offset, 96);

        assert_eq!(block.item("a").unwrap().stride, 4);
        assert_eq!(block.item("b").unwrap().stride, 12);
        assert_eq!(block.item("m").unwrap().stride, 64);
        assert_eq!(block.item("arr").unwrap().stride, 64);

        assert_eq!(block.size(), 160);
    }

    #[test]
    fn vec2_packs_after_scalar() {
        let mut block = Std140Block::new();
        block.push("a", ShaderDataType::Float, 1);
        block.push("b", ShaderDataType::Vec2, 1);

        // vec2 aligns to 8, not 16.
        assert_eq!(block.item("b").unwrap().offset, 8);
        assert_eq!(block.item("b").unwrap().front_padding, 4);
    }

    #[test]
    fn alignment_invariant() {
        let mut block = Std140Block::new();
        block.push("a", ShaderDataType::Bool, 1);
        block.push("b", ShaderDataType::Vec3, 1);
        block.push("c", ShaderDataType::Vec2, 3);
        block.push("d", ShaderDataType::Mat3, 1);
        block.push("e", ShaderDataType::Float, 1);

        for item in block.items() {
            let alignment = item.ty.std140_alignment(item.count > 1);
            assert_eq!(item.offset % alignment, 0, "item {}", item.name);
        }
    }

    #[test]
    fn structs_pad_to_sixteen() {
        let fields = vec![
            Field {
                name: "position".to_owned(),
                ty: ShaderDataType::Vec3,
                count: 1,
                fields: Vec::new(),
            },
            Field {
                name: "intensity".to_owned(),
                ty: ShaderDataType::Float,
                count: 1,
                fields: Vec::new(),
            },
        ];

        let mut block = Std140Block::new();
        block.push("lead", ShaderDataType::Float, 1);
        block.push_struct("light", &fields, 2);

        // Struct elements start on 16 byte boundaries.
        assert_eq!(block.item("light[0].position").unwrap().offset, 16);
        assert_eq!(block.item("light[0].intensity").unwrap().offset, 28);
        assert_eq!(block.item("light[1].position").unwrap().offset, 32);
        assert_eq!(block.size(), 48);
    }
}
