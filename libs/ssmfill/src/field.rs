use std::fmt;

/// Kind of a populatable leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Float,
    Bool,
    Unsupported,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Int => "integer",
            FieldKind::Float => "float",
            FieldKind::Bool => "boolean",
            FieldKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Signed integer field of any width.
#[derive(Debug)]
pub enum IntSlot<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
}

#[derive(Debug)]
pub enum FloatSlot<'a> {
    F32(&'a mut f32),
    F64(&'a mut f64),
}

/// Mutable view of one leaf field, tagged by kind.
///
/// Produced by [`Scalar::slot`] for supported types. Annotated fields of any
/// other type are described by `Unsupported` and are never fetched.
#[derive(Debug)]
pub enum FieldSlot<'a> {
    Text(&'a mut String),
    Int(IntSlot<'a>),
    Float(FloatSlot<'a>),
    Bool(&'a mut bool),
    Unsupported { type_name: &'static str },
}

impl FieldSlot<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldSlot::Text(_) => FieldKind::Text,
            FieldSlot::Int(_) => FieldKind::Int,
            FieldSlot::Float(_) => FieldKind::Float,
            FieldSlot::Bool(_) => FieldKind::Bool,
            FieldSlot::Unsupported { .. } => FieldKind::Unsupported,
        }
    }
}

/// A type that can be assigned from a fetched parameter.
///
/// Implemented for `String`, the signed integers, `f32`, `f64` and `bool`.
pub trait Scalar {
    fn slot(&mut self) -> FieldSlot<'_>;
}

impl Scalar for String {
    fn slot(&mut self) -> FieldSlot<'_> {
        FieldSlot::Text(self)
    }
}

impl Scalar for bool {
    fn slot(&mut self) -> FieldSlot<'_> {
        FieldSlot::Bool(self)
    }
}

macro_rules! scalar_impl {
    ($($ty:ty => $variant:ident($slot:ident::$inner:ident),)*) => {
        $(
            impl Scalar for $ty {
                fn slot(&mut self) -> FieldSlot<'_> {
                    FieldSlot::$variant($slot::$inner(self))
                }
            }
        )*
    };
}

scalar_impl! {
    i8 => Int(IntSlot::I8),
    i16 => Int(IntSlot::I16),
    i32 => Int(IntSlot::I32),
    i64 => Int(IntSlot::I64),
    isize => Int(IntSlot::Isize),
    f32 => Float(FloatSlot::F32),
    f64 => Float(FloatSlot::F64),
}
