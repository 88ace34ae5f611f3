//! The declarative node capability that rules are built from.
//!
//! Any tree with a tag name, an ordered list of leaf values and ordered
//! children can describe a rule; the concrete syntax is up to the parser
//! (see sdl.rs for the one shipped here).

/// A typed leaf value attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Value {
    /// The string payload, or None for any non-string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

pub trait Node: Sized {
    fn name(&self) -> &str;
    fn values(&self) -> &[Value];
    fn children(&self) -> &[Self];
}
