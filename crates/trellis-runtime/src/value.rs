//! Runtime value representation
//!
//! Tagged sum type covering everything an argument or result can be:
//! - Text: quoted or bare literal text (reference-counted, immutable)
//! - Int: signed integer literal
//! - Pattern: an already-resolved call result, opaque to the core
//! - Seq: the packed trailing arguments of a variadic call
//!
//! No floating-point, boolean, or null values exist in this model.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::kind::KindId;

/// The opaque result of a resolved call chain.
///
/// The core only ever looks at the kind (for compatibility checks); the
/// payload belongs to whoever registered the callable that produced it and
/// is recovered with [`PatternValue::downcast_ref`]. Clone is a refcount
/// bump.
#[derive(Clone)]
pub struct PatternValue {
    kind: KindId,
    payload: Arc<dyn Any + Send + Sync>,
}

impl PatternValue {
    pub fn new(kind: KindId, payload: Arc<dyn Any + Send + Sync>) -> Self {
        Self { kind, payload }
    }

    pub fn kind(&self) -> KindId {
        self.kind
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }
}

impl fmt::Debug for PatternValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternValue")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Payload identity, not structural equality: two pattern values are equal
/// when they share the same kind and the same payload allocation.
impl PartialEq for PatternValue {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

/// Runtime value type
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Literal text (delimiters already stripped for quoted literals)
    Text(Arc<str>),
    /// Signed integer literal
    Int(i64),
    /// Resolved pattern value (opaque beyond its kind)
    Pattern(PatternValue),
    /// Packed variadic tail (ordered, possibly empty)
    Seq(Arc<Vec<Value>>),
}

impl Value {
    pub fn text(s: impl AsRef<str>) -> Self {
        Value::Text(Arc::from(s.as_ref()))
    }

    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    pub fn seq(items: Vec<Value>) -> Self {
        Value::Seq(Arc::new(items))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&PatternValue> {
        match self {
            Value::Pattern(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Human-readable tag name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Int(_) => "int",
            Value::Pattern(_) => "pattern",
            Value::Seq(_) => "seq",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::KindTable;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::text("abc").as_text(), Some("abc"));
        assert_eq!(Value::int(42).as_int(), Some(42));
        assert_eq!(Value::text("abc").as_int(), None);
        assert_eq!(Value::int(42).as_text(), None);
    }

    #[test]
    fn test_seq_preserves_order() {
        let seq = Value::seq(vec![Value::text("a"), Value::int(1)]);
        let items = seq.as_seq().unwrap();
        assert_eq!(items[0], Value::text("a"));
        assert_eq!(items[1], Value::int(1));
    }

    #[test]
    fn test_pattern_equality_is_payload_identity() {
        let mut table = KindTable::new();
        let kind = table.declare("P", None);

        let payload: Arc<dyn std::any::Any + Send + Sync> = Arc::new(7u32);
        let a = PatternValue::new(kind, payload.clone());
        let b = PatternValue::new(kind, payload);
        let c = PatternValue::new(kind, Arc::new(7u32));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_pattern_downcast() {
        let mut table = KindTable::new();
        let kind = table.declare("P", None);
        let value = PatternValue::new(kind, Arc::new("payload".to_string()));

        assert_eq!(value.downcast_ref::<String>().unwrap(), "payload");
        assert!(value.downcast_ref::<u32>().is_none());
    }
}
