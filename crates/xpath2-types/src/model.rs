use crate::xdm::XdmAtomicValue;
use core::fmt;

/// Node items as seen by the value layer.
///
/// Navigation lives in the host; all this layer ever needs from a node is its
/// string value and the typed value produced by atomization.
pub trait XdmNode: Clone + fmt::Debug {
    fn string_value(&self) -> String;

    /// Atomized value of the node. Nodes without schema type information
    /// atomize to a single `xs:untypedAtomic`.
    fn typed_value(&self) -> Vec<XdmAtomicValue> {
        vec![XdmAtomicValue::UntypedAtomic(self.string_value())]
    }
}

/// Minimal node implementation for hosts without their own tree and for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleNode {
    text: String,
    typed: Option<Vec<XdmAtomicValue>>,
}

impl SimpleNode {
    /// Untyped node with the given string value.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            text: value.into(),
            typed: None,
        }
    }

    /// Node carrying a schema-typed value (e.g. a validated attribute).
    pub fn typed(value: XdmAtomicValue) -> Self {
        Self {
            text: value.string_value(),
            typed: Some(vec![value]),
        }
    }
}

impl XdmNode for SimpleNode {
    fn string_value(&self) -> String {
        self.text.clone()
    }

    fn typed_value(&self) -> Vec<XdmAtomicValue> {
        match &self.typed {
            Some(values) => values.clone(),
            None => vec![XdmAtomicValue::UntypedAtomic(self.text.clone())],
        }
    }
}
