use std::collections::BTreeMap;
use std::fmt;

/// The intermediate representation between values and URI strings.
///
/// Both directions pivot through this tree: encoding goes
/// value → `Node` → string and decoding goes string → `Node` → value.
/// A tree is built per call and consumed by that same call.
#[derive(Clone, PartialEq, Eq)]
pub enum Node {
    /// The value was never produced, e.g. a `None` optional.
    /// Distinct from an empty primitive or an empty collection.
    Unset,
    /// A scalar, already stringified but not yet escaped.
    Primitive(String),
    Array(Vec<Node>),
    /// Keyed members. The map is only used for lookup; the order members
    /// are written in is decided by the writer.
    Dictionary(BTreeMap<String, Node>),
}

/// The top-level result of parsing, one entry per key found in the input.
pub type Root = BTreeMap<String, Node>;

impl Node {
    /// A short name for the shape of the node, used in error messages.
    pub(crate) fn shape(&self) -> &'static str {
        match self {
            Node::Unset => "an unset value",
            Node::Primitive(_) => "a primitive",
            Node::Array(_) => "an array",
            Node::Dictionary(_) => "a dictionary",
        }
    }

    /// Appends another occurrence of the same key, turning the node into an
    /// array on the second occurrence.
    pub(crate) fn push(&mut self, value: Node) {
        match self {
            Node::Unset => *self = value,
            Node::Array(items) => items.push(value),
            existing => {
                let first = std::mem::replace(existing, Node::Unset);
                *existing = Node::Array(vec![first, value]);
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Unset => write!(f, "Unset"),
            Node::Primitive(s) => write!(f, "{s:?}"),
            Node::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Node::Dictionary(map) => f.debug_map().entries(map.iter()).finish(),
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Primitive(s.to_owned())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Primitive(s)
    }
}

#[cfg(test)]
mod test {
    use super::Node;

    #[test]
    fn push_promotes_to_array() {
        let mut node = Node::Unset;
        node.push("a".into());
        assert_eq!(node, Node::from("a"));
        node.push("b".into());
        node.push("c".into());
        assert_eq!(node, Node::Array(vec!["a".into(), "b".into(), "c".into()]));
    }
}
