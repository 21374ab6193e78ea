//! Rendering of a [`Node`] into its on-wire string.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::encode::encode_into;
use crate::config::{Config, Style};
use crate::error::{EncodingError, EncodingErrorKind};
use crate::node::Node;

type Result<T> = std::result::Result<T, EncodingError>;

/// Writes nodes according to a [`Config`].
///
/// The writer only ever appends to its buffer: each call to
/// [`NodeWriter::write`] consumes the writer and returns the finished string.
pub(crate) struct NodeWriter {
    config: Config,
    out: String,
}

/// Dictionary members in output order: case-insensitive descending by key,
/// unset members left out.
fn sorted_entries(map: &BTreeMap<String, Node>) -> Vec<(&str, &Node)> {
    let mut entries: Vec<(&str, &Node)> = map
        .iter()
        .filter(|(_, node)| !matches!(node, Node::Unset))
        .map(|(key, node)| (key.as_str(), node))
        .collect();
    entries.sort_by_cached_key(|(key, _)| Reverse((key.to_lowercase(), *key)));
    entries
}

/// Unwraps a member of a single-level container.
fn member<'a>(node: &'a Node, style: Style, segment: &str) -> Result<&'a str> {
    match node {
        Node::Primitive(value) => Ok(value),
        Node::Unset => Ok(""),
        Node::Array(_) | Node::Dictionary(_) => {
            Err(EncodingError::new(EncodingErrorKind::NestedContainer(style)).at(segment))
        }
    }
}

impl NodeWriter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            out: String::with_capacity(64),
        }
    }

    pub fn write(mut self, node: &Node, key: &str) -> Result<String> {
        match node {
            Node::Unset => self.write_unset(key),
            Node::Primitive(value) => self.write_primitive(key, value),
            Node::Array(items) => self.write_array(key, items)?,
            Node::Dictionary(map) => self.write_dictionary(key, map)?,
        }
        Ok(self.out)
    }

    fn escaped(&mut self, s: &str) {
        encode_into(
            &mut self.out,
            s,
            self.config.style,
            self.config.space_escaping,
        );
    }

    fn separator(&mut self, first: &mut bool, separator: &str) {
        if *first {
            *first = false;
        } else {
            self.out.push_str(separator);
        }
    }

    /// The separator between members of a non-exploded container.
    fn list_delimiter(&self) -> &'static str {
        match self.config.style {
            Style::SpaceDelimited => "%20",
            Style::PipeDelimited => "|",
            _ => ",",
        }
    }

    /// Writes `key=value`, or `key` alone for matrix style empty values.
    fn write_pair(&mut self, key: &str, value: &str) {
        self.escaped(key);
        if self.config.style == Style::Matrix && value.is_empty() {
            return;
        }
        self.out.push('=');
        self.escaped(value);
    }

    fn write_unset(&mut self, key: &str) {
        if !self.config.always_emit_key {
            return;
        }
        match self.config.style {
            Style::Form | Style::SpaceDelimited | Style::PipeDelimited | Style::DeepObject => {
                self.escaped(key);
            }
            Style::Matrix => {
                self.out.push(';');
                self.escaped(key);
            }
            // these styles never carry the key on the wire
            Style::Simple | Style::Label => {}
        }
    }

    fn write_primitive(&mut self, key: &str, value: &str) {
        match self.config.style {
            Style::Form | Style::SpaceDelimited | Style::PipeDelimited | Style::DeepObject => {
                self.escaped(key);
                self.out.push('=');
                self.escaped(value);
            }
            Style::Simple => self.escaped(value),
            Style::Label => {
                self.out.push('.');
                self.escaped(value);
            }
            Style::Matrix => {
                self.out.push(';');
                self.write_pair(key, value);
            }
        }
    }

    /// Writes the prefix of a non-exploded container, e.g. `key=` for form.
    fn write_container_prefix(&mut self, key: &str) {
        match self.config.style {
            Style::Form | Style::SpaceDelimited | Style::PipeDelimited | Style::DeepObject => {
                self.escaped(key);
                self.out.push('=');
            }
            Style::Simple => {}
            Style::Label => self.out.push('.'),
            Style::Matrix => {
                self.out.push(';');
                self.escaped(key);
                self.out.push('=');
            }
        }
    }

    /// Empty containers only have a wire form when not exploded in a
    /// form-like style, where they render as `key=`.
    fn write_empty_container(&mut self, key: &str) {
        if !self.config.is_exploded() && self.config.style.is_form_like() {
            self.write_container_prefix(key);
        }
    }

    fn write_array(&mut self, key: &str, items: &[Node]) -> Result<()> {
        let style = self.config.style;
        if style == Style::DeepObject {
            return Err(EncodingError::new(EncodingErrorKind::UnsupportedStyle {
                style,
                shape: "an array",
            }));
        }
        if items.is_empty() {
            self.write_empty_container(key);
            return Ok(());
        }

        let mut first = true;
        if self.config.is_exploded() {
            for (index, item) in items.iter().enumerate() {
                let value = member(item, style, &index.to_string())?;
                match style {
                    Style::Simple => {
                        self.separator(&mut first, ",");
                        self.escaped(value);
                    }
                    Style::Label => {
                        self.out.push('.');
                        self.escaped(value);
                    }
                    Style::Matrix => {
                        self.out.push(';');
                        self.write_pair(key, value);
                    }
                    _ => {
                        self.separator(&mut first, "&");
                        self.escaped(key);
                        self.out.push('=');
                        self.escaped(value);
                    }
                }
            }
        } else {
            let delimiter = self.list_delimiter();
            self.write_container_prefix(key);
            for (index, item) in items.iter().enumerate() {
                let value = member(item, style, &index.to_string())?;
                self.separator(&mut first, delimiter);
                self.escaped(value);
            }
        }
        Ok(())
    }

    fn write_dictionary(&mut self, key: &str, map: &BTreeMap<String, Node>) -> Result<()> {
        let style = self.config.style;
        if style == Style::DeepObject {
            let mut prefix = String::new();
            encode_into(&mut prefix, key, style, self.config.space_escaping);
            let mut first = true;
            return self.write_deep_object(&prefix, map, &mut first);
        }

        let entries = sorted_entries(map);
        if entries.is_empty() {
            self.write_empty_container(key);
            return Ok(());
        }

        let mut first = true;
        if self.config.is_exploded() {
            for (name, node) in entries {
                let value = member(node, style, name)?;
                match style {
                    Style::Simple => {
                        self.separator(&mut first, ",");
                        self.escaped(name);
                        self.out.push('=');
                        self.escaped(value);
                    }
                    Style::Label => {
                        self.out.push('.');
                        self.escaped(name);
                        self.out.push('=');
                        self.escaped(value);
                    }
                    Style::Matrix => {
                        self.out.push(';');
                        self.write_pair(name, value);
                    }
                    _ => {
                        self.separator(&mut first, "&");
                        self.escaped(name);
                        self.out.push('=');
                        self.escaped(value);
                    }
                }
            }
        } else {
            let delimiter = self.list_delimiter();
            self.write_container_prefix(key);
            for (name, node) in entries {
                let value = member(node, style, name)?;
                self.separator(&mut first, delimiter);
                self.escaped(name);
                self.out.push_str(delimiter);
                self.escaped(value);
            }
        }
        Ok(())
    }

    /// Writes `prefix[name]=value` pairs, recursing into nested dictionaries
    /// as `prefix[name][inner]=value`.
    fn write_deep_object(
        &mut self,
        prefix: &str,
        map: &BTreeMap<String, Node>,
        first: &mut bool,
    ) -> Result<()> {
        for (name, node) in sorted_entries(map) {
            let mut path = String::with_capacity(prefix.len() + name.len() + 2);
            path.push_str(prefix);
            path.push('[');
            encode_into(&mut path, name, Style::DeepObject, self.config.space_escaping);
            path.push(']');

            match node {
                Node::Primitive(value) => {
                    self.separator(first, "&");
                    self.out.push_str(&path);
                    self.out.push('=');
                    self.escaped(value);
                }
                Node::Dictionary(inner) => {
                    self.write_deep_object(&path, inner, first)
                        .map_err(|e| e.at(name))?;
                }
                Node::Array(_) => {
                    return Err(EncodingError::new(EncodingErrorKind::UnsupportedStyle {
                        style: Style::DeepObject,
                        shape: "an array",
                    })
                    .at(name));
                }
                Node::Unset => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use super::NodeWriter;
    use crate::config::{Config, SpaceEscaping, Style};
    use crate::node::Node;

    fn array(items: &[&str]) -> Node {
        Node::Array(items.iter().map(|s| Node::from(*s)).collect())
    }

    fn dictionary(entries: &[(&str, &str)]) -> Node {
        Node::Dictionary(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), Node::from(*v)))
                .collect(),
        )
    }

    fn write(config: Config, node: &Node, key: &str) -> String {
        NodeWriter::new(config).write(node, key).unwrap()
    }

    /// The examples from the OpenAPI 3.0 style table, with `color` set to
    /// `blue`, `[blue, black, brown]` and `{R: 100, G: 200, B: 150}`.
    #[test]
    fn openapi_style_table() {
        let primitive = Node::from("blue");
        let list = array(&["blue", "black", "brown"]);
        let object = dictionary(&[("R", "100"), ("G", "200"), ("B", "150")]);

        let cases: &[(Style, bool, [&str; 3])] = &[
            (Style::Matrix, false, [";color=blue", ";color=blue,black,brown", ";color=R,100,G,200,B,150"]),
            (Style::Matrix, true, [";color=blue", ";color=blue;color=black;color=brown", ";R=100;G=200;B=150"]),
            (Style::Label, false, [".blue", ".blue,black,brown", ".R,100,G,200,B,150"]),
            (Style::Label, true, [".blue", ".blue.black.brown", ".R=100.G=200.B=150"]),
            (Style::Form, false, ["color=blue", "color=blue,black,brown", "color=R,100,G,200,B,150"]),
            (Style::Form, true, ["color=blue", "color=blue&color=black&color=brown", "R=100&G=200&B=150"]),
            (Style::Simple, false, ["blue", "blue,black,brown", "R,100,G,200,B,150"]),
            (Style::Simple, true, ["blue", "blue,black,brown", "R=100,G=200,B=150"]),
            (Style::SpaceDelimited, false, ["color=blue", "color=blue%20black%20brown", "color=R%20100%20G%20200%20B%20150"]),
            (Style::PipeDelimited, false, ["color=blue", "color=blue|black|brown", "color=R|100|G|200|B|150"]),
        ];

        for (style, explode, [p, l, o]) in cases {
            let config = Config::new().style(*style).explode(*explode);
            assert_eq!(write(config, &primitive, "color"), *p, "{style} {explode}");
            assert_eq!(write(config, &list, "color"), *l, "{style} {explode}");
            assert_eq!(write(config, &object, "color"), *o, "{style} {explode}");
        }
    }

    #[test]
    fn deep_object() {
        let config = Config::new().style(Style::DeepObject);
        let object = dictionary(&[("semi", ";"), ("dot", ".")]);
        assert_eq!(write(config, &object, "keys"), "keys[semi]=%3B&keys[dot]=.");

        let mut inner = BTreeMap::new();
        inner.insert("city".to_owned(), Node::from("Carrot City"));
        let mut outer = BTreeMap::new();
        outer.insert("address".to_owned(), Node::Dictionary(inner));
        outer.insert("id".to_owned(), Node::from("1"));
        assert_eq!(
            write(config, &Node::Dictionary(outer), "user"),
            "user[id]=1&user[address][city]=Carrot%20City"
        );
    }

    #[test]
    fn deep_object_rejects_arrays() {
        let config = Config::new().style(Style::DeepObject);
        let err = NodeWriter::new(config)
            .write(&array(&["a"]), "list")
            .unwrap_err();
        assert!(err.to_string().contains("deepObject"), "got: {err}");
    }

    #[test]
    fn nested_containers_are_rejected() {
        let config = Config::new().style(Style::Form).explode(false);
        let node = Node::Array(vec![array(&["a"])]);
        let err = NodeWriter::new(config).write(&node, "list").unwrap_err();
        assert_eq!(err.path(), ["0"]);
    }

    #[test]
    fn unset_and_empty() {
        let form = Config::new().style(Style::Form).explode(false);
        assert_eq!(write(form, &Node::Unset, "name"), "");
        assert_eq!(write(form.always_emit_key(true), &Node::Unset, "name"), "name");
        assert_eq!(
            write(form.style(Style::Matrix).always_emit_key(true), &Node::Unset, "name"),
            ";name"
        );
        assert_eq!(write(form, &array(&[]), "name"), "name=");
        assert_eq!(write(form.explode(true), &array(&[]), "name"), "");
        assert_eq!(write(form.style(Style::Matrix), &Node::from(""), "name"), ";name");
    }

    #[test]
    fn empty_key() {
        let config = Config::new();
        assert_eq!(write(config, &Node::from("foo"), ""), "=foo");
    }

    #[test]
    fn unset_members_are_skipped() {
        let mut map = BTreeMap::new();
        map.insert("a".to_owned(), Node::from("1"));
        map.insert("b".to_owned(), Node::Unset);
        assert_eq!(write(Config::new(), &Node::Dictionary(map), "x"), "a=1");
    }

    #[test]
    fn plus_spaces() {
        let config = Config::new().space_escaping(SpaceEscaping::Plus);
        assert_eq!(write(config, &Node::from("a b"), "the key"), "the+key=a+b");
    }

    #[test]
    fn dictionary_order_is_case_insensitive_descending() {
        let object = dictionary(&[("b", "1"), ("A", "2"), ("c", "3")]);
        assert_eq!(write(Config::new(), &object, "x"), "c=3&b=1&A=2");
    }
}
