use std::collections::BTreeMap;

use crate::config::{Config, Style};
use crate::error::{DecodingError, Result};
use crate::node::{Node, Root};

mod decode;

/// Parses `input` into a [`Root`] following the configured style.
///
/// Styles which never carry a key on the wire (`simple`, `label`) store
/// their content under `key`. All other styles use the keys found in the
/// input, so the root may contain several entries.
pub fn parse(input: &str, key: &str, config: Config) -> Result<Root> {
    Parser::new(input, config).parse_root(key)
}

/// A stateless single-pass parser over an encoded string.
///
/// Non-exploded arrays and objects look the same on the wire (`a,b,c,d`),
/// so delimited content is always parsed as a flat `Array`. Pairing up the
/// elements into an object is left to the deserializer, which knows the
/// target type.
struct Parser<'a> {
    input: &'a str,
    config: Config,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, config: Config) -> Self {
        Parser { input, config }
    }

    fn style(&self) -> Style {
        self.config.style
    }

    fn malformed(&self, fragment: &str, reason: &'static str) -> DecodingError {
        DecodingError::malformed(fragment, self.style(), reason)
    }

    fn decode(&self, s: &str) -> Result<String> {
        decode::decode(s, self.config).map(|s| s.into_owned())
    }

    fn parse_root(&self, key: &str) -> Result<Root> {
        let mut root = Root::new();
        match self.style() {
            Style::Form | Style::SpaceDelimited | Style::PipeDelimited => {
                self.parse_pairs(self.input, '&', &mut root)?;
            }
            Style::Matrix => {
                if let Some(rest) = self.strip_prefix(';')? {
                    self.parse_pairs(rest, ';', &mut root)?;
                }
            }
            Style::Simple => {
                let node = self.parse_members(self.input, ',')?;
                root.insert(key.to_owned(), node);
            }
            Style::Label => {
                if let Some(rest) = self.strip_prefix('.')? {
                    let separator = if self.config.explode { '.' } else { ',' };
                    root.insert(key.to_owned(), self.parse_members(rest, separator)?);
                }
            }
            Style::DeepObject => self.parse_deep_object(&mut root)?,
        }
        Ok(root)
    }

    /// Strips the leading operator of label and matrix styles. Empty input
    /// has no operator and yields `None`.
    fn strip_prefix(&self, prefix: char) -> Result<Option<&'a str>> {
        if self.input.is_empty() {
            return Ok(None);
        }
        match self.input.strip_prefix(prefix) {
            Some(rest) => Ok(Some(rest)),
            None => Err(self.malformed(self.input, "missing leading operator")),
        }
    }

    /// The delimiter joining the members of a non-exploded value.
    fn list_delimiter(&self) -> &'static str {
        match self.style() {
            Style::SpaceDelimited => "%20",
            Style::PipeDelimited => "|",
            _ => ",",
        }
    }

    /// Parses `key=value` pairs separated by `separator`, accumulating
    /// repeated keys into arrays.
    fn parse_pairs(&self, input: &str, separator: char, root: &mut Root) -> Result<()> {
        for pair in input.split(separator).filter(|pair| !pair.is_empty()) {
            let (key, node) = match pair.split_once('=') {
                Some((key, value)) => (self.decode(key)?, self.parse_value(value)?),
                // a bare key signals presence without a value, except for
                // matrix style where it is how an empty value is written
                None if self.style() == Style::Matrix => (self.decode(pair)?, Node::from("")),
                None => (self.decode(pair)?, Node::Unset),
            };
            root.entry(key).or_insert(Node::Unset).push(node);
        }
        Ok(())
    }

    /// Parses the value part of a pair, splitting it into an array when it
    /// holds several non-exploded members.
    fn parse_value(&self, value: &str) -> Result<Node> {
        if self.config.is_exploded() {
            return Ok(Node::Primitive(self.decode(value)?));
        }
        self.parse_list(value, self.list_delimiter())
    }

    fn parse_list(&self, value: &str, delimiter: &str) -> Result<Node> {
        if !value.contains(delimiter) {
            return Ok(Node::Primitive(self.decode(value)?));
        }
        value
            .split(delimiter)
            .map(|member| self.decode(member).map(Node::Primitive))
            .collect::<Result<Vec<_>>>()
            .map(Node::Array)
    }

    /// Parses the content of a keyless style. Exploded objects carry
    /// `name=value` members, which are collected into a dictionary.
    fn parse_members(&self, input: &str, separator: char) -> Result<Node> {
        if !self.config.explode || !input.contains('=') {
            let mut buffer = [0; 4];
            return self.parse_list(input, separator.encode_utf8(&mut buffer));
        }

        let mut map = BTreeMap::new();
        for member in input.split(separator) {
            let Some((name, value)) = member.split_once('=') else {
                return Err(self.malformed(member, "expected a `name=value` member"));
            };
            map.entry(self.decode(name)?)
                .or_insert(Node::Unset)
                .push(Node::Primitive(self.decode(value)?));
        }
        Ok(Node::Dictionary(map))
    }

    /// Parses `key[a][b]=value` pairs into nested dictionaries.
    fn parse_deep_object(&self, root: &mut Root) -> Result<()> {
        for pair in self.input.split('&').filter(|pair| !pair.is_empty()) {
            let (raw_key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, Node::Primitive(self.decode(value)?)),
                None => (pair, Node::Unset),
            };

            let Some(open) = raw_key.find('[') else {
                root.entry(self.decode(raw_key)?)
                    .or_insert(Node::Unset)
                    .push(value);
                continue;
            };

            let segments = self.bracket_segments(&raw_key[open..])?;
            let mut node = root
                .entry(self.decode(&raw_key[..open])?)
                .or_insert(Node::Unset);
            for segment in segments {
                let map = self.expect_dictionary(node, pair)?;
                node = map.entry(segment).or_insert(Node::Unset);
            }
            if matches!(node, Node::Dictionary(_)) {
                return Err(self.malformed(
                    pair,
                    "the same key is used for both a value and a nested object",
                ));
            }
            node.push(value);
        }
        Ok(())
    }

    /// Splits `[a][b]` into its decoded segments.
    fn bracket_segments(&self, mut rest: &str) -> Result<Vec<String>> {
        let mut segments = Vec::new();
        while !rest.is_empty() {
            let Some(inner) = rest.strip_prefix('[') else {
                return Err(self.malformed(rest, "expected `[` after a nested key"));
            };
            let Some(close) = inner.find(']') else {
                return Err(self.malformed(rest, "unterminated `[` in key"));
            };
            segments.push(self.decode(&inner[..close])?);
            rest = &inner[close + 1..];
        }
        Ok(segments)
    }

    fn expect_dictionary<'n>(
        &self,
        node: &'n mut Node,
        pair: &str,
    ) -> Result<&'n mut BTreeMap<String, Node>> {
        if matches!(node, Node::Unset) {
            *node = Node::Dictionary(BTreeMap::new());
        }
        match node {
            Node::Dictionary(map) => Ok(map),
            _ => Err(self.malformed(
                pair,
                "the same key is used for both a value and a nested object",
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::parse;
    use crate::config::{Config, SpaceEscaping, Style};
    use crate::error::DecodingError;
    use crate::node::{Node, Root};

    fn config(style: Style, explode: bool) -> Config {
        Config::new().style(style).explode(explode)
    }

    fn root<const N: usize>(entries: [(&str, Node); N]) -> Root {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect()
    }

    fn array(items: &[&str]) -> Node {
        Node::Array(items.iter().map(|s| Node::from(*s)).collect())
    }

    #[test]
    fn parse_empty() {
        for style in [Style::Form, Style::Matrix, Style::Label, Style::DeepObject] {
            assert_eq!(parse("", "name", config(style, true)).unwrap(), Root::new());
        }
        assert_eq!(
            parse("", "name", config(Style::Simple, false)).unwrap(),
            root([("name", Node::from(""))])
        );
    }

    #[test]
    fn parse_form() {
        let parsed = parse("color=red,green,blue", "color", config(Style::Form, false)).unwrap();
        assert_eq!(parsed, root([("color", array(&["red", "green", "blue"]))]));

        let parsed = parse(
            "color=red&color=green&color=blue",
            "color",
            config(Style::Form, true),
        )
        .unwrap();
        assert_eq!(parsed, root([("color", array(&["red", "green", "blue"]))]));

        // commas are structural only when not exploded
        let parsed = parse("name=a,b", "name", config(Style::Form, true)).unwrap();
        assert_eq!(parsed, root([("name", Node::from("a,b"))]));
    }

    #[test]
    fn parse_form_multiple_keys() {
        let parsed = parse("a=1&b=&c", "", config(Style::Form, true)).unwrap();
        assert_eq!(
            parsed,
            root([
                ("a", Node::from("1")),
                ("b", Node::from("")),
                ("c", Node::Unset)
            ])
        );
    }

    #[test]
    fn parse_delimited() {
        let parsed = parse(
            "color=blue%20black",
            "color",
            config(Style::SpaceDelimited, false),
        )
        .unwrap();
        assert_eq!(parsed, root([("color", array(&["blue", "black"]))]));

        let parsed = parse(
            "color=blue|black%7Cgrey",
            "color",
            config(Style::PipeDelimited, false),
        )
        .unwrap();
        assert_eq!(parsed, root([("color", array(&["blue", "black|grey"]))]));
    }

    #[test]
    fn parse_simple() {
        let parsed = parse("blue,black", "color", config(Style::Simple, false)).unwrap();
        assert_eq!(parsed, root([("color", array(&["blue", "black"]))]));

        let parsed = parse("R=100,G=200", "color", config(Style::Simple, true)).unwrap();
        let expected: BTreeMap<String, Node> = [
            ("R".to_owned(), Node::from("100")),
            ("G".to_owned(), Node::from("200")),
        ]
        .into_iter()
        .collect();
        assert_eq!(parsed, root([("color", Node::Dictionary(expected))]));

        let err = parse("R=100,G", "color", config(Style::Simple, true)).unwrap_err();
        assert!(matches!(err, DecodingError::Malformed { .. }), "got: {err}");
    }

    #[test]
    fn parse_label() {
        let parsed = parse(".blue.black", "color", config(Style::Label, true)).unwrap();
        assert_eq!(parsed, root([("color", array(&["blue", "black"]))]));

        let parsed = parse(".1%2E5,2", "n", config(Style::Label, false)).unwrap();
        assert_eq!(parsed, root([("n", array(&["1.5", "2"]))]));

        let err = parse("blue", "color", config(Style::Label, false)).unwrap_err();
        assert!(matches!(err, DecodingError::Malformed { .. }), "got: {err}");
    }

    #[test]
    fn parse_matrix() {
        let parsed = parse(";color=blue,black", "color", config(Style::Matrix, false)).unwrap();
        assert_eq!(parsed, root([("color", array(&["blue", "black"]))]));

        let parsed = parse(";color=blue;color=black", "color", config(Style::Matrix, true)).unwrap();
        assert_eq!(parsed, root([("color", array(&["blue", "black"]))]));

        let parsed = parse(";empty", "empty", config(Style::Matrix, true)).unwrap();
        assert_eq!(parsed, root([("empty", Node::from(""))]));
    }

    #[test]
    fn parse_deep_object() {
        let parsed = parse(
            "keys[semi]=%3B&keys[dot]=.&user[address][city]=Carrot%20City",
            "keys",
            config(Style::DeepObject, true),
        )
        .unwrap();

        let keys: BTreeMap<String, Node> = [
            ("semi".to_owned(), Node::from(";")),
            ("dot".to_owned(), Node::from(".")),
        ]
        .into_iter()
        .collect();
        let address: BTreeMap<String, Node> = [("city".to_owned(), Node::from("Carrot City"))]
            .into_iter()
            .collect();
        let user: BTreeMap<String, Node> = [("address".to_owned(), Node::Dictionary(address))]
            .into_iter()
            .collect();
        assert_eq!(
            parsed,
            root([
                ("keys", Node::Dictionary(keys)),
                ("user", Node::Dictionary(user))
            ])
        );
    }

    #[test]
    fn parse_deep_object_errors() {
        let deep = config(Style::DeepObject, true);
        for input in ["a[b=1", "a[b]c=1", "a=1&a[b]=2", "a[b][c]=1&a[b]=2"] {
            let err = parse(input, "a", deep).unwrap_err();
            assert!(
                matches!(err, DecodingError::Malformed { .. }),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn parse_plus_spaces() {
        let plus = Config::new().space_escaping(SpaceEscaping::Plus);
        let parsed = parse("the+key=a+b", "", plus).unwrap();
        assert_eq!(parsed, root([("the key", Node::from("a b"))]));
    }

    #[test]
    fn parse_unterminated_escape() {
        let err = parse("name=abc%2", "name", Config::new()).unwrap_err();
        assert!(err.to_string().contains("%2"), "got: {err}");
    }
}
