use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_uri::{Config, EncodingErrorKind, SpaceEscaping, Style};

#[derive(Clone, Debug, Serialize)]
struct Rgb {
    #[serde(rename = "R")]
    r: u8,
    #[serde(rename = "G")]
    g: u8,
    #[serde(rename = "B")]
    b: u8,
}

const COLOR: Rgb = Rgb {
    r: 100,
    g: 200,
    b: 150,
};

fn config(style: Style, explode: bool) -> Config {
    Config::new().style(style).explode(explode)
}

#[test]
fn serialize_primitive() {
    assert_eq!(serde_uri::to_string("hello", "name").unwrap(), "name=hello");
    assert_eq!(serde_uri::to_string(&42u32, "id").unwrap(), "id=42");
    assert_eq!(serde_uri::to_string(&-1.5f64, "x").unwrap(), "x=-1.5");
    assert_eq!(serde_uri::to_string(&true, "on").unwrap(), "on=true");
    assert_eq!(serde_uri::to_string(&'c', "c").unwrap(), "c=c");
}

#[test]
fn serialize_array_form() {
    let colors = ["red", "green", "blue"];
    assert_eq!(
        config(Style::Form, true).encode(&colors, "color").unwrap(),
        "color=red&color=green&color=blue"
    );
    assert_eq!(
        config(Style::Form, false).encode(&colors, "color").unwrap(),
        "color=red,green,blue"
    );
}

#[test]
fn serialize_object_every_style() {
    let cases = [
        (Style::Form, false, "color=R,100,G,200,B,150"),
        (Style::Form, true, "R=100&G=200&B=150"),
        (Style::Simple, false, "R,100,G,200,B,150"),
        (Style::Simple, true, "R=100,G=200,B=150"),
        (Style::Label, false, ".R,100,G,200,B,150"),
        (Style::Label, true, ".R=100.G=200.B=150"),
        (Style::Matrix, false, ";color=R,100,G,200,B,150"),
        (Style::Matrix, true, ";R=100;G=200;B=150"),
        (Style::SpaceDelimited, false, "color=R%20100%20G%20200%20B%20150"),
        (Style::PipeDelimited, false, "color=R|100|G|200|B|150"),
        (Style::DeepObject, true, "color[R]=100&color[G]=200&color[B]=150"),
    ];
    for (style, explode, expected) in cases {
        assert_eq!(
            config(style, explode).encode(&COLOR, "color").unwrap(),
            expected,
            "{style} explode={explode}"
        );
    }
}

#[test]
fn serialize_deep_object_escapes_values() {
    let mut keys = BTreeMap::new();
    keys.insert("semi", ";");
    keys.insert("dot", ".");
    assert_eq!(
        config(Style::DeepObject, true).encode(&keys, "keys").unwrap(),
        "keys[semi]=%3B&keys[dot]=."
    );
}

#[test]
fn serialize_nested_deep_object() {
    #[derive(Serialize)]
    struct Address {
        city: String,
        postcode: String,
    }
    #[derive(Serialize)]
    struct User {
        id: u8,
        address: Address,
    }

    let user = User {
        id: 42,
        address: Address {
            city: "Carrot City".to_owned(),
            postcode: "12345".to_owned(),
        },
    };
    assert_eq!(
        config(Style::DeepObject, true).encode(&user, "user").unwrap(),
        "user[id]=42&user[address][postcode]=12345&user[address][city]=Carrot%20City"
    );
}

#[test]
fn serialize_escaping() {
    assert_eq!(
        serde_uri::to_string("a b&c=d/é", "q").unwrap(),
        "q=a%20b%26c%3Dd%2F%C3%A9"
    );
    assert_eq!(
        serde_uri::to_string("keep-these_.~", "q").unwrap(),
        "q=keep-these_.~"
    );

    let plus = Config::new().space_escaping(SpaceEscaping::Plus);
    assert_eq!(plus.encode("a b+c", "the key").unwrap(), "the+key=a+b%2Bc");

    // label style escapes the dot it uses as a separator
    assert_eq!(config(Style::Label, true).encode(&1.5f64, "x").unwrap(), ".1%2E5");
}

#[test]
fn serialize_option() {
    let none: Option<String> = None;
    assert_eq!(serde_uri::to_string(&none, "name").unwrap(), "");
    assert_eq!(
        serde_uri::to_string(&Some("x"), "name").unwrap(),
        "name=x"
    );

    let always = Config::new().always_emit_key(true);
    assert_eq!(always.encode(&none, "name").unwrap(), "name");
    assert_eq!(
        always.style(Style::Matrix).encode(&none, "name").unwrap(),
        ";name"
    );
    assert_eq!(always.style(Style::Simple).encode(&none, "name").unwrap(), "");

    // an empty string is not the same as an absent value
    assert_eq!(serde_uri::to_string("", "name").unwrap(), "name=");
    assert_eq!(
        config(Style::Matrix, false).encode("", "name").unwrap(),
        ";name"
    );
}

#[test]
fn serialize_skips_absent_fields() {
    #[derive(Serialize)]
    struct Filter {
        name: Option<String>,
        limit: u32,
    }

    let filter = Filter {
        name: None,
        limit: 10,
    };
    assert_eq!(serde_uri::to_string(&filter, "filter").unwrap(), "limit=10");
}

#[test]
fn serialize_empty_containers() {
    let empty: Vec<u8> = Vec::new();
    assert_eq!(config(Style::Form, false).encode(&empty, "ids").unwrap(), "ids=");
    assert_eq!(config(Style::Form, true).encode(&empty, "ids").unwrap(), "");
    assert_eq!(config(Style::Simple, false).encode(&empty, "ids").unwrap(), "");
}

#[test]
fn serialize_empty_key() {
    assert_eq!(serde_uri::to_string("foo", "").unwrap(), "=foo");
}

#[test]
fn serialize_enums() {
    #[derive(Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Shape {
        Point,
        Circle(u32),
        Rect { w: u32, h: u32 },
    }

    assert_eq!(serde_uri::to_string(&Shape::Point, "shape").unwrap(), "shape=point");
    assert_eq!(serde_uri::to_string(&Shape::Circle(3), "shape").unwrap(), "circle=3");
    assert_eq!(
        config(Style::Form, false)
            .encode(&Shape::Circle(3), "shape")
            .unwrap(),
        "shape=circle,3"
    );

    let err = config(Style::Form, false)
        .encode(&Shape::Rect { w: 1, h: 2 }, "shape")
        .unwrap_err();
    assert!(matches!(err.kind(), EncodingErrorKind::NestedContainer(Style::Form)));
    assert_eq!(err.path(), ["rect"]);
}

#[test]
fn serialize_nested_container_errors() {
    #[derive(Serialize)]
    struct Outer {
        tags: Vec<Vec<u8>>,
    }

    let outer = Outer {
        tags: vec![vec![1], vec![2]],
    };
    let err = serde_uri::to_string(&outer, "outer").unwrap_err();
    assert!(matches!(err.kind(), EncodingErrorKind::NestedContainer(_)));
    assert_eq!(err.path(), ["tags"]);
    assert!(err.to_string().ends_with("at `tags`"), "got: {err}");

    let err = config(Style::DeepObject, true)
        .encode(&["a", "b"], "list")
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        EncodingErrorKind::UnsupportedStyle {
            style: Style::DeepObject,
            ..
        }
    ));
}

#[test]
fn serialize_unsupported_values() {
    let err = serde_uri::to_string(&f64::NAN, "x").unwrap_err();
    assert!(matches!(err.kind(), EncodingErrorKind::UnsupportedValue(_)));

    let err = serde_uri::to_string(&serde_bytes::Bytes::new(&[0xff, 0xfe]), "raw").unwrap_err();
    assert!(matches!(err.kind(), EncodingErrorKind::UnsupportedValue(_)));

    assert_eq!(
        serde_uri::to_string(&serde_bytes::Bytes::new(b"abc"), "raw").unwrap(),
        "raw=abc"
    );
}

#[test]
fn serialize_to_writer() {
    let mut buffer = Vec::new();
    Config::new()
        .style(Style::Simple)
        .encode_to_writer(&[1, 2, 3], "ids", &mut buffer)
        .unwrap();
    assert_eq!(buffer, b"1,2,3");
}

#[test]
fn serialize_map_order() {
    let mut map = BTreeMap::new();
    map.insert("beta", 1);
    map.insert("Alpha", 2);
    map.insert("gamma", 3);
    assert_eq!(
        serde_uri::to_string(&map, "m").unwrap(),
        "gamma=3&beta=1&Alpha=2"
    );
}
