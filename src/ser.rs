//! Serialization support for URI parameters.

mod encode;
mod key;
mod value;
mod write;

use serde::ser;

use crate::config::Config;
use crate::error::EncodingError;
use crate::node::Node;
use value::NodeSerializer;
use write::NodeWriter;

/// Encodes a value under `key` with the default [`Config`]
/// (`form` style, exploded).
///
/// ```
/// # use serde::Serialize;
/// #[derive(Serialize)]
/// struct Filter {
///     name: String,
///     age: u8,
/// }
///
/// let filter = Filter {
///     name: "Alice Smith".to_owned(),
///     age: 24,
/// };
///
/// assert_eq!(
///     serde_uri::to_string(&filter, "filter").unwrap(),
///     "name=Alice%20Smith&age=24"
/// );
/// assert_eq!(serde_uri::to_string("hello", "name").unwrap(), "name=hello");
/// ```
pub fn to_string<T: ser::Serialize + ?Sized>(
    input: &T,
    key: &str,
) -> Result<String, EncodingError> {
    Config::default().encode(input, key)
}

/// Turns values into URI strings according to a [`Config`].
///
/// Encoding happens in two steps: the value is first converted into an
/// intermediate [`Node`] tree, which is then written out following the
/// configured style. The encoder holds no state besides its configuration.
#[derive(Clone, Copy, Debug)]
pub struct Encoder {
    config: Config,
}

impl Encoder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Encodes `value` under `key`.
    pub fn encode<T: ser::Serialize + ?Sized>(
        &self,
        value: &T,
        key: &str,
    ) -> Result<String, EncodingError> {
        let _span = tracing::trace_span!(
            "encode",
            key,
            style = %self.config.style,
            explode = self.config.explode,
        )
        .entered();

        let result = value
            .serialize(NodeSerializer)
            .and_then(|node| self.write(&node, key));
        match &result {
            Ok(encoded) => tracing::trace!(%encoded, "encoded value"),
            Err(error) => tracing::debug!(%error, "failed to encode value"),
        }
        result
    }

    fn write(&self, node: &Node, key: &str) -> Result<String, EncodingError> {
        tracing::trace!(?node, "intermediate node");
        NodeWriter::new(self.config).write(node, key)
    }
}
