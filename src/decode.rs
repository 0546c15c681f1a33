//! Building elements from a tagged serialized form.
//!
//! An element is serialized as an envelope naming its type and key, with the
//! type-specific properties nested underneath:
//!
//! ```json
//! {"type": "button", "key": "a", "props": {"title": "Click me"}}
//! ```
//!
//! Decoding produces ordinary [`Element`]s, so the reconciler treats them no
//! differently from descriptors built in code.

use serde::Deserialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::{Element, NativeView};

/// Turns a decoded envelope into an element for one widget set.
pub trait ElementFactory<Msg, V: NativeView> {
    /// Build the element of type `kind`.
    ///
    /// `props` is always a JSON object; an envelope without props yields an
    /// empty one. Unknown types should fail with [`DecodeError::UnknownType`].
    fn build(&self, kind: &str, key: String, props: Value) -> Result<Element<Msg, V>, DecodeError>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    key: String,
    #[serde(default)]
    props: Value,
}

impl Envelope {
    fn build<Msg, V, F>(self, factory: &F) -> Result<Element<Msg, V>, DecodeError>
    where
        V: NativeView,
        F: ElementFactory<Msg, V> + ?Sized,
    {
        let props = match self.props {
            Value::Null => Value::Object(Default::default()),
            props => props,
        };
        tracing::trace!(kind = %self.kind, key = %self.key, "decoding element");
        factory.build(&self.kind, self.key, props)
    }
}

/// Decode a single element envelope.
pub fn decode_element<Msg, V, F>(json: &str, factory: &F) -> Result<Element<Msg, V>, DecodeError>
where
    V: NativeView,
    F: ElementFactory<Msg, V> + ?Sized,
{
    let envelope: Envelope = serde_json::from_str(json)?;
    envelope.build(factory)
}

/// Decode a JSON array of element envelopes, keeping their order.
pub fn decode_elements<Msg, V, F>(json: &str, factory: &F) -> Result<Vec<Element<Msg, V>>, DecodeError>
where
    V: NativeView,
    F: ElementFactory<Msg, V> + ?Sized,
{
    let envelopes: Vec<Envelope> = serde_json::from_str(json)?;
    envelopes
        .into_iter()
        .map(|envelope| envelope.build(factory))
        .collect()
}
