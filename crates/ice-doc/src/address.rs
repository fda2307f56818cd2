//! Content addressing of dependencies
//!
//! A dependency's identity is a pure function of its canonical content:
//!
//! ```text
//! id = hex(SHA-256("ice-dependency/v1\n" || canonical_json(canonicalize(dep))))
//! ```
//!
//! `canonical_json` sorts object keys and emits no whitespace, so the id is
//! independent of field order in the source document. Changing any part of
//! this scheme changes every id, which breaks references in previously saved
//! documents: bump [`ADDRESS_SCHEME`] instead of editing it in place.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

use crate::canonical::canonicalize;
use crate::hash::{ContentHash, HashError};
use crate::model::Dependency;

/// Hash domain tag for dependency addresses
pub const ADDRESS_SCHEME: &str = "ice-dependency/v1";

/// Key of an entry in a project's dependency map
///
/// Freshly computed ids are 64 lowercase hex chars, but documents written by
/// other tools may carry any string, so the id is not restricted to that form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyId(String);

impl DependencyId {
    /// Wrap an existing key
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned key
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Digest this key encodes
    ///
    /// # Errors
    /// Returns [`HashError`] when the key is not 64 hex chars, as with keys
    /// written by other tools.
    pub fn content_hash(&self) -> Result<ContentHash, HashError> {
        self.0.parse()
    }

    /// Whether the key has the form of a computed address
    #[must_use]
    pub fn is_content_address(&self) -> bool {
        self.content_hash()
            .is_ok_and(|hash| DependencyId::from(hash) == *self)
    }
}

impl From<ContentHash> for DependencyId {
    fn from(hash: ContentHash) -> Self {
        Self(hash.to_string())
    }
}

impl Display for DependencyId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DependencyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Serialize a JSON value with sorted keys and no whitespace
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                if let Some(val) = map.get(key) {
                    write_canonical(val, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Address of an already canonical dependency
///
/// Callers holding non-canonical content should use [`Addressed::new`].
#[must_use]
pub fn address_of(canonical: &Dependency) -> DependencyId {
    DependencyId::from(hash_of(canonical))
}

fn hash_of(canonical: &Dependency) -> ContentHash {
    let value = serde_json::to_value(canonical).unwrap_or_default();
    ContentHash::compute_tagged(
        format!("{ADDRESS_SCHEME}\n").as_bytes(),
        canonical_json(&value).as_bytes(),
    )
}

/// Canonical dependency paired with its address
///
/// # Invariants
/// - `content` is canonical
/// - `id` is always `address_of(&content)`
#[derive(Debug, Clone, PartialEq)]
pub struct Addressed {
    id: DependencyId,
    content: Dependency,
}

impl Addressed {
    /// Canonicalize and address a dependency
    #[must_use]
    pub fn new(content: &Dependency) -> Self {
        let content = canonicalize(content);
        let id = address_of(&content);
        tracing::trace!(%id, name = %content.package.name, "addressed dependency");
        Self { id, content }
    }

    /// Dependency address
    #[inline]
    #[must_use]
    pub fn id(&self) -> &DependencyId {
        &self.id
    }

    /// Canonical content
    #[inline]
    #[must_use]
    pub fn content(&self) -> &Dependency {
        &self.content
    }

    /// Split into id and content
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (DependencyId, Dependency) {
        (self.id, self.content)
    }

    /// Recompute the address and compare
    ///
    /// Fails for an id that does not parse as a digest.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.id
            .content_hash()
            .is_ok_and(|hash| hash == hash_of(&self.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockKind, CodeData, Position};
    use serde_json::json;

    fn code_dependency(code: &str) -> Dependency {
        let mut dep = Dependency::default();
        dep.package.name = "adder".into();
        dep.design.graph.blocks.push(Block::new(
            "c1",
            BlockKind::Code(CodeData {
                code: code.into(),
                ..CodeData::default()
            }),
            Position::new(100.0, 50.0),
        ));
        dep
    }

    #[test]
    fn canonical_json_sorts_keys() {
        let a = json!({"b": 1, "a": {"d": [1, 2], "c": "x\"y"}});
        assert_eq!(canonical_json(&a), r#"{"a":{"c":"x\"y","d":[1,2]},"b":1}"#);
    }

    #[test]
    fn field_order_is_irrelevant() {
        let a: Value = serde_json::from_str(r#"{"x": 1, "y": {"p": true, "q": null}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"y": {"q": null, "p": true}, "x": 1}"#).unwrap();
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn equal_content_equal_address() {
        let a = Addressed::new(&code_dependency("assign o = a & b;"));
        let b = Addressed::new(&code_dependency("assign o = a & b;"));
        assert_eq!(a.id(), b.id());
        assert_eq!(a.id().as_str().len(), 64);
    }

    #[test]
    fn any_difference_changes_address() {
        let base = Addressed::new(&code_dependency("assign o = a & b;"));
        let code = Addressed::new(&code_dependency("assign o = a | b;"));
        let mut renamed = code_dependency("assign o = a & b;");
        renamed.package.description = "2-input and".into();
        let renamed = Addressed::new(&renamed);

        assert_ne!(base.id(), code.id());
        assert_ne!(base.id(), renamed.id());
    }

    #[test]
    fn addressed_verifies_and_readdresses_stably() {
        let first = Addressed::new(&code_dependency("x"));
        assert!(first.verify());

        let again = Addressed::new(first.content());
        assert_eq!(first.id(), again.id());
    }

    #[test]
    fn computed_ids_parse_back_to_their_digest() {
        let dep = canonicalize(&code_dependency("x"));
        let id = address_of(&dep);
        assert!(id.is_content_address());
        assert_eq!(id.content_hash().unwrap(), hash_of(&dep));
    }

    #[test]
    fn foreign_keys_are_not_content_addresses() {
        let short = DependencyId::new("ab12");
        assert!(matches!(
            short.content_hash(),
            Err(HashError::InvalidLength { expected: 32, actual: 2 })
        ));
        assert!(matches!(
            DependencyId::new("and2").content_hash(),
            Err(HashError::HexDecode(_))
        ));

        let upper = DependencyId::new(address_of(&Dependency::default()).as_str().to_uppercase());
        assert!(upper.content_hash().is_ok());
        assert!(!upper.is_content_address());
    }

    #[test]
    fn verify_rejects_a_forged_id() {
        let genuine = Addressed::new(&code_dependency("x"));
        let forged = Addressed {
            id: DependencyId::new("not-a-digest"),
            content: genuine.content().clone(),
        };
        assert!(!forged.verify());

        let swapped = Addressed {
            id: Addressed::new(&code_dependency("y")).id().clone(),
            content: genuine.content().clone(),
        };
        assert!(!swapped.verify());
    }

    #[test]
    fn dependency_id_serializes_as_plain_string() {
        let id = DependencyId::new("abc");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("abc"));
        assert_eq!(id.to_string(), "abc");
    }
}
