//! Conjunction / disjunction containers for disclosure requests.
//!
//! A request is a [`ConDisCon`]: every [`DisCon`] must be satisfied by
//! choosing exactly one of its [`Con`]s, and every element of the chosen
//! `Con` is disclosed.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::model::Attribute;

macro_rules! sequence {
    ($(#[$meta:meta])* $name:ident<$t:ident> of $elem:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name<$t>(pub Vec<$elem>);

        impl<$t> Default for $name<$t> {
            fn default() -> Self {
                Self(Vec::new())
            }
        }

        impl<$t> Deref for $name<$t> {
            type Target = [$elem];

            fn deref(&self) -> &[$elem] {
                &self.0
            }
        }

        impl<$t> FromIterator<$elem> for $name<$t> {
            fn from_iter<I: IntoIterator<Item = $elem>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl<$t> IntoIterator for $name<$t> {
            type Item = $elem;
            type IntoIter = std::vec::IntoIter<$elem>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<$t> From<Vec<$elem>> for $name<$t> {
            fn from(items: Vec<$elem>) -> Self {
                Self(items)
            }
        }
    };
}

sequence!(
    /// Conjunction: all elements are disclosed together.
    Con<T> of T
);
sequence!(
    /// Disjunction of conjunctions: exactly one `Con` is chosen.
    DisCon<T> of Con<T>
);
sequence!(
    /// Conjunction of disjunctions of conjunctions: a full disclosure request.
    ConDisCon<T> of DisCon<T>
);
sequence!(
    /// Conjunction of conjunctions: one chosen `Con` per `DisCon`.
    ConCon<T> of Con<T>
);

impl Con<Attribute> {
    /// Positional attribute match, as used when merging candidate trees.
    pub fn matches(&self, other: &Con<Attribute>) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a.matches(b))
    }

    /// Every attribute in this con can be disclosed right away.
    pub fn is_choosable(&self) -> bool {
        self.iter().all(|attr| attr.choosable)
    }

    /// Every attribute the holder lacks can still be obtained.
    pub fn is_obtainable(&self) -> bool {
        self.iter()
            .filter(|attr| !attr.choosable)
            .all(|attr| attr.credential_type.is_obtainable())
    }
}

impl<T> ConDisCon<T> {
    /// Every disjunction offers at least one option.
    pub fn is_finishable(&self) -> bool {
        self.iter().all(|discon| !discon.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeValue;
    use crate::irma::{AttributeType, CredentialType};

    #[test]
    fn empty_condiscon_is_finishable() {
        let tree: ConDisCon<u8> = ConDisCon::default();
        assert!(tree.is_finishable());
    }

    #[test]
    fn empty_discon_is_not_finishable() {
        let tree: ConDisCon<u8> = vec![
            DisCon(vec![Con(vec![1])]),
            DisCon(Vec::new()),
        ]
        .into();
        assert!(!tree.is_finishable());
    }

    fn attribute(full_id: &str) -> Attribute {
        let attribute_type = AttributeType::unknown(full_id);
        Attribute {
            credential_type: CredentialType::unknown(attribute_type.credential_type_id()),
            attribute_type,
            credential_hash: String::new(),
            value: AttributeValue::Null,
            raw_value: None,
            choosable: false,
            expired: false,
            revoked: false,
            not_revokable: false,
        }
    }

    #[test]
    fn nested_vecs_build_a_three_level_tree() {
        let tree: ConDisCon<Attribute> = vec![DisCon(vec![
            Con(vec![attribute("demo.card.first")]),
            Con(vec![attribute("demo.card.last"), attribute("demo.card.age")]),
        ])]
        .into();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].len(), 2);
        assert_eq!(tree[0][1].len(), 2);
        assert_eq!(tree[0][1][0].attribute_type.full_id, "demo.card.last");
        assert!(tree[0][1].matches(&tree[0][1].clone()));
        assert!(!tree[0][0].matches(&tree[0][1]));
    }

    #[test]
    fn serializes_as_nested_arrays() {
        let tree: ConDisCon<u8> = vec![DisCon(vec![Con(vec![1, 2]), Con(vec![3])])].into();
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, "[[[1,2],[3]]]");
    }
}
