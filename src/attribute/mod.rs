//! Attribute candidate model.
//!
//! Value types for disclosure candidate trees and the attributes in them.

mod candidate;
mod con_dis_con;
mod model;
mod translated;

pub use candidate::{resolve_candidates, DisclosureCandidate, RawCandidates};
pub use con_dis_con::{Con, ConCon, ConDisCon, DisCon};
pub use model::{Attribute, AttributeIdentifier, AttributeValue};
pub use translated::{TranslatedValue, RAW_VALUE_KEY};
