//! Format-preserving syntax trees
//!
//! Every node keeps the text it was parsed from, including whitespace and
//! comments, and writes it back unchanged unless its value was edited.
//! Edited values are rendered in the style of the token they replace.

pub mod classifier;
pub mod geometry;
pub mod isotopes;
pub mod list;
pub mod node;
pub mod padding;
pub mod parameters;
pub mod record;
pub mod shortcut;
pub mod value;

pub use classifier::{classifier_key, ClassifierNode, ParticleNode};
pub use geometry::{GeometryBranch, GeometryEntry, GeometryId, GeometryOperator, GeometryTree};
pub use isotopes::{IsotopeEntry, IsotopesNode};
pub use list::{ListEntry, ListItem, ListNode};
pub use node::{FormatContext, SyntaxNode, Tolerance};
pub use padding::{CommentNode, PaddingNode, PaddingPiece};
pub use parameters::{DuplicateParameter, ParameterNode, ParametersNode};
pub use record::{
    CellRecord, DataBody, DataRecord, OpaqueRecord, ReadRecord, RecordTree, SurfaceRecord,
};
pub use shortcut::{Lead, ShortcutError, ShortcutId, ShortcutNode};
pub use value::{Value, ValueKind, ValueNode};
