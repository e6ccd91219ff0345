//! One syntax tree per record kind

use super::classifier::ClassifierNode;
use super::geometry::GeometryTree;
use super::isotopes::IsotopesNode;
use super::list::ListNode;
use super::node::{FormatContext, SyntaxNode};
use super::padding::{CommentNode, PaddingNode};
use super::parameters::ParametersNode;
use super::value::{Value, ValueNode};
use crate::block_reader::BlockType;
use crate::geometry::HalfSpace;
use serde::Serialize;

fn leading_text(leading: &Option<PaddingNode>) -> String {
    leading.as_ref().map(PaddingNode::text).unwrap_or_default()
}

fn leading_comments(leading: &Option<PaddingNode>) -> Vec<&CommentNode> {
    leading
        .as_ref()
        .map(|padding| padding.comments())
        .unwrap_or_default()
}

// ============================================================================
// CELL
// ============================================================================

/// `id (0 | material density) geometry [parameters]`
#[derive(Debug, Clone, Serialize)]
pub struct CellRecord {
    pub(crate) leading: Option<PaddingNode>,
    pub(crate) number: ValueNode,
    pub(crate) material: ValueNode,
    /// Negative density is a mass density
    pub(crate) density: Option<ValueNode>,
    pub(crate) geometry: GeometryTree,
    pub(crate) parameters: ParametersNode,
    /// Semantic geometry, built on first access and written back on format
    #[serde(skip)]
    pub(crate) half_space: Option<HalfSpace>,
}

impl CellRecord {
    pub fn number(&self) -> i64 {
        self.number.as_i64().unwrap_or(0)
    }

    pub fn set_number(&mut self, number: i64) {
        self.number.set_value(Some(Value::Int(number)));
        if let Some(half_space) = &mut self.half_space {
            half_space.set_cell(Some(number));
        }
    }

    /// Material number, 0 for void
    pub fn material(&self) -> i64 {
        self.material.as_i64().unwrap_or(0)
    }

    pub fn is_void(&self) -> bool {
        self.material() == 0
    }

    /// Density magnitude and whether it is an atom density
    pub fn density(&self) -> Option<(f64, bool)> {
        let node = self.density.as_ref()?;
        let magnitude = node.value().and_then(Value::as_f64)?;
        Some((magnitude, !node.is_negative()))
    }

    pub fn set_density(&mut self, density: f64, atom: bool) {
        if let Some(node) = &mut self.density {
            node.set_value(Some(Value::Float(density.abs())));
            node.set_is_negative(!atom);
        }
    }

    pub fn geometry(&self) -> &GeometryTree {
        &self.geometry
    }

    pub fn parameters(&self) -> &ParametersNode {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParametersNode {
        &mut self.parameters
    }
}

impl SyntaxNode for CellRecord {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let mut out = leading_text(&self.leading);
        out.push_str(&self.number.format(ctx));
        out.push_str(&self.material.format(ctx));
        if let Some(density) = &self.density {
            out.push_str(&density.format(ctx));
        }
        match &self.half_space {
            Some(half_space) => {
                let mut geometry = self.geometry.clone();
                half_space.sync_into(&mut geometry);
                out.push_str(&geometry.format(ctx));
            }
            None => out.push_str(&self.geometry.format(ctx)),
        }
        out.push_str(&self.parameters.format(ctx));
        out
    }

    fn comments(&self) -> Vec<&CommentNode> {
        let mut comments = leading_comments(&self.leading);
        comments.extend(self.number.comments());
        comments.extend(self.material.comments());
        if let Some(density) = &self.density {
            comments.extend(density.comments());
        }
        match &self.half_space {
            // only what a pending edit would still write
            Some(half_space) => {
                let mut geometry = self.geometry.clone();
                half_space.sync_into(&mut geometry);
                let mut written: Vec<CommentNode> = geometry.comments().into_iter().cloned().collect();
                comments.extend(self.geometry.comments().into_iter().filter(|comment| {
                    written
                        .iter()
                        .position(|kept| kept == *comment)
                        .map(|index| written.remove(index))
                        .is_some()
                }));
            }
            None => comments.extend(self.geometry.comments()),
        }
        comments.extend(self.parameters.comments());
        comments
    }
}

// ============================================================================
// SURFACE
// ============================================================================

/// `[*|+]id [transform] type constants`
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceRecord {
    pub(crate) leading: Option<PaddingNode>,
    pub(crate) modifier: Option<ValueNode>,
    pub(crate) number: ValueNode,
    pub(crate) transform: Option<ValueNode>,
    pub(crate) kind: ValueNode,
    pub(crate) constants: ListNode,
}

impl SurfaceRecord {
    pub fn number(&self) -> i64 {
        self.number.as_i64().unwrap_or(0)
    }

    pub fn set_number(&mut self, number: i64) {
        self.number.set_value(Some(Value::Int(number)));
    }

    /// Surface mnemonic, upper-cased
    pub fn kind(&self) -> String {
        self.kind.as_str().unwrap_or("").to_ascii_uppercase()
    }

    pub fn constants(&self) -> Vec<f64> {
        self.constants.nodes().filter_map(ValueNode::as_f64).collect()
    }

    pub fn set_constants(&mut self, constants: &[f64], ctx: &FormatContext) {
        let values = constants.iter().map(|&c| Some(Value::Float(c))).collect();
        self.constants.set_values(values, ctx.tolerance);
    }

    pub fn is_reflecting(&self) -> bool {
        self.modifier.as_ref().and_then(ValueNode::as_str) == Some("*")
    }

    pub fn is_white_boundary(&self) -> bool {
        self.modifier.as_ref().and_then(ValueNode::as_str) == Some("+")
    }

    /// Transform number; negative marks a periodic partner surface
    pub fn transform(&self) -> Option<i64> {
        self.transform.as_ref().and_then(ValueNode::as_i64)
    }
}

impl SyntaxNode for SurfaceRecord {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let mut out = leading_text(&self.leading);
        if let Some(modifier) = &self.modifier {
            out.push_str(&modifier.format(ctx));
        }
        out.push_str(&self.number.format(ctx));
        if let Some(transform) = &self.transform {
            out.push_str(&transform.format(ctx));
        }
        out.push_str(&self.kind.format(ctx));
        out.push_str(&self.constants.format(ctx));
        out
    }

    fn comments(&self) -> Vec<&CommentNode> {
        let mut comments = leading_comments(&self.leading);
        comments.extend(self.number.comments());
        if let Some(transform) = &self.transform {
            comments.extend(transform.comments());
        }
        comments.extend(self.kind.comments());
        comments.extend(self.constants.comments());
        comments
    }
}

// ============================================================================
// DATA
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub enum DataBody {
    Values(ListNode),
    Isotopes(IsotopesNode),
}

/// `classifier [keyword] [items] [parameters]`
#[derive(Debug, Clone, Serialize)]
pub struct DataRecord {
    pub(crate) leading: Option<PaddingNode>,
    pub(crate) classifier: ClassifierNode,
    pub(crate) keyword: Option<ValueNode>,
    pub(crate) body: DataBody,
    pub(crate) parameters: ParametersNode,
}

impl DataRecord {
    pub fn classifier(&self) -> &ClassifierNode {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut ClassifierNode {
        &mut self.classifier
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_ref().and_then(ValueNode::as_str)
    }

    pub fn body(&self) -> &DataBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut DataBody {
        &mut self.body
    }

    /// Expanded data items; `None` marks a jumped entry
    pub fn values(&self) -> Vec<Option<Value>> {
        match &self.body {
            DataBody::Values(list) => list.values(),
            DataBody::Isotopes(isotopes) => isotopes
                .entries()
                .iter()
                .flat_map(|e| {
                    [
                        Some(Value::Text(e.zaid().to_string())),
                        e.fraction_node().print_value(),
                    ]
                })
                .collect(),
        }
    }

    /// Replace the data items, keeping shorthand where the values allow
    pub fn set_values(&mut self, values: Vec<Option<Value>>, ctx: &FormatContext) -> bool {
        match &mut self.body {
            DataBody::Values(list) => {
                list.set_values(values, ctx.tolerance);
                true
            }
            DataBody::Isotopes(_) => false,
        }
    }

    pub fn parameters(&self) -> &ParametersNode {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParametersNode {
        &mut self.parameters
    }
}

impl SyntaxNode for DataRecord {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let mut out = leading_text(&self.leading);
        out.push_str(&self.classifier.format(ctx));
        if let Some(keyword) = &self.keyword {
            out.push_str(&keyword.format(ctx));
        }
        match &self.body {
            DataBody::Values(list) => out.push_str(&list.format(ctx)),
            DataBody::Isotopes(isotopes) => out.push_str(&isotopes.format(ctx)),
        }
        out.push_str(&self.parameters.format(ctx));
        out
    }

    fn comments(&self) -> Vec<&CommentNode> {
        let mut comments = leading_comments(&self.leading);
        comments.extend(self.classifier.comments());
        if let Some(keyword) = &self.keyword {
            comments.extend(keyword.comments());
        }
        match &self.body {
            DataBody::Values(list) => comments.extend(list.comments()),
            DataBody::Isotopes(isotopes) => comments.extend(isotopes.comments()),
        }
        comments.extend(self.parameters.comments());
        comments
    }
}

// ============================================================================
// READ AND OPAQUE
// ============================================================================

/// `READ FILE=name [flags]`
#[derive(Debug, Clone, Serialize)]
pub struct ReadRecord {
    pub(crate) leading: Option<PaddingNode>,
    pub(crate) keyword: ValueNode,
    pub(crate) parameters: ParametersNode,
}

impl ReadRecord {
    pub fn file(&self) -> Option<&str> {
        self.parameters
            .get("file")
            .and_then(|p| p.value())
            .and_then(ValueNode::as_str)
    }

    pub fn parameters(&self) -> &ParametersNode {
        &self.parameters
    }
}

impl SyntaxNode for ReadRecord {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let mut out = leading_text(&self.leading);
        out.push_str(&self.keyword.format(ctx));
        out.push_str(&self.parameters.format(ctx));
        out
    }

    fn comments(&self) -> Vec<&CommentNode> {
        let mut comments = leading_comments(&self.leading);
        comments.extend(self.keyword.comments());
        comments.extend(self.parameters.comments());
        comments
    }
}

/// A record kept as raw text because no grammar models it
#[derive(Debug, Clone, Serialize)]
pub struct OpaqueRecord {
    pub(crate) text: String,
    pub(crate) prefix: Option<String>,
}

impl OpaqueRecord {
    pub fn new(text: impl Into<String>, prefix: Option<String>) -> Self {
        Self {
            text: text.into(),
            prefix,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

// ============================================================================
// RECORD TREE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub enum RecordTree {
    Cell(CellRecord),
    Surface(SurfaceRecord),
    Data(DataRecord),
    Read(ReadRecord),
    Opaque(OpaqueRecord),
}

impl RecordTree {
    pub fn kind_name(&self) -> &'static str {
        match self {
            RecordTree::Cell(_) => "cell",
            RecordTree::Surface(_) => "surface",
            RecordTree::Data(_) => "data",
            RecordTree::Read(_) => "read",
            RecordTree::Opaque(_) => "opaque",
        }
    }

    /// Block a record of this kind is written in, if fixed
    pub fn block(&self) -> Option<BlockType> {
        match self {
            RecordTree::Cell(_) => Some(BlockType::Cell),
            RecordTree::Surface(_) => Some(BlockType::Surface),
            RecordTree::Data(_) => Some(BlockType::Data),
            RecordTree::Read(_) | RecordTree::Opaque(_) => None,
        }
    }

    pub fn as_cell(&self) -> Option<&CellRecord> {
        match self {
            RecordTree::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_cell_mut(&mut self) -> Option<&mut CellRecord> {
        match self {
            RecordTree::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_surface(&self) -> Option<&SurfaceRecord> {
        match self {
            RecordTree::Surface(surface) => Some(surface),
            _ => None,
        }
    }

    pub fn as_surface_mut(&mut self) -> Option<&mut SurfaceRecord> {
        match self {
            RecordTree::Surface(surface) => Some(surface),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&DataRecord> {
        match self {
            RecordTree::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_data_mut(&mut self) -> Option<&mut DataRecord> {
        match self {
            RecordTree::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_read(&self) -> Option<&ReadRecord> {
        match self {
            RecordTree::Read(read) => Some(read),
            _ => None,
        }
    }
}

impl SyntaxNode for RecordTree {
    fn format(&self, ctx: &mut FormatContext) -> String {
        match self {
            RecordTree::Cell(cell) => cell.format(ctx),
            RecordTree::Surface(surface) => surface.format(ctx),
            RecordTree::Data(data) => data.format(ctx),
            RecordTree::Read(read) => read.format(ctx),
            RecordTree::Opaque(opaque) => opaque.text.clone(),
        }
    }

    fn comments(&self) -> Vec<&CommentNode> {
        match self {
            RecordTree::Cell(cell) => cell.comments(),
            RecordTree::Surface(surface) => surface.comments(),
            RecordTree::Data(data) => data.comments(),
            RecordTree::Read(read) => read.comments(),
            RecordTree::Opaque(_) => Vec::new(),
        }
    }
}
