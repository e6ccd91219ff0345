//! Value sequences with embedded shortcuts, and their reconciliation
//!
//! Editing goes through [`ListEntry`] values: `entries()` flattens the list
//! and tags every value expanded from a shortcut with its origin, and
//! `update_with_new_values` rebuilds the list from an edited sequence. Each
//! surviving shortcut is re-seeded at its first remaining member and grows
//! outward in both directions while neighbours satisfy its kind's rule, so a
//! small edit inside a long run keeps the rest of the run compressed.

use super::node::{FormatContext, SyntaxNode, Tolerance};
use super::padding::{CommentNode, PaddingNode};
use super::shortcut::{ShortcutId, ShortcutNode};
use super::value::{Value, ValueKind, ValueNode};
use crate::log_debug;
use crate::tokens::ShortcutKind;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub enum ListItem {
    Value(ValueNode),
    Shortcut(ShortcutNode),
}

impl ListItem {
    fn format(&self, ctx: &mut FormatContext) -> String {
        match self {
            ListItem::Value(node) => node.format(ctx),
            ListItem::Shortcut(node) => node.format(ctx),
        }
    }

    fn comments(&self) -> Vec<&CommentNode> {
        match self {
            ListItem::Value(node) => node.comments(),
            ListItem::Shortcut(node) => node.comments(),
        }
    }
}

/// One flattened list value, remembering which shortcut produced it
#[derive(Debug, Clone)]
pub struct ListEntry {
    pub node: ValueNode,
    origin: Option<(ShortcutId, usize)>,
}

impl ListEntry {
    pub fn new(node: ValueNode) -> Self {
        Self { node, origin: None }
    }

    pub fn origin(&self) -> Option<(ShortcutId, usize)> {
        self.origin
    }

    fn shortcut(&self) -> Option<ShortcutId> {
        self.origin.map(|(id, _)| id)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListNode {
    items: Vec<ListItem>,
    /// Layout after the last value
    tail: Option<PaddingNode>,
    next_id: ShortcutId,
    /// Set once the list was rebuilt; new neighbours then need separating
    rebuilt: bool,
}

/// A contiguous span of entries claimed by one shortcut
struct Run {
    template: ShortcutNode,
    start: usize,
    end: usize,
    chained: bool,
}

impl ListNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier for the next shortcut pushed onto this list
    pub fn next_shortcut_id(&mut self) -> ShortcutId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_value(&mut self, node: ValueNode) {
        self.items.push(ListItem::Value(node));
    }

    pub fn push_shortcut(&mut self, node: ShortcutNode) {
        self.next_id = self.next_id.max(node.id() + 1);
        self.items.push(ListItem::Shortcut(node));
    }

    /// Remove a trailing explicit value so a shortcut can take it as lead
    pub fn pop_value(&mut self) -> Option<ValueNode> {
        match self.items.last() {
            Some(ListItem::Value(_)) => match self.items.pop() {
                Some(ListItem::Value(node)) => Some(node),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn last_is_shortcut(&self) -> bool {
        matches!(self.items.last(), Some(ListItem::Shortcut(_)))
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Flattened values, shortcut members included
    pub fn nodes(&self) -> impl Iterator<Item = &ValueNode> {
        self.items.iter().flat_map(|item| match item {
            ListItem::Value(node) => std::slice::from_ref(node).iter(),
            ListItem::Shortcut(shortcut) => shortcut.members().iter(),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    pub fn get(&self, index: usize) -> Option<&ValueNode> {
        self.nodes().nth(index)
    }

    pub fn last_node(&self) -> Option<&ValueNode> {
        self.nodes().last()
    }

    /// Signed values; `None` marks a jumped entry
    pub fn values(&self) -> Vec<Option<Value>> {
        self.nodes().map(ValueNode::print_value).collect()
    }

    /// Move the last item's trailing layout onto the list itself
    pub fn detach_tail(&mut self) {
        let padding = match self.items.last_mut() {
            Some(ListItem::Value(node)) => node.take_padding(),
            Some(ListItem::Shortcut(shortcut)) => shortcut.take_trailing_padding(),
            None => None,
        };
        if let Some(padding) = padding {
            self.tail_mut().extend(padding);
        }
    }

    pub fn tail(&self) -> Option<&PaddingNode> {
        self.tail.as_ref()
    }

    /// Layout after the final value, created empty when absent
    pub fn tail_mut(&mut self) -> &mut PaddingNode {
        self.tail.get_or_insert_with(PaddingNode::new)
    }

    pub fn entries(&self) -> Vec<ListEntry> {
        let mut entries = Vec::new();
        for item in &self.items {
            match item {
                ListItem::Value(node) => entries.push(ListEntry::new(node.clone())),
                ListItem::Shortcut(shortcut) => {
                    entries.extend(shortcut.members().iter().enumerate().map(|(i, node)| {
                        ListEntry {
                            node: node.clone(),
                            origin: Some((shortcut.id(), i)),
                        }
                    }))
                }
            }
        }
        entries
    }

    /// Replace the values in order, keeping node identity by position
    pub fn set_values(&mut self, values: Vec<Option<Value>>, tolerance: Tolerance) {
        let mut entries = self.entries();
        let kind = entries
            .last()
            .map(|entry| entry.node.kind())
            .unwrap_or(ValueKind::Float);
        entries.truncate(values.len());
        let existing = entries.len();
        for (index, value) in values.into_iter().enumerate() {
            if index < existing {
                entries[index].node.set_value(value);
            } else {
                entries.push(ListEntry::new(ValueNode::new(value, kind)));
            }
        }
        self.update_with_new_values(entries, tolerance);
    }

    /// Rebuild the list from an edited entry sequence
    pub fn update_with_new_values(&mut self, entries: Vec<ListEntry>, tolerance: Tolerance) {
        let mut entries = entries;
        if entries.is_empty() {
            self.items.clear();
            return;
        }

        let originals: Vec<ShortcutNode> = self
            .items
            .drain(..)
            .filter_map(|item| match item {
                ListItem::Shortcut(shortcut) => Some(shortcut),
                ListItem::Value(_) => None,
            })
            .collect();

        let mut claims: Vec<Option<usize>> = vec![None; entries.len()];
        let mut runs: Vec<Run> = Vec::new();

        for shortcut in &originals {
            // an edited first member must not dissolve the rest of the run
            let run = (0..entries.len())
                .filter(|&i| claims[i].is_none() && entries[i].shortcut() == Some(shortcut.id()))
                .find_map(|seed| grow_run(shortcut, seed, &entries, &claims, tolerance));
            match run {
                Some(run) => {
                    let index = runs.len();
                    claims[run.start..=run.end].fill(Some(index));
                    runs.push(run);
                }
                None => restore_end_padding(shortcut, &mut entries, &claims),
            }
        }

        self.claim_orphan_jumps(&entries, &mut claims, &mut runs);

        // a trailing placeholder run nobody wrote is implied
        let mut kept = entries.len();
        if let Some(Some(index)) = claims.last() {
            if runs[*index].template.is_synthesized() {
                kept = runs[*index].start;
            }
        }

        let mut index = 0;
        while index < kept {
            match claims[index] {
                Some(run_index) => {
                    let run = &runs[run_index];
                    let members: Vec<ValueNode> = entries[run.start..=run.end]
                        .iter()
                        .map(|entry| entry.node.clone())
                        .collect();
                    let anchor = (run.chained && run.start > 0)
                        .then(|| &entries[run.start - 1].node);
                    self.items
                        .push(ListItem::Shortcut(run.template.rebuilt(members, anchor)));
                    index = run.end + 1;
                }
                None => {
                    self.items.push(ListItem::Value(entries[index].node.clone()));
                    index += 1;
                }
            }
        }

        if let Some(last) = self.items.last_mut() {
            let padding = match last {
                ListItem::Value(node) => node.padding_mut(),
                ListItem::Shortcut(shortcut) => shortcut.trailing_padding_mut(),
            };
            if let Some(padding) = padding {
                if padding.is_whitespace() {
                    *padding = PaddingNode::new();
                }
            }
        }
        self.rebuilt = true;

        log_debug!("List reconciled",
            "values" => kept,
            "shortcuts" => runs.len()
        );
    }

    /// Unattached placeholders become new jump shortcuts
    fn claim_orphan_jumps(
        &mut self,
        entries: &[ListEntry],
        claims: &mut [Option<usize>],
        runs: &mut Vec<Run>,
    ) {
        let mut index = 0;
        while index < entries.len() {
            if claims[index].is_some() || !entries[index].node.is_jump() {
                index += 1;
                continue;
            }
            let start = index;
            while index < entries.len() && claims[index].is_none() && entries[index].node.is_jump()
            {
                index += 1;
            }
            let id = self.next_shortcut_id();
            let run_index = runs.len();
            claims[start..index].fill(Some(run_index));
            runs.push(Run {
                template: ShortcutNode::synthesized_jump(id, Vec::new()),
                start,
                end: index - 1,
                chained: false,
            });
        }
    }
}

/// Seed `shortcut` at `seed` and absorb neighbours backward, then forward
fn grow_run(
    shortcut: &ShortcutNode,
    seed: usize,
    entries: &[ListEntry],
    claims: &[Option<usize>],
    tolerance: Tolerance,
) -> Option<Run> {
    let seed_node = &entries[seed].node;
    let seed_ok = match shortcut.kind() {
        ShortcutKind::Jump => seed_node.is_jump(),
        ShortcutKind::Repeat => !seed_node.is_jump(),
        _ => seed_node.as_f64().is_some(),
    };
    if !seed_ok {
        return None;
    }

    let follows_run = seed > 0 && claims[seed - 1].is_some();
    let chained = shortcut.is_chained()
        && follows_run
        && shortcut.continues_from(&entries[seed - 1].node, seed_node, tolerance);

    let free = |i: usize| {
        claims[i].is_none()
            && entries[i]
                .shortcut()
                .map_or(true, |id| id == shortcut.id())
    };

    let mut start = seed;
    let mut end = seed;
    if !chained {
        while start > 0
            && free(start - 1)
            && shortcut.accepts(
                &entries[start].node,
                &entries[start - 1].node,
                -1.0,
                end - start + 1,
                tolerance,
            )
        {
            start -= 1;
        }
    }
    while end + 1 < entries.len()
        && free(end + 1)
        && shortcut.accepts(
            &entries[end].node,
            &entries[end + 1].node,
            1.0,
            end - start + 1,
            tolerance,
        )
    {
        end += 1;
    }

    if end - start + 1 < shortcut.minimum_members(chained) {
        return None;
    }
    Some(Run {
        template: shortcut.clone(),
        start,
        end,
        chained,
    })
}

/// A dissolved shortcut hands its trailing layout to its last surviving value
fn restore_end_padding(shortcut: &ShortcutNode, entries: &mut [ListEntry], claims: &[Option<usize>]) {
    let Some(padding) = shortcut.end_padding().cloned() else {
        return;
    };
    let last = entries
        .iter()
        .enumerate()
        .rev()
        .find(|(i, entry)| claims[*i].is_none() && entry.shortcut() == Some(shortcut.id()))
        .map(|(i, _)| i);
    if let Some(index) = last {
        entries[index].node.set_padding(Some(padding));
    }
}

impl SyntaxNode for ListNode {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let mut out = String::new();
        for item in &self.items {
            let text = item.format(ctx);
            let needs_gap = self.rebuilt
                && !text.is_empty()
                && !text.starts_with(char::is_whitespace)
                && out.chars().last().is_some_and(|c| !c.is_whitespace());
            if needs_gap {
                out.push(' ');
            }
            out.push_str(&text);
        }
        if let Some(tail) = &self.tail {
            out.push_str(&tail.text());
        }
        out
    }

    fn comments(&self) -> Vec<&CommentNode> {
        let mut comments: Vec<&CommentNode> =
            self.items.iter().flat_map(ListItem::comments).collect();
        if let Some(tail) = &self.tail {
            comments.extend(tail.comments());
        }
        comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax_tree::shortcut::Lead;

    fn number(text: &str, padding: &str) -> ValueNode {
        ValueNode::parse(text, ValueKind::Float, Some(PaddingNode::from_text(padding))).unwrap()
    }

    /// `1 2 3 4R`
    fn repeat_list() -> ListNode {
        let mut list = ListNode::new();
        list.push_value(number("1", " "));
        list.push_value(number("2", " "));
        let lead = number("3", " ");
        let id = list.next_shortcut_id();
        list.push_shortcut(ShortcutNode::repeat(id, Lead::Owned(lead), "4R", None).unwrap());
        list
    }

    /// `1 1 2J 0`
    fn jump_list() -> ListNode {
        let mut list = ListNode::new();
        list.push_value(number("1", " "));
        list.push_value(number("1", " "));
        let id = list.next_shortcut_id();
        list.push_shortcut(ShortcutNode::jump(id, "2J", Some(PaddingNode::space())).unwrap());
        list.push_value(number("0", ""));
        list
    }

    fn floats(list: &ListNode) -> Vec<Option<f64>> {
        list.nodes().map(ValueNode::as_f64).collect()
    }

    #[test]
    fn test_shorthand_round_trip() {
        let mut list = repeat_list();
        assert_eq!(
            floats(&list),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(3.0), Some(3.0), Some(3.0), Some(3.0)]
        );
        assert_eq!(list.to_text(), "1 2 3 4R");

        let entries = list.entries();
        list.update_with_new_values(entries, Tolerance::default());
        assert_eq!(list.to_text(), "1 2 3 4R");
        assert_eq!(list.items().len(), 3);
    }

    #[test]
    fn test_jump_run_collapses_back() {
        let mut list = jump_list();
        assert_eq!(
            floats(&list),
            vec![Some(1.0), Some(1.0), None, None, Some(0.0)]
        );
        let entries = list.entries();
        list.update_with_new_values(entries, Tolerance::default());
        assert_eq!(list.to_text(), "1 1 2J 0");
    }

    #[test]
    fn test_edit_inside_repeat_keeps_compression() {
        let mut list = repeat_list();
        let mut values = list.values();
        values[6] = Some(Value::Float(9.0));
        list.set_values(values, Tolerance::default());
        assert_eq!(list.to_text(), "1 2 3 3R 9");
    }

    #[test]
    fn test_edited_lead_reseeds_repeat() {
        let mut list = ListNode::new();
        list.push_value(number("1", " "));
        let id = list.next_shortcut_id();
        list.push_shortcut(ShortcutNode::repeat(id, Lead::Owned(number("3", " ")), "4R", None).unwrap());

        let mut values = list.values();
        values[1] = Some(Value::Float(9.0));
        list.set_values(values, Tolerance::default());
        assert_eq!(list.to_text(), "1 9 3 3R");
        assert_eq!(list.items().len(), 3);
        assert_eq!(
            floats(&list),
            vec![Some(1.0), Some(9.0), Some(3.0), Some(3.0), Some(3.0), Some(3.0)]
        );
    }

    #[test]
    fn test_repeat_absorbs_appended_equal_value() {
        let mut list = repeat_list();
        let mut values = list.values();
        values.push(Some(Value::Float(3.0)));
        list.set_values(values, Tolerance::default());
        assert_eq!(list.to_text(), "1 2 3 5R");
    }

    #[test]
    fn test_breaking_repeat_dissolves_it() {
        let mut list = ListNode::new();
        list.push_value(number("1", " "));
        let id = list.next_shortcut_id();
        list.push_shortcut(
            ShortcutNode::repeat(id, Lead::Owned(number("5", " ")), "1R", Some(PaddingNode::from_text(" "))).unwrap(),
        );
        list.push_value(number("7", ""));

        let mut values = list.values();
        values[2] = Some(Value::Float(6.0));
        list.set_values(values, Tolerance::default());
        assert_eq!(list.items().len(), 4);
        assert_eq!(list.to_text(), "1 5 6 7");
    }

    #[test]
    fn test_orphan_jumps_become_shortcut() {
        let mut list = ListNode::new();
        list.push_value(number("1", " "));
        list.push_value(number("2", " "));
        list.push_value(number("3", ""));

        let mut values = list.values();
        values[1] = None;
        list.set_values(values, Tolerance::default());
        assert_eq!(list.to_text(), "1 J 3");
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_trailing_synthesized_jump_is_dropped() {
        let mut list = ListNode::new();
        list.push_value(number("1", " "));
        list.push_value(number("2", ""));

        let mut values = list.values();
        values.push(None);
        values.push(None);
        list.set_values(values, Tolerance::default());
        assert_eq!(list.len(), 2);
        assert_eq!(list.to_text(), "1 2");
    }

    #[test]
    fn test_interpolation_shrinks_around_edit() {
        let mut list = ListNode::new();
        let id = list.next_shortcut_id();
        list.push_shortcut(
            ShortcutNode::interpolate(
                id,
                ShortcutKind::Interpolate,
                Lead::Owned(number("1", " ")),
                "3I",
                Some(PaddingNode::space()),
                number("5", ""),
            )
            .unwrap(),
        );
        assert_eq!(list.to_text(), "1 3I 5");

        let mut values = list.values();
        values[4] = Some(Value::Float(6.0));
        list.set_values(values, Tolerance::default());
        assert_eq!(list.to_text(), "1 2I 4 6");
    }

    #[test]
    fn test_new_values_get_separated() {
        let mut list = ListNode::new();
        list.push_value(number("1", ""));
        let mut entries = list.entries();
        entries.push(ListEntry::new(ValueNode::float(2.5)));
        list.update_with_new_values(entries, Tolerance::default());
        assert_eq!(list.to_text(), "1 2.5");
    }
}
