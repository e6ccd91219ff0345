//! Leading identifiers such as `M4`, `F104:n,p`, `*TR2` or `IMP:N`

use super::node::{FormatContext, SyntaxNode};
use super::padding::{CommentNode, PaddingNode};
use super::value::{Value, ValueNode};
use crate::config::constants::vocabulary::particle_name;
use serde::Serialize;

/// Particle list of a classifier, kept in written order
#[derive(Debug, Clone, Serialize)]
pub struct ParticleNode {
    /// Text as written, including the leading `:`
    token: Option<String>,
    particles: Vec<char>,
    original: Vec<char>,
    upper: bool,
}

impl ParticleNode {
    /// Build from the text after the classifier, e.g. `:n,p`
    pub fn parse(token: &str) -> Option<Self> {
        let body = token.strip_prefix(':')?;
        let mut particles = Vec::new();
        for part in body.split(',') {
            let part = part.trim();
            let mut chars = part.chars();
            match (chars.next(), chars.next()) {
                (Some(symbol), None) if particle_name(symbol).is_some() => particles.push(symbol),
                _ => return None,
            }
        }

        let letters: Vec<char> = particles.iter().copied().filter(char::is_ascii_alphabetic).collect();
        let upper_count = letters.iter().filter(|c| c.is_ascii_uppercase()).count();
        let upper = letters.is_empty() || upper_count * 2 >= letters.len();

        let normalized: Vec<char> = particles.iter().map(char::to_ascii_uppercase).collect();
        Some(Self {
            token: Some(token.to_string()),
            particles: normalized.clone(),
            original: normalized,
            upper,
        })
    }

    pub fn new(particles: &[char]) -> Self {
        Self {
            token: None,
            particles: particles.iter().map(char::to_ascii_uppercase).collect(),
            original: Vec::new(),
            upper: true,
        }
    }

    /// Particle symbols, upper-cased
    pub fn particles(&self) -> &[char] {
        &self.particles
    }

    pub fn set_particles(&mut self, particles: &[char]) {
        self.particles = particles.iter().map(char::to_ascii_uppercase).collect();
    }

    /// Sorted lower-case form used to fold equivalent classifiers
    pub fn key(&self) -> String {
        let mut sorted: Vec<char> = self.particles.iter().map(char::to_ascii_lowercase).collect();
        sorted.sort_unstable();
        sorted
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn text(&self) -> String {
        match &self.token {
            Some(token) if self.particles == self.original => token.clone(),
            _ => {
                let symbols: Vec<String> = self
                    .particles
                    .iter()
                    .map(|c| {
                        if self.upper {
                            c.to_ascii_uppercase()
                        } else {
                            c.to_ascii_lowercase()
                        }
                        .to_string()
                    })
                    .collect();
                format!(":{}", symbols.join(","))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifierNode {
    /// `*` or `+`
    modifier: Option<ValueNode>,
    prefix: ValueNode,
    number: Option<ValueNode>,
    particles: Option<ParticleNode>,
    padding: Option<PaddingNode>,
}

impl ClassifierNode {
    pub fn new(prefix: ValueNode) -> Self {
        Self {
            modifier: None,
            prefix,
            number: None,
            particles: None,
            padding: None,
        }
    }

    pub fn with_modifier(mut self, modifier: ValueNode) -> Self {
        self.modifier = Some(modifier);
        self
    }

    pub fn with_number(mut self, number: ValueNode) -> Self {
        self.number = Some(number);
        self
    }

    pub fn with_particles(mut self, particles: ParticleNode) -> Self {
        self.particles = Some(particles);
        self
    }

    pub fn with_padding(mut self, padding: PaddingNode) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn modifier(&self) -> Option<&str> {
        self.modifier.as_ref().and_then(ValueNode::as_str)
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_str().unwrap_or("")
    }

    pub fn number(&self) -> Option<i64> {
        self.number.as_ref().and_then(ValueNode::as_i64)
    }

    pub fn set_number(&mut self, number: i64) {
        match &mut self.number {
            Some(node) => node.set_value(Some(Value::Int(number))),
            None => self.number = Some(ValueNode::int(number).never_padded()),
        }
    }

    pub fn particles(&self) -> Option<&ParticleNode> {
        self.particles.as_ref()
    }

    pub fn particles_mut(&mut self) -> Option<&mut ParticleNode> {
        self.particles.as_mut()
    }

    pub fn padding(&self) -> Option<&PaddingNode> {
        self.padding.as_ref()
    }

    pub fn padding_mut(&mut self) -> &mut PaddingNode {
        self.padding.get_or_insert_with(PaddingNode::new)
    }

    /// Case- and particle-order-insensitive identity, e.g. `imp:n,p`
    pub fn key(&self) -> String {
        let mut key = self.prefix().to_ascii_lowercase();
        if let Some(number) = self.number() {
            key.push_str(&number.to_string());
        }
        if let Some(particles) = &self.particles {
            key.push(':');
            key.push_str(&particles.key());
        }
        key
    }
}

/// Normalize a user-supplied classifier such as `IMP:P,N` to its key form
pub fn classifier_key(text: &str) -> String {
    let lower = text.trim().to_ascii_lowercase();
    match lower.split_once(':') {
        Some((head, particles)) => {
            let mut symbols: Vec<&str> = particles.split(',').map(str::trim).collect();
            symbols.sort_unstable();
            format!("{}:{}", head, symbols.join(","))
        }
        None => lower,
    }
}

impl SyntaxNode for ClassifierNode {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let mut out = String::new();
        if let Some(modifier) = &self.modifier {
            out.push_str(&modifier.format(ctx));
        }
        out.push_str(&self.prefix.format(ctx));
        if let Some(number) = &self.number {
            out.push_str(&number.format(ctx));
        }
        if let Some(particles) = &self.particles {
            out.push_str(&particles.text());
        }
        if let Some(padding) = &self.padding {
            out.push_str(&padding.text());
        }
        out
    }

    fn comments(&self) -> Vec<&CommentNode> {
        self.padding
            .as_ref()
            .map(|padding| padding.comments())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax_tree::value::ValueKind;

    fn classifier(prefix: &str, number: Option<&str>, particles: Option<&str>) -> ClassifierNode {
        let mut node = ClassifierNode::new(ValueNode::parse(prefix, ValueKind::Text, None).unwrap());
        if let Some(number) = number {
            node = node.with_number(ValueNode::parse(number, ValueKind::Int, None).unwrap());
        }
        if let Some(particles) = particles {
            node = node.with_particles(ParticleNode::parse(particles).unwrap());
        }
        node
    }

    #[test]
    fn test_round_trip() {
        let node = classifier("F", Some("104"), Some(":n,P")).with_padding(PaddingNode::space());
        assert_eq!(node.to_text(), "F104:n,P ");
        assert_eq!(node.prefix(), "F");
        assert_eq!(node.number(), Some(104));
    }

    #[test]
    fn test_key_folds_case_and_order() {
        let node = classifier("IMP", None, Some(":P,N"));
        assert_eq!(node.key(), "imp:n,p");
        assert_eq!(classifier_key("imp:n,p"), node.key());
        assert_eq!(classifier_key("Vol"), "vol");
    }

    #[test]
    fn test_particle_case_policy() {
        let mut particles = ParticleNode::parse(":n,p").unwrap();
        particles.set_particles(&['N', 'E']);
        assert_eq!(particles.text(), ":n,e");

        let mut particles = ParticleNode::parse(":N").unwrap();
        particles.set_particles(&['n', 'h']);
        assert_eq!(particles.text(), ":N,H");

        assert!(ParticleNode::parse(":n,zz").is_none());
    }

    #[test]
    fn test_renumbering() {
        let mut node = classifier("m", Some("1"), None);
        node.set_number(20);
        assert_eq!(node.to_text(), "m20");
        assert_eq!(node.key(), "m20");
    }

    #[test]
    fn test_modifier() {
        let node = classifier("tr", Some("2"), None)
            .with_modifier(ValueNode::parse("*", ValueKind::Text, None).unwrap());
        assert_eq!(node.modifier(), Some("*"));
        assert_eq!(node.to_text(), "*tr2");
    }
}
