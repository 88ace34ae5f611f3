//! Rules: a named unit of work with commands, declared inputs and outputs.

use crate::node::{Node, Value};

/// A rule declaration.  Immutable once constructed; a successfully
/// constructed Rule always has at least one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    commands: Vec<String>,
    ins: Vec<String>,
    outs: Vec<String>,
}

impl Rule {
    /// Builds a rule directly.  Returns None if there are no commands.
    pub fn new(
        name: impl Into<String>,
        commands: Vec<String>,
        ins: Vec<String>,
        outs: Vec<String>,
    ) -> Option<Rule> {
        if commands.is_empty() {
            return None;
        }
        Some(Rule {
            name: name.into(),
            commands,
            ins,
            outs,
        })
    }

    /// Builds a rule from a `rule "name" { cmd ..; in ..; out .. }` node.
    ///
    /// All-or-nothing: returns None if the node isn't named "rule", doesn't
    /// carry exactly one string value, any cmd/in/out value isn't a string,
    /// or no commands were declared.
    pub fn from_node<N: Node>(node: &N) -> Option<Rule> {
        if node.name() != "rule" {
            return None;
        }
        let name = match node.values() {
            [Value::String(name)] => name.clone(),
            _ => return None,
        };

        let mut commands = Vec::new();
        let mut ins = Vec::new();
        let mut outs = Vec::new();
        for child in node.children() {
            let list = match child.name() {
                "cmd" => &mut commands,
                "in" => &mut ins,
                "out" => &mut outs,
                _ => continue,
            };
            for value in child.values() {
                list.push(value.as_str()?.to_owned());
            }
        }

        Rule::new(name, commands, ins, outs)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn ins(&self) -> &[String] {
        &self.ins
    }

    pub fn outs(&self) -> &[String] {
        &self.outs
    }
}
