//! Newick rendering and parsing.
//!
//! Labels are written bare unless they contain Newick punctuation or
//! whitespace, in which case they are single-quoted with embedded quotes
//! doubled. Underscores are kept literally on both sides.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0, none_of},
    combinator::{all_consuming, map, opt, value},
    multi::{fold_many0, separated_list1},
    sequence::{delimited, preceded, terminated},
    IResult,
};
use std::fmt;

use multitree_core::model::TreeNode;

use crate::error::{GraphError, GraphResult};

const RESERVED: &str = "()[]':;,";

/// A Newick tree with plain string labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewickNode {
    pub name: Option<String>,
    pub children: Vec<NewickNode>,
}

impl NewickNode {
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: NewickNode) -> Self {
        self.children.push(child);
        self
    }

    /// Node names in pre-order, skipping unnamed nodes.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(name) = &self.name {
            out.push(name);
        }
        for child in &self.children {
            child.collect_names(out);
        }
    }
}

impl From<&TreeNode> for NewickNode {
    fn from(node: &TreeNode) -> Self {
        Self {
            name: Some(node.label.to_string()),
            children: node.children.iter().map(NewickNode::from).collect(),
        }
    }
}

/// Writes the tree without the terminating `;`.
impl fmt::Display for NewickNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.children.is_empty() {
            f.write_str("(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{child}")?;
            }
            f.write_str(")")?;
        }
        if let Some(name) = &self.name {
            f.write_str(&quote_label(name))?;
        }
        Ok(())
    }
}

/// Quote a label if it cannot be written bare.
pub fn quote_label(label: &str) -> String {
    let needs_quotes = label.is_empty()
        || label
            .chars()
            .any(|c| c.is_whitespace() || RESERVED.contains(c));
    if needs_quotes {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

/// Parse a single Newick tree. The trailing `;` is optional.
///
/// Branch lengths are accepted and discarded.
pub fn parse_newick(input: &str) -> GraphResult<NewickNode> {
    all_consuming(terminated(
        ws(subtree),
        opt(terminated(char(';'), multispace0)),
    ))(input)
    .map(|(_, node)| node)
    .map_err(|e| GraphError::Newick(e.to_string()))
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn subtree(input: &str) -> IResult<&str, NewickNode> {
    let (input, children) = opt(delimited(
        char('('),
        separated_list1(char(','), ws(subtree)),
        char(')'),
    ))(input)?;
    let (input, name) = opt(preceded(multispace0, label))(input)?;
    let (input, _) = opt(preceded(ws(char(':')), branch_length))(input)?;
    Ok((
        input,
        NewickNode {
            name,
            children: children.unwrap_or_default(),
        },
    ))
}

fn label(input: &str) -> IResult<&str, String> {
    alt((quoted_label, bare_label))(input)
}

fn bare_label(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| !c.is_whitespace() && !RESERVED.contains(c)),
        String::from,
    )(input)
}

fn quoted_label(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        fold_many0(
            alt((value('\'', tag("''")), none_of("'"))),
            String::new,
            |mut acc, c| {
                acc.push(c);
                acc
            },
        ),
        char('\''),
    )(input)
}

fn branch_length(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_digit() || "+-.eE".contains(c))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use multitree_core::model::LanguageId;

    fn id(s: &str) -> LanguageId {
        LanguageId::normalize(s).unwrap()
    }

    #[test]
    fn test_write_from_tree_node() {
        let tree = TreeNode::new(id("root"))
            .with_child(TreeNode::new(id("a")).with_child(TreeNode::new(id("c"))))
            .with_child(TreeNode::new(id("b-x_y")));

        assert_eq!(NewickNode::from(&tree).to_string(), "((c)a,b-x_y)root");
    }

    #[test]
    fn test_quote_label() {
        assert_eq!(quote_label("abc_def"), "abc_def");
        assert_eq!(quote_label("a,b"), "'a,b'");
        assert_eq!(quote_label("it's"), "'it''s'");
        assert_eq!(quote_label("two words"), "'two words'");
    }

    #[test]
    fn test_parse_simple() {
        let tree = parse_newick("((c)a,b)root;").unwrap();
        assert_eq!(tree.name.as_deref(), Some("root"));
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.names(), vec!["root", "a", "c", "b"]);
    }

    #[test]
    fn test_parse_quoted_and_lengths() {
        let tree = parse_newick("('it''s':0.5, b:1)'r t' ;").unwrap();
        assert_eq!(tree.name.as_deref(), Some("r t"));
        assert_eq!(tree.children[0].name.as_deref(), Some("it's"));
        assert_eq!(tree.children[1].name.as_deref(), Some("b"));
    }

    #[test]
    fn test_parse_unnamed_inner_nodes() {
        let tree = parse_newick("((a,b),c);").unwrap();
        assert!(tree.name.is_none());
        assert!(tree.children[0].name.is_none());
        assert_eq!(tree.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_written_tree_parses_back() {
        let tree = TreeNode::new(id("x.y, a"))
            .with_child(TreeNode::new(id("q")))
            .with_child(TreeNode::new(id("r")));
        let written = NewickNode::from(&tree);
        let parsed = parse_newick(&format!("{written};")).unwrap();
        assert_eq!(parsed, written);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_newick("((a,b);").is_err());
        assert!(parse_newick("(a,b)c;d").is_err());
    }
}
