//! Text rendering of trees for the terminal.

use crate::newick::NewickNode;

/// Line-drawing characters used by [`ascii_art`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AsciiStyle {
    /// Box-drawing characters.
    #[default]
    Unicode,
    /// Plain ASCII only.
    Strict,
}

impl AsciiStyle {
    const fn glyphs(self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            Self::Unicode => ("├── ", "└── ", "│   ", "    "),
            Self::Strict => ("+-- ", "\\-- ", "|   ", "    "),
        }
    }
}

/// Draw a tree one node per line, children indented below their parent.
///
/// `label` maps each node name to the text shown; unnamed nodes are drawn
/// as `*`.
///
/// ```
/// use multitree_graph::{ascii_art, parse_newick, AsciiStyle};
///
/// let tree = parse_newick("((c)a,b)root;").unwrap();
/// let art = ascii_art(&tree, AsciiStyle::Strict, |name| name.to_string());
/// assert_eq!(art, "root\n+-- a\n|   \\-- c\n\\-- b");
/// ```
pub fn ascii_art<F>(tree: &NewickNode, style: AsciiStyle, label: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut lines = vec![display_name(tree, &label)];
    draw_children(tree, style, &label, "", &mut lines);
    lines.join("\n")
}

fn display_name<F: Fn(&str) -> String>(node: &NewickNode, label: &F) -> String {
    node.name.as_deref().map_or_else(|| "*".to_string(), label)
}

fn draw_children<F: Fn(&str) -> String>(
    node: &NewickNode,
    style: AsciiStyle,
    label: &F,
    prefix: &str,
    lines: &mut Vec<String>,
) {
    let (branch, last_branch, pipe, blank) = style.glyphs();
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { last_branch } else { branch };
        lines.push(format!("{prefix}{connector}{}", display_name(child, label)));

        let extension = if is_last { blank } else { pipe };
        draw_children(child, style, label, &format!("{prefix}{extension}"), lines);
    }
}
