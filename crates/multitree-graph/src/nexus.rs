//! NEXUS `TREES` block writing and reading.
//!
//! Only the subset this project produces is understood: one `TREE`
//! statement per line inside a `BEGIN TREES;` block, no `TRANSLATE`
//! table.

use multitree_core::model::TreeNode;

use crate::error::{GraphError, GraphResult};
use crate::newick::{parse_newick, quote_label, NewickNode};

/// Render rooted trees as a NEXUS document with a single `TREES` block.
///
/// Trees are written in iteration order.
pub fn write_nexus<'a, I>(trees: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a TreeNode)>,
{
    let statements: String = trees
        .into_iter()
        .map(|(name, tree)| {
            format!(
                "TREE {} = [&R] {};\n",
                quote_label(name),
                NewickNode::from(tree)
            )
        })
        .collect();
    format!("#NEXUS\nBEGIN TREES;\n{statements}END;\n")
}

/// Read every tree from the `TREES` block(s) of a NEXUS document.
pub fn read_nexus(content: &str) -> GraphResult<Vec<(String, NewickNode)>> {
    let mut lines = content.lines().enumerate();
    match lines.next() {
        Some((_, first)) if first.trim().eq_ignore_ascii_case("#NEXUS") => {}
        _ => {
            return Err(GraphError::Nexus {
                line: 1,
                message: "missing #NEXUS header".to_string(),
            })
        }
    }

    let mut in_trees = false;
    let mut trees = Vec::new();
    for (index, line) in lines {
        let line = line.trim();
        let upper = line.to_ascii_uppercase();
        if upper.starts_with("BEGIN TREES") {
            in_trees = true;
        } else if upper.starts_with("END;") || upper.starts_with("ENDBLOCK;") {
            in_trees = false;
        } else if in_trees && upper.starts_with("TREE ") {
            trees.push(parse_tree_statement(&line[5..]).map_err(|message| {
                GraphError::Nexus {
                    line: index + 1,
                    message,
                }
            })?);
        }
    }
    Ok(trees)
}

fn parse_tree_statement(statement: &str) -> Result<(String, NewickNode), String> {
    let (name, rest) = statement
        .split_once('=')
        .ok_or_else(|| "TREE statement without '='".to_string())?;
    let name = name.trim().trim_matches('\'').replace("''", "'");

    let mut newick = rest.trim_start();
    while let Some(stripped) = newick.strip_prefix('[') {
        let end = stripped
            .find(']')
            .ok_or_else(|| "unterminated comment".to_string())?;
        newick = stripped[end + 1..].trim_start();
    }

    let tree = parse_newick(newick).map_err(|e| e.to_string())?;
    Ok((name, tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use multitree_core::model::LanguageId;

    fn id(s: &str) -> LanguageId {
        LanguageId::normalize(s).unwrap()
    }

    #[test]
    fn test_write_nexus() {
        let one = TreeNode::new(id("r")).with_child(TreeNode::new(id("a")));
        let two = TreeNode::new(id("s"))
            .with_child(TreeNode::new(id("b")))
            .with_child(TreeNode::new(id("c")));

        let nex = write_nexus([("1", &one), ("2", &two)]);
        assert_eq!(
            nex,
            "#NEXUS\nBEGIN TREES;\nTREE 1 = [&R] (a)r;\nTREE 2 = [&R] (b,c)s;\nEND;\n"
        );
    }

    #[test]
    fn test_read_back() {
        let one = TreeNode::new(id("r")).with_child(TreeNode::new(id("a")));
        let nex = write_nexus([("17", &one)]);

        let trees = read_nexus(&nex).unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].0, "17");
        assert_eq!(trees[0].1, NewickNode::from(&one));
    }

    #[test]
    fn test_read_requires_header() {
        assert!(read_nexus("BEGIN TREES;\nEND;\n").is_err());
    }

    #[test]
    fn test_read_reports_line() {
        let err = read_nexus("#NEXUS\nBEGIN TREES;\nTREE 1 = [&R] ((a;\nEND;\n").unwrap_err();
        assert!(matches!(err, GraphError::Nexus { line: 3, .. }));
    }

    #[test]
    fn test_read_ignores_other_blocks() {
        let nex = "#NEXUS\nBEGIN TAXA;\nTREE x = (a)b;\nEND;\nBEGIN TREES;\ntree t = (a)b;\nEND;\n";
        let trees = read_nexus(nex).unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].0, "t");
    }
}
