//! GetPot serialization of instance forests.

use tracing::debug;

use crate::block::Block;
use crate::node::Node;
use crate::parameter::Parameter;

/// Blocks written ahead of all others, in their original relative order.
pub const LEADING_BLOCKS: [&str; 2] = ["Functions", "Variables"];

/// Comment columns tried in order; past the last one a fixed gap is used.
const COMMENT_COLUMNS: [usize; 3] = [30, 45, 60];
const COMMENT_GAP: usize = 15;

const INDENT: &str = "  ";

/// Writes instance forests as GetPot text.
pub struct InstanceSerializer;

impl InstanceSerializer {
    /// Render the forest with `Functions` and `Variables` blocks first.
    ///
    /// Inactive blocks get a commented header and terminator, so a re-read
    /// restores them as inactive. Their parameters keep their own state.
    pub fn serialize(forest: &[Node]) -> String {
        let blocks: Vec<Block> = ordered(forest).map(Block::from_node).collect();

        let mut out = String::new();
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            write_block(&mut out, block, 0, true);
        }

        debug!("Serialized {} blocks ({} bytes)", blocks.len(), out.len());
        out
    }
}

/// Leading blocks first, then the rest, each group in forest order.
fn ordered(forest: &[Node]) -> impl Iterator<Item = &Node> {
    let leading = |node: &&Node| LEADING_BLOCKS.contains(&node.name.as_str());
    forest
        .iter()
        .filter(leading)
        .chain(forest.iter().filter(move |node| !leading(node)))
}

fn write_block(out: &mut String, block: &Block, depth: usize, parent_active: bool) {
    let active = parent_active && block.active;
    let indent = INDENT.repeat(depth);
    let hash = if active { "" } else { "#" };
    let (open, close) = if depth == 0 {
        (block.name.clone(), String::new())
    } else {
        (format!("./{}", block.name), "../".to_string())
    };

    let header = format!("{}{}[{}]", indent, hash, open);
    if active {
        push_line(out, header, &block.description);
    } else {
        // A note could push the commented header past the comment heuristic.
        push_line(out, header, "");
    }

    for param in &block.parameters {
        write_parameter(out, param, &indent);
    }
    for sub in &block.subblocks {
        write_block(out, sub, depth + 1, active);
    }

    out.push_str(&format!("{}{}[{}]\n", indent, hash, close));
}

/// Parameters sit one level below their block. Disabled ones are written
/// as `#name=value` without a note, which never has more whitespace-separated
/// tokens than the line they were read from.
fn write_parameter(out: &mut String, param: &Parameter, indent: &str) {
    if param.required || param.enabled {
        let note = if param.comment.is_empty() {
            &param.description
        } else {
            &param.comment
        };
        push_line(out, format!("{}{}{}", indent, INDENT, param), note);
    } else {
        out.push_str(&format!(
            "{}{}#{}={}\n",
            indent, INDENT, param.name, param.default
        ));
    }
}

/// Append `line`, followed by `# note` aligned to the next comment column.
fn push_line(out: &mut String, line: String, note: &str) {
    out.push_str(&line);
    let note: String = note.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    if !note.is_empty() {
        out.push_str(&" ".repeat(comment_padding(line.chars().count())));
        out.push_str("# ");
        out.push_str(&note);
    }
    out.push('\n');
}

fn comment_padding(line_len: usize) -> usize {
    COMMENT_COLUMNS
        .iter()
        .find(|column| line_len < **column)
        .map_or(COMMENT_GAP, |column| column - line_len)
}
