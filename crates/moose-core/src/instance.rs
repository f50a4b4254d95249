//! GetPot instance parsing
//!
//! Instance files are line oriented:
//!
//! ```text
//! [Mesh]                # top-level block
//!   dim = 2
//!   # uniform_refine = 1  (disabled parameter)
//!   [./generator]       # nested sub-block
//!     nx = 10
//!   [../]
//! []
//! ```
//!
//! Parsing runs in three stages: comment/blank-line preprocessing, top-level
//! block extraction, then per-block parsing of headers, parameters and
//! nested sub-blocks. Every stage keeps the 1-based line number of the
//! source so failures point at the offending line.

use nom::{
    bytes::complete::{tag, take_until},
    character::complete::{char, space0},
    combinator::{all_consuming, opt, rest},
    error::ParseError as NomParseError,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use tracing::{debug, info, warn};

use crate::block::Block;
use crate::error::{MooseError, Result};
use crate::node::Node;
use crate::parameter::Parameter;

/// Commented lines containing `=` with more whitespace-separated tokens than
/// this are prose, not disabled parameters.
const COMMENTED_PARAMETER_MAX_TOKENS: usize = 4;

const BLOCK_TERMINATOR: &str = "[]";
const SUB_BLOCK_OPENER: &str = "[./";
const SUB_BLOCK_TERMINATOR: &str = "[../]";

/// A preprocessed source line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

/// A parsed `[name]` / `[./name]` header.
#[derive(Debug, PartialEq, Eq)]
struct Header<'a> {
    active: bool,
    name: &'a str,
    description: &'a str,
}

/// Parses GetPot text into instance forests.
pub struct InstanceLoader;

impl InstanceLoader {
    /// Parse instance text into a forest of instance nodes.
    ///
    /// Either the whole text parses or an error is returned; no partial
    /// forest is produced.
    pub fn load(text: &str) -> Result<Vec<Node>> {
        let blocks = Self::parse_blocks(text)?;
        let forest: Vec<Node> = blocks.into_iter().map(Block::into_instance_node).collect();
        info!("Loaded {} instance blocks", forest.len());
        Ok(forest)
    }

    /// Parse instance text into top-level blocks.
    pub fn parse_blocks(text: &str) -> Result<Vec<Block>> {
        let lines = preprocess(text);
        let mut blocks = Vec::new();
        let mut cursor = 0;

        while cursor < lines.len() {
            let line = lines[cursor];

            if line.text.contains(SUB_BLOCK_OPENER) || line.text.contains(SUB_BLOCK_TERMINATOR) {
                return Err(MooseError::instance(
                    line.number,
                    format!("sub-block bracket '{}' outside any block", line.text),
                ));
            }
            if line.text.contains(BLOCK_TERMINATOR) {
                return Err(MooseError::instance(
                    line.number,
                    "block terminator '[]' without an open block",
                ));
            }
            if !(line.text.contains('[') && line.text.contains(']')) {
                warn!("Line {} is outside any block: {}", line.number, line.text);
                cursor += 1;
                continue;
            }
            if line.text.starts_with('#') && parse_header(line.text).is_none() {
                debug!("Line {} is a comment mentioning brackets", line.number);
                cursor += 1;
                continue;
            }

            let end = lines[cursor + 1..]
                .iter()
                .position(|l| l.text.contains(BLOCK_TERMINATOR))
                .map(|offset| cursor + 1 + offset)
                .ok_or_else(|| {
                    MooseError::instance(
                        line.number,
                        format!("block '{}' has no '[]' terminator", line.text),
                    )
                })?;

            let block = parse_block(&lines[cursor..end])?;
            debug!(
                "Parsed block {} ({} parameters, {} sub-blocks)",
                block.name,
                block.parameters.len(),
                block.subblocks.len()
            );
            blocks.push(block);
            cursor = end + 1;
        }

        Ok(blocks)
    }
}

// ============================================================================
// Preprocessing
// ============================================================================

/// Trim lines and drop blanks and prose comments.
fn preprocess(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let text = raw.trim();
            if text.is_empty() {
                return None;
            }
            if text.starts_with('#') {
                let structural = text.contains('=') || text.contains('[') || text.contains(']');
                if !structural {
                    return None;
                }
                if text.contains('=')
                    && text.split_whitespace().count() > COMMENTED_PARAMETER_MAX_TOKENS
                {
                    return None;
                }
            }
            Some(Line {
                number: i + 1,
                text,
            })
        })
        .collect()
}

// ============================================================================
// Blocks
// ============================================================================

/// Parse one block: its header line followed by its body, without the
/// closing terminator.
fn parse_block(lines: &[Line<'_>]) -> Result<Block> {
    let Some((first, _)) = lines.split_first() else {
        return Err(MooseError::instance(0, "empty block"));
    };
    let header = parse_header(first.text).ok_or_else(|| {
        MooseError::instance(first.number, format!("malformed block header '{}'", first.text))
    })?;
    if header.name.is_empty() {
        return Err(MooseError::instance(first.number, "block header without a name"));
    }

    let mut block = Block::new(header.name);
    block.active = header.active;
    block.description = header.description.to_string();

    let mut i = 1;
    while i < lines.len() {
        let line = lines[i];

        if !line.text.starts_with('[') && line.text.contains('=') {
            let mut param = parse_parameter(line)?;
            i += 1;
            while i < lines.len() && continues_value(lines[i].text) {
                param.default.push(' ');
                param.default.push_str(lines[i].text);
                i += 1;
            }
            block.parameters.push(param);
        } else if line.text.contains(SUB_BLOCK_OPENER) {
            let end = sub_block_end(lines, i)?;
            block.subblocks.push(parse_block(&lines[i..end])?);
            i = end + 1;
        } else if line.text.contains(SUB_BLOCK_TERMINATOR) {
            return Err(MooseError::instance(
                line.number,
                "sub-block terminator '[../]' without an open sub-block",
            ));
        } else {
            return Err(MooseError::instance(
                line.number,
                format!("expected a parameter or sub-block, found '{}'", line.text),
            ));
        }
    }

    Ok(block)
}

/// Index of the `[../]` line closing the sub-block opened at `start`.
fn sub_block_end(lines: &[Line<'_>], start: usize) -> Result<usize> {
    let mut depth = 1usize;
    for (k, line) in lines.iter().enumerate().skip(start + 1) {
        if line.text.contains(SUB_BLOCK_OPENER) {
            depth += 1;
        } else if line.text.contains(SUB_BLOCK_TERMINATOR) {
            depth -= 1;
            if depth == 0 {
                return Ok(k);
            }
        }
    }
    Err(MooseError::instance(
        lines[start].number,
        format!("sub-block '{}' is never closed", lines[start].text),
    ))
}

/// A value spills onto the next line unless that line holds a new
/// parameter or a (possibly commented) bracket.
fn continues_value(text: &str) -> bool {
    let uncommented = text.trim_start_matches('#').trim_start();
    !text.contains('=') && !uncommented.starts_with('[')
}

// ============================================================================
// Headers and Parameters
// ============================================================================

fn parse_header(text: &str) -> Option<Header<'_>> {
    match all_consuming(header::<nom::error::Error<&str>>)(text) {
        Ok((_, header)) => Some(header),
        Err(_) => None,
    }
}

/// `[#] '[' ['./'] name ']' [# description]`
fn header<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Header<'a>, E> {
    let (input, hash) = opt(char('#'))(input)?;
    let (input, _) = space0(input)?;
    let (input, name) = delimited(
        char('['),
        preceded(opt(tag("./")), take_until("]")),
        char(']'),
    )(input)?;
    let (input, _) = space0(input)?;
    let (input, description) = opt(preceded(char('#'), rest))(input)?;

    Ok((
        input,
        Header {
            active: hash.is_none(),
            name: name.trim(),
            description: description.map(str::trim).unwrap_or_default(),
        },
    ))
}

/// `[#] name '=' value`, split at the first `=`.
fn assignment<'a, E: NomParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (bool, &'a str, &'a str), E> {
    let (input, (hash, name, _, value)) =
        tuple((opt(char('#')), take_until("="), char('='), rest))(input)?;
    Ok((input, (hash.is_none(), name.trim(), value)))
}

fn parse_parameter(line: Line<'_>) -> Result<Parameter> {
    let (enabled, name, value) = match assignment::<nom::error::Error<&str>>(line.text) {
        Ok((_, parsed)) => parsed,
        Err(_) => {
            return Err(MooseError::instance(
                line.number,
                format!("unparseable parameter line '{}'", line.text),
            ))
        }
    };
    if name.is_empty() {
        return Err(MooseError::instance(line.number, "parameter without a name"));
    }

    let (value, comment) = match value.rfind('#') {
        Some(hash) => (&value[..hash], value[hash + 1..].trim()),
        None => (value, ""),
    };

    let mut param = Parameter::new(name, value.trim());
    param.enabled = enabled;
    param.comment = comment.to_string();
    Ok(param)
}
