//! Reader for prefix notation.
//!
//! Grammar: `node := '(' INTEGER node node ')' | 'nil'`. Whitespace between
//! tokens is insignificant.
//!
//! Two modes exist. [`ParseMode::Reference`] reproduces the historical reader
//! byte for byte, quirks included: a missing integer leaves the value
//! poisoned, the `nil` step swallows whatever word it finds, and the closing
//! scan runs blindly to the next `)`. [`ParseMode::Hardened`] rejects those
//! inputs with a [`ParseError`] and tracks nesting while looking for the
//! closing parenthesis.

use std::str::FromStr;

use nom::bytes::complete::{tag, take_till, take_while};
use nom::character::complete::i32 as integer;
use nom::IResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::domain::arena::{NodeId, NodeValue, Tree, POISON};
use crate::domain::error::{DomainError, DomainResult, ParseError};

type Res<'a, O> = IResult<&'a str, O, nom::error::Error<&'a str>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Validating reader with depth-tracked closing scan.
    #[default]
    Hardened,
    /// Historical reader, no validation.
    Reference,
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hardened" => Ok(ParseMode::Hardened),
            "reference" => Ok(ParseMode::Reference),
            other => Err(format!(
                "unknown parse mode '{other}', expected 'hardened' or 'reference'"
            )),
        }
    }
}

/// Reader settings, loaded from the `[parse]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub mode: ParseMode,
    /// Deepest node nesting accepted before giving up.
    pub max_depth: usize,
    /// Cap on live nodes in the produced tree.
    pub node_limit: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mode: ParseMode::Hardened,
            max_depth: 4096,
            node_limit: None,
        }
    }
}

/// Matches C `isspace` in the default locale.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

fn skip_space(input: &str) -> &str {
    let res: Res<&str> = take_while(is_space)(input);
    res.map(|(rest, _)| rest).unwrap_or(input)
}

struct PrefixParser<'a, 'o> {
    source: &'a str,
    options: &'o ParseOptions,
    created: usize,
}

/// A node whose `(` and value have been read but not its closing `)`.
struct OpenNode {
    opened_at: usize,
    value: NodeValue,
    /// `None` until the left subtree is complete.
    left: Option<Option<NodeId>>,
}

impl<'a> PrefixParser<'a, '_> {
    fn offset(&self, rest: &str) -> usize {
        self.source.len() - rest.len()
    }

    /// Reads one subtree. Open nodes live on an explicit stack, so input
    /// nesting never grows the call stack.
    fn subtree(
        &mut self,
        tree: &mut Tree,
        input: &'a str,
    ) -> DomainResult<(&'a str, Option<NodeId>)> {
        let mut open: Vec<OpenNode> = Vec::new();
        let mut rest = input;

        loop {
            let (after, mut done) = self.open(&mut open, rest)?;
            rest = after;

            while let Some(subtree) = done.take() {
                let Some(mut node) = open.pop() else {
                    return Ok((rest, subtree));
                };
                let Some(left) = node.left else {
                    node.left = Some(subtree);
                    open.push(node);
                    break;
                };

                rest = self.close(rest, node.opened_at)?;
                let id = tree.create_node(node.value, left, subtree)?;
                self.created += 1;
                done = Some(Some(id));
            }
        }
    }

    /// Starts the subtree at `input`. Returns the finished subtree when it is
    /// empty, or pushes a new open node and returns `None`.
    fn open(
        &self,
        open: &mut Vec<OpenNode>,
        input: &'a str,
    ) -> DomainResult<(&'a str, Option<Option<NodeId>>)> {
        let input = skip_space(input);
        let Some(symbol) = input.chars().next() else {
            return Ok((input, Some(None)));
        };
        if symbol != '(' {
            return Ok((self.empty_subtree(input)?, Some(None)));
        }

        let opened_at = self.offset(input);
        if open.len() >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                offset: opened_at,
                max_depth: self.options.max_depth,
            }
            .into());
        }

        let (rest, value) = self.value(&input[1..])?;
        open.push(OpenNode {
            opened_at,
            value,
            left: None,
        });
        Ok((rest, None))
    }

    fn value(&self, input: &'a str) -> DomainResult<(&'a str, NodeValue)> {
        let input = skip_space(input);
        let res: Res<NodeValue> = integer(input);
        match (res, self.options.mode) {
            (Ok((rest, value)), _) => Ok((rest, value)),
            (Err(_), ParseMode::Reference) => {
                trace!(offset = self.offset(input), "no integer, value stays poisoned");
                Ok((input, POISON))
            }
            (Err(_), ParseMode::Hardened) => Err(ParseError::InvalidInteger {
                offset: self.offset(input),
            }
            .into()),
        }
    }

    /// `input` starts at the first non-space character, which is not `(`.
    fn empty_subtree(&self, input: &'a str) -> DomainResult<&'a str> {
        match self.options.mode {
            ParseMode::Reference => {
                // one character, then the next whitespace-delimited word
                let first = input.chars().next().map_or(0, char::len_utf8);
                let rest = skip_space(&input[first..]);
                let res: Res<&str> = take_till(is_space)(rest);
                Ok(res.map(|(rest, _)| rest).unwrap_or(rest))
            }
            ParseMode::Hardened => {
                let res: Res<&str> = tag("nil")(input);
                res.map(|(rest, _)| rest).map_err(|_| self.unexpected(input))
            }
        }
    }

    fn close(&self, input: &'a str, opened_at: usize) -> DomainResult<&'a str> {
        match self.options.mode {
            ParseMode::Reference => match input.find(')') {
                Some(pos) => Ok(&input[pos + 1..]),
                None => {
                    trace!(opened_at, "input ended before ')'");
                    Ok(&input[input.len()..])
                }
            },
            ParseMode::Hardened => {
                let mut nesting = 0usize;
                let mut skipped = 0usize;
                for (pos, c) in input.char_indices() {
                    match c {
                        ')' if nesting == 0 => {
                            if skipped > 0 {
                                warn!(opened_at, skipped, "skipped stray group before ')'");
                            }
                            return Ok(&input[pos + 1..]);
                        }
                        ')' => nesting -= 1,
                        '(' => nesting += 1,
                        c if is_space(c) => continue,
                        _ if nesting == 0 => return Err(self.unexpected(&input[pos..])),
                        _ => {}
                    }
                    skipped += 1;
                }
                Err(ParseError::UnterminatedNode { opened_at }.into())
            }
        }
    }

    /// Error for the word starting at `input`, cut to 16 characters.
    fn unexpected(&self, input: &str) -> DomainError {
        let found = input
            .split(|c: char| is_space(c) || c == '(' || c == ')')
            .next()
            .unwrap_or_default()
            .chars()
            .take(16)
            .collect();
        ParseError::UnexpectedToken {
            offset: self.offset(input),
            found,
        }
        .into()
    }
}

/// Reads one tree from `input` into `tree`, replacing its previous content.
///
/// The tree's size is set to the number of nodes read. On error the tree is
/// left empty.
#[instrument(level = "debug", skip(tree, input))]
pub fn read_prefix(tree: &mut Tree, input: &str, options: &ParseOptions) -> DomainResult<()> {
    if tree.live_nodes() > 0 {
        tree.destroy();
    }

    let mut parser = PrefixParser {
        source: input,
        options,
        created: 0,
    };
    let root = match parser.subtree(tree, input) {
        Ok((rest, root)) => {
            let rest = skip_space(rest);
            if options.mode == ParseMode::Hardened && !rest.is_empty() {
                tree.destroy();
                return Err(ParseError::TrailingInput {
                    offset: parser.offset(rest),
                }
                .into());
            }
            root
        }
        Err(e) => {
            tree.destroy();
            return Err(e);
        }
    };

    tree.set_root(root, parser.created)?;
    let depth = tree.depth();
    debug!(nodes = parser.created, depth, "tree parsed");
    Ok(())
}

/// Parses `input` into a new tree honoring `options.node_limit`.
pub fn parse_prefix(input: &str, options: &ParseOptions) -> DomainResult<Tree> {
    let mut tree = Tree::with_node_limit(options.node_limit);
    read_prefix(&mut tree, input, options)?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notation::{render, Notation};
    use rstest::rstest;

    fn hardened() -> ParseOptions {
        ParseOptions::default()
    }

    fn reference() -> ParseOptions {
        ParseOptions {
            mode: ParseMode::Reference,
            ..ParseOptions::default()
        }
    }

    fn parse_err(input: &str, options: &ParseOptions) -> ParseError {
        match parse_prefix(input, options) {
            Err(DomainError::Parse(e)) => e,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[rstest]
    #[case("nil")]
    #[case("")]
    #[case("   \n\t")]
    #[case("nil \n")]
    fn given_no_node_then_empty_tree(#[case] input: &str) {
        for options in [hardened(), reference()] {
            let tree = parse_prefix(input, &options).unwrap();
            assert!(tree.is_empty());
            assert_eq!(tree.size(), 0);
        }
    }

    #[rstest]
    #[case("(1 (2 (4 nil nil )nil )(3 nil nil ))")]
    #[case("(-7 nil (+8 nil nil ))")]
    #[case("  ( 1\n nil\tnil ) ")]
    fn given_printer_output_then_round_trips(#[case] input: &str) {
        for options in [hardened(), reference()] {
            let tree = parse_prefix(input, &options).unwrap();
            let again = parse_prefix(&render(&tree, Notation::Prefix), &options).unwrap();
            assert!(tree.is_isomorphic(&again));
            assert_eq!(tree.size(), tree.node_count());
        }
    }

    #[test]
    fn given_compact_nil_then_reference_desynchronizes_but_hardened_does_not() {
        let input = "(1 (2 nil nil) (3 nil nil ))";

        let strict = parse_prefix(input, &hardened()).unwrap();
        assert_eq!(render(&strict, Notation::Prefix), "(1 (2 nil nil )(3 nil nil ))\n");

        // "nil)" is swallowed as one word, so the blind scan eats node 3's ')'
        let loose = parse_prefix(input, &reference()).unwrap();
        assert_eq!(render(&loose, Notation::Prefix), "(1 (2 nil nil )nil )\n");
    }

    #[test]
    fn given_missing_integer_then_reference_poisons_value() {
        let tree = parse_prefix("(x nil nil )", &reference()).unwrap();
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.value(), POISON);
    }

    #[test]
    fn given_missing_integer_then_hardened_fails() {
        assert_eq!(
            parse_err("(x nil nil )", &hardened()),
            ParseError::InvalidInteger { offset: 1 }
        );
    }

    #[test]
    fn given_overflowing_integer_then_hardened_fails() {
        assert_eq!(
            parse_err("(99999999999 nil nil )", &hardened()),
            ParseError::InvalidInteger { offset: 1 }
        );
    }

    #[test]
    fn given_unknown_token_then_hardened_fails() {
        assert_eq!(
            parse_err("(1 foo nil )", &hardened()),
            ParseError::UnexpectedToken {
                offset: 3,
                found: "foo".into()
            }
        );
    }

    #[test]
    fn given_unknown_token_then_reference_treats_it_as_nil() {
        let tree = parse_prefix("(1 foo bar )", &reference()).unwrap();
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn given_unclosed_node_then_hardened_fails() {
        assert_eq!(
            parse_err("(1 nil nil", &hardened()),
            ParseError::UnterminatedNode { opened_at: 0 }
        );
    }

    #[test]
    fn given_unclosed_node_then_reference_stops_at_end_of_input() {
        let tree = parse_prefix("(1 nil nil", &reference()).unwrap();
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn given_trailing_text_then_hardened_fails() {
        assert_eq!(
            parse_err("nil nil", &hardened()),
            ParseError::TrailingInput { offset: 4 }
        );
        assert!(parse_prefix("nil nil", &reference()).unwrap().is_empty());
    }

    #[test]
    fn given_balanced_stray_group_then_hardened_skips_it() {
        let tree = parse_prefix("(1 nil nil (junk (more)) )", &hardened()).unwrap();
        assert_eq!(tree.node_count(), 1);
    }

    #[rstest]
    #[case("(1 nil nil garbage 42 )", 11, "garbage")]
    #[case("(1 nil nil 42)", 11, "42")]
    #[case("(1 (2 nil nil x) nil )", 14, "x")]
    fn given_bare_text_before_close_then_hardened_fails(
        #[case] input: &str,
        #[case] offset: usize,
        #[case] found: &str,
    ) {
        assert_eq!(
            parse_err(input, &hardened()),
            ParseError::UnexpectedToken {
                offset,
                found: found.into()
            }
        );
    }

    #[test]
    fn given_bare_text_before_close_then_reference_skips_it() {
        let tree = parse_prefix("(1 nil nil garbage 42 )", &reference()).unwrap();
        assert_eq!(tree.node_count(), 1);
    }

    fn left_chain(depth: usize) -> String {
        format!("{}nil {}", "(1 ".repeat(depth), "nil )".repeat(depth))
    }

    #[test]
    fn given_chain_at_default_depth_limit_then_parses() {
        let options = hardened();
        let tree = parse_prefix(&left_chain(options.max_depth), &options).unwrap();
        assert_eq!(tree.depth(), options.max_depth);
        assert_eq!(tree.size(), options.max_depth);
        assert_eq!(tree.node_count(), options.max_depth);
    }

    #[test]
    fn given_chain_one_past_default_depth_limit_then_fails() {
        for options in [hardened(), reference()] {
            let limit = options.max_depth;
            assert_eq!(
                parse_err(&left_chain(limit + 1), &options),
                ParseError::NestingTooDeep {
                    offset: 3 * limit,
                    max_depth: limit
                }
            );
        }
    }

    #[test]
    fn given_nesting_beyond_limit_then_fails() {
        let options = ParseOptions {
            max_depth: 2,
            ..ParseOptions::default()
        };
        assert_eq!(
            parse_err("(1 (2 (3 nil nil )nil )nil )", &options),
            ParseError::NestingTooDeep {
                offset: 6,
                max_depth: 2
            }
        );
    }

    #[test]
    fn given_node_limit_then_allocation_error_and_empty_tree() {
        let options = ParseOptions {
            node_limit: Some(1),
            ..ParseOptions::default()
        };
        let mut tree = Tree::with_node_limit(Some(1));
        let result = read_prefix(&mut tree, "(1 (2 nil nil )nil )", &options);
        assert_eq!(result, Err(DomainError::Allocation { limit: 1 }));
        assert!(tree.is_empty());
        assert_eq!(tree.live_nodes(), 0);
    }

    #[test]
    fn given_populated_tree_when_reading_then_content_replaced() {
        let mut tree = parse_prefix("(1 (2 nil nil )nil )", &hardened()).unwrap();
        read_prefix(&mut tree, "(9 nil nil )", &hardened()).unwrap();
        assert_eq!(tree.live_nodes(), 1);
        assert_eq!(render(&tree, Notation::Prefix), "(9 nil nil )\n");
    }

    #[rstest]
    #[case("hardened", ParseMode::Hardened)]
    #[case("Reference", ParseMode::Reference)]
    fn test_parse_mode_from_str(#[case] input: &str, #[case] expected: ParseMode) {
        assert_eq!(input.parse::<ParseMode>().unwrap(), expected);
    }
}
