//! Setup token materialization.
//!
//! Tokens registered during the filter pass are resolved to declarations
//! once, after the pass, in a fixed order: filters in stack order, and each
//! filter's tokens in the order it lists them. The declarations are
//! prepended to the program.
//!
//! A declaration that is already one of the program's top-level statements
//! is not added again, so materializing the output of an earlier run adds
//! nothing.

use crate::error::{ConvertError, ConvertResult};
use crate::filter::{SetupToken, SharedFilter};
use rbjs_tree::{Child, Node, NodeKind};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::debug;

pub(crate) fn materialize(
    filters: &[SharedFilter],
    tokens: &FxHashSet<SetupToken>,
    program: Node,
) -> ConvertResult<Node> {
    if tokens.is_empty() {
        return Ok(program);
    }

    let mut resolved: FxHashSet<SetupToken> = FxHashSet::default();
    let mut declarations: SmallVec<[Node; 4]> = SmallVec::new();
    for filter in filters {
        for &token in filter.setup_tokens() {
            if !tokens.contains(&token) || !resolved.insert(token) {
                continue;
            }
            let declaration = filter
                .setup_declaration(token)
                .ok_or(ConvertError::UnresolvedSetup { token: token.name() })?;
            declarations.push(declaration);
        }
    }

    if let Some(token) = tokens.iter().filter(|token| !resolved.contains(token)).min() {
        return Err(ConvertError::UnresolvedSetup { token: token.name() });
    }

    let statements: Vec<Child> = if program.is(&NodeKind::Begin) {
        program.children().to_vec()
    } else {
        vec![Child::Node(program.clone())]
    };
    let existing: Vec<&Node> = statements.iter().filter_map(Child::as_node).collect();
    declarations.retain(|declaration| !existing.contains(&&*declaration));

    if declarations.is_empty() {
        return Ok(program);
    }
    debug!(count = declarations.len(), "materializing setup declarations");

    let mut children: Vec<Child> = declarations.into_iter().map(Child::Node).collect();
    children.extend(statements);
    Ok(Node::new(NodeKind::Begin, children))
}
