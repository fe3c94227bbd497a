//! # Grammar Analysis
//!
//! Static checks run by [`GrammarBuilder::build`](crate::grammar::GrammarBuilder::build).
//!
//! - Nullability: which rules can succeed without consuming input.
//! - Left recursion: a rule that can reach itself without consuming input
//!   would recurse forever, so such grammars are rejected up front.

use crate::grammar::{Expr, RuleId};
use smallvec::SmallVec;

/// Whether `expr` can succeed without consuming input, given per-rule answers.
pub fn is_nullable<S, V>(expr: &Expr<S, V>, nullable: &[bool]) -> bool {
    match expr {
        Expr::Empty
        | Expr::ZeroOrMore(_)
        | Expr::Optional(_)
        | Expr::And(_)
        | Expr::Not(_) => true,
        Expr::Literal(_) | Expr::Any | Expr::Range(..) => false,
        Expr::Rule(id) => nullable.get(id.index()).copied().unwrap_or(false),
        Expr::Sequence(first, second) => {
            is_nullable(first, nullable) && is_nullable(second, nullable)
        }
        Expr::Choice(first, second) => {
            is_nullable(first, nullable) || is_nullable(second, nullable)
        }
        Expr::OneOrMore(inner) | Expr::Redirect(inner, _) => is_nullable(inner, nullable),
        Expr::IfThenElse {
            condition,
            then,
            otherwise,
        } => {
            (is_nullable(condition, nullable) && is_nullable(then, nullable))
                || is_nullable(otherwise, nullable)
        }
    }
}

/// Computes the nullable flag of every rule (fixed point).
pub fn nullable_rules<'a, S: 'a, V: 'a>(
    bodies: impl Iterator<Item = &'a Expr<S, V>> + Clone,
    rule_count: usize,
) -> Vec<bool> {
    let mut nullable = vec![false; rule_count];
    let mut changed = true;
    while changed {
        changed = false;
        for (index, body) in bodies.clone().enumerate() {
            if !nullable[index] && is_nullable(body, &nullable) {
                nullable[index] = true;
                changed = true;
            }
        }
    }
    nullable
}

/// Collects rules that `expr` may invoke at its own start position.
pub fn leading_rules<S, V>(expr: &Expr<S, V>, nullable: &[bool], out: &mut Vec<RuleId>) {
    match expr {
        Expr::Rule(id) => {
            if !out.contains(id) {
                out.push(*id);
            }
        }
        Expr::Sequence(first, second) => {
            leading_rules(first, nullable, out);
            if is_nullable(first, nullable) {
                leading_rules(second, nullable, out);
            }
        }
        Expr::Choice(first, second) => {
            leading_rules(first, nullable, out);
            leading_rules(second, nullable, out);
        }
        Expr::ZeroOrMore(inner)
        | Expr::OneOrMore(inner)
        | Expr::Optional(inner)
        | Expr::And(inner)
        | Expr::Not(inner)
        | Expr::Redirect(inner, _) => leading_rules(inner, nullable, out),
        Expr::IfThenElse {
            condition,
            then,
            otherwise,
        } => {
            leading_rules(condition, nullable, out);
            if is_nullable(condition, nullable) {
                leading_rules(then, nullable, out);
            }
            leading_rules(otherwise, nullable, out);
        }
        Expr::Empty | Expr::Literal(_) | Expr::Any | Expr::Range(..) => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Active,
    Done,
}

/// Finds a left-recursive cycle, returned as the rule path that closes it
/// (first and last element are the same rule).
pub fn find_left_recursion<'a, S: 'a, V: 'a>(
    bodies: impl Iterator<Item = &'a Expr<S, V>>,
    nullable: &[bool],
) -> Option<Vec<RuleId>> {
    let edges: Vec<Vec<RuleId>> = bodies
        .map(|body| {
            let mut out = Vec::new();
            leading_rules(body, nullable, &mut out);
            out
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; edges.len()];
    for start in 0..edges.len() {
        if marks[start] == Mark::Unvisited {
            let id = RuleId::new(u32::try_from(start).unwrap_or(u32::MAX));
            if let Some(cycle) = visit(id, &edges, &mut marks) {
                return Some(cycle);
            }
        }
    }
    None
}

/// Depth-first search from `root` with an explicit stack, so rule chains of
/// any length are walked without native recursion.
fn visit(root: RuleId, edges: &[Vec<RuleId>], marks: &mut [Mark]) -> Option<Vec<RuleId>> {
    // The current path: each rule with the index of its next edge to follow.
    let mut path: SmallVec<[(RuleId, usize); 16]> = SmallVec::new();
    marks[root.index()] = Mark::Active;
    path.push((root, 0));

    while let Some(frame) = path.last_mut() {
        let (id, edge) = *frame;
        frame.1 += 1;
        let Some(&next) = edges.get(id.index()).and_then(|out| out.get(edge)) else {
            marks[id.index()] = Mark::Done;
            path.pop();
            continue;
        };
        match marks.get(next.index()) {
            Some(Mark::Active) => {
                let start = path.iter().position(|(r, _)| *r == next).unwrap_or(0);
                let mut cycle: Vec<RuleId> = path[start..].iter().map(|(r, _)| *r).collect();
                cycle.push(next);
                return Some(cycle);
            }
            Some(Mark::Unvisited) => {
                marks[next.index()] = Mark::Active;
                path.push((next, 0));
            }
            Some(Mark::Done) | None => {}
        }
    }
    None
}
