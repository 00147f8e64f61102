//! Search predicates over a repository's issues and pull requests.
//!
//! A [`QueryPredicate`] is an immutable value. Every mutator returns a new predicate and leaves the
//! receiver untouched, so predicates can be shared freely between concurrent queries. A predicate
//! renders to GitHub search syntax with [`QueryPredicate::build`], and can also be evaluated
//! locally against an [`Issue`](crate::data::Issue) with [`QueryPredicate::matches`].

mod date_constraint;
mod predicate;

pub use date_constraint::DateConstraint;
pub use predicate::{MilestoneFilter, QueryPredicate, StateFilter, TypeFilter};
