//! Filter language.
//!
//! A query is a whitespace-separated list of `name=value` or
//! `name?key:value;key:value=value` statements, matched case-insensitively.
//! Statements with the same name are ORed, different names are ANDed.
//! The `ignore_*` names exclude matching records. `year=A:B` stands for
//! every year from A to B.
//!
//! ```
//! use devicecode::query::Query;
//!
//! let query = Query::parse("odm=edimax odm=accton brand=asus").unwrap();
//! assert_eq!(query.groups().count(), 2);
//! ```

mod catalog;
mod field;
mod filter;
mod lexer;
mod parser;

pub use catalog::{field_values, Catalog};
pub use field::{FilterField, FilterValue, YEAR_RANGE};
pub use filter::{Predicate, Query};
pub use lexer::tokenize;
pub use parser::{parse_statement, Statement};
