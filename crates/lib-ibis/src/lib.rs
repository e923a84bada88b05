//! # lib-ibis
//!
//! IBIS and IBIS-AMI file parsers.
//!
//! This crate provides parsers for:
//! - `.ami` files (AMI parameter definitions, as an S-expression tree)
//! - `.ibs` files (IBIS components, buffer models and model selectors)
//!
//! Both grammars are built on the `nom` parser combinator library and
//! share a lexical layer ([`lexer`]). AMI parameter definitions are
//! interpreted best-effort: problems with individual parameters are
//! collected as [`Diagnostics`] instead of aborting the parse.

pub mod error;
pub mod diagnostics;
pub mod lexer;
pub mod sexpr;
pub mod reserved;
pub mod ami_parameter;
pub mod ami_parser;
pub mod ibs_model;
pub mod ibs_parser;

pub use error::{ParamError, ParseError};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use ami_parameter::{AmiParameter, Format, ParamType, Usage};
pub use ami_parser::{
    parse_ami_file, parse_ami_file_contents, parse_ami_params_string, parse_ami_path,
    AmiContents, AmiFile, ParamNode, ParamTree,
};
pub use ibs_model::{Component, Model, ModelType};
pub use ibs_parser::{parse_ibis_file, parse_ibs, parse_ibs_file, parse_ibs_path, IbisFile};
