//! Jupyter kernel adapter for the Bosque language.
//!
//! Notebook cells are forwarded to the external Bosque toolchain (compiler
//! plus Node.js runner) as subprocesses; captured output is classified into
//! the small set of outcomes a kernel-protocol host renders (result text,
//! stream text, error with optional source position).

pub mod adapter;
pub mod config;
pub mod kernel;
pub mod kernelspec;
pub mod lexer;
pub mod observability;
pub mod wrapper;
