//! Debug dump of the highlighting token table.

use anyhow::{Context, Result};

use bosque_kernel::lexer::{self, TokenKind};

pub fn run(file: &str) -> Result<()> {
    let source = std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?;
    for token in lexer::tokens(&source) {
        if token.kind == TokenKind::Whitespace {
            continue;
        }
        println!("{:<12} {:?}", format!("{:?}", token.kind), &source[token.span]);
    }
    Ok(())
}
