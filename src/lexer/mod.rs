//! Bosque token table for syntax highlighting.
//!
//! This follows the grammar of the Bosque tmLanguage definition: `%%` line
//! comments, `%* … *%` block comments, suffixed numeric literals (`5i`,
//! `5n`, `1/2R`, `1.5f`), `::`-qualified capitalized type names, and
//! optionally `$`-prefixed variables. Identifiers are lexed generically and
//! reclassified against the keyword tables afterwards.

use std::ops::Range;

use logos::Logos;

pub const CONTROL_KEYWORDS: &[&str] = &[
    "abort", "assert", "if", "elif", "else", "fn", "pred", "let", "match", "ref", "return",
    "switch", "then", "var", "yield", "ensures", "invariant", "example", "requires", "validate",
    "softcheck", "errtest", "chektest",
];

pub const DECLARATION_KEYWORDS: &[&str] = &[
    "recursive", "action", "_debug", "bsqon", "do", "fail", "implements", "debug", "release",
    "safety", "spec", "test", "api", "as", "concept", "const", "declare", "enum", "entity",
    "field", "function", "method", "namespace", "of", "provides", "in", "task", "datatype",
    "using", "when", "event", "status", "resource", "predicate", "operator", "variant",
];

pub const LANGUAGE_CONSTANTS: &[&str] = &[
    "none", "true", "false", "fail", "ok", "some", "result", "option", "env", "this", "self",
];

/// Raw lexing table. Keywords, constants, and function names are resolved in
/// a second pass over the generic `Ident` matches.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"%%[^\n]*")]
    LineComment,

    #[regex(r"%\*([^*]|\*[^%])*\*%")]
    BlockComment,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    StringLit,

    #[regex(r"[0-9]+[inIN]")]
    #[regex(r"[0-9]+(/[0-9]+)?R")]
    #[regex(r"[0-9]+\.[0-9]+([eE][-+]?[0-9]+)?[fd]")]
    #[regex(r"[0-9]+")]
    Number,

    #[regex(r"[A-Z][_a-zA-Z0-9]*(::[A-Z][_a-zA-Z0-9]*)*")]
    TypeName,

    #[regex(r"\$?[_a-z][_a-zA-Z0-9]*")]
    #[token("$")]
    Ident,

    #[regex(r"[+\-*/=<>!]+")]
    Operator,

    #[regex(r"[{}()\[\];,:.]")]
    Punctuation,

    #[regex(r".", priority = 0)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    Comment,
    String,
    Number,
    Keyword,
    Constant,
    Type,
    Variable,
    Function,
    Operator,
    Punctuation,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Tokenize `source` for highlighting. Unrecognized bytes come back as
/// `Unknown` tokens; this never fails.
pub fn tokens(source: &str) -> Vec<Token> {
    let mut lex = RawToken::lexer(source);
    let mut out = Vec::new();
    while let Some(result) = lex.next() {
        let kind = match result {
            Ok(raw) => classify_raw(raw, lex.slice()),
            Err(()) => TokenKind::Unknown,
        };
        out.push(Token {
            kind,
            span: lex.span(),
        });
    }
    mark_function_names(source, &mut out);
    out
}

fn classify_raw(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Whitespace => TokenKind::Whitespace,
        RawToken::LineComment | RawToken::BlockComment => TokenKind::Comment,
        RawToken::StringLit => TokenKind::String,
        RawToken::Number => TokenKind::Number,
        RawToken::TypeName => TokenKind::Type,
        RawToken::Ident => {
            if CONTROL_KEYWORDS.contains(&slice) || DECLARATION_KEYWORDS.contains(&slice) {
                TokenKind::Keyword
            } else if LANGUAGE_CONSTANTS.contains(&slice) {
                TokenKind::Constant
            } else {
                TokenKind::Variable
            }
        }
        RawToken::Operator => TokenKind::Operator,
        RawToken::Punctuation => TokenKind::Punctuation,
        RawToken::Unknown => TokenKind::Unknown,
    }
}

/// A variable immediately followed by `(` (whitespace ignored) is a call,
/// highlighted as a function name. Keywords and constants keep their kind.
fn mark_function_names(source: &str, toks: &mut [Token]) {
    for i in 0..toks.len() {
        if toks[i].kind != TokenKind::Variable {
            continue;
        }
        let is_call = toks[i + 1..]
            .iter()
            .find(|t| t.kind != TokenKind::Whitespace)
            .map(|t| t.kind == TokenKind::Punctuation && &source[t.span.clone()] == "(")
            .unwrap_or(false);
        if is_call {
            toks[i].kind = TokenKind::Function;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        tokens(source)
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| (t.kind, &source[t.span]))
            .collect()
    }

    #[test]
    fn keywords_and_constants() {
        assert_eq!(
            kinds("let x = none;"),
            vec![
                (TokenKind::Keyword, "let"),
                (TokenKind::Variable, "x"),
                (TokenKind::Operator, "="),
                (TokenKind::Constant, "none"),
                (TokenKind::Punctuation, ";"),
            ]
        );
    }

    #[test]
    fn line_comment() {
        assert_eq!(
            kinds("%% a comment\nvar y"),
            vec![
                (TokenKind::Comment, "%% a comment"),
                (TokenKind::Keyword, "var"),
                (TokenKind::Variable, "y"),
            ]
        );
    }

    #[test]
    fn block_comment_spans_lines() {
        let source = "%* first\nsecond *% true";
        assert_eq!(
            kinds(source),
            vec![
                (TokenKind::Comment, "%* first\nsecond *%"),
                (TokenKind::Constant, "true"),
            ]
        );
    }

    #[test]
    fn suffixed_numeric_literals() {
        for lit in ["5i", "5n", "42I", "42N", "3R", "1/2R", "1.5f", "2.5e10d", "7"] {
            let toks = kinds(lit);
            assert_eq!(toks.len(), 1, "literal {lit:?} lexed as {toks:?}");
            assert_eq!(toks[0], (TokenKind::Number, lit));
        }
    }

    #[test]
    fn qualified_type_names() {
        assert_eq!(
            kinds("Core::List"),
            vec![(TokenKind::Type, "Core::List")]
        );
        assert_eq!(kinds("T"), vec![(TokenKind::Type, "T")]);
    }

    #[test]
    fn strings_with_escapes() {
        assert_eq!(
            kinds(r#""hello \"world\"""#),
            vec![(TokenKind::String, r#""hello \"world\"""#)]
        );
        assert_eq!(kinds(r"'a\'b'"), vec![(TokenKind::String, r"'a\'b'")]);
    }

    #[test]
    fn call_is_a_function_name() {
        assert_eq!(
            kinds("foo (1i)"),
            vec![
                (TokenKind::Function, "foo"),
                (TokenKind::Punctuation, "("),
                (TokenKind::Number, "1i"),
                (TokenKind::Punctuation, ")"),
            ]
        );
    }

    #[test]
    fn keyword_before_paren_stays_keyword() {
        let toks = kinds("if (x)");
        assert_eq!(toks[0], (TokenKind::Keyword, "if"));
    }

    #[test]
    fn unknown_bytes_do_not_panic() {
        let toks = kinds("let x = @;");
        assert!(toks.iter().any(|(k, s)| *k == TokenKind::Unknown && *s == "@"));
    }

    #[test]
    fn dollar_variables() {
        assert_eq!(
            kinds("$value + $"),
            vec![
                (TokenKind::Variable, "$value"),
                (TokenKind::Operator, "+"),
                (TokenKind::Variable, "$"),
            ]
        );
    }

    #[test]
    fn realistic_snippet() {
        let source = "namespace Main;\n\nfunction add(a: Int, b: Int): Int {\n    return a + b;\n}\n";
        let toks = kinds(source);
        assert!(toks.contains(&(TokenKind::Keyword, "namespace")));
        assert!(toks.contains(&(TokenKind::Type, "Main")));
        assert!(toks.contains(&(TokenKind::Function, "add")));
        assert!(toks.contains(&(TokenKind::Type, "Int")));
    }
}
