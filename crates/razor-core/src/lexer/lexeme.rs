//! General-purpose C# lexemes recognized with logos
//!
//! Trivia, strings, characters, comments and the Razor transition are handled
//! by [`CSharpTokenizer`](super::CSharpTokenizer) itself; this enum covers the
//! rest of the code grammar.

use logos::Logos;

use crate::cst::SyntaxKind;

/// Identifier, literal and punctuation lexemes
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CSharpLexeme {
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*")]
    Identifier,

    #[regex(r"[0-9][0-9_]*([uU][lL]?|[lL][uU]?)?")]
    #[regex(r"0[xX][0-9a-fA-F_]+([uU][lL]?|[lL][uU]?)?")]
    #[regex(r"0[bB][01_]+([uU][lL]?|[lL][uU]?)?")]
    IntegerLiteral,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFdDmM]?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFdDmM]?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[fFdDmM]?")]
    #[regex(r"[0-9][0-9_]*[fFdDmM]")]
    RealLiteral,

    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("(")]
    LeftParenthesis,
    #[token(")")]
    RightParenthesis,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // `>>` is left as two tokens so nested generic arguments close one at a time
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("!")]
    #[token("~")]
    #[token("=")]
    #[token("<")]
    #[token(">")]
    #[token("?")]
    #[token("??")]
    #[token("??=")]
    #[token("::")]
    #[token("++")]
    #[token("--")]
    #[token("&&")]
    #[token("||")]
    #[token("->")]
    #[token("=>")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<")]
    #[token("<<=")]
    #[token("#")]
    #[token("\\")]
    #[token("..")]
    Operator,
}

impl CSharpLexeme {
    /// Syntax kind for a lexeme, promoting reserved identifiers to keywords
    pub fn syntax_kind(self, text: &str) -> SyntaxKind {
        match self {
            CSharpLexeme::Identifier if is_keyword(text) => SyntaxKind::Keyword,
            CSharpLexeme::Identifier => SyntaxKind::Identifier,
            CSharpLexeme::IntegerLiteral => SyntaxKind::IntegerLiteral,
            CSharpLexeme::RealLiteral => SyntaxKind::RealLiteral,
            CSharpLexeme::LeftBrace => SyntaxKind::LeftBrace,
            CSharpLexeme::RightBrace => SyntaxKind::RightBrace,
            CSharpLexeme::LeftParenthesis => SyntaxKind::LeftParenthesis,
            CSharpLexeme::RightParenthesis => SyntaxKind::RightParenthesis,
            CSharpLexeme::LeftBracket => SyntaxKind::LeftBracket,
            CSharpLexeme::RightBracket => SyntaxKind::RightBracket,
            CSharpLexeme::Semicolon => SyntaxKind::Semicolon,
            CSharpLexeme::Dot => SyntaxKind::Dot,
            CSharpLexeme::Comma => SyntaxKind::Comma,
            CSharpLexeme::Colon => SyntaxKind::Colon,
            CSharpLexeme::Operator => SyntaxKind::CSharpOperator,
        }
    }
}

const KEYWORDS: &[&str] = &[
    "abstract",
    "as",
    "base",
    "bool",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "checked",
    "class",
    "const",
    "continue",
    "decimal",
    "default",
    "delegate",
    "do",
    "double",
    "else",
    "enum",
    "event",
    "explicit",
    "extern",
    "false",
    "finally",
    "fixed",
    "float",
    "for",
    "foreach",
    "goto",
    "if",
    "implicit",
    "in",
    "int",
    "interface",
    "internal",
    "is",
    "lock",
    "long",
    "namespace",
    "new",
    "null",
    "object",
    "operator",
    "out",
    "override",
    "params",
    "private",
    "protected",
    "public",
    "readonly",
    "ref",
    "return",
    "sbyte",
    "sealed",
    "short",
    "sizeof",
    "stackalloc",
    "static",
    "string",
    "struct",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "uint",
    "ulong",
    "unchecked",
    "unsafe",
    "ushort",
    "using",
    "virtual",
    "void",
    "volatile",
    "while",
];

/// Reserved C# keyword check
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.binary_search(&text).is_ok()
}
