//! Syntax kind enumeration for the Razor syntax tree
//!
//! Token kinds come first, then span kinds (the leaves that own tokens), then
//! block kinds.

use std::fmt;

/// Syntax kind for Razor tokens, spans and blocks
///
/// Tokens only ever appear as children of span nodes. Spans are the unit of
/// incremental edit absorption and carry a span context annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // ==================
    // Shared tokens (0-19)
    // ==================
    /// Spaces and tabs
    Whitespace = 0,
    /// `\r\n`, `\n` or `\r`
    NewLine = 1,
    /// Run of literal markup text
    Text = 2,
    /// `@`
    Transition = 3,
    /// `@` opening or closing a Razor comment
    RazorCommentTransition = 4,
    /// `*` inside a Razor comment delimiter
    RazorCommentStar = 5,
    /// Body of a Razor comment
    RazorCommentLiteral = 6,

    // ==================
    // Markup tokens (20-39)
    // ==================
    /// `<`
    OpenAngle = 20,
    /// `>`
    CloseAngle = 21,
    /// `/`
    ForwardSlash = 22,
    /// `!`
    Bang = 23,
    /// `?`
    QuestionMark = 24,
    /// `=`
    Equals = 25,
    /// `"`
    DoubleQuote = 26,
    /// `'`
    SingleQuote = 27,
    /// `--`
    DoubleHyphen = 28,
    /// `[`
    LeftBracket = 29,
    /// `]`
    RightBracket = 30,

    // ==================
    // Code tokens (40-69)
    // ==================
    /// Identifier
    Identifier = 40,
    /// Reserved C# keyword
    Keyword = 41,
    /// Integer literal, including hex and binary forms
    IntegerLiteral = 42,
    /// Real literal
    RealLiteral = 43,
    /// Regular, verbatim or interpolated string literal
    StringLiteral = 44,
    /// Character literal
    CharacterLiteral = 45,
    /// `//` or `/* */` comment
    CSharpComment = 46,
    /// Operator or punctuation not listed separately
    CSharpOperator = 47,
    /// `{`
    LeftBrace = 48,
    /// `}`
    RightBrace = 49,
    /// `(`
    LeftParenthesis = 50,
    /// `)`
    RightParenthesis = 51,
    /// `;`
    Semicolon = 52,
    /// `.`
    Dot = 53,
    /// `,`
    Comma = 54,
    /// `:`
    Colon = 55,

    // ==================
    // Spans (100-119)
    // ==================
    /// Literal markup
    MarkupTextLiteral = 100,
    /// Markup that produces no output, such as the first `@` of `@@`
    MarkupEphemeralTextLiteral = 101,
    /// `<text>` tags and the `@:` transition inside code
    MarkupTransition = 102,
    /// C# statement code
    CSharpStatementLiteral = 103,
    /// C# expression code
    CSharpExpressionLiteral = 104,
    /// C# that produces no output
    CSharpEphemeralTextLiteral = 105,
    /// `@` introducing code
    CSharpTransition = 106,
    /// Razor punctuation such as directive keywords and block braces
    RazorMetaCode = 107,
    /// Whitespace between directive tokens
    UnclassifiedTextLiteral = 108,
    /// A complete `@* *@` comment
    RazorCommentBlock = 109,

    // ==================
    // Blocks (150+)
    // ==================
    /// Document root
    RazorDocument = 150,
    MarkupBlock = 151,
    GenericBlock = 152,
    MarkupElement = 153,
    MarkupStartTag = 154,
    MarkupEndTag = 155,
    MarkupAttributeBlock = 156,
    MarkupMinimizedAttributeBlock = 157,
    MarkupLiteralAttributeValue = 158,
    MarkupDynamicAttributeValue = 159,
    /// `<!-- -->`
    MarkupCommentBlock = 160,
    MarkupTagHelperElement = 161,
    MarkupTagHelperStartTag = 162,
    MarkupTagHelperEndTag = 163,
    MarkupTagHelperAttribute = 164,
    MarkupMinimizedTagHelperAttribute = 165,
    MarkupTagHelperAttributeValue = 166,
    CSharpCodeBlock = 170,
    /// `@{ }`
    CSharpStatement = 171,
    CSharpStatementBody = 172,
    /// `@( )`
    CSharpExplicitExpression = 173,
    CSharpExplicitExpressionBody = 174,
    /// `@name.Member`
    CSharpImplicitExpression = 175,
    CSharpImplicitExpressionBody = 176,
    RazorDirective = 180,
    RazorDirectiveBody = 181,
}

impl SyntaxKind {
    /// Check if this kind is a leaf span that owns tokens
    pub const fn is_span(self) -> bool {
        matches!(
            self,
            Self::MarkupTextLiteral
                | Self::MarkupEphemeralTextLiteral
                | Self::MarkupTransition
                | Self::CSharpStatementLiteral
                | Self::CSharpExpressionLiteral
                | Self::CSharpEphemeralTextLiteral
                | Self::CSharpTransition
                | Self::RazorMetaCode
                | Self::UnclassifiedTextLiteral
                | Self::RazorCommentBlock
        )
    }

    pub const fn is_token(self) -> bool {
        (self as u16) < 100
    }

    pub const fn is_block(self) -> bool {
        (self as u16) >= 150
    }

    /// Whitespace and newlines
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::NewLine)
    }

    /// Tag nodes whose children are spans and attribute blocks
    pub const fn is_tag(self) -> bool {
        matches!(
            self,
            Self::MarkupStartTag
                | Self::MarkupEndTag
                | Self::MarkupTagHelperStartTag
                | Self::MarkupTagHelperEndTag
        )
    }

    pub const fn is_code_span(self) -> bool {
        matches!(
            self,
            Self::CSharpStatementLiteral
                | Self::CSharpExpressionLiteral
                | Self::CSharpEphemeralTextLiteral
                | Self::CSharpTransition
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}
