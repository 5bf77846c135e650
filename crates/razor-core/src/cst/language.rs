//! Rowan language implementation for Razor

use rowan::Language;

use super::SyntaxKind;

/// Language implementation for Razor documents
///
/// Zero-sized marker connecting [`SyntaxKind`] to rowan's generic tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RazorLanguage;

impl Language for RazorLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        match raw.0 {
            0 => SyntaxKind::Whitespace,
            1 => SyntaxKind::NewLine,
            2 => SyntaxKind::Text,
            3 => SyntaxKind::Transition,
            4 => SyntaxKind::RazorCommentTransition,
            5 => SyntaxKind::RazorCommentStar,
            6 => SyntaxKind::RazorCommentLiteral,
            20 => SyntaxKind::OpenAngle,
            21 => SyntaxKind::CloseAngle,
            22 => SyntaxKind::ForwardSlash,
            23 => SyntaxKind::Bang,
            24 => SyntaxKind::QuestionMark,
            25 => SyntaxKind::Equals,
            26 => SyntaxKind::DoubleQuote,
            27 => SyntaxKind::SingleQuote,
            28 => SyntaxKind::DoubleHyphen,
            29 => SyntaxKind::LeftBracket,
            30 => SyntaxKind::RightBracket,
            40 => SyntaxKind::Identifier,
            41 => SyntaxKind::Keyword,
            42 => SyntaxKind::IntegerLiteral,
            43 => SyntaxKind::RealLiteral,
            44 => SyntaxKind::StringLiteral,
            45 => SyntaxKind::CharacterLiteral,
            46 => SyntaxKind::CSharpComment,
            47 => SyntaxKind::CSharpOperator,
            48 => SyntaxKind::LeftBrace,
            49 => SyntaxKind::RightBrace,
            50 => SyntaxKind::LeftParenthesis,
            51 => SyntaxKind::RightParenthesis,
            52 => SyntaxKind::Semicolon,
            53 => SyntaxKind::Dot,
            54 => SyntaxKind::Comma,
            55 => SyntaxKind::Colon,
            100 => SyntaxKind::MarkupTextLiteral,
            101 => SyntaxKind::MarkupEphemeralTextLiteral,
            102 => SyntaxKind::MarkupTransition,
            103 => SyntaxKind::CSharpStatementLiteral,
            104 => SyntaxKind::CSharpExpressionLiteral,
            105 => SyntaxKind::CSharpEphemeralTextLiteral,
            106 => SyntaxKind::CSharpTransition,
            107 => SyntaxKind::RazorMetaCode,
            108 => SyntaxKind::UnclassifiedTextLiteral,
            109 => SyntaxKind::RazorCommentBlock,
            150 => SyntaxKind::RazorDocument,
            151 => SyntaxKind::MarkupBlock,
            152 => SyntaxKind::GenericBlock,
            153 => SyntaxKind::MarkupElement,
            154 => SyntaxKind::MarkupStartTag,
            155 => SyntaxKind::MarkupEndTag,
            156 => SyntaxKind::MarkupAttributeBlock,
            157 => SyntaxKind::MarkupMinimizedAttributeBlock,
            158 => SyntaxKind::MarkupLiteralAttributeValue,
            159 => SyntaxKind::MarkupDynamicAttributeValue,
            160 => SyntaxKind::MarkupCommentBlock,
            161 => SyntaxKind::MarkupTagHelperElement,
            162 => SyntaxKind::MarkupTagHelperStartTag,
            163 => SyntaxKind::MarkupTagHelperEndTag,
            164 => SyntaxKind::MarkupTagHelperAttribute,
            165 => SyntaxKind::MarkupMinimizedTagHelperAttribute,
            166 => SyntaxKind::MarkupTagHelperAttributeValue,
            170 => SyntaxKind::CSharpCodeBlock,
            171 => SyntaxKind::CSharpStatement,
            172 => SyntaxKind::CSharpStatementBody,
            173 => SyntaxKind::CSharpExplicitExpression,
            174 => SyntaxKind::CSharpExplicitExpressionBody,
            175 => SyntaxKind::CSharpImplicitExpression,
            176 => SyntaxKind::CSharpImplicitExpressionBody,
            180 => SyntaxKind::RazorDirective,
            181 => SyntaxKind::RazorDirectiveBody,
            other => unreachable!("unknown Razor syntax kind {other}"),
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Red node of a Razor syntax tree
pub type SyntaxNode = rowan::SyntaxNode<RazorLanguage>;
/// Red token of a Razor syntax tree
pub type SyntaxToken = rowan::SyntaxToken<RazorLanguage>;
/// Node or token
pub type SyntaxElement = rowan::SyntaxElement<RazorLanguage>;
