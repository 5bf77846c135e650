//! Constructors for every Razor diagnostic id

use super::{RazorDiagnostic, Severity};
use crate::source::SourceSpan;

fn error(id: &str, message: String, span: SourceSpan) -> RazorDiagnostic {
    RazorDiagnostic::new(id, Severity::Error, message, span)
}

// Lexer

pub fn unterminated_string_literal(span: SourceSpan) -> RazorDiagnostic {
    error(
        "RZ1000",
        "Unterminated string literal. Strings that start with a quotation mark (\") must be terminated before the end of the line.".to_string(),
        span,
    )
}

pub fn unterminated_character_literal(span: SourceSpan) -> RazorDiagnostic {
    error(
        "RZ1001",
        "Unterminated character literal. Character literals that start with a single quote (') must be terminated before the end of the line.".to_string(),
        span,
    )
}

pub fn unterminated_block_comment(span: SourceSpan) -> RazorDiagnostic {
    error(
        "RZ1002",
        "End of file was reached before the end of the block comment. All comments started with \"/*\" must be terminated with a matching \"*/\".".to_string(),
        span,
    )
}

// Parser

pub fn unexpected_whitespace_at_start_of_code_block(span: SourceSpan) -> RazorDiagnostic {
    error(
        "RZ1003",
        "A space or line break was encountered after the \"@\" character. Only valid identifiers, keywords, comments, \"(\" and \"{\" are valid at the start of a code block and they must occur immediately following \"@\" with no space in between.".to_string(),
        span,
    )
}

pub fn unexpected_end_of_file_at_start_of_code_block(span: SourceSpan) -> RazorDiagnostic {
    error(
        "RZ1004",
        "End-of-file was found after the \"@\" character. \"@\" must be followed by a valid code block.".to_string(),
        span,
    )
}

pub fn unexpected_character_at_start_of_code_block(span: SourceSpan, found: &str) -> RazorDiagnostic {
    error(
        "RZ1005",
        format!(
            "\"{found}\" is not valid at the start of a code block. Only identifiers, keywords, comments, \"(\" and \"{{\" are valid."
        ),
        span,
    )
}

pub fn expected_end_of_block_before_eof(
    span: SourceSpan,
    block_name: &str,
    close: char,
    open: char,
) -> RazorDiagnostic {
    error(
        "RZ1006",
        format!(
            "The {block_name} block is missing a closing \"{close}\" character. Make sure you have a matching \"{close}\" character for all the \"{open}\" characters within this block, and that none of the \"{close}\" characters are being interpreted as markup."
        ),
        span,
    )
}

pub fn unexpected_eof_after_directive(
    span: SourceSpan,
    directive: &str,
    expected: &str,
) -> RazorDiagnostic {
    error(
        "RZ1012",
        format!("Unexpected end of file following the '{directive}' directive. Expected '{expected}'."),
        span,
    )
}

pub fn directive_expects_token(span: SourceSpan, directive: &str, expected: &str) -> RazorDiagnostic {
    error(
        "RZ1013",
        format!("The '{directive}' directive expects {expected}."),
        span,
    )
}

pub fn unexpected_directive_literal(span: SourceSpan, directive: &str) -> RazorDiagnostic {
    error(
        "RZ1017",
        format!(
            "Unexpected literal following the '{directive}' directive. Expected 'line break'."
        ),
        span,
    )
}

pub fn directive_must_have_value(span: SourceSpan, directive: &str) -> RazorDiagnostic {
    error(
        "RZ1018",
        format!("Directive '{directive}' must have a value."),
        span,
    )
}

pub fn unclosed_tag(span: SourceSpan, tag_name: &str) -> RazorDiagnostic {
    error(
        "RZ1025",
        format!(
            "The \"{tag_name}\" element was not closed. All elements must be either self-closing or have a matching end tag."
        ),
        span,
    )
}

pub fn unexpected_end_tag(span: SourceSpan, tag_name: &str) -> RazorDiagnostic {
    error(
        "RZ1026",
        format!(
            "Encountered end tag \"{tag_name}\" with no matching start tag. Are your start/end tags properly balanced?"
        ),
        span,
    )
}

pub fn expected_close_parenthesis(span: SourceSpan) -> RazorDiagnostic {
    error(
        "RZ1027",
        "An opening \"(\" is missing the corresponding closing \")\".".to_string(),
        span,
    )
}

pub fn unterminated_razor_comment(span: SourceSpan) -> RazorDiagnostic {
    error(
        "RZ1028",
        "End of file was reached before the end of the block comment. All comments that start with the \"@*\" sequence must be terminated with a matching \"*@\" sequence.".to_string(),
        span,
    )
}

pub fn invalid_tag_helper_lookup_text(span: SourceSpan, lookup_text: &str) -> RazorDiagnostic {
    error(
        "RZ1036",
        format!(
            "Invalid tag helper directive look up text '{lookup_text}'. The correct look up text format is: \"name, assemblyName\"."
        ),
        span,
    )
}

pub fn duplicate_directive(span: SourceSpan, directive: &str) -> RazorDiagnostic {
    error(
        "RZ2001",
        format!("The '{directive}' directive may only occur once per document."),
        span,
    )
}

// Tag helper rewriter

pub fn inconsistent_tag_structure(
    span: SourceSpan,
    first: &str,
    second: &str,
    tag_name: &str,
) -> RazorDiagnostic {
    error(
        "RZ1030",
        format!(
            "Tag helpers '{first}' and '{second}' targeting element '{tag_name}' must not expect different TagStructure values."
        ),
        span,
    )
}

pub fn tag_helper_must_not_have_end_tag(
    span: SourceSpan,
    tag_name: &str,
    display_name: &str,
) -> RazorDiagnostic {
    error(
        "RZ1033",
        format!(
            "Found an end tag (</{tag_name}>) for tag helper '{display_name}' with tag structure that disallows an end tag ('WithoutEndTag')."
        ),
        span,
    )
}

pub fn malformed_tag_helper(span: SourceSpan, tag_name: &str) -> RazorDiagnostic {
    error(
        "RZ1034",
        format!(
            "Found a malformed '{tag_name}' tag helper. Tag helpers must have a start and end tag or be self closing."
        ),
        span,
    )
}

pub fn tag_helper_missing_close_angle(span: SourceSpan, tag_name: &str) -> RazorDiagnostic {
    error(
        "RZ1035",
        format!("Missing close angle for tag helper '{tag_name}'."),
        span,
    )
}

pub fn empty_bound_attribute(
    span: SourceSpan,
    attribute_name: &str,
    tag_name: &str,
    type_name: &str,
) -> RazorDiagnostic {
    error(
        "RZ2008",
        format!(
            "Attribute '{attribute_name}' on tag helper element '{tag_name}' requires a value. Tag helper bound attributes of type '{type_name}' cannot be empty or contain only whitespace."
        ),
        span,
    )
}

pub fn cannot_have_non_tag_content(
    span: SourceSpan,
    tag_name: &str,
    allowed_children: &str,
) -> RazorDiagnostic {
    error(
        "RZ2009",
        format!(
            "The parent <{tag_name}> tag helper does not allow non-tag content. Only child tag helper(s) targeting tag name(s) '{allowed_children}' are allowed."
        ),
        span,
    )
}

pub fn invalid_nested_tag(
    span: SourceSpan,
    child: &str,
    parent: &str,
    allowed_children: &str,
) -> RazorDiagnostic {
    error(
        "RZ2010",
        format!(
            "The <{child}> tag is not allowed by parent <{parent}> tag helper. Only child tags with name(s) '{allowed_children}' are allowed."
        ),
        span,
    )
}

pub fn unbound_component_tag(span: SourceSpan, tag_name: &str) -> RazorDiagnostic {
    RazorDiagnostic::new(
        "RZ10012",
        Severity::Warning,
        format!(
            "Found markup element with unexpected name '{tag_name}'. If this is intended to be a component, add a @using directive for its namespace."
        ),
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_and_severities() {
        let span = SourceSpan::undefined();
        assert_eq!(unterminated_string_literal(span.clone()).id, "RZ1000");
        assert_eq!(malformed_tag_helper(span.clone(), "p").id, "RZ1034");
        let warning = unbound_component_tag(span, "Counter");
        assert_eq!(warning.id, "RZ10012");
        assert_eq!(warning.severity, Severity::Warning);
    }

    #[test]
    fn test_messages_name_the_subject() {
        let diagnostic = invalid_nested_tag(SourceSpan::undefined(), "span", "list", "item");
        assert!(diagnostic.message.contains("<span>"));
        assert!(diagnostic.message.contains("'item'"));
    }
}
