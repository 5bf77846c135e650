//! Markup grammar: text runs, elements, attributes and HTML comments

use super::context::{ParserContext, markup_context, none_context};
use crate::cst::SyntaxKind;
use crate::diagnostics::factory;
use crate::edit::AcceptedCharacters;
use crate::lexer::SpanTokenizer;

/// Elements that never have content or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// Where a run of markup nodes ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarkupStop {
    /// End of input, or the closing brace of a section body
    Eof,
    /// An end tag matching one of the open elements
    EndTag,
    /// `-->`
    CommentEnd,
    /// Just after the first line break
    LineEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagStart {
    Start,
    End,
    Comment,
}

struct StartTagInfo {
    name: String,
    escaped: bool,
    self_closing: bool,
}

impl StartTagInfo {
    /// Name an end tag has to carry to close this element
    fn key(&self) -> String {
        if self.escaped {
            format!("!{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl ParserContext<'_> {
    pub(crate) fn parse_document(&mut self) {
        self.set_mode(SpanTokenizer::Markup);
        self.start_node(SyntaxKind::RazorDocument);
        self.start_node(SyntaxKind::MarkupBlock);
        self.parse_markup_nodes(MarkupStop::Eof);
        self.finish_node();
        self.finish_node();
    }

    /// Parse markup into the current node until `stop`
    pub(crate) fn parse_markup_nodes(&mut self, stop: MarkupStop) {
        while let Some(kind) = self.peek_kind(0) {
            if self.at_markup_stop(stop) {
                break;
            }
            match kind {
                SyntaxKind::Transition => self.parse_markup_transition(),
                SyntaxKind::RazorCommentTransition => {
                    self.markup_span();
                    self.parse_razor_comment();
                }
                SyntaxKind::OpenAngle if stop != MarkupStop::CommentEnd => {
                    match self.tag_start() {
                        Some(start) => {
                            self.markup_span();
                            self.parse_tag_construct(start);
                        }
                        None => self.bump(),
                    }
                }
                SyntaxKind::NewLine if stop == MarkupStop::LineEnd => {
                    self.bump();
                    break;
                }
                _ => {
                    if self.at_text(0, SyntaxKind::Text, "{") {
                        if let Some(depth) = self.section_braces.as_mut() {
                            *depth += 1;
                        }
                    } else if self.at_text(0, SyntaxKind::Text, "}") {
                        if let Some(depth) = self.section_braces.as_mut() {
                            *depth = depth.saturating_sub(1);
                        }
                    }
                    self.bump();
                }
            }
        }
        self.markup_span();
    }

    fn at_markup_stop(&mut self, stop: MarkupStop) -> bool {
        if self.section_braces == Some(0) && self.at_text(0, SyntaxKind::Text, "}") {
            return true;
        }
        match stop {
            MarkupStop::EndTag => self.end_tag_name(0).is_some_and(|name| {
                self.open_elements
                    .iter()
                    .any(|open| open.eq_ignore_ascii_case(&name))
            }),
            MarkupStop::CommentEnd => {
                self.at(SyntaxKind::DoubleHyphen) && self.peek_kind(1) == Some(SyntaxKind::CloseAngle)
            }
            MarkupStop::Eof | MarkupStop::LineEnd => false,
        }
    }

    /// Lookahead `n` is a text token starting with a letter
    fn at_name(&mut self, n: usize) -> bool {
        self.peek(n).is_some_and(|token| {
            token.kind == SyntaxKind::Text && token.text().starts_with(|c: char| c.is_alphabetic())
        })
    }

    /// Name of the end tag starting at lookahead `n`, with a leading `!`
    /// when escaped
    pub(crate) fn end_tag_name(&mut self, n: usize) -> Option<String> {
        if self.peek_kind(n) != Some(SyntaxKind::OpenAngle)
            || self.peek_kind(n + 1) != Some(SyntaxKind::ForwardSlash)
        {
            return None;
        }
        match self.peek_kind(n + 2)? {
            SyntaxKind::Text => self.peek_text(n + 2),
            SyntaxKind::Bang if self.peek_kind(n + 3) == Some(SyntaxKind::Text) => {
                self.peek_text(n + 3).map(|name| format!("!{name}"))
            }
            _ => None,
        }
    }

    pub(crate) fn tag_start(&mut self) -> Option<TagStart> {
        if !self.at(SyntaxKind::OpenAngle) {
            return None;
        }
        match self.peek_kind(1)? {
            SyntaxKind::Text if self.at_name(1) => Some(TagStart::Start),
            SyntaxKind::ForwardSlash => match self.peek_kind(2)? {
                SyntaxKind::Text if self.at_name(2) => Some(TagStart::End),
                SyntaxKind::Bang if self.at_name(3) => Some(TagStart::End),
                _ => None,
            },
            SyntaxKind::Bang => match self.peek_kind(2)? {
                SyntaxKind::DoubleHyphen => Some(TagStart::Comment),
                SyntaxKind::Text => {
                    // `<!DOCTYPE html>` stays text
                    let doctype = self
                        .peek(2)
                        .is_some_and(|token| token.text().eq_ignore_ascii_case("doctype"));
                    (!doctype && self.at_name(2)).then_some(TagStart::Start)
                }
                _ => None,
            },
            _ => None,
        }
    }

    pub(crate) fn parse_tag_construct(&mut self, start: TagStart) {
        match start {
            TagStart::Start => self.parse_element(),
            TagStart::End => self.parse_stray_end_tag(),
            TagStart::Comment => self.parse_html_comment(),
        }
    }

    fn parse_element(&mut self) {
        self.start_node(SyntaxKind::MarkupElement);
        let name_position = self.peek_position(1);
        let tag = self.parse_start_tag();
        if tag.self_closing || (!tag.escaped && is_void_element(&tag.name)) {
            self.finish_node();
            return;
        }

        let key = tag.key();
        self.open_elements.push(key.clone());
        self.parse_markup_nodes(MarkupStop::EndTag);
        self.open_elements.pop();

        let closed = self
            .end_tag_name(0)
            .is_some_and(|name| name.eq_ignore_ascii_case(&key));
        if closed {
            self.parse_end_tag(SyntaxKind::MarkupTextLiteral);
        } else if self.strict_elements {
            let span = self.source_span(name_position, key.len());
            self.error(factory::unclosed_tag(span, &tag.name));
        }
        self.finish_node();
    }

    fn parse_start_tag(&mut self) -> StartTagInfo {
        self.start_node(SyntaxKind::MarkupStartTag);
        self.bump();
        self.markup_span();
        let escaped = self.at(SyntaxKind::Bang);
        if escaped {
            self.bump();
            self.span(
                SyntaxKind::RazorMetaCode,
                none_context(SpanTokenizer::Markup, AcceptedCharacters::None),
            );
        }
        let name = self.peek_text(0).unwrap_or_default();
        self.bump();
        self.markup_span();
        let self_closing = self.parse_attribute_area();
        self.finish_node();
        StartTagInfo {
            name,
            escaped,
            self_closing,
        }
    }

    /// Attributes up to and including the closing `>` or `/>`; true when
    /// the tag is self-closing
    fn parse_attribute_area(&mut self) -> bool {
        loop {
            let Some(kind) = self.peek_kind(0) else {
                return false;
            };
            match kind {
                SyntaxKind::CloseAngle => return self.parse_tag_close(0),
                SyntaxKind::ForwardSlash if self.peek_kind(1) == Some(SyntaxKind::CloseAngle) => {
                    return self.parse_tag_close(0);
                }
                SyntaxKind::OpenAngle => return false,
                SyntaxKind::Whitespace | SyntaxKind::NewLine => {
                    let trivia = self.trivia_run(0);
                    match self.peek_kind(trivia) {
                        Some(SyntaxKind::CloseAngle) => return self.parse_tag_close(trivia),
                        Some(SyntaxKind::ForwardSlash)
                            if self.peek_kind(trivia + 1) == Some(SyntaxKind::CloseAngle) =>
                        {
                            return self.parse_tag_close(trivia);
                        }
                        Some(SyntaxKind::Text | SyntaxKind::LeftBracket) => {
                            self.parse_attribute(trivia)
                        }
                        Some(SyntaxKind::Transition) if self.at_attribute_directive(trivia) => {
                            self.parse_attribute(trivia)
                        }
                        _ => {
                            self.bump_n(trivia);
                            self.markup_span();
                        }
                    }
                }
                SyntaxKind::Text | SyntaxKind::LeftBracket => self.parse_attribute(0),
                SyntaxKind::Transition if self.at_attribute_directive(0) => self.parse_attribute(0),
                SyntaxKind::Transition => self.parse_code_transition(),
                SyntaxKind::RazorCommentTransition => self.parse_razor_comment(),
                _ => {
                    self.bump();
                    self.markup_span();
                }
            }
        }
    }

    /// `[ws] [/] >` as one span
    fn parse_tag_close(&mut self, trivia: usize) -> bool {
        self.bump_n(trivia);
        let self_closing = self.at(SyntaxKind::ForwardSlash);
        if self_closing {
            self.bump();
        }
        self.bump();
        self.markup_span();
        self_closing
    }

    /// `@bind`, `@onclick` and friends are attribute names in components
    fn at_attribute_directive(&mut self, n: usize) -> bool {
        self.options.file_kind.is_component()
            && self.peek_kind(n) == Some(SyntaxKind::Transition)
            && self.peek_kind(n + 1) == Some(SyntaxKind::Text)
    }

    fn parse_attribute(&mut self, prefix: usize) {
        let mut name_len = usize::from(self.peek_kind(prefix) == Some(SyntaxKind::Transition));
        while matches!(
            self.peek_kind(prefix + name_len),
            Some(SyntaxKind::Text | SyntaxKind::LeftBracket | SyntaxKind::RightBracket)
        ) {
            name_len += 1;
        }
        let gap = self.trivia_run(prefix + name_len);
        if self.peek_kind(prefix + name_len + gap) != Some(SyntaxKind::Equals) {
            self.start_node(SyntaxKind::MarkupMinimizedAttributeBlock);
            self.bump_n(prefix);
            self.markup_span();
            self.bump_n(name_len);
            self.markup_span();
            self.finish_node();
            return;
        }

        self.start_node(SyntaxKind::MarkupAttributeBlock);
        self.bump_n(prefix);
        self.markup_span();
        self.bump_n(name_len);
        self.markup_span();
        self.bump_n(gap + 1);
        let after = self.trivia_run(0);
        self.bump_n(after);
        self.markup_span();

        let quote = match self.peek_kind(0) {
            Some(kind @ (SyntaxKind::DoubleQuote | SyntaxKind::SingleQuote)) => {
                self.bump();
                self.markup_span();
                Some(kind)
            }
            _ => None,
        };
        self.start_node(SyntaxKind::GenericBlock);
        self.parse_attribute_value(quote);
        self.finish_node();
        if let Some(quote) = quote {
            if self.at(quote) {
                self.bump();
                self.markup_span();
            }
        }
        self.finish_node();
    }

    fn at_value_end(&mut self, quote: Option<SyntaxKind>, n: usize) -> bool {
        match quote {
            Some(quote) => self.peek_kind(n) == Some(quote),
            None => match self.peek_kind(n) {
                None
                | Some(
                    SyntaxKind::Whitespace
                    | SyntaxKind::NewLine
                    | SyntaxKind::CloseAngle
                    | SyntaxKind::OpenAngle,
                ) => true,
                Some(SyntaxKind::ForwardSlash) => {
                    self.peek_kind(n + 1) == Some(SyntaxKind::CloseAngle)
                }
                Some(_) => false,
            },
        }
    }

    /// A `@` in an attribute value that starts code
    fn at_value_code(&mut self, n: usize) -> bool {
        if self.peek_kind(n) != Some(SyntaxKind::Transition)
            || self.peek_kind(n + 1) == Some(SyntaxKind::Transition)
        {
            return false;
        }
        let at = self.peek_position(n);
        !self.is_email_transition(at)
    }

    fn parse_attribute_value(&mut self, quote: Option<SyntaxKind>) {
        loop {
            if self.at_end() || self.at_value_end(quote, 0) {
                return;
            }
            if self.at(SyntaxKind::RazorCommentTransition) {
                self.parse_razor_comment();
                continue;
            }
            let prefix = if quote.is_some() { self.trivia_run(0) } else { 0 };
            if prefix > 0 && (self.peek_kind(prefix).is_none() || self.at_value_end(quote, prefix)) {
                self.start_node(SyntaxKind::MarkupLiteralAttributeValue);
                self.bump_n(prefix);
                self.markup_span();
                self.finish_node();
                return;
            }
            if self.at_value_code(prefix) {
                self.start_node(SyntaxKind::MarkupDynamicAttributeValue);
                self.bump_n(prefix);
                self.markup_span();
                self.parse_code_transition();
                self.finish_node();
                continue;
            }

            self.start_node(SyntaxKind::MarkupLiteralAttributeValue);
            self.bump_n(prefix);
            self.markup_span();
            if self.at(SyntaxKind::Transition) && self.peek_kind(1) == Some(SyntaxKind::Transition) {
                self.bump();
                self.span(
                    SyntaxKind::MarkupEphemeralTextLiteral,
                    none_context(SpanTokenizer::Markup, AcceptedCharacters::None),
                );
                self.bump();
            }
            while let Some(kind) = self.peek_kind(0) {
                let stop = match kind {
                    SyntaxKind::Whitespace
                    | SyntaxKind::NewLine
                    | SyntaxKind::RazorCommentTransition => true,
                    SyntaxKind::Transition => {
                        self.at_value_code(0) || self.peek_kind(1) == Some(SyntaxKind::Transition)
                    }
                    _ => self.at_value_end(quote, 0),
                };
                if stop {
                    break;
                }
                self.bump();
            }
            self.markup_span();
            self.finish_node();
        }
    }

    /// `@` met in markup text
    fn parse_markup_transition(&mut self) {
        if self.peek_kind(1) == Some(SyntaxKind::Transition) {
            // `@@` writes a single `@`
            self.markup_span();
            self.bump();
            self.span(
                SyntaxKind::MarkupEphemeralTextLiteral,
                none_context(SpanTokenizer::Markup, AcceptedCharacters::None),
            );
            self.bump();
            return;
        }
        let at = self.peek_position(0);
        if self.is_email_transition(at) {
            self.bump();
            return;
        }
        self.markup_span();
        self.parse_code_transition();
    }

    fn parse_html_comment(&mut self) {
        self.start_node(SyntaxKind::MarkupCommentBlock);
        self.bump_n(3);
        self.markup_span();
        self.parse_markup_nodes(MarkupStop::CommentEnd);
        if self.at(SyntaxKind::DoubleHyphen) && self.peek_kind(1) == Some(SyntaxKind::CloseAngle) {
            self.bump_n(2);
            self.markup_span();
        }
        self.finish_node();
    }

    fn parse_stray_end_tag(&mut self) {
        let name_position = self.peek_position(2);
        let name = self.end_tag_name(0).unwrap_or_default();
        self.start_node(SyntaxKind::MarkupElement);
        self.parse_end_tag(SyntaxKind::MarkupTextLiteral);
        self.finish_node();
        if self.strict_elements {
            let span = self.source_span(name_position, name.len());
            self.error(factory::unexpected_end_tag(span, name.trim_start_matches('!')));
        }
    }

    /// `</name [ws]>` as a single span of `kind`
    pub(crate) fn parse_end_tag(&mut self, kind: SyntaxKind) {
        self.start_node(SyntaxKind::MarkupEndTag);
        self.bump_n(2);
        if self.at(SyntaxKind::Bang) {
            self.bump();
        }
        if self.at(SyntaxKind::Text) {
            self.bump();
        }
        let trivia = self.trivia_run(0);
        if self.peek_kind(trivia) == Some(SyntaxKind::CloseAngle) {
            self.bump_n(trivia + 1);
        }
        let context = if kind == SyntaxKind::MarkupTransition {
            none_context(SpanTokenizer::Markup, AcceptedCharacters::None)
        } else {
            markup_context()
        };
        self.span(kind, context);
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{FileKind, RazorLanguageVersion, RazorParserOptions};
    use crate::cst::{RazorSyntaxTree, SyntaxKind, SyntaxNode};
    use crate::source::SourceDocument;

    fn parse(text: &str) -> RazorSyntaxTree {
        RazorSyntaxTree::parse(SourceDocument::new(text, None), RazorParserOptions::default())
    }

    fn parse_component(text: &str) -> RazorSyntaxTree {
        let options = RazorParserOptions::new(FileKind::Component, RazorLanguageVersion::LATEST);
        RazorSyntaxTree::parse(SourceDocument::new(text, None), options)
    }

    fn kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children().map(|child| child.kind()).collect()
    }

    fn markup_block(tree: &RazorSyntaxTree) -> SyntaxNode {
        tree.root().first_child().unwrap()
    }

    #[test]
    fn test_plain_text_is_one_span() {
        let tree = parse("Hello world\nline two");
        let block = markup_block(&tree);
        assert_eq!(kinds(&block), [SyntaxKind::MarkupTextLiteral]);
        assert_eq!(tree.text(), "Hello world\nline two");
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_element_shape() {
        let tree = parse("<p class=\"a\">hi</p>");
        let element = markup_block(&tree).first_child().unwrap();
        assert_eq!(element.kind(), SyntaxKind::MarkupElement);
        assert_eq!(
            kinds(&element),
            [
                SyntaxKind::MarkupStartTag,
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::MarkupEndTag
            ]
        );
        let start = element.first_child().unwrap();
        assert_eq!(
            kinds(&start),
            [
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::MarkupAttributeBlock,
                SyntaxKind::MarkupTextLiteral
            ]
        );
    }

    #[test]
    fn test_nested_elements_close_implicitly() {
        let tree = parse("<div><p>a</div>b");
        let block = markup_block(&tree);
        assert_eq!(
            kinds(&block),
            [SyntaxKind::MarkupElement, SyntaxKind::MarkupTextLiteral]
        );
        let div = block.first_child().unwrap();
        assert!(div.last_child().unwrap().kind() == SyntaxKind::MarkupEndTag);
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_end_tags_match_case_insensitively() {
        let tree = parse("<DIV>x</div>");
        let div = markup_block(&tree).first_child().unwrap();
        assert_eq!(div.last_child().unwrap().kind(), SyntaxKind::MarkupEndTag);
    }

    #[test]
    fn test_void_and_self_closing_elements_have_no_body() {
        let tree = parse("<br><img src=\"a\" />text");
        let block = markup_block(&tree);
        assert_eq!(
            kinds(&block),
            [
                SyntaxKind::MarkupElement,
                SyntaxKind::MarkupElement,
                SyntaxKind::MarkupTextLiteral
            ]
        );
    }

    #[test]
    fn test_doctype_and_lone_angle_are_text() {
        let tree = parse("<!DOCTYPE html>a < b");
        assert_eq!(kinds(&markup_block(&tree)), [SyntaxKind::MarkupTextLiteral]);
    }

    #[test]
    fn test_html_comment_block() {
        let tree = parse("<!-- <p> @x -->");
        let comment = markup_block(&tree).first_child().unwrap();
        assert_eq!(comment.kind(), SyntaxKind::MarkupCommentBlock);
        assert_eq!(
            kinds(&comment),
            [
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::CSharpCodeBlock,
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::MarkupTextLiteral
            ]
        );
    }

    #[test]
    fn test_escaped_transition() {
        let tree = parse("a@@b");
        assert_eq!(
            kinds(&markup_block(&tree)),
            [
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::MarkupEphemeralTextLiteral,
                SyntaxKind::MarkupTextLiteral
            ]
        );
        assert_eq!(tree.text(), "a@@b");
    }

    #[test]
    fn test_email_address_stays_text() {
        let tree = parse("mail me@example.com");
        assert_eq!(kinds(&markup_block(&tree)), [SyntaxKind::MarkupTextLiteral]);
    }

    #[test]
    fn test_stray_end_tag() {
        let tree = parse("</p>");
        let element = markup_block(&tree).first_child().unwrap();
        assert_eq!(kinds(&element), [SyntaxKind::MarkupEndTag]);
        assert!(tree.diagnostics().is_empty());

        let tree = parse_component("</p>");
        assert_eq!(tree.diagnostics()[0].id, "RZ1026");
    }

    #[test]
    fn test_unclosed_element_in_component() {
        let tree = parse_component("<div>");
        assert_eq!(tree.diagnostics().len(), 1);
        assert_eq!(tree.diagnostics()[0].id, "RZ1025");
        assert_eq!(tree.diagnostics()[0].span.absolute_index, 1);
        assert!(parse("<div>").diagnostics().is_empty());
    }

    #[test]
    fn test_attribute_values() {
        let tree = parse("<a href=\"~/x @Model.Id\" b=c disabled>");
        let start = markup_block(&tree).first_child().unwrap().first_child().unwrap();
        let attributes: Vec<_> = start
            .children()
            .filter(|c| c.kind().to_string().contains("Attribute"))
            .collect();
        assert_eq!(
            attributes.iter().map(|a| a.kind()).collect::<Vec<_>>(),
            [
                SyntaxKind::MarkupAttributeBlock,
                SyntaxKind::MarkupAttributeBlock,
                SyntaxKind::MarkupMinimizedAttributeBlock
            ]
        );
        let values = attributes[0]
            .children()
            .find(|c| c.kind() == SyntaxKind::GenericBlock)
            .unwrap();
        assert_eq!(
            kinds(&values),
            [
                SyntaxKind::MarkupLiteralAttributeValue,
                SyntaxKind::MarkupDynamicAttributeValue
            ]
        );
    }

    #[test]
    fn test_component_directive_attribute() {
        let tree = parse_component("<input @bind=\"Value\" />");
        let start = markup_block(&tree).first_child().unwrap().first_child().unwrap();
        let attribute = start
            .children()
            .find(|c| c.kind() == SyntaxKind::MarkupAttributeBlock)
            .unwrap();
        assert!(attribute.text().to_string().contains("@bind"));

        // legacy files treat `@x` in a tag as code
        let tree = parse("<input @x />");
        let start = markup_block(&tree).first_child().unwrap().first_child().unwrap();
        assert!(start.children().any(|c| c.kind() == SyntaxKind::CSharpCodeBlock));
    }

    #[test]
    fn test_partial_start_tag() {
        let tree = parse("<p class=\"a\"");
        let element = markup_block(&tree).first_child().unwrap();
        let start = element.first_child().unwrap();
        assert_eq!(start.kind(), SyntaxKind::MarkupStartTag);
        assert!(
            !start
                .last_child()
                .unwrap()
                .text()
                .to_string()
                .contains('>')
        );
        assert_eq!(tree.text(), "<p class=\"a\"");
    }
}
