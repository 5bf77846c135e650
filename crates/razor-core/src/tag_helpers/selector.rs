//! Required-attribute selectors
//!
//! A selector is a comma separated list of attribute requirements:
//!
//! - `name` or `[name]`: the attribute must be present
//! - `data-*` or `[data-*]`: some attribute starts with `data-`
//! - `[type='text']`, `[href^=http]`, `[src$=".png"]`: the value must equal,
//!   start with or end with the given text

use chumsky::prelude::*;

use super::descriptor::{NameComparison, RequiredAttributeDescriptor, ValueComparison};
use crate::error::RazorError;
use crate::result::Result;

type SelectorExtra<'src> = extra::Err<Rich<'src, char>>;

fn requirement(name: &str, value: Option<(ValueComparison, &str)>) -> RequiredAttributeDescriptor {
    let (name, name_comparison) = match name.strip_suffix('*') {
        Some(prefix) => (prefix, NameComparison::PrefixMatch),
        None => (name, NameComparison::FullMatch),
    };
    let (value_comparison, value) = match value {
        Some((comparison, value)) => (comparison, Some(value.into())),
        None => (ValueComparison::None, None),
    };
    RequiredAttributeDescriptor {
        name_comparison,
        value,
        value_comparison,
        ..RequiredAttributeDescriptor::new(name)
    }
}

fn selector<'src>()
-> impl Parser<'src, &'src str, Vec<RequiredAttributeDescriptor>, SelectorExtra<'src>> {
    let name = none_of(" \t\r\n,[]='\"^$")
        .repeated()
        .at_least(1)
        .to_slice();

    let quoted = choice((
        none_of('\'')
            .repeated()
            .to_slice()
            .delimited_by(just('\''), just('\'')),
        none_of('"')
            .repeated()
            .to_slice()
            .delimited_by(just('"'), just('"')),
    ));
    let unquoted = none_of(']').repeated().to_slice().map(str::trim);

    let operator = choice((
        just("^=").to(ValueComparison::PrefixMatch),
        just("$=").to(ValueComparison::SuffixMatch),
        just('=').to(ValueComparison::FullMatch),
    ));

    let bracketed = name
        .clone()
        .padded()
        .then(operator.padded().then(quoted.padded().or(unquoted)).or_not())
        .delimited_by(just('['), just(']'));
    let bare = name.map(|name: &str| (name, None));

    bracketed
        .or(bare)
        .map(|(name, value)| requirement(name, value))
        .padded()
        .separated_by(just(','))
        .at_least(1)
        .allow_trailing()
        .collect()
        .then_ignore(end())
}

/// Parse `text` into attribute requirements, in order
pub fn parse_required_attributes(text: &str) -> Result<Vec<RequiredAttributeDescriptor>> {
    selector().parse(text).into_result().map_err(|errors| {
        let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
        RazorError::descriptor_error(format!(
            "invalid required attribute selector '{text}': {}",
            reasons.join("; ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_every_requirement_form() {
        let attributes =
            parse_required_attributes("asp-for, [type='text'], [data-*], [href^=http]").unwrap();
        assert_eq!(attributes.len(), 4);

        assert_eq!(attributes[0].name.as_ref(), "asp-for");
        assert_eq!(attributes[0].value_comparison, ValueComparison::None);

        assert_eq!(attributes[1].name.as_ref(), "type");
        assert_eq!(attributes[1].value.as_deref(), Some("text"));
        assert_eq!(attributes[1].value_comparison, ValueComparison::FullMatch);

        assert_eq!(attributes[2].name.as_ref(), "data-");
        assert_eq!(attributes[2].name_comparison, NameComparison::PrefixMatch);

        assert_eq!(attributes[3].value.as_deref(), Some("http"));
        assert_eq!(attributes[3].value_comparison, ValueComparison::PrefixMatch);
    }

    #[test]
    fn test_suffix_match_and_double_quotes() {
        let attributes = parse_required_attributes(r#"[ src $= ".png" ]"#).unwrap();
        assert_eq!(attributes[0].name.as_ref(), "src");
        assert_eq!(attributes[0].value.as_deref(), Some(".png"));
        assert_eq!(attributes[0].value_comparison, ValueComparison::SuffixMatch);
    }

    #[test]
    fn test_rejects_malformed_selectors() {
        assert!(parse_required_attributes("").is_err());
        assert!(parse_required_attributes("[type='text'").is_err());
        assert!(parse_required_attributes("a b").is_err());
    }
}
