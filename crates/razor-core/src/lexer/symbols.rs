//! Shared constant text for short tokens
//!
//! Single and double character tokens make up most of a Razor token stream.
//! Returning a `&'static str` for them keeps the tokenizers allocation free on
//! the common path.

/// Look up the shared constant for `text`, if it has one
pub fn shared(text: &str) -> Option<&'static str> {
    let shared = match text {
        " " => " ",
        "  " => "  ",
        "\t" => "\t",
        "\t\t" => "\t\t",
        "\n" => "\n",
        "\r" => "\r",
        "\r\n" => "\r\n",
        "@" => "@",
        "*" => "*",
        "<" => "<",
        ">" => ">",
        "</" => "</",
        "/>" => "/>",
        "/" => "/",
        "!" => "!",
        "?" => "?",
        "=" => "=",
        "\"" => "\"",
        "'" => "'",
        "-" => "-",
        "--" => "--",
        "[" => "[",
        "]" => "]",
        "{" => "{",
        "}" => "}",
        "(" => "(",
        ")" => ")",
        ";" => ";",
        "." => ".",
        "," => ",",
        ":" => ":",
        "+" => "+",
        "&" => "&",
        "|" => "|",
        "%" => "%",
        "^" => "^",
        "~" => "~",
        "#" => "#",
        "\\" => "\\",
        "=>" => "=>",
        "==" => "==",
        "!=" => "!=",
        "<=" => "<=",
        ">=" => ">=",
        "&&" => "&&",
        "||" => "||",
        "++" => "++",
        "+=" => "+=",
        "-=" => "-=",
        "??" => "??",
        "::" => "::",
        "->" => "->",
        "<<" => "<<",
        _ => return None,
    };
    Some(shared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_constants() {
        assert_eq!(shared("=>"), Some("=>"));
        assert_eq!(shared("\r\n"), Some("\r\n"));
        assert_eq!(shared("div"), None);
    }

    #[test]
    fn test_shared_text_is_static() {
        let owned = String::from("{");
        let constant: &'static str = shared(&owned).unwrap();
        assert_eq!(constant, "{");
    }
}
