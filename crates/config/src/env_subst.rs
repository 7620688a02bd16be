/// Replace `${ENV_VAR}` placeholders in the raw config text.
///
/// `${ENV_VAR:-fallback}` uses `fallback` when the variable is unset or
/// empty. Unresolvable placeholders without a fallback are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`] with a custom variable lookup.
pub fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unclosed placeholder; keep the remainder literally.
            result.push_str(&rest[start..]);
            return result;
        };

        let expr = &after[..end];
        let (name, fallback) = match expr.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (expr, None),
        };

        match (lookup(name).filter(|v| !v.is_empty()), fallback) {
            _ if name.is_empty() => {
                result.push_str("${");
                result.push_str(expr);
                result.push('}');
            },
            (Some(value), _) => result.push_str(&value),
            (None, Some(fallback)) => result.push_str(fallback),
            (None, None) => {
                result.push_str("${");
                result.push_str(expr);
                result.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn lookup(name: &str) -> Option<String> {
        match name {
            "VOCALIS_TEST_TOKEN" => Some("123:ABC".to_string()),
            "VOCALIS_EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[rstest]
    #[case("bot_token = \"${VOCALIS_TEST_TOKEN}\"", "bot_token = \"123:ABC\"")]
    #[case("${VOCALIS_MISSING}", "${VOCALIS_MISSING}")]
    #[case("${VOCALIS_MISSING:-8084}", "8084")]
    #[case("${VOCALIS_EMPTY:-fallback}", "fallback")]
    #[case("${VOCALIS_TEST_TOKEN:-unused}", "123:ABC")]
    #[case("a ${} b", "a ${} b")]
    #[case("tail ${VOCALIS_TEST_TOKEN", "tail ${VOCALIS_TEST_TOKEN")]
    #[case("héllo ${VOCALIS_TEST_TOKEN} wörld", "héllo 123:ABC wörld")]
    fn substitutes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(substitute_env_with(input, lookup), expected);
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
