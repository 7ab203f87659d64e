use regex::Regex;
use std::sync::OnceLock;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&#?[a-zA-Z0-9]+;").unwrap())
}

/// Retire les balises HTML et les références d'entités (&amp; &#39; ...)
/// d'une description de recette. Les espaces multiples sont réduits à un seul.
pub fn strip_markup(input: &str) -> String {
    let without_tags = tag_re().replace_all(input, " ");
    let without_entities = entity_re().replace_all(&without_tags, " ");
    without_entities.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_markup("<b>hot</b> soup"), "hot soup");
    }

    #[test]
    fn test_strip_entities() {
        assert_eq!(strip_markup("salt &amp; pepper"), "salt pepper");
        assert_eq!(strip_markup("chef&#39;s choice"), "chef s choice");
    }

    #[test]
    fn test_nested_markup() {
        assert_eq!(
            strip_markup("<div><p>Boil the <i>water</i></p><br/>then serve</div>"),
            "Boil the water then serve"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(strip_markup("plain description"), "plain description");
    }
}
