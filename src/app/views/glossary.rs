use crate::core::glossary::GlossaryCategory;

pub fn render(categories: &[GlossaryCategory], filter: &str) -> String {
    if categories.is_empty() {
        return format!("No matching terms for '{}'", filter.trim());
    }
    let mut lines = Vec::new();
    for category in categories {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("== {} ==", category.name));
        for term in &category.terms {
            lines.push(term.name.clone());
            lines.push(format!("  {}", term.definition));
            if let Some(example) = &term.example {
                lines.push(format!("  e.g. {}", example));
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::glossary::Glossary;

    #[test]
    fn test_render_search_results() {
        let glossary = Glossary::embedded().unwrap();
        let text = render(&glossary.search("roic"), "roic");
        assert!(text.starts_with("== "));
        assert!(text.contains("ROIC (Return on Invested Capital)"));
    }

    #[test]
    fn test_no_matches() {
        assert_eq!(render(&[], " zzz "), "No matching terms for 'zzz'");
    }
}
