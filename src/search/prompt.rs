use super::vocabulary::FieldVocabulary;

/// Build the instruction prompt that asks the model for a single filter formula.
///
/// The output depends only on the vocabulary and the query, so the same input
/// always yields the same prompt.
pub fn build_translation_prompt(vocabulary: &FieldVocabulary, query: &str) -> String {
    let mut prompt = vocabulary.role.clone();

    prompt.push_str("\n\nIMPORTANT: Field names are CASE-SENSITIVE. Use these EXACT field names:\n");
    for field in &vocabulary.fields {
        match &field.note {
            Some(note) => prompt.push_str(&format!("- {} ({}): {}\n", field.name, note, field.description)),
            None => prompt.push_str(&format!("- {}: {}\n", field.name, field.description)),
        }
    }

    if !vocabulary.product_types.is_empty() {
        prompt.push_str("\nCRITICAL PRODUCT TYPE CODES:\n");
        for product in &vocabulary.product_types {
            prompt.push_str(&format!(
                "- {} → \"{}\" in {} field (always search it in lowercase)\n",
                product.label, product.code, vocabulary.type_code_field
            ));
        }
    }

    prompt.push_str("\nALLOWED FUNCTIONS (nothing else exists in this formula language):\n");
    for function in &vocabulary.allowed_functions {
        prompt.push_str(&format!("- {}\n", function.usage));
    }
    if !vocabulary.comparison_operators.is_empty() {
        prompt.push_str(&format!(
            "- Numeric comparisons on numeric fields: {}\n",
            vocabulary.comparison_operators.join(" ")
        ));
    }

    if !vocabulary.forbidden_functions.is_empty() {
        prompt.push_str(&format!(
            "\nNEVER use these, they do not exist: {}\n",
            vocabulary.forbidden_functions.join(", ")
        ));
    }

    if !vocabulary.synonym_groups.is_empty() {
        prompt.push_str("\nINTELLIGENT QUERY UNDERSTANDING:\n");
        prompt.push_str("The AI Description uses CONCISE keywords, so be smart about variations:\n");
        for group in &vocabulary.synonym_groups {
            prompt.push('\n');
            if group.intro.is_empty() {
                prompt.push_str(&format!("**{}**:\n", group.title));
            } else {
                prompt.push_str(&format!("**{}** - {}\n", group.title, group.intro));
            }
            for rule in &group.rules {
                prompt.push_str(&format!("- {}\n", rule));
            }
        }
    }

    prompt.push_str(&format!("\nQuery: \"{}\"\n", query.trim()));

    if !vocabulary.generation_rules.is_empty() {
        prompt.push_str("\nSMART FORMULA GENERATION RULES:\n");
        for (i, rule) in vocabulary.generation_rules.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, rule));
        }
    }

    prompt.push_str(
        "\nReturn ONLY the filterByFormula expression with CORRECT casing. \
         Use FIND with LOWER for text searches. No explanation or markdown.\n",
    );

    if !vocabulary.examples.is_empty() {
        prompt.push_str("\nExamples:\n");
        for example in &vocabulary.examples {
            prompt.push_str(&format!("- \"{}\" → {}\n", example.query, example.formula));
        }
    }

    prompt.push_str("\nFormula:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> FieldVocabulary {
        FieldVocabulary::embedded().unwrap()
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let vocabulary = vocabulary();
        assert_eq!(
            build_translation_prompt(&vocabulary, "emerald cut rings"),
            build_translation_prompt(&vocabulary, "emerald cut rings")
        );
    }

    #[test]
    fn test_prompt_embeds_vocabulary() {
        let prompt = build_translation_prompt(&vocabulary(), "white gold rings");

        assert!(prompt.starts_with("You are an intelligent jewelry inventory search assistant"));
        assert!(prompt.contains("- Set Cts. (exact spacing): Total carat weight of stones"));
        assert!(prompt.contains("- Job No. (exact with period and space)"));
        assert!(prompt.contains("rings → \"rn\" in Design field"));
        assert!(prompt.contains("NEVER use these, they do not exist: CONTAINS, INCLUDES"));
        assert!(prompt.contains("**Metal Colors** - Use OR for variations:"));
        assert!(prompt.contains("1. Use OR logic when multiple keywords could match the same intent"));
        assert!(prompt.contains("Query: \"white gold rings\""));
        assert!(prompt.contains("- \"rings over 1 carat\" → AND(FIND(\"rn\", LOWER({Design})), {Set Cts.} > 1)"));
        assert!(prompt.ends_with("Formula:"));
    }

    #[test]
    fn test_query_is_trimmed() {
        let prompt = build_translation_prompt(&vocabulary(), "  oval pendants \n");
        assert!(prompt.contains("Query: \"oval pendants\"\n"));
    }
}
