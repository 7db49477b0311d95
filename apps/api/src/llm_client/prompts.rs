// Cross-cutting prompt fragments for the generation client.
// Category-specific prompt text lives in optimizer::prompts.

use crate::optimizer::schema::SchemaNode;

/// System instruction template. The target schema's JSON shape is embedded so
/// the service is biased toward compliant output — biased, not guaranteed;
/// the parsing/repair pipeline handles everything else.
const SYSTEM_TEMPLATE: &str = "You are a professional resume writer who provides \
structured, well-formatted responses. Always include quantifiable metrics and \
achievements. Format your response as valid JSON matching this schema: {schema}";

pub fn system_instruction(schema: &SchemaNode) -> String {
    let shape = serde_json::to_string_pretty(&schema.to_json())
        .unwrap_or_else(|_| schema.to_json().to_string());
    SYSTEM_TEMPLATE.replace("{schema}", &shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::schema::FieldCategory;

    #[test]
    fn test_system_instruction_embeds_schema_shape() {
        let instruction = system_instruction(FieldCategory::Summary.schema());
        assert!(instruction.contains("professional resume writer"));
        assert!(instruction.contains("\"type\": \"object\""));
        assert!(instruction.contains("\"summary\""));
        assert!(instruction.contains("\"minLength\": 50"));
    }
}
