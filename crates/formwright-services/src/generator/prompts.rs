use formwright_core::models::{FieldDefinition, FieldType};

const SCHEMA_SHAPE: &str = r#"{
  "title": "Form Title",
  "description": "Form description",
  "fields": [
    {
      "name": "field_name",
      "label": "Human Readable Label",
      "type": "field_type",
      "required": true/false,
      "placeholder": "Placeholder text if applicable",
      "options": ["option1", "option2"] // for select, radio, checkbox
      "validation": {
        "min": number,
        "max": number,
        "pattern": "regex_pattern",
        "minLength": number,
        "maxLength": number
      },
      "fileConfig": {
        "accept": "file_types",
        "maxSize": number_in_bytes,
        "multiple": true/false
      },
      "order": number
    }
  ]
}"#;

fn field_type_list() -> String {
    FieldType::ALL
        .iter()
        .map(FieldType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Instructions for designing a new form from a user request
pub fn generation_prompt(request: &str) -> String {
    format!(
        r#"
You are an expert form designer. Based on the following user request, generate a JSON schema for a web form.

User Request: "{request}"

Requirements:
1. Create a logical, user-friendly form structure
2. Include appropriate field types ({types})
3. For file uploads, specify fileConfig with appropriate accept types and size limits
4. Add validation rules where appropriate
5. Make the form intuitive and easy to fill out
6. Include a title and description for the form

Return ONLY a valid JSON object with this exact structure:
{shape}

Important: Ensure the JSON is valid and follows the exact structure above. Do not include any additional text or explanations.
"#,
        request = request,
        types = field_type_list(),
        shape = SCHEMA_SHAPE,
    )
}

/// Instructions for reworking the fields of an existing form
pub fn regeneration_prompt(
    existing: &[FieldDefinition],
    request: &str,
    modifications: Option<&str>,
) -> String {
    let original = serde_json::to_string_pretty(existing).unwrap_or_else(|_| "[]".to_string());
    let modifications = modifications
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("None specified");

    format!(
        r#"
You are an expert form designer. The user wants to modify an existing form based on their feedback.

Original Form: {original}

User Request: "{request}"

Additional Modifications: {modifications}

Requirements:
1. Modify the existing form based on the user's request
2. Keep the good parts and improve the problematic areas
3. Maintain the same JSON structure
4. Ensure all fields have proper validation and configuration
5. Make the form more user-friendly and intuitive

Return ONLY a valid JSON object with the updated fields array. Maintain the same structure as the original form.
"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_prompt() {
        let prompt = generation_prompt("a job application with a resume upload");
        assert!(prompt.contains("User Request: \"a job application with a resume upload\""));
        assert!(prompt.contains("text, email, number, textarea, select, checkbox, radio, file, date, tel, url"));
        assert!(prompt.contains("\"fileConfig\": {"));
        assert!(prompt.contains("Return ONLY a valid JSON object"));
    }

    #[test]
    fn test_regeneration_prompt() {
        let fields = vec![FieldDefinition::new("email", "Email", FieldType::Email)];
        let prompt = regeneration_prompt(&fields, "add a phone number", None);
        assert!(prompt.contains("\"name\": \"email\""));
        assert!(prompt.contains("User Request: \"add a phone number\""));
        assert!(prompt.contains("Additional Modifications: None specified"));

        let prompt = regeneration_prompt(&fields, "x", Some("make email optional"));
        assert!(prompt.contains("Additional Modifications: make email optional"));
    }
}
