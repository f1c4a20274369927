use std::collections::HashMap;

use crate::catalog::services::Service;
use crate::errors::AppError;

/// Fills a service's prompt template from submitted form values.
///
/// Every non-optional input must be present and non-blank. Optional inputs that were not
/// submitted render as an empty string. Values are substituted as submitted (untrimmed);
/// keys that are not inputs of the service are ignored.
pub fn render_prompt(
    service: &Service,
    values: &HashMap<String, String>,
) -> Result<String, AppError> {
    let missing: Vec<&str> = service
        .inputs
        .iter()
        .filter(|input| !input.optional)
        .filter(|input| {
            values
                .get(input.id)
                .map_or(true, |value| value.trim().is_empty())
        })
        .map(|input| input.id)
        .collect();

    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let mut prompt = service.prompt_template.to_string();
    for input in service.inputs {
        let placeholder = format!("{{{}}}", input.id);
        let value = values.get(input.id).map(String::as_str).unwrap_or("");
        prompt = prompt.replacen(&placeholder, value, 1);
    }
    Ok(prompt)
}
