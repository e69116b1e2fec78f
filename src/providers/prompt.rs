//! Prompt enviado ao modelo e leitura da resposta.

use serde_json::Value;

use crate::types::errors::ProviderError;
use crate::types::requests::AssessmentRequest;

use super::category::classify;

/// Constrói o prompt de avaliação para uma requisição.
pub fn build_prompt(request: &AssessmentRequest) -> String {
    let mut prompt = String::from(
        "You are a security analyst writing a CISO-ready trust brief.\n\
         Assess the following software using only verifiable public evidence.\n\n",
    );

    prompt.push_str(&format!("Product: {}\n", request.product_name.trim()));
    if let Some(company) = &request.company_name {
        prompt.push_str(&format!("Vendor: {}\n", company.trim()));
    }
    if let Some(url) = &request.url {
        prompt.push_str(&format!("URL: {}\n", url.trim()));
    }
    if let Some(sha1) = &request.sha1 {
        prompt.push_str(&format!("Binary SHA-1: {}\n", sha1.trim()));
    }
    prompt.push_str(&format!(
        "Suggested category: {}\n\n",
        classify(&request.product_name)
    ));

    prompt.push_str("Respond with a single JSON object with the fields:\n");
    prompt.push_str("{\n");
    prompt.push_str("  \"product_name\": string,\n");
    prompt.push_str("  \"vendor\": {\"name\": string, \"website\": string|null, \"reputation_summary\": string},\n");
    prompt.push_str("  \"category\": string,\n");
    prompt.push_str("  \"description\": string,\n");
    prompt.push_str("  \"cve_trends\": {\"total_cves\": int, \"critical_count\": int, \"trend_summary\": string},\n");
    prompt.push_str("  \"compliance\": {\"soc2_compliant\": bool|null, \"iso_certified\": bool|null, \"notes\": string},\n");
    prompt.push_str("  \"trust_score\": {\"score\": 0-100, \"confidence\": \"High\"|\"Medium\"|\"Low\", \"rationale\": string},\n");
    prompt.push_str("  \"alternatives\": [{\"product_name\": string, \"vendor\": string, \"rationale\": string}],\n");
    prompt.push_str("  \"citations\": [{\"source_type\": string, \"title\": string, \"url\": string|null}]\n");
    prompt.push_str("}\n");
    prompt.push_str("When evidence is missing, say \"Insufficient public evidence\" instead of guessing.\n");

    prompt
}

/// Extrai o primeiro objeto JSON da saída de um modelo.
///
/// Modelos costumam cercar o JSON com texto ou blocos de código. Cada `{`
/// é tentado em ordem e o primeiro objeto completo vence; o que vier
/// depois dele é ignorado.
pub fn extract_json(output: &str) -> Result<Value, ProviderError> {
    let mut first_error = None;

    for (start, _) in output.match_indices('{') {
        let mut stream =
            serde_json::Deserializer::from_str(&output[start..]).into_iter::<Value>();

        match stream.next() {
            Some(Ok(value)) => return Ok(value),
            Some(Err(e)) => {
                first_error.get_or_insert(e);
            }
            None => {}
        }
    }

    Err(match first_error {
        Some(e) => ProviderError::MalformedResponse(format!("JSON inválido: {}", e)),
        None => ProviderError::MalformedResponse("resposta não contém JSON".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_includes_request_fields() {
        let request = AssessmentRequest::new("FileZilla")
            .with_company("Tim Kosse")
            .with_sha1("e94803128b6368b5c2c876a782b1e88346356844");

        let prompt = build_prompt(&request);

        assert!(prompt.contains("Product: FileZilla"));
        assert!(prompt.contains("Vendor: Tim Kosse"));
        assert!(prompt.contains("Binary SHA-1: e948"));
        assert!(prompt.contains("Suggested category: File Sharing"));
        assert!(!prompt.contains("URL:"));
        assert!(prompt.contains("JSON"));
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let request = AssessmentRequest::new("Slack").with_url("https://slack.com");
        assert_eq!(build_prompt(&request), build_prompt(&request));
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let output = r#"
            Here is the assessment:
            ```json
            {"product_name": "Acme", "trust_score": {"score": 72}}
            ```
        "#;

        let value = extract_json(output).unwrap();
        assert_eq!(value["trust_score"]["score"], 72);
    }

    #[test]
    fn test_extract_json_without_object() {
        assert!(matches!(
            extract_json("no json here"),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_extract_json_stops_after_first_object() {
        let value = extract_json(r#"{"a": 1} note {x}"#).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));

        let value = extract_json(r#"see {braces} then {"trust_score": {"score": 64}} and more"#)
            .unwrap();
        assert_eq!(value["trust_score"]["score"], 64);
    }

    #[test]
    fn test_extract_json_invalid() {
        assert!(matches!(
            extract_json("{not: valid}"),
            Err(ProviderError::MalformedResponse(_))
        ));
    }
}
