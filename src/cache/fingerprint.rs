//! Fingerprint determinístico das requisições de avaliação.

use sha2::{Digest, Sha256};

use crate::types::requests::AssessmentRequest;

/// Separador entre os campos normalizados.
const FIELD_DELIMITER: char = '|';

/// Gera o fingerprint de uma tupla `(produto, fornecedor, hash, url)`.
///
/// Cada campo é normalizado (minúsculas, sem espaços nas pontas) e campos
/// ausentes viram string vazia, mantendo sempre as quatro posições.
/// Retorna o SHA-256 da junção em hexadecimal minúsculo (64 caracteres).
pub fn fingerprint(
    product_name: &str,
    company_name: Option<&str>,
    binary_hash: Option<&str>,
    url: Option<&str>,
) -> String {
    let fields = [
        normalize(Some(product_name)),
        normalize(company_name),
        normalize(binary_hash),
        normalize(url),
    ];

    let joined = fields.join(&FIELD_DELIMITER.to_string());

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fingerprint de uma [`AssessmentRequest`].
pub fn fingerprint_request(request: &AssessmentRequest) -> String {
    fingerprint(
        &request.product_name,
        request.company_name.as_deref(),
        request.sha1.as_deref(),
        request.url.as_deref(),
    )
}

fn normalize(field: Option<&str>) -> String {
    field.map(|f| f.trim().to_lowercase()).unwrap_or_default()
}
