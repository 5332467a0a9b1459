use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static NULL: Value = Value::Null;

/// A procurement modality as queried on the feed (`codigoModalidadeContratacao`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modality {
    pub code: String,
    pub label: String,
}

impl Modality {
    pub fn new(code: &str, label: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
        }
    }
}

/// Raw notice object exactly as returned by the feed.
///
/// Read-only; accessors return `None` for absent, null or non-string fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawNotice(Value);

impl RawNotice {
    pub fn new(data: Value) -> Self {
        Self(data)
    }

    pub fn data(&self) -> &Value {
        &self.0
    }

    pub fn description(&self) -> Option<&str> {
        self.text("/objetoCompra")
    }

    /// `valorTotalEstimado`, which arrives as a number or as a formatted string
    pub fn estimated_value(&self) -> &Value {
        self.0.pointer("/valorTotalEstimado").unwrap_or(&NULL)
    }

    pub fn published_at(&self) -> Option<&str> {
        self.text("/dataPublicacaoPncp")
    }

    pub fn organization(&self) -> Option<&str> {
        self.text("/orgaoEntidade/razaoSocial")
    }

    pub fn municipality(&self) -> Option<&str> {
        self.text("/unidadeOrgao/municipioNome")
    }

    pub fn origin_link(&self) -> Option<&str> {
        self.text("/linkSistemaOrigem")
    }

    fn text(&self, pointer: &str) -> Option<&str> {
        self.0.pointer(pointer).and_then(Value::as_str)
    }
}

/// Result of requesting one page of a modality
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Notices(Vec<RawNotice>),
    /// Empty or absent `data` array
    Empty,
    /// Non-success HTTP status
    Status(u16),
}

/// A paginated source of procurement notices
#[async_trait::async_trait]
pub trait NoticeFeed: Send + Sync {
    /// Identifier used in logs and metrics
    fn feed_name(&self) -> &'static str;

    /// Fetch page `page` (1-based) of `modality`
    async fn fetch_page(&self, modality: &Modality, page: u32) -> Result<PageOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_follow_nested_paths() {
        let notice = RawNotice::new(json!({
            "objetoCompra": "Aquisição de medicamentos",
            "valorTotalEstimado": "R$ 1.500,00",
            "orgaoEntidade": { "razaoSocial": "MUNICIPIO DE NATAL" },
            "unidadeOrgao": { "municipioNome": "Natal" },
            "linkSistemaOrigem": "https://compras.example/123"
        }));
        assert_eq!(notice.description(), Some("Aquisição de medicamentos"));
        assert_eq!(notice.estimated_value(), &json!("R$ 1.500,00"));
        assert_eq!(notice.organization(), Some("MUNICIPIO DE NATAL"));
        assert_eq!(notice.municipality(), Some("Natal"));
        assert_eq!(notice.origin_link(), Some("https://compras.example/123"));
        assert_eq!(notice.published_at(), None);
    }

    #[test]
    fn non_string_and_null_fields_read_as_absent() {
        let notice = RawNotice::new(json!({
            "objetoCompra": null,
            "unidadeOrgao": null,
            "linkSistemaOrigem": 42
        }));
        assert_eq!(notice.description(), None);
        assert_eq!(notice.municipality(), None);
        assert_eq!(notice.origin_link(), None);
        assert!(notice.estimated_value().is_null());
    }
}
