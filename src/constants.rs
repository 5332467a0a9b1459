/// Feed defaults and persisted-table vocabulary shared across the codebase.

// PNCP consultation endpoint for published procurements
pub const PNCP_PUBLICATIONS_URL: &str =
    "https://pncp.gov.br/api/consulta/v1/contratacoes/publicacao";
pub const DEFAULT_UF: &str = "RN";
pub const DEFAULT_START_DATE: &str = "20260101";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0 Safari/537.36";

/// Feed date parameters use the compact `YYYYMMDD` form
pub const FEED_DATE_FORMAT: &str = "%Y%m%d";

/// Modality code → label, in the order they are fetched
pub const DEFAULT_MODALITIES: [(&str, &str); 3] = [
    ("6", "Pregão"),
    ("5", "Concorrência"),
    ("8", "Dispensa"),
];

pub const DEFAULT_STORE_PATH: &str = "output/base_licitacoes_rn.csv";
pub const DEFAULT_LOG_DIR: &str = "logs";

// Flat-file layout
pub const FIELD_DELIMITER: char = ';';
pub const DELIMITER_SUBSTITUTE: char = ',';

pub const BASE_COLUMNS: [&str; 11] = [
    "ID_Unico",
    "Data",
    "Modalidade",
    "Cidade",
    "Órgão",
    "Natureza",
    "Função",
    "Categoria_Final",
    "Objeto",
    "Valor",
    "Link",
];
pub const DUPLICATE_STATUS_COLUMN: &str = "Status_Duplicidade";

// Defaults for missing notice fields
pub const MISSING_LABEL: &str = "N/A";
pub const MISSING_DESCRIPTION: &str = "Sem descrição";

/// Link values shared by unrelated notices; never usable as an identity on their own
pub const PLACEHOLDER_LINKS: [&str; 6] = ["", "N/A", "null", "None", "-", "#"];

/// Textual leftovers of missing dates that must never reach the table
pub const NULL_DATE_TOKENS: [&str; 5] = ["nan", "NaT", "None", "null", "NaN"];
