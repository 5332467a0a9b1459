use super::delimited::{parse_rows, write_row};
use super::TableRepository;
use crate::constants::{BASE_COLUMNS, DUPLICATE_STATUS_COLUMN, FIELD_DELIMITER, MISSING_LABEL};
use crate::domain::{DuplicateStatus, Function, Nature, NormalizedRecord, Table};
use crate::error::{Result, ScraperError};
use crate::identity::identity_key;
use crate::pipeline::processing::classify::classify;
use crate::pipeline::processing::normalize::{normalize_date, parse_amount, sanitize};
use async_trait::async_trait;
use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `;`-delimited UTF-8 file holding the whole table
pub struct FlatFileRepository {
    path: PathBuf,
}

impl FlatFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "table".to_string());
        self.path.with_file_name(format!("{}{}", name, suffix))
    }
}

#[async_trait]
impl TableRepository for FlatFileRepository {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Option<Table>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let text = String::from_utf8(bytes).map_err(|e| ScraperError::CorruptTable {
            reason: format!("not valid UTF-8: {}", e),
        })?;
        let table = decode_table(&text)?;
        debug!("Decoded {} rows from {}", table.len(), self.path.display());
        Ok(Some(table))
    }

    async fn save(&self, table: &Table) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        // Write aside, then swap in, so a failed write never truncates the table
        let tmp = self.sibling(".tmp");
        tokio::fs::write(&tmp, encode_table(table)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        info!("Wrote {} rows to {}", table.len(), self.path.display());
        Ok(())
    }

    async fn quarantine(&self) -> Result<Option<String>> {
        if tokio::fs::metadata(&self.path).await.is_err() {
            return Ok(None);
        }
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let target = self.sibling(&format!(".corrupt-{}", stamp));
        tokio::fs::rename(&self.path, &target).await?;
        Ok(Some(target.display().to_string()))
    }
}

/// Serializes the table with its header row.
///
/// Values are stored rounded to cents (`{:.2}`), the same precision the
/// composite identity key uses.
pub fn encode_table(table: &Table) -> Result<Vec<u8>> {
    let with_status = table.has_duplicate_status();
    let mut out = Vec::new();

    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    if with_status {
        header.push(DUPLICATE_STATUS_COLUMN);
    }
    write_row(&mut out, &header, FIELD_DELIMITER)?;

    for record in &table.records {
        let mut row = vec![
            record.identity_key.clone(),
            record.published_date.clone(),
            record.modality_label.clone(),
            record.municipality.clone(),
            record.organization.clone(),
            record.nature.label().to_string(),
            record.function.label().to_string(),
            record.category_combined(),
            record.description.clone(),
            format!("{:.2}", record.value),
            record.origin_link.clone(),
        ];
        if with_status {
            row.push(
                record
                    .duplicate_status
                    .map(|s| s.label().to_string())
                    .unwrap_or_default(),
            );
        }
        write_row(&mut out, &row, FIELD_DELIMITER)?;
    }
    Ok(out)
}

/// Parses a persisted table.
///
/// An empty file is an empty table. A wrong header, a row wider than the
/// header, an unclosed quote or a field holding a line break means the file
/// cannot be trusted and is reported as corrupt; shorter rows are padded with
/// empty fields.
pub fn decode_table(text: &str) -> Result<Table> {
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Ok(Table::default());
    }

    let mut rows = parse_rows(text, FIELD_DELIMITER)?.into_iter();
    let header: Vec<String> = rows
        .next()
        .unwrap_or_default()
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    check_header(&header)?;
    let width = header.len();

    let mut records = Vec::new();
    for (i, row) in rows.enumerate() {
        if row.len() > width {
            return Err(ScraperError::CorruptTable {
                reason: format!("row {} has {} fields, expected {}", i + 2, row.len(), width),
            });
        }
        if row.iter().any(|f| f.contains(['\n', '\r'])) {
            return Err(ScraperError::CorruptTable {
                reason: format!("row {} has a field spanning several lines", i + 2),
            });
        }
        records.push(record_from_row(&row));
    }
    Ok(Table::new(records))
}

fn check_header(header: &[String]) -> Result<()> {
    let base_matches = header.len() >= BASE_COLUMNS.len()
        && header.iter().zip(BASE_COLUMNS.iter()).all(|(h, expected)| h == expected);
    let extra_ok = match header.len() - BASE_COLUMNS.len().min(header.len()) {
        0 => true,
        1 => header[BASE_COLUMNS.len()] == DUPLICATE_STATUS_COLUMN,
        _ => false,
    };
    if base_matches && extra_ok {
        Ok(())
    } else {
        Err(ScraperError::CorruptTable {
            reason: format!("unexpected header: {}", header.join(&FIELD_DELIMITER.to_string())),
        })
    }
}

// Rebuilds a record from persisted text, re-applying the field invariants
fn record_from_row(fields: &[String]) -> NormalizedRecord {
    let field = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");

    let description = sanitize(field(8));
    let organization = sanitize(field(4));
    let origin_link = match field(10).trim() {
        "" => MISSING_LABEL.to_string(),
        link => link.to_string(),
    };
    let value = parse_amount(field(9));

    let (nature, function) = match (Nature::from_label(field(5)), Function::from_label(field(6))) {
        (Some(nature), Some(function)) => (nature, function),
        (nature, function) => {
            let fallback = classify(Some(&description));
            debug!("Reclassifying persisted row with unknown labels: {}", description);
            (nature.unwrap_or(fallback.nature), function.unwrap_or(fallback.function))
        }
    };

    let identity = match field(0).trim() {
        "" => identity_key(&origin_link, &description, value, &organization),
        key => key.to_string(),
    };

    NormalizedRecord {
        identity_key: identity,
        published_date: normalize_date(Some(field(1))),
        modality_label: sanitize(field(2)),
        municipality: sanitize(field(3)),
        organization,
        nature,
        function,
        description,
        value,
        origin_link,
        duplicate_status: DuplicateStatus::from_label(field(11)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample(key: &str, status: Option<DuplicateStatus>) -> NormalizedRecord {
        NormalizedRecord {
            identity_key: key.to_string(),
            published_date: "2026-01-20".to_string(),
            modality_label: "Concorrência".to_string(),
            municipality: "Caicó".to_string(),
            organization: "MUNICIPIO DE CAICO".to_string(),
            nature: Nature::Works,
            function: Function::UrbanInfrastructure,
            description: "Pavimentação de ruas, bairro Centro".to_string(),
            value: 98765.4,
            origin_link: key.to_string(),
            duplicate_status: status,
        }
    }

    #[test]
    fn encoded_table_has_fixed_column_order() {
        let bytes = encode_table(&Table::new(vec![sample("https://x/1", None)])).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID_Unico;Data;Modalidade;Cidade;Órgão;Natureza;Função;Categoria_Final;Objeto;Valor;Link"
        );
        assert_eq!(
            lines.next().unwrap(),
            "https://x/1;2026-01-20;Concorrência;Caicó;MUNICIPIO DE CAICO;OBRAS;INFRAESTRUTURA URBANA;\
             OBRAS - INFRAESTRUTURA URBANA;Pavimentação de ruas, bairro Centro;98765.40;https://x/1"
        );
    }

    #[test]
    fn status_column_appears_only_when_used() {
        let table = Table::new(vec![sample("a", Some(DuplicateStatus::Original))]);
        let text = String::from_utf8(encode_table(&table).unwrap()).unwrap();
        assert!(text.lines().next().unwrap().ends_with(";Status_Duplicidade"));
        assert!(text.lines().nth(1).unwrap().ends_with(";ORIGINAL"));
    }

    #[test]
    fn decode_reads_back_what_encode_wrote() {
        let table = Table::new(vec![
            sample("https://x/1", Some(DuplicateStatus::Original)),
            sample("https://x/1", Some(DuplicateStatus::Repeated)),
        ]);
        let text = String::from_utf8(encode_table(&table).unwrap()).unwrap();
        assert_eq!(decode_table(&text).unwrap(), table);
    }

    #[test]
    fn wrong_header_is_corrupt() {
        let err = decode_table("foo;bar\n1;2\n").unwrap_err();
        assert!(matches!(err, ScraperError::CorruptTable { .. }));
    }

    #[test]
    fn overlong_row_is_corrupt() {
        let text = format!("{}\n{}\n", BASE_COLUMNS.join(";"), vec!["x"; 14].join(";"));
        assert!(matches!(decode_table(&text), Err(ScraperError::CorruptTable { .. })));
    }

    #[test]
    fn lenient_rows_are_repaired() {
        let text = format!(
            "\u{feff}{}\n;NaT;Pregão;Natal;Prefeitura;???;???;;Coleta de lixo;1.234,50\n",
            BASE_COLUMNS.join(";")
        );
        let table = decode_table(&text).unwrap();
        let record = &table.records[0];
        assert_eq!(record.published_date, "");
        assert_eq!(record.origin_link, MISSING_LABEL);
        assert!(!record.identity_key.is_empty());
        assert_eq!(record.function, Function::UrbanCleaning);
        assert!((record.value - 1234.5).abs() < 1e-9);
    }

    #[test]
    fn blank_file_is_an_empty_table() {
        assert!(decode_table("").unwrap().is_empty());
        assert!(decode_table("\n\n").unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_through_the_filesystem() {
        let dir = tempdir().unwrap();
        let repository = FlatFileRepository::new(dir.path().join("nested").join("base.csv"));

        assert_eq!(repository.load().await.unwrap(), None);

        let table = Table::new(vec![sample("https://x/9", None)]);
        repository.save(&table).await.unwrap();
        assert_eq!(repository.load().await.unwrap(), Some(table));
        assert!(!dir.path().join("nested").join("base.csv.tmp").exists());
    }

    #[tokio::test]
    async fn quarantine_moves_the_file_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base.csv");
        std::fs::write(&path, "garbage\n").unwrap();
        let repository = FlatFileRepository::new(&path);

        assert!(matches!(repository.load().await, Err(ScraperError::CorruptTable { .. })));
        let moved = repository.quarantine().await.unwrap().unwrap();
        assert!(moved.contains("base.csv.corrupt-"));
        assert!(!path.exists());
    }

    #[test]
    fn stray_quote_inside_a_description_keeps_every_row() {
        let text = format!(
            "{}\nk1;2026-01-02;Pregão;Natal;Org;AQUISIÇÃO;OUTROS;AQUISIÇÃO - OUTROS;Compra de 12\" tubos;10.00;k1\n\
             k2;2026-01-03;Pregão;Natal;Org;AQUISIÇÃO;OUTROS;AQUISIÇÃO - OUTROS;Compra de canos;20.00;k2\n\
             k3;2026-01-04;Pregão;Natal;Org;AQUISIÇÃO;OUTROS;AQUISIÇÃO - OUTROS;Compra de luvas;30.00;k3\n",
            BASE_COLUMNS.join(";")
        );
        let table = decode_table(&text).unwrap();
        let keys: Vec<&str> = table.records.iter().map(|r| r.identity_key.as_str()).collect();
        assert_eq!(keys, vec!["k1", "k2", "k3"]);
        assert_eq!(table.records[0].description, "Compra de 12' tubos");
    }

    #[test]
    fn unclosed_quote_is_corrupt() {
        let text = format!(
            "{}\nk1;2026-01-02;Pregão;Natal;Org;AQUISIÇÃO;OUTROS;;\"Compra;10.00;k1\nk2;;;;;;;;x;1;k2\n",
            BASE_COLUMNS.join(";")
        );
        assert!(matches!(decode_table(&text), Err(ScraperError::CorruptTable { .. })));
    }

    #[test]
    fn multiline_field_is_corrupt() {
        let text = format!(
            "{}\nk1;2026-01-02;Pregão;Natal;Org;AQUISIÇÃO;OUTROS;;\"Compra\nde tubos\";10.00;k1\n",
            BASE_COLUMNS.join(";")
        );
        assert!(matches!(decode_table(&text), Err(ScraperError::CorruptTable { .. })));
    }

    #[test]
    fn values_are_stored_to_the_cent() {
        let mut record = sample("https://x/c", None);
        record.value = 1234.5678;
        let text = String::from_utf8(encode_table(&Table::new(vec![record])).unwrap()).unwrap();
        assert!(text.contains(";1234.57;"));
        assert!((decode_table(&text).unwrap().records[0].value - 1234.57).abs() < 1e-9);
    }
}
