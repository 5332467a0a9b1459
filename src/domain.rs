// Domain data shapes shared across layers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level procurement type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nature {
    #[serde(rename = "AQUISIÇÃO")]
    Acquisition,
    #[serde(rename = "SERVIÇOS")]
    Services,
    #[serde(rename = "OBRAS")]
    Works,
    #[serde(rename = "LOCAÇÃO")]
    Lease,
}

impl Nature {
    pub const ALL: [Nature; 4] = [
        Nature::Acquisition,
        Nature::Services,
        Nature::Works,
        Nature::Lease,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Nature::Acquisition => "AQUISIÇÃO",
            Nature::Services => "SERVIÇOS",
            Nature::Works => "OBRAS",
            Nature::Lease => "LOCAÇÃO",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|n| n.label() == label)
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What is being procured. `Unclassified` is the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    #[serde(rename = "INFRAESTRUTURA URBANA")]
    UrbanInfrastructure,
    #[serde(rename = "EDIFICAÇÕES PÚBLICAS")]
    PublicBuildings,
    #[serde(rename = "MATERIAIS DE CONSTRUÇÃO")]
    ConstructionMaterials,
    #[serde(rename = "LIMPEZA URBANA")]
    UrbanCleaning,
    #[serde(rename = "LIMPEZA E CONSERVAÇÃO PREDIAL")]
    BuildingCleaning,
    #[serde(rename = "SAÚDE - MEDICAMENTOS")]
    HealthMedicines,
    #[serde(rename = "SAÚDE - SERVIÇOS/EQUIP")]
    HealthServices,
    #[serde(rename = "EDUCAÇÃO - TRANSPORTE")]
    SchoolTransport,
    #[serde(rename = "EDUCAÇÃO - GERAL")]
    EducationGeneral,
    #[serde(rename = "TI E TECNOLOGIA")]
    InformationTechnology,
    #[serde(rename = "FROTA E COMBUSTÍVEL")]
    FleetAndFuel,
    #[serde(rename = "LOCAÇÃO DE VEÍCULOS/MÁQUINAS")]
    VehicleRental,
    #[serde(rename = "SEGURANÇA E VIGILÂNCIA")]
    Security,
    #[serde(rename = "AGRICULTURA E MEIO AMBIENTE")]
    AgricultureEnvironment,
    #[serde(rename = "ADMINISTRATIVO E EXPEDIENTE")]
    Administrative,
    #[serde(rename = "EVENTOS E CULTURA")]
    EventsCulture,
    #[serde(rename = "OUTROS")]
    Unclassified,
}

impl Function {
    /// Fixed evaluation order; score ties resolve to the earlier entry.
    pub const ALL: [Function; 17] = [
        Function::UrbanInfrastructure,
        Function::PublicBuildings,
        Function::ConstructionMaterials,
        Function::UrbanCleaning,
        Function::BuildingCleaning,
        Function::HealthMedicines,
        Function::HealthServices,
        Function::SchoolTransport,
        Function::EducationGeneral,
        Function::InformationTechnology,
        Function::FleetAndFuel,
        Function::VehicleRental,
        Function::Security,
        Function::AgricultureEnvironment,
        Function::Administrative,
        Function::EventsCulture,
        Function::Unclassified,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Function::UrbanInfrastructure => "INFRAESTRUTURA URBANA",
            Function::PublicBuildings => "EDIFICAÇÕES PÚBLICAS",
            Function::ConstructionMaterials => "MATERIAIS DE CONSTRUÇÃO",
            Function::UrbanCleaning => "LIMPEZA URBANA",
            Function::BuildingCleaning => "LIMPEZA E CONSERVAÇÃO PREDIAL",
            Function::HealthMedicines => "SAÚDE - MEDICAMENTOS",
            Function::HealthServices => "SAÚDE - SERVIÇOS/EQUIP",
            Function::SchoolTransport => "EDUCAÇÃO - TRANSPORTE",
            Function::EducationGeneral => "EDUCAÇÃO - GERAL",
            Function::InformationTechnology => "TI E TECNOLOGIA",
            Function::FleetAndFuel => "FROTA E COMBUSTÍVEL",
            Function::VehicleRental => "LOCAÇÃO DE VEÍCULOS/MÁQUINAS",
            Function::Security => "SEGURANÇA E VIGILÂNCIA",
            Function::AgricultureEnvironment => "AGRICULTURA E MEIO AMBIENTE",
            Function::Administrative => "ADMINISTRATIVO E EXPEDIENTE",
            Function::EventsCulture => "EVENTOS E CULTURA",
            Function::Unclassified => "OUTROS",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|f| f.label() == label)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Audit-mode annotation; computed, never used to remove rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateStatus {
    #[serde(rename = "ORIGINAL")]
    Original,
    #[serde(rename = "REPEATED")]
    Repeated,
}

impl DuplicateStatus {
    pub fn label(self) -> &'static str {
        match self {
            DuplicateStatus::Original => "ORIGINAL",
            DuplicateStatus::Repeated => "REPEATED",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "ORIGINAL" => Some(DuplicateStatus::Original),
            "REPEATED" => Some(DuplicateStatus::Repeated),
            _ => None,
        }
    }
}

/// One row of the persisted table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Deduplication key, stable across runs for the same notice
    pub identity_key: String,
    /// `YYYY-MM-DD` or empty
    pub published_date: String,
    pub modality_label: String,
    pub municipality: String,
    pub organization: String,
    pub nature: Nature,
    pub function: Function,
    pub description: String,
    /// Finite and non-negative
    pub value: f64,
    pub origin_link: String,
    pub duplicate_status: Option<DuplicateStatus>,
}

impl NormalizedRecord {
    pub fn category_combined(&self) -> String {
        format!("{} - {}", self.nature, self.function)
    }
}

/// Full snapshot of the persisted dataset, in row order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub records: Vec<NormalizedRecord>,
}

impl Table {
    pub fn new(records: Vec<NormalizedRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the duplicate-status column has to be persisted
    pub fn has_duplicate_status(&self) -> bool {
        self.records.iter().any(|r| r.duplicate_status.is_some())
    }

    pub fn count_status(&self, status: DuplicateStatus) -> usize {
        self.records
            .iter()
            .filter(|r| r.duplicate_status == Some(status))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_label() {
        for nature in Nature::ALL {
            assert_eq!(Nature::from_label(nature.label()), Some(nature));
        }
        for function in Function::ALL {
            assert_eq!(Function::from_label(function.label()), Some(function));
        }
        assert_eq!(Function::from_label("FOO"), None);
    }

    #[test]
    fn taxonomy_has_catch_all_last() {
        assert!(Function::ALL.len() >= 16);
        assert_eq!(Function::ALL.last(), Some(&Function::Unclassified));
    }

    #[test]
    fn combined_category_joins_labels() {
        let record = NormalizedRecord {
            identity_key: "k".into(),
            published_date: String::new(),
            modality_label: "Pregão".into(),
            municipality: "Natal".into(),
            organization: "Prefeitura".into(),
            nature: Nature::Works,
            function: Function::UrbanInfrastructure,
            description: "Pavimentação".into(),
            value: 10.0,
            origin_link: "N/A".into(),
            duplicate_status: None,
        };
        assert_eq!(record.category_combined(), "OBRAS - INFRAESTRUTURA URBANA");
    }
}
