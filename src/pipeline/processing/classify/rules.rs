//! Built-in keyword tables for the taxonomy classifier.
//!
//! Keywords are matched as raw substrings of the lower-cased, accent-folded
//! description, so they are written without diacritics and also match inside
//! longer words (`cimento` in `fornecimento`, `som` in `somente`).

use crate::domain::{Function, Nature};

/// Assigns `nature` when any keyword occurs. `reroute` sends the match to a
/// different nature when one of its keywords also occurs.
#[derive(Debug, Clone, Copy)]
pub struct NatureRule {
    pub nature: Nature,
    pub keywords: &'static [&'static str],
    pub reroute: Option<(&'static [&'static str], Nature)>,
}

/// Adds `weight` to `function` when any keyword occurs
#[derive(Debug, Clone, Copy)]
pub struct ScoringRule {
    pub function: Function,
    pub keywords: &'static [&'static str],
    pub weight: u32,
}

/// Forces a classification when every keyword group matches (a group matches
/// when any of its keywords occurs) and, if set, the scored function equals
/// `when_function`. A `None` function keeps the scored one.
#[derive(Debug, Clone, Copy)]
pub struct OverrideRule {
    pub all_of: &'static [&'static [&'static str]],
    pub when_function: Option<Function>,
    pub nature: Nature,
    pub function: Option<Function>,
}

/// Scores below this mean nothing matched
pub const MIN_MATCH_SCORE: u32 = 1;

/// Leasing people is a service, not a lease
const LABOR_TERMS: &[&str] = &["mao de obra", "motorista"];

/// Evaluated in order; the first matching rule decides the nature.
pub const NATURE_RULES: &[NatureRule] = &[
    NatureRule {
        nature: Nature::Services,
        keywords: &[
            "contratacao", "prestacao", "servico", "manutencao", "reparo", "limpeza",
            "locacao de mao", "apoio", "assessoria", "consultoria", "publicidade", "gestao",
        ],
        reroute: None,
    },
    NatureRule {
        nature: Nature::Works,
        keywords: &[
            "obra", "pavimentacao", "construcao", "reforma", "ampliacao", "drenagem",
            "engenharia", "edificacao", "muro", "tapa buraco",
        ],
        reroute: None,
    },
    NatureRule {
        nature: Nature::Lease,
        keywords: &["locacao", "aluguel", "arrendamento"],
        reroute: Some((LABOR_TERMS, Nature::Services)),
    },
];

pub const DEFAULT_NATURE: Nature = Nature::Acquisition;

/// Compound, unambiguous phrases weigh 20; broad single words weigh 10.
pub const SCORING_RULES: &[ScoringRule] = &[
    ScoringRule {
        function: Function::UrbanInfrastructure,
        keywords: &[
            "pavimentacao", "asfalto", "drenagem", "saneamento", "tapa buraco",
            "paralelepipedo", "urbanizacao",
        ],
        weight: 20,
    },
    ScoringRule {
        function: Function::PublicBuildings,
        keywords: &["construcao", "reforma", "ubs", "creche", "escola", "predio", "muro", "cobertura"],
        weight: 15,
    },
    ScoringRule {
        function: Function::ConstructionMaterials,
        keywords: &["cimento", "tijolo", "areia", "material de construcao", "eletrico", "hidraulico"],
        weight: 10,
    },
    ScoringRule {
        function: Function::UrbanCleaning,
        keywords: &["coleta de lixo", "residuos", "entulho", "varricao", "aterro", "bota fora"],
        weight: 20,
    },
    ScoringRule {
        function: Function::BuildingCleaning,
        keywords: &["limpeza", "higienizacao", "zeladoria", "dedetizacao", "material de limpeza"],
        weight: 10,
    },
    ScoringRule {
        function: Function::HealthMedicines,
        keywords: &["medicamento", "farmacia", "injetavel", "soro", "comprimido"],
        weight: 15,
    },
    ScoringRule {
        function: Function::HealthServices,
        keywords: &[
            "hospital", "medico", "exame", "saude", "enfermagem", "laboratorial", "raio-x",
            "odontologico",
        ],
        weight: 10,
    },
    ScoringRule {
        function: Function::SchoolTransport,
        keywords: &["transporte escolar", "transporte de alunos", "transporte universitario"],
        weight: 20,
    },
    ScoringRule {
        function: Function::EducationGeneral,
        keywords: &["merenda", "didatico", "kit escolar", "fardamento", "educacao", "pedagogico"],
        weight: 10,
    },
    ScoringRule {
        function: Function::InformationTechnology,
        keywords: &["computador", "notebook", "software", "toner", "impressora", "internet", "site"],
        weight: 10,
    },
    ScoringRule {
        function: Function::FleetAndFuel,
        keywords: &["combustivel", "gasolina", "diesel", "pneu", "pecas", "manutencao veicular"],
        weight: 10,
    },
    ScoringRule {
        function: Function::VehicleRental,
        keywords: &["locacao de veiculo", "trator", "retroescavadeira", "maquinas pesadas", "automovel"],
        weight: 10,
    },
    ScoringRule {
        function: Function::Security,
        keywords: &["vigilancia", "seguranca", "monitoramento", "camera", "cftv"],
        weight: 15,
    },
    ScoringRule {
        function: Function::Administrative,
        keywords: &["papel", "expediente", "cafe", "agua mineral", "mobiliario", "mesa", "juridico", "contabil"],
        weight: 10,
    },
    ScoringRule {
        function: Function::EventsCulture,
        keywords: &["show", "palco", "som", "evento", "festividade", "decoracao", "banda"],
        weight: 15,
    },
    ScoringRule {
        function: Function::AgricultureEnvironment,
        keywords: &["adubo", "sementes", "corte de terra", "agricola"],
        weight: 15,
    },
];

/// Applied in order after scoring; later overrides win.
pub const OVERRIDE_RULES: &[OverrideRule] = &[
    OverrideRule {
        all_of: &[&["caminhao de lixo", "compactador"]],
        when_function: None,
        nature: Nature::Services,
        function: Some(Function::UrbanCleaning),
    },
    OverrideRule {
        all_of: &[&["transporte escolar"]],
        when_function: None,
        nature: Nature::Services,
        function: Some(Function::SchoolTransport),
    },
    OverrideRule {
        all_of: &[&["pavimentacao"]],
        when_function: None,
        nature: Nature::Works,
        function: Some(Function::UrbanInfrastructure),
    },
    OverrideRule {
        all_of: &[&["licenca"], &["software"]],
        when_function: None,
        nature: Nature::Acquisition,
        function: Some(Function::InformationTechnology),
    },
    // Fuel is always bought, even when phrased as a contracted service
    OverrideRule {
        all_of: &[&["combustivel"]],
        when_function: Some(Function::FleetAndFuel),
        nature: Nature::Acquisition,
        function: None,
    },
];
