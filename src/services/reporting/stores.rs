//! Store directory and per-user store access
//!
//! Sales rows identify a store by the company CNPJ while users and KPI rows
//! use free-text store names. Names are compared after normalization and
//! alias correction.

use sea_orm::{ColumnTrait, Condition};

use crate::models::{sale, user};

/// Known stores: CNPJ (digits only) and canonical name
pub const STORE_DIRECTORY: &[(&str, &str)] = &[
    ("12309173001309", "ARAGUAIA SHOPPING"),
    ("12309173000418", "BOULEVARD SHOPPING"),
    ("12309173000175", "BRASILIA SHOPPING"),
    ("12309173000680", "CONJUNTO NACIONAL"),
    ("12309173001228", "CONJUNTO NACIONAL QUIOSQUE"),
    ("12309173000507", "GOIANIA SHOPPING"),
    ("12309173000256", "IGUATEMI SHOPPING"),
    ("12309173000841", "JK SHOPPING"),
    ("12309173000337", "PARK SHOPPING"),
    ("12309173000922", "PATIO BRASIL"),
    ("12309173000760", "TAGUATINGA SHOPPING"),
    ("12309173001147", "TERRAÇO SHOPPING"),
    ("12309173001651", "TAGUATINGA SHOPPING QQ"),
    ("12309173001732", "UBERLÂNDIA SHOPPING"),
    ("12309173001813", "UBERABA SHOPPING"),
    ("12309173001570", "FLAMBOYANT SHOPPING"),
    ("12309173002119", "BURITI SHOPPING"),
    ("12309173002461", "PASSEIO DAS AGUAS"),
    ("12309173002038", "PORTAL SHOPPING"),
    ("12309173002208", "SHOPPING SUL"),
    ("12309173001902", "BURITI RIO VERDE"),
    ("12309173002380", "PARK ANAPOLIS"),
    ("12309173002542", "SHOPPING RECIFE"),
    ("12309173002895", "MANAIRA SHOPPING"),
    ("12309173002976", "IGUATEMI FORTALEZA"),
    ("12309173001066", "CD TAGUATINGA"),
];

/// Spellings found in user records, mapped to the canonical name
const STORE_ALIASES: &[(&str, &str)] = &[
    ("UBERABA", "UBERABA SHOPPING"),
    ("UBERLÂNDIA", "UBERLÂNDIA SHOPPING"),
    ("UBERLANDIA", "UBERLÂNDIA SHOPPING"),
    ("CNB SHOPPING", "CONJUNTO NACIONAL"),
    ("CNB QUIOSQUE", "CONJUNTO NACIONAL QUIOSQUE"),
    ("QQ TAGUATINGA SHOPPING", "TAGUATINGA SHOPPING QQ"),
    ("ESTOQUE CD", "CD TAGUATINGA"),
    ("CD", "CD TAGUATINGA"),
    ("PASSEIO DAS ÁGUAS", "PASSEIO DAS AGUAS"),
    ("TERRACO SHOPPING", "TERRAÇO SHOPPING"),
    ("PARK", "PARK SHOPPING"),
    ("PARKSHOPPING", "PARK SHOPPING"),
];

/// NBSP to space, collapsed whitespace, trimmed, upper-cased
pub fn normalize_store(name: &str) -> String {
    name.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Normalized name with known aliases resolved
pub fn canonical_store(name: &str) -> String {
    let normalized = normalize_store(name);
    STORE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(normalized)
}

pub fn cnpj_for_store(name: &str) -> Option<&'static str> {
    let canonical = canonical_store(name);
    STORE_DIRECTORY
        .iter()
        .find(|(_, store)| *store == canonical)
        .map(|(cnpj, _)| *cnpj)
}

/// Store name for a CNPJ in any punctuation
pub fn store_for_cnpj(cnpj: &str) -> Option<&'static str> {
    let digits = cnpj_digits(cnpj);
    STORE_DIRECTORY
        .iter()
        .find(|(known, _)| *known == digits)
        .map(|(_, store)| *store)
}

pub fn cnpj_digits(cnpj: &str) -> String {
    cnpj.chars().filter(char::is_ascii_digit).collect()
}

/// Every directory store name, sorted
pub fn directory_names() -> Vec<String> {
    let mut names: Vec<String> = STORE_DIRECTORY.iter().map(|(_, n)| n.to_string()).collect();
    names.sort();
    names
}

/// Which stores a user may see in reporting data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAccess {
    All,
    /// Canonical store names
    Stores(Vec<String>),
    Nothing,
}

impl StoreAccess {
    pub fn for_user(user: Option<&user::Model>) -> Self {
        let Some(user) = user else {
            return StoreAccess::Nothing;
        };
        if user.sees_all_stores() {
            return StoreAccess::All;
        }

        let stores: Vec<String> = user
            .store_list()
            .iter()
            .map(|s| canonical_store(s))
            .collect();
        if stores.is_empty() {
            StoreAccess::Nothing
        } else {
            StoreAccess::Stores(stores)
        }
    }

    /// Filter on `sales`; `None` when nothing is visible
    pub fn sales_condition(&self) -> Option<Condition> {
        match self {
            StoreAccess::All => Some(Condition::all()),
            StoreAccess::Nothing => None,
            StoreAccess::Stores(stores) => {
                let cnpjs: Vec<&str> = stores.iter().filter_map(|s| cnpj_for_store(s)).collect();
                if cnpjs.is_empty() {
                    tracing::warn!(?stores, "None of the user's stores is in the store directory");
                    return None;
                }
                Some(Condition::all().add(sale::Column::CompanyCnpj.is_in(cnpjs)))
            }
        }
    }

    /// Whether a KPI row's store is visible
    pub fn allows_store(&self, store: Option<&str>) -> bool {
        match self {
            StoreAccess::All => true,
            StoreAccess::Nothing => false,
            StoreAccess::Stores(stores) => {
                store.is_some_and(|s| stores.contains(&canonical_store(s)))
            }
        }
    }
}
