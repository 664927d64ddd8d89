//! Column Role Classifier
//! Assigns semantic roles to columns by keyword matching on their names.

use serde::Serialize;
use std::collections::BTreeMap;

/// Revision of [`ROLE_KEYWORDS`]; bump when the table changes.
pub const KEYWORD_TABLE_VERSION: u32 = 1;

pub const DATE_KEYWORDS: &[&str] = &["date", "time", "created", "order"];
pub const AMOUNT_KEYWORDS: &[&str] = &["amount", "price", "total", "revenue", "sales", "value"];
pub const PRODUCT_KEYWORDS: &[&str] = &["product", "item", "name", "category"];
pub const CUSTOMER_KEYWORDS: &[&str] = &["customer", "client", "user", "buyer"];

/// Keyword table consulted by [`ColumnRoles::classify`].
pub const ROLE_KEYWORDS: [(ColumnRole, &[&str]); 4] = [
    (ColumnRole::Date, DATE_KEYWORDS),
    (ColumnRole::Amount, AMOUNT_KEYWORDS),
    (ColumnRole::Product, PRODUCT_KEYWORDS),
    (ColumnRole::Customer, CUSTOMER_KEYWORDS),
];

/// Semantic category a column may play in a sales export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Date,
    Amount,
    Product,
    Customer,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 4] = [
        ColumnRole::Date,
        ColumnRole::Amount,
        ColumnRole::Product,
        ColumnRole::Customer,
    ];

    pub fn keywords(self) -> &'static [&'static str] {
        ROLE_KEYWORDS
            .iter()
            .find(|(role, _)| *role == self)
            .map(|(_, keywords)| *keywords)
            .unwrap_or(&[])
    }

    /// Whether a column name qualifies for this role.
    pub fn matches(self, column_name: &str) -> bool {
        contains_any(&normalize_name(column_name), self.keywords())
    }
}

fn contains_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| normalized.contains(kw))
}

/// Trimmed, lowercased form of a column name used for matching.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Columns grouped by role, in original column order.
///
/// Names are kept exactly as the table presents them; normalization is only
/// used for matching. A name may appear under several roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnRoles {
    by_role: BTreeMap<ColumnRole, Vec<String>>,
}

impl ColumnRoles {
    pub fn classify<I, S>(column_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_role: BTreeMap<ColumnRole, Vec<String>> =
            ColumnRole::ALL.iter().map(|role| (*role, Vec::new())).collect();

        for name in column_names {
            let name = name.as_ref();
            let normalized = normalize_name(name);
            for (role, keywords) in ROLE_KEYWORDS.iter() {
                if contains_any(&normalized, keywords) {
                    by_role.entry(*role).or_default().push(name.to_string());
                }
            }
        }

        tracing::debug!(
            date = ?by_role.get(&ColumnRole::Date),
            amount = ?by_role.get(&ColumnRole::Amount),
            product = ?by_role.get(&ColumnRole::Product),
            customer = ?by_role.get(&ColumnRole::Customer),
            "classified columns"
        );

        Self { by_role }
    }

    pub fn columns(&self, role: ColumnRole) -> &[String] {
        self.by_role.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First column (in table order) assigned the role.
    pub fn primary(&self, role: ColumnRole) -> Option<&str> {
        self.columns(role).first().map(String::as_str)
    }

    pub fn has(&self, role: ColumnRole) -> bool {
        !self.columns(role).is_empty()
    }
}
