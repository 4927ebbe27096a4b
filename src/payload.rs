use serde::{Deserialize, Deserializer, Serialize};

/// One operating system row: a single product per vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsRow {
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product: String,
}

/// One application vendor with any number of products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRow {
    #[serde(default)]
    pub vendor: String,
    #[serde(default, deserialize_with = "list_field")]
    pub products: Vec<String>,
}

impl AppRow {
    /// Row as typed into the form: `products` is free text.
    pub fn from_text(vendor: &str, products: &str) -> Self {
        Self {
            vendor: vendor.to_string(),
            products: split_list(products),
        }
    }
}

/// A user-defined telemetry source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRow {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "list_field")]
    pub fields: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl SourceRow {
    pub fn from_text(name: &str, fields: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: split_list(fields),
            description: description.to_string(),
        }
    }
}

/// Submission body for a report run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub os: Vec<OsRow>,
    pub applications: Vec<AppRow>,
    pub sources: Vec<SourceRow>,
}

/// Editable form state, as loaded from a form file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportForm {
    #[serde(default)]
    pub os: Vec<OsRow>,
    #[serde(default)]
    pub applications: Vec<AppRow>,
    #[serde(default)]
    pub sources: Vec<SourceRow>,
}

impl ReportForm {
    pub fn build(&self) -> ReportPayload {
        build(&self.os, &self.applications, &self.sources)
    }
}

/// Splits list-valued text on commas and newlines, trimming each token and
/// dropping empty ones.
pub fn split_list(text: &str) -> Vec<String> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes form rows into a payload. Rows with no non-blank attribute are
/// dropped; application product lists lose their blank entries.
pub fn build(os: &[OsRow], apps: &[AppRow], sources: &[SourceRow]) -> ReportPayload {
    let os = os
        .iter()
        .filter(|r| !is_blank(&r.vendor) || !is_blank(&r.product))
        .cloned()
        .collect();

    let applications = apps
        .iter()
        .filter_map(|r| {
            let products: Vec<String> = r
                .products
                .iter()
                .filter(|p| !is_blank(p))
                .cloned()
                .collect();
            if is_blank(&r.vendor) && products.is_empty() {
                return None;
            }
            Some(AppRow {
                vendor: r.vendor.clone(),
                products,
            })
        })
        .collect();

    let sources = sources
        .iter()
        .filter(|s| !is_blank(&s.name) || !s.fields.is_empty() || !is_blank(&s.description))
        .cloned()
        .collect();

    ReportPayload {
        os,
        applications,
        sources,
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListInput {
    Text(String),
    Items(Vec<String>),
}

fn list_field<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ListInput::deserialize(de)? {
        ListInput::Text(text) => split_list(&text),
        ListInput::Items(items) => items,
    })
}
