use crate::error::{AppError, Result};

/// A composed arXiv `search_query` expression such as `au:Hinton AND ti:capsules`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    expression: String,
}

impl SearchQuery {
    /// Joins the present fields with `AND`, each tagged by its arXiv field prefix.
    ///
    /// Blank strings count as absent. Fails with `NoSearchParameters` when
    /// nothing is left to search for.
    pub fn compose(
        author: Option<&str>,
        title: Option<&str>,
        journal: Option<&str>,
    ) -> Result<Self> {
        let terms: Vec<String> = [("au", author), ("ti", title), ("jr", journal)]
            .into_iter()
            .filter_map(|(prefix, value)| {
                value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{prefix}:{v}"))
            })
            .collect();

        if terms.is_empty() {
            return Err(AppError::NoSearchParameters);
        }

        Ok(Self {
            expression: terms.join(" AND "),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expression)
    }
}
