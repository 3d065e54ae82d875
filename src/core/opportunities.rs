use crate::core::{OpportunityPage, OpportunityQuery, Result, RvcApi};
use crate::utils::error::RvcError;

pub const DEFAULT_MIN_SCORE: f64 = 50.0;
pub const DEFAULT_SORT: &str = "rvc_score";
pub const DEFAULT_LIMIT: u32 = 20;
/// The server's own page size when `limit` is omitted.
pub const SERVER_DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 100;
pub const SORT_FIELDS: [&str; 3] = ["rvc_score", "market_cap", "pe_ratio"];

impl Default for OpportunityQuery {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            sector: None,
            sort_by: DEFAULT_SORT.to_string(),
            limit: DEFAULT_LIMIT,
            currency: None,
        }
    }
}

impl OpportunityQuery {
    /// Query parameters, leaving out every value the server already defaults to.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.min_score != DEFAULT_MIN_SCORE {
            pairs.push(("min_score", self.min_score.to_string()));
        }
        if let Some(sector) = self.sector.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("sector", sector.to_string()));
        }
        if self.sort_by != DEFAULT_SORT {
            pairs.push(("sort_by", self.sort_by.clone()));
        }
        if self.limit != SERVER_DEFAULT_LIMIT {
            pairs.push(("limit", self.limit.to_string()));
        }
        if let Some(currency) = self.currency.as_deref().filter(|c| !c.eq_ignore_ascii_case("USD")) {
            pairs.push(("currency", currency.to_uppercase()));
        }
        pairs
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.min_score) {
            return Err(RvcError::validation("The minimum score must be between 0 and 100"));
        }
        if !SORT_FIELDS.contains(&self.sort_by.as_str()) {
            return Err(RvcError::validation(format!(
                "Sort by one of: {}",
                SORT_FIELDS.join(", ")
            )));
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(RvcError::validation("The limit must be between 1 and 100"));
        }
        Ok(())
    }
}

/// Canned filter combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum QuickFilter {
    Premium,
    Technology,
    LargeCap,
}

impl QuickFilter {
    pub fn apply(&self, query: &mut OpportunityQuery) {
        match self {
            QuickFilter::Premium => {
                query.min_score = 75.0;
                query.sector = None;
                query.limit = 10;
            }
            QuickFilter::Technology => {
                query.sector = Some("technology".to_string());
                query.min_score = 60.0;
            }
            QuickFilter::LargeCap => {
                query.sort_by = "market_cap".to_string();
                query.min_score = DEFAULT_MIN_SCORE;
                query.limit = DEFAULT_LIMIT;
            }
        }
    }
}

pub async fn fetch(api: &dyn RvcApi, query: &OpportunityQuery) -> Result<OpportunityPage> {
    query.validate()?;
    let response = api.top_opportunities(query).await?;
    response.data.ok_or_else(|| RvcError::Api {
        status: 200,
        message: "Invalid response from server".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(query: &OpportunityQuery) -> Vec<&'static str> {
        query.query_pairs().into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_defaults_only_send_limit() {
        // The default page size (20) differs from the server's (50).
        let query = OpportunityQuery::default();
        assert_eq!(query.query_pairs(), vec![("limit", "20".to_string())]);
    }

    #[test]
    fn test_server_defaults_are_omitted() {
        let query = OpportunityQuery {
            limit: SERVER_DEFAULT_LIMIT,
            sector: Some("  ".to_string()),
            currency: Some("usd".to_string()),
            ..OpportunityQuery::default()
        };
        assert!(query.query_pairs().is_empty());
    }

    #[test]
    fn test_changed_values_are_sent() {
        let query = OpportunityQuery {
            min_score: 75.0,
            sector: Some("Technology".to_string()),
            sort_by: "market_cap".to_string(),
            limit: 10,
            currency: Some("eur".to_string()),
        };
        assert_eq!(
            query.query_pairs(),
            vec![
                ("min_score", "75".to_string()),
                ("sector", "Technology".to_string()),
                ("sort_by", "market_cap".to_string()),
                ("limit", "10".to_string()),
                ("currency", "EUR".to_string()),
            ]
        );
    }

    #[test]
    fn test_quick_filters() {
        let mut query = OpportunityQuery::default();
        QuickFilter::Premium.apply(&mut query);
        assert_eq!(keys(&query), vec!["min_score", "limit"]);

        let mut query = OpportunityQuery::default();
        QuickFilter::LargeCap.apply(&mut query);
        assert_eq!(query.sort_by, "market_cap");
        assert_eq!(query.min_score, DEFAULT_MIN_SCORE);
    }

    #[test]
    fn test_validate() {
        assert!(OpportunityQuery::default().validate().is_ok());
        let bad_sort = OpportunityQuery {
            sort_by: "name".to_string(),
            ..OpportunityQuery::default()
        };
        assert!(bad_sort.validate().is_err());
        let bad_limit = OpportunityQuery {
            limit: 101,
            ..OpportunityQuery::default()
        };
        assert!(bad_limit.validate().is_err());
    }
}
