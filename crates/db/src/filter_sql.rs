//! SQL rendering of a [`ListingFilter`].
//!
//! Produces one `WHERE` body plus its positional parameters. The row and
//! count executors in [`crate::repositories::listing_repo`] both bind the
//! same [`WhereClause`], so they always agree on what matches.

use nihontowatch_core::filter::{
    escape_like, ListingFilter, Predicate, AVAILABLE_STATUS, SOLD_STATUSES,
};
use nihontowatch_core::text::{fold_for_match, FOLD_FROM, FOLD_TO};
use nihontowatch_core::types::Timestamp;
use nihontowatch_core::url_state::ListingTab;

/// A bound value for a rendered predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Float(f64),
    Timestamp(Timestamp),
    Text(String),
    TextArray(Vec<String>),
    IntArray(Vec<i64>),
}

/// Rendered `WHERE` body (without the keyword) and its parameters in
/// placeholder order, starting at `$1`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl WhereClause {
    /// Index of the next free placeholder.
    pub fn next_param(&self) -> usize {
        self.params.len() + 1
    }
}

/// Bind every [`SqlParam`] of a clause onto a sqlx query, in order.
///
/// Works for `query`, `query_as` and `query_scalar` builders alike.
#[macro_export]
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut q = $query;
        for param in $params {
            q = match param {
                $crate::filter_sql::SqlParam::Float(v) => q.bind(*v),
                $crate::filter_sql::SqlParam::Timestamp(v) => q.bind(*v),
                $crate::filter_sql::SqlParam::Text(v) => q.bind(v.clone()),
                $crate::filter_sql::SqlParam::TextArray(v) => q.bind(v.clone()),
                $crate::filter_sql::SqlParam::IntArray(v) => q.bind(v.clone()),
            };
        }
        q
    }};
}

/// Lowercased, macron-folded column expression for text search.
fn folded(column: &str) -> String {
    format!("translate(lower({column}), '{FOLD_FROM}', '{FOLD_TO}')")
}

struct Renderer {
    conditions: Vec<String>,
    params: Vec<SqlParam>,
}

impl Renderer {
    fn bind(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    fn like(&mut self, needle: &str) -> String {
        self.bind(SqlParam::Text(format!("%{}%", escape_like(needle))))
    }

    fn push(&mut self, predicate: &Predicate) {
        let condition = match predicate {
            Predicate::Status { tab } => match tab {
                ListingTab::Available => {
                    let p = self.bind(SqlParam::Text(AVAILABLE_STATUS.to_string()));
                    format!("(LOWER(status) = {p} OR is_available IS TRUE)")
                }
                ListingTab::Sold => {
                    let p = self.bind(SqlParam::TextArray(
                        SOLD_STATUSES.iter().map(|s| s.to_string()).collect(),
                    ));
                    format!("(LOWER(status) = ANY({p}) OR is_sold IS TRUE)")
                }
            },
            Predicate::PriceFloorJpy { floor } => {
                let p = self.bind(SqlParam::Float(*floor));
                format!("(price_jpy IS NULL OR price_jpy >= {p})")
            }
            Predicate::FirstSeenSince { since } => {
                let p = self.bind(SqlParam::Timestamp(*since));
                format!("first_seen_at >= {p}")
            }
            Predicate::ItemTypeIn { item_types } => {
                let p = self.bind(SqlParam::TextArray(item_types.clone()));
                format!("LOWER(item_type) = ANY({p})")
            }
            Predicate::AskOnly => "price_value IS NULL".to_string(),
            Predicate::HasSetsumei => "has_setsumei IS TRUE".to_string(),
            Predicate::CertTypeIn { cert_types } => {
                let p = self.bind(SqlParam::TextArray(cert_types.clone()));
                format!("cert_type = ANY({p})")
            }
            Predicate::SchoolLike { schools } => {
                let alternatives: Vec<String> = schools
                    .iter()
                    .map(|s| {
                        let p = self.like(s);
                        format!("school ILIKE {p} OR tosogu_school ILIKE {p}")
                    })
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
            Predicate::DealerIn { dealer_ids } => {
                let p = self.bind(SqlParam::IntArray(dealer_ids.clone()));
                format!("dealer_id = ANY({p})")
            }
            Predicate::EraIn { eras } => {
                let p = self.bind(SqlParam::TextArray(eras.clone()));
                format!("LOWER(era) = ANY({p})")
            }
            Predicate::SignatureIn { statuses } => {
                let p = self.bind(SqlParam::TextArray(statuses.clone()));
                format!("LOWER(signature_status) = ANY({p})")
            }
            Predicate::Numeric(f) => {
                let p = self.bind(SqlParam::Float(f.value));
                format!("{} {} {p}", f.field.column(), f.op.sql())
            }
            Predicate::ArtisanIn { codes } => {
                let p = self.bind(SqlParam::TextArray(codes.clone()));
                format!("UPPER(artisan_id) = ANY({p})")
            }
            Predicate::Text(term) => {
                let p = self.like(&fold_for_match(&term.word));
                let columns = ["title", "smith", "school", "tosogu_maker", "tosogu_school"]
                    .map(|c| format!("{} LIKE {p}", folded(c)));
                let mut sql = format!("({}", columns.join(" OR "));
                if !term.artisan_codes.is_empty() {
                    let codes = self.bind(SqlParam::TextArray(term.artisan_codes.clone()));
                    sql.push_str(&format!(" OR artisan_id = ANY({codes})"));
                }
                sql.push(')');
                sql
            }
        };
        self.conditions.push(condition);
    }
}

/// Render a filter. An empty filter renders as `TRUE`.
pub fn render_filter(filter: &ListingFilter) -> WhereClause {
    let mut r = Renderer {
        conditions: Vec::new(),
        params: Vec::new(),
    };
    for predicate in &filter.predicates {
        r.push(predicate);
    }
    let sql = if r.conditions.is_empty() {
        "TRUE".to_string()
    } else {
        r.conditions.join(" AND ")
    };
    WhereClause {
        sql,
        params: r.params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nihontowatch_core::filter::TextTerm;
    use nihontowatch_core::numeric::{NumericField, NumericFilter, NumericOp};

    #[test]
    fn empty_filter_is_true() {
        let clause = render_filter(&ListingFilter::default());
        assert_eq!(clause.sql, "TRUE");
        assert!(clause.params.is_empty());
        assert_eq!(clause.next_param(), 1);
    }

    #[test]
    fn placeholders_are_sequential() {
        let filter = ListingFilter {
            predicates: vec![
                Predicate::Status { tab: ListingTab::Available },
                Predicate::PriceFloorJpy { floor: 100_000.0 },
                Predicate::AskOnly,
                Predicate::Numeric(NumericFilter {
                    field: NumericField::NagasaCm,
                    op: NumericOp::Gte,
                    value: 70.0,
                }),
            ],
        };
        let clause = render_filter(&filter);
        assert_eq!(
            clause.sql,
            "(LOWER(status) = $1 OR is_available IS TRUE) \
             AND (price_jpy IS NULL OR price_jpy >= $2) \
             AND price_value IS NULL \
             AND nagasa_cm >= $3"
        );
        assert_eq!(clause.params[1], SqlParam::Float(100_000.0));
        assert_eq!(clause.next_param(), 4);
    }

    #[test]
    fn text_term_reuses_its_pattern_and_escapes() {
        let filter = ListingFilter {
            predicates: vec![Predicate::Text(TextTerm {
                word: "100%_".into(),
                artisan_codes: vec!["MAS590".into()],
            })],
        };
        let clause = render_filter(&filter);
        assert!(clause.sql.starts_with(
            "(translate(lower(title), 'āâīîūûēêōô', 'aaiiuueeoo') LIKE $1 \
             OR translate(lower(smith), 'āâīîūûēêōô', 'aaiiuueeoo') LIKE $1"
        ));
        assert!(clause.sql.ends_with("OR artisan_id = ANY($2))"));
        assert_eq!(clause.params[0], SqlParam::Text("%100\\%\\_%".into()));
    }

    #[test]
    fn text_term_without_codes_has_no_artisan_branch() {
        let filter = ListingFilter {
            predicates: vec![Predicate::Text(TextTerm {
                word: "bizen".into(),
                artisan_codes: vec![],
            })],
        };
        let clause = render_filter(&filter);
        assert!(!clause.sql.contains("artisan_id"));
        assert_eq!(clause.params.len(), 1);
    }

    #[test]
    fn schools_or_together() {
        let filter = ListingFilter {
            predicates: vec![Predicate::SchoolLike {
                schools: vec!["Bizen".into(), "Soshu".into()],
            }],
        };
        let clause = render_filter(&filter);
        assert_eq!(
            clause.sql,
            "(school ILIKE $1 OR tosogu_school ILIKE $1 OR school ILIKE $2 OR tosogu_school ILIKE $2)"
        );
    }
}
