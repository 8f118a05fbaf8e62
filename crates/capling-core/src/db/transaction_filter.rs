//! Transaction filter builder for constructing dynamic SQL queries
//!
//! Every filter is scoped to one user; the remaining conditions are optional.

use chrono::NaiveDate;

use crate::models::{Category, Classification, TransactionType};

/// Builder for constructing transaction query filters
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<i64>,
    pub classification: Option<Classification>,
    pub category: Option<Category>,
    pub transaction_type: Option<TransactionType>,
    /// Inclusive date range
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Case-insensitive merchant substring
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword
    pub where_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl TransactionFilter {
    /// Create a new filter builder with the default page size
    pub fn new() -> Self {
        Self {
            limit: 50,
            ..Default::default()
        }
    }

    /// Set account_id filter
    pub fn account_id(mut self, id: Option<i64>) -> Self {
        self.account_id = id;
        self
    }

    /// Set classification filter
    pub fn classification(mut self, classification: Option<Classification>) -> Self {
        self.classification = classification;
        self
    }

    /// Set category filter
    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    /// Set debit/credit filter
    pub fn transaction_type(mut self, transaction_type: Option<TransactionType>) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    /// Set date range filter
    pub fn date_range(mut self, range: Option<(NaiveDate, NaiveDate)>) -> Self {
        self.date_range = range;
        self
    }

    /// Set merchant search
    pub fn search(mut self, query: Option<String>) -> Self {
        self.search = query.filter(|q| !q.trim().is_empty());
        self
    }

    /// Set pagination
    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Build the WHERE clause for `user_id`
    pub fn build(&self, user_id: &str) -> FilterResult {
        let mut conditions = vec!["user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id.to_string())];

        if let Some(account_id) = self.account_id {
            conditions.push("account_id = ?".to_string());
            params.push(Box::new(account_id));
        }

        if let Some(classification) = self.classification {
            conditions.push("classification = ?".to_string());
            params.push(Box::new(classification.as_str()));
        }

        if let Some(category) = self.category {
            conditions.push("category = ?".to_string());
            params.push(Box::new(category.as_str()));
        }

        if let Some(transaction_type) = self.transaction_type {
            conditions.push("type = ?".to_string());
            params.push(Box::new(transaction_type.as_str()));
        }

        if let Some((from, to)) = self.date_range {
            conditions.push("date >= ? AND date <= ?".to_string());
            params.push(Box::new(from.to_string()));
            params.push(Box::new(to.to_string()));
        }

        if let Some(search) = &self.search {
            conditions.push("merchant LIKE ? COLLATE NOCASE".to_string());
            params.push(Box::new(format!("%{}%", search.trim())));
        }

        FilterResult {
            where_clause: format!("WHERE {}", conditions.join(" AND ")),
            params,
        }
    }
}
