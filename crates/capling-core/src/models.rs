//! Domain models for Capling

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// A money account owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: String,
    pub account_name: String,
    pub account_type: AccountType,
    /// Current balance, moved by posted transactions
    pub balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A new account (before DB insertion)
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    #[serde(default = "default_account_name")]
    pub account_name: String,
    #[serde(default)]
    pub account_type: AccountType,
    /// Opening balance
    #[serde(default)]
    pub balance: f64,
}

fn default_account_name() -> String {
    "Main Account".to_string()
}

impl NewAccount {
    pub fn validate(&self) -> Result<()> {
        if self.account_name.trim().is_empty() {
            return Err(Error::Validation("account name cannot be empty".into()));
        }
        if !self.balance.is_finite() {
            return Err(Error::Validation("balance must be a finite number".into()));
        }
        Ok(())
    }
}

impl Default for NewAccount {
    fn default() -> Self {
        Self {
            account_name: default_account_name(),
            account_type: AccountType::default(),
            balance: 0.0,
        }
    }
}

/// Account types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    Credit,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit" | "credit_card" => Ok(Self::Credit),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending judgment attached to a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Responsible,
    Irresponsible,
    #[default]
    Neutral,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Responsible => "responsible",
            Self::Irresponsible => "irresponsible",
            Self::Neutral => "neutral",
        }
    }

    pub fn all() -> &'static [Classification] {
        &[Self::Responsible, Self::Irresponsible, Self::Neutral]
    }
}

impl std::str::FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "responsible" => Ok(Self::Responsible),
            "irresponsible" => Ok(Self::Irresponsible),
            "neutral" => Ok(Self::Neutral),
            _ => Err(format!("Unknown classification: {}", s)),
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Shopping,
    Food,
    Transport,
    Bills,
    Dining,
    Entertainment,
    Health,
    Income,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shopping => "shopping",
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Bills => "bills",
            Self::Dining => "dining",
            Self::Entertainment => "entertainment",
            Self::Health => "health",
            Self::Income => "income",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shopping" => Ok(Self::Shopping),
            "food" | "groceries" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "bills" => Ok(Self::Bills),
            "dining" => Ok(Self::Dining),
            "entertainment" => Ok(Self::Entertainment),
            "health" => Ok(Self::Health),
            "income" => Ok(Self::Income),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money leaving the account
    #[default]
    Debit,
    /// Money entering the account
    Credit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Signed balance effect of an amount of this type
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            Self::Debit => -amount,
            Self::Credit => amount,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub account_id: i64,
    pub merchant: String,
    /// Always non-negative; direction comes from `transaction_type`
    pub amount: f64,
    pub category: Category,
    pub classification: Classification,
    /// The user's note on why they made this purchase
    pub reflection: Option<String>,
    pub description: Option<String>,
    pub date: NaiveDate,
    /// Epoch milliseconds, orders transactions sharing a date
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A new transaction (before DB insertion)
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub account_id: i64,
    pub merchant: String,
    pub amount: f64,
    pub category: Category,
    #[serde(default)]
    pub classification: Classification,
    #[serde(default)]
    pub reflection: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    /// Defaults to the insertion time
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default, rename = "type")]
    pub transaction_type: TransactionType,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        if self.merchant.trim().is_empty() {
            return Err(Error::Validation("merchant cannot be empty".into()));
        }
        validate_amount(self.amount)
    }
}

/// Explicit user edit of a transaction. `None` leaves a field untouched;
/// for the nullable text fields `Some(None)` (JSON `null`) clears them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionUpdate {
    pub merchant: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub classification: Option<Classification>,
    #[serde(default, deserialize_with = "nullable")]
    pub reflection: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(merchant) = &self.merchant {
            if merchant.trim().is_empty() {
                return Err(Error::Validation("merchant cannot be empty".into()));
            }
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        Ok(())
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from a missing field
/// (`None`, via `#[serde(default)]`)
fn nullable<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::Validation(format!(
            "amount must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(())
}

/// Classification tallies over a user's transaction history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub responsible: u32,
    pub irresponsible: u32,
    pub neutral: u32,
}

impl ClassificationCounts {
    pub fn from_classifications(classifications: &[Classification]) -> Self {
        let mut counts = Self::default();
        for c in classifications {
            counts.add(*c);
        }
        counts
    }

    pub fn add(&mut self, classification: Classification) {
        match classification {
            Classification::Responsible => self.responsible = self.responsible.saturating_add(1),
            Classification::Irresponsible => {
                self.irresponsible = self.irresponsible.saturating_add(1)
            }
            Classification::Neutral => self.neutral = self.neutral.saturating_add(1),
        }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.responsible) + u64::from(self.irresponsible) + u64::from(self.neutral)
    }
}

/// A savings goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: f64,
    pub current_amount: f64,
    pub emoji: String,
    pub category: String,
    pub target_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Fraction of the target saved, clamped to [0, 1]
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 1.0;
        }
        (self.current_amount / self.target_amount).clamp(0.0, 1.0)
    }
}

/// A new goal (before DB insertion)
#[derive(Debug, Clone, Deserialize)]
pub struct NewGoal {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default = "default_goal_emoji")]
    pub emoji: String,
    #[serde(default = "default_goal_category")]
    pub category: String,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

fn default_goal_emoji() -> String {
    "🎯".to_string()
}

fn default_goal_category() -> String {
    "general".to_string()
}

impl NewGoal {
    pub fn new(title: &str, target_amount: f64) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            target_amount,
            current_amount: 0.0,
            emoji: default_goal_emoji(),
            category: default_goal_category(),
            target_date: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("goal title cannot be empty".into()));
        }
        if !self.target_amount.is_finite() || self.target_amount <= 0.0 {
            return Err(Error::Validation(
                "target amount must be a positive number".into(),
            ));
        }
        validate_amount(self.current_amount)
    }
}

/// Partial goal update. `null` clears `description` and `target_date`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub target_amount: Option<f64>,
    pub current_amount: Option<f64>,
    pub emoji: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub target_date: Option<Option<NaiveDate>>,
    pub is_completed: Option<bool>,
}

impl GoalUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::Validation("goal title cannot be empty".into()));
            }
        }
        if let Some(target) = self.target_amount {
            if !target.is_finite() || target <= 0.0 {
                return Err(Error::Validation(
                    "target amount must be a positive number".into(),
                ));
            }
        }
        if let Some(current) = self.current_amount {
            validate_amount(current)?;
        }
        Ok(())
    }
}

/// Per-user profile, keyed by the user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub weekly_budget: f64,
    /// Display name of the user's mascot
    pub capling_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update. `null` clears `full_name` and `avatar_url`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar_url: Option<Option<String>>,
    pub weekly_budget: Option<f64>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(budget) = self.weekly_budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(Error::Validation(
                    "weekly budget must be a non-negative number".into(),
                ));
            }
        }
        Ok(())
    }
}
