//! Database tests

use super::*;
use crate::models::*;
use chrono::NaiveDate;

const USER: &str = "alex@example.com";
const OTHER: &str = "sam@example.com";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_tx(account_id: i64, merchant: &str, amount: f64) -> NewTransaction {
    NewTransaction {
        account_id,
        merchant: merchant.to_string(),
        amount,
        category: Category::Food,
        classification: Classification::Neutral,
        reflection: None,
        description: None,
        date: date(2024, 3, 1),
        timestamp: None,
        transaction_type: TransactionType::Debit,
    }
}

fn setup() -> (Database, i64) {
    let db = Database::in_memory().unwrap();
    let account_id = db
        .create_account(
            USER,
            &NewAccount {
                balance: 100.0,
                ..Default::default()
            },
        )
        .unwrap();
    (db, account_id)
}

fn balance(db: &Database, account_id: i64) -> f64 {
    db.get_account(USER, account_id).unwrap().unwrap().balance
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_accounts(USER).unwrap().is_empty());
    assert!(db.path().contains("capling_test_"));
}

#[test]
fn test_user_profiles_schema_exists() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let result: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('user_profiles') WHERE name IN ('id', 'full_name', 'avatar_url', 'weekly_budget', 'capling_name')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(result, 5, "user_profiles should have 5 expected columns");
}

#[test]
fn test_account_crud() {
    let db = Database::in_memory().unwrap();

    let id = db
        .create_account(
            USER,
            &NewAccount {
                account_name: "Rainy Day".into(),
                account_type: AccountType::Savings,
                balance: 250.0,
            },
        )
        .unwrap();
    assert!(id > 0);

    let account = db.get_account(USER, id).unwrap().unwrap();
    assert_eq!(account.account_name, "Rainy Day");
    assert_eq!(account.account_type, AccountType::Savings);
    assert_eq!(account.balance, 250.0);

    db.update_account(USER, id, "Emergency Fund", AccountType::Savings)
        .unwrap();
    assert_eq!(
        db.get_account(USER, id).unwrap().unwrap().account_name,
        "Emergency Fund"
    );

    db.delete_account(USER, id).unwrap();
    assert!(db.get_account(USER, id).unwrap().is_none());
}

#[test]
fn test_accounts_are_scoped_to_user() {
    let (db, account_id) = setup();

    assert!(db.get_account(OTHER, account_id).unwrap().is_none());
    assert!(db.list_accounts(OTHER).unwrap().is_empty());
    assert!(matches!(
        db.delete_account(OTHER, account_id),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        db.insert_transaction(OTHER, &new_tx(account_id, "Cafe", 5.0)),
        Err(Error::NotFound(_))
    ));
    assert_eq!(balance(&db, account_id), 100.0);
}

#[test]
fn test_insert_posts_to_balance() {
    let (db, account_id) = setup();

    db.insert_transaction(USER, &new_tx(account_id, "Grocer", 30.0))
        .unwrap();
    assert_eq!(balance(&db, account_id), 70.0);

    let mut paycheck = new_tx(account_id, "Employer", 500.0);
    paycheck.category = Category::Income;
    paycheck.transaction_type = TransactionType::Credit;
    db.insert_transaction(USER, &paycheck).unwrap();
    assert_eq!(balance(&db, account_id), 570.0);
}

#[test]
fn test_update_reposts_balance() {
    let (db, account_id) = setup();
    let id = db
        .insert_transaction(USER, &new_tx(account_id, "Grocer", 30.0))
        .unwrap();

    let updated = db
        .update_transaction(
            USER,
            id,
            &TransactionUpdate {
                amount: Some(45.0),
                classification: Some(Classification::Responsible),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.amount, 45.0);
    assert_eq!(updated.classification, Classification::Responsible);
    assert_eq!(updated.merchant, "Grocer");
    assert_eq!(balance(&db, account_id), 55.0);

    // Flipping to a credit swings the balance by twice the amount
    db.update_transaction(
        USER,
        id,
        &TransactionUpdate {
            transaction_type: Some(TransactionType::Credit),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(balance(&db, account_id), 145.0);
}

#[test]
fn test_delete_reverses_balance() {
    let (db, account_id) = setup();
    let id = db
        .insert_transaction(USER, &new_tx(account_id, "Cinema", 12.5))
        .unwrap();
    assert_eq!(balance(&db, account_id), 87.5);

    db.delete_transaction(USER, id).unwrap();
    assert_eq!(balance(&db, account_id), 100.0);
    assert!(db.get_transaction(USER, id).unwrap().is_none());
    assert!(matches!(
        db.delete_transaction(USER, id),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_balance_matches_opening_plus_postings() {
    let (db, account_id) = setup();

    let mut ids = Vec::new();
    for (i, amount) in [10.0, 20.0, 5.25, 40.0].iter().enumerate() {
        let mut tx = new_tx(account_id, &format!("Shop {}", i), *amount);
        if i % 2 == 1 {
            tx.transaction_type = TransactionType::Credit;
        }
        ids.push(db.insert_transaction(USER, &tx).unwrap());
    }
    db.delete_transaction(USER, ids[0]).unwrap();
    db.update_transaction(
        USER,
        ids[2],
        &TransactionUpdate {
            amount: Some(1.0),
            ..Default::default()
        },
    )
    .unwrap();

    let posted: f64 = db
        .list_transactions(USER, &TransactionFilter::new())
        .unwrap()
        .iter()
        .map(|t| t.transaction_type.signed(t.amount))
        .sum();
    assert!((balance(&db, account_id) - (100.0 + posted)).abs() < 1e-9);
}

#[test]
fn test_invalid_transaction_rejected() {
    let (db, account_id) = setup();

    assert!(matches!(
        db.insert_transaction(USER, &new_tx(account_id, "Cafe", -1.0)),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        db.insert_transaction(USER, &new_tx(account_id, "  ", 1.0)),
        Err(Error::Validation(_))
    ));
    assert_eq!(balance(&db, account_id), 100.0);
}

#[test]
fn test_list_orders_most_recent_first() {
    let (db, account_id) = setup();

    let mut early = new_tx(account_id, "Early", 1.0);
    early.date = date(2024, 1, 1);
    let mut same_day_first = new_tx(account_id, "Morning", 1.0);
    same_day_first.date = date(2024, 2, 1);
    same_day_first.timestamp = Some(1_000);
    let mut same_day_second = new_tx(account_id, "Evening", 1.0);
    same_day_second.date = date(2024, 2, 1);
    same_day_second.timestamp = Some(2_000);

    db.insert_transaction(USER, &same_day_first).unwrap();
    db.insert_transaction(USER, &early).unwrap();
    db.insert_transaction(USER, &same_day_second).unwrap();

    let merchants: Vec<String> = db
        .list_transactions(USER, &TransactionFilter::new())
        .unwrap()
        .into_iter()
        .map(|t| t.merchant)
        .collect();
    assert_eq!(merchants, vec!["Evening", "Morning", "Early"]);
}

#[test]
fn test_list_with_filters_and_pagination() {
    let (db, account_id) = setup();

    for i in 0..5 {
        let mut tx = new_tx(account_id, &format!("Coffee {}", i), 3.0);
        tx.classification = if i < 2 {
            Classification::Irresponsible
        } else {
            Classification::Responsible
        };
        tx.timestamp = Some(i);
        db.insert_transaction(USER, &tx).unwrap();
    }
    db.insert_transaction(USER, &new_tx(account_id, "Bakery", 4.0))
        .unwrap();

    let filter = TransactionFilter::new().classification(Some(Classification::Responsible));
    assert_eq!(db.count_transactions(USER, &filter).unwrap(), 3);

    let search = TransactionFilter::new().search(Some("coffee".into()));
    assert_eq!(db.count_transactions(USER, &search).unwrap(), 5);

    let page = db
        .list_transactions(USER, &search.clone().page(2, 1))
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].merchant, "Coffee 3");
    assert_eq!(page[1].merchant, "Coffee 2");

    assert!(db
        .list_transactions(OTHER, &TransactionFilter::new())
        .unwrap()
        .is_empty());
}

#[test]
fn test_recent_classifications_and_counts() {
    let (db, account_id) = setup();

    let history = [
        Classification::Responsible,
        Classification::Neutral,
        Classification::Irresponsible,
        Classification::Irresponsible,
    ];
    for (i, classification) in history.iter().enumerate() {
        let mut tx = new_tx(account_id, "Shop", 1.0);
        tx.classification = *classification;
        tx.timestamp = Some(i as i64);
        db.insert_transaction(USER, &tx).unwrap();
    }

    let recent = db.recent_classifications(USER, 3).unwrap();
    assert_eq!(
        recent,
        vec![
            Classification::Irresponsible,
            Classification::Irresponsible,
            Classification::Neutral,
        ]
    );

    let counts = db.classification_counts(USER).unwrap();
    assert_eq!(
        counts,
        ClassificationCounts {
            responsible: 1,
            irresponsible: 2,
            neutral: 1,
        }
    );
    assert_eq!(db.classification_counts(OTHER).unwrap().total(), 0);
}

/// Overwrite a stored classification, bypassing the CHECK constraint
fn force_classification(db: &Database, id: i64, value: &str) {
    let conn = db.conn().unwrap();
    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute(
        &format!("UPDATE transactions SET classification = {} WHERE id = ?", value),
        [id],
    )
    .unwrap();
    conn.execute_batch("PRAGMA ignore_check_constraints = OFF;")
        .unwrap();
}

#[test]
fn test_unreadable_classification_is_an_error() {
    let (db, account_id) = setup();
    db.insert_transaction(USER, &new_tx(account_id, "Shop", 1.0))
        .unwrap();
    let id = db
        .insert_transaction(USER, &new_tx(account_id, "Shop", 2.0))
        .unwrap();
    force_classification(&db, id, "X'01'");

    assert!(matches!(
        db.recent_classifications(USER, 5),
        Err(Error::Database(_))
    ));
    assert!(matches!(
        db.classification_counts(USER),
        Err(Error::Database(_))
    ));
}

#[test]
fn test_unknown_classification_is_skipped() {
    let (db, account_id) = setup();
    let mut tx = new_tx(account_id, "Shop", 1.0);
    tx.classification = Classification::Responsible;
    tx.timestamp = Some(1);
    db.insert_transaction(USER, &tx).unwrap();
    tx.timestamp = Some(2);
    let id = db.insert_transaction(USER, &tx).unwrap();
    force_classification(&db, id, "'splurge'");

    assert_eq!(
        db.recent_classifications(USER, 5).unwrap(),
        vec![Classification::Responsible]
    );
    assert_eq!(db.classification_counts(USER).unwrap().total(), 1);
}

#[test]
fn test_update_clears_nullable_fields() {
    let (db, account_id) = setup();
    let mut tx = new_tx(account_id, "Bookshop", 20.0);
    tx.reflection = Some("Impulse buy".into());
    tx.description = Some("Two novels".into());
    let id = db.insert_transaction(USER, &tx).unwrap();

    let updated = db
        .update_transaction(
            USER,
            id,
            &TransactionUpdate {
                reflection: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(updated.reflection.is_none());
    assert_eq!(updated.description.as_deref(), Some("Two novels"));
    assert_eq!(balance(&db, account_id), 80.0);

    let goal_id = db
        .create_goal(
            USER,
            &NewGoal {
                description: Some("Weekend trip".into()),
                target_date: Some(date(2024, 9, 1)),
                ..NewGoal::new("Trip", 200.0)
            },
        )
        .unwrap();
    let goal = db
        .update_goal(
            USER,
            goal_id,
            &GoalUpdate {
                target_date: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(goal.target_date.is_none());
    assert_eq!(goal.description.as_deref(), Some("Weekend trip"));

    db.update_profile(
        USER,
        &ProfileUpdate {
            full_name: Some(Some("Alex Doe".into())),
            avatar_url: Some(Some("https://example.com/a.png".into())),
            ..Default::default()
        },
    )
    .unwrap();
    let profile = db
        .update_profile(
            USER,
            &ProfileUpdate {
                avatar_url: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(profile.avatar_url.is_none());
    assert_eq!(profile.full_name.as_deref(), Some("Alex Doe"));
}

#[test]
fn test_delete_account_cascades_transactions() {
    let (db, account_id) = setup();
    db.insert_transaction(USER, &new_tx(account_id, "Shop", 1.0))
        .unwrap();

    db.delete_account(USER, account_id).unwrap();
    assert_eq!(
        db.count_transactions(USER, &TransactionFilter::new())
            .unwrap(),
        0
    );
}

#[test]
fn test_goal_lifecycle() {
    let db = Database::in_memory().unwrap();

    let id = db.create_goal(USER, &NewGoal::new("New bike", 300.0)).unwrap();
    let goal = db.get_goal(USER, id).unwrap().unwrap();
    assert_eq!(goal.emoji, "🎯");
    assert_eq!(goal.category, "general");
    assert!(!goal.is_completed);

    let goal = db.contribute_to_goal(USER, id, 100.0).unwrap();
    assert_eq!(goal.current_amount, 100.0);
    assert!(!goal.is_completed);

    let goal = db.contribute_to_goal(USER, id, 250.0).unwrap();
    assert_eq!(goal.current_amount, 350.0);
    assert!(goal.is_completed);

    let goal = db
        .update_goal(
            USER,
            id,
            &GoalUpdate {
                title: Some("Road bike".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(goal.title, "Road bike");
    assert!(goal.is_completed);

    assert!(db.contribute_to_goal(USER, id, 0.0).is_err());
    assert!(matches!(
        db.contribute_to_goal(OTHER, id, 5.0),
        Err(Error::NotFound(_))
    ));

    db.delete_goal(USER, id).unwrap();
    assert!(db.list_goals(USER).unwrap().is_empty());
}

#[test]
fn test_raising_goal_target_reopens_goal() {
    let db = Database::in_memory().unwrap();
    let id = db.create_goal(USER, &NewGoal::new("Headphones", 100.0)).unwrap();
    assert!(db.contribute_to_goal(USER, id, 100.0).unwrap().is_completed);

    let goal = db
        .update_goal(
            USER,
            id,
            &GoalUpdate {
                target_amount: Some(250.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(!goal.is_completed);

    let goal = db
        .update_goal(
            USER,
            id,
            &GoalUpdate {
                current_amount: Some(250.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(goal.is_completed);

    // An explicit flag wins over the amounts
    let goal = db
        .update_goal(
            USER,
            id,
            &GoalUpdate {
                is_completed: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(!goal.is_completed);
}

#[test]
fn test_goal_requires_positive_target() {
    let db = Database::in_memory().unwrap();
    assert!(matches!(
        db.create_goal(USER, &NewGoal::new("Nothing", 0.0)),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_profile_defaults_and_update() {
    let db = Database::in_memory().unwrap();
    assert!(db.get_profile(USER).unwrap().is_none());

    let profile = db.get_or_create_profile(USER).unwrap();
    assert_eq!(profile.capling_name, "Capling");
    assert_eq!(profile.weekly_budget, 0.0);

    let profile = db
        .update_profile(
            USER,
            &ProfileUpdate {
                full_name: Some(Some("Alex Doe".into())),
                weekly_budget: Some(150.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Alex Doe"));
    assert_eq!(profile.weekly_budget, 150.0);
    assert!(profile.avatar_url.is_none());
}

#[test]
fn test_update_capling_name() {
    let db = Database::in_memory().unwrap();

    // Renaming before the profile exists creates it
    let name = db.update_capling_name(USER, "  Penny ").unwrap();
    assert_eq!(name, "Penny");
    assert_eq!(db.get_profile(USER).unwrap().unwrap().capling_name, "Penny");

    assert!(matches!(
        db.update_capling_name(USER, ""),
        Err(Error::Validation(_))
    ));
    assert_eq!(db.get_profile(USER).unwrap().unwrap().capling_name, "Penny");
}

#[test]
fn test_audit_log() {
    let db = Database::in_memory().unwrap();

    db.log_audit(USER, "create", Some("goal"), Some(1), None)
        .unwrap();
    db.log_audit(USER, "rename", Some("capling"), None, Some("Penny"))
        .unwrap();
    db.log_audit(OTHER, "list", Some("accounts"), None, None)
        .unwrap();

    let entries = db.list_audit_log(USER, 10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "rename");
    assert_eq!(entries[0].details.as_deref(), Some("Penny"));
    assert_eq!(entries[1].entity_id, Some(1));
}
