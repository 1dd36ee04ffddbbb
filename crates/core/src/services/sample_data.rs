use crate::models::transaction::{TransactionInput, TransactionKind};

/// Demo collection loaded into an empty store when `seed_sample_data` is on.
pub fn sample_transactions() -> Vec<TransactionInput> {
    use TransactionKind::{Expense, Income};

    vec![
        TransactionInput::new("Monthly salary", 3500.00, "salary", Income, "2024-01-15")
            .with_account("National Bank"),
        TransactionInput::new("Supermarket", 250.75, "food", Expense, "2024-01-14")
            .with_account("Credit Card"),
        TransactionInput::new("Gas", 85.00, "transport", Expense, "2024-01-13")
            .with_account("National Bank"),
        TransactionInput::new(
            "Freelance web development",
            800.00,
            "freelance",
            Income,
            "2024-01-12",
        ),
        TransactionInput::new("Netflix", 12.99, "entertainment", Expense, "2024-01-11")
            .with_account("Debit Card"),
        TransactionInput::new("Electricity", 125.50, "utilities", Expense, "2024-01-10")
            .with_account("National Bank"),
        TransactionInput::new("Dividends", 150.00, "investment", Income, "2024-01-09")
            .with_account("Investment Bank"),
        TransactionInput::new("Lunch", 25.00, "food", Expense, "2024-01-08")
            .with_account("Cash"),
    ]
}
