//! # Expense Service

use tracing::info;

use stockroom_core::validation::{validate_new_expense, NewExpenseRequest};
use stockroom_core::Expense;
use stockroom_db::Database;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub struct ExpenseService {
    db: Database,
}

impl ExpenseService {
    pub fn new(db: Database) -> Self {
        ExpenseService { db }
    }

    /// Expenses, newest first.
    pub async fn list_expenses(&self) -> ServiceResult<Vec<Expense>> {
        self.db
            .expenses()
            .list()
            .await
            .map_err(ServiceError::Persistence)
    }

    pub async fn create_expense(&self, req: &NewExpenseRequest) -> ServiceResult<Expense> {
        let new = validate_new_expense(req)?;
        let expense = self
            .db
            .expenses()
            .create(&new)
            .await
            .map_err(ServiceError::Persistence)?;

        info!(expense_id = %expense.id, amount = %expense.amount(), "Expense recorded");
        Ok(expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::database;
    use stockroom_core::money::DecimalInput;

    fn request(amount: &str) -> NewExpenseRequest {
        NewExpenseRequest {
            description: Some("Electricity".to_string()),
            category: Some("Utilities".to_string()),
            amount: Some(DecimalInput::new(amount)),
            spent_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let service = ExpenseService::new(database().await);

        let created = service.create_expense(&request("185.50")).await.unwrap();
        assert_eq!(created.amount_cents, 18550);

        let listed = service.list_expenses().await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_amount_must_be_positive() {
        let service = ExpenseService::new(database().await);

        for amount in ["0", "0.00", "12.345"] {
            let err = service.create_expense(&request(amount)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{amount}");
        }
        assert!(service.list_expenses().await.unwrap().is_empty());
    }
}
